use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::core::error::Result;
use crate::shared::constants::{ROLE_ADMIN, ROLE_ARCHIVISTE, ROLE_UTILISATEUR};

/// Account roles, from most to least privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Archiviste,
    Utilisateur,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Archiviste => ROLE_ARCHIVISTE,
            Role::Utilisateur => ROLE_UTILISATEUR,
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            ROLE_ADMIN => Some(Role::Admin),
            ROLE_ARCHIVISTE => Some(Role::Archiviste),
            ROLE_UTILISATEUR => Some(Role::Utilisateur),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The actor attached to every authenticated request
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Resolve the actor from the users table. Returns `None` when the
    /// account no longer exists or carries an unknown role.
    pub async fn load(pool: &PgPool, id: i64) -> Result<Option<Self>> {
        let row = sqlx::query_as::<_, (i64, String, String, String)>(
            "SELECT id, name, email, role FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.and_then(|(id, name, email, role)| {
            Role::parse(&role).map(|role| Self {
                id,
                name,
                email,
                role,
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        for role in [Role::Admin, Role::Archiviste, Role::Utilisateur] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("juge"), None);
        assert_eq!(Role::parse("Admin"), None);
    }
}
