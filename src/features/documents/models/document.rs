use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Lifecycle states of an archived document. Records are deactivated, never
/// destroyed; both states stay reachable through the status operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Etat {
    Actif,
    Inactif,
}

impl Etat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Etat::Actif => "actif",
            Etat::Inactif => "inactif",
        }
    }

    pub fn parse(s: &str) -> Option<Etat> {
        match s {
            "actif" => Some(Etat::Actif),
            "inactif" => Some(Etat::Inactif),
            _ => None,
        }
    }
}

impl std::fmt::Display for Etat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database model for an archived document
#[derive(Debug, Clone, FromRow)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub etat: String,
    pub category_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etat_round_trips_through_strings() {
        assert_eq!(Etat::parse("actif"), Some(Etat::Actif));
        assert_eq!(Etat::parse("inactif"), Some(Etat::Inactif));
        assert_eq!(Etat::parse("supprimé"), None);
        assert_eq!(Etat::Actif.as_str(), "actif");
    }
}
