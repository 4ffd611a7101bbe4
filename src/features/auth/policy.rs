//! Centralized access policy
//!
//! One capability table keyed by (role, resource, operation), consulted once
//! per request through [`authorize`]. Handlers never compare role strings
//! themselves.
//!
//! Rules:
//! - any authenticated role may read documents, categories, files and
//!   hearing records;
//! - admin and archiviste may create/update/delete them;
//! - user management and the activity trail are admin-only;
//! - the activity trail is append-only: no role may mutate it through the
//!   API.
//!
//! A refused request has no side effect and writes no trail entry.

use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Document,
    Category,
    File,
    User,
    Audit,
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// list/show/download/export
    Read,
    Create,
    Update,
    Delete,
}

/// The capability table. Pure function of its inputs.
pub fn allow(role: Role, resource: Resource, operation: Operation) -> bool {
    use Operation::*;
    use Resource::*;

    match (resource, operation) {
        (Document | Category | File | Audit, Read) => true,
        (Document | Category | File | Audit, Create | Update | Delete) => {
            matches!(role, Role::Admin | Role::Archiviste)
        }
        (User | Log, Read) => role == Role::Admin,
        (User, Create | Update | Delete) => role == Role::Admin,
        // Append-only: written by the application, never through the API
        (Log, Create | Update | Delete) => false,
    }
}

/// Consult the table for the current actor; refusals carry no side effect.
pub fn authorize(user: &AuthenticatedUser, resource: Resource, operation: Operation) -> Result<()> {
    if allow(user.role, resource, operation) {
        Ok(())
    } else {
        Err(AppError::acces_refuse())
    }
}

#[cfg(test)]
mod tests {
    use super::Operation::*;
    use super::Resource::*;
    use super::*;

    const ALL_ROLES: [Role; 3] = [Role::Admin, Role::Archiviste, Role::Utilisateur];
    const ARCHIVE_RESOURCES: [Resource; 4] = [Document, Category, File, Audit];

    #[test]
    fn archive_resources_are_readable_by_everyone() {
        for role in ALL_ROLES {
            for resource in ARCHIVE_RESOURCES {
                assert!(allow(role, resource, Read), "{role} should read {resource:?}");
            }
        }
    }

    #[test]
    fn archive_mutations_require_admin_or_archiviste() {
        for resource in ARCHIVE_RESOURCES {
            for operation in [Create, Update, Delete] {
                assert!(allow(Role::Admin, resource, operation));
                assert!(allow(Role::Archiviste, resource, operation));
                assert!(
                    !allow(Role::Utilisateur, resource, operation),
                    "utilisateur must not {operation:?} {resource:?}"
                );
            }
        }
    }

    #[test]
    fn user_management_and_trail_are_admin_only() {
        for resource in [User, Log] {
            assert!(allow(Role::Admin, resource, Read));
            assert!(!allow(Role::Archiviste, resource, Read));
            assert!(!allow(Role::Utilisateur, resource, Read));
        }
        for operation in [Create, Update, Delete] {
            assert!(allow(Role::Admin, User, operation));
            assert!(!allow(Role::Archiviste, User, operation));
        }
    }

    #[test]
    fn nobody_mutates_the_trail() {
        for role in ALL_ROLES {
            for operation in [Create, Update, Delete] {
                assert!(!allow(role, Log, operation));
            }
        }
    }

    #[test]
    fn authorize_refuses_with_standard_message() {
        let user = crate::shared::test_helpers::create_user_with_role(Role::Utilisateur);
        let err = authorize(&user, Document, Create).unwrap_err();
        match err {
            AppError::Forbidden(msg) => assert_eq!(msg, "Accès refusé."),
            other => panic!("expected forbidden, got {:?}", other),
        }
    }
}
