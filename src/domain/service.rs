//! Service layer that provides the business logic of the domain.

mod announcements;
mod documents;
mod users;

pub use announcements::{AnnouncementService, DEFAULT_RECENT};
pub use documents::{DocumentService, StatusChange};
pub use users::{
    BarangayRegistration, Credentials, NewResident, PasswordChange, Registration, UserService,
};

use crate::auth::Claims;
use crate::domain::DomainError;
use crate::domain::models::Role;

pub type Result<T> = std::result::Result<T, DomainError>;

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: u64,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&Claims> for Actor {
    fn from(claims: &Claims) -> Self {
        Self {
            id: claims.id,
            role: claims.role,
        }
    }
}

/// Returns the trimmed value if it is present and not blank.
fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Lowercased, trimmed search term, or `None` when there is nothing to match.
fn search_term(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert_eq!(required(&Some("  juan ".into())), Some("juan"));
        assert_eq!(required(&Some("   ".into())), None);
        assert_eq!(required(&None), None);
    }

    #[test]
    fn test_search_term() {
        assert_eq!(search_term(Some(" Dela ")), Some("dela".into()));
        assert_eq!(search_term(Some("")), None);
        assert_eq!(search_term(None), None);
    }
}
