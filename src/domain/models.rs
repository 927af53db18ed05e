mod announcement;
mod document;
mod pagination;
mod user;

pub use announcement::{
    Announcement, AnnouncementFilter, AnnouncementType, AnnouncementUpdate, AnnouncementView,
    NewAnnouncement,
};
pub use document::{
    DocumentRequest, DocumentRequestView, NewDocumentRequest, RequestFilter, RequestStatus,
};
pub use pagination::{MAX_LIMIT, Page, Paginated, Pagination};
pub use user::{CivilStatus, Gender, NewAccount, ResidentDetails, Role, User, UserProfile, UserUpdate};

use serde::{Deserialize, Serialize};

/// Urgency of a document request or an announcement.
///
/// Variants are declared from least to most urgent so that the derived
/// ordering sorts by urgency.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Case-insensitive substring match used by the search filters.
pub(crate) fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_orders_by_urgency() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_priority_wire_format() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(
            serde_json::from_str::<Priority>("\"low\"").unwrap(),
            Priority::Low
        );
        assert!(serde_json::from_str::<Priority>("\"urgent\"").is_err());
    }
}
