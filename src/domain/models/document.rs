use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::domain::models::Priority;
use crate::store::Record;

/// Lifecycle state of a document request.
///
/// ```text
/// pending ──► processing ──► approved ──► completed
///    │             │
///    ├─────────────┴──► rejected
///    └──► approved
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Processing,
    Approved,
    Rejected,
    Completed,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 5] = [
        RequestStatus::Pending,
        RequestStatus::Processing,
        RequestStatus::Approved,
        RequestStatus::Rejected,
        RequestStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Processing => "processing",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Completed => "completed",
        }
    }

    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;

        matches!(
            (self, next),
            (Pending, Processing | Approved | Rejected)
                | (Processing, Approved | Rejected)
                | (Approved, Completed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Rejected | RequestStatus::Completed)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        RequestStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| DomainError::InvalidStatus(value.to_owned()))
    }
}

/// A certificate application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    pub id: u64,
    pub user_id: u64,
    pub document_type: String,
    pub purpose: Option<String>,
    pub status: RequestStatus,
    pub priority: Priority,
    pub request_data: serde_json::Value,
    pub remarks: Option<String>,
    pub approved_by: Option<u64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub tracking_number: String,
    /// Fee in pesos, copied from the catalog when the request was filed.
    pub fee: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for DocumentRequest {
    const COLLECTION: &'static str = "document_requests";

    fn id(&self) -> u64 {
        self.id
    }
}

impl DocumentRequest {
    /// Moves the request to `next`, stamping the approval or completion
    /// fields as required. The remarks always replace the previous ones.
    pub fn transition(
        &mut self,
        next: RequestStatus,
        remarks: Option<String>,
        actor_id: u64,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        self.remarks = remarks;
        self.updated_at = now;
        match next {
            RequestStatus::Approved => {
                self.approved_by = Some(actor_id);
                self.approved_at = Some(now);
            }
            RequestStatus::Completed => self.completed_at = Some(now),
            _ => {}
        }
        Ok(())
    }
}

/// A request joined with the names of the people involved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequestView {
    #[serde(flatten)]
    pub request: DocumentRequest,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub approver_name: Option<String>,
}

/// Input for filing a request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocumentRequest {
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub request_data: Option<serde_json::Value>,
}

/// Filters for the staff listing of requests.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub user_id: Option<u64>,
    pub document_type: Option<String>,
    pub search: Option<String>,
}
