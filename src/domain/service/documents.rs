use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{Actor, Result, required, search_term};
use crate::domain::models::{
    DocumentRequest, DocumentRequestView, NewDocumentRequest, Page, Paginated, RequestFilter,
    RequestStatus, User, contains_ignore_case,
};
use crate::domain::stats::DocumentStats;
use crate::domain::{DomainError, catalog, tracking};
use crate::store::{Collection, Store};

const TRACKING_INDEX: &str = "document_requests:tracking";
const MAX_TRACKING_ATTEMPTS: usize = 5;

/// A staff decision on a request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: Option<String>,
    pub remarks: Option<String>,
}

/// The document request workflow.
#[derive(Clone)]
pub struct DocumentService {
    requests: Collection<DocumentRequest>,
    users: Collection<User>,
}

impl DocumentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            requests: Collection::new(store.clone()),
            users: Collection::new(store),
        }
    }

    /// Files a new request in the `pending` state.
    ///
    /// The fee is copied from the catalog and a unique tracking number is
    /// reserved for the request.
    pub async fn create(&self, actor: Actor, input: NewDocumentRequest) -> Result<DocumentRequest> {
        let Some(document_type) = required(&input.document_type) else {
            return Err(DomainError::Validation("Document type is required"));
        };
        let kind = catalog::find(document_type).ok_or(DomainError::UnknownDocumentType)?;

        let id = self.requests.next_id().await?;
        let tracking_number = self.reserve_tracking_number(kind.name, id).await?;

        let now = Utc::now();
        let request = DocumentRequest {
            id,
            user_id: actor.id,
            document_type: kind.name.to_owned(),
            purpose: input.purpose.filter(|p| !p.trim().is_empty()),
            status: RequestStatus::Pending,
            priority: input.priority.unwrap_or_default(),
            request_data: input
                .request_data
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            remarks: None,
            approved_by: None,
            approved_at: None,
            completed_at: None,
            tracking_number,
            fee: kind.fee,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.requests.put(&request).await {
            self.release_tracking_number(&request.tracking_number).await;
            return Err(e.into());
        }

        tracing::info!(
            request_id = id,
            user_id = actor.id,
            tracking_number = %request.tracking_number,
            "Document request filed"
        );
        Ok(request)
    }

    async fn reserve_tracking_number(&self, document_type: &str, id: u64) -> Result<String> {
        let store = self.requests.store();
        for _ in 0..MAX_TRACKING_ATTEMPTS {
            let candidate = tracking::generate(document_type);
            if store.claim(TRACKING_INDEX, &candidate, id).await? {
                return Ok(candidate);
            }
            tracing::debug!(%candidate, "Tracking number taken, retrying");
        }
        Err(DomainError::TrackingNumberExhausted)
    }

    async fn release_tracking_number(&self, tracking_number: &str) {
        if let Err(e) = self
            .requests
            .store()
            .release(TRACKING_INDEX, tracking_number)
            .await
        {
            tracing::warn!("Failed to release tracking number {tracking_number}: {e}");
        }
    }

    pub async fn find_by_tracking_number(
        &self,
        tracking_number: &str,
    ) -> Result<Option<DocumentRequest>> {
        let store = self.requests.store();
        let Some(id) = store.lookup(TRACKING_INDEX, tracking_number.trim()).await? else {
            return Ok(None);
        };
        Ok(self.requests.get(id).await?)
    }

    /// The caller's own requests, newest first.
    pub async fn my_requests(&self, actor: Actor, limit: usize) -> Result<Vec<DocumentRequestView>> {
        let filter = RequestFilter {
            user_id: Some(actor.id),
            ..Default::default()
        };
        let mut views = self.filtered(&filter).await?;
        views.truncate(limit);
        Ok(views)
    }

    /// Staff listing with filters, newest first.
    pub async fn list(
        &self,
        page: Page,
        filter: &RequestFilter,
    ) -> Result<Paginated<DocumentRequestView>> {
        Ok(page.slice(self.filtered(filter).await?))
    }

    /// Every pending request, oldest first so staff handle them in order.
    pub async fn pending(&self) -> Result<Vec<DocumentRequestView>> {
        let filter = RequestFilter {
            status: Some(RequestStatus::Pending),
            ..Default::default()
        };
        let mut views = self.filtered(&filter).await?;
        views.reverse();
        Ok(views)
    }

    async fn filtered(&self, filter: &RequestFilter) -> Result<Vec<DocumentRequestView>> {
        let term = search_term(filter.search.as_deref());
        let users = self.user_index().await?;

        let mut views: Vec<_> = self
            .requests
            .all()
            .await?
            .into_iter()
            .filter(|r| filter.status.is_none_or(|status| r.status == status))
            .filter(|r| filter.user_id.is_none_or(|user_id| r.user_id == user_id))
            .filter(|r| {
                filter
                    .document_type
                    .as_deref()
                    .is_none_or(|kind| r.document_type == kind)
            })
            .map(|request| view(request, &users))
            .filter(|v| {
                term.as_deref().is_none_or(|term| {
                    contains_ignore_case(&v.request.tracking_number, term)
                        || contains_ignore_case(&v.request.document_type, term)
                        || v.user_name
                            .as_deref()
                            .is_some_and(|name| contains_ignore_case(name, term))
                })
            })
            .collect();
        views.sort_by(|a, b| {
            b.request
                .created_at
                .cmp(&a.request.created_at)
                .then(b.request.id.cmp(&a.request.id))
        });
        Ok(views)
    }

    /// Loads a request the caller is allowed to see.
    pub async fn get(&self, actor: Actor, id: u64) -> Result<DocumentRequestView> {
        let request = self.load(id).await?;
        if !actor.is_admin() && request.user_id != actor.id {
            return Err(DomainError::Forbidden(
                "Access denied. You can only view your own requests.",
            ));
        }
        self.view_of(request).await
    }

    async fn load(&self, id: u64) -> Result<DocumentRequest> {
        self.requests
            .get(id)
            .await?
            .ok_or(DomainError::NotFound("Document request not found"))
    }

    /// Applies a generic status change requested by staff.
    pub async fn update_status(
        &self,
        actor: Actor,
        id: u64,
        change: StatusChange,
    ) -> Result<DocumentRequestView> {
        let Some(status) = required(&change.status) else {
            return Err(DomainError::Validation("Status is required"));
        };
        let status = status.parse()?;
        self.transition(actor, id, status, change.remarks).await
    }

    pub async fn approve(
        &self,
        actor: Actor,
        id: u64,
        remarks: Option<String>,
    ) -> Result<DocumentRequestView> {
        self.transition(actor, id, RequestStatus::Approved, remarks)
            .await
    }

    pub async fn reject(
        &self,
        actor: Actor,
        id: u64,
        reason: Option<String>,
    ) -> Result<DocumentRequestView> {
        let Some(reason) = required(&reason) else {
            return Err(DomainError::Validation("Rejection reason is required"));
        };
        self.transition(actor, id, RequestStatus::Rejected, Some(reason.to_owned()))
            .await
    }

    async fn transition(
        &self,
        actor: Actor,
        id: u64,
        status: RequestStatus,
        remarks: Option<String>,
    ) -> Result<DocumentRequestView> {
        let mut request = self.load(id).await?;
        let previous = request.status;
        request.transition(status, remarks, actor.id, Utc::now())?;
        self.requests.put(&request).await?;

        tracing::info!(
            request_id = id,
            actor_id = actor.id,
            from = %previous,
            to = %status,
            "Document request status changed"
        );
        self.view_of(request).await
    }

    /// Counters over every request for staff, or over the caller's own.
    pub async fn statistics(&self, actor: Actor, now: DateTime<Utc>) -> Result<DocumentStats> {
        let requests = self.requests.all().await?;
        Ok(DocumentStats::collect(
            requests
                .iter()
                .filter(|r| actor.is_admin() || r.user_id == actor.id)
                .map(|r| (r.status, r.created_at)),
            now,
        ))
    }

    /// Deletes a request. Residents may only withdraw their own pending ones.
    pub async fn delete(&self, actor: Actor, id: u64) -> Result<()> {
        let request = self.load(id).await?;
        if !actor.is_admin() {
            if request.user_id != actor.id {
                return Err(DomainError::Forbidden(
                    "Access denied. You can only delete your own requests.",
                ));
            }
            if request.status != RequestStatus::Pending {
                return Err(DomainError::NotPending);
            }
        }

        self.remove(&request).await?;
        tracing::info!(request_id = id, actor_id = actor.id, "Document request deleted");
        Ok(())
    }

    /// Deletes every request filed by a user. Returns how many were removed.
    pub async fn delete_for_user(&self, user_id: u64) -> Result<usize> {
        let mut removed = 0;
        for request in self.requests.all().await? {
            if request.user_id == user_id {
                self.remove(&request).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn remove(&self, request: &DocumentRequest) -> Result<()> {
        self.requests.remove(request.id).await?;
        self.requests
            .store()
            .release(TRACKING_INDEX, &request.tracking_number)
            .await?;
        Ok(())
    }

    async fn user_index(&self) -> Result<HashMap<u64, User>> {
        Ok(self
            .users
            .all()
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect())
    }

    async fn view_of(&self, request: DocumentRequest) -> Result<DocumentRequestView> {
        let mut users = HashMap::new();
        for id in std::iter::once(request.user_id).chain(request.approved_by) {
            if let Some(user) = self.users.get(id).await? {
                users.insert(id, user);
            }
        }
        Ok(view(request, &users))
    }
}

fn view(request: DocumentRequest, users: &HashMap<u64, User>) -> DocumentRequestView {
    let requester = users.get(&request.user_id);
    let approver = request.approved_by.and_then(|id| users.get(&id));
    DocumentRequestView {
        user_name: requester.map(|u| u.name.clone()),
        user_email: requester.map(|u| u.email.clone()),
        approver_name: approver.map(|u| u.name.clone()),
        request,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::models::{Priority, ResidentDetails, Role};
    use crate::store::MemoryStore;

    struct Fixture {
        service: DocumentService,
        resident: Actor,
        other: Actor,
        admin: Actor,
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let users: Collection<User> = Collection::new(store.clone());
        let now = Utc::now();
        for (id, name, role) in [
            (1, "Juan Dela Cruz", Role::Resident),
            (2, "Maria Clara", Role::Resident),
            (3, "Barangay Aurora", Role::Admin),
        ] {
            users
                .put(&User {
                    id,
                    name: name.into(),
                    email: format!("user{id}@example.ph"),
                    password_hash: String::new(),
                    role,
                    details: ResidentDetails::default(),
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
        }

        Fixture {
            service: DocumentService::new(store),
            resident: Actor {
                id: 1,
                role: Role::Resident,
            },
            other: Actor {
                id: 2,
                role: Role::Resident,
            },
            admin: Actor {
                id: 3,
                role: Role::Admin,
            },
        }
    }

    fn new_request(document_type: &str) -> NewDocumentRequest {
        NewDocumentRequest {
            document_type: Some(document_type.into()),
            purpose: Some("Employment".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_freezes_fee_and_assigns_tracking_number() {
        let f = fixture().await;
        let request = f
            .service
            .create(f.resident, new_request("Business Permit"))
            .await
            .unwrap();

        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.fee, 200.0);
        assert_eq!(request.priority, Priority::Medium);
        assert_eq!(request.request_data, json!({}));
        assert!(request.tracking_number.starts_with("BU-"));

        let found = f
            .service
            .find_by_tracking_number(&request.tracking_number)
            .await
            .unwrap();
        assert_eq!(found.map(|r| r.id), Some(request.id));
    }

    #[tokio::test]
    async fn test_create_validation() {
        let f = fixture().await;

        let err = f
            .service
            .create(f.resident, NewDocumentRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Document type is required");

        let err = f
            .service
            .create(f.resident, new_request("Cedula"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UnknownDocumentType));
    }

    #[tokio::test]
    async fn test_tracking_numbers_are_unique() {
        let f = fixture().await;
        let mut seen = std::collections::HashSet::new();
        for _ in 0..50 {
            let request = f
                .service
                .create(f.resident, new_request("Barangay Clearance"))
                .await
                .unwrap();
            assert!(seen.insert(request.tracking_number));
        }
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let f = fixture().await;
        let request = f
            .service
            .create(f.resident, new_request("Barangay Clearance"))
            .await
            .unwrap();

        let view = f
            .service
            .update_status(
                f.admin,
                request.id,
                StatusChange {
                    status: Some("processing".into()),
                    remarks: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(view.request.status, RequestStatus::Processing);

        let view = f
            .service
            .approve(f.admin, request.id, Some("Ready for pickup".into()))
            .await
            .unwrap();
        assert_eq!(view.request.approved_by, Some(f.admin.id));
        assert_eq!(view.approver_name.as_deref(), Some("Barangay Aurora"));
        assert_eq!(view.user_name.as_deref(), Some("Juan Dela Cruz"));

        let view = f
            .service
            .update_status(
                f.admin,
                request.id,
                StatusChange {
                    status: Some("completed".into()),
                    remarks: Some("Released".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(view.request.status, RequestStatus::Completed);
        assert!(view.request.completed_at.is_some());
        assert_eq!(view.request.remarks.as_deref(), Some("Released"));
    }

    #[tokio::test]
    async fn test_invalid_transition_is_rejected() {
        let f = fixture().await;
        let request = f
            .service
            .create(f.resident, new_request("Barangay Clearance"))
            .await
            .unwrap();
        f.service
            .reject(f.admin, request.id, Some("Incomplete requirements".into()))
            .await
            .unwrap();

        let err = f
            .service
            .approve(f.admin, request.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));

        let stored = f.service.get(f.admin, request.id).await.unwrap();
        assert_eq!(stored.request.status, RequestStatus::Rejected);
        assert_eq!(stored.request.remarks.as_deref(), Some("Incomplete requirements"));
    }

    #[tokio::test]
    async fn test_status_input_validation() {
        let f = fixture().await;
        let request = f
            .service
            .create(f.resident, new_request("Barangay Clearance"))
            .await
            .unwrap();

        let err = f
            .service
            .update_status(f.admin, request.id, StatusChange::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Status is required");

        let err = f
            .service
            .update_status(
                f.admin,
                request.id,
                StatusChange {
                    status: Some("archived".into()),
                    remarks: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStatus(_)));

        let err = f
            .service
            .reject(f.admin, request.id, Some(" ".into()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Rejection reason is required");

        let err = f.service.approve(f.admin, 999, None).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_residents_only_see_their_own_requests() {
        let f = fixture().await;
        let request = f
            .service
            .create(f.resident, new_request("Residency Certificate"))
            .await
            .unwrap();

        assert!(f.service.get(f.resident, request.id).await.is_ok());
        assert!(f.service.get(f.admin, request.id).await.is_ok());
        assert!(matches!(
            f.service.get(f.other, request.id).await.unwrap_err(),
            DomainError::Forbidden(_)
        ));
        assert!(f.service.my_requests(f.other, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let f = fixture().await;
        let pending = f
            .service
            .create(f.resident, new_request("Barangay Clearance"))
            .await
            .unwrap();
        let approved = f
            .service
            .create(f.resident, new_request("Barangay Clearance"))
            .await
            .unwrap();
        f.service.approve(f.admin, approved.id, None).await.unwrap();

        assert!(matches!(
            f.service.delete(f.other, pending.id).await.unwrap_err(),
            DomainError::Forbidden(_)
        ));
        assert!(matches!(
            f.service.delete(f.resident, approved.id).await.unwrap_err(),
            DomainError::NotPending
        ));

        f.service.delete(f.resident, pending.id).await.unwrap();
        f.service.delete(f.admin, approved.id).await.unwrap();
        assert!(
            f.service
                .find_by_tracking_number(&approved.tracking_number)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_listing_filters_and_search() {
        let f = fixture().await;
        let clearance = f
            .service
            .create(f.resident, new_request("Barangay Clearance"))
            .await
            .unwrap();
        f.service
            .create(f.other, new_request("Business Permit"))
            .await
            .unwrap();
        f.service
            .create(f.other, new_request("Certificate of Indigency"))
            .await
            .unwrap();
        f.service.approve(f.admin, clearance.id, None).await.unwrap();

        let all = f
            .service
            .list(Page::default(), &RequestFilter::default())
            .await
            .unwrap();
        assert_eq!(all.pagination.total_records, 3);
        assert_eq!(all.items[0].request.document_type, "Certificate of Indigency");

        let by_name = RequestFilter {
            search: Some("maria".into()),
            ..Default::default()
        };
        let found = f.service.list(Page::default(), &by_name).await.unwrap();
        assert_eq!(found.pagination.total_records, 2);

        let by_status = RequestFilter {
            status: Some(RequestStatus::Approved),
            ..Default::default()
        };
        let found = f.service.list(Page::default(), &by_status).await.unwrap();
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].request.id, clearance.id);

        let pending = f.service.pending().await.unwrap();
        let types: Vec<_> = pending
            .iter()
            .map(|v| v.request.document_type.as_str())
            .collect();
        assert_eq!(types, ["Business Permit", "Certificate of Indigency"]);
    }

    #[tokio::test]
    async fn test_statistics_scope() {
        let f = fixture().await;
        f.service
            .create(f.resident, new_request("Barangay Clearance"))
            .await
            .unwrap();
        let other = f
            .service
            .create(f.other, new_request("Business Permit"))
            .await
            .unwrap();
        f.service.reject(f.admin, other.id, Some("No permit".into())).await.unwrap();

        let mine = f.service.statistics(f.resident, Utc::now()).await.unwrap();
        assert_eq!(mine.total, 1);
        assert_eq!(mine.pending, 1);

        let all = f.service.statistics(f.admin, Utc::now()).await.unwrap();
        assert_eq!(all.total, 2);
        assert_eq!(all.rejected, 1);
        assert_eq!(all.periods.today, 2);
    }

    #[tokio::test]
    async fn test_delete_for_user() {
        let f = fixture().await;
        for _ in 0..3 {
            f.service
                .create(f.resident, new_request("Barangay Clearance"))
                .await
                .unwrap();
        }
        f.service
            .create(f.other, new_request("Barangay Clearance"))
            .await
            .unwrap();

        assert_eq!(f.service.delete_for_user(f.resident.id).await.unwrap(), 3);
        let stats = f.service.statistics(f.admin, Utc::now()).await.unwrap();
        assert_eq!(stats.total, 1);
    }
}
