use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use super::{Actor, Result, required, search_term};
use crate::domain::DomainError;
use crate::domain::models::{
    Announcement, AnnouncementFilter, AnnouncementUpdate, AnnouncementView, NewAnnouncement, Page,
    Paginated, User, contains_ignore_case,
};
use crate::store::{Collection, Store};

pub const DEFAULT_RECENT: usize = 5;

/// Publishing and reading barangay announcements.
#[derive(Clone)]
pub struct AnnouncementService {
    announcements: Collection<Announcement>,
    users: Collection<User>,
}

impl AnnouncementService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            announcements: Collection::new(store.clone()),
            users: Collection::new(store),
        }
    }

    /// Active announcements, most urgent first and newest first within the
    /// same priority.
    pub async fn list(
        &self,
        page: Page,
        filter: &AnnouncementFilter,
    ) -> Result<Paginated<AnnouncementView>> {
        let term = search_term(filter.search.as_deref());
        let mut active: Vec<_> = self
            .active()
            .await?
            .into_iter()
            .filter(|a| filter.kind.is_none_or(|kind| a.kind == kind))
            .filter(|a| filter.priority.is_none_or(|priority| a.priority == priority))
            .filter(|a| {
                term.as_deref().is_none_or(|term| {
                    contains_ignore_case(&a.title, term) || contains_ignore_case(&a.content, term)
                })
            })
            .collect();
        active.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });

        let views = self.views(active).await?;
        Ok(page.slice(views))
    }

    /// The newest active announcements.
    pub async fn recent(&self, limit: usize) -> Result<Vec<AnnouncementView>> {
        let mut active = self.active().await?;
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        active.truncate(limit);
        self.views(active).await
    }

    /// Loads an active announcement.
    pub async fn get(&self, id: u64) -> Result<AnnouncementView> {
        let announcement = self
            .announcements
            .get(id)
            .await?
            .filter(|a| a.is_active)
            .ok_or(DomainError::NotFound("Announcement not found"))?;
        self.view(announcement).await
    }

    pub async fn create(&self, actor: Actor, input: NewAnnouncement) -> Result<AnnouncementView> {
        let (Some(title), Some(content)) = (required(&input.title), required(&input.content)) else {
            return Err(DomainError::Validation("Title and content are required"));
        };

        let now = Utc::now();
        let announcement = Announcement {
            id: self.announcements.next_id().await?,
            title: title.to_owned(),
            content: content.to_owned(),
            kind: input.kind.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            event_date: input.event_date,
            event_time: input.event_time,
            location: input.location.filter(|l| !l.trim().is_empty()),
            created_by: actor.id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.announcements.put(&announcement).await?;

        tracing::info!(
            announcement_id = announcement.id,
            actor_id = actor.id,
            "Announcement published"
        );
        self.view(announcement).await
    }

    /// Edits an announcement. Inactive announcements can be edited too, which
    /// is how a deleted one is restored.
    pub async fn update(&self, id: u64, update: AnnouncementUpdate) -> Result<AnnouncementView> {
        let mut announcement = self
            .announcements
            .get(id)
            .await?
            .ok_or(DomainError::NotFound("Announcement not found"))?;
        if update.is_empty() {
            return Err(DomainError::NoFieldsToUpdate);
        }

        update.apply(&mut announcement, Utc::now());
        self.announcements.put(&announcement).await?;
        tracing::info!(announcement_id = id, "Announcement updated");
        self.view(announcement).await
    }

    /// Hides an announcement from the public listings.
    pub async fn delete(&self, id: u64) -> Result<()> {
        let mut announcement = self
            .announcements
            .get(id)
            .await?
            .ok_or(DomainError::NotFound("Announcement not found"))?;

        announcement.is_active = false;
        announcement.updated_at = Utc::now();
        self.announcements.put(&announcement).await?;
        tracing::info!(announcement_id = id, "Announcement deactivated");
        Ok(())
    }

    /// Number of stored announcements, active or not.
    pub async fn count(&self) -> Result<usize> {
        Ok(self.announcements.all().await?.len())
    }

    async fn active(&self) -> Result<Vec<Announcement>> {
        let mut all = self.announcements.all().await?;
        all.retain(|a| a.is_active);
        Ok(all)
    }

    async fn view(&self, announcement: Announcement) -> Result<AnnouncementView> {
        let creator_name = self
            .users
            .get(announcement.created_by)
            .await?
            .map(|user| user.name);
        Ok(AnnouncementView {
            announcement,
            creator_name,
        })
    }

    async fn views(&self, announcements: Vec<Announcement>) -> Result<Vec<AnnouncementView>> {
        let mut names: HashMap<u64, Option<String>> = HashMap::new();
        let mut views = Vec::with_capacity(announcements.len());
        for announcement in announcements {
            let creator_name = match names.get(&announcement.created_by) {
                Some(name) => name.clone(),
                None => {
                    let name = self
                        .users
                        .get(announcement.created_by)
                        .await?
                        .map(|user| user.name);
                    names.insert(announcement.created_by, name.clone());
                    name
                }
            };
            views.push(AnnouncementView {
                announcement,
                creator_name,
            });
        }
        Ok(views)
    }
}
