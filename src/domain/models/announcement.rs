use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::Priority;
use crate::store::Record;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementType {
    Event,
    Notice,
    Health,
    Emergency,
    #[default]
    General,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: u64,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: AnnouncementType,
    pub priority: Priority,
    pub event_date: Option<NaiveDate>,
    pub event_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub created_by: u64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Announcement {
    const COLLECTION: &'static str = "announcements";

    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementView {
    #[serde(flatten)]
    pub announcement: Announcement,
    pub creator_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnouncement {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<AnnouncementType>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub event_time: Option<NaiveTime>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Editable announcement fields. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AnnouncementType>,
    pub priority: Option<Priority>,
    pub event_date: Option<NaiveDate>,
    pub event_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub is_active: Option<bool>,
}

impl AnnouncementUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.kind.is_none()
            && self.priority.is_none()
            && self.event_date.is_none()
            && self.event_time.is_none()
            && self.location.is_none()
            && self.is_active.is_none()
    }

    pub fn apply(self, announcement: &mut Announcement, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            announcement.title = title;
        }
        if let Some(content) = self.content {
            announcement.content = content;
        }
        if let Some(kind) = self.kind {
            announcement.kind = kind;
        }
        if let Some(priority) = self.priority {
            announcement.priority = priority;
        }
        if let Some(event_date) = self.event_date {
            announcement.event_date = Some(event_date);
        }
        if let Some(event_time) = self.event_time {
            announcement.event_time = Some(event_time);
        }
        if let Some(location) = self.location {
            announcement.location = Some(location);
        }
        if let Some(is_active) = self.is_active {
            announcement.is_active = is_active;
        }
        announcement.updated_at = now;
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnnouncementFilter {
    pub kind: Option<AnnouncementType>,
    pub priority: Option<Priority>,
    pub search: Option<String>,
}
