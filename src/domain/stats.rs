//! Dashboard counters.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::domain::models::RequestStatus;

/// How many timestamps fall in the current month, ISO week and day.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodCounts {
    pub this_month: usize,
    pub this_week: usize,
    pub today: usize,
}

impl PeriodCounts {
    pub fn add(&mut self, created_at: DateTime<Utc>, now: DateTime<Utc>) {
        let (date, today) = (created_at.date_naive(), now.date_naive());
        if date.year() == today.year() && date.month() == today.month() {
            self.this_month += 1;
        }
        if date.iso_week() == today.iso_week() {
            self.this_week += 1;
        }
        if date == today {
            self.today += 1;
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentStats {
    pub total: usize,
    #[serde(flatten)]
    pub periods: PeriodCounts,
}

impl ResidentStats {
    pub fn collect(created: impl IntoIterator<Item = DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        created.into_iter().fold(Self::default(), |mut stats, at| {
            stats.total += 1;
            stats.periods.add(at, now);
            stats
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub approved: usize,
    pub completed: usize,
    pub rejected: usize,
    #[serde(flatten)]
    pub periods: PeriodCounts,
}

impl DocumentStats {
    pub fn collect(
        requests: impl IntoIterator<Item = (RequestStatus, DateTime<Utc>)>,
        now: DateTime<Utc>,
    ) -> Self {
        requests
            .into_iter()
            .fold(Self::default(), |mut stats, (status, at)| {
                stats.total += 1;
                match status {
                    RequestStatus::Pending => stats.pending += 1,
                    RequestStatus::Processing => stats.processing += 1,
                    RequestStatus::Approved => stats.approved += 1,
                    RequestStatus::Completed => stats.completed += 1,
                    RequestStatus::Rejected => stats.rejected += 1,
                }
                stats.periods.add(at, now);
                stats
            })
    }
}
