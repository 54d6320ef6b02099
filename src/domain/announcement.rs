use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::deserialize_some;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    /// Weak reference; cleared when the author account is deleted.
    pub created_by: Option<Uuid>,
    pub author_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    /// Active and not yet expired at `now`.
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.map_or(true, |expires| expires >= now)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnnouncementFilter {
    pub only_active: bool,
    /// Also drop announcements whose expiry has passed.
    pub only_visible: bool,
}

impl AnnouncementFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn visible() -> Self {
        Self {
            only_active: true,
            only_visible: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAnnouncementRequest {
    pub title: String,
    pub body: String,
    pub published_at: NaiveDate,
    #[serde(default)]
    pub expires_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAnnouncementRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub published_at: Option<NaiveDate>,
    /// `Some(None)` clears the expiry.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub expires_at: Option<Option<NaiveDate>>,
    pub is_active: Option<bool>,
}

/// Publication starts at the beginning of the given day.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Expiry lasts through the end of the given day.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let last = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);
    date.and_time(last).and_utc()
}
