use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::validate::PasteInput;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Paste {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_views: Option<i64>,
    pub view_count: i64,
}

impl Paste {
    pub fn remaining_views(&self) -> Option<i64> {
        self.max_views
            .map(|max_views| (max_views - self.view_count).max(0))
    }

    /// Whether the paste has run out of time or views at `now`.
    pub fn is_expired(&self, now: &DateTime<Utc>) -> bool {
        let timed_out = self.expires_at.map_or(false, |expires_at| *now >= expires_at);
        let exhausted = self.remaining_views() == Some(0);
        timed_out || exhausted
    }
}

/// The field set written for a new paste. The id is left to the database layer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPaste {
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_views: Option<i64>,
}

impl NewPaste {
    /// Derive the stored fields from validated input and the current time.
    ///
    /// Returns `None` when `now + ttl` falls outside the representable range.
    pub fn build(input: PasteInput, now: DateTime<Utc>) -> Option<Self> {
        let expires_at = match input.ttl_seconds {
            Some(ttl_seconds) => {
                let ttl = Duration::milliseconds((ttl_seconds * 1000.0).round() as i64);
                Some(now.checked_add_signed(ttl)?)
            }
            None => None,
        };

        Some(NewPaste {
            content: input.content,
            created_at: now,
            expires_at,
            max_views: input.max_views,
        })
    }

    pub fn into_paste(self, id: String) -> Paste {
        Paste {
            id,
            content: self.content,
            created_at: self.created_at,
            expires_at: self.expires_at,
            max_views: self.max_views,
            view_count: 0,
        }
    }
}
