use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Paste;

#[derive(Debug, Serialize)]
pub struct CreatedPaste {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct PasteView {
    pub content: String,
    /// `None` for pastes without a view limit.
    pub remaining_views: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Paste> for PasteView {
    fn from(paste: Paste) -> Self {
        PasteView {
            remaining_views: paste.remaining_views(),
            expires_at: paste.expires_at,
            content: paste.content,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub ok: bool,
}
