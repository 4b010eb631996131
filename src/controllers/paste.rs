use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::models::{NewPaste, Paste};
use crate::types::api::CreatedPaste;
use crate::url::{paste_url, RequestOrigin};
use crate::validate;
use crate::App;

/// Validate a raw creation request, store the paste and compose its link.
pub async fn create(
    app: &mut App,
    body: &[u8],
    origin: &RequestOrigin,
    now: DateTime<Utc>,
) -> crate::ApiResult<CreatedPaste> {
    let input = validate::parse_body(body)?;
    let new_paste = NewPaste::build(input, now).ok_or(ApiError::InvalidTtl)?;

    let size = new_paste.content.len();
    let paste = app.database.insert_paste(new_paste).await?;

    info!(
        "new paste: id='{id}', size={size}, expires_at={expires_at:?}, max_views={max_views:?}",
        id = paste.id,
        expires_at = paste.expires_at,
        max_views = paste.max_views,
    );

    let url = paste_url(app.urls.as_ref(), origin, &paste.id);
    Ok(CreatedPaste { id: paste.id, url })
}

/// Fetch a paste for reading, counting the view.
pub async fn view(app: &mut App, id: &str, now: DateTime<Utc>) -> crate::ApiResult<Paste> {
    let paste = app.database.get_paste(id).await?;

    if paste.is_expired(&now) {
        debug!("paste '{id}' is no longer available");
        return Err(ApiError::NotFound);
    }

    // another reader may have taken the last view since the fetch
    app.database.record_view(id).await?.ok_or(ApiError::NotFound)
}

/// Delete every paste that has run out of time or views. Returns how many were deleted.
pub async fn purge_expired(app: &mut App, now: DateTime<Utc>) -> crate::ApiResult<usize> {
    let pastes = app.database.get_all_pastes().await?;

    let mut count = 0;
    for paste in pastes {
        if paste.is_expired(&now) {
            app.database.delete_paste(&paste.id).await?;
            count += 1;
        }
    }

    if count > 0 {
        info!("deleted {count} pastes");
    }

    Ok(count)
}
