use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::controllers::paste;
use crate::db::Database;
use crate::types::api::{CreatedPaste, Health, PasteView};
use crate::url::RequestOrigin;
use crate::App;

pub async fn run(app: App) -> anyhow::Result<()> {
    app.database.migrate().await?;

    let addr = SocketAddr::new(app.config.host, app.config.port);
    let router = router(app);

    info!("listening on http://{addr}");

    axum::Server::bind(&addr)
        .serve(router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");

    Ok(())
}

pub fn router(app: App) -> Router {
    let max_body_size = app.config.limits.max_body_size;

    Router::new()
        .route("/api/healthz", get(healthz))
        .route("/api/pastes", post(create_paste))
        .route("/api/pastes/:id", get(get_paste))
        .route("/p/:id", get(get_paste_raw))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn healthz(State(mut db): State<Database>) -> impl IntoResponse {
    match db.ping().await {
        Ok(()) => (StatusCode::OK, Json(Health { ok: true })),
        Err(err) => {
            warn!(error = ?err, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(Health { ok: false }))
        }
    }
}

async fn create_paste(
    State(mut app): State<App>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> crate::ApiResult<Json<CreatedPaste>> {
    let body = body?;
    let now = app.now(&headers);
    let origin = RequestOrigin::from_headers(&headers);
    let created = paste::create(&mut app, &body, &origin, now).await?;
    Ok(Json(created))
}

async fn get_paste(
    State(mut app): State<App>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> crate::ApiResult<Json<PasteView>> {
    let now = app.now(&headers);
    let paste = paste::view(&mut app, &id, now).await?;
    Ok(Json(paste.into()))
}

async fn get_paste_raw(
    State(mut app): State<App>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> crate::ApiResult<impl IntoResponse> {
    let now = app.now(&headers);
    let paste = paste::view(&mut app, &id, now).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        paste.content,
    ))
}
