//! JSON HTTP surface. Every listing endpoint renders a [`ListView`] built by
//! a per-request controller over the live snapshot.

mod admin;
mod public;


use anyhow::Result;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::article::ArticleSummary;
use crate::db::Database;
use crate::environment::Settings;
use crate::listing::{ArticleListController, ListView, ListingConfig, SortMode, StatusScope};
use crate::refresh::refresh_once;
use crate::source::{DatabaseSource, SourceError};
use crate::TARGET_WEB_REQUEST;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Published-only controller holding the current snapshot.
    pub live: Arc<Mutex<ArticleListController>>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        AppState {
            db,
            live: Arc::new(Mutex::new(ArticleListController::new(ListingConfig::public(
                settings.page_size,
            )))),
            settings: Arc::new(settings),
        }
    }

    pub async fn snapshot(&self) -> Vec<ArticleSummary> {
        self.live.lock().await.snapshot().to_vec()
    }

    /// Reload the live snapshot from the store after a mutation.
    pub async fn reload_live(&self) {
        let source = DatabaseSource::new(self.db.clone(), StatusScope::PublishedOnly);
        refresh_once(&source, &self.live).await;
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            // Validation failures from the store
            sqlx::Error::Protocol(message) => ApiError::BadRequest(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Database(err) => ApiError::from(err),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match self {
            ApiError::Internal(detail) => {
                error!(target: TARGET_WEB_REQUEST, "Request failed: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Query-string parameters shared by the public and admin listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    /// Kept as text so `?page=abc` or `?page=-1` is ignored instead of rejected.
    pub page: Option<String>,
}

impl ListQuery {
    /// The requested page, if it parses as a page number.
    pub fn requested_page(&self) -> Option<usize> {
        self.page.as_deref().and_then(|page| page.trim().parse().ok())
    }
}

/// Runs one listing request through a fresh controller, applying the
/// parameters in the order search, category, sort, page.
pub fn render_listing(
    config: ListingConfig,
    snapshot: Vec<ArticleSummary>,
    query: &ListQuery,
) -> ListView {
    let mut controller = ArticleListController::new(config);
    controller.load_snapshot(snapshot);
    if let Some(q) = &query.q {
        controller.set_search_query(q);
    }
    if let Some(category) = &query.category {
        controller.set_category_filter(category.as_str());
    }
    if let Some(sort) = &query.sort {
        controller.set_sort_mode(SortMode::from(sort.as_str()));
    }
    if let Some(page) = query.requested_page() {
        controller.go_to_page(page);
    }
    controller.current_view()
}

pub fn router(state: AppState) -> Router {
    let mut app = public::routes();

    if state.settings.admin_enabled() {
        app = app.merge(admin::routes());
    } else {
        info!(target: TARGET_WEB_REQUEST, "ADMIN_TOKEN not set, admin routes disabled");
    }

    app.with_state(state)
}

/// Serves until Ctrl-C.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = router(state);
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!(target: TARGET_WEB_REQUEST, "Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", err);
            }
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
