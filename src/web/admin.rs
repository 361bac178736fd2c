use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    routing::{get, put},
    Json, Router,
};
use axum_extra::extract::TypedHeader;
use axum_extra::headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{render_listing, ApiError, AppState, ListQuery};
use crate::db::{ArticleDraft, DashboardStats, SiteSettings};
use crate::listing::{ListView, ListingConfig, StatusScope};
use crate::source::{ContentSource, DatabaseSource};
use crate::TARGET_WEB_REQUEST;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/articles", get(list_articles).post(create_article))
        .route("/api/admin/articles/{id}", put(update_article).delete(delete_article))
        .route("/api/admin/stats", get(stats))
        .route("/api/admin/settings", get(load_settings).put(save_settings))
}

/// Proof that the request carried one of the configured admin tokens.
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthorized)?;

        if state
            .settings
            .admin_tokens
            .iter()
            .any(|token| token == bearer.token())
        {
            Ok(AdminAuth)
        } else {
            warn!(target: TARGET_WEB_REQUEST, "Rejected admin request with an unknown token");
            Err(ApiError::Unauthorized)
        }
    }
}

/// The admin table: drafts included, admin page size.
async fn list_articles(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListView>, ApiError> {
    let articles = DatabaseSource::new(state.db.clone(), StatusScope::All)
        .fetch()
        .await?;
    let config = ListingConfig::admin(state.settings.admin_page_size);
    Ok(Json(render_listing(config, articles, &query)))
}

async fn create_article(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Json(draft): Json<ArticleDraft>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let id = state.db.create_article(&draft).await?;
    info!(target: TARGET_WEB_REQUEST, "Article {} created ({})", id, draft.status);
    state.reload_live().await;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn update_article(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<ArticleDraft>,
) -> Result<Json<Value>, ApiError> {
    if !state.db.update_article(id, &draft).await? {
        return Err(ApiError::NotFound("Article not found".to_string()));
    }
    info!(target: TARGET_WEB_REQUEST, "Article {} updated ({})", id, draft.status);
    state.reload_live().await;
    Ok(Json(json!({ "id": id })))
}

async fn delete_article(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state.db.delete_article(id).await? {
        return Err(ApiError::NotFound("Article not found".to_string()));
    }
    info!(target: TARGET_WEB_REQUEST, "Article {} deleted", id);
    state.reload_live().await;
    Ok(StatusCode::NO_CONTENT)
}

async fn stats(
    _auth: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(state.db.dashboard_stats().await?))
}

async fn load_settings(
    _auth: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<SiteSettings>, ApiError> {
    Ok(Json(state.db.load_settings().await?))
}

async fn save_settings(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Json(settings): Json<SiteSettings>,
) -> Result<Json<SiteSettings>, ApiError> {
    state.db.save_settings(&settings).await?;
    info!(target: TARGET_WEB_REQUEST, "Site settings saved");
    Ok(Json(state.db.load_settings().await?))
}
