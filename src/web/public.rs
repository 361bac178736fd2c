use axum::{
    extract::{Path, Query, State},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{render_listing, ApiError, AppState, ListQuery};
use crate::article::{ArticleId, ArticleStatus, ArticleSummary, Category};
use crate::db::ContactMessage;
use crate::listing::{ListView, ListingConfig};
use crate::reading::{format_date, neighbors, read_time, related_articles, Neighbors, RELATED_LIMIT};
use crate::source::{default_categories, ContentSource, SearchSource};
use crate::TARGET_WEB_REQUEST;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/status", get(status))
        .route("/api/articles", get(list_articles))
        .route("/api/articles/{id}", get(article_detail))
        .route("/api/search", get(search))
        .route("/api/categories", get(list_categories))
        .route("/api/subscribe", post(subscribe))
        .route("/api/contact", post(contact))
}

/// Version and build metadata, plus a database health probe.
async fn status(State(state): State<AppState>) -> Json<Value> {
    let database = match state.db.health_check().await {
        Ok(()) => "ok",
        Err(err) => {
            warn!(target: TARGET_WEB_REQUEST, "Database health check failed: {}", err);
            "unavailable"
        }
    };
    let articles = state.live.lock().await.snapshot().len();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "build_timestamp": env!("BUILD_TIMESTAMP"),
        "git_hash": env!("GIT_HASH"),
        "database": database,
        "articles": articles,
    }))
}

async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<ListView> {
    let config = ListingConfig::public(state.settings.page_size);
    let view = render_listing(config, state.snapshot().await, &query);
    info!(target: TARGET_WEB_REQUEST, "Listing page {} of {} ({} matching)", view.current_page, view.total_pages, view.total_count);
    Json(view)
}

#[derive(Debug, Serialize)]
struct ArticleDetail {
    article: ArticleSummary,
    category_label: String,
    read_time: String,
    formatted_date: String,
    related: Vec<ArticleSummary>,
    neighbors: Neighbors,
}

async fn article_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ArticleDetail>, ApiError> {
    let not_found = || ApiError::NotFound("Article not found".to_string());
    let id = ArticleId::from(id.as_str()).as_i64().ok_or_else(not_found)?;

    let article = state
        .db
        .get_article(id)
        .await?
        .filter(|article| article.status == ArticleStatus::Published)
        .ok_or_else(not_found)?;

    let user_agent = headers.get(USER_AGENT).and_then(|value| value.to_str().ok());
    if let Err(err) = state.db.track_article_view(id, user_agent).await {
        // A lost view count never fails the page
        warn!(target: TARGET_WEB_REQUEST, "Could not record view of article {}: {}", id, err);
    }

    let snapshot = state.snapshot().await;
    let related = related_articles(&snapshot, &article, RELATED_LIMIT)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(ArticleDetail {
        category_label: article.category_label.clone(),
        read_time: read_time(&article.content),
        formatted_date: format_date(&article.published_at),
        related,
        neighbors: neighbors(&snapshot, &article),
        article,
    }))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// Store-side search, rendered as a single page of results.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ListView>, ApiError> {
    let limit = state.settings.search_limit;
    let results = SearchSource::new(state.db.clone(), &query.q, limit)
        .fetch()
        .await?;
    info!(target: TARGET_WEB_REQUEST, "Search for {:?} returned {} result(s)", query.q, results.len());

    let config = ListingConfig::public(limit.max(1) as usize);
    Ok(Json(render_listing(config, results, &ListQuery::default())))
}

async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = state.db.list_categories().await?;
    if categories.is_empty() {
        return Ok(Json(default_categories()));
    }
    Ok(Json(categories))
}

#[derive(Debug, Deserialize)]
struct SubscribeRequest {
    email: String,
}

fn looks_like_email(email: &str) -> bool {
    match email.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if !looks_like_email(&payload.email) {
        return Err(ApiError::BadRequest(
            "Please enter a valid email address.".to_string(),
        ));
    }
    if !state.db.add_subscriber(&payload.email).await? {
        return Err(ApiError::Conflict(
            "This email is already subscribed.".to_string(),
        ));
    }
    info!(target: TARGET_WEB_REQUEST, "New newsletter subscriber");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Thank you for subscribing!" })),
    ))
}

async fn contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactMessage>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let required = [&payload.name, &payload.email, &payload.message];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(ApiError::BadRequest(
            "Please fill in all required fields.".to_string(),
        ));
    }
    if !looks_like_email(&payload.email) {
        return Err(ApiError::BadRequest(
            "Please enter a valid email address.".to_string(),
        ));
    }
    let id = state.db.submit_contact(&payload).await?;
    info!(target: TARGET_WEB_REQUEST, "Contact message {} received", id);
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("reader@example.com"));
        assert!(looks_like_email(" desk@news.example.org "));
        assert!(!looks_like_email("reader.example.com"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("reader@localhost"));
        assert!(!looks_like_email("reader@example."));
    }
}
