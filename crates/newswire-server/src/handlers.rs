use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use newswire_core::{NewsError, NewsItem};

use crate::server::AppState;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// REST error envelope. Body is `{"detail": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Internal(String),
}

impl From<NewsError> for ApiError {
    fn from(e: NewsError) -> Self {
        match e {
            NewsError::NotFound(id) => ApiError::NotFound(format!("news {id} not found")),
            NewsError::InvalidCount(_) => ApiError::BadRequest(e.to_string()),
            NewsError::Store(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "invalid admin token".to_string())
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let credential = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    if state.auth.verify(credential) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

// ── Public endpoints ──

pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Newswire API",
        "endpoints": ["/news", "/news/{id}", "/ws"],
    }))
}

pub async fn list_news(State(state): State<AppState>) -> Result<Json<Vec<NewsItem>>, ApiError> {
    Ok(Json(state.service.list_all()?))
}

pub async fn get_news(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NewsItem>, ApiError> {
    Ok(Json(state.service.get_by_id(id)?))
}

// ── Admin endpoints (X-Admin-Token gated) ──

#[derive(Debug, Deserialize)]
pub struct GenerateParams {
    #[serde(default = "default_count")]
    pub count: i64,
}

fn default_count() -> i64 {
    1
}

pub async fn generate_news(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<GenerateParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&state, &headers)?;

    let news = state.service.generate(params.count)?;
    Ok(Json(serde_json::json!({
        "status": "success",
        "generated": news.len(),
        "news": news,
    })))
}

pub async fn delete_news(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&state, &headers)?;

    state.service.delete_one(id)?;
    Ok(Json(serde_json::json!({ "status": "deleted", "id": id })))
}

pub async fn clear_news(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&state, &headers)?;

    state.service.delete_all()?;
    Ok(Json(serde_json::json!({ "status": "all news deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404_detail() {
        let err: ApiError = NewsError::NotFound(5).into();
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "news 5 not found"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn invalid_count_maps_to_bad_request() {
        let err: ApiError = NewsError::InvalidCount(0).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn store_error_maps_to_internal() {
        let err: ApiError = NewsError::Store("boom".into()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn generate_params_default_to_one() {
        let params: GenerateParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.count, 1);

        let params: GenerateParams = serde_json::from_str(r#"{"count": 5}"#).unwrap();
        assert_eq!(params.count, 5);
    }
}
