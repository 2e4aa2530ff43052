//! User search endpoint

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::server::AppState;
use crate::services::search::{SearchQuery, UserDocument, USERS_INDEX};

const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub async fn users(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let Some(query) = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "query parameter 'q' is required" })),
        )
            .into_response();
    };

    match state
        .search
        .search::<UserDocument>(SearchQuery {
            index_uid: USERS_INDEX,
            query,
            limit: Some(params.limit.unwrap_or(DEFAULT_LIMIT)),
            offset: params.offset,
            filter: None,
        })
        .await
    {
        Ok(results) => Json(json!({
            "hits": results.hits,
            "estimated_total_hits": results.estimated_total_hits,
        }))
        .into_response(),
        Err(err) => {
            error!(error = %err, "user search failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal Server Error" })),
            )
                .into_response()
        }
    }
}
