//! Search index adapter
//!
//! Typed wrapper over the hosted index's REST API: index lifecycle,
//! document ingestion and deletion, queries, and attribute settings.
//! Write operations are asynchronous on the vendor side and acknowledged
//! with a task reference rather than applied inline.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::config::SearchConfig;

/// Index holding reel documents
pub const REELS_INDEX: &str = "reels";

/// Index holding user profile documents
pub const USERS_INDEX: &str = "users";

/// Search service errors
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("index service returned {status}: {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::Http(err.to_string())
    }
}

/// Attribute settings that can be updated per index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Searchable,
    Filterable,
    Sortable,
}

impl AttributeKind {
    fn settings_path(self) -> &'static str {
        match self {
            AttributeKind::Searchable => "searchable-attributes",
            AttributeKind::Filterable => "filterable-attributes",
            AttributeKind::Sortable => "sortable-attributes",
        }
    }
}

/// Acknowledgement for an asynchronous index operation
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRef {
    #[serde(rename = "taskUid")]
    pub task_uid: u64,
}

/// Query parameters for a search
#[derive(Debug, Clone)]
pub struct SearchQuery<'a> {
    pub index_uid: &'a str,
    pub query: &'a str,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub filter: Option<&'a str>,
}

/// One page of search results
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults<T> {
    pub hits: Vec<T>,
    #[serde(rename = "estimatedTotalHits", default)]
    pub estimated_total_hits: Option<u64>,
    #[serde(rename = "processingTimeMs", default)]
    pub processing_time_ms: Option<u64>,
}

/// Reel document as stored in the index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelDocument {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback_id: Option<String>,
    pub created_at: i64,
}

/// User profile document as stored in the index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    uid: &'a str,
    #[serde(rename = "primaryKey", skip_serializing_if = "Option::is_none")]
    primary_key: Option<&'a str>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a str>,
}

/// Client for the hosted search index
pub struct SearchClient {
    http: reqwest::Client,
    host: String,
    api_key: String,
}

impl SearchClient {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            host: config.host.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.host)
    }

    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, SearchError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        error!(status = status.as_u16(), %message, "index service error");
        Err(SearchError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Verify the service is reachable
    pub async fn health(&self) -> Result<(), SearchError> {
        let response = self.http.get(self.url("/health")).send().await?;
        self.check(response).await.map(|_| ())
    }

    /// Create an index with an optional primary key
    pub async fn create_index(
        &self,
        index_uid: &str,
        primary_key: Option<&str>,
    ) -> Result<TaskRef, SearchError> {
        info!(index_uid, "creating index");
        let response = self
            .http
            .post(self.url("/indexes"))
            .bearer_auth(&self.api_key)
            .json(&CreateIndexRequest {
                uid: index_uid,
                primary_key,
            })
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }

    /// Add or replace documents in an index
    pub async fn add_documents<T: Serialize>(
        &self,
        index_uid: &str,
        documents: &[T],
    ) -> Result<TaskRef, SearchError> {
        info!(index_uid, count = documents.len(), "adding documents");
        let response = self
            .http
            .post(self.url(&format!("/indexes/{index_uid}/documents")))
            .bearer_auth(&self.api_key)
            .json(documents)
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }

    /// Delete documents from an index by id
    pub async fn delete_documents(
        &self,
        index_uid: &str,
        ids: &[String],
    ) -> Result<TaskRef, SearchError> {
        info!(index_uid, count = ids.len(), "deleting documents");
        let response = self
            .http
            .post(self.url(&format!("/indexes/{index_uid}/documents/delete-batch")))
            .bearer_auth(&self.api_key)
            .json(ids)
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }

    /// Run a search query against an index
    pub async fn search<T: DeserializeOwned>(
        &self,
        query: SearchQuery<'_>,
    ) -> Result<SearchResults<T>, SearchError> {
        info!(index_uid = query.index_uid, q = query.query, "searching index");
        let response = self
            .http
            .post(self.url(&format!("/indexes/{}/search", query.index_uid)))
            .bearer_auth(&self.api_key)
            .json(&SearchRequest {
                q: query.query,
                limit: query.limit,
                offset: query.offset,
                filter: query.filter,
            })
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }

    /// Update an index's searchable, filterable, or sortable attributes
    pub async fn update_attributes(
        &self,
        index_uid: &str,
        kind: AttributeKind,
        attributes: &[&str],
    ) -> Result<TaskRef, SearchError> {
        info!(index_uid, kind = ?kind, "updating index attributes");
        let response = self
            .http
            .put(self.url(&format!(
                "/indexes/{index_uid}/settings/{}",
                kind.settings_path()
            )))
            .bearer_auth(&self.api_key)
            .json(&attributes)
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }
}

/// Create and configure the application's indexes
///
/// Safe to run repeatedly; index creation is idempotent on the vendor
/// side and settings updates simply reapply.
pub async fn bootstrap_indexes(client: &SearchClient) -> Result<(), SearchError> {
    client.create_index(REELS_INDEX, Some("id")).await?;
    client.create_index(USERS_INDEX, Some("id")).await?;

    client
        .update_attributes(REELS_INDEX, AttributeKind::Searchable, &["title"])
        .await?;
    client
        .update_attributes(REELS_INDEX, AttributeKind::Filterable, &["user_id"])
        .await?;
    client
        .update_attributes(REELS_INDEX, AttributeKind::Sortable, &["created_at"])
        .await?;
    client
        .update_attributes(
            USERS_INDEX,
            AttributeKind::Searchable,
            &["username", "display_name"],
        )
        .await?;

    Ok(())
}
