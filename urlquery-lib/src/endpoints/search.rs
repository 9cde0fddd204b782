//! Report search.

use super::API_PREFIX;
use crate::client::UrlqueryClient;
use crate::decode::decode_response;
use crate::error::UrlqueryError;
use crate::types::SearchResponse;
use crate::utils::{escape_query, require_non_empty};
use reqwest::Method;

/// Default page size used by the service and the CLI.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Search query with paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    pub limit: u32,
    pub offset: u32,
}

impl SearchParams {
    pub fn new<Q: Into<String>>(query: Q) -> Self {
        Self {
            query: query.into(),
            limit: DEFAULT_SEARCH_LIMIT,
            offset: 0,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Path and query string for this search.
    pub(crate) fn to_path(&self) -> String {
        format!(
            "{}/search/reports/?query={}&limit={}&offset={}",
            API_PREFIX,
            escape_query(&self.query),
            self.limit,
            self.offset
        )
    }
}

impl UrlqueryClient {
    /// Search public reports.
    ///
    /// See <https://urlquery.net/help/search> for the query syntax.
    pub async fn search(&self, params: &SearchParams) -> Result<SearchResponse, UrlqueryError> {
        require_non_empty("search query", &params.query)?;

        let response = self.send(Method::GET, &params.to_path(), None).await?;

        Ok(decode_response::<SearchResponse>(response)
            .await?
            .unwrap_or_default())
    }
}
