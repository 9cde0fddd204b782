//! Reputation checks for URLs and IP addresses.

use super::API_PREFIX;
use crate::client::UrlqueryClient;
use crate::decode::decode_response;
use crate::error::UrlqueryError;
use crate::types::ReputationResult;
use crate::utils::{escape_query, require_non_empty};
use reqwest::Method;

impl UrlqueryClient {
    /// Look up the reputation verdict for a URL or IP.
    ///
    /// The query is URL-escaped into the query string as-is.
    pub async fn check_reputation(&self, query: &str) -> Result<ReputationResult, UrlqueryError> {
        require_non_empty("reputation query", query)?;

        let path = format!("{}/reputation/check/?query={}", API_PREFIX, escape_query(query));
        let response = self.send(Method::GET, &path, None).await?;

        Ok(decode_response::<ReputationResult>(response)
            .await?
            .unwrap_or_default())
    }
}
