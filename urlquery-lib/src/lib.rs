//! # urlquery Library
//!
//! Client for the urlquery.net public API: submit URLs for sandbox analysis,
//! follow the submission queue, and fetch reports, screenshots, domain graphs,
//! captured resources, reputation verdicts and search results.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use urlquery_lib::{api_key, UrlqueryClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = UrlqueryClient::with_options([api_key("my-api-key")])?;
//!     let result = client.check_reputation("http://example.com").await?;
//!
//!     println!("{} - {}", result.url, result.verdict);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Typed errors**: every HTTP status the API documents maps to an error kind
//! - **Gzip-aware decoding**: compressed bodies are inflated transparently
//! - **Raw report bytes**: reports keep the exact body for saving to disk
//! - **Bounded polling**: wait for a submission with limits and cancellation

// Re-export main public API types and functions
pub use client::{
    api_key, base_url, default_user_agent, ClientConfig, ClientOption, UrlqueryClient,
    API_KEY_HEADER, DEFAULT_BASE_URL, DEFAULT_TIMEOUT,
};
pub use config::{
    default_config_path, load_env_config, mask_secret, ConfigKey, ConfigManager, EnvConfig,
    FileConfig,
};
pub use decode::{check_status, decode_json, BodyEncoding};
pub use endpoints::search::DEFAULT_SEARCH_LIMIT;
pub use endpoints::SearchParams;
pub use error::{ApiErrorKind, UrlqueryError};
pub use poll::{poll_until_done, PollConfig, QueueStatusSource};
pub use types::{
    Access, Alert, AlertCount, DomainSummary, FinalPage, HttpRequest, HttpResponse,
    HttpTransaction, IpInfo, JobStatus, QueuedJob, Report, ReportDocument, ReportSettings,
    ReportStats, ReputationEntry, ReputationResult, ResponseContent, SearchResponse, Sensors,
    SubmitJob, TransactionAlerts, UrlInfo, Verdict, DEFAULT_SUBMIT_USER_AGENT,
};
pub use utils::{
    encode_path_segment, escape_query, filter_tags, is_valid_tag, split_tags, validate_report_id,
};

// Re-export for callers driving the poll loop
pub use tokio_util::sync::CancellationToken;

mod client;
mod config;
mod decode;
mod endpoints;
mod error;
mod poll;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, UrlqueryError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");

/// Public web front-end, used for links shown to users.
pub const WEB_BASE_URL: &str = "https://urlquery.net";

/// Link to the web view of a finished report.
pub fn report_url(report_id: &str) -> String {
    format!("{}/report/{}", WEB_BASE_URL, report_id)
}

/// Link to the web view of a queued submission.
pub fn queue_url(queue_id: &str) -> String {
    format!("{}/queue/{}", WEB_BASE_URL, queue_id)
}

/// Get library information for debugging or display purposes.
pub fn info() -> LibraryInfo {
    LibraryInfo {
        version: VERSION,
        author: AUTHOR,
        api_base_url: DEFAULT_BASE_URL,
    }
}

/// Information about the library build
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub version: &'static str,
    pub author: &'static str,
    pub api_base_url: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_links() {
        assert_eq!(
            report_url("82c4121d-d037-4d60-9f74-517bf00091ce"),
            "https://urlquery.net/report/82c4121d-d037-4d60-9f74-517bf00091ce"
        );
        assert_eq!(queue_url("q-1"), "https://urlquery.net/queue/q-1");
    }

    #[test]
    fn test_info() {
        let info = info();
        assert_eq!(info.version, VERSION);
        assert_eq!(info.author, "urlquery-cli contributors");
        assert_eq!(info.api_base_url, "https://api.urlquery.net");
    }
}
