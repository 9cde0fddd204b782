//! Data types exchanged with the urlquery API.
//!
//! Every response shape tolerates missing fields: the service omits empty
//! sections, so all structs derive `Default` and use `#[serde(default)]`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A URL as described by the analysis engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct UrlInfo {
    /// Full address without the scheme, e.g. "example.com/index.html"
    pub addr: String,
    pub schema: String,
    pub fqdn: String,
    pub domain: String,
    pub tld: String,
}

/// IP address with geo and ASN metadata.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct IpInfo {
    pub addr: String,
    #[serde(rename = "cc")]
    pub country_code: String,
    pub country: String,
    pub asn: u64,
    #[serde(rename = "as")]
    pub as_name: String,
}

/// Browser settings the sandbox used for the visit.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ReportSettings {
    pub useragent: String,
    pub referer: String,
}

/// Where the browser ended up after redirects.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct FinalPage {
    pub url: UrlInfo,
    pub title: String,
}

/// Alert counters per detection source.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AlertCount {
    pub urlquery: u64,
    pub ids: u64,
    pub analyzer: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ReportStats {
    pub alert_count: AlertCount,
}

/// Aggregate traffic and alert statistics for one FQDN contacted during analysis.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct DomainSummary {
    pub fqdn: String,
    /// Registration date as reported by the service (free-form date string)
    pub domain_registered: String,
    /// RFC 3339 timestamp
    pub first_seen: String,
    /// RFC 3339 timestamp
    pub last_seen: String,
    pub sent_data: u64,
    pub received_data: u64,
    pub alert_count: u64,
}

/// A single detection raised by one of the sensors.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Alert {
    pub sensor_name: String,
    pub alert: String,
    pub severity: i64,
    pub verdict: String,
    pub comment: String,
    pub timestamp: String,
    pub tags: Vec<String>,
}

/// Alerts attached to one HTTP transaction, grouped by source.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TransactionAlerts {
    pub ids_alerts: Vec<Alert>,
    pub analyzer_alerts: Vec<Alert>,
    pub urlquery_alerts: Vec<Alert>,
}

impl TransactionAlerts {
    pub fn is_empty(&self) -> bool {
        self.ids_alerts.is_empty()
            && self.analyzer_alerts.is_empty()
            && self.urlquery_alerts.is_empty()
    }
}

/// Report-level sensor output.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Sensors {
    pub urlquery_alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct HttpRequest {
    pub method: String,
}

/// Metadata and hashes of a downloaded response body.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ResponseContent {
    pub size: u64,
    pub mime_type: String,
    pub magic: String,
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
    pub sha512: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: String,
    pub content: ResponseContent,
}

/// One request/response pair recorded by the sandbox browser.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct HttpTransaction {
    pub url: UrlInfo,
    pub ip: IpInfo,
    pub request: HttpRequest,
    pub response: HttpResponse,
    /// Milliseconds
    pub total_time_used: u64,
    pub security_state: String,
    pub alerts: TransactionAlerts,
}

/// Result of a sandboxed URL analysis.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Report {
    #[serde(rename = "report_id")]
    pub id: String,
    pub date: String,
    pub url: UrlInfo,
    pub ip: IpInfo,
    #[serde(rename = "final")]
    pub final_page: FinalPage,
    pub tags: Vec<String>,
    pub settings: ReportSettings,
    pub stats: ReportStats,
    pub summary: Vec<DomainSummary>,
    pub http_transactions: Vec<HttpTransaction>,
    pub sensors: Sensors,
}

/// A fetched report together with the exact body the API returned.
///
/// The raw bytes are kept so the CLI can write the report to disk unchanged.
#[derive(Debug, Clone, Default)]
pub struct ReportDocument {
    pub report: Report,
    pub raw: Vec<u8>,
}

/// Paged search result.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SearchResponse {
    pub query: String,
    pub total_hits: u64,
    pub limit: u64,
    pub offset: u64,
    pub reports: Vec<Report>,
}

/// Known reputation verdicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Malicious,
    Suspicious,
    Benign,
    Unknown,
    /// Any verdict this client does not recognize
    Other(String),
}

impl From<&str> for Verdict {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "malicious" => Verdict::Malicious,
            "suspicious" => Verdict::Suspicious,
            "benign" => Verdict::Benign,
            "" | "unknown" => Verdict::Unknown,
            other => Verdict::Other(other.to_string()),
        }
    }
}

/// Details of the reputation entry that produced a verdict.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ReputationEntry {
    pub timestamp: String,
    pub url: UrlInfo,
    pub verdict: String,
    pub phishing_target: String,
    pub malware_family: String,
    pub alert: String,
    pub tags: Vec<String>,
    pub report_id: String,
}

/// Outcome of a reputation check.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ReputationResult {
    pub url: String,
    pub verdict: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ReputationEntry>,
}

impl ReputationResult {
    pub fn verdict_kind(&self) -> Verdict {
        Verdict::from(self.verdict.as_str())
    }
}

/// Visibility of a submitted report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    #[default]
    Public,
    Restricted,
    Private,
}

impl Access {
    /// Parse an access level, returning `None` for anything unrecognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "public" => Some(Access::Public),
            "restricted" => Some(Access::Restricted),
            "private" => Some(Access::Private),
            _ => None,
        }
    }

    /// Parse an access level, silently falling back to `Public`.
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Restricted => "restricted",
            Access::Private => "private",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Default browser user agent used by the sandbox when none is given.
pub const DEFAULT_SUBMIT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:138.0) Gecko/20100101 Firefox/138.0";

/// A URL submission request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmitJob {
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub useragent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
    #[serde(default)]
    pub access: Access,
}

impl SubmitJob {
    /// Create a public submission for `url` with no tags.
    pub fn new<U: Into<String>>(url: U) -> Self {
        Self {
            url: url.into(),
            tags: Vec::new(),
            useragent: None,
            referer: None,
            access: Access::Public,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_useragent<S: Into<String>>(mut self, useragent: S) -> Self {
        self.useragent = Some(useragent.into());
        self
    }

    pub fn with_referer<S: Into<String>>(mut self, referer: S) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Set the access level from free text; unknown values become `public`.
    pub fn with_access(mut self, access: &str) -> Self {
        self.access = Access::parse_or_default(access);
        self
    }
}

/// Processing state of a queued submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Processing,
    Analyzing,
    Done,
    Other(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done)
    }
}

impl From<&str> for JobStatus {
    fn from(value: &str) -> Self {
        match value {
            "queued" => JobStatus::Queued,
            "processing" => JobStatus::Processing,
            "analyzing" => JobStatus::Analyzing,
            "done" => JobStatus::Done,
            other => JobStatus::Other(other.to_string()),
        }
    }
}

/// A submission as tracked by the service queue.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct QueuedJob {
    pub queue_id: String,
    /// Empty until processing has finished
    pub report_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<UrlInfo>,
}

impl QueuedJob {
    pub fn state(&self) -> JobStatus {
        JobStatus::from(self.status.as_str())
    }

    pub fn is_done(&self) -> bool {
        self.state().is_terminal()
    }
}
