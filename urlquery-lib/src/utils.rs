//! Validation and formatting helpers shared by the API operations.
//!
//! All checks here run before a request is built, so invalid input never
//! reaches the network.

use crate::error::UrlqueryError;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// UUID version 4, variant 1 (8-4-4-4-12 hex), case-insensitive.
    static ref REPORT_ID_RE: Regex = Regex::new(
        r"(?i)^[0-9A-F]{8}-[0-9A-F]{4}-4[0-9A-F]{3}-[89AB][0-9A-F]{3}-[0-9A-F]{12}$"
    )
    .expect("report id pattern is valid");

    static ref TAG_RE: Regex = Regex::new(r"^[a-zA-Z0-9_]+$").expect("tag pattern is valid");
}

/// Validate a report ID.
///
/// # Returns
///
/// `Ok(())` if `report_id` has the UUIDv4 shape, `Err(InvalidReportId)` otherwise.
pub fn validate_report_id(report_id: &str) -> Result<(), UrlqueryError> {
    if REPORT_ID_RE.is_match(report_id) {
        Ok(())
    } else {
        Err(UrlqueryError::invalid_report_id(report_id))
    }
}

/// Reject empty (or whitespace-only) required arguments.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), UrlqueryError> {
    if value.trim().is_empty() {
        return Err(UrlqueryError::invalid_argument(field, "cannot be empty"));
    }
    Ok(())
}

/// Check a single tag against `[a-zA-Z0-9_]+`.
pub fn is_valid_tag(tag: &str) -> bool {
    TAG_RE.is_match(tag)
}

/// Keep only valid tags, trimming surrounding whitespace.
///
/// Invalid tags are dropped with a warning; this never fails.
pub fn filter_tags(tags: &[String]) -> Vec<String> {
    let mut valid = Vec::with_capacity(tags.len());

    for tag in tags {
        let trimmed = tag.trim();
        if is_valid_tag(trimmed) {
            valid.push(trimmed.to_string());
        } else {
            tracing::warn!(
                tag = %tag,
                "Removed invalid tag (tags must be alphanumeric or underscore)"
            );
        }
    }

    valid
}

/// Split a comma-separated tag list as typed on the command line.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.to_string())
        .filter(|t| !t.trim().is_empty())
        .collect()
}

/// Encode an opaque identifier as exactly one URL path segment.
///
/// `/`, `?`, `#` and `%` are percent-encoded; the dot segments `.` and `..`
/// are rejected since they would be collapsed by URL normalization.
pub fn encode_path_segment(field: &str, value: &str) -> Result<String, UrlqueryError> {
    require_non_empty(field, value)?;
    let value = value.trim();
    if value == "." || value == ".." {
        return Err(UrlqueryError::invalid_argument(
            field,
            "cannot be a relative path segment",
        ));
    }
    Ok(urlencoding::encode(value).into_owned())
}

/// Escape a value for use inside a query string (spaces become `+`).
pub fn escape_query(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
