//! Report retrieval.
//!
//! All operations here take a report ID and reject anything that is not a
//! UUIDv4 before a request is built.

use super::API_PREFIX;
use crate::client::UrlqueryClient;
use crate::decode::{decode_json, read_body};
use crate::error::UrlqueryError;
use crate::types::{Report, ReportDocument};
use crate::utils::{encode_path_segment, validate_report_id};
use reqwest::Method;

impl UrlqueryClient {
    /// Fetch the full JSON report.
    ///
    /// The returned document holds both the parsed [`Report`] and the exact
    /// body bytes (after gzip inflation), so callers can persist the report
    /// unchanged.
    ///
    /// # Errors
    ///
    /// - `InvalidReportId` if `report_id` is not a UUIDv4 (no request is made)
    /// - `Api` for non-success statuses
    /// - `Decode` if the body is not valid report JSON
    pub async fn get_report(&self, report_id: &str) -> Result<ReportDocument, UrlqueryError> {
        validate_report_id(report_id)?;

        let path = format!("{}/report/{}", API_PREFIX, report_id);
        let response = self.send(Method::GET, &path, None).await?;
        let raw = read_body(response).await?;
        let report: Report = decode_json(&raw)?.unwrap_or_default();

        Ok(ReportDocument { report, raw })
    }

    /// Download the PNG screenshot taken during analysis.
    pub async fn get_screenshot(&self, report_id: &str) -> Result<Vec<u8>, UrlqueryError> {
        validate_report_id(report_id)?;

        let path = format!("{}/report/{}/screenshot", API_PREFIX, report_id);
        self.fetch_bytes(&path).await
    }

    /// Download the domain relationship graph image.
    pub async fn get_domain_graph(&self, report_id: &str) -> Result<Vec<u8>, UrlqueryError> {
        validate_report_id(report_id)?;

        let path = format!("{}/report/{}/domain_graph", API_PREFIX, report_id);
        self.fetch_bytes(&path).await
    }

    /// Download a single resource captured during analysis, addressed by hash.
    pub async fn get_resource(&self, report_id: &str, hash: &str) -> Result<Vec<u8>, UrlqueryError> {
        validate_report_id(report_id)?;
        let hash = encode_path_segment("resource hash", hash)?;

        let path = format!("{}/report/{}/resource/{}", API_PREFIX, report_id, hash);
        self.fetch_bytes(&path).await
    }

    async fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, UrlqueryError> {
        let response = self.send(Method::GET, path, None).await?;
        read_body(response).await
    }
}
