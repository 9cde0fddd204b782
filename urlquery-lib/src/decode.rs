//! Response classification and body decoding.
//!
//! Every API call goes through the same steps: map the HTTP status to an
//! error (or success), pick a body strategy from `Content-Encoding`, then
//! either hand back the bytes or deserialize them.

use crate::error::{ApiErrorKind, UrlqueryError};
use flate2::read::GzDecoder;
use reqwest::header::{HeaderMap, CONTENT_ENCODING};
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::io::Read;

/// Map an HTTP status code to `Ok(())` or the matching API error.
pub fn check_status(status: u16) -> Result<(), UrlqueryError> {
    let kind = match status {
        200 | 201 | 202 | 204 => return Ok(()),
        400 => ApiErrorKind::BadRequest,
        401 => ApiErrorKind::Unauthorized,
        403 => ApiErrorKind::Forbidden,
        404 => ApiErrorKind::NotFound,
        406 => ApiErrorKind::NotAcceptable,
        422 => ApiErrorKind::UnprocessableEntity,
        429 => ApiErrorKind::TooManyRequests,
        500 => ApiErrorKind::InternalServerError,
        502 => ApiErrorKind::BadGateway,
        503 => ApiErrorKind::ServiceUnavailable,
        504 => ApiErrorKind::GatewayTimeout,
        500..=599 => ApiErrorKind::ServerError,
        _ => ApiErrorKind::UnexpectedStatus,
    };

    Err(UrlqueryError::api(kind, status))
}

/// How the response body is encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Identity,
    Gzip,
}

impl BodyEncoding {
    /// Select the strategy from the `Content-Encoding` header.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match headers.get(CONTENT_ENCODING).and_then(|v| v.to_str().ok()) {
            Some(value) if value.trim().eq_ignore_ascii_case("gzip") => BodyEncoding::Gzip,
            _ => BodyEncoding::Identity,
        }
    }

    /// Turn wire bytes into plain bytes.
    pub fn decode(self, raw: Vec<u8>) -> Result<Vec<u8>, UrlqueryError> {
        match self {
            BodyEncoding::Identity => Ok(raw),
            BodyEncoding::Gzip => {
                if raw.is_empty() {
                    return Ok(raw);
                }
                let mut decoder = GzDecoder::new(raw.as_slice());
                let mut inflated = Vec::new();
                decoder
                    .read_to_end(&mut inflated)
                    .map_err(|e| UrlqueryError::decode(format!("Gzip decompression failed: {}", e)))?;
                Ok(inflated)
            }
        }
    }
}

/// Deserialize a plain JSON body.
///
/// An empty body yields `Ok(None)`. On malformed JSON nothing is returned
/// besides the error.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>, UrlqueryError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(None);
    }
    let value = serde_json::from_slice(body)?;
    Ok(Some(value))
}

/// Check the status and return the (inflated) body bytes.
pub async fn read_body(response: Response) -> Result<Vec<u8>, UrlqueryError> {
    check_status(response.status().as_u16())?;

    let encoding = BodyEncoding::from_headers(response.headers());
    let raw = response.bytes().await.map_err(UrlqueryError::from)?;

    encoding.decode(raw.to_vec())
}

/// Check the status and deserialize the body into `T`.
pub async fn decode_response<T: DeserializeOwned>(
    response: Response,
) -> Result<Option<T>, UrlqueryError> {
    let body = read_body(response).await?;
    decode_json(&body)
}
