//! urlquery public API operations.
//!
//! Each submodule adds methods to [`UrlqueryClient`](crate::UrlqueryClient)
//! for one resource family. Operations validate their input, build the path,
//! execute the request and decode the response.

/// Reports and report artifacts (screenshot, domain graph, resources)
pub mod report;

/// URL / IP reputation checks
pub mod reputation;

/// Report search
pub mod search;

/// URL submission and queue status
pub mod submit;

pub use search::SearchParams;

/// Path prefix shared by every public endpoint.
pub(crate) const API_PREFIX: &str = "/public/v1";
