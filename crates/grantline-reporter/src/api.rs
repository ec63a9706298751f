//! RePORTER search API client

use grantline_core::HttpError;

use crate::error::FetchError;
use crate::plan::{MAX_PAGE_LIMIT, PageRequest};
use crate::schema::{SearchPage, SearchRequest, decode_response};

/// Project search endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.reporter.nih.gov/v2/projects/search";

/// Transport for search requests.
///
/// Implementors only move bytes; limit checks and response validation live
/// in the provided [`SearchApi::fetch`] so every transport gets them.
pub trait SearchApi {
    /// Send one search body, returning the raw response body
    fn post(&mut self, body: &SearchRequest) -> Result<Vec<u8>, HttpError>;

    /// Fetch and decode one page. Exactly one `post` per call; no retry.
    fn fetch(&mut self, request: &PageRequest) -> Result<SearchPage, FetchError> {
        check_limit(request.limit)?;
        let body = self.post(&SearchRequest::from(request))?;
        Ok(decode_response(&body)?)
    }
}

/// Reject pages larger than the API ceiling
pub fn check_limit(limit: u32) -> Result<(), FetchError> {
    if limit > MAX_PAGE_LIMIT {
        return Err(FetchError::InvalidLimit {
            limit,
            max: MAX_PAGE_LIMIT,
        });
    }
    Ok(())
}

/// HTTP transport over the shared client
#[derive(Debug, Clone)]
pub struct ReporterClient {
    endpoint: String,
}

impl ReporterClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for ReporterClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl SearchApi for ReporterClient {
    fn post(&mut self, body: &SearchRequest) -> Result<Vec<u8>, HttpError> {
        log::debug!(
            "POST {} offset={} limit={}",
            self.endpoint,
            body.offset,
            body.limit
        );
        grantline_core::http::post_json(&self.endpoint, body)
    }
}
