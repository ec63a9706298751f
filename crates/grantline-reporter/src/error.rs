//! Error types for page fetching and partition planning

use grantline_core::HttpError;

use crate::plan::{MAX_RESULT_WINDOW, SearchCriteria};
use crate::schema::DecodeError;

/// Error from fetching or persisting a single page.
///
/// Everything except [`FetchError::InvalidLimit`] is recoverable at page
/// granularity: the page file stays absent and the next run retries it.
#[derive(Debug)]
pub enum FetchError {
    /// Requested page is larger than the API allows; raised before any I/O
    InvalidLimit { limit: u32, max: u32 },
    Http(HttpError),
    Decode(DecodeError),
    Io(std::io::Error),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLimit { limit, max } => {
                write!(f, "page limit {limit} exceeds maximum of {max}")
            }
            Self::Http(e) => write!(f, "{e}"),
            Self::Decode(e) => write!(f, "validation failed: {e}"),
            Self::Io(e) => write!(f, "IO: {e}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidLimit { .. } => None,
            Self::Http(e) => Some(e),
            Self::Decode(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl FetchError {
    /// Whether the whole run must stop rather than skip this page
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidLimit { .. })
    }
}

impl From<HttpError> for FetchError {
    fn from(e: HttpError) -> Self {
        Self::Http(e)
    }
}

impl From<DecodeError> for FetchError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// A partition holds more records than offset paging can reach.
#[derive(Debug)]
pub struct PaginationLimitExceeded {
    pub criteria: SearchCriteria,
    pub total: u64,
}

impl std::fmt::Display for PaginationLimitExceeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "State {} exceeds pagination limit for {}, got {} (max {MAX_RESULT_WINDOW})",
            self.criteria.state, self.criteria.chunk, self.total
        )
    }
}

impl std::error::Error for PaginationLimitExceeded {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::YearChunk;
    use std::io::ErrorKind;

    #[test]
    fn only_invalid_limit_is_fatal() {
        assert!(FetchError::InvalidLimit { limit: 501, max: 500 }.is_fatal());
        let http = FetchError::Http(HttpError::Http {
            status: Some(503),
            message: "unavailable".to_string(),
        });
        assert!(!http.is_fatal());
        assert!(!FetchError::Io(std::io::Error::new(ErrorKind::StorageFull, "full")).is_fatal());
    }

    #[test]
    fn display_invalid_limit() {
        let err = FetchError::InvalidLimit { limit: 501, max: 500 };
        assert_eq!(err.to_string(), "page limit 501 exceeds maximum of 500");
    }

    #[test]
    fn display_io_prefix() {
        let err = FetchError::from(std::io::Error::new(ErrorKind::NotFound, "gone"));
        assert!(err.to_string().starts_with("IO:"));
    }

    #[test]
    fn display_pagination_limit() {
        let err = PaginationLimitExceeded {
            criteria: SearchCriteria {
                state: "CA",
                chunk: YearChunk {
                    year: 2025,
                    is_final: false,
                },
            },
            total: 15_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("State CA exceeds pagination limit"));
        assert!(msg.contains("15000"));
    }
}
