//! Fetch outcome classification
//!
//! | Result                         | Outcome           |
//! |--------------------------------|-------------------|
//! | 2xx, 3xx                       | Success           |
//! | 429, 5xx                       | Retryable failure |
//! | other 4xx                      | Terminal failure  |
//! | any other status               | Retryable failure |
//! | transport error (any kind)     | Retryable failure |

use crate::crawler::fetcher::{FetchResponse, TransportError};

/// How a fetch attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchOutcome {
    Success,
    RetryableFailure,
    TerminalFailure,
}

/// Classifies an HTTP status code
pub fn classify_status(status: u16) -> FetchOutcome {
    match status {
        200..=399 => FetchOutcome::Success,
        429 => FetchOutcome::RetryableFailure,
        400..=499 => FetchOutcome::TerminalFailure,
        500..=599 => FetchOutcome::RetryableFailure,
        _ => FetchOutcome::RetryableFailure,
    }
}

/// Classifies the result of a fetch attempt
pub fn classify(result: &Result<FetchResponse, TransportError>) -> FetchOutcome {
    match result {
        Ok(response) => classify_status(response.status),
        Err(_) => FetchOutcome::RetryableFailure,
    }
}

/// True if a stored status code means the URL must not be retried
pub fn is_terminal_status(status: Option<u16>) -> bool {
    status.map_or(false, |s| classify_status(s) == FetchOutcome::TerminalFailure)
}
