//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum that maps to HTTP status codes.

use serde::Serialize;

/// Error classification shared across crates.
///
/// Each variant corresponds to exactly one HTTP status code.
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::Gone;
/// assert_eq!(kind.status_code(), 410);
/// assert_eq!(kind.as_str(), "Gone");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 404 - no such resource or route
    NotFound,
    /// 410 - resource existed but is used up
    Gone,
    /// 429 - caller must wait before retrying
    TooManyRequests,
    /// 500 - bug or unexpected state
    InternalServerError,
    /// 503 - a backing service failed; safe to retry
    ServiceUnavailable,
}

impl ErrorKind {
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Gone => 410,
            ErrorKind::TooManyRequests => 429,
            ErrorKind::InternalServerError => 500,
            ErrorKind::ServiceUnavailable => 503,
        }
    }

    /// Standard reason phrase for the status code
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Gone => "Gone",
            ErrorKind::TooManyRequests => "Too Many Requests",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// 5xx errors are infrastructure failures and get logged at error level.
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Whether the client may retry the same request later and expect a
    /// different outcome.
    #[inline]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::TooManyRequests | ErrorKind::ServiceUnavailable
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::Gone.status_code(), 410);
        assert_eq!(ErrorKind::TooManyRequests.status_code(), 429);
        assert_eq!(ErrorKind::InternalServerError.status_code(), 500);
        assert_eq!(ErrorKind::ServiceUnavailable.status_code(), 503);
    }

    #[test]
    fn test_exhaustion_is_not_retryable() {
        assert!(!ErrorKind::Gone.is_retryable());
        assert!(ErrorKind::TooManyRequests.is_retryable());
        assert!(ErrorKind::ServiceUnavailable.is_retryable());
    }

    #[test]
    fn test_is_server_error() {
        assert!(!ErrorKind::Gone.is_server_error());
        assert!(!ErrorKind::TooManyRequests.is_server_error());
        assert!(ErrorKind::ServiceUnavailable.is_server_error());
    }

    #[test]
    fn test_serialize_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorKind::TooManyRequests).unwrap();
        assert_eq!(json, r#""TOO_MANY_REQUESTS""#);
    }
}
