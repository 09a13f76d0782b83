//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Data errors abort the current analysis run; insight-service errors are
//! scoped to the narrative panel and never take the dashboard down with them.
//!
//! ## Error Groups
//!
//! - **Data**: Schema / Parse / EmptyDataset / InsufficientData. Structural
//!   problems with the uploaded file, fatal for the current run
//! - **Insight service**: Network / Auth / RateLimit / Timeout / Api.
//!   Failures of the text-generation call, recoverable by re-invocation
//! - **Ambient**: Io / Csv / Spreadsheet / Json / Config

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Categories for insight-service failures, used for retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connectivity or transient server failure - retry with backoff
    Network,
    /// Missing or invalid credential - fail fast, never retry
    Auth,
    /// Service asked us to slow down - surface so the caller can back off
    RateLimit,
    /// Bounded timeout expired - caller may re-invoke
    Timeout,
    /// Request rejected or response unusable - fix the request, don't retry
    Api,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network => write!(f, "NETWORK"),
            Self::Auth => write!(f, "AUTH"),
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Api => write!(f, "API"),
        }
    }
}

impl ErrorCategory {
    /// Whether the composer may transparently retry this category
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum LensError {
    // -------------------------------------------------------------------------
    // Data Errors
    // -------------------------------------------------------------------------
    #[error("required column '{column}' not found in input")]
    Schema { column: String },

    #[error("could not parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("dataset contains no usable transactions")]
    EmptyDataset,

    #[error("anomaly scoring needs at least {required} weeks of data, got {actual}")]
    InsufficientData { actual: usize, required: usize },

    // -------------------------------------------------------------------------
    // Insight Service Errors
    // -------------------------------------------------------------------------
    #[error("network error calling {provider}: {message}")]
    Network { provider: String, message: String },

    #[error("authentication failed for {provider}: {message}")]
    Auth { provider: String, message: String },

    #[error("rate limited by {provider}")]
    RateLimit {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    #[error("{provider} API error: {message}")]
    Api { provider: String, message: String },

    // -------------------------------------------------------------------------
    // Ambient Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LensError>;

// =============================================================================
// Helper Constructors
// =============================================================================

impl LensError {
    /// Create a schema error naming the missing column
    pub fn schema(column: impl Into<String>) -> Self {
        Self::Schema {
            column: column.into(),
        }
    }

    /// Create a file-level parse error
    pub fn parse(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Create a network error with provider context
    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an auth error with provider context
    pub fn auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Auth {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a rate-limit error, with the service's suggested delay when known
    pub fn rate_limit(provider: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self::RateLimit {
            provider: provider.into(),
            retry_after,
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create an out-of-taxonomy API error
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Category of an insight-service error, `None` for data/ambient errors
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Network { .. } => Some(ErrorCategory::Network),
            Self::Auth { .. } => Some(ErrorCategory::Auth),
            Self::RateLimit { .. } => Some(ErrorCategory::RateLimit),
            Self::Timeout { .. } => Some(ErrorCategory::Timeout),
            Self::Api { .. } => Some(ErrorCategory::Api),
            _ => None,
        }
    }

    /// Whether this error is scoped to the insight panel: the KPI, chart and
    /// ranking panels must keep rendering when it occurs
    pub fn is_insight_scoped(&self) -> bool {
        self.category().is_some()
    }

    /// Whether the composer may transparently retry after this error
    pub fn is_retryable(&self) -> bool {
        self.category().is_some_and(|c| c.is_retryable())
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps HTTP statuses and reqwest transport failures onto the taxonomy
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an HTTP error status returned by a text-generation service
    pub fn classify_status(provider: &str, status: u16, body: &str) -> LensError {
        match status {
            401 | 403 => LensError::auth(provider, format!("HTTP {status}: {}", excerpt(body))),
            429 => LensError::rate_limit(provider, parse_retry_after(body)),
            500..=599 => {
                LensError::network(provider, format!("HTTP {status}: {}", excerpt(body)))
            }
            _ => LensError::api(provider, format!("HTTP {status}: {}", excerpt(body))),
        }
    }

    /// Classify a reqwest transport error (no HTTP status available)
    pub fn classify_transport(provider: &str, err: &reqwest::Error) -> LensError {
        if err.is_timeout() {
            LensError::network(provider, format!("request timed out: {err}"))
        } else if err.is_decode() {
            LensError::api(provider, format!("unreadable response: {err}"))
        } else {
            LensError::network(provider, err.to_string())
        }
    }
}

/// Parse a suggested retry delay out of a rate-limit response body.
///
/// Handles the Gemini `"retryDelay": "58s"` field and the generic
/// "retry after N seconds" phrasing. Capped at 5 minutes.
pub fn parse_retry_after(body: &str) -> Option<Duration> {
    let lower = body.to_lowercase();

    // Gemini RetryInfo: "retrydelay": "58s"
    if let Some(idx) = lower.find("retrydelay") {
        let digits: String = lower[idx..]
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if let Ok(secs) = digits.parse::<u64>() {
            return Some(Duration::from_secs(secs.min(300)));
        }
    }

    // Generic: "retry after 30 seconds", "retry-after: 30"
    if let Some(idx) = lower.find("retry") {
        for word in lower[idx..].split(|c: char| !c.is_ascii_digit()) {
            if !word.is_empty()
                && let Ok(secs) = word.parse::<u64>()
            {
                return Some(Duration::from_secs(secs.min(300)));
            }
        }
    }

    None
}

/// First line of a response body, truncated for error messages
fn excerpt(body: &str) -> &str {
    let line = body.lines().next().unwrap_or("");
    let end = line
        .char_indices()
        .nth(200)
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    &line[..end]
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Network.to_string(), "NETWORK");
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
    }

    #[test]
    fn test_category_retryable() {
        assert!(ErrorCategory::Network.is_retryable());
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::RateLimit.is_retryable());
        assert!(!ErrorCategory::Timeout.is_retryable());
        assert!(!ErrorCategory::Api.is_retryable());
    }

    #[test]
    fn test_schema_error_names_column() {
        let err = LensError::schema("UnitPrice");
        assert_eq!(
            err.to_string(),
            "required column 'UnitPrice' not found in input"
        );
    }

    #[test]
    fn test_classify_auth_statuses() {
        for status in [401, 403] {
            let err = ErrorClassifier::classify_status("gemini", status, "denied");
            assert!(matches!(err, LensError::Auth { .. }), "status {status}");
            assert!(!err.is_retryable());
            assert!(err.is_insight_scoped());
        }
    }

    #[test]
    fn test_classify_rate_limit_with_delay() {
        let body = r#"{"error": {"details": [{"retryDelay": "58s"}]}}"#;
        let err = ErrorClassifier::classify_status("gemini", 429, body);
        match err {
            LensError::RateLimit { retry_after, .. } => {
                assert_eq!(retry_after, Some(Duration::from_secs(58)));
            }
            other => panic!("expected RateLimit, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_server_error_is_retryable_network() {
        let err = ErrorClassifier::classify_status("openai", 503, "overloaded");
        assert!(matches!(err, LensError::Network { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_classify_bad_request_is_api() {
        let err = ErrorClassifier::classify_status("gemini", 400, "bad field");
        assert!(matches!(err, LensError::Api { .. }));
        assert!(!err.is_retryable());
        assert!(err.is_insight_scoped());
    }

    #[test]
    fn test_data_errors_are_not_insight_scoped() {
        assert!(!LensError::EmptyDataset.is_insight_scoped());
        assert!(!LensError::schema("Quantity").is_insight_scoped());
        assert!(
            !LensError::InsufficientData {
                actual: 1,
                required: 2
            }
            .is_insight_scoped()
        );
    }

    #[test]
    fn test_parse_retry_after_phrases() {
        assert_eq!(
            parse_retry_after("Please retry after 30 seconds."),
            Some(Duration::from_secs(30))
        );
        assert_eq!(
            parse_retry_after("retry-after: 60"),
            Some(Duration::from_secs(60))
        );
        // Capped at 5 minutes
        assert_eq!(
            parse_retry_after("retry after 1000 seconds"),
            Some(Duration::from_secs(300))
        );
        assert_eq!(parse_retry_after("quota exceeded"), None);
    }

    #[test]
    fn test_excerpt_truncates_first_line() {
        let long = "a".repeat(500);
        assert_eq!(excerpt(&long).len(), 200);
        assert_eq!(excerpt("first\nsecond"), "first");
        assert_eq!(excerpt(""), "");
    }
}
