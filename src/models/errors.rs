//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so that batch error records,
//! API responses and logs can be correlated.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - CLASSIFY_xxx: engine input errors
//! - PROVIDER_xxx: market data provider errors
//! - REGISTRY_xxx: scam registry persistence errors
//! - CFG_xxx: configuration errors
//! - API_xxx: API errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Classification Errors
    // ============================================
    /// Identifier resolves to no known project
    NotFound,
    /// Payload present but the rank fact cannot be resolved
    DataIncomplete,

    // ============================================
    // Provider Errors
    // ============================================
    /// Transport-level request failure
    ProviderRequestFailed,
    /// Provider answered HTTP 429
    ProviderRateLimited,
    /// Provider request timed out
    ProviderTimeout,
    /// Provider body could not be decoded
    ProviderInvalidResponse,

    // ============================================
    // Registry Errors
    // ============================================
    /// Registry document could not be read or parsed
    RegistryLoadFailed,
    /// Registry document could not be written
    RegistryStoreFailed,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,
    /// Weights that do not sum to 1.0 or are negative
    ConfigInvalidWeights,

    // ============================================
    // API Errors
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,

    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "CLASSIFY_NOT_FOUND",
            Self::DataIncomplete => "CLASSIFY_DATA_INCOMPLETE",

            Self::ProviderRequestFailed => "PROVIDER_REQUEST_FAILED",
            Self::ProviderRateLimited => "PROVIDER_RATE_LIMITED",
            Self::ProviderTimeout => "PROVIDER_TIMEOUT",
            Self::ProviderInvalidResponse => "PROVIDER_INVALID_RESPONSE",

            Self::RegistryLoadFailed => "REGISTRY_LOAD_FAILED",
            Self::RegistryStoreFailed => "REGISTRY_STORE_FAILED",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::ConfigInvalidWeights => "CFG_INVALID_WEIGHTS",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest | Self::ConfigInvalidValue | Self::ConfigInvalidWeights => 400,
            Self::NotFound => 404,
            Self::DataIncomplete => 422,
            Self::ApiRateLimited => 429,
            Self::ProviderRequestFailed
            | Self::ProviderRateLimited
            | Self::ProviderInvalidResponse => 502,
            Self::ProviderTimeout => 504,
            _ => 500,
        }
    }

    /// Check if error is retryable (by the data provider, never by the engine)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderRequestFailed | Self::ProviderRateLimited | Self::ProviderTimeout
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Identifier unknown to the provider
    pub fn not_found(identifier: &str) -> Self {
        Self::new(
            ErrorCode::NotFound,
            format!("Project '{}' not found", identifier),
        )
    }

    /// Rank missing from the payload
    pub fn data_incomplete(identifier: &str) -> Self {
        Self::new(
            ErrorCode::DataIncomplete,
            format!(
                "Missing market cap rank for '{}' - incomplete data",
                identifier
            ),
        )
    }

    /// Provider rate limited
    pub fn rate_limited(attempts: u32) -> Self {
        Self::new(
            ErrorCode::ProviderRateLimited,
            format!("Rate limited (HTTP 429) after {} attempts", attempts),
        )
    }

    /// Provider request failed
    pub fn provider_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProviderRequestFailed, msg)
    }

    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    /// Invalid weight table
    pub fn invalid_weights(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidWeights, msg)
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::ProviderTimeout, "Request timeout")
        } else if err.is_decode() {
            Self::with_source(ErrorCode::ProviderInvalidResponse, "Invalid response body", err)
        } else {
            Self::new(ErrorCode::ProviderRequestFailed, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::ProviderInvalidResponse, "JSON parse error", err)
    }
}
