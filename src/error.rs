//! Unified error hierarchy for the readiness engine
//!
//! Every failure in the engine is recoverable at the call boundary: either a
//! validation rejection of bad caller input, or an explicit insufficient-data
//! signal. There is no fatal error class; missing upstream data degrades to
//! empty results in the component contracts, not to errors here.

use thiserror::Error;

/// Top-level error type for all engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// Caller supplied an out-of-range or inconsistent value
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Workout matching errors
    #[error("Match error: {0}")]
    Match(#[from] MatchError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors (config load/save, CLI fixtures)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON input at the CLI boundary
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Input validation errors
///
/// Out-of-range values are rejected rather than clamped; silent clamping
/// would mask bad upstream data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Slider value outside the 1-5 scale
    #[error("Invalid {slider} value: {value} (valid range: 1-5)")]
    SliderOutOfRange { slider: &'static str, value: u8 },

    /// Session duration must be positive
    #[error("Invalid session duration: {minutes} minutes")]
    InvalidDuration { minutes: u32 },

    /// Intensity outside the 1-5 scale
    #[error("Invalid intensity: {value} (valid range: 1-5)")]
    InvalidIntensity { value: u8 },

    /// Wearable score outside the 0-100 scale
    #[error("Invalid {field} value: {value} (valid range: 0-100)")]
    ScoreOutOfRange { field: &'static str, value: u8 },
}

/// Workout matching errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// Candidate workout interval ends before it starts
    #[error("Candidate workout {id} has an invalid interval")]
    InvalidCandidateInterval { id: String },
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EngineError::Validation(_) => ErrorSeverity::Warning,
            EngineError::Match(_) => ErrorSeverity::Warning,
            EngineError::Configuration(_) => ErrorSeverity::Error,
            EngineError::Io(_) => ErrorSeverity::Error,
            EngineError::Json(_) => ErrorSeverity::Warning,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            EngineError::Validation(ValidationError::SliderOutOfRange { slider, .. }) => {
                format!("Please pick a {} value between 1 and 5.", slider)
            }
            EngineError::Validation(ValidationError::InvalidDuration { .. }) => {
                "Session duration must be at least one minute.".to_string()
            }
            EngineError::Configuration(_) => {
                "Engine configuration could not be loaded. Please check your config file."
                    .to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the operation but the caller can continue
    Error,
    /// Rejected input or degraded evaluation; nothing is broken
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
