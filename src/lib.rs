// Library interface for the readyrs engine modules
// This allows integration tests to access the core functionality

pub mod api;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod matching;
pub mod models;
pub mod readiness;
pub mod reconcile;
pub mod rules;
pub mod session_score;

// Re-export commonly used types for convenience
pub use models::*;
pub use api::Engine;
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use matching::{MatchResult, WorkoutCandidate, WorkoutMatcher};
pub use readiness::{ReadinessBand, ReadinessScorer};
pub use reconcile::{AutoFill, BiometricReconciler, ReconciledReadiness, RecoveryBand};
pub use rules::{Evaluation, RuleContext, RuleEngine, SuggestionLabel, TriggeredRule};
pub use session_score::{
    Pillar, Rubric, ScoreLabel, SessionScoreBreakdown, SessionScorer,
};
