//! Engine facade and response payloads for the four logical operations
//!
//! The UI/API layer is an external collaborator: it fetches whatever data
//! a request needs (with its own timeouts), hands it to these entry
//! points, and persists any outcome itself. Everything here is pure
//! compute over the request payload: reconciliation runs before rule
//! evaluation within a call, and nothing blocks on I/O.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::matching::{MatchResult, WorkoutCandidate, WorkoutMatcher};
use crate::models::{
    CompetitionEvent, ReadinessCheckin, TrainingSession, WearableRecovery, WearableWorkout,
};
use crate::readiness::ReadinessBand;
use crate::reconcile::{AutoFill, BiometricReconciler};
use crate::rules::{RuleContext, RuleEngine, SuggestionLabel, TriggeredRule};
use crate::session_score::{ScoreLabel, SessionScorer};

/// Inputs for a daily suggestion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionRequest {
    /// Day to evaluate
    pub date: NaiveDate,

    /// The day's check-in, when one exists
    #[serde(default)]
    pub checkin: Option<ReadinessCheckin>,

    /// The day's wearable recovery snapshot, when one exists
    #[serde(default)]
    pub wearable: Option<WearableRecovery>,

    /// Recent check-in history for trend signals
    #[serde(default)]
    pub recent_checkins: Vec<ReadinessCheckin>,

    /// Recent session history for load signals
    #[serde(default)]
    pub recent_sessions: Vec<TrainingSession>,

    /// Next competition on the calendar
    #[serde(default)]
    pub upcoming_event: Option<CompetitionEvent>,

    /// Whether the athlete has recovery mode switched on
    #[serde(default)]
    pub recovery_mode: bool,
}

/// Readiness summary attached to a suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessSummary {
    /// Composite readiness score (0-20)
    pub composite_score: u8,

    /// Band for the composite
    pub band: ReadinessBand,
}

/// Daily suggestion payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    /// Suggestion sentence for the day
    pub suggestion: String,

    /// Suggestion label for the day
    pub label: SuggestionLabel,

    /// Top triggered rules by ascending priority
    pub triggered_rules: Vec<TriggeredRule>,

    /// Composite readiness, present only when a check-in existed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness: Option<ReadinessSummary>,
}

/// Auto-fill payload for a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoFillResponse {
    /// Pre-fill values, absent when no wearable data exists for the date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_fill: Option<AutoFill>,
}

/// Inputs for a workout-candidate request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutCandidatesRequest {
    /// Session date
    pub date: NaiveDate,

    /// Session start time, when known
    #[serde(default)]
    pub start_time: Option<NaiveTime>,

    /// Session duration in minutes
    pub duration_minutes: u32,

    /// Wearable workouts fetched for the session's day
    #[serde(default)]
    pub workouts: Vec<WearableWorkout>,
}

/// How the matcher resolved a candidate request
///
/// `InsufficientData` ("you haven't told us when the session started")
/// and `NeedsDisambiguation` ("we found several plausible workouts") are
/// distinct states the UI must render differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    InsufficientData,
    NoMatch,
    AutoAccepted,
    NeedsDisambiguation,
}

/// One candidate row in the workout-candidate payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutCandidateRow {
    /// Wearable workout identifier
    pub id: Uuid,

    /// Cardiovascular strain score
    pub strain: Option<f64>,

    /// Calories burned
    pub calories: Option<u16>,

    /// Average heart rate in beats per minute
    pub avg_heart_rate: Option<u16>,

    /// Maximum heart rate in beats per minute
    pub max_heart_rate: Option<u16>,

    /// Overlap with the session interval, percent of the workout's duration
    pub overlap_pct: Decimal,
}

impl From<&WorkoutCandidate> for WorkoutCandidateRow {
    fn from(candidate: &WorkoutCandidate) -> Self {
        WorkoutCandidateRow {
            id: candidate.workout.id,
            strain: candidate.workout.strain,
            calories: candidate.workout.calories,
            avg_heart_rate: candidate.workout.avg_heart_rate,
            max_heart_rate: candidate.workout.max_heart_rate,
            overlap_pct: candidate.overlap_pct,
        }
    }
}

/// Workout-candidate payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutCandidatesResponse {
    /// Resolution status
    pub status: MatchStatus,

    /// Candidates for the status: the single accepted workout for
    /// `AutoAccepted`, the full list for `NeedsDisambiguation`, empty
    /// otherwise
    pub workouts: Vec<WorkoutCandidateRow>,
}

/// Inputs for a session score request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionScoreRequest {
    /// Session to score
    pub session: TrainingSession,

    /// The session day's check-in, when one existed at logging time
    #[serde(default)]
    pub checkin: Option<ReadinessCheckin>,

    /// The session day's wearable recovery snapshot, when one existed
    #[serde(default)]
    pub wearable: Option<WearableRecovery>,

    /// Recent session history for the consistency pillar
    #[serde(default)]
    pub recent_sessions: Vec<TrainingSession>,
}

/// One pillar row in the score payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarRow {
    /// Points earned
    pub score: Decimal,

    /// Points available
    pub max: Decimal,

    /// Earned share as a percentage
    pub pct: Decimal,
}

/// Session score payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionScoreResponse {
    /// Aggregate score (0-100)
    pub score: Decimal,

    /// Categorical label for the aggregate
    pub label: ScoreLabel,

    /// Rubric the session was scored under
    pub rubric: String,

    /// Fraction of in-play pillars with real inputs
    pub data_completeness: Decimal,

    /// Pillar rows keyed by pillar name
    pub pillars: BTreeMap<String, PillarRow>,
}

/// Stateless facade over the engine components
///
/// Owns nothing but the configuration; every call is a pure function of
/// its request payload, so instances are freely shareable across threads.
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Build an engine over a configuration
    pub fn new(config: EngineConfig) -> Self {
        Engine { config }
    }

    /// Build an engine with default configuration
    pub fn with_defaults() -> Self {
        Engine::new(EngineConfig::default())
    }

    /// `GET today's suggestion`
    ///
    /// Reconciles the day's sources, then evaluates the rule catalog
    /// against the reconciled state. An unreachable wearable service is
    /// indistinguishable from "no wearable data" here; the evaluation
    /// degrades instead of failing.
    pub fn today_suggestion(&self, request: &SuggestionRequest) -> Result<SuggestionResponse> {
        let readiness = BiometricReconciler::reconcile(
            request.checkin.as_ref(),
            request.wearable.as_ref(),
            &self.config.autofill,
        )
        .map_err(EngineError::from)?;

        let ctx = RuleContext::new(
            request.date,
            readiness.as_ref(),
            &request.recent_checkins,
            &request.recent_sessions,
            request.upcoming_event.as_ref(),
            request.recovery_mode,
        );
        let evaluation = RuleEngine::evaluate(&ctx);

        info!(
            date = %request.date,
            label = %evaluation.label,
            rules = evaluation.triggered_rules.len(),
            "evaluated daily suggestion"
        );

        let summary = readiness.as_ref().and_then(|r| {
            Some(ReadinessSummary {
                composite_score: r.composite?,
                band: r.band?,
            })
        });

        Ok(SuggestionResponse {
            suggestion: evaluation.suggestion.clone(),
            label: evaluation.label,
            triggered_rules: evaluation.top_rules().to_vec(),
            readiness: summary,
        })
    }

    /// `GET readiness auto-fill for date`
    pub fn auto_fill(&self, wearable: Option<&WearableRecovery>) -> AutoFillResponse {
        AutoFillResponse {
            auto_fill: BiometricReconciler::auto_fill(wearable, &self.config.autofill),
        }
    }

    /// `GET wearable workout candidates for session`
    pub fn workout_candidates(
        &self,
        request: &WorkoutCandidatesRequest,
    ) -> Result<WorkoutCandidatesResponse> {
        let result = WorkoutMatcher::match_session(
            request.date,
            request.start_time,
            request.duration_minutes,
            &request.workouts,
        )?;

        let response = match result {
            MatchResult::InsufficientData => WorkoutCandidatesResponse {
                status: MatchStatus::InsufficientData,
                workouts: Vec::new(),
            },
            MatchResult::NoMatch => WorkoutCandidatesResponse {
                status: MatchStatus::NoMatch,
                workouts: Vec::new(),
            },
            MatchResult::AutoAccepted(candidate) => WorkoutCandidatesResponse {
                status: MatchStatus::AutoAccepted,
                workouts: vec![WorkoutCandidateRow::from(&candidate)],
            },
            MatchResult::NeedsDisambiguation(candidates) => WorkoutCandidatesResponse {
                status: MatchStatus::NeedsDisambiguation,
                workouts: candidates.iter().map(WorkoutCandidateRow::from).collect(),
            },
        };
        Ok(response)
    }

    /// `GET session score breakdown`
    ///
    /// Also the `recalculate` variant: identical inputs yield a
    /// byte-identical payload, so callers may invoke this freely.
    pub fn session_score(&self, request: &SessionScoreRequest) -> Result<SessionScoreResponse> {
        let readiness = BiometricReconciler::reconcile(
            request.checkin.as_ref(),
            request.wearable.as_ref(),
            &self.config.autofill,
        )
        .map_err(EngineError::from)?;

        let breakdown = SessionScorer::score(
            &request.session,
            readiness.as_ref(),
            &request.recent_sessions,
        )
        .map_err(EngineError::from)?;

        let pillars = breakdown
            .pillars
            .iter()
            .map(|p| {
                (
                    p.pillar.key().to_string(),
                    PillarRow {
                        score: p.score,
                        max: p.max,
                        pct: p.pct,
                    },
                )
            })
            .collect();

        Ok(SessionScoreResponse {
            score: breakdown.score,
            label: breakdown.label,
            rubric: breakdown.rubric.to_string(),
            data_completeness: breakdown.data_completeness,
            pillars,
        })
    }
}
