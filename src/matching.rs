//! Matching wearable workouts against manually logged sessions
//!
//! Reconciles externally recorded workouts with a logged training session
//! by time-interval overlap. The overlap percentage is computed relative
//! to the *workout's* duration, so a short workout fully inside a long
//! session still scores 100%.
//!
//! The resolution policy is deliberately asymmetric: a single candidate
//! with at least [`AUTO_ACCEPT_MIN_OVERLAP_PCT`] overlap is accepted with
//! no confirmation, while anything else (one weak candidate, or several
//! candidates at any overlap) is handed back to the user. The engine never
//! silently picks among ambiguous overlapping workouts.

use chrono::{Duration, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MatchError, ValidationError};
use crate::models::WearableWorkout;

/// Minimum overlap percentage for a sole candidate to be auto-accepted
pub const AUTO_ACCEPT_MIN_OVERLAP_PCT: Decimal = dec!(90);

/// A candidate workout with its overlap against the session interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutCandidate {
    /// The wearable workout
    pub workout: WearableWorkout,

    /// Percentage of the workout's duration inside the session interval,
    /// rounded to one decimal place for display
    pub overlap_pct: Decimal,
}

/// Outcome of matching a session against wearable workout candidates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchResult {
    /// The session has no start time; matching cannot proceed and the
    /// engine does not guess
    InsufficientData,

    /// No candidate overlaps the session interval; the caller should
    /// offer manual entry
    NoMatch,

    /// Exactly one candidate overlapped at or above the auto-accept
    /// threshold; no user confirmation required
    AutoAccepted(WorkoutCandidate),

    /// One weak candidate or several candidates; the caller must ask the
    /// user and must not auto-select
    NeedsDisambiguation(Vec<WorkoutCandidate>),
}

impl MatchResult {
    /// The auto-accepted candidate, if this result carries one
    pub fn accepted(&self) -> Option<&WorkoutCandidate> {
        match self {
            MatchResult::AutoAccepted(candidate) => Some(candidate),
            _ => None,
        }
    }
}

/// Session-to-wearable-workout matching engine
pub struct WorkoutMatcher;

impl WorkoutMatcher {
    /// Match a logged session against candidate wearable workouts
    ///
    /// `candidates` should already be narrowed to the session's day by the
    /// caller's data fetch; anything without interval overlap is discarded
    /// here regardless.
    pub fn match_session(
        session_date: NaiveDate,
        session_start: Option<NaiveTime>,
        duration_minutes: u32,
        candidates: &[WearableWorkout],
    ) -> Result<MatchResult, crate::error::EngineError> {
        if duration_minutes == 0 {
            return Err(ValidationError::InvalidDuration {
                minutes: duration_minutes,
            }
            .into());
        }

        let Some(start_time) = session_start else {
            return Ok(MatchResult::InsufficientData);
        };

        let session_start = session_date.and_time(start_time);
        let session_end = session_start + Duration::minutes(i64::from(duration_minutes));

        let mut overlapping = Vec::new();
        for workout in candidates {
            if workout.end_time < workout.start_time {
                return Err(MatchError::InvalidCandidateInterval {
                    id: workout.id.to_string(),
                }
                .into());
            }

            let workout_minutes = workout.duration_minutes();
            if workout_minutes == 0 {
                continue;
            }

            let overlap_start = session_start.max(workout.start_time);
            let overlap_end = session_end.min(workout.end_time);
            let overlap_minutes = (overlap_end - overlap_start).num_minutes();
            if overlap_minutes <= 0 {
                continue;
            }

            let pct = Decimal::from(overlap_minutes) * dec!(100) / Decimal::from(workout_minutes);
            overlapping.push((pct, workout.clone()));
        }

        if overlapping.is_empty() {
            return Ok(MatchResult::NoMatch);
        }

        // Strongest overlap first; equal overlaps keep candidate order
        overlapping.sort_by(|a, b| b.0.cmp(&a.0));

        let to_candidate = |(pct, workout): (Decimal, WearableWorkout)| WorkoutCandidate {
            overlap_pct: pct.round_dp(1),
            workout,
        };

        if overlapping.len() == 1 && overlapping[0].0 >= AUTO_ACCEPT_MIN_OVERLAP_PCT {
            let candidate = to_candidate(overlapping.remove(0));
            debug!(
                workout_id = %candidate.workout.id,
                overlap_pct = %candidate.overlap_pct,
                "auto-accepted wearable workout match"
            );
            return Ok(MatchResult::AutoAccepted(candidate));
        }

        Ok(MatchResult::NeedsDisambiguation(
            overlapping.into_iter().map(to_candidate).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn workout(day: NaiveDate, start: (u32, u32), end: (u32, u32)) -> WearableWorkout {
        WearableWorkout {
            id: Uuid::new_v4(),
            start_time: day.and_time(time(start.0, start.1)),
            end_time: day.and_time(time(end.0, end.1)),
            strain: Some(12.0),
            calories: Some(500),
            avg_heart_rate: Some(150),
            max_heart_rate: Some(178),
        }
    }

    #[test]
    fn test_no_start_time_is_insufficient_data() {
        let day = date(2024, 1, 10);
        let candidates = vec![workout(day, (18, 0), (19, 0))];

        let result = WorkoutMatcher::match_session(day, None, 90, &candidates).unwrap();
        assert_eq!(result, MatchResult::InsufficientData);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let day = date(2024, 1, 10);
        let result = WorkoutMatcher::match_session(day, Some(time(18, 0)), 0, &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_single_high_overlap_auto_accepted() {
        // Session 18:00 + 90 min; workout 18:05-19:35 (90 min).
        // Overlap 18:05-19:30 = 85 min → 85/90 ≈ 94.4% → auto-accept.
        let day = date(2024, 1, 10);
        let candidates = vec![workout(day, (18, 5), (19, 35))];

        let result = WorkoutMatcher::match_session(day, Some(time(18, 0)), 90, &candidates).unwrap();

        let accepted = result.accepted().expect("should auto-accept");
        assert_eq!(accepted.overlap_pct, dec!(94.4));
    }

    #[test]
    fn test_single_weak_candidate_needs_disambiguation() {
        // Workout half outside the session window: 60/120 = 50%
        let day = date(2024, 1, 10);
        let candidates = vec![workout(day, (17, 0), (19, 0))];

        let result = WorkoutMatcher::match_session(day, Some(time(18, 0)), 90, &candidates).unwrap();

        match result {
            MatchResult::NeedsDisambiguation(list) => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0].overlap_pct, dec!(50.0));
            }
            other => panic!("expected disambiguation, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_candidates_always_disambiguate() {
        // Both below threshold, and even if one were higher the presence of
        // two candidates defers to the user
        let day = date(2024, 1, 10);
        let candidates = vec![
            workout(day, (17, 0), (19, 30)), // 90/150 = 60%
            workout(day, (18, 30), (20, 30)), // 60/120 = 50%
        ];

        let result = WorkoutMatcher::match_session(day, Some(time(18, 0)), 90, &candidates).unwrap();

        match result {
            MatchResult::NeedsDisambiguation(list) => {
                assert_eq!(list.len(), 2);
                // Sorted by overlap, strongest first
                assert!(list[0].overlap_pct >= list[1].overlap_pct);
            }
            other => panic!("expected disambiguation, got {:?}", other),
        }
    }

    #[test]
    fn test_two_candidates_one_perfect_still_disambiguates() {
        let day = date(2024, 1, 10);
        let candidates = vec![
            workout(day, (18, 0), (19, 30)),  // 100%
            workout(day, (18, 40), (19, 40)), // 50/60 ≈ 83.3%
        ];

        let result = WorkoutMatcher::match_session(day, Some(time(18, 0)), 90, &candidates).unwrap();
        assert!(matches!(result, MatchResult::NeedsDisambiguation(ref l) if l.len() == 2));
    }

    #[test]
    fn test_zero_overlap_candidates_filtered() {
        let day = date(2024, 1, 10);
        let candidates = vec![workout(day, (6, 0), (7, 0))];

        let result = WorkoutMatcher::match_session(day, Some(time(18, 0)), 90, &candidates).unwrap();
        assert_eq!(result, MatchResult::NoMatch);
    }

    #[test]
    fn test_no_candidates_is_no_match() {
        let day = date(2024, 1, 10);
        let result = WorkoutMatcher::match_session(day, Some(time(18, 0)), 90, &[]).unwrap();
        assert_eq!(result, MatchResult::NoMatch);
    }

    #[test]
    fn test_adjacent_interval_does_not_overlap() {
        // Workout starts exactly when the session ends
        let day = date(2024, 1, 10);
        let candidates = vec![workout(day, (19, 30), (20, 30))];

        let result = WorkoutMatcher::match_session(day, Some(time(18, 0)), 90, &candidates).unwrap();
        assert_eq!(result, MatchResult::NoMatch);
    }

    #[test]
    fn test_workout_contained_in_session_is_full_overlap() {
        let day = date(2024, 1, 10);
        let candidates = vec![workout(day, (18, 15), (19, 0))];

        let result = WorkoutMatcher::match_session(day, Some(time(18, 0)), 90, &candidates).unwrap();
        let accepted = result.accepted().expect("should auto-accept");
        assert_eq!(accepted.overlap_pct, dec!(100.0));
    }

    #[test]
    fn test_exactly_90_pct_auto_accepts() {
        // Workout 100 min, 90 inside the window
        let day = date(2024, 1, 10);
        let candidates = vec![workout(day, (18, 0), (19, 40))];

        let result = WorkoutMatcher::match_session(day, Some(time(18, 0)), 90, &candidates).unwrap();
        assert!(result.accepted().is_some());
    }

    #[test]
    fn test_just_below_threshold_defers() {
        // Workout 100 min, 89 inside the window → 89%
        let day = date(2024, 1, 10);
        let candidates = vec![workout(day, (18, 1), (19, 41))];

        let result = WorkoutMatcher::match_session(day, Some(time(18, 0)), 90, &candidates).unwrap();
        assert!(matches!(result, MatchResult::NeedsDisambiguation(_)));
    }

    #[test]
    fn test_invalid_candidate_interval_rejected() {
        let day = date(2024, 1, 10);
        let mut w = workout(day, (18, 0), (19, 0));
        std::mem::swap(&mut w.start_time, &mut w.end_time);

        let result = WorkoutMatcher::match_session(day, Some(time(18, 0)), 90, &[w]);
        assert!(result.is_err());
    }
}
