use chrono::{NaiveDate, NaiveTime};
use rust_decimal_macros::dec;
use uuid::Uuid;

use readyrs::api::{
    Engine, MatchStatus, SessionScoreRequest, SuggestionRequest, WorkoutCandidatesRequest,
};
use readyrs::models::{
    ClassType, CompetitionEvent, Provenance, ReadinessCheckin, SessionWearableMetrics,
    TrainingSession, WearableBiometrics, WearableRecovery, WearableWorkout,
};
use readyrs::rules::SuggestionLabel;

/// Integration tests that drive the complete engine workflows

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn manual_checkin(
    day: NaiveDate,
    sleep: u8,
    stress: u8,
    soreness: u8,
    energy: u8,
) -> ReadinessCheckin {
    ReadinessCheckin {
        date: day,
        sleep,
        stress,
        soreness,
        energy,
        hotspot: None,
        body_weight_kg: None,
        provenance: Provenance::Manual,
        wearable: None,
    }
}

fn wearable_workout(day: NaiveDate, start: (u32, u32), end: (u32, u32)) -> WearableWorkout {
    WearableWorkout {
        id: Uuid::new_v4(),
        start_time: day.and_time(time(start.0, start.1)),
        end_time: day.and_time(time(end.0, end.1)),
        strain: Some(13.5),
        calories: Some(620),
        avg_heart_rate: Some(151),
        max_heart_rate: Some(182),
    }
}

fn gi_session(day: NaiveDate) -> TrainingSession {
    let mut session = TrainingSession::new(day, Some(time(18, 0)), 90, 4, ClassType::Gi);
    session.rolls = Some(6);
    session.partners = Some(4);
    session.submissions_for = Some(3);
    session.submissions_against = Some(1);
    session.techniques = vec!["half guard sweep".to_string()];
    session
}

/// Check-in → reconcile → rules → suggestion, the main happy path
#[test]
fn test_checkin_to_suggestion_pipeline() {
    let engine = Engine::with_defaults();
    let day = date(2024, 2, 10);
    let checkin = manual_checkin(day, 4, 2, 2, 4);

    let response = engine
        .today_suggestion(&SuggestionRequest {
            date: day,
            checkin: Some(checkin.clone()),
            wearable: None,
            recent_checkins: vec![checkin],
            recent_sessions: Vec::new(),
            upcoming_event: None,
            recovery_mode: false,
        })
        .unwrap();

    // 4 + (6-2) + (6-2) + 4 = 16 → high readiness → Train Hard
    assert_eq!(response.readiness.as_ref().unwrap().composite_score, 16);
    assert_eq!(response.label, SuggestionLabel::TrainHard);
    assert!(!response.suggestion.is_empty());
}

/// Higher-priority rule overrides the green-light suggestion even on a
/// high-readiness day
#[test]
fn test_hotspot_overrides_train_hard_suggestion() {
    let engine = Engine::with_defaults();
    let day = date(2024, 2, 10);
    let mut checkin = manual_checkin(day, 4, 2, 2, 4);
    checkin.hotspot = Some("left knee".to_string());

    let response = engine
        .today_suggestion(&SuggestionRequest {
            date: day,
            checkin: Some(checkin.clone()),
            wearable: None,
            recent_checkins: vec![checkin],
            recent_sessions: Vec::new(),
            upcoming_event: None,
            recovery_mode: false,
        })
        .unwrap();

    assert_eq!(response.label, SuggestionLabel::TrainHard);
    assert_eq!(response.triggered_rules[0].name, "hotspot_active");
    assert!(response.suggestion.contains("left knee"));
}

/// With no check-in and no wearable data, the engine degrades to a
/// check-in prompt instead of failing
#[test]
fn test_empty_day_check_in_prompt() {
    let engine = Engine::with_defaults();

    let response = engine
        .today_suggestion(&SuggestionRequest {
            date: date(2024, 2, 10),
            checkin: None,
            wearable: None,
            recent_checkins: Vec::new(),
            recent_sessions: Vec::new(),
            upcoming_event: None,
            recovery_mode: false,
        })
        .unwrap();

    assert_eq!(response.label, SuggestionLabel::CheckIn);
    assert!(response.triggered_rules.is_empty());
    assert!(response.readiness.is_none());
}

/// Wearable-only day: label falls back to the recovery band and the
/// auto-fill endpoint offers mapped sliders
#[test]
fn test_wearable_only_day_fallback_and_autofill() {
    let engine = Engine::with_defaults();
    let snapshot = WearableRecovery {
        recovery_score: Some(25),
        hrv_ms: Some(38.0),
        resting_hr: Some(61),
        spo2_pct: Some(96.0),
        sleep_score: Some(55),
    };

    let suggestion = engine
        .today_suggestion(&SuggestionRequest {
            date: date(2024, 2, 10),
            checkin: None,
            wearable: Some(snapshot.clone()),
            recent_checkins: Vec::new(),
            recent_sessions: Vec::new(),
            upcoming_event: None,
            recovery_mode: false,
        })
        .unwrap();

    // Recovery 25 is the low band → Rest Day, and no composite exists
    assert_eq!(suggestion.label, SuggestionLabel::RestDay);
    assert!(suggestion.readiness.is_none());
    assert!(suggestion
        .triggered_rules
        .iter()
        .any(|r| r.name == "whoop_low_recovery"));

    let autofill = engine.auto_fill(Some(&snapshot));
    let fill = autofill.auto_fill.unwrap();
    assert_eq!(fill.sleep, 2);
    assert_eq!(fill.energy, 2);
    assert_eq!(fill.data_source, Provenance::Wearable);
}

/// Manual check-in readiness beats a contradicting wearable signal
#[test]
fn test_manual_checkin_precedence_over_wearable() {
    let engine = Engine::with_defaults();
    let day = date(2024, 2, 10);
    let mut checkin = manual_checkin(day, 1, 5, 5, 1);
    checkin.wearable = Some(WearableBiometrics {
        recovery_score: Some(95),
        ..Default::default()
    });

    let response = engine
        .today_suggestion(&SuggestionRequest {
            date: day,
            checkin: Some(checkin.clone()),
            wearable: None,
            recent_checkins: vec![checkin],
            recent_sessions: Vec::new(),
            upcoming_event: None,
            recovery_mode: false,
        })
        .unwrap();

    assert_eq!(response.label, SuggestionLabel::RestDay);
}

/// One candidate above 90% overlap auto-accepts with no confirmation
#[test]
fn test_match_single_high_confidence_auto_accept() {
    let engine = Engine::with_defaults();
    let day = date(2024, 1, 10);

    let response = engine
        .workout_candidates(&WorkoutCandidatesRequest {
            date: day,
            start_time: Some(time(18, 0)),
            duration_minutes: 90,
            workouts: vec![wearable_workout(day, (18, 5), (19, 35))],
        })
        .unwrap();

    assert_eq!(response.status, MatchStatus::AutoAccepted);
    assert_eq!(response.workouts[0].overlap_pct, dec!(94.4));
}

/// Two partial overlaps always go to the user, whichever is higher
#[test]
fn test_match_two_partial_overlaps_disambiguate() {
    let engine = Engine::with_defaults();
    let day = date(2024, 1, 10);

    let response = engine
        .workout_candidates(&WorkoutCandidatesRequest {
            date: day,
            start_time: Some(time(18, 0)),
            duration_minutes: 90,
            workouts: vec![
                wearable_workout(day, (17, 0), (19, 30)),  // 90/150 = 60%
                wearable_workout(day, (18, 50), (20, 10)), // 40/80 = 50%
            ],
        })
        .unwrap();

    assert_eq!(response.status, MatchStatus::NeedsDisambiguation);
    assert_eq!(response.workouts.len(), 2);
    assert!(response.workouts[0].overlap_pct >= response.workouts[1].overlap_pct);
}

/// Missing session start time is a distinct state, not an error and not
/// an empty match
#[test]
fn test_match_without_start_time() {
    let engine = Engine::with_defaults();
    let day = date(2024, 1, 10);

    let response = engine
        .workout_candidates(&WorkoutCandidatesRequest {
            date: day,
            start_time: None,
            duration_minutes: 90,
            workouts: vec![wearable_workout(day, (18, 0), (19, 30))],
        })
        .unwrap();

    assert_eq!(response.status, MatchStatus::InsufficientData);
    assert!(response.workouts.is_empty());
}

/// Matched wearable metrics flow into the session score's biometric pillar
#[test]
fn test_match_then_score_enriched_session() {
    let engine = Engine::with_defaults();
    let day = date(2024, 2, 10);
    let workout = wearable_workout(day, (18, 2), (19, 28));

    let match_response = engine
        .workout_candidates(&WorkoutCandidatesRequest {
            date: day,
            start_time: Some(time(18, 0)),
            duration_minutes: 90,
            workouts: vec![workout.clone()],
        })
        .unwrap();
    assert_eq!(match_response.status, MatchStatus::AutoAccepted);

    // The caller links the accepted workout, then scores the session
    let mut session = gi_session(day);
    session.wearable = Some(SessionWearableMetrics::from_workout(&workout));

    let checkin = manual_checkin(day, 4, 2, 2, 4);
    let scored = engine
        .session_score(&SessionScoreRequest {
            session: session.clone(),
            checkin: Some(checkin.clone()),
            wearable: None,
            recent_sessions: Vec::new(),
        })
        .unwrap();

    assert_eq!(scored.data_completeness, dec!(1));
    assert!(scored.pillars["biometric_validation"].max > dec!(0));

    // Without the link the pillar drops out but nothing is penalized
    session.wearable = None;
    let unlinked = engine
        .session_score(&SessionScoreRequest {
            session,
            checkin: Some(checkin),
            wearable: None,
            recent_sessions: Vec::new(),
        })
        .unwrap();
    assert_eq!(unlinked.pillars["biometric_validation"].max, dec!(0));
    assert!(unlinked.data_completeness < dec!(1));
}

/// Competition calendar context surfaces fight-week guidance
#[test]
fn test_fight_week_rules_fire() {
    let engine = Engine::with_defaults();
    let day = date(2024, 2, 10);
    let checkin = manual_checkin(day, 4, 2, 2, 4);

    let response = engine
        .today_suggestion(&SuggestionRequest {
            date: day,
            checkin: Some(checkin.clone()),
            wearable: None,
            recent_checkins: vec![checkin],
            recent_sessions: Vec::new(),
            upcoming_event: Some(CompetitionEvent {
                name: "Pan Qualifier".to_string(),
                date: date(2024, 2, 15),
            }),
            recovery_mode: false,
        })
        .unwrap();

    let fight_week = response
        .triggered_rules
        .iter()
        .find(|r| r.name == "comp_fight_week")
        .expect("fight week rule should fire");
    assert!(fight_week.recommendation.contains("Pan Qualifier"));
    assert!(fight_week.recommendation.contains('5'));
}

/// A heavy multi-week block trips the overload rules together, surfaced
/// in priority order and capped at three
#[test]
fn test_overload_block_stacks_rules() {
    let engine = Engine::with_defaults();
    let day = date(2024, 2, 21);
    let checkin = manual_checkin(day, 3, 3, 3, 3);

    // Training every day for three weeks
    let sessions: Vec<TrainingSession> = (0..20)
        .map(|d| gi_session(date(2024, 2, 1) + chrono::Duration::days(d)))
        .collect();

    let response = engine
        .today_suggestion(&SuggestionRequest {
            date: day,
            checkin: Some(checkin.clone()),
            wearable: None,
            recent_checkins: vec![checkin],
            recent_sessions: sessions,
            upcoming_event: Some(CompetitionEvent {
                name: "State Championship".to_string(),
                date: date(2024, 3, 2),
            }),
            recovery_mode: false,
        })
        .unwrap();

    let names: Vec<&str> = response
        .triggered_rules
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    // Top three only; the full evaluation carries more
    assert_eq!(names.len(), 3);
    assert!(names.contains(&"comp_taper_warning"));

    let priorities: Vec<u8> = response.triggered_rules.iter().map(|r| r.priority).collect();
    let mut sorted = priorities.clone();
    sorted.sort();
    assert_eq!(priorities, sorted);
}

/// Scoring is stable across repeated calls with identical inputs
#[test]
fn test_session_score_idempotent_across_calls() {
    let engine = Engine::with_defaults();
    let day = date(2024, 2, 10);
    let request = SessionScoreRequest {
        session: gi_session(day),
        checkin: Some(manual_checkin(day, 3, 2, 3, 4)),
        wearable: None,
        recent_sessions: vec![gi_session(date(2024, 2, 9)), gi_session(date(2024, 2, 8))],
    };

    let payloads: Vec<String> = (0..3)
        .map(|_| serde_json::to_string(&engine.session_score(&request).unwrap()).unwrap())
        .collect();
    assert_eq!(payloads[0], payloads[1]);
    assert_eq!(payloads[1], payloads[2]);
}

/// Suggestion request round-trips through JSON, the CLI input format
#[test]
fn test_suggestion_request_json_round_trip() {
    let day = date(2024, 2, 10);
    let request = SuggestionRequest {
        date: day,
        checkin: Some(manual_checkin(day, 4, 2, 2, 4)),
        wearable: Some(WearableRecovery {
            recovery_score: Some(70),
            ..Default::default()
        }),
        recent_checkins: Vec::new(),
        recent_sessions: vec![gi_session(date(2024, 2, 9))],
        upcoming_event: None,
        recovery_mode: false,
    };

    let json = serde_json::to_string(&request).unwrap();
    let parsed: SuggestionRequest = serde_json::from_str(&json).unwrap();

    let engine = Engine::with_defaults();
    assert_eq!(
        engine.today_suggestion(&request).unwrap(),
        engine.today_suggestion(&parsed).unwrap()
    );
}

/// Minimal JSON relies on the serde defaults for optional history
#[test]
fn test_sparse_request_json_defaults() {
    let json = r#"{"date": "2024-02-10"}"#;
    let request: SuggestionRequest = serde_json::from_str(json).unwrap();

    let engine = Engine::with_defaults();
    let response = engine.today_suggestion(&request).unwrap();
    assert_eq!(response.label, SuggestionLabel::CheckIn);
}

/// Out-of-range slider input is rejected end to end, never clamped
#[test]
fn test_invalid_slider_rejected_at_api_boundary() {
    let engine = Engine::with_defaults();
    let day = date(2024, 2, 10);
    let mut checkin = manual_checkin(day, 4, 2, 2, 4);
    checkin.stress = 9;

    let result = engine.today_suggestion(&SuggestionRequest {
        date: day,
        checkin: Some(checkin),
        wearable: None,
        recent_checkins: Vec::new(),
        recent_sessions: Vec::new(),
        upcoming_event: None,
        recovery_mode: false,
    });

    assert!(result.is_err());
}
