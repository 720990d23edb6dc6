use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Class types for categorizing logged training sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassType {
    Gi,
    NoGi,
    OpenMat,
    Drilling,
    Private,
    Competition,
    Strength,
    Mobility,
}

impl ClassType {
    /// Whether this class type involves live grappling rounds
    pub fn is_grappling(&self) -> bool {
        matches!(
            self,
            ClassType::Gi
                | ClassType::NoGi
                | ClassType::OpenMat
                | ClassType::Competition
                | ClassType::Private
        )
    }

    /// Whether this is supplementary (non-mat) work
    pub fn is_supplementary(&self) -> bool {
        matches!(self, ClassType::Strength | ClassType::Mobility)
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassType::Gi => write!(f, "Gi"),
            ClassType::NoGi => write!(f, "No-Gi"),
            ClassType::OpenMat => write!(f, "Open Mat"),
            ClassType::Drilling => write!(f, "Drilling"),
            ClassType::Private => write!(f, "Private"),
            ClassType::Competition => write!(f, "Competition"),
            ClassType::Strength => write!(f, "Strength"),
            ClassType::Mobility => write!(f, "Mobility"),
        }
    }
}

/// Provenance of a day's readiness inputs
///
/// Modeled as a one-way state machine rather than independent booleans so
/// that invalid combinations are unrepresentable. Valid transitions:
///
/// - `Wearable` → `WearableManual` (user edits an auto-filled slider)
/// - `Manual` and `WearableManual` are terminal for the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// All slider values entered by the user
    Manual,
    /// Sleep/energy auto-filled from a wearable recovery snapshot
    Wearable,
    /// Wearable auto-fill subsequently edited by the user
    WearableManual,
}

impl Provenance {
    /// State after the user edits a slider on this day's check-in
    ///
    /// Wearable-sourced days become blended; manual days stay manual.
    /// There is no transition back out of `WearableManual`.
    pub fn after_manual_edit(self) -> Self {
        match self {
            Provenance::Wearable => Provenance::WearableManual,
            other => other,
        }
    }

    /// Whether any slider value on this day came from user input
    pub fn has_manual_input(&self) -> bool {
        matches!(self, Provenance::Manual | Provenance::WearableManual)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Manual => write!(f, "manual"),
            Provenance::Wearable => write!(f, "wearable"),
            Provenance::WearableManual => write!(f, "wearable+manual"),
        }
    }
}

/// Wearable biometric fields attached to a daily check-in
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WearableBiometrics {
    /// Heart rate variability (RMSSD) in milliseconds
    ///
    /// Typical range 20-100ms; higher indicates better recovery
    pub hrv_ms: Option<f64>,

    /// Resting heart rate in beats per minute
    pub resting_hr: Option<u16>,

    /// Blood oxygen saturation percentage
    pub spo2_pct: Option<f64>,

    /// Wearable recovery score (0-100)
    pub recovery_score: Option<u8>,

    /// Wearable sleep performance score (0-100)
    pub sleep_score: Option<u8>,
}

/// Daily readiness check-in
///
/// At most one check-in exists per user per day; same-day submissions are
/// upserts. The composite score is always derived via
/// [`crate::readiness::ReadinessScorer`], never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessCheckin {
    /// Calendar day this check-in covers
    pub date: NaiveDate,

    /// Sleep quality slider (1-5, higher is better)
    pub sleep: u8,

    /// Stress slider (1-5, higher is worse)
    pub stress: u8,

    /// Muscle soreness slider (1-5, higher is worse)
    pub soreness: u8,

    /// Energy slider (1-5, higher is better)
    pub energy: u8,

    /// Free-text note for an active injury or problem area
    pub hotspot: Option<String>,

    /// Body weight in kilograms
    pub body_weight_kg: Option<Decimal>,

    /// Where this day's slider values came from
    pub provenance: Provenance,

    /// Wearable biometrics captured alongside the check-in
    pub wearable: Option<WearableBiometrics>,
}

/// Point-in-time wearable recovery snapshot
///
/// Read-only input owned by the sync layer; may be absent for any day.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WearableRecovery {
    /// Recovery score (0-100), absent when the wearable could not compute one
    pub recovery_score: Option<u8>,

    /// Heart rate variability (RMSSD) in milliseconds
    pub hrv_ms: Option<f64>,

    /// Resting heart rate in beats per minute
    pub resting_hr: Option<u16>,

    /// Blood oxygen saturation percentage
    pub spo2_pct: Option<f64>,

    /// Sleep performance score (0-100)
    pub sleep_score: Option<u8>,
}

impl WearableRecovery {
    /// Whether the snapshot carries any usable signal at all
    pub fn is_empty(&self) -> bool {
        self.recovery_score.is_none()
            && self.hrv_ms.is_none()
            && self.resting_hr.is_none()
            && self.spo2_pct.is_none()
            && self.sleep_score.is_none()
    }
}

/// Externally logged wearable workout
///
/// Identity is independent from any training session; a session may match
/// zero, one, or many of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WearableWorkout {
    /// Identifier assigned by the sync layer
    pub id: Uuid,

    /// Workout start, normalized to the athlete's local time by the sync layer
    pub start_time: NaiveDateTime,

    /// Workout end, exclusive
    pub end_time: NaiveDateTime,

    /// Cardiovascular strain score reported by the wearable
    pub strain: Option<f64>,

    /// Calories burned
    pub calories: Option<u16>,

    /// Average heart rate in beats per minute
    pub avg_heart_rate: Option<u16>,

    /// Maximum heart rate in beats per minute
    pub max_heart_rate: Option<u16>,
}

impl WearableWorkout {
    /// Workout duration in whole minutes; zero for degenerate intervals
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes().max(0)
    }
}

/// Wearable metrics linked to a training session
///
/// Set by auto-match, user disambiguation, or manual entry. Mutable up to
/// one linking event per session; a re-sync overwrites.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionWearableMetrics {
    /// Source wearable workout, when linked by matching
    pub workout_id: Option<Uuid>,

    /// Cardiovascular strain score
    pub strain: Option<f64>,

    /// Calories burned
    pub calories: Option<u16>,

    /// Average heart rate in beats per minute
    pub avg_heart_rate: Option<u16>,

    /// Maximum heart rate in beats per minute
    pub max_heart_rate: Option<u16>,
}

impl SessionWearableMetrics {
    /// Whether any biometric field is populated
    pub fn has_data(&self) -> bool {
        self.strain.is_some()
            || self.calories.is_some()
            || self.avg_heart_rate.is_some()
            || self.max_heart_rate.is_some()
    }

    /// Carry over the summary fields of a matched wearable workout
    pub fn from_workout(workout: &WearableWorkout) -> Self {
        SessionWearableMetrics {
            workout_id: Some(workout.id),
            strain: workout.strain,
            calories: workout.calories,
            avg_heart_rate: workout.avg_heart_rate,
            max_heart_rate: workout.max_heart_rate,
        }
    }
}

/// Manually logged training session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSession {
    /// Unique session identifier
    pub id: Uuid,

    /// Date the session took place
    pub date: NaiveDate,

    /// Class start time, when known
    pub start_time: Option<NaiveTime>,

    /// Session duration in minutes
    pub duration_minutes: u32,

    /// Perceived intensity (1-5)
    pub intensity: u8,

    /// Class type
    pub class_type: ClassType,

    /// Number of live rolls
    pub rolls: Option<u8>,

    /// Number of distinct rolling partners
    pub partners: Option<u8>,

    /// Submissions achieved
    pub submissions_for: Option<u8>,

    /// Submissions conceded
    pub submissions_against: Option<u8>,

    /// Techniques worked on this session
    pub techniques: Vec<String>,

    /// Free-text session notes
    pub notes: Option<String>,

    /// Linked wearable metrics
    pub wearable: Option<SessionWearableMetrics>,
}

impl TrainingSession {
    /// Build a minimal session; optional fields start empty
    pub fn new(
        date: NaiveDate,
        start_time: Option<NaiveTime>,
        duration_minutes: u32,
        intensity: u8,
        class_type: ClassType,
    ) -> Self {
        TrainingSession {
            id: Uuid::new_v4(),
            date,
            start_time,
            duration_minutes,
            intensity,
            class_type,
            rolls: None,
            partners: None,
            submissions_for: None,
            submissions_against: None,
            techniques: Vec::new(),
            notes: None,
            wearable: None,
        }
    }
}

/// Upcoming competition on the athlete's calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionEvent {
    /// Event name for display
    pub name: String,

    /// Event date
    pub date: NaiveDate,
}

impl CompetitionEvent {
    /// Days from `today` until the event; negative once the event has passed
    pub fn days_until(&self, today: NaiveDate) -> i64 {
        (self.date - today).num_days()
    }

    /// Competition phase relative to `today`, if the event is still upcoming
    pub fn phase(&self, today: NaiveDate) -> Option<CompetitionPhase> {
        let days = self.days_until(today);
        if days < 0 {
            return None;
        }
        Some(match days {
            0..=7 => CompetitionPhase::FightWeek,
            8..=14 => CompetitionPhase::Taper,
            15..=28 => CompetitionPhase::Peak,
            _ => CompetitionPhase::Base,
        })
    }
}

/// Preparation phase relative to an upcoming competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitionPhase {
    /// Event within 7 days
    FightWeek,
    /// Event 8-14 days out
    Taper,
    /// Event 15-28 days out
    Peak,
    /// Event more than 28 days out
    Base,
}

impl fmt::Display for CompetitionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompetitionPhase::FightWeek => write!(f, "Fight Week"),
            CompetitionPhase::Taper => write!(f, "Taper"),
            CompetitionPhase::Peak => write!(f, "Peak"),
            CompetitionPhase::Base => write!(f, "Base Building"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_provenance_serialization() {
        let json = serde_json::to_string(&Provenance::WearableManual).unwrap();
        assert_eq!(json, "\"wearable_manual\"");

        let deserialized: Provenance = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, Provenance::WearableManual);
    }

    #[test]
    fn test_provenance_one_way_transition() {
        assert_eq!(
            Provenance::Wearable.after_manual_edit(),
            Provenance::WearableManual
        );
        // Terminal states are unaffected by further edits
        assert_eq!(
            Provenance::WearableManual.after_manual_edit(),
            Provenance::WearableManual
        );
        assert_eq!(Provenance::Manual.after_manual_edit(), Provenance::Manual);
    }

    #[test]
    fn test_provenance_display() {
        assert_eq!(format!("{}", Provenance::Manual), "manual");
        assert_eq!(format!("{}", Provenance::Wearable), "wearable");
        assert_eq!(format!("{}", Provenance::WearableManual), "wearable+manual");
    }

    #[test]
    fn test_class_type_categories() {
        assert!(ClassType::Gi.is_grappling());
        assert!(ClassType::OpenMat.is_grappling());
        assert!(!ClassType::Strength.is_grappling());
        assert!(ClassType::Strength.is_supplementary());
        assert!(ClassType::Mobility.is_supplementary());
        assert!(!ClassType::Drilling.is_supplementary());
    }

    #[test]
    fn test_wearable_workout_duration() {
        let workout = WearableWorkout {
            id: Uuid::new_v4(),
            start_time: date(2024, 1, 10).and_hms_opt(18, 5, 0).unwrap(),
            end_time: date(2024, 1, 10).and_hms_opt(19, 35, 0).unwrap(),
            strain: Some(14.2),
            calories: Some(650),
            avg_heart_rate: Some(152),
            max_heart_rate: Some(181),
        };
        assert_eq!(workout.duration_minutes(), 90);
    }

    #[test]
    fn test_wearable_workout_degenerate_interval() {
        let t = date(2024, 1, 10).and_hms_opt(18, 0, 0).unwrap();
        let workout = WearableWorkout {
            id: Uuid::new_v4(),
            start_time: t,
            end_time: t,
            strain: None,
            calories: None,
            avg_heart_rate: None,
            max_heart_rate: None,
        };
        assert_eq!(workout.duration_minutes(), 0);
    }

    #[test]
    fn test_competition_phase_boundaries() {
        let event = CompetitionEvent {
            name: "Regional Open".to_string(),
            date: date(2024, 3, 30),
        };

        assert_eq!(
            event.phase(date(2024, 3, 30)),
            Some(CompetitionPhase::FightWeek)
        );
        assert_eq!(
            event.phase(date(2024, 3, 23)),
            Some(CompetitionPhase::FightWeek)
        );
        assert_eq!(event.phase(date(2024, 3, 22)), Some(CompetitionPhase::Taper));
        assert_eq!(event.phase(date(2024, 3, 16)), Some(CompetitionPhase::Taper));
        assert_eq!(event.phase(date(2024, 3, 15)), Some(CompetitionPhase::Peak));
        assert_eq!(event.phase(date(2024, 3, 2)), Some(CompetitionPhase::Peak));
        assert_eq!(event.phase(date(2024, 3, 1)), Some(CompetitionPhase::Base));
        // Past events have no phase
        assert_eq!(event.phase(date(2024, 4, 1)), None);
    }

    #[test]
    fn test_checkin_serialization_round_trip() {
        let checkin = ReadinessCheckin {
            date: date(2024, 1, 15),
            sleep: 4,
            stress: 2,
            soreness: 2,
            energy: 4,
            hotspot: Some("left knee".to_string()),
            body_weight_kg: None,
            provenance: Provenance::Manual,
            wearable: Some(WearableBiometrics {
                hrv_ms: Some(62.0),
                resting_hr: Some(52),
                spo2_pct: Some(97.5),
                recovery_score: Some(71),
                sleep_score: Some(84),
            }),
        };

        let json = serde_json::to_string(&checkin).unwrap();
        let deserialized: ReadinessCheckin = serde_json::from_str(&json).unwrap();
        assert_eq!(checkin, deserialized);
    }

    #[test]
    fn test_session_wearable_metrics_from_workout() {
        let workout = WearableWorkout {
            id: Uuid::new_v4(),
            start_time: date(2024, 1, 10).and_hms_opt(18, 0, 0).unwrap(),
            end_time: date(2024, 1, 10).and_hms_opt(19, 0, 0).unwrap(),
            strain: Some(12.1),
            calories: Some(540),
            avg_heart_rate: Some(148),
            max_heart_rate: Some(176),
        };

        let metrics = SessionWearableMetrics::from_workout(&workout);
        assert_eq!(metrics.workout_id, Some(workout.id));
        assert_eq!(metrics.strain, Some(12.1));
        assert!(metrics.has_data());
        assert!(!SessionWearableMetrics::default().has_data());
    }
}
