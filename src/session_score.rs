//! Post-session performance scoring
//!
//! Combines six independent pillars (effort, engagement, effectiveness,
//! readiness alignment, biometric validation, consistency) into a 0-100
//! aggregate. Each pillar has its own partial-credit sub-formula and its
//! own max under the active rubric. Missing inputs never default to a
//! midpoint: a pillar with no real data scores zero and shows up in
//! `data_completeness` instead.
//!
//! Scoring is a pure function of its inputs; recalculating on unchanged
//! inputs yields byte-identical output. All arithmetic is `Decimal` so
//! there is no float drift between runs.
//!
//! The categorical label thresholds here are on the 0-100 session scale
//! and are unrelated to the 0-20 readiness bands in
//! [`crate::readiness`].

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::history::TrainingLoad;
use crate::models::{ClassType, TrainingSession};
use crate::readiness::ReadinessBand;
use crate::reconcile::{RecoveryBand, ReconciledReadiness};

/// Session score at or above this value is labeled Outstanding
pub const SCORE_OUTSTANDING_MIN: Decimal = dec!(85);
/// Session score at or above this value is labeled Strong
pub const SCORE_STRONG_MIN: Decimal = dec!(70);
/// Session score at or above this value is labeled Solid
pub const SCORE_SOLID_MIN: Decimal = dec!(55);
/// Session score at or above this value is labeled Developing
pub const SCORE_DEVELOPING_MIN: Decimal = dec!(40);

/// Session duration that earns full effort credit, in minutes
const FULL_EFFORT_MINUTES: Decimal = dec!(90);
/// Roll count that earns full engagement credit
const FULL_ENGAGEMENT_ROLLS: Decimal = dec!(8);
/// Distinct partner count that earns full engagement credit
const FULL_ENGAGEMENT_PARTNERS: Decimal = dec!(5);
/// Submission count that saturates the effectiveness formula
const FULL_EFFECTIVENESS_SUBS: Decimal = dec!(6);
/// Logged technique count that earns full technique credit
const FULL_TECHNIQUE_COUNT: Decimal = dec!(3);
/// Wearable strain that earns full biometric credit
const FULL_BIOMETRIC_STRAIN: Decimal = dec!(15);
/// Average heart rate that earns full biometric credit
const FULL_BIOMETRIC_AVG_HR: Decimal = dec!(140);
/// Consecutive training days that earn full consistency credit
const FULL_CONSISTENCY_STREAK: Decimal = dec!(5);

/// Categorical label on the 0-100 session score scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreLabel {
    Outstanding,
    Strong,
    Solid,
    Developing,
    Light,
}

impl ScoreLabel {
    /// Label for an aggregate session score
    pub fn from_score(score: Decimal) -> Self {
        if score >= SCORE_OUTSTANDING_MIN {
            ScoreLabel::Outstanding
        } else if score >= SCORE_STRONG_MIN {
            ScoreLabel::Strong
        } else if score >= SCORE_SOLID_MIN {
            ScoreLabel::Solid
        } else if score >= SCORE_DEVELOPING_MIN {
            ScoreLabel::Developing
        } else {
            ScoreLabel::Light
        }
    }
}

impl fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreLabel::Outstanding => write!(f, "Outstanding"),
            ScoreLabel::Strong => write!(f, "Strong"),
            ScoreLabel::Solid => write!(f, "Solid"),
            ScoreLabel::Developing => write!(f, "Developing"),
            ScoreLabel::Light => write!(f, "Light"),
        }
    }
}

/// Scoring rubric selected from the session's class type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rubric {
    Bjj,
    Competition,
    Supplementary,
}

impl Rubric {
    /// Rubric for a class type
    pub fn for_class(class_type: ClassType) -> Self {
        if class_type == ClassType::Competition {
            Rubric::Competition
        } else if class_type.is_supplementary() {
            Rubric::Supplementary
        } else {
            Rubric::Bjj
        }
    }

    /// Max points for a pillar under this rubric; zero means the pillar
    /// is not in play (e.g. rolls during strength work)
    pub fn pillar_max(&self, pillar: Pillar) -> Decimal {
        match self {
            Rubric::Bjj => match pillar {
                Pillar::Effort => dec!(25),
                Pillar::Engagement => dec!(15),
                Pillar::Effectiveness => dec!(20),
                Pillar::ReadinessAlignment => dec!(15),
                Pillar::BiometricValidation => dec!(10),
                Pillar::Consistency => dec!(15),
            },
            Rubric::Competition => match pillar {
                Pillar::Effort => dec!(20),
                Pillar::Engagement => dec!(10),
                Pillar::Effectiveness => dec!(35),
                Pillar::ReadinessAlignment => dec!(15),
                Pillar::BiometricValidation => dec!(10),
                Pillar::Consistency => dec!(10),
            },
            Rubric::Supplementary => match pillar {
                Pillar::Effort => dec!(40),
                Pillar::Engagement => dec!(0),
                Pillar::Effectiveness => dec!(0),
                Pillar::ReadinessAlignment => dec!(25),
                Pillar::BiometricValidation => dec!(20),
                Pillar::Consistency => dec!(15),
            },
        }
    }
}

impl fmt::Display for Rubric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rubric::Bjj => write!(f, "bjj"),
            Rubric::Competition => write!(f, "competition"),
            Rubric::Supplementary => write!(f, "supplementary"),
        }
    }
}

/// The six scoring pillars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Effort,
    Engagement,
    Effectiveness,
    ReadinessAlignment,
    BiometricValidation,
    Consistency,
}

impl Pillar {
    /// All pillars in breakdown order
    pub const ALL: [Pillar; 6] = [
        Pillar::Effort,
        Pillar::Engagement,
        Pillar::Effectiveness,
        Pillar::ReadinessAlignment,
        Pillar::BiometricValidation,
        Pillar::Consistency,
    ];

    /// Stable wire key for the pillar
    pub fn key(&self) -> &'static str {
        match self {
            Pillar::Effort => "effort",
            Pillar::Engagement => "engagement",
            Pillar::Effectiveness => "effectiveness",
            Pillar::ReadinessAlignment => "readiness_alignment",
            Pillar::BiometricValidation => "biometric_validation",
            Pillar::Consistency => "consistency",
        }
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pillar::Effort => write!(f, "Effort"),
            Pillar::Engagement => write!(f, "Engagement"),
            Pillar::Effectiveness => write!(f, "Effectiveness"),
            Pillar::ReadinessAlignment => write!(f, "Readiness Alignment"),
            Pillar::BiometricValidation => write!(f, "Biometric Validation"),
            Pillar::Consistency => write!(f, "Consistency"),
        }
    }
}

/// One pillar's contribution to the breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarScore {
    /// Which pillar this entry is for
    pub pillar: Pillar,

    /// Points earned
    pub score: Decimal,

    /// Points available; zero when the pillar is not in play for this
    /// session (rubric excludes it, or no biometric data is linked)
    pub max: Decimal,

    /// `score / max` as a percentage, zero when `max` is zero
    pub pct: Decimal,
}

/// Complete session score breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionScoreBreakdown {
    /// Aggregate score scaled to 0-100
    pub score: Decimal,

    /// Categorical label for the aggregate
    pub label: ScoreLabel,

    /// Rubric the session was scored under
    pub rubric: Rubric,

    /// Fraction of in-play pillars that had real (non-defaulted) inputs
    ///
    /// The UI surfaces this whenever it is below 1.
    pub data_completeness: Decimal,

    /// All six pillar entries in breakdown order
    pub pillars: Vec<PillarScore>,
}

/// Multi-pillar session performance scorer
pub struct SessionScorer;

impl SessionScorer {
    /// Score a logged session
    ///
    /// `readiness` is the reconciled state for the session's day, when any
    /// existed at logging time. `recent_history` feeds the consistency
    /// pillar and may or may not include the session itself.
    pub fn score(
        session: &TrainingSession,
        readiness: Option<&ReconciledReadiness>,
        recent_history: &[TrainingSession],
    ) -> Result<SessionScoreBreakdown, ValidationError> {
        if session.duration_minutes == 0 {
            return Err(ValidationError::InvalidDuration {
                minutes: session.duration_minutes,
            });
        }
        if !(1..=5).contains(&session.intensity) {
            return Err(ValidationError::InvalidIntensity {
                value: session.intensity,
            });
        }

        let rubric = Rubric::for_class(session.class_type);
        let biometric_present = session
            .wearable
            .as_ref()
            .is_some_and(|w| w.has_data());

        let mut pillars = Vec::with_capacity(Pillar::ALL.len());
        let mut earned = Decimal::ZERO;
        let mut available = Decimal::ZERO;
        let mut applicable = 0u32;
        let mut present = 0u32;

        for pillar in Pillar::ALL {
            let rubric_max = rubric.pillar_max(pillar);

            // A pillar the rubric excludes is skipped entirely; absent
            // biometric data takes that pillar out of play rather than
            // penalizing the aggregate
            let in_play = rubric_max > Decimal::ZERO
                && (pillar != Pillar::BiometricValidation || biometric_present);
            let max = if in_play { rubric_max } else { Decimal::ZERO };

            let (factor, has_input) = match pillar {
                Pillar::Effort => (Self::effort_factor(session), true),
                Pillar::Engagement => Self::engagement_factor(session),
                Pillar::Effectiveness => Self::effectiveness_factor(session),
                Pillar::ReadinessAlignment => Self::alignment_factor(session, readiness),
                Pillar::BiometricValidation => Self::biometric_factor(session),
                Pillar::Consistency => (
                    Self::consistency_factor(session, recent_history),
                    true,
                ),
            };

            let score = (max * factor).round_dp(1);
            let pct = if max > Decimal::ZERO {
                (score / max * dec!(100)).round_dp(1)
            } else {
                Decimal::ZERO
            };

            if rubric_max > Decimal::ZERO {
                applicable += 1;
                if has_input {
                    present += 1;
                }
            }

            earned += score;
            available += max;
            pillars.push(PillarScore {
                pillar,
                score,
                max,
                pct,
            });
        }

        let score = (earned / available * dec!(100)).round_dp(1);
        let data_completeness =
            (Decimal::from(present) / Decimal::from(applicable)).round_dp(2);

        Ok(SessionScoreBreakdown {
            score,
            label: ScoreLabel::from_score(score),
            rubric,
            data_completeness,
            pillars,
        })
    }

    /// Recompute a breakdown
    ///
    /// Identical inputs produce byte-identical output; the UI may call
    /// this freely after edits or re-syncs.
    pub fn recalculate(
        session: &TrainingSession,
        readiness: Option<&ReconciledReadiness>,
        recent_history: &[TrainingSession],
    ) -> Result<SessionScoreBreakdown, ValidationError> {
        Self::score(session, readiness, recent_history)
    }

    /// Duration (60%) and intensity (40%)
    fn effort_factor(session: &TrainingSession) -> Decimal {
        let duration =
            (Decimal::from(session.duration_minutes) / FULL_EFFORT_MINUTES).min(Decimal::ONE);
        let intensity = Decimal::from(session.intensity) / dec!(5);
        dec!(0.6) * duration + dec!(0.4) * intensity
    }

    /// Roll count (60%) and distinct partner count (40%)
    fn engagement_factor(session: &TrainingSession) -> (Decimal, bool) {
        let has_input = session.rolls.is_some() || session.partners.is_some();
        let rolls = (Decimal::from(session.rolls.unwrap_or(0)) / FULL_ENGAGEMENT_ROLLS)
            .min(Decimal::ONE);
        let partners = (Decimal::from(session.partners.unwrap_or(0))
            / FULL_ENGAGEMENT_PARTNERS)
            .min(Decimal::ONE);
        (dec!(0.6) * rolls + dec!(0.4) * partners, has_input)
    }

    /// Submissions for (50%), submissions against inverted (25%),
    /// techniques logged (25%)
    fn effectiveness_factor(session: &TrainingSession) -> (Decimal, bool) {
        let has_input = session.submissions_for.is_some()
            || session.submissions_against.is_some()
            || !session.techniques.is_empty();

        let subs_for = (Decimal::from(session.submissions_for.unwrap_or(0))
            / FULL_EFFECTIVENESS_SUBS)
            .min(Decimal::ONE);
        let subs_against = Decimal::ONE
            - (Decimal::from(session.submissions_against.unwrap_or(0))
                / FULL_EFFECTIVENESS_SUBS)
                .min(Decimal::ONE);
        let techniques = (Decimal::from(session.techniques.len() as u32)
            / FULL_TECHNIQUE_COUNT)
            .min(Decimal::ONE);

        (
            dec!(0.5) * subs_for + dec!(0.25) * subs_against + dec!(0.25) * techniques,
            has_input,
        )
    }

    /// How well the session's intensity matched the day's readiness band
    ///
    /// With no readiness data the pillar scores zero and completeness is
    /// reduced; it is never defaulted to a midpoint.
    fn alignment_factor(
        session: &TrainingSession,
        readiness: Option<&ReconciledReadiness>,
    ) -> (Decimal, bool) {
        let Some(band) = readiness.and_then(Self::alignment_band) else {
            return (Decimal::ZERO, false);
        };

        let factor = match (band, session.intensity) {
            (ReadinessBand::High, 4..=5) => Decimal::ONE,
            (ReadinessBand::High, 3) => dec!(0.75),
            (ReadinessBand::High, _) => dec!(0.5),

            (ReadinessBand::Moderate, 3) => Decimal::ONE,
            (ReadinessBand::Moderate, 2 | 4) => dec!(0.75),
            (ReadinessBand::Moderate, _) => dec!(0.4),

            (ReadinessBand::Low, 1) => Decimal::ONE,
            (ReadinessBand::Low, 2) => dec!(0.6),
            (ReadinessBand::Low, 3) => dec!(0.3),
            (ReadinessBand::Low, _) => Decimal::ZERO,
        };
        (factor, true)
    }

    /// Band used for alignment: the composite band when a check-in
    /// existed, otherwise the wearable recovery band
    fn alignment_band(readiness: &ReconciledReadiness) -> Option<ReadinessBand> {
        readiness.band.or(match readiness.recovery_band {
            Some(RecoveryBand::High) => Some(ReadinessBand::High),
            Some(RecoveryBand::Moderate) => Some(ReadinessBand::Moderate),
            Some(RecoveryBand::Low) => Some(ReadinessBand::Low),
            None => None,
        })
    }

    /// Strain depth (50%) and average heart rate (50%) from linked
    /// wearable data; only called into the aggregate when data exists
    fn biometric_factor(session: &TrainingSession) -> (Decimal, bool) {
        let Some(wearable) = session.wearable.as_ref().filter(|w| w.has_data()) else {
            return (Decimal::ZERO, false);
        };

        let strain = wearable
            .strain
            .and_then(Decimal::from_f64)
            .map(|s| (s / FULL_BIOMETRIC_STRAIN).min(Decimal::ONE))
            .unwrap_or(Decimal::ZERO);
        let avg_hr = wearable
            .avg_heart_rate
            .map(|hr| (Decimal::from(hr) / FULL_BIOMETRIC_AVG_HR).min(Decimal::ONE))
            .unwrap_or(Decimal::ZERO);

        (dec!(0.5) * strain + dec!(0.5) * avg_hr, true)
    }

    /// Consecutive-day streak including the session's own day
    fn consistency_factor(
        session: &TrainingSession,
        recent_history: &[TrainingSession],
    ) -> Decimal {
        let mut all: Vec<TrainingSession> = recent_history.to_vec();
        all.push(session.clone());
        let streak = TrainingLoad::consecutive_day_streak(&all, session.date);
        (Decimal::from(streak) / FULL_CONSISTENCY_STREAK).min(Decimal::ONE)
    }
}
