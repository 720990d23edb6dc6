//! Composite readiness scoring from daily check-in sliders
//!
//! Four 1-5 sliders (sleep, stress, soreness, energy) combine into a single
//! 0-20 composite. Stress and soreness are inverted so that lower reported
//! values contribute more; sleep and energy contribute directly:
//!
//! `composite = sleep + (6 - stress) + (6 - soreness) + energy`
//!
//! The composite bands here are on the 0-20 scale and are a different
//! constant table from the wearable recovery bands in
//! [`crate::reconcile`], which live on a 0-100 scale. The two must never
//! be conflated.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Composite score at or above this value is the high-readiness band
pub const READINESS_HIGH_MIN: u8 = 16;

/// Composite score at or above this value (and below the high threshold)
/// is the moderate band; below it is low
pub const READINESS_MODERATE_MIN: u8 = 12;

/// Readiness band on the 0-20 composite scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessBand {
    High,
    Moderate,
    Low,
}

impl ReadinessBand {
    /// Band for a composite readiness score
    pub fn from_composite(composite: u8) -> Self {
        if composite >= READINESS_HIGH_MIN {
            ReadinessBand::High
        } else if composite >= READINESS_MODERATE_MIN {
            ReadinessBand::Moderate
        } else {
            ReadinessBand::Low
        }
    }
}

impl fmt::Display for ReadinessBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadinessBand::High => write!(f, "High"),
            ReadinessBand::Moderate => write!(f, "Moderate"),
            ReadinessBand::Low => write!(f, "Low"),
        }
    }
}

/// Composite readiness scoring engine
pub struct ReadinessScorer;

impl ReadinessScorer {
    /// Compute the 0-20 composite from four validated 1-5 sliders
    ///
    /// Out-of-range input is a caller error and is rejected rather than
    /// clamped; clamping would mask bad upstream data.
    pub fn score(sleep: u8, stress: u8, soreness: u8, energy: u8) -> Result<u8, ValidationError> {
        Self::validate_slider("sleep", sleep)?;
        Self::validate_slider("stress", stress)?;
        Self::validate_slider("soreness", soreness)?;
        Self::validate_slider("energy", energy)?;

        Ok(sleep + (6 - stress) + (6 - soreness) + energy)
    }

    /// Composite plus its band in one call
    pub fn score_with_band(
        sleep: u8,
        stress: u8,
        soreness: u8,
        energy: u8,
    ) -> Result<(u8, ReadinessBand), ValidationError> {
        let composite = Self::score(sleep, stress, soreness, energy)?;
        Ok((composite, ReadinessBand::from_composite(composite)))
    }

    /// Validate a single slider value against the 1-5 scale
    pub fn validate_slider(slider: &'static str, value: u8) -> Result<(), ValidationError> {
        if (1..=5).contains(&value) {
            Ok(())
        } else {
            Err(ValidationError::SliderOutOfRange { slider, value })
        }
    }
}
