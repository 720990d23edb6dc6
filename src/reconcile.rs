//! Per-day reconciliation of manual check-ins and wearable recovery data
//!
//! Decides, for a single day, which source feeds the readiness state:
//!
//! - A manual check-in is always authoritative for slider values; a
//!   wearable snapshot is surfaced alongside but never overwrites them.
//! - With no check-in, sleep and energy are auto-filled from the wearable
//!   recovery score through the injectable mapping in
//!   [`crate::config::AutoFillSettings`]; stress and soreness stay unknown
//!   and no composite is fabricated from partial data.
//! - With neither source, the day has no readiness state at all and
//!   [`BiometricReconciler::reconcile`] returns `None`. Downstream
//!   consumers treat that as "unknown", never as zero.
//!
//! The recovery bands in this module are on the wearable's 0-100 scale and
//! exist for display color coding only. They are a separate constant table
//! from the 0-20 composite bands in [`crate::readiness`].

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::config::{AutoFillSettings, EngineConfig};
use crate::error::ValidationError;
use crate::models::{Provenance, ReadinessCheckin, WearableBiometrics, WearableRecovery};
use crate::readiness::{ReadinessBand, ReadinessScorer};

/// Recovery score at or above this value displays as the high band
pub const RECOVERY_HIGH_MIN: u8 = 67;

/// Recovery score at or above this value (and below the high threshold)
/// displays as moderate; below it as low
pub const RECOVERY_MODERATE_MIN: u8 = 34;

/// Wearable recovery band on the 0-100 scale, display-only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryBand {
    High,
    Moderate,
    Low,
}

impl RecoveryBand {
    /// Band for a 0-100 wearable recovery score
    pub fn from_score(score: u8) -> Self {
        if score >= RECOVERY_HIGH_MIN {
            RecoveryBand::High
        } else if score >= RECOVERY_MODERATE_MIN {
            RecoveryBand::Moderate
        } else {
            RecoveryBand::Low
        }
    }

    /// Traffic-light color token for the UI
    pub fn color(&self) -> &'static str {
        match self {
            RecoveryBand::High => "green",
            RecoveryBand::Moderate => "yellow",
            RecoveryBand::Low => "red",
        }
    }
}

impl fmt::Display for RecoveryBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryBand::High => write!(f, "High"),
            RecoveryBand::Moderate => write!(f, "Moderate"),
            RecoveryBand::Low => write!(f, "Low"),
        }
    }
}

/// A day's readiness state after source reconciliation
///
/// Slider fields are individually optional: on a wearable-only day, only
/// sleep and energy are known. The composite exists only when all four
/// sliders do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledReadiness {
    /// Where the slider values came from
    pub provenance: Provenance,

    /// Sleep quality slider (1-5)
    pub sleep: Option<u8>,

    /// Stress slider (1-5)
    pub stress: Option<u8>,

    /// Soreness slider (1-5)
    pub soreness: Option<u8>,

    /// Energy slider (1-5)
    pub energy: Option<u8>,

    /// Composite readiness score (0-20), derivable only from a full slider set
    pub composite: Option<u8>,

    /// Band for the composite score
    pub band: Option<ReadinessBand>,

    /// Active injury or problem-area note
    pub hotspot: Option<String>,

    /// Wearable recovery score (0-100), surfaced alongside the sliders
    pub recovery_score: Option<u8>,

    /// Display band for the recovery score
    pub recovery_band: Option<RecoveryBand>,

    /// Heart rate variability (RMSSD) in milliseconds
    pub hrv_ms: Option<f64>,

    /// Resting heart rate in beats per minute
    pub resting_hr: Option<u16>,

    /// Blood oxygen saturation percentage
    pub spo2_pct: Option<f64>,

    /// Wearable sleep performance score (0-100)
    pub wearable_sleep_score: Option<u8>,
}

impl ReconciledReadiness {
    /// Whether a manual check-in contributed to this state
    pub fn has_checkin(&self) -> bool {
        self.provenance.has_manual_input() || self.composite.is_some()
    }
}

/// Auto-fill values offered to the check-in form for a wearable-only day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoFill {
    /// Suggested sleep slider value (1-5)
    pub sleep: u8,

    /// Suggested energy slider value (1-5)
    pub energy: u8,

    /// Heart rate variability (RMSSD) in milliseconds
    pub hrv_ms: Option<f64>,

    /// Resting heart rate in beats per minute
    pub resting_hr: Option<u16>,

    /// Blood oxygen saturation percentage
    pub spo2: Option<f64>,

    /// Wearable recovery score (0-100)
    pub whoop_recovery_score: Option<u8>,

    /// Wearable sleep performance score (0-100)
    pub whoop_sleep_score: Option<u8>,

    /// Source tag for the pre-filled values
    pub data_source: Provenance,
}

/// Per-day source resolution between check-in and wearable data
pub struct BiometricReconciler;

impl BiometricReconciler {
    /// Reconcile a day's readiness inputs
    ///
    /// Returns `Ok(None)` when neither source exists: the day is unknown,
    /// not zero. Slider values from a check-in are validated and rejected
    /// when out of range.
    pub fn reconcile(
        checkin: Option<&ReadinessCheckin>,
        wearable: Option<&WearableRecovery>,
        autofill: &AutoFillSettings,
    ) -> Result<Option<ReconciledReadiness>, ValidationError> {
        // An all-empty snapshot is the same as an absent wearable service
        let wearable = wearable.filter(|w| !w.is_empty());

        match (checkin, wearable) {
            (Some(checkin), wearable) => Ok(Some(Self::from_checkin(checkin, wearable)?)),
            (None, Some(wearable)) => Ok(Some(Self::from_wearable_only(wearable, autofill))),
            (None, None) => Ok(None),
        }
    }

    /// Auto-fill values for a day with wearable data and no check-in
    ///
    /// Returns `None` when there is no recovery score to map from.
    pub fn auto_fill(
        wearable: Option<&WearableRecovery>,
        autofill: &AutoFillSettings,
    ) -> Option<AutoFill> {
        let wearable = wearable.filter(|w| !w.is_empty())?;
        let recovery = wearable.recovery_score?;

        Some(AutoFill {
            sleep: autofill.sleep_slider(recovery, wearable.sleep_score),
            energy: autofill.energy_slider(recovery),
            hrv_ms: wearable.hrv_ms,
            resting_hr: wearable.resting_hr,
            spo2: wearable.spo2_pct,
            whoop_recovery_score: Some(recovery),
            whoop_sleep_score: wearable.sleep_score,
            data_source: Provenance::Wearable,
        })
    }

    /// Apply a user slider edit to a stored check-in
    ///
    /// Wearable-sourced days transition to `wearable+manual`; the
    /// transition is one-way for that day.
    pub fn record_manual_edit(checkin: &mut ReadinessCheckin) {
        let before = checkin.provenance;
        checkin.provenance = checkin.provenance.after_manual_edit();
        if before != checkin.provenance {
            debug!(
                date = %checkin.date,
                from = %before,
                to = %checkin.provenance,
                "readiness provenance transition"
            );
        }
    }

    /// Apply a wearable re-sync to an existing check-in
    ///
    /// Manual slider values are never overwritten. Auto-filled days are
    /// refreshed from the new snapshot; partially overridden days are
    /// refreshed only when the configured policy allows it, and their
    /// provenance stays `wearable+manual` regardless. Biometric fields are
    /// always refreshed.
    pub fn apply_resync(
        checkin: &mut ReadinessCheckin,
        wearable: &WearableRecovery,
        config: &EngineConfig,
    ) {
        let refresh_sliders = match checkin.provenance {
            Provenance::Manual => false,
            Provenance::Wearable => true,
            Provenance::WearableManual => config.sync.resync_overwrites_partial,
        };

        if refresh_sliders {
            if let Some(recovery) = wearable.recovery_score {
                checkin.sleep = config.autofill.sleep_slider(recovery, wearable.sleep_score);
                checkin.energy = config.autofill.energy_slider(recovery);
            }
        }

        checkin.wearable = Some(WearableBiometrics {
            hrv_ms: wearable.hrv_ms,
            resting_hr: wearable.resting_hr,
            spo2_pct: wearable.spo2_pct,
            recovery_score: wearable.recovery_score,
            sleep_score: wearable.sleep_score,
        });
    }

    fn from_checkin(
        checkin: &ReadinessCheckin,
        snapshot: Option<&WearableRecovery>,
    ) -> Result<ReconciledReadiness, ValidationError> {
        let (composite, band) = ReadinessScorer::score_with_band(
            checkin.sleep,
            checkin.stress,
            checkin.soreness,
            checkin.energy,
        )?;

        // Check-in-attached biometrics win over the raw snapshot; the
        // snapshot fills any gaps.
        let attached = checkin.wearable.clone().unwrap_or_default();
        let recovery_score = attached
            .recovery_score
            .or_else(|| snapshot.and_then(|s| s.recovery_score));

        Ok(ReconciledReadiness {
            provenance: checkin.provenance,
            sleep: Some(checkin.sleep),
            stress: Some(checkin.stress),
            soreness: Some(checkin.soreness),
            energy: Some(checkin.energy),
            composite: Some(composite),
            band: Some(band),
            hotspot: checkin.hotspot.clone(),
            recovery_score,
            recovery_band: recovery_score.map(RecoveryBand::from_score),
            hrv_ms: attached.hrv_ms.or_else(|| snapshot.and_then(|s| s.hrv_ms)),
            resting_hr: attached
                .resting_hr
                .or_else(|| snapshot.and_then(|s| s.resting_hr)),
            spo2_pct: attached
                .spo2_pct
                .or_else(|| snapshot.and_then(|s| s.spo2_pct)),
            wearable_sleep_score: attached
                .sleep_score
                .or_else(|| snapshot.and_then(|s| s.sleep_score)),
        })
    }

    fn from_wearable_only(
        wearable: &WearableRecovery,
        autofill: &AutoFillSettings,
    ) -> ReconciledReadiness {
        let sleep = wearable
            .recovery_score
            .map(|r| autofill.sleep_slider(r, wearable.sleep_score));
        let energy = wearable.recovery_score.map(|r| autofill.energy_slider(r));

        ReconciledReadiness {
            provenance: Provenance::Wearable,
            sleep,
            stress: None,
            soreness: None,
            energy,
            // Stress and soreness are unknown without a check-in; a
            // composite from partial data would be fabricated.
            composite: None,
            band: None,
            hotspot: None,
            recovery_score: wearable.recovery_score,
            recovery_band: wearable.recovery_score.map(RecoveryBand::from_score),
            hrv_ms: wearable.hrv_ms,
            resting_hr: wearable.resting_hr,
            spo2_pct: wearable.spo2_pct,
            wearable_sleep_score: wearable.sleep_score,
        }
    }
}
