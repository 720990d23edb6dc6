//! Trend and load context derived from recent check-ins and sessions
//!
//! Pure helpers over history slices. Callers pass whatever window they
//! have; every function re-filters by date so over-fetching is harmless.

use chrono::NaiveDate;

use crate::models::{ClassType, ReadinessCheckin, TrainingSession};

/// Baseline window for HRV comparisons, in days before the evaluation day
pub const HRV_BASELINE_DAYS: i64 = 7;

/// Single-day HRV drop below baseline considered significant, in percent
pub const HRV_DROP_PCT: f64 = 15.0;

/// Consecutive declining days counted as a sustained HRV decline
pub const HRV_DECLINE_DAYS: usize = 3;

/// HRV trend relative to a short rolling baseline
#[derive(Debug, Clone, PartialEq)]
pub struct HrvTrend {
    /// Mean RMSSD over the baseline window, excluding the evaluation day
    pub baseline_ms: Option<f64>,

    /// RMSSD on the evaluation day
    pub latest_ms: Option<f64>,

    /// Percent below baseline (positive = below); present when both sides exist
    pub drop_pct: Option<f64>,

    /// Whether RMSSD declined on each of the last [`HRV_DECLINE_DAYS`] days
    pub sustained_decline: bool,
}

impl HrvTrend {
    /// Compute the trend from check-in history as of `today`
    pub fn from_checkins(checkins: &[ReadinessCheckin], today: NaiveDate) -> Self {
        let mut dated: Vec<(NaiveDate, f64)> = checkins
            .iter()
            .filter(|c| c.date <= today)
            .filter_map(|c| c.wearable.as_ref()?.hrv_ms.map(|h| (c.date, h)))
            .collect();
        dated.sort_by_key(|(d, _)| *d);
        dated.dedup_by_key(|(d, _)| *d);

        let latest_ms = dated
            .last()
            .filter(|(d, _)| *d == today)
            .map(|(_, h)| *h);

        let baseline_values: Vec<f64> = dated
            .iter()
            .filter(|(d, _)| *d < today && (today - *d).num_days() <= HRV_BASELINE_DAYS)
            .map(|(_, h)| *h)
            .collect();
        let baseline_ms = if baseline_values.is_empty() {
            None
        } else {
            Some(baseline_values.iter().sum::<f64>() / baseline_values.len() as f64)
        };

        let drop_pct = match (latest_ms, baseline_ms) {
            (Some(latest), Some(baseline)) if baseline > 0.0 => {
                Some((baseline - latest) / baseline * 100.0)
            }
            _ => None,
        };

        // Strictly declining run over the most recent readings
        let sustained_decline = dated.len() > HRV_DECLINE_DAYS
            && dated
                .windows(2)
                .rev()
                .take(HRV_DECLINE_DAYS)
                .all(|w| w[1].1 < w[0].1);

        HrvTrend {
            baseline_ms,
            latest_ms,
            drop_pct,
            sustained_decline,
        }
    }

    /// Whether today's reading sits significantly below baseline
    pub fn has_significant_drop(&self) -> bool {
        self.drop_pct.map_or(false, |d| d > HRV_DROP_PCT)
    }
}

/// Aggregations over recent check-ins
pub struct CheckinHistory;

impl CheckinHistory {
    /// Mean sleep slider over the last `days` days ending at `today`
    pub fn avg_sleep(checkins: &[ReadinessCheckin], today: NaiveDate, days: i64) -> Option<f64> {
        let values: Vec<f64> = checkins
            .iter()
            .filter(|c| c.date <= today && (today - c.date).num_days() < days)
            .map(|c| f64::from(c.sleep))
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    /// Number of days in the window with an active hotspot note
    pub fn hotspot_days(checkins: &[ReadinessCheckin], today: NaiveDate, days: i64) -> usize {
        checkins
            .iter()
            .filter(|c| c.date <= today && (today - c.date).num_days() < days)
            .filter(|c| c.hotspot.as_deref().is_some_and(|h| !h.trim().is_empty()))
            .count()
    }
}

/// Aggregations over recent training sessions
pub struct TrainingLoad;

impl TrainingLoad {
    /// Sessions within the last `days` days ending at `today`
    pub fn sessions_within(
        sessions: &[TrainingSession],
        today: NaiveDate,
        days: i64,
    ) -> usize {
        sessions
            .iter()
            .filter(|s| s.date <= today && (today - s.date).num_days() < days)
            .count()
    }

    /// Distinct training days within the last `days` days ending at `today`
    pub fn training_days_within(
        sessions: &[TrainingSession],
        today: NaiveDate,
        days: i64,
    ) -> usize {
        let mut dates: Vec<NaiveDate> = sessions
            .iter()
            .filter(|s| s.date <= today && (today - s.date).num_days() < days)
            .map(|s| s.date)
            .collect();
        dates.sort();
        dates.dedup();
        dates.len()
    }

    /// Length of the consecutive-day training streak ending at `today` or
    /// the day before
    pub fn consecutive_day_streak(sessions: &[TrainingSession], today: NaiveDate) -> u32 {
        let mut dates: Vec<NaiveDate> = sessions.iter().map(|s| s.date).collect();
        dates.sort();
        dates.dedup();

        let mut streak = 0u32;
        let mut cursor = if dates.binary_search(&today).is_ok() {
            today
        } else {
            today - chrono::Duration::days(1)
        };

        while dates.binary_search(&cursor).is_ok() {
            streak += 1;
            cursor = cursor - chrono::Duration::days(1);
        }
        streak
    }

    /// Trailing run of grappling sessions sharing one class type
    ///
    /// Returns the type and run length of the most recent grappling
    /// sessions, stopping at the first session of a different type.
    /// Supplementary sessions are skipped, not counted.
    pub fn trailing_class_type_run(
        sessions: &[TrainingSession],
        today: NaiveDate,
    ) -> Option<(ClassType, usize)> {
        let mut recent: Vec<&TrainingSession> = sessions
            .iter()
            .filter(|s| s.date <= today && s.class_type.is_grappling())
            .collect();
        recent.sort_by_key(|s| s.date);

        let last = recent.last()?;
        let run_type = last.class_type;
        let run = recent
            .iter()
            .rev()
            .take_while(|s| s.class_type == run_type)
            .count();
        Some((run_type, run))
    }

    /// Highest intensity logged on a given day
    pub fn max_intensity_on(sessions: &[TrainingSession], date: NaiveDate) -> Option<u8> {
        sessions
            .iter()
            .filter(|s| s.date == date)
            .map(|s| s.intensity)
            .max()
    }

    /// Days since the last session matching `class_types`
    pub fn days_since_class_type(
        sessions: &[TrainingSession],
        today: NaiveDate,
        class_types: &[ClassType],
    ) -> Option<i64> {
        sessions
            .iter()
            .filter(|s| s.date <= today && class_types.contains(&s.class_type))
            .map(|s| (today - s.date).num_days())
            .min()
    }
}
