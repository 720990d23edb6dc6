//! Rule-triggered daily training recommendations
//!
//! The catalog is a fixed table of plain records (name, priority,
//! predicate, template) rather than a trait hierarchy, so each rule is
//! testable in isolation and the whole table is readable at a glance.
//! Rules are not mutually exclusive; everything that fires is kept,
//! stable-sorted by ascending priority (lower = more urgent), and the top
//! three are surfaced to the UI while the full set is retained for
//! analytics.
//!
//! The suggestion label comes from the readiness composite band; on days
//! with no manual check-in the wearable recovery band is the fallback
//! signal. With no data at all the engine degrades to an empty rule set
//! and a "Check In" prompt instead of failing.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::history::{CheckinHistory, HrvTrend, TrainingLoad};
use crate::models::{ClassType, CompetitionEvent, CompetitionPhase, ReadinessCheckin, TrainingSession};
use crate::readiness::ReadinessBand;
use crate::reconcile::{RecoveryBand, ReconciledReadiness};

/// Number of triggered rules surfaced to the UI
pub const TOP_RULES_LIMIT: usize = 3;

/// Everything a rule predicate may look at
///
/// Derived signals (HRV trend, class-type runs) are computed once at
/// construction so the predicates stay cheap table lookups.
pub struct RuleContext<'a> {
    /// Day being evaluated
    pub today: NaiveDate,

    /// Reconciled readiness state for the day, when any exists
    pub readiness: Option<&'a ReconciledReadiness>,

    /// Recent check-ins, any order; used for trends
    pub recent_checkins: &'a [ReadinessCheckin],

    /// Recent training sessions, any order; used for load context
    pub recent_sessions: &'a [TrainingSession],

    /// Next competition on the calendar
    pub upcoming_event: Option<&'a CompetitionEvent>,

    /// Whether the athlete has recovery mode switched on
    pub recovery_mode: bool,

    /// HRV trend derived from `recent_checkins`
    pub hrv: HrvTrend,

    /// Trailing same-class-type grappling run
    pub class_run: Option<(ClassType, usize)>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        today: NaiveDate,
        readiness: Option<&'a ReconciledReadiness>,
        recent_checkins: &'a [ReadinessCheckin],
        recent_sessions: &'a [TrainingSession],
        upcoming_event: Option<&'a CompetitionEvent>,
        recovery_mode: bool,
    ) -> Self {
        RuleContext {
            today,
            readiness,
            recent_checkins,
            recent_sessions,
            upcoming_event,
            recovery_mode,
            hrv: HrvTrend::from_checkins(recent_checkins, today),
            class_run: TrainingLoad::trailing_class_type_run(recent_sessions, today),
        }
    }

    fn phase(&self) -> Option<CompetitionPhase> {
        self.upcoming_event.and_then(|e| e.phase(self.today))
    }

    fn hotspot(&self) -> Option<&str> {
        let active = self
            .readiness
            .and_then(|r| r.hotspot.as_deref())
            .filter(|h| !h.trim().is_empty());
        active.or_else(|| {
            // Fall back to the latest check-in's note; a cleared note
            // stays cleared even when older check-ins still carry one
            self.recent_checkins
                .iter()
                .filter(|c| c.date <= self.today)
                .max_by_key(|c| c.date)
                .and_then(|c| c.hotspot.as_deref())
                .filter(|h| !h.trim().is_empty())
        })
    }

    fn slider(&self, get: fn(&ReconciledReadiness) -> Option<u8>) -> Option<u8> {
        self.readiness.and_then(get)
    }

    fn recovery_score(&self) -> Option<u8> {
        self.readiness.and_then(|r| r.recovery_score)
    }

    fn has_no_inputs(&self) -> bool {
        self.readiness.is_none()
            && self.recent_checkins.is_empty()
            && self.recent_sessions.is_empty()
            && self.upcoming_event.is_none()
    }
}

/// One catalog entry: a named, prioritized predicate with its template
pub struct RuleDef {
    /// Stable rule identifier
    pub name: &'static str,

    /// Urgency; lower fires earlier in the surfaced list
    pub priority: u8,

    /// Recommendation template; `{token}` placeholders are substituted
    /// from context and stripped when unresolved
    pub template: &'static str,

    /// Why the rule exists, shown alongside the recommendation
    pub explanation: &'static str,

    /// Pure predicate over the evaluation context
    pub predicate: fn(&RuleContext) -> bool,
}

/// A rule that fired during evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredRule {
    /// Stable rule identifier
    pub name: String,

    /// Recommendation text with placeholders resolved
    pub recommendation: String,

    /// Why the rule fired
    pub explanation: String,

    /// Rule priority (lower = more urgent)
    pub priority: u8,
}

/// Daily suggestion label derived from readiness bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionLabel {
    TrainHard,
    LightSession,
    RestDay,
    CheckIn,
}

impl fmt::Display for SuggestionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionLabel::TrainHard => write!(f, "Train Hard"),
            SuggestionLabel::LightSession => write!(f, "Light Session"),
            SuggestionLabel::RestDay => write!(f, "Rest Day"),
            SuggestionLabel::CheckIn => write!(f, "Check In"),
        }
    }
}

/// Result of evaluating the catalog for a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Suggestion label for the day
    pub label: SuggestionLabel,

    /// Sanitized suggestion sentence
    pub suggestion: String,

    /// Every rule that fired, sorted by ascending priority
    pub triggered_rules: Vec<TriggeredRule>,
}

impl Evaluation {
    /// The rules surfaced to the UI; trimming never reorders
    pub fn top_rules(&self) -> &[TriggeredRule] {
        let n = self.triggered_rules.len().min(TOP_RULES_LIMIT);
        &self.triggered_rules[..n]
    }
}

// ---------------------------------------------------------------------------
// Rule predicates
// ---------------------------------------------------------------------------

fn rule_recovery_mode_active(ctx: &RuleContext) -> bool {
    ctx.recovery_mode
}

fn rule_persistent_injuries(ctx: &RuleContext) -> bool {
    CheckinHistory::hotspot_days(ctx.recent_checkins, ctx.today, 7) >= 3
}

fn rule_hotspot_active(ctx: &RuleContext) -> bool {
    ctx.readiness
        .and_then(|r| r.hotspot.as_deref())
        .is_some_and(|h| !h.trim().is_empty())
}

fn rule_comp_fight_week(ctx: &RuleContext) -> bool {
    ctx.phase() == Some(CompetitionPhase::FightWeek)
}

fn rule_comp_taper_warning(ctx: &RuleContext) -> bool {
    ctx.phase() == Some(CompetitionPhase::Taper)
        && TrainingLoad::sessions_within(ctx.recent_sessions, ctx.today, 7) >= 4
}

fn rule_high_stress_low_energy(ctx: &RuleContext) -> bool {
    let stress = ctx.slider(|r| r.stress);
    let energy = ctx.slider(|r| r.energy);
    matches!((stress, energy), (Some(s), Some(e)) if s >= 4 && e <= 2)
}

fn rule_high_soreness(ctx: &RuleContext) -> bool {
    ctx.slider(|r| r.soreness).is_some_and(|s| s >= 4)
}

fn rule_sleep_debt_high(ctx: &RuleContext) -> bool {
    CheckinHistory::avg_sleep(ctx.recent_checkins, ctx.today, 3).is_some_and(|avg| avg <= 2.0)
}

fn rule_whoop_low_recovery(ctx: &RuleContext) -> bool {
    ctx.recovery_score()
        .map(RecoveryBand::from_score)
        .is_some_and(|b| b == RecoveryBand::Low)
}

fn rule_whoop_hrv_sustained_decline(ctx: &RuleContext) -> bool {
    ctx.hrv.sustained_decline
}

fn rule_whoop_hrv_drop(ctx: &RuleContext) -> bool {
    ctx.hrv.has_significant_drop()
}

fn rule_rest_after_high_intensity(ctx: &RuleContext) -> bool {
    let yesterday = ctx.today - Duration::days(1);
    TrainingLoad::max_intensity_on(ctx.recent_sessions, yesterday).is_some_and(|i| i >= 5)
}

fn rule_deload_week(ctx: &RuleContext) -> bool {
    TrainingLoad::training_days_within(ctx.recent_sessions, ctx.today, 21) >= 15
}

fn rule_comp_peak_phase(ctx: &RuleContext) -> bool {
    ctx.phase() == Some(CompetitionPhase::Peak)
}

fn rule_session_frequency_low(ctx: &RuleContext) -> bool {
    !ctx.recent_sessions.is_empty()
        && TrainingLoad::sessions_within(ctx.recent_sessions, ctx.today, 14) < 2
}

fn rule_consecutive_gi(ctx: &RuleContext) -> bool {
    matches!(ctx.class_run, Some((ClassType::Gi, run)) if run >= 3)
}

fn rule_consecutive_nogi(ctx: &RuleContext) -> bool {
    matches!(ctx.class_run, Some((ClassType::NoGi, run)) if run >= 3)
}

fn rule_stale_technique(ctx: &RuleContext) -> bool {
    // Only nag athletes who are actually on the mats
    TrainingLoad::sessions_within(ctx.recent_sessions, ctx.today, 14) >= 3
        && TrainingLoad::days_since_class_type(
            ctx.recent_sessions,
            ctx.today,
            &[ClassType::Drilling, ClassType::Private],
        )
        .map_or(true, |days| days > 14)
}

fn rule_comp_base_building(ctx: &RuleContext) -> bool {
    ctx.phase() == Some(CompetitionPhase::Base)
}

fn rule_whoop_green_recovery(ctx: &RuleContext) -> bool {
    ctx.recovery_score()
        .map(RecoveryBand::from_score)
        .is_some_and(|b| b == RecoveryBand::High)
}

fn rule_green_light(ctx: &RuleContext) -> bool {
    ctx.readiness.is_some_and(|r| {
        r.band == Some(ReadinessBand::High)
            && r.soreness.is_some_and(|s| s <= 2)
            && r.stress.is_some_and(|s| s <= 2)
            && r.hotspot.as_deref().map_or(true, |h| h.trim().is_empty())
    })
}

/// The fixed rule catalog, in insertion order
///
/// Insertion order is the tie-break for equal priorities; the sort in
/// [`RuleEngine::evaluate`] is stable.
pub const CATALOG: &[RuleDef] = &[
    RuleDef {
        name: "recovery_mode_active",
        priority: 5,
        template: "Recovery mode is on. Keep today to mobility and light drilling.",
        explanation: "You switched on recovery mode, so hard training is paused.",
        predicate: rule_recovery_mode_active,
    },
    RuleDef {
        name: "persistent_injuries",
        priority: 8,
        template: "You've flagged {hotspot} on several days this week. Get it looked at before taking hard rounds.",
        explanation: "The same problem area has appeared in three or more check-ins over the last week.",
        predicate: rule_persistent_injuries,
    },
    RuleDef {
        name: "hotspot_active",
        priority: 10,
        template: "Protect the {hotspot} today. Pick partners and positions that keep it out of danger.",
        explanation: "Today's check-in notes an active problem area.",
        predicate: rule_hotspot_active,
    },
    RuleDef {
        name: "comp_fight_week",
        priority: 12,
        template: "{event} is {days_until} days out. Sharpen your A-game and keep rounds short and crisp.",
        explanation: "Your next competition is within seven days.",
        predicate: rule_comp_fight_week,
    },
    RuleDef {
        name: "comp_taper_warning",
        priority: 15,
        template: "{event} is close and your volume is still high. Start tapering so you arrive fresh.",
        explanation: "The event is one to two weeks out and you trained four or more times in the last week.",
        predicate: rule_comp_taper_warning,
    },
    RuleDef {
        name: "high_stress_low_energy",
        priority: 18,
        template: "Stress is high and the tank is low. A light technical session beats a war today.",
        explanation: "Today's check-in reports stress at 4+ with energy at 2 or below.",
        predicate: rule_high_stress_low_energy,
    },
    RuleDef {
        name: "high_soreness",
        priority: 20,
        template: "Soreness is high. Flow rounds or drilling today, save the hard rolls.",
        explanation: "Today's check-in reports soreness at 4 or above.",
        predicate: rule_high_soreness,
    },
    RuleDef {
        name: "sleep_debt_high",
        priority: 22,
        template: "You've been running on short sleep for days. Prioritize an early night over extra mat time.",
        explanation: "Average sleep quality over the last three check-ins is 2 or below.",
        predicate: rule_sleep_debt_high,
    },
    RuleDef {
        name: "whoop_low_recovery",
        priority: 25,
        template: "Recovery is in the red at {recovery}%. Treat today as active recovery.",
        explanation: "Your wearable recovery score is in the low band.",
        predicate: rule_whoop_low_recovery,
    },
    RuleDef {
        name: "whoop_hrv_sustained_decline",
        priority: 28,
        template: "HRV has been sliding for several days. Back off intensity before your body forces the issue.",
        explanation: "HRV declined on each of the last three days.",
        predicate: rule_whoop_hrv_sustained_decline,
    },
    RuleDef {
        name: "whoop_hrv_drop",
        priority: 30,
        template: "HRV dropped well below your baseline overnight. Keep intensity easy today.",
        explanation: "Today's HRV is more than 15% below your seven-day baseline.",
        predicate: rule_whoop_hrv_drop,
    },
    RuleDef {
        name: "rest_after_high_intensity",
        priority: 32,
        template: "Yesterday was a max-effort day. An easy session or full rest today consolidates the gains.",
        explanation: "You logged a maximum-intensity session yesterday.",
        predicate: rule_rest_after_high_intensity,
    },
    RuleDef {
        name: "deload_week",
        priority: 35,
        template: "Three heavy weeks without a break. Schedule a deload week before something gives.",
        explanation: "You trained on fifteen or more of the last twenty-one days.",
        predicate: rule_deload_week,
    },
    RuleDef {
        name: "comp_peak_phase",
        priority: 40,
        template: "Peak phase for {event}. Hard, specific rounds now; the taper comes later.",
        explanation: "The event is three to four weeks out.",
        predicate: rule_comp_peak_phase,
    },
    RuleDef {
        name: "session_frequency_low",
        priority: 45,
        template: "Only a couple of sessions lately. Even a short class keeps the timing sharp.",
        explanation: "Fewer than two sessions logged in the last two weeks.",
        predicate: rule_session_frequency_low,
    },
    RuleDef {
        name: "consecutive_gi",
        priority: 50,
        template: "That's {streak} gi sessions in a row. Mix in some no-gi to round out your game.",
        explanation: "Your last three or more grappling sessions were all gi.",
        predicate: rule_consecutive_gi,
    },
    RuleDef {
        name: "consecutive_nogi",
        priority: 52,
        template: "That's {streak} no-gi sessions in a row. Put the gi back on to keep your grips honest.",
        explanation: "Your last three or more grappling sessions were all no-gi.",
        predicate: rule_consecutive_nogi,
    },
    RuleDef {
        name: "stale_technique",
        priority: 55,
        template: "All rolling, no drilling lately. Book a drilling or private session to add something new.",
        explanation: "No drilling or private session in more than two weeks of regular training.",
        predicate: rule_stale_technique,
    },
    RuleDef {
        name: "comp_base_building",
        priority: 60,
        template: "Long runway until {event}. Build the engine: volume, positions, conditioning.",
        explanation: "The event is more than four weeks out.",
        predicate: rule_comp_base_building,
    },
    RuleDef {
        name: "whoop_green_recovery",
        priority: 65,
        template: "Recovery is green at {recovery}%. Your body is primed for a hard session.",
        explanation: "Your wearable recovery score is in the high band.",
        predicate: rule_whoop_green_recovery,
    },
    RuleDef {
        name: "green_light",
        priority: 70,
        template: "Everything is green today. Go train hard.",
        explanation: "High readiness with low stress, low soreness, and no active hotspot.",
        predicate: rule_green_light,
    },
];

/// Daily recommendation engine over the fixed catalog
pub struct RuleEngine;

impl RuleEngine {
    /// Evaluate the catalog against a day's context
    ///
    /// Never fails: absent inputs degrade to an empty rule set and a
    /// "Check In" prompt.
    pub fn evaluate(ctx: &RuleContext) -> Evaluation {
        let label = Self::label_for(ctx);

        if ctx.has_no_inputs() {
            return Evaluation {
                label,
                suggestion: "Check in to get today's recommendation.".to_string(),
                triggered_rules: Vec::new(),
            };
        }

        let mut triggered: Vec<TriggeredRule> = CATALOG
            .iter()
            .filter(|rule| (rule.predicate)(ctx))
            .map(|rule| {
                debug!(rule = rule.name, priority = rule.priority, "rule fired");
                TriggeredRule {
                    name: rule.name.to_string(),
                    recommendation: sanitize_suggestion(&substitute_tokens(rule.template, ctx)),
                    explanation: rule.explanation.to_string(),
                    priority: rule.priority,
                }
            })
            .collect();

        // Stable: equal priorities keep catalog insertion order
        triggered.sort_by_key(|r| r.priority);

        let suggestion = triggered
            .first()
            .map(|r| r.recommendation.clone())
            .unwrap_or_else(|| default_suggestion(label));

        Evaluation {
            label,
            suggestion,
            triggered_rules: triggered,
        }
    }

    /// Suggestion label for the day
    ///
    /// Manual check-in readiness always wins; the wearable recovery band
    /// is only a fallback when no composite exists.
    fn label_for(ctx: &RuleContext) -> SuggestionLabel {
        if let Some(band) = ctx.readiness.and_then(|r| r.band) {
            return match band {
                ReadinessBand::High => SuggestionLabel::TrainHard,
                ReadinessBand::Moderate => SuggestionLabel::LightSession,
                ReadinessBand::Low => SuggestionLabel::RestDay,
            };
        }
        if let Some(band) = ctx.readiness.and_then(|r| r.recovery_band) {
            return match band {
                RecoveryBand::High => SuggestionLabel::TrainHard,
                RecoveryBand::Moderate => SuggestionLabel::LightSession,
                RecoveryBand::Low => SuggestionLabel::RestDay,
            };
        }
        SuggestionLabel::CheckIn
    }
}

fn default_suggestion(label: SuggestionLabel) -> String {
    match label {
        SuggestionLabel::TrainHard => "You're cleared to push the pace today.".to_string(),
        SuggestionLabel::LightSession => "Keep today technical and moderate.".to_string(),
        SuggestionLabel::RestDay => "Take the day off the mats.".to_string(),
        SuggestionLabel::CheckIn => "Check in to get today's recommendation.".to_string(),
    }
}

/// Resolve `{token}` placeholders from the evaluation context
fn substitute_tokens(template: &str, ctx: &RuleContext) -> String {
    let mut text = template.to_string();

    if let Some(hotspot) = ctx.hotspot() {
        text = text.replace("{hotspot}", hotspot);
    }
    if let Some(event) = ctx.upcoming_event {
        text = text.replace("{event}", &event.name);
        text = text.replace("{days_until}", &event.days_until(ctx.today).to_string());
    }
    if let Some(recovery) = ctx.recovery_score() {
        text = text.replace("{recovery}", &recovery.to_string());
    }
    if let Some((_, run)) = ctx.class_run {
        text = text.replace("{streak}", &run.to_string());
    }

    text
}

/// Strip unresolved `{token}` placeholders and collapse the double spaces
/// they leave behind
///
/// Idempotent: sanitizing already-clean text returns it unchanged.
pub fn sanitize_suggestion(text: &str) -> String {
    let mut stripped = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '{' {
            stripped.push(c);
            continue;
        }
        let mut token = String::new();
        let mut closed = false;
        for n in chars.by_ref() {
            if n == '}' {
                closed = true;
                break;
            }
            token.push(n);
        }
        if !closed {
            // Unmatched brace is plain text, keep it
            stripped.push('{');
            stripped.push_str(&token);
        }
    }

    let mut collapsed = String::with_capacity(stripped.len());
    let mut prev_space = false;
    for c in stripped.chars() {
        if c == ' ' {
            if !prev_space {
                collapsed.push(c);
            }
            prev_space = true;
        } else {
            prev_space = false;
            collapsed.push(c);
        }
    }

    collapsed.trim().to_string()
}
