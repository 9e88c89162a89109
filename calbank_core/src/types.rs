//! Core domain types for the calorie banking system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Weekly goals and the calorie banking plan
//! - Daily ledger records and the derived bank status
//! - Overeating events and recovery plans
//! - Banking plan validation results

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Goal and Banking Types
// ============================================================================

/// Goal parameters produced by an external onboarding/goal-setup flow.
///
/// The core treats this as opaque input: it never derives or second-guesses
/// these numbers, it only reads them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GoalConfiguration {
    /// Per-day calorie target before any banking adjustment
    pub daily_baseline: i32,
    /// Signed weekly energy goal (negative = deficit)
    pub weekly_deficit_target: i32,
    /// Estimated weeks until the main goal is reached, if known
    pub estimated_weeks_to_goal: Option<u32>,
    /// User weight in kg, used only for workout-equivalent estimates
    pub user_weight_kg: Option<f64>,
}

/// The authoritative weekly calorie budget.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeeklyGoal {
    /// Monday anchor of the week; immutable once set for the week
    pub week_start: NaiveDate,
    /// Weekly calorie target (7 × daily baseline)
    pub total_target: i32,
    /// Per-day calorie target before banking
    pub daily_baseline: i32,
    /// Signed weekly deficit/surplus goal (negative = deficit)
    pub deficit_target: i32,
    /// Total calories permitted for the week (may differ from total_target
    /// due to rollover)
    pub weekly_allowance: i32,
    /// At most one active banking plan per week
    pub banking_plan: Option<CalorieBankingPlan>,
}

impl WeeklyGoal {
    /// Build a fresh weekly goal from a goal configuration.
    pub fn from_configuration(config: &GoalConfiguration, week_start: NaiveDate) -> Self {
        let total = config.daily_baseline * 7;
        Self {
            week_start,
            total_target: total,
            daily_baseline: config.daily_baseline,
            deficit_target: config.weekly_deficit_target,
            weekly_allowance: total,
            banking_plan: None,
        }
    }

    /// The currently active banking plan, if any.
    pub fn active_plan(&self) -> Option<&CalorieBankingPlan> {
        self.banking_plan.as_ref().filter(|p| p.is_active)
    }
}

/// A pre-committed reallocation of calories from several reduction days onto
/// one target day within the same week.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalorieBankingPlan {
    pub id: Uuid,
    /// Must equal the owning WeeklyGoal's week
    pub week_start: NaiveDate,
    /// The day receiving the surplus
    pub target_date: NaiveDate,
    /// Positive calories subtracted per reduction day
    pub daily_reduction: i32,
    /// daily_reduction × remaining_days_count, fixed at creation
    pub total_banked: i32,
    /// Count of eligible reduction days at plan-creation time
    pub remaining_days_count: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-day ledger entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DailyCalorieRecord {
    pub date: NaiveDate,
    pub consumed: i32,
    pub burned: i32,
    /// Baseline target before banking
    pub target: i32,
    /// Effective target for the day, frozen once computed. Does not change
    /// retroactively as meals are logged or plans are recreated.
    pub locked_target: Option<i32>,
    /// Signed delta applied by an active banking plan or an applied recovery
    /// option; 0 if none
    pub banking_adjustment: i32,
}

impl DailyCalorieRecord {
    /// A fresh record for a day with nothing logged yet.
    pub fn empty(date: NaiveDate, target: i32) -> Self {
        Self {
            date,
            consumed: 0,
            burned: 0,
            target,
            locked_target: None,
            banking_adjustment: 0,
        }
    }

    /// Net calories used for the day.
    pub fn used(&self) -> i32 {
        self.consumed - self.burned
    }

    /// The day's effective target: the locked value if frozen, otherwise
    /// baseline plus any banking adjustment.
    pub fn effective_target(&self) -> i32 {
        self.locked_target
            .unwrap_or(self.target + self.banking_adjustment)
    }
}

// ============================================================================
// Bank Status (derived projection)
// ============================================================================

/// Where the week is heading if consumption continues at the current pace.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectedOutcome {
    OnTrack,
    OverBudget,
    UnderBudget,
}

/// Read-only projection of the weekly ledger, computed on demand.
///
/// Never persisted; recomputing with identical inputs yields identical
/// output.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalorieBankStatus {
    pub weekly_allowance: i32,
    pub total_consumed: i32,
    pub total_burned: i32,
    /// consumed − burned over all recorded days including today
    pub total_used: i32,
    /// weekly_allowance − total_used
    pub remaining: i32,
    /// Remaining after reserving today's locked allotment
    pub remaining_for_future_days: i32,
    /// Days left in the week, today included
    pub days_left: u32,
    pub days_left_excluding_today: u32,
    /// Average allowance per remaining future day. Negative values are
    /// reported as-is so the caller can surface the deficit.
    pub daily_average: i32,
    /// Today's effective (locked) target
    pub today_target: i32,
    /// Conservative recommendation for today, buffered below the exact edge
    /// of the budget
    pub safe_to_eat_today: i32,
    pub projected_outcome: ProjectedOutcome,
}

// ============================================================================
// Banking Plan Validation
// ============================================================================

/// A blocking problem with a proposed banking plan.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BankingPlanError {
    /// Cannot bank onto a day that has already passed
    TargetDateInPast { target_date: NaiveDate },
    /// Target day must fall within the current week
    TargetDateOutsideWeek {
        target_date: NaiveDate,
        week_start: NaiveDate,
    },
    /// No eligible reduction days remain before the target
    NoDaysToReduce,
    /// The reduction would push a day below the safety floor. Hard error,
    /// never just a warning.
    UnsafeDailyReduction { lowest_target: i32, floor: i32 },
    /// Reduction must be a positive number of calories
    NonPositiveReduction { daily_reduction: i32 },
}

/// A non-blocking advisory about a proposed banking plan.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BankingPlanWarning {
    /// Total banked exceeds the configured share of the weekly allowance
    LargeBankingAmount { total_banked: i32, cap: i32 },
}

/// Per-day effect of a proposed banking plan.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayImpact {
    pub date: NaiveDate,
    pub reduction: i32,
    pub new_target: i32,
}

/// Preview of what a banking plan would do to the week.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImpactPreview {
    pub per_day: Vec<DayImpact>,
    pub min_daily_calories: i32,
    pub total_banked: i32,
    pub days_affected: u32,
}

/// Result of validating a proposed banking plan. Errors and warnings are
/// returned together so the caller can render all of them at once.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BankingPlanValidation {
    pub errors: Vec<BankingPlanError>,
    pub warnings: Vec<BankingPlanWarning>,
    pub impact_preview: Option<ImpactPreview>,
}

impl BankingPlanValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

// ============================================================================
// Overeating Detection Types
// ============================================================================

/// How an overeating excursion is classified.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    Mild,
    Moderate,
    Severe,
}

/// Which detection rule set to apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionMode {
    /// Compare today's consumption against today's target only
    Simple,
    /// Consider the whole week's bank balance before raising an event
    BankAware,
}

/// A detected, significant excess over the safe weekly trajectory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OvereatingEvent {
    pub id: Uuid,
    pub date: NaiveDate,
    /// In bank-aware mode this is the absolute weekly deficit, not the raw
    /// daily overage
    pub excess_calories: i32,
    pub trigger_type: TriggerType,
    pub detected_at: DateTime<Utc>,
    /// Set by the caller once the user has reviewed the event
    pub user_acknowledged: bool,
}

// ============================================================================
// Recovery Plan Types
// ============================================================================

/// The recommended overall approach for recovering from an event.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RecoveryStrategy {
    GentleRebalancing,
    ModerateCorrection,
    MaintenanceWeek,
}

/// Supportive framing of an overeating event, parameterized with the
/// computed impact numbers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Reframe {
    pub message: String,
    pub focus_point: String,
    pub success_reminder: String,
}

/// Bounded, explainable math describing what the excess actually means.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    /// Excess as a share of the weekly allowance, 1 decimal, capped at 1000
    pub weekly_budget_impact_pct: f64,
    /// Excess as a share of the weekly deficit goal, 1 decimal, capped at 1000
    pub weekly_deficit_impact_pct: f64,
    /// Excess as a share of the whole journey's planned deficit
    pub main_goal_impact_pct: f64,
    /// Days of normal deficit needed to absorb the excess, capped at 365
    pub days_to_recover: u32,
    /// Rough workout equivalents, capped at 50
    pub equivalent_workouts: f64,
    pub reframe: Reframe,
}

/// Which rebalancing shape an option takes.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RebalancingKind {
    GentleSevenDay,
    ModerateFiveDay,
    QuickThreeDay,
    MaintenanceWeek,
}

/// How demanding an option is to follow.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EffortLevel {
    Minimal,
    Gentle,
    Moderate,
    Challenging,
}

/// How risky an option is relative to the safety floor.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,
    Moderate,
    Aggressive,
}

/// Advisory tag attached to an option.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    Recommended,
    Advanced,
    NotRecommended,
}

/// Per-day consequence of picking an option.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptionImpact {
    pub new_daily_target: i32,
    pub effort_level: EffortLevel,
    pub risk_level: RiskLevel,
}

/// One proposed multi-day rebalancing. Options that would breach the safety
/// floor are never constructed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RebalancingOption {
    pub kind: RebalancingKind,
    pub duration_days: u32,
    /// Signed; negative = daily reduction, 0 = maintenance
    pub daily_adjustment: i32,
    /// The floor this option was checked against
    pub min_safety_calories: i32,
    pub impact: OptionImpact,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub recommendation: Option<Recommendation>,
}

/// Output of recovery planning. References the event and goal by value of
/// their ids; owned by whoever requested it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecoveryPlan {
    pub id: Uuid,
    pub overeating_event_id: Uuid,
    pub strategy: RecoveryStrategy,
    pub impact_analysis: ImpactAnalysis,
    /// Ordered; at least the maintenance week survives, options that would
    /// breach the safety floor are dropped
    pub rebalancing_options: Vec<RebalancingOption>,
    pub created_at: DateTime<Utc>,
}
