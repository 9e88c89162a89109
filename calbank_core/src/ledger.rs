//! The weekly ledger: bank status projection and banking plan lifecycle.
//!
//! Everything here is a pure function over `(goal, records, today)`. The
//! caller owns the mutable store; functions that change state return fresh
//! `WeeklyGoal`/record vectors for the caller to persist.
//!
//! Locked daily targets are never altered retroactively: once a day's target
//! is frozen, creating or cancelling a banking plan leaves it alone.

use crate::rounding::round_calories;
use crate::types::*;
use crate::week;
use crate::{Config, Error, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

/// Compute the derived bank status for the week.
///
/// Pure and idempotent: identical inputs always yield identical output.
///
/// # Errors
/// - `EmptyGoal` if the weekly allowance is not positive
/// - `InvalidDateRange` if `today` falls outside the goal's week
pub fn compute_bank_status(
    goal: &WeeklyGoal,
    records: &[DailyCalorieRecord],
    today: NaiveDate,
    cfg: &Config,
) -> Result<CalorieBankStatus> {
    if goal.weekly_allowance <= 0 {
        return Err(Error::EmptyGoal(goal.weekly_allowance));
    }
    if !week::contains(goal.week_start, today) {
        return Err(Error::InvalidDateRange {
            date: today,
            week_start: goal.week_start,
        });
    }

    let week_records: Vec<&DailyCalorieRecord> = records
        .iter()
        .filter(|r| week::contains(goal.week_start, r.date))
        .collect();

    let total_consumed: i32 = week_records.iter().map(|r| r.consumed).sum();
    let total_burned: i32 = week_records.iter().map(|r| r.burned).sum();
    let total_used = total_consumed - total_burned;

    let days_left = week::days_left(goal.week_start, today);
    let days_left_excluding_today = days_left - 1;

    let today_record = week_records.iter().find(|r| r.date == today);
    let today_consumed = today_record.map(|r| r.consumed).unwrap_or(0);
    let today_target = today_record
        .map(|r| r.effective_target())
        .unwrap_or(goal.daily_baseline);

    let remaining = goal.weekly_allowance - total_used;

    // Reserve whatever is left of today's allotment before averaging over
    // future days. The reserve floors at zero: once today has blown past its
    // target the overage is already reflected in `remaining`.
    let today_reserve = (today_target - today_consumed).max(0);
    let remaining_for_future_days = remaining - today_reserve;

    let daily_average = round_calories(
        remaining_for_future_days as f64 / days_left_excluding_today.max(1) as f64,
    );

    // Safe-to-eat: the lesser of today's target and an even split of what
    // the rest of the week can still absorb, minus a small buffer so the
    // recommendation never sits at the exact edge of the budget.
    let used_other_days: i32 = week_records
        .iter()
        .filter(|r| r.date != today)
        .map(|r| r.used())
        .sum();
    let even_share_today =
        round_calories((goal.weekly_allowance - used_other_days) as f64 / days_left as f64);
    let buffer = round_calories(goal.daily_baseline as f64 * cfg.safety.safe_eat_buffer_pct);
    let safe_to_eat_today = (today_target.min(even_share_today) - buffer).max(0);

    let projected_outcome = project_outcome(goal, total_used, days_left, cfg);

    tracing::debug!(
        "Bank status for week {}: used {}/{} kcal, {} days left, outcome {:?}",
        goal.week_start,
        total_used,
        goal.weekly_allowance,
        days_left,
        projected_outcome
    );

    Ok(CalorieBankStatus {
        weekly_allowance: goal.weekly_allowance,
        total_consumed,
        total_burned,
        total_used,
        remaining,
        remaining_for_future_days,
        days_left,
        days_left_excluding_today,
        daily_average,
        today_target,
        safe_to_eat_today,
        projected_outcome,
    })
}

/// Project the end-of-week outcome assuming consumption continues at the
/// average pace observed so far.
fn project_outcome(
    goal: &WeeklyGoal,
    total_used: i32,
    days_left: u32,
    cfg: &Config,
) -> ProjectedOutcome {
    // Nothing logged yet: no trajectory to project
    if total_used == 0 {
        return ProjectedOutcome::OnTrack;
    }

    let days_elapsed = week::DAYS_PER_WEEK - days_left + 1;
    let avg_per_day = total_used as f64 / days_elapsed as f64;
    let projected_used = avg_per_day * week::DAYS_PER_WEEK as f64;
    let projected_remaining = goal.weekly_allowance as f64 - projected_used;

    let tolerance = goal.weekly_allowance as f64 * cfg.safety.on_track_tolerance_pct;
    if projected_remaining < -tolerance {
        ProjectedOutcome::OverBudget
    } else if projected_remaining > tolerance {
        ProjectedOutcome::UnderBudget
    } else {
        ProjectedOutcome::OnTrack
    }
}

/// The not-yet-locked days in `[today, target_date)` that a banking plan
/// would reduce. Days after the target keep their baseline: banking is
/// "saving up for a future day", not spreading around it.
fn eligible_reduction_days(
    records: &[DailyCalorieRecord],
    today: NaiveDate,
    target_date: NaiveDate,
) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut d = today;
    while d < target_date {
        let locked = records
            .iter()
            .find(|r| r.date == d)
            .map(|r| r.locked_target.is_some())
            .unwrap_or(false);
        if !locked {
            days.push(d);
        }
        d += Duration::days(1);
    }
    days
}

/// Validate a proposed banking plan.
///
/// Problems come back as `errors`/`warnings` lists rather than a failed
/// Result so the caller can render all of them at once. The impact preview
/// is populated whenever there is at least one reduction day to show.
pub fn validate_banking_plan(
    goal: &WeeklyGoal,
    records: &[DailyCalorieRecord],
    target_date: NaiveDate,
    daily_reduction: i32,
    today: NaiveDate,
    cfg: &Config,
) -> BankingPlanValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if daily_reduction <= 0 {
        errors.push(BankingPlanError::NonPositiveReduction { daily_reduction });
    }

    if !week::contains(goal.week_start, target_date) {
        errors.push(BankingPlanError::TargetDateOutsideWeek {
            target_date,
            week_start: goal.week_start,
        });
    } else if target_date < today {
        errors.push(BankingPlanError::TargetDateInPast { target_date });
    }

    let reduction_days = if week::contains(goal.week_start, target_date) && target_date >= today {
        eligible_reduction_days(records, today, target_date)
    } else {
        Vec::new()
    };

    if reduction_days.is_empty() && errors.is_empty() {
        errors.push(BankingPlanError::NoDaysToReduce);
    }

    let mut impact_preview = None;
    if daily_reduction > 0 && !reduction_days.is_empty() {
        let new_target = goal.daily_baseline - daily_reduction;
        let total_banked = daily_reduction * reduction_days.len() as i32;

        // Safety floor is a hard error: the system never proposes a day
        // below the minimum.
        if new_target < cfg.safety.min_safe_daily_calories {
            errors.push(BankingPlanError::UnsafeDailyReduction {
                lowest_target: new_target,
                floor: cfg.safety.min_safe_daily_calories,
            });
        }

        let cap = round_calories(goal.weekly_allowance as f64 * cfg.safety.banking_cap_pct);
        if total_banked > cap {
            warnings.push(BankingPlanWarning::LargeBankingAmount { total_banked, cap });
        }

        let per_day: Vec<DayImpact> = reduction_days
            .iter()
            .map(|&date| DayImpact {
                date,
                reduction: daily_reduction,
                new_target,
            })
            .collect();

        impact_preview = Some(ImpactPreview {
            min_daily_calories: new_target,
            total_banked,
            days_affected: per_day.len() as u32,
            per_day,
        });
    }

    BankingPlanValidation {
        errors,
        warnings,
        impact_preview,
    }
}

/// Create a banking plan, replacing any active one.
///
/// Returns the updated goal and record set; the caller persists them. The
/// validation result is returned as the error when the plan is rejected.
///
/// Reduction days get a negative `banking_adjustment`, the target day gets
/// the full banked amount. Locked days are never touched.
pub fn create_banking_plan(
    goal: &WeeklyGoal,
    records: &[DailyCalorieRecord],
    target_date: NaiveDate,
    daily_reduction: i32,
    today: NaiveDate,
    now: DateTime<Utc>,
    cfg: &Config,
) -> std::result::Result<(WeeklyGoal, Vec<DailyCalorieRecord>), BankingPlanValidation> {
    // Replacing a plan means validating against baseline targets, so undo
    // the previous plan's adjustments first.
    let (mut goal, mut records) = cancel_banking_plan(goal, records, today);

    let validation = validate_banking_plan(&goal, &records, target_date, daily_reduction, today, cfg);
    if !validation.is_valid() {
        return Err(validation);
    }

    let reduction_days = eligible_reduction_days(&records, today, target_date);
    let total_banked = daily_reduction * reduction_days.len() as i32;

    for &date in &reduction_days {
        let record = ensure_record(&mut records, date, goal.daily_baseline);
        record.banking_adjustment = -daily_reduction;
    }

    let target_record = ensure_record(&mut records, target_date, goal.daily_baseline);
    target_record.banking_adjustment = total_banked;

    let plan = CalorieBankingPlan {
        id: Uuid::new_v4(),
        week_start: goal.week_start,
        target_date,
        daily_reduction,
        total_banked,
        remaining_days_count: reduction_days.len() as u32,
        is_active: true,
        created_at: now,
    };

    tracing::info!(
        "Created banking plan: {} kcal/day off {} days, {} kcal onto {}",
        daily_reduction,
        plan.remaining_days_count,
        total_banked,
        target_date
    );

    goal.banking_plan = Some(plan);
    Ok((goal, records))
}

/// Cancel the active banking plan, restoring baseline targets for all
/// not-yet-locked days. Already-locked days keep the targets they were
/// frozen with.
pub fn cancel_banking_plan(
    goal: &WeeklyGoal,
    records: &[DailyCalorieRecord],
    today: NaiveDate,
) -> (WeeklyGoal, Vec<DailyCalorieRecord>) {
    let mut goal = goal.clone();
    let mut records = records.to_vec();

    if goal.active_plan().is_none() {
        return (goal, records);
    }

    for record in records.iter_mut() {
        if record.date >= today && record.locked_target.is_none() {
            record.banking_adjustment = 0;
        }
    }

    if let Some(plan) = goal.banking_plan.as_mut() {
        plan.is_active = false;
        tracing::info!("Cancelled banking plan targeting {}", plan.target_date);
    }

    (goal, records)
}

/// Freeze the effective target for a date, if not already frozen.
///
/// Idempotent: a second lock of the same date is a no-op, so the target a
/// user saw in the morning never shifts under them.
pub fn lock_daily_target(
    goal: &WeeklyGoal,
    records: &[DailyCalorieRecord],
    date: NaiveDate,
) -> Vec<DailyCalorieRecord> {
    let mut records = records.to_vec();
    let record = ensure_record(&mut records, date, goal.daily_baseline);
    if record.locked_target.is_none() {
        let target = record.target + record.banking_adjustment;
        record.locked_target = Some(target);
        tracing::debug!("Locked target for {}: {} kcal", date, target);
    }
    records
}

/// Fold a chosen rebalancing option's daily adjustment into the week's
/// not-yet-locked days, starting tomorrow.
///
/// The recovery planner only proposes; this is the single write path through
/// which a proposal lands in the ledger. Adjustments share the
/// `banking_adjustment` field with banking plans, so locked-day immutability
/// is enforced by one mechanism.
pub fn apply_rebalancing_option(
    goal: &WeeklyGoal,
    records: &[DailyCalorieRecord],
    option: &RebalancingOption,
    today: NaiveDate,
) -> Vec<DailyCalorieRecord> {
    let mut records = records.to_vec();

    if option.daily_adjustment == 0 {
        // Maintenance week: targets stay where they are
        return records;
    }

    let week_last = week::week_end(goal.week_start);
    let mut applied = 0u32;
    let mut date = today + Duration::days(1);
    while date <= week_last && applied < option.duration_days {
        let record = ensure_record(&mut records, date, goal.daily_baseline);
        if record.locked_target.is_none() {
            record.banking_adjustment += option.daily_adjustment;
            applied += 1;
        }
        date += Duration::days(1);
    }

    tracing::info!(
        "Applied {:?}: {} kcal/day across {} days",
        option.kind,
        option.daily_adjustment,
        applied
    );

    records
}

/// Find or create the record for a date, keeping the set ordered by date.
fn ensure_record<'a>(
    records: &'a mut Vec<DailyCalorieRecord>,
    date: NaiveDate,
    baseline: i32,
) -> &'a mut DailyCalorieRecord {
    if let Some(idx) = records.iter().position(|r| r.date == date) {
        return &mut records[idx];
    }
    let insert_at = records.iter().take_while(|r| r.date < date).count();
    records.insert(insert_at, DailyCalorieRecord::empty(date, baseline));
    &mut records[insert_at]
}
