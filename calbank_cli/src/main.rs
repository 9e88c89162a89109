mod export;
mod store;

use calbank_core::*;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use store::Snapshot;

#[derive(Parser)]
#[command(name = "calbank")]
#[command(about = "Weekly calorie banking and recovery planner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override today's date (YYYY-MM-DD); defaults to the system date
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the goal configuration and start a fresh week
    Goal {
        /// Daily calorie baseline
        #[arg(long)]
        baseline: i32,

        /// Weekly deficit target (negative = deficit)
        #[arg(long, default_value_t = -3500, allow_negative_numbers = true)]
        deficit: i32,

        /// Estimated weeks until the main goal is reached
        #[arg(long)]
        weeks_to_goal: Option<u32>,

        /// User weight in kg (for workout-equivalent estimates)
        #[arg(long)]
        weight_kg: Option<f64>,
    },

    /// Record consumed/burned calories for a day
    Log {
        /// Calories consumed
        #[arg(long)]
        consumed: i32,

        /// Calories burned through activity
        #[arg(long, default_value_t = 0)]
        burned: i32,

        /// Day to record (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show the weekly bank status
    Status,

    /// Validate and create a calorie banking plan
    Bank {
        /// The day receiving the banked calories
        #[arg(long)]
        target_date: NaiveDate,

        /// Calories to shave off each reduction day
        #[arg(long)]
        reduction: i32,

        /// Show the validation and impact preview without creating the plan
        #[arg(long)]
        preview: bool,
    },

    /// Cancel the active banking plan
    CancelBank,

    /// Check for an overeating event and show recovery options
    Check {
        /// Use simple daily-excess detection instead of bank-aware
        #[arg(long)]
        simple: bool,
    },

    /// Apply one option from the most recent recovery plan
    Apply {
        /// 1-based option number as shown by `check`
        #[arg(long)]
        option: usize,
    },

    /// Acknowledge the most recent overeating event without acting on it
    Acknowledge,

    /// Export the week's daily records to CSV
    Export {
        /// Output file (defaults to <data-dir>/records.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    calbank_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let snapshot_path = data_dir.join("snapshot.json");
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    match cli.command {
        Commands::Goal {
            baseline,
            deficit,
            weeks_to_goal,
            weight_kg,
        } => cmd_goal(&snapshot_path, today, baseline, deficit, weeks_to_goal, weight_kg),
        Commands::Log {
            consumed,
            burned,
            date,
        } => cmd_log(&snapshot_path, today, date.unwrap_or(today), consumed, burned),
        Commands::Status => cmd_status(&snapshot_path, today, &config),
        Commands::Bank {
            target_date,
            reduction,
            preview,
        } => cmd_bank(&snapshot_path, today, target_date, reduction, preview, &config),
        Commands::CancelBank => cmd_cancel_bank(&snapshot_path, today),
        Commands::Check { simple } => cmd_check(&snapshot_path, today, simple, &config),
        Commands::Apply { option } => cmd_apply(&snapshot_path, today, option),
        Commands::Acknowledge => cmd_acknowledge(&snapshot_path),
        Commands::Export { out } => {
            cmd_export(&snapshot_path, out.unwrap_or_else(|| data_dir.join("records.csv")))
        }
    }
}

/// Make sure the snapshot carries a weekly goal for the week containing
/// `today`, rolling the week over if needed. Banking plans do not survive a
/// rollover.
fn ensure_week(snapshot: &mut Snapshot, today: NaiveDate) -> Result<()> {
    let goal_config = snapshot
        .goal_config
        .clone()
        .ok_or_else(|| Error::State("No goal configured. Run `calbank goal` first.".into()))?;

    let needs_new_week = match &snapshot.goal {
        Some(goal) => !week::contains(goal.week_start, today),
        None => true,
    };

    if needs_new_week {
        let week_start = week::week_start_of(today);
        if snapshot.goal.is_some() {
            tracing::info!("Week rolled over, starting fresh at {}", week_start);
        }
        snapshot.goal = Some(WeeklyGoal::from_configuration(&goal_config, week_start));
    }

    Ok(())
}

fn cmd_goal(
    snapshot_path: &std::path::Path,
    today: NaiveDate,
    baseline: i32,
    deficit: i32,
    weeks_to_goal: Option<u32>,
    weight_kg: Option<f64>,
) -> Result<()> {
    if baseline <= 0 {
        return Err(Error::State("Daily baseline must be positive".into()));
    }

    let mut snapshot = Snapshot::load(snapshot_path)?;
    let goal_config = GoalConfiguration {
        daily_baseline: baseline,
        weekly_deficit_target: deficit,
        estimated_weeks_to_goal: weeks_to_goal,
        user_weight_kg: weight_kg,
    };

    let week_start = week::week_start_of(today);
    snapshot.goal = Some(WeeklyGoal::from_configuration(&goal_config, week_start));
    snapshot.goal_config = Some(goal_config);
    snapshot.save(snapshot_path)?;

    println!("✓ Goal set: {} kcal/day, week starting {}", baseline, week_start);
    Ok(())
}

fn cmd_log(
    snapshot_path: &std::path::Path,
    today: NaiveDate,
    date: NaiveDate,
    consumed: i32,
    burned: i32,
) -> Result<()> {
    let mut snapshot = Snapshot::load(snapshot_path)?;
    ensure_week(&mut snapshot, today)?;
    let goal = snapshot.goal.clone().expect("goal ensured above");

    if !week::contains(goal.week_start, date) {
        return Err(Error::InvalidDateRange {
            date,
            week_start: goal.week_start,
        });
    }

    // First touch of a day freezes its target
    snapshot.records = lock_daily_target(&goal, &snapshot.records, date);

    let record = snapshot
        .records
        .iter_mut()
        .find(|r| r.date == date)
        .expect("record created by lock_daily_target");
    record.consumed = consumed;
    record.burned = burned;
    let target = record.effective_target();

    snapshot.save(snapshot_path)?;

    println!("✓ Logged {}: {} kcal in, {} kcal out (target {})", date, consumed, burned, target);
    Ok(())
}

fn cmd_status(snapshot_path: &std::path::Path, today: NaiveDate, config: &Config) -> Result<()> {
    let mut snapshot = Snapshot::load(snapshot_path)?;
    ensure_week(&mut snapshot, today)?;
    let goal = snapshot.goal.clone().expect("goal ensured above");

    snapshot.records = lock_daily_target(&goal, &snapshot.records, today);
    let status = compute_bank_status(&goal, &snapshot.records, today, config)?;
    snapshot.save(snapshot_path)?;

    display_status(&goal, &status);
    Ok(())
}

fn cmd_bank(
    snapshot_path: &std::path::Path,
    today: NaiveDate,
    target_date: NaiveDate,
    reduction: i32,
    preview: bool,
    config: &Config,
) -> Result<()> {
    let mut snapshot = Snapshot::load(snapshot_path)?;
    ensure_week(&mut snapshot, today)?;
    let goal = snapshot.goal.clone().expect("goal ensured above");

    let validation =
        validate_banking_plan(&goal, &snapshot.records, target_date, reduction, today, config);
    display_validation(&validation);

    if preview || !validation.is_valid() {
        return Ok(());
    }

    match create_banking_plan(
        &goal,
        &snapshot.records,
        target_date,
        reduction,
        today,
        chrono::Utc::now(),
        config,
    ) {
        Ok((goal, records)) => {
            let plan = goal.active_plan().expect("plan just created");
            println!(
                "✓ Banking {} kcal ({} kcal/day over {} days) onto {}",
                plan.total_banked, plan.daily_reduction, plan.remaining_days_count, target_date
            );
            snapshot.goal = Some(goal);
            snapshot.records = records;
            snapshot.save(snapshot_path)?;
            Ok(())
        }
        Err(validation) => {
            // Validation changed between preview and create (shouldn't
            // happen within one invocation, but render it anyway)
            display_validation(&validation);
            Ok(())
        }
    }
}

fn cmd_cancel_bank(snapshot_path: &std::path::Path, today: NaiveDate) -> Result<()> {
    let mut snapshot = Snapshot::load(snapshot_path)?;
    ensure_week(&mut snapshot, today)?;
    let goal = snapshot.goal.clone().expect("goal ensured above");

    if goal.active_plan().is_none() {
        println!("No active banking plan to cancel.");
        return Ok(());
    }

    let (goal, records) = cancel_banking_plan(&goal, &snapshot.records, today);
    snapshot.goal = Some(goal);
    snapshot.records = records;
    snapshot.save(snapshot_path)?;

    println!("✓ Banking plan cancelled; future days restored to baseline.");
    Ok(())
}

fn cmd_check(
    snapshot_path: &std::path::Path,
    today: NaiveDate,
    simple: bool,
    config: &Config,
) -> Result<()> {
    let mut snapshot = Snapshot::load(snapshot_path)?;
    ensure_week(&mut snapshot, today)?;
    let goal = snapshot.goal.clone().expect("goal ensured above");
    let goal_config = snapshot.goal_config.clone().expect("checked by ensure_week");

    let mode = if simple {
        DetectionMode::Simple
    } else {
        DetectionMode::BankAware
    };

    let event = detect_overeating_event(
        mode,
        &goal,
        &snapshot.records,
        today,
        chrono::Utc::now(),
        config,
    );

    let Some(event) = event else {
        println!("✓ All clear, no overeating event detected.");
        return Ok(());
    };

    let plan = create_recovery_plan(&event, &goal, &goal_config, chrono::Utc::now(), config);
    display_recovery_plan(&event, &plan);

    snapshot.events.push(event);
    snapshot.last_plan = Some(plan);
    snapshot.save(snapshot_path)?;
    Ok(())
}

fn cmd_apply(snapshot_path: &std::path::Path, today: NaiveDate, option_number: usize) -> Result<()> {
    let mut snapshot = Snapshot::load(snapshot_path)?;
    ensure_week(&mut snapshot, today)?;
    let goal = snapshot.goal.clone().expect("goal ensured above");

    let plan = snapshot
        .last_plan
        .clone()
        .ok_or_else(|| Error::State("No recovery plan on file. Run `calbank check` first.".into()))?;

    let option = plan
        .rebalancing_options
        .get(option_number.wrapping_sub(1))
        .ok_or_else(|| {
            Error::State(format!(
                "Option {} does not exist; the plan has {} options",
                option_number,
                plan.rebalancing_options.len()
            ))
        })?;

    snapshot.records = apply_rebalancing_option(&goal, &snapshot.records, option, today);

    // Applying an option also resolves the event
    if let Some(event) = snapshot
        .events
        .iter_mut()
        .find(|e| e.id == plan.overeating_event_id)
    {
        event.user_acknowledged = true;
    }
    snapshot.last_plan = None;
    snapshot.save(snapshot_path)?;

    println!(
        "✓ Applied {:?}: {} kcal/day for {} days",
        option.kind, option.daily_adjustment, option.duration_days
    );
    Ok(())
}

fn cmd_acknowledge(snapshot_path: &std::path::Path) -> Result<()> {
    let mut snapshot = Snapshot::load(snapshot_path)?;

    let Some(event) = snapshot.events.last_mut() else {
        println!("No overeating events on file.");
        return Ok(());
    };
    event.user_acknowledged = true;
    snapshot.save(snapshot_path)?;

    println!("✓ Event acknowledged.");
    Ok(())
}

fn cmd_export(snapshot_path: &std::path::Path, out: PathBuf) -> Result<()> {
    let snapshot = Snapshot::load(snapshot_path)?;
    let count = export::write_records_csv(&snapshot.records, &out)?;
    println!("✓ Exported {} records to {}", count, out.display());
    Ok(())
}

fn display_status(goal: &WeeklyGoal, status: &CalorieBankStatus) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  WEEK OF {}", goal.week_start);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Allowance:       {:>6} kcal", status.weekly_allowance);
    println!(
        "  Used so far:     {:>6} kcal  ({} in / {} out)",
        status.total_used, status.total_consumed, status.total_burned
    );
    println!("  Remaining:       {:>6} kcal", status.remaining);
    println!();
    println!("  Today's target:  {:>6} kcal", status.today_target);
    println!("  Safe to eat:     {:>6} kcal", status.safe_to_eat_today);
    println!(
        "  Days left:       {:>6}  ({} after today)",
        status.days_left, status.days_left_excluding_today
    );
    println!("  Daily average:   {:>6} kcal", status.daily_average);
    println!();
    let outcome = match status.projected_outcome {
        ProjectedOutcome::OnTrack => "on track",
        ProjectedOutcome::OverBudget => "over budget",
        ProjectedOutcome::UnderBudget => "under budget",
    };
    println!("  Projection:      {}", outcome);
    if let Some(plan) = goal.active_plan() {
        println!();
        println!(
            "  Banking plan:    {} kcal/day → +{} on {}",
            plan.daily_reduction, plan.total_banked, plan.target_date
        );
    }
    println!();
}

fn display_validation(validation: &BankingPlanValidation) {
    for error in &validation.errors {
        match error {
            BankingPlanError::TargetDateInPast { target_date } => {
                println!("✗ Target date {} is in the past.", target_date)
            }
            BankingPlanError::TargetDateOutsideWeek { target_date, .. } => {
                println!("✗ Target date {} is outside the current week.", target_date)
            }
            BankingPlanError::NoDaysToReduce => {
                println!("✗ No eligible days to reduce before the target.")
            }
            BankingPlanError::UnsafeDailyReduction { lowest_target, floor } => println!(
                "✗ Reduction would drop a day to {} kcal (floor is {}).",
                lowest_target, floor
            ),
            BankingPlanError::NonPositiveReduction { daily_reduction } => {
                println!("✗ Reduction must be positive (got {}).", daily_reduction)
            }
        }
    }
    for warning in &validation.warnings {
        match warning {
            BankingPlanWarning::LargeBankingAmount { total_banked, cap } => println!(
                "⚠ Banking {} kcal is a lot (advisory cap is {}).",
                total_banked, cap
            ),
        }
    }
    if let Some(preview) = &validation.impact_preview {
        println!();
        println!(
            "  {} day(s) affected, {} kcal banked, lowest daily target {} kcal:",
            preview.days_affected, preview.total_banked, preview.min_daily_calories
        );
        for day in &preview.per_day {
            println!("    {}  −{} → {} kcal", day.date, day.reduction, day.new_target);
        }
    }
}

fn display_recovery_plan(event: &OvereatingEvent, plan: &RecoveryPlan) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  RECOVERY PLAN ({:?})", event.trigger_type);
    println!("╰─────────────────────────────────────────╯");
    println!();
    let impact = &plan.impact_analysis;
    println!("  {}", impact.reframe.message);
    println!("  {}", impact.reframe.focus_point);
    println!("  {}", impact.reframe.success_reminder);
    println!();
    println!("  Excess:            {} kcal", event.excess_calories);
    println!("  Weekly budget:     {:.1}%", impact.weekly_budget_impact_pct);
    println!("  Weekly deficit:    {:.1}%", impact.weekly_deficit_impact_pct);
    println!("  Overall journey:   {:.1}%", impact.main_goal_impact_pct);
    println!("  Workout equiv:     {:.1}", impact.equivalent_workouts);
    println!();

    for (i, option) in plan.rebalancing_options.iter().enumerate() {
        let tag = match option.recommendation {
            Some(Recommendation::Recommended) => "  [recommended]",
            Some(Recommendation::Advanced) => "  [advanced]",
            Some(Recommendation::NotRecommended) => "  [not recommended]",
            None => "",
        };
        println!("  {}. {:?}{}", i + 1, option.kind, tag);
        println!(
            "     {} kcal/day for {} days → {} kcal daily target",
            option.daily_adjustment, option.duration_days, option.impact.new_daily_target
        );
        for pro in &option.pros {
            println!("     + {}", pro);
        }
        for con in &option.cons {
            println!("     - {}", con);
        }
    }
    println!();
    println!("  Apply one with: calbank apply --option <n>");
    println!();
}
