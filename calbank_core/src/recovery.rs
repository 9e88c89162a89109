//! Recovery planning: impact analysis and rebalancing options.
//!
//! The planner only proposes. It never mutates ledger state; the caller
//! picks one option and applies it through the ledger. Options that would
//! breach the safety floor are never constructed, not returned with a
//! warning.

use crate::reframe::reframe_for;
use crate::rounding::{ceil_div, display_pct, round_calories, round_pct};
use crate::types::*;
use crate::Config;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Reductions at or below this read as moderate effort; above, challenging.
const EFFORT_MODERATE_MAX: i32 = 150;

/// Reductions at or below this carry no meaningful risk.
const RISK_SAFE_MAX: i32 = 200;

/// Moderate events above this excess get the 5-day correction instead of
/// the gentle spread.
const MODERATE_STRATEGY_CUTOFF: i32 = 700;

/// Display caps keep the math explainable even for degenerate inputs.
const MAX_RECOVERY_DAYS: u32 = 365;
const MAX_EQUIVALENT_WORKOUTS: f64 = 50.0;

/// Build a full recovery plan for a detected event.
///
/// Pure: the goal configuration supplies the journey timeline and optional
/// user weight, `now` stamps the plan.
pub fn create_recovery_plan(
    event: &OvereatingEvent,
    goal: &WeeklyGoal,
    goal_config: &GoalConfiguration,
    now: DateTime<Utc>,
    cfg: &Config,
) -> RecoveryPlan {
    let impact_analysis = calculate_impact_analysis(event, goal, goal_config, cfg);
    let strategy = recommend_strategy(event.trigger_type, event.excess_calories);
    let rebalancing_options =
        generate_rebalancing_options(event.excess_calories, goal, event.trigger_type, cfg);

    tracing::info!(
        "Recovery plan for {} kcal ({:?}): strategy {:?}, {} options",
        event.excess_calories,
        event.trigger_type,
        strategy,
        rebalancing_options.len()
    );

    RecoveryPlan {
        id: Uuid::new_v4(),
        overeating_event_id: event.id,
        strategy,
        impact_analysis,
        rebalancing_options,
        created_at: now,
    }
}

/// Express the excess in bounded, explainable terms.
pub fn calculate_impact_analysis(
    event: &OvereatingEvent,
    goal: &WeeklyGoal,
    goal_config: &GoalConfiguration,
    cfg: &Config,
) -> ImpactAnalysis {
    let excess = event.excess_calories;
    let deficit = goal.deficit_target.abs();

    let weekly_budget_impact_pct =
        display_pct(excess as f64 / goal.weekly_allowance as f64 * 100.0);

    // A near-zero deficit goal would produce absurd ratios; the display caps
    // keep every number finite and readable.
    let weekly_deficit_impact_pct = if deficit > 0 {
        display_pct(excess as f64 / deficit as f64 * 100.0)
    } else {
        display_pct(f64::MAX)
    };

    let weeks_to_goal = goal_config.estimated_weeks_to_goal.unwrap_or_else(|| {
        tracing::debug!(
            "Goal configuration has no timeline, assuming {} weeks",
            cfg.recovery.default_weeks_to_goal
        );
        cfg.recovery.default_weeks_to_goal
    });
    let journey_deficit = deficit as i64 * weeks_to_goal as i64;
    let main_goal_impact_pct = if journey_deficit > 0 {
        display_pct(excess as f64 / journey_deficit as f64 * 100.0)
    } else {
        display_pct(f64::MAX)
    };

    let days_to_recover = if deficit > 0 {
        (ceil_div(excess, deficit) as u32 * 7).min(MAX_RECOVERY_DAYS)
    } else {
        MAX_RECOVERY_DAYS
    };

    let per_workout = match goal_config.user_weight_kg {
        Some(weight) => weight * cfg.recovery.workout_calories_per_kg,
        None => cfg.recovery.default_workout_calories as f64,
    };
    let equivalent_workouts =
        round_pct((excess as f64 / per_workout).min(MAX_EQUIVALENT_WORKOUTS));

    let reframe = reframe_for(
        event.trigger_type,
        weekly_budget_impact_pct,
        days_to_recover,
        equivalent_workouts,
    );

    ImpactAnalysis {
        weekly_budget_impact_pct,
        weekly_deficit_impact_pct,
        main_goal_impact_pct,
        days_to_recover,
        equivalent_workouts,
        reframe,
    }
}

/// Fixed decision table mapping severity to the recommended approach.
pub fn recommend_strategy(trigger: TriggerType, excess_calories: i32) -> RecoveryStrategy {
    match trigger {
        TriggerType::Mild => RecoveryStrategy::GentleRebalancing,
        TriggerType::Moderate => {
            if excess_calories > MODERATE_STRATEGY_CUTOFF {
                RecoveryStrategy::ModerateCorrection
            } else {
                RecoveryStrategy::GentleRebalancing
            }
        }
        TriggerType::Severe => RecoveryStrategy::MaintenanceWeek,
    }
}

/// Generate the ordered option set for an excess.
///
/// Options appear in fixed order (gentle 7-day, moderate 5-day, quick
/// 3-day, maintenance week), with each candidate dropped entirely if it
/// cannot pass its safety check. Maintenance is always present, so the
/// result has 2–4 entries.
pub fn generate_rebalancing_options(
    excess_calories: i32,
    goal: &WeeklyGoal,
    trigger: TriggerType,
    cfg: &Config,
) -> Vec<RebalancingOption> {
    let strategy = recommend_strategy(trigger, excess_calories);
    let floor = cfg.safety.min_safe_daily_calories;
    let baseline = goal.daily_baseline;
    let mut options = Vec::with_capacity(4);

    // Gentle 7-day spread
    let reduction = round_calories(excess_calories as f64 / 7.0);
    if baseline - reduction >= floor {
        options.push(RebalancingOption {
            kind: RebalancingKind::GentleSevenDay,
            duration_days: 7,
            daily_adjustment: -reduction,
            min_safety_calories: floor,
            impact: OptionImpact {
                new_daily_target: baseline - reduction,
                effort_level: EffortLevel::Gentle,
                risk_level: RiskLevel::Safe,
            },
            pros: vec![
                "Barely noticeable daily change".to_string(),
                "Keeps every meal pattern intact".to_string(),
            ],
            cons: vec!["Takes the full week to absorb".to_string()],
            recommendation: (strategy == RecoveryStrategy::GentleRebalancing)
                .then_some(Recommendation::Recommended),
        });
    }

    // Moderate 5-day correction
    let reduction = round_calories(excess_calories as f64 / 5.0);
    if baseline - reduction >= floor {
        options.push(RebalancingOption {
            kind: RebalancingKind::ModerateFiveDay,
            duration_days: 5,
            daily_adjustment: -reduction,
            min_safety_calories: floor,
            impact: OptionImpact {
                new_daily_target: baseline - reduction,
                effort_level: if reduction <= EFFORT_MODERATE_MAX {
                    EffortLevel::Moderate
                } else {
                    EffortLevel::Challenging
                },
                risk_level: if reduction <= RISK_SAFE_MAX {
                    RiskLevel::Safe
                } else {
                    RiskLevel::Moderate
                },
            },
            pros: vec![
                "Back on track before the week ends".to_string(),
                "Still a manageable daily change".to_string(),
            ],
            cons: vec!["Noticeably smaller meals for five days".to_string()],
            recommendation: (strategy == RecoveryStrategy::ModerateCorrection)
                .then_some(Recommendation::Recommended),
        });
    }

    // Quick 3-day fix: large excesses are never compressed this hard
    if excess_calories <= cfg.recovery.quick_fix_max_excess {
        let reduction = round_calories(excess_calories as f64 / 3.0)
            .min(cfg.recovery.max_daily_reduction);
        if baseline - reduction >= floor {
            options.push(RebalancingOption {
                kind: RebalancingKind::QuickThreeDay,
                duration_days: 3,
                daily_adjustment: -reduction,
                min_safety_calories: floor,
                impact: OptionImpact {
                    new_daily_target: baseline - reduction,
                    effort_level: EffortLevel::Challenging,
                    risk_level: if reduction <= RISK_SAFE_MAX {
                        RiskLevel::Moderate
                    } else {
                        RiskLevel::Aggressive
                    },
                },
                pros: vec!["Fully absorbed in three days".to_string()],
                cons: vec![
                    "Demands real discipline".to_string(),
                    "Hunger is likely on these days".to_string(),
                ],
                recommendation: Some(if trigger == TriggerType::Mild {
                    Recommendation::Advanced
                } else {
                    Recommendation::NotRecommended
                }),
            });
        }
    }

    // Maintenance week: always available as the fallback
    options.push(RebalancingOption {
        kind: RebalancingKind::MaintenanceWeek,
        duration_days: 7,
        daily_adjustment: 0,
        min_safety_calories: floor,
        impact: OptionImpact {
            new_daily_target: baseline,
            effort_level: EffortLevel::Minimal,
            risk_level: RiskLevel::Safe,
        },
        pros: vec![
            "No reduction at all; eat at your normal target".to_string(),
            "Protects the habit when motivation is low".to_string(),
        ],
        cons: vec!["Extends the overall timeline slightly".to_string()],
        recommendation: (strategy == RecoveryStrategy::MaintenanceWeek)
            .then_some(Recommendation::Recommended),
    });

    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn goal_with_baseline(baseline: i32) -> WeeklyGoal {
        WeeklyGoal {
            week_start: NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
            total_target: baseline * 7,
            daily_baseline: baseline,
            deficit_target: -3500,
            weekly_allowance: baseline * 7,
            banking_plan: None,
        }
    }

    fn goal_config() -> GoalConfiguration {
        GoalConfiguration {
            daily_baseline: 2000,
            weekly_deficit_target: -3500,
            estimated_weeks_to_goal: Some(12),
            user_weight_kg: None,
        }
    }

    fn event(excess: i32, trigger: TriggerType) -> OvereatingEvent {
        OvereatingEvent {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2026, 8, 26).unwrap(),
            excess_calories: excess,
            trigger_type: trigger,
            detected_at: Utc::now(),
            user_acknowledged: false,
        }
    }

    fn find(options: &[RebalancingOption], kind: RebalancingKind) -> Option<&RebalancingOption> {
        options.iter().find(|o| o.kind == kind)
    }

    #[test]
    fn test_options_for_moderate_excess_at_normal_baseline() {
        // 2000 baseline, 700 excess: all four options, quick at 233/day
        let goal = goal_with_baseline(2000);
        let options =
            generate_rebalancing_options(700, &goal, TriggerType::Moderate, &Config::default());

        let gentle = find(&options, RebalancingKind::GentleSevenDay).unwrap();
        assert_eq!(gentle.daily_adjustment, -100);
        assert_eq!(gentle.impact.new_daily_target, 1900);

        let moderate = find(&options, RebalancingKind::ModerateFiveDay).unwrap();
        assert_eq!(moderate.daily_adjustment, -140);
        assert_eq!(moderate.impact.new_daily_target, 1860);
        assert_eq!(moderate.impact.effort_level, EffortLevel::Moderate);
        assert_eq!(moderate.impact.risk_level, RiskLevel::Safe);

        let quick = find(&options, RebalancingKind::QuickThreeDay).unwrap();
        assert_eq!(quick.daily_adjustment, -233);
        assert_eq!(quick.impact.new_daily_target, 1767);

        assert!(find(&options, RebalancingKind::MaintenanceWeek).is_some());
        assert_eq!(options.len(), 4);
    }

    #[test]
    fn test_quick_fix_excluded_above_cutoff() {
        // 1400 baseline, 900 excess: gentle 129 → 1271, moderate 180 → 1220,
        // quick excluded by the 800 kcal rule
        let goal = goal_with_baseline(1400);
        let options =
            generate_rebalancing_options(900, &goal, TriggerType::Moderate, &Config::default());

        let gentle = find(&options, RebalancingKind::GentleSevenDay).unwrap();
        assert_eq!(gentle.impact.new_daily_target, 1271);

        let moderate = find(&options, RebalancingKind::ModerateFiveDay).unwrap();
        assert_eq!(moderate.impact.new_daily_target, 1220);

        assert!(find(&options, RebalancingKind::QuickThreeDay).is_none());
    }

    #[test]
    fn test_no_option_breaches_safety_floor() {
        let cfg = Config::default();
        for baseline in [1250, 1400, 1800, 2200] {
            for excess in [201, 500, 799, 1500, 3000] {
                let goal = goal_with_baseline(baseline);
                let options =
                    generate_rebalancing_options(excess, &goal, TriggerType::Moderate, &cfg);
                for option in &options {
                    assert!(
                        option.impact.new_daily_target >= cfg.safety.min_safe_daily_calories,
                        "baseline {} excess {} produced unsafe option {:?}",
                        baseline,
                        excess,
                        option.kind
                    );
                }
            }
        }
    }

    #[test]
    fn test_maintenance_always_present() {
        let cfg = Config::default();
        let goal = goal_with_baseline(1250);
        for excess in [201, 800, 2000, 10000] {
            let options = generate_rebalancing_options(excess, &goal, TriggerType::Severe, &cfg);
            assert!(find(&options, RebalancingKind::MaintenanceWeek).is_some());
            assert!(options.len() >= 1);
        }

        // A huge excess at a low baseline drops every reduction option at
        // the safety floor, leaving maintenance alone
        let options = generate_rebalancing_options(10000, &goal, TriggerType::Severe, &cfg);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].kind, RebalancingKind::MaintenanceWeek);
    }

    #[test]
    fn test_quick_fix_reduction_bounded() {
        // 800 excess / 3 = 267, fine; but a hand-tuned config with a higher
        // cutoff must still respect the per-day bound
        let mut cfg = Config::default();
        cfg.recovery.quick_fix_max_excess = 2000;
        let goal = goal_with_baseline(2200);
        let options = generate_rebalancing_options(1800, &goal, TriggerType::Severe, &cfg);

        let quick = find(&options, RebalancingKind::QuickThreeDay).unwrap();
        assert_eq!(quick.daily_adjustment, -500); // capped, not 600
    }

    #[test]
    fn test_strategy_decision_table() {
        assert_eq!(
            recommend_strategy(TriggerType::Mild, 300),
            RecoveryStrategy::GentleRebalancing
        );
        assert_eq!(
            recommend_strategy(TriggerType::Moderate, 600),
            RecoveryStrategy::GentleRebalancing
        );
        assert_eq!(
            recommend_strategy(TriggerType::Moderate, 701),
            RecoveryStrategy::ModerateCorrection
        );
        assert_eq!(
            recommend_strategy(TriggerType::Severe, 1500),
            RecoveryStrategy::MaintenanceWeek
        );
    }

    #[test]
    fn test_recommendation_follows_strategy() {
        let goal = goal_with_baseline(2000);
        let cfg = Config::default();

        let options = generate_rebalancing_options(300, &goal, TriggerType::Mild, &cfg);
        let gentle = find(&options, RebalancingKind::GentleSevenDay).unwrap();
        assert_eq!(gentle.recommendation, Some(Recommendation::Recommended));
        let quick = find(&options, RebalancingKind::QuickThreeDay).unwrap();
        assert_eq!(quick.recommendation, Some(Recommendation::Advanced));

        let options = generate_rebalancing_options(1500, &goal, TriggerType::Severe, &cfg);
        let maintenance = find(&options, RebalancingKind::MaintenanceWeek).unwrap();
        assert_eq!(
            maintenance.recommendation,
            Some(Recommendation::Recommended)
        );
    }

    #[test]
    fn test_impact_analysis_basic_numbers() {
        let goal = goal_with_baseline(2000);
        let analysis = calculate_impact_analysis(
            &event(700, TriggerType::Moderate),
            &goal,
            &goal_config(),
            &Config::default(),
        );

        assert_eq!(analysis.weekly_budget_impact_pct, 5.0); // 700/14000
        assert_eq!(analysis.weekly_deficit_impact_pct, 20.0); // 700/3500
        assert_eq!(analysis.days_to_recover, 7); // ceil(700/3500) weeks
        assert_eq!(analysis.equivalent_workouts, 2.0); // 700/350
        assert!(analysis.reframe.message.contains("5.0%"));
    }

    #[test]
    fn test_impact_analysis_uses_user_weight() {
        let goal = goal_with_baseline(2000);
        let mut config = goal_config();
        config.user_weight_kg = Some(80.0);

        let analysis = calculate_impact_analysis(
            &event(800, TriggerType::Moderate),
            &goal,
            &config,
            &Config::default(),
        );

        assert_eq!(analysis.equivalent_workouts, 2.0); // 800/(80*5)
    }

    #[test]
    fn test_impact_analysis_caps_degenerate_deficit() {
        let mut goal = goal_with_baseline(2000);
        goal.deficit_target = 0;

        let analysis = calculate_impact_analysis(
            &event(700, TriggerType::Moderate),
            &goal,
            &goal_config(),
            &Config::default(),
        );

        assert_eq!(analysis.weekly_deficit_impact_pct, 1000.0);
        assert_eq!(analysis.days_to_recover, 365);
    }

    #[test]
    fn test_impact_percentages_monotone_in_excess() {
        let goal = goal_with_baseline(2000);
        let cfg = Config::default();
        let mut last_pct = 0.0;
        for excess in [201, 500, 1000, 2000, 5000] {
            let analysis = calculate_impact_analysis(
                &event(excess, TriggerType::Moderate),
                &goal,
                &goal_config(),
                &cfg,
            );
            assert!(analysis.weekly_budget_impact_pct >= last_pct);
            last_pct = analysis.weekly_budget_impact_pct;
        }
    }

    #[test]
    fn test_create_recovery_plan_references_event() {
        let goal = goal_with_baseline(2000);
        let ev = event(900, TriggerType::Moderate);
        let plan = create_recovery_plan(
            &ev,
            &goal,
            &goal_config(),
            Utc::now(),
            &Config::default(),
        );

        assert_eq!(plan.overeating_event_id, ev.id);
        assert_eq!(plan.strategy, RecoveryStrategy::ModerateCorrection);
        assert!(plan.rebalancing_options.len() >= 2);
        assert!(plan.rebalancing_options.len() <= 4);
    }
}
