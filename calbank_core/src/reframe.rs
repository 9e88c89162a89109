//! Supportive reframing of overeating events.
//!
//! Every message is positively framed regardless of magnitude: the numbers
//! do the explaining, the words keep the user moving. Severity only changes
//! emphasis, never tone.

use crate::types::{Reframe, TriggerType};

/// Build the reframe triple for an event, parameterized with the computed
/// impact numbers.
pub fn reframe_for(
    trigger: TriggerType,
    weekly_budget_impact_pct: f64,
    days_to_recover: u32,
    equivalent_workouts: f64,
) -> Reframe {
    match trigger {
        TriggerType::Mild => Reframe {
            message: format!(
                "This was just {:.1}% of your weekly budget. One meal never defines a week.",
                weekly_budget_impact_pct
            ),
            focus_point: format!(
                "A light touch for about {} day(s) brings you right back on track.",
                days_to_recover
            ),
            success_reminder: "You noticed it early. That awareness is the habit that matters."
                .to_string(),
        },
        TriggerType::Moderate => Reframe {
            message: format!(
                "This amounts to {:.1}% of your weekly budget. Absorbed over a few days, it barely registers.",
                weekly_budget_impact_pct
            ),
            focus_point: format!(
                "Roughly {} workout(s) worth of energy, or about {} day(s) of gentle rebalancing.",
                equivalent_workouts, days_to_recover
            ),
            success_reminder:
                "Every week you have logged is progress. This one is no different.".to_string(),
        },
        TriggerType::Severe => Reframe {
            message: format!(
                "A big day, but still only {:.1}% of your weekly budget. Your overall plan absorbs this easily.",
                weekly_budget_impact_pct
            ),
            focus_point: format!(
                "A maintenance week costs about {} day(s) of timeline. Nothing is lost, only deferred.",
                days_to_recover
            ),
            success_reminder:
                "One day cannot undo weeks of consistency. Keep logging and keep going.".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reframe_includes_budget_percentage() {
        let reframe = reframe_for(TriggerType::Mild, 4.3, 1, 2.0);
        assert!(reframe.message.contains("4.3%"));
    }

    #[test]
    fn test_reframe_never_alarming() {
        // No severity produces negative framing words
        for trigger in [TriggerType::Mild, TriggerType::Moderate, TriggerType::Severe] {
            let reframe = reframe_for(trigger, 50.0, 10, 5.0);
            for text in [&reframe.message, &reframe.focus_point, &reframe.success_reminder] {
                let lowered = text.to_lowercase();
                assert!(!lowered.contains("fail"));
                assert!(!lowered.contains("ruin"));
                assert!(!lowered.contains("bad"));
            }
        }
    }

    #[test]
    fn test_severe_reframe_mentions_timeline() {
        let reframe = reframe_for(TriggerType::Severe, 12.0, 14, 8.0);
        assert!(reframe.focus_point.contains("14"));
    }
}
