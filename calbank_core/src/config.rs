//! Configuration file support for calbank.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/calbank/config.toml`.
//! Every tunable the planning math depends on lives here so the numbers are
//! named and documented in exactly one place.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub safety: SafetyConfig,

    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub recovery: RecoveryConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Safety floors and buffers for banking and status math
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// No plan or option may push a day's target below this
    #[serde(default = "default_min_safe_daily_calories")]
    pub min_safe_daily_calories: i32,

    /// Fraction of the daily baseline subtracted from the safe-to-eat
    /// recommendation so it never sits at the exact edge of the budget
    #[serde(default = "default_safe_eat_buffer_pct")]
    pub safe_eat_buffer_pct: f64,

    /// total_banked above this fraction of the weekly allowance raises the
    /// LargeBankingAmount warning (non-blocking)
    #[serde(default = "default_banking_cap_pct")]
    pub banking_cap_pct: f64,

    /// Tolerance band, as a fraction of the weekly allowance, within which
    /// the week still counts as on-track
    #[serde(default = "default_on_track_tolerance_pct")]
    pub on_track_tolerance_pct: f64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            min_safe_daily_calories: default_min_safe_daily_calories(),
            safe_eat_buffer_pct: default_safe_eat_buffer_pct(),
            banking_cap_pct: default_banking_cap_pct(),
            on_track_tolerance_pct: default_on_track_tolerance_pct(),
        }
    }
}

/// Overeating detection thresholds (kcal of excess)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Excess at or below this is not an event at all
    #[serde(default = "default_mild_threshold")]
    pub mild_threshold: i32,

    #[serde(default = "default_moderate_threshold")]
    pub moderate_threshold: i32,

    #[serde(default = "default_severe_threshold")]
    pub severe_threshold: i32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            mild_threshold: default_mild_threshold(),
            moderate_threshold: default_moderate_threshold(),
            severe_threshold: default_severe_threshold(),
        }
    }
}

/// Recovery planning parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Excesses above this are never compressed into the 3-day option
    #[serde(default = "default_quick_fix_max_excess")]
    pub quick_fix_max_excess: i32,

    /// Upper bound on any single day's reduction
    #[serde(default = "default_max_daily_reduction")]
    pub max_daily_reduction: i32,

    /// Per-workout calorie estimate when no user weight is available
    #[serde(default = "default_workout_calories")]
    pub default_workout_calories: i32,

    /// Per-workout estimate is user weight (kg) times this
    #[serde(default = "default_workout_calories_per_kg")]
    pub workout_calories_per_kg: f64,

    /// Fallback journey length when the goal configuration has no timeline
    #[serde(default = "default_weeks_to_goal")]
    pub default_weeks_to_goal: u32,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            quick_fix_max_excess: default_quick_fix_max_excess(),
            max_daily_reduction: default_max_daily_reduction(),
            default_workout_calories: default_workout_calories(),
            workout_calories_per_kg: default_workout_calories_per_kg(),
            default_weeks_to_goal: default_weeks_to_goal(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("calbank")
}

fn default_min_safe_daily_calories() -> i32 {
    1200
}

fn default_safe_eat_buffer_pct() -> f64 {
    0.05
}

fn default_banking_cap_pct() -> f64 {
    0.50
}

fn default_on_track_tolerance_pct() -> f64 {
    0.05
}

fn default_mild_threshold() -> i32 {
    200
}

fn default_moderate_threshold() -> i32 {
    500
}

fn default_severe_threshold() -> i32 {
    1000
}

fn default_quick_fix_max_excess() -> i32 {
    800
}

fn default_max_daily_reduction() -> i32 {
    500
}

fn default_workout_calories() -> i32 {
    350
}

fn default_workout_calories_per_kg() -> f64 {
    5.0
}

fn default_weeks_to_goal() -> u32 {
    12
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("calbank").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject configs whose thresholds are inconsistent with each other.
    fn validate(&self) -> Result<()> {
        if self.safety.min_safe_daily_calories <= 0 {
            return Err(Error::Config(
                "min_safe_daily_calories must be positive".into(),
            ));
        }
        let d = &self.detection;
        if !(d.mild_threshold < d.moderate_threshold && d.moderate_threshold < d.severe_threshold) {
            return Err(Error::Config(
                "detection thresholds must be strictly increasing (mild < moderate < severe)"
                    .into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.safety.min_safe_daily_calories, 1200);
        assert_eq!(config.detection.mild_threshold, 200);
        assert_eq!(config.detection.severe_threshold, 1000);
        assert_eq!(config.recovery.quick_fix_max_excess, 800);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(
            config.safety.min_safe_daily_calories,
            parsed.safety.min_safe_daily_calories
        );
        assert_eq!(
            config.recovery.default_weeks_to_goal,
            parsed.recovery.default_weeks_to_goal
        );
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[detection]
mild_threshold = 150
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.detection.mild_threshold, 150);
        assert_eq!(config.detection.moderate_threshold, 500); // default
    }

    #[test]
    fn test_inconsistent_thresholds_rejected() {
        let config = Config {
            detection: DetectionConfig {
                mild_threshold: 600,
                moderate_threshold: 500,
                severe_threshold: 1000,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
