#![forbid(unsafe_code)]

//! Core domain model and business logic for the calorie banking system.
//!
//! This crate provides:
//! - Domain types (weekly goals, banking plans, daily records, recovery plans)
//! - The weekly ledger (bank status, banking plan validation and application)
//! - Overeating detection (simple and bank-aware modes)
//! - Recovery planning (impact analysis, rebalancing options, reframing)
//!
//! All computation is pure: the current date is always an explicit parameter
//! and every "mutation" returns new values for the caller to persist.

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod rounding;
pub mod week;
pub mod ledger;
pub mod detector;
pub mod recovery;
pub mod reframe;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use ledger::{
    apply_rebalancing_option, cancel_banking_plan, compute_bank_status, create_banking_plan,
    lock_daily_target, validate_banking_plan,
};
pub use detector::detect_overeating_event;
pub use recovery::{create_recovery_plan, generate_rebalancing_options, recommend_strategy};
