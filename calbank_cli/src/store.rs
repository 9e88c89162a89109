//! Snapshot persistence with file locking.
//!
//! The core is pure; this store is the host-side owner of the mutable
//! state. Saving goes through a temp file and an atomic rename so a crash
//! never leaves a half-written snapshot, and file locks keep concurrent
//! invocations from trampling each other.

use calbank_core::{
    DailyCalorieRecord, Error, GoalConfiguration, OvereatingEvent, RecoveryPlan, Result,
    WeeklyGoal,
};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Everything the host application persists between invocations.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Snapshot {
    pub goal_config: Option<GoalConfiguration>,
    pub goal: Option<WeeklyGoal>,
    pub records: Vec<DailyCalorieRecord>,
    pub events: Vec<OvereatingEvent>,
    pub last_plan: Option<RecoveryPlan>,
}

impl Snapshot {
    /// Load the snapshot from a file with shared locking.
    ///
    /// Returns a default snapshot if the file doesn't exist. A corrupted
    /// file logs a warning and also falls back to defaults rather than
    /// blocking the user.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No snapshot found at {:?}, starting fresh", path);
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open snapshot {:?}: {}. Starting fresh.", path, e);
                return Ok(Self::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock snapshot {:?}: {}. Starting fresh.", path, e);
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut file = file;
        if let Err(e) = file.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Unable to read snapshot {:?}: {}. Starting fresh.", path, e);
            return Ok(Self::default());
        }
        let _ = file.unlock();

        match serde_json::from_str(&contents) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                tracing::warn!(
                    "Snapshot {:?} is corrupted ({}), starting fresh",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save the snapshot atomically: write to a temp file in the same
    /// directory, then rename over the target.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::State(format!("Snapshot path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let json = serde_json::to_string_pretty(self)?;

        let mut tmp = NamedTempFile::new_in(parent)
            .map_err(|e| Error::State(format!("Unable to create temp file: {}", e)))?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;

        tmp.persist(path)
            .map_err(|e| Error::State(format!("Unable to persist snapshot: {}", e)))?;

        tracing::debug!("Saved snapshot to {:?}", path);
        Ok(())
    }
}
