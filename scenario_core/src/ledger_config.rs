use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

pub const BUILTIN_LEDGER_CONFIG: &str = include_str!("data/ledger_config.json");

pub const LEDGER_CONFIG_ENV: &str = "LEDGER_CONFIG_PATH";

const CONFIG_TARGET: &str = "scenario::config";

/// Runtime tuning of a [`crate::ResourceLedger`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    start_time: f64,
    event_journal_capacity: usize,
    initial_person_capacity: usize,
    parallel_sum_threshold: usize,
    max_person_id: u32,
}

impl LedgerConfig {
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_LEDGER_CONFIG).expect("builtin ledger config should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, LedgerConfigError> {
        let config: LedgerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, LedgerConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|source| LedgerConfigError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        LedgerConfig::from_json_str(&contents)
    }

    pub fn with_start_time(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn with_event_journal_capacity(mut self, capacity: usize) -> Self {
        self.event_journal_capacity = capacity;
        self
    }

    pub fn with_parallel_sum_threshold(mut self, threshold: usize) -> Self {
        self.parallel_sum_threshold = threshold;
        self
    }

    pub fn with_max_person_id(mut self, max_person_id: u32) -> Self {
        self.max_person_id = max_person_id;
        self
    }

    /// Simulation time the ledger starts at.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Number of recent change events kept in memory; zero disables the journal.
    pub fn event_journal_capacity(&self) -> usize {
        self.event_journal_capacity
    }

    pub fn initial_person_capacity(&self) -> usize {
        self.initial_person_capacity
    }

    /// Person count above which totals are summed in parallel.
    pub fn parallel_sum_threshold(&self) -> usize {
        self.parallel_sum_threshold
    }

    /// Largest identifier [`crate::ResourceLedger::add_person`] accepts.
    /// Person slots are dense, so every column grows to the largest id seen.
    pub fn max_person_id(&self) -> u32 {
        self.max_person_id
    }

    fn validate(&self) -> Result<(), LedgerConfigError> {
        if !self.start_time.is_finite() {
            return Err(LedgerConfigError::Invalid(format!(
                "start_time must be finite, got {}",
                self.start_time
            )));
        }
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            event_journal_capacity: 256,
            initial_person_capacity: 1024,
            parallel_sum_threshold: 65_536,
            max_person_id: 16_777_215,
        }
    }
}

#[derive(Debug, Error)]
pub enum LedgerConfigError {
    #[error("failed to parse ledger config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read ledger config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid ledger config: {0}")]
    Invalid(String),
}

/// Loads the ledger config named by `LEDGER_CONFIG_PATH`, falling back to the
/// builtin config when the variable is unset or the file cannot be used.
pub fn load_ledger_config_from_env() -> LedgerConfig {
    let Some(path) = env::var_os(LEDGER_CONFIG_ENV).map(PathBuf::from) else {
        tracing::info!(target: CONFIG_TARGET, "ledger_config.loaded=builtin");
        return LedgerConfig::builtin();
    };
    match LedgerConfig::from_file(&path) {
        Ok(config) => {
            tracing::info!(
                target: CONFIG_TARGET,
                path = %path.display(),
                "ledger_config.loaded=file"
            );
            config
        }
        Err(err) => {
            tracing::warn!(
                target: CONFIG_TARGET,
                path = %path.display(),
                error = %err,
                "ledger_config.load_failed"
            );
            tracing::info!(target: CONFIG_TARGET, "ledger_config.loaded=builtin");
            LedgerConfig::builtin()
        }
    }
}
