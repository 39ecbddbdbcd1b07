//! Runtime timing configuration
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MEMORY_MATCH_TICK_MS` | 1000 | Game clock tick |
//! | `MEMORY_MATCH_MISMATCH_DELAY_MS` | 1000 | Mismatch reveal before cards turn back |
//! | `MEMORY_MATCH_SYNC_DEBOUNCE_MS` | 2000 | Normal-priority save sampling interval |
//! | `MEMORY_MATCH_EFFECT_BUFFER` | 64 | Effect broadcast capacity |

use std::env;

use memory_match_types::{
    DOUBLE_DOWN_SCAN_MS, EFFECT_BUFFER_CAPACITY, MISMATCH_DELAY_MS, SYNC_DEBOUNCE_MS,
    TIMER_TICK_MS,
};

use crate::error::RuntimeError;

/// Timing knobs for the state machine and its helpers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub tick_interval_ms: u64,
    pub mismatch_delay_ms: u64,
    pub sync_debounce_ms: u64,
    pub double_down_scan_ms: u64,
    pub effect_buffer: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: TIMER_TICK_MS,
            mismatch_delay_ms: MISMATCH_DELAY_MS,
            sync_debounce_ms: SYNC_DEBOUNCE_MS,
            double_down_scan_ms: DOUBLE_DOWN_SCAN_MS,
            effect_buffer: EFFECT_BUFFER_CAPACITY,
        }
    }
}

impl RuntimeConfig {
    /// Create from environment variables, falling back to defaults for unset ones
    pub fn from_env() -> Result<Self, RuntimeError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`RuntimeConfig::from_env`] with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RuntimeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            tick_interval_ms: read(&lookup, "MEMORY_MATCH_TICK_MS", defaults.tick_interval_ms)?,
            mismatch_delay_ms: read(
                &lookup,
                "MEMORY_MATCH_MISMATCH_DELAY_MS",
                defaults.mismatch_delay_ms,
            )?,
            sync_debounce_ms: read(
                &lookup,
                "MEMORY_MATCH_SYNC_DEBOUNCE_MS",
                defaults.sync_debounce_ms,
            )?,
            double_down_scan_ms: defaults.double_down_scan_ms,
            effect_buffer: read(&lookup, "MEMORY_MATCH_EFFECT_BUFFER", defaults.effect_buffer)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RuntimeError> {
        let positive = [
            ("tick_interval_ms", self.tick_interval_ms),
            ("mismatch_delay_ms", self.mismatch_delay_ms),
            ("sync_debounce_ms", self.sync_debounce_ms),
            ("effect_buffer", self.effect_buffer as u64),
        ];
        match positive.into_iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(RuntimeError::InvalidConfig {
                name,
                reason: "must be greater than zero".to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn read<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, RuntimeError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    trimmed.parse().map_err(|_| RuntimeError::InvalidConfig {
        name,
        reason: format!("cannot parse {trimmed:?}"),
    })
}
