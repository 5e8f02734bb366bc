//! Runtime configuration for fee strategy and retries
//!
//! Defaults are conservative and validated: the fee margins have hard
//! floors (a submission must never go out under-margined because of a
//! config typo), and retry settings must describe at least one attempt.

use crate::error::{Result, VaultError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Minimum accepted resource (gas) margin, percent.
pub const MIN_RESOURCE_MARGIN_PCT: u64 = 20;
/// Minimum accepted fee-rate margin, percent.
pub const MIN_RATE_MARGIN_PCT: u64 = 10;

/// Fee estimation and pricing strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Safety margin applied on top of the cost estimate, percent
    pub resource_margin_pct: u64,
    /// Margin applied on top of the current network fee rate, percent
    pub rate_margin_pct: u64,
    /// Conservative resource ceiling used when estimation fails
    pub fallback_resource_limit: u64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            resource_margin_pct: MIN_RESOURCE_MARGIN_PCT,
            rate_margin_pct: MIN_RATE_MARGIN_PCT,
            fallback_resource_limit: 250_000,
        }
    }
}

impl FeeConfig {
    /// Apply the resource margin to an estimate (or the fallback ceiling).
    pub fn margined_limit(&self, estimate: u64) -> u64 {
        estimate.saturating_mul(100 + self.resource_margin_pct) / 100
    }

    /// Apply the rate margin to a fresh fee quote.
    pub fn margined_rate(&self, rate: u64) -> u64 {
        rate.saturating_mul(100 + self.rate_margin_pct) / 100
    }
}

/// Exponential backoff policy for idempotent read retries.
///
/// Mutating calls are never retried under this policy; it applies only to
/// event fetches and other reads whose repetition is harmless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum attempts before giving up (including the first)
    pub max_attempts: u32,
    /// Base delay before the first retry, milliseconds
    pub base_delay_ms: u64,
    /// Ceiling on the delay between attempts, milliseconds
    pub max_delay_ms: u64,
    /// Backoff multiplier between attempts
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 5_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay before the given retry (1-based attempt number of the retry).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(retry.saturating_sub(1) as i32);
        let ms = (self.base_delay_ms as f64 * factor) as u64;
        Duration::from_millis(ms.min(self.max_delay_ms))
    }
}

/// Top-level orchestrator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Fee estimation and pricing strategy
    pub fees: FeeConfig,
    /// Read-side retry policy
    pub retry: RetryConfig,
}

impl OrchestratorConfig {
    /// Parse and validate a TOML configuration document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| VaultError::validation(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate margin floors and retry sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fees.resource_margin_pct < MIN_RESOURCE_MARGIN_PCT {
            return Err(VaultError::validation(format!(
                "resource margin must be at least {MIN_RESOURCE_MARGIN_PCT}%"
            )));
        }
        if self.fees.rate_margin_pct < MIN_RATE_MARGIN_PCT {
            return Err(VaultError::validation(format!(
                "fee-rate margin must be at least {MIN_RATE_MARGIN_PCT}%"
            )));
        }
        if self.fees.fallback_resource_limit == 0 {
            return Err(VaultError::validation(
                "fallback resource limit must be non-zero",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(VaultError::validation("retry must allow at least one attempt"));
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(VaultError::validation(
                "backoff multiplier must be at least 1.0",
            ));
        }
        Ok(())
    }
}
