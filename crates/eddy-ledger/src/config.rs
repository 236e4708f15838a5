//! Ledger configuration.
//!
//! [`LedgerConfig`] is layered from built-in defaults, an optional TOML
//! (or any format the `config` crate recognises by extension) file, and
//! `EDDY_`-prefixed environment variables, in that order of precedence.
//! Fee rates are fixed for the lifetime of a ledger once it is built.

use std::path::Path;

use config::{Config, Environment, File};
use eddy_core::constants::{
    BPS_PRECISION, COIN, REFLECTION_SHARE_BPS, TOTAL_SUPPLY, TRANSFER_FEE_BPS,
};
use eddy_core::error::ConfigError;
use eddy_core::genesis::Genesis;
use eddy_core::types::{AccountId, Amount};
use eddy_reflect::FeePolicy;
use serde::{Deserialize, Serialize};

/// Environment variable prefix, e.g. `EDDY_FEE_BPS=500`.
pub const ENV_PREFIX: &str = "EDDY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Real supply in whole tokens.
    pub total_supply_tokens: u64,
    /// Transfer fee in basis points.
    pub fee_bps: u64,
    /// Share of the fee redistributed by reflection, in basis points of the fee.
    pub reflection_share_bps: u64,
    /// Log filter string (e.g. "info", "eddy_ledger=debug").
    pub log_level: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            total_supply_tokens: (TOTAL_SUPPLY / COIN) as u64,
            fee_bps: TRANSFER_FEE_BPS,
            reflection_share_bps: REFLECTION_SHARE_BPS,
            log_level: "info".to_string(),
        }
    }
}

impl LedgerConfig {
    /// Load and validate configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Load`] if a source cannot be read or parsed, or the
    /// validation error of the merged result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Config::try_from(&Self::default()).map_err(load_err)?;
        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let cfg: Self = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(load_err)?
            .try_deserialize()
            .map_err(load_err)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_supply_tokens == 0 {
            return Err(ConfigError::ZeroSupply);
        }
        self.fee_policy().map(|_| ())
    }

    /// Real supply in wei.
    pub fn total_supply(&self) -> Amount {
        self.total_supply_tokens as Amount * COIN
    }

    pub fn fee_policy(&self) -> Result<FeePolicy, ConfigError> {
        FeePolicy::new(self.fee_bps, self.reflection_share_bps)
    }

    pub fn genesis(&self, owner: AccountId) -> Genesis {
        Genesis::with_supply(owner, self.total_supply())
    }

    /// Fee rate as a percentage, for display.
    pub fn fee_percent(&self) -> f64 {
        self.fee_bps as f64 * 100.0 / BPS_PRECISION as f64
    }
}

fn load_err(e: config::ConfigError) -> ConfigError {
    ConfigError::Load(e.to_string())
}
