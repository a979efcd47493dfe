// ⚙️ Settings - alias table, column names, payout tiers
// Loaded from JSON; anything omitted falls back to the built-in defaults

use crate::aliases::{default_rules, AliasResolver, AliasRule, Normalization};
use crate::payout::PayoutSchedule;
use crate::reports::InventoryColumns;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Environment variable holding the settings path
pub const CONFIG_ENV_VAR: &str = "SHOP_OPS_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub normalization: Normalization,

    /// Ordered: first matching pattern wins
    pub aliases: Vec<AliasRule>,

    pub inventory_columns: InventoryColumns,

    pub payout: PayoutSchedule,

    /// Column holding the courier name on the delivery sheet
    pub courier_column: String,

    /// Column holding the delivery distance
    pub distance_column: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            normalization: Normalization::default(),
            aliases: default_rules(),
            inventory_columns: InventoryColumns::default(),
            payout: PayoutSchedule::default(),
            courier_column: "Entregador".to_string(),
            distance_column: "Distancia".to_string(),
        }
    }
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read settings file: {:?}", path.as_ref()))?;

        let settings: Settings =
            serde_json::from_str(&content).context("Failed to parse settings JSON")?;

        tracing::info!(path = ?path.as_ref(), aliases = settings.aliases.len(), "loaded settings");
        Ok(settings)
    }

    /// Settings from `$SHOP_OPS_CONFIG`, or defaults when unset
    pub fn from_env() -> Result<Self> {
        match env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(path),
            None => Ok(Settings::default()),
        }
    }

    pub fn resolver(&self) -> AliasResolver {
        AliasResolver::with_normalization(self.aliases.clone(), self.normalization)
    }
}
