//! Lava Rapido Pro Configuration

use std::path::PathBuf;

use chrono::FixedOffset;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clock::offset_from_minutes;

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LavaproConfig {
    /// Length of the free trial granted at registration
    pub trial_period_days: u32,
    /// Local time offset (minutes east of UTC) for day/week/month boundaries
    pub utc_offset_minutes: i32,
    /// Directory for the JSON file store; in-memory when unset
    pub data_dir: Option<PathBuf>,
    /// Operator account created at startup when missing
    pub operator: Option<OperatorSeed>,
    /// Digits of the operator's messaging handle
    pub operator_contact: String,
    /// Per-month plan prices
    pub plan_prices: PlanPrices,
    /// Stale-client filter presets offered to tenants
    pub stale_thresholds_days: Vec<u32>,
}

impl Default for LavaproConfig {
    fn default() -> Self {
        Self {
            trial_period_days: 5,
            utc_offset_minutes: 0,
            data_dir: None,
            operator: None,
            operator_contact: "558291058510".into(),
            plan_prices: PlanPrices::default(),
            stale_thresholds_days: vec![30, 60],
        }
    }
}

impl LavaproConfig {
    /// Local offset used for period boundaries
    pub fn local_offset(&self) -> FixedOffset {
        offset_from_minutes(self.utc_offset_minutes)
    }

    /// Load from file
    pub fn load(path: &str) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Load from file, falling back to defaults
    pub fn load_or_default(path: &str) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!(path, error = %e, "config not loaded, using defaults");
            Self::default()
        })
    }

    /// Save to file
    pub fn save(&self, path: &str) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

/// Operator bootstrap account
#[derive(Clone, Serialize, Deserialize)]
pub struct OperatorSeed {
    pub name: String,
    pub contact: String,
    pub email: String,
    pub secret: String,
}

impl std::fmt::Debug for OperatorSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorSeed")
            .field("name", &self.name)
            .field("contact", &self.contact)
            .field("email", &self.email)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Price per month of each paid plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPrices {
    pub monthly: Decimal,
    pub quarterly: Decimal,
    pub yearly: Decimal,
}

impl Default for PlanPrices {
    fn default() -> Self {
        Self {
            monthly: dec!(49.90),
            quarterly: dec!(129.90) / dec!(3),
            yearly: dec!(29.90),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LavaproConfig::default();
        assert_eq!(config.trial_period_days, 5);
        assert_eq!(config.plan_prices.quarterly, dec!(43.30));
        assert_eq!(config.stale_thresholds_days, vec![30, 60]);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: LavaproConfig = serde_json::from_str(r#"{"trial_period_days": 7}"#).unwrap();
        assert_eq!(config.trial_period_days, 7);
        assert_eq!(config.operator_contact, "558291058510");
    }

    #[test]
    fn test_save_and_load_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lavapro.json");
        let path = path.to_str().unwrap();

        let mut config = LavaproConfig::default();
        config.utc_offset_minutes = -180;
        config.save(path).unwrap();

        assert_eq!(LavaproConfig::load(path).unwrap().utc_offset_minutes, -180);
        assert_eq!(LavaproConfig::load_or_default("/nonexistent/lavapro.json").trial_period_days, 5);
    }

    #[test]
    fn test_operator_secret_not_in_debug() {
        let seed = OperatorSeed {
            name: "Admin".into(),
            contact: "5582".into(),
            email: "admin@lavapro.app".into(),
            secret: "hunter2".into(),
        };
        assert!(!format!("{seed:?}").contains("hunter2"));
    }
}
