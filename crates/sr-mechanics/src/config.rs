//! Rules configuration.
//!
//! Table-wide defaults for skill tests and damage rolls. Every field has a
//! default, so a config file only needs the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sr_dice::Limits;

use crate::compose::Thresholds;
use crate::error::{MechError, MechResult};

/// Default graze formula: the primary roll's dice without modifiers.
pub const DEFAULT_GRAZE_FORMULA: &str = "@damage.dice";

/// Rules configuration shared by every roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    /// Natural d20 result at or above which a test rolls an opportunity.
    pub opportunity_threshold: u32,
    /// Natural d20 result at or below which a test rolls a complication.
    pub complication_threshold: u32,
    /// Whether skill tests raise the stakes (add the plot die) by default.
    pub plot_die: bool,
    /// Graze formula used when a damaging item does not override it.
    pub graze_formula: String,
    /// Maximum number of dice in a single dice term.
    pub max_dice: u32,
    /// Maximum number of faces on a die.
    pub max_faces: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        let limits = Limits::default();
        Self {
            opportunity_threshold: 20,
            complication_threshold: 1,
            plot_die: false,
            graze_formula: DEFAULT_GRAZE_FORMULA.to_string(),
            max_dice: limits.max_dice,
            max_faces: limits.max_faces,
        }
    }
}

impl RulesConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> MechResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| MechError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> MechResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), "loaded rules config");
        Ok(config)
    }

    /// Check the config for values no roll could use.
    pub fn validate(&self) -> MechResult<()> {
        self.thresholds()
            .map_err(|e| MechError::Config(e.to_string()))?;
        if self.max_faces == 0 {
            return Err(MechError::Config("max_faces must be at least 1".into()));
        }
        if self.graze_formula.trim().is_empty() {
            return Err(MechError::Config("graze_formula must not be empty".into()));
        }
        Ok(())
    }

    /// Default thresholds for skill tests.
    pub fn thresholds(&self) -> MechResult<Thresholds> {
        Thresholds::new(self.opportunity_threshold, self.complication_threshold)
    }

    /// Limits applied when parsing formulas.
    pub fn limits(&self) -> Limits {
        Limits {
            max_dice: self.max_dice,
            max_faces: self.max_faces,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RulesConfig::default();
        assert_eq!(config.opportunity_threshold, 20);
        assert_eq!(config.complication_threshold, 1);
        assert_eq!(config.graze_formula, "@damage.dice");
        assert_eq!(config.limits(), Limits::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = RulesConfig::from_json(r#"{ "plot_die": true, "opportunity_threshold": 19 }"#)
            .unwrap();
        assert!(config.plot_die);
        assert_eq!(config.opportunity_threshold, 19);
        assert_eq!(config.complication_threshold, 1);
    }

    #[test]
    fn overlapping_thresholds_rejected() {
        let err = RulesConfig::from_json(r#"{ "opportunity_threshold": 1 }"#).unwrap_err();
        assert!(matches!(err, MechError::Config(_)));
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(RulesConfig::from_json(r#"{ "plotdie": true }"#).is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, r#"{ "graze_formula": "@damage.unmodded" }"#).unwrap();
        let config = RulesConfig::from_path(&path).unwrap();
        assert_eq!(config.graze_formula, "@damage.unmodded");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RulesConfig::from_path("/nonexistent/rules.json").unwrap_err();
        assert!(matches!(err, MechError::Io(_)));
        assert!(!err.is_recoverable());
    }
}
