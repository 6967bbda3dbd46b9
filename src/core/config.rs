//! Run configuration
//!
//! A [`StitchConfig`] can be built from defaults, loaded from a TOML file and
//! then patched with command-line values. Border-pair tolerance widenings live
//! in a [`ToleranceTable`] that is consulted per pair; an override never
//! carries over to another border.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::borders::StateCode;
use crate::core::error::{Error, Result};

/// Default matching tolerance in feet
pub const DEFAULT_TOLERANCE_FT: f64 = 305.0;

/// Functional class assigned to synthetic connectors
pub const CONNECTOR_FUNC_CLASS: i64 = 990;

/// Default data year
pub const DEFAULT_YEAR: u16 = 2016;

/// A widened tolerance for one unordered pair of states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceOverride {
    pub states: [String; 2],
    pub feet: f64,
}

impl ToleranceOverride {
    fn new(a: &str, b: &str, feet: f64) -> Self {
        Self {
            states: [a.to_string(), b.to_string()],
            feet,
        }
    }

    fn matches(&self, a: &StateCode, b: &StateCode) -> bool {
        let [x, y] = &self.states;
        (x.eq_ignore_ascii_case(a.as_str()) && y.eq_ignore_ascii_case(b.as_str()))
            || (x.eq_ignore_ascii_case(b.as_str()) && y.eq_ignore_ascii_case(a.as_str()))
    }
}

/// Borders where the source layers were clipped far enough apart that the
/// base tolerance misses the true counterpart.
pub fn default_overrides() -> Vec<ToleranceOverride> {
    vec![
        ToleranceOverride::new("AR", "TN", 610.0),
        ToleranceOverride::new("KS", "MO", 615.0),
        ToleranceOverride::new("MN", "WI", 1500.0),
        ToleranceOverride::new("NY", "CT", 375.0),
        ToleranceOverride::new("CO", "NM", 350.0),
    ]
}

/// Per-pair tolerance lookup
#[derive(Debug, Clone, PartialEq)]
pub struct ToleranceTable {
    base_ft: f64,
    overrides: Vec<ToleranceOverride>,
}

impl ToleranceTable {
    pub fn new(base_ft: f64, overrides: Vec<ToleranceOverride>) -> Self {
        Self { base_ft, overrides }
    }

    /// Tolerance in feet for the border between `a` and `b`, in either order
    pub fn for_pair(&self, a: &StateCode, b: &StateCode) -> f64 {
        self.overrides
            .iter()
            .rev()
            .find(|o| o.matches(a, b))
            .map(|o| o.feet)
            .unwrap_or(self.base_ft)
    }

    pub fn base_ft(&self) -> f64 {
        self.base_ft
    }
}

impl Default for ToleranceTable {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE_FT, default_overrides())
    }
}

/// Configuration for a stitching run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchConfig {
    /// Data year, part of the dataset names (`arnold_states_<year>`)
    pub year: u16,

    /// Directory holding the per-state dataset and receiving the merged output
    pub output_dir: Option<PathBuf>,

    /// Matching tolerance for borders without an override
    pub base_tolerance_ft: f64,

    /// Widened tolerances for specific borders
    pub overrides: Vec<ToleranceOverride>,

    /// Functional class written onto connectors
    pub connector_func_class: i64,

    /// Property name prefixes removed from the merged layer
    pub drop_field_prefixes: Vec<String>,

    /// Stop after writing connectors
    pub skip_merge: bool,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            year: DEFAULT_YEAR,
            output_dir: None,
            base_tolerance_ft: DEFAULT_TOLERANCE_FT,
            overrides: default_overrides(),
            connector_func_class: CONNECTOR_FUNC_CLASS,
            drop_field_prefixes: vec!["FID_".to_string()],
            skip_merge: false,
        }
    }
}

impl StitchConfig {
    /// Load a configuration from a TOML file; missing keys take defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tolerances and state codes that cannot be applied
    pub fn validate(&self) -> Result<()> {
        if !self.base_tolerance_ft.is_finite() || self.base_tolerance_ft <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "base tolerance must be a positive number of feet, got {}",
                self.base_tolerance_ft
            )));
        }
        for o in &self.overrides {
            for state in &o.states {
                StateCode::parse(state)?;
            }
            if !o.feet.is_finite() || o.feet <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "tolerance for {}-{} must be a positive number of feet, got {}",
                    o.states[0], o.states[1], o.feet
                )));
            }
        }
        Ok(())
    }

    pub fn tolerances(&self) -> ToleranceTable {
        ToleranceTable::new(self.base_tolerance_ft, self.overrides.clone())
    }

    /// Resolved output directory
    pub fn output_dir(&self) -> Result<&Path> {
        self.output_dir
            .as_deref()
            .ok_or_else(|| Error::InvalidConfig("no output directory configured".to_string()))
    }

    /// Directory of the per-state dataset for the configured year
    pub fn states_dataset(&self) -> Result<PathBuf> {
        Ok(self
            .output_dir()?
            .join(format!("arnold_states_{}", self.year)))
    }

    /// Directory of the merged national dataset for the configured year
    pub fn merged_dataset(&self) -> Result<PathBuf> {
        Ok(self
            .output_dir()?
            .join(format!("arnold_merged_{}", self.year)))
    }
}
