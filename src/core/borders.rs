//! State codes and the bordering-states lookup
//!
//! The built-in table covers the contiguous United States plus DC. States that
//! only touch at a single corner (Four Corners) are not listed as neighbors:
//! no road crosses a border at a point.

use std::collections::HashMap;
use std::fmt;

use crate::core::error::{Error, Result};

/// Two-letter postal code of a state, always upper case
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateCode(String);

impl StateCode {
    /// Parse a two-letter state code, case-insensitively
    pub fn parse(code: &str) -> Result<Self> {
        let code = code.trim();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::InvalidConfig(format!(
                "'{code}' is not a two-letter state code"
            )));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Derive the state code from a layer name such as `AR_state_border_dangles`
    pub fn from_layer_name(layer: &str) -> Result<Self> {
        let prefix = layer.get(..2).ok_or_else(|| Error::InvalidLayer {
            layer: layer.to_string(),
            reason: "layer name does not start with a state code".to_string(),
        })?;
        Self::parse(prefix).map_err(|_| Error::InvalidLayer {
            layer: layer.to_string(),
            reason: "layer name does not start with a state code".to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lookup of which states share a border with a given state
pub trait BorderTable {
    /// States bordering `state`, in the order they should be scanned
    fn bordering_states(&self, state: &StateCode) -> Vec<StateCode>;
}

/// Static adjacency of the contiguous United States and DC
const US_BORDERS: &[(&str, &[&str])] = &[
    ("AL", &["FL", "GA", "MS", "TN"]),
    ("AR", &["LA", "MS", "MO", "OK", "TN", "TX"]),
    ("AZ", &["CA", "NV", "NM", "UT"]),
    ("CA", &["AZ", "NV", "OR"]),
    ("CO", &["KS", "NE", "NM", "OK", "UT", "WY"]),
    ("CT", &["MA", "NY", "RI"]),
    ("DC", &["MD", "VA"]),
    ("DE", &["MD", "NJ", "PA"]),
    ("FL", &["AL", "GA"]),
    ("GA", &["AL", "FL", "NC", "SC", "TN"]),
    ("IA", &["IL", "MN", "MO", "NE", "SD", "WI"]),
    ("ID", &["MT", "NV", "OR", "UT", "WA", "WY"]),
    ("IL", &["IN", "IA", "KY", "MO", "WI"]),
    ("IN", &["IL", "KY", "MI", "OH"]),
    ("KS", &["CO", "MO", "NE", "OK"]),
    ("KY", &["IL", "IN", "MO", "OH", "TN", "VA", "WV"]),
    ("LA", &["AR", "MS", "TX"]),
    ("MA", &["CT", "NH", "NY", "RI", "VT"]),
    ("MD", &["DC", "DE", "PA", "VA", "WV"]),
    ("ME", &["NH"]),
    ("MI", &["IN", "OH", "WI"]),
    ("MN", &["IA", "ND", "SD", "WI"]),
    ("MO", &["AR", "IL", "IA", "KS", "KY", "NE", "OK", "TN"]),
    ("MS", &["AL", "AR", "LA", "TN"]),
    ("MT", &["ID", "ND", "SD", "WY"]),
    ("NC", &["GA", "SC", "TN", "VA"]),
    ("ND", &["MN", "MT", "SD"]),
    ("NE", &["CO", "IA", "KS", "MO", "SD", "WY"]),
    ("NH", &["ME", "MA", "VT"]),
    ("NJ", &["DE", "NY", "PA"]),
    ("NM", &["AZ", "CO", "OK", "TX"]),
    ("NV", &["AZ", "CA", "ID", "OR", "UT"]),
    ("NY", &["CT", "MA", "NJ", "PA", "VT"]),
    ("OH", &["IN", "KY", "MI", "PA", "WV"]),
    ("OK", &["AR", "CO", "KS", "MO", "NM", "TX"]),
    ("OR", &["CA", "ID", "NV", "WA"]),
    ("PA", &["DE", "MD", "NJ", "NY", "OH", "WV"]),
    ("RI", &["CT", "MA"]),
    ("SC", &["GA", "NC"]),
    ("SD", &["IA", "MN", "MT", "NE", "ND", "WY"]),
    ("TN", &["AL", "AR", "GA", "KY", "MS", "MO", "NC", "VA"]),
    ("TX", &["AR", "LA", "NM", "OK"]),
    ("UT", &["AZ", "CO", "ID", "NV", "WY"]),
    ("VA", &["DC", "KY", "MD", "NC", "TN", "WV"]),
    ("VT", &["MA", "NH", "NY"]),
    ("WA", &["ID", "OR"]),
    ("WI", &["IL", "IA", "MI", "MN"]),
    ("WV", &["KY", "MD", "OH", "PA", "VA"]),
    ("WY", &["CO", "ID", "MT", "NE", "SD", "UT"]),
];

/// Built-in border table for the contiguous United States
#[derive(Debug, Default, Clone, Copy)]
pub struct UsStateBorders;

impl BorderTable for UsStateBorders {
    fn bordering_states(&self, state: &StateCode) -> Vec<StateCode> {
        US_BORDERS
            .iter()
            .find(|(code, _)| *code == state.as_str())
            .map(|(_, neighbors)| {
                neighbors
                    .iter()
                    .map(|n| StateCode(n.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Border table backed by an explicit map, for partial or non-US datasets
#[derive(Debug, Default, Clone)]
pub struct CustomBorders {
    neighbors: HashMap<StateCode, Vec<StateCode>>,
}

impl CustomBorders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `a` and `b` share a border (both directions)
    pub fn add_border(&mut self, a: StateCode, b: StateCode) {
        let a_list = self.neighbors.entry(a.clone()).or_default();
        if !a_list.contains(&b) {
            a_list.push(b.clone());
        }
        let b_list = self.neighbors.entry(b).or_default();
        if !b_list.contains(&a) {
            b_list.push(a);
        }
    }
}

impl BorderTable for CustomBorders {
    fn bordering_states(&self, state: &StateCode) -> Vec<StateCode> {
        self.neighbors.get(state).cloned().unwrap_or_default()
    }
}
