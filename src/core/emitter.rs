//! Connector emission and the pair ledger
//!
//! Every state is processed on its own, so a border pair is usually found
//! twice: once from each side. The [`PairLedger`] remembers every pair in the
//! orientation it was found so the second discovery writes nothing.

use serde_json::Value;
use std::collections::HashSet;

use crate::core::borders::StateCode;
use crate::core::coord::{Coord, CoordKey};
use crate::core::edit::EditSession;
use crate::core::layer::{Feature, Geometry, Properties};
use crate::core::store::FeatureStore;

/// Name of the layer receiving connectors
pub const CONNECTORS_LAYER: &str = "connectors";

/// A synthetic segment joining a focus dangle to its counterpart
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub from: Coord,
    pub to: Coord,
    pub from_state: StateCode,
    pub to_state: StateCode,
}

impl Connector {
    pub fn to_feature(&self) -> Feature {
        let mut properties = Properties::new();
        properties.insert(
            "from_state".to_string(),
            Value::String(self.from_state.to_string()),
        );
        properties.insert(
            "to_state".to_string(),
            Value::String(self.to_state.to_string()),
        );
        Feature::new(Geometry::line(self.from, self.to), properties)
    }
}

/// Directed coordinate pairs seen during the run; append-only
#[derive(Debug, Default, Clone)]
pub struct PairLedger {
    pairs: HashSet<(CoordKey, CoordKey)>,
}

impl PairLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `a`-`b` was recorded in either orientation
    pub fn contains_pair(&self, a: Coord, b: Coord) -> bool {
        self.pairs.contains(&(a.key(), b.key())) || self.pairs.contains(&(b.key(), a.key()))
    }

    pub fn record(&mut self, a: Coord, b: Coord) {
        self.pairs.insert((a.key(), b.key()));
    }

    /// Number of distinct directed pairs recorded
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Outcome of offering a connector to the emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// Geometry buffered in the session
    Written,
    /// Pair already emitted; only the ledger was updated
    Suppressed,
}

/// Buffer `connector` unless its pair was already emitted, then record it
pub fn emit<S: FeatureStore + ?Sized>(
    ledger: &mut PairLedger,
    session: &mut EditSession<'_, S>,
    connector: &Connector,
) -> Emission {
    let emission = if ledger.contains_pair(connector.from, connector.to) {
        Emission::Suppressed
    } else {
        session.insert(connector.to_feature());
        Emission::Written
    };
    ledger.record(connector.from, connector.to);
    emission
}
