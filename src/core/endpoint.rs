//! Border dangle endpoints
//!
//! Each state contributes a `<ST>_state_border_dangles` point layer. An
//! endpoint is identified by its exact coordinate and its attribute signature
//! (functional class, NHS flag, facility type and through lanes concatenated).
//! The signature helps pick the same road on the other side of the border when
//! the nearest dangle is not the right one.

use log::warn;
use serde_json::Value;
use std::collections::HashSet;

use crate::core::borders::StateCode;
use crate::core::coord::{Coord, CoordKey};
use crate::core::error::Result;
use crate::core::layer::Properties;
use crate::core::store::FeatureStore;

/// Suffix of the per-state dangle layers
pub const DANGLE_LAYER_SUFFIX: &str = "_state_border_dangles";

/// Attribute fields forming the signature, in concatenation order
pub const SIGNATURE_FIELDS: [&str; 4] = ["func_class", "nhs", "fac_type", "thru_lanes"];

/// Name of the dangle layer for `state`
pub fn dangle_layer_name(state: &StateCode) -> String {
    format!("{state}{DANGLE_LAYER_SUFFIX}")
}

/// A dangle endpoint with its attribute signature
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub coord: Coord,
    pub signature: String,
}

impl Endpoint {
    pub fn new(coord: Coord, signature: impl Into<String>) -> Self {
        Self {
            coord,
            signature: signature.into(),
        }
    }

    fn key(&self) -> (CoordKey, String) {
        (self.coord.key(), self.signature.clone())
    }
}

/// Render one attribute value for the signature
fn signature_part(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Build the attribute signature of a dangle; the second value is true when
/// any of the signature fields was absent or null
pub fn attribute_signature(properties: &Properties) -> (String, bool) {
    let mut incomplete = false;
    let signature = SIGNATURE_FIELDS
        .iter()
        .map(|field| {
            let value = properties.get(*field);
            if matches!(value, None | Some(Value::Null)) {
                incomplete = true;
            }
            signature_part(value)
        })
        .collect();
    (signature, incomplete)
}

/// Deduplicated endpoints of one state, in layer order
#[derive(Debug, Clone)]
pub struct EndpointSet {
    pub state: StateCode,
    endpoints: Vec<Endpoint>,
    seen: HashSet<(CoordKey, String)>,
    duplicates: usize,
}

impl EndpointSet {
    pub fn new(state: StateCode) -> Self {
        Self {
            state,
            endpoints: Vec::new(),
            seen: HashSet::new(),
            duplicates: 0,
        }
    }

    /// Add an endpoint; returns false (and keeps the first) when an identical
    /// coordinate and signature is already present
    pub fn insert(&mut self, endpoint: Endpoint) -> bool {
        if !self.seen.insert(endpoint.key()) {
            self.duplicates += 1;
            return false;
        }
        self.endpoints.push(endpoint);
        true
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Number of rows dropped as duplicates
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

/// Read the dangle layer of `state` into a deduplicated endpoint set
pub fn load_endpoints<S: FeatureStore + ?Sized>(store: &S, state: &StateCode) -> Result<EndpointSet> {
    let layer = dangle_layer_name(state);
    let collection = store.read_layer(&layer)?;

    let mut set = EndpointSet::new(state.clone());
    let mut incomplete = 0usize;
    let mut not_points = 0usize;

    for feature in &collection.features {
        let Some(coord) = feature.geometry.as_point() else {
            not_points += 1;
            continue;
        };
        let (signature, missing) = attribute_signature(&feature.properties);
        if missing {
            incomplete += 1;
        }
        if !set.insert(Endpoint::new(coord, signature.clone())) {
            warn!(
                "{layer}: duplicate dangle at ({}, {}) with signature '{signature}' ignored",
                coord.lon, coord.lat
            );
        }
    }

    if not_points > 0 {
        warn!("{layer}: skipped {not_points} features without point geometry");
    }
    if incomplete > 0 {
        warn!("{layer}: {incomplete} dangles lack one or more signature attributes");
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layer::{Feature, FeatureCollection, Geometry};
    use crate::core::store::MemoryStore;
    use serde_json::json;

    fn props(value: Value) -> Properties {
        value.as_object().cloned().unwrap()
    }

    fn code(s: &str) -> StateCode {
        StateCode::parse(s).unwrap()
    }

    #[test]
    fn test_signature_concatenates_fields_in_order() {
        let (sig, incomplete) = attribute_signature(&props(json!({
            "thru_lanes": 2, "fac_type": 1, "nhs": "1", "func_class": 3
        })));
        assert_eq!(sig, "3112");
        assert!(!incomplete);
    }

    #[test]
    fn test_signature_with_missing_fields() {
        let (sig, incomplete) = attribute_signature(&props(json!({
            "func_class": 4, "nhs": null, "thru_lanes": 2
        })));
        assert_eq!(sig, "42");
        assert!(incomplete);
    }

    #[test]
    fn test_duplicate_endpoints_collapse() {
        let mut set = EndpointSet::new(code("NH"));
        let coord = Coord::new(-71.5, 42.7);
        assert!(set.insert(Endpoint::new(coord, "3112")));
        assert!(!set.insert(Endpoint::new(coord, "3112")));
        // same coordinate, different road attributes: a distinct endpoint
        assert!(set.insert(Endpoint::new(coord, "4102")));
        assert_eq!(set.len(), 2);
        assert_eq!(set.duplicates(), 1);
    }

    #[test]
    fn test_load_endpoints_from_store() {
        let mut store = MemoryStore::new();
        let row = props(json!({"func_class": 3, "nhs": 1, "fac_type": 1, "thru_lanes": 2}));
        store.insert(
            "VT_state_border_dangles",
            FeatureCollection::new(vec![
                Feature::point(Coord::new(-72.4, 42.73), row.clone()),
                Feature::point(Coord::new(-72.4, 42.73), row.clone()),
                Feature::point(Coord::new(-72.1, 42.72), Properties::new()),
                Feature::new(
                    Geometry::LineString {
                        coordinates: vec![[0.0, 0.0].into(), [1.0, 1.0].into()],
                    },
                    row,
                ),
            ]),
        );

        let set = load_endpoints(&store, &code("VT")).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.duplicates(), 1);
        assert_eq!(set.endpoints()[0].signature, "3112");
        assert_eq!(set.endpoints()[1].signature, "");
    }

    #[test]
    fn test_load_endpoints_ignores_elevation() {
        let layer: FeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-90.0, 35.0, 112.5]},
                "properties": {"func_class": 3, "nhs": 1, "fac_type": 1, "thru_lanes": 2}
            }]
        }))
        .unwrap();
        let mut store = MemoryStore::new();
        store.insert("AR_state_border_dangles", layer);

        let set = load_endpoints(&store, &code("AR")).unwrap();
        assert_eq!(set.endpoints()[0].coord, Coord::new(-90.0, 35.0));
    }

    #[test]
    fn test_load_endpoints_missing_layer() {
        let store = MemoryStore::new();
        assert!(load_endpoints(&store, &code("VT")).is_err());
    }
}
