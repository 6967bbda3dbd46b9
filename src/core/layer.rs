//! GeoJSON feature model used by the stores
//!
//! Dangle layers hold `Point`s, connector layers hold `LineString`s and road
//! layers hold `LineString`s or `MultiLineString`s. Any other geometry is kept
//! as raw JSON and written back untouched. Positions may carry a third
//! (elevation) value; only longitude and latitude are used for matching.
//! Members the model does not know about (`id`, `bbox`, `crs`, ...) are kept
//! in `extra` so rewriting a layer does not lose them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

use crate::core::coord::Coord;

/// Feature properties (attribute table row)
pub type Properties = Map<String, Value>;

/// A GeoJSON position: `[lon, lat]` or `[lon, lat, z]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
    pub z: Option<f64>,
}

impl Position {
    pub fn coord(&self) -> Coord {
        Coord::new(self.lon, self.lat)
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(values: Vec<f64>) -> std::result::Result<Self, Self::Error> {
        match values[..] {
            [lon, lat] => Ok(Self { lon, lat, z: None }),
            [lon, lat, z] => Ok(Self { lon, lat, z: Some(z) }),
            _ => Err(format!(
                "position must have 2 or 3 values, found {}",
                values.len()
            )),
        }
    }
}

impl From<Position> for Vec<f64> {
    fn from(p: Position) -> Self {
        match p.z {
            Some(z) => vec![p.lon, p.lat, z],
            None => vec![p.lon, p.lat],
        }
    }
}

impl From<[f64; 2]> for Position {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat, z: None }
    }
}

impl From<Coord> for Position {
    fn from(c: Coord) -> Self {
        Self {
            lon: c.lon,
            lat: c.lat,
            z: None,
        }
    }
}

/// Geometry types the pipeline reads, parsed from their `type` tag
#[derive(Deserialize)]
#[serde(tag = "type")]
enum TypedGeometry {
    Point { coordinates: Position },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
}

/// Geometry of a feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Geometry {
    Point { coordinates: Position },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    /// Any other geometry (including `null`), passed through as is
    Other(Value),
}

impl TryFrom<Value> for Geometry {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        match value.get("type").and_then(Value::as_str) {
            Some("Point" | "LineString" | "MultiLineString") => {
                Ok(match serde_json::from_value(value)? {
                    TypedGeometry::Point { coordinates } => Geometry::Point { coordinates },
                    TypedGeometry::LineString { coordinates } => {
                        Geometry::LineString { coordinates }
                    }
                    TypedGeometry::MultiLineString { coordinates } => {
                        Geometry::MultiLineString { coordinates }
                    }
                })
            }
            _ => Ok(Geometry::Other(value)),
        }
    }
}

impl From<Geometry> for Value {
    fn from(geometry: Geometry) -> Self {
        match geometry {
            Geometry::Point { coordinates } => json!({"type": "Point", "coordinates": coordinates}),
            Geometry::LineString { coordinates } => {
                json!({"type": "LineString", "coordinates": coordinates})
            }
            Geometry::MultiLineString { coordinates } => {
                json!({"type": "MultiLineString", "coordinates": coordinates})
            }
            Geometry::Other(value) => value,
        }
    }
}

impl Geometry {
    /// Two-point line between `a` and `b`
    pub fn line(a: Coord, b: Coord) -> Self {
        Geometry::LineString {
            coordinates: vec![a.into(), b.into()],
        }
    }

    pub fn as_point(&self) -> Option<Coord> {
        match self {
            Geometry::Point { coordinates } => Some(coordinates.coord()),
            _ => None,
        }
    }

    /// Parts of a linear geometry; empty for anything else
    pub fn line_parts(&self) -> Vec<&[Position]> {
        match self {
            Geometry::LineString { coordinates } => vec![coordinates.as_slice()],
            Geometry::MultiLineString { coordinates } => {
                coordinates.iter().map(Vec::as_slice).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// `"properties": null` is valid GeoJSON
fn nullable_properties<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Properties, D::Error> {
    Ok(Option::<Properties>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: Geometry,
    #[serde(default, deserialize_with = "nullable_properties")]
    pub properties: Properties,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Properties) -> Self {
        Self {
            kind: "Feature".to_string(),
            geometry,
            properties,
            extra: Map::new(),
        }
    }

    pub fn point(coord: Coord, properties: Properties) -> Self {
        Self::new(
            Geometry::Point {
                coordinates: coord.into(),
            },
            properties,
        )
    }
}

/// A layer: every feature of one feature class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
            extra: Map::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::empty()
    }
}
