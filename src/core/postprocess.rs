//! Post-processing: connector tagging, lengths and the national merge

use geo::{HaversineLength, LineString};
use log::{debug, info};
use serde_json::Value;

use crate::core::emitter::CONNECTORS_LAYER;
use crate::core::error::Result;
use crate::core::layer::{FeatureCollection, Position};
use crate::core::store::FeatureStore;

/// Suffix of the final per-state road layers
pub const CLIP_LAYER_SUFFIX: &str = "_s7_clip_final";

/// Name of the merged national layer
pub const MERGED_LAYER: &str = "arnold_merged";

const METERS_PER_MILE: f64 = 1609.344;

/// Set `func_class` on every connector so they can be told apart from roads
pub fn tag_connectors<S: FeatureStore + ?Sized>(store: &mut S, func_class: i64) -> Result<usize> {
    let mut layer = store.read_layer(CONNECTORS_LAYER)?;
    for feature in &mut layer.features {
        feature
            .properties
            .insert("func_class".to_string(), Value::from(func_class));
    }
    store.write_layer(CONNECTORS_LAYER, &layer)?;
    Ok(layer.len())
}

/// Length of a line in statute miles
pub fn length_miles(positions: &[Position]) -> f64 {
    let line: LineString = positions.iter().map(|p| (p.lon, p.lat)).collect::<Vec<_>>().into();
    line.haversine_length() / METERS_PER_MILE
}

/// Recompute `len_miles` on every linear feature of `layer`; a multipart
/// line gets the sum of its parts, other geometries are left alone
pub fn calculate_length_miles<S: FeatureStore + ?Sized>(store: &mut S, layer: &str) -> Result<()> {
    let mut collection = store.read_layer(layer)?;
    for feature in &mut collection.features {
        let parts = feature.geometry.line_parts();
        if parts.is_empty() {
            continue;
        }
        let miles: f64 = parts.into_iter().map(length_miles).sum();
        feature
            .properties
            .insert("len_miles".to_string(), Value::from(miles));
    }
    store.write_layer(layer, &collection)?;
    debug!("len_miles computed for {} features of {layer}", collection.len());
    Ok(())
}

/// Layers that make up the national network, connectors last
pub fn network_layers<S: FeatureStore + ?Sized>(store: &S) -> Result<Vec<String>> {
    let mut layers = store.list_layers(CLIP_LAYER_SUFFIX)?;
    layers.push(CONNECTORS_LAYER.to_string());
    Ok(layers)
}

/// Concatenate `layers` from `source` into `MERGED_LAYER` of `target`,
/// dropping properties whose name starts with one of `drop_prefixes`
pub fn merge_layers<S, T>(
    source: &S,
    layers: &[String],
    target: &mut T,
    drop_prefixes: &[String],
) -> Result<usize>
where
    S: FeatureStore + ?Sized,
    T: FeatureStore + ?Sized,
{
    let mut merged = FeatureCollection::empty();
    for layer in layers {
        let collection = source.read_layer(layer)?;
        debug!("merging {} features from {layer}", collection.len());
        merged.features.extend(collection.features);
    }

    let mut dropped = 0usize;
    for feature in &mut merged.features {
        let before = feature.properties.len();
        feature
            .properties
            .retain(|key, _| !drop_prefixes.iter().any(|p| key.starts_with(p.as_str())));
        dropped += before - feature.properties.len();
    }
    if dropped > 0 {
        info!("dropped {dropped} bookkeeping field values from merged output");
    }

    target.write_layer(MERGED_LAYER, &merged)?;
    Ok(merged.len())
}
