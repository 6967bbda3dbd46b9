//! Feature stores
//!
//! A store is a named collection of layers (feature classes). The pipeline
//! only needs a handful of operations, captured by [`FeatureStore`]:
//!
//! - [`GeoJsonStore`]: a directory with one `<layer>.geojson` file per layer.
//!   Every write goes to a temporary file in the same directory which is then
//!   renamed over the target, so readers never observe a half-written layer.
//! - [`MemoryStore`]: layers kept in memory, for tests and embedding.

use log::debug;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::core::error::{Error, Result};
use crate::core::layer::{Feature, FeatureCollection};

const LAYER_EXTENSION: &str = "geojson";

/// Layer-level operations of a geospatial datastore
pub trait FeatureStore {
    /// Names of all layers ending with `suffix`, sorted by name
    fn list_layers(&self, suffix: &str) -> Result<Vec<String>>;

    fn exists(&self, layer: &str) -> bool;

    fn read_layer(&self, layer: &str) -> Result<FeatureCollection>;

    /// Replace the content of `layer`, creating it if needed
    fn write_layer(&mut self, layer: &str, features: &FeatureCollection) -> Result<()>;

    /// Remove `layer`; removing a missing layer is not an error
    fn delete_layer(&mut self, layer: &str) -> Result<()>;

    /// Drop every layer and leave an empty store
    fn clear(&mut self) -> Result<()>;

    /// Append features to an existing layer in a single write
    fn append_features(&mut self, layer: &str, features: Vec<Feature>) -> Result<()> {
        let mut collection = self.read_layer(layer)?;
        collection.features.extend(features);
        self.write_layer(layer, &collection)
    }
}

/// Directory-backed store of GeoJSON layers
#[derive(Debug, Clone)]
pub struct GeoJsonStore {
    root: PathBuf,
}

impl GeoJsonStore {
    /// Open an existing store directory
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::MissingDataset(root));
        }
        Ok(Self { root })
    }

    /// Open a store directory, creating it when absent
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Store rooted at `root` without touching the filesystem; the directory
    /// is only replaced by [`FeatureStore::clear`]
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn layer_path(&self, layer: &str) -> PathBuf {
        self.root.join(format!("{layer}.{LAYER_EXTENSION}"))
    }
}

impl FeatureStore for GeoJsonStore {
    fn list_layers(&self, suffix: &str) -> Result<Vec<String>> {
        let mut layers = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(LAYER_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                if name.ends_with(suffix) {
                    layers.push(name.to_string());
                }
            }
        }
        layers.sort();
        Ok(layers)
    }

    fn exists(&self, layer: &str) -> bool {
        self.layer_path(layer).is_file()
    }

    fn read_layer(&self, layer: &str) -> Result<FeatureCollection> {
        let path = self.layer_path(layer);
        if !path.is_file() {
            return Err(Error::LayerNotFound(layer.to_string()));
        }
        let reader = BufReader::new(File::open(&path)?);
        let collection: FeatureCollection =
            serde_json::from_reader(reader).map_err(|e| Error::InvalidLayer {
                layer: layer.to_string(),
                reason: e.to_string(),
            })?;
        if collection.kind != "FeatureCollection" {
            return Err(Error::InvalidLayer {
                layer: layer.to_string(),
                reason: format!("expected FeatureCollection, found {}", collection.kind),
            });
        }
        Ok(collection)
    }

    fn write_layer(&mut self, layer: &str, features: &FeatureCollection) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer(&mut writer, features)?;
            writer.flush()?;
        }
        tmp.persist(self.layer_path(layer))?;
        debug!("wrote {} features to layer {layer}", features.len());
        Ok(())
    }

    fn delete_layer(&mut self, layer: &str) -> Result<()> {
        let path = self.layer_path(layer);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Delete the whole dataset directory and create it again
    fn clear(&mut self) -> Result<()> {
        if self.root.exists() {
            debug!("removing existing dataset {}", self.root.display());
            std::fs::remove_dir_all(&self.root)?;
        }
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    layers: BTreeMap<String, FeatureCollection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a layer
    pub fn insert(&mut self, layer: &str, features: FeatureCollection) {
        self.layers.insert(layer.to_string(), features);
    }

    pub fn get(&self, layer: &str) -> Option<&FeatureCollection> {
        self.layers.get(layer)
    }
}

impl FeatureStore for MemoryStore {
    fn list_layers(&self, suffix: &str) -> Result<Vec<String>> {
        Ok(self
            .layers
            .keys()
            .filter(|name| name.ends_with(suffix))
            .cloned()
            .collect())
    }

    fn exists(&self, layer: &str) -> bool {
        self.layers.contains_key(layer)
    }

    fn read_layer(&self, layer: &str) -> Result<FeatureCollection> {
        self.layers
            .get(layer)
            .cloned()
            .ok_or_else(|| Error::LayerNotFound(layer.to_string()))
    }

    fn write_layer(&mut self, layer: &str, features: &FeatureCollection) -> Result<()> {
        self.layers.insert(layer.to_string(), features.clone());
        Ok(())
    }

    fn delete_layer(&mut self, layer: &str) -> Result<()> {
        self.layers.remove(layer);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.layers.clear();
        Ok(())
    }
}
