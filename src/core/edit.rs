//! Scoped edit sessions
//!
//! Connectors for one focus state are buffered in an [`EditSession`] and
//! written to the layer in a single append on [`EditSession::commit`]. A
//! session dropped without commit (error, early return) discards its buffer,
//! so the layer never holds a partial set for a state.

use log::{debug, warn};

use crate::core::error::{Error, Result};
use crate::core::layer::Feature;
use crate::core::store::FeatureStore;

pub struct EditSession<'s, S: FeatureStore + ?Sized> {
    store: &'s mut S,
    layer: String,
    pending: Vec<Feature>,
}

impl<'s, S: FeatureStore + ?Sized> EditSession<'s, S> {
    /// Start editing `layer`, which must already exist
    pub fn open(store: &'s mut S, layer: &str) -> Result<Self> {
        if !store.exists(layer) {
            return Err(Error::LayerNotFound(layer.to_string()));
        }
        Ok(Self {
            store,
            layer: layer.to_string(),
            pending: Vec::new(),
        })
    }

    pub fn insert(&mut self, feature: Feature) {
        self.pending.push(feature);
    }

    /// Number of features buffered and not yet committed
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Write every buffered feature; returns how many were written
    pub fn commit(mut self) -> Result<usize> {
        let features = std::mem::take(&mut self.pending);
        let count = features.len();
        if count > 0 {
            self.store.append_features(&self.layer, features)?;
        }
        debug!("committed {count} features to {}", self.layer);
        Ok(count)
    }
}

impl<S: FeatureStore + ?Sized> Drop for EditSession<'_, S> {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            warn!(
                "discarding {} uncommitted features for layer {}",
                self.pending.len(),
                self.layer
            );
        }
    }
}
