//! Stitching pipeline driver
//!
//! Runs the whole batch: reset the connectors layer, process every state that
//! has a dangle layer (load, match against each bordering state, resolve,
//! emit, commit), then tag connectors, compute lengths and merge the network.
//! States are processed one after the other; the pair ledger is shared by all
//! of them.

use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::borders::{BorderTable, StateCode, UsStateBorders};
use crate::core::config::{StitchConfig, ToleranceTable};
use crate::core::edit::EditSession;
use crate::core::emitter::{emit, Connector, Emission, PairLedger, CONNECTORS_LAYER};
use crate::core::endpoint::{dangle_layer_name, load_endpoints, DANGLE_LAYER_SUFFIX};
use crate::core::error::Result;
use crate::core::layer::FeatureCollection;
use crate::core::matcher::{focus_entries, match_neighbor};
use crate::core::postprocess::{
    calculate_length_miles, merge_layers, network_layers, tag_connectors,
};
use crate::core::resolver::resolve;
use crate::core::store::{FeatureStore, GeoJsonStore};

/// Progress callback: (states done, states total, state just finished)
pub type ProgressCallback = Arc<dyn Fn(usize, usize, &StateCode) + Send + Sync>;

/// Options for a stitching run that do not belong in the config file
#[derive(Clone, Default)]
pub struct StitchOptions {
    pub progress: Option<ProgressCallback>,
}

/// Outcome of processing one focus state
#[derive(Debug, Clone, PartialEq)]
pub struct StateReport {
    pub state: StateCode,
    pub endpoints: usize,
    pub duplicates: usize,
    pub neighbors_scanned: usize,
    pub candidates: usize,
    pub matched: usize,
    pub written: usize,
    pub suppressed: usize,
}

/// Outcome of a full run
#[derive(Debug, Clone, PartialEq)]
pub struct StitchReport {
    pub states: Vec<StateReport>,
    pub connectors_written: usize,
    pub merged_features: Option<usize>,
    pub elapsed: Duration,
}

/// Delete any previous connectors layer and start an empty one
pub fn reset_connectors<S: FeatureStore + ?Sized>(store: &mut S) -> Result<()> {
    info!("creating connectors layer");
    if store.exists(CONNECTORS_LAYER) {
        store.delete_layer(CONNECTORS_LAYER)?;
    }
    store.write_layer(CONNECTORS_LAYER, &FeatureCollection::empty())
}

/// Focus states, one per dangle layer, in layer-name order
pub fn focus_states<S: FeatureStore + ?Sized>(store: &S) -> Result<Vec<StateCode>> {
    let mut states = Vec::new();
    for layer in store.list_layers(DANGLE_LAYER_SUFFIX)? {
        match StateCode::from_layer_name(&layer) {
            Ok(state) if dangle_layer_name(&state) == layer => states.push(state),
            _ => warn!("ignoring layer {layer}: name does not start with an upper-case state code"),
        }
    }
    Ok(states)
}

/// Match, resolve and emit connectors for one focus state
pub fn stitch_state<S: FeatureStore + ?Sized>(
    store: &mut S,
    borders: &dyn BorderTable,
    tolerances: &ToleranceTable,
    ledger: &mut PairLedger,
    focus: &StateCode,
) -> Result<StateReport> {
    info!("processing connections for {focus}");

    let focus_set = load_endpoints(&*store, focus)?;
    let mut entries = focus_entries(&focus_set);
    let mut neighbors_scanned = 0;
    let mut candidates = 0;

    for neighbor in borders.bordering_states(focus) {
        if !store.exists(&dangle_layer_name(&neighbor)) {
            debug!("no dangle layer for {neighbor}, skipping");
            continue;
        }
        info!("connecting from {focus} to {neighbor}");
        let neighbor_set = load_endpoints(&*store, &neighbor)?;
        let tolerance_ft = tolerances.for_pair(focus, &neighbor);
        let added = match_neighbor(&mut entries, &neighbor_set, tolerance_ft);
        debug!("{focus}-{neighbor}: {added} candidates within {tolerance_ft} ft");
        neighbors_scanned += 1;
        candidates += added;
    }

    info!("writing out border matches for {focus}");
    let mut session = EditSession::open(store, CONNECTORS_LAYER)?;
    let mut matched = 0;
    let mut suppressed = 0;

    for entry in &entries {
        let Some(best) = resolve(&entry.endpoint.signature, &entry.candidates) else {
            continue;
        };
        matched += 1;
        let connector = Connector {
            from: entry.endpoint.coord,
            to: best.coord,
            from_state: focus.clone(),
            to_state: best.state.clone(),
        };
        if emit(ledger, &mut session, &connector) == Emission::Suppressed {
            suppressed += 1;
        }
    }

    let written = session.commit()?;
    info!("{focus}: {matched} matched dangles, {written} connectors written, {suppressed} already connected");

    Ok(StateReport {
        state: focus.clone(),
        endpoints: focus_set.len(),
        duplicates: focus_set.duplicates(),
        neighbors_scanned,
        candidates,
        matched,
        written,
        suppressed,
    })
}

/// Process every focus state of `store`, sharing one ledger
pub fn stitch_all<S: FeatureStore + ?Sized>(
    store: &mut S,
    borders: &dyn BorderTable,
    tolerances: &ToleranceTable,
    options: &StitchOptions,
) -> Result<Vec<StateReport>> {
    reset_connectors(store)?;

    let states = focus_states(&*store)?;
    let total = states.len();
    let mut ledger = PairLedger::new();
    let mut reports = Vec::with_capacity(total);

    for (i, focus) in states.iter().enumerate() {
        reports.push(stitch_state(store, borders, tolerances, &mut ledger, focus)?);
        if let Some(progress) = &options.progress {
            progress(i + 1, total, focus);
        }
    }
    Ok(reports)
}

/// Tag connectors, compute lengths and merge the network into `merged`,
/// which is emptied first
pub fn post_process<S, T>(store: &mut S, merged: &mut T, config: &StitchConfig) -> Result<usize>
where
    S: FeatureStore + ?Sized,
    T: FeatureStore + ?Sized,
{
    tag_connectors(store, config.connector_func_class)?;

    let layers = network_layers(&*store)?;
    for layer in &layers {
        calculate_length_miles(store, layer)?;
    }

    info!("merging all states");
    merged.clear()?;
    merge_layers(&*store, &layers, merged, &config.drop_field_prefixes)
}

/// Run against explicit stores and border table
pub fn run_with<S, T>(
    store: &mut S,
    merged: Option<&mut T>,
    borders: &dyn BorderTable,
    config: &StitchConfig,
    options: &StitchOptions,
) -> Result<StitchReport>
where
    S: FeatureStore + ?Sized,
    T: FeatureStore + ?Sized,
{
    let start = Instant::now();
    config.validate()?;

    let states = stitch_all(store, borders, &config.tolerances(), options)?;
    let connectors_written = states.iter().map(|s| s.written).sum();

    let merged_features = match merged {
        Some(target) if !config.skip_merge => Some(post_process(store, target, config)?),
        _ => None,
    };

    let elapsed = start.elapsed();
    info!("run time (H:M:S): {}", format_run_time(elapsed));

    Ok(StitchReport {
        states,
        connectors_written,
        merged_features,
        elapsed,
    })
}

/// Run on the GeoJSON datasets under the configured output directory
pub fn run(config: &StitchConfig, options: &StitchOptions) -> Result<StitchReport> {
    let mut store = GeoJsonStore::open(config.states_dataset()?)?;
    if config.skip_merge {
        return run_with::<_, GeoJsonStore>(&mut store, None, &UsStateBorders, config, options);
    }
    // replaced only once stitching has succeeded
    let mut merged = GeoJsonStore::at(config.merged_dataset()?);
    run_with(&mut store, Some(&mut merged), &UsStateBorders, config, options)
}

/// Format a duration as `H:MM:SS`
pub fn format_run_time(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
