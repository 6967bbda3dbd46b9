//! # Border-stitch Library
//!
//! Connects per-state road networks into one national network. Each state
//! ships a layer of "dangles" (segment endpoints left unconnected where the
//! network was clipped at the state border). Border-stitch matches every
//! dangle against the dangles of the bordering states and writes a two-point
//! connector for each matched pair, exactly once per pair.
//!
//! ## Matching rules
//!
//! - Distances are great-circle distances in feet.
//! - A neighbor dangle is a candidate when it lies within the border's
//!   tolerance (305 ft by default, widened for a few borders).
//! - With several candidates, one sharing the focus dangle's road attributes
//!   gets a 150 ft head start; otherwise the nearest wins.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use border_stitch::{run, StitchConfig, StitchOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StitchConfig {
//!         output_dir: Some("/data/national".into()),
//!         ..Default::default()
//!     };
//!     let report = run(&config, &StitchOptions::default())?;
//!     println!("{} connectors written", report.connectors_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Custom stores
//!
//! ```rust
//! use border_stitch::{run_with, CustomBorders, MemoryStore, StateCode, StitchConfig, StitchOptions};
//!
//! let mut store = MemoryStore::new();
//! let mut borders = CustomBorders::new();
//! borders.add_border(StateCode::parse("NH").unwrap(), StateCode::parse("VT").unwrap());
//!
//! let report = run_with::<_, MemoryStore>(
//!     &mut store,
//!     None,
//!     &borders,
//!     &StitchConfig::default(),
//!     &StitchOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(report.connectors_written, 0);
//! ```

pub mod core;

pub use crate::core::borders::{BorderTable, CustomBorders, StateCode, UsStateBorders};
pub use crate::core::config::{StitchConfig, ToleranceOverride, ToleranceTable};
pub use crate::core::coord::{great_circle_feet, great_circle_miles, Coord};
pub use crate::core::edit::EditSession;
pub use crate::core::emitter::{Connector, Emission, PairLedger, CONNECTORS_LAYER};
pub use crate::core::endpoint::{load_endpoints, Endpoint, EndpointSet};
pub use crate::core::error::{Error, Result};
pub use crate::core::layer::{Feature, FeatureCollection, Geometry, Position, Properties};
pub use crate::core::matcher::{match_neighbor, Candidate, FocusEntry};
pub use crate::core::pipeline::{run, run_with, StateReport, StitchOptions, StitchReport};
pub use crate::core::resolver::resolve;
pub use crate::core::store::{FeatureStore, GeoJsonStore, MemoryStore};
