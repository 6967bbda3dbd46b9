//! Core library modules for border-stitch
//!
//! Data model, stores and the matching pipeline. The CLI lives in `main.rs`
//! and `cli/`.

pub mod borders;
pub mod config;
pub mod coord;
pub mod edit;
pub mod emitter;
pub mod endpoint;
pub mod error;
pub mod layer;
pub mod matcher;
pub mod pipeline;
pub mod postprocess;
pub mod resolver;
pub mod store;
