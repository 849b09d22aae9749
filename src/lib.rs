//! Viewer for Jaccard estimation error measurements.
//!
//! The pipeline is `load → style → render → display`: [`data::loader`] reads
//! a table, [`style::Theme`] describes the look, [`figure::Figure::build`]
//! aggregates the table into lines, and [`app::ViewerApp`] shows the result.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod export;
pub mod figure;
pub mod rng;
pub mod state;
pub mod style;
pub mod ui;
