//! Filter-and-summary engine for cardiac patient records.
//!
//! The dashboard binary (`heart-dash`) is a thin egui shell over this
//! library: it loads a [`data::model::Dataset`] once, builds
//! [`data::filter::FilterCriteria`] from the sidebar widgets and renders
//! whatever the engine returns.

pub mod config;
pub mod data;
pub mod error;
