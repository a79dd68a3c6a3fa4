//! Quintiles: customer segmentation and campaign filtering core.
//!
//! Loads the scored customer table, derives repurchase and value
//! segments, and filters accounts by campaign strategy presets.

pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod insights;
pub mod rfm;
pub mod segments;
pub mod selection;
pub mod store;
pub mod strategy;
pub mod synth;
pub mod types;
