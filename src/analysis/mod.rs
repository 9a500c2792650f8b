//! Analysis modules.
//!
//! Joins the datasets and derives the dashboard views.

pub mod aggregator;

pub use aggregator::*;
