//! Report generation modules.
//!
//! Renders the dashboard data as terminal panels, Markdown, JSON or
//! GeoJSON map markers.

pub mod generator;
pub mod geojson;
pub mod terminal;

pub use generator::{build_report, generate_json_report, generate_markdown_report};
pub use geojson::generate_geojson;
pub use terminal::generate_text_report;
