//! Markdown and JSON report generation.
//!
//! This module assembles the [`Report`] and renders it as Markdown or
//! JSON. The JSON form is the input contract of a chart/map front end.

use crate::config::{Config, DisplayConfig, IconConfig};
use crate::dataset::Dataset;
use crate::models::{
    AverageRating, DashboardData, MapMarker, MergedRecord, Report, ReportMetadata, TypeCount,
};
use anyhow::Result;
use chrono::Utc;

/// Assemble a report from the pipeline output.
pub fn build_report(dataset: &Dataset, data: DashboardData, config: &Config) -> Report {
    let metadata = ReportMetadata {
        title: config.display.title.clone(),
        generated_at: Utc::now(),
        locations: dataset.locations().len(),
        metadata_records: dataset.metadata().len(),
        unmatched_metadata: crate::analysis::unmatched_metadata(
            dataset.locations(),
            dataset.metadata(),
        ),
    };

    Report {
        metadata,
        data,
        map: config.map.clone(),
        chart: config.chart.clone(),
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, display: &DisplayConfig) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", report.metadata.title));
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_type_counts_section(&report.data.type_counts));
    output.push_str(&generate_ratings_section(&report.data.avg_ratings, display));
    output.push_str(&generate_most_reviewed_section(
        report.data.most_reviewed.as_ref(),
        display,
    ));
    output.push_str(&generate_chart_section(report));
    output.push_str(&generate_map_section(
        &report.data.markers,
        &report.map.icons,
        display,
    ));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Locations:** {}\n", metadata.locations));
    section.push_str(&format!(
        "- **Metadata Records:** {}\n",
        metadata.metadata_records
    ));
    if metadata.unmatched_metadata > 0 {
        section.push_str(&format!(
            "- **Unmatched Metadata:** {}\n",
            metadata.unmatched_metadata
        ));
    }
    section.push('\n');

    section
}

/// Generate the per-type count panel.
fn generate_type_counts_section(counts: &[TypeCount]) -> String {
    let mut section = String::new();

    section.push_str("## Valid Points Per Type\n\n");
    if counts.is_empty() {
        section.push_str("No categorized locations.\n\n");
        return section;
    }

    section.push_str("| Type | Count |\n");
    section.push_str("|:---|:---:|\n");
    for tc in counts {
        section.push_str(&format!("| {} | {} |\n", tc.category, tc.count));
    }
    section.push('\n');

    section
}

/// Generate the average rating panel.
fn generate_ratings_section(ratings: &[AverageRating], display: &DisplayConfig) -> String {
    let mut section = String::new();

    section.push_str("## Average Rating Per Type\n\n");
    if ratings.is_empty() {
        section.push_str("No ratings available.\n\n");
        return section;
    }

    section.push_str("| Type | Rating |\n");
    section.push_str("|:---|:---:|\n");
    for avg in ratings {
        section.push_str(&format!(
            "| {} | {} |\n",
            avg.category,
            avg.display(&display.fallback)
        ));
    }
    section.push('\n');

    section
}

/// Generate the most reviewed location panel.
fn generate_most_reviewed_section(record: Option<&MergedRecord>, display: &DisplayConfig) -> String {
    let mut section = String::new();
    let fallback = display.fallback.as_str();

    let id = record.map(|r| r.id.as_str()).unwrap_or(fallback);
    let category = record.and_then(MergedRecord::category).unwrap_or(fallback);
    let reviews = record
        .and_then(|r| r.reviews)
        .map(|n| n.to_string())
        .unwrap_or_else(|| fallback.to_string());

    section.push_str("## Most Reviewed Location\n\n");
    section.push_str(&format!("- **ID:** {}\n", id));
    section.push_str(&format!("- **Type:** {}\n", category));
    section.push_str(&format!("- **Reviews:** {}\n\n", reviews));

    section
}

/// Generate the ratings chart section as a table of bars.
fn generate_chart_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Ratings Chart\n\n");
    if report.data.chart_data.is_empty() {
        section.push_str("No chart data.\n\n");
        return section;
    }

    section.push_str(&format!(
        "*Fill: `{}` | Height: {}px*\n\n",
        report.chart.fill, report.chart.height
    ));
    section.push_str("| Type | Rating | |\n");
    section.push_str("|:---|:---:|:---|\n");
    for point in &report.data.chart_data {
        let bar = "█".repeat(crate::report::terminal::bar_length(point.rating, 20));
        section.push_str(&format!(
            "| {} | {:.1} | {} |\n",
            point.category, point.rating, bar
        ));
    }
    section.push('\n');

    section
}

/// Generate the map marker section.
fn generate_map_section(markers: &[MapMarker], icons: &IconConfig, display: &DisplayConfig) -> String {
    let mut section = String::new();

    section.push_str("## Location Map\n\n");
    if markers.is_empty() {
        section.push_str("No mappable locations.\n\n");
        return section;
    }

    section.push_str("| ID | Position | Icon | Type | Rating | Reviews |\n");
    section.push_str("|:---|:---|:---|:---|:---:|:---:|\n");
    for marker in markers {
        section.push_str(&format!(
            "| `{}` | {}, {} | `{}` | {} | {} | {} |\n",
            marker.id,
            marker.latitude,
            marker.longitude,
            icons.asset(marker.icon),
            marker.popup_title(&display.unknown_label),
            marker.popup_rating(&display.fallback),
            marker.popup_reviews(&display.fallback),
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by LocDash v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
