//! Plain-text dashboard for the terminal.

use crate::config::DisplayConfig;
use crate::models::{MergedRecord, Report};

/// Upper bound of the rating axis.
pub const RATING_SCALE: f64 = 5.0;

/// Number of bar cells for `rating` on a `width`-cell axis spanning
/// `0..=RATING_SCALE`. Ratings above the scale are clamped.
pub fn bar_length(rating: f64, width: usize) -> usize {
    if !rating.is_finite() || rating <= 0.0 {
        return 0;
    }
    let fraction = rating.min(RATING_SCALE) / RATING_SCALE;
    (fraction * width as f64).round() as usize
}

/// Render the dashboard as terminal panels.
pub fn generate_text_report(report: &Report, display: &DisplayConfig) -> String {
    let mut out = String::new();
    let fallback = display.fallback.as_str();

    out.push_str(&report.metadata.title);
    out.push('\n');
    out.push_str(&"=".repeat(report.metadata.title.chars().count()));
    out.push_str("\n\n");

    out.push_str("Valid Points Per Type\n");
    for tc in &report.data.type_counts {
        out.push_str(&format!("  {}: {}\n", tc.category, tc.count));
    }
    out.push('\n');

    out.push_str("Average Rating Per Type\n");
    for avg in &report.data.avg_ratings {
        out.push_str(&format!("  {}: {}\n", avg.category, avg.display(fallback)));
    }
    out.push('\n');

    let best = report.data.most_reviewed.as_ref();
    out.push_str("Most Reviewed Location\n");
    out.push_str(&format!(
        "  ID: {}\n",
        best.map(|r| r.id.as_str()).unwrap_or(fallback)
    ));
    out.push_str(&format!(
        "  Type: {}\n",
        best.and_then(MergedRecord::category).unwrap_or(fallback)
    ));
    out.push_str(&format!(
        "  Reviews: {}\n\n",
        best.and_then(|r| r.reviews)
            .map(|n| n.to_string())
            .unwrap_or_else(|| fallback.to_string())
    ));

    out.push_str(&generate_bar_chart(report, display.bar_width));

    out.push_str(&format!("Location Map ({} markers)\n", report.data.markers.len()));
    for marker in &report.data.markers {
        out.push_str(&format!(
            "  [{}] {:<8} {:>9.4}, {:>9.4}  {}  Rating: {}  Reviews: {}\n",
            marker.icon.glyph(),
            marker.id,
            marker.latitude,
            marker.longitude,
            marker.popup_title(&display.unknown_label),
            marker.popup_rating(fallback),
            marker.popup_reviews(fallback),
        ));
    }

    out
}

/// Horizontal bar chart of the chart series.
fn generate_bar_chart(report: &Report, width: usize) -> String {
    let mut chart = String::from("Ratings Chart\n");

    let label_width = report
        .data
        .chart_data
        .iter()
        .map(|p| p.category.chars().count())
        .max()
        .unwrap_or(0);

    for point in &report.data.chart_data {
        chart.push_str(&format!(
            "  {:<label_width$} | {} {:.1}\n",
            point.category,
            "#".repeat(bar_length(point.rating, width)),
            point.rating,
            label_width = label_width,
        ));
    }
    chart.push('\n');

    chart
}
