//! GeoJSON export of the map markers.
//!
//! Each marker becomes a `Point` feature. Coordinates follow the GeoJSON
//! `[longitude, latitude]` order.

use crate::config::{DisplayConfig, IconConfig};
use crate::models::MapMarker;
use anyhow::Result;
use serde_json::{json, Value};

/// Build a single feature for a marker.
fn marker_feature(marker: &MapMarker, icons: &IconConfig, display: &DisplayConfig) -> Value {
    json!({
        "type": "Feature",
        "id": marker.id,
        "geometry": {
            "type": "Point",
            "coordinates": [marker.longitude, marker.latitude],
        },
        "properties": {
            "id": marker.id,
            "type": marker.category,
            "icon": marker.icon,
            "icon_url": icons.asset(marker.icon),
            "popup": {
                "title": marker.popup_title(&display.unknown_label),
                "rating": marker.popup_rating(&display.fallback),
                "reviews": marker.popup_reviews(&display.fallback),
            },
        },
    })
}

/// Generate a pretty-printed GeoJSON `FeatureCollection`.
pub fn generate_geojson(
    markers: &[MapMarker],
    icons: &IconConfig,
    display: &DisplayConfig,
) -> Result<String> {
    let features: Vec<Value> = markers
        .iter()
        .map(|m| marker_feature(m, icons, display))
        .collect();

    let collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });

    serde_json::to_string_pretty(&collection).map_err(Into::into)
}
