//! Data models for the location dashboard.
//!
//! This module contains the input records, the merged view built from
//! them, and the derived structures handed to the report generator.

use crate::config::{ChartConfig, MapConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Serialized in place of an undefined average rating.
pub const UNDEFINED_RATING: &str = "N/A";

/// A geographic location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Unique identifier, shared with [`MetadataRecord::id`].
    pub id: String,
    /// Latitude in degrees. `None` means the location is not mappable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude in degrees. `None` means the location is not mappable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl LocationRecord {
    /// Creates a location with both coordinates.
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Creates a location without coordinates.
    pub fn unplaced(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            latitude: None,
            longitude: None,
        }
    }
}

/// Business metadata attached to a location by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Identifier of the location this record describes.
    pub id: String,
    /// Category label ("hotel", "restaurant", "cafe", ...).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Average customer rating, roughly 0-5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Number of reviews.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u64>,
}

impl MetadataRecord {
    /// Creates a fully populated metadata record.
    pub fn new(id: impl Into<String>, category: impl Into<String>, rating: f64, reviews: u64) -> Self {
        Self {
            id: id.into(),
            category: Some(category.into()),
            rating: Some(rating),
            reviews: Some(reviews),
        }
    }
}

/// A location combined with its metadata counterpart, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u64>,
}

impl MergedRecord {
    /// Starts a merged record from the location fields alone.
    pub fn from_location(location: &LocationRecord) -> Self {
        Self {
            id: location.id.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            category: None,
            rating: None,
            reviews: None,
        }
    }

    /// Overlays metadata fields. Metadata wins on collision.
    pub fn with_metadata(mut self, meta: &MetadataRecord) -> Self {
        self.id = meta.id.clone();
        self.category = meta.category.clone();
        self.rating = meta.rating;
        self.reviews = meta.reviews;
        self
    }

    /// The category label, ignoring empty strings.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    /// Position as `(latitude, longitude)` when both coordinates are
    /// present and non-zero.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if is_truthy(lat) && is_truthy(lon) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Zero and NaN count as missing, matching how the dashboard treats
/// coordinates and popup values.
fn is_truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

/// Icon resolved for a map marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerIcon {
    Hotel,
    Restaurant,
    Cafe,
    /// Anything else, including a missing category.
    Default,
}

impl From<Option<&str>> for MarkerIcon {
    fn from(category: Option<&str>) -> Self {
        match category {
            Some("hotel") => MarkerIcon::Hotel,
            Some("restaurant") => MarkerIcon::Restaurant,
            Some("cafe") => MarkerIcon::Cafe,
            _ => MarkerIcon::Default,
        }
    }
}

impl fmt::Display for MarkerIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerIcon::Hotel => write!(f, "hotel"),
            MarkerIcon::Restaurant => write!(f, "restaurant"),
            MarkerIcon::Cafe => write!(f, "cafe"),
            MarkerIcon::Default => write!(f, "default"),
        }
    }
}

impl MarkerIcon {
    /// Returns a single-character glyph for terminal output.
    pub fn glyph(&self) -> &'static str {
        match self {
            MarkerIcon::Hotel => "H",
            MarkerIcon::Restaurant => "R",
            MarkerIcon::Cafe => "C",
            MarkerIcon::Default => "x",
        }
    }
}

/// Number of merged records carrying a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub category: String,
    pub count: usize,
}

/// Mean rating of a category, rounded to one decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageRating {
    #[serde(rename = "type")]
    pub category: String,
    /// `None` when at least one record of the category has no rating.
    ///
    /// Serialized as one-decimal text, e.g. `"4.0"`, or [`UNDEFINED_RATING`].
    #[serde(
        serialize_with = "serialize_rating_text",
        deserialize_with = "deserialize_rating_text"
    )]
    pub rating: Option<f64>,
}

fn serialize_rating_text<S>(rating: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match rating {
        Some(rating) => serializer.serialize_str(&format!("{:.1}", rating)),
        None => serializer.serialize_str(UNDEFINED_RATING),
    }
}

fn deserialize_rating_text<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    Ok(text.parse::<f64>().ok())
}

impl AverageRating {
    /// Formats the rating to one decimal place, or `fallback` when undefined.
    pub fn display(&self, fallback: &str) -> String {
        match self.rating {
            Some(rating) => format!("{:.1}", rating),
            None => fallback.to_string(),
        }
    }
}

/// A single bar of the ratings chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    #[serde(rename = "type")]
    pub category: String,
    pub rating: f64,
}

/// A marker on the location map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub icon: MarkerIcon,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u64>,
}

impl MapMarker {
    /// Popup heading: the category, or `unknown` when missing.
    pub fn popup_title<'a>(&'a self, unknown: &'a str) -> &'a str {
        self.category.as_deref().filter(|c| !c.is_empty()).unwrap_or(unknown)
    }

    /// Popup rating line value. Zero ratings show the fallback too.
    pub fn popup_rating(&self, fallback: &str) -> String {
        match self.rating {
            Some(rating) if is_truthy(rating) => rating.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Popup reviews line value. Zero reviews show the fallback too.
    pub fn popup_reviews(&self, fallback: &str) -> String {
        match self.reviews {
            Some(reviews) if reviews > 0 => reviews.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Everything the pipeline derives from the two datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    /// One entry per location, in location order.
    pub merged: Vec<MergedRecord>,
    pub type_counts: Vec<TypeCount>,
    pub avg_ratings: Vec<AverageRating>,
    /// `None` when no record has a positive review count.
    pub most_reviewed: Option<MergedRecord>,
    pub chart_data: Vec<ChartPoint>,
    pub markers: Vec<MapMarker>,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Dashboard title.
    pub title: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of location records.
    pub locations: usize,
    /// Number of metadata records.
    pub metadata_records: usize,
    /// Metadata records with no matching location.
    pub unmatched_metadata: usize,
}

/// The complete dashboard report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub data: DashboardData,
    /// Map view settings for the front end.
    pub map: MapConfig,
    /// Chart view settings for the front end.
    pub chart: ChartConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_icon_lookup() {
        assert_eq!(MarkerIcon::from(Some("hotel")), MarkerIcon::Hotel);
        assert_eq!(MarkerIcon::from(Some("restaurant")), MarkerIcon::Restaurant);
        assert_eq!(MarkerIcon::from(Some("cafe")), MarkerIcon::Cafe);
        assert_eq!(MarkerIcon::from(Some("Hotel")), MarkerIcon::Default);
        assert_eq!(MarkerIcon::from(Some("bar")), MarkerIcon::Default);
        assert_eq!(MarkerIcon::from(None), MarkerIcon::Default);
    }

    #[test]
    fn test_merged_record_overlay() {
        let loc = LocationRecord::new("a", 1.0, 2.0);
        let meta = MetadataRecord::new("a", "cafe", 4.0, 10);

        let merged = MergedRecord::from_location(&loc).with_metadata(&meta);
        assert_eq!(merged.id, "a");
        assert_eq!(merged.latitude, Some(1.0));
        assert_eq!(merged.longitude, Some(2.0));
        assert_eq!(merged.category(), Some("cafe"));
        assert_eq!(merged.rating, Some(4.0));
        assert_eq!(merged.reviews, Some(10));
    }

    #[test]
    fn test_position_requires_truthy_coordinates() {
        let placed = MergedRecord::from_location(&LocationRecord::new("a", 1.0, 2.0));
        assert_eq!(placed.position(), Some((1.0, 2.0)));

        let unplaced = MergedRecord::from_location(&LocationRecord::unplaced("b"));
        assert_eq!(unplaced.position(), None);

        let on_equator = MergedRecord::from_location(&LocationRecord::new("c", 0.0, 2.0));
        assert_eq!(on_equator.position(), None);
    }

    #[test]
    fn test_empty_category_is_absent() {
        let mut merged = MergedRecord::from_location(&LocationRecord::unplaced("a"));
        merged.category = Some(String::new());
        assert_eq!(merged.category(), None);
    }

    #[test]
    fn test_popup_fallbacks() {
        let marker = MapMarker {
            id: "a".to_string(),
            latitude: 1.0,
            longitude: 1.0,
            icon: MarkerIcon::Default,
            category: None,
            rating: Some(0.0),
            reviews: None,
        };
        assert_eq!(marker.popup_title("Unknown"), "Unknown");
        assert_eq!(marker.popup_rating("N/A"), "N/A");
        assert_eq!(marker.popup_reviews("N/A"), "N/A");

        let rated = MapMarker {
            category: Some("cafe".to_string()),
            rating: Some(4.5),
            reviews: Some(12),
            ..marker
        };
        assert_eq!(rated.popup_title("Unknown"), "cafe");
        assert_eq!(rated.popup_rating("N/A"), "4.5");
        assert_eq!(rated.popup_reviews("N/A"), "12");
    }

    #[test]
    fn test_average_rating_display() {
        let avg = AverageRating {
            category: "hotel".to_string(),
            rating: Some(4.0),
        };
        assert_eq!(avg.display("N/A"), "4.0");

        let undefined = AverageRating {
            category: "hotel".to_string(),
            rating: None,
        };
        assert_eq!(undefined.display("N/A"), "N/A");
    }

    #[test]
    fn test_average_rating_serializes_as_text() {
        let avg = AverageRating {
            category: "cafe".to_string(),
            rating: Some(4.0),
        };
        let json = serde_json::to_value(&avg).unwrap();
        assert_eq!(json["type"], "cafe");
        assert_eq!(json["rating"], "4.0");

        let undefined = AverageRating {
            category: "hotel".to_string(),
            rating: None,
        };
        let json = serde_json::to_value(&undefined).unwrap();
        assert_eq!(json["rating"], UNDEFINED_RATING);

        let back: AverageRating = serde_json::from_value(json).unwrap();
        assert_eq!(back, undefined);
    }

    #[test]
    fn test_metadata_serializes_type_key() {
        let meta = MetadataRecord::new("a", "cafe", 4.0, 10);
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("\"type\":\"cafe\""));
    }
}
