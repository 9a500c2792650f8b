//! Dataset join and aggregation.
//!
//! Everything here is a pure function over borrowed slices. Calling any
//! of them twice on the same inputs yields the same output.

use crate::models::{
    AverageRating, ChartPoint, DashboardData, LocationRecord, MapMarker, MarkerIcon,
    MergedRecord, MetadataRecord, TypeCount,
};
use tracing::{debug, warn};

/// Join each location with the first metadata record sharing its id.
///
/// The output has exactly one entry per location, in location order.
/// Metadata without a matching location is dropped.
pub fn merge(locations: &[LocationRecord], metadata: &[MetadataRecord]) -> Vec<MergedRecord> {
    locations
        .iter()
        .map(|loc| {
            let base = MergedRecord::from_location(loc);
            match metadata.iter().find(|meta| meta.id == loc.id) {
                Some(meta) => base.with_metadata(meta),
                None => base,
            }
        })
        .collect()
}

/// Number of metadata records whose id matches no location.
pub fn unmatched_metadata(locations: &[LocationRecord], metadata: &[MetadataRecord]) -> usize {
    metadata
        .iter()
        .filter(|meta| !locations.iter().any(|loc| loc.id == meta.id))
        .count()
}

/// Count merged records per category, in order of first appearance.
///
/// Records without a category are skipped.
pub fn count_by_type(merged: &[MergedRecord]) -> Vec<TypeCount> {
    let mut counts: Vec<TypeCount> = Vec::new();

    for category in merged.iter().filter_map(MergedRecord::category) {
        match counts.iter_mut().find(|tc| tc.category == category) {
            Some(tc) => tc.count += 1,
            None => counts.push(TypeCount {
                category: category.to_string(),
                count: 1,
            }),
        }
    }

    counts
}

/// Round half away from zero to one decimal place.
///
/// The decision is taken on the exact decimal expansion of `value`, so a
/// value stored just below a tie (1.45 is 1.4499...) rounds down.
pub fn round1(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let text = format!("{:.20}", value.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let mut digits = fraction.bytes().map(|d| d - b'0');
    let tenths = digits.next().unwrap_or(0);
    let round_up = digits.next().map_or(false, |d| d >= 5);

    let whole: f64 = whole.parse().unwrap_or(0.0);
    let scaled = whole * 10.0 + f64::from(tenths) + if round_up { 1.0 } else { 0.0 };
    (scaled / 10.0).copysign(value)
}

/// Mean rating per counted category, rounded once to one decimal.
///
/// A category with any unrated record has an undefined mean (`None`).
pub fn average_rating_by_type(
    merged: &[MergedRecord],
    type_counts: &[TypeCount],
) -> Vec<AverageRating> {
    type_counts
        .iter()
        .map(|tc| {
            debug_assert!(tc.count > 0, "counted category {} has no records", tc.category);

            let total: Option<f64> = merged
                .iter()
                .filter(|rec| rec.category() == Some(tc.category.as_str()))
                .map(|rec| rec.rating)
                .sum();

            let rating = total.map(|sum| round1(sum / tc.count as f64));
            if rating.is_none() {
                warn!(
                    "Category '{}' has records without a rating; average is undefined",
                    tc.category
                );
            }

            AverageRating {
                category: tc.category.clone(),
                rating,
            }
        })
        .collect()
}

/// The record with the strictly greatest review count.
///
/// Ties keep the earliest record. Records without reviews, or with zero
/// reviews, never win, so an empty input returns `None`.
pub fn most_reviewed(merged: &[MergedRecord]) -> Option<&MergedRecord> {
    merged.iter().fold(None, |max: Option<&MergedRecord>, rec| {
        let best = max.and_then(|m| m.reviews).unwrap_or(0);
        match rec.reviews {
            Some(reviews) if reviews > best => Some(rec),
            _ => max,
        }
    })
}

/// Project average ratings into chart bars, in mapping order.
///
/// The value is read back from its one-decimal text form. Undefined
/// averages produce no bar.
pub fn to_chart_series(avg_ratings: &[AverageRating]) -> Vec<ChartPoint> {
    avg_ratings
        .iter()
        .filter_map(|avg| {
            let rating = avg.rating?;
            let rating = format!("{:.1}", rating).parse::<f64>().ok()?;
            Some(ChartPoint {
                category: avg.category.clone(),
                rating,
            })
        })
        .collect()
}

/// One marker per merged record with a usable position.
pub fn map_markers(merged: &[MergedRecord]) -> Vec<MapMarker> {
    merged
        .iter()
        .filter_map(|rec| {
            let (latitude, longitude) = rec.position()?;
            Some(MapMarker {
                id: rec.id.clone(),
                latitude,
                longitude,
                icon: MarkerIcon::from(rec.category()),
                category: rec.category.clone(),
                rating: rec.rating,
                reviews: rec.reviews,
            })
        })
        .collect()
}

/// Run the whole pipeline once.
pub fn compute_dashboard_data(
    locations: &[LocationRecord],
    metadata: &[MetadataRecord],
) -> DashboardData {
    let merged = merge(locations, metadata);
    debug!(
        "Merged {} locations with {} metadata records",
        merged.len(),
        metadata.len()
    );

    let type_counts = count_by_type(&merged);
    let avg_ratings = average_rating_by_type(&merged, &type_counts);
    let most_reviewed = most_reviewed(&merged).cloned();
    let chart_data = to_chart_series(&avg_ratings);
    let markers = map_markers(&merged);

    debug!(
        "Derived {} categories, {} chart bars, {} map markers",
        type_counts.len(),
        chart_data.len(),
        markers.len()
    );

    DashboardData {
        merged,
        type_counts,
        avg_ratings,
        most_reviewed,
        chart_data,
        markers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    fn meta(id: &str, category: &str, rating: f64, reviews: u64) -> MetadataRecord {
        MetadataRecord::new(id, category, rating, reviews)
    }

    fn cafe_scenario() -> (Vec<LocationRecord>, Vec<MetadataRecord>) {
        (
            vec![
                LocationRecord::new("a", 1.0, 1.0),
                LocationRecord::new("b", 2.0, 2.0),
            ],
            vec![meta("a", "cafe", 4.0, 10), meta("b", "cafe", 5.0, 20)],
        )
    }

    #[test]
    fn test_cafe_scenario() {
        let (locations, metadata) = cafe_scenario();
        let data = compute_dashboard_data(&locations, &metadata);

        assert_eq!(
            data.type_counts,
            vec![TypeCount {
                category: "cafe".to_string(),
                count: 2
            }]
        );
        assert_eq!(data.avg_ratings.len(), 1);
        assert_eq!(data.avg_ratings[0].display("N/A"), "4.5");
        assert_eq!(data.most_reviewed.map(|r| r.id), Some("b".to_string()));
        assert_eq!(
            data.chart_data,
            vec![ChartPoint {
                category: "cafe".to_string(),
                rating: 4.5
            }]
        );
    }

    #[test]
    fn test_merge_keeps_one_record_per_location() {
        let locations = vec![
            LocationRecord::new("a", 1.0, 1.0),
            LocationRecord::unplaced("c"),
            LocationRecord::new("b", 2.0, 2.0),
        ];
        let metadata = vec![
            meta("b", "hotel", 3.0, 5),
            meta("z", "cafe", 5.0, 999),
            meta("a", "cafe", 4.0, 10),
        ];

        let merged = merge(&locations, &metadata);
        let ids: Vec<_> = merged.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
        assert_eq!(merged[0].category(), Some("cafe"));
        assert_eq!(merged[0].reviews, Some(10));
        assert_eq!(merged[1].category, None);
        assert_eq!(merged[1].rating, None);
        assert_eq!(merged[2].category(), Some("hotel"));
        assert_eq!(unmatched_metadata(&locations, &metadata), 1);
    }

    #[test]
    fn test_mean_just_below_tie_rounds_down() {
        let locations = vec![
            LocationRecord::new("1", 1.0, 1.0),
            LocationRecord::new("2", 1.0, 1.0),
        ];
        let metadata = vec![meta("1", "cafe", 1.4, 1), meta("2", "cafe", 1.5, 1)];

        let data = compute_dashboard_data(&locations, &metadata);
        assert_eq!(data.avg_ratings[0].display("N/A"), "1.4");
        assert_eq!(data.chart_data[0].rating, 1.4);
    }

    #[test]
    fn test_merge_uses_first_matching_metadata() {
        let locations = vec![LocationRecord::new("a", 1.0, 1.0)];
        let metadata = vec![meta("a", "cafe", 4.0, 10), meta("a", "hotel", 2.0, 99)];

        let merged = merge(&locations, &metadata);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].category(), Some("cafe"));
        assert_eq!(merged[0].rating, Some(4.0));
        assert_eq!(merged[0].reviews, Some(10));
    }

    #[test]
    fn test_unmatched_location_excluded_from_counts_and_map() {
        let (mut locations, metadata) = cafe_scenario();
        locations.push(LocationRecord::unplaced("c"));

        let data = compute_dashboard_data(&locations, &metadata);
        assert_eq!(data.merged.len(), 3);
        assert_eq!(data.merged[2].category, None);
        assert_eq!(data.type_counts.iter().map(|tc| tc.count).sum::<usize>(), 2);
        assert!(data.markers.iter().all(|m| m.id != "c"));
        assert_eq!(data.markers.len(), 2);
    }

    #[test]
    fn test_count_by_type_preserves_discovery_order() {
        let locations = vec![
            LocationRecord::new("1", 1.0, 1.0),
            LocationRecord::new("2", 1.0, 1.0),
            LocationRecord::new("3", 1.0, 1.0),
            LocationRecord::new("4", 1.0, 1.0),
        ];
        let metadata = vec![
            meta("1", "restaurant", 4.0, 1),
            meta("2", "hotel", 4.0, 1),
            meta("3", "restaurant", 4.0, 1),
            meta("4", "cafe", 4.0, 1),
        ];

        let counts = count_by_type(&merge(&locations, &metadata));
        let keys: Vec<_> = counts.iter().map(|tc| (tc.category.as_str(), tc.count)).collect();
        assert_eq!(keys, vec![("restaurant", 2), ("hotel", 1), ("cafe", 1)]);
    }

    #[test]
    fn test_count_by_type_skips_empty_category() {
        let locations = vec![LocationRecord::new("1", 1.0, 1.0)];
        let metadata = vec![meta("1", "", 4.0, 1)];

        assert!(count_by_type(&merge(&locations, &metadata)).is_empty());
    }

    #[test]
    fn test_average_rounds_once_half_away_from_zero() {
        assert_eq!(round1(4.25), 4.3);
        assert_eq!(round1(-4.25), -4.3);
        assert_eq!(round1(3.04), 3.0);
        assert_eq!(round1(1.45), 1.4);
        assert_eq!(round1(0.35), 0.3);
        assert_eq!(round1(0.96), 1.0);
        assert_eq!(round1(12.3 / 3.0), 4.1);
        assert_eq!(round1(0.0), 0.0);

        let locations = vec![
            LocationRecord::new("1", 1.0, 1.0),
            LocationRecord::new("2", 1.0, 1.0),
        ];
        let metadata = vec![meta("1", "hotel", 4.0, 1), meta("2", "hotel", 4.5, 1)];
        let merged = merge(&locations, &metadata);
        let avg = average_rating_by_type(&merged, &count_by_type(&merged));
        assert_eq!(avg[0].rating, Some(4.3));
    }

    #[test]
    fn test_average_undefined_when_rating_missing() {
        let locations = vec![
            LocationRecord::new("1", 1.0, 1.0),
            LocationRecord::new("2", 1.0, 1.0),
        ];
        let mut unrated = meta("2", "hotel", 0.0, 1);
        unrated.rating = None;
        let metadata = vec![meta("1", "hotel", 4.0, 1), unrated];

        let data = compute_dashboard_data(&locations, &metadata);
        assert_eq!(data.avg_ratings.len(), 1);
        assert_eq!(data.avg_ratings[0].rating, None);
        assert_eq!(data.avg_ratings[0].display("N/A"), "N/A");
        assert!(data.chart_data.is_empty());
    }

    #[test]
    fn test_most_reviewed_tie_keeps_first() {
        let locations = vec![
            LocationRecord::new("1", 1.0, 1.0),
            LocationRecord::new("2", 1.0, 1.0),
            LocationRecord::new("3", 1.0, 1.0),
        ];
        let metadata = vec![
            meta("1", "cafe", 4.0, 50),
            meta("2", "cafe", 4.0, 80),
            meta("3", "hotel", 4.0, 80),
        ];

        let merged = merge(&locations, &metadata);
        let best = most_reviewed(&merged).unwrap();
        assert_eq!(best.id, "2");
        assert!(merged.iter().all(|r| r.reviews <= best.reviews));
    }

    #[test]
    fn test_most_reviewed_empty_and_unreviewed() {
        assert!(most_reviewed(&[]).is_none());

        let merged = merge(&[LocationRecord::unplaced("a")], &[]);
        assert!(most_reviewed(&merged).is_none());

        let merged = merge(
            &[LocationRecord::unplaced("a")],
            &[meta("a", "cafe", 4.0, 0)],
        );
        assert!(most_reviewed(&merged).is_none());
    }

    #[test]
    fn test_empty_inputs_degrade_gracefully() {
        let data = compute_dashboard_data(&[], &[]);
        assert!(data.merged.is_empty());
        assert!(data.type_counts.is_empty());
        assert!(data.avg_ratings.is_empty());
        assert!(data.most_reviewed.is_none());
        assert!(data.chart_data.is_empty());
        assert!(data.markers.is_empty());
    }

    #[test]
    fn test_map_markers_resolve_icons() {
        let locations = vec![
            LocationRecord::new("h", 1.0, 1.0),
            LocationRecord::new("r", 1.0, 1.0),
            LocationRecord::new("c", 1.0, 1.0),
            LocationRecord::new("b", 1.0, 1.0),
            LocationRecord::new("n", 1.0, 1.0),
            LocationRecord {
                id: "half".to_string(),
                latitude: Some(1.0),
                longitude: None,
            },
        ];
        let metadata = vec![
            meta("h", "hotel", 4.0, 1),
            meta("r", "restaurant", 4.0, 1),
            meta("c", "cafe", 4.0, 1),
            meta("b", "bar", 4.0, 1),
            meta("half", "hotel", 4.0, 1),
        ];

        let markers = map_markers(&merge(&locations, &metadata));
        let icons: Vec<_> = markers.iter().map(|m| (m.id.as_str(), m.icon)).collect();
        assert_eq!(
            icons,
            vec![
                ("h", MarkerIcon::Hotel),
                ("r", MarkerIcon::Restaurant),
                ("c", MarkerIcon::Cafe),
                ("b", MarkerIcon::Default),
                ("n", MarkerIcon::Default),
            ]
        );
    }

    #[test]
    fn test_builtin_dataset_figures() {
        let dataset = Dataset::builtin().unwrap();
        let data = compute_dashboard_data(dataset.locations(), dataset.metadata());

        let counts: Vec<_> = data
            .type_counts
            .iter()
            .map(|tc| (tc.category.as_str(), tc.count))
            .collect();
        assert_eq!(counts, vec![("restaurant", 3), ("hotel", 3), ("cafe", 2)]);

        let avgs: Vec<_> = data.avg_ratings.iter().map(|a| a.display("N/A")).collect();
        assert_eq!(avgs, vec!["4.1", "3.4", "4.6"]);

        let best = data.most_reviewed.as_ref().unwrap();
        assert_eq!(best.id, "loc_07");
        assert_eq!(best.reviews, Some(900));

        assert_eq!(data.chart_data.len(), 3);
        assert_eq!(data.chart_data[1].rating, 3.4);
        assert_eq!(data.markers.len(), 8);
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let dataset = Dataset::builtin().unwrap();
        let first = compute_dashboard_data(dataset.locations(), dataset.metadata());
        let second = compute_dashboard_data(dataset.locations(), dataset.metadata());
        assert_eq!(first, second);
    }
}
