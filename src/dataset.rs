//! Built-in datasets.
//!
//! The dashboard works from two fixed collections compiled into the
//! binary: locations and their business metadata.

use crate::models::{LocationRecord, MetadataRecord};
use std::collections::HashSet;
use thiserror::Error;

/// Errors returned by [`Dataset::new`].
#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    /// Two locations share an id.
    #[error("duplicate location id: {0}")]
    DuplicateLocation(String),
    /// Two metadata records share an id.
    #[error("duplicate metadata id: {0}")]
    DuplicateMetadata(String),
    /// A latitude or longitude is outside its valid range.
    #[error("location {id} has out-of-range coordinates ({latitude:?}, {longitude:?})")]
    InvalidCoordinates {
        id: String,
        latitude: Option<f64>,
        longitude: Option<f64>,
    },
    /// A rating is negative or not finite.
    #[error("metadata {id} has invalid rating {rating}")]
    InvalidRating { id: String, rating: f64 },
}

/// The two input collections, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    locations: Vec<LocationRecord>,
    metadata: Vec<MetadataRecord>,
}

impl Dataset {
    /// Validates and constructs a [`Dataset`].
    pub fn new(
        locations: Vec<LocationRecord>,
        metadata: Vec<MetadataRecord>,
    ) -> Result<Self, DatasetError> {
        validate_locations(&locations)?;
        validate_metadata(&metadata)?;

        Ok(Self {
            locations,
            metadata,
        })
    }

    /// The compiled-in sample data.
    pub fn builtin() -> Result<Self, DatasetError> {
        Self::new(builtin_locations(), builtin_metadata())
    }

    /// Location records in input order.
    pub fn locations(&self) -> &[LocationRecord] {
        &self.locations
    }

    /// Metadata records in input order.
    pub fn metadata(&self) -> &[MetadataRecord] {
        &self.metadata
    }
}

fn validate_locations(locations: &[LocationRecord]) -> Result<(), DatasetError> {
    let mut seen = HashSet::new();
    for loc in locations {
        if !seen.insert(loc.id.as_str()) {
            return Err(DatasetError::DuplicateLocation(loc.id.clone()));
        }
        let lat_ok = loc.latitude.map_or(true, |v| (-90.0..=90.0).contains(&v));
        let lon_ok = loc.longitude.map_or(true, |v| (-180.0..=180.0).contains(&v));
        if !lat_ok || !lon_ok {
            return Err(DatasetError::InvalidCoordinates {
                id: loc.id.clone(),
                latitude: loc.latitude,
                longitude: loc.longitude,
            });
        }
    }
    Ok(())
}

fn validate_metadata(metadata: &[MetadataRecord]) -> Result<(), DatasetError> {
    let mut seen = HashSet::new();
    for meta in metadata {
        if !seen.insert(meta.id.as_str()) {
            return Err(DatasetError::DuplicateMetadata(meta.id.clone()));
        }
        if let Some(rating) = meta.rating {
            if !rating.is_finite() || rating < 0.0 {
                return Err(DatasetError::InvalidRating {
                    id: meta.id.clone(),
                    rating,
                });
            }
        }
    }
    Ok(())
}

fn builtin_locations() -> Vec<LocationRecord> {
    vec![
        LocationRecord::new("loc_01", 37.7749, -122.4194),
        LocationRecord::new("loc_04", 27.8749, 122.4194),
        LocationRecord::new("loc_05", 57.2749, -112.4344),
        LocationRecord::new("loc_06", 14.0522, -119.2531),
        LocationRecord::new("loc_07", 64.0522, -108.233),
        LocationRecord::new("loc_02", 34.0522, -118.2437),
        LocationRecord::new("loc_08", 24.0522, -168.2197),
        LocationRecord::new("loc_03", 40.7128, -74.006),
    ]
}

fn builtin_metadata() -> Vec<MetadataRecord> {
    vec![
        MetadataRecord::new("loc_01", "restaurant", 4.5, 120),
        MetadataRecord::new("loc_04", "restaurant", 4.1, 500),
        MetadataRecord::new("loc_05", "restaurant", 3.7, 110),
        MetadataRecord::new("loc_02", "hotel", 4.2, 200),
        MetadataRecord::new("loc_06", "hotel", 4.0, 700),
        MetadataRecord::new("loc_07", "hotel", 2.0, 900),
        MetadataRecord::new("loc_03", "cafe", 4.7, 150),
        MetadataRecord::new("loc_08", "cafe", 4.5, 750),
    ]
}
