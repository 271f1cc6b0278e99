//! Nearest-venue query

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use super::GeometryFactory;
use crate::entities::Venue;
use crate::orm::{EntityQuery, Validate, ValidationErrors};

pub const DEFAULT_DISTANCE_KMS: f64 = 10.0;
pub const MAX_DISTANCE_KMS: f64 = 50.0;

/// Caller position and search radius.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub distance_in_kms: Option<f64>,
}

impl NearbyQuery {
    pub fn new(latitude: f64, longitude: f64, distance_in_kms: Option<f64>) -> Self {
        Self {
            latitude,
            longitude,
            distance_in_kms,
        }
    }

    /// Requested radius, defaulted and capped at the maximum
    pub fn radius_kms(&self) -> f64 {
        self.distance_in_kms
            .unwrap_or(DEFAULT_DISTANCE_KMS)
            .min(MAX_DISTANCE_KMS)
    }

    pub fn radius_meters(&self) -> f64 {
        self.radius_kms() * 1000.0
    }
}

impl Validate for NearbyQuery {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_range("latitude", self.latitude, -90.0, 90.0);
        errors.check_range("longitude", self.longitude, -180.0, 180.0);
        if let Some(d) = self.distance_in_kms
            && !(d >= 0.0)
        {
            errors.add("distanceInKms", "The field distanceInKms must not be negative");
        }
        errors.into_result()
    }
}

/// One venue inside the search radius.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyVenue {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Whole meters. Halves round away from zero (`f64::round`), not to
    /// even; distances of exactly `n.5` m do not occur in practice.
    pub distance_in_meters: f64,
}

/// Venues within the radius of the caller, nearest first.
///
/// Ties keep primary-key order.
pub async fn nearby_venues(
    pool: &SqlitePool,
    geometry: &GeometryFactory,
    query: &NearbyQuery,
) -> Result<Vec<NearbyVenue>, sqlx::Error> {
    let venues = EntityQuery::<Venue>::new().default_order().fetch_all(pool).await?;
    Ok(rank_by_distance(venues, geometry, query))
}

pub fn rank_by_distance(
    venues: impl IntoIterator<Item = Venue>,
    geometry: &GeometryFactory,
    query: &NearbyQuery,
) -> Vec<NearbyVenue> {
    let origin = geometry.create_point(query.longitude, query.latitude);
    let radius = query.radius_meters();

    let mut within: Vec<(f64, Venue)> = venues
        .into_iter()
        .filter_map(|venue| {
            let location = venue.point(geometry);
            location
                .is_within_distance(&origin, radius)
                .then(|| (location.distance(&origin), venue))
        })
        .collect();

    // sort_by is stable
    within.sort_by(|(a, _), (b, _)| a.total_cmp(b));

    debug!(
        latitude = query.latitude,
        longitude = query.longitude,
        radius_meters = radius,
        found = within.len(),
        "Ranked venues by distance"
    );

    within
        .into_iter()
        .map(|(distance, venue)| NearbyVenue {
            id: venue.id,
            name: venue.name,
            latitude: venue.latitude,
            longitude: venue.longitude,
            distance_in_meters: distance.round(),
        })
        .collect()
}
