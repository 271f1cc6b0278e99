//! Geographic primitives
//!
//! Points live in a spatial reference system identified by an SRID. The only
//! system modelled is WGS 84 (SRID 4326), where distance is the great-circle
//! distance on a sphere of the mean Earth radius, in meters.

pub mod proximity;

pub use proximity::{NearbyQuery, NearbyVenue, nearby_venues};

/// WGS 84 longitude/latitude
pub const WGS84_SRID: i32 = 4326;

/// IUGG mean Earth radius
pub const MEAN_EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Creates points in one spatial reference system.
///
/// Constructed once at start-up and shared through application state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryFactory {
    srid: i32,
}

impl Default for GeometryFactory {
    fn default() -> Self {
        Self::new(WGS84_SRID)
    }
}

impl GeometryFactory {
    pub fn new(srid: i32) -> Self {
        Self { srid }
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }

    /// `x` is longitude, `y` is latitude.
    pub fn create_point(&self, longitude: f64, latitude: f64) -> Point {
        Point {
            x: longitude,
            y: latitude,
            srid: self.srid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
    srid: i32,
}

impl Point {
    pub fn longitude(&self) -> f64 {
        self.x
    }

    pub fn latitude(&self) -> f64 {
        self.y
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }

    /// Haversine distance to `other` in meters.
    pub fn distance(&self, other: &Point) -> f64 {
        let (lat1, lat2) = (self.y.to_radians(), other.y.to_radians());
        let d_lat = (other.y - self.y).to_radians();
        let d_lon = (other.x - self.x).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();
        MEAN_EARTH_RADIUS_METERS * c
    }

    pub fn is_within_distance(&self, other: &Point, meters: f64) -> bool {
        self.distance(other) <= meters
    }
}
