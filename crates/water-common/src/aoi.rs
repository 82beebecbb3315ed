//! Square area-of-interest construction.
//!
//! Kilometers are converted to degrees with a flat-earth approximation:
//! 111.32 km per degree of latitude, longitude scaled by `cos(latitude)`.
//! The cosine is floored at `1e-6` so the conversion stays finite at the poles;
//! the approximation error at extreme latitudes is accepted.

use serde::{Deserialize, Serialize};

use crate::KM_PER_DEGREE;

/// Floor applied to `cos(latitude)` in the longitude conversion.
const COS_LAT_FLOOR: f64 = 1e-6;

/// Convert a north-south distance in kilometers to degrees of latitude.
pub fn km_to_deg_lat(km: f64) -> f64 {
    km / KM_PER_DEGREE
}

/// Convert an east-west distance in kilometers to degrees of longitude at the given latitude.
pub fn km_to_deg_lon(km: f64, at_lat_deg: f64) -> f64 {
    km / (KM_PER_DEGREE * at_lat_deg.to_radians().cos().max(COS_LAT_FLOOR))
}

/// Axis-aligned rectangle in longitude/latitude space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Build a `side_km` x `side_km` square centered on the given point.
    ///
    /// `side_km` is not validated here; callers enforce the minimum side.
    pub fn square(center_lat: f64, center_lon: f64, side_km: f64) -> Self {
        let half_km = side_km / 2.0;
        let dlat = km_to_deg_lat(half_km);
        let dlon = km_to_deg_lon(half_km, center_lat);

        Self {
            min_lon: center_lon - dlon,
            min_lat: center_lat - dlat,
            max_lon: center_lon + dlon,
            max_lat: center_lat + dlat,
        }
    }

    /// Center as `(lon, lat)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// Get the width in degrees.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Get the height in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// East-west extent in kilometers, measured at the center latitude.
    pub fn width_km(&self) -> f64 {
        let (_, lat) = self.center();
        self.width() * KM_PER_DEGREE * lat.to_radians().cos().max(COS_LAT_FLOOR)
    }

    /// North-south extent in kilometers.
    pub fn height_km(&self) -> f64 {
        self.height() * KM_PER_DEGREE
    }

    /// Check if a point is contained within this bounding box.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// `[min_lon, min_lat, max_lon, max_lat]`, the order used by GeoJSON and the remote API.
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }

    /// Corner pair in Leaflet order: `[[south, west], [north, east]]`.
    pub fn leaflet_bounds(&self) -> [[f64; 2]; 2] {
        [[self.min_lat, self.min_lon], [self.max_lat, self.max_lon]]
    }

    /// GeoJSON polygon geometry with a closed, counter-clockwise ring.
    pub fn to_geojson_polygon(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "Polygon",
            "coordinates": [[
                [self.min_lon, self.min_lat],
                [self.max_lon, self.min_lat],
                [self.max_lon, self.max_lat],
                [self.min_lon, self.max_lat],
                [self.min_lon, self.min_lat],
            ]]
        })
    }
}
