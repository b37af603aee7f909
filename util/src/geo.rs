//! Geodesy helpers for the attendance geofence.
//!
//! Distances are great-circle (haversine) in meters. Coordinates are plain
//! degrees; out-of-range values are not rejected and simply produce a numeric
//! result.

use serde::{Deserialize, Serialize};

/// A WGS84-style coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// The fixed venue all submissions are measured against.
pub const VENUE_LOCATION: Coordinate = Coordinate {
    latitude: 28.49985140095136,
    longitude: 77.51992844777615,
};

/// Radius of the geofence around the venue, in meters.
pub const ALLOWED_RADIUS_M: f64 = 100.0;

/// Mean Earth radius in meters, as used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in meters.
pub fn distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Outcome of a geofence check against the venue.
#[derive(Debug, Clone, Serialize)]
pub struct LocationCheck {
    pub is_valid: bool,
    /// Distance from the venue, rounded to the nearest meter.
    pub distance_m: i64,
    pub message: String,
}

/// Checks an observed coordinate against the fixed venue and allowed radius.
pub fn validate_location(observed: Coordinate) -> LocationCheck {
    validate_against(observed, VENUE_LOCATION, ALLOWED_RADIUS_M)
}

/// Radius-parameterized geofence check. Acceptance compares the unrounded
/// distance; the rounded value only feeds the message and the result payload.
pub fn validate_against(observed: Coordinate, venue: Coordinate, radius_m: f64) -> LocationCheck {
    let distance = distance_m(observed, venue);
    let rounded = distance.round() as i64;
    let is_valid = distance <= radius_m;

    let message = if is_valid {
        format!("Location verified ({rounded}m from venue)")
    } else {
        format!("You are {rounded}m from the venue. Please move closer to mark attendance.")
    };

    LocationCheck {
        is_valid,
        distance_m: rounded,
        message,
    }
}
