use serde_json::Value as JsonValue;
use tracing::debug;

use crate::models::{
    outcome::EligibleRecipient,
    profile::{GeoPoint, Profile},
};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Rough meters per degree of latitude, used only for the coarse
/// latitude-band reject before the exact haversine.
const METERS_PER_DEGREE: f64 = 111_195.0;

/// Great-circle distance in meters between two coordinate pairs
/// (haversine formula).
///
/// Total over any finite inputs; out-of-range coordinates still produce a
/// mathematically defined result. Range validation belongs to the caller.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c * 1000.0
}

/// Parse a stored coordinate pair into finite floats. The store holds these
/// as strings in some rows and numbers in others.
pub fn parse_point(point: &GeoPoint) -> Option<(f64, f64)> {
    Some((parse_coord(&point.lat)?, parse_coord(&point.lon)?))
}

fn parse_coord(value: &JsonValue) -> Option<f64> {
    let parsed = match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn parse_range(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Cheap latitude-band reject. Meridian separation never exceeds the
/// great-circle distance, so anything rejected here is certainly out of
/// range; the haversine makes the final call for everything else.
fn outside_latitude_band(origin_lat: f64, lat: f64, range_meters: f64) -> bool {
    // 1 m pad absorbs the rounding in METERS_PER_DEGREE.
    (lat - origin_lat).abs() * METERS_PER_DEGREE > range_meters + 1.0
}

/// Narrow broadcast candidates to the recipients whose declared radius
/// covers the message origin.
///
/// A candidate needs a push token, a last-known location and a declared
/// range, and every coordinate must parse to a finite number; anything
/// malformed or absent excludes the candidate silently. The boundary is
/// inclusive: `distance == range` is in.
pub fn filter_in_range(
    origin_lat: f64,
    origin_lon: f64,
    candidates: Vec<Profile>,
) -> Vec<EligibleRecipient> {
    candidates
        .into_iter()
        .filter_map(|profile| {
            if !profile.has_push_token() {
                return None;
            }

            let (lat, lon) = parse_point(profile.last_loc.as_ref()?)?;
            let range = parse_range(profile.range.as_deref()?)?;

            if outside_latitude_band(origin_lat, lat, range) {
                return None;
            }

            let distance = distance_meters(origin_lat, origin_lon, lat, lon);
            debug!(
                user = %profile.display_name(),
                distance_meters = distance,
                range_meters = range,
                "Computed candidate distance"
            );

            (distance <= range).then(|| EligibleRecipient {
                profile,
                distance_meters: Some(distance),
            })
        })
        .collect()
}
