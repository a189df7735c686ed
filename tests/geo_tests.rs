use notify_service::{
    geo::{distance_meters, filter_in_range},
    models::profile::{GeoPoint, Profile},
};
use serde_json::json;

/// Test: distance between a point and itself is zero
#[test]
fn test_distance_to_self_is_zero() {
    for (lat, lon) in [(0.0, 0.0), (51.5, -0.12), (-33.86, 151.2), (89.9, 179.9)] {
        assert_eq!(distance_meters(lat, lon, lat, lon), 0.0);
    }
}

/// Test: distance is symmetric in its endpoints
#[test]
fn test_distance_is_symmetric() {
    let pairs = [
        ((0.0, 0.0), (0.0, 1.0)),
        ((51.5, -0.12), (48.85, 2.35)),
        ((-33.86, 151.2), (35.68, 139.69)),
    ];

    for ((lat1, lon1), (lat2, lon2)) in pairs {
        let forward = distance_meters(lat1, lon1, lat2, lon2);
        let backward = distance_meters(lat2, lon2, lat1, lon1);
        assert!(
            (forward - backward).abs() < 1e-6,
            "distance not symmetric: {forward} vs {backward}"
        );
    }
}

/// Test: one degree of longitude on the equator is ~111,195 m
#[test]
fn test_one_degree_on_equator() {
    let distance = distance_meters(0.0, 0.0, 0.0, 1.0);
    let expected = 111_195.0;
    let tolerance = expected * 0.005;

    assert!(
        (distance - expected).abs() < tolerance,
        "expected ~{expected} m, got {distance} m"
    );
}

/// Test: a candidate whose range exactly equals the distance is included
#[test]
fn test_range_boundary_is_inclusive() {
    let distance = distance_meters(0.0, 0.0, 0.0, 0.001);

    let at_boundary = profile("u1", Some("a".repeat(24)), Some(("0", "0.001")), Some(distance.to_string()));
    let just_under = profile(
        "u2",
        Some("b".repeat(24)),
        Some(("0", "0.001")),
        Some((distance - 0.01).to_string()),
    );

    let eligible = filter_in_range(0.0, 0.0, vec![at_boundary, just_under]);

    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0].profile.user_id, "u1");
}

/// Test: candidates missing location or range are excluded regardless of
/// actual proximity
#[test]
fn test_missing_location_or_range_excludes() {
    let no_location = profile("u1", Some("a".repeat(24)), None, Some("5000".to_string()));
    let no_range = profile("u2", Some("b".repeat(24)), Some(("0", "0")), None);

    let eligible = filter_in_range(0.0, 0.0, vec![no_location, no_range]);

    assert!(eligible.is_empty());
}

/// Test: candidates without a push token are never eligible
#[test]
fn test_missing_push_token_excludes() {
    let no_token = profile("u1", None, Some(("0", "0")), Some("5000".to_string()));
    let empty_token = profile("u2", Some(String::new()), Some(("0", "0")), Some("5000".to_string()));

    let eligible = filter_in_range(0.0, 0.0, vec![no_token, empty_token]);

    assert!(eligible.is_empty());
}

/// Test: malformed coordinates exclude the candidate instead of failing
#[test]
fn test_malformed_coordinates_exclude() {
    let garbage_lat = Profile {
        user_id: "u1".to_string(),
        fcm_token: Some("c".repeat(24)),
        last_loc: Some(GeoPoint {
            lat: json!("not-a-number"),
            lon: json!("0"),
        }),
        range: Some("5000".to_string()),
        name: None,
    };
    let null_lon = Profile {
        user_id: "u2".to_string(),
        fcm_token: Some("d".repeat(24)),
        last_loc: Some(GeoPoint {
            lat: json!("0"),
            lon: json!(null),
        }),
        range: Some("5000".to_string()),
        name: None,
    };
    let garbage_range = profile("u3", Some("e".repeat(24)), Some(("0", "0")), Some("wide".to_string()));

    let eligible = filter_in_range(0.0, 0.0, vec![garbage_lat, null_lon, garbage_range]);

    assert!(eligible.is_empty());
}

/// Test: candidate ~111 m away with a 200 m range is in; ~1112 m away is out
#[test]
fn test_geofence_scenario_near_and_far() {
    let near = profile("near", Some("a".repeat(24)), Some(("0", "0.001")), Some("200".to_string()));
    let far = profile("far", Some("b".repeat(24)), Some(("0", "0.01")), Some("200".to_string()));

    let eligible = filter_in_range(0.0, 0.0, vec![near, far]);

    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0].profile.user_id, "near");

    let distance = eligible[0].distance_meters.unwrap();
    assert!(
        (distance - 111.0).abs() < 2.0,
        "expected ~111 m, got {distance} m"
    );
}

/// Test: a high-latitude candidate spanning a wide longitude gap is
/// included when the great-circle distance is within its range
#[test]
fn test_high_latitude_wide_longitude_included() {
    // Near the pole the great-circle path is far shorter than the arc
    // along the 85th parallel.
    let distance = distance_meters(85.0, 0.0, 85.0, 120.0);
    assert!(
        distance <= 1_000_000.0,
        "expected at most 1,000 km, got {distance} m"
    );

    let polar = profile(
        "polar",
        Some("a".repeat(24)),
        Some(("85", "120")),
        Some("1000000".to_string()),
    );
    let eligible = filter_in_range(85.0, 0.0, vec![polar]);

    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0].profile.user_id, "polar");
    assert!((eligible[0].distance_meters.unwrap() - distance).abs() < 1e-6);
}

/// Test: coordinates stored as JSON numbers work the same as strings
#[test]
fn test_numeric_coordinates_accepted() {
    let numeric = Profile {
        user_id: "u1".to_string(),
        fcm_token: Some("a".repeat(24)),
        last_loc: Some(GeoPoint {
            lat: json!(0.0),
            lon: json!(0.001),
        }),
        range: Some("200".to_string()),
        name: None,
    };

    let eligible = filter_in_range(0.0, 0.0, vec![numeric]);

    assert_eq!(eligible.len(), 1);
}

/// Test: the radius evaluated is the candidate's own, not a shared one
#[test]
fn test_radius_is_per_candidate() {
    let wide = profile("wide", Some("a".repeat(24)), Some(("0", "0.005")), Some("1000".to_string()));
    let narrow = profile("narrow", Some("b".repeat(24)), Some(("0", "0.005")), Some("100".to_string()));

    let eligible = filter_in_range(0.0, 0.0, vec![wide, narrow]);

    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0].profile.user_id, "wide");
}

fn profile(
    user_id: &str,
    fcm_token: Option<String>,
    location: Option<(&str, &str)>,
    range: Option<String>,
) -> Profile {
    Profile {
        user_id: user_id.to_string(),
        fcm_token,
        last_loc: location.map(|(lat, lon)| GeoPoint {
            lat: json!(lat),
            lon: json!(lon),
        }),
        range,
        name: None,
    }
}
