//! Tests for grouping raw points into trajectories

use std::collections::BTreeMap;

use hextrail::{RawPoint, normalize_points};

fn row(trip: &str, lon: f64, lat: f64, ts: i64) -> RawPoint {
    RawPoint {
        trip_id: trip.to_string(),
        longitude: lon,
        latitude: lat,
        speed: ts as f64,
        timestamp: ts,
        attributes: BTreeMap::new(),
    }
}

#[test]
fn test_groups_in_first_appearance_order() {
    let trajectories = normalize_points(vec![
        row("t2", -8.61, 41.15, 5),
        row("t1", -8.60, 41.14, 0),
        row("t2", -8.62, 41.15, 10),
        row("t3", -8.63, 41.16, 0),
    ]);

    let ids: Vec<&str> = trajectories.iter().map(|t| t.trip_id()).collect();
    assert_eq!(ids, vec!["t2", "t1", "t3"]);
    assert_eq!(trajectories[0].samples().len(), 2);
}

#[test]
fn test_samples_sorted_by_timestamp() {
    let trajectories = normalize_points(vec![
        row("t", -8.63, 41.15, 30),
        row("t", -8.61, 41.15, 10),
        row("t", -8.62, 41.15, 20),
    ]);

    let timestamps: Vec<i64> = trajectories[0]
        .samples()
        .iter()
        .map(|s| s.timestamp)
        .collect();
    assert_eq!(timestamps, vec![10, 20, 30]);
    assert_eq!(trajectories[0].duration_seconds(), 20.0);

    // Geometry follows the sorted samples
    let xs: Vec<f64> = trajectories[0].geometry().coords().map(|c| c.x).collect();
    assert_eq!(xs, vec![-8.61, -8.62, -8.63]);
}

#[test]
fn test_invalid_points_discarded() {
    let trajectories = normalize_points(vec![
        row("t", -8.61, 41.15, 0),
        row("t", f64::NAN, 41.15, 10),
        row("t", -8.62, 95.0, 20),
        row("t", -8.63, 41.15, 30),
        row("ghost", 200.0, 0.0, 0),
    ]);

    assert_eq!(trajectories.len(), 1);
    assert_eq!(trajectories[0].samples().len(), 2);
}

#[test]
fn test_attributes_from_earliest_point() {
    let mut late = row("t", -8.62, 41.15, 20);
    late.attributes.insert("call_type".to_string(), "C".to_string());
    let mut early = row("t", -8.61, 41.15, 10);
    early.attributes.insert("call_type".to_string(), "A".to_string());

    let trajectories = normalize_points(vec![late, early]);

    assert_eq!(
        trajectories[0].attributes().get("call_type").map(String::as_str),
        Some("A")
    );
}

#[test]
fn test_raw_point_json_without_attributes() {
    let json = r#"[
        {"trip_id": "1372636858620000589", "longitude": -8.618643, "latitude": 41.141412,
         "speed": 0.0, "timestamp": 1372636858},
        {"trip_id": "1372636858620000589", "longitude": -8.618499, "latitude": 41.141376,
         "speed": 12.1, "timestamp": 1372636873,
         "attributes": {"call_type": "C", "day_type": "A"}}
    ]"#;

    let points: Vec<RawPoint> = serde_json::from_str(json).unwrap();
    assert!(points[0].attributes.is_empty());
    assert_eq!(points[1].attributes.len(), 2);

    let trajectories = normalize_points(points);
    assert_eq!(trajectories.len(), 1);
    assert_eq!(trajectories[0].duration_seconds(), 15.0);
}

#[test]
fn test_empty_input() {
    assert!(normalize_points(Vec::new()).is_empty());
}
