#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Dead-reckoning route prediction.
//!
//! Extrapolates a vehicle's position from its last sighting by holding
//! heading and speed constant. An equirectangular approximation is good
//! enough at city scale, where predicted windows are a few minutes out.

use serde::{Deserialize, Serialize};

/// Metres per degree of latitude (and of longitude at the equator).
const METERS_PER_DEGREE: f64 = 111_111.0;

/// Longitude shrink factor floor, keeps the maths finite near the poles.
const MIN_COS_LAT: f64 = 1e-3;

/// A single predicted position, `elapsed_seconds` after the sighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
    pub elapsed_seconds: u32,
}

/// Predicts `steps` future waypoints spaced `step_seconds` apart,
/// assuming the vehicle holds its current heading and speed.
///
/// Negative speeds are treated as stationary. Headings outside 0-360
/// wrap, so -90 extrapolates due west like 270 does.
#[must_use]
pub fn predict_route(
    latitude: f64,
    longitude: f64,
    heading_deg: f64,
    speed_kmh: f64,
    steps: u32,
    step_seconds: u32,
) -> Vec<Waypoint> {
    let speed_ms = speed_kmh.max(0.0) * 1000.0 / 3600.0;
    let heading_rad = heading_deg.rem_euclid(360.0).to_radians();
    let step_distance = speed_ms * f64::from(step_seconds);

    #[allow(clippy::cast_possible_truncation)]
    let mut waypoints = Vec::with_capacity(steps as usize);
    let mut lat = latitude;
    let mut lon = longitude;
    for i in 1..=steps {
        let dlat = step_distance * heading_rad.cos() / METERS_PER_DEGREE;
        let dlon = step_distance * heading_rad.sin()
            / (METERS_PER_DEGREE * lat.to_radians().cos().max(MIN_COS_LAT));
        lat += dlat;
        lon += dlon;
        waypoints.push(Waypoint {
            lat,
            lon,
            elapsed_seconds: i * step_seconds,
        });
    }
    waypoints
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn returns_exactly_steps_waypoints_with_increasing_elapsed() {
        let route = predict_route(27.7, 85.3, 45.0, 60.0, 10, 30);
        assert_eq!(route.len(), 10);
        let mut expected_elapsed = 0;
        for waypoint in &route {
            expected_elapsed += 30;
            assert_eq!(waypoint.elapsed_seconds, expected_elapsed);
        }
    }

    #[test]
    fn zero_speed_stays_put() {
        let route = predict_route(27.7172, 85.324, 0.0, 0.0, 5, 30);
        assert_eq!(route.len(), 5);
        for waypoint in route {
            assert_close(waypoint.lat, 27.7172);
            assert_close(waypoint.lon, 85.324);
        }
    }

    #[test]
    fn negative_speed_is_treated_as_stationary() {
        let route = predict_route(27.7, 85.3, 90.0, -40.0, 3, 30);
        for waypoint in route {
            assert_close(waypoint.lat, 27.7);
            assert_close(waypoint.lon, 85.3);
        }
    }

    #[test]
    fn heading_north_moves_latitude_only() {
        // 36 km/h is 10 m/s, so each 30 s step covers 300 m.
        let route = predict_route(0.0, 0.0, 0.0, 36.0, 3, 30);
        let step_deg = 300.0 / 111_111.0;
        let mut expected = 0.0;
        for waypoint in &route {
            expected += step_deg;
            assert_close(waypoint.lat, expected);
            assert!(waypoint.lon.abs() < 1e-9);
        }
    }

    #[test]
    fn heading_east_moves_longitude_only_at_equator() {
        let route = predict_route(0.0, 0.0, 90.0, 36.0, 2, 30);
        let step_deg = 300.0 / 111_111.0;
        assert_close(route[0].lon, step_deg);
        assert_close(route[1].lon, step_deg * 2.0);
        assert!(route[0].lat.abs() < 1e-9);
    }

    #[test]
    fn heading_wraps_modulo_360() {
        let west = predict_route(27.7, 85.3, -90.0, 50.0, 4, 30);
        let also_west = predict_route(27.7, 85.3, 270.0, 50.0, 4, 30);
        assert_eq!(west, also_west);
        assert!(west[0].lon < 85.3);
    }

    #[test]
    fn longitude_step_grows_with_latitude() {
        let equator = predict_route(0.0, 0.0, 90.0, 60.0, 1, 30);
        let north = predict_route(60.0, 0.0, 90.0, 60.0, 1, 30);
        // At 60 degrees north a degree of longitude is half as wide.
        assert!(north[0].lon > equator[0].lon * 1.9);
    }

    #[test]
    fn zero_steps_yields_empty_route() {
        assert!(predict_route(27.7, 85.3, 10.0, 40.0, 0, 30).is_empty());
    }
}
