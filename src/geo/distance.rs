//! Great-circle distance via the haversine formula.

use super::Coordinate;

/// Mean Earth radius in kilometers.
///
/// Every distance in the crate goes through [`haversine_km`] with this one
/// constant; filtering and ranking can never disagree on the metric.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinates, in kilometers.
///
/// Symmetric in its arguments and exactly zero for identical inputs.
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let d_lat = (to.lat() - from.lat()).to_radians();
    let d_lon = (to.lon() - from.lon()).to_radians();

    // Clamp guards against rounding pushing `a` past 1 for near-antipodal
    // pairs, which would put the sqrt out of domain.
    let a = ((d_lat / 2.0).sin().powi(2)
        + from.lat().to_radians().cos()
            * to.lat().to_radians().cos()
            * (d_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_identity_is_exactly_zero() {
        let p = coord(32.852310, 35.096149);
        assert_eq!(haversine_km(p, p), 0.0);

        let pole = coord(90.0, 0.0);
        assert_eq!(haversine_km(pole, pole), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            (coord(32.852310, 35.096149), coord(32.853418, 35.092406)),
            (coord(0.0, 0.0), coord(45.0, 90.0)),
            (coord(-33.8688, 151.2093), coord(51.5074, -0.1278)),
        ];
        for (p, q) in pairs {
            let forward = haversine_km(p, q);
            let backward = haversine_km(q, p);
            assert!(
                (forward - backward).abs() < 1e-9,
                "distance not symmetric: {} vs {}",
                forward,
                backward
            );
        }
    }

    #[test]
    fn test_quarter_meridian() {
        // Equator to pole along a meridian is a quarter great circle.
        let d = haversine_km(coord(0.0, 0.0), coord(90.0, 0.0));
        let expected = std::f64::consts::PI * EARTH_RADIUS_KM / 2.0;
        assert!((d - expected).abs() < 1e-6, "got {}", d);
    }

    #[test]
    fn test_antipodal_points() {
        // Antipodes are half the circumference apart; also exercises the
        // clamp on `a`.
        let d = haversine_km(coord(0.0, 0.0), coord(0.0, 180.0));
        let expected = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((d - expected).abs() < 1e-6, "got {}", d);
    }

    #[test]
    fn test_known_short_distance() {
        // Two points ~371 m apart in the same town.
        let d = haversine_km(coord(32.852310, 35.096149), coord(32.853418, 35.092406));
        assert!((d - 0.370710).abs() < 5e-4, "got {}", d);
    }

    #[test]
    fn test_triangle_inequality_sanity() {
        let a = coord(32.852310, 35.096149);
        let b = coord(32.845414, 35.078663);
        let c = coord(32.842025, 35.105976);
        let direct = haversine_km(a, c);
        let via_b = haversine_km(a, b) + haversine_km(b, c);
        assert!(direct <= via_b + 1e-9);
    }
}
