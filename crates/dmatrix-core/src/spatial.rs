//! Great-circle math used by the built-in path engine.

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two coordinates, in meters.
pub fn haversine_distance_m(lat1: f64, long1: f64, lat2: f64, long2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (long2 - long1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let dist = haversine_distance_m(60.0, 25.0, 61.0, 25.0);
        assert!((dist - 111_194.0).abs() < 200.0, "got {dist}");
    }

    #[test]
    fn zero_distance_for_identical_points() {
        let dist = haversine_distance_m(60.17, 24.94, 60.17, 24.94);
        assert!(dist < 0.001);
    }

    #[test]
    fn distance_is_symmetric() {
        let there = haversine_distance_m(60.17, 24.94, 59.44, 24.75);
        let back = haversine_distance_m(59.44, 24.75, 60.17, 24.94);
        assert!((there - back).abs() < 1e-6);
    }
}
