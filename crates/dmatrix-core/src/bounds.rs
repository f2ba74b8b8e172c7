//! Per-country coordinate limits used to sanity-check submissions before
//! any computation is attempted.

use std::fmt;

/// Latitude/longitude range a country's road network falls inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub long_min: f64,
    pub long_max: f64,
}

impl BoundingBox {
    pub fn contains(&self, lat: f64, long: f64) -> bool {
        lat >= self.lat_min
            && lat <= self.lat_max
            && long >= self.long_min
            && long <= self.long_max
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lat [{}, {}], long [{}, {}]",
            self.lat_min, self.lat_max, self.long_min, self.long_max
        )
    }
}

/// Coordinate limits for the given country code, if the service ships
/// network data for it.
pub fn bounding_box(country: &str) -> Option<BoundingBox> {
    let bbox = match country {
        "FI" => BoundingBox {
            lat_min: 59.3,
            lat_max: 70.1,
            long_min: 19.0,
            long_max: 31.6,
        },
        "SE" => BoundingBox {
            lat_min: 55.0,
            lat_max: 69.1,
            long_min: 10.5,
            long_max: 24.2,
        },
        "NO" => BoundingBox {
            lat_min: 57.9,
            lat_max: 71.3,
            long_min: 4.4,
            long_max: 31.3,
        },
        "DK" => BoundingBox {
            lat_min: 54.5,
            lat_max: 57.8,
            long_min: 8.0,
            long_max: 15.2,
        },
        "DE" => BoundingBox {
            lat_min: 47.2,
            lat_max: 55.1,
            long_min: 5.8,
            long_max: 15.1,
        },
        "EE" => BoundingBox {
            lat_min: 57.5,
            lat_max: 59.7,
            long_min: 21.7,
            long_max: 28.2,
        },
        _ => return None,
    };
    Some(bbox)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finland_contains_helsinki() {
        let bbox = bounding_box("FI").unwrap();
        assert!(bbox.contains(60.17, 24.94));
    }

    #[test]
    fn finland_excludes_points_south_of_the_gulf() {
        let bbox = bounding_box("FI").unwrap();
        assert!(!bbox.contains(52.52, 13.40));
    }

    #[test]
    fn unknown_country_has_no_box() {
        assert!(bounding_box("XX").is_none());
    }

    #[test]
    fn display_lists_both_axes() {
        let bbox = bounding_box("EE").unwrap();
        let text = bbox.to_string();
        assert!(text.contains("lat ["));
        assert!(text.contains("long ["));
    }
}
