//! Deterministic request fingerprinting.
//!
//! The fingerprint is both the store key and the externally visible
//! resource id, so it must be stable across process restarts and must
//! treat the coordinate sequence as order-sensitive. Coordinates are
//! hashed by their exact bit patterns; no reordering or normalization
//! happens here.

use sha2::{Digest, Sha256};

use crate::models::Coord;

/// Fingerprint of a (matrix, country, speed profile) tuple as lowercase
/// hex. Equal inputs always produce equal fingerprints; permuted
/// coordinate sequences are distinct requests.
pub fn fingerprint(matrix: &[Coord], country: &str, speed_profile: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(country.as_bytes());
    hasher.update([0u8]);
    hasher.update(speed_profile.to_be_bytes());
    for coord in matrix {
        hasher.update(coord.lat().to_bits().to_be_bytes());
        hasher.update(coord.long().to_bits().to_be_bytes());
    }
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matrix() -> Vec<Coord> {
        vec![Coord(60.1, 24.9), Coord(60.2, 25.0)]
    }

    #[test]
    fn equal_inputs_yield_equal_fingerprints() {
        let a = fingerprint(&sample_matrix(), "FI", 80);
        let b = fingerprint(&sample_matrix(), "FI", 80);
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_is_hex_of_fixed_width() {
        let id = fingerprint(&sample_matrix(), "FI", 80);
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn coordinate_order_matters() {
        let forward = fingerprint(&sample_matrix(), "FI", 80);
        let mut reversed = sample_matrix();
        reversed.reverse();
        assert_ne!(forward, fingerprint(&reversed, "FI", 80));
    }

    #[test]
    fn country_and_speed_are_part_of_the_identity() {
        let base = fingerprint(&sample_matrix(), "FI", 80);
        assert_ne!(base, fingerprint(&sample_matrix(), "SE", 80));
        assert_ne!(base, fingerprint(&sample_matrix(), "FI", 100));
    }
}
