//! Submission validation: exhaustive required-field checks followed by
//! ordered, fail-fast semantic checks.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::bounds::{self, BoundingBox};
use crate::models::{ComputationRequest, Coord, SubmitMatrix};

/// Speed profiles the computation engine accepts, in km/h.
pub const ALLOWED_SPEED_PROFILES: [u32; 5] = [40, 60, 80, 100, 120];

#[derive(Debug, Error)]
pub enum ValidationError {
    /// One or more required fields were absent from the submission.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("speed profile '{given}' makes no sense, must be one of {allowed:?}")]
    InvalidSpeedProfile { given: f64, allowed: [u32; 5] },
    #[error("country {given} not allowed, must be one of: {}", .allowed.join(" "))]
    CountryNotAllowed { given: String, allowed: Vec<String> },
    #[error("no coordinate limits configured for country \"{0}\"")]
    NoBoundsForCountry(String),
    #[error("could not parse matrix: {0}. Make sure you use [[LAT, LONG]...].")]
    MatrixParse(String),
    #[error(
        "coordinate (lat: {lat}, long: {long}) at matrix index {index} is outside the limits \
         for country \"{country}\" which is {bounds}. Make sure you use [[LAT, LONG]...]."
    )]
    CoordinateOutOfBounds {
        index: usize,
        lat: f64,
        long: f64,
        country: String,
        bounds: BoundingBox,
    },
}

impl ValidationError {
    /// True when the request was structurally incomplete rather than
    /// semantically inadmissible.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ValidationError::MissingFields(_))
    }
}

/// Validate a raw submission into a [`ComputationRequest`].
///
/// Field presence is checked exhaustively so clients see every missing
/// field at once. Semantic checks then run in order (speed profile,
/// country, matrix parse, coordinate bounds) and stop at the first
/// violation; for coordinates that means only the first out-of-bounds
/// index is reported.
pub fn validate_submission(
    raw: &SubmitMatrix,
    allowed_countries: &BTreeSet<String>,
) -> Result<ComputationRequest, ValidationError> {
    let mut missing = Vec::new();
    if raw.matrix.is_none() {
        missing.push("matrix");
    }
    if raw.speed_profile.is_none() {
        missing.push("speed_profile");
    }
    if raw.country.is_none() {
        missing.push("country");
    }
    let (Some(data), Some(speed), Some(country)) =
        (raw.matrix.as_deref(), raw.speed_profile, raw.country.as_deref())
    else {
        return Err(ValidationError::MissingFields(missing));
    };

    if speed < 0.0 || speed.fract() != 0.0 || !ALLOWED_SPEED_PROFILES.contains(&(speed as u32)) {
        return Err(ValidationError::InvalidSpeedProfile {
            given: speed,
            allowed: ALLOWED_SPEED_PROFILES,
        });
    }
    let speed_profile = speed as u32;

    if !allowed_countries.contains(country) {
        return Err(ValidationError::CountryNotAllowed {
            given: country.to_string(),
            allowed: allowed_countries.iter().cloned().collect(),
        });
    }
    let bbox = bounds::bounding_box(country)
        .ok_or_else(|| ValidationError::NoBoundsForCountry(country.to_string()))?;

    let matrix: Vec<Coord> =
        serde_json::from_str(data).map_err(|err| ValidationError::MatrixParse(err.to_string()))?;

    for (index, coord) in matrix.iter().enumerate() {
        if !bbox.contains(coord.lat(), coord.long()) {
            return Err(ValidationError::CoordinateOutOfBounds {
                index,
                lat: coord.lat(),
                long: coord.long(),
                country: country.to_string(),
                bounds: bbox,
            });
        }
    }

    Ok(ComputationRequest {
        matrix,
        country: country.to_string(),
        speed_profile,
    })
}
