//! Data models shared between the server, the CLI and the engine boundary.

use serde::{Deserialize, Serialize};

/// A (latitude, longitude) pair. Serializes as `[lat, long]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord(pub f64, pub f64);

impl Coord {
    pub fn lat(&self) -> f64 {
        self.0
    }

    pub fn long(&self) -> f64 {
        self.1
    }
}

/// Raw matrix submission body. Fields are optional so that missing ones
/// can be collected and reported together instead of failing JSON
/// decoding one field at a time.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitMatrix {
    /// Coordinate list serialized as JSON, e.g. `"[[60.1,24.9],[60.2,25.0]]"`.
    pub matrix: Option<String>,
    pub speed_profile: Option<f64>,
    pub country: Option<String>,
}

/// A validated computation request, ready for fingerprinting and execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputationRequest {
    pub matrix: Vec<Coord>,
    pub country: String,
    pub speed_profile: u32,
}

/// Lifecycle state of a computation record.
///
/// `Complete` and `Failed` are terminal; no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Complete,
    Failed,
}

/// A coordinate corrected onto the routable network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: i64,
    pub coord: Coord,
}

/// A location submitted for resolution. At least a coordinate and a
/// country are required; address-only resolution needs an external
/// geocoder behind the engine boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<i64>,
}

/// Input for batch source→target path computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsInput {
    pub country: String,
    pub speed_profile: u32,
    pub paths: Vec<PathLeg>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathLeg {
    pub source: Coord,
    pub target: Coord,
}

/// One computed leg: network-corrected endpoints with distance and
/// travel time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatePath {
    pub distance_m: f64,
    pub duration_s: f64,
    pub coords: Vec<Coord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coord_serializes_as_pair() {
        let coord = Coord(60.1, 24.9);
        let json = serde_json::to_string(&coord).unwrap();
        assert_eq!(json, "[60.1,24.9]");

        let back: Coord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, coord);
    }

    #[test]
    fn job_state_uses_lowercase_wire_names() {
        assert_eq!(serde_json::to_string(&JobState::Pending).unwrap(), "\"pending\"");
        assert_eq!(serde_json::to_string(&JobState::Complete).unwrap(), "\"complete\"");
        assert_eq!(serde_json::to_string(&JobState::Failed).unwrap(), "\"failed\"");
    }

    #[test]
    fn submission_tolerates_missing_fields() {
        let raw: SubmitMatrix = serde_json::from_str(r#"{"speed_profile": 80}"#).unwrap();
        assert!(raw.matrix.is_none());
        assert!(raw.country.is_none());
        assert_eq!(raw.speed_profile, Some(80.0));
    }
}
