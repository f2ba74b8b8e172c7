//! Core domain logic for the dmatrix service: submission validation,
//! request fingerprinting and the path-engine boundary.

pub mod bounds;
pub mod engine;
pub mod fingerprint;
pub mod models;
pub mod spatial;
pub mod validate;

pub use bounds::{bounding_box, BoundingBox};
pub use engine::{EngineError, GreatCircleEngine, PathEngine};
pub use fingerprint::fingerprint;
pub use models::{
    ComputationRequest, Coord, CoordinatePath, JobState, Location, NetworkNode, PathLeg,
    PathsInput, SubmitMatrix,
};
pub use validate::{validate_submission, ValidationError, ALLOWED_SPEED_PROFILES};
