//! Boundary to the numerical path/geo engine.
//!
//! The service consumes this interface; the numerical work lives behind
//! it. [`GreatCircleEngine`] is the built-in implementation used when no
//! external engine is wired in: great-circle travel times over a
//! per-country snapping grid.

use async_trait::async_trait;
use thiserror::Error;

use crate::bounds;
use crate::models::{Coord, CoordinatePath, Location, NetworkNode, PathsInput};
use crate::spatial::haversine_distance_m;

/// Snapping grid step in degrees (~1.1 km of latitude).
const GRID_STEP_DEG: f64 = 0.01;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown country \"{0}\"")]
    UnknownCountry(String),
    #[error("coordinate (lat: {lat}, long: {long}) is outside the network for \"{country}\"")]
    OutsideNetwork { lat: f64, long: f64, country: String },
    #[error("node {node} is not on the network for \"{country}\"")]
    UnknownNode { node: i64, country: String },
    #[error("cannot resolve location: {0}")]
    Unresolvable(String),
    #[error("engine failure: {0}")]
    Internal(String),
}

/// The external computation collaborator. Injected into the server at
/// construction; tests substitute scripted implementations.
#[async_trait]
pub trait PathEngine: Send + Sync {
    /// Pairwise travel times in seconds for the given coordinates.
    async fn travel_time_matrix(
        &self,
        matrix: &[Coord],
        country: &str,
        speed_profile: u32,
    ) -> Result<Vec<Vec<f64>>, EngineError>;

    /// Snap a raw coordinate to the nearest routable network node.
    async fn correct_point(&self, coord: Coord, country: &str) -> Result<NetworkNode, EngineError>;

    /// Coordinates for the given node ids.
    async fn node_coordinates(
        &self,
        country: &str,
        nodes: &[i64],
    ) -> Result<Vec<Coord>, EngineError>;

    /// Batch source→target path computation.
    async fn coordinate_paths(
        &self,
        input: &PathsInput,
    ) -> Result<Vec<CoordinatePath>, EngineError>;

    /// Resolve a location to a corrected coordinate and network node.
    async fn resolve_location(&self, location: &Location) -> Result<Location, EngineError>;
}

/// Built-in engine. The "network" is a deterministic grid laid over each
/// country's bounding box, so node ids are stable across restarts and
/// invertible back to coordinates.
#[derive(Debug, Default)]
pub struct GreatCircleEngine;

impl GreatCircleEngine {
    fn grid_columns(bbox: &bounds::BoundingBox) -> i64 {
        ((bbox.long_max - bbox.long_min) / GRID_STEP_DEG).ceil() as i64 + 1
    }

    fn snap(&self, coord: Coord, country: &str) -> Result<NetworkNode, EngineError> {
        let bbox = bounds::bounding_box(country)
            .ok_or_else(|| EngineError::UnknownCountry(country.to_string()))?;
        if !bbox.contains(coord.lat(), coord.long()) {
            return Err(EngineError::OutsideNetwork {
                lat: coord.lat(),
                long: coord.long(),
                country: country.to_string(),
            });
        }
        let cols = Self::grid_columns(&bbox);
        let row = ((coord.lat() - bbox.lat_min) / GRID_STEP_DEG).round() as i64;
        let col = ((coord.long() - bbox.long_min) / GRID_STEP_DEG).round() as i64;
        let snapped = Coord(
            bbox.lat_min + row as f64 * GRID_STEP_DEG,
            bbox.long_min + col as f64 * GRID_STEP_DEG,
        );
        Ok(NetworkNode {
            id: row * cols + col,
            coord: snapped,
        })
    }

    fn unsnap(&self, country: &str, node: i64) -> Result<Coord, EngineError> {
        let bbox = bounds::bounding_box(country)
            .ok_or_else(|| EngineError::UnknownCountry(country.to_string()))?;
        let cols = Self::grid_columns(&bbox);
        if node < 0 {
            return Err(EngineError::UnknownNode {
                node,
                country: country.to_string(),
            });
        }
        let coord = Coord(
            bbox.lat_min + (node / cols) as f64 * GRID_STEP_DEG,
            bbox.long_min + (node % cols) as f64 * GRID_STEP_DEG,
        );
        if !bbox.contains(coord.lat(), coord.long()) {
            return Err(EngineError::UnknownNode {
                node,
                country: country.to_string(),
            });
        }
        Ok(coord)
    }
}

#[async_trait]
impl PathEngine for GreatCircleEngine {
    async fn travel_time_matrix(
        &self,
        matrix: &[Coord],
        country: &str,
        speed_profile: u32,
    ) -> Result<Vec<Vec<f64>>, EngineError> {
        let speed_mps = speed_profile.max(1) as f64 / 3.6;
        let nodes = matrix
            .iter()
            .map(|coord| self.snap(*coord, country))
            .collect::<Result<Vec<_>, _>>()?;
        let times = nodes
            .iter()
            .map(|from| {
                nodes
                    .iter()
                    .map(|to| {
                        haversine_distance_m(
                            from.coord.lat(),
                            from.coord.long(),
                            to.coord.lat(),
                            to.coord.long(),
                        ) / speed_mps
                    })
                    .collect()
            })
            .collect();
        Ok(times)
    }

    async fn correct_point(&self, coord: Coord, country: &str) -> Result<NetworkNode, EngineError> {
        self.snap(coord, country)
    }

    async fn node_coordinates(
        &self,
        country: &str,
        nodes: &[i64],
    ) -> Result<Vec<Coord>, EngineError> {
        nodes.iter().map(|node| self.unsnap(country, *node)).collect()
    }

    async fn coordinate_paths(
        &self,
        input: &PathsInput,
    ) -> Result<Vec<CoordinatePath>, EngineError> {
        let speed_mps = input.speed_profile.max(1) as f64 / 3.6;
        input
            .paths
            .iter()
            .map(|leg| {
                let source = self.snap(leg.source, &input.country)?;
                let target = self.snap(leg.target, &input.country)?;
                let distance_m = haversine_distance_m(
                    source.coord.lat(),
                    source.coord.long(),
                    target.coord.lat(),
                    target.coord.long(),
                );
                Ok(CoordinatePath {
                    distance_m,
                    duration_s: distance_m / speed_mps,
                    coords: vec![source.coord, target.coord],
                })
            })
            .collect()
    }

    async fn resolve_location(&self, location: &Location) -> Result<Location, EngineError> {
        let Some(country) = location.country.as_deref() else {
            return Err(EngineError::Unresolvable(
                "location has no country".to_string(),
            ));
        };
        let Some(coordinate) = location.coordinate else {
            return Err(EngineError::Unresolvable(
                "location has no coordinate and address lookup is not available".to_string(),
            ));
        };
        let node = self.snap(coordinate, country)?;
        Ok(Location {
            address: location.address.clone(),
            country: Some(country.to_string()),
            coordinate: Some(node.coord),
            node: Some(node.id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PathLeg;

    #[test]
    fn snapping_is_deterministic() {
        let engine = GreatCircleEngine;
        let a = engine.snap(Coord(60.17, 24.94), "FI").unwrap();
        let b = engine.snap(Coord(60.17, 24.94), "FI").unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.coord, b.coord);
    }

    #[test]
    fn snapped_nodes_invert_to_their_coordinates() {
        let engine = GreatCircleEngine;
        let node = engine.snap(Coord(60.17, 24.94), "FI").unwrap();
        let coord = engine.unsnap("FI", node.id).unwrap();
        assert!((coord.lat() - node.coord.lat()).abs() < 1e-9);
        assert!((coord.long() - node.coord.long()).abs() < 1e-9);
    }

    #[test]
    fn snap_rejects_points_outside_the_network() {
        let engine = GreatCircleEngine;
        let err = engine.snap(Coord(48.85, 2.35), "FI").unwrap_err();
        assert!(matches!(err, EngineError::OutsideNetwork { .. }));
    }

    #[tokio::test]
    async fn matrix_has_zero_diagonal_and_is_symmetric() {
        let engine = GreatCircleEngine;
        let matrix = vec![Coord(60.1, 24.9), Coord(60.5, 25.3), Coord(61.0, 24.0)];
        let times = engine.travel_time_matrix(&matrix, "FI", 80).await.unwrap();
        assert_eq!(times.len(), 3);
        for (i, row) in times.iter().enumerate() {
            assert_eq!(row.len(), 3);
            assert!(row[i].abs() < 1e-9);
        }
        assert!((times[0][1] - times[1][0]).abs() < 1e-6);
        assert!(times[0][1] > 0.0);
    }

    #[tokio::test]
    async fn paths_report_distance_and_duration() {
        let engine = GreatCircleEngine;
        let input = PathsInput {
            country: "FI".to_string(),
            speed_profile: 80,
            paths: vec![PathLeg {
                source: Coord(60.1, 24.9),
                target: Coord(60.5, 25.3),
            }],
        };
        let paths = engine.coordinate_paths(&input).await.unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].distance_m > 0.0);
        assert!(paths[0].duration_s > 0.0);
        assert_eq!(paths[0].coords.len(), 2);
    }

    #[tokio::test]
    async fn address_only_locations_are_unresolvable() {
        let engine = GreatCircleEngine;
        let location = Location {
            address: Some("Mannerheimintie 1".to_string()),
            country: Some("FI".to_string()),
            coordinate: None,
            node: None,
        };
        let err = engine.resolve_location(&location).await.unwrap_err();
        assert!(matches!(err, EngineError::Unresolvable(_)));
    }

    #[tokio::test]
    async fn coordinate_locations_resolve_to_nodes() {
        let engine = GreatCircleEngine;
        let location = Location {
            address: None,
            country: Some("FI".to_string()),
            coordinate: Some(Coord(60.17, 24.94)),
            node: None,
        };
        let resolved = engine.resolve_location(&location).await.unwrap();
        assert!(resolved.node.is_some());
        assert!(resolved.coordinate.is_some());
    }
}
