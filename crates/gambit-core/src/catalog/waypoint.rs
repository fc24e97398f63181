//! Waypoint path table.
//!
//! Paths are loaded independently of rules. Each path's points must be
//! numbered consecutively from 1; a path with a gap or a non-finite
//! coordinate is dropped as a whole.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{error, info};

use crate::error::WaypointError;
use crate::object::Position;
use crate::rule::WaypointRow;

/// One point of a path.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointNode {
    /// One-based index along the path.
    pub id: u32,
    /// Location. Orientation is 0 unless `facing` is set.
    pub position: Position,
    /// Fixed facing on arrival.
    pub facing: Option<f32>,
    /// Pause on arrival.
    pub delay_ms: u32,
}

/// An ordered, validated path.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointPath {
    id: u32,
    nodes: Vec<WaypointNode>,
}

impl WaypointPath {
    /// Creates a path from nodes already numbered `1..=n`.
    ///
    /// # Errors
    ///
    /// Returns [`WaypointError`] when the numbering has a gap or a
    /// coordinate is not finite.
    pub fn new(id: u32, nodes: Vec<WaypointNode>) -> Result<Self, WaypointError> {
        for (expected, node) in (1..).zip(&nodes) {
            if node.id != expected {
                return Err(WaypointError::NonConsecutivePoint {
                    path_id: id,
                    expected,
                    found: node.id,
                });
            }
            if !node.position.coords.is_finite() {
                return Err(WaypointError::NonFiniteCoordinate {
                    path_id: id,
                    point_id: node.id,
                });
            }
        }
        Ok(Self { id, nodes })
    }

    /// Path id.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Points in travel order.
    #[must_use]
    pub fn nodes(&self) -> &[WaypointNode] {
        &self.nodes
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the path has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a point by its one-based id.
    #[must_use]
    pub fn node(&self, point_id: u32) -> Option<&WaypointNode> {
        let index = usize::try_from(point_id).ok()?.checked_sub(1)?;
        self.nodes.get(index)
    }

    /// Id of the final point, 0 for an empty path.
    #[must_use]
    pub fn last_point_id(&self) -> u32 {
        self.nodes.last().map_or(0, |node| node.id)
    }

    /// Distance from `from` to the nearest point of the path.
    #[must_use]
    pub fn nearest_distance(&self, from: &Position) -> Option<f32> {
        self.nodes
            .iter()
            .map(|node| node.position.distance(from))
            .min_by(f32::total_cmp)
    }
}

/// Groups rows by path, orders them by point id and validates each path.
///
/// Returns the valid paths and the ids of paths that were dropped.
pub(crate) fn build_paths(rows: &[WaypointRow]) -> (BTreeMap<u32, Arc<WaypointPath>>, Vec<u32>) {
    let mut grouped: BTreeMap<u32, Vec<&WaypointRow>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.path_id).or_default().push(row);
    }

    let mut paths = BTreeMap::new();
    let mut rejected = Vec::new();
    for (path_id, mut points) in grouped {
        points.sort_by_key(|row| row.point_id);
        let nodes = points
            .into_iter()
            .map(|row| WaypointNode {
                id: row.point_id,
                position: Position::new(row.x, row.y, row.z, row.orientation.unwrap_or(0.0)),
                facing: row.orientation,
                delay_ms: row.delay_ms,
            })
            .collect();
        match WaypointPath::new(path_id, nodes) {
            Ok(path) => {
                paths.insert(path_id, Arc::new(path));
            }
            Err(err) => {
                error!(path_id, error = %err, "Waypoint path rejected");
                rejected.push(path_id);
            }
        }
    }

    info!(paths = paths.len(), rejected = rejected.len(), "Waypoint paths loaded");
    (paths, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(path_id: u32, point_id: u32, x: f32) -> WaypointRow {
        WaypointRow {
            path_id,
            point_id,
            x,
            ..WaypointRow::default()
        }
    }

    #[test]
    fn rows_are_ordered_by_point_id() {
        let rows = vec![row(7, 2, 10.0), row(7, 1, 0.0), row(7, 3, 20.0)];
        let (paths, rejected) = build_paths(&rows);
        assert!(rejected.is_empty());
        let path = &paths[&7];
        assert_eq!(path.len(), 3);
        assert_eq!(path.last_point_id(), 3);
        assert_eq!(path.node(2).map(|n| n.position.coords.x), Some(10.0));
        assert!(path.node(0).is_none());
    }

    #[test]
    fn gap_rejects_whole_path() {
        let rows = vec![row(1, 1, 0.0), row(1, 3, 0.0), row(2, 1, 0.0)];
        let (paths, rejected) = build_paths(&rows);
        assert_eq!(rejected, vec![1]);
        assert!(paths.contains_key(&2));
    }

    #[test]
    fn path_must_start_at_one() {
        let err = WaypointPath::new(
            4,
            vec![WaypointNode {
                id: 2,
                position: Position::default(),
                facing: None,
                delay_ms: 0,
            }],
        )
        .unwrap_err();
        assert_eq!(
            err,
            WaypointError::NonConsecutivePoint {
                path_id: 4,
                expected: 1,
                found: 2
            }
        );
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let rows = vec![row(3, 1, f32::NAN)];
        let (paths, rejected) = build_paths(&rows);
        assert!(paths.is_empty());
        assert_eq!(rejected, vec![3]);
    }

    #[test]
    fn nearest_distance_picks_closest_node() {
        let rows = vec![row(1, 1, 0.0), row(1, 2, 50.0)];
        let (paths, _) = build_paths(&rows);
        let from = Position::new(45.0, 0.0, 0.0, 0.0);
        assert_eq!(paths[&1].nearest_distance(&from), Some(5.0));
    }
}
