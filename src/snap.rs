//! Single-axis snapping on the floor plane.
//!
//! Every nearby entity offers its X and its Z coordinate. Offers closer than
//! the threshold compete, the smallest distance wins and an earlier offer
//! keeps the win on an exact tie. Only the winning axis of the candidate is
//! replaced. An axis that is already aligned offers a correction of zero,
//! which beats every other offer and leaves the candidate where it is.

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::{data_structures::instance::InstanceId, spatial::SpatialIndex};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapAxis {
    #[default]
    None,
    X,
    Z,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapResult {
    pub position: Vector3<f32>,
    pub axis: SnapAxis,
}

impl SnapResult {
    pub fn is_snapped(&self) -> bool {
        self.axis != SnapAxis::None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    pub enabled: bool,
    pub threshold: f32,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SnapSolver;

impl SnapSolver {
    pub fn snap<I: SpatialIndex + ?Sized>(
        &self,
        index: &I,
        candidate: Vector3<f32>,
        threshold: f32,
        exclude: Option<InstanceId>,
    ) -> SnapResult {
        let mut best: Option<(f32, SnapAxis, f32)> = None;
        for proximity in index.nearby(candidate, exclude) {
            let anchor = proximity.entity.anchor();
            for (axis, target, current) in [
                (SnapAxis::X, anchor.x, candidate.x),
                (SnapAxis::Z, anchor.z, candidate.z),
            ] {
                let distance = (current - target).abs();
                if distance >= threshold {
                    continue;
                }
                if best.is_none_or(|(d, _, _)| distance < d) {
                    best = Some((distance, axis, target));
                }
            }
        }

        let mut position = candidate;
        let axis = match best {
            Some((_, SnapAxis::X, target)) => {
                position.x = target;
                SnapAxis::X
            }
            Some((_, SnapAxis::Z, target)) => {
                position.z = target;
                SnapAxis::Z
            }
            _ => SnapAxis::None,
        };
        SnapResult { position, axis }
    }
}
