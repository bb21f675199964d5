//! Proximity based collision verdicts.
//!
//! A candidate position is blocked by an entity when it is closer on the floor
//! plane than the entity's threshold and the two are within the height band.
//! Both comparisons are strict.

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    data_structures::instance::InstanceId,
    spatial::{Proximity, SpatialIndex},
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionPolicy {
    pub wall_threshold: f32,
    pub furniture_threshold: f32,
    pub height_band: f32,
}

impl Default for CollisionPolicy {
    fn default() -> Self {
        Self {
            wall_threshold: 2.0,
            furniture_threshold: 1.5,
            height_band: 1.0,
        }
    }
}

impl CollisionPolicy {
    pub fn blocks(&self, proximity: &Proximity) -> bool {
        let threshold = if proximity.entity.is_wall() {
            self.wall_threshold
        } else {
            self.furniture_threshold
        };
        proximity.planar < threshold && proximity.vertical < self.height_band
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CollisionEvaluator {
    pub policy: CollisionPolicy,
}

impl CollisionEvaluator {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self { policy }
    }

    pub fn evaluate<I: SpatialIndex + ?Sized>(
        &self,
        index: &I,
        candidate: Vector3<f32>,
        exclude: Option<InstanceId>,
    ) -> bool {
        self.first_blocker(index, candidate, exclude).is_some()
    }

    /// The first entity, in snapshot order, that blocks `candidate`.
    pub fn first_blocker<I: SpatialIndex + ?Sized>(
        &self,
        index: &I,
        candidate: Vector3<f32>,
        exclude: Option<InstanceId>,
    ) -> Option<Proximity> {
        index
            .nearby(candidate, exclude)
            .into_iter()
            .find(|proximity| self.policy.blocks(proximity))
    }
}
