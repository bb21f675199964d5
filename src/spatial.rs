//! Proximity queries over the occupied space of the room.
//!
//! The query is a plain scan of the snapshot: the room holds tens of objects,
//! and each frame rebuilds the snapshot anyway.

use cgmath::Vector3;

use crate::data_structures::{
    instance::InstanceId,
    scene_graph::{SceneEntity, SceneSnapshot},
};

/// One entity near the query point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Proximity {
    pub entity: SceneEntity,
    /// Euclidean distance on the X-Z plane.
    pub planar: f32,
    /// Absolute difference in Y.
    pub vertical: f32,
}

pub trait SpatialIndex {
    /// Every collidable entity except `exclude`, in snapshot order.
    fn nearby(&self, point: Vector3<f32>, exclude: Option<InstanceId>) -> Vec<Proximity>;
}

impl SpatialIndex for SceneSnapshot {
    fn nearby(&self, point: Vector3<f32>, exclude: Option<InstanceId>) -> Vec<Proximity> {
        self.entities()
            .iter()
            .filter(|entity| exclude.is_none() || entity.instance_id() != exclude)
            .map(|entity| Proximity {
                entity: *entity,
                planar: entity.planar_distance(point),
                vertical: entity.vertical_distance(point),
            })
            .collect()
    }
}
