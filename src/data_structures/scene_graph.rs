//! Per-frame snapshot of the occupied space in the room.
//!
//! The snapshot is rebuilt from the store and the room whenever the gesture
//! controller needs it, so it never goes stale. Only entities that take up
//! space are included: the four walls and every visible instance whose
//! geometry actually loaded. The floor is never part of it.

use cgmath::Vector3;

use crate::data_structures::{
    instance::{InstanceId, ModelInstance},
    room::{Room, Wall},
};

/// Something a dragged instance can collide with or snap to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SceneEntity {
    Wall(Wall),
    Furniture {
        id: InstanceId,
        position: Vector3<f32>,
    },
}

impl SceneEntity {
    pub fn furniture(id: InstanceId, position: Vector3<f32>) -> Self {
        SceneEntity::Furniture { id, position }
    }

    /// The coordinate offered to the snap solver.
    pub fn anchor(&self) -> Vector3<f32> {
        match self {
            SceneEntity::Wall(wall) => wall.anchor(),
            SceneEntity::Furniture { position, .. } => *position,
        }
    }

    pub fn instance_id(&self) -> Option<InstanceId> {
        match self {
            SceneEntity::Wall(_) => None,
            SceneEntity::Furniture { id, .. } => Some(*id),
        }
    }

    pub fn is_wall(&self) -> bool {
        matches!(self, SceneEntity::Wall(_))
    }

    pub fn planar_distance(&self, point: Vector3<f32>) -> f32 {
        match self {
            SceneEntity::Wall(wall) => wall.planar_distance(point),
            SceneEntity::Furniture { position, .. } => {
                let dx = point.x - position.x;
                let dz = point.z - position.z;
                (dx * dx + dz * dz).sqrt()
            }
        }
    }

    pub fn vertical_distance(&self, point: Vector3<f32>) -> f32 {
        (point.y - self.anchor().y).abs()
    }
}

/// Walls first (left, right, back, front), then instances in store order.
#[derive(Clone, Debug, Default)]
pub struct SceneSnapshot {
    entities: Vec<SceneEntity>,
}

impl SceneSnapshot {
    pub fn new(entities: Vec<SceneEntity>) -> Self {
        Self { entities }
    }

    /// Collect the walls of `room` and every visible instance for which
    /// `has_geometry` holds.
    pub fn capture<F>(room: &Room, instances: &[ModelInstance], has_geometry: F) -> Self
    where
        F: Fn(&ModelInstance) -> bool,
    {
        let mut entities: Vec<SceneEntity> =
            room.walls().into_iter().map(SceneEntity::Wall).collect();
        entities.extend(
            instances
                .iter()
                .filter(|instance| instance.is_visible && has_geometry(instance))
                .map(|instance| SceneEntity::furniture(instance.id, instance.position)),
        );
        Self { entities }
    }

    pub fn push(&mut self, entity: SceneEntity) {
        self.entities.push(entity);
    }

    pub fn entities(&self) -> &[SceneEntity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
