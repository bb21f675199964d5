//! Object picking for click selection.
//!
//! The rendering layer turns the cursor into a world-space [`Ray`]; picking
//! then tests it against the world-space bounds of every visible instance
//! with loaded geometry and returns the closest hit. Instances without
//! geometry cannot be clicked, matching the fact that nothing is drawn for
//! them.

use cgmath::{InnerSpace, Vector3};

use crate::{
    data_structures::instance::{InstanceId, ModelInstance},
    resources::{Bounds, GeometryCache},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vector3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Distance along the ray to the box, if it is hit in front of the origin.
    pub fn intersect(&self, bounds: &Bounds) -> Option<f32> {
        let mut t_min = 0.0f32;
        let mut t_max = f32::INFINITY;
        for (origin, dir, min, max) in [
            (self.origin.x, self.direction.x, bounds.min.x, bounds.max.x),
            (self.origin.y, self.direction.y, bounds.min.y, bounds.max.y),
            (self.origin.z, self.direction.z, bounds.min.z, bounds.max.z),
        ] {
            if dir.abs() < f32::EPSILON {
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir;
            let (t0, t1) = {
                let a = (min - origin) * inv;
                let b = (max - origin) * inv;
                if a < b { (a, b) } else { (b, a) }
            };
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}

/// Result of a successful pick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pick {
    pub id: InstanceId,
    pub distance: f32,
}

/// World-space bounds of `instance`, if its model has geometry.
pub fn world_bounds(instance: &ModelInstance, geometry: &GeometryCache) -> Option<Bounds> {
    geometry
        .geometry(&instance.model_id)
        .map(|g| g.bounds.transformed(instance.pose().to_matrix()))
}

pub fn pick_instance(ray: &Ray, instances: &[ModelInstance], geometry: &GeometryCache) -> Option<Pick> {
    instances
        .iter()
        .filter(|instance| instance.is_visible)
        .filter_map(|instance| {
            let bounds = world_bounds(instance, geometry)?;
            ray.intersect(&bounds).map(|distance| Pick {
                id: instance.id,
                distance,
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}
