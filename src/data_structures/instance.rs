//! Placed model instances and the patches that modify them.
//!
//! A [`ModelInstance`] is the committed state of one object in the room. The
//! store owns them; everything else works on copies or on the patch types
//! defined here. [`InstanceRaw`] is the packed form handed to the renderer.

use std::fmt;

use cgmath::{Euler, Quaternion, Rad, SquareMatrix, Vector3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::render::Highlight;

/// Identifier of a placed instance. Minted once, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Position, rotation (euler radians per axis) and per-axis scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Pose {
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn quaternion(&self) -> Quaternion<f32> {
        Quaternion::from(Euler {
            x: Rad(self.rotation.x),
            y: Rad(self.rotation.y),
            z: Rad(self.rotation.z),
        })
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.quaternion())
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self, highlight: Highlight, opacity: f32) -> InstanceRaw {
        let world_matrix = self.to_matrix();
        InstanceRaw {
            model: world_matrix.into(),
            normal: cgmath::Matrix3::from(self.quaternion()).into(),
            handedness: world_matrix.determinant().signum(),
            highlight: highlight as u32,
            opacity,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vector3<f32>> for Pose {
    fn from(position: Vector3<f32>) -> Self {
        Pose {
            position,
            ..Default::default()
        }
    }
}

/// One placed object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInstance {
    pub id: InstanceId,
    pub model_id: String,
    pub name: String,
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub is_visible: bool,
    pub is_locked: bool,
}

impl ModelInstance {
    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    pub(crate) fn apply(&mut self, patch: &InstancePatch) {
        if let Some(model_id) = &patch.model_id {
            self.model_id = model_id.clone();
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(scale) = patch.scale {
            self.scale = scale;
        }
        if let Some(is_visible) = patch.is_visible {
            self.is_visible = is_visible;
        }
        if let Some(is_locked) = patch.is_locked {
            self.is_locked = is_locked;
        }
    }
}

/// Everything but the id: the input of [`crate::store::InstanceStore::add`].
#[derive(Clone, Debug, PartialEq)]
pub struct NewInstance {
    pub model_id: String,
    pub name: String,
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub is_visible: bool,
    pub is_locked: bool,
}

impl NewInstance {
    pub fn new(model_id: impl Into<String>, name: impl Into<String>) -> Self {
        let pose = Pose::new();
        Self {
            model_id: model_id.into(),
            name: name.into(),
            position: pose.position,
            rotation: pose.rotation,
            scale: pose.scale,
            is_visible: true,
            is_locked: false,
        }
    }

    pub fn at(mut self, position: Vector3<f32>) -> Self {
        self.position = position;
        self
    }

    pub(crate) fn with_id(self, id: InstanceId) -> ModelInstance {
        ModelInstance {
            id,
            model_id: self.model_id,
            name: self.name,
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
            is_visible: self.is_visible,
            is_locked: self.is_locked,
        }
    }
}

/// A partial update. `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstancePatch {
    pub model_id: Option<String>,
    pub name: Option<String>,
    pub position: Option<Vector3<f32>>,
    pub rotation: Option<Vector3<f32>>,
    pub scale: Option<Vector3<f32>>,
    pub is_visible: Option<bool>,
    pub is_locked: Option<bool>,
}

/// A single-field update as sent by a properties panel.
#[derive(Clone, Debug, PartialEq)]
pub enum Property {
    ModelId(String),
    Name(String),
    Position(Vector3<f32>),
    Rotation(Vector3<f32>),
    Scale(Vector3<f32>),
    Visible(bool),
    Locked(bool),
}

impl From<Property> for InstancePatch {
    fn from(property: Property) -> Self {
        let mut patch = InstancePatch::default();
        match property {
            Property::ModelId(model_id) => patch.model_id = Some(model_id),
            Property::Name(name) => patch.name = Some(name),
            Property::Position(position) => patch.position = Some(position),
            Property::Rotation(rotation) => patch.rotation = Some(rotation),
            Property::Scale(scale) => patch.scale = Some(scale),
            Property::Visible(visible) => patch.is_visible = Some(visible),
            Property::Locked(locked) => patch.is_locked = Some(locked),
        }
        patch
    }
}

/// Pose fields a finished gesture writes back.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PoseUpdate {
    pub position: Option<Vector3<f32>>,
    pub rotation: Option<Vector3<f32>>,
    pub scale: Option<Vector3<f32>>,
}

impl From<PoseUpdate> for InstancePatch {
    fn from(update: PoseUpdate) -> Self {
        InstancePatch {
            position: update.position,
            rotation: update.rotation,
            scale: update.scale,
            ..Default::default()
        }
    }
}

/**
 * The packed per-instance record the rendering layer uploads. `highlight`
 * carries the [`Highlight`] discriminant and `opacity` drops below one while
 * a drag is blocked.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 3]; 3],
    pub handedness: f32,
    pub highlight: u32,
    pub opacity: f32,
}
