//! Render handoff.
//!
//! The editor never touches rendering primitives. Each frame it describes what
//! should be drawn with a [`Render`] tree; the rendering layer sorts it into
//! its pipelines with [`Render::into_batches`] and interprets the
//! [`Highlight`] tag packed into every [`InstanceRaw`].
//!
//! # Key types
//!
//! - [`Render<'a>`] is the description of one frame or part of it
//! - [`Instanced<'a>`] is one instance with its model and packed transform
//! - [`HandleGizmo`] is the set of transform handles around the selection

use cgmath::Vector3;

use crate::{
    data_structures::instance::{InstanceId, InstanceRaw},
    gesture::HandleSet,
    snap::SnapAxis,
};

/// Opacity of an instance while its drag is blocked.
pub const BLOCKED_OPACITY: f32 = 0.5;

/// Highlight state of one instance. Blocked always wins over selected.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Highlight {
    #[default]
    None = 0,
    Selected = 1,
    Blocked = 2,
}

/// One instance to draw with its model's geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct Instanced<'a> {
    pub id: InstanceId,
    pub model_id: &'a str,
    pub raw: InstanceRaw,
    pub highlight: Highlight,
}

/// Transform handles shown around the selected instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandleGizmo {
    pub target: InstanceId,
    pub position: Vector3<f32>,
    pub handles: HandleSet,
    /// Axis to draw the snap guide on, `None` while blocked.
    pub snap: SnapAxis,
}

/// Specifies what to draw.
///
/// - `None` draws nothing
/// - `Default(Instanced)` draws one opaque instance
/// - `Defaults(Vec<Instanced>)` draws a batch of opaque instances
/// - `Transparent(Instanced)` draws one translucent instance
/// - `Handles(HandleGizmo)` draws transform handles
/// - `Composed(Vec<Render>)` draws each part in turn
#[derive(Clone, Debug, PartialEq)]
pub enum Render<'a> {
    None,
    Default(Instanced<'a>),
    Defaults(Vec<Instanced<'a>>),
    Transparent(Instanced<'a>),
    Handles(HandleGizmo),
    Composed(Vec<Render<'a>>),
}

/// A [`Render`] tree sorted by pipeline.
#[derive(Debug, Default, PartialEq)]
pub struct RenderBatches<'a> {
    pub opaque: Vec<Instanced<'a>>,
    pub transparent: Vec<Instanced<'a>>,
    pub handles: Vec<HandleGizmo>,
}

impl<'a> RenderBatches<'a> {
    pub fn instance_count(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }

    pub fn find(&self, id: InstanceId) -> Option<&Instanced<'a>> {
        self.opaque
            .iter()
            .chain(self.transparent.iter())
            .find(|instanced| instanced.id == id)
    }
}

impl<'a> Render<'a> {
    pub fn into_batches(self) -> RenderBatches<'a> {
        let mut batches = RenderBatches::default();
        self.set_pipelines(
            &mut batches.opaque,
            &mut batches.transparent,
            &mut batches.handles,
        );
        batches
    }

    fn set_pipelines(
        self,
        opaque: &mut Vec<Instanced<'a>>,
        trans: &mut Vec<Instanced<'a>>,
        handles: &mut Vec<HandleGizmo>,
    ) {
        match self {
            Render::Default(instanced) => opaque.push(instanced),
            Render::Defaults(mut vec) => opaque.append(&mut vec),
            Render::Transparent(instanced) => trans.push(instanced),
            Render::Handles(gizmo) => handles.push(gizmo),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(opaque, trans, handles)),
            Render::None => (),
        }
    }
}
