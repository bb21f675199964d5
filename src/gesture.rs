//! Transform gestures: one press, drag and release on a transform handle.
//!
//! The controller is a small state machine:
//!
//! ```text
//! Idle --pointer down--> Dragging --release--> Committing | Reverting --> Idle
//! ```
//!
//! While dragging in a translating mode every frame first snaps the candidate
//! on the floor plane and then checks the snapped position for collisions.
//! Rotate and scale gestures are never blocked. On release a blocked candidate
//! is thrown away and the pose captured at pointer-down is written back, so a
//! finished gesture always notifies the mutation API exactly once.
//!
//! The controller holds no reference to the store. Reads and the final write
//! go through the collaborators passed to each call.

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    collision::{CollisionEvaluator, CollisionPolicy},
    data_structures::instance::{InstanceId, Pose, PoseUpdate},
    error::GestureRejected,
    mutation::InstanceMutation,
    render::Highlight,
    snap::{SnapAxis, SnapConfig, SnapResult, SnapSolver},
    spatial::SpatialIndex,
    store::InstanceView,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformMode {
    #[default]
    Translate,
    Rotate,
    Scale,
    /// Translate and rotate handles shown together.
    Combined,
}

impl TransformMode {
    pub fn translates(&self) -> bool {
        matches!(self, TransformMode::Translate | TransformMode::Combined)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Translate,
    Rotate,
    Scale,
}

/// The handle a pointer-down landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    pub kind: HandleKind,
    pub axis: Axis,
}

impl Handle {
    pub fn new(kind: HandleKind, axis: Axis) -> Self {
        Self { kind, axis }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AxisSet {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl AxisSet {
    pub const NONE: AxisSet = AxisSet { x: false, y: false, z: false };
    pub const ALL: AxisSet = AxisSet { x: true, y: true, z: true };

    pub fn contains(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

/// Which handles are drawn for a mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandleSet {
    pub translate: AxisSet,
    pub rotate: AxisSet,
    pub scale: AxisSet,
}

impl HandleSet {
    pub fn for_mode(mode: TransformMode) -> Self {
        let yaw = AxisSet { x: false, y: true, z: false };
        match mode {
            // objects stay on the floor
            TransformMode::Translate => HandleSet {
                translate: AxisSet { x: true, y: false, z: true },
                rotate: AxisSet::NONE,
                scale: AxisSet::NONE,
            },
            TransformMode::Rotate => HandleSet {
                translate: AxisSet::NONE,
                rotate: yaw,
                scale: AxisSet::NONE,
            },
            TransformMode::Scale => HandleSet {
                translate: AxisSet::NONE,
                rotate: AxisSet::NONE,
                scale: AxisSet::ALL,
            },
            TransformMode::Combined => HandleSet {
                translate: AxisSet::ALL,
                rotate: yaw,
                scale: AxisSet::NONE,
            },
        }
    }

    pub fn contains(&self, handle: Handle) -> bool {
        let set = match handle.kind {
            HandleKind::Translate => self.translate,
            HandleKind::Rotate => self.rotate,
            HandleKind::Scale => self.scale,
        };
        set.contains(handle.axis)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GesturePhase {
    #[default]
    Idle,
    Dragging,
    Committing,
    Reverting,
}

/// State of the one active gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureSession {
    pub target: InstanceId,
    pub mode: TransformMode,
    pub handle: Handle,
    pub last_valid_position: Vector3<f32>,
    pub last_valid_rotation: Vector3<f32>,
    /// The pose shown while dragging, post-snap.
    pub candidate: Pose,
    pub phase: GesturePhase,
    pub has_collision: bool,
    pub is_snapped: bool,
    pub snap_axis: SnapAxis,
}

impl GestureSession {
    pub fn is_dragging(&self) -> bool {
        self.phase == GesturePhase::Dragging
    }

    pub fn feedback(&self) -> Feedback {
        if self.has_collision {
            Feedback {
                highlight: Highlight::Blocked,
                translucent: true,
                snap: SnapAxis::None,
            }
        } else {
            Feedback {
                highlight: Highlight::Selected,
                translucent: false,
                snap: self.snap_axis,
            }
        }
    }

    fn reverted_pose(&self) -> PoseUpdate {
        PoseUpdate {
            position: Some(self.last_valid_position),
            rotation: Some(self.last_valid_rotation),
            scale: None,
        }
    }

    fn accepted_pose(&self) -> PoseUpdate {
        let c = self.candidate;
        match self.mode {
            TransformMode::Translate => PoseUpdate {
                position: Some(c.position),
                ..Default::default()
            },
            TransformMode::Rotate => PoseUpdate {
                rotation: Some(c.rotation),
                ..Default::default()
            },
            TransformMode::Scale => PoseUpdate {
                scale: Some(c.scale),
                ..Default::default()
            },
            TransformMode::Combined => PoseUpdate {
                position: Some(c.position),
                rotation: Some(c.rotation),
                scale: None,
            },
        }
    }
}

/// Live visual state of the dragged instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Feedback {
    pub highlight: Highlight,
    pub translucent: bool,
    pub snap: SnapAxis,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevertReason {
    Blocked,
    TargetMissing,
    Deselected,
    Locked,
}

/// How a gesture ended and what was written back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureOutcome {
    Committed {
        target: InstanceId,
        update: PoseUpdate,
    },
    Reverted {
        target: InstanceId,
        update: PoseUpdate,
        reason: RevertReason,
    },
}

impl GestureOutcome {
    pub fn target(&self) -> InstanceId {
        match self {
            GestureOutcome::Committed { target, .. } | GestureOutcome::Reverted { target, .. } => {
                *target
            }
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, GestureOutcome::Committed { .. })
    }

    /// The phase the session passed through on its way back to idle.
    pub fn phase(&self) -> GesturePhase {
        match self {
            GestureOutcome::Committed { .. } => GesturePhase::Committing,
            GestureOutcome::Reverted { .. } => GesturePhase::Reverting,
        }
    }
}

/// Result of feeding one frame of pointer motion to the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragFrame {
    /// No session was active.
    Idle,
    Dragging(Feedback),
    /// The target became invalid and the gesture was reverted.
    Ended(GestureOutcome),
}

#[derive(Debug, Clone)]
pub struct TransformGestureController {
    mode: TransformMode,
    snap: SnapConfig,
    snapper: SnapSolver,
    collision: CollisionEvaluator,
    session: Option<GestureSession>,
}

impl TransformGestureController {
    pub fn new(snap: SnapConfig, policy: CollisionPolicy) -> Self {
        Self {
            mode: TransformMode::default(),
            snap,
            snapper: SnapSolver,
            collision: CollisionEvaluator::new(policy),
            session: None,
        }
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    /// Takes effect for the next gesture; an active one keeps its mode.
    pub fn set_mode(&mut self, mode: TransformMode) {
        self.mode = mode;
    }

    pub fn set_snap(&mut self, snap: SnapConfig) {
        self.snap = snap;
    }

    pub fn set_policy(&mut self, policy: CollisionPolicy) {
        self.collision.policy = policy;
    }

    pub fn handles(&self) -> HandleSet {
        HandleSet::for_mode(self.session.as_ref().map_or(self.mode, |s| s.mode))
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> GesturePhase {
        self.session.as_ref().map_or(GesturePhase::Idle, |s| s.phase)
    }

    pub fn is_dragging(&self) -> bool {
        self.session.as_ref().is_some_and(GestureSession::is_dragging)
    }

    /// Highlight of `id` given the store's current selection.
    pub fn highlight(&self, id: InstanceId, selected: Option<InstanceId>) -> Highlight {
        match &self.session {
            Some(session) if session.target == id => session.feedback().highlight,
            _ if selected == Some(id) => Highlight::Selected,
            _ => Highlight::None,
        }
    }

    /// Pointer-down on `handle` of `target`.
    pub fn begin<V: InstanceView + ?Sized>(
        &mut self,
        view: &V,
        target: InstanceId,
        handle: Handle,
    ) -> Result<(), GestureRejected> {
        if let Some(active) = &self.session {
            log::debug!("pointer-down ignored, gesture on {} in progress", active.target);
            return Err(GestureRejected::SessionActive(active.target));
        }
        let instance = view.instance(target).ok_or(GestureRejected::NotFound(target))?;
        if view.selected() != Some(target) {
            return Err(GestureRejected::NotSelected(target));
        }
        if instance.is_locked {
            return Err(GestureRejected::Locked(target));
        }
        if !instance.is_visible {
            return Err(GestureRejected::NotRendered(target));
        }
        if !HandleSet::for_mode(self.mode).contains(handle) {
            return Err(GestureRejected::HandleHidden);
        }

        log::debug!("gesture on {} started in {:?} mode", target, self.mode);
        self.session = Some(GestureSession {
            target,
            mode: self.mode,
            handle,
            last_valid_position: instance.position,
            last_valid_rotation: instance.rotation,
            candidate: instance.pose(),
            phase: GesturePhase::Dragging,
            has_collision: false,
            is_snapped: false,
            snap_axis: SnapAxis::None,
        });
        Ok(())
    }

    /// One frame of motion with the pose currently read from the handle.
    pub fn drag<M, I>(&mut self, api: &mut M, index: &I, candidate: Pose) -> DragFrame
    where
        M: InstanceMutation + ?Sized,
        I: SpatialIndex + ?Sized,
    {
        if self.session.is_none() {
            return DragFrame::Idle;
        }
        if let Some(outcome) = self.revert_if_invalid(api) {
            return DragFrame::Ended(outcome);
        }
        let snap = self.snap;
        let snapper = self.snapper;
        let collision = self.collision;
        let Some(session) = self.session.as_mut() else {
            return DragFrame::Idle;
        };

        match session.mode {
            TransformMode::Translate | TransformMode::Combined => {
                let snapped = if snap.enabled {
                    snapper.snap(index, candidate.position, snap.threshold, Some(session.target))
                } else {
                    SnapResult {
                        position: candidate.position,
                        axis: SnapAxis::None,
                    }
                };
                session.candidate.position = snapped.position;
                if session.mode == TransformMode::Combined {
                    session.candidate.rotation = candidate.rotation;
                }
                session.is_snapped = snapped.is_snapped();
                session.snap_axis = snapped.axis;
                session.has_collision =
                    collision.evaluate(index, snapped.position, Some(session.target));
                log::trace!(
                    "drag {} to {:?} snapped={:?} blocked={}",
                    session.target,
                    snapped.position,
                    snapped.axis,
                    session.has_collision
                );
            }
            TransformMode::Rotate => session.candidate.rotation = candidate.rotation,
            TransformMode::Scale => session.candidate.scale = candidate.scale,
        }
        DragFrame::Dragging(session.feedback())
    }

    /// Pointer-up. Commits the candidate or writes back the pose captured at
    /// pointer-down. Returns `None` if no gesture was active.
    pub fn release<M, I>(&mut self, api: &mut M, index: &I) -> Option<GestureOutcome>
    where
        M: InstanceMutation + ?Sized,
        I: SpatialIndex + ?Sized,
    {
        self.session.as_ref()?;
        if let Some(outcome) = self.revert_if_invalid(api) {
            return Some(outcome);
        }
        let mut session = self.session.take()?;

        if session.mode.translates() {
            session.has_collision = self.collision.evaluate(
                index,
                session.candidate.position,
                Some(session.target),
            );
        }

        let outcome = if session.has_collision {
            Self::finish_revert(api, &session, RevertReason::Blocked)
        } else {
            let update = session.accepted_pose();
            api.commit(session.target, update);
            log::info!("gesture on {} committed", session.target);
            GestureOutcome::Committed {
                target: session.target,
                update,
            }
        };
        Some(outcome)
    }

    /// Drops the active gesture without writing anything back, for when the
    /// committed state it was captured from has been replaced.
    pub fn abandon(&mut self) -> Option<GestureSession> {
        let session = self.session.take()?;
        log::info!("gesture on {} abandoned", session.target);
        Some(session)
    }

    fn revert_if_invalid<M: InstanceMutation + ?Sized>(
        &mut self,
        api: &mut M,
    ) -> Option<GestureOutcome> {
        let session = self.session.as_ref()?;
        let reason = match api.instance(session.target) {
            None => RevertReason::TargetMissing,
            Some(_) if api.selected() != Some(session.target) => RevertReason::Deselected,
            Some(instance) if instance.is_locked => RevertReason::Locked,
            Some(_) => return None,
        };
        let session = self.session.take()?;
        Some(Self::finish_revert(api, &session, reason))
    }

    fn finish_revert<M: InstanceMutation + ?Sized>(
        api: &mut M,
        session: &GestureSession,
        reason: RevertReason,
    ) -> GestureOutcome {
        let update = session.reverted_pose();
        api.commit(session.target, update);
        log::info!("gesture on {} reverted: {:?}", session.target, reason);
        GestureOutcome::Reverted {
            target: session.target,
            update,
            reason,
        }
    }
}

impl Default for TransformGestureController {
    fn default() -> Self {
        Self::new(SnapConfig::default(), CollisionPolicy::default())
    }
}
