//! furnish-ngin
//!
//! The placement engine of an interactive room editor. It turns pointer-driven
//! transform gestures on furniture-like instances into validated, snapped and
//! collision-checked poses and commits them to a single instance store. The
//! rendering layer, UI widgets and storage stay outside; the crate hands them
//! data (a render description, commands, scene snapshots) and consumes model
//! geometry and recommendations through async collaborator traits.
//!
//! High-level modules
//! - `context`: editor configuration and the runtime context
//! - `data_structures`: instances, catalog models, the room and scene snapshots
//! - `store`: the instance store, owner of committed state and selection
//! - `spatial`: proximity queries over the occupied space
//! - `collision`: height-aware proximity collision verdicts
//! - `snap`: single-axis snapping on the floor plane
//! - `gesture`: the transform gesture state machine and handle policy
//! - `mutation`: the write seam between gestures and the store
//! - `flow`: the headless frame loop with async collaborators
//! - `pick`: ray picking for click selection
//! - `resources`: model repository, geometry loading and caching
//! - `persistence`: scene snapshots for the persistence collaborator
//! - `recommend`: the recommendation collaborator
//! - `render`: render description handed to the rendering layer
//!

pub mod collision;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod gesture;
pub mod mutation;
pub mod persistence;
pub mod pick;
pub mod recommend;
pub mod render;
pub mod resources;
pub mod snap;
pub mod spatial;
pub mod store;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use data_structures::instance::{InstanceId, ModelInstance, Pose};
pub use flow::{Command, EditorApp, PointerEvent, PointerReply, Reply};
