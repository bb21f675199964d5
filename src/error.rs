//! Error types shared across the editor.
//!
//! Nothing in this crate is fatal: store operations on missing ids return
//! sentinels, failed geometry loads are recorded per model and a rejected
//! pointer-down simply leaves the controller idle. The enums below carry the
//! reason so callers can log or display it.

use std::path::PathBuf;

use thiserror::Error;

use crate::data_structures::instance::InstanceId;

/// Why the model repository could not produce geometry for a model.
#[derive(Debug, Error)]
pub enum LoadFailure {
    #[error("model `{0}` is not part of the catalog")]
    UnknownModel(String),
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("obj could not be parsed: {0}")]
    Obj(#[from] tobj::LoadError),
    #[error("gltf could not be parsed: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("unsupported model format `{0}`")]
    UnsupportedFormat(String),
    #[error("model `{0}` contains no vertices")]
    EmptyGeometry(String),
}

/// Returned by [`crate::gesture::TransformGestureController::begin`] when a
/// pointer-down does not open a gesture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GestureRejected {
    #[error("instance {0} does not exist")]
    NotFound(InstanceId),
    #[error("instance {0} is not selected")]
    NotSelected(InstanceId),
    #[error("instance {0} is locked")]
    Locked(InstanceId),
    #[error("instance {0} is not drawn, so it has no handles")]
    NotRendered(InstanceId),
    #[error("no such handle is shown in the current edit mode")]
    HandleHidden,
    #[error("a gesture on {0} is already in progress")]
    SessionActive(InstanceId),
}
