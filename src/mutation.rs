//! The write seam between a finished gesture and the store.

use crate::{
    data_structures::instance::{InstanceId, PoseUpdate},
    store::{InstanceStore, InstanceView},
};

/// What the gesture controller may do to committed state: read it, and write
/// back a pose once the gesture is over.
pub trait InstanceMutation: InstanceView {
    /// Returns `false` when `id` no longer exists.
    fn commit(&mut self, id: InstanceId, update: PoseUpdate) -> bool;
}

impl InstanceMutation for InstanceStore {
    fn commit(&mut self, id: InstanceId, update: PoseUpdate) -> bool {
        self.update(id, update)
    }
}
