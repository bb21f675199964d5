//! The instance store: the single owner of committed instances and selection.
//!
//! Every operation is synchronous and total. Operations naming an id that is
//! not present do nothing and report it through their return value.

use cgmath::Vector3;

use crate::data_structures::instance::{
    InstanceId, InstancePatch, ModelInstance, NewInstance, Property,
};

/// Read access to instances and selection, the part of the store the gesture
/// controller is allowed to see.
pub trait InstanceView {
    fn instance(&self, id: InstanceId) -> Option<&ModelInstance>;
    fn selected(&self) -> Option<InstanceId>;
}

#[derive(Debug, Clone)]
pub struct InstanceStore {
    instances: Vec<ModelInstance>,
    selected: Option<InstanceId>,
    duplicate_offset: f32,
}

impl InstanceStore {
    pub fn new() -> Self {
        Self::with_duplicate_offset(0.5)
    }

    pub fn with_duplicate_offset(duplicate_offset: f32) -> Self {
        Self {
            instances: Vec::new(),
            selected: None,
            duplicate_offset,
        }
    }

    pub fn list(&self) -> &[ModelInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Append a new instance and select it.
    pub fn add(&mut self, new: NewInstance) -> InstanceId {
        let id = InstanceId::new();
        self.instances.push(new.with_id(id));
        self.selected = Some(id);
        log::debug!("added instance {}", id);
        id
    }

    /// Merge `patch` into the instance. Returns `false` if `id` is unknown.
    pub fn update(&mut self, id: InstanceId, patch: impl Into<InstancePatch>) -> bool {
        match self.instances.iter_mut().find(|instance| instance.id == id) {
            Some(instance) => {
                instance.apply(&patch.into());
                true
            }
            None => {
                log::debug!("update ignored, instance {} not found", id);
                false
            }
        }
    }

    pub fn update_property(&mut self, id: InstanceId, property: Property) -> bool {
        self.update(id, property)
    }

    /// Remove the instance, clearing the selection if it pointed at it.
    pub fn remove(&mut self, id: InstanceId) -> bool {
        let before = self.instances.len();
        self.instances.retain(|instance| instance.id != id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        let removed = self.instances.len() != before;
        if !removed {
            log::debug!("remove ignored, instance {} not found", id);
        }
        removed
    }

    /// Copy the instance under a fresh id, offset on X and Z, and select the copy.
    pub fn duplicate(&mut self, id: InstanceId) -> Option<InstanceId> {
        let Some(source) = self.instance(id) else {
            log::debug!("duplicate ignored, instance {} not found", id);
            return None;
        };
        let mut copy = source.clone();
        copy.id = InstanceId::new();
        copy.name = format!("{} (copy)", source.name);
        copy.position += Vector3::new(self.duplicate_offset, 0.0, self.duplicate_offset);
        let new_id = copy.id;
        self.instances.push(copy);
        self.selected = Some(new_id);
        Some(new_id)
    }

    /// Select an instance or clear the selection. Selecting an unknown id clears it.
    pub fn select(&mut self, id: Option<InstanceId>) {
        self.selected = id.filter(|id| self.instances.iter().any(|i| i.id == *id));
        if id.is_some() && self.selected.is_none() {
            log::debug!("select ignored, instance not found");
        }
    }

    /// Replace the whole instance list, keeping the given ids.
    pub fn replace_all(&mut self, instances: Vec<ModelInstance>) {
        self.instances = instances;
        if let Some(selected) = self.selected {
            if !self.instances.iter().any(|i| i.id == selected) {
                self.selected = None;
            }
        }
    }

    /// How many instances of `model_id` are placed.
    pub fn count_of(&self, model_id: &str) -> usize {
        self.instances
            .iter()
            .filter(|instance| instance.model_id == model_id)
            .count()
    }
}

impl Default for InstanceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceView for InstanceStore {
    fn instance(&self, id: InstanceId) -> Option<&ModelInstance> {
        self.instances.iter().find(|instance| instance.id == id)
    }

    fn selected(&self) -> Option<InstanceId> {
        self.selected
    }
}
