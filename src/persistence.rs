//! Scene snapshots exchanged with the persistence collaborator.
//!
//! A snapshot is the instance list plus the room dimensions. The editor only
//! captures and restores snapshots; where they are stored is not its concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    data_structures::{
        instance::ModelInstance,
        room::{Room, RoomDimensions},
    },
    store::InstanceStore,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteriorScene {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub instances: Vec<ModelInstance>,
    pub room_dimensions: RoomDimensions,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl InteriorScene {
    pub fn capture(
        store: &InstanceStore,
        room: &Room,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description,
            instances: store.list().to_vec(),
            room_dimensions: room.dimensions(),
            created: now,
            modified: now,
        }
    }

    /// Replace the store's instances and the room's dimensions with this
    /// snapshot. Selection is cleared and `modified` bumped.
    pub fn restore(&mut self, store: &mut InstanceStore, room: &mut Room) {
        store.replace_all(self.instances.clone());
        store.select(None);
        room.set_dimensions(self.room_dimensions);
        self.modified = Utc::now();
        log::info!(
            "loaded scene `{}` with {} instances",
            self.name,
            self.instances.len()
        );
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
