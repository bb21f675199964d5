//! Editor data structures: instances, models, the room and scene snapshots.
//!
//! - `instance` holds placed instances, their ids, patches and the packed render record
//! - `model` contains catalog entries and the catalog itself
//! - `room` describes the enclosure and derives its walls
//! - `scene_graph` builds the per-frame snapshot of occupied space

pub mod instance;
pub mod model;
pub mod room;
pub mod scene_graph;
