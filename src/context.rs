//! Editor configuration and the runtime context that carries it.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use cgmath::Vector3;
use instant::Duration;
use serde::{Deserialize, Serialize};

use crate::{collision::CollisionPolicy, data_structures::room::Room, snap::SnapConfig};

/// Tunables of the editor. Every field has a default, so a config file only
/// needs the values it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub snap: SnapConfig,
    pub collision: CollisionPolicy,
    /// Added to X and Z of a duplicate.
    pub duplicate_offset: f32,
    /// Where instances created from the catalog appear.
    pub spawn_position: Vector3<f32>,
    pub room: Room,
    pub asset_root: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap: SnapConfig::default(),
            collision: CollisionPolicy::default(),
            duplicate_offset: 0.5,
            spawn_position: Vector3::new(0.0, 0.01, 0.0),
            room: Room::default(),
            asset_root: PathBuf::from("./assets"),
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading editor config {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("parsing editor config {}", path.display()))
    }
}

/// Runtime state owned by the frame loop rather than by the scene.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: EditorConfig,
    /// Number of frames produced so far.
    pub frame: u64,
    /// Time between the last two frames.
    pub delta: Duration,
}

impl Context {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            frame: 0,
            delta: Duration::from_millis(0),
        }
    }
}
