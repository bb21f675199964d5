//! Model repository: turns a model path into the geometry the editor needs.
//!
//! Loading is asynchronous and may fail. Results are kept per model id in a
//! [`GeometryCache`]; a model that failed stays failed, and its instances
//! render nothing and take up no space.

use std::{
    collections::HashMap,
    io::{BufReader, Cursor},
    path::{Path, PathBuf},
};

use futures::future::BoxFuture;

use crate::error::LoadFailure;

pub mod mesh;

pub use mesh::{Bounds, Geometry};

/// Resolves a model path into geometry.
pub trait ModelRepository: Send + Sync {
    fn resolve(&self, model_path: &str) -> BoxFuture<'static, Result<Geometry, LoadFailure>>;
}

/// Reads `.obj`, `.gltf` and `.glb` files below a root directory.
#[derive(Debug, Clone)]
pub struct AssetRepository {
    root: PathBuf,
}

impl AssetRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ModelRepository for AssetRepository {
    fn resolve(&self, model_path: &str) -> BoxFuture<'static, Result<Geometry, LoadFailure>> {
        let root = self.root.clone();
        let model_path = model_path.to_string();
        Box::pin(async move { load_model(&root, &model_path).await })
    }
}

/// Catalog paths are written app-relative (`/models/sofa.glb`).
fn asset_path(root: &Path, file_name: &str) -> PathBuf {
    root.join(file_name.trim_start_matches('/'))
}

pub async fn load_binary(root: &Path, file_name: &str) -> Result<Vec<u8>, LoadFailure> {
    let path = asset_path(root, file_name);
    tokio::fs::read(&path)
        .await
        .map_err(|source| LoadFailure::Io { path, source })
}

pub async fn load_model(root: &Path, file_name: &str) -> Result<Geometry, LoadFailure> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "obj" => load_model_obj(root, file_name).await,
        "gltf" | "glb" => load_model_gltf(root, file_name).await,
        _ => Err(LoadFailure::UnsupportedFormat(file_name.to_string())),
    }
}

pub async fn load_model_obj(root: &Path, file_name: &str) -> Result<Geometry, LoadFailure> {
    let obj_bytes = load_binary(root, file_name).await?;
    let mut obj_reader = BufReader::new(Cursor::new(obj_bytes));

    // Materials only matter to the renderer.
    let (models, _materials) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| async move {
            let skipped: tobj::MTLLoadResult = Err(tobj::LoadError::OpenFileFailed);
            skipped
        },
    )
    .await?;

    mesh::geometry_from_obj(&models, file_name)
}

pub async fn load_model_gltf(root: &Path, file_name: &str) -> Result<Geometry, LoadFailure> {
    let gltf_bytes = load_binary(root, file_name).await?;
    let gltf = gltf::Gltf::from_slice(&gltf_bytes)?;

    let parent = Path::new(file_name.trim_start_matches('/'))
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            // buffer_data is indexed by buffer.index(), so nothing may be skipped
            gltf::buffer::Source::Bin => match gltf.blob.as_deref() {
                Some(blob) => buffer_data.push(blob.to_vec()),
                None => {
                    return Err(LoadFailure::UnsupportedFormat(format!(
                        "{file_name}: missing binary chunk"
                    )));
                }
            },
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                return Err(LoadFailure::UnsupportedFormat(format!(
                    "{file_name}: embedded buffer"
                )));
            }
            gltf::buffer::Source::Uri(uri) => {
                let relative = parent.join(uri);
                let bin = load_binary(root, &relative.to_string_lossy()).await?;
                buffer_data.push(bin);
            }
        }
    }

    mesh::geometry_from_gltf(&gltf.document, &buffer_data, file_name)
}

#[derive(Debug)]
pub enum GeometryState {
    Pending,
    Loaded(Geometry),
    Failed(LoadFailure),
}

/// Resolution state per model id.
#[derive(Debug, Default)]
pub struct GeometryCache {
    entries: HashMap<String, GeometryState>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `model_id` as requested. Returns `false` if it already was.
    pub fn request(&mut self, model_id: &str) -> bool {
        if self.entries.contains_key(model_id) {
            return false;
        }
        self.entries
            .insert(model_id.to_string(), GeometryState::Pending);
        true
    }

    pub fn insert(&mut self, model_id: &str, result: Result<Geometry, LoadFailure>) {
        let state = match result {
            Ok(geometry) => GeometryState::Loaded(geometry),
            Err(e) => {
                log::warn!("Model {} could not be loaded and will not be shown: {}", model_id, e);
                GeometryState::Failed(e)
            }
        };
        self.entries.insert(model_id.to_string(), state);
    }

    pub fn state(&self, model_id: &str) -> Option<&GeometryState> {
        self.entries.get(model_id)
    }

    pub fn geometry(&self, model_id: &str) -> Option<&Geometry> {
        match self.entries.get(model_id) {
            Some(GeometryState::Loaded(geometry)) => Some(geometry),
            _ => None,
        }
    }

    pub fn is_loaded(&self, model_id: &str) -> bool {
        self.geometry(model_id).is_some()
    }

    pub fn is_failed(&self, model_id: &str) -> bool {
        matches!(self.entries.get(model_id), Some(GeometryState::Failed(_)))
    }
}
