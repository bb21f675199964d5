#![allow(dead_code)]

use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration, Instant},
};

use furnish_ngin::{
    EditorApp, InstanceId, ModelInstance,
    context::EditorConfig,
    data_structures::{
        instance::{NewInstance, PoseUpdate},
        model::{Category, Model, ModelCatalog},
        room::Room,
        scene_graph::SceneSnapshot,
    },
    error::LoadFailure,
    mutation::InstanceMutation,
    persistence::InteriorScene,
    recommend::{Recommendation, RecommendationService},
    resources::{Bounds, Geometry, ModelRepository},
    store::{InstanceStore, InstanceView},
};
use futures::future::BoxFuture;

pub fn v(x: f32, y: f32, z: f32) -> cgmath::Vector3<f32> {
    cgmath::Vector3::new(x, y, z)
}

pub fn unit_geometry() -> Geometry {
    Geometry {
        bounds: Bounds::new(v(-0.5, 0.0, -0.5), v(0.5, 1.0, 0.5)),
        vertex_count: 8,
        mesh_count: 1,
    }
}

/// A room of the default size (9.1 x 3 x 9.1): walls on x = ±4.55 and z = ±4.55.
pub fn room() -> Room {
    Room::default()
}

/// Store with one instance per position, all visible and unlocked. The last
/// one added is selected.
pub fn store_with(positions: &[cgmath::Vector3<f32>]) -> (InstanceStore, Vec<InstanceId>) {
    let mut store = InstanceStore::new();
    let ids = positions
        .iter()
        .enumerate()
        .map(|(i, p)| store.add(NewInstance::new("cube", format!("Cube {}", i + 1)).at(*p)))
        .collect();
    (store, ids)
}

/// Snapshot in which every instance has geometry.
pub fn snapshot(room: &Room, store: &InstanceStore) -> SceneSnapshot {
    SceneSnapshot::capture(room, store.list(), |_| true)
}

/// Wraps a store and records every commit the gesture controller makes.
pub struct RecordingMutation {
    pub store: InstanceStore,
    pub commits: Vec<(InstanceId, PoseUpdate)>,
}

impl RecordingMutation {
    pub fn new(store: InstanceStore) -> Self {
        Self {
            store,
            commits: Vec::new(),
        }
    }

    pub fn get(&self, id: InstanceId) -> &ModelInstance {
        self.store
            .instance(id)
            .expect("instance should still be in the store")
    }
}

impl InstanceView for RecordingMutation {
    fn instance(&self, id: InstanceId) -> Option<&ModelInstance> {
        self.store.instance(id)
    }

    fn selected(&self) -> Option<InstanceId> {
        self.store.selected()
    }
}

impl InstanceMutation for RecordingMutation {
    fn commit(&mut self, id: InstanceId, update: PoseUpdate) -> bool {
        self.commits.push((id, update));
        self.store.commit(id, update)
    }
}

pub fn catalog() -> ModelCatalog {
    ModelCatalog::new(vec![
        Model::new("cube", "Cube", Category::Furniture, "/models/cube.obj")
            .with_tags(["living room", "bedroom"]),
        Model::new("table", "Dining Table", Category::Furniture, "/models/table.obj")
            .with_tags(["kitchen"]),
        Model::new("sofa", "Modern Sofa", Category::Furniture, "/models/sofa.glb")
            .with_tags(["living room"])
            .with_scale(v(1.2, 1.0, 1.2)),
        Model::new("broken", "Broken Lamp", Category::Lighting, "/models/broken.glb"),
    ])
}

/// Resolves every path to a unit box except the ones listed as failing.
pub struct StaticRepository {
    failing: HashSet<String>,
    delay: Duration,
}

impl StaticRepository {
    pub fn new<I: IntoIterator<Item = &'static str>>(failing: I) -> Self {
        Self {
            failing: failing.into_iter().map(str::to_string).collect(),
            delay: Duration::from_millis(5),
        }
    }
}

impl ModelRepository for StaticRepository {
    fn resolve(&self, model_path: &str) -> BoxFuture<'static, Result<Geometry, LoadFailure>> {
        let fails = self.failing.contains(model_path);
        let path = model_path.to_string();
        let delay = self.delay;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            if fails {
                Err(LoadFailure::UnsupportedFormat(path))
            } else {
                Ok(unit_geometry())
            }
        })
    }
}

/// Always suggests the same position and recommends every model with the area tag.
pub struct FixedRecommender(pub cgmath::Vector3<f32>);

impl RecommendationService for FixedRecommender {
    fn get_recommendations(
        &self,
        _scene: &InteriorScene,
        area: &str,
        models: &[Model],
    ) -> BoxFuture<'static, Vec<Recommendation>> {
        let recommendation = Recommendation {
            area: area.to_string(),
            models: models.iter().filter(|m| m.has_tag(area)).cloned().collect(),
            reason: "fits".to_string(),
            score: 0.9,
        };
        Box::pin(async move { vec![recommendation] })
    }

    fn suggest_position(
        &self,
        _scene: &InteriorScene,
        _model_id: &str,
    ) -> BoxFuture<'static, cgmath::Vector3<f32>> {
        let position = self.0;
        Box::pin(async move { position })
    }
}

pub fn app() -> EditorApp {
    EditorApp::new(
        EditorConfig::default(),
        catalog(),
        Arc::new(StaticRepository::new(["/models/broken.glb"])),
        Arc::new(FixedRecommender(v(1.0, 0.0, -1.0))),
    )
    .expect("editor should start")
}

/// Run frames until `done` holds or two seconds pass.
pub fn pump<F: Fn(&EditorApp) -> bool>(app: &mut EditorApp, done: F) -> bool {
    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(2) {
        let _ = app.frame();
        if done(app) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    false
}
