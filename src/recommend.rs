//! Placement recommendations.
//!
//! The editor treats the recommendation service as an advisor: calls are
//! asynchronous, never awaited inside a frame, and what comes back is handled
//! like any other request to add an instance.

use std::time::Duration;

use cgmath::Vector3;
use futures::future::BoxFuture;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{data_structures::model::Model, persistence::InteriorScene};

/// A group of models suggested for one area of the room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub area: String,
    pub models: Vec<Model>,
    pub reason: String,
    pub score: f32,
}

pub trait RecommendationService: Send + Sync {
    fn get_recommendations(
        &self,
        scene: &InteriorScene,
        area: &str,
        models: &[Model],
    ) -> BoxFuture<'static, Vec<Recommendation>>;

    fn suggest_position(&self, scene: &InteriorScene, model_id: &str) -> BoxFuture<'static, Vector3<f32>>;
}

/**
 * Recommends catalog models tagged with the requested area and suggests
 * random floor positions inside the central 60% of the room. `latency`
 * simulates a remote service.
 */
#[derive(Debug, Clone, Default)]
pub struct CatalogRecommender {
    pub latency: Duration,
}

impl CatalogRecommender {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl RecommendationService for CatalogRecommender {
    fn get_recommendations(
        &self,
        _scene: &InteriorScene,
        area: &str,
        models: &[Model],
    ) -> BoxFuture<'static, Vec<Recommendation>> {
        let matching: Vec<Model> = models.iter().filter(|m| m.has_tag(area)).cloned().collect();
        let area = area.to_string();
        let latency = self.latency;
        Box::pin(async move {
            tokio::time::sleep(latency).await;
            let first = matching.iter().take(3).cloned().collect();
            let second = matching.iter().skip(3).take(3).cloned().collect();
            vec![
                Recommendation {
                    reason: format!("Contemporary pieces that suit the {area}."),
                    area: area.clone(),
                    models: first,
                    score: 0.95,
                },
                Recommendation {
                    reason: format!("Minimal items that fit the {area}."),
                    area,
                    models: second,
                    score: 0.87,
                },
            ]
        })
    }

    fn suggest_position(&self, scene: &InteriorScene, _model_id: &str) -> BoxFuture<'static, Vector3<f32>> {
        let dims = scene.room_dimensions;
        let mut rng = rand::rng();
        let position = Vector3::new(
            rng.random_range(0.2f32..0.8) * dims.width - dims.width / 2.0,
            0.0,
            rng.random_range(0.2f32..0.8) * dims.length - dims.length / 2.0,
        );
        let latency = self.latency;
        Box::pin(async move {
            tokio::time::sleep(latency).await;
            position
        })
    }
}
