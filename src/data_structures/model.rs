//! Model definitions: the catalog entries instances refer to by `model_id`.

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Furniture,
    Lighting,
    Decoration,
    Fixtures,
    Electronics,
    Kitchen,
    Bathroom,
    Outdoor,
}

/// A placeable model. `model_path` is resolved by the model repository.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: String,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    pub model_path: String,
    #[serde(default)]
    pub thumbnail_url: String,
    pub default_scale: Vector3<f32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Model {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        model_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            description: String::new(),
            model_path: model_path.into(),
            thumbnail_url: String::new(),
            default_scale: Vector3::new(1.0, 1.0, 1.0),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.default_scale = scale;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// The set of models the editor can place, in display order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ModelCatalog {
    models: Vec<Model>,
}

impl ModelCatalog {
    pub fn new(models: Vec<Model>) -> Self {
        Self { models }
    }

    pub fn get(&self, id: &str) -> Option<&Model> {
        self.models.iter().find(|model| model.id == id)
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Model> {
        self.models
            .iter()
            .filter(move |model| model.category == category)
    }
}
