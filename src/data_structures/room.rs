//! The rectangular room and its four walls.
//!
//! The room is centred on the origin with the floor at `y = 0`. Walls are the
//! only static occupied space: their inner faces lie on `x = ±width / 2` and
//! `z = ±length / 2`. For proximity queries a wall is the floor-level segment
//! along its inner face; for snapping it offers the centre of that segment.

use cgmath::{InnerSpace, Vector2, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Room {
    pub width: f32,
    pub height: f32,
    pub length: f32,
    pub wall_thickness: f32,
    pub wall_color: String,
    pub floor_color: String,
    pub ceiling_color: String,
    pub has_ceiling: bool,
}

impl Default for Room {
    fn default() -> Self {
        Self {
            width: 9.1,
            height: 3.0,
            length: 9.1,
            wall_thickness: 0.15,
            wall_color: "#6e6e6e".to_string(),
            floor_color: "#cccccc".to_string(),
            ceiling_color: "#ffffff".to_string(),
            has_ceiling: false,
        }
    }
}

/// Width, height and length only; what a saved scene records.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomDimensions {
    pub width: f32,
    pub height: f32,
    pub length: f32,
}

/// A partial dimension update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DimensionsPatch {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub length: Option<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WallSide {
    Left,
    Right,
    Back,
    Front,
}

/// One wall's inner face at floor level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wall {
    pub side: WallSide,
    pub start: Vector3<f32>,
    pub end: Vector3<f32>,
}

impl Wall {
    pub fn anchor(&self) -> Vector3<f32> {
        (self.start + self.end) * 0.5
    }

    /// Distance on the floor plane from `point` to the closest point of the face.
    pub fn planar_distance(&self, point: Vector3<f32>) -> f32 {
        let a = Vector2::new(self.start.x, self.start.z);
        let b = Vector2::new(self.end.x, self.end.z);
        let p = Vector2::new(point.x, point.z);
        let ab = b - a;
        let len2 = ab.magnitude2();
        let t = if len2 > 0.0 {
            ((p - a).dot(ab) / len2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (p - (a + ab * t)).magnitude()
    }
}

impl Room {
    pub fn dimensions(&self) -> RoomDimensions {
        RoomDimensions {
            width: self.width,
            height: self.height,
            length: self.length,
        }
    }

    pub fn set_dimensions(&mut self, dimensions: RoomDimensions) {
        self.width = dimensions.width;
        self.height = dimensions.height;
        self.length = dimensions.length;
    }

    pub fn update_dimensions(&mut self, patch: DimensionsPatch) {
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(length) = patch.length {
            self.length = length;
        }
    }

    /// Left, right, back, front. The order is stable and used as snap tie-break.
    pub fn walls(&self) -> [Wall; 4] {
        let hw = self.width / 2.0;
        let hl = self.length / 2.0;
        [
            Wall {
                side: WallSide::Left,
                start: Vector3::new(-hw, 0.0, -hl),
                end: Vector3::new(-hw, 0.0, hl),
            },
            Wall {
                side: WallSide::Right,
                start: Vector3::new(hw, 0.0, -hl),
                end: Vector3::new(hw, 0.0, hl),
            },
            Wall {
                side: WallSide::Back,
                start: Vector3::new(-hw, 0.0, -hl),
                end: Vector3::new(hw, 0.0, -hl),
            },
            Wall {
                side: WallSide::Front,
                start: Vector3::new(-hw, 0.0, hl),
                end: Vector3::new(hw, 0.0, hl),
            },
        ]
    }
}
