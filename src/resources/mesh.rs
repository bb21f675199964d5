use cgmath::{Matrix4, SquareMatrix, Vector3, Vector4};

use crate::error::LoadFailure;

/// Axis-aligned box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Bounds {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vector3<f32>>,
    {
        points.into_iter().fold(None, |bounds, p| {
            Some(match bounds {
                None => Bounds::new(p, p),
                Some(b) => Bounds::new(
                    Vector3::new(b.min.x.min(p.x), b.min.y.min(p.y), b.min.z.min(p.z)),
                    Vector3::new(b.max.x.max(p.x), b.max.y.max(p.y), b.max.z.max(p.z)),
                ),
            })
        })
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn corners(&self) -> [Vector3<f32>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vector3::new(a.x, a.y, a.z),
            Vector3::new(b.x, a.y, a.z),
            Vector3::new(a.x, b.y, a.z),
            Vector3::new(b.x, b.y, a.z),
            Vector3::new(a.x, a.y, b.z),
            Vector3::new(b.x, a.y, b.z),
            Vector3::new(a.x, b.y, b.z),
            Vector3::new(b.x, b.y, b.z),
        ]
    }

    /// The axis-aligned box around this box after `matrix`.
    pub fn transformed(&self, matrix: Matrix4<f32>) -> Bounds {
        let corners = self.corners().map(|c| transform_point(matrix, c));
        Bounds::from_points(corners).unwrap_or(*self)
    }
}

/// What the editor keeps of a resolved model: its extent, not its triangles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub bounds: Bounds,
    pub vertex_count: usize,
    pub mesh_count: usize,
}

impl Geometry {
    /// Floor footprint as (width along X, depth along Z).
    pub fn footprint(&self) -> (f32, f32) {
        let size = self.bounds.size();
        (size.x, size.z)
    }
}

fn transform_point(matrix: Matrix4<f32>, p: Vector3<f32>) -> Vector3<f32> {
    let v = matrix * Vector4::new(p.x, p.y, p.z, 1.0);
    Vector3::new(v.x, v.y, v.z)
}

pub fn geometry_from_obj(models: &[tobj::Model], file_name: &str) -> Result<Geometry, LoadFailure> {
    let points = models.iter().flat_map(|m| {
        m.mesh
            .positions
            .chunks_exact(3)
            .map(|p| Vector3::new(p[0], p[1], p[2]))
    });
    let vertex_count = models.iter().map(|m| m.mesh.positions.len() / 3).sum();
    let bounds = Bounds::from_points(points)
        .ok_or_else(|| LoadFailure::EmptyGeometry(file_name.to_string()))?;
    Ok(Geometry {
        bounds,
        vertex_count,
        mesh_count: models.len(),
    })
}

/**
 * Walks the default scene (or the first one) and collects every primitive's
 * positions in scene space, applying the node transforms on the way down.
 */
pub fn geometry_from_gltf(
    document: &gltf::Document,
    buffers: &[Vec<u8>],
    file_name: &str,
) -> Result<Geometry, LoadFailure> {
    let mut points = Vec::new();
    let mut mesh_count = 0;
    let scene = document.default_scene().or_else(|| document.scenes().next());
    match scene {
        Some(scene) => {
            for node in scene.nodes() {
                collect_node(&node, Matrix4::identity(), buffers, &mut points, &mut mesh_count);
            }
        }
        None => {
            for mesh in document.meshes() {
                mesh_count += 1;
                collect_mesh(&mesh, Matrix4::identity(), buffers, &mut points);
            }
        }
    }
    let vertex_count = points.len();
    let bounds = Bounds::from_points(points)
        .ok_or_else(|| LoadFailure::EmptyGeometry(file_name.to_string()))?;
    Ok(Geometry {
        bounds,
        vertex_count,
        mesh_count,
    })
}

fn collect_node(
    node: &gltf::Node,
    parent: Matrix4<f32>,
    buffers: &[Vec<u8>],
    points: &mut Vec<Vector3<f32>>,
    mesh_count: &mut usize,
) {
    let world = parent * Matrix4::from(node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        *mesh_count += 1;
        collect_mesh(&mesh, world, buffers, points);
    }
    for child in node.children() {
        collect_node(&child, world, buffers, points, mesh_count);
    }
}

fn collect_mesh(
    mesh: &gltf::Mesh,
    world: Matrix4<f32>,
    buffers: &[Vec<u8>],
    points: &mut Vec<Vector3<f32>>,
) {
    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
        if let Some(positions) = reader.read_positions() {
            points.extend(positions.map(|p| transform_point(world, p.into())));
        } else {
            log::warn!("Primitive {} of mesh {} has no positions.", primitive.index(), mesh.index());
        }
    }
}
