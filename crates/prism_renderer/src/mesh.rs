//! Triangle meshes and the box built from one.
//!
//! A mesh is an arena of world-space vertices and normals plus an index
//! buffer of faces. Its bounding box is computed once from the transformed
//! vertices and rejects rays before the linear face scan.

use prism_core::{Color, Material};
use prism_math::{Aabb, Interval, Mat4, Mat4Ext, Ray, Vec3};

use crate::triangle::{barycentric, face_normal, interpolate_normal, intersect_triangle};

/// Raw mesh data in model space.
#[derive(Debug, Clone, Default)]
pub struct MeshGeometry {
    pub positions: Vec<Vec3>,
    /// Optional vertex normals. Empty means every face shades flat.
    pub normals: Vec<Vec3>,
    /// Counter-clockwise vertex indices per face.
    pub faces: Vec<[usize; 3]>,
    /// Indices into `normals` per face corner; defaults to `faces`.
    pub face_normals: Option<Vec<[usize; 3]>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Face {
    vertices: [usize; 3],
    normals: Option<[usize; 3]>,
    normal: Vec3,
}

#[derive(Debug, Clone)]
pub struct TriangleMesh {
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    faces: Vec<Face>,
    bounds: Option<Aabb>,
    pub color: Color,
    pub material: Material,
}

impl TriangleMesh {
    /// Build a mesh, moving it to world space with `transform`.
    ///
    /// Vertex normals go through the inverse-transpose of the transform so
    /// they stay perpendicular under non-uniform scale.
    pub fn new(geometry: MeshGeometry, transform: &Mat4, color: Color, material: Material) -> Self {
        let mut mesh = Self::unbounded(geometry, transform, color, material);
        mesh.bounds = Aabb::enclosing(mesh.vertices.iter().copied());
        mesh
    }

    fn unbounded(geometry: MeshGeometry, transform: &Mat4, color: Color, material: Material) -> Self {
        let MeshGeometry {
            positions,
            normals,
            faces,
            face_normals,
        } = geometry;

        let vertices: Vec<Vec3> = positions
            .into_iter()
            .map(|p| transform.transform_point3(p))
            .collect();
        let normals: Vec<Vec3> = if normals.is_empty() {
            normals
        } else {
            let normal_matrix = transform.normal_matrix();
            normals
                .into_iter()
                .map(|n| (normal_matrix * n).normalize())
                .collect()
        };

        // A mirroring transform turns the winding inside out.
        let mirrored = transform.determinant() < 0.0;
        let wind = |[a, b, c]: [usize; 3]| if mirrored { [a, c, b] } else { [a, b, c] };

        let corner_normals = if normals.is_empty() {
            None
        } else {
            Some(face_normals.unwrap_or_else(|| faces.clone()))
        };

        let faces = faces
            .iter()
            .enumerate()
            .map(|(i, &indices)| {
                let indices = wind(indices);
                let [a, b, c] = indices.map(|v| vertices[v]);
                let smooth = corner_normals
                    .as_ref()
                    .map(|corners| wind(corners[i]))
                    .filter(|[na, nb, nc]| normals[*na] != normals[*nb] || normals[*nb] != normals[*nc]);
                Face {
                    vertices: indices,
                    normals: smooth,
                    normal: face_normal(a, b, c),
                }
            })
            .collect();

        Self {
            vertices,
            normals,
            faces,
            bounds: None,
            color,
            material,
        }
    }

    /// The intersection pre-filter, absent for meshes that are their own box.
    pub fn bounds(&self) -> Option<&Aabb> {
        self.bounds.as_ref()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn face_vertices(&self, face: usize) -> [Vec3; 3] {
        self.faces[face].vertices.map(|v| self.vertices[v])
    }

    /// Corner normals of a smooth shaded face.
    pub fn face_vertex_normals(&self, face: usize) -> Option<[Vec3; 3]> {
        self.faces[face].normals.map(|ns| ns.map(|n| self.normals[n]))
    }

    pub fn face_normal(&self, face: usize) -> Vec3 {
        self.faces[face].normal
    }

    /// Closest face hit as `(face index, ray parameter)`.
    pub fn intersect(&self, ray: &Ray) -> Option<(usize, f64)> {
        if let Some(bounds) = &self.bounds {
            if !bounds.hit(ray, Interval::FORWARD) {
                return None;
            }
        }

        self.faces
            .iter()
            .enumerate()
            .filter_map(|(i, face)| {
                let [a, b, c] = face.vertices.map(|v| self.vertices[v]);
                intersect_triangle(a, b, c, face.normal, ray).map(|s| (i, s))
            })
            .min_by(|x, y| x.1.total_cmp(&y.1))
    }

    pub fn normal_at(&self, face: usize, point: Vec3) -> Vec3 {
        match self.face_vertex_normals(face) {
            None => self.faces[face].normal,
            Some(normals) => {
                let [a, b, c] = self.face_vertices(face);
                interpolate_normal(&normals, barycentric(a, b, c, point))
            }
        }
    }
}

/// Index buffer of the 12 box triangles over corners numbered
/// `(x, y, z)`: 0=(-,-,-) 1=(-,-,+) 2=(-,+,-) 3=(-,+,+)
/// 4=(+,+,-) 5=(+,+,+) 6=(+,-,-) 7=(+,-,+). Every face winds outward.
const BOX_FACES: [[usize; 3]; 12] = [
    [0, 1, 3],
    [0, 3, 2],
    [6, 4, 5],
    [6, 5, 7],
    [1, 7, 5],
    [1, 5, 3],
    [0, 2, 4],
    [0, 4, 6],
    [2, 3, 5],
    [2, 5, 4],
    [0, 6, 7],
    [0, 7, 1],
];

/// Axis-aligned box as a flat shaded 12-triangle mesh.
///
/// The box needs no bounding box in front of itself, so none is stored.
pub fn make_box_mesh(min: Vec3, max: Vec3, transform: &Mat4, color: Color, material: Material) -> TriangleMesh {
    debug_assert!(min.cmplt(max).all(), "box min must be below max");
    let positions = vec![
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(min.x, max.y, max.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(max.x, max.y, max.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(max.x, min.y, max.z),
    ];
    let geometry = MeshGeometry {
        positions,
        faces: BOX_FACES.to_vec(),
        ..Default::default()
    };
    TriangleMesh::unbounded(geometry, transform, color, material)
}
