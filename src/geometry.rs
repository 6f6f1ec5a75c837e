//! Vertex and edge data for the regular polyhedra used as decorative bodies.

use glam::Vec3;
use serde::Deserialize;

const PHI: f32 = 1.618_034;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Tetrahedron,
    Octahedron,
    Icosahedron,
    Dodecahedron,
}

impl Shape {
    /// Circumradius the body is drawn at.
    pub fn radius(self) -> f32 {
        match self {
            Shape::Tetrahedron => 0.9,
            Shape::Octahedron => 0.8,
            Shape::Icosahedron => 1.0,
            Shape::Dodecahedron => 0.7,
        }
    }

    /// Vertices on the unit sphere.
    pub fn vertices(self) -> Vec<Vec3> {
        let raw: Vec<Vec3> = match self {
            Shape::Tetrahedron => vec![
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(1.0, -1.0, -1.0),
                Vec3::new(-1.0, 1.0, -1.0),
                Vec3::new(-1.0, -1.0, 1.0),
            ],
            Shape::Octahedron => vec![
                Vec3::X,
                Vec3::NEG_X,
                Vec3::Y,
                Vec3::NEG_Y,
                Vec3::Z,
                Vec3::NEG_Z,
            ],
            Shape::Icosahedron => {
                let mut v = Vec::with_capacity(12);
                for a in [-1.0, 1.0] {
                    for b in [-PHI, PHI] {
                        v.push(Vec3::new(0.0, a, b));
                        v.push(Vec3::new(a, b, 0.0));
                        v.push(Vec3::new(b, 0.0, a));
                    }
                }
                v
            }
            Shape::Dodecahedron => {
                let inv = 1.0 / PHI;
                let mut v = Vec::with_capacity(20);
                for x in [-1.0, 1.0] {
                    for y in [-1.0, 1.0] {
                        for z in [-1.0, 1.0] {
                            v.push(Vec3::new(x, y, z));
                        }
                    }
                }
                for a in [-inv, inv] {
                    for b in [-PHI, PHI] {
                        v.push(Vec3::new(0.0, a, b));
                        v.push(Vec3::new(a, b, 0.0));
                        v.push(Vec3::new(b, 0.0, a));
                    }
                }
                v
            }
        };
        raw.into_iter().map(Vec3::normalize).collect()
    }

    /// Index pairs of the polyhedron's edges.
    ///
    /// For a regular solid every edge joins two vertices at the minimum
    /// pairwise distance, and no non-edge pair is that close.
    pub fn edges(self) -> Vec<(usize, usize)> {
        let verts = self.vertices();
        let mut shortest = f32::MAX;
        for i in 0..verts.len() {
            for j in i + 1..verts.len() {
                shortest = shortest.min(verts[i].distance(verts[j]));
            }
        }
        let tolerance = shortest * 1e-3;
        let mut edges = Vec::new();
        for i in 0..verts.len() {
            for j in i + 1..verts.len() {
                if (verts[i].distance(verts[j]) - shortest).abs() <= tolerance {
                    edges.push((i, j));
                }
            }
        }
        edges
    }

    /// Flat `xyz` list for `GL_LINES`, scaled to [`Shape::radius`].
    pub fn line_vertices(self) -> Vec<f32> {
        let verts = self.vertices();
        let r = self.radius();
        self.edges()
            .into_iter()
            .flat_map(|(a, b)| {
                let (a, b) = (verts[a] * r, verts[b] * r);
                [a.x, a.y, a.z, b.x, b.y, b.z]
            })
            .collect()
    }
}
