use glam::Vec3;
use morphscene_common::Aabb;

use crate::AssetError;

/// Immutable triangle surface.
///
/// An empty index list means `positions` is a plain triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct TriMesh {
    name: String,
    positions: Vec<Vec3>,
    indices: Vec<u32>,
}

impl TriMesh {
    /// Validate topology and build the mesh.
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        indices: Vec<u32>,
    ) -> Result<Self, AssetError> {
        let name = name.into();
        if indices.is_empty() {
            if positions.len() % 3 != 0 {
                return Err(AssetError::BadTopology {
                    mesh: name,
                    count: positions.len(),
                });
            }
        } else {
            if indices.len() % 3 != 0 {
                return Err(AssetError::BadTopology {
                    mesh: name,
                    count: indices.len(),
                });
            }
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
                return Err(AssetError::IndexOutOfRange {
                    mesh: name,
                    index,
                    vertex_count: positions.len(),
                });
            }
        }
        Ok(Self {
            name,
            positions,
            indices,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        if self.indices.is_empty() {
            self.positions.len() / 3
        } else {
            self.indices.len() / 3
        }
    }

    /// Iterate triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        (0..self.triangle_count()).map(move |t| {
            let corner = |k: usize| {
                let i = t * 3 + k;
                if self.indices.is_empty() {
                    self.positions[i]
                } else {
                    self.positions[self.indices[i] as usize]
                }
            };
            [corner(0), corner(1), corner(2)]
        })
    }

    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|t| triangle_area(&t) as f64).sum()
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied())
    }
}

pub(crate) fn triangle_area([a, b, c]: &[Vec3; 3]) -> f32 {
    (*b - *a).cross(*c - *a).length() * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> TriMesh {
        TriMesh::new(
            "quad",
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 3.0),
                Vec3::new(0.0, 0.0, 3.0),
            ],
            vec![0, 1, 2, 2, 3, 0],
        )
        .unwrap()
    }

    #[test]
    fn indexed_quad_area() {
        let mesh = quad();
        assert_eq!(mesh.triangle_count(), 2);
        assert!((mesh.surface_area() - 6.0).abs() < 1e-6);
    }

    #[test]
    fn non_indexed_triangle_list() {
        let mesh = TriMesh::new(
            "tri",
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            Vec::new(),
        )
        .unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert!((mesh.surface_area() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn rejects_out_of_range_index() {
        let err = TriMesh::new("bad", vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 3])
            .unwrap_err();
        assert!(matches!(err, AssetError::IndexOutOfRange { index: 3, .. }));
    }

    #[test]
    fn rejects_partial_triangle() {
        let err = TriMesh::new("bad", vec![Vec3::ZERO, Vec3::X], Vec::new()).unwrap_err();
        assert!(matches!(err, AssetError::BadTopology { count: 2, .. }));
    }

    #[test]
    fn bounds_of_quad() {
        let b = quad().bounds().unwrap();
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::new(2.0, 0.0, 3.0));
    }
}
