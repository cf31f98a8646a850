//! Procedural source meshes for the particle morph.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{AssetError, TriMesh};

const CELL_SIZE: f32 = 1.0;
const WALL_THICKNESS: f32 = 0.1;

/// Accumulates boxes into one indexed triangle list.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an axis-aligned box spanning `min..max`.
    pub fn push_box(&mut self, min: Vec3, max: Vec3) {
        let base = self.positions.len() as u32;
        #[rustfmt::skip]
        self.positions.extend_from_slice(&[
            Vec3::new(min.x, min.y, min.z), Vec3::new(max.x, min.y, min.z),
            Vec3::new(max.x, max.y, min.z), Vec3::new(min.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z), Vec3::new(max.x, min.y, max.z),
            Vec3::new(max.x, max.y, max.z), Vec3::new(min.x, max.y, max.z),
        ]);
        #[rustfmt::skip]
        let faces: [u32; 36] = [
            4, 5, 6, 6, 7, 4, // +Z
            1, 0, 3, 3, 2, 1, // -Z
            5, 1, 2, 2, 6, 5, // +X
            0, 4, 7, 7, 3, 0, // -X
            7, 6, 2, 2, 3, 7, // +Y
            0, 1, 5, 5, 4, 0, // -Y
        ];
        self.indices.extend(faces.iter().map(|i| base + i));
    }

    pub fn build(self, name: impl Into<String>) -> Result<TriMesh, AssetError> {
        TriMesh::new(name, self.positions, self.indices)
    }
}

/// Wall layout of a perfect maze on a `cols x rows` grid.
#[derive(Debug, Clone)]
struct MazeWalls {
    cols: usize,
    rows: usize,
    /// `(rows + 1) * cols` walls lying along X, indexed `row * cols + col`.
    horizontal: Vec<bool>,
    /// `rows * (cols + 1)` walls lying along Z, indexed `row * (cols + 1) + col`.
    vertical: Vec<bool>,
}

impl MazeWalls {
    /// Carve with an iterative recursive-backtracker.
    fn carve<R: Rng>(cols: usize, rows: usize, rng: &mut R) -> Self {
        let mut walls = Self {
            cols,
            rows,
            horizontal: vec![true; (rows + 1) * cols],
            vertical: vec![true; rows * (cols + 1)],
        };
        let mut visited = vec![false; cols * rows];
        let mut stack = vec![(0usize, 0usize)];
        visited[0] = true;

        while let Some(&(c, r)) = stack.last() {
            let mut next = Vec::with_capacity(4);
            if c > 0 && !visited[r * cols + c - 1] {
                next.push((c - 1, r));
            }
            if c + 1 < cols && !visited[r * cols + c + 1] {
                next.push((c + 1, r));
            }
            if r > 0 && !visited[(r - 1) * cols + c] {
                next.push((c, r - 1));
            }
            if r + 1 < rows && !visited[(r + 1) * cols + c] {
                next.push((c, r + 1));
            }

            if next.is_empty() {
                stack.pop();
                continue;
            }

            let (nc, nr) = next[rng.random_range(0..next.len())];
            if nc != c {
                let col = c.max(nc);
                walls.vertical[r * (cols + 1) + col] = false;
            } else {
                let row = r.max(nr);
                walls.horizontal[row * cols + c] = false;
            }
            visited[nr * cols + nc] = true;
            stack.push((nc, nr));
        }

        // Entrance and exit in the middle column.
        walls.horizontal[cols / 2] = false;
        walls.horizontal[rows * cols + cols / 2] = false;
        walls
    }
}

/// Build a maze of `cols x rows` unit cells as wall boxes.
///
/// The maze is centred on X and extends from `z = 0` towards `-z`, so the
/// walk cycle carries it past the character standing at the origin.
pub fn maze(
    name: &str,
    cols: usize,
    rows: usize,
    wall_height: f32,
    seed: u64,
) -> Result<TriMesh, AssetError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let walls = MazeWalls::carve(cols.max(1), rows.max(1), &mut rng);
    let x0 = -(walls.cols as f32) * CELL_SIZE * 0.5;
    let half = WALL_THICKNESS * 0.5;
    let mut builder = MeshBuilder::new();

    for row in 0..=walls.rows {
        for col in 0..walls.cols {
            if walls.horizontal[row * walls.cols + col] {
                let z = -(row as f32) * CELL_SIZE;
                let xa = x0 + col as f32 * CELL_SIZE;
                builder.push_box(
                    Vec3::new(xa - half, 0.0, z - half),
                    Vec3::new(xa + CELL_SIZE + half, wall_height, z + half),
                );
            }
        }
    }
    for row in 0..walls.rows {
        for col in 0..=walls.cols {
            if walls.vertical[row * (walls.cols + 1) + col] {
                let x = x0 + col as f32 * CELL_SIZE;
                let za = -(row as f32) * CELL_SIZE;
                builder.push_box(
                    Vec3::new(x - half, 0.0, za - CELL_SIZE - half),
                    Vec3::new(x + half, wall_height, za + half),
                );
            }
        }
    }

    builder.build(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_has_twelve_triangles_and_full_area() {
        let mut b = MeshBuilder::new();
        b.push_box(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        let mesh = b.build("box").unwrap();
        assert_eq!(mesh.triangle_count(), 12);
        // 2 * (1*2 + 2*3 + 1*3)
        assert!((mesh.surface_area() - 22.0).abs() < 1e-5);
    }

    #[test]
    fn perfect_maze_opens_every_cell() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (cols, rows) = (5, 7);
        let walls = MazeWalls::carve(cols, rows, &mut rng);
        // A spanning tree over n cells removes n - 1 interior walls, plus entrance and exit.
        let closed = walls.horizontal.iter().filter(|w| **w).count()
            + walls.vertical.iter().filter(|w| **w).count();
        let total = walls.horizontal.len() + walls.vertical.len();
        assert_eq!(total - closed, cols * rows - 1 + 2);
    }

    #[test]
    fn maze_is_seed_deterministic() {
        let a = maze("a", 6, 8, 1.0, 11).unwrap();
        let b = maze("b", 6, 8, 1.0, 11).unwrap();
        assert_eq!(a.positions(), b.positions());
        let c = maze("c", 6, 8, 1.0, 12).unwrap();
        assert_ne!(a.positions(), c.positions());
    }

    #[test]
    fn maze_extends_towards_negative_z() {
        let mesh = maze("m", 8, 48, 1.2, 1).unwrap();
        let b = mesh.bounds().unwrap();
        assert!(b.max.z <= WALL_THICKNESS);
        assert!(b.min.z <= -47.0);
        assert!((b.max.y - 1.2).abs() < 1e-6);
        assert!(mesh.surface_area() > 0.0);
    }
}
