//! Per-cell marching cubes.
//!
//! These are the building blocks the extraction shader implements for every
//! cell in parallel: corner classification, edge interpolation, vertex slot
//! assignment and triangle assembly. A cell emits one vertex per crossed edge,
//! in ascending edge order, and its indices refer to those local slots.

#![allow(clippy::cast_possible_truncation)]

use glam::Vec3;

use crate::tables::{EDGE_CORNERS, EDGE_TABLE, MAX_VERTICES_PER_CELL};

/// Geometry emitted by a single cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellMesh {
    /// One interpolated vertex per crossed edge, in ascending edge order.
    pub vertices: Vec<Vec3>,
    /// Triangle indices into `vertices`.
    pub indices: Vec<u32>,
}

impl CellMesh {
    /// Returns the number of triangles in the cell.
    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns true if the surface does not cross the cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Which side of the isolevel is the interior of the surface.
///
/// Triangles are emitted counter-clockwise seen from the exterior, and
/// normals point into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interior {
    /// Inside where the field is below the isolevel (implicit surfaces).
    Below,
    /// Inside where the field is above the isolevel (metaballs).
    Above,
}

impl Interior {
    /// Factor applied to the field gradient to get an outward normal.
    #[must_use]
    pub const fn normal_sign(self) -> f32 {
        match self {
            Interior::Below => 1.0,
            Interior::Above => -1.0,
        }
    }

    /// Whether table rows must have their last two corners swapped.
    ///
    /// Rows of the triangle table are counter-clockwise seen from the side
    /// below the isolevel.
    #[must_use]
    pub const fn flips_rows(self) -> bool {
        matches!(self, Interior::Below)
    }
}

/// Builds the 8-bit case index; bit `n` is set when corner `n` is below `isolevel`.
#[must_use]
pub fn corner_case(values: &[f32; 8], isolevel: f32) -> u8 {
    values
        .iter()
        .enumerate()
        .fold(0u8, |case, (n, &v)| case | (u8::from(v < isolevel) << n))
}

/// Interpolation parameter along an edge with endpoint values `v0` and `v1`.
///
/// An edge with equal endpoint values yields 0, so the vertex sits on the
/// first corner instead of becoming NaN.
#[must_use]
pub fn edge_crossing_t(v0: f32, v1: f32, isolevel: f32) -> f32 {
    let denom = v1 - v0;
    if denom == 0.0 {
        return 0.0;
    }
    (isolevel - v0) / denom
}

/// Position where the isosurface crosses the edge from `p0` to `p1`.
#[must_use]
pub fn interpolate_edge(p0: Vec3, p1: Vec3, v0: f32, v1: f32, isolevel: f32) -> Vec3 {
    p0.lerp(p1, edge_crossing_t(v0, v1, isolevel))
}

/// Number of vertices a cell of this case emits (crossed edges, at most 12).
#[must_use]
pub fn case_vertex_count(case: u8) -> u32 {
    EDGE_TABLE[usize::from(case)].count_ones()
}

/// Number of indices a cell of this case emits (at most 15).
#[must_use]
pub fn case_index_count(case: u8) -> u32 {
    crate::tables::triangle_row(case).len() as u32
}

/// Number of triangles a cell of this case emits (at most 5).
#[must_use]
pub fn case_triangle_count(case: u8) -> u32 {
    case_index_count(case) / 3
}

/// Local vertex slot of `edge` within a cell whose crossed edges are `mask`.
///
/// Slots are dense: the lowest crossed edge gets slot 0.
#[must_use]
pub fn edge_slot(mask: u16, edge: u8) -> u32 {
    (mask & ((1u16 << edge) - 1)).count_ones()
}

/// Triangulates one cell given its corner positions and values.
#[must_use]
pub fn triangulate_cell(
    corners: &[Vec3; 8],
    values: &[f32; 8],
    isolevel: f32,
    interior: Interior,
) -> CellMesh {
    let case = corner_case(values, isolevel);
    let mask = EDGE_TABLE[usize::from(case)];
    if mask == 0 {
        return CellMesh::default();
    }

    let mut vertices = Vec::with_capacity(MAX_VERTICES_PER_CELL);
    for (edge, &[a, b]) in EDGE_CORNERS.iter().enumerate() {
        if mask & (1 << edge) != 0 {
            vertices.push(interpolate_edge(
                corners[a], corners[b], values[a], values[b], isolevel,
            ));
        }
    }

    let mut indices: Vec<u32> = crate::tables::triangle_row(case)
        .iter()
        .map(|&edge| edge_slot(mask, edge as u8))
        .collect();
    if interior.flips_rows() {
        for triangle in indices.chunks_exact_mut(3) {
            triangle.swap(1, 2);
        }
    }

    CellMesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{CORNER_OFFSETS, MAX_INDICES_PER_CELL};

    fn unit_corners() -> [Vec3; 8] {
        CORNER_OFFSETS.map(|[x, y, z]| Vec3::new(x as f32, y as f32, z as f32))
    }

    #[test]
    fn test_uniform_cells_emit_nothing() {
        let corners = unit_corners();
        assert!(triangulate_cell(&corners, &[1.0; 8], 0.0, Interior::Below).is_empty());
        assert!(triangulate_cell(&corners, &[-1.0; 8], 0.0, Interior::Below).is_empty());
        assert_eq!(corner_case(&[1.0; 8], 0.0), 0);
        assert_eq!(corner_case(&[-1.0; 8], 0.0), 255);
    }

    #[test]
    fn test_midpoint_crossing() {
        assert!((edge_crossing_t(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
        let p = interpolate_edge(Vec3::ZERO, Vec3::X, 0.0, 1.0, 0.5);
        assert!((p - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_degenerate_edge_uses_first_corner() {
        let t = edge_crossing_t(0.3, 0.3, 0.3);
        assert_eq!(t, 0.0);
        assert!(t.is_finite());
        let p = interpolate_edge(Vec3::Y, Vec3::ONE, 0.3, 0.3, 0.3);
        assert_eq!(p, Vec3::Y);
    }

    #[test]
    fn test_isolevel_is_strictly_below() {
        // A corner exactly at the isolevel counts as outside.
        let mut values = [1.0; 8];
        values[3] = 0.0;
        assert_eq!(corner_case(&values, 0.0), 0);
        values[3] = -0.001;
        assert_eq!(corner_case(&values, 0.0), 1 << 3);
    }

    #[test]
    fn test_single_corner_cell() {
        let mut values = [1.0; 8];
        values[0] = -1.0;
        let mesh = triangulate_cell(&unit_corners(), &values, 0.0, Interior::Below);
        assert_eq!(mesh.num_triangles(), 1);
        assert_eq!(mesh.vertices.len(), 3);
        // Crossings sit halfway along the three edges touching corner 0.
        for v in &mesh.vertices {
            assert!((v.length() - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_every_case_stays_within_capacity() {
        let corners = unit_corners();
        for case in 0..=255u8 {
            let values: [f32; 8] =
                std::array::from_fn(|n| if case & (1 << n) != 0 { -1.0 } else { 1.0 });
            assert_eq!(corner_case(&values, 0.0), case);

            let mesh = triangulate_cell(&corners, &values, 0.0, Interior::Above);
            assert_eq!(mesh.vertices.len() as u32, case_vertex_count(case));
            assert_eq!(mesh.indices.len() as u32, case_index_count(case));
            assert!(mesh.vertices.len() <= MAX_VERTICES_PER_CELL);
            assert!(mesh.indices.len() <= MAX_INDICES_PER_CELL);
            assert!(case_triangle_count(case) <= 5);
            for &i in &mesh.indices {
                assert!((i as usize) < mesh.vertices.len(), "case {case}");
            }
        }
    }

    fn face_normal(mesh: &CellMesh, triangle: usize) -> Vec3 {
        let [a, b, c] = [0, 1, 2].map(|k| mesh.vertices[mesh.indices[3 * triangle + k] as usize]);
        (b - a).cross(c - a)
    }

    #[test]
    fn test_winding_faces_exterior() {
        let corners = unit_corners();
        let mut values = [1.0; 8];
        values[0] = -1.0;

        // Corner 0 alone is inside: the face must look away from it.
        let mesh = triangulate_cell(&corners, &values, 0.0, Interior::Below);
        let centroid = mesh.vertices.iter().copied().sum::<Vec3>() / 3.0;
        assert!(face_normal(&mesh, 0).dot(centroid - corners[0]) > 0.0);

        // Corner 0 alone is outside: the face must look towards it.
        let mesh = triangulate_cell(&corners, &values, 0.0, Interior::Above);
        assert!(face_normal(&mesh, 0).dot(centroid - corners[0]) < 0.0);
    }

    #[test]
    fn test_interiors_wind_oppositely() {
        let corners = unit_corners();
        for case in 1..=254u8 {
            let values: [f32; 8] =
                std::array::from_fn(|n| if case & (1 << n) != 0 { -1.0 } else { 1.0 });
            let below = triangulate_cell(&corners, &values, 0.0, Interior::Below);
            let above = triangulate_cell(&corners, &values, 0.0, Interior::Above);
            assert_eq!(below.vertices, above.vertices);
            for t in 0..below.num_triangles() {
                let n = face_normal(&below, t) + face_normal(&above, t);
                assert!(n.length() < 1e-6, "case {case}, triangle {t}");
            }
        }
    }

    #[test]
    fn test_normal_signs() {
        assert_eq!(Interior::Below.normal_sign(), 1.0);
        assert_eq!(Interior::Above.normal_sign(), -1.0);
        assert!(Interior::Below.flips_rows());
        assert!(!Interior::Above.flips_rows());
    }

    #[test]
    fn test_edge_slots_are_dense() {
        let mask = 0b1000_0000_0101u16;
        assert_eq!(edge_slot(mask, 0), 0);
        assert_eq!(edge_slot(mask, 2), 1);
        assert_eq!(edge_slot(mask, 11), 2);
    }
}
