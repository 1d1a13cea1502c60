//! Sampling grid and the buffer capacities derived from it.

use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{IsosurfaceError, Result};
use crate::tables::{MAX_INDICES_PER_CELL, MAX_VERTICES_PER_CELL};

/// Smallest resolution that still contains one cell.
pub const MIN_RESOLUTION: u32 = 2;

/// Largest supported resolution.
pub const MAX_RESOLUTION: u32 = 256;

/// Floats per vertex attribute (xyz).
pub const COMPONENTS_PER_VERTEX: u64 = 3;

const F32_BYTES: u64 = std::mem::size_of::<f32>() as u64;
const U32_BYTES: u64 = std::mem::size_of::<u32>() as u64;

/// A dense, uniform R x R x R sampling grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Grid {
    resolution: u32,
}

impl Grid {
    /// Creates a grid with `resolution` samples per axis.
    pub fn new(resolution: u32) -> Result<Self> {
        if !(MIN_RESOLUTION..=MAX_RESOLUTION).contains(&resolution) {
            return Err(IsosurfaceError::InvalidResolution {
                resolution,
                min: MIN_RESOLUTION,
                max: MAX_RESOLUTION,
            });
        }
        Ok(Self { resolution })
    }

    /// Samples per axis.
    #[must_use]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Cells per axis.
    #[must_use]
    pub fn cells_per_axis(&self) -> u32 {
        self.resolution - 1
    }

    /// Buffer capacities for this grid.
    #[must_use]
    pub fn buffer_sizes(&self) -> BufferSizes {
        BufferSizes::for_resolution(self.resolution)
    }

    /// Flat volume index of sample (i, j, k).
    #[must_use]
    pub fn sample_index(&self, i: u32, j: u32, k: u32) -> usize {
        let r = self.resolution as usize;
        i as usize + r * (j as usize + r * k as usize)
    }

    /// Inverse of [`Grid::sample_index`].
    #[must_use]
    pub fn sample_coords(&self, index: usize) -> UVec3 {
        let r = self.resolution as usize;
        UVec3::new(
            (index % r) as u32,
            ((index / r) % r) as u32,
            (index / (r * r)) as u32,
        )
    }

    /// Distance between neighboring samples in a domain `[-half_extent, half_extent]³`.
    #[must_use]
    pub fn spacing(&self, half_extent: f32) -> f32 {
        2.0 * half_extent / self.cells_per_axis() as f32
    }

    /// World-space position of sample (i, j, k).
    ///
    /// Sample 0 maps to `-half_extent` and sample R-1 to `+half_extent`.
    #[must_use]
    pub fn sample_position(&self, coords: UVec3, half_extent: f32) -> Vec3 {
        let denom = self.cells_per_axis() as f32;
        (coords.as_vec3() * 2.0 / denom - Vec3::ONE) * half_extent
    }

    /// Compute workgroups needed per axis to cover every sample.
    #[must_use]
    pub fn workgroups(&self, workgroup_size: u32) -> u32 {
        self.resolution.div_ceil(workgroup_size)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self { resolution: 96 }
    }
}

impl TryFrom<u32> for Grid {
    type Error = IsosurfaceError;

    fn try_from(resolution: u32) -> Result<Self> {
        Self::new(resolution)
    }
}

impl From<Grid> for u32 {
    fn from(grid: Grid) -> Self {
        grid.resolution
    }
}

/// Capacities of every resolution-dependent buffer.
///
/// All values are derived from the resolution alone, so the whole set is
/// recomputed together whenever the resolution changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSizes {
    /// Samples per axis.
    pub resolution: u32,
    /// (R-1)³ cells.
    pub cell_count: u64,
    /// Floats in each vertex attribute buffer: 3 * 12 * cells.
    pub vertex_components: u64,
    /// Vertex slots: 12 * cells.
    pub max_vertices: u64,
    /// Index slots: 15 * cells.
    pub index_count: u64,
    /// Scalar samples: R³.
    pub volume_elements: u64,
}

impl BufferSizes {
    /// Computes the capacities for a grid with `resolution` samples per axis.
    #[must_use]
    pub fn for_resolution(resolution: u32) -> Self {
        let r = u64::from(resolution);
        let cells = r.saturating_sub(1).pow(3);
        let max_vertices = MAX_VERTICES_PER_CELL as u64 * cells;
        Self {
            resolution,
            cell_count: cells,
            vertex_components: COMPONENTS_PER_VERTEX * max_vertices,
            max_vertices,
            index_count: MAX_INDICES_PER_CELL as u64 * cells,
            volume_elements: r.pow(3),
        }
    }

    /// Byte size of one vertex attribute buffer.
    #[must_use]
    pub fn vertex_buffer_bytes(&self) -> u64 {
        self.vertex_components * F32_BYTES
    }

    /// Byte size of the index buffer.
    #[must_use]
    pub fn index_buffer_bytes(&self) -> u64 {
        self.index_count * U32_BYTES
    }

    /// Byte size of the volume buffer.
    #[must_use]
    pub fn volume_buffer_bytes(&self) -> u64 {
        self.volume_elements * F32_BYTES
    }

    /// Largest single buffer of the set.
    #[must_use]
    pub fn largest_buffer_bytes(&self) -> u64 {
        self.vertex_buffer_bytes()
            .max(self.index_buffer_bytes())
            .max(self.volume_buffer_bytes())
    }

    /// Total bytes of the set: three attribute buffers, indices and volume.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        3 * self.vertex_buffer_bytes() + self.index_buffer_bytes() + self.volume_buffer_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_resolution_bounds() {
        assert!(Grid::new(1).is_err());
        assert!(Grid::new(MIN_RESOLUTION).is_ok());
        assert!(Grid::new(MAX_RESOLUTION).is_ok());
        assert!(matches!(
            Grid::new(MAX_RESOLUTION + 1),
            Err(IsosurfaceError::InvalidResolution { resolution: 257, .. })
        ));
    }

    #[test]
    fn test_default_resolution_sizes() {
        let sizes = Grid::default().buffer_sizes();
        assert_eq!(sizes.cell_count, 95 * 95 * 95);
        assert_eq!(sizes.vertex_components, 36 * 857_375);
        assert_eq!(sizes.index_count, 15 * 857_375);
        assert_eq!(sizes.volume_elements, 96 * 96 * 96);
    }

    #[test]
    fn test_minimal_grid_has_one_cell() {
        let sizes = BufferSizes::for_resolution(2);
        assert_eq!(sizes.cell_count, 1);
        assert_eq!(sizes.max_vertices, 12);
        assert_eq!(sizes.index_count, 15);
        assert_eq!(sizes.volume_elements, 8);
        assert_eq!(sizes.vertex_buffer_bytes(), 144);
    }

    #[test]
    fn test_sample_positions_span_domain() {
        let grid = Grid::new(9).unwrap();
        let lo = grid.sample_position(UVec3::ZERO, 2.0);
        let hi = grid.sample_position(UVec3::splat(8), 2.0);
        let mid = grid.sample_position(UVec3::splat(4), 2.0);
        assert!((lo - Vec3::splat(-2.0)).length() < 1e-6);
        assert!((hi - Vec3::splat(2.0)).length() < 1e-6);
        assert!(mid.length() < 1e-6);
        assert!((grid.spacing(2.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_sample_index_roundtrip() {
        let grid = Grid::new(5).unwrap();
        let index = grid.sample_index(1, 2, 3);
        assert_eq!(index, 1 + 5 * 2 + 25 * 3);
        assert_eq!(grid.sample_coords(index), UVec3::new(1, 2, 3));
    }

    #[test]
    fn test_workgroups_cover_grid() {
        let grid = Grid::new(10).unwrap();
        assert_eq!(grid.workgroups(4), 3);
        assert_eq!(Grid::new(8).unwrap().workgroups(4), 2);
    }

    #[test]
    fn test_grid_serde_validates() {
        let grid: Grid = serde_json::from_str("32").unwrap();
        assert_eq!(grid.resolution(), 32);
        assert!(serde_json::from_str::<Grid>("1").is_err());
        assert_eq!(serde_json::to_string(&grid).unwrap(), "32");
    }

    proptest! {
        #[test]
        fn prop_capacities_follow_resolution(r in MIN_RESOLUTION..=MAX_RESOLUTION) {
            let sizes = Grid::new(r).unwrap().buffer_sizes();
            let cells = u64::from(r - 1).pow(3);
            prop_assert_eq!(sizes.cell_count, cells);
            prop_assert_eq!(sizes.vertex_components, 3 * 12 * cells);
            prop_assert_eq!(sizes.index_count, 15 * cells);
            prop_assert_eq!(sizes.volume_elements, u64::from(r).pow(3));
            prop_assert!(sizes.largest_buffer_bytes() <= sizes.total_bytes());
        }
    }
}
