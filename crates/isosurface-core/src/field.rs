//! Scalar fields sampled on the grid.

use glam::{UVec3, Vec3};

use crate::grid::Grid;

/// A scalar function of position.
pub trait ScalarField {
    /// Field value at `p`.
    fn value(&self, p: Vec3) -> f32;

    /// Gradient at `p` by central differences with step `eps`.
    fn gradient(&self, p: Vec3, eps: f32) -> Vec3 {
        central_difference(|q| self.value(q), p, eps)
    }
}

impl<F: Fn(Vec3) -> f32> ScalarField for F {
    fn value(&self, p: Vec3) -> f32 {
        self(p)
    }
}

/// Central-difference gradient of `f` at `p`.
pub fn central_difference(f: impl Fn(Vec3) -> f32, p: Vec3, eps: f32) -> Vec3 {
    let dx = Vec3::new(eps, 0.0, 0.0);
    let dy = Vec3::new(0.0, eps, 0.0);
    let dz = Vec3::new(0.0, 0.0, eps);
    Vec3::new(
        f(p + dx) - f(p - dx),
        f(p + dy) - f(p - dy),
        f(p + dz) - f(p - dz),
    ) / (2.0 * eps)
}

/// Samples `field` at every grid corner of `[-half_extent, half_extent]³`.
///
/// The layout matches the GPU volume buffer: index `i + R*j + R²*k`.
pub fn sample_volume(field: &impl ScalarField, grid: Grid, half_extent: f32) -> Vec<f32> {
    let r = grid.resolution();
    let mut volume = Vec::with_capacity(grid.buffer_sizes().volume_elements as usize);
    for k in 0..r {
        for j in 0..r {
            for i in 0..r {
                let p = grid.sample_position(UVec3::new(i, j, k), half_extent);
                volume.push(field.value(p));
            }
        }
    }
    volume
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_central_difference_of_quadratic() {
        let f = |p: Vec3| p.length_squared();
        let g = f.gradient(Vec3::new(1.0, -2.0, 0.5), 1e-3);
        assert!((g - Vec3::new(2.0, -4.0, 1.0)).length() < 1e-2);
    }

    #[test]
    fn test_sample_volume_layout() {
        let grid = Grid::new(3).unwrap();
        let volume = sample_volume(&|p: Vec3| p.x + 10.0 * p.y + 100.0 * p.z, grid, 1.0);
        assert_eq!(volume.len(), 27);
        // (i, j, k) = (2, 0, 1) -> p = (1, -1, 0)
        let index = grid.sample_index(2, 0, 1);
        assert!((volume[index] - (1.0 - 10.0)).abs() < 1e-5);
    }
}
