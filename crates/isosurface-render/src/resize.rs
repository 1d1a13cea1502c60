//! Resolution changes.
//!
//! A resize builds a complete replacement [`GridResources`] before touching
//! the active one, so a failed allocation leaves the previous grid rendering
//! and no bind group ever refers to buffers of two different sizes.

use isosurface_core::Grid;

use crate::error::RenderResult;
use crate::extraction_pass::ExtractionPass;
use crate::field_pass::FieldPass;
use crate::resources::GridResources;

/// Owns the active resource set and any pending resolution change.
pub struct ResizeController {
    current: GridResources,
    pending: Option<Grid>,
    generation: u64,
}

impl ResizeController {
    /// Allocates the initial resource set for `grid`.
    pub fn new(
        device: &wgpu::Device,
        grid: Grid,
        field_pass: &FieldPass,
        extraction_pass: &ExtractionPass,
    ) -> RenderResult<Self> {
        let current = GridResources::new(device, grid, field_pass, extraction_pass)?;
        log::info!("grid resolution {}", grid.resolution());
        Ok(Self {
            current,
            pending: None,
            generation: 0,
        })
    }

    /// Records a resolution change to apply before the next frame.
    ///
    /// Asking for the active resolution cancels any pending change.
    pub fn request(&mut self, resolution: u32) -> isosurface_core::Result<()> {
        let grid = Grid::new(resolution)?;
        if grid == self.current.grid() {
            self.pending = None;
        } else {
            self.pending = Some(grid);
        }
        Ok(())
    }

    /// The resolution waiting to be applied, if any.
    #[must_use]
    pub fn pending(&self) -> Option<Grid> {
        self.pending
    }

    /// Applies a pending change. Returns whether the resource set was replaced.
    ///
    /// On failure the pending request is dropped and the previous set stays active.
    pub fn apply_pending(
        &mut self,
        device: &wgpu::Device,
        field_pass: &FieldPass,
        extraction_pass: &ExtractionPass,
    ) -> RenderResult<bool> {
        let Some(grid) = self.pending.take() else {
            return Ok(false);
        };

        match GridResources::new(device, grid, field_pass, extraction_pass) {
            Ok(resources) => {
                log::info!(
                    "grid resolution {} -> {}",
                    self.current.grid().resolution(),
                    grid.resolution()
                );
                self.current = resources;
                self.generation += 1;
                Ok(true)
            }
            Err(err) => {
                log::error!(
                    "cannot switch to resolution {}: {err}; keeping {}",
                    grid.resolution(),
                    self.current.grid().resolution()
                );
                Err(err)
            }
        }
    }

    /// The active resource set.
    #[must_use]
    pub fn resources(&self) -> &GridResources {
        &self.current
    }

    #[must_use]
    pub fn grid(&self) -> Grid {
        self.current.grid()
    }

    /// Number of completed switches; changes whenever the resource set is replaced.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
