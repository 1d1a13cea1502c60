//! Per-frame application state.
//!
//! A [`SurfaceScene`] holds the user parameters, the animation clocks and,
//! for the metaball viewer, the simulation. It turns them into the uniforms
//! of one regeneration and the model matrix of one draw.

use glam::{Mat4, Vec3};
use isosurface_core::{
    GpuMetaball, Grid, ImplicitSurface, LightingParams, MetaballParams, MetaballSystem, Result,
    SurfaceParams,
};
use isosurface_render::{
    model_matrix, ExtractionUniforms, FieldSource, FieldUniforms, GenerationInputs,
    NORMAL_SIGN_ABOVE, NORMAL_SIGN_BELOW,
};
use isosurface_ui::ParamsResponse;

use crate::render_error;

/// Longest step fed to the animation; hides stalls such as window drags.
const MAX_FRAME_STEP: f32 = 0.1;

/// Which viewer the scene drives.
#[derive(Debug, Clone)]
pub enum SceneVariant {
    Implicit(SurfaceParams),
    Metaballs {
        params: MetaballParams,
        system: MetaballSystem,
        /// Packed copy of `system`, refreshed every step.
        balls: Vec<GpuMetaball>,
    },
}

/// Parameters, clocks and simulation state of one viewer.
#[derive(Debug, Clone)]
pub struct SurfaceScene {
    variant: SceneVariant,
    /// Animation time fed to the implicit catalog.
    time: f32,
    /// Accumulated rotation angle of the implicit viewer.
    rotation_angle: f32,
    seed: Option<u64>,
}

impl SurfaceScene {
    /// Creates an implicit-surface scene.
    pub fn implicit(params: SurfaceParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            variant: SceneVariant::Implicit(params),
            time: 0.0,
            rotation_angle: 0.0,
            seed: None,
        })
    }

    /// Creates a metaball scene; `seed` makes the simulation reproducible.
    pub fn metaballs(params: MetaballParams, seed: Option<u64>) -> Result<Self> {
        params.validate()?;
        let system = new_system(params.metaball_count, seed)?;
        let balls = system.gpu_balls();
        Ok(Self {
            variant: SceneVariant::Metaballs {
                params,
                system,
                balls,
            },
            time: 0.0,
            rotation_angle: 0.0,
            seed,
        })
    }

    #[must_use]
    pub fn variant(&self) -> &SceneVariant {
        &self.variant
    }

    #[must_use]
    pub fn resolution(&self) -> u32 {
        match &self.variant {
            SceneVariant::Implicit(params) => params.resolution,
            SceneVariant::Metaballs { params, .. } => params.resolution,
        }
    }

    /// Overrides the resolution, e.g. after a resize was rejected.
    pub fn set_resolution(&mut self, resolution: u32) {
        match &mut self.variant {
            SceneVariant::Implicit(params) => params.resolution = resolution,
            SceneVariant::Metaballs { params, .. } => params.resolution = resolution,
        }
    }

    #[must_use]
    pub fn half_extent(&self) -> f32 {
        match &self.variant {
            SceneVariant::Implicit(params) => params.half_extent(),
            SceneVariant::Metaballs { params, .. } => params.half_extent(),
        }
    }

    #[must_use]
    pub fn lighting(&self) -> &LightingParams {
        match &self.variant {
            SceneVariant::Implicit(params) => &params.lighting,
            SceneVariant::Metaballs { params, .. } => &params.lighting,
        }
    }

    /// Current animation time of the implicit catalog.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advances clocks and the simulation by `dt` seconds of wall-clock time.
    pub fn advance(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_STEP);
        match &mut self.variant {
            SceneVariant::Implicit(params) => {
                if params.surface.is_animated() {
                    self.time += dt * params.animate_speed;
                }
                self.rotation_angle += dt * params.rotation_speed;
            }
            SceneVariant::Metaballs {
                params,
                system,
                balls,
            } => {
                system.step(dt, dt * params.animate_speed);
                *balls = system.gpu_balls();
            }
        }
    }

    /// Rebuilds the simulation when the requested ball count changed.
    pub fn sync_metaball_count(&mut self) -> Result<()> {
        if let SceneVariant::Metaballs {
            params,
            system,
            balls,
        } = &mut self.variant
        {
            if params.metaball_count != system.len() {
                *system = new_system(params.metaball_count, self.seed)?;
                *balls = system.gpu_balls();
            }
        }
        Ok(())
    }

    /// Model rotation in radians; the implicit viewer spins about x and y.
    #[must_use]
    pub fn rotation(&self) -> Vec3 {
        match self.variant {
            SceneVariant::Implicit(_) => {
                Vec3::new(self.rotation_angle.sin(), self.rotation_angle.cos(), 0.0)
            }
            SceneVariant::Metaballs { .. } => Vec3::ZERO,
        }
    }

    #[must_use]
    pub fn model_matrix(&self) -> Mat4 {
        model_matrix(self.rotation(), self.half_extent())
    }

    /// Uniforms and metaballs of one regeneration on `grid`.
    pub fn generation_inputs(&self, grid: Grid) -> Result<GenerationInputs<'_>> {
        let half_extent = self.half_extent();
        let inputs = match &self.variant {
            SceneVariant::Implicit(params) => GenerationInputs {
                source: FieldSource::Implicit,
                field: FieldUniforms::implicit(grid, params.surface, half_extent, self.time),
                extraction: ExtractionUniforms::new(
                    grid,
                    params.isolevel,
                    half_extent,
                    &params.coloring,
                    NORMAL_SIGN_BELOW,
                )
                .map_err(render_error)?,
                metaballs: &[],
            },
            SceneVariant::Metaballs { params, balls, .. } => GenerationInputs {
                source: FieldSource::Metaballs,
                field: FieldUniforms::metaballs(grid, ball_count(balls), half_extent),
                extraction: ExtractionUniforms::new(
                    grid,
                    params.isolevel,
                    half_extent,
                    &params.coloring,
                    NORMAL_SIGN_ABOVE,
                )
                .map_err(render_error)?,
                metaballs: balls,
            },
        };
        Ok(inputs)
    }

    /// Draws the control panel and reports the edits.
    pub fn ui(&mut self, ctx: &egui::Context) -> ParamsResponse {
        match &mut self.variant {
            SceneVariant::Implicit(params) => isosurface_ui::surface_panel(ctx, params),
            SceneVariant::Metaballs { params, .. } => isosurface_ui::metaball_panel(ctx, params),
        }
    }

    /// Window title for the viewer.
    #[must_use]
    pub fn title(&self) -> String {
        match &self.variant {
            SceneVariant::Implicit(params) => format!("Implicit surface: {}", params.surface),
            SceneVariant::Metaballs { .. } => "Metaballs".to_string(),
        }
    }

    /// Selected implicit surface, if this is the implicit viewer.
    #[must_use]
    pub fn surface(&self) -> Option<ImplicitSurface> {
        match &self.variant {
            SceneVariant::Implicit(params) => Some(params.surface),
            SceneVariant::Metaballs { .. } => None,
        }
    }
}

fn new_system(count: usize, seed: Option<u64>) -> Result<MetaballSystem> {
    match seed {
        Some(seed) => MetaballSystem::with_seed(count, seed),
        None => MetaballSystem::new(count),
    }
}

fn ball_count(balls: &[GpuMetaball]) -> u32 {
    u32::try_from(balls.len()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implicit_clock_only_runs_for_animated_surfaces() {
        let mut scene = SurfaceScene::implicit(SurfaceParams {
            surface: ImplicitSurface::Sphere,
            ..SurfaceParams::default()
        })
        .unwrap();
        scene.advance(0.05);
        assert!(scene.time().abs() < f32::EPSILON);

        let mut scene = SurfaceScene::implicit(SurfaceParams {
            surface: ImplicitSurface::Gyroid,
            animate_speed: 2.0,
            ..SurfaceParams::default()
        })
        .unwrap();
        scene.advance(0.05);
        assert!((scene.time() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_large_steps_are_clamped() {
        let mut scene = SurfaceScene::implicit(SurfaceParams {
            surface: ImplicitSurface::Blobs,
            ..SurfaceParams::default()
        })
        .unwrap();
        scene.advance(10.0);
        assert!((scene.time() - MAX_FRAME_STEP).abs() < 1e-6);
    }

    #[test]
    fn test_rotation_follows_angle() {
        let mut scene = SurfaceScene::implicit(SurfaceParams::default()).unwrap();
        assert_eq!(scene.rotation(), Vec3::new(0.0, 1.0, 0.0));
        scene.advance(0.1);
        let r = scene.rotation();
        assert!((r.x - 0.1f32.sin()).abs() < 1e-6);
        assert!((r.y - 0.1f32.cos()).abs() < 1e-6);
    }

    #[test]
    fn test_generation_inputs_match_variant() {
        let grid = Grid::new(24).unwrap();
        let scene = SurfaceScene::implicit(SurfaceParams {
            surface: ImplicitSurface::Torus,
            scale: 2.0,
            ..SurfaceParams::default()
        })
        .unwrap();
        let inputs = scene.generation_inputs(grid).unwrap();
        assert_eq!(inputs.source, FieldSource::Implicit);
        assert_eq!(inputs.field.surface_id, ImplicitSurface::Torus.id());
        assert!((inputs.field.half_extent - 3.2).abs() < 1e-6);
        assert!((inputs.extraction.normal_sign - NORMAL_SIGN_BELOW).abs() < f32::EPSILON);
        assert!(inputs.metaballs.is_empty());

        let scene = SurfaceScene::metaballs(
            MetaballParams {
                metaball_count: 12,
                ..MetaballParams::default()
            },
            Some(7),
        )
        .unwrap();
        let inputs = scene.generation_inputs(grid).unwrap();
        assert_eq!(inputs.source, FieldSource::Metaballs);
        assert_eq!(inputs.field.ball_count, 12);
        assert_eq!(inputs.metaballs.len(), 12);
        assert!((inputs.extraction.isolevel - 20.0).abs() < f32::EPSILON);
        assert!((inputs.extraction.normal_sign - NORMAL_SIGN_ABOVE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_metaball_retarget_runs_on_wall_clock() {
        for animate_speed in [0.0, 0.5, 5.0] {
            let mut scene = SurfaceScene::metaballs(
                MetaballParams {
                    metaball_count: 3,
                    animate_speed,
                    ..MetaballParams::default()
                },
                Some(2),
            )
            .unwrap();
            let strength_target = |scene: &SurfaceScene| match scene.variant() {
                SceneVariant::Metaballs { system, .. } => system.strength().target,
                SceneVariant::Implicit(_) => unreachable!(),
            };

            for _ in 0..45 {
                scene.advance(0.1);
            }
            assert_eq!(strength_target(&scene), 1.0, "speed {animate_speed}");
            for _ in 0..10 {
                scene.advance(0.1);
            }
            assert!(
                (3.0..6.0).contains(&strength_target(&scene)),
                "speed {animate_speed}"
            );
        }
    }

    #[test]
    fn test_metaball_count_sync_rebuilds_system() {
        let mut scene = SurfaceScene::metaballs(MetaballParams::default(), Some(1)).unwrap();
        if let SceneVariant::Metaballs { params, .. } = &mut scene.variant {
            params.metaball_count = 5;
        }
        scene.sync_metaball_count().unwrap();
        match scene.variant() {
            SceneVariant::Metaballs { system, balls, .. } => {
                assert_eq!(system.len(), 5);
                assert_eq!(balls.len(), 5);
            }
            SceneVariant::Implicit(_) => unreachable!(),
        }
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let params = SurfaceParams {
            resolution: 1,
            ..SurfaceParams::default()
        };
        assert!(SurfaceScene::implicit(params).is_err());
        let params = MetaballParams {
            metaball_count: 5000,
            ..MetaballParams::default()
        };
        assert!(SurfaceScene::metaballs(params, None).is_err());
    }
}
