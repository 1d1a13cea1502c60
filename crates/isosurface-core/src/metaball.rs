//! Metaball particles and their per-frame dynamics.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{IsosurfaceError, Result};
use crate::field::ScalarField;

/// Half-extent of the box the metaballs live in.
pub const METABALL_DOMAIN: f32 = 4.0;

/// Distance kept between the balls and the domain walls.
pub const WALL_PADDING: f32 = 0.9;

/// Default number of metaballs.
pub const DEFAULT_METABALL_COUNT: usize = 200;

/// Upper bound on the metaball count the field stage binds.
pub const MAX_METABALLS: usize = 1024;

/// Seconds between redraws of the strength and subtract targets.
pub const RETARGET_INTERVAL: f32 = 5.0;

const SPRING_STIFFNESS: f32 = 20.0;
const VELOCITY_SCALE: f32 = 1e-4;
const EASE_RATE: f32 = 4.0;

/// Per-ball GPU record; 32 bytes to match the shader's struct stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct GpuMetaball {
    pub position: [f32; 3],
    /// Distance where the contribution falls to zero: sqrt(strength / subtract).
    pub radius: f32,
    pub strength: f32,
    pub subtract: f32,
    pub _padding: [f32; 2],
}

impl GpuMetaball {
    /// Builds the record, deriving the radius.
    #[must_use]
    pub fn new(position: Vec3, strength: f32, subtract: f32) -> Self {
        Self {
            position: position.to_array(),
            radius: (strength / subtract).sqrt(),
            strength,
            subtract,
            _padding: [0.0; 2],
        }
    }

    /// Contribution of this ball at `p`; zero beyond `radius`.
    #[must_use]
    pub fn contribution(&self, p: Vec3) -> f32 {
        let d2 = (p - Vec3::from_array(self.position)).length_squared();
        (self.strength / (d2 + 1e-6) - self.subtract).max(0.0)
    }
}

/// The metaball field: the sum of every ball's contribution.
#[derive(Debug, Clone, Copy)]
pub struct MetaballField<'a> {
    pub balls: &'a [GpuMetaball],
}

impl ScalarField for MetaballField<'_> {
    fn value(&self, p: Vec3) -> f32 {
        self.balls.iter().map(|ball| ball.contribution(p)).sum()
    }
}

/// A single particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metaball {
    pub position: Vec3,
    pub velocity: Vec3,
    pub speed: f32,
}

impl Metaball {
    /// Advances the particle by `dt` seconds and reflects it off the walls at
    /// `±width`.
    pub fn step(&mut self, dt: f32, width: f32) {
        self.velocity += -self.position * self.speed * SPRING_STIFFNESS;
        self.position += self.velocity * self.speed * dt * VELOCITY_SCALE;

        for axis in 0..3 {
            if self.position[axis] > width {
                self.position[axis] = width;
                self.velocity[axis] = -self.velocity[axis];
            } else if self.position[axis] < -width {
                self.position[axis] = -width;
                self.velocity[axis] = -self.velocity[axis];
            }
        }
    }
}

/// A scalar that eases toward a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedScalar {
    pub value: f32,
    pub target: f32,
}

impl AnimatedScalar {
    #[must_use]
    pub fn new(value: f32) -> Self {
        Self {
            value,
            target: value,
        }
    }

    /// Moves `value` toward `target` at rate 4 per second.
    pub fn ease(&mut self, dt: f32) {
        self.value += (self.target - self.value) * dt * EASE_RATE;
    }
}

/// All metaballs plus the shared strength and subtract parameters.
#[derive(Debug, Clone)]
pub struct MetaballSystem {
    balls: Vec<Metaball>,
    strength: AnimatedScalar,
    subtract: AnimatedScalar,
    retarget_clock: f32,
    rng: StdRng,
}

impl MetaballSystem {
    /// Creates `count` balls seeded from OS entropy.
    pub fn new(count: usize) -> Result<Self> {
        Self::with_rng(count, StdRng::from_entropy())
    }

    /// Creates `count` balls from a fixed seed.
    pub fn with_seed(count: usize, seed: u64) -> Result<Self> {
        Self::with_rng(count, StdRng::seed_from_u64(seed))
    }

    fn with_rng(count: usize, mut rng: StdRng) -> Result<Self> {
        if count > MAX_METABALLS {
            return Err(IsosurfaceError::TooManyMetaballs {
                count,
                max: MAX_METABALLS,
            });
        }

        let balls = (0..count)
            .map(|_| Metaball {
                position: Vec3::new(
                    rng.gen_range(-METABALL_DOMAIN..METABALL_DOMAIN),
                    rng.gen_range(-METABALL_DOMAIN..METABALL_DOMAIN),
                    rng.gen_range(-METABALL_DOMAIN..METABALL_DOMAIN),
                ),
                velocity: Vec3::new(
                    rng.gen_range(0.0..1000.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(0.0..1000.0),
                ),
                speed: rng.gen_range(0.3..2.3),
            })
            .collect();

        log::debug!("created {count} metaballs");

        Ok(Self {
            balls,
            strength: AnimatedScalar::new(1.0),
            subtract: AnimatedScalar::new(1.0),
            retarget_clock: 0.0,
            rng,
        })
    }

    /// Wall position the balls bounce off.
    #[must_use]
    pub fn wall(&self) -> f32 {
        METABALL_DOMAIN - WALL_PADDING
    }

    /// Advances the system by one frame.
    ///
    /// Targets are redrawn every [`RETARGET_INTERVAL`] seconds of `wall_dt`;
    /// motion and easing run on `sim_dt`, which may be scaled or zero.
    pub fn step(&mut self, wall_dt: f32, sim_dt: f32) {
        self.retarget_clock += wall_dt;
        while self.retarget_clock >= RETARGET_INTERVAL {
            self.retarget_clock -= RETARGET_INTERVAL;
            self.retarget();
        }

        self.subtract.ease(sim_dt);
        self.strength.ease(sim_dt);

        let width = self.wall();
        for ball in &mut self.balls {
            ball.step(sim_dt, width);
        }
    }

    /// Draws new strength and subtract targets from [3, 6).
    pub fn retarget(&mut self) {
        self.subtract.target = self.rng.gen_range(3.0..6.0);
        self.strength.target = self.rng.gen_range(3.0..6.0);
    }

    /// Packs the balls for upload.
    #[must_use]
    pub fn gpu_balls(&self) -> Vec<GpuMetaball> {
        self.balls
            .iter()
            .map(|ball| GpuMetaball::new(ball.position, self.strength.value, self.subtract.value))
            .collect()
    }

    #[must_use]
    pub fn balls(&self) -> &[Metaball] {
        &self.balls
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.balls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    #[must_use]
    pub fn strength(&self) -> AnimatedScalar {
        self.strength
    }

    #[must_use]
    pub fn subtract(&self) -> AnimatedScalar {
        self.subtract
    }
}
