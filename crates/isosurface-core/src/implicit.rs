//! Catalog of implicit surfaces.
//!
//! Each surface is the zero set of `evaluate`, with the inside where the
//! function is negative. The numeric ids are shared with the field shader,
//! which implements the same formulas.

#![allow(clippy::many_single_char_names)]

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::IsosurfaceError;
use crate::field::ScalarField;

const GOLDEN_RATIO: f32 = 1.618_034;
const SPIDER_CAGE_ANGLE: f32 = 0.6;

/// A closed set of implicit surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImplicitSurface {
    /// Unit sphere.
    #[default]
    Sphere,
    /// Schwarz P triply periodic surface.
    SchwartzSurface,
    /// Sphere perturbed by sine waves.
    Blobs,
    /// Klein bottle.
    Klein,
    /// Torus with major radius 1 and minor radius 0.4.
    Torus,
    /// Chmutov surface of degree 4.
    Chmutov,
    /// Schoen gyroid.
    Gyroid,
    /// Morph between a sphere and a rounded cube.
    CubeSphere,
    /// Three orthogonal tori.
    OrthoCircle,
    /// Gabriel's horn, mirrored along x.
    GabrielHorn,
    /// Spider cage.
    SpiderCage,
    /// Barth sextic.
    BarthSextic,
    /// Height field of the negated Laplacian of a Gaussian.
    LaplaceGaussian,
}

impl ImplicitSurface {
    /// Every surface, ordered by id.
    pub const ALL: [ImplicitSurface; 13] = [
        ImplicitSurface::Sphere,
        ImplicitSurface::SchwartzSurface,
        ImplicitSurface::Blobs,
        ImplicitSurface::Klein,
        ImplicitSurface::Torus,
        ImplicitSurface::Chmutov,
        ImplicitSurface::Gyroid,
        ImplicitSurface::CubeSphere,
        ImplicitSurface::OrthoCircle,
        ImplicitSurface::GabrielHorn,
        ImplicitSurface::SpiderCage,
        ImplicitSurface::BarthSextic,
        ImplicitSurface::LaplaceGaussian,
    ];

    /// Numeric id used by the field shader.
    #[must_use]
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Looks up a surface by its shader id.
    #[must_use]
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Catalog name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ImplicitSurface::Sphere => "sphere",
            ImplicitSurface::SchwartzSurface => "schwartzSurface",
            ImplicitSurface::Blobs => "blobs",
            ImplicitSurface::Klein => "klein",
            ImplicitSurface::Torus => "torus",
            ImplicitSurface::Chmutov => "chmutov",
            ImplicitSurface::Gyroid => "gyroid",
            ImplicitSurface::CubeSphere => "cubeSphere",
            ImplicitSurface::OrthoCircle => "orthoCircle",
            ImplicitSurface::GabrielHorn => "gabrielHorn",
            ImplicitSurface::SpiderCage => "spiderCage",
            ImplicitSurface::BarthSextic => "barthSextic",
            ImplicitSurface::LaplaceGaussian => "laplaceGaussian",
        }
    }

    /// Half-extent of the sampled domain at user scale 1.
    #[must_use]
    pub fn default_extent(self) -> f32 {
        match self {
            ImplicitSurface::Sphere | ImplicitSurface::CubeSphere => 1.4,
            ImplicitSurface::SchwartzSurface | ImplicitSurface::GabrielHorn => 4.0,
            ImplicitSurface::Blobs | ImplicitSurface::Torus => 1.6,
            ImplicitSurface::Klein | ImplicitSurface::LaplaceGaussian => 3.0,
            ImplicitSurface::Chmutov => 1.3,
            ImplicitSurface::Gyroid | ImplicitSurface::SpiderCage => 5.0,
            ImplicitSurface::OrthoCircle => 1.5,
            ImplicitSurface::BarthSextic => 1.7,
        }
    }

    /// Whether the shape changes with animation time.
    #[must_use]
    pub fn is_animated(self) -> bool {
        matches!(
            self,
            ImplicitSurface::Blobs | ImplicitSurface::Gyroid | ImplicitSurface::CubeSphere
        )
    }

    /// Evaluates the surface function at `p` for animation time `time`.
    #[must_use]
    pub fn evaluate(self, p: Vec3, time: f32) -> f32 {
        let Vec3 { x, y, z } = p;
        let (x2, y2, z2) = (x * x, y * y, z * z);
        let r2 = x2 + y2 + z2;
        match self {
            ImplicitSurface::Sphere => r2 - 1.0,
            ImplicitSurface::SchwartzSurface => x.cos() + y.cos() + z.cos(),
            ImplicitSurface::Blobs => {
                r2 + (4.0 * x + time).sin() + (4.0 * y + time).sin() + (4.0 * z + time).sin()
                    - 1.0
            }
            ImplicitSurface::Klein => {
                let a = r2 + 2.0 * y - 1.0;
                let b = r2 - 2.0 * y - 1.0;
                a * (b * b - 8.0 * z2) + 16.0 * x * z * b
            }
            ImplicitSurface::Torus => {
                let ring = (x2 + y2).sqrt() - 1.0;
                ring * ring + z2 - 0.16
            }
            ImplicitSurface::Chmutov => 8.0 * (x2 * x2 + y2 * y2 + z2 * z2) - 8.0 * r2 + 3.0,
            ImplicitSurface::Gyroid => {
                let (x, y, z) = (x + time, y + time, z + time);
                x.sin() * y.cos() + y.sin() * z.cos() + z.sin() * x.cos()
            }
            ImplicitSurface::CubeSphere => {
                let s = 0.5 * (time.sin() + 1.0);
                let cube = (x2 * x2) * (x2 * x2) + (y2 * y2) * (y2 * y2) + (z2 * z2) * (z2 * z2);
                (1.0 - s) * (r2 - 1.0) + s * (cube - 1.0)
            }
            ImplicitSurface::OrthoCircle => {
                let a = (x2 + y2 - 1.0) * (x2 + y2 - 1.0) + z2;
                let b = (y2 + z2 - 1.0) * (y2 + z2 - 1.0) + x2;
                let c = (z2 + x2 - 1.0) * (z2 + x2 - 1.0) + y2;
                a * b * c - 0.075 * 0.075 * (1.0 + 3.0 * r2)
            }
            ImplicitSurface::GabrielHorn => x2 * (y2 + z2) - 1.0,
            ImplicitSurface::SpiderCage => {
                let rho2 = x2 + y2 + 1e-6;
                let (sa, ca) = SPIDER_CAGE_ANGLE.sin_cos();
                let outer = ((x2 - y2) * (x2 - y2) / rho2 + 3.0 * (z * sa) * (z * sa)).sqrt() - 3.0;
                let inner = ((x * y) * (x * y) / rho2 + (z * ca) * (z * ca)).sqrt() - 1.5;
                outer * outer + 6.0 * inner * inner - 1.0
            }
            ImplicitSurface::BarthSextic => {
                let p2 = GOLDEN_RATIO * GOLDEN_RATIO;
                let w = r2 - 1.0;
                4.0 * (p2 * x2 - y2) * (p2 * y2 - z2) * (p2 * z2 - x2)
                    - (1.0 + 2.0 * GOLDEN_RATIO) * w * w
            }
            ImplicitSurface::LaplaceGaussian => {
                let rho2 = x2 + y2;
                z - 2.0 * (1.0 - 0.5 * rho2) * (-0.5 * rho2).exp()
            }
        }
    }
}

impl fmt::Display for ImplicitSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ImplicitSurface {
    type Err = IsosurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|surface| surface.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| IsosurfaceError::UnknownSurface(s.to_string()))
    }
}

/// An implicit surface frozen at one animation time.
#[derive(Debug, Clone, Copy)]
pub struct ImplicitField {
    pub surface: ImplicitSurface,
    pub time: f32,
}

impl ScalarField for ImplicitField {
    fn value(&self, p: Vec3) -> f32 {
        self.surface.evaluate(p, self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_roundtrip() {
        for (i, surface) in ImplicitSurface::ALL.iter().enumerate() {
            assert_eq!(surface.id() as usize, i);
            assert_eq!(ImplicitSurface::from_id(i as u32), Some(*surface));
        }
        assert_eq!(ImplicitSurface::from_id(13), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            "gyroid".parse::<ImplicitSurface>().unwrap(),
            ImplicitSurface::Gyroid
        );
        assert_eq!(
            "BarthSextic".parse::<ImplicitSurface>().unwrap(),
            ImplicitSurface::BarthSextic
        );
        assert!(matches!(
            "teapot".parse::<ImplicitSurface>(),
            Err(IsosurfaceError::UnknownSurface(_))
        ));
    }

    #[test]
    fn test_serde_uses_catalog_names() {
        let json = serde_json::to_string(&ImplicitSurface::SchwartzSurface).unwrap();
        assert_eq!(json, "\"schwartzSurface\"");
        let parsed: ImplicitSurface = serde_json::from_str("\"laplaceGaussian\"").unwrap();
        assert_eq!(parsed, ImplicitSurface::LaplaceGaussian);
    }

    #[test]
    fn test_known_surface_points() {
        let on_surface = [
            (ImplicitSurface::Sphere, Vec3::X),
            (ImplicitSurface::Torus, Vec3::new(1.4, 0.0, 0.0)),
            (ImplicitSurface::GabrielHorn, Vec3::new(2.0, 0.5, 0.0)),
        ];
        for (surface, p) in on_surface {
            assert!(surface.evaluate(p, 0.0).abs() < 1e-4, "{surface} at {p}");
        }
        // Schwarz P passes through the points where the cosines cancel.
        let p = Vec3::splat(std::f32::consts::FRAC_PI_2);
        assert!(ImplicitSurface::SchwartzSurface.evaluate(p, 0.0).abs() < 1e-5);
    }

    #[test]
    fn test_chmutov_sign_change() {
        let h = std::f32::consts::FRAC_1_SQRT_2;
        assert!((ImplicitSurface::Chmutov.evaluate(Vec3::ZERO, 0.0) - 3.0).abs() < 1e-6);
        assert!((ImplicitSurface::Chmutov.evaluate(Vec3::splat(h), 0.0) + 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_inside_is_negative() {
        assert!(ImplicitSurface::Sphere.evaluate(Vec3::ZERO, 0.0) < 0.0);
        assert!(ImplicitSurface::Sphere.evaluate(Vec3::splat(2.0), 0.0) > 0.0);
        assert!(ImplicitSurface::Torus.evaluate(Vec3::X, 0.0) < 0.0);
        assert!(ImplicitSurface::Torus.evaluate(Vec3::ZERO, 0.0) > 0.0);
    }

    #[test]
    fn test_only_animated_surfaces_depend_on_time() {
        let p = Vec3::new(0.3, -0.2, 0.7);
        for surface in ImplicitSurface::ALL {
            let changed = (surface.evaluate(p, 0.0) - surface.evaluate(p, 1.3)).abs() > 1e-6;
            assert_eq!(changed, surface.is_animated(), "{surface}");
        }
    }

    #[test]
    fn test_cube_sphere_is_sphere_at_rest() {
        // sin(-pi/2) = -1 selects the pure sphere.
        let t = -std::f32::consts::FRAC_PI_2;
        let p = Vec3::new(0.0, 1.0, 0.0);
        assert!(ImplicitSurface::CubeSphere.evaluate(p, t).abs() < 1e-5);
    }

    #[test]
    fn test_every_surface_crosses_zero_in_domain() {
        for surface in ImplicitSurface::ALL {
            let field = ImplicitField { surface, time: 0.0 };
            let grid = crate::grid::Grid::new(24).unwrap();
            let volume = crate::field::sample_volume(&field, grid, surface.default_extent());
            let has_inside = volume.iter().any(|&v| v < 0.0);
            let has_outside = volume.iter().any(|&v| v >= 0.0);
            assert!(has_inside && has_outside, "{surface} never crosses zero");
        }
    }
}
