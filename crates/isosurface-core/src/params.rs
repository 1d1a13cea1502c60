//! User-editable parameters for both applications.
//!
//! Parameters serialize to JSON so a session can be started from a file.
//! Missing fields fall back to their defaults.

use std::path::Path;

use glam::Vec3;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::colormap::{colormap_id, ColormapAxis};
use crate::error::{IsosurfaceError, Result};
use crate::grid::Grid;
use crate::implicit::ImplicitSurface;
use crate::metaball::{DEFAULT_METABALL_COUNT, MAX_METABALLS, METABALL_DOMAIN};

/// Blinn-Phong material and light settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingParams {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
    pub specular_color: Vec3,
    /// Direction the light travels in.
    pub light_direction: Vec3,
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            ambient: 0.1,
            diffuse: 0.7,
            specular: 0.4,
            shininess: 30.0,
            specular_color: Vec3::splat(0xaa as f32 / 255.0),
            light_direction: Vec3::splat(-0.5),
        }
    }
}

/// Vertex coloring settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColoringParams {
    pub colormap: String,
    pub axis: ColormapAxis,
    pub reverse: bool,
}

impl Default for ColoringParams {
    fn default() -> Self {
        Self {
            colormap: "jet".to_string(),
            axis: ColormapAxis::Y,
            reverse: false,
        }
    }
}

impl ColoringParams {
    /// Catalog id of the selected colormap.
    pub fn colormap_id(&self) -> Result<u32> {
        colormap_id(&self.colormap)
            .ok_or_else(|| IsosurfaceError::UnknownColormap(self.colormap.clone()))
    }
}

/// Parameters of the implicit-surface application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceParams {
    pub resolution: u32,
    pub surface: ImplicitSurface,
    pub isolevel: f32,
    /// Multiplies the surface's preset domain extent.
    pub scale: f32,
    /// Multiplies elapsed seconds to get the animation time.
    pub animate_speed: f32,
    /// Model rotation speed in radians per second.
    pub rotation_speed: f32,
    pub coloring: ColoringParams,
    pub lighting: LightingParams,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            resolution: 96,
            surface: ImplicitSurface::Blobs,
            isolevel: 0.0,
            scale: 1.0,
            animate_speed: 1.0,
            rotation_speed: 1.0,
            coloring: ColoringParams::default(),
            lighting: LightingParams::default(),
        }
    }
}

impl SurfaceParams {
    /// Half-extent of the sampled domain.
    #[must_use]
    pub fn half_extent(&self) -> f32 {
        self.surface.default_extent() * self.scale
    }

    /// Checks every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        Grid::new(self.resolution)?;
        self.coloring.colormap_id()?;
        check_finite("isolevel", self.isolevel)?;
        check_positive("scale", self.scale)?;
        check_finite("animate_speed", self.animate_speed)?;
        check_finite("rotation_speed", self.rotation_speed)?;
        check_lighting(&self.lighting)
    }
}

/// Parameters of the metaball application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaballParams {
    pub resolution: u32,
    pub metaball_count: usize,
    pub isolevel: f32,
    /// Multiplies the metaball domain extent.
    pub scale: f32,
    /// Multiplies wall-clock time fed to the simulation.
    pub animate_speed: f32,
    pub coloring: ColoringParams,
    pub lighting: LightingParams,
}

impl Default for MetaballParams {
    fn default() -> Self {
        Self {
            resolution: 96,
            metaball_count: DEFAULT_METABALL_COUNT,
            isolevel: 20.0,
            scale: 1.0,
            animate_speed: 1.0,
            coloring: ColoringParams::default(),
            lighting: LightingParams::default(),
        }
    }
}

impl MetaballParams {
    /// Half-extent of the sampled domain.
    #[must_use]
    pub fn half_extent(&self) -> f32 {
        METABALL_DOMAIN * self.scale
    }

    /// Checks every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        Grid::new(self.resolution)?;
        self.coloring.colormap_id()?;
        if self.metaball_count > MAX_METABALLS {
            return Err(IsosurfaceError::TooManyMetaballs {
                count: self.metaball_count,
                max: MAX_METABALLS,
            });
        }
        check_positive("isolevel", self.isolevel)?;
        check_positive("scale", self.scale)?;
        check_finite("animate_speed", self.animate_speed)?;
        check_lighting(&self.lighting)
    }
}

/// JSON persistence for parameter sets.
pub trait JsonConfig: Serialize + DeserializeOwned {
    /// Parses parameters from a JSON string.
    fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes to pretty-printed JSON.
    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads parameters from a JSON file.
    fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        log::info!("loaded parameters from {}", path.display());
        Self::from_json(&text)
    }

    /// Writes parameters to a JSON file.
    fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl JsonConfig for SurfaceParams {}
impl JsonConfig for MetaballParams {}

fn check_finite(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(IsosurfaceError::InvalidParameter {
            name,
            reason: format!("{value} is not finite"),
        })
    }
}

fn check_positive(name: &'static str, value: f32) -> Result<()> {
    check_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(IsosurfaceError::InvalidParameter {
            name,
            reason: format!("{value} must be positive"),
        })
    }
}

fn check_lighting(lighting: &LightingParams) -> Result<()> {
    check_finite("ambient", lighting.ambient)?;
    check_finite("diffuse", lighting.diffuse)?;
    check_finite("specular", lighting.specular)?;
    check_positive("shininess", lighting.shininess)?;
    if lighting.light_direction.length_squared() == 0.0 {
        return Err(IsosurfaceError::InvalidParameter {
            name: "light_direction",
            reason: "must be non-zero".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        SurfaceParams::default().validate().unwrap();
        MetaballParams::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params = SurfaceParams::from_json(r#"{"surface": "torus", "resolution": 64}"#).unwrap();
        assert_eq!(params.surface, ImplicitSurface::Torus);
        assert_eq!(params.resolution, 64);
        assert_eq!(params.coloring.colormap, "jet");
        assert_eq!(params.lighting, LightingParams::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut params = SurfaceParams {
            resolution: 1,
            ..SurfaceParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(IsosurfaceError::InvalidResolution { .. })
        ));

        params.resolution = 32;
        params.coloring.colormap = "plasma".to_string();
        assert!(matches!(
            params.validate(),
            Err(IsosurfaceError::UnknownColormap(_))
        ));

        params.coloring.colormap = "hot".to_string();
        params.scale = 0.0;
        assert!(matches!(
            params.validate(),
            Err(IsosurfaceError::InvalidParameter { name: "scale", .. })
        ));
    }

    #[test]
    fn test_metaball_count_limit() {
        let params = MetaballParams {
            metaball_count: MAX_METABALLS + 1,
            ..MetaballParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(IsosurfaceError::TooManyMetaballs { .. })
        ));
    }

    #[test]
    fn test_half_extent_scales_preset() {
        let params = SurfaceParams {
            surface: ImplicitSurface::Sphere,
            scale: 2.0,
            ..SurfaceParams::default()
        };
        assert!((params.half_extent() - 2.8).abs() < 1e-6);
        assert!((MetaballParams::default().half_extent() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_file_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "isosurface_params_test_{}.json",
            std::process::id()
        ));
        let params = MetaballParams {
            isolevel: 12.5,
            coloring: ColoringParams {
                colormap: "ocean".to_string(),
                axis: ColormapAxis::Radial,
                reverse: true,
            },
            ..MetaballParams::default()
        };
        params.to_json_file(&path).unwrap();
        let loaded = MetaballParams::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, params);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = SurfaceParams::from_json_file("/nonexistent/isosurface/params.json");
        assert!(matches!(result, Err(IsosurfaceError::Io(_))));
    }
}
