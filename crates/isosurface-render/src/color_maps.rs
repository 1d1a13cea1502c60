//! Color map system.
//!
//! The extraction shader colors vertices from a lookup table holding
//! [`LUT_SAMPLES`] evenly spaced samples of every catalog colormap, ordered by
//! colormap id.

use glam::Vec3;
use isosurface_core::colormap::{COLORMAP_COUNT, COLORMAP_NAMES};

/// Samples per colormap in the GPU lookup table.
pub const LUT_SAMPLES: usize = 64;

/// Entries in the GPU lookup table.
pub const LUT_LEN: usize = COLORMAP_COUNT * LUT_SAMPLES;

/// A color map for mapping scalar values to colors.
#[derive(Debug, Clone)]
pub struct ColorMap {
    /// Color map name.
    pub name: String,
    /// Color samples (evenly spaced from 0 to 1).
    pub colors: Vec<Vec3>,
}

impl ColorMap {
    /// Creates a new color map.
    pub fn new(name: impl Into<String>, colors: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            colors,
        }
    }

    /// Samples the color map at a given value (0 to 1).
    #[must_use]
    pub fn sample(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);

        if self.colors.is_empty() {
            return Vec3::ZERO;
        }

        if self.colors.len() == 1 {
            return self.colors[0];
        }

        let n = self.colors.len() - 1;
        let idx = (t * n as f32).floor() as usize;
        let idx = idx.min(n - 1);
        let frac = t * n as f32 - idx as f32;

        self.colors[idx].lerp(self.colors[idx + 1], frac)
    }
}

/// The colormap catalog, indexed by colormap id.
pub struct ColorMapRegistry {
    color_maps: Vec<ColorMap>,
}

impl ColorMapRegistry {
    /// Creates the registry holding every catalog colormap.
    #[must_use]
    pub fn new() -> Self {
        let color_maps = COLORMAP_NAMES
            .iter()
            .map(|&name| ColorMap::new(name, catalog_colors(name)))
            .collect();
        Self { color_maps }
    }

    /// Gets a color map by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ColorMap> {
        self.color_maps.iter().find(|map| map.name == name)
    }

    /// Gets a color map by id.
    #[must_use]
    pub fn get_by_id(&self, id: u32) -> Option<&ColorMap> {
        self.color_maps.get(id as usize)
    }

    /// Catalog id of the colormap called `name`.
    #[must_use]
    pub fn id_by_name(&self, name: &str) -> Option<u32> {
        self.color_maps
            .iter()
            .position(|map| map.name == name)
            .and_then(|id| u32::try_from(id).ok())
    }

    /// Samples colormap `id` at `t`.
    #[must_use]
    pub fn sample(&self, id: u32, t: f32) -> Option<Vec3> {
        self.get_by_id(id).map(|map| map.sample(t))
    }

    /// Returns all color map names in id order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.color_maps.iter().map(|map| map.name.as_str())
    }

    /// Resamples every colormap into the GPU lookup table layout.
    #[must_use]
    pub fn lut(&self) -> Vec<[f32; 4]> {
        let mut lut = Vec::with_capacity(LUT_LEN);
        for map in &self.color_maps {
            for i in 0..LUT_SAMPLES {
                let t = i as f32 / (LUT_SAMPLES - 1) as f32;
                lut.push(map.sample(t).extend(1.0).to_array());
            }
        }
        lut
    }
}

impl Default for ColorMapRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn rgb(r: f32, g: f32, b: f32) -> Vec3 {
    Vec3::new(r, g, b)
}

#[allow(clippy::match_same_arms)]
fn catalog_colors(name: &str) -> Vec<Vec3> {
    match name {
        "jet" => vec![
            rgb(0.0, 0.0, 0.5),
            rgb(0.0, 0.0, 1.0),
            rgb(0.0, 0.5, 1.0),
            rgb(0.0, 1.0, 1.0),
            rgb(0.5, 1.0, 0.5),
            rgb(1.0, 1.0, 0.0),
            rgb(1.0, 0.5, 0.0),
            rgb(1.0, 0.0, 0.0),
            rgb(0.5, 0.0, 0.0),
        ],
        "hsv" => vec![
            rgb(1.0, 0.0, 0.0),
            rgb(1.0, 1.0, 0.0),
            rgb(0.0, 1.0, 0.0),
            rgb(0.0, 1.0, 1.0),
            rgb(0.0, 0.0, 1.0),
            rgb(1.0, 0.0, 1.0),
            rgb(1.0, 0.0, 0.0),
        ],
        "hot" => vec![
            rgb(0.0, 0.0, 0.0),
            rgb(1.0, 0.0, 0.0),
            rgb(1.0, 1.0, 0.0),
            rgb(1.0, 1.0, 1.0),
        ],
        "cool" => vec![rgb(0.0, 1.0, 1.0), rgb(1.0, 0.0, 1.0)],
        "spring" => vec![rgb(1.0, 0.0, 1.0), rgb(1.0, 1.0, 0.0)],
        "summer" => vec![rgb(0.0, 0.5, 0.4), rgb(1.0, 1.0, 0.4)],
        "autumn" => vec![rgb(1.0, 0.0, 0.0), rgb(1.0, 1.0, 0.0)],
        "winter" => vec![rgb(0.0, 0.0, 1.0), rgb(0.0, 1.0, 0.5)],
        "bone" => vec![
            rgb(0.0, 0.0, 0.0),
            rgb(0.319, 0.319, 0.444),
            rgb(0.652, 0.777, 0.777),
            rgb(1.0, 1.0, 1.0),
        ],
        "cooper" => vec![
            rgb(0.0, 0.0, 0.0),
            rgb(1.0, 0.625, 0.398),
            rgb(1.0, 0.781, 0.497),
        ],
        "greys" => vec![rgb(0.0, 0.0, 0.0), rgb(1.0, 1.0, 1.0)],
        "rainbow" => vec![
            rgb(0.5, 0.0, 1.0),
            rgb(0.0, 0.0, 1.0),
            rgb(0.0, 1.0, 1.0),
            rgb(0.0, 1.0, 0.0),
            rgb(1.0, 1.0, 0.0),
            rgb(1.0, 0.0, 0.0),
        ],
        "rainbow_soft" => vec![
            rgb(0.49, 0.0, 0.7),
            rgb(1.0, 0.0, 0.5),
            rgb(1.0, 0.5, 0.0),
            rgb(0.9, 0.9, 0.2),
            rgb(0.4, 1.0, 0.4),
            rgb(0.0, 0.8, 0.8),
            rgb(0.2, 0.4, 1.0),
        ],
        "white" => vec![rgb(1.0, 1.0, 1.0)],
        "black" => vec![rgb(0.0, 0.0, 0.0)],
        "red" => vec![rgb(1.0, 0.0, 0.0)],
        "green" => vec![rgb(0.0, 1.0, 0.0)],
        "blue" => vec![rgb(0.0, 0.0, 1.0)],
        "yellow" => vec![rgb(1.0, 1.0, 0.0)],
        "cyan" => vec![rgb(0.0, 1.0, 1.0)],
        "fuchsia" => vec![rgb(1.0, 0.0, 1.0)],
        "terrain" => vec![
            rgb(0.2, 0.2, 0.6),
            rgb(0.0, 0.6, 1.0),
            rgb(0.0, 0.8, 0.4),
            rgb(1.0, 1.0, 0.6),
            rgb(0.5, 0.36, 0.33),
            rgb(1.0, 1.0, 1.0),
        ],
        "ocean" => vec![
            rgb(0.0, 0.5, 0.0),
            rgb(0.0, 0.0, 0.5),
            rgb(0.0, 0.5, 1.0),
            rgb(1.0, 1.0, 1.0),
        ],
        _ => vec![rgb(1.0, 1.0, 1.0)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isosurface_core::colormap_id;

    #[test]
    fn test_registry_follows_catalog_order() {
        let registry = ColorMapRegistry::new();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, COLORMAP_NAMES.to_vec());
        let ocean = colormap_id("ocean").unwrap();
        assert_eq!(registry.get_by_id(ocean).unwrap().name, "ocean");
        assert!(registry.get("viridis").is_none());
        assert_eq!(registry.id_by_name("ocean"), Some(ocean));
        assert_eq!(registry.sample(ocean, 1.0), Some(Vec3::ONE));
        assert_eq!(registry.sample(99, 0.5), None);
    }

    #[test]
    fn test_sample_endpoints() {
        let registry = ColorMapRegistry::new();
        let hot = registry.get("hot").unwrap();
        assert_eq!(hot.sample(0.0), Vec3::ZERO);
        assert_eq!(hot.sample(1.0), Vec3::ONE);
        assert_eq!(hot.sample(2.0), Vec3::ONE);
        let red = registry.get("red").unwrap();
        assert_eq!(red.sample(0.3), Vec3::X);
    }

    #[test]
    fn test_lut_layout() {
        let registry = ColorMapRegistry::new();
        let lut = registry.lut();
        assert_eq!(lut.len(), LUT_LEN);
        // First sample of "hot" is black, last of "greys" is white.
        let hot = colormap_id("hot").unwrap() as usize;
        assert_eq!(lut[hot * LUT_SAMPLES], [0.0, 0.0, 0.0, 1.0]);
        let greys = colormap_id("greys").unwrap() as usize;
        assert_eq!(lut[(greys + 1) * LUT_SAMPLES - 1], [1.0, 1.0, 1.0, 1.0]);
    }
}
