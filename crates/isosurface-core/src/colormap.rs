//! Colormap catalog ids and the coordinate used to look colors up.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Catalog names, indexed by colormap id.
pub const COLORMAP_NAMES: [&str; 23] = [
    "jet",
    "hsv",
    "hot",
    "cool",
    "spring",
    "summer",
    "autumn",
    "winter",
    "bone",
    "cooper",
    "greys",
    "rainbow",
    "rainbow_soft",
    "white",
    "black",
    "red",
    "green",
    "blue",
    "yellow",
    "cyan",
    "fuchsia",
    "terrain",
    "ocean",
];

/// Number of colormaps in the catalog.
pub const COLORMAP_COUNT: usize = COLORMAP_NAMES.len();

/// Returns the id of a colormap, or `None` for names outside the catalog.
#[must_use]
pub fn colormap_id(name: &str) -> Option<u32> {
    COLORMAP_NAMES
        .iter()
        .position(|&n| n == name)
        .map(|i| i as u32)
}

/// Returns the name of a colormap id.
#[must_use]
pub fn colormap_name(id: u32) -> Option<&'static str> {
    COLORMAP_NAMES.get(id as usize).copied()
}

/// Which coordinate drives the colormap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColormapAxis {
    X,
    #[default]
    Y,
    Z,
    /// Distance from the origin.
    #[serde(alias = "r")]
    Radial,
}

impl ColormapAxis {
    pub const ALL: [ColormapAxis; 4] = [
        ColormapAxis::X,
        ColormapAxis::Y,
        ColormapAxis::Z,
        ColormapAxis::Radial,
    ];

    /// Id used by the extraction shader.
    #[must_use]
    pub fn id(self) -> u32 {
        self as u32
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ColormapAxis::X => "x",
            ColormapAxis::Y => "y",
            ColormapAxis::Z => "z",
            ColormapAxis::Radial => "r",
        }
    }
}

/// Colormap coordinate in [0, 1] of a vertex at `p` in a domain of
/// `half_extent`.
#[must_use]
pub fn colormap_parameter(p: Vec3, half_extent: f32, axis: ColormapAxis, reverse: bool) -> f32 {
    let t = match axis {
        ColormapAxis::X => 0.5 * (p.x / half_extent + 1.0),
        ColormapAxis::Y => 0.5 * (p.y / half_extent + 1.0),
        ColormapAxis::Z => 0.5 * (p.z / half_extent + 1.0),
        ColormapAxis::Radial => p.length() / half_extent,
    }
    .clamp(0.0, 1.0);
    if reverse {
        1.0 - t
    } else {
        t
    }
}
