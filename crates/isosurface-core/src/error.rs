//! Error types for isosurface-rs.

use thiserror::Error;

/// The main error type for isosurface-rs operations.
#[derive(Error, Debug)]
pub enum IsosurfaceError {
    /// Grid resolution outside the supported range.
    #[error("invalid grid resolution {resolution}: must be within {min}..={max}")]
    InvalidResolution { resolution: u32, min: u32, max: u32 },

    /// An implicit surface name or id is not in the catalog.
    #[error("unknown implicit surface '{0}'")]
    UnknownSurface(String),

    /// A colormap name or id is not in the catalog.
    #[error("unknown colormap '{0}'")]
    UnknownColormap(String),

    /// More metaballs than the field stage can bind.
    #[error("too many metaballs: {count} exceeds the limit of {max}")]
    TooManyMetaballs { count: usize, max: usize },

    /// A parameter is outside its allowed range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Rendering error.
    #[error("render error: {0}")]
    Render(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for isosurface-rs operations.
pub type Result<T> = std::result::Result<T, IsosurfaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        let err = IsosurfaceError::InvalidResolution {
            resolution: 1,
            min: 2,
            max: 256,
        };
        assert_eq!(
            err.to_string(),
            "invalid grid resolution 1: must be within 2..=256"
        );
        let err = IsosurfaceError::TooManyMetaballs {
            count: 2000,
            max: 1024,
        };
        assert!(err.to_string().contains("2000"));
        assert!(IsosurfaceError::UnknownColormap("plasma".into())
            .to_string()
            .contains("plasma"));
    }

    #[test]
    fn test_conversions() {
        let io: IsosurfaceError = std::io::Error::other("gone").into();
        assert!(matches!(io, IsosurfaceError::Io(_)));
        let json: IsosurfaceError = serde_json::from_str::<u32>("{").unwrap_err().into();
        assert!(matches!(json, IsosurfaceError::Json(_)));
    }
}
