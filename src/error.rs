//! Error types shared by every generator
//!
//! Configuration problems are reported before any generation work starts.
//! Out-of-bounds grid reads are not errors (see `tilemap`), and samplers that
//! fall short of their requested point count simply return fewer points.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenError {
    /// A flat configuration record violates one of its invariants
    #[error("invalid {generator} configuration: {reason}")]
    InvalidConfig {
        generator: &'static str,
        reason: String,
    },

    /// Heightmap resolutions must be 2^n + 1
    #[error("heightmap resolution {resolution} is not 2^n + 1 (nearest valid: {nearest})")]
    InvalidResolution { resolution: usize, nearest: usize },

    /// Bicubic resampling was asked for something it cannot produce
    #[error("cannot resample height field: {reason}")]
    InvalidResample { reason: String },
}

impl GenError {
    pub fn config(generator: &'static str, reason: impl Into<String>) -> Self {
        GenError::InvalidConfig {
            generator,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_generator() {
        let err = GenError::config("bsp", "max_room_size must be at least 3");
        assert_eq!(
            err.to_string(),
            "invalid bsp configuration: max_room_size must be at least 3"
        );

        let err = GenError::InvalidResolution { resolution: 500, nearest: 513 };
        assert!(err.to_string().contains("nearest valid: 513"));
    }
}
