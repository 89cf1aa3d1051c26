//! Jittered Halton sequence
//!
//! Bases 2 and 3 give evenly spread `[0, 1)` pairs; a random offset inside a
//! disc of radius `0.5 * clustering` pulls them off the lattice.

use std::f64::consts::TAU;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{validate_region, Point};
use crate::error::{GenError, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HaltonConfig {
    pub width: f64,
    pub height: f64,
    pub point_count: usize,
    /// Jitter strength in `[0, 1]`; 0 keeps the raw sequence
    pub clustering: f64,
}

impl Default for HaltonConfig {
    fn default() -> Self {
        Self {
            width: 10.0,
            height: 10.0,
            point_count: 100,
            clustering: 0.25,
        }
    }
}

impl HaltonConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.clustering) {
            return Err(GenError::config(
                "halton",
                format!("clustering {} is outside [0, 1]", self.clustering),
            ));
        }
        validate_region("halton", self.width, self.height)
    }
}

/// Radical inverse of `index` in `base`.
pub fn halton(mut index: u64, base: u64) -> f64 {
    let mut result = 0.0;
    let mut f = 1.0 / base as f64;
    while index > 0 {
        result += f * (index % base) as f64;
        index /= base;
        f /= base as f64;
    }
    result
}

/// `point_count` jittered Halton points scaled to `[0, width] x [0, height]`.
pub fn halton_points(config: &HaltonConfig, rng: &mut ChaCha8Rng) -> Result<Vec<Point>> {
    config.validate()?;

    let strength = config.clustering * 0.5;
    let points: Vec<Point> = (0..config.point_count as u64)
        .map(|i| {
            // Uniform in the unit disc
            let angle = rng.gen::<f64>() * TAU;
            let r = rng.gen::<f64>().sqrt() * strength;

            let x = (halton(i + 1, 2) + angle.cos() * r).clamp(0.0, 1.0);
            let y = (halton(i + 1, 3) + angle.sin() * r).clamp(0.0, 1.0);
            Point::new(x * config.width, y * config.height)
        })
        .collect();

    debug!(points = points.len(), clustering = config.clustering, "halton points generated");
    Ok(points)
}
