//! 2D point distributions
//!
//! Two samplers over the rectangle `[0, width] x [0, height]`:
//! - Poisson disk (Bridson): blue noise with a guaranteed minimum spacing
//! - Halton: jittered low-discrepancy coverage, no spacing guarantee

pub mod halton;
pub mod poisson;

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{GenError, Result};

pub use halton::{halton, halton_points, HaltonConfig};
pub use poisson::{poisson_disk, PoissonConfig};

/// Rejection samples per active point used by the distribution front end
pub const DEFAULT_REJECTION_SAMPLES: usize = 30;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// Which sampler the front end uses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Distribution {
    #[default]
    Halton,
    Poisson,
}

/// Point distribution front end parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    pub width: f64,
    pub height: f64,
    /// Halton point count, Poisson point cap
    pub point_count: usize,
    pub method: Distribution,
    /// 0 = uniform, 1 = highly clustered
    pub clustering: f64,
    /// Poisson spacing before clustering is applied
    pub base_radius: f64,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            width: 10.0,
            height: 10.0,
            point_count: 100,
            method: Distribution::Halton,
            clustering: 0.25,
            base_radius: 1.0,
        }
    }
}

impl DistributionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.clustering) {
            return Err(GenError::config(
                "points",
                format!("clustering {} is outside [0, 1]", self.clustering),
            ));
        }
        if !(self.base_radius > 0.0) {
            return Err(GenError::config(
                "points",
                format!("base_radius {} must be positive", self.base_radius),
            ));
        }
        validate_region("points", self.width, self.height)
    }

    /// Poisson radius: `lerp(1.5 * base, 0.3 * base, clustering)`
    pub fn poisson_radius(&self) -> f64 {
        let near = self.base_radius * 1.5;
        let far = self.base_radius * 0.3;
        near + (far - near) * self.clustering
    }
}

pub(crate) fn validate_region(generator: &'static str, width: f64, height: f64) -> Result<()> {
    if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
        return Err(GenError::config(
            generator,
            format!("region {}x{} must be positive and finite", width, height),
        ));
    }
    Ok(())
}

/// Distribute points with the configured sampler.
pub fn distribute_points(config: &DistributionConfig, rng: &mut ChaCha8Rng) -> Result<Vec<Point>> {
    config.validate()?;

    let points = match config.method {
        Distribution::Poisson => poisson_disk(
            &PoissonConfig {
                radius: config.poisson_radius(),
                width: config.width,
                height: config.height,
                rejection_samples: DEFAULT_REJECTION_SAMPLES,
                max_points: config.point_count,
            },
            rng,
        )?,
        Distribution::Halton => halton_points(
            &HaltonConfig {
                width: config.width,
                height: config.height,
                point_count: config.point_count,
                clustering: config.clustering,
            },
            rng,
        )?,
    };

    info!(method = ?config.method, points = points.len(), "points distributed");
    Ok(points)
}
