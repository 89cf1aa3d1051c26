//! Poisson disk sampling (Bridson's algorithm)
//!
//! An acceleration grid with cell size `r / sqrt(2)` holds at most one
//! accepted point per cell, so a candidate only has to be checked against
//! the 5x5 block of cells around it. Growth starts from the origin corner.

use std::f64::consts::{SQRT_2, TAU};

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{validate_region, Point};
use crate::error::{GenError, Result};
use crate::tilemap::Tilemap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoissonConfig {
    /// Minimum distance between any two points
    pub radius: f64,
    pub width: f64,
    pub height: f64,
    /// Candidates tried around an active point before it is retired
    pub rejection_samples: usize,
    pub max_points: usize,
}

impl Default for PoissonConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width: 10.0,
            height: 10.0,
            rejection_samples: 30,
            max_points: 100,
        }
    }
}

impl PoissonConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return Err(GenError::config(
                "poisson",
                format!("radius {} must be positive and finite", self.radius),
            ));
        }
        if self.rejection_samples == 0 {
            return Err(GenError::config("poisson", "rejection_samples must be at least 1"));
        }
        validate_region("poisson", self.width, self.height)
    }
}

/// Spatial hash of accepted point indices
struct Accelerator {
    cell_size: f64,
    cells: Tilemap<Option<usize>>,
}

impl Accelerator {
    fn new(width: f64, height: f64, radius: f64) -> Self {
        let cell_size = radius / SQRT_2;
        // +1 so points on the far edge still land in a cell
        let cols = (width / cell_size).floor() as usize + 1;
        let rows = (height / cell_size).floor() as usize + 1;
        Self {
            cell_size,
            cells: Tilemap::new_with(cols, rows, None),
        }
    }

    fn cell_of(&self, p: &Point) -> (usize, usize) {
        let cx = ((p.x / self.cell_size) as usize).min(self.cells.width - 1);
        let cy = ((p.y / self.cell_size) as usize).min(self.cells.height - 1);
        (cx, cy)
    }

    fn insert(&mut self, p: &Point, index: usize) {
        let (cx, cy) = self.cell_of(p);
        self.cells.set(cx, cy, Some(index));
    }

    /// No accepted point closer than `radius` in the surrounding 5x5 cells
    fn is_clear(&self, candidate: &Point, points: &[Point], radius: f64) -> bool {
        let (cx, cy) = self.cell_of(candidate);
        let x0 = cx.saturating_sub(2);
        let y0 = cy.saturating_sub(2);
        let x1 = (cx + 2).min(self.cells.width - 1);
        let y1 = (cy + 2).min(self.cells.height - 1);
        let r2 = radius * radius;

        for y in y0..=y1 {
            for x in x0..=x1 {
                if let Some(index) = *self.cells.get(x, y) {
                    if candidate.distance_squared(&points[index]) < r2 {
                        return false;
                    }
                }
            }
        }
        true
    }
}

/// Blue-noise points in `[0, width] x [0, height]`.
///
/// Growth starts from the region origin, which is not itself emitted. The
/// result may be shorter than `max_points` when the region fills up first.
pub fn poisson_disk(config: &PoissonConfig, rng: &mut ChaCha8Rng) -> Result<Vec<Point>> {
    config.validate()?;

    let radius = config.radius;
    let mut grid = Accelerator::new(config.width, config.height, radius);
    let mut points: Vec<Point> = Vec::new();
    let mut active = vec![Point::new(0.0, 0.0)];

    while !active.is_empty() && points.len() < config.max_points {
        let spawn_index = rng.gen_range(0..active.len());
        let center = active[spawn_index];
        let mut accepted = false;

        for _ in 0..config.rejection_samples {
            let angle = rng.gen::<f64>() * TAU;
            let dist = rng.gen_range(radius..2.0 * radius);
            let candidate =
                Point::new(center.x + angle.cos() * dist, center.y + angle.sin() * dist);

            let inside = (0.0..=config.width).contains(&candidate.x)
                && (0.0..=config.height).contains(&candidate.y);
            if inside && grid.is_clear(&candidate, &points, radius) {
                grid.insert(&candidate, points.len());
                points.push(candidate);
                active.push(candidate);
                accepted = true;
                break;
            }
        }

        if !accepted {
            active.swap_remove(spawn_index);
        }
    }

    debug!(points = points.len(), radius, cap = config.max_points, "poisson sampling finished");
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::rng_from_seed;

    fn assert_spacing(points: &[Point], radius: f64) {
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                assert!(a.distance(b) >= radius - 1e-9, "{:?} and {:?} too close", a, b);
            }
        }
    }

    #[test]
    fn test_unit_radius_in_small_region() {
        for seed in 0..10 {
            let points = poisson_disk(&PoissonConfig::default(), &mut rng_from_seed(seed)).unwrap();
            assert!(points.len() <= 100);
            assert!(!points.is_empty());
            assert_spacing(&points, 1.0);
            for p in &points {
                assert!((0.0..=10.0).contains(&p.x) && (0.0..=10.0).contains(&p.y));
            }
        }
    }

    #[test]
    fn test_cap_is_respected() {
        let config = PoissonConfig {
            radius: 0.5,
            width: 50.0,
            height: 50.0,
            max_points: 40,
            ..Default::default()
        };
        let points = poisson_disk(&config, &mut rng_from_seed(2)).unwrap();
        assert_eq!(points.len(), 40);
        assert_spacing(&points, 0.5);
    }

    #[test]
    fn test_region_fills_before_cap() {
        // A 3x3 region cannot hold many points two units apart
        let config = PoissonConfig {
            radius: 2.0,
            width: 3.0,
            height: 3.0,
            max_points: 1000,
            ..Default::default()
        };
        let points = poisson_disk(&config, &mut rng_from_seed(4)).unwrap();
        assert!(points.len() < 10);
        assert_spacing(&points, 2.0);
    }

    #[test]
    fn test_first_point_grows_from_origin() {
        let config = PoissonConfig { max_points: 1, ..Default::default() };
        let mut grown = 0;
        for seed in 0..10 {
            let points = poisson_disk(&config, &mut rng_from_seed(seed)).unwrap();
            assert!(points.len() <= 1);
            if let Some(first) = points.first() {
                let dist = first.distance(&Point::new(0.0, 0.0));
                assert!((1.0..=2.0).contains(&dist), "first point is {} from the origin", dist);
                grown += 1;
            }
        }
        assert!(grown > 0);
    }

    #[test]
    fn test_same_seed_same_points() {
        let a = poisson_disk(&PoissonConfig::default(), &mut rng_from_seed(8)).unwrap();
        let b = poisson_disk(&PoissonConfig::default(), &mut rng_from_seed(8)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_bad_radius() {
        let config = PoissonConfig { radius: 0.0, ..Default::default() };
        assert!(poisson_disk(&config, &mut rng_from_seed(1)).is_err());
        let config = PoissonConfig { rejection_samples: 0, ..Default::default() };
        assert!(poisson_disk(&config, &mut rng_from_seed(1)).is_err());
    }
}
