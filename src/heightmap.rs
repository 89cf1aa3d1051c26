use noise::{NoiseFn, Perlin, Seedable};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GenError, Result};
use crate::tilemap::Tilemap;

// =============================================================================
// NOISE PARAMETERS
// =============================================================================

/// Parameters for fractal noise
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Noise-space extent of the whole field (higher = more features)
    pub scale: f64,
    /// Number of noise octaves
    pub octaves: u32,
    /// Amplitude decay per octave (0.0-1.0)
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
    /// Multiplier on the octave sum before clamping to [0, 1]
    pub height_scale: f64,
    /// Noise-space offset; drawn from the seed in [0, 9999) when absent
    pub offset: Option<[f64; 2]>,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            scale: 20.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            height_scale: 0.2,
            offset: None,
        }
    }
}

impl NoiseParams {
    pub fn validate(&self) -> Result<()> {
        if self.octaves == 0 {
            return Err(GenError::config("noise", "octaves must be at least 1"));
        }
        if !(self.scale > 0.0 && self.scale.is_finite()) {
            return Err(GenError::config("noise", format!("scale {} must be positive", self.scale)));
        }
        if !(0.0..=1.0).contains(&self.persistence) {
            return Err(GenError::config(
                "noise",
                format!("persistence {} is outside [0, 1]", self.persistence),
            ));
        }
        if !(self.lacunarity >= 1.0 && self.lacunarity.is_finite()) {
            return Err(GenError::config(
                "noise",
                format!("lacunarity {} must be at least 1", self.lacunarity),
            ));
        }
        if !(self.height_scale >= 0.0 && self.height_scale.is_finite()) {
            return Err(GenError::config(
                "noise",
                format!("height_scale {} must be non-negative", self.height_scale),
            ));
        }
        Ok(())
    }
}

/// Largest random offset drawn per axis
const MAX_RANDOM_OFFSET: f64 = 9999.0;

// =============================================================================
// NOISE FIELD
// =============================================================================

/// Perlin noise remapped from [-1, 1] to [0, 1]
pub fn perlin01(noise: &Perlin, x: f64, y: f64) -> f64 {
    (noise.get([x, y]) * 0.5 + 0.5).clamp(0.0, 1.0)
}

/// Deterministic fractal Perlin sampler over normalized coordinates.
///
/// Sampling happens in `[0, 1]^2` so the same field can be evaluated at any
/// resolution without changing its features.
#[derive(Clone, Debug)]
pub struct NoiseField {
    noise: Perlin,
    params: NoiseParams,
    offset: [f64; 2],
}

impl NoiseField {
    pub fn new(params: &NoiseParams, rng: &mut ChaCha8Rng) -> Result<Self> {
        params.validate()?;

        let noise = Perlin::new(1).set_seed(rng.gen::<u32>());
        let offset = match params.offset {
            Some(offset) => offset,
            None => [
                rng.gen_range(0.0..MAX_RANDOM_OFFSET),
                rng.gen_range(0.0..MAX_RANDOM_OFFSET),
            ],
        };

        Ok(Self {
            noise,
            params: params.clone(),
            offset,
        })
    }

    pub fn offset(&self) -> [f64; 2] {
        self.offset
    }

    /// Octave sum at normalized coordinates, clamped to [0, 1]
    pub fn sample(&self, u: f64, v: f64) -> f32 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;

        for _ in 0..self.params.octaves {
            let x = u * self.params.scale * frequency + self.offset[0];
            let y = v * self.params.scale * frequency + self.offset[1];
            total += perlin01(&self.noise, x, y) * amplitude;
            amplitude *= self.params.persistence;
            frequency *= self.params.lacunarity;
        }

        (total * self.params.height_scale).clamp(0.0, 1.0) as f32
    }

    /// Sample a `width x height` grid; pixel `i` maps to `i / (size - 1)`.
    pub fn sample_grid(&self, width: usize, height: usize) -> Tilemap<f32> {
        let mut field = Tilemap::new_with(width, height, 0.0f32);
        let du = if width > 1 { 1.0 / (width - 1) as f64 } else { 0.0 };
        let dv = if height > 1 { 1.0 / (height - 1) as f64 } else { 0.0 };

        for (x, y, h) in field.iter_mut() {
            *h = self.sample(x as f64 * du, y as f64 * dv);
        }
        field
    }
}

// =============================================================================
// TERRAIN
// =============================================================================

/// Height field parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Output resolution, must be 2^n + 1
    pub resolution: usize,
    /// Sample noise at this resolution and upsample bicubically
    pub noise_resolution: Option<usize>,
    pub noise: NoiseParams,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            resolution: 513,
            noise_resolution: None,
            noise: NoiseParams::default(),
        }
    }
}

impl TerrainConfig {
    pub fn validate(&self) -> Result<()> {
        validate_resolution(self.resolution)?;
        if let Some(low) = self.noise_resolution {
            if low < 2 || low > self.resolution {
                return Err(GenError::config(
                    "terrain",
                    format!("noise_resolution {} must be within 2..={}", low, self.resolution),
                ));
            }
        }
        self.noise.validate()
    }
}

/// True for 2^n + 1 with n >= 1 (3, 5, 9, ..., 513, 1025, ...)
pub fn is_valid_resolution(resolution: usize) -> bool {
    resolution >= 3 && (resolution - 1).is_power_of_two()
}

/// Closest 2^n + 1 to `resolution`; ties go to the smaller one.
pub fn nearest_valid_resolution(resolution: usize) -> usize {
    if resolution <= 3 {
        return 3;
    }
    let upper = (resolution - 1).next_power_of_two() + 1;
    let lower = (upper - 1) / 2 + 1;
    if lower >= 3 && resolution - lower <= upper - resolution {
        lower
    } else {
        upper
    }
}

pub fn validate_resolution(resolution: usize) -> Result<()> {
    if is_valid_resolution(resolution) {
        Ok(())
    } else {
        Err(GenError::InvalidResolution {
            resolution,
            nearest: nearest_valid_resolution(resolution),
        })
    }
}

/// Generate a square height field in [0, 1].
///
/// With `noise_resolution` set, noise is sampled on the coarse grid only and
/// bicubically upsampled to `resolution`; the cubic overshoot is clamped.
pub fn generate_heightmap(config: &TerrainConfig, rng: &mut ChaCha8Rng) -> Result<Tilemap<f32>> {
    config.validate()?;

    let field = NoiseField::new(&config.noise, rng)?;
    let res = config.resolution;

    let heightmap = match config.noise_resolution {
        Some(low) => {
            let coarse = field.sample_grid(low, low);
            debug!(low, res, "upsampling coarse noise");
            let mut fine = coarse.resample_bicubic(res, res)?;
            fine.clamp_values(0.0, 1.0);
            fine
        }
        None => field.sample_grid(res, res),
    };

    let (min_h, max_h) = heightmap.min_max();
    info!(
        resolution = res,
        min = min_h,
        max = max_h,
        offset = ?field.offset(),
        "heightmap generated"
    );
    Ok(heightmap)
}

/// Normalize heightmap values to 0.0-1.0 range.
pub fn normalize_heightmap(heightmap: &Tilemap<f32>) -> Tilemap<f32> {
    let (min_val, max_val) = heightmap.min_max();
    let range = max_val - min_val;
    if range < 0.0001 {
        return heightmap.clone();
    }

    let mut normalized = heightmap.clone();
    for (_, _, h) in normalized.iter_mut() {
        *h = (*h - min_val) / range;
    }
    normalized
}
