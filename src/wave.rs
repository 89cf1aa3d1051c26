//! Sine wave roughened by octave Perlin noise
//!
//! `y(x, t) = A sin(x f + t speed) + sum_o noiseAmp p^o (2 n(x b l^o, t noiseSpeed) - 1)`
//! where `n` is Perlin noise remapped to [0, 1].

use noise::{Perlin, Seedable};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GenError, Result};
use crate::heightmap::perlin01;
use crate::points::Point;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Base sine amplitude
    pub amplitude: f64,
    pub frequency: f64,
    /// Sine phase speed over time
    pub speed: f64,
    /// Amplitude of the first noise octave
    pub noise_amplitude: f64,
    pub octaves: u32,
    pub lacunarity: f64,
    pub persistence: f64,
    pub base_noise_frequency: f64,
    /// Noise scroll speed over time
    pub noise_speed: f64,
    /// Control points along the line; samples cover `points - 1` segments
    pub points: usize,
    pub samples_per_segment: usize,
    /// Distance between control points
    pub spacing: f64,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            frequency: 1.0,
            speed: 1.0,
            noise_amplitude: 0.5,
            octaves: 3,
            lacunarity: 2.0,
            persistence: 0.5,
            base_noise_frequency: 1.0,
            noise_speed: 1.0,
            points: 10,
            samples_per_segment: 50,
            spacing: 1.0,
        }
    }
}

impl WaveConfig {
    pub fn validate(&self) -> Result<()> {
        if self.points < 2 {
            return Err(GenError::config(
                "wave",
                format!("points {} must be at least 2", self.points),
            ));
        }
        if self.samples_per_segment == 0 {
            return Err(GenError::config("wave", "samples_per_segment must be at least 1"));
        }
        if !(self.spacing > 0.0 && self.spacing.is_finite()) {
            return Err(GenError::config(
                "wave",
                format!("spacing {} must be positive", self.spacing),
            ));
        }
        Ok(())
    }

    pub fn sample_count(&self) -> usize {
        (self.points - 1) * self.samples_per_segment
    }
}

/// Seeded wave evaluator; the same sampler gives the same curve for the same `time`.
#[derive(Clone, Debug)]
pub struct WaveSampler {
    config: WaveConfig,
    noise: Perlin,
}

impl WaveSampler {
    pub fn new(config: &WaveConfig, rng: &mut ChaCha8Rng) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            noise: Perlin::new(1).set_seed(rng.gen::<u32>()),
        })
    }

    /// Height at horizontal position `x` and time `time`
    pub fn height(&self, x: f64, time: f64) -> f64 {
        let c = &self.config;
        let sine = c.amplitude * (x * c.frequency + time * c.speed).sin();

        let mut noise = 0.0;
        let mut amp = c.noise_amplitude;
        let mut freq = c.base_noise_frequency;
        for _ in 0..c.octaves {
            let n = (perlin01(&self.noise, x * freq, time * c.noise_speed) - 0.5) * 2.0;
            noise += n * amp;
            freq *= c.lacunarity;
            amp *= c.persistence;
        }

        sine + noise
    }

    /// The whole line at `time`, left to right.
    pub fn sample(&self, time: f64) -> Vec<Point> {
        let c = &self.config;
        let step = c.spacing / c.samples_per_segment as f64;
        (0..c.sample_count())
            .map(|i| {
                let x = i as f64 * step;
                Point::new(x, self.height(x, time))
            })
            .collect()
    }
}

/// Sample the wave once at `time`.
pub fn sample_wave(config: &WaveConfig, rng: &mut ChaCha8Rng, time: f64) -> Result<Vec<Point>> {
    let samples = WaveSampler::new(config, rng)?.sample(time);
    debug!(samples = samples.len(), time, "wave sampled");
    Ok(samples)
}
