//! Noise-based terrain elevation.
//!
//! `elevation(x, z)` is a pure function of world coordinates: biome
//! classification, fractal summation, and all post-processing depend only
//! on (x, z) and the seed, never on chunk indices, so chunk boundaries are
//! seamless by construction. The only discontinuities are the intentional
//! sharp edges at biome sector boundaries.

use glam::Vec3;

use super::biome::Biome;
use super::noise::NoiseField;

/// Amplitude of the fixed provisional pass used for altitude-dependent
/// classification (the snow-line override) before biome parameters are
/// known. Must be the same everywhere or classification stops being pure.
const PROVISIONAL_AMPLITUDE: f32 = 45.0;
const PROVISIONAL_FREQUENCY: f32 = 0.008;
const PROVISIONAL_OCTAVES: u32 = 4;

/// Very-low-frequency ridge contribution for mountainous biomes. One-sided:
/// only positive samples add height, producing isolated peaks.
const PASS_FREQUENCY: f32 = 0.0012;
const PASS_AMPLITUDE: f32 = 40.0;

/// Badlands mesas terrace to steps of this many units.
const TERRACE_STEP: f32 = 8.0;

/// Nothing in the world is ever below this thin walkable floor.
const FLOOR_ELEVATION: f32 = 0.5;

/// Terrain elevation field parameterized per biome.
pub struct HeightField {
    noise: NoiseField,
}

impl HeightField {
    pub fn new(seed: u32) -> Self {
        Self {
            noise: NoiseField::new(seed),
        }
    }

    /// Provisional elevation from the fixed first pass. Used only to decide
    /// altitude-dependent classification.
    fn provisional(&self, x: f32, z: f32) -> f32 {
        self.noise
            .fbm(x, z, PROVISIONAL_FREQUENCY, PROVISIONAL_OCTAVES)
            * PROVISIONAL_AMPLITUDE
    }

    /// Biome at a world position, using the provisional pass for the
    /// snow-line override. This is the classification `elevation` itself
    /// uses, so callers sampling colors or decorations stay consistent
    /// with the terrain shape.
    pub fn biome_at(&self, x: f32, z: f32) -> Biome {
        Biome::classify(x, z, self.provisional(x, z))
    }

    /// Terrain elevation at a world position.
    pub fn elevation(&self, x: f32, z: f32) -> f32 {
        let biome = self.biome_at(x, z);
        let params = biome.params();

        let mut y = self.noise.fbm(x, z, params.frequency, params.octaves) * params.amplitude;

        // Isolated peaks for mountainous biomes: one-sided low-frequency
        // contribution, zero on the negative half.
        if biome.has_mountain_passes() {
            let ridge = self.noise.sample(x * PASS_FREQUENCY, z * PASS_FREQUENCY);
            if ridge > 0.0 {
                y += ridge * PASS_AMPLITUDE;
            }
        }

        match biome {
            Biome::Badlands => y = (y / TERRACE_STEP).floor() * TERRACE_STEP,
            Biome::Swamp => {
                if y < 1.5 {
                    y = 1.5;
                }
            }
            _ => {}
        }

        // Valley flattening: push near-zero elevations to the +1 side so
        // lowlands stay walkable instead of dipping into shallow pits.
        if y > -1.0 && y < 1.0 {
            y = 1.0;
        }

        (y + params.base_height).max(FLOOR_ELEVATION)
    }

    /// Surface normal from central differences.
    pub fn normal(&self, x: f32, z: f32) -> Vec3 {
        let eps = 0.5;
        let dx = (self.elevation(x + eps, z) - self.elevation(x - eps, z)) / (2.0 * eps);
        let dz = (self.elevation(x, z + eps) - self.elevation(x, z - eps)) / (2.0 * eps);
        Vec3::new(-dx, 1.0, -dz).normalize()
    }

    /// Terrain slope angle from horizontal, in radians.
    pub fn slope(&self, x: f32, z: f32) -> f32 {
        let eps = 0.5;
        let h = self.elevation(x, z);
        let dx = (self.elevation(x + eps, z) - h) / eps;
        let dz = (self.elevation(x, z + eps) - h) / eps;
        (dx * dx + dz * dz).sqrt().atan()
    }

    /// Min/max elevation over an XZ region, sampled at corners + center.
    /// Coarse bound for spawn placement and population.
    pub fn elevation_bounds(&self, min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> (f32, f32) {
        let samples = [
            self.elevation(min_x, min_z),
            self.elevation(max_x, min_z),
            self.elevation(min_x, max_z),
            self.elevation(max_x, max_z),
            self.elevation((min_x + max_x) / 2.0, (min_z + max_z) / 2.0),
        ];
        let min_h = samples.iter().copied().fold(f32::INFINITY, f32::min);
        let max_h = samples.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        (min_h, max_h)
    }
}
