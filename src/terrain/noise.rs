//! Seeded 2D gradient noise — the sole source of procedural randomness
//! for terrain.
//!
//! Classic permutation-table Perlin noise: a seeded shuffle of 0..=255
//! doubled to 512 entries, quintic fade interpolation, and gradients keyed
//! by the low 4 bits of the hashed lattice index. Two fields built from the
//! same seed produce bit-identical output in any process, which is what
//! keeps chunk boundaries seamless and worlds reproducible.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Deterministic 2D gradient noise field.
pub struct NoiseField {
    /// 256-entry permutation doubled to 512 so lattice hashing never wraps.
    perm: [u8; 512],
}

impl NoiseField {
    /// Build a noise field from a seed.
    pub fn new(seed: u32) -> Self {
        let mut table: [u8; 256] = std::array::from_fn(|i| i as u8);
        let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
        table.shuffle(&mut rng);

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }
        Self { perm }
    }

    /// Quintic fade: 6t^5 - 15t^4 + 10t^3.
    fn fade(t: f32) -> f32 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Gradient dot product keyed by the low 4 bits of the lattice hash.
    fn grad(hash: u8, x: f32, z: f32) -> f32 {
        let h = hash & 15;
        let u = if h < 8 { x } else { z };
        let v = if h < 4 {
            z
        } else if h == 12 || h == 14 {
            x
        } else {
            0.0
        };
        let a = if h & 1 == 0 { u } else { -u };
        let b = if h & 2 == 0 { v } else { -v };
        a + b
    }

    /// Sample the field at a world position. Output lies in [-1, 1] and is
    /// exactly zero at integer lattice points. Total over all real inputs;
    /// NaN inputs propagate and are caught by the simulation sanity check.
    pub fn sample(&self, x: f32, z: f32) -> f32 {
        let xf = x - x.floor();
        let zf = z - z.floor();
        let xi = (x.floor() as i32 & 255) as usize;
        let zi = (z.floor() as i32 & 255) as usize;

        let u = Self::fade(xf);
        let v = Self::fade(zf);

        let p = &self.perm;
        let a = p[xi] as usize + zi;
        let b = p[xi + 1] as usize + zi;

        let x1 = Self::lerp(
            Self::grad(p[a], xf, zf),
            Self::grad(p[b], xf - 1.0, zf),
            u,
        );
        let x2 = Self::lerp(
            Self::grad(p[a + 1], xf, zf - 1.0),
            Self::grad(p[b + 1], xf - 1.0, zf - 1.0),
            u,
        );
        Self::lerp(x1, x2, v)
    }

    /// Fractal Brownian motion: sum `octaves` samples at doubling frequency
    /// and halving weight. The caller applies its own amplitude.
    ///
    /// `sum_i sample(x * freq * 2^i, z * freq * 2^i) * 0.5^i`
    pub fn fbm(&self, x: f32, z: f32, frequency: f32, octaves: u32) -> f32 {
        let mut sum = 0.0;
        let mut weight = 1.0;
        let mut freq = frequency;
        for _ in 0..octaves {
            sum += self.sample(x * freq, z * freq) * weight;
            weight *= 0.5;
            freq *= 2.0;
        }
        sum
    }
}
