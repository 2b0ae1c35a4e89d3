//! Biome system based on angular sectors around the world origin.
//!
//! The world is a radial "pie" of ten 36-degree sectors, each mapped to one
//! biome, with a snow override above the high-altitude line. Boundaries are
//! deliberately crisp — no per-tile noise blending — so height
//! parameterization and decoration profiles stay predictable.

use std::f32::consts::TAU;

/// Elevation above which any sector classifies as snow.
pub const SNOW_LINE: f32 = 70.0;

/// Biome types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Biome {
    Forest,
    Mountain,
    Snow,
    Highlands,
    Plains,
    Badlands,
    Desert,
    Swamp,
    Volcano,
    Jungle,
}

/// Sector table, counter-clockwise from the +X axis. 36 degrees per entry.
const SECTOR_BIOMES: [Biome; 10] = [
    Biome::Plains,
    Biome::Forest,
    Biome::Jungle,
    Biome::Swamp,
    Biome::Highlands,
    Biome::Mountain,
    Biome::Snow,
    Biome::Volcano,
    Biome::Badlands,
    Biome::Desert,
];

/// Fractal noise parameters for one biome.
#[derive(Clone, Copy, Debug)]
pub struct BiomeParams {
    pub amplitude: f32,
    pub frequency: f32,
    pub octaves: u32,
    pub base_height: f32,
}

impl Biome {
    /// Classify a world position. Pure function of (x, z, elevation): the
    /// same inputs give the same biome from any chunk, which keeps chunk
    /// boundaries seamless.
    pub fn classify(x: f32, z: f32, elevation: f32) -> Biome {
        if elevation > SNOW_LINE {
            return Biome::Snow;
        }
        let turns = z.atan2(x).rem_euclid(TAU) / TAU;
        let sector = ((turns * SECTOR_BIOMES.len() as f32) as usize).min(SECTOR_BIOMES.len() - 1);
        SECTOR_BIOMES[sector]
    }

    /// Per-biome fractal parameters for elevation synthesis.
    pub fn params(self) -> BiomeParams {
        match self {
            Biome::Plains => BiomeParams {
                amplitude: 4.0,
                frequency: 0.012,
                octaves: 3,
                base_height: 1.5,
            },
            Biome::Forest => BiomeParams {
                amplitude: 8.0,
                frequency: 0.010,
                octaves: 4,
                base_height: 2.0,
            },
            Biome::Jungle => BiomeParams {
                amplitude: 10.0,
                frequency: 0.015,
                octaves: 4,
                base_height: 3.0,
            },
            Biome::Swamp => BiomeParams {
                amplitude: 3.0,
                frequency: 0.020,
                octaves: 3,
                base_height: 1.0,
            },
            Biome::Highlands => BiomeParams {
                amplitude: 14.0,
                frequency: 0.006,
                octaves: 4,
                base_height: 8.0,
            },
            Biome::Mountain => BiomeParams {
                amplitude: 30.0,
                frequency: 0.008,
                octaves: 5,
                base_height: 10.0,
            },
            Biome::Snow => BiomeParams {
                amplitude: 35.0,
                frequency: 0.008,
                octaves: 5,
                base_height: 14.0,
            },
            Biome::Volcano => BiomeParams {
                amplitude: 26.0,
                frequency: 0.009,
                octaves: 5,
                base_height: 12.0,
            },
            Biome::Badlands => BiomeParams {
                amplitude: 18.0,
                frequency: 0.010,
                octaves: 4,
                base_height: 6.0,
            },
            Biome::Desert => BiomeParams {
                amplitude: 6.0,
                frequency: 0.005,
                octaves: 3,
                base_height: 2.0,
            },
        }
    }

    /// Whether this biome receives the one-sided "mountain pass" ridge
    /// contribution (isolated peaks, not a uniform ridge).
    pub fn has_mountain_passes(self) -> bool {
        matches!(self, Biome::Mountain | Biome::Snow | Biome::Volcano)
    }

    /// Base terrain vertex color, linear RGB.
    pub fn surface_color(self) -> [f32; 3] {
        match self {
            Biome::Forest => [0.20, 0.47, 0.16],
            Biome::Mountain => [0.47, 0.47, 0.47],
            Biome::Snow => [0.94, 0.97, 1.00],
            Biome::Highlands => [0.42, 0.52, 0.29],
            Biome::Plains => [0.39, 0.71, 0.31],
            Biome::Badlands => [0.71, 0.42, 0.24],
            Biome::Desert => [0.93, 0.79, 0.69],
            Biome::Swamp => [0.27, 0.35, 0.24],
            Biome::Volcano => [0.24, 0.18, 0.18],
            Biome::Jungle => [0.13, 0.42, 0.18],
        }
    }

    /// Display name for logs and external UI collaborators.
    pub fn display_name(self) -> &'static str {
        match self {
            Biome::Forest => "Forest",
            Biome::Mountain => "Mountain",
            Biome::Snow => "Snow",
            Biome::Highlands => "Highlands",
            Biome::Plains => "Plains",
            Biome::Badlands => "Badlands",
            Biome::Desert => "Desert",
            Biome::Swamp => "Swamp",
            Biome::Volcano => "Volcano",
            Biome::Jungle => "Jungle",
        }
    }

    /// All biomes, for exhaustive tests and table validation.
    pub const fn all() -> [Biome; 10] {
        [
            Biome::Forest,
            Biome::Mountain,
            Biome::Snow,
            Biome::Highlands,
            Biome::Plains,
            Biome::Badlands,
            Biome::Desert,
            Biome::Swamp,
            Biome::Volcano,
            Biome::Jungle,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_zero_is_plains() {
        // Just above the +X axis, low elevation.
        assert_eq!(Biome::classify(100.0, 1.0, 5.0), Biome::Plains);
    }

    #[test]
    fn test_snow_override_beats_sector() {
        // Same direction as the plains sector, but above the snow line.
        assert_eq!(Biome::classify(100.0, 1.0, SNOW_LINE + 1.0), Biome::Snow);
    }

    #[test]
    fn test_all_sectors_reachable() {
        let mut found = std::collections::HashSet::new();
        for i in 0..360 {
            let angle = (i as f32).to_radians();
            let (x, z) = (angle.cos() * 100.0, angle.sin() * 100.0);
            found.insert(Biome::classify(x, z, 5.0));
        }
        assert_eq!(found.len(), 10, "expected all 10 biomes, found {:?}", found);
    }

    #[test]
    fn test_classification_deterministic() {
        for _ in 0..3 {
            assert_eq!(
                Biome::classify(-57.3, 19.1, 12.0),
                Biome::classify(-57.3, 19.1, 12.0)
            );
        }
    }

    #[test]
    fn test_sector_boundaries_crisp() {
        // 36 degrees is the plains/forest boundary; points straddling it
        // classify differently. Sharp edges are the design, not a bug.
        let just_below = 35.9f32.to_radians();
        let just_above = 36.1f32.to_radians();
        let a = Biome::classify(just_below.cos() * 50.0, just_below.sin() * 50.0, 5.0);
        let b = Biome::classify(just_above.cos() * 50.0, just_above.sin() * 50.0, 5.0);
        assert_eq!(a, Biome::Plains);
        assert_eq!(b, Biome::Forest);
    }

    #[test]
    fn test_params_sane() {
        for biome in Biome::all() {
            let p = biome.params();
            assert!(p.amplitude > 0.0);
            assert!(p.frequency > 0.0);
            assert!(p.octaves >= 1);
        }
    }

    #[test]
    fn test_mountain_pass_biomes() {
        assert!(Biome::Mountain.has_mountain_passes());
        assert!(Biome::Snow.has_mountain_passes());
        assert!(Biome::Volcano.has_mountain_passes());
        assert!(!Biome::Plains.has_mountain_passes());
        assert!(!Biome::Desert.has_mountain_passes());
    }
}
