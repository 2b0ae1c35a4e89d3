//! Biome-driven decoration scatter (trees, rocks, etc.).
//!
//! Placement is keyed by world-space cell indices hashed with the world
//! seed, so the same decorations reappear when a chunk is rebuilt and
//! cells near a chunk border are placed identically from either side.

use glam::Vec3;

use crate::terrain::{Biome, HeightField};

/// Spacing of the scatter grid, in world units.
const CELL_SIZE: f32 = 4.0;

/// Decorations never appear on slopes steeper than this (radians).
const MAX_PLACEMENT_SLOPE: f32 = 0.9;

/// Kinds of scatter decoration. Visual meshes live with the rendering
/// collaborator; the simulation only places transforms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    Tree,
    PineTree,
    JungleTree,
    Rock,
    Boulder,
    Shrub,
    Cactus,
    Reed,
    Mushroom,
    IceShard,
    ObsidianSpire,
    DeadTree,
}

/// One placement rule within a biome profile.
#[derive(Clone, Copy, Debug)]
pub struct DecorationSpec {
    pub kind: DecorationKind,
    /// Probability of appearing in a given scatter cell, in [0, 1].
    pub density: f32,
    /// Uniform scale range.
    pub scale: (f32, f32),
}

/// A placed decoration, handed to the rendering collaborator as-is.
#[derive(Clone, Copy, Debug)]
pub struct DecorationInstance {
    pub kind: DecorationKind,
    pub position: Vec3,
    /// Yaw in radians.
    pub rotation: f32,
    pub scale: f32,
}

/// Scatter profile for one biome.
pub fn profile_for(biome: Biome) -> &'static [DecorationSpec] {
    match biome {
        Biome::Forest => &[
            DecorationSpec { kind: DecorationKind::Tree, density: 0.45, scale: (0.8, 1.4) },
            DecorationSpec { kind: DecorationKind::Shrub, density: 0.20, scale: (0.6, 1.0) },
            DecorationSpec { kind: DecorationKind::Rock, density: 0.06, scale: (0.5, 1.2) },
        ],
        Biome::Jungle => &[
            DecorationSpec { kind: DecorationKind::JungleTree, density: 0.55, scale: (0.9, 1.8) },
            DecorationSpec { kind: DecorationKind::Shrub, density: 0.30, scale: (0.7, 1.2) },
        ],
        Biome::Plains => &[
            DecorationSpec { kind: DecorationKind::Shrub, density: 0.10, scale: (0.6, 1.0) },
            DecorationSpec { kind: DecorationKind::Tree, density: 0.04, scale: (0.8, 1.2) },
            DecorationSpec { kind: DecorationKind::Rock, density: 0.03, scale: (0.4, 0.9) },
        ],
        Biome::Highlands => &[
            DecorationSpec { kind: DecorationKind::PineTree, density: 0.18, scale: (0.8, 1.3) },
            DecorationSpec { kind: DecorationKind::Boulder, density: 0.10, scale: (0.6, 1.5) },
        ],
        Biome::Mountain => &[
            DecorationSpec { kind: DecorationKind::Boulder, density: 0.16, scale: (0.7, 1.8) },
            DecorationSpec { kind: DecorationKind::PineTree, density: 0.08, scale: (0.7, 1.1) },
        ],
        Biome::Snow => &[
            DecorationSpec { kind: DecorationKind::IceShard, density: 0.08, scale: (0.6, 1.4) },
            DecorationSpec { kind: DecorationKind::PineTree, density: 0.06, scale: (0.7, 1.1) },
        ],
        Biome::Badlands => &[
            DecorationSpec { kind: DecorationKind::Rock, density: 0.14, scale: (0.5, 1.3) },
            DecorationSpec { kind: DecorationKind::DeadTree, density: 0.04, scale: (0.7, 1.1) },
        ],
        Biome::Desert => &[
            DecorationSpec { kind: DecorationKind::Cactus, density: 0.08, scale: (0.6, 1.3) },
            DecorationSpec { kind: DecorationKind::Rock, density: 0.05, scale: (0.4, 1.0) },
        ],
        Biome::Swamp => &[
            DecorationSpec { kind: DecorationKind::Reed, density: 0.35, scale: (0.7, 1.2) },
            DecorationSpec { kind: DecorationKind::Mushroom, density: 0.12, scale: (0.5, 1.0) },
            DecorationSpec { kind: DecorationKind::DeadTree, density: 0.08, scale: (0.8, 1.3) },
        ],
        Biome::Volcano => &[
            DecorationSpec { kind: DecorationKind::ObsidianSpire, density: 0.10, scale: (0.8, 2.0) },
            DecorationSpec { kind: DecorationKind::Boulder, density: 0.08, scale: (0.6, 1.4) },
        ],
    }
}

/// Integer hash producing a value in [0, 1].
pub fn hash_2d(ix: i32, iz: i32, seed: u32) -> f32 {
    let mut h = (ix as u32)
        .wrapping_mul(0x9E3779B1)
        .wrapping_add((iz as u32).wrapping_mul(0x85EBCA77))
        .wrapping_add(seed.wrapping_mul(0xC2B2AE3D));
    h = (h ^ (h >> 15)).wrapping_mul(0x2C1B3C6D);
    h ^= h >> 13;
    (h & 0x7FFF_FFFF) as f32 / 0x7FFF_FFFF_u32 as f32
}

/// Scatter decorations over one chunk's footprint.
///
/// Cells are indexed in world space (not chunk-local), so placements are
/// independent of which chunk happens to contain them.
pub fn scatter(
    height: &HeightField,
    seed: u32,
    min_x: f32,
    min_z: f32,
    size: f32,
) -> Vec<DecorationInstance> {
    let first_gx = (min_x / CELL_SIZE).floor() as i32;
    let first_gz = (min_z / CELL_SIZE).floor() as i32;
    let cells = (size / CELL_SIZE).ceil() as i32;

    let mut out = Vec::new();
    for gz in first_gz..first_gz + cells {
        for gx in first_gx..first_gx + cells {
            // Jittered anchor inside the cell.
            let jx = hash_2d(gx, gz, seed.wrapping_add(11));
            let jz = hash_2d(gx, gz, seed.wrapping_add(23));
            let x = (gx as f32 + jx) * CELL_SIZE;
            let z = (gz as f32 + jz) * CELL_SIZE;

            // Cells straddling the chunk border belong to the chunk that
            // contains their anchor point.
            if x < min_x || x >= min_x + size || z < min_z || z >= min_z + size {
                continue;
            }

            let biome = height.biome_at(x, z);
            let profile = profile_for(biome);

            for (slot, spec) in profile.iter().enumerate() {
                let roll = hash_2d(gx, gz, seed.wrapping_add(101 + slot as u32 * 37));
                if roll >= spec.density {
                    continue;
                }
                if height.slope(x, z) > MAX_PLACEMENT_SLOPE {
                    break;
                }
                let y = height.elevation(x, z);
                let rotation =
                    hash_2d(gx, gz, seed.wrapping_add(211)) * std::f32::consts::TAU;
                let t = hash_2d(gx, gz, seed.wrapping_add(307));
                let scale = spec.scale.0 + (spec.scale.1 - spec.scale.0) * t;
                out.push(DecorationInstance {
                    kind: spec.kind,
                    position: Vec3::new(x, y, z),
                    rotation,
                    scale,
                });
                // One decoration per cell.
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_range_and_determinism() {
        for i in -50..50 {
            let v = hash_2d(i, i * 3, 42);
            assert!((0.0..=1.0).contains(&v));
            assert_eq!(v, hash_2d(i, i * 3, 42));
        }
    }

    #[test]
    fn test_hash_seed_sensitivity() {
        assert_ne!(hash_2d(10, 20, 1), hash_2d(10, 20, 2));
    }

    #[test]
    fn test_scatter_deterministic() {
        let field = HeightField::new(12345);
        let a = scatter(&field, 12345, 32.0, -32.0, 64.0);
        let b = scatter(&field, 12345, 32.0, -32.0, 64.0);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.position, y.position);
            assert_eq!(x.kind, y.kind);
        }
    }

    #[test]
    fn test_scatter_stays_in_bounds() {
        let field = HeightField::new(7);
        let placed = scatter(&field, 7, 64.0, 64.0, 64.0);
        for d in &placed {
            assert!(d.position.x >= 64.0 && d.position.x < 128.0);
            assert!(d.position.z >= 64.0 && d.position.z < 128.0);
            assert!(d.scale > 0.0);
        }
    }

    #[test]
    fn test_adjacent_chunks_do_not_duplicate_cells() {
        // Two chunks sharing an edge must not both claim a border cell.
        let field = HeightField::new(99);
        let left = scatter(&field, 99, 0.0, 0.0, 64.0);
        let right = scatter(&field, 99, 64.0, 0.0, 64.0);
        for a in &left {
            for b in &right {
                assert!(
                    (a.position - b.position).length() > 1e-3,
                    "duplicate decoration at {:?}",
                    a.position
                );
            }
        }
    }

    #[test]
    fn test_forest_denser_than_desert() {
        let field = HeightField::new(12345);
        // Forest sector center 54 degrees, desert sector center 342 degrees.
        let fa = 54.0f32.to_radians();
        let da = 342.0f32.to_radians();
        let forest = scatter(&field, 12345, fa.cos() * 200.0, fa.sin() * 200.0, 64.0);
        let desert = scatter(&field, 12345, da.cos() * 200.0, da.sin() * 200.0, 64.0);
        assert!(
            forest.len() > desert.len(),
            "forest {} <= desert {}",
            forest.len(),
            desert.len()
        );
    }

    #[test]
    fn test_every_biome_has_profile() {
        for biome in Biome::all() {
            assert!(!profile_for(biome).is_empty());
        }
    }
}
