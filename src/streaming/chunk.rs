//! One terrain tile: sampled mesh, static collision heightfield, and
//! scattered decorations.
//!
//! Chunks never own any noise state — every sample goes through the shared
//! `HeightField`, so two adjacent chunks produce identical values along
//! their shared edge.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rapier3d::na::DMatrix;
use rapier3d::prelude::ColliderHandle;
use rayon::prelude::*;

use super::decoration::{self, DecorationInstance};
use crate::physics::PhysicsBridge;
use crate::terrain::{Biome, HeightField};

/// Integer grid coordinates of a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkId {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkId {
    pub fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    /// Chunk containing a world position. Chunks are centered on
    /// `(cx * size, cz * size)`, so this rounds rather than floors.
    pub fn from_world(position: Vec3, chunk_size: f32) -> Self {
        Self {
            cx: (position.x / chunk_size).round() as i32,
            cz: (position.z / chunk_size).round() as i32,
        }
    }

    /// World-space center of this chunk.
    pub fn center(self, chunk_size: f32) -> (f32, f32) {
        (self.cx as f32 * chunk_size, self.cz as f32 * chunk_size)
    }

    /// Chebyshev distance in chunk units.
    pub fn chebyshev(self, other: ChunkId) -> i32 {
        (self.cx - other.cx).abs().max((self.cz - other.cz).abs())
    }

    /// Euclidean distance in chunk units.
    pub fn euclidean(self, other: ChunkId) -> f32 {
        let dx = (self.cx - other.cx) as f32;
        let dz = (self.cz - other.cz) as f32;
        (dx * dx + dz * dz).sqrt()
    }
}

/// POD vertex handed to the rendering collaborator.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

/// Triangle mesh descriptor for one chunk.
pub struct TerrainMesh {
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
}

/// One streamed terrain tile.
pub struct Chunk {
    pub id: ChunkId,
    pub mesh: TerrainMesh,
    /// Biome per sample point, row-major, rows along +Z.
    pub biomes: Vec<Biome>,
    pub decorations: Vec<DecorationInstance>,
    pub collider: ColliderHandle,
    /// Whether the collider currently participates in the physics world.
    pub physics_enabled: bool,
}

impl Chunk {
    /// Sample terrain and build mesh, collider, and decorations for one
    /// tile. `resolution` is the vertex count per side (cells + 1).
    pub fn build(
        id: ChunkId,
        height: &HeightField,
        seed: u32,
        chunk_size: f32,
        resolution: usize,
        physics: &mut PhysicsBridge,
    ) -> Chunk {
        debug_assert!(resolution >= 2);
        let (center_x, center_z) = id.center(chunk_size);
        let min_x = center_x - chunk_size * 0.5;
        let min_z = center_z - chunk_size * 0.5;
        let step = chunk_size / (resolution - 1) as f32;

        // Row-parallel sampling; each row is independent of the others.
        let rows: Vec<Vec<(f32, Vec3, Biome)>> = (0..resolution)
            .into_par_iter()
            .map(|r| {
                let z = min_z + r as f32 * step;
                (0..resolution)
                    .map(|c| {
                        let x = min_x + c as f32 * step;
                        let y = height.elevation(x, z);
                        let normal = height.normal(x, z);
                        let biome = height.biome_at(x, z);
                        (y, normal, biome)
                    })
                    .collect()
            })
            .collect();

        let mut vertices = Vec::with_capacity(resolution * resolution);
        let mut biomes = Vec::with_capacity(resolution * resolution);
        for (r, row) in rows.iter().enumerate() {
            let z = min_z + r as f32 * step;
            for (c, &(y, normal, biome)) in row.iter().enumerate() {
                let x = min_x + c as f32 * step;
                vertices.push(TerrainVertex {
                    position: [x, y, z],
                    normal: normal.to_array(),
                    color: biome.surface_color(),
                });
                biomes.push(biome);
            }
        }

        let mut indices = Vec::with_capacity((resolution - 1) * (resolution - 1) * 6);
        for r in 0..resolution - 1 {
            for c in 0..resolution - 1 {
                let i = (r * resolution + c) as u32;
                let res = resolution as u32;
                indices.extend_from_slice(&[i, i + res, i + 1, i + 1, i + res, i + res + 1]);
            }
        }

        // Static collision heightfield; rows along +Z, columns along +X.
        let heights = DMatrix::from_fn(resolution, resolution, |r, c| rows[r][c].0);
        let collider = physics.add_heightfield(heights, chunk_size, center_x, center_z);

        let decorations = decoration::scatter(height, seed, min_x, min_z, chunk_size);

        Chunk {
            id,
            mesh: TerrainMesh { vertices, indices },
            biomes,
            decorations,
            collider,
            physics_enabled: true,
        }
    }
}
