//! Observer-driven chunk loading, eviction, and the physics window.
//!
//! Visual streaming and collision are decoupled on purpose: every chunk
//! within render distance has a mesh, but only the 3x3 window around the
//! observer keeps its collider enabled. Solid terrain far from anything
//! that can touch it is wasted broad-phase work.

use std::collections::HashMap;

use glam::Vec3;
use serde::Deserialize;

use super::chunk::{Chunk, ChunkId};
use crate::physics::PhysicsBridge;
use crate::terrain::HeightField;

/// Chebyshev radius, in chunks, of the physics-active window (1 = 3x3).
const PHYSICS_WINDOW: i32 = 1;

/// Streaming configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct StreamerConfig {
    /// Side length of one chunk, world units.
    pub chunk_size: f32,
    /// Vertex samples per chunk side.
    pub resolution: usize,
    /// Chebyshev load radius, in chunks.
    pub render_distance: i32,
    /// Euclidean eviction radius, in chunks. Larger than render distance
    /// so chunks don't thrash at the boundary.
    pub unload_distance: f32,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64.0,
            resolution: 33,
            render_distance: 3,
            unload_distance: 5.0,
        }
    }
}

/// Streams terrain chunks in and out around a moving observer.
pub struct ChunkStreamer {
    config: StreamerConfig,
    seed: u32,
    chunks: HashMap<ChunkId, Chunk>,
    /// Chunks created during the most recent update, drained by the
    /// simulation for procedural population.
    newly_loaded: Vec<ChunkId>,
}

impl ChunkStreamer {
    pub fn new(config: StreamerConfig, seed: u32) -> Self {
        Self {
            config,
            seed,
            chunks: HashMap::new(),
            newly_loaded: Vec::new(),
        }
    }

    pub fn config(&self) -> &StreamerConfig {
        &self.config
    }

    /// Load, evict, and re-window chunks for the given observer position.
    /// An absent observer pauses streaming entirely.
    pub fn update(
        &mut self,
        observer: Option<Vec3>,
        height: &HeightField,
        physics: &mut PhysicsBridge,
    ) {
        let Some(observer) = observer else {
            return;
        };
        let center = ChunkId::from_world(observer, self.config.chunk_size);
        let rd = self.config.render_distance;

        // Load everything within the render square.
        for dz in -rd..=rd {
            for dx in -rd..=rd {
                let id = ChunkId::new(center.cx + dx, center.cz + dz);
                if !self.chunks.contains_key(&id) {
                    let chunk = Chunk::build(
                        id,
                        height,
                        self.seed,
                        self.config.chunk_size,
                        self.config.resolution,
                        physics,
                    );
                    log::debug!("loaded chunk ({}, {})", id.cx, id.cz);
                    self.chunks.insert(id, chunk);
                    self.newly_loaded.push(id);
                }
            }
        }

        // Evict chunks beyond the unload radius and free their colliders.
        let unload = self.config.unload_distance;
        let to_remove: Vec<ChunkId> = self
            .chunks
            .keys()
            .filter(|id| id.euclidean(center) > unload)
            .copied()
            .collect();
        for id in to_remove {
            if let Some(chunk) = self.chunks.remove(&id) {
                physics.remove_collider(chunk.collider);
                log::debug!("evicted chunk ({}, {})", id.cx, id.cz);
            }
        }

        // Physics window: enabled inside 3x3, disabled everywhere else.
        for (id, chunk) in self.chunks.iter_mut() {
            let should_enable = id.chebyshev(center) <= PHYSICS_WINDOW;
            if chunk.physics_enabled != should_enable {
                physics.set_collider_enabled(chunk.collider, should_enable);
                chunk.physics_enabled = should_enable;
            }
        }
    }

    pub fn get(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunks.get(&id)
    }

    pub fn contains(&self, id: ChunkId) -> bool {
        self.chunks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// Whether the chunk containing `position` currently has collision.
    pub fn physics_active_at(&self, position: Vec3) -> bool {
        let id = ChunkId::from_world(position, self.config.chunk_size);
        self.chunks.get(&id).is_some_and(|c| c.physics_enabled)
    }

    /// Drain the list of chunks created by the most recent update.
    pub fn take_newly_loaded(&mut self) -> Vec<ChunkId> {
        std::mem::take(&mut self.newly_loaded)
    }

    /// Drop every chunk and free its collider.
    pub fn clear(&mut self, physics: &mut PhysicsBridge) {
        for (_, chunk) in self.chunks.drain() {
            physics.remove_collider(chunk.collider);
        }
        self.newly_loaded.clear();
    }
}
