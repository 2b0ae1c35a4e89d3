//! Chunked terrain streaming around a moving observer.

pub mod chunk;
pub mod decoration;
pub mod streamer;

pub use chunk::{Chunk, ChunkId, TerrainMesh, TerrainVertex};
pub use decoration::{DecorationInstance, DecorationKind};
pub use streamer::{ChunkStreamer, StreamerConfig};
