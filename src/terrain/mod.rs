//! Procedural terrain: gradient noise, biome classification, elevation.

pub mod biome;
pub mod height;
pub mod noise;

pub use biome::Biome;
pub use height::HeightField;
pub use noise::NoiseField;
