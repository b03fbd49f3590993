//! # World Generation
//!
//! Deterministic procedural terrain: coherent noise sources, biome height
//! and block-classification rules, and the per-chunk generator that caches
//! one noise sample per column.
//!
//! Everything here is a pure function of the world seed and a coordinate.
//! Re-deriving a block after its chunk was evicted and reloaded yields the
//! identical result, which is why no terrain is ever persisted.

pub mod biome;
pub mod generator;
pub mod noise_source;

pub use biome::{Biome, BiomeModel};
pub use generator::TerrainGenerator;
pub use noise_source::NoiseSource;
