//! # World Module
//!
//! The resident voxel world: blocks, sections, chunks, the chunk map that
//! streams them around the viewpoint, and the background loader.
//!
//! ## Coordinate spaces
//!
//! * **Global**: block coordinates over the whole world, `Point3<i32>`.
//! * **Chunk**: horizontal chunk-grid coordinates, `Point2<i32>`; one chunk
//!   covers a `SECTION_SIDE x SECTION_SIDE` footprint and the full world
//!   height.
//! * **Section**: `(chunk x, vertical slab index, chunk z)`, `Point3<i32>`.
//! * **Local**: coordinates within one section,
//!   `[0, SECTION_SIDE) x [0, SECTION_HEIGHT) x [0, SECTION_SIDE)`.
//!
//! Translation between these spaces is pure arithmetic; the helpers below
//! use floored division so negative coordinates behave.

use cgmath::{EuclideanSpace, Point2, Point3};

pub mod block;
pub mod chunk;
pub mod chunk_map;
pub mod direction;
pub mod loader;
pub mod section;

use block::Block;

/// Horizontal side length of a section (and of a chunk), in blocks.
pub const SECTION_SIDE: i32 = 16;
/// Height of one section slab, in blocks.
pub const SECTION_HEIGHT: i32 = 16;
/// Number of section slabs stacked in a chunk.
pub const SECTIONS_PER_CHUNK: usize = 8;
/// Total world height, in blocks.
pub const CHUNK_HEIGHT: i32 = SECTION_HEIGHT * SECTIONS_PER_CHUNK as i32;
/// The water line used by every biome's block classification.
pub const SEA_LEVEL: i32 = 64;

/// A horizontal chunk-grid coordinate.
pub type ChunkPos = Point2<i32>;
/// A section coordinate: chunk x, vertical slab index, chunk z.
pub type SectionPos = Point3<i32>;
/// A global block coordinate.
pub type GlobalPos = Point3<i32>;

/// Floored division, so `-1 / 16` maps to chunk `-1` rather than `0`.
pub fn floor_div(a: i32, b: i32) -> i32 {
    a.div_euclid(b)
}

/// Positive remainder in `[0, b)`.
pub fn pos_mod(a: i32, b: i32) -> i32 {
    a.rem_euclid(b)
}

/// The chunk owning a global coordinate.
pub fn chunk_pos_of(global: GlobalPos) -> ChunkPos {
    Point2::new(floor_div(global.x, SECTION_SIDE), floor_div(global.z, SECTION_SIDE))
}

/// The section owning a global coordinate.
pub fn section_pos_of(global: GlobalPos) -> SectionPos {
    Point3::new(
        floor_div(global.x, SECTION_SIDE),
        floor_div(global.y, SECTION_HEIGHT),
        floor_div(global.z, SECTION_SIDE),
    )
}

/// Global coordinate of a section's minimum corner.
pub fn section_origin(section: SectionPos) -> GlobalPos {
    Point3::new(
        section.x * SECTION_SIDE,
        section.y * SECTION_HEIGHT,
        section.z * SECTION_SIDE,
    )
}

/// Local coordinate of a global position within its owning section.
pub fn local_in_section(global: GlobalPos) -> Point3<i32> {
    Point3::new(
        pos_mod(global.x, SECTION_SIDE),
        pos_mod(global.y, SECTION_HEIGHT),
        pos_mod(global.z, SECTION_SIDE),
    )
}

/// Read-only block access by global coordinate.
///
/// Implementors resolve a coordinate whose owning chunk is not resident (or
/// not yet populated) to [`Block::Air`]: an unloaded neighbor never occludes
/// a face and never blocks generation.
pub trait BlockLookup {
    /// Block identity at a global coordinate, `Air` when unresolved.
    fn block_at(&self, global: GlobalPos) -> Block;
}
