//! # Chunk Module
//!
//! The vertical full-height column of voxel data at one horizontal
//! coordinate: an ordered stack of sections sharing one terrain generator,
//! plus the coarse loading state the chunk map tracks per chunk.

use std::sync::Arc;

use cgmath::Point3;

use crate::render::{RenderDevice, SurfaceContext, UploadError};
use crate::world::block::Block;
use crate::world::section::{Section, SectionMesh};
use crate::world::{
    chunk_pos_of, local_in_section, BlockLookup, ChunkPos, GlobalPos, CHUNK_HEIGHT,
    SECTIONS_PER_CHUNK, SECTION_HEIGHT,
};
use crate::worldgen::{BiomeModel, TerrainGenerator};

/// The coarse loading stage of a chunk.
///
/// Transitions are strictly forward (`Created -> BlocksLoaded ->
/// FacesLoaded -> Ready`) and applied only through the chunk map's
/// bookkeeping hook so the per-state counters stay consistent. A chunk is
/// never rolled back; eviction destroys it outright.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChunkState {
    /// Constructed; block grids still empty.
    Created = 0,
    /// Every section's block grid is populated.
    BlocksLoaded = 1,
    /// Every section's mesh is built.
    FacesLoaded = 2,
    /// Meshes are uploaded; the chunk is drawable.
    Ready = 3,
}

impl ChunkState {
    /// Number of states, sizing the chunk map's counter table.
    pub const COUNT: usize = 4;

    /// All states in transition order.
    pub const ALL: [ChunkState; ChunkState::COUNT] = [
        ChunkState::Created,
        ChunkState::BlocksLoaded,
        ChunkState::FacesLoaded,
        ChunkState::Ready,
    ];
}

/// A vertical stack of [`Section`]s at one horizontal chunk coordinate.
///
/// The chunk owns one [`TerrainGenerator`] so the per-column noise sampling
/// is paid once and amortized across all of its sections.
pub struct Chunk {
    position: ChunkPos,
    sections: Vec<Section>,
    generator: TerrainGenerator,
    state: ChunkState,
}

/// Resolves block queries during meshing: positions inside the owning chunk
/// come straight from its own sections (the chunk may not be registered in
/// the map yet, and its own column must never resolve to absent), anything
/// else is relayed to the world.
struct ChunkView<'a> {
    chunk: &'a Chunk,
    world: &'a dyn BlockLookup,
}

impl BlockLookup for ChunkView<'_> {
    fn block_at(&self, global: GlobalPos) -> Block {
        if chunk_pos_of(global) == self.chunk.position {
            self.chunk.block_at(global)
        } else {
            self.world.block_at(global)
        }
    }
}

impl Chunk {
    /// Creates an unloaded chunk at `position`, constructing its generator
    /// (which precomputes the column noise field) and its empty sections.
    pub fn new(model: Arc<BiomeModel>, position: ChunkPos) -> Self {
        let generator = TerrainGenerator::new(model, position);
        let sections = (0..SECTIONS_PER_CHUNK)
            .map(|i| Section::new(Point3::new(position.x, i as i32, position.y)))
            .collect();

        Chunk {
            position,
            sections,
            generator,
            state: ChunkState::Created,
        }
    }

    /// This chunk's horizontal coordinate.
    pub fn position(&self) -> ChunkPos {
        self.position
    }

    /// Current loading stage.
    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// Records a stage advance. Only the chunk map's bookkeeping hook calls
    /// this, keeping the per-state counters in step.
    pub(crate) fn set_state(&mut self, state: ChunkState) {
        debug_assert!(state >= self.state, "chunk state must advance forward");
        self.state = state;
    }

    /// Whether the block grids are populated.
    pub fn has_loaded_blocks(&self) -> bool {
        self.state >= ChunkState::BlocksLoaded
    }

    /// Whether the section meshes are built.
    pub fn has_loaded_faces(&self) -> bool {
        self.state >= ChunkState::FacesLoaded
    }

    /// Populates every section's block grid from the terrain generator.
    pub fn load_blocks(&mut self) {
        let generator = &self.generator;
        for section in &mut self.sections {
            section.load_blocks(generator);
        }
    }

    /// Builds a mesh per section without mutating the chunk.
    ///
    /// Split from [`Chunk::install_meshes`] so a loader worker can mesh
    /// under a read guard: holding a chunk write lock while querying
    /// neighbor chunks could deadlock two workers meshing adjacent chunks.
    pub fn build_meshes(&self, world: &dyn BlockLookup) -> Vec<SectionMesh> {
        let view = ChunkView { chunk: self, world };
        self.sections
            .iter()
            .map(|section| section.build_mesh(&view))
            .collect()
    }

    /// Installs meshes previously produced by [`Chunk::build_meshes`], in
    /// the same vertical order.
    pub fn install_meshes(&mut self, meshes: Vec<SectionMesh>) {
        debug_assert_eq!(meshes.len(), self.sections.len());
        for (section, mesh) in self.sections.iter_mut().zip(meshes) {
            section.install_mesh(mesh);
        }
    }

    /// Builds and installs every section's mesh in one step.
    pub fn load_faces(&mut self, world: &dyn BlockLookup) {
        let meshes = self.build_meshes(world);
        self.install_meshes(meshes);
    }

    /// Uploads every section's mesh to the render device.
    ///
    /// Upload failures are isolated per section: remaining sections are
    /// still attempted and the first error is returned. Already-uploaded
    /// and empty sections are skipped, so a retry after a partial failure
    /// only touches what is missing.
    ///
    /// # Errors
    /// The first [`UploadError`] encountered, if any section failed.
    pub fn load_vaos(&mut self, device: &mut dyn RenderDevice) -> Result<(), UploadError> {
        let mut first_error = None;
        for section in &mut self.sections {
            if let Err(error) = section.load_vaos(device) {
                log::warn!(
                    "mesh upload failed for section {:?}: {error}",
                    section.position()
                );
                if first_error.is_none() {
                    first_error = Some(error);
                }
            }
        }
        match first_error {
            None => Ok(()),
            Some(error) => Err(error),
        }
    }

    /// Releases every section's GPU buffers.
    pub fn unload_vaos(&mut self, device: &mut dyn RenderDevice) {
        for section in &mut self.sections {
            section.unload_vaos(device);
        }
    }

    /// Draws every non-empty section.
    pub fn render(&self, device: &mut dyn RenderDevice, surface: &SurfaceContext) {
        for section in &self.sections {
            section.render(device, surface);
        }
    }

    /// Section accessor by vertical slab index.
    ///
    /// # Panics
    /// Panics if `index >= SECTIONS_PER_CHUNK`.
    pub fn section(&self, index: usize) -> &Section {
        &self.sections[index]
    }

    /// Block at a global coordinate within this chunk's column.
    ///
    /// Coordinates above or below the world resolve to `Air`. The caller
    /// must have established that the horizontal coordinate belongs to this
    /// chunk.
    pub fn block_at(&self, global: GlobalPos) -> Block {
        debug_assert_eq!(chunk_pos_of(global), self.position);
        if !(0..CHUNK_HEIGHT).contains(&global.y) {
            return Block::Air;
        }
        let section = &self.sections[(global.y / SECTION_HEIGHT) as usize];
        section.block(local_in_section(global))
    }
}
