//! # Section Module
//!
//! One fixed-size vertical slab of a chunk: a dense block grid plus the
//! face-culled mesh derived from it and the GPU handle the mesh was
//! uploaded under.
//!
//! A section's lifecycle is strictly staged: `load_blocks` populates the
//! grid, `load_faces` derives the mesh from populated blocks, `load_vaos`
//! uploads a non-empty mesh. Running a stage before its predecessor is a
//! programming defect, not a recoverable error.

use cgmath::{EuclideanSpace, Point3};
use log::trace;

use crate::render::{MeshHandle, MeshVertex, RenderDevice, SurfaceContext, UploadError};
use crate::world::block::Block;
use crate::world::direction::{Direction, FACE_CORNERS, FACE_TEX_COORDS, QUAD_INDICES};
use crate::world::{section_origin, BlockLookup, SectionPos, SECTION_HEIGHT, SECTION_SIDE};
use crate::worldgen::TerrainGenerator;

#[cfg(test)]
use crate::world::GlobalPos;

/// Blocks in one section.
const SECTION_VOLUME: usize = (SECTION_SIDE * SECTION_HEIGHT * SECTION_SIDE) as usize;

/// CPU-side mesh buffers for one section.
#[derive(Debug, Default)]
pub struct SectionMesh {
    /// Interleaved vertex data, four vertices per emitted face.
    pub vertices: Vec<MeshVertex>,
    /// Two triangles per face, `0,1,2,2,3,0` offset by 4 per face.
    pub indices: Vec<u32>,
}

impl SectionMesh {
    /// Whether no faces were emitted.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// A `SECTION_SIDE x SECTION_HEIGHT x SECTION_SIDE` block grid and its
/// derived surface mesh.
pub struct Section {
    position: SectionPos,
    blocks: Vec<Block>,
    mesh: SectionMesh,
    gpu: Option<MeshHandle>,
}

impl Section {
    /// Creates an unpopulated section at the given section coordinate.
    pub fn new(position: SectionPos) -> Self {
        Section {
            position,
            blocks: vec![Block::Air; SECTION_VOLUME],
            mesh: SectionMesh::default(),
            gpu: None,
        }
    }

    /// This section's coordinate.
    pub fn position(&self) -> SectionPos {
        self.position
    }

    fn index(local: Point3<i32>) -> usize {
        (local.x + SECTION_SIDE * (local.z + SECTION_SIDE * local.y)) as usize
    }

    fn in_bounds(local: Point3<i32>) -> bool {
        (0..SECTION_SIDE).contains(&local.x)
            && (0..SECTION_HEIGHT).contains(&local.y)
            && (0..SECTION_SIDE).contains(&local.z)
    }

    /// Fills the block grid from the owning chunk's terrain generator,
    /// translating every local coordinate to global space.
    pub fn load_blocks(&mut self, generator: &TerrainGenerator) {
        let origin = section_origin(self.position);
        for x in 0..SECTION_SIDE {
            for z in 0..SECTION_SIDE {
                for y in 0..SECTION_HEIGHT {
                    let local = Point3::new(x, y, z);
                    self.blocks[Self::index(local)] =
                        generator.block_at(origin + local.to_vec());
                }
            }
        }
    }

    /// Builds the surface mesh from the populated block grid.
    ///
    /// Per-voxel face culling: every non-air block emits one quad towards
    /// each neighbor that is air or absent. Coplanar faces are never merged.
    /// Neighbor queries that leave the section are relayed through `lookup`.
    pub fn build_mesh(&self, lookup: &dyn BlockLookup) -> SectionMesh {
        let mut mesh = SectionMesh::default();
        let origin = section_origin(self.position);

        for x in 0..SECTION_SIDE {
            for y in 0..SECTION_HEIGHT {
                for z in 0..SECTION_SIDE {
                    let local = Point3::new(x, y, z);
                    if self.block(local).is_air() {
                        continue;
                    }

                    let global = origin + local.to_vec();
                    for direction in Direction::ALL {
                        if !self.near_block(local + direction.offset(), lookup).is_air() {
                            continue;
                        }

                        let face = (mesh.vertices.len() / 4) as u32;
                        let corners = &FACE_CORNERS[direction as usize];
                        for (corner, tex) in corners.iter().zip(FACE_TEX_COORDS) {
                            mesh.vertices.push(MeshVertex::new(
                                [
                                    global.x as f32 + corner[0],
                                    global.y as f32 + corner[1],
                                    global.z as f32 + corner[2],
                                ],
                                tex,
                            ));
                        }
                        mesh.indices.extend(QUAD_INDICES.iter().map(|i| 4 * face + i));
                    }
                }
            }
        }

        trace!(
            "meshed section {:?}: {} faces",
            self.position,
            mesh.vertices.len() / 4
        );
        mesh
    }

    /// Replaces this section's mesh with a freshly built one.
    pub fn install_mesh(&mut self, mesh: SectionMesh) {
        self.mesh = mesh;
    }

    /// Builds and installs the surface mesh in one step.
    pub fn load_faces(&mut self, lookup: &dyn BlockLookup) {
        let mesh = self.build_mesh(lookup);
        self.install_mesh(mesh);
    }

    /// Uploads the mesh buffers to the render device.
    ///
    /// No-op when the mesh is empty (no GPU resources are ever allocated
    /// for an all-air or fully buried section) or already uploaded, which
    /// makes retrying after a failed upload safe.
    ///
    /// # Errors
    /// Propagates the device's [`UploadError`]; the section keeps its mesh
    /// and stays undrawable until a later retry succeeds.
    pub fn load_vaos(&mut self, device: &mut dyn RenderDevice) -> Result<(), UploadError> {
        if self.gpu.is_some() || self.mesh.is_empty() {
            return Ok(());
        }
        self.gpu = Some(device.create_mesh(&self.mesh.vertices, &self.mesh.indices)?);
        Ok(())
    }

    /// Releases the uploaded buffers. Safe to call when nothing was ever
    /// allocated.
    pub fn unload_vaos(&mut self, device: &mut dyn RenderDevice) {
        if let Some(handle) = self.gpu.take() {
            device.destroy_mesh(handle);
        }
    }

    /// Issues the draw call for this section's mesh; no-op when empty or
    /// not uploaded.
    pub fn render(&self, device: &mut dyn RenderDevice, surface: &SurfaceContext) {
        if let Some(handle) = self.gpu {
            device.draw_mesh(handle, surface);
        }
    }

    /// Block at a local coordinate.
    ///
    /// # Panics
    /// Panics if `local` is outside the section cube; internal callers are
    /// expected to stay in bounds, so this indicates a coordinate
    /// translation bug.
    pub fn block(&self, local: Point3<i32>) -> Block {
        assert!(
            Self::in_bounds(local),
            "local coordinate {local:?} outside section bounds"
        );
        self.blocks[Self::index(local)]
    }

    /// Block at a local coordinate that may fall outside this section.
    ///
    /// In-section positions resolve directly; anything else is translated
    /// to global space and relayed through `lookup`, which answers `Air`
    /// for chunks that are not resident.
    pub fn near_block(&self, local: Point3<i32>, lookup: &dyn BlockLookup) -> Block {
        if Self::in_bounds(local) {
            self.blocks[Self::index(local)]
        } else {
            let origin = section_origin(self.position);
            lookup.block_at(origin + local.to_vec())
        }
    }

    /// Number of indices in the current mesh.
    pub fn index_count(&self) -> usize {
        self.mesh.indices.len()
    }

    /// Whether the current mesh holds no faces.
    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }

    /// Whether the mesh has been uploaded to the device.
    pub fn is_uploaded(&self) -> bool {
        self.gpu.is_some()
    }

    #[cfg(test)]
    pub(crate) fn set_block(&mut self, local: Point3<i32>, block: Block) {
        assert!(Self::in_bounds(local));
        self.blocks[Self::index(local)] = block;
    }
}

/// Resolves every out-of-section query to `Air`, standing in for a world
/// with no resident neighbors.
#[cfg(test)]
pub(crate) struct OpenAir;

#[cfg(test)]
impl BlockLookup for OpenAir {
    fn block_at(&self, _global: GlobalPos) -> Block {
        Block::Air
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_section() -> Section {
        Section::new(Point3::new(0, 0, 0))
    }

    #[test]
    fn isolated_voxel_emits_six_quads() {
        let mut section = empty_section();
        section.set_block(Point3::new(8, 8, 8), Block::Stone);
        let mesh = section.build_mesh(&OpenAir);

        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
    }

    #[test]
    fn adjacent_solids_share_no_face() {
        let mut section = empty_section();
        section.set_block(Point3::new(8, 8, 8), Block::Stone);
        section.set_block(Point3::new(9, 8, 8), Block::Dirt);
        let mesh = section.build_mesh(&OpenAir);

        // two cubes, minus the two faces on the shared boundary
        assert_eq!(mesh.vertices.len() / 4, 10);
        assert_eq!(mesh.indices.len(), 60);
    }

    #[test]
    fn water_occludes_like_solid() {
        let mut section = empty_section();
        section.set_block(Point3::new(4, 4, 4), Block::Stone);
        section.set_block(Point3::new(4, 5, 4), Block::Water);
        let mesh = section.build_mesh(&OpenAir);

        assert_eq!(mesh.vertices.len() / 4, 10);
    }

    #[test]
    fn empty_section_emits_nothing() {
        let section = empty_section();
        let mesh = section.build_mesh(&OpenAir);
        assert!(mesh.is_empty());
    }

    #[test]
    fn index_pattern_is_two_triangles_per_quad() {
        let mut section = empty_section();
        section.set_block(Point3::new(0, 0, 0), Block::Grass);
        let mesh = section.build_mesh(&OpenAir);

        for face in 0..mesh.indices.len() / 6 {
            let base = 4 * face as u32;
            assert_eq!(
                &mesh.indices[face * 6..face * 6 + 6],
                &[base, base + 1, base + 2, base + 2, base + 3, base]
            );
        }
    }

    #[test]
    fn absent_neighbor_matches_resident_air() {
        struct ResidentAir;
        impl BlockLookup for ResidentAir {
            fn block_at(&self, _global: GlobalPos) -> Block {
                // a resident chunk whose blocks are all air
                Block::Air
            }
        }

        let mut section = empty_section();
        section.set_block(Point3::new(0, 8, 8), Block::Stone);

        let absent = section.build_mesh(&OpenAir);
        let resident = section.build_mesh(&ResidentAir);
        assert_eq!(absent.vertices, resident.vertices);
        assert_eq!(absent.indices, resident.indices);
    }

    #[test]
    fn edge_voxel_consults_the_lookup() {
        struct SolidWall;
        impl BlockLookup for SolidWall {
            fn block_at(&self, _global: GlobalPos) -> Block {
                Block::Stone
            }
        }

        let mut section = empty_section();
        section.set_block(Point3::new(0, 8, 8), Block::Stone);

        // the solid neighbor beyond the -X boundary suppresses that face;
        // the five in-section air neighbors still emit theirs
        let walled = section.build_mesh(&SolidWall);
        assert_eq!(walled.vertices.len() / 4, 5);

        let open = section.build_mesh(&OpenAir);
        assert_eq!(open.vertices.len() / 4, 6);
    }

    #[test]
    #[should_panic(expected = "outside section bounds")]
    fn out_of_range_access_is_a_defect() {
        let section = empty_section();
        section.block(Point3::new(-1, 0, 0));
    }
}
