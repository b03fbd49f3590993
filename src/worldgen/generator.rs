//! The per-chunk terrain generator.

use std::sync::Arc;

use cgmath::Point2;

use crate::world::block::Block;
use crate::world::{chunk_pos_of, pos_mod, ChunkPos, GlobalPos, SECTION_SIDE};
use crate::worldgen::biome::BiomeModel;

#[derive(Copy, Clone)]
struct Column {
    biome: usize,
    height: i32,
}

/// Supplies block identities for one chunk's worth of columns.
///
/// At construction the generator samples the terrain noise and the climate
/// fields once per horizontal cell of the chunk and caches the resulting
/// `(biome, surface height)` per column. That cache is write-once state:
/// after construction, [`TerrainGenerator::block_at`] is a pure O(1) lookup,
/// amortized across every section of the owning chunk.
pub struct TerrainGenerator {
    position: ChunkPos,
    model: Arc<BiomeModel>,
    columns: [[Column; SECTION_SIDE as usize]; SECTION_SIDE as usize],
}

impl TerrainGenerator {
    /// Precomputes the column field for the chunk at `position`.
    pub fn new(model: Arc<BiomeModel>, position: ChunkPos) -> Self {
        let mut columns =
            [[Column { biome: 0, height: 0 }; SECTION_SIDE as usize]; SECTION_SIDE as usize];

        for (x, row) in columns.iter_mut().enumerate() {
            for (z, column) in row.iter_mut().enumerate() {
                let global = Point2::new(
                    position.x * SECTION_SIDE + x as i32,
                    position.y * SECTION_SIDE + z as i32,
                );
                let biome = model.biome_index_at(global);
                let noise = model.terrain_noise(global);
                *column = Column {
                    biome,
                    height: model.biome(biome).height(noise),
                };
            }
        }

        TerrainGenerator {
            position,
            model,
            columns,
        }
    }

    /// Block identity at a global coordinate inside this generator's chunk.
    ///
    /// Deterministic and side-effect free: the answer depends only on the
    /// coordinate and the world seed the biome model was built from.
    pub fn block_at(&self, global: GlobalPos) -> Block {
        debug_assert_eq!(
            chunk_pos_of(global),
            self.position,
            "terrain query for a column outside the owning chunk"
        );

        let x = pos_mod(global.x, SECTION_SIDE) as usize;
        let z = pos_mod(global.z, SECTION_SIDE) as usize;
        let column = self.columns[x][z];
        self.model.biome(column.biome).block(global.y, column.height)
    }

    /// Cached surface height of the column containing `global`.
    pub fn height_at(&self, global: GlobalPos) -> i32 {
        let x = pos_mod(global.x, SECTION_SIDE) as usize;
        let z = pos_mod(global.z, SECTION_SIDE) as usize;
        self.columns[x][z].height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    #[test]
    fn rebuilt_generator_agrees_everywhere() {
        let model = Arc::new(BiomeModel::new(1234));
        let position = Point2::new(-3, 7);

        let first = TerrainGenerator::new(model.clone(), position);
        let second = TerrainGenerator::new(model, position);

        for x in 0..SECTION_SIDE {
            for z in 0..SECTION_SIDE {
                for y in [0, 40, 63, 64, 66, 90, 120] {
                    let global = Point3::new(
                        position.x * SECTION_SIDE + x,
                        y,
                        position.y * SECTION_SIDE + z,
                    );
                    assert_eq!(first.block_at(global), second.block_at(global));
                }
            }
        }
    }

    #[test]
    fn blocks_follow_the_cached_height() {
        let model = Arc::new(BiomeModel::new(99));
        let generator = TerrainGenerator::new(model, Point2::new(0, 0));

        for x in 0..SECTION_SIDE {
            for z in 0..SECTION_SIDE {
                let base = Point3::new(x, 0, z);
                let height = generator.height_at(base);

                // below the surface is never air, above it never solid ground
                let below = generator.block_at(Point3::new(x, height - 1, z));
                assert_ne!(below, Block::Air);
                let above = generator.block_at(Point3::new(x, height + 1, z));
                assert!(above == Block::Air || above == Block::Water);
            }
        }
    }
}
