//! Biome height and block-classification rules.
//!
//! A biome is a named rule set: a height function over cached column noise,
//! a block classification by depth below that height, and a weight over the
//! ambient (temperature, humidity) fields. Classification must be a pure
//! function of `(y, height)` and monotonic in depth: deeper is never more
//! air than shallower.

use cgmath::Point2;

use crate::world::block::Block;
use crate::world::SEA_LEVEL;
use crate::worldgen::noise_source::NoiseSource;

/// Triangular membership for the low band of an axis: 1 at 0, falling to 0
/// at the midpoint.
pub fn low(t: f64) -> f64 {
    (1.0 - 2.0 * t).clamp(0.0, 1.0)
}

/// Triangular membership for the medium band: peaks at the midpoint.
pub fn medium(t: f64) -> f64 {
    (1.0 - (2.0 * t - 1.0).abs()).clamp(0.0, 1.0)
}

/// Triangular membership for the high band: 0 at the midpoint, 1 at 1.
pub fn high(t: f64) -> f64 {
    (2.0 * t - 1.0).clamp(0.0, 1.0)
}

/// A terrain rule set selectable by the ambient climate fields.
pub trait Biome: Send + Sync {
    /// Biome name, for logging.
    fn name(&self) -> &'static str;

    /// Surface height for a column given its cached terrain-noise sample.
    fn height(&self, noise: f64) -> i32;

    /// Block identity at `y` for a column of the given surface height.
    ///
    /// Pure in `(y, height)`; no hidden state.
    fn block(&self, y: i32, height: i32) -> Block;

    /// Weight of this biome for the given climate, in `[0, 1]`: the product
    /// of one membership band per axis.
    fn weight(&self, temperature: f64, humidity: f64) -> f64;
}

/// The default biome: gently rolling grassland.
pub struct Plains;

impl Biome for Plains {
    fn name(&self) -> &'static str {
        "plains"
    }

    fn height(&self, noise: f64) -> i32 {
        SEA_LEVEL + 2 + (noise * 16.0).floor() as i32
    }

    fn block(&self, y: i32, height: i32) -> Block {
        if y < height - 4 {
            Block::Stone
        } else if y < height {
            Block::Dirt
        } else if y == height {
            Block::Grass
        } else if y <= SEA_LEVEL {
            Block::Water
        } else {
            Block::Air
        }
    }

    fn weight(&self, temperature: f64, humidity: f64) -> f64 {
        medium(temperature) * medium(humidity)
    }
}

/// Bare stone peaks well above sea level.
pub struct Mountains;

impl Biome for Mountains {
    fn name(&self) -> &'static str {
        "mountains"
    }

    fn height(&self, noise: f64) -> i32 {
        SEA_LEVEL + 40 + (noise * 16.0).round() as i32
    }

    fn block(&self, y: i32, height: i32) -> Block {
        if y <= height - 1 {
            Block::Stone
        } else if y < SEA_LEVEL {
            Block::Water
        } else {
            Block::Air
        }
    }

    fn weight(&self, temperature: f64, humidity: f64) -> f64 {
        medium(temperature) * low(humidity)
    }
}

/// Scale of the terrain-shaping noise, in blocks.
const TERRAIN_NOISE_SCALE: f64 = 256.0;
/// Scale of the temperature and humidity fields. Much wider than the
/// terrain noise so biomes change over regions, not columns.
const CLIMATE_NOISE_SCALE: f64 = 1024.0;

/// The full biome set plus the climate fields that select between them.
///
/// One model is built per world from a single seed and shared (via `Arc`)
/// by every chunk's [`TerrainGenerator`](crate::worldgen::TerrainGenerator).
pub struct BiomeModel {
    biomes: Vec<Box<dyn Biome>>,
    terrain: NoiseSource,
    temperature: NoiseSource,
    humidity: NoiseSource,
}

impl BiomeModel {
    /// Builds the standard biome set for a world seed.
    ///
    /// The terrain, temperature and humidity sources are derived from the
    /// seed with fixed offsets so the three fields are independent but the
    /// whole world stays a function of one number.
    pub fn new(seed: u32) -> Self {
        BiomeModel {
            biomes: vec![Box::new(Plains), Box::new(Mountains)],
            terrain: NoiseSource::new(seed, TERRAIN_NOISE_SCALE),
            temperature: NoiseSource::new(seed.wrapping_add(1), CLIMATE_NOISE_SCALE),
            humidity: NoiseSource::new(seed.wrapping_add(2), CLIMATE_NOISE_SCALE),
        }
    }

    /// Samples the terrain-shaping noise for a column.
    pub fn terrain_noise(&self, column: Point2<i32>) -> f64 {
        self.terrain.sample(column)
    }

    /// Index of the highest-weight biome for a column's climate.
    ///
    /// Falls back to the first biome (plains) when every weight is zero,
    /// which happens at the extreme corners of the climate space.
    pub fn biome_index_at(&self, column: Point2<i32>) -> usize {
        let temperature = self.temperature.sample_unit(column);
        let humidity = self.humidity.sample_unit(column);

        let mut best = 0;
        let mut best_weight = f64::MIN;
        for (index, biome) in self.biomes.iter().enumerate() {
            let weight = biome.weight(temperature, humidity);
            if weight > best_weight {
                best = index;
                best_weight = weight;
            }
        }
        best
    }

    /// The biome behind an index returned by [`Self::biome_index_at`].
    pub fn biome(&self, index: usize) -> &dyn Biome {
        self.biomes[index].as_ref()
    }
}
