//! # Chunk Map Module
//!
//! The single authority over which chunk coordinates are resident, and the
//! orchestration of their staged loading, unloading, and rendering.
//!
//! ## Streaming policy
//!
//! Every coordinate within `load_distance` (Chebyshev radius) of the center
//! is kept resident; only the strictly smaller `view_distance` square is
//! drawn. The one-chunk gap means a neighbor query issued while meshing a
//! drawable chunk never hits an absent chunk.
//!
//! ## Concurrency
//!
//! The registry (`ChunkStore`) is the only structure shared with the loader
//! workers. Insertion and the whole unload pass are serialized through its
//! `RwLock`; workers hold only short read guards while resolving neighbor
//! blocks, and chunks with in-flight jobs are never evicted, which keeps
//! the lock graph acyclic.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use cgmath::Point2;
use log::{debug, info};

use crate::core::Shared;
use crate::render::{RenderDevice, SurfaceContext};
use crate::world::block::Block;
use crate::world::chunk::{Chunk, ChunkState};
use crate::world::loader::{ChunkJob, ChunkLoader};
use crate::world::{
    chunk_pos_of, floor_div, BlockLookup, ChunkPos, GlobalPos, CHUNK_HEIGHT, SECTIONS_PER_CHUNK,
    SECTION_HEIGHT,
};
use crate::worldgen::BiomeModel;

/// Construction parameters for a streamed world.
#[derive(Copy, Clone, Debug)]
pub struct WorldConfig {
    /// World seed; the entire terrain is a function of this number.
    pub seed: u32,
    /// Radius of the drawn square, in chunks.
    pub view_distance: i32,
    /// Background generation workers. Zero runs generation inline on the
    /// calling thread.
    pub workers: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            seed: 0,
            view_distance: ChunkMap::VIEW_DISTANCE,
            workers: 2,
        }
    }
}

/// Chebyshev distance between two chunk coordinates.
fn chebyshev(a: ChunkPos, b: ChunkPos) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// All coordinates within a square radius of `center`.
fn square(center: ChunkPos, radius: i32) -> impl Iterator<Item = ChunkPos> {
    (center.x - radius..=center.x + radius).flat_map(move |x| {
        (center.y - radius..=center.y + radius).map(move |z| Point2::new(x, z))
    })
}

/// The chunk registry shared between the map front-end and loader workers.
///
/// Owns the key-to-chunk mapping and the per-state counter table. All state
/// transitions flow through [`ChunkStore::advance`] so the counters stay
/// transactionally consistent with the chunks.
pub(crate) struct ChunkStore {
    chunks: RwLock<HashMap<ChunkPos, Shared<Chunk>>>,
    counters: Mutex<[usize; ChunkState::COUNT]>,
}

impl ChunkStore {
    fn new() -> Self {
        ChunkStore {
            chunks: RwLock::new(HashMap::new()),
            counters: Mutex::new([0; ChunkState::COUNT]),
        }
    }

    /// Cloned handle to the chunk at `pos`, if resident.
    pub(crate) fn get(&self, pos: ChunkPos) -> Option<Shared<Chunk>> {
        self.chunks.read().unwrap().get(&pos).cloned()
    }

    /// Registers a freshly created chunk. At most one chunk may ever exist
    /// per coordinate.
    fn insert(&self, pos: ChunkPos, chunk: Shared<Chunk>) {
        let mut chunks = self.chunks.write().unwrap();
        let previous = chunks.insert(pos, chunk);
        debug_assert!(previous.is_none(), "duplicate chunk at {pos:?}");
        self.counters.lock().unwrap()[ChunkState::Created as usize] += 1;
    }

    /// Advances a resident chunk to `next`, updating the state counters as
    /// one transaction (decrement old, increment new).
    ///
    /// Returns `false` when the chunk was evicted while its job was in
    /// flight; the caller should abandon the remaining stages.
    ///
    /// Callers must not hold the chunk's own guard across this call.
    pub(crate) fn advance(&self, pos: ChunkPos, next: ChunkState) -> bool {
        let chunks = self.chunks.read().unwrap();
        let Some(chunk) = chunks.get(&pos) else {
            return false;
        };
        let mut guard = chunk.get_mut();
        let mut counters = self.counters.lock().unwrap();
        counters[guard.state() as usize] -= 1;
        counters[next as usize] += 1;
        guard.set_state(next);
        true
    }

    /// Erases every resident chunk outside `radius` of `center`, except
    /// those in `keep` (chunks with in-flight generation jobs).
    ///
    /// The whole pass holds the registry write lock: this is the sole
    /// deletion path, and no reader can be handed a chunk reference while a
    /// chunk is being destroyed.
    fn remove_outside(
        &self,
        center: ChunkPos,
        radius: i32,
        keep: &HashSet<ChunkPos>,
        device: &mut dyn RenderDevice,
    ) -> usize {
        let mut chunks = self.chunks.write().unwrap();
        let before = chunks.len();
        chunks.retain(|pos, chunk| {
            if chebyshev(*pos, center) <= radius || keep.contains(pos) {
                return true;
            }
            let mut guard = chunk.get_mut();
            guard.unload_vaos(device);
            self.counters.lock().unwrap()[guard.state() as usize] -= 1;
            false
        });
        before - chunks.len()
    }

    /// Draws every resident chunk within `radius` of `center`.
    fn render_within(
        &self,
        center: ChunkPos,
        radius: i32,
        device: &mut dyn RenderDevice,
        surface: &SurfaceContext,
    ) {
        let chunks = self.chunks.read().unwrap();
        for pos in square(center, radius) {
            if let Some(chunk) = chunks.get(&pos) {
                chunk.get().render(device, surface);
            }
        }
    }

    fn len(&self) -> usize {
        self.chunks.read().unwrap().len()
    }

    fn in_state(&self, state: ChunkState) -> usize {
        self.counters.lock().unwrap()[state as usize]
    }

    fn at_least_in_state(&self, state: ChunkState) -> usize {
        let counters = self.counters.lock().unwrap();
        counters[state as usize..].iter().sum()
    }
}

impl BlockLookup for ChunkStore {
    /// Global block lookup with the absent-chunk policy: coordinates whose
    /// owning chunk is not resident (or not yet populated) resolve to
    /// `Air`, so an unloaded chunk never occludes a face.
    fn block_at(&self, global: GlobalPos) -> Block {
        if !(0..CHUNK_HEIGHT).contains(&global.y) {
            return Block::Air;
        }
        let Some(chunk) = self.get(chunk_pos_of(global)) else {
            return Block::Air;
        };
        let guard = chunk.get();
        if !guard.has_loaded_blocks() {
            return Block::Air;
        }
        guard.block_at(global)
    }
}

/// The spatial registry of resident chunks and the streaming policy that
/// loads, unloads, and renders them around a moving center.
///
/// The frame-loop contract is `load()`, `update()`, `render()` once per
/// frame in that order, with [`ChunkMap::set_center`] called whenever the
/// viewpoint crosses into a new chunk.
pub struct ChunkMap {
    store: Arc<ChunkStore>,
    model: Arc<BiomeModel>,
    loader: ChunkLoader,
    center: ChunkPos,
    new_center: ChunkPos,
    view_distance: i32,
    /// Coordinates dispatched to the loader whose results have not been
    /// drained yet. These are protected from eviction.
    pending: HashSet<ChunkPos>,
}

impl ChunkMap {
    /// Default radius of the drawn square, in chunks.
    pub const VIEW_DISTANCE: i32 = 4;

    /// Creates an empty map centered at the origin.
    pub fn new(config: WorldConfig) -> Self {
        info!(
            "world seed {} view distance {} workers {}",
            config.seed, config.view_distance, config.workers
        );
        ChunkMap {
            store: Arc::new(ChunkStore::new()),
            model: Arc::new(BiomeModel::new(config.seed)),
            loader: ChunkLoader::new(config.workers),
            center: Point2::new(0, 0),
            new_center: Point2::new(0, 0),
            view_distance: config.view_distance,
            pending: HashSet::new(),
        }
    }

    /// Radius of the drawn square.
    pub fn view_distance(&self) -> i32 {
        self.view_distance
    }

    /// Radius of the resident square: one chunk beyond the view radius, so
    /// boundary meshing always finds its neighbors' blocks.
    pub fn load_distance(&self) -> i32 {
        self.view_distance + 1
    }

    /// Records the chunk coordinate nearest the viewpoint. The move takes
    /// effect on the next [`ChunkMap::update`], batching many small moves
    /// into one re-evaluation.
    pub fn set_center(&mut self, center: ChunkPos) {
        self.new_center = center;
    }

    /// The current streaming center.
    pub fn center(&self) -> ChunkPos {
        self.center
    }

    /// Per-frame load pass.
    ///
    /// Dispatches generation jobs for every coordinate in the load radius
    /// lacking a resident chunk, drains finished jobs, and uploads meshes
    /// for chunks that reached `FacesLoaded` (including retries after an
    /// earlier upload failure). Upload runs here, on the device-owning
    /// thread; generation runs on the worker pool.
    pub fn load(&mut self, device: &mut dyn RenderDevice) {
        for pos in square(self.center, self.load_distance()) {
            if self.store.get(pos).is_none() {
                debug!("dispatching chunk {pos:?}");
                let chunk = Shared::new(Chunk::new(self.model.clone(), pos));
                self.store.insert(pos, chunk.clone());
                self.pending.insert(pos);
                self.loader.submit(ChunkJob {
                    chunk,
                    store: self.store.clone(),
                });
            }
        }

        for pos in self.loader.drain_finished() {
            self.pending.remove(&pos);
        }

        for pos in square(self.center, self.load_distance()) {
            let Some(chunk) = self.store.get(pos) else {
                continue;
            };
            if chunk.get().state() != ChunkState::FacesLoaded {
                continue;
            }
            let result = chunk.get_mut().load_vaos(device);
            match result {
                Ok(()) => {
                    self.store.advance(pos, ChunkState::Ready);
                }
                Err(error) => {
                    // stays in FacesLoaded; retried on a later pass
                    log::warn!("chunk {pos:?} left undrawable: {error}");
                }
            }
        }
    }

    /// Per-frame update pass: adopts a changed center and evicts chunks
    /// outside the load radius.
    ///
    /// The eviction pass runs every frame, not just on a center change:
    /// chunks spared by an earlier pass because their generation jobs were
    /// still in flight must be caught once those jobs drain, even if the
    /// viewpoint never moves again. With nothing out of range the pass is a
    /// single walk over the residency map.
    pub fn update(&mut self, device: &mut dyn RenderDevice) {
        if self.new_center != self.center {
            debug!(
                "center moved {:?} -> {:?}",
                self.center, self.new_center
            );
            self.center = self.new_center;
        }
        self.unload_far_chunks(device);
    }

    /// Evicts every resident chunk outside the load radius. Chunks with
    /// in-flight generation jobs are skipped this pass and caught on a
    /// later one, once their stale jobs complete.
    pub fn unload_far_chunks(&mut self, device: &mut dyn RenderDevice) {
        let removed =
            self.store
                .remove_outside(self.center, self.load_distance(), &self.pending, device);
        if removed > 0 {
            info!("evicted {removed} chunks, {} resident", self.store.len());
        }
    }

    /// Draws every chunk within the view radius. Chunks in the load buffer
    /// outside the view radius stay resident for boundary meshing but are
    /// never drawn.
    pub fn render(&self, device: &mut dyn RenderDevice, surface: &SurfaceContext) {
        self.store
            .render_within(self.center, self.view_distance, device, surface);
    }

    /// Handle to the resident chunk at a horizontal coordinate.
    pub fn get_chunk(&self, pos: ChunkPos) -> Option<Shared<Chunk>> {
        self.store.get(pos)
    }

    /// Resolves a global coordinate to its owning chunk and vertical slab
    /// index, if resident and within the world's height.
    pub fn section_at(&self, global: GlobalPos) -> Option<(Shared<Chunk>, usize)> {
        let slab = floor_div(global.y, SECTION_HEIGHT);
        if !(0..SECTIONS_PER_CHUNK as i32).contains(&slab) {
            return None;
        }
        let chunk = self.store.get(chunk_pos_of(global))?;
        Some((chunk, slab as usize))
    }

    /// Block identity at a global coordinate; `Air` when the owning chunk
    /// is not resident.
    pub fn block_at(&self, global: GlobalPos) -> Block {
        self.store.block_at(global)
    }

    /// Number of resident chunks.
    pub fn size(&self) -> usize {
        self.store.len()
    }

    /// Number of resident chunks exactly in `state`. O(1), maintained by
    /// the transition bookkeeping rather than recomputed by scanning.
    pub fn chunks_in_state(&self, state: ChunkState) -> usize {
        self.store.in_state(state)
    }

    /// Number of resident chunks at or past `state`. O(1).
    pub fn chunks_at_least_in_state(&self, state: ChunkState) -> usize {
        self.store.at_least_in_state(state)
    }
}
