//! # Chunk Loader
//!
//! The worker pool that generates chunks off the main thread.
//!
//! Block and face generation are pure CPU work, so they run on background
//! workers; only the GPU upload stage is handed back to the main thread.
//! Each worker owns a dedicated job channel fed round-robin, and all
//! workers report finished chunk positions through one shared completion
//! channel that the chunk map drains once per frame.
//!
//! There is no cancellation: generation is bounded and deterministic, so a
//! job made stale by viewpoint movement simply completes and its chunk is
//! evicted on a later update pass.

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::debug;

use crate::core::Shared;
use crate::world::chunk::{Chunk, ChunkState};
use crate::world::chunk_map::ChunkStore;
use crate::world::ChunkPos;

/// One unit of background work: drive a freshly registered chunk through
/// its block and face stages.
pub(crate) struct ChunkJob {
    /// The chunk to generate; already inserted in the registry at `Created`.
    pub chunk: Shared<Chunk>,
    /// Registry handle for state bookkeeping and neighbor block queries.
    pub store: Arc<ChunkStore>,
}

/// Runs a job to completion and returns the chunk position.
///
/// Lock discipline: the chunk write guard is always dropped before touching
/// the registry, and meshing runs under a read guard only. Holding a chunk
/// write lock while querying a neighbor could deadlock two workers meshing
/// adjacent chunks.
fn run_job(job: ChunkJob) -> ChunkPos {
    let position = job.chunk.get().position();

    job.chunk.get_mut().load_blocks();
    if !job.store.advance(position, ChunkState::BlocksLoaded) {
        // evicted while in flight: wasted work, not an error
        debug!("chunk {position:?} evicted during generation");
        return position;
    }

    let meshes = job.chunk.get().build_meshes(job.store.as_ref());
    job.chunk.get_mut().install_meshes(meshes);
    job.store.advance(position, ChunkState::FacesLoaded);

    position
}

struct WorkerChannel {
    job_sender: Sender<ChunkJob>,
    _worker: JoinHandle<()>,
}

/// A pool of chunk-generation workers.
///
/// With `workers == 0` the pool degrades to inline execution: jobs run
/// synchronously inside [`ChunkLoader::submit`]. Tests and single-threaded
/// embeddings rely on this mode.
pub struct ChunkLoader {
    channels: Vec<WorkerChannel>,
    finished_receiver: Receiver<ChunkPos>,
    finished_sender: Sender<ChunkPos>,
    inline_finished: VecDeque<ChunkPos>,
    next_channel: usize,
}

impl ChunkLoader {
    /// Spawns `workers` background threads, each with its own job channel.
    pub fn new(workers: usize) -> Self {
        let (finished_sender, finished_receiver) = channel();

        let mut channels = Vec::with_capacity(workers);
        for index in 0..workers {
            let (job_sender, job_receiver) = channel::<ChunkJob>();
            let finished = finished_sender.clone();

            let worker = thread::Builder::new()
                .name(format!("chunk-loader-{index}"))
                .spawn(move || {
                    while let Ok(job) = job_receiver.recv() {
                        let position = run_job(job);
                        if finished.send(position).is_err() {
                            break;
                        }
                    }
                })
                .expect("failed to spawn chunk loader worker");

            channels.push(WorkerChannel {
                job_sender,
                _worker: worker,
            });
        }

        ChunkLoader {
            channels,
            finished_receiver,
            finished_sender,
            inline_finished: VecDeque::new(),
            next_channel: 0,
        }
    }

    /// Number of background workers.
    pub fn workers(&self) -> usize {
        self.channels.len()
    }

    /// Hands a job to the next worker, round-robin; runs it inline when the
    /// pool has no workers.
    pub(crate) fn submit(&mut self, job: ChunkJob) {
        if self.channels.is_empty() {
            let position = run_job(job);
            self.inline_finished.push_back(position);
            return;
        }

        let index = self.next_channel % self.channels.len();
        self.next_channel = (index + 1) % self.channels.len();
        if let Err(send_error) = self.channels[index].job_sender.send(job) {
            // worker died; run the job inline rather than dropping it
            let position = run_job(send_error.0);
            let _ = self.finished_sender.send(position);
        }
    }

    /// Collects every chunk position whose generation finished since the
    /// last call. Non-blocking.
    pub fn drain_finished(&mut self) -> Vec<ChunkPos> {
        let mut finished: Vec<ChunkPos> = self.inline_finished.drain(..).collect();
        while let Ok(position) = self.finished_receiver.try_recv() {
            finished.push(position);
        }
        finished
    }
}
