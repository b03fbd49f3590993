//! End-to-end streaming scenarios: residency, recentering, eviction,
//! upload failure recovery, and threaded generation.

use std::collections::HashSet;

use cgmath::{Point2, Point3};

use voxel_world::render::{MeshHandle, MeshVertex, RenderDevice, SurfaceContext, UploadError};
use voxel_world::world::block::Block;
use voxel_world::world::chunk::ChunkState;
use voxel_world::world::chunk_map::{ChunkMap, WorldConfig};
use voxel_world::world::CHUNK_HEIGHT;

/// A render device that records buffer lifecycle and draw calls, and can be
/// told to refuse the next few allocations.
#[derive(Default)]
struct RecordingDevice {
    next_handle: u64,
    live: HashSet<u64>,
    draws: Vec<u64>,
    fail_next: usize,
}

impl RenderDevice for RecordingDevice {
    fn create_mesh(
        &mut self,
        vertices: &[MeshVertex],
        indices: &[u32],
    ) -> Result<MeshHandle, UploadError> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(UploadError {
                reason: "simulated allocation failure".into(),
            });
        }
        assert!(!vertices.is_empty(), "empty meshes must never be uploaded");
        assert_eq!(indices.len() % 6, 0, "indices must come in quads");
        let handle = self.next_handle;
        self.next_handle += 1;
        self.live.insert(handle);
        Ok(MeshHandle(handle))
    }

    fn destroy_mesh(&mut self, handle: MeshHandle) {
        assert!(self.live.remove(&handle.0), "double free of {handle:?}");
    }

    fn draw_mesh(&mut self, handle: MeshHandle, _surface: &SurfaceContext) {
        assert!(self.live.contains(&handle.0), "draw of a freed mesh");
        self.draws.push(handle.0);
    }
}

fn inline_config(view_distance: i32) -> WorldConfig {
    WorldConfig {
        seed: 7,
        view_distance,
        workers: 0,
    }
}

fn surface() -> SurfaceContext {
    SurfaceContext {
        shader: 1,
        texture: 2,
    }
}

fn counter_sum(map: &ChunkMap) -> usize {
    ChunkState::ALL
        .iter()
        .map(|state| map.chunks_in_state(*state))
        .sum()
}

#[test]
fn steady_state_residency() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut device = RecordingDevice::default();
    let mut map = ChunkMap::new(inline_config(1));

    map.load(&mut device);

    let side = (2 * map.load_distance() + 1) as usize;
    assert_eq!(map.size(), side * side);
    assert_eq!(map.chunks_in_state(ChunkState::Ready), side * side);
    assert_eq!(counter_sum(&map), map.size());
}

#[test]
fn recentering_swaps_exactly_one_ring() {
    let mut device = RecordingDevice::default();
    let mut map = ChunkMap::new(inline_config(1));
    map.load(&mut device);

    let steady = map.size();
    map.set_center(Point2::new(1, 0));
    map.update(&mut device);

    // one column of five chunks fell out of range
    assert_eq!(map.size(), steady - 5);
    assert!(map.get_chunk(Point2::new(-2, 0)).is_none());

    map.load(&mut device);
    assert_eq!(map.size(), steady);
    assert_eq!(counter_sum(&map), map.size());
    assert!(map.get_chunk(Point2::new(3, 0)).is_some());
}

#[test]
fn update_with_stable_center_keeps_residency() {
    let mut device = RecordingDevice::default();
    let mut map = ChunkMap::new(inline_config(1));
    map.load(&mut device);

    let steady = map.size();
    map.set_center(map.center());
    map.update(&mut device);
    assert_eq!(map.size(), steady);
}

#[test]
fn terrain_survives_evict_and_reload() {
    let mut device = RecordingDevice::default();
    let mut map = ChunkMap::new(inline_config(1));
    map.load(&mut device);

    let column: Vec<Block> = (0..CHUNK_HEIGHT)
        .map(|y| map.block_at(Point3::new(-32, y, -32)))
        .collect();
    assert!(column.iter().any(|block| !block.is_air()));

    // walk far enough away that chunk (-2, -2) is evicted, then come back
    map.set_center(Point2::new(2, 2));
    map.update(&mut device);
    assert!(map.get_chunk(Point2::new(-2, -2)).is_none());

    map.set_center(Point2::new(0, 0));
    map.update(&mut device);
    map.load(&mut device);

    let reloaded: Vec<Block> = (0..CHUNK_HEIGHT)
        .map(|y| map.block_at(Point3::new(-32, y, -32)))
        .collect();
    assert_eq!(column, reloaded);
}

#[test]
fn absent_chunks_resolve_to_air() {
    let mut device = RecordingDevice::default();
    let mut map = ChunkMap::new(inline_config(1));
    map.load(&mut device);

    // far outside the load radius
    assert_eq!(map.block_at(Point3::new(10_000, 64, 10_000)), Block::Air);
    // outside the vertical range of a resident chunk
    assert_eq!(map.block_at(Point3::new(0, -1, 0)), Block::Air);
    assert_eq!(map.block_at(Point3::new(0, CHUNK_HEIGHT, 0)), Block::Air);
}

#[test]
fn section_translation() {
    let mut device = RecordingDevice::default();
    let mut map = ChunkMap::new(inline_config(1));
    map.load(&mut device);

    let (chunk, slab) = map.section_at(Point3::new(-1, 17, 16)).unwrap();
    assert_eq!(slab, 1);
    assert_eq!(chunk.get().position(), Point2::new(-1, 1));
    assert_eq!(
        chunk.get().section(slab).position(),
        Point3::new(-1, 1, 1)
    );

    assert!(map.section_at(Point3::new(0, -1, 0)).is_none());
    assert!(map.section_at(Point3::new(0, CHUNK_HEIGHT, 0)).is_none());
}

#[test]
fn render_draws_only_the_view_square() {
    let mut device = RecordingDevice::default();
    // view radius zero: a single drawable chunk inside a 3x3 load buffer
    let mut map = ChunkMap::new(inline_config(0));
    map.load(&mut device);
    assert_eq!(map.size(), 9);

    map.render(&mut device, &surface());

    let drawn: HashSet<u64> = device.draws.iter().copied().collect();
    assert!(!drawn.is_empty());
    // one chunk has at most eight sections worth of meshes
    assert!(drawn.len() <= 8);
    // the load buffer uploaded more meshes than the view square draws
    assert!(device.live.len() > drawn.len());
}

#[test]
fn eviction_releases_gpu_buffers() {
    let mut device = RecordingDevice::default();
    let mut map = ChunkMap::new(inline_config(1));
    map.load(&mut device);

    let live_before = device.live.len();
    map.set_center(Point2::new(10, 10));
    map.update(&mut device);

    assert_eq!(map.size(), 0);
    assert!(device.live.len() < live_before);
    assert!(device.live.is_empty(), "eviction must free every buffer");
}

#[test]
fn failed_uploads_are_retried() {
    let mut device = RecordingDevice {
        fail_next: 3,
        ..RecordingDevice::default()
    };
    let mut map = ChunkMap::new(inline_config(1));

    map.load(&mut device);
    let stuck = map.chunks_in_state(ChunkState::FacesLoaded);
    assert!(stuck > 0, "failed uploads should hold chunks in FacesLoaded");
    assert_eq!(counter_sum(&map), map.size());

    // the device recovered; the next pass finishes the stuck chunks
    map.load(&mut device);
    assert_eq!(map.chunks_in_state(ChunkState::FacesLoaded), 0);
    assert_eq!(map.chunks_in_state(ChunkState::Ready), map.size());
}

#[test]
fn recenter_during_generation_still_evicts_stale_chunks() {
    let mut device = RecordingDevice::default();
    let mut map = ChunkMap::new(WorldConfig {
        seed: 5,
        view_distance: 1,
        workers: 2,
    });

    // dispatch the initial square, then jump far away while those jobs are
    // still in flight; the spared chunks must be evicted once their jobs
    // drain, even though the center never moves again
    map.load(&mut device);
    map.set_center(Point2::new(50, 50));
    map.update(&mut device);

    let side = (2 * map.load_distance() + 1) as usize;
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
    loop {
        map.load(&mut device);
        map.update(&mut device);
        if map.size() == side * side
            && map.chunks_in_state(ChunkState::Ready) == side * side
            && map.get_chunk(Point2::new(0, 0)).is_none()
        {
            break;
        }
        assert!(
            std::time::Instant::now() < deadline,
            "stale chunks were never evicted"
        );
        std::thread::sleep(std::time::Duration::from_millis(2));
    }
    assert_eq!(counter_sum(&map), map.size());
}

#[test]
fn threaded_generation_reaches_steady_state() {
    let mut device = RecordingDevice::default();
    let mut map = ChunkMap::new(WorldConfig {
        seed: 11,
        view_distance: 1,
        workers: 2,
    });

    let side = (2 * map.load_distance() + 1) as usize;
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
    loop {
        map.load(&mut device);
        map.update(&mut device);
        if map.chunks_in_state(ChunkState::Ready) == side * side {
            break;
        }
        assert!(
            std::time::Instant::now() < deadline,
            "generation did not converge"
        );
        std::thread::sleep(std::time::Duration::from_millis(2));
    }

    assert_eq!(map.size(), side * side);
    assert_eq!(counter_sum(&map), map.size());

    // streaming keeps working after the initial fill
    map.set_center(Point2::new(3, -1));
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
    loop {
        map.load(&mut device);
        map.update(&mut device);
        if map.chunks_in_state(ChunkState::Ready) == side * side && map.size() == side * side {
            break;
        }
        assert!(
            std::time::Instant::now() < deadline,
            "re-centering did not converge"
        );
        std::thread::sleep(std::time::Duration::from_millis(2));
    }
    assert!(map.get_chunk(Point2::new(3, -1)).is_some());
}
