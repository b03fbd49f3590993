#![warn(missing_docs)]

//! # Voxel World
//!
//! A chunk streaming and meshing engine for an effectively infinite voxel
//! terrain. The crate procedurally generates block data around a moving
//! viewpoint, converts populated regions into renderable surfaces, and keeps
//! only a bounded working set resident as the viewpoint moves.
//!
//! ## Key Modules
//!
//! * `world` - The spatial container ([`world::chunk_map::ChunkMap`]), the
//!   vertical chunk/section stack it owns, and the background chunk loader
//! * `worldgen` - Coherent noise, biome height/classification rules, and the
//!   per-chunk terrain generator
//! * `render` - The narrow drawable contract consumed from the rendering
//!   collaborator (buffer upload, release, draw)
//! * `core` - Shared-resource primitives used between the loader workers and
//!   the main thread
//!
//! ## Architecture
//!
//! Terrain is fully re-derivable from coordinate plus biome parameters, so
//! nothing is ever persisted: chunks are generated when their coordinate
//! enters the load radius and destroyed outright when it leaves. Block and
//! face generation run on a worker pool; GPU buffer lifecycle stays on the
//! thread that owns the render device.
//!
//! ## Usage
//!
//! ```no_run
//! use voxel_world::world::chunk_map::{ChunkMap, WorldConfig};
//! # struct Device;
//! # impl voxel_world::render::RenderDevice for Device {
//! #     fn create_mesh(&mut self, _: &[voxel_world::render::MeshVertex], _: &[u32])
//! #         -> Result<voxel_world::render::MeshHandle, voxel_world::render::UploadError>
//! #     { Ok(voxel_world::render::MeshHandle(0)) }
//! #     fn destroy_mesh(&mut self, _: voxel_world::render::MeshHandle) {}
//! #     fn draw_mesh(&mut self, _: voxel_world::render::MeshHandle,
//! #         _: &voxel_world::render::SurfaceContext) {}
//! # }
//! # let mut device = Device;
//! # let surface = voxel_world::render::SurfaceContext { shader: 0, texture: 0 };
//! let mut map = ChunkMap::new(WorldConfig::default());
//!
//! // Once per frame, in this order:
//! map.load(&mut device);
//! map.update(&mut device);
//! map.render(&mut device, &surface);
//! ```

pub mod core;
pub mod render;
pub mod world;
pub mod worldgen;
