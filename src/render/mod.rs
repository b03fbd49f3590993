//! # Render Contract
//!
//! The narrow interface through which the engine talks to the rendering
//! collaborator. The engine never compiles shaders or binds textures; it
//! hands finished vertex/index data to a [`RenderDevice`] and later asks it
//! to draw the resulting mesh against an opaque [`SurfaceContext`].
//!
//! All device calls must happen on the thread that owns the graphics
//! context. Mesh *generation* never touches this module.

use thiserror::Error;

/// A vertex in a section mesh: a world-space position and a texture
/// coordinate, interleaved the way the vertex buffer expects them.
///
/// # Memory Layout
/// Five `f32`s (20 bytes), `#[repr(C)]` so the slice can be uploaded as raw
/// bytes via `bytemuck`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Position in world space.
    pub position: [f32; 3],
    /// UV texture coordinates (normalized 0.0-1.0).
    pub tex_coords: [f32; 2],
}

impl MeshVertex {
    /// Creates a vertex from a world-space position and texture coordinates.
    pub fn new(position: [f32; 3], tex_coords: [f32; 2]) -> Self {
        MeshVertex {
            position,
            tex_coords,
        }
    }
}

/// An opaque identifier for an uploaded vertex/index buffer pair.
///
/// Issued by [`RenderDevice::create_mesh`] and meaningless outside the
/// device that issued it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// The opaque drawing state a caller supplies per frame: which shader
/// program and which texture to draw chunk meshes with.
///
/// The engine never interprets these values; they are forwarded verbatim to
/// [`RenderDevice::draw_mesh`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SurfaceContext {
    /// Shader program handle.
    pub shader: u32,
    /// Texture handle.
    pub texture: u32,
}

/// GPU buffer allocation failed.
///
/// Surfaced per section: the section stays meshed-but-undrawable and the
/// upload is retried on a later load pass. Never aborts the load/unload pass
/// for sibling chunks.
#[derive(Debug, Error)]
#[error("mesh buffer allocation failed: {reason}")]
pub struct UploadError {
    /// Device-supplied description of the failure.
    pub reason: String,
}

/// The buffer/draw operations the rendering collaborator must provide.
pub trait RenderDevice {
    /// Uploads a vertex/index buffer pair and returns a handle to it.
    ///
    /// # Errors
    /// Returns [`UploadError`] if the device cannot allocate the buffers.
    fn create_mesh(
        &mut self,
        vertices: &[MeshVertex],
        indices: &[u32],
    ) -> Result<MeshHandle, UploadError>;

    /// Releases the buffers behind `handle`.
    fn destroy_mesh(&mut self, handle: MeshHandle);

    /// Issues the draw call for `handle` using the given surface state.
    fn draw_mesh(&mut self, handle: MeshHandle, surface: &SurfaceContext);
}
