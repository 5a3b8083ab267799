use anyhow::Result;

use super::Vertex;
use crate::coords::{Mat4, Viewport};

/// Graphics capability consumed by [`ShapeBatch`](super::ShapeBatch).
///
/// The batch owns one implementation for its whole lifetime and talks to the
/// GPU only through these three calls; it never reaches for an ambient or
/// global device. Submission failures propagate to the caller of
/// `flush`/`end` and are never retried.
pub trait DrawBackend {
    /// Current output size in logical pixels. Queried once per `begin` to
    /// size the orthographic projection.
    fn viewport(&self) -> Viewport;

    /// Prepares flat per-vertex-color shading (no texture, no lighting) with
    /// the given projection. Called exactly once before each non-empty
    /// submission.
    fn apply_shading_state(&mut self, projection: &Mat4) -> Result<()>;

    /// Draws `indices.len() / 3` triangles from the given buffers as one
    /// indexed draw call. Both slices are contiguous prefixes of the batch's
    /// pool and are only valid for the duration of the call.
    fn submit_indexed_triangles(&mut self, vertices: &[Vertex], indices: &[u32]) -> Result<()>;
}
