//! wgpu rendering subsystem.
//!
//! [`GpuBackend`] is the concrete [`DrawBackend`](crate::batch::DrawBackend):
//! it owns the flat-color pipeline and upload buffers and encodes one render
//! pass per submission. [`Screen`] is the offscreen fixed-resolution target
//! with aspect-preserving presentation.
//!
//! Convention (inherited from the batch core):
//! - CPU geometry is in logical pixels, top-left origin, +Y down
//! - the vertex shader converts to NDC with the projection uniform

mod gpu;
mod screen;

pub use gpu::GpuBackend;
pub use screen::{MAX_SCREEN_DIM, MIN_SCREEN_DIM, Screen};
