//! Coordinate and geometry types shared by the batch core and renderers.
//!
//! Canonical CPU space:
//! - Logical pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! The batch tessellates in this space; backends convert to NDC with the
//! orthographic projection built at `begin`.

mod affine;
mod color;
mod mat4;
mod rect;
mod vec2;
mod viewport;

pub use affine::Affine;
pub use color::ColorRgba;
pub use mat4::Mat4;
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
