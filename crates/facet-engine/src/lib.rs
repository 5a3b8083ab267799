//! Facet engine crate.
//!
//! Immediate-mode batched 2D primitive rendering: a fixed-capacity scratch
//! pool, a begin/draw/flush/end state machine, shape tessellation into
//! triangle lists, and a wgpu backend with an offscreen letterbox target.

pub mod batch;
pub mod coords;
pub mod device;
pub mod error;
pub mod logging;
pub mod render;
