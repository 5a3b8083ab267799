//! GPU device acquisition.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - handing out device/queue handles for backend construction
//!
//! It is headless on purpose: window/surface plumbing belongs to the
//! embedding application, not this crate.

mod gpu;

pub use gpu::{Gpu, GpuInit};
