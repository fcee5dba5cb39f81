//! Fixed-point software rasterizer
//!
//! Features:
//! - Deterministic fixed-point math (no floats in the pipeline)
//! - Backface culling and Sutherland-Hodgman frustum clipping
//! - Incremental edge-function fill with a top-left rule
//! - Perspective-correct texture mapping
//! - Z-buffer with a strict less-than test

mod clip;
mod fixed;
mod math;
mod pipeline;
mod render;
mod types;

pub use clip::*;
pub use fixed::*;
pub use math::*;
pub use pipeline::*;
pub use render::*;
pub use types::*;
