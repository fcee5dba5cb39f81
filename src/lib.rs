//! Fixed-point software 3D renderer
//!
//! Turns a scene of positioned meshes and a camera into an ARGB pixel buffer
//! on the CPU, using deterministic fixed-point arithmetic throughout.

pub mod config;
pub mod rasterizer;
pub mod world;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
