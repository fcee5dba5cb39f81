//! World module - scene entities, shared assets and input
//!
//! - Flat entity arena with index-based children
//! - Resource table handing out mesh/texture handles
//! - OBJ mesh loading

mod input;
pub mod obj;
mod resources;
mod scene;

pub use input::*;
pub use resources::*;
pub use scene::*;
