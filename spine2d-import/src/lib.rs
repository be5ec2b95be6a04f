//! Importer for Spine JSON skeletons and `.atlas` files.
//!
//! Produces a bone arena, slot bindings to texture regions and a keyframe timeline baked
//! to a fixed frame rate. Scene creation is left to the host application through
//! [`SceneHost`].

#![forbid(unsafe_code)]

mod animation;
mod atlas;
mod bake;
mod config;
mod diagnostics;
mod error;
mod fs;
mod host;
mod import;
mod json;
mod model;
mod skeleton;

pub use animation::*;
pub use atlas::*;
pub use bake::*;
pub use config::*;
pub use diagnostics::*;
pub use error::*;
pub use fs::*;
pub use host::*;
pub use import::*;
pub use json::SkeletonDocument;
pub use model::*;
pub use skeleton::*;

#[cfg(test)]
mod test_support;



#[cfg(test)]
mod host_tests;
