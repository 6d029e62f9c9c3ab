//! Imported Scene
//!
//! The host scene graph the resolver post-processes: mesh primitives with
//! named vertex channels and a material slot each.

pub mod attributes;
#[cfg(feature = "gltf")]
mod gltf;
pub mod mesh;

pub use attributes::{MeshAttributeSet, VertexChannel};
pub use mesh::{ImportedMesh, ImportedScene};
