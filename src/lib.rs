#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! # brush-materials
//!
//! Resolves legacy brush material references in imported glTF scenes (Tilt
//! Brush / Open Brush exports) into shader programs, vertex attribute
//! layouts and per-frame uniforms a host renderer can draw with.
//!
//! ## Flow
//!
//! ```text
//! material identifier
//!   -> BrushRegistry::resolve        (GUID / name / prefixed name -> key)
//!   -> MaterialParameterTable::lookup (key -> BrushDefinition)
//!   -> ShaderProgramCache::acquire    (key -> Arc<CompiledProgram>, one load per key)
//!   -> AttributeAdapter::remap        (mesh channels -> a_position, a_color, ...)
//!   -> BrushMaterial                  (assigned to the mesh)
//!   -> sync_material, every frame     (host lights / fog / time -> uniforms)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use brush_materials::prelude::*;
//!
//! let resolver = MaterialResolver::new(AssetReaderVariant::file("."), LoaderConfig::new("brushes"));
//!
//! resolver.pre_pass(&mut document);
//! // ... host builds the scene ...
//! if let Some(tasks) = resolver.post_pass(&document, &mut scene) {
//!     let report = resolver.complete(tasks).await;
//! }
//!
//! // every frame
//! scene.sync_frame(&FrameState { elapsed: resolver.elapsed(), ..frame });
//! ```

pub mod adapter;
pub mod assets;
pub mod brush;
pub mod config;
pub mod document;
pub mod errors;
pub mod frame_sync;
#[cfg(feature = "gltf")]
pub mod importer;
pub mod material;
pub mod program;
pub mod resolver;
pub mod scene;
pub mod uniforms;

pub use adapter::{AttributeAdapter, RemapSummary};
pub use assets::{AssetReader, AssetReaderVariant, FileAssetReader, MemoryAssetReader};
pub use brush::{
    BrushAliases, BrushDefinition, BrushRegistry, CanonicalBrushKey, ChannelSet,
    MaterialParameterTable, RegistryBuilder, RenderState, TextureSlot, UniformCaps,
};
pub use config::LoaderConfig;
pub use document::SceneDocument;
pub use errors::{Error, Result};
pub use frame_sync::{DirectionalLight, Fog, FrameClock, FrameState, FrameSyncBinding, sync_material};
#[cfg(feature = "gltf")]
pub use importer::{BrushGltfImporter, ImportedAsset};
pub use material::{BrushMaterial, MaterialAssignment};
pub use program::{CompiledProgram, DeferredCompiler, ProgramCompiler, ProgramHandle, ShaderProgramCache};
pub use resolver::{ImportReport, MaterialResolver, MeshOutcome, MeshTask, PrePassReport};
pub use scene::{ImportedMesh, ImportedScene, MeshAttributeSet, VertexChannel};
pub use uniforms::{UniformSet, UniformValue};

pub mod prelude {
    pub use crate::assets::{AssetReader, AssetReaderVariant, MemoryAssetReader};
    pub use crate::brush::{BrushRegistry, CanonicalBrushKey, MaterialParameterTable};
    pub use crate::config::LoaderConfig;
    pub use crate::document::SceneDocument;
    pub use crate::frame_sync::{DirectionalLight, Fog, FrameState};
    pub use crate::material::{BrushMaterial, MaterialAssignment};
    pub use crate::resolver::{ImportReport, MaterialResolver};
    pub use crate::scene::{ImportedMesh, ImportedScene};
}
