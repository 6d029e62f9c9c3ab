//! Asset Access
//!
//! Readers for brush shader texts and texture images, plus CPU-side image
//! decoding. Transport (disk, network, archives) belongs to the host; this
//! module only defines the [`AssetReader`] seam and a couple of readers.

pub mod io;
pub mod texture;

pub use io::{AssetReader, AssetReaderVariant, FileAssetReader, MemoryAssetReader, join_asset_path};
pub use texture::{ColorSpace, TextureImage};
