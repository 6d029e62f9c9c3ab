//! glTF import driver.
//!
//! Wires both resolver hooks around an actual glTF parse:
//!
//! 1. read the `.gltf` / `.glb` bytes through an [`AssetReader`]
//! 2. pre-pass on the raw JSON
//! 3. parse the rewritten JSON with the `gltf` crate and load its buffers
//! 4. build the [`ImportedScene`], then post-pass and wait for every mesh

use base64::{Engine as _, engine::general_purpose};
use std::borrow::Cow;

use crate::assets::{AssetReader, join_asset_path};
use crate::document::SceneDocument;
use crate::errors::{Error, Result};
use crate::resolver::{ImportReport, MaterialResolver, PrePassReport};
use crate::scene::ImportedScene;

/// Everything one import produced.
#[derive(Debug)]
pub struct ImportedAsset {
    /// The document after the pre-pass.
    pub document: SceneDocument,
    pub scene: ImportedScene,
    /// `None` when the document is not a brush document.
    pub pre_pass: Option<PrePassReport>,
    /// `None` when the document is not a brush document.
    pub report: Option<ImportReport>,
}

/// Loads glTF scenes and resolves their brush materials.
pub struct BrushGltfImporter<'a, R: AssetReader, S: AssetReader> {
    resolver: &'a MaterialResolver<R>,
    reader: &'a S,
}

impl<'a, R: AssetReader, S: AssetReader> BrushGltfImporter<'a, R, S> {
    /// `reader` serves the scene files; brush assets come through the
    /// resolver's own reader.
    pub fn new(resolver: &'a MaterialResolver<R>, reader: &'a S) -> Self {
        Self { resolver, reader }
    }

    /// Reads and imports the scene at `uri`. Relative buffer URIs resolve
    /// against the directory of `uri`.
    pub async fn load(&self, uri: &str) -> Result<ImportedAsset> {
        let bytes = self.reader.read_bytes(uri).await?;
        let base = uri.rsplit_once('/').map_or("", |(dir, _)| dir);
        self.load_from_bytes(&bytes, base).await
    }

    /// Imports an in-memory `.gltf` or `.glb`.
    pub async fn load_from_bytes(&self, bytes: &[u8], base_uri: &str) -> Result<ImportedAsset> {
        let (json, blob) = split_container(bytes)?;

        let mut document = SceneDocument::from_slice(&json)?;
        let pre_pass = self.resolver.pre_pass(&mut document);

        let root: gltf::json::Root = serde_json::from_value(document.as_json().clone())?;
        let gltf_document = gltf::Document::from_json_without_validation(root);

        let buffers = self.load_buffers(&gltf_document, blob.as_deref(), base_uri).await?;
        let mut scene = ImportedScene::from_gltf(&gltf_document, &buffers)?;

        let report = self.resolver.import(&document, &mut scene).await;

        Ok(ImportedAsset {
            document,
            scene,
            pre_pass,
            report,
        })
    }

    async fn load_buffers(
        &self,
        document: &gltf::Document,
        blob: Option<&[u8]>,
        base_uri: &str,
    ) -> Result<Vec<Vec<u8>>> {
        let mut buffers = Vec::with_capacity(document.buffers().len());
        for buffer in document.buffers() {
            let mut data = match buffer.source() {
                gltf::buffer::Source::Bin => blob
                    .map(<[u8]>::to_vec)
                    .ok_or_else(|| Error::Gltf(String::from("Missing GLB binary chunk")))?,
                gltf::buffer::Source::Uri(uri) => {
                    if let Some(data) = decode_data_uri(uri) {
                        data?
                    } else {
                        self.reader.read_bytes(&join_asset_path(base_uri, uri)).await?
                    }
                }
            };

            if data.len() < buffer.length() {
                return Err(Error::Gltf(format!(
                    "buffer {} holds {} bytes, expected {}",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                )));
            }
            while data.len() % 4 != 0 {
                data.push(0);
            }
            buffers.push(data);
        }
        Ok(buffers)
    }
}

/// Splits a `.glb` into its JSON and binary chunks; plain JSON passes through.
fn split_container(bytes: &[u8]) -> Result<(Cow<'_, [u8]>, Option<Cow<'_, [u8]>>)> {
    if bytes.starts_with(b"glTF") {
        let glb = gltf::Glb::from_slice(bytes)?;
        Ok((glb.json, glb.bin))
    } else {
        Ok((Cow::Borrowed(bytes), None))
    }
}

/// Decodes a base64 `data:` URI. `None` for any other URI.
fn decode_data_uri(uri: &str) -> Option<Result<Vec<u8>>> {
    let rest = uri.strip_prefix("data:")?;
    let Some((_, payload)) = rest.split_once(";base64,") else {
        return Some(Err(Error::Gltf(String::from("only base64 data URIs are supported"))));
    };
    Some(general_purpose::STANDARD.decode(payload).map_err(Error::from))
}
