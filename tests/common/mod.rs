//! Shared test fixtures: an in-memory brush pack, a counting reader and
//! helpers to load brush materials without a renderer.

#![allow(dead_code)]

use std::future::Future;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use brush_materials::assets::{AssetReader, MemoryAssetReader};
use brush_materials::brush::{BrushDefinition, MaterialParameterTable, ShaderStage, TextureSlot};
use brush_materials::errors::Result;
use brush_materials::{BrushMaterial, CanonicalBrushKey, LoaderConfig, ShaderProgramCache};

pub const BASE: &str = "brushes";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A `width` x `height` opaque white PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode png");
    bytes
}

/// Minimal shader text that declares none of the host uniforms.
pub fn shader_source(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => "#version 300 es\nin vec4 a_position;\nvoid main() { gl_Position = a_position; }\n",
        ShaderStage::Fragment => "#version 300 es\nprecision mediump float;\nout vec4 color;\nvoid main() { color = vec4(1.0); }\n",
    }
}

/// Inserts every file `definition` needs under `base`. Textures are 4x2 PNGs.
pub fn insert_brush_files(reader: &MemoryAssetReader, base: &str, definition: &BrushDefinition) {
    for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
        reader.insert(definition.shader_path(base, stage), shader_source(stage));
    }
    for slot in TextureSlot::ALL {
        if let Some(path) = definition.texture_path(base, slot) {
            reader.insert(path, png_bytes(4, 2));
        }
    }
}

/// The full built-in brush pack, in memory under [`BASE`].
pub fn brush_pack() -> MemoryAssetReader {
    let reader = MemoryAssetReader::new();
    for definition in MaterialParameterTable::builtin().iter() {
        insert_brush_files(&reader, BASE, definition);
    }
    reader
}

pub fn definition(key: &str) -> Arc<BrushDefinition> {
    MaterialParameterTable::builtin()
        .lookup(key)
        .unwrap_or_else(|| panic!("no built-in definition for {key}"))
}

/// Loads a built-in brush through a fresh cache and wraps it in a material.
pub fn load_material(key: &str) -> BrushMaterial {
    let cache = ShaderProgramCache::new(
        brush_pack(),
        MaterialParameterTable::builtin(),
        &LoaderConfig::new(BASE),
    );
    let program = pollster::block_on(cache.acquire(&CanonicalBrushKey::new(key)))
        .unwrap_or_else(|err| panic!("load {key}: {err}"));
    BrushMaterial::new(program)
}

// ============================================================================
// Counting reader
// ============================================================================

/// Completes after being polled twice, forcing interleaving between tasks.
pub struct YieldOnce(bool);

impl YieldOnce {
    pub fn new() -> Self {
        Self(false)
    }
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Wraps a [`MemoryAssetReader`], counting reads and yielding before each.
pub struct CountingReader {
    pub inner: Arc<MemoryAssetReader>,
    reads: AtomicUsize,
}

impl CountingReader {
    pub fn new(inner: MemoryAssetReader) -> Self {
        Self {
            inner: Arc::new(inner),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl AssetReader for CountingReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        YieldOnce::new().await;
        self.inner.read_bytes(uri).await
    }
}
