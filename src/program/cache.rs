//! Shader Program Cache
//!
//! One compiled program per canonical brush key, loaded lazily and shared.
//!
//! # Coalescing
//!
//! The first [`acquire`](ShaderProgramCache::acquire) of a key inserts a
//! [`Shared`] load future into the entry map under the lock. Every later
//! caller, whether the load is still in flight or already settled, clones
//! that same future, so each key is fetched and compiled at most once.
//!
//! # Failure
//!
//! A failed load settles with the same [`Error`] for every waiter. With
//! `retry_failed_loads` the entry then removes itself (only if it is still
//! the entry it inserted), so the next `acquire` starts a fresh load.
//! Otherwise the failure stays cached.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared, try_join, try_join_all};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use super::compiled::{BoundTexture, CompiledProgram};
use super::compiler::{DeferredCompiler, ProgramCompiler, ProgramSource};
use super::prelude::{inject_prelude, render_prelude};
use crate::assets::{AssetReader, AssetReaderVariant, TextureImage};
use crate::brush::{BrushDefinition, CanonicalBrushKey, MaterialParameterTable, ShaderStage, TextureSlot};
use crate::config::LoaderConfig;
use crate::errors::{Error, Result};
use crate::uniforms::{UniformSet, UniformValue, standard_uniforms};

/// Awaitable, cloneable handle on a program load.
pub type ProgramFuture = Shared<BoxFuture<'static, Result<Arc<CompiledProgram>>>>;

type EntryMap = Mutex<FxHashMap<CanonicalBrushKey, CacheEntry>>;

struct CacheEntry {
    generation: u64,
    future: ProgramFuture,
}

/// Loads, compiles and memoizes brush programs.
pub struct ShaderProgramCache<R: AssetReader = AssetReaderVariant> {
    reader: Arc<R>,
    compiler: Arc<dyn ProgramCompiler>,
    table: Arc<MaterialParameterTable>,
    base_path: Arc<str>,
    retry_failed_loads: bool,
    entries: Arc<EntryMap>,
    next_generation: AtomicU64,
}

impl<R: AssetReader> ShaderProgramCache<R> {
    /// Creates a cache over `reader` using the [`DeferredCompiler`].
    pub fn new(reader: R, table: Arc<MaterialParameterTable>, config: &LoaderConfig) -> Self {
        Self {
            reader: Arc::new(reader),
            compiler: Arc::new(DeferredCompiler::new()),
            table,
            base_path: Arc::from(config.base_path.as_str()),
            retry_failed_loads: config.retry_failed_loads,
            entries: Arc::new(Mutex::new(FxHashMap::default())),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Replaces the program compiler. Already cached programs are kept.
    #[must_use]
    pub fn with_compiler(mut self, compiler: Arc<dyn ProgramCompiler>) -> Self {
        self.compiler = compiler;
        self
    }

    /// Returns the program for `key`, loading it on first use.
    ///
    /// Concurrent calls for an uncached key share one in-flight load and all
    /// resolve to the same `Arc`. A key with no definition settles immediately
    /// with [`Error::MissingDefinition`] and is not cached.
    pub fn acquire(&self, key: &CanonicalBrushKey) -> ProgramFuture {
        let mut entries = self.entries.lock();

        if let Some(entry) = entries.get(key) {
            log::debug!("Program cache hit: {key}");
            return entry.future.clone();
        }

        let Some(definition) = self.table.lookup(key.as_str()) else {
            return futures::future::ready(Err(Error::MissingDefinition(key.to_string())))
                .boxed()
                .shared();
        };

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let future = self.spawn_load(definition, generation);
        entries.insert(
            key.clone(),
            CacheEntry {
                generation,
                future: future.clone(),
            },
        );
        log::debug!("Program cache miss: {key} (load #{generation})");
        future
    }

    fn spawn_load(&self, definition: Arc<BrushDefinition>, generation: u64) -> ProgramFuture {
        let reader = Arc::clone(&self.reader);
        let compiler = Arc::clone(&self.compiler);
        let base_path = Arc::clone(&self.base_path);
        let entries: Weak<EntryMap> = Arc::downgrade(&self.entries);
        let retry = self.retry_failed_loads;

        async move {
            let key = definition.key.clone();
            let result = load_program(&*reader, &*compiler, definition, &base_path).await;

            match &result {
                Ok(_) => log::debug!("Program ready: {key}"),
                Err(err) => {
                    log::warn!("Program load failed for {key}: {err}");
                    if retry && let Some(entries) = entries.upgrade() {
                        let mut entries = entries.lock();
                        if entries.get(&key).is_some_and(|e| e.generation == generation) {
                            entries.remove(&key);
                        }
                    }
                }
            }

            result
        }
        .boxed()
        .shared()
    }

    /// Drops the cached entry for `key`. Callers already holding the future
    /// keep it; the next `acquire` loads again.
    pub fn evict(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// `true` once the program for `key` has loaded successfully.
    #[must_use]
    pub fn is_ready(&self, key: &str) -> bool {
        self.entries
            .lock()
            .get(key)
            .and_then(|e| e.future.peek())
            .is_some_and(Result::is_ok)
    }

    /// Number of cached or in-flight entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    #[inline]
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    #[inline]
    #[must_use]
    pub fn table(&self) -> &Arc<MaterialParameterTable> {
        &self.table
    }

    #[inline]
    #[must_use]
    pub fn reader(&self) -> &R {
        &self.reader
    }
}

// ============================================================================
// Load pipeline
// ============================================================================

async fn load_program<R: AssetReader>(
    reader: &R,
    compiler: &dyn ProgramCompiler,
    definition: Arc<BrushDefinition>,
    base_path: &str,
) -> Result<Arc<CompiledProgram>> {
    let key = definition.key.as_str();

    let vertex_uri = definition.shader_path(base_path, ShaderStage::Vertex);
    let fragment_uri = definition.shader_path(base_path, ShaderStage::Fragment);

    let (vertex, fragment) = try_join(
        read_text(reader, key, &vertex_uri),
        read_text(reader, key, &fragment_uri),
    )
    .await?;

    let textures = try_join_all(definition.textures.iter().map(|(slot, _)| {
        let slot = *slot;
        let uri = definition.texture_path(base_path, slot).unwrap_or_default();
        async move {
            let image = read_texture(reader, key, slot, &uri).await?;
            Ok::<_, Error>(BoundTexture { slot, image })
        }
    }))
    .await?;

    let caps = definition.capabilities;
    let vertex_source = inject_prelude(&vertex, &render_prelude(caps, &vertex)?);
    let fragment_source = inject_prelude(&fragment, &render_prelude(caps, &fragment)?);

    let handle = compiler
        .compile(&ProgramSource {
            key: &definition.key,
            vertex: &vertex_source,
            fragment: &fragment_source,
        })
        .map_err(|err| match err {
            err @ Error::Compile { .. } => err,
            other => Error::Compile {
                key: key.to_string(),
                reason: other.to_string(),
            },
        })?;

    let default_uniforms = default_uniforms(&definition, &textures);

    Ok(Arc::new(CompiledProgram {
        handle,
        definition,
        vertex_source,
        fragment_source,
        textures,
        default_uniforms,
    }))
}

async fn read_text<R: AssetReader>(reader: &R, key: &str, uri: &str) -> Result<String> {
    let bytes = reader
        .read_bytes(uri)
        .await
        .map_err(|err| asset_error(key, uri, &err))?;
    String::from_utf8(bytes).map_err(|err| Error::AssetLoad {
        key: key.to_string(),
        uri: uri.to_string(),
        reason: format!("shader is not UTF-8: {err}"),
    })
}

async fn read_texture<R: AssetReader>(
    reader: &R,
    key: &str,
    slot: TextureSlot,
    uri: &str,
) -> Result<TextureImage> {
    let bytes = reader
        .read_bytes(uri)
        .await
        .map_err(|err| asset_error(key, uri, &err))?;
    TextureImage::decode(&bytes, slot.color_space(), uri).map_err(|err| asset_error(key, uri, &err))
}

fn asset_error(key: &str, uri: &str, err: &Error) -> Error {
    Error::AssetLoad {
        key: key.to_string(),
        uri: uri.to_string(),
        reason: err.to_string(),
    }
}

/// Definition defaults, then host uniforms the program drives, then texel
/// sizes of the decoded textures where the definition declares them.
fn default_uniforms(definition: &BrushDefinition, textures: &[BoundTexture]) -> UniformSet {
    let mut uniforms = UniformSet::new();
    for (name, value) in &definition.uniforms {
        uniforms.insert(name.clone(), *value);
    }
    for standard in standard_uniforms(definition.capabilities) {
        if !uniforms.contains(standard.name) {
            uniforms.insert(standard.name, standard.default);
        }
    }
    for texture in textures {
        let name = texture.slot.texel_size_uniform();
        if let Some(index) = uniforms.index_of(name) {
            uniforms.set(index, UniformValue::Vec4(texture.image.texel_size()));
        }
    }
    uniforms
}
