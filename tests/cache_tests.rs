//! Shader Program Cache Tests
//!
//! Tests for:
//! - At-most-one load per key under concurrent acquisition
//! - Cache hits after the first load
//! - Failure propagation to every waiter, retry vs. poisoned entries
//! - Prelude injection and texel-size uniforms
//! - Custom program compilers

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;

use brush_materials::brush::{MaterialParameterTable, ShaderStage, TextureSlot};
use brush_materials::errors::{Error, Result};
use brush_materials::program::{ProgramCompiler, ProgramHandle, ProgramSource, ShaderProgramCache};
use brush_materials::uniforms::UniformValue;
use brush_materials::{CanonicalBrushKey, LoaderConfig, MemoryAssetReader};
use common::{BASE, CountingReader};

fn counting_cache(config: &LoaderConfig) -> ShaderProgramCache<CountingReader> {
    ShaderProgramCache::new(
        CountingReader::new(common::brush_pack()),
        MaterialParameterTable::builtin(),
        config,
    )
}

/// Number of files one load of `key` reads.
fn files_per_load(key: &str) -> usize {
    common::definition(key).asset_paths(BASE).len()
}

// ============================================================================
// Coalescing
// ============================================================================

#[test]
fn concurrent_acquires_share_one_load() {
    common::init_logger();
    let cache = counting_cache(&LoaderConfig::new(BASE));
    let key = CanonicalBrushKey::new("Marker");

    let pending: Vec<_> = (0..8).map(|_| cache.acquire(&key)).collect();
    assert_eq!(cache.len(), 1);
    assert!(!cache.is_ready("Marker"));

    let programs: Vec<_> = pollster::block_on(join_all(pending))
        .into_iter()
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(programs.len(), 8);
    for program in &programs[1..] {
        assert!(Arc::ptr_eq(&programs[0], program));
    }
    assert_eq!(cache.reader().reads(), files_per_load("Marker"));
    assert!(cache.is_ready("Marker"));
}

#[test]
fn cached_program_is_not_refetched() {
    let cache = counting_cache(&LoaderConfig::new(BASE));
    let key = CanonicalBrushKey::new("UnlitHull");

    let first = pollster::block_on(cache.acquire(&key)).unwrap();
    let reads = cache.reader().reads();
    let second = pollster::block_on(cache.acquire(&key)).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.reader().reads(), reads);
}

#[test]
fn different_keys_load_independently() {
    let cache = counting_cache(&LoaderConfig::new(BASE));
    let marker = cache.acquire(&CanonicalBrushKey::new("Marker"));
    let hull = cache.acquire(&CanonicalBrushKey::new("UnlitHull"));

    let (marker, hull) = pollster::block_on(futures::future::join(marker, hull));
    let (marker, hull) = (marker.unwrap(), hull.unwrap());

    assert!(!Arc::ptr_eq(&marker, &hull));
    assert_eq!(marker.key(), &"Marker");
    assert_eq!(hull.key(), &"UnlitHull");
    assert_eq!(
        cache.reader().reads(),
        files_per_load("Marker") + files_per_load("UnlitHull")
    );
}

// ============================================================================
// Failures
// ============================================================================

fn remove_fragment(reader: &MemoryAssetReader, key: &str) -> String {
    let path = common::definition(key).shader_path(BASE, ShaderStage::Fragment);
    assert!(reader.remove(&path));
    path
}

#[test]
fn failure_reaches_every_waiter_then_retries() {
    common::init_logger();
    let cache = counting_cache(&LoaderConfig::new(BASE));
    let path = remove_fragment(&cache.reader().inner, "Marker");
    let key = CanonicalBrushKey::new("Marker");

    let results = pollster::block_on(join_all((0..4).map(|_| cache.acquire(&key))));
    for result in &results {
        match result {
            Err(Error::AssetLoad { key, uri, .. }) => {
                assert_eq!(key, "Marker");
                assert_eq!(uri, &path);
            }
            other => panic!("expected asset failure, got {other:?}"),
        }
    }
    let errors: Vec<&Error> = results.iter().filter_map(|r| r.as_ref().err()).collect();
    assert!(errors.windows(2).all(|w| w[0] == w[1]));

    // Evicted once settled; the next acquire loads again.
    assert_eq!(cache.len(), 0);
    common::insert_brush_files(&cache.reader().inner, BASE, &common::definition("Marker"));
    assert!(pollster::block_on(cache.acquire(&key)).is_ok());
}

#[test]
fn failure_is_cached_without_retry() {
    let cache = counting_cache(&LoaderConfig::new(BASE).with_retry_failed_loads(false));
    remove_fragment(&cache.reader().inner, "Marker");
    let key = CanonicalBrushKey::new("Marker");

    assert!(pollster::block_on(cache.acquire(&key)).is_err());
    let reads = cache.reader().reads();

    common::insert_brush_files(&cache.reader().inner, BASE, &common::definition("Marker"));
    assert!(pollster::block_on(cache.acquire(&key)).is_err());
    assert_eq!(cache.reader().reads(), reads);
    assert_eq!(cache.len(), 1);

    // Explicit eviction clears the poisoned entry.
    assert!(cache.evict("Marker"));
    assert!(pollster::block_on(cache.acquire(&key)).is_ok());
}

#[test]
fn undecodable_texture_fails_the_load() {
    let cache = counting_cache(&LoaderConfig::new(BASE));
    let definition = common::definition("Marker");
    let texture = definition.texture_path(BASE, TextureSlot::Main).unwrap();
    cache.reader().inner.insert(texture.clone(), b"not a png".to_vec());

    let result = pollster::block_on(cache.acquire(&definition.key));
    assert!(matches!(result, Err(Error::AssetLoad { uri, .. }) if uri == texture));
}

#[test]
fn missing_definition_is_not_cached() {
    let cache = counting_cache(&LoaderConfig::new(BASE));
    let result = pollster::block_on(cache.acquire(&CanonicalBrushKey::new("Comet")));
    assert!(matches!(result, Err(Error::MissingDefinition(key)) if key == "Comet"));
    assert!(cache.is_empty());
    assert_eq!(cache.reader().reads(), 0);
}

#[test]
fn clear_drops_everything() {
    let cache = counting_cache(&LoaderConfig::new(BASE));
    pollster::block_on(cache.acquire(&CanonicalBrushKey::new("Marker"))).unwrap();
    assert_eq!(cache.len(), 1);
    cache.clear();
    assert!(cache.is_empty());
    assert!(!cache.is_ready("Marker"));
}

// ============================================================================
// Program Contents
// ============================================================================

#[test]
fn prelude_declares_host_uniforms() {
    let material = common::load_material("UnlitHull");
    let program = material.program();

    for source in [&program.vertex_source, &program.fragment_source] {
        assert!(source.starts_with("#version 300 es\n"));
        assert!(source.contains("uniform vec3 u_fogColor;"));
        assert!(source.contains("uniform float u_fogDensity;"));
        assert!(!source.contains("u_time"));
    }
    assert!(program.declares("u_fogDensity"));
    assert!(!program.declares("u_time"));
}

#[test]
fn fragment_prelude_follows_precision() {
    let material = common::load_material("UnlitHull");
    let source = &material.program().fragment_source;

    let precision_at = source.find("precision mediump float;").unwrap();
    let fog_color_at = source.find("uniform vec3 u_fogColor;").unwrap();
    let fog_density_at = source.find("uniform float u_fogDensity;").unwrap();
    let body_at = source.find("out vec4 color;").unwrap();

    assert!(precision_at < fog_color_at);
    assert!(precision_at < fog_density_at);
    assert!(fog_density_at < body_at);
}

#[test]
fn texel_size_follows_decoded_image() {
    let material = common::load_material("Marker");
    let program = material.program();

    let main = program.texture(TextureSlot::Main).unwrap();
    assert_eq!((main.width, main.height), (4, 2));
    assert_eq!(main.format, wgpu::TextureFormat::Rgba8UnormSrgb);
    assert_eq!(
        program.default_uniforms.get("u_MainTex_TexelSize"),
        Some(UniformValue::Vec4(glam::Vec4::new(0.25, 0.5, 4.0, 2.0)))
    );
}

#[test]
fn bump_maps_decode_linear() {
    let material = common::load_material("WetPaint");
    let bump = material.texture(TextureSlot::Bump).unwrap();
    assert_eq!(bump.format, wgpu::TextureFormat::Rgba8Unorm);
}

struct RejectingCompiler {
    calls: AtomicUsize,
}

impl ProgramCompiler for RejectingCompiler {
    fn compile(&self, source: &ProgramSource<'_>) -> Result<ProgramHandle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::Compile {
            key: source.key.to_string(),
            reason: String::from("rejected"),
        })
    }
}

#[test]
fn compiler_errors_propagate() {
    let compiler = Arc::new(RejectingCompiler {
        calls: AtomicUsize::new(0),
    });
    let cache = counting_cache(&LoaderConfig::new(BASE)).with_compiler(compiler.clone());
    let key = CanonicalBrushKey::new("Marker");

    let results = pollster::block_on(join_all((0..3).map(|_| cache.acquire(&key))));
    assert!(results.iter().all(|r| matches!(r, Err(Error::Compile { reason, .. }) if reason == "rejected")));
    assert_eq!(compiler.calls.load(Ordering::SeqCst), 1);
}
