//! Attribute Adapter Tests
//!
//! Tests for:
//! - Aliasing source channels under program names without copying
//! - Optional channels silently skipped
//! - Required channels (position, color) reported as errors
//! - Source-name precedence (Tilt names, host names, glTF semantics)

mod common;

use brush_materials::adapter::{A_COLOR, A_NORMAL, A_POSITION, A_TEXCOORD0, A_TEXCOORD1, AttributeAdapter};
use brush_materials::brush::ChannelSet;
use brush_materials::errors::Error;
use brush_materials::scene::{MeshAttributeSet, VertexChannel};
use wgpu::VertexFormat;

fn channel3(n: usize) -> VertexChannel {
    VertexChannel::from_slice(&vec![[0.0f32; 3]; n], VertexFormat::Float32x3)
}

fn channel4(n: usize) -> VertexChannel {
    VertexChannel::from_slice(&vec![[1.0f32; 4]; n], VertexFormat::Float32x4)
}

fn channel2(n: usize) -> VertexChannel {
    VertexChannel::from_slice(&vec![[0.5f32; 2]; n], VertexFormat::Float32x2)
}

fn hull_mesh() -> MeshAttributeSet {
    let mut mesh = MeshAttributeSet::new();
    mesh.insert("position", channel3(3));
    mesh.insert("normal", channel3(3));
    mesh.insert("color", channel4(3));
    mesh
}

// ============================================================================
// Aliasing
// ============================================================================

#[test]
fn unlit_hull_exposes_position_normal_color() {
    let mut mesh = hull_mesh();
    let summary = AttributeAdapter::new()
        .remap(&mut mesh, &common::definition("UnlitHull"))
        .unwrap();

    for name in [A_POSITION, A_NORMAL, A_COLOR] {
        assert!(mesh.contains(name), "{name}");
    }
    assert_eq!(summary.aliased, ChannelSet::POSITION | ChannelSet::NORMAL | ChannelSet::COLOR);
    assert!(summary.skipped.is_empty());
}

#[test]
fn aliases_share_source_buffers() {
    let mut mesh = hull_mesh();
    AttributeAdapter::new()
        .remap(&mut mesh, &common::definition("UnlitHull"))
        .unwrap();

    let source = mesh.get("position").unwrap();
    let alias = mesh.get(A_POSITION).unwrap();
    assert!(source.shares_buffer(alias));
    assert_eq!(alias.stride(), 12);
}

#[test]
fn sources_are_never_removed() {
    let mut mesh = hull_mesh();
    let before: Vec<String> = mesh.names().map(str::to_string).collect();
    AttributeAdapter::new()
        .remap(&mut mesh, &common::definition("UnlitHull"))
        .unwrap();
    for name in before {
        assert!(mesh.contains(&name));
    }
    assert_eq!(mesh.len(), 6);
}

#[test]
fn remap_is_idempotent() {
    let mut mesh = hull_mesh();
    let adapter = AttributeAdapter::new();
    let definition = common::definition("UnlitHull");
    let first = adapter.remap(&mut mesh, &definition).unwrap();
    let second = adapter.remap(&mut mesh, &definition).unwrap();
    assert_eq!(first, second);
    assert_eq!(mesh.len(), 6);
}

// ============================================================================
// Optional and Required Channels
// ============================================================================

#[test]
fn absent_optional_channel_is_skipped() {
    let mut mesh = MeshAttributeSet::new();
    mesh.insert("position", channel3(3));
    mesh.insert("color", channel4(3));

    let summary = AttributeAdapter::new()
        .remap(&mut mesh, &common::definition("Marker"))
        .unwrap();

    assert!(summary.skipped.contains(ChannelSet::UV0));
    assert!(!mesh.contains(A_TEXCOORD0));
    assert!(mesh.contains(A_POSITION));
}

#[test]
fn missing_color_is_an_error() {
    let mut mesh = MeshAttributeSet::new();
    mesh.insert("position", channel3(3));
    mesh.insert("normal", channel3(3));

    let result = AttributeAdapter::new().remap(&mut mesh, &common::definition("UnlitHull"));
    assert_eq!(result, Err(Error::MissingChannel { channel: A_COLOR }));
    assert_eq!(mesh.len(), 2, "mesh must be left untouched");
}

#[test]
fn missing_position_is_an_error() {
    let mut mesh = MeshAttributeSet::new();
    mesh.insert("color", channel4(3));
    let result = AttributeAdapter::new().remap(&mut mesh, &common::definition("Marker"));
    assert_eq!(result, Err(Error::MissingChannel { channel: A_POSITION }));
}

// ============================================================================
// Source Names
// ============================================================================

#[test]
fn gltf_semantic_names_are_accepted() {
    let mut mesh = MeshAttributeSet::new();
    mesh.insert("POSITION", channel3(4));
    mesh.insert("COLOR_0", channel4(4));
    mesh.insert("TEXCOORD_0", channel2(4));
    mesh.insert("TEXCOORD_1", channel2(4));

    let summary = AttributeAdapter::new()
        .remap(&mut mesh, &common::definition("Smoke"))
        .unwrap();

    assert!(summary.aliased.contains(ChannelSet::UV0 | ChannelSet::UV1));
    assert!(summary.skipped.contains(ChannelSet::NORMAL));
    assert!(mesh.get(A_TEXCOORD1).unwrap().shares_buffer(mesh.get("TEXCOORD_1").unwrap()));
}

#[test]
fn tilt_texcoords_take_precedence() {
    let mut mesh = MeshAttributeSet::new();
    mesh.insert("position", channel3(3));
    mesh.insert("color", channel4(3));
    mesh.insert("uv", channel2(3));
    mesh.insert("_tb_unity_texcoord_0", channel4(3));

    AttributeAdapter::new()
        .remap(&mut mesh, &common::definition("Marker"))
        .unwrap();

    let uv0 = mesh.get(A_TEXCOORD0).unwrap();
    assert!(uv0.shares_buffer(mesh.get("_tb_unity_texcoord_0").unwrap()));
    assert_eq!(uv0.format, VertexFormat::Float32x4);
}

#[test]
fn vertex_count_comes_from_position() {
    let mesh = hull_mesh();
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(MeshAttributeSet::new().vertex_count(), 0);
}
