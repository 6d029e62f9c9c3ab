//! Brush Definition Tests
//!
//! Tests for:
//! - Built-in parameter table lookups and placeholder brushes
//! - Render state of mask, additive and hull brushes
//! - Asset path layout and base-path joining
//! - Channel sets and uniform capabilities
//! - LoaderConfig parsing

mod common;

use brush_materials::brush::{
    AlphaMode, BlendMode, BrushDefinition, BrushRegistry, ChannelSet, MaterialParameterTable,
    ShaderStage, Side, TextureSlot, UniformCaps,
};
use brush_materials::uniforms::UniformValue;
use brush_materials::LoaderConfig;

// ============================================================================
// Table Lookups
// ============================================================================

#[test]
fn marker_is_alpha_masked() {
    let marker = common::definition("Marker");
    assert_eq!(marker.render_state.alpha_mode, AlphaMode::Mask(0.067));
    assert_eq!(marker.uniform_default("u_Cutoff"), Some(UniformValue::Float(0.067)));
    assert_eq!(marker.render_state.side, Side::Double);
    assert!(marker.render_state.cull_face().is_none());
    assert!(marker.texture(TextureSlot::Main).is_some());
}

#[test]
fn placeholders_resolve_but_have_no_definition() {
    let registry = BrushRegistry::builtin();
    let table = MaterialParameterTable::builtin();
    for name in ["Comet", "Petal", "Disco", "CelVinyl"] {
        let key = registry.resolve(name).unwrap();
        assert!(table.lookup(key.as_str()).is_none(), "{name}");
    }
}

#[test]
fn unknown_key_is_none() {
    assert!(MaterialParameterTable::builtin().lookup("NoSuchBrush").is_none());
}

#[test]
fn every_defined_brush_is_registered() {
    let registry = BrushRegistry::builtin();
    let table = MaterialParameterTable::builtin();
    assert!(!table.is_empty());
    for key in table.keys() {
        assert_eq!(&registry.resolve(key.as_str()).unwrap(), key);
    }
}

// ============================================================================
// Render State
// ============================================================================

#[test]
fn additive_brushes_are_transparent() {
    let light = common::definition("Light");
    let state = light.render_state;
    assert_eq!(state.blend, BlendMode::Additive);
    assert!(state.transparent);
    assert!(!state.depth_write);
    assert!(state.depth_test);
    assert_eq!(state.alpha_mode, AlphaMode::Blend);

    let blend = state.blend_state().unwrap();
    assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::One);
}

#[test]
fn hulls_cull_back_faces() {
    let hull = common::definition("UnlitHull");
    assert_eq!(hull.render_state.cull_face(), Some(wgpu::Face::Back));
    assert!(hull.render_state.blend_state().is_none());
    assert!(hull.render_state.depth_write);
    assert_eq!(
        hull.render_state.effective_depth_compare(),
        wgpu::CompareFunction::LessEqual
    );
}

#[test]
fn opaque_state_keeps_mask_mode() {
    let state = brush_materials::brush::RenderState::for_blend(
        BlendMode::Opaque,
        Side::Front,
        AlphaMode::Mask(0.3),
    );
    assert_eq!(state.alpha_mode.cutoff(), Some(0.3));
    assert!(!state.transparent);
}

// ============================================================================
// Asset Layout
// ============================================================================

#[test]
fn layout_follows_key_guid_version() {
    let marker = common::definition("Marker");
    let stem = "Marker-429ed64a-4e97-4466-84d3-145a861ef684";
    assert_eq!(marker.vertex_shader, format!("{stem}/{stem}-v10.0-vertex.glsl"));
    assert_eq!(marker.fragment_shader, format!("{stem}/{stem}-v10.0-fragment.glsl"));
    assert_eq!(
        marker.texture(TextureSlot::Main),
        Some(format!("{stem}/{stem}-v10.0-MainTex.png").as_str())
    );
}

#[test]
fn paths_are_rooted_with_one_separator() {
    let table = MaterialParameterTable::builtin();
    for base in ["brushes", "brushes/", "https://cdn.example.com/brushes/"] {
        let root = base.trim_end_matches('/');
        for definition in table.iter() {
            for path in definition.asset_paths(base) {
                assert!(path.starts_with(&format!("{root}/{}-", definition.key)), "{path}");
                let after_scheme = path.trim_start_matches("https://");
                assert!(!after_scheme.contains("//"), "{path}");
            }
        }
    }
}

#[test]
fn texture_path_joins_base() {
    let wet = common::definition("WetPaint");
    let bump = wet.texture_path("assets/", TextureSlot::Bump).unwrap();
    assert!(bump.starts_with("assets/WetPaint-"));
    assert!(bump.ends_with("-BumpMap.png"));
    assert!(wet.texture_path("assets", TextureSlot::AlphaMask).is_none());
    assert!(
        wet.shader_path("", ShaderStage::Vertex)
            .starts_with("WetPaint-")
    );
}

#[test]
fn custom_definition_builder() {
    let definition = BrushDefinition::with_layout("Custom", "0e87b49c-6546-3a34-3a44-8a556d7d6c3e", "v1")
        .with_texture(TextureSlot::Main)
        .with_texture(TextureSlot::Main)
        .with_uniform("u_Gain", UniformValue::Float(1.0))
        .with_uniform("u_Gain", UniformValue::Float(2.0))
        .with_channels(ChannelSet::UV0);

    assert_eq!(definition.textures.len(), 1);
    assert_eq!(definition.uniforms.len(), 1);
    assert_eq!(definition.uniform_default("u_Gain"), Some(UniformValue::Float(2.0)));
    assert!(definition.channels.contains(ChannelSet::REQUIRED | ChannelSet::UV0));
}

// ============================================================================
// Channels and Capabilities
// ============================================================================

#[test]
fn unlit_hull_reads_normals_and_fog() {
    let hull = common::definition("UnlitHull");
    assert!(hull.channels.contains(ChannelSet::POSITION | ChannelSet::NORMAL | ChannelSet::COLOR));
    assert!(hull.declares(UniformCaps::FOG));
    assert!(!hull.declares(UniformCaps::TIME));
}

#[test]
fn every_brush_requires_position_and_color() {
    for definition in MaterialParameterTable::builtin().iter() {
        assert!(definition.channels.contains(ChannelSet::REQUIRED), "{}", definition.key);
    }
}

#[test]
fn lit_brushes_expose_scene_light_uniforms() {
    let matte = common::definition("MatteHull");
    let names: Vec<&str> = matte.uniform_names().collect();
    assert!(names.contains(&"u_SceneLight_0_color"));
    assert!(names.contains(&"u_SceneLight_1_matrix"));
    assert!(names.contains(&"u_ambient_light_color"));
}

#[test]
fn leaves_uses_all_texture_slots() {
    let leaves = common::definition("Leaves");
    for slot in TextureSlot::ALL {
        assert!(leaves.texture(slot).is_some(), "{slot:?}");
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn config_defaults_and_json() {
    let defaults = LoaderConfig::default();
    assert!(defaults.retry_failed_loads);
    assert!(defaults.is_marker("GOOGLE_tilt_brush_material"));

    let config = LoaderConfig::from_json_str(r#"{ "base_path": "assets/brushes", "retry_failed_loads": false }"#)
        .unwrap();
    assert_eq!(config.base_path, "assets/brushes");
    assert!(!config.retry_failed_loads);
    assert_eq!(config.extension_markers, defaults.extension_markers);

    let extended = config.with_extension_marker("EXT_custom").with_extension_marker("EXT_custom");
    assert_eq!(extended.extension_markers.len(), 2);

    assert!(LoaderConfig::from_json_str("not json").is_err());
}
