//! Uniform Values
//!
//! CPU-side uniform storage for brush programs.
//!
//! A [`UniformSet`] is an ordered list of named values. Names are resolved to
//! slot indices once (see [`UniformSet::index_of`]); per-frame writes then go
//! through [`UniformSet::set`] by index without hashing or allocation.
//!
//! The standard lighting/fog uniforms that [`FrameSync`](crate::frame_sync)
//! drives are listed in [`STANDARD_UNIFORMS`], keyed by their capability flag.

use glam::{Mat4, Vec3, Vec4};
use smallvec::SmallVec;
use std::borrow::Cow;

use crate::brush::UniformCaps;

/// A single uniform value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl UniformValue {
    /// GLSL type name used when declaring the uniform.
    #[must_use]
    pub fn glsl_type(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "float",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Mat4(_) => "mat4",
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f32> {
        match self {
            UniformValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            UniformValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_vec4(&self) -> Option<Vec4> {
        match self {
            UniformValue::Vec4(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mat4(&self) -> Option<Mat4> {
        match self {
            UniformValue::Mat4(v) => Some(*v),
            _ => None,
        }
    }
}

// ============================================================================
// Standard lighting / fog uniforms
// ============================================================================

pub const U_TIME: &str = "u_time";
pub const U_CAMERA_POSITION: &str = "u_cameraPosition";
pub const U_SCENE_LIGHT_0_COLOR: &str = "u_SceneLight_0_color";
pub const U_SCENE_LIGHT_1_COLOR: &str = "u_SceneLight_1_color";
pub const U_SCENE_LIGHT_0_MATRIX: &str = "u_SceneLight_0_matrix";
pub const U_SCENE_LIGHT_1_MATRIX: &str = "u_SceneLight_1_matrix";
pub const U_AMBIENT_LIGHT_COLOR: &str = "u_ambient_light_color";
pub const U_FOG_COLOR: &str = "u_fogColor";
pub const U_FOG_DENSITY: &str = "u_fogDensity";

/// Descriptor of a host-driven uniform.
#[derive(Debug, Clone, Copy)]
pub struct StandardUniform {
    pub capability: UniformCaps,
    pub name: &'static str,
    pub default: UniformValue,
}

/// Every uniform FrameSync knows how to drive, in declaration order.
pub const STANDARD_UNIFORMS: [StandardUniform; 9] = [
    StandardUniform { capability: UniformCaps::TIME, name: U_TIME, default: UniformValue::Vec4(Vec4::ZERO) },
    StandardUniform { capability: UniformCaps::CAMERA_POSITION, name: U_CAMERA_POSITION, default: UniformValue::Vec3(Vec3::ZERO) },
    StandardUniform { capability: UniformCaps::SCENE_LIGHT_0_COLOR, name: U_SCENE_LIGHT_0_COLOR, default: UniformValue::Vec4(Vec4::ONE) },
    StandardUniform { capability: UniformCaps::SCENE_LIGHT_1_COLOR, name: U_SCENE_LIGHT_1_COLOR, default: UniformValue::Vec4(Vec4::ZERO) },
    StandardUniform { capability: UniformCaps::SCENE_LIGHT_0_MATRIX, name: U_SCENE_LIGHT_0_MATRIX, default: UniformValue::Mat4(Mat4::IDENTITY) },
    StandardUniform { capability: UniformCaps::SCENE_LIGHT_1_MATRIX, name: U_SCENE_LIGHT_1_MATRIX, default: UniformValue::Mat4(Mat4::IDENTITY) },
    StandardUniform { capability: UniformCaps::AMBIENT_LIGHT, name: U_AMBIENT_LIGHT_COLOR, default: UniformValue::Vec4(Vec4::new(0.2, 0.2, 0.2, 1.0)) },
    StandardUniform { capability: UniformCaps::FOG_COLOR, name: U_FOG_COLOR, default: UniformValue::Vec3(Vec3::ZERO) },
    StandardUniform { capability: UniformCaps::FOG_DENSITY, name: U_FOG_DENSITY, default: UniformValue::Float(0.0) },
];

/// Iterates the standard uniforms enabled by `caps`.
pub fn standard_uniforms(caps: UniformCaps) -> impl Iterator<Item = &'static StandardUniform> {
    STANDARD_UNIFORMS
        .iter()
        .filter(move |u| caps.contains(u.capability))
}

// ============================================================================
// UniformSet
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct UniformEntry {
    pub name: Cow<'static, str>,
    pub value: UniformValue,
}

/// Ordered set of named uniform values with a write version.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformSet {
    entries: SmallVec<[UniformEntry; 16]>,
    version: u64,
}

impl UniformSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a uniform, returning its slot index.
    pub fn insert(&mut self, name: impl Into<Cow<'static, str>>, value: UniformValue) -> usize {
        let name = name.into();
        if let Some(index) = self.index_of(&name) {
            self.entries[index].value = value;
            self.version = self.version.wrapping_add(1);
            return index;
        }
        self.entries.push(UniformEntry { name, value });
        self.version = self.version.wrapping_add(1);
        self.entries.len() - 1
    }

    /// Resolves a uniform name to its slot index.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.value)
    }

    #[inline]
    #[must_use]
    pub fn get_at(&self, index: usize) -> Option<UniformValue> {
        self.entries.get(index).map(|e| e.value)
    }

    /// Writes a value into an already resolved slot. Out-of-range indices are ignored.
    #[inline]
    pub fn set(&mut self, index: usize, value: UniformValue) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.value = value;
            self.version = self.version.wrapping_add(1);
        }
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UniformEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_existing_slot() {
        let mut set = UniformSet::new();
        let a = set.insert("u_Cutoff", UniformValue::Float(0.5));
        let b = set.insert("u_Cutoff", UniformValue::Float(0.1));
        assert_eq!(a, b);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("u_Cutoff"), Some(UniformValue::Float(0.1)));
    }

    #[test]
    fn set_by_index_bumps_version() {
        let mut set = UniformSet::new();
        let slot = set.insert(U_FOG_DENSITY, UniformValue::Float(0.0));
        let before = set.version();
        set.set(slot, UniformValue::Float(0.25));
        assert!(set.version() > before);
        set.set(99, UniformValue::Float(1.0));
        assert_eq!(set.get_at(slot), Some(UniformValue::Float(0.25)));
    }

    #[test]
    fn standard_uniforms_follow_caps() {
        let names: Vec<_> = standard_uniforms(UniformCaps::FOG).map(|u| u.name).collect();
        assert_eq!(names, vec![U_FOG_COLOR, U_FOG_DENSITY]);
    }
}
