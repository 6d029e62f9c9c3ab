//! Frame Synchronization
//!
//! Copies the host's per-frame state (clock, camera, directional lights,
//! ambient light, fog) into the brush-specific uniforms of a
//! [`BrushMaterial`] right before it is drawn.
//!
//! Slots are resolved once per material into a [`FrameSyncBinding`]; a sync
//! is then a handful of indexed writes with no hashing and no allocation.
//! Every write is conditional on the program declaring the uniform.

use glam::{Mat4, Vec3, Vec4};
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use crate::brush::UniformCaps;
use crate::material::BrushMaterial;
use crate::uniforms::{
    U_AMBIENT_LIGHT_COLOR, U_CAMERA_POSITION, U_FOG_COLOR, U_FOG_DENSITY, U_SCENE_LIGHT_0_COLOR,
    U_SCENE_LIGHT_0_MATRIX, U_SCENE_LIGHT_1_COLOR, U_SCENE_LIGHT_1_MATRIX, U_TIME, UniformSet,
    UniformValue,
};

/// A host directional light as FrameSync sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    /// Light-to-world transform; brush shaders derive the direction from it.
    pub world_matrix: Mat4,
}

impl DirectionalLight {
    #[must_use]
    pub fn new(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            world_matrix: Mat4::IDENTITY,
        }
    }

    #[must_use]
    pub fn with_world_matrix(mut self, world_matrix: Mat4) -> Self {
        self.world_matrix = world_matrix;
        self
    }

    /// `color * intensity` with alpha 1.
    #[inline]
    #[must_use]
    pub fn radiance(&self) -> Vec4 {
        (self.color * self.intensity).extend(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Vec3,
    pub density: f32,
}

/// Host globals for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameState<'a> {
    /// Time since the loader was created.
    pub elapsed: Duration,
    pub camera_position: Vec3,
    /// Scene directional lights in host order; only the first two are used.
    pub directional_lights: &'a [DirectionalLight],
    pub ambient_color: Vec3,
    pub fog: Option<Fog>,
}

impl Default for FrameState<'_> {
    fn default() -> Self {
        Self {
            elapsed: Duration::ZERO,
            camera_position: Vec3::ZERO,
            directional_lights: &[],
            ambient_color: Vec3::ZERO,
            fog: None,
        }
    }
}

/// Brush shaders animate with `(t/20, t, 2t, 3t)`, `t` in seconds.
#[inline]
#[must_use]
pub fn time_vector(elapsed: Duration) -> Vec4 {
    let t = elapsed.as_secs_f32();
    Vec4::new(t / 20.0, t, t * 2.0, t * 3.0)
}

/// Resolved uniform slots of one material.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSyncBinding {
    time: Option<usize>,
    camera_position: Option<usize>,
    light_color: [Option<usize>; 2],
    light_matrix: [Option<usize>; 2],
    ambient: Option<usize>,
    fog_color: Option<usize>,
    fog_density: Option<usize>,
}

impl FrameSyncBinding {
    /// Resolves the slots of every host uniform that `caps` enables and
    /// `uniforms` actually holds.
    #[must_use]
    pub fn resolve(caps: UniformCaps, uniforms: &UniformSet) -> Self {
        let slot = |flag: UniformCaps, name: &str| {
            if caps.contains(flag) {
                uniforms.index_of(name)
            } else {
                None
            }
        };

        Self {
            time: slot(UniformCaps::TIME, U_TIME),
            camera_position: slot(UniformCaps::CAMERA_POSITION, U_CAMERA_POSITION),
            light_color: [
                slot(UniformCaps::SCENE_LIGHT_0_COLOR, U_SCENE_LIGHT_0_COLOR),
                slot(UniformCaps::SCENE_LIGHT_1_COLOR, U_SCENE_LIGHT_1_COLOR),
            ],
            light_matrix: [
                slot(UniformCaps::SCENE_LIGHT_0_MATRIX, U_SCENE_LIGHT_0_MATRIX),
                slot(UniformCaps::SCENE_LIGHT_1_MATRIX, U_SCENE_LIGHT_1_MATRIX),
            ],
            ambient: slot(UniformCaps::AMBIENT_LIGHT, U_AMBIENT_LIGHT_COLOR),
            fog_color: slot(UniformCaps::FOG_COLOR, U_FOG_COLOR),
            fog_density: slot(UniformCaps::FOG_DENSITY, U_FOG_DENSITY),
        }
    }

    /// `true` when there is nothing to sync.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn drives_fog_density(&self) -> bool {
        self.fog_density.is_some()
    }

    #[must_use]
    pub fn drives_time(&self) -> bool {
        self.time.is_some()
    }

    /// Writes `frame` into `uniforms` through the resolved slots.
    pub fn apply(&self, uniforms: &mut UniformSet, frame: &FrameState<'_>) {
        if let Some(slot) = self.time {
            uniforms.set(slot, UniformValue::Vec4(time_vector(frame.elapsed)));
        }
        if let Some(slot) = self.camera_position {
            uniforms.set(slot, UniformValue::Vec3(frame.camera_position));
        }

        // A missing light leaves its slots untouched for this frame.
        for (i, light) in frame.directional_lights.iter().take(2).enumerate() {
            if let Some(slot) = self.light_color[i] {
                uniforms.set(slot, UniformValue::Vec4(light.radiance()));
            }
            if let Some(slot) = self.light_matrix[i] {
                uniforms.set(slot, UniformValue::Mat4(light.world_matrix));
            }
        }

        if let Some(slot) = self.ambient {
            uniforms.set(slot, UniformValue::Vec4(frame.ambient_color.extend(1.0)));
        }

        if let Some(fog) = frame.fog {
            if let Some(slot) = self.fog_color {
                uniforms.set(slot, UniformValue::Vec3(fog.color));
            }
            if let Some(slot) = self.fog_density {
                uniforms.set(slot, UniformValue::Float(fog.density));
            }
        }
    }
}

/// Copies host frame state into a material's uniforms.
pub fn sync_material(material: &mut BrushMaterial, frame: &FrameState<'_>) {
    let binding = *material.sync_binding();
    binding.apply(material.uniforms_mut(), frame);
}

/// Wall clock started when the loader is created.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    start: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
