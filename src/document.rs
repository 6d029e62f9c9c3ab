//! Raw scene document access.
//!
//! [`SceneDocument`] wraps the glTF JSON before the host parses it, which is
//! what the pre-pass needs: it reads material records and rewrites texture
//! references in place, before any image is loaded.

use serde_json::{Map, Value, json};

use crate::brush::TextureSlot;
use crate::errors::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct SceneDocument {
    root: Value,
}

impl SceneDocument {
    /// Wraps a glTF JSON root. The root must be an object.
    pub fn from_json(root: Value) -> Result<Self> {
        if !root.is_object() {
            return Err(Error::Document(String::from("glTF root is not a JSON object")));
        }
        Ok(Self { root })
    }

    pub fn from_slice(json: &[u8]) -> Result<Self> {
        Self::from_json(serde_json::from_slice(json)?)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.root)?)
    }

    #[inline]
    #[must_use]
    pub fn as_json(&self) -> &Value {
        &self.root
    }

    #[must_use]
    pub fn into_json(self) -> Value {
        self.root
    }

    /// Names listed in `extensionsUsed`.
    pub fn extensions_used(&self) -> impl Iterator<Item = &str> {
        self.array("extensionsUsed")
            .iter()
            .filter_map(Value::as_str)
    }

    /// `true` if any of `markers` is listed in `extensionsUsed`.
    #[must_use]
    pub fn uses_extension<S: AsRef<str>>(&self, markers: &[S]) -> bool {
        self.extensions_used()
            .any(|used| markers.iter().any(|m| m.as_ref() == used))
    }

    #[must_use]
    pub fn material_count(&self) -> usize {
        self.array("materials").len()
    }

    #[must_use]
    pub fn material(&self, index: usize) -> Option<&Value> {
        self.array("materials").get(index)
    }

    /// Candidate brush identifiers of a material: its `name`, then the `guid`
    /// of each marker extension object it carries.
    #[must_use]
    pub fn material_identifiers<S: AsRef<str>>(&self, index: usize, markers: &[S]) -> Vec<String> {
        let Some(material) = self.material(index) else {
            return Vec::new();
        };

        let mut identifiers = Vec::new();
        if let Some(name) = material.get("name").and_then(Value::as_str) {
            identifiers.push(name.to_string());
        }
        for marker in markers {
            if let Some(guid) = material
                .pointer(&format!("/extensions/{}/guid", marker.as_ref()))
                .and_then(Value::as_str)
            {
                identifiers.push(guid.to_string());
            }
        }
        identifiers
    }

    /// Texture index the material currently references for `slot`, if any.
    ///
    /// Only slots with a glTF material counterpart have one: main color is
    /// `pbrMetallicRoughness.baseColorTexture`, bump is `normalTexture`.
    #[must_use]
    pub fn material_texture(&self, material: usize, slot: TextureSlot) -> Option<usize> {
        let pointer = texture_pointer(slot)?;
        self.material(material)?
            .pointer(pointer)
            .and_then(Value::as_u64)
            .and_then(|i| usize::try_from(i).ok())
    }

    #[must_use]
    pub fn texture_image_uri(&self, texture: usize) -> Option<&str> {
        let source = self.array("textures").get(texture)?.get("source")?.as_u64()?;
        self.array("images")
            .get(usize::try_from(source).ok()?)?
            .get("uri")?
            .as_str()
    }

    /// Points the material's existing `slot` reference at an image record
    /// for `uri`, appending image/texture records as needed.
    ///
    /// Existing records are never modified, since other materials may share
    /// them. Returns `false` if the material has no reference for the slot.
    pub fn retarget_material_texture(
        &mut self,
        material: usize,
        slot: TextureSlot,
        uri: &str,
    ) -> Result<bool> {
        let Some(pointer) = texture_pointer(slot) else {
            return Ok(false);
        };
        let Some(current) = self.material_texture(material, slot) else {
            return Ok(false);
        };

        let sampler = self
            .array("textures")
            .get(current)
            .and_then(|t| t.get("sampler"))
            .cloned();

        let image = self.ensure_image(uri)?;
        let texture = self.ensure_texture(image, sampler)?;

        let slot_ref = self
            .root
            .pointer_mut(&format!("/materials/{material}{pointer}"))
            .ok_or_else(|| Error::Document(format!("material {material} lost its texture reference")))?;
        *slot_ref = json!(texture);
        Ok(true)
    }

    fn ensure_image(&mut self, uri: &str) -> Result<usize> {
        let images = self.array_mut("images")?;
        if let Some(index) = images
            .iter()
            .position(|img| img.get("uri").and_then(Value::as_str) == Some(uri))
        {
            return Ok(index);
        }
        images.push(json!({ "uri": uri }));
        Ok(images.len() - 1)
    }

    fn ensure_texture(&mut self, image: usize, sampler: Option<Value>) -> Result<usize> {
        let textures = self.array_mut("textures")?;
        if let Some(index) = textures.iter().position(|tex| {
            tex.get("source").and_then(Value::as_u64) == Some(image as u64)
                && tex.get("sampler") == sampler.as_ref()
        }) {
            return Ok(index);
        }

        let mut texture = Map::new();
        texture.insert(String::from("source"), json!(image));
        if let Some(sampler) = sampler {
            texture.insert(String::from("sampler"), sampler);
        }
        textures.push(Value::Object(texture));
        Ok(textures.len() - 1)
    }

    fn array(&self, key: &str) -> &[Value] {
        self.root
            .get(key)
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice)
    }

    fn array_mut(&mut self, key: &str) -> Result<&mut Vec<Value>> {
        let root = self
            .root
            .as_object_mut()
            .ok_or_else(|| Error::Document(String::from("glTF root is not a JSON object")))?;
        root.entry(key)
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .ok_or_else(|| Error::Document(format!("`{key}` is not an array")))
    }
}

/// JSON pointer (relative to a material) of the texture index for `slot`.
fn texture_pointer(slot: TextureSlot) -> Option<&'static str> {
    match slot {
        TextureSlot::Main => Some("/pbrMetallicRoughness/baseColorTexture/index"),
        TextureSlot::Bump => Some("/normalTexture/index"),
        TextureSlot::AlphaMask => None,
    }
}
