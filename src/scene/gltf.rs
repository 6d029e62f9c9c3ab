use gltf::mesh::Semantic;
use gltf::accessor::{DataType, Dimensions, Iter};
use wgpu::VertexFormat;

use super::attributes::{MeshAttributeSet, VertexChannel};
use super::mesh::{ImportedMesh, ImportedScene};
use crate::errors::Result;

impl ImportedScene {
    /// Builds the scene from a parsed glTF document and its loaded buffers.
    ///
    /// Standard semantics are stored under host names (`position`, `normal`,
    /// `color`, `uv`, `uv1`); custom `_`-prefixed attributes keep their
    /// lowercase glTF name.
    pub fn from_gltf(document: &gltf::Document, buffers: &[Vec<u8>]) -> Result<Self> {
        let mut scene = ImportedScene::new();

        for mesh in document.meshes() {
            let mesh_name = mesh
                .name()
                .map_or_else(|| format!("mesh_{}", mesh.index()), str::to_string);
            let multiple = mesh.primitives().len() > 1;

            for primitive in mesh.primitives() {
                let name = if multiple {
                    format!("{mesh_name}.{}", primitive.index())
                } else {
                    mesh_name.clone()
                };

                let attributes = read_attributes(&primitive, buffers);
                log::debug!("Imported primitive {name}: {} channels", attributes.len());

                scene.push(
                    ImportedMesh::new(name, primitive.material().index())
                        .with_attributes(attributes),
                );
            }
        }

        Ok(scene)
    }
}

fn read_attributes(primitive: &gltf::Primitive<'_>, buffers: &[Vec<u8>]) -> MeshAttributeSet {
    let get_buffer = |buffer: gltf::Buffer<'_>| buffers.get(buffer.index()).map(Vec::as_slice);
    let reader = primitive.reader(get_buffer);
    let mut attributes = MeshAttributeSet::new();

    if let Some(iter) = reader.read_positions() {
        attributes.insert("position", VertexChannel::from_iter(iter, VertexFormat::Float32x3));
    }
    if let Some(iter) = reader.read_normals() {
        attributes.insert("normal", VertexChannel::from_iter(iter, VertexFormat::Float32x3));
    }
    if let Some(iter) = reader.read_colors(0).map(|r| r.into_rgba_f32()) {
        attributes.insert("color", VertexChannel::from_iter(iter, VertexFormat::Float32x4));
    }
    for (set, name) in [(0, "uv"), (1, "uv1")] {
        if let Some(iter) = reader.read_tex_coords(set).map(|r| r.into_f32()) {
            attributes.insert(name, VertexChannel::from_iter(iter, VertexFormat::Float32x2));
        }
    }

    for (semantic, accessor) in primitive.attributes() {
        let Semantic::Extras(name) = semantic else {
            continue;
        };
        if accessor.data_type() != DataType::F32 {
            log::debug!("Skipping non-float custom attribute _{name}");
            continue;
        }
        let channel = match accessor.dimensions() {
            Dimensions::Scalar => Iter::<f32>::new(accessor, get_buffer)
                .map(|iter| VertexChannel::from_iter(iter, VertexFormat::Float32)),
            Dimensions::Vec2 => Iter::<[f32; 2]>::new(accessor, get_buffer)
                .map(|iter| VertexChannel::from_iter(iter, VertexFormat::Float32x2)),
            Dimensions::Vec3 => Iter::<[f32; 3]>::new(accessor, get_buffer)
                .map(|iter| VertexChannel::from_iter(iter, VertexFormat::Float32x3)),
            Dimensions::Vec4 => Iter::<[f32; 4]>::new(accessor, get_buffer)
                .map(|iter| VertexChannel::from_iter(iter, VertexFormat::Float32x4)),
            _ => None,
        };
        if let Some(channel) = channel {
            let name = format!("_{}", name.trim_start_matches('_')).to_lowercase();
            attributes.insert(name, channel);
        }
    }

    attributes
}
