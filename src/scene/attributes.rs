use rustc_hash::FxHashMap;
use std::borrow::Cow;
use std::sync::Arc;
use wgpu::VertexFormat;

/// One planar vertex channel.
///
/// The byte buffer is reference counted, so aliasing a channel under another
/// name never copies vertex data.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexChannel {
    pub data: Arc<Vec<u8>>,
    pub format: VertexFormat,
    pub count: u32,
}

impl VertexChannel {
    /// Planar channel from typed vertex data.
    pub fn from_slice<T: bytemuck::Pod>(data: &[T], format: VertexFormat) -> Self {
        Self {
            data: Arc::new(bytemuck::cast_slice(data).to_vec()),
            format,
            count: data.len() as u32,
        }
    }

    pub fn from_iter<T, I>(iter: I, format: VertexFormat) -> Self
    where
        T: bytemuck::Pod,
        I: IntoIterator<Item = T>,
    {
        let data: Vec<T> = iter.into_iter().collect();
        Self::from_slice(&data, format)
    }

    #[inline]
    #[must_use]
    pub fn stride(&self) -> u64 {
        self.format.size()
    }

    /// `true` when both channels view the same buffer.
    #[inline]
    #[must_use]
    pub fn shares_buffer(&self, other: &VertexChannel) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

/// Named vertex channels of one mesh primitive.
#[derive(Debug, Clone, Default)]
pub struct MeshAttributeSet {
    channels: FxHashMap<Cow<'static, str>, VertexChannel>,
}

impl MeshAttributeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<Cow<'static, str>>, channel: VertexChannel) {
        self.channels.insert(name.into(), channel);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&VertexChannel> {
        self.channels.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Exposes `source` under `alias` as well, sharing its buffer.
    ///
    /// Returns `false` (and changes nothing) when `source` is absent.
    pub fn alias(&mut self, source: &str, alias: impl Into<Cow<'static, str>>) -> bool {
        let Some(channel) = self.channels.get(source).cloned() else {
            return false;
        };
        self.channels.insert(alias.into(), channel);
        true
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(AsRef::as_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Vertex count of the `position` channel, or of any channel if none is named so.
    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        self.channels
            .get("position")
            .or_else(|| self.channels.values().next())
            .map_or(0, |c| c.count)
    }
}
