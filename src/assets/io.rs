use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{Error, Result};

/// Asset reader trait.
///
/// Reads brush shader texts and texture images asynchronously. Every `uri`
/// handed to a reader is already joined with the configured base path.
pub trait AssetReader: Send + Sync + 'static {
    /// Asynchronously reads the raw bytes behind `uri`.
    fn read_bytes(&self, uri: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Joins a base path (directory or URL prefix) and a relative asset path with
/// exactly one `/` between them.
///
/// An empty base yields the relative path unchanged.
#[must_use]
pub fn join_asset_path(base: &str, relative: &str) -> String {
    let base = base.trim_end_matches(['/', '\\']);
    let relative = relative.trim_start_matches(['/', '\\']);
    if base.is_empty() {
        return relative.to_string();
    }
    let mut joined = String::with_capacity(base.len() + relative.len() + 1);
    joined.push_str(base);
    joined.push('/');
    joined.push_str(relative);
    joined
}

/// Local file reader.
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self { root_path }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AssetReader for FileAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let path = self.root_path.join(uri);
        let data = tokio::fs::read(&path).await?;
        Ok(data)
    }
}

/// In-memory reader keyed by uri.
///
/// Useful for hosts that already hold the brush pack in memory (bundled
/// archives, embedded assets) and for tests.
#[derive(Default)]
pub struct MemoryAssetReader {
    files: RwLock<FxHashMap<String, Arc<Vec<u8>>>>,
}

impl MemoryAssetReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.write().insert(uri.into(), Arc::new(bytes.into()));
    }

    pub fn remove(&self, uri: &str) -> bool {
        self.files.write().remove(uri).is_some()
    }

    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.files.read().contains_key(uri)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl AssetReader for MemoryAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let guard = self.files.read();
        guard
            .get(uri)
            .map(|bytes| bytes.as_ref().clone())
            .ok_or_else(|| Error::Io(format!("no such asset: {uri}")))
    }
}

/// The readers a brush loader can be built over.
///
/// `AssetReader` returns `impl Future`, so it is not object safe; hosts that
/// pick a reader at runtime hold this enum instead.
#[derive(Clone)]
pub enum AssetReaderVariant {
    #[cfg(not(target_arch = "wasm32"))]
    File(Arc<FileAssetReader>),
    Memory(Arc<MemoryAssetReader>),
}

impl AssetReaderVariant {
    /// Creates a file reader rooted at `path`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File(Arc::new(FileAssetReader::new(path)))
    }

    #[must_use]
    pub fn memory(reader: Arc<MemoryAssetReader>) -> Self {
        Self::Memory(reader)
    }
}

impl AssetReader for AssetReaderVariant {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            Self::File(r) => r.read_bytes(uri).await,
            Self::Memory(r) => r.read_bytes(uri).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_inserts_single_separator() {
        assert_eq!(join_asset_path("brushes", "a/b.png"), "brushes/a/b.png");
        assert_eq!(join_asset_path("brushes/", "a/b.png"), "brushes/a/b.png");
        assert_eq!(join_asset_path("brushes//", "/a/b.png"), "brushes/a/b.png");
        assert_eq!(
            join_asset_path("https://cdn.example.com/x/", "a.glsl"),
            "https://cdn.example.com/x/a.glsl"
        );
    }

    #[test]
    fn join_with_empty_base_keeps_relative() {
        assert_eq!(join_asset_path("", "/a.png"), "a.png");
    }

    #[test]
    fn variant_reads_through_memory_reader() {
        let memory = Arc::new(MemoryAssetReader::new());
        memory.insert("brushes/a.glsl", b"void main() {}".to_vec());
        let reader = AssetReaderVariant::memory(memory);

        let bytes = pollster::block_on(reader.read_bytes("brushes/a.glsl")).unwrap();
        assert_eq!(bytes, b"void main() {}");
        assert!(pollster::block_on(reader.read_bytes("brushes/b.glsl")).is_err());
    }
}
