use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use xxhash_rust::xxh3::xxh3_128;

use crate::brush::CanonicalBrushKey;
use crate::errors::{Error, Result};

/// Final, prelude-injected sources of one brush program.
#[derive(Debug, Clone, Copy)]
pub struct ProgramSource<'a> {
    pub key: &'a CanonicalBrushKey,
    pub vertex: &'a str,
    pub fragment: &'a str,
}

impl ProgramSource<'_> {
    /// xxh3-128 over both stages.
    #[must_use]
    pub fn source_hash(&self) -> u128 {
        let mut bytes = Vec::with_capacity(self.vertex.len() + self.fragment.len() + 1);
        bytes.extend_from_slice(self.vertex.as_bytes());
        bytes.push(0);
        bytes.extend_from_slice(self.fragment.as_bytes());
        xxh3_128(&bytes)
    }
}

/// Opaque id of a linked program, issued by a [`ProgramCompiler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramHandle(pub u64);

/// Turns brush sources into a program the host can bind.
///
/// The host implements this over its graphics backend. Compilation runs
/// inside the shared load future, so implementations must not block for long.
pub trait ProgramCompiler: Send + Sync + 'static {
    fn compile(&self, source: &ProgramSource<'_>) -> Result<ProgramHandle>;
}

/// Default compiler: validates and deduplicates sources, leaving the actual
/// link to the host at pipeline creation time.
///
/// Identical sources (by xxh3-128) share one handle.
#[derive(Debug, Default)]
pub struct DeferredCompiler {
    programs: Mutex<FxHashMap<u128, ProgramHandle>>,
    next_handle: AtomicU64,
}

impl DeferredCompiler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct programs handed out.
    #[must_use]
    pub fn program_count(&self) -> usize {
        self.programs.lock().len()
    }
}

impl ProgramCompiler for DeferredCompiler {
    fn compile(&self, source: &ProgramSource<'_>) -> Result<ProgramHandle> {
        for (stage, text) in [("vertex", source.vertex), ("fragment", source.fragment)] {
            if text.trim().is_empty() {
                return Err(Error::Compile {
                    key: source.key.to_string(),
                    reason: format!("empty {stage} stage"),
                });
            }
        }

        let hash = source.source_hash();
        let mut programs = self.programs.lock();
        let handle = *programs
            .entry(hash)
            .or_insert_with(|| ProgramHandle(self.next_handle.fetch_add(1, Ordering::Relaxed)));
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_sources_share_a_handle() {
        let compiler = DeferredCompiler::new();
        let key = CanonicalBrushKey::new("Marker");
        let source = ProgramSource { key: &key, vertex: "void main() {}", fragment: "void main() {}" };
        let a = compiler.compile(&source).unwrap();
        let b = compiler.compile(&source).unwrap();
        assert_eq!(a, b);
        assert_eq!(compiler.program_count(), 1);
    }

    #[test]
    fn empty_stage_is_a_compile_error() {
        let compiler = DeferredCompiler::new();
        let key = CanonicalBrushKey::new("Marker");
        let source = ProgramSource { key: &key, vertex: "void main() {}", fragment: "  " };
        assert!(matches!(compiler.compile(&source), Err(Error::Compile { .. })));
    }
}
