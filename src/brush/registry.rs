//! Brush identifier resolution.
//!
//! Exporters have named brush materials in many ways over the years:
//!
//! - bare GUIDs (`429ed64a-4e97-4466-84d3-145a861ef684`)
//! - historical names, with or without spaces (`Wet Paint`, `WetPaint`)
//! - prefixed names (`brush_Marker`, `ob-WetPaint`, `material_Ink`)
//! - names carrying exporter suffixes (`brush_Marker_g0_b0`)
//! - names with the GUID appended (`Marker-429ed64a-...`)
//!
//! [`BrushRegistry`] folds all of these onto a single [`CanonicalBrushKey`].

use rustc_hash::FxHashMap;
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

use super::CanonicalBrushKey;
use super::table;
use crate::errors::{Error, Result};

/// Naming prefixes stripped before matching (case-insensitive).
const PREFIXES: [&str; 3] = ["brush_", "ob-", "material_"];

/// Canonical textual length of a hyphenated GUID.
const GUID_LEN: usize = 36;

/// Every alias of one logical brush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrushAliases {
    pub key: CanonicalBrushKey,
    pub guids: Vec<String>,
    pub names: Vec<String>,
}

impl BrushAliases {
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self {
            key: CanonicalBrushKey::new(key),
            guids: Vec::new(),
            names: Vec::new(),
        }
    }

    #[must_use]
    pub fn guid(mut self, guid: &str) -> Self {
        self.guids.push(guid.to_string());
        self
    }

    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.names.push(name.to_string());
        self
    }
}

#[derive(Debug, Clone)]
enum AliasTarget {
    Unique(CanonicalBrushKey),
    /// Declared by more than one brush; never resolves on its own.
    Ambiguous,
}

impl AliasTarget {
    fn merge(&mut self, key: &CanonicalBrushKey) {
        if let AliasTarget::Unique(existing) = self
            && existing != key
        {
            *self = AliasTarget::Ambiguous;
        }
    }

    fn key(&self) -> Option<&CanonicalBrushKey> {
        match self {
            AliasTarget::Unique(key) => Some(key),
            AliasTarget::Ambiguous => None,
        }
    }
}

/// Builds a [`BrushRegistry`] from caller-supplied aliases.
///
/// Colliding GUIDs and names are detected here: an alias declared by two
/// different brushes becomes ambiguous.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    brushes: Vec<BrushAliases>,
    fallbacks: Vec<(String, CanonicalBrushKey)>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn brush(mut self, aliases: BrushAliases) -> Self {
        self.brushes.push(aliases);
        self
    }

    /// Adds a substring fallback rule. Rules are tried in insertion order.
    #[must_use]
    pub fn fallback(mut self, pattern: &str, key: &str) -> Self {
        self.fallbacks
            .push((fallback_name(pattern), CanonicalBrushKey::new(key)));
        self
    }

    #[must_use]
    pub fn build(self) -> BrushRegistry {
        let mut names: FxHashMap<String, AliasTarget> = FxHashMap::default();
        let mut guids: FxHashMap<Uuid, AliasTarget> = FxHashMap::default();

        for brush in &self.brushes {
            let own_name = normalize_name(brush.key.as_str());
            for name in std::iter::once(own_name).chain(brush.names.iter().map(|n| normalize_name(n))) {
                names
                    .entry(name)
                    .and_modify(|target| target.merge(&brush.key))
                    .or_insert_with(|| AliasTarget::Unique(brush.key.clone()));
            }

            for guid in &brush.guids {
                let Ok(uuid) = Uuid::parse_str(guid) else {
                    log::warn!("Brush {}: ignoring malformed GUID {guid:?}", brush.key);
                    continue;
                };
                guids
                    .entry(uuid)
                    .and_modify(|target| target.merge(&brush.key))
                    .or_insert_with(|| AliasTarget::Unique(brush.key.clone()));
            }
        }

        let ambiguous = guids
            .values()
            .filter(|t| matches!(t, AliasTarget::Ambiguous))
            .count();
        if ambiguous > 0 {
            log::debug!("Brush registry: {ambiguous} colliding GUID(s) marked ambiguous");
        }

        BrushRegistry {
            brushes: self.brushes,
            names,
            guids,
            fallbacks: self.fallbacks,
        }
    }
}

/// Maps any legacy brush identifier onto its canonical key.
#[derive(Debug)]
pub struct BrushRegistry {
    brushes: Vec<BrushAliases>,
    names: FxHashMap<String, AliasTarget>,
    guids: FxHashMap<Uuid, AliasTarget>,
    fallbacks: Vec<(String, CanonicalBrushKey)>,
}

impl BrushRegistry {
    /// The registry of every built-in brush, built once per process.
    #[must_use]
    pub fn builtin() -> Arc<Self> {
        static BUILTIN: OnceLock<Arc<BrushRegistry>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| {
                let mut builder = RegistryBuilder::new();
                for record in table::BRUSHES {
                    let mut aliases = BrushAliases::new(record.key);
                    aliases.guids.extend(record.guids.iter().map(|g| (*g).to_string()));
                    aliases.names.extend(record.names.iter().map(|n| (*n).to_string()));
                    builder = builder.brush(aliases);
                }
                for (pattern, key) in table::FALLBACK_PATTERNS {
                    builder = builder.fallback(pattern, key);
                }
                let registry = builder.build();
                log::debug!(
                    "Built-in brush registry: {} brushes, {} GUIDs",
                    registry.brushes.len(),
                    registry.guids.len()
                );
                Arc::new(registry)
            })
            .clone()
    }

    /// Resolves an identifier to its canonical key.
    ///
    /// A matching name wins over a GUID. GUIDs shared by several brushes are
    /// ambiguous and only resolve through a name or a fallback rule.
    ///
    /// # Errors
    ///
    /// [`Error::UnresolvedIdentifier`] when nothing matches. Callers treat
    /// this as "skip", not as an import failure.
    pub fn resolve(&self, identifier: &str) -> Result<CanonicalBrushKey> {
        let unresolved = || Error::UnresolvedIdentifier(identifier.to_string());

        let trimmed = strip_prefix(identifier.trim());
        if trimmed.is_empty() {
            return Err(unresolved());
        }

        let (name, guid) = split_guid(trimmed);

        if let Some(key) = name.and_then(|name| self.lookup_name(name)) {
            return Ok(key.clone());
        }

        if let Some(uuid) = guid {
            match self.guids.get(&uuid) {
                Some(AliasTarget::Unique(key)) => return Ok(key.clone()),
                Some(AliasTarget::Ambiguous) => {
                    log::debug!("Brush GUID {uuid} is ambiguous; not resolving by GUID");
                }
                None => {}
            }
        }

        let normalized = fallback_name(trimmed);
        self.fallbacks
            .iter()
            .find(|(pattern, _)| normalized.contains(pattern.as_str()))
            .map(|(_, key)| key.clone())
            .ok_or_else(unresolved)
    }

    /// Resolves the first identifier in `candidates` that matches.
    ///
    /// # Errors
    ///
    /// The error of the last candidate tried, or an empty
    /// [`Error::UnresolvedIdentifier`] when there were none.
    pub fn resolve_any<'a>(
        &self,
        candidates: impl IntoIterator<Item = &'a str>,
    ) -> Result<CanonicalBrushKey> {
        let mut last = None;
        for candidate in candidates {
            match self.resolve(candidate) {
                Ok(key) => return Ok(key),
                Err(err) => last = Some(err),
            }
        }
        Err(last.unwrap_or_else(|| Error::UnresolvedIdentifier(String::new())))
    }

    /// `true` when `guid` is declared by more than one brush.
    #[must_use]
    pub fn is_ambiguous_guid(&self, guid: &str) -> bool {
        Uuid::parse_str(guid)
            .ok()
            .and_then(|uuid| self.guids.get(&uuid))
            .is_some_and(|t| matches!(t, AliasTarget::Ambiguous))
    }

    /// Every registered brush with its aliases.
    #[must_use]
    pub fn brushes(&self) -> &[BrushAliases] {
        &self.brushes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.brushes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brushes.is_empty()
    }

    fn lookup_name(&self, name: &str) -> Option<&CanonicalBrushKey> {
        let full = normalize_name(name);
        if let Some(key) = self.names.get(&full).and_then(AliasTarget::key) {
            return Some(key);
        }
        // Exporter suffixes: `Marker_g0_b0` -> `Marker`.
        let (head, _) = name.split_once('_')?;
        self.names.get(&normalize_name(head)).and_then(AliasTarget::key)
    }
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Substring-match form: also drops `_` and `-`, so `Blocks_Gem` and
/// `Blocks-Gem` meet the `blocksgem` rule.
fn fallback_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn strip_prefix(identifier: &str) -> &str {
    for prefix in PREFIXES {
        if identifier.len() > prefix.len()
            && identifier.is_char_boundary(prefix.len())
            && identifier[..prefix.len()].eq_ignore_ascii_case(prefix)
        {
            return &identifier[prefix.len()..];
        }
    }
    identifier
}

/// Splits an identifier into its name part and an optional GUID.
///
/// Accepts a bare GUID (any form `uuid` parses) or a GUID trailing the name
/// after a `-` or `_` separator.
fn split_guid(identifier: &str) -> (Option<&str>, Option<Uuid>) {
    if let Ok(uuid) = Uuid::parse_str(identifier) {
        return (None, Some(uuid));
    }

    if identifier.len() > GUID_LEN + 1 {
        let split = identifier.len() - GUID_LEN;
        if identifier.is_char_boundary(split)
            && let Ok(uuid) = Uuid::parse_str(&identifier[split..])
        {
            let head = &identifier[..split];
            if let Some(name) = head.strip_suffix(['-', '_']) {
                return (Some(name), Some(uuid));
            }
        }
    }

    (Some(identifier), None)
}
