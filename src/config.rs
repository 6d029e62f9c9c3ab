//! Loader Configuration
//!
//! [`LoaderConfig`] collects the few knobs a host sets when it creates a
//! [`MaterialResolver`](crate::resolver::MaterialResolver):
//!
//! ```rust,ignore
//! use brush_materials::LoaderConfig;
//!
//! let config = LoaderConfig::new("https://cdn.example.com/brushes/")
//!     .with_retry_failed_loads(false);
//!
//! // Or from a JSON settings file
//! let config = LoaderConfig::from_json_str(r#"{ "base_path": "assets/brushes" }"#)?;
//! ```

use serde::Deserialize;

use crate::errors::Result;

/// Extension name written by Tilt Brush / Open Brush glTF exporters.
pub const DEFAULT_EXTENSION_MARKER: &str = "GOOGLE_tilt_brush_material";

/// Settings shared by the program cache and both import hooks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Root under which every brush shader and texture file lives.
    ///
    /// May be a directory or a URL prefix; a trailing `/` is optional.
    pub base_path: String,

    /// `extensionsUsed` entries that mark a document as using brush materials.
    pub extension_markers: Vec<String>,

    /// When `true`, a failed program load is evicted once it settles and the
    /// next acquisition retries it. When `false` the failure stays cached for
    /// the lifetime of the cache.
    pub retry_failed_loads: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_path: String::from("brushes"),
            extension_markers: vec![DEFAULT_EXTENSION_MARKER.to_string()],
            retry_failed_loads: true,
        }
    }
}

impl LoaderConfig {
    #[must_use]
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Default::default()
        }
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn with_extension_marker(mut self, marker: impl Into<String>) -> Self {
        let marker = marker.into();
        if !self.extension_markers.contains(&marker) {
            self.extension_markers.push(marker);
        }
        self
    }

    #[must_use]
    pub fn with_retry_failed_loads(mut self, retry: bool) -> Self {
        self.retry_failed_loads = retry;
        self
    }

    /// Returns `true` if `name` is one of the configured extension markers.
    #[inline]
    #[must_use]
    pub fn is_marker(&self, name: &str) -> bool {
        self.extension_markers.iter().any(|m| m == name)
    }
}
