//! Error Types
//!
//! This module defines the error type used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`Error`] covers every failure a brush import can hit:
//! - Identifier resolution misses (no alias, no definition)
//! - Asset fetch, decode and program compilation failures
//! - Mesh layouts that lack the channels a brush needs
//! - Malformed scene documents
//!
//! None of these abort an import. The resolver records them per mesh and the
//! mesh keeps its default material.
//!
//! # Cloning
//!
//! A shader program load is shared between every caller waiting on the same
//! brush key, so the error it settles with must be handed to all of them.
//! [`Error`] is therefore `Clone` and carries string payloads instead of
//! boxed sources.

use thiserror::Error;

/// The main error type for brush material resolution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ========================================================================
    // Resolution Errors
    // ========================================================================
    /// No alias or fallback rule matched the identifier.
    #[error("Unresolved brush identifier: {0}")]
    UnresolvedIdentifier(String),

    /// The identifier resolved, but the parameter table has no definition for the key.
    #[error("No brush definition for key: {0}")]
    MissingDefinition(String),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// Fetching or decoding a shader text or texture image failed.
    #[error("Failed to load asset {uri} for brush {key}: {reason}")]
    AssetLoad {
        /// Canonical key of the brush being loaded
        key: String,
        /// Fully joined asset location
        uri: String,
        /// Underlying failure
        reason: String,
    },

    /// The program compiler rejected the sources.
    #[error("Failed to compile program for brush {key}: {reason}")]
    Compile {
        /// Canonical key of the brush being compiled
        key: String,
        /// Compiler diagnostic
        reason: String,
    },

    // ========================================================================
    // Mesh Errors
    // ========================================================================
    /// A mesh is missing a vertex channel the brush cannot do without.
    #[error("Mesh is missing required vertex channel: {channel}")]
    MissingChannel {
        /// Shader-facing name of the missing channel
        channel: &'static str,
    },

    // ========================================================================
    // Document Errors
    // ========================================================================
    /// The scene document is not valid JSON or has an unexpected shape.
    #[error("Scene document error: {0}")]
    Document(String),

    /// glTF parsing or buffer loading error.
    #[error("glTF error: {0}")]
    Gltf(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File or reader I/O error.
    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Returns `true` for failures that happened while fetching or compiling
    /// a program, as opposed to resolution misses.
    #[inline]
    #[must_use]
    pub fn is_asset_failure(&self) -> bool {
        matches!(self, Self::AssetLoad { .. } | Self::Compile { .. } | Self::Io(_))
    }
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Io(format!("image decode: {err}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Document(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::Gltf(format!("base64 buffer: {err}"))
    }
}

impl From<minijinja::Error> for Error {
    fn from(err: minijinja::Error) -> Self {
        Error::Compile {
            key: String::from("<prelude>"),
            reason: err.to_string(),
        }
    }
}

#[cfg(feature = "gltf")]
impl From<gltf::Error> for Error {
    fn from(err: gltf::Error) -> Self {
        Error::Gltf(err.to_string())
    }
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
