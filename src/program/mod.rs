//! Brush Programs
//!
//! Fetching, prelude injection, compilation and caching of brush shader
//! programs:
//!
//! - [`ShaderProgramCache`]: at most one load per canonical key
//! - [`ProgramCompiler`]: host seam that turns sources into a [`ProgramHandle`]
//! - [`prelude`]: declarations of the host-driven uniforms a brush needs

pub mod cache;
pub mod compiled;
pub mod compiler;
pub mod prelude;

pub use cache::{ProgramFuture, ShaderProgramCache};
pub use compiled::{BoundTexture, CompiledProgram};
pub use compiler::{DeferredCompiler, ProgramCompiler, ProgramHandle, ProgramSource};
