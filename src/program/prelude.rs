//! Host uniform prelude.
//!
//! Brush shaders are authored against the host's standard lighting and fog
//! uniforms but do not always declare them. The prelude template declares
//! the ones a brush's capability flags call for and the source does not
//! already declare, so FrameSync always has a slot to write into.

use minijinja::{Environment, context, syntax::SyntaxConfig};
use serde::Serialize;
use std::sync::OnceLock;

use crate::brush::UniformCaps;
use crate::errors::Result;
use crate::uniforms::standard_uniforms;

static PRELUDE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

const PRELUDE_TEMPLATE: &str = r"{$ if uniforms $}
// ---- host uniforms ----
{$ for u in uniforms $}
uniform {{ u.ty }} {{ u.name }};
{$ endfor $}
// -----------------------
{$ endif $}
";

fn get_env() -> &'static Environment<'static> {
    PRELUDE_ENV.get_or_init(|| {
        let mut env = Environment::new();

        let syntax = SyntaxConfig::builder()
            .block_delimiters("{$", "$}")
            .variable_delimiters("{{", "}}")
            .build()
            .expect("Failed to configure Jinja2 syntax");

        env.set_syntax(syntax);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_undefined_behavior(minijinja::UndefinedBehavior::SemiStrict);
        env.add_template("prelude", PRELUDE_TEMPLATE)
            .expect("Failed to register prelude template");

        env
    })
}

#[derive(Serialize)]
struct UniformDecl {
    ty: &'static str,
    name: &'static str,
}

/// Renders the declarations `caps` requires that `source` lacks.
///
/// Returns an empty string when nothing is missing.
pub fn render_prelude(caps: UniformCaps, source: &str) -> Result<String> {
    let uniforms: Vec<UniformDecl> = standard_uniforms(caps)
        .filter(|u| !declares_uniform(source, u.name))
        .map(|u| UniformDecl {
            ty: u.default.glsl_type(),
            name: u.name,
        })
        .collect();

    if uniforms.is_empty() {
        return Ok(String::new());
    }

    let template = get_env().get_template("prelude")?;
    Ok(template.render(context! { uniforms => uniforms })?)
}

/// Inserts `prelude` after the leading `#version`, `#extension` and
/// `precision` lines, or at the top when the source has none.
///
/// GLSL ES fragment shaders have no default float precision, so host
/// uniforms must follow the source's own `precision` statement.
#[must_use]
pub fn inject_prelude(source: &str, prelude: &str) -> String {
    if prelude.is_empty() {
        return source.to_string();
    }

    let header_end = header_len(source);
    let (head, tail) = source.split_at(header_end);

    let mut out = String::with_capacity(source.len() + prelude.len() + 1);
    out.push_str(head);
    if !head.is_empty() && !head.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(prelude);
    out.push_str(tail);
    out
}

/// Byte length of the leading directive block, through the end of its last
/// directive line. Blank lines inside the block are kept with it.
fn header_len(source: &str) -> usize {
    let mut offset = 0;
    let mut end = 0;
    for line in source.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.starts_with("#version")
            || trimmed.starts_with("#extension")
            || trimmed.starts_with("precision ")
        {
            end = offset + line.len();
        } else if !trimmed.is_empty() {
            break;
        }
        offset += line.len();
    }
    end
}

/// `true` if any `uniform ... <name>;` line in `source` declares `name`.
#[must_use]
pub fn declares_uniform(source: &str, name: &str) -> bool {
    source.lines().any(|line| {
        let line = line.trim_start();
        line.starts_with("uniform ")
            && line
                .split(|c: char| c.is_whitespace() || c == ';' || c == '[')
                .skip(1)
                .any(|token| token == name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::{U_FOG_COLOR, U_FOG_DENSITY};

    #[test]
    fn prelude_declares_only_missing_uniforms() {
        let source = "#version 300 es\nuniform vec3 u_fogColor;\nvoid main() {}\n";
        let prelude = render_prelude(UniformCaps::FOG, source).unwrap();
        assert!(prelude.contains("uniform float u_fogDensity;"));
        assert!(!prelude.contains(U_FOG_COLOR));
    }

    #[test]
    fn nothing_missing_renders_nothing() {
        let source = "uniform vec3 u_fogColor;\nuniform float u_fogDensity;\n";
        assert!(render_prelude(UniformCaps::FOG, source).unwrap().is_empty());
    }

    #[test]
    fn injects_after_version_line() {
        let source = "#version 300 es\nvoid main() {}\n";
        let out = inject_prelude(source, "uniform float u_fogDensity;\n");
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("#version 300 es"));
        assert_eq!(lines.next(), Some("uniform float u_fogDensity;"));
        assert_eq!(lines.next(), Some("void main() {}"));
        assert!(declares_uniform(&out, U_FOG_DENSITY));
    }

    #[test]
    fn injects_after_precision_and_extensions() {
        let source = "#version 300 es\n#extension GL_OES_standard_derivatives : enable\n\nprecision mediump float;\nout vec4 color;\n";
        let out = inject_prelude(source, "uniform float u_fogDensity;\n");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[3], "precision mediump float;");
        assert_eq!(lines[4], "uniform float u_fogDensity;");
        assert_eq!(lines[5], "out vec4 color;");
    }

    #[test]
    fn version_without_trailing_newline() {
        let out = inject_prelude("#version 300 es", "uniform vec4 u_time;\n");
        assert_eq!(out, "#version 300 es\nuniform vec4 u_time;\n");
    }

    #[test]
    fn injects_at_top_without_version() {
        let out = inject_prelude("void main() {}\n", "uniform vec4 u_time;\n");
        assert!(out.starts_with("uniform vec4 u_time;\nvoid main"));
    }
}
