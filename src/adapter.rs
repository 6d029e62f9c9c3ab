//! Vertex attribute adaptation.
//!
//! Brush programs read fixed attribute names (`a_position`, `a_color`, ...),
//! while imported meshes carry host names, glTF semantics or the
//! `_tb_unity_*` names written by Tilt Brush exporters. [`AttributeAdapter`]
//! aliases whichever source channel exists under the name the program
//! expects, sharing the source buffer.

use crate::brush::{BrushDefinition, ChannelSet};
use crate::errors::{Error, Result};
use crate::scene::MeshAttributeSet;

pub const A_POSITION: &str = "a_position";
pub const A_NORMAL: &str = "a_normal";
pub const A_COLOR: &str = "a_color";
pub const A_TEXCOORD0: &str = "a_texcoord0";
pub const A_TEXCOORD1: &str = "a_texcoord1";

/// One program attribute and the source names it may come from, in order.
#[derive(Debug, Clone, Copy)]
pub struct ChannelRule {
    pub channel: ChannelSet,
    pub target: &'static str,
    pub sources: &'static [&'static str],
}

pub const CHANNEL_RULES: [ChannelRule; 5] = [
    ChannelRule {
        channel: ChannelSet::POSITION,
        target: A_POSITION,
        sources: &["position", "POSITION"],
    },
    ChannelRule {
        channel: ChannelSet::NORMAL,
        target: A_NORMAL,
        sources: &["normal", "NORMAL", "_tb_unity_normal"],
    },
    ChannelRule {
        channel: ChannelSet::COLOR,
        target: A_COLOR,
        sources: &["color", "COLOR_0", "_tb_unity_color"],
    },
    ChannelRule {
        channel: ChannelSet::UV0,
        target: A_TEXCOORD0,
        sources: &["_tb_unity_texcoord_0", "uv", "TEXCOORD_0"],
    },
    ChannelRule {
        channel: ChannelSet::UV1,
        target: A_TEXCOORD1,
        sources: &["_tb_unity_texcoord_1", "uv1", "TEXCOORD_1"],
    },
];

/// What a [`AttributeAdapter::remap`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemapSummary {
    /// Channels now exposed under their program name.
    pub aliased: ChannelSet,
    /// Optional channels the brush wanted but the mesh does not have.
    pub skipped: ChannelSet,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeAdapter;

impl AttributeAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Adds program-name aliases for every channel `definition` consumes.
    ///
    /// Source channels are never removed or copied. Absent optional channels
    /// are skipped; the mesh is left untouched when a required one (position
    /// or color) is missing.
    pub fn remap(
        &self,
        mesh: &mut MeshAttributeSet,
        definition: &BrushDefinition,
    ) -> Result<RemapSummary> {
        let wanted = definition.channels | ChannelSet::REQUIRED;

        for rule in CHANNEL_RULES
            .iter()
            .filter(|r| ChannelSet::REQUIRED.contains(r.channel))
        {
            if Self::find_source(mesh, rule).is_none() {
                return Err(Error::MissingChannel {
                    channel: rule.target,
                });
            }
        }

        let mut summary = RemapSummary::default();
        for rule in CHANNEL_RULES.iter().filter(|r| wanted.contains(r.channel)) {
            match Self::find_source(mesh, rule) {
                Some(source) => {
                    if source != rule.target {
                        mesh.alias(source, rule.target);
                    }
                    summary.aliased |= rule.channel;
                }
                None => {
                    log::debug!(
                        "Brush {}: no source for optional {}",
                        definition.key,
                        rule.target
                    );
                    summary.skipped |= rule.channel;
                }
            }
        }

        Ok(summary)
    }

    /// The first present name among the rule's target and its sources.
    fn find_source(mesh: &MeshAttributeSet, rule: &ChannelRule) -> Option<&'static str> {
        std::iter::once(rule.target)
            .chain(rule.sources.iter().copied())
            .find(|name| mesh.contains(name))
    }
}
