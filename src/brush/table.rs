//! Built-in brush table.
//!
//! One record per logical brush: aliases, the vertex channels its program
//! reads, and (unless the brush is a placeholder) its material data. The
//! registry and the parameter table are both derived from [`BRUSHES`].

use glam::Vec4;

use super::definition::{AlphaMode, BlendMode, BrushDefinition, RenderState, Side, TextureSlot};
use super::{ChannelSet, UniformCaps};
use crate::uniforms::UniformValue;

#[derive(Debug, Clone, Copy)]
pub(crate) struct BrushRecord {
    pub key: &'static str,
    /// First GUID names the asset directory.
    pub guids: &'static [&'static str],
    pub names: &'static [&'static str],
    pub channels: ChannelSet,
    pub material: Option<MaterialRecord>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct MaterialRecord {
    pub caps: UniformCaps,
    pub main: bool,
    pub bump: bool,
    pub alpha_mask: bool,
    pub blend: BlendMode,
    pub side: Side,
    pub alpha: AlphaMode,
    pub uniforms: &'static [(&'static str, UniformValue)],
}

const VERSION: &str = "v10.0";

const P: ChannelSet = ChannelSet::POSITION;
const N: ChannelSet = ChannelSet::NORMAL;
const C: ChannelSet = ChannelSet::COLOR;
const UV0: ChannelSet = ChannelSet::UV0;
const UV1: ChannelSet = ChannelSet::UV1;

const HULL: ChannelSet = P.union(N).union(C);
const RIBBON: ChannelSet = HULL.union(UV0);
const FLAT_RIBBON: ChannelSet = P.union(C).union(UV0);
const PARTICLE: ChannelSet = RIBBON.union(UV1);

const SPECULAR: &[(&str, UniformValue)] = &[
    ("u_SpecColor", UniformValue::Vec3(glam::Vec3::new(0.2, 0.2, 0.2))),
    ("u_Shininess", UniformValue::Float(0.1)),
];
const TINT: &[(&str, UniformValue)] = &[("u_TintColor", UniformValue::Vec4(Vec4::ONE))];
const EMISSION: &[(&str, UniformValue)] = &[("u_EmissionGain", UniformValue::Float(0.5))];
const SCROLL: &[(&str, UniformValue)] = &[
    ("u_EmissionGain", UniformValue::Float(0.5)),
    ("u_ScrollRate", UniformValue::Float(1.0)),
    ("u_ScrollJitterIntensity", UniformValue::Float(0.0)),
];

impl MaterialRecord {
    /// Unlit, fogged, opaque.
    const fn unlit() -> Self {
        Self {
            caps: UniformCaps::FOG,
            main: false,
            bump: false,
            alpha_mask: false,
            blend: BlendMode::Opaque,
            side: Side::Double,
            alpha: AlphaMode::Opaque,
            uniforms: &[],
        }
    }

    /// Diffuse-lit by the two scene lights plus ambient.
    const fn lit() -> Self {
        Self {
            caps: UniformCaps::LIT,
            ..Self::unlit()
        }
    }

    const fn specular() -> Self {
        Self {
            uniforms: SPECULAR,
            ..Self::lit()
        }
    }

    /// Unlit additive glow.
    const fn additive() -> Self {
        Self {
            blend: BlendMode::Additive,
            main: true,
            uniforms: EMISSION,
            ..Self::unlit()
        }
    }

    const fn main(mut self) -> Self {
        self.main = true;
        self
    }

    const fn bump(mut self) -> Self {
        self.main = true;
        self.bump = true;
        self
    }

    const fn alpha_mask(mut self) -> Self {
        self.alpha_mask = true;
        self
    }

    const fn animated(mut self) -> Self {
        self.caps = self.caps.union(UniformCaps::TIME);
        self
    }

    const fn view_dependent(mut self) -> Self {
        self.caps = self.caps.union(UniformCaps::CAMERA_POSITION);
        self
    }

    const fn cutoff(mut self, cutoff: f32) -> Self {
        self.alpha = AlphaMode::Mask(cutoff);
        self
    }

    const fn blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    const fn side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    const fn uniforms(mut self, uniforms: &'static [(&'static str, UniformValue)]) -> Self {
        self.uniforms = uniforms;
        self
    }
}

const fn brush(
    key: &'static str,
    guids: &'static [&'static str],
    channels: ChannelSet,
    material: MaterialRecord,
) -> BrushRecord {
    BrushRecord {
        key,
        guids,
        names: &[],
        channels,
        material: Some(material),
    }
}

/// A brush that resolves but has no usable definition yet.
const fn placeholder(key: &'static str, guids: &'static [&'static str]) -> BrushRecord {
    BrushRecord {
        key,
        guids,
        names: &[],
        channels: ChannelSet::REQUIRED,
        material: None,
    }
}

impl BrushRecord {
    const fn names(mut self, names: &'static [&'static str]) -> Self {
        self.names = names;
        self
    }
}

use MaterialRecord as M;

pub(crate) const BRUSHES: &[BrushRecord] = &[
    // ------------------------------------------------------------------------
    // Flat / marker family
    // ------------------------------------------------------------------------
    brush("Marker", &["429ed64a-4e97-4466-84d3-145a861ef684"], FLAT_RIBBON, M::unlit().main().cutoff(0.067)),
    brush("DotMarker", &["d1d991f2-e7a0-4cf1-b328-f57e915e6260"], FLAT_RIBBON, M::unlit().main().cutoff(0.067)),
    brush("Flat", &["2d35bcf0-e4d8-452c-97b1-3311be063130", "280c0a7a-aad8-416c-a7d2-df63d129ca70"], RIBBON, M::lit().main().cutoff(0.067)),
    brush("Highlighter", &["cf019139-d41c-4eb0-a1d0-5cf54b0a42f3"], FLAT_RIBBON, M::additive()),
    brush("SoftHighlighter", &["accb32f5-4509-454f-93f8-1df3fd31df1b"], FLAT_RIBBON, M::additive()),
    brush("VelvetInk", &["d229d335-c334-495a-a801-660ac8a87360"], FLAT_RIBBON, M::additive()),
    brush("Light", &["2241cd32-8ba2-48a5-9ee7-2caef7e9ed62"], FLAT_RIBBON, M::additive()),
    brush("Paper", &["759f1ebd-20cd-4720-8d41-234e0da63716", "f1114e2e-eb8d-4fde-915a-6e653b54e9f5"], RIBBON, M::lit().main().cutoff(0.16)),
    brush("CoarseBristles", &["1161af82-50cf-47db-9706-0c3576d43c43"], RIBBON, M::lit().main().cutoff(0.25)),
    brush("Splatter", &["7a1c8107-50c5-4b70-9a39-421576d6617e", "8dc4a70c-d558-4efd-a5ed-d4e860f40dc3"], RIBBON, M::lit().main().cutoff(0.2)),
    // ------------------------------------------------------------------------
    // Painted / bump-mapped family
    // ------------------------------------------------------------------------
    brush("Ink", &["f5c336cf-5108-4b40-ade9-c687504385ab", "c0012095-3ffd-4040-8ee1-fc180d346eaa"], RIBBON, M::specular().bump().cutoff(0.5)),
    brush("WetPaint", &["b67c0e81-ce6d-40a8-aeb0-ef036b081aa3"], RIBBON, M::specular().bump().cutoff(0.3)),
    brush("ThickPaint", &["75b32cf0-fdd6-4d89-a64b-e2a00b247b0f"], RIBBON, M::specular().bump().cutoff(0.5)),
    brush("OilPaint", &["c515dad7-4393-4681-81ad-162ef052241b", "f72ec0e7-a844-4e38-82e3-140c44772699"], RIBBON, M::specular().bump().cutoff(0.5)),
    brush("DuctTape", &["d0262945-853c-4481-9cbd-88586bed93cb", "3ca16e2f-bdcd-4da2-8631-dcef342f40f1"], RIBBON, M::specular().bump().cutoff(0.2)),
    brush("Leaves", &["ea19de07-d0c0-4484-9198-18489a3c1487"], RIBBON, M::specular().bump().alpha_mask().cutoff(0.5)),
    brush("Hypercolor", &["dce872c2-7b49-4684-b59b-c45387949c5c", "e8ef32b1-baa8-460a-9c2c-9cf8506794f5"], RIBBON, M::specular().bump().animated().cutoff(0.5)),
    // ------------------------------------------------------------------------
    // Hulls and tubes
    // ------------------------------------------------------------------------
    brush("UnlitHull", &["a8fea537-da7c-4d4b-817f-24f074725d6d"], HULL, M::unlit().side(Side::Front)),
    brush("MatteHull", &["79348357-432d-4746-8e29-0e25c112e3aa"], HULL, M::lit().side(Side::Front)),
    brush("ShinyHull", &["faaa4d44-fcfb-4177-96be-753ac0421ba3"], RIBBON, M::specular().side(Side::Front)),
    brush("DiamondHull", &["c8ccb53d-ae13-45ef-8afb-b730d81394eb"], RIBBON, M::additive().animated().view_dependent().side(Side::Front)),
    brush("Toon", &["4391385a-df73-4396-9e33-31e4e4930b27"], HULL, M::unlit().side(Side::Front)),
    brush("Tube", &["8e58ceea-7830-49b4-aba9-6215104ab52a"], RIBBON, M::specular().side(Side::Front)),
    brush("Icing", &["2f212815-f4d3-c1a4-681a-feeaf9c6dc37"], RIBBON, M::specular().bump().side(Side::Front)),
    // ------------------------------------------------------------------------
    // Animated emissive ribbons
    // ------------------------------------------------------------------------
    brush("Fire", &["cb92b597-94ca-4255-b017-0e3f42f12f9e"], FLAT_RIBBON, M::additive().animated().uniforms(SCROLL)),
    brush("Rainbow", &["ad1ad437-76e2-450d-a23a-e17f8310b960"], FLAT_RIBBON, M::additive().animated().uniforms(SCROLL)),
    brush("Electricity", &["f6e85de3-6dcc-4e7f-87fd-cee8c3d25d51"], RIBBON, M::additive().animated()),
    brush("Plasma", &["c33714d1-b2f9-412e-bd50-1884c9d46336"], FLAT_RIBBON, M::additive().animated().uniforms(SCROLL)),
    brush("Streamers", &["44bb800a-fbc3-4592-8426-94ecb05ddec3"], FLAT_RIBBON, M::additive().animated().uniforms(SCROLL)),
    brush("Waveform", &["10201aa3-ebc2-42d8-84b7-2e63f6eeb8ab"], FLAT_RIBBON, M::additive().animated().uniforms(SCROLL)),
    brush("NeonPulse", &["b2ffef01-eaaa-4ab5-aa64-95a2c4f5dbc6"], RIBBON, M::additive().animated()),
    brush("ChromaticWave", &["0f0ff7b2-a677-45eb-a7d6-0cd7206f4816"], FLAT_RIBBON, M::additive().animated()),
    brush("HyperGrid", &["6a1cf9f9-032c-45ec-9b1d-a6680bee30f7"], PARTICLE, M::additive().animated().uniforms(TINT)),
    // ------------------------------------------------------------------------
    // Particles
    // ------------------------------------------------------------------------
    brush("Smoke", &["70d79cca-b159-4f35-990c-f02193947fe8"], PARTICLE, M::additive().animated().uniforms(TINT)),
    brush("Snow", &["d902ed8b-d0d1-476c-a8de-878a79e3a34c"], PARTICLE, M::unlit().main().animated().blend(BlendMode::Alpha).uniforms(TINT)),
    brush("Stars", &["0eb4db27-3f82-408d-b5a1-19ebd7d5b711"], PARTICLE, M::additive().animated()),
    brush("Embers", &["02ffb866-7fb2-4d15-b761-1012cefb1360"], PARTICLE, M::additive().animated().uniforms(TINT)),
    brush("Bubbles", &["89d104cd-d012-426b-b5b3-bbaee63ac43c"], PARTICLE, M::additive().animated()),
    // ------------------------------------------------------------------------
    // Blocks (Poly / Blocks exports)
    // ------------------------------------------------------------------------
    brush("BlocksBasic", &["0e87b49c-6546-3a34-3a44-8a556d7d6c3e"], HULL, M::specular().side(Side::Front)).names(&["BlocksPaper"]),
    brush("BlocksGem", &["232998f8-d357-47a2-993a-53415df9be10"], HULL, M::specular().view_dependent().side(Side::Front)),
    brush("BlocksGlass", &["3d813d82-5839-4450-8ddc-8e889ecd96c7"], HULL, M::specular().view_dependent().blend(BlendMode::Alpha).side(Side::Front)),
    // ------------------------------------------------------------------------
    // Placeholders: resolvable, no definition yet
    // ------------------------------------------------------------------------
    placeholder("Comet", &["1caa6d7d-f015-3f54-3a4b-8b5354d39f81"]),
    placeholder("Petal", &["e0abbc80-0f80-e854-4970-8924a0863dcc"]),
    placeholder("Disco", &["4391aaaa-df73-4396-9e33-31e4e4930b27"]),
    placeholder("CelVinyl", &["700f3aa8-9a7c-2384-8b8a-ea028905dd8c"]),
];

/// Ordered substring rules for generically renamed Blocks materials.
/// More specific patterns come first.
pub(crate) const FALLBACK_PATTERNS: &[(&str, &str)] = &[
    ("blocksgem", "BlocksGem"),
    ("blocksglass", "BlocksGlass"),
    ("blocksbasic", "BlocksBasic"),
    ("blockspaper", "BlocksBasic"),
];

impl BrushRecord {
    fn definition(&self) -> Option<BrushDefinition> {
        let material = self.material?;
        let guid = self.guids.first()?;

        let mut definition = BrushDefinition::with_layout(self.key, guid, VERSION)
            .with_channels(self.channels)
            .with_capabilities(material.caps);

        for (slot, used) in [
            (TextureSlot::Main, material.main),
            (TextureSlot::Bump, material.bump),
            (TextureSlot::AlphaMask, material.alpha_mask),
        ] {
            if used {
                definition = definition.with_texture(slot);
            }
        }
        if material.bump {
            definition = definition.with_uniform(
                TextureSlot::Bump.texel_size_uniform(),
                UniformValue::Vec4(Vec4::ONE),
            );
        }
        if material.main {
            definition = definition.with_uniform(
                TextureSlot::Main.texel_size_uniform(),
                UniformValue::Vec4(Vec4::ONE),
            );
        }
        for (name, value) in material.uniforms {
            definition = definition.with_uniform(*name, *value);
        }

        Some(definition.with_render_state(RenderState::for_blend(
            material.blend,
            material.side,
            material.alpha,
        )))
    }
}

/// Materialises every non-placeholder record.
pub(crate) fn builtin_definitions() -> impl Iterator<Item = BrushDefinition> {
    BRUSHES.iter().filter_map(BrushRecord::definition)
}
