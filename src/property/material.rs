use super::Extras;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AlphaMode {
    Opaque,
    Mask,
    Blend,
}

impl Default for AlphaMode {
    fn default() -> Self {
        AlphaMode::Opaque
    }
}

/// A PBR metallic-roughness material. Texture slots (`"baseColorTexture"`,
/// `"metallicRoughnessTexture"`, `"normalTexture"`, `"occlusionTexture"`,
/// `"emissiveTexture"`) are reached as owned edges to
/// [`crate::property::TextureInfo`].
#[derive(Clone, Debug)]
pub struct Material {
    pub base_color_factor: [f32; 4],
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub emissive_factor: [f32; 3],
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
    pub name: Option<String>,
    pub extras: Extras,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            emissive_factor: [0.0, 0.0, 0.0],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
            name: None,
            extras: None,
        }
    }
}

/// Material texture slot names, in the fixed order `listTextureSlots`
/// (spec §4.G) reports them.
pub const TEXTURE_SLOTS: [&str; 5] = [
    "baseColorTexture",
    "metallicRoughnessTexture",
    "normalTexture",
    "occlusionTexture",
    "emissiveTexture",
];
