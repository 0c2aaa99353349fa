use super::Extras;

/// A reference to a [`crate::property::Texture`] plus the texture-specific
/// parameters of one material slot (UV set, normal scale, occlusion
/// strength). The texture itself is reached via the `"texture"` edge.
#[derive(Clone, Debug, Default)]
pub struct TextureInfo {
    pub tex_coord: u32,
    /// `normalTexture.scale` or `occlusionTexture.strength`; unused by the
    /// other slots.
    pub scale_or_strength: Option<f32>,
    pub extras: Extras,
}
