use super::Extras;

/// Joints are reached via ordered `"joints"` edges to [`crate::property::Node`],
/// the inverse bind matrix accessor via `"inverseBindMatrices"`, and the
/// skeleton root via `"skeleton"`.
#[derive(Clone, Debug, Default)]
pub struct Skin {
    pub name: Option<String>,
    pub extras: Extras,
}
