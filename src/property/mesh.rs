use super::Extras;

/// A set of [`crate::property::Primitive`]s, owned via `"primitives"`
/// edges.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub weights: Vec<f32>,
    pub name: Option<String>,
    pub extras: Extras,
}
