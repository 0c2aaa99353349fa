use super::Extras;

/// A set of root [`crate::property::Node`]s, reached from the document via
/// the `"children"` edge.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub name: Option<String>,
    pub extras: Extras,
}
