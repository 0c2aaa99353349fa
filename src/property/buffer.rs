use super::Extras;

/// A block of raw binary data. Post-load, accessors own their own dense
/// typed arrays (see `property::accessor`); `Buffer` mainly matters during
/// GLB/.gltf I/O and is otherwise a name/extras holder, re-packed fresh by
/// the writer from live accessor data on every write.
#[derive(Clone, Debug, Default)]
pub struct Buffer {
    pub uri: Option<String>,
    pub name: Option<String>,
    pub extras: Extras,
}
