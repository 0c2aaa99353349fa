/// glTF `asset` metadata.
#[derive(Clone, Debug)]
pub struct Asset {
    pub version: String,
    pub generator: Option<String>,
    pub copyright: Option<String>,
}

impl Default for Asset {
    fn default() -> Self {
        Asset { version: "2.0".to_string(), generator: None, copyright: None }
    }
}

/// The document's singleton root property. Every top-level collection
/// (scenes, nodes, meshes, ...) is reached via ordered, non-owned edges
/// from `Root`, named for the collection (`"scenes"`, `"nodes"`, ...); the
/// default scene via `"scene"`.
#[derive(Clone, Debug, Default)]
pub struct Root {
    pub asset: Asset,
    pub extensions_used: Vec<String>,
    pub extensions_required: Vec<String>,
}
