//! Extension registry (spec §4.C): tracks which extension names a document
//! may use, their required/used status, and per-property extension
//! payloads attached to the graph as [`crate::graph::PropertyType::ExtensionProperty`]
//! nodes.

use std::collections::HashSet;

/// Static metadata an extension registers itself with. `preread_types`/
/// `prewrite_types` name the core property types (by their `PropertyType`
/// debug name, e.g. `"Accessor"`) whose read/write hook must run *before*
/// that core type is materialized — e.g. `KHR_mesh_quantization` needs to
/// override an accessor's component type before the accessor itself is
/// built from JSON.
#[derive(Clone, Debug)]
pub struct ExtensionDescriptor {
    pub name: String,
    pub preread_types: Vec<&'static str>,
    pub prewrite_types: Vec<&'static str>,
}

impl ExtensionDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        ExtensionDescriptor { name: name.into(), preread_types: Vec::new(), prewrite_types: Vec::new() }
    }

    pub fn preread_before(mut self, types: &[&'static str]) -> Self {
        self.preread_types = types.to_vec();
        self
    }

    pub fn prewrite_before(mut self, types: &[&'static str]) -> Self {
        self.prewrite_types = types.to_vec();
        self
    }
}

/// Installed-extension bookkeeping for a [`crate::Document`].
///
/// Registration order never affects output: `extensionsUsed`/
/// `extensionsRequired` are emitted name-sorted (spec §8's
/// extension-order-stability property), and per-property extension
/// payloads are written through a `BTreeMap`/sorted-key JSON object for the
/// same reason — see `io::writer`.
#[derive(Default)]
pub struct Registry {
    descriptors: Vec<ExtensionDescriptor>,
    required: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn install(&mut self, descriptor: ExtensionDescriptor) {
        if !self.descriptors.iter().any(|d| d.name == descriptor.name) {
            self.descriptors.push(descriptor);
        }
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.descriptors.iter().any(|d| d.name == name)
    }

    pub fn set_required(&mut self, name: &str, required: bool) {
        if required {
            self.required.insert(name.to_string());
        } else {
            self.required.remove(name);
        }
    }

    /// `extensionsUsed`, sorted by name regardless of registration order.
    pub fn used_sorted(&self) -> Vec<String> {
        let mut names: Vec<String> = self.descriptors.iter().map(|d| d.name.clone()).collect();
        names.sort();
        names
    }

    /// `extensionsRequired`, sorted by name.
    pub fn required_sorted(&self) -> Vec<String> {
        let mut names: Vec<String> = self.required.iter().cloned().collect();
        names.sort();
        names
    }

    /// Names of extensions that must run their read/write hook before
    /// `core_type` is materialized, ordered by name for determinism.
    pub fn ordered_for_phase(&self, core_type: &str, prewrite: bool) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .descriptors
            .iter()
            .filter(|d| {
                let types = if prewrite { &d.prewrite_types } else { &d.preread_types };
                types.contains(&core_type)
            })
            .map(|d| d.name.as_str())
            .collect();
        names.sort();
        names
    }
}

/// A single extension payload attached to a property via a
/// `"extensions.{name}"` owned edge. Stored as a `serde_json::Value` so
/// any registered extension's schema can round-trip without the core
/// knowing its shape.
#[derive(Clone, Debug)]
pub struct ExtensionProperty {
    pub name: String,
    pub value: serde_json::Value,
}

pub fn edge_name(extension_name: &str) -> String {
    format!("extensions.{extension_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn used_sorted_is_independent_of_registration_order() {
        let mut a = Registry::new();
        a.install(ExtensionDescriptor::new("KHR_materials_variants"));
        a.install(ExtensionDescriptor::new("KHR_lights_punctual"));

        let mut b = Registry::new();
        b.install(ExtensionDescriptor::new("KHR_lights_punctual"));
        b.install(ExtensionDescriptor::new("KHR_materials_variants"));

        assert_eq!(a.used_sorted(), b.used_sorted());
    }

    #[test]
    fn ordered_for_phase_filters_and_sorts() {
        let mut reg = Registry::new();
        reg.install(ExtensionDescriptor::new("KHR_mesh_quantization").preread_before(&["Accessor"]));
        reg.install(ExtensionDescriptor::new("KHR_lights_punctual"));
        assert_eq!(reg.ordered_for_phase("Accessor", false), vec!["KHR_mesh_quantization"]);
        assert!(reg.ordered_for_phase("Node", false).is_empty());
    }
}
