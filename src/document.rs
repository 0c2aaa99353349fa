//! `Document`: the property graph plus typed arenas, factory methods, and
//! the shared transform-pipeline helpers (spec §4.B, §4.G).

use std::cell::Cell;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::extension::{self, ExtensionDescriptor, ExtensionProperty, Registry};
use crate::graph::{EdgeAttributes, Graph, Id, Property, PropertyId, PropertyType};
use crate::logger::Logger;
use crate::property::*;

macro_rules! arena_fns {
    ($field:ident, $ty:ty, $variant:ident, $get:ident, $get_mut:ident, $create:ident) => {
        pub fn $get(&self, id: Id<$ty>) -> &$ty {
            self.$field[id.index()].as_ref().expect("disposed property accessed")
        }

        pub fn $get_mut(&mut self, id: Id<$ty>) -> &mut $ty {
            self.$field[id.index()].as_mut().expect("disposed property accessed")
        }

        pub fn $create(&mut self, value: $ty) -> Id<$ty> {
            let index = self.$field.len() as u32;
            self.$field.push(Some(value));
            let id = Id::<$ty>::new(PropertyType::$variant, index);
            self.graph.register(id.untyped());
            self.connect_from_root(id.untyped(), Self::collection_name(PropertyType::$variant));
            id
        }
    };
}

/// The document graph: one singleton [`Root`] plus every property type's
/// arena, the edge [`Graph`], and the document-owned [`Logger`].
pub struct Document {
    graph: Graph,
    root: Root,
    scenes: Vec<Option<Scene>>,
    nodes: Vec<Option<Node>>,
    meshes: Vec<Option<Mesh>>,
    primitives: Vec<Option<Primitive>>,
    accessors: Vec<Option<Accessor>>,
    materials: Vec<Option<Material>>,
    textures: Vec<Option<Texture>>,
    texture_infos: Vec<Option<TextureInfo>>,
    animations: Vec<Option<Animation>>,
    animation_samplers: Vec<Option<AnimationSampler>>,
    animation_channels: Vec<Option<AnimationChannel>>,
    skins: Vec<Option<Skin>>,
    buffers: Vec<Option<Buffer>>,
    cameras: Vec<Option<Camera>>,
    extension_properties: Vec<Option<ExtensionProperty>>,
    pub extensions: Registry,
    logger: Logger,
    /// Reentrancy guard (spec §5): set for the duration of a `transform`
    /// call; methods that would re-enter a transform check this first.
    busy: Cell<bool>,
}

const ROOT_ID: PropertyId = PropertyId { ty: PropertyType::Root, index: 0 };

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut graph = Graph::new();
        graph.register(ROOT_ID);
        Document {
            graph,
            root: Root::default(),
            scenes: Vec::new(),
            nodes: Vec::new(),
            meshes: Vec::new(),
            primitives: Vec::new(),
            accessors: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            texture_infos: Vec::new(),
            animations: Vec::new(),
            animation_samplers: Vec::new(),
            animation_channels: Vec::new(),
            skins: Vec::new(),
            buffers: Vec::new(),
            cameras: Vec::new(),
            extension_properties: Vec::new(),
            extensions: Registry::new(),
            logger: Logger::default(),
            busy: Cell::new(false),
        }
    }

    pub fn with_logger(logger: Logger) -> Self {
        let mut doc = Document::new();
        doc.logger = logger;
        doc
    }

    pub fn logger(&mut self) -> &mut Logger {
        &mut self.logger
    }

    pub fn root(&self) -> &Root {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Root {
        &mut self.root
    }

    /// The untyped id of the document's singleton `Root` property, for
    /// attaching root-level extension payloads via `set_extension`.
    pub fn root_id(&self) -> PropertyId {
        ROOT_ID
    }

    fn collection_name(ty: PropertyType) -> &'static str {
        match ty {
            PropertyType::Scene => "scenes",
            PropertyType::Node => "nodes",
            PropertyType::Mesh => "meshes",
            PropertyType::Accessor => "accessors",
            PropertyType::Material => "materials",
            PropertyType::Texture => "textures",
            PropertyType::Animation => "animations",
            PropertyType::Skin => "skins",
            PropertyType::Buffer => "buffers",
            PropertyType::Camera => "cameras",
            _ => "",
        }
    }

    fn connect_from_root(&mut self, child: PropertyId, name: &str) {
        if name.is_empty() {
            return;
        }
        self.graph.connect(ROOT_ID, child, name, EdgeAttributes::default());
    }

    /// Reentrancy guard entry point: runs `f` with the busy flag set,
    /// returning `UnsupportedOperation` if already busy.
    pub fn with_exclusive_access<R>(&self, f: impl FnOnce() -> R) -> Result<R> {
        if self.busy.replace(true) {
            return Err(Error::UnsupportedOperation("document is already running a transform".to_string()));
        }
        let result = f();
        self.busy.set(false);
        Ok(result)
    }

    arena_fns!(scenes, Scene, Scene, scene, scene_mut, create_scene);
    arena_fns!(nodes, Node, Node, node, node_mut, create_node);
    arena_fns!(meshes, Mesh, Mesh, mesh, mesh_mut, create_mesh);
    arena_fns!(accessors, Accessor, Accessor, accessor, accessor_mut, create_accessor);
    arena_fns!(materials, Material, Material, material, material_mut, create_material);
    arena_fns!(textures, Texture, Texture, texture, texture_mut, create_texture);
    arena_fns!(animations, Animation, Animation, animation, animation_mut, create_animation);
    arena_fns!(skins, Skin, Skin, skin, skin_mut, create_skin);
    arena_fns!(buffers, Buffer, Buffer, buffer, buffer_mut, create_buffer);
    arena_fns!(cameras, Camera, Camera, camera, camera_mut, create_camera);

    pub fn primitive(&self, id: Id<Primitive>) -> &Primitive {
        self.primitives[id.index()].as_ref().expect("disposed property accessed")
    }

    pub fn primitive_mut(&mut self, id: Id<Primitive>) -> &mut Primitive {
        self.primitives[id.index()].as_mut().expect("disposed property accessed")
    }

    /// Creates a primitive owned by `mesh`, appended to its `"primitives"`
    /// list.
    pub fn create_primitive(&mut self, mesh: Id<Mesh>, value: Primitive) -> Id<Primitive> {
        let index = self.primitives.len() as u32;
        self.primitives.push(Some(value));
        let id = Id::<Primitive>::new(PropertyType::Primitive, index);
        self.graph.register(id.untyped());
        self.graph.connect_owned(mesh.untyped(), id.untyped(), "primitives", EdgeAttributes::default());
        id
    }

    pub fn texture_info(&self, id: Id<TextureInfo>) -> &TextureInfo {
        self.texture_infos[id.index()].as_ref().expect("disposed property accessed")
    }

    pub fn texture_info_mut(&mut self, id: Id<TextureInfo>) -> &mut TextureInfo {
        self.texture_infos[id.index()].as_mut().expect("disposed property accessed")
    }

    /// Sets material texture slot `slot` (one of [`material::TEXTURE_SLOTS`])
    /// to reference `texture`, creating the owned `TextureInfo` if absent.
    pub fn material_set_texture(&mut self, material: Id<Material>, slot: &str, texture: Id<Texture>, tex_coord: u32) -> Id<TextureInfo> {
        if let Some(existing) = self.graph.child_named(material.untyped(), slot) {
            let info_id = Id::<TextureInfo>::from_untyped(existing).expect("slot holds a TextureInfo");
            let old_texture = self.graph.child_named(info_id.untyped(), "texture").unwrap_or(texture.untyped());
            self.graph.swap(info_id.untyped(), old_texture, texture.untyped());
            self.texture_info_mut(info_id).tex_coord = tex_coord;
            return info_id;
        }
        let index = self.texture_infos.len() as u32;
        self.texture_infos.push(Some(TextureInfo { tex_coord, ..Default::default() }));
        let info_id = Id::<TextureInfo>::new(PropertyType::TextureInfo, index);
        self.graph.register(info_id.untyped());
        self.graph.connect_owned(material.untyped(), info_id.untyped(), slot, EdgeAttributes::default());
        self.graph.connect(info_id.untyped(), texture.untyped(), "texture", EdgeAttributes::default());
        info_id
    }

    pub fn material_texture_info(&self, material: Id<Material>, slot: &str) -> Option<Id<TextureInfo>> {
        self.graph.child_named(material.untyped(), slot).map(|id| Id::from_untyped(id).unwrap())
    }

    pub fn texture_info_texture(&self, info: Id<TextureInfo>) -> Option<Id<Texture>> {
        self.graph.child_named(info.untyped(), "texture").map(|id| Id::from_untyped(id).unwrap())
    }

    /// Lists a material's texture slots in `TEXTURE_SLOTS` order, for
    /// slots that are actually set.
    pub fn list_texture_slots(&self, material: Id<Material>) -> Vec<(&'static str, Id<TextureInfo>)> {
        material::TEXTURE_SLOTS
            .iter()
            .filter_map(|&slot| self.material_texture_info(material, slot).map(|info| (slot, info)))
            .collect()
    }

    pub fn animation_sampler(&self, id: Id<AnimationSampler>) -> &AnimationSampler {
        self.animation_samplers[id.index()].as_ref().expect("disposed property accessed")
    }

    pub fn create_animation_sampler(&mut self, animation: Id<Animation>, value: AnimationSampler, input: Id<Accessor>, output: Id<Accessor>) -> Id<AnimationSampler> {
        let index = self.animation_samplers.len() as u32;
        self.animation_samplers.push(Some(value));
        let id = Id::<AnimationSampler>::new(PropertyType::AnimationSampler, index);
        self.graph.register(id.untyped());
        self.graph.connect_owned(animation.untyped(), id.untyped(), "samplers", EdgeAttributes::default());
        self.graph.connect(id.untyped(), input.untyped(), "input", EdgeAttributes::default());
        self.graph.connect(id.untyped(), output.untyped(), "output", EdgeAttributes::default());
        id
    }

    pub fn animation_channel(&self, id: Id<AnimationChannel>) -> &AnimationChannel {
        self.animation_channels[id.index()].as_ref().expect("disposed property accessed")
    }

    pub fn create_animation_channel(&mut self, animation: Id<Animation>, value: AnimationChannel, sampler: Id<AnimationSampler>, target_node: Id<Node>) -> Id<AnimationChannel> {
        let index = self.animation_channels.len() as u32;
        self.animation_channels.push(Some(value));
        let id = Id::<AnimationChannel>::new(PropertyType::AnimationChannel, index);
        self.graph.register(id.untyped());
        self.graph.connect_owned(animation.untyped(), id.untyped(), "channels", EdgeAttributes::default());
        self.graph.connect(id.untyped(), sampler.untyped(), "sampler", EdgeAttributes::default());
        self.graph.connect(id.untyped(), target_node.untyped(), "targetNode", EdgeAttributes::default());
        id
    }

    // --- Node graph wiring -------------------------------------------------

    pub fn node_set_mesh(&mut self, node: Id<Node>, mesh: Option<Id<Mesh>>) {
        self.reconnect_single(node.untyped(), "mesh", mesh.map(Id::untyped));
    }

    pub fn node_mesh(&self, node: Id<Node>) -> Option<Id<Mesh>> {
        self.graph.child_named(node.untyped(), "mesh").map(|id| Id::from_untyped(id).unwrap())
    }

    pub fn node_set_camera(&mut self, node: Id<Node>, camera: Option<Id<Camera>>) {
        self.reconnect_single(node.untyped(), "camera", camera.map(Id::untyped));
    }

    pub fn node_camera(&self, node: Id<Node>) -> Option<Id<Camera>> {
        self.graph.child_named(node.untyped(), "camera").map(|id| Id::from_untyped(id).unwrap())
    }

    pub fn node_set_skin(&mut self, node: Id<Node>, skin: Option<Id<Skin>>) {
        self.reconnect_single(node.untyped(), "skin", skin.map(Id::untyped));
    }

    pub fn node_skin(&self, node: Id<Node>) -> Option<Id<Skin>> {
        self.graph.child_named(node.untyped(), "skin").map(|id| Id::from_untyped(id).unwrap())
    }

    fn reconnect_single(&mut self, parent: PropertyId, name: &str, child: Option<PropertyId>) {
        for edge_id in self.graph.list_child_edges_named(parent, name) {
            self.graph.disconnect(edge_id);
        }
        if let Some(child) = child {
            self.graph.connect(parent, child, name, EdgeAttributes::default());
        }
    }

    /// Appends `child` to `parent`'s `"children"` list.
    pub fn node_add_child(&mut self, parent: Id<Node>, child: Id<Node>) {
        self.graph.connect(parent.untyped(), child.untyped(), "children", EdgeAttributes::default());
    }

    pub fn node_children(&self, parent: Id<Node>) -> Vec<Id<Node>> {
        self.graph.list_child_edges_named(parent.untyped(), "children").into_iter().filter_map(|e| self.graph.edge(e)).map(|e| Id::from_untyped(e.child).unwrap()).collect()
    }

    /// Reparents `child` from wherever it is to be a `"children"` edge of
    /// `new_parent`: detaches its current `"children"` parent edge (if any,
    /// ignoring `Root` membership) and attaches a new one.
    pub fn node_reparent(&mut self, child: Id<Node>, new_parent: Id<Node>) {
        for edge_id in self.graph.list_parent_edges(child.untyped()) {
            let Some(edge) = self.graph.edge(edge_id) else { continue };
            if edge.parent == ROOT_ID || edge.name != "children" {
                continue;
            }
            self.graph.disconnect(edge_id);
            break;
        }
        self.node_add_child(new_parent, child);
    }

    pub fn scene_add_node(&mut self, scene: Id<Scene>, node: Id<Node>) {
        self.graph.connect(scene.untyped(), node.untyped(), "children", EdgeAttributes::default());
    }

    pub fn scene_nodes(&self, scene: Id<Scene>) -> Vec<Id<Node>> {
        self.graph.list_child_edges_named(scene.untyped(), "children").into_iter().filter_map(|e| self.graph.edge(e)).map(|e| Id::from_untyped(e.child).unwrap()).collect()
    }

    pub fn root_set_default_scene(&mut self, scene: Option<Id<Scene>>) {
        self.reconnect_single(ROOT_ID, "scene", scene.map(Id::untyped));
    }

    pub fn root_default_scene(&self) -> Option<Id<Scene>> {
        self.graph.child_named(ROOT_ID, "scene").map(|id| Id::from_untyped(id).unwrap())
    }

    pub fn root_scenes(&self) -> Vec<Id<Scene>> {
        self.collection(PropertyType::Scene)
    }

    pub fn root_nodes(&self) -> Vec<Id<Node>> {
        self.collection(PropertyType::Node)
    }

    pub fn root_meshes(&self) -> Vec<Id<Mesh>> {
        self.collection(PropertyType::Mesh)
    }

    pub fn root_accessors(&self) -> Vec<Id<Accessor>> {
        self.collection(PropertyType::Accessor)
    }

    pub fn root_materials(&self) -> Vec<Id<Material>> {
        self.collection(PropertyType::Material)
    }

    pub fn root_textures(&self) -> Vec<Id<Texture>> {
        self.collection(PropertyType::Texture)
    }

    pub fn root_animations(&self) -> Vec<Id<Animation>> {
        self.collection(PropertyType::Animation)
    }

    pub fn root_skins(&self) -> Vec<Id<Skin>> {
        self.collection(PropertyType::Skin)
    }

    pub fn root_buffers(&self) -> Vec<Id<Buffer>> {
        self.collection(PropertyType::Buffer)
    }

    pub fn root_cameras(&self) -> Vec<Id<Camera>> {
        self.collection(PropertyType::Camera)
    }

    fn collection<T: Property>(&self, ty: PropertyType) -> Vec<Id<T>> {
        self.graph
            .list_child_edges_named(ROOT_ID, Self::collection_name(ty))
            .into_iter()
            .filter_map(|e| self.graph.edge(e))
            .filter_map(|e| Id::from_untyped(e.child))
            .collect()
    }

    pub fn mesh_primitives(&self, mesh: Id<Mesh>) -> Vec<Id<Primitive>> {
        self.graph.list_child_edges_named(mesh.untyped(), "primitives").into_iter().filter_map(|e| self.graph.edge(e)).map(|e| Id::from_untyped(e.child).unwrap()).collect()
    }

    pub fn primitive_set_attribute(&mut self, primitive: Id<Primitive>, semantic: &str, accessor: Id<Accessor>) {
        self.reconnect_single(primitive.untyped(), semantic, Some(accessor.untyped()));
    }

    pub fn primitive_attribute(&self, primitive: Id<Primitive>, semantic: &str) -> Option<Id<Accessor>> {
        self.graph.child_named(primitive.untyped(), semantic).map(|id| Id::from_untyped(id).unwrap())
    }

    pub fn primitive_set_indices(&mut self, primitive: Id<Primitive>, accessor: Option<Id<Accessor>>) {
        self.reconnect_single(primitive.untyped(), "indices", accessor.map(Id::untyped));
    }

    pub fn primitive_indices(&self, primitive: Id<Primitive>) -> Option<Id<Accessor>> {
        self.graph.child_named(primitive.untyped(), "indices").map(|id| Id::from_untyped(id).unwrap())
    }

    pub fn primitive_set_material(&mut self, primitive: Id<Primitive>, material: Option<Id<Material>>) {
        self.reconnect_single(primitive.untyped(), "material", material.map(Id::untyped));
    }

    pub fn primitive_material(&self, primitive: Id<Primitive>) -> Option<Id<Material>> {
        self.graph.child_named(primitive.untyped(), "material").map(|id| Id::from_untyped(id).unwrap())
    }

    pub fn skin_add_joint(&mut self, skin: Id<Skin>, joint: Id<Node>) {
        self.graph.connect(skin.untyped(), joint.untyped(), "joints", EdgeAttributes::default());
    }

    pub fn skin_joints(&self, skin: Id<Skin>) -> Vec<Id<Node>> {
        self.graph.list_child_edges_named(skin.untyped(), "joints").into_iter().filter_map(|e| self.graph.edge(e)).map(|e| Id::from_untyped(e.child).unwrap()).collect()
    }

    // --- Traversal, liveness, equality --------------------------------------

    /// Depth-first pre-order traversal of a scene's node tree, visiting
    /// each node once even if reachable via multiple parents.
    pub fn scene_traverse(&self, scene: Id<Scene>) -> Vec<Id<Node>> {
        let mut out = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut stack: Vec<Id<Node>> = self.scene_nodes(scene).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if !seen.insert(node) {
                continue;
            }
            out.push(node);
            let children = self.node_children(node);
            for child in children.into_iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// The world transform of `node` within `scene`, or `None` if `node`
    /// is not reachable from `scene`.
    pub fn world_matrix(&self, scene: Id<Scene>, target: Id<Node>) -> Option<[f32; 16]> {
        fn walk(doc: &Document, node: Id<Node>, target: Id<Node>, acc: [f32; 16]) -> Option<[f32; 16]> {
            let local = node::mul_matrix(acc, doc.node(node).local_matrix());
            if node == target {
                return Some(local);
            }
            for child in doc.node_children(node) {
                if let Some(m) = walk(doc, child, target, local) {
                    return Some(m);
                }
            }
            None
        }
        let identity = [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        for root in self.scene_nodes(scene) {
            if let Some(m) = walk(self, root, target, identity) {
                return Some(m);
            }
        }
        None
    }

    /// True if `id` has any parent edge other than its `Root` membership
    /// edge — i.e. some other property actually references it.
    pub fn is_used(&self, id: PropertyId) -> bool {
        self.graph.list_parents(id).into_iter().any(|p| p != ROOT_ID)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Disposes `id`, recursively disposing any exclusively owned children,
    /// and tombstones the corresponding typed arena slot(s).
    pub fn dispose(&mut self, id: PropertyId) {
        let mut queue = vec![id];
        while let Some(id) = queue.pop() {
            let owned = self.graph.dispose(id);
            self.tombstone(id);
            queue.extend(owned);
        }
    }

    fn tombstone(&mut self, id: PropertyId) {
        let index = id.index as usize;
        match id.ty {
            PropertyType::Scene => self.scenes[index] = None,
            PropertyType::Node => self.nodes[index] = None,
            PropertyType::Mesh => self.meshes[index] = None,
            PropertyType::Primitive => self.primitives[index] = None,
            PropertyType::Accessor => self.accessors[index] = None,
            PropertyType::Material => self.materials[index] = None,
            PropertyType::Texture => self.textures[index] = None,
            PropertyType::TextureInfo => self.texture_infos[index] = None,
            PropertyType::Animation => self.animations[index] = None,
            PropertyType::AnimationSampler => self.animation_samplers[index] = None,
            PropertyType::AnimationChannel => self.animation_channels[index] = None,
            PropertyType::Skin => self.skins[index] = None,
            PropertyType::Buffer => self.buffers[index] = None,
            PropertyType::Camera => self.cameras[index] = None,
            PropertyType::ExtensionProperty => self.extension_properties[index] = None,
            PropertyType::Root | PropertyType::Extension => {}
        }
    }

    // --- Extension registry (§4.C) ------------------------------------------

    /// Registers an extension as installed, without yet attaching it to
    /// any property.
    pub fn create_extension(&mut self, descriptor: ExtensionDescriptor) {
        self.extensions.install(descriptor);
    }

    pub fn set_extension_required(&mut self, name: &str, required: bool) {
        self.extensions.set_required(name, required);
    }

    /// Attaches extension `name`'s payload to `owner`, replacing any
    /// existing payload for that name. Fails if `name` was never
    /// registered via `create_extension`.
    pub fn set_extension(&mut self, owner: PropertyId, name: &str, value: serde_json::Value) -> Result<()> {
        if !self.extensions.is_installed(name) {
            return Err(Error::DependencyMissing(format!("extension '{name}' is not registered")));
        }
        let edge_name = extension::edge_name(name);
        if let Some(existing) = self.graph.child_named(owner, &edge_name) {
            self.extension_properties[existing.index as usize] = Some(ExtensionProperty { name: name.to_string(), value });
            return Ok(());
        }
        let index = self.extension_properties.len() as u32;
        self.extension_properties.push(Some(ExtensionProperty { name: name.to_string(), value }));
        let id = PropertyId::new(PropertyType::ExtensionProperty, index);
        self.graph.register(id);
        self.graph.connect_owned(owner, id, &edge_name, EdgeAttributes::default());
        Ok(())
    }

    pub fn get_extension(&self, owner: PropertyId, name: &str) -> Option<&serde_json::Value> {
        let edge_name = extension::edge_name(name);
        let id = self.graph.child_named(owner, &edge_name)?;
        self.extension_properties[id.index as usize].as_ref().map(|ext| &ext.value)
    }

    /// Every `(name, value)` extension payload attached to `owner`, in
    /// name-sorted order (spec §8 extension-order-stability).
    pub fn list_extensions(&self, owner: PropertyId) -> Vec<(&str, &serde_json::Value)> {
        let mut out: Vec<(&str, &serde_json::Value)> = self
            .graph
            .list_child_edges(owner)
            .into_iter()
            .filter_map(|e| self.graph.edge(e))
            .filter(|e| e.name.starts_with("extensions."))
            .filter_map(|e| self.extension_properties[e.child.index as usize].as_ref())
            .map(|ext| (ext.name.as_str(), &ext.value))
            .collect();
        out.sort_by_key(|(name, _)| *name);
        out
    }

    /// Copies the closure of `ids` (each plus everything it exclusively
    /// owns) into `dest`, returning the source→destination id map. Shared,
    /// non-owned references (e.g. a copied primitive's material) are left
    /// dangling unless their source id is also in `ids` — callers pass the
    /// full closure they want preserved.
    pub fn copy_to_document(&self, ids: &[PropertyId], dest: &mut Document) -> HashMap<PropertyId, PropertyId> {
        let mut map = HashMap::new();
        for &id in ids {
            self.copy_one(id, dest, &mut map);
        }
        map
    }

    fn copy_one(&self, id: PropertyId, dest: &mut Document, map: &mut HashMap<PropertyId, PropertyId>) -> PropertyId {
        if let Some(&existing) = map.get(&id) {
            return existing;
        }
        let new_id = match id.ty {
            PropertyType::Mesh => {
                let data = self.meshes[id.index as usize].clone().unwrap();
                dest.create_mesh(data).untyped()
            }
            PropertyType::Material => {
                let data = self.materials[id.index as usize].clone().unwrap();
                dest.create_material(data).untyped()
            }
            PropertyType::Texture => {
                let data = self.textures[id.index as usize].clone().unwrap();
                dest.create_texture(data).untyped()
            }
            PropertyType::Accessor => {
                let data = self.accessors[id.index as usize].clone().unwrap();
                dest.create_accessor(data).untyped()
            }
            PropertyType::Camera => {
                let data = self.cameras[id.index as usize].clone().unwrap();
                dest.create_camera(data).untyped()
            }
            PropertyType::Node => {
                let data = self.nodes[id.index as usize].clone().unwrap();
                dest.create_node(data).untyped()
            }
            PropertyType::Scene => {
                let data = self.scenes[id.index as usize].clone().unwrap();
                dest.create_scene(data).untyped()
            }
            _ => return id,
        };
        map.insert(id, new_id);

        for edge_id in self.graph.list_child_edges(id) {
            let edge = self.graph.edge(edge_id).unwrap().clone();
            let child = self.copy_one(edge.child, dest, map);
            if edge.owned {
                dest.graph.connect_owned(new_id, child, &edge.name, edge.attrs);
            } else {
                dest.graph.connect(new_id, child, &edge.name, edge.attrs);
            }
        }
        new_id
    }

    /// Moves `ids` into `dest`: copies them, then disposes the originals
    /// in `self`.
    pub fn move_to_document(&mut self, ids: &[PropertyId], dest: &mut Document) -> HashMap<PropertyId, PropertyId> {
        let map = self.copy_to_document(ids, dest);
        for &id in ids {
            self.dispose(id);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_mesh_registers_under_root() {
        let mut doc = Document::new();
        let mesh = doc.create_mesh(Mesh::default());
        assert_eq!(doc.root_meshes(), vec![mesh]);
    }

    #[test]
    fn node_reparent_moves_child_atomically() {
        let mut doc = Document::new();
        let a = doc.create_node(Node::default());
        let b = doc.create_node(Node::default());
        let child = doc.create_node(Node::default());
        doc.node_add_child(a, child);
        assert_eq!(doc.node_children(a), vec![child]);
        doc.node_reparent(child, b);
        assert!(doc.node_children(a).is_empty());
        assert_eq!(doc.node_children(b), vec![child]);
    }

    #[test]
    fn dispose_mesh_cascades_to_owned_primitives() {
        let mut doc = Document::new();
        let mesh = doc.create_mesh(Mesh::default());
        let prim = doc.create_primitive(mesh, Primitive::default());
        doc.dispose(mesh.untyped());
        assert!(!doc.graph.is_alive(prim.untyped()));
        assert!(doc.root_meshes().is_empty());
    }

    #[test]
    fn is_used_ignores_root_membership() {
        let mut doc = Document::new();
        let mesh = doc.create_mesh(Mesh::default());
        assert!(!doc.is_used(mesh.untyped()));
        let node = doc.create_node(Node::default());
        doc.node_set_mesh(node, Some(mesh));
        assert!(doc.is_used(mesh.untyped()));
    }

    #[test]
    fn scene_traverse_visits_nested_nodes_once() {
        let mut doc = Document::new();
        let scene = doc.create_scene(Scene::default());
        let root = doc.create_node(Node::default());
        let child = doc.create_node(Node::default());
        doc.scene_add_node(scene, root);
        doc.node_add_child(root, child);
        let order = doc.scene_traverse(scene);
        assert_eq!(order, vec![root, child]);
    }

    #[test]
    fn copy_to_document_preserves_mesh_primitive_ownership() {
        let mut src = Document::new();
        let mesh = src.create_mesh(Mesh::default());
        src.create_primitive(mesh, Primitive::default());

        let mut dest = Document::new();
        let map = src.copy_to_document(&[mesh.untyped()], &mut dest);
        let new_mesh: Id<Mesh> = Id::from_untyped(map[&mesh.untyped()]).unwrap();
        assert_eq!(dest.mesh_primitives(new_mesh).len(), 1);
    }
}
