//! The typed, reference-counted property graph substrate (spec §4.A).
//!
//! Properties are addressed by a stable [`PropertyId`] rather than a Rust
//! reference, following the arena-of-records redesign: a property never
//! moves, disposal tombstones its slot instead of freeing it, and every
//! reference between properties is a first-class [`Edge`] carrying a role
//! name and an attribute set, not a Rust pointer.

use std::collections::HashMap;
use std::marker::PhantomData;

/// Tags every concrete property type so that an untyped [`PropertyId`] can
/// be safely downcast back to a typed [`Id<T>`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PropertyType {
    Root,
    Scene,
    Node,
    Mesh,
    Primitive,
    Accessor,
    Material,
    Texture,
    TextureInfo,
    Animation,
    AnimationSampler,
    AnimationChannel,
    Skin,
    Buffer,
    Camera,
    Extension,
    ExtensionProperty,
}

/// An untyped reference to a property: its type tag plus its index into
/// that type's arena.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct PropertyId {
    pub ty: PropertyType,
    pub index: u32,
}

impl PropertyId {
    pub fn new(ty: PropertyType, index: u32) -> Self {
        PropertyId { ty, index }
    }
}

/// A compile-time-typed reference to a property of type `T`.
///
/// Mirrors the `gltf_json::Index<T>` newtype idiom, generalized to carry a
/// runtime type tag so it can round-trip through the untyped edge graph.
pub struct Id<T>(PropertyId, PhantomData<fn() -> T>);

impl<T> Id<T> {
    pub fn new(ty: PropertyType, index: u32) -> Self {
        Id(PropertyId::new(ty, index), PhantomData)
    }

    pub fn untyped(self) -> PropertyId {
        self.0
    }

    pub fn index(self) -> usize {
        self.0.index as usize
    }
}

/// Implemented by every concrete property type to name its tag in
/// [`PropertyType`].
pub trait Property {
    const TYPE: PropertyType;
}

impl<T: Property> Id<T> {
    /// Downcasts an untyped id, returning `None` if the tag doesn't match.
    pub fn from_untyped(id: PropertyId) -> Option<Self> {
        if id.ty == T::TYPE {
            Some(Id(id, PhantomData))
        } else {
            None
        }
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Id({:?}, {})", self.0.ty, self.0.index)
    }
}

/// Edge attributes the core relies on (spec §4.A).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EdgeAttributes {
    /// Bitset of texture channels (R=1, G=2, B=4, A=8) actually sampled
    /// through this edge, accumulated over every edge referencing the
    /// same texture.
    pub channels: u8,

    /// The edge consumes its child as a color-space-bearing resource
    /// (drives sRGB vs. linear decisions).
    pub is_color: bool,

    /// The edge may be retargeted by an animation pointer; such children
    /// are ineligible for equality-based deduplication.
    pub modify_child: bool,
}

pub const CHANNEL_R: u8 = 0b0001;
pub const CHANNEL_G: u8 = 0b0010;
pub const CHANNEL_B: u8 = 0b0100;
pub const CHANNEL_A: u8 = 0b1000;

/// A reference from `parent` to `child`, carrying a role name and
/// attributes.
#[derive(Clone, Debug)]
pub struct Edge {
    pub parent: PropertyId,
    pub child: PropertyId,
    pub name: String,
    pub attrs: EdgeAttributes,
    /// True when disposing `parent` must recursively dispose `child`
    /// (e.g. a `Mesh` owns its `Primitive`s).
    pub owned: bool,
}

pub type EdgeId = u32;

/// The edge graph shared by every property in a document. Each property
/// also keeps its own out-edge list (via `out`) so that `swap` touches
/// only the edges incident to one property, not the whole graph.
#[derive(Default)]
pub struct Graph {
    edges: Vec<Option<Edge>>,
    out: HashMap<PropertyId, Vec<EdgeId>>,
    incoming: HashMap<PropertyId, Vec<EdgeId>>,
    alive: HashMap<PropertyId, bool>,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }

    /// Registers a freshly allocated property as alive.
    pub fn register(&mut self, id: PropertyId) {
        self.alive.insert(id, true);
        self.out.entry(id).or_default();
        self.incoming.entry(id).or_default();
    }

    pub fn is_alive(&self, id: PropertyId) -> bool {
        self.alive.get(&id).copied().unwrap_or(false)
    }

    /// Creates an edge `(parent, child, name, attrs)`. Not exclusive.
    pub fn connect(&mut self, parent: PropertyId, child: PropertyId, name: &str, attrs: EdgeAttributes) -> EdgeId {
        self.connect_inner(parent, child, name, attrs, false)
    }

    /// Creates an edge whose child is exclusively owned by `parent`:
    /// disposing `parent` recursively disposes `child`.
    pub fn connect_owned(&mut self, parent: PropertyId, child: PropertyId, name: &str, attrs: EdgeAttributes) -> EdgeId {
        self.connect_inner(parent, child, name, attrs, true)
    }

    fn connect_inner(&mut self, parent: PropertyId, child: PropertyId, name: &str, attrs: EdgeAttributes, owned: bool) -> EdgeId {
        let id = self.edges.len() as EdgeId;
        self.edges.push(Some(Edge { parent, child, name: name.to_string(), attrs, owned }));
        self.out.entry(parent).or_default().push(id);
        self.incoming.entry(child).or_default().push(id);
        id
    }

    /// Detaches a single edge.
    pub fn disconnect(&mut self, edge_id: EdgeId) {
        let edge = match self.edges.get_mut(edge_id as usize).and_then(Option::take) {
            Some(edge) => edge,
            None => return,
        };
        if let Some(list) = self.out.get_mut(&edge.parent) {
            list.retain(|&e| e != edge_id);
        }
        if let Some(list) = self.incoming.get_mut(&edge.child) {
            list.retain(|&e| e != edge_id);
        }
    }

    pub fn edge(&self, edge_id: EdgeId) -> Option<&Edge> {
        self.edges.get(edge_id as usize).and_then(Option::as_ref)
    }

    pub fn edge_mut(&mut self, edge_id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(edge_id as usize).and_then(Option::as_mut)
    }

    /// Lists outbound edges of `parent`, in creation order.
    pub fn list_child_edges(&self, parent: PropertyId) -> Vec<EdgeId> {
        self.out.get(&parent).cloned().unwrap_or_default()
    }

    /// Lists outbound edges of `parent` named `name`, in creation order.
    pub fn list_child_edges_named(&self, parent: PropertyId, name: &str) -> Vec<EdgeId> {
        self.list_child_edges(parent)
            .into_iter()
            .filter(|&e| self.edge(e).map(|edge| edge.name == name).unwrap_or(false))
            .collect()
    }

    /// Returns the single child reached by the first edge of `parent`
    /// named `name`.
    pub fn child_named(&self, parent: PropertyId, name: &str) -> Option<PropertyId> {
        self.list_child_edges_named(parent, name)
            .first()
            .and_then(|&e| self.edge(e))
            .map(|edge| edge.child)
    }

    /// Lists inbound edges of `child`, in creation order.
    pub fn list_parent_edges(&self, child: PropertyId) -> Vec<EdgeId> {
        self.incoming.get(&child).cloned().unwrap_or_default()
    }

    pub fn list_children(&self, parent: PropertyId) -> Vec<PropertyId> {
        self.list_child_edges(parent)
            .into_iter()
            .filter_map(|e| self.edge(e).map(|edge| edge.child))
            .collect()
    }

    pub fn list_parents(&self, child: PropertyId) -> Vec<PropertyId> {
        self.list_parent_edges(child)
            .into_iter()
            .filter_map(|e| self.edge(e).map(|edge| edge.parent))
            .collect()
    }

    /// Replaces every edge `(parent, old_child, _, _)` with an edge to
    /// `new_child`, preserving name/attrs/ownership. An atomic redirect
    /// used extensively by transforms.
    pub fn swap(&mut self, parent: PropertyId, old_child: PropertyId, new_child: PropertyId) {
        let edges = self.list_child_edges(parent);
        for edge_id in edges {
            let matches = self.edge(edge_id).map(|e| e.child == old_child).unwrap_or(false);
            if !matches {
                continue;
            }
            if let Some(list) = self.incoming.get_mut(&old_child) {
                list.retain(|&e| e != edge_id);
            }
            self.incoming.entry(new_child).or_default().push(edge_id);
            if let Some(edge) = self.edge_mut(edge_id) {
                edge.child = new_child;
            }
        }
    }

    /// Disposes `id`: detaches every incident edge (both directions) and
    /// returns the children it exclusively owned, so the caller can
    /// recursively dispose their typed data too.
    pub fn dispose(&mut self, id: PropertyId) -> Vec<PropertyId> {
        let owned_children: Vec<PropertyId> = self
            .list_child_edges(id)
            .into_iter()
            .filter_map(|e| self.edge(e))
            .filter(|e| e.owned)
            .map(|e| e.child)
            .collect();

        for edge_id in self.list_child_edges(id) {
            self.disconnect(edge_id);
        }
        for edge_id in self.list_parent_edges(id) {
            self.disconnect(edge_id);
        }
        self.out.remove(&id);
        self.incoming.remove(&id);
        self.alive.insert(id, false);

        owned_children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(ty: PropertyType, index: u32) -> PropertyId {
        PropertyId::new(ty, index)
    }

    #[test]
    fn connect_and_list() {
        let mut graph = Graph::new();
        let root = pid(PropertyType::Root, 0);
        let mesh = pid(PropertyType::Mesh, 0);
        graph.register(root);
        graph.register(mesh);
        graph.connect(root, mesh, "meshes", EdgeAttributes::default());
        assert_eq!(graph.list_children(root), vec![mesh]);
        assert_eq!(graph.list_parents(mesh), vec![root]);
    }

    #[test]
    fn swap_redirects_edges() {
        let mut graph = Graph::new();
        let prim = pid(PropertyType::Primitive, 0);
        let a = pid(PropertyType::Accessor, 0);
        let b = pid(PropertyType::Accessor, 1);
        for id in [prim, a, b] {
            graph.register(id);
        }
        graph.connect(prim, a, "POSITION", EdgeAttributes::default());
        graph.swap(prim, a, b);
        assert_eq!(graph.list_children(prim), vec![b]);
        assert!(graph.list_parents(a).is_empty());
        assert_eq!(graph.list_parents(b), vec![prim]);
    }

    #[test]
    fn dispose_detaches_edges_and_returns_owned_children() {
        let mut graph = Graph::new();
        let mesh = pid(PropertyType::Mesh, 0);
        let prim = pid(PropertyType::Primitive, 0);
        let root = pid(PropertyType::Root, 0);
        for id in [root, mesh, prim] {
            graph.register(id);
        }
        graph.connect(root, mesh, "meshes", EdgeAttributes::default());
        graph.connect_owned(mesh, prim, "primitives", EdgeAttributes::default());

        let owned = graph.dispose(mesh);
        assert_eq!(owned, vec![prim]);
        assert!(!graph.is_alive(mesh));
        assert!(graph.list_children(root).is_empty());
        assert!(graph.list_parents(prim).is_empty());
    }
}
