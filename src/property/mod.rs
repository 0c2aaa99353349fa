//! Concrete property types that make up the document graph (spec §3, §4.B).
//!
//! Each `*Data` struct holds only the scalar fields of its property;
//! every reference to another property (child or sibling) is expressed as
//! a [`crate::graph::Edge`] rather than a field, so [`crate::graph::Graph`]
//! remains the single source of truth for "what points to what."

pub mod accessor;
pub mod animation;
pub mod buffer;
pub mod camera;
pub mod material;
pub mod mesh;
pub mod node;
pub mod primitive;
pub mod root;
pub mod scene;
pub mod skin;
pub mod texture;
pub mod texture_info;

pub use accessor::{Accessor, ComponentType, Sparse, Type as AccessorType};
pub use animation::{Animation, AnimationChannel, AnimationSampler, Interpolation, TargetPath};
pub use buffer::Buffer;
pub use camera::{Camera, Projection};
pub use material::{AlphaMode, Material};
pub use mesh::Mesh;
pub use node::Node;
pub use primitive::{Mode, Primitive};
pub use root::{Asset, Root};
pub use scene::Scene;
pub use skin::Skin;
pub use texture::{MagFilter, MinFilter, Texture, WrappingMode};
pub use texture_info::TextureInfo;

use crate::graph::PropertyType;

macro_rules! impl_property {
    ($ty:ty, $tag:ident) => {
        impl crate::graph::Property for $ty {
            const TYPE: PropertyType = PropertyType::$tag;
        }
    };
}

impl_property!(Root, Root);
impl_property!(Scene, Scene);
impl_property!(Node, Node);
impl_property!(Mesh, Mesh);
impl_property!(Primitive, Primitive);
impl_property!(Accessor, Accessor);
impl_property!(Material, Material);
impl_property!(Texture, Texture);
impl_property!(TextureInfo, TextureInfo);
impl_property!(Animation, Animation);
impl_property!(AnimationSampler, AnimationSampler);
impl_property!(AnimationChannel, AnimationChannel);
impl_property!(Skin, Skin);
impl_property!(Buffer, Buffer);
impl_property!(Camera, Camera);

/// Extra application data attached to a property, carried through
/// verbatim on read/write. Present on every property type.
pub type Extras = Option<serde_json::Value>;
