//! JSON {en,de}coding: translates between the in-memory [`crate::Document`]
//! graph and [`gltf_json::Root`], and drives GLB/.gltf read and write
//! through a [`Source`].
//!
//! Every accessor is packed into a single dense, non-interleaved buffer on
//! write — each gets its own `bufferView`, the simplest binary layout that
//! round-trips correctly. Sparse accessors are always written fully
//! materialized; the `sparse` JSON field is produced only by readers of
//! third-party assets, never emitted on write.

pub mod glb;
pub mod source;

pub use source::{FsIo, Source};

use std::collections::{BTreeMap, HashMap};

use gltf_json::accessor::{GenericComponentType, IndexComponentType};
use gltf_json::validation::{Checked, USize64};

use crate::error::{Error, Result};
use crate::extension::ExtensionDescriptor;
use crate::graph::{EdgeAttributes, Id, PropertyId};
use crate::json;
use crate::property::{
    Accessor, AccessorType, AlphaMode, Animation, AnimationChannel, AnimationSampler, Asset,
    Camera, ComponentType, Interpolation, MagFilter, Material, Mesh, MinFilter, Mode, Node,
    Primitive, Projection, Scene, Skin, Sparse, TargetPath, Texture, WrappingMode,
};
use crate::Document;

// --- enum conversions ------------------------------------------------------

fn component_type_to_json(c: ComponentType) -> json::accessor::ComponentType {
    match c {
        ComponentType::I8 => json::accessor::ComponentType::I8,
        ComponentType::U8 => json::accessor::ComponentType::U8,
        ComponentType::I16 => json::accessor::ComponentType::I16,
        ComponentType::U16 => json::accessor::ComponentType::U16,
        ComponentType::U32 => json::accessor::ComponentType::U32,
        ComponentType::F32 => json::accessor::ComponentType::F32,
    }
}

fn component_type_from_json(c: json::accessor::ComponentType) -> ComponentType {
    match c {
        json::accessor::ComponentType::I8 => ComponentType::I8,
        json::accessor::ComponentType::U8 => ComponentType::U8,
        json::accessor::ComponentType::I16 => ComponentType::I16,
        json::accessor::ComponentType::U16 => ComponentType::U16,
        json::accessor::ComponentType::U32 => ComponentType::U32,
        json::accessor::ComponentType::F32 => ComponentType::F32,
    }
}

fn accessor_type_to_json(t: AccessorType) -> json::accessor::Type {
    match t {
        AccessorType::Scalar => json::accessor::Type::Scalar,
        AccessorType::Vec2 => json::accessor::Type::Vec2,
        AccessorType::Vec3 => json::accessor::Type::Vec3,
        AccessorType::Vec4 => json::accessor::Type::Vec4,
        AccessorType::Mat2 => json::accessor::Type::Mat2,
        AccessorType::Mat3 => json::accessor::Type::Mat3,
        AccessorType::Mat4 => json::accessor::Type::Mat4,
    }
}

fn accessor_type_from_json(t: json::accessor::Type) -> AccessorType {
    match t {
        json::accessor::Type::Scalar => AccessorType::Scalar,
        json::accessor::Type::Vec2 => AccessorType::Vec2,
        json::accessor::Type::Vec3 => AccessorType::Vec3,
        json::accessor::Type::Vec4 => AccessorType::Vec4,
        json::accessor::Type::Mat2 => AccessorType::Mat2,
        json::accessor::Type::Mat3 => AccessorType::Mat3,
        json::accessor::Type::Mat4 => AccessorType::Mat4,
    }
}

fn mode_to_json(m: Mode) -> json::mesh::Mode {
    match m {
        Mode::Points => json::mesh::Mode::Points,
        Mode::Lines => json::mesh::Mode::Lines,
        Mode::LineLoop => json::mesh::Mode::LineLoop,
        Mode::LineStrip => json::mesh::Mode::LineStrip,
        Mode::Triangles => json::mesh::Mode::Triangles,
        Mode::TriangleStrip => json::mesh::Mode::TriangleStrip,
        Mode::TriangleFan => json::mesh::Mode::TriangleFan,
    }
}

fn mode_from_json(m: json::mesh::Mode) -> Mode {
    match m {
        json::mesh::Mode::Points => Mode::Points,
        json::mesh::Mode::Lines => Mode::Lines,
        json::mesh::Mode::LineLoop => Mode::LineLoop,
        json::mesh::Mode::LineStrip => Mode::LineStrip,
        json::mesh::Mode::Triangles => Mode::Triangles,
        json::mesh::Mode::TriangleStrip => Mode::TriangleStrip,
        json::mesh::Mode::TriangleFan => Mode::TriangleFan,
    }
}

fn alpha_mode_to_json(m: AlphaMode) -> json::material::AlphaMode {
    match m {
        AlphaMode::Opaque => json::material::AlphaMode::Opaque,
        AlphaMode::Mask => json::material::AlphaMode::Mask,
        AlphaMode::Blend => json::material::AlphaMode::Blend,
    }
}

fn alpha_mode_from_json(m: json::material::AlphaMode) -> AlphaMode {
    match m {
        json::material::AlphaMode::Opaque => AlphaMode::Opaque,
        json::material::AlphaMode::Mask => AlphaMode::Mask,
        json::material::AlphaMode::Blend => AlphaMode::Blend,
    }
}

fn interpolation_to_json(i: Interpolation) -> json::animation::Interpolation {
    match i {
        Interpolation::Linear => json::animation::Interpolation::Linear,
        Interpolation::Step => json::animation::Interpolation::Step,
        Interpolation::CubicSpline => json::animation::Interpolation::CubicSpline,
    }
}

fn interpolation_from_json(i: json::animation::Interpolation) -> Interpolation {
    match i {
        json::animation::Interpolation::Linear => Interpolation::Linear,
        json::animation::Interpolation::Step => Interpolation::Step,
        json::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
    }
}

fn target_path_to_json(p: TargetPath) -> json::animation::Property {
    match p {
        TargetPath::Translation => json::animation::Property::Translation,
        TargetPath::Rotation => json::animation::Property::Rotation,
        TargetPath::Scale => json::animation::Property::Scale,
        TargetPath::Weights => json::animation::Property::MorphTargetWeights,
    }
}

fn target_path_from_json(p: json::animation::Property) -> TargetPath {
    match p {
        json::animation::Property::Translation => TargetPath::Translation,
        json::animation::Property::Rotation => TargetPath::Rotation,
        json::animation::Property::Scale => TargetPath::Scale,
        json::animation::Property::MorphTargetWeights => TargetPath::Weights,
    }
}

fn mag_filter_to_json(m: MagFilter) -> json::texture::MagFilter {
    match m {
        MagFilter::Nearest => json::texture::MagFilter::Nearest,
        MagFilter::Linear => json::texture::MagFilter::Linear,
    }
}

fn mag_filter_from_json(m: json::texture::MagFilter) -> MagFilter {
    match m {
        json::texture::MagFilter::Nearest => MagFilter::Nearest,
        json::texture::MagFilter::Linear => MagFilter::Linear,
    }
}

fn min_filter_to_json(m: MinFilter) -> json::texture::MinFilter {
    match m {
        MinFilter::Nearest => json::texture::MinFilter::Nearest,
        MinFilter::Linear => json::texture::MinFilter::Linear,
        MinFilter::NearestMipmapNearest => json::texture::MinFilter::NearestMipmapNearest,
        MinFilter::LinearMipmapNearest => json::texture::MinFilter::LinearMipmapNearest,
        MinFilter::NearestMipmapLinear => json::texture::MinFilter::NearestMipmapLinear,
        MinFilter::LinearMipmapLinear => json::texture::MinFilter::LinearMipmapLinear,
    }
}

fn min_filter_from_json(m: json::texture::MinFilter) -> MinFilter {
    match m {
        json::texture::MinFilter::Nearest => MinFilter::Nearest,
        json::texture::MinFilter::Linear => MinFilter::Linear,
        json::texture::MinFilter::NearestMipmapNearest => MinFilter::NearestMipmapNearest,
        json::texture::MinFilter::LinearMipmapNearest => MinFilter::LinearMipmapNearest,
        json::texture::MinFilter::NearestMipmapLinear => MinFilter::NearestMipmapLinear,
        json::texture::MinFilter::LinearMipmapLinear => MinFilter::LinearMipmapLinear,
    }
}

fn wrapping_to_json(w: WrappingMode) -> json::texture::WrappingMode {
    match w {
        WrappingMode::ClampToEdge => json::texture::WrappingMode::ClampToEdge,
        WrappingMode::MirroredRepeat => json::texture::WrappingMode::MirroredRepeat,
        WrappingMode::Repeat => json::texture::WrappingMode::Repeat,
    }
}

fn wrapping_from_json(w: json::texture::WrappingMode) -> WrappingMode {
    match w {
        json::texture::WrappingMode::ClampToEdge => WrappingMode::ClampToEdge,
        json::texture::WrappingMode::MirroredRepeat => WrappingMode::MirroredRepeat,
        json::texture::WrappingMode::Repeat => WrappingMode::Repeat,
    }
}

// --- extras / extensions / semantic helpers --------------------------------

fn extras_to_json(extras: &crate::property::Extras) -> json::Extras {
    extras.as_ref().and_then(|v| serde_json::value::to_raw_value(v).ok())
}

fn extras_from_json(extras: &json::Extras) -> crate::property::Extras {
    extras.as_ref().and_then(|raw| serde_json::from_str(raw.get()).ok())
}

fn extensions_map(doc: &Document, id: PropertyId) -> Option<serde_json::Map<String, serde_json::Value>> {
    let list = doc.list_extensions(id);
    if list.is_empty() {
        return None;
    }
    let mut map = serde_json::Map::new();
    for (name, value) in list {
        map.insert(name.to_string(), value.clone());
    }
    Some(map)
}

fn import_extensions(
    doc: &mut Document,
    owner: PropertyId,
    extensions: &Option<serde_json::Map<String, serde_json::Value>>,
) -> Result<()> {
    let Some(map) = extensions else { return Ok(()) };
    for (name, value) in map {
        if !doc.extensions.is_installed(name) {
            doc.create_extension(ExtensionDescriptor::new(name.clone()));
        }
        doc.set_extension(owner, name, value.clone())?;
    }
    Ok(())
}

fn semantic_to_edge_name(sem: &json::mesh::Semantic) -> String {
    sem.to_string()
}

fn edge_name_to_semantic(name: &str) -> Option<json::mesh::Semantic> {
    let value = serde_json::Value::String(name.to_string());
    match serde_json::from_value::<Checked<json::mesh::Semantic>>(value).ok()? {
        Checked::Valid(s) => Some(s),
        Checked::Invalid => None,
    }
}

/// A primitive's vertex-attribute edges: every child edge whose name isn't
/// `"indices"`/`"material"` or a morph-target edge.
fn primitive_attributes(doc: &Document, prim: Id<Primitive>) -> Vec<(String, Id<Accessor>)> {
    doc.graph()
        .list_child_edges(prim.untyped())
        .into_iter()
        .filter_map(|e| doc.graph().edge(e))
        .filter(|e| e.name != "indices" && !e.name.starts_with("morphTarget"))
        .filter_map(|e| Id::<Accessor>::from_untyped(e.child).map(|id| (e.name.clone(), id)))
        .collect()
}

fn push_buffer_view(
    bin: &mut Vec<u8>,
    buffer_views: &mut Vec<json::buffer::View>,
    data: &[u8],
) -> json::Index<json::buffer::View> {
    while bin.len() % 4 != 0 {
        bin.push(0);
    }
    let offset = bin.len();
    bin.extend_from_slice(data);
    buffer_views.push(json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: USize64(data.len() as u64),
        byte_offset: Some(USize64(offset as u64)),
        byte_stride: None,
        name: None,
        target: None,
        extensions: None,
        extras: Default::default(),
    });
    json::Index::new((buffer_views.len() - 1) as u32)
}

fn read_view<'a>(buffers: &'a [Vec<u8>], view: &json::buffer::View) -> Result<&'a [u8]> {
    let buf = buffers
        .get(view.buffer.value())
        .ok_or_else(|| Error::Validation("bufferView references a missing buffer".to_string()))?;
    let offset = view.byte_offset.map(|o| o.value()).unwrap_or(0);
    let len = view.byte_length.value();
    buf.get(offset..offset + len)
        .ok_or_else(|| Error::Validation("bufferView range exceeds its buffer".to_string()))
}

fn read_index_value(bytes: &[u8], ctype: ComponentType) -> u32 {
    match ctype {
        ComponentType::U8 => bytes[0] as u32,
        ComponentType::U16 => u16::from_le_bytes([bytes[0], bytes[1]]) as u32,
        ComponentType::U32 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        _ => unreachable!("sparse/primitive indices are always unsigned"),
    }
}

// --- Document -> gltf_json::Root --------------------------------------------

/// Flattens a [`Document`] into a [`gltf_json::Root`] plus the single packed
/// binary blob its accessors and images reference.
pub fn document_to_json(doc: &Document) -> (json::Root, Vec<u8>) {
    let mut bin = Vec::new();
    let mut buffer_views = Vec::new();
    let mut images = Vec::new();
    let mut samplers = Vec::new();

    let accessor_ids = doc.root_accessors();
    let accessor_index: HashMap<Id<Accessor>, u32> =
        accessor_ids.iter().enumerate().map(|(i, &id)| (id, i as u32)).collect();
    let accessors: Vec<json::Accessor> = accessor_ids
        .iter()
        .map(|&id| accessor_to_json(doc, id, &mut bin, &mut buffer_views))
        .collect();

    let texture_ids = doc.root_textures();
    let texture_index: HashMap<Id<Texture>, u32> =
        texture_ids.iter().enumerate().map(|(i, &id)| (id, i as u32)).collect();
    let textures: Vec<json::Texture> = texture_ids
        .iter()
        .map(|&id| texture_to_json(doc, id, &mut bin, &mut buffer_views, &mut images, &mut samplers))
        .collect();

    let material_ids = doc.root_materials();
    let material_index: HashMap<Id<Material>, u32> =
        material_ids.iter().enumerate().map(|(i, &id)| (id, i as u32)).collect();
    let materials: Vec<json::Material> =
        material_ids.iter().map(|&id| material_to_json(doc, id, &texture_index)).collect();

    let mesh_ids = doc.root_meshes();
    let mesh_index: HashMap<Id<Mesh>, u32> =
        mesh_ids.iter().enumerate().map(|(i, &id)| (id, i as u32)).collect();
    let meshes: Vec<json::Mesh> = mesh_ids
        .iter()
        .map(|&id| mesh_to_json(doc, id, &accessor_index, &material_index))
        .collect();

    let camera_ids = doc.root_cameras();
    let camera_index: HashMap<Id<Camera>, u32> =
        camera_ids.iter().enumerate().map(|(i, &id)| (id, i as u32)).collect();
    let cameras: Vec<json::Camera> = camera_ids.iter().map(|&id| camera_to_json(doc, id)).collect();

    let node_ids = doc.root_nodes();
    let node_index: HashMap<Id<Node>, u32> =
        node_ids.iter().enumerate().map(|(i, &id)| (id, i as u32)).collect();

    let skin_ids = doc.root_skins();
    let skin_index: HashMap<Id<Skin>, u32> =
        skin_ids.iter().enumerate().map(|(i, &id)| (id, i as u32)).collect();
    let skins: Vec<json::Skin> = skin_ids
        .iter()
        .map(|&id| skin_to_json(doc, id, &accessor_index, &node_index))
        .collect();

    let nodes: Vec<json::Node> = node_ids
        .iter()
        .map(|&id| node_to_json(doc, id, &mesh_index, &camera_index, &skin_index, &node_index))
        .collect();

    let scene_ids = doc.root_scenes();
    let scene_index: HashMap<Id<Scene>, u32> =
        scene_ids.iter().enumerate().map(|(i, &id)| (id, i as u32)).collect();
    let scenes: Vec<json::Scene> =
        scene_ids.iter().map(|&id| scene_to_json(doc, id, &node_index)).collect();

    let animations: Vec<json::Animation> = doc
        .root_animations()
        .iter()
        .map(|&id| animation_to_json(doc, id, &accessor_index, &node_index))
        .collect();

    let buffers = if bin.is_empty() {
        Vec::new()
    } else {
        vec![json::Buffer {
            byte_length: USize64(bin.len() as u64),
            name: None,
            uri: None,
            extensions: None,
            extras: Default::default(),
        }]
    };

    let scene = doc.root_default_scene().map(|id| json::Index::new(scene_index[&id]));

    let root = json::Root {
        accessors,
        animations,
        asset: json::Asset {
            copyright: doc.root().asset.copyright.clone(),
            extensions: None,
            extras: Default::default(),
            generator: doc.root().asset.generator.clone(),
            min_version: None,
            version: doc.root().asset.version.clone(),
        },
        buffers,
        buffer_views,
        scene,
        extensions: extensions_map(doc, doc.root_id()),
        extras: Default::default(),
        extensions_used: doc.extensions.used_sorted(),
        extensions_required: doc.extensions.required_sorted(),
        cameras,
        images,
        materials,
        meshes,
        nodes,
        samplers,
        scenes,
        skins,
        textures,
    };

    (root, bin)
}

fn accessor_to_json(
    doc: &Document,
    id: Id<Accessor>,
    bin: &mut Vec<u8>,
    buffer_views: &mut Vec<json::buffer::View>,
) -> json::Accessor {
    let acc = doc.accessor(id);
    let view = push_buffer_view(bin, buffer_views, &acc.data);
    json::Accessor {
        buffer_view: Some(view),
        byte_offset: None,
        count: USize64(acc.count as u64),
        component_type: Checked::Valid(GenericComponentType(component_type_to_json(acc.component_type))),
        extensions: extensions_map(doc, id.untyped()),
        extras: extras_to_json(&acc.extras),
        type_: Checked::Valid(accessor_type_to_json(acc.type_)),
        min: acc.min.as_ref().and_then(|v| serde_json::to_value(v).ok()),
        max: acc.max.as_ref().and_then(|v| serde_json::to_value(v).ok()),
        name: acc.name.clone(),
        normalized: acc.normalized,
        sparse: None,
    }
}

fn texture_to_json(
    doc: &Document,
    id: Id<Texture>,
    bin: &mut Vec<u8>,
    buffer_views: &mut Vec<json::buffer::View>,
    images: &mut Vec<json::image::Image>,
    samplers: &mut Vec<json::texture::Sampler>,
) -> json::Texture {
    let tex = doc.texture(id);
    let source = if let Some(data) = &tex.data {
        let view = push_buffer_view(bin, buffer_views, data);
        images.push(json::image::Image {
            buffer_view: Some(view),
            mime_type: tex.mime_type.clone().map(json::image::MimeType),
            name: None,
            uri: None,
            extensions: None,
            extras: Default::default(),
        });
        json::Index::new((images.len() - 1) as u32)
    } else {
        json::Index::new(u32::MAX)
    };

    let needs_sampler = tex.mag_filter.is_some()
        || tex.min_filter.is_some()
        || tex.wrap_s != WrappingMode::Repeat
        || tex.wrap_t != WrappingMode::Repeat;
    let sampler = if needs_sampler {
        samplers.push(json::texture::Sampler {
            mag_filter: tex.mag_filter.map(|m| Checked::Valid(mag_filter_to_json(m))),
            min_filter: tex.min_filter.map(|m| Checked::Valid(min_filter_to_json(m))),
            name: None,
            wrap_s: Checked::Valid(wrapping_to_json(tex.wrap_s)),
            wrap_t: Checked::Valid(wrapping_to_json(tex.wrap_t)),
            extensions: None,
            extras: Default::default(),
        });
        Some(json::Index::new((samplers.len() - 1) as u32))
    } else {
        None
    };

    json::Texture {
        name: tex.name.clone(),
        sampler,
        source,
        extensions: extensions_map(doc, id.untyped()),
        extras: extras_to_json(&tex.extras),
    }
}

fn texture_info_to_json(
    doc: &Document,
    info_id: Id<crate::property::TextureInfo>,
    texture_index: &HashMap<Id<Texture>, u32>,
) -> json::texture::Info {
    let info = doc.texture_info(info_id);
    let texture_id = doc
        .texture_info_texture(info_id)
        .expect("texture info always references a texture");
    json::texture::Info {
        index: json::Index::new(texture_index[&texture_id]),
        tex_coord: info.tex_coord,
        extensions: None,
        extras: extras_to_json(&info.extras),
    }
}

fn material_to_json(doc: &Document, id: Id<Material>, texture_index: &HashMap<Id<Texture>, u32>) -> json::Material {
    let mat = doc.material(id);
    let mut pbr = json::material::PbrMetallicRoughness {
        base_color_factor: json::material::PbrBaseColorFactor(mat.base_color_factor),
        metallic_factor: json::material::StrengthFactor(mat.metallic_factor),
        roughness_factor: json::material::StrengthFactor(mat.roughness_factor),
        ..Default::default()
    };
    if let Some(info_id) = doc.material_texture_info(id, "baseColorTexture") {
        pbr.base_color_texture = Some(texture_info_to_json(doc, info_id, texture_index));
    }
    if let Some(info_id) = doc.material_texture_info(id, "metallicRoughnessTexture") {
        pbr.metallic_roughness_texture = Some(texture_info_to_json(doc, info_id, texture_index));
    }

    let normal_texture = doc.material_texture_info(id, "normalTexture").map(|info_id| {
        let info = doc.texture_info(info_id);
        let texture_id = doc
            .texture_info_texture(info_id)
            .expect("texture info always references a texture");
        json::material::NormalTexture {
            index: json::Index::new(texture_index[&texture_id]),
            scale: info.scale_or_strength.unwrap_or(1.0),
            tex_coord: info.tex_coord,
            extensions: None,
            extras: extras_to_json(&info.extras),
        }
    });
    let occlusion_texture = doc.material_texture_info(id, "occlusionTexture").map(|info_id| {
        let info = doc.texture_info(info_id);
        let texture_id = doc
            .texture_info_texture(info_id)
            .expect("texture info always references a texture");
        json::material::OcclusionTexture {
            index: json::Index::new(texture_index[&texture_id]),
            strength: json::material::StrengthFactor(info.scale_or_strength.unwrap_or(1.0)),
            tex_coord: info.tex_coord,
            extensions: None,
            extras: extras_to_json(&info.extras),
        }
    });
    let emissive_texture = doc
        .material_texture_info(id, "emissiveTexture")
        .map(|info_id| texture_info_to_json(doc, info_id, texture_index));

    json::Material {
        alpha_cutoff: Some(json::material::AlphaCutoff(mat.alpha_cutoff)),
        alpha_mode: Checked::Valid(alpha_mode_to_json(mat.alpha_mode)),
        double_sided: mat.double_sided,
        name: mat.name.clone(),
        pbr_metallic_roughness: pbr,
        normal_texture,
        occlusion_texture,
        emissive_texture,
        emissive_factor: json::material::EmissiveFactor(mat.emissive_factor),
        extensions: extensions_map(doc, id.untyped()),
        extras: extras_to_json(&mat.extras),
    }
}

fn mesh_to_json(
    doc: &Document,
    id: Id<Mesh>,
    accessor_index: &HashMap<Id<Accessor>, u32>,
    material_index: &HashMap<Id<Material>, u32>,
) -> json::Mesh {
    let mesh = doc.mesh(id);
    let primitives = doc
        .mesh_primitives(id)
        .iter()
        .map(|&prim_id| primitive_to_json(doc, prim_id, accessor_index, material_index))
        .collect();
    json::Mesh {
        extensions: extensions_map(doc, id.untyped()),
        extras: extras_to_json(&mesh.extras),
        name: mesh.name.clone(),
        primitives,
        weights: if mesh.weights.is_empty() { None } else { Some(mesh.weights.clone()) },
    }
}

fn primitive_to_json(
    doc: &Document,
    id: Id<Primitive>,
    accessor_index: &HashMap<Id<Accessor>, u32>,
    material_index: &HashMap<Id<Material>, u32>,
) -> json::mesh::Primitive {
    let prim = doc.primitive(id);
    let mut attributes = BTreeMap::new();
    for (edge_name, accessor_id) in primitive_attributes(doc, id) {
        if let Some(sem) = edge_name_to_semantic(&edge_name) {
            attributes.insert(Checked::Valid(sem), json::Index::new(accessor_index[&accessor_id]));
        }
    }
    let indices = doc.primitive_indices(id).map(|a| json::Index::new(accessor_index[&a]));
    let material = doc.primitive_material(id).map(|m| json::Index::new(material_index[&m]));
    let targets = if prim.target_count > 0 {
        Some(
            (0..prim.target_count)
                .map(|i| {
                    let get = |suffix: &str| {
                        doc.graph()
                            .child_named(id.untyped(), &format!("morphTarget{i}.{suffix}"))
                            .and_then(Id::<Accessor>::from_untyped)
                            .map(|a| json::Index::new(accessor_index[&a]))
                    };
                    json::mesh::MorphTarget {
                        positions: get("POSITION"),
                        normals: get("NORMAL"),
                        tangents: get("TANGENT"),
                    }
                })
                .collect(),
        )
    } else {
        None
    };
    json::mesh::Primitive {
        attributes,
        extensions: extensions_map(doc, id.untyped()),
        extras: extras_to_json(&prim.extras),
        indices,
        material,
        mode: Checked::Valid(mode_to_json(prim.mode)),
        targets,
    }
}

fn camera_to_json(doc: &Document, id: Id<Camera>) -> json::Camera {
    let cam = doc.camera(id);
    let (perspective, orthographic, type_) = match cam.projection {
        Projection::Perspective { aspect_ratio, yfov, zfar, znear } => (
            Some(json::camera::Perspective {
                aspect_ratio,
                yfov,
                zfar,
                znear,
                extensions: None,
                extras: Default::default(),
            }),
            None,
            json::camera::Type::Perspective,
        ),
        Projection::Orthographic { xmag, ymag, zfar, znear } => (
            None,
            Some(json::camera::Orthographic {
                xmag,
                ymag,
                zfar,
                znear,
                extensions: None,
                extras: Default::default(),
            }),
            json::camera::Type::Orthographic,
        ),
    };
    json::Camera {
        name: cam.name.clone(),
        orthographic,
        perspective,
        type_: Checked::Valid(type_),
        extensions: extensions_map(doc, id.untyped()),
        extras: extras_to_json(&cam.extras),
    }
}

fn node_to_json(
    doc: &Document,
    id: Id<Node>,
    mesh_index: &HashMap<Id<Mesh>, u32>,
    camera_index: &HashMap<Id<Camera>, u32>,
    skin_index: &HashMap<Id<Skin>, u32>,
    node_index: &HashMap<Id<Node>, u32>,
) -> json::Node {
    let node = doc.node(id);
    let children = doc.node_children(id);
    json::Node {
        camera: doc.node_camera(id).map(|c| json::Index::new(camera_index[&c])),
        children: if children.is_empty() {
            None
        } else {
            Some(children.iter().map(|c| json::Index::new(node_index[c])).collect())
        },
        extensions: extensions_map(doc, id.untyped()),
        extras: extras_to_json(&node.extras),
        matrix: node.matrix,
        mesh: doc.node_mesh(id).map(|m| json::Index::new(mesh_index[&m])),
        name: node.name.clone(),
        rotation: if node.matrix.is_some() { None } else { Some(json::scene::UnitQuaternion(node.rotation)) },
        scale: if node.matrix.is_some() { None } else { Some(node.scale) },
        translation: if node.matrix.is_some() { None } else { Some(node.translation) },
        skin: doc.node_skin(id).map(|s| json::Index::new(skin_index[&s])),
        weights: if node.weights.is_empty() { None } else { Some(node.weights.clone()) },
    }
}

fn scene_to_json(doc: &Document, id: Id<Scene>, node_index: &HashMap<Id<Node>, u32>) -> json::Scene {
    let scene = doc.scene(id);
    json::Scene {
        extensions: extensions_map(doc, id.untyped()),
        extras: extras_to_json(&scene.extras),
        name: scene.name.clone(),
        nodes: doc.scene_nodes(id).iter().map(|n| json::Index::new(node_index[n])).collect(),
    }
}

fn skin_to_json(
    doc: &Document,
    id: Id<Skin>,
    accessor_index: &HashMap<Id<Accessor>, u32>,
    node_index: &HashMap<Id<Node>, u32>,
) -> json::Skin {
    let skin = doc.skin(id);
    let inverse_bind_matrices = doc
        .graph()
        .child_named(id.untyped(), "inverseBindMatrices")
        .and_then(Id::<Accessor>::from_untyped)
        .map(|a| json::Index::new(accessor_index[&a]));
    let skeleton = doc
        .graph()
        .child_named(id.untyped(), "skeleton")
        .and_then(Id::<Node>::from_untyped)
        .map(|n| json::Index::new(node_index[&n]));
    json::Skin {
        extensions: extensions_map(doc, id.untyped()),
        extras: extras_to_json(&skin.extras),
        inverse_bind_matrices,
        joints: doc.skin_joints(id).iter().map(|j| json::Index::new(node_index[j])).collect(),
        name: skin.name.clone(),
        skeleton,
    }
}

fn animation_to_json(
    doc: &Document,
    id: Id<Animation>,
    accessor_index: &HashMap<Id<Accessor>, u32>,
    node_index: &HashMap<Id<Node>, u32>,
) -> json::Animation {
    let anim = doc.animation(id);

    let sampler_ids: Vec<Id<AnimationSampler>> = doc
        .graph()
        .list_child_edges_named(id.untyped(), "samplers")
        .into_iter()
        .filter_map(|e| doc.graph().edge(e))
        .filter_map(|e| Id::<AnimationSampler>::from_untyped(e.child))
        .collect();
    let sampler_index: HashMap<Id<AnimationSampler>, u32> =
        sampler_ids.iter().enumerate().map(|(i, &s)| (s, i as u32)).collect();
    let samplers = sampler_ids
        .iter()
        .map(|&sid| {
            let s = doc.animation_sampler(sid);
            let input = doc
                .graph()
                .child_named(sid.untyped(), "input")
                .and_then(Id::<Accessor>::from_untyped)
                .expect("animation sampler always has an input accessor");
            let output = doc
                .graph()
                .child_named(sid.untyped(), "output")
                .and_then(Id::<Accessor>::from_untyped)
                .expect("animation sampler always has an output accessor");
            json::animation::Sampler {
                extensions: None,
                extras: Default::default(),
                input: json::Index::new(accessor_index[&input]),
                interpolation: Checked::Valid(interpolation_to_json(s.interpolation)),
                output: json::Index::new(accessor_index[&output]),
            }
        })
        .collect();

    let channel_ids: Vec<Id<AnimationChannel>> = doc
        .graph()
        .list_child_edges_named(id.untyped(), "channels")
        .into_iter()
        .filter_map(|e| doc.graph().edge(e))
        .filter_map(|e| Id::<AnimationChannel>::from_untyped(e.child))
        .collect();
    let channels = channel_ids
        .iter()
        .map(|&cid| {
            let c = doc.animation_channel(cid);
            let sampler = doc
                .graph()
                .child_named(cid.untyped(), "sampler")
                .and_then(Id::<AnimationSampler>::from_untyped)
                .expect("animation channel always has a sampler");
            let target_node = doc
                .graph()
                .child_named(cid.untyped(), "targetNode")
                .and_then(Id::<Node>::from_untyped)
                .expect("animation channel always has a target node");
            json::animation::Channel {
                sampler: json::Index::new(sampler_index[&sampler]),
                target: json::animation::Target {
                    extensions: None,
                    extras: Default::default(),
                    node: json::Index::new(node_index[&target_node]),
                    path: Checked::Valid(target_path_to_json(c.target_path)),
                },
                extensions: None,
                extras: Default::default(),
            }
        })
        .collect();

    json::Animation {
        extensions: extensions_map(doc, id.untyped()),
        extras: extras_to_json(&anim.extras),
        channels,
        name: anim.name.clone(),
        samplers,
    }
}

// --- gltf_json::Root -> Document --------------------------------------------

/// Rebuilds a [`Document`] from a [`gltf_json::Root`] and its resolved
/// buffer payloads (index-aligned with `root.buffers`).
pub fn json_to_document(root: &json::Root, buffers: &[Vec<u8>]) -> Result<Document> {
    let mut doc = Document::new();
    doc.root_mut().asset = Asset {
        version: root.asset.version.clone(),
        generator: root.asset.generator.clone(),
        copyright: root.asset.copyright.clone(),
    };
    doc.root_mut().extensions_used = root.extensions_used.clone();
    doc.root_mut().extensions_required = root.extensions_required.clone();
    for name in &root.extensions_used {
        doc.create_extension(ExtensionDescriptor::new(name.clone()));
    }
    for name in &root.extensions_required {
        doc.set_extension_required(name, true);
    }
    let root_id = doc.root_id();
    import_extensions(&mut doc, root_id, &root.extensions)?;

    let mut accessors_by_index = Vec::with_capacity(root.accessors.len());
    for acc_json in &root.accessors {
        let component_type = match acc_json.component_type {
            Checked::Valid(GenericComponentType(ct)) => component_type_from_json(ct),
            Checked::Invalid => return Err(Error::Validation("accessor has an invalid componentType".to_string())),
        };
        let type_ = match acc_json.type_ {
            Checked::Valid(t) => accessor_type_from_json(t),
            Checked::Invalid => return Err(Error::Validation("accessor has an invalid type".to_string())),
        };
        let count = acc_json.count.value();
        let element_size = type_.components() * component_type.size();

        let mut data = if let Some(view_idx) = &acc_json.buffer_view {
            let view = root
                .buffer_views
                .get(view_idx.value())
                .ok_or_else(|| Error::Validation("accessor bufferView index out of range".to_string()))?;
            let bytes = read_view(buffers, view)?;
            let byte_offset = acc_json.byte_offset.map(|o| o.value()).unwrap_or(0);
            let stride = view.byte_stride.map(|s| s.0).unwrap_or(element_size);
            let mut out = vec![0u8; count * element_size];
            for i in 0..count {
                let src = byte_offset + i * stride;
                out[i * element_size..(i + 1) * element_size].copy_from_slice(&bytes[src..src + element_size]);
            }
            out
        } else {
            vec![0u8; count * element_size]
        };

        let mut sparse = None;
        if let Some(s) = &acc_json.sparse {
            let scount = s.count.value();
            let indices_view = root
                .buffer_views
                .get(s.indices.buffer_view.value())
                .ok_or_else(|| Error::Validation("sparse indices bufferView index out of range".to_string()))?;
            let indices_bytes = read_view(buffers, indices_view)?;
            let idx_ctype = match s.indices.component_type {
                Checked::Valid(IndexComponentType(ct)) => component_type_from_json(ct),
                Checked::Invalid => {
                    return Err(Error::Validation("sparse indices have an invalid componentType".to_string()))
                }
            };
            let idx_size = idx_ctype.size();
            let idx_offset = s.indices.byte_offset.value();
            let mut indices = Vec::with_capacity(scount);
            for i in 0..scount {
                let off = idx_offset + i * idx_size;
                indices.push(read_index_value(&indices_bytes[off..], idx_ctype));
            }

            let values_view = root
                .buffer_views
                .get(s.values.buffer_view.value())
                .ok_or_else(|| Error::Validation("sparse values bufferView index out of range".to_string()))?;
            let values_bytes = read_view(buffers, values_view)?;
            let val_offset = s.values.byte_offset.value();
            let values = values_bytes[val_offset..val_offset + scount * element_size].to_vec();

            data = Accessor::materialize_sparse(&data, element_size, &indices, &values);
            sparse = Some(Sparse { indices, values });
        }

        let min = acc_json.min.as_ref().and_then(|v| serde_json::from_value(v.clone()).ok());
        let max = acc_json.max.as_ref().and_then(|v| serde_json::from_value(v.clone()).ok());

        let accessor = Accessor {
            component_type,
            type_,
            normalized: acc_json.normalized,
            count,
            data,
            min,
            max,
            sparse,
            name: acc_json.name.clone(),
            extras: extras_from_json(&acc_json.extras),
        };
        let id = doc.create_accessor(accessor);
        import_extensions(&mut doc, id.untyped(), &acc_json.extensions)?;
        accessors_by_index.push(id);
    }

    let mut textures_by_index = Vec::with_capacity(root.textures.len());
    for tex_json in &root.textures {
        let image_json = root.images.get(tex_json.source.value());
        let data = match image_json.and_then(|img| img.buffer_view) {
            Some(view_idx) => {
                let view = root
                    .buffer_views
                    .get(view_idx.value())
                    .ok_or_else(|| Error::Validation("image bufferView index out of range".to_string()))?;
                Some(read_view(buffers, view)?.to_vec())
            }
            None => None,
        };
        let mime_type = image_json.and_then(|img| img.mime_type.as_ref()).map(|m| m.0.clone());
        let (mag_filter, min_filter, wrap_s, wrap_t) = if let Some(sampler_idx) = &tex_json.sampler {
            let sampler = root
                .samplers
                .get(sampler_idx.value())
                .ok_or_else(|| Error::Validation("texture sampler index out of range".to_string()))?;
            let mag = match sampler.mag_filter {
                Some(Checked::Valid(m)) => Some(mag_filter_from_json(m)),
                _ => None,
            };
            let min = match sampler.min_filter {
                Some(Checked::Valid(m)) => Some(min_filter_from_json(m)),
                _ => None,
            };
            let ws = match sampler.wrap_s {
                Checked::Valid(w) => wrapping_from_json(w),
                Checked::Invalid => WrappingMode::Repeat,
            };
            let wt = match sampler.wrap_t {
                Checked::Valid(w) => wrapping_from_json(w),
                Checked::Invalid => WrappingMode::Repeat,
            };
            (mag, min, ws, wt)
        } else {
            (None, None, WrappingMode::Repeat, WrappingMode::Repeat)
        };

        let mut texture = Texture {
            mime_type,
            data,
            width: None,
            height: None,
            mag_filter,
            min_filter,
            wrap_s,
            wrap_t,
            name: tex_json.name.clone(),
            extras: extras_from_json(&tex_json.extras),
        };
        let _ = texture.read_dimensions();
        let id = doc.create_texture(texture);
        import_extensions(&mut doc, id.untyped(), &tex_json.extensions)?;
        textures_by_index.push(id);
    }

    let mut materials_by_index = Vec::with_capacity(root.materials.len());
    for mat_json in &root.materials {
        let alpha_mode = match mat_json.alpha_mode {
            Checked::Valid(m) => alpha_mode_from_json(m),
            Checked::Invalid => return Err(Error::Validation("material has an invalid alphaMode".to_string())),
        };
        let material = Material {
            base_color_factor: mat_json.pbr_metallic_roughness.base_color_factor.0,
            metallic_factor: mat_json.pbr_metallic_roughness.metallic_factor.0,
            roughness_factor: mat_json.pbr_metallic_roughness.roughness_factor.0,
            emissive_factor: mat_json.emissive_factor.0,
            alpha_mode,
            alpha_cutoff: mat_json.alpha_cutoff.map(|c| c.0).unwrap_or(0.5),
            double_sided: mat_json.double_sided,
            name: mat_json.name.clone(),
            extras: extras_from_json(&mat_json.extras),
        };
        let mat_id = doc.create_material(material);
        import_extensions(&mut doc, mat_id.untyped(), &mat_json.extensions)?;

        if let Some(info) = &mat_json.pbr_metallic_roughness.base_color_texture {
            let tex_id = *textures_by_index
                .get(info.index.value())
                .ok_or_else(|| Error::Validation("baseColorTexture index out of range".to_string()))?;
            doc.material_set_texture(mat_id, "baseColorTexture", tex_id, info.tex_coord);
        }
        if let Some(info) = &mat_json.pbr_metallic_roughness.metallic_roughness_texture {
            let tex_id = *textures_by_index
                .get(info.index.value())
                .ok_or_else(|| Error::Validation("metallicRoughnessTexture index out of range".to_string()))?;
            doc.material_set_texture(mat_id, "metallicRoughnessTexture", tex_id, info.tex_coord);
        }
        if let Some(nt) = &mat_json.normal_texture {
            let tex_id = *textures_by_index
                .get(nt.index.value())
                .ok_or_else(|| Error::Validation("normalTexture index out of range".to_string()))?;
            let info_id = doc.material_set_texture(mat_id, "normalTexture", tex_id, nt.tex_coord);
            doc.texture_info_mut(info_id).scale_or_strength = Some(nt.scale);
        }
        if let Some(ot) = &mat_json.occlusion_texture {
            let tex_id = *textures_by_index
                .get(ot.index.value())
                .ok_or_else(|| Error::Validation("occlusionTexture index out of range".to_string()))?;
            let info_id = doc.material_set_texture(mat_id, "occlusionTexture", tex_id, ot.tex_coord);
            doc.texture_info_mut(info_id).scale_or_strength = Some(ot.strength.0);
        }
        if let Some(info) = &mat_json.emissive_texture {
            let tex_id = *textures_by_index
                .get(info.index.value())
                .ok_or_else(|| Error::Validation("emissiveTexture index out of range".to_string()))?;
            doc.material_set_texture(mat_id, "emissiveTexture", tex_id, info.tex_coord);
        }
        materials_by_index.push(mat_id);
    }

    let mut meshes_by_index = Vec::with_capacity(root.meshes.len());
    for mesh_json in &root.meshes {
        let mesh_id = doc.create_mesh(Mesh {
            weights: mesh_json.weights.clone().unwrap_or_default(),
            name: mesh_json.name.clone(),
            extras: extras_from_json(&mesh_json.extras),
        });
        import_extensions(&mut doc, mesh_id.untyped(), &mesh_json.extensions)?;

        for prim_json in &mesh_json.primitives {
            let mode = match prim_json.mode {
                Checked::Valid(m) => mode_from_json(m),
                Checked::Invalid => return Err(Error::Validation("primitive has an invalid mode".to_string())),
            };
            let target_count = prim_json.targets.as_ref().map(|t| t.len()).unwrap_or(0);
            let prim_id = doc.create_primitive(
                mesh_id,
                Primitive { mode, target_count, extras: extras_from_json(&prim_json.extras) },
            );
            import_extensions(&mut doc, prim_id.untyped(), &prim_json.extensions)?;

            for (semantic, accessor_idx) in &prim_json.attributes {
                let Checked::Valid(sem) = semantic else { continue };
                let name = semantic_to_edge_name(sem);
                let accessor_id = *accessors_by_index
                    .get(accessor_idx.value())
                    .ok_or_else(|| Error::Validation("primitive attribute accessor index out of range".to_string()))?;
                doc.primitive_set_attribute(prim_id, &name, accessor_id);
            }
            if let Some(idx) = &prim_json.indices {
                let accessor_id = *accessors_by_index
                    .get(idx.value())
                    .ok_or_else(|| Error::Validation("primitive indices accessor index out of range".to_string()))?;
                doc.primitive_set_indices(prim_id, Some(accessor_id));
            }
            if let Some(idx) = &prim_json.material {
                let material_id = *materials_by_index
                    .get(idx.value())
                    .ok_or_else(|| Error::Validation("primitive material index out of range".to_string()))?;
                doc.primitive_set_material(prim_id, Some(material_id));
            }
            if let Some(targets) = &prim_json.targets {
                for (i, target) in targets.iter().enumerate() {
                    let mut connect_target = |suffix: &str, idx: &Option<json::Index<json::Accessor>>| -> Result<()> {
                        if let Some(idx) = idx {
                            let accessor_id = *accessors_by_index
                                .get(idx.value())
                                .ok_or_else(|| Error::Validation("morph target accessor index out of range".to_string()))?;
                            doc.graph_mut().connect(
                                prim_id.untyped(),
                                accessor_id.untyped(),
                                &format!("morphTarget{i}.{suffix}"),
                                EdgeAttributes::default(),
                            );
                        }
                        Ok(())
                    };
                    connect_target("POSITION", &target.positions)?;
                    connect_target("NORMAL", &target.normals)?;
                    connect_target("TANGENT", &target.tangents)?;
                }
            }
        }
        meshes_by_index.push(mesh_id);
    }

    let mut cameras_by_index = Vec::with_capacity(root.cameras.len());
    for cam_json in &root.cameras {
        let projection = match (&cam_json.perspective, &cam_json.orthographic) {
            (Some(p), _) => {
                Projection::Perspective { aspect_ratio: p.aspect_ratio, yfov: p.yfov, zfar: p.zfar, znear: p.znear }
            }
            (None, Some(o)) => Projection::Orthographic { xmag: o.xmag, ymag: o.ymag, zfar: o.zfar, znear: o.znear },
            (None, None) => {
                return Err(Error::Validation(
                    "camera has neither a perspective nor an orthographic projection".to_string(),
                ))
            }
        };
        let cam_id = doc.create_camera(Camera { projection, name: cam_json.name.clone(), extras: extras_from_json(&cam_json.extras) });
        import_extensions(&mut doc, cam_id.untyped(), &cam_json.extensions)?;
        cameras_by_index.push(cam_id);
    }

    let mut nodes_by_index = Vec::with_capacity(root.nodes.len());
    for node_json in &root.nodes {
        let (translation, rotation, scale) = if node_json.matrix.is_some() {
            ([0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0], [1.0, 1.0, 1.0])
        } else {
            (
                node_json.translation.unwrap_or([0.0, 0.0, 0.0]),
                node_json.rotation.map(|r| r.0).unwrap_or([0.0, 0.0, 0.0, 1.0]),
                node_json.scale.unwrap_or([1.0, 1.0, 1.0]),
            )
        };
        let node_id = doc.create_node(Node {
            translation,
            rotation,
            scale,
            matrix: node_json.matrix,
            weights: node_json.weights.clone().unwrap_or_default(),
            name: node_json.name.clone(),
            extras: extras_from_json(&node_json.extras),
        });
        nodes_by_index.push(node_id);
    }

    let mut skins_by_index = Vec::with_capacity(root.skins.len());
    for skin_json in &root.skins {
        let skin_id = doc.create_skin(Skin { name: skin_json.name.clone(), extras: extras_from_json(&skin_json.extras) });
        import_extensions(&mut doc, skin_id.untyped(), &skin_json.extensions)?;
        for joint_idx in &skin_json.joints {
            let joint_id = *nodes_by_index
                .get(joint_idx.value())
                .ok_or_else(|| Error::Validation("skin joint index out of range".to_string()))?;
            doc.skin_add_joint(skin_id, joint_id);
        }
        if let Some(ibm) = &skin_json.inverse_bind_matrices {
            let accessor_id = *accessors_by_index
                .get(ibm.value())
                .ok_or_else(|| Error::Validation("skin inverseBindMatrices index out of range".to_string()))?;
            doc.graph_mut().connect(skin_id.untyped(), accessor_id.untyped(), "inverseBindMatrices", EdgeAttributes::default());
        }
        if let Some(sk) = &skin_json.skeleton {
            let skeleton_id = *nodes_by_index
                .get(sk.value())
                .ok_or_else(|| Error::Validation("skin skeleton index out of range".to_string()))?;
            doc.graph_mut().connect(skin_id.untyped(), skeleton_id.untyped(), "skeleton", EdgeAttributes::default());
        }
        skins_by_index.push(skin_id);
    }

    for (i, node_json) in root.nodes.iter().enumerate() {
        let node_id = nodes_by_index[i];
        if let Some(mesh_idx) = &node_json.mesh {
            let mesh_id = *meshes_by_index
                .get(mesh_idx.value())
                .ok_or_else(|| Error::Validation("node mesh index out of range".to_string()))?;
            doc.node_set_mesh(node_id, Some(mesh_id));
        }
        if let Some(cam_idx) = &node_json.camera {
            let cam_id = *cameras_by_index
                .get(cam_idx.value())
                .ok_or_else(|| Error::Validation("node camera index out of range".to_string()))?;
            doc.node_set_camera(node_id, Some(cam_id));
        }
        if let Some(skin_idx) = &node_json.skin {
            let skin_id = *skins_by_index
                .get(skin_idx.value())
                .ok_or_else(|| Error::Validation("node skin index out of range".to_string()))?;
            doc.node_set_skin(node_id, Some(skin_id));
        }
        if let Some(children) = &node_json.children {
            for child_idx in children {
                let child_id = *nodes_by_index
                    .get(child_idx.value())
                    .ok_or_else(|| Error::Validation("node child index out of range".to_string()))?;
                doc.node_add_child(node_id, child_id);
            }
        }
        import_extensions(&mut doc, node_id.untyped(), &node_json.extensions)?;
    }

    let mut scenes_by_index = Vec::with_capacity(root.scenes.len());
    for scene_json in &root.scenes {
        let scene_id = doc.create_scene(Scene { name: scene_json.name.clone(), extras: extras_from_json(&scene_json.extras) });
        import_extensions(&mut doc, scene_id.untyped(), &scene_json.extensions)?;
        for node_idx in &scene_json.nodes {
            let node_id = *nodes_by_index
                .get(node_idx.value())
                .ok_or_else(|| Error::Validation("scene node index out of range".to_string()))?;
            doc.scene_add_node(scene_id, node_id);
        }
        scenes_by_index.push(scene_id);
    }
    if let Some(def) = &root.scene {
        let scene_id = *scenes_by_index
            .get(def.value())
            .ok_or_else(|| Error::Validation("default scene index out of range".to_string()))?;
        doc.root_set_default_scene(Some(scene_id));
    }

    for anim_json in &root.animations {
        let anim_id = doc.create_animation(Animation { name: anim_json.name.clone(), extras: extras_from_json(&anim_json.extras) });
        import_extensions(&mut doc, anim_id.untyped(), &anim_json.extensions)?;

        let mut sampler_ids = Vec::with_capacity(anim_json.samplers.len());
        for sampler_json in &anim_json.samplers {
            let interpolation = match sampler_json.interpolation {
                Checked::Valid(i) => interpolation_from_json(i),
                Checked::Invalid => Interpolation::Linear,
            };
            let input = *accessors_by_index
                .get(sampler_json.input.value())
                .ok_or_else(|| Error::Validation("animation sampler input index out of range".to_string()))?;
            let output = *accessors_by_index
                .get(sampler_json.output.value())
                .ok_or_else(|| Error::Validation("animation sampler output index out of range".to_string()))?;
            sampler_ids.push(doc.create_animation_sampler(anim_id, AnimationSampler { interpolation }, input, output));
        }
        for channel_json in &anim_json.channels {
            let path = match channel_json.target.path {
                Checked::Valid(p) => target_path_from_json(p),
                Checked::Invalid => {
                    return Err(Error::Validation("animation channel has an invalid target path".to_string()))
                }
            };
            let sampler_id = *sampler_ids
                .get(channel_json.sampler.value())
                .ok_or_else(|| Error::Validation("animation channel sampler index out of range".to_string()))?;
            let target_node = *nodes_by_index
                .get(channel_json.target.node.value())
                .ok_or_else(|| Error::Validation("animation channel target node index out of range".to_string()))?;
            doc.create_animation_channel(anim_id, AnimationChannel { target_path: path }, sampler_id, target_node);
        }
    }

    Ok(doc)
}

// --- top-level read/write wrappers ------------------------------------------

fn load_buffers<S: Source>(root: &json::Root, bin: Option<&[u8]>, source: &mut S) -> Result<Vec<Vec<u8>>> {
    let mut buffers = Vec::with_capacity(root.buffers.len());
    for (i, buffer_json) in root.buffers.iter().enumerate() {
        let data = match &buffer_json.uri {
            Some(uri) => match source::decode_data_uri(uri) {
                Some(bytes) => bytes,
                None => source.read_external(uri)?,
            },
            None if i == 0 => bin.map(|b| b.to_vec()).unwrap_or_default(),
            None => return Err(Error::Validation(format!("buffer {i} has no uri and is not the GLB BIN chunk"))),
        };
        buffers.push(data);
    }
    Ok(buffers)
}

/// Writes `doc` as a `.glb` binary asset through `sink`.
pub fn write_glb<S: Source>(doc: &Document, sink: &mut S) -> Result<()> {
    let (root, bin) = document_to_json(doc);
    let json_bytes = serde_json::to_vec(&root)?;
    let mut out = Vec::new();
    glb::write(&mut out, &json_bytes, if bin.is_empty() { None } else { Some(bin.as_slice()) })?;
    sink.write_asset(&out)
}

/// Reads a `.glb` binary asset through `source` into a [`Document`].
pub fn read_glb<S: Source>(source: &mut S) -> Result<Document> {
    let bytes = source.read_asset()?;
    let container = glb::read(std::io::Cursor::new(bytes))?;
    let root: json::Root = serde_json::from_slice(&container.json)?;
    let buffers = load_buffers(&root, container.bin.as_deref(), source)?;
    json_to_document(&root, &buffers)
}

/// Writes `doc` as a `.gltf` JSON asset through `sink`, spilling its packed
/// binary blob (if any) to a sibling `buffer.bin`.
pub fn write_gltf<S: Source>(doc: &Document, sink: &mut S) -> Result<()> {
    let (mut root, bin) = document_to_json(doc);
    if let Some(buffer) = root.buffers.get_mut(0) {
        if !bin.is_empty() {
            buffer.uri = Some("buffer.bin".to_string());
            sink.write_external("buffer.bin", &bin)?;
        }
    }
    let json_bytes = serde_json::to_vec_pretty(&root)?;
    sink.write_asset(&json_bytes)
}

/// Reads a `.gltf` JSON asset through `source` into a [`Document`], resolving
/// any external or data-URI buffers it references.
pub fn read_gltf<S: Source>(source: &mut S) -> Result<Document> {
    let bytes = source.read_asset()?;
    let root: json::Root = serde_json::from_slice(&bytes)?;
    let mut buffers = Vec::with_capacity(root.buffers.len());
    for buffer_json in &root.buffers {
        let data = match &buffer_json.uri {
            Some(uri) => match source::decode_data_uri(uri) {
                Some(bytes) => bytes,
                None => source.read_external(uri)?,
            },
            None => Vec::new(),
        };
        buffers.push(data);
    }
    json_to_document(&root, &buffers)
}
