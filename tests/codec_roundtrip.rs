//! Round-trips a small hand-built document through both on-disk asset
//! forms and checks that the structural data survives.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gltf_transform::io::{read_glb, read_gltf, write_glb, write_gltf, Source};
use gltf_transform::property::{Accessor, AccessorType, ComponentType, Mesh, Mode, Node, Primitive, Scene};
use gltf_transform::{Document, Error};

/// An in-memory [`Source`] so the test doesn't touch the filesystem.
#[derive(Default, Clone)]
struct MemIo {
    asset: Rc<RefCell<Vec<u8>>>,
    externals: Rc<RefCell<HashMap<String, Vec<u8>>>>,
}

impl Source for MemIo {
    fn read_asset(&mut self) -> gltf_transform::Result<Vec<u8>> {
        Ok(self.asset.borrow().clone())
    }

    fn read_external(&mut self, uri: &str) -> gltf_transform::Result<Vec<u8>> {
        self.externals
            .borrow()
            .get(uri)
            .cloned()
            .ok_or_else(|| Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, uri.to_string())))
    }

    fn write_asset(&mut self, data: &[u8]) -> gltf_transform::Result<()> {
        *self.asset.borrow_mut() = data.to_vec();
        Ok(())
    }

    fn write_external(&mut self, uri: &str, data: &[u8]) -> gltf_transform::Result<()> {
        self.externals.borrow_mut().insert(uri.to_string(), data.to_vec());
        Ok(())
    }
}

fn build_triangle() -> Document {
    let mut doc = Document::new();

    let mut positions = Accessor::new(ComponentType::F32, AccessorType::Vec3, 3);
    let verts: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    for (i, v) in verts.iter().enumerate() {
        positions.write_element(i, &[v[0], v[1], v[2]]);
    }
    positions.recompute_bounds();
    let positions_id = doc.create_accessor(positions);

    let mesh_id = doc.create_mesh(Mesh::default());
    let prim_id = doc.create_primitive(mesh_id, Primitive { mode: Mode::Triangles, ..Default::default() });
    doc.primitive_set_attribute(prim_id, "POSITION", positions_id);

    let node_id = doc.create_node(Node { name: Some("triangle".to_string()), ..Default::default() });
    doc.node_set_mesh(node_id, Some(mesh_id));

    let scene_id = doc.create_scene(Scene::default());
    doc.scene_add_node(scene_id, node_id);
    doc.root_set_default_scene(Some(scene_id));

    doc
}

fn assert_round_tripped(doc: &Document) {
    assert_eq!(doc.root().asset.version, "2.0");
    let scene_id = doc.root_default_scene().expect("default scene");
    let nodes = doc.scene_nodes(scene_id);
    assert_eq!(nodes.len(), 1);
    let node_id = nodes[0];
    assert_eq!(doc.node(node_id).name.as_deref(), Some("triangle"));

    let mesh_id = doc.node_mesh(node_id).expect("node has a mesh");
    let prims = doc.mesh_primitives(mesh_id);
    assert_eq!(prims.len(), 1);
    assert_eq!(doc.primitive(prims[0]).mode, Mode::Triangles);

    let accessor_id = doc.primitive_attribute(prims[0], "POSITION").expect("POSITION attribute");
    let accessor = doc.accessor(accessor_id);
    assert_eq!(accessor.count, 3);
    let second: Vec<f32> = accessor.read_element(1);
    assert_eq!(second, vec![1.0, 0.0, 0.0]);
}

#[test]
fn glb_round_trip_preserves_scene_graph_and_accessor_data() {
    let doc = build_triangle();
    let mut io = MemIo::default();
    write_glb(&doc, &mut io).expect("write_glb");
    let read_back = read_glb(&mut io).expect("read_glb");
    assert_round_tripped(&read_back);
}

#[test]
fn gltf_round_trip_spills_buffer_to_external_uri() {
    let doc = build_triangle();
    let mut io = MemIo::default();
    write_gltf(&doc, &mut io).expect("write_gltf");
    assert!(io.externals.borrow().contains_key("buffer.bin"));
    let read_back = read_gltf(&mut io).expect("read_gltf");
    assert_round_tripped(&read_back);
}
