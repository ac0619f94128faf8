use prism::resources::mesh::mesh_data;

/// Wrap a glTF JSON document and its binary payload into a GLB container.
fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
    let mut json_bytes = json.as_bytes().to_vec();
    while json_bytes.len() % 4 != 0 {
        json_bytes.push(b' ');
    }
    let mut bin_bytes = bin.to_vec();
    while bin_bytes.len() % 4 != 0 {
        bin_bytes.push(0);
    }

    let total = 12 + 8 + json_bytes.len() + 8 + bin_bytes.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json_bytes);
    out.extend_from_slice(&(bin_bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(&bin_bytes);
    out
}

/// One triangle on a node translated one unit along +X.
fn triangle_glb() -> Vec<u8> {
    let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let indices: [u16; 3] = [0, 1, 2];

    let mut bin = Vec::new();
    for value in positions {
        bin.extend_from_slice(&value.to_le_bytes());
    }
    for value in indices {
        bin.extend_from_slice(&value.to_le_bytes());
    }

    let json = r#"{
        "asset": {"version": "2.0"},
        "scene": 0,
        "scenes": [{"nodes": [0]}],
        "nodes": [{"mesh": 0, "translation": [1.0, 0.0, 0.0]}],
        "meshes": [{"name": "tri", "primitives": [{"attributes": {"POSITION": 0}, "indices": 1}]}],
        "buffers": [{"byteLength": 42}],
        "bufferViews": [
            {"buffer": 0, "byteOffset": 0, "byteLength": 36},
            {"buffer": 0, "byteOffset": 36, "byteLength": 6}
        ],
        "accessors": [
            {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
             "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]},
            {"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}
        ]
    }"#;

    glb(json, &bin)
}

#[test]
fn should_bake_node_transforms_into_vertex_positions() {
    let gltf = gltf::Gltf::from_slice(&triangle_glb()).expect("GLB container should parse");
    let buffers = vec![gltf.blob.clone().expect("GLB carries an embedded blob")];

    let meshes = mesh_data(&gltf, &buffers);
    assert_eq!(meshes.len(), 1);

    let mesh = &meshes[0];
    assert_eq!(mesh.name, "tri.0");
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert_eq!(mesh.material, 0);

    // The node's +1 translation along X is baked into every position.
    assert_eq!(mesh.vertices[0].position, [1.0, 0.0, 0.0]);
    assert_eq!(mesh.vertices[1].position, [2.0, 0.0, 0.0]);
    assert_eq!(mesh.vertices[2].position, [1.0, 1.0, 0.0]);
}

#[test]
fn should_default_missing_attributes_instead_of_failing() {
    let gltf = gltf::Gltf::from_slice(&triangle_glb()).expect("GLB container should parse");
    let buffers = vec![gltf.blob.clone().expect("GLB carries an embedded blob")];

    let meshes = mesh_data(&gltf, &buffers);
    for vertex in &meshes[0].vertices {
        // No NORMAL or TEXCOORD_0 accessors in the document.
        assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertex.tex_coords, [0.0, 0.0]);
    }
}
