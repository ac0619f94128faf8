use cgmath::{InnerSpace, Matrix, Matrix3, Matrix4, Point3, SquareMatrix, Transform, Vector3};
use wgpu::util::DeviceExt;

use crate::data_structures::model;

/// CPU-side geometry of one glTF primitive, with the node transform already
/// baked into positions and normals.
#[derive(Clone, Debug)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<model::ModelVertex>,
    pub indices: Vec<u32>,
    pub material: usize,
}

/// Flatten the node hierarchy of every scene into a list of mesh-local
/// primitives. Pure CPU work, no GPU resources involved.
pub fn mesh_data(document: &gltf::Document, buffers: &[Vec<u8>]) -> Vec<MeshData> {
    let mut meshes = Vec::new();
    for scene in document.scenes() {
        for node in scene.nodes() {
            collect_node(node, Matrix4::identity(), buffers, &mut meshes);
        }
    }
    meshes
}

fn collect_node(
    node: gltf::Node,
    parent_transform: Matrix4<f32>,
    buffers: &[Vec<u8>],
    meshes: &mut Vec<MeshData>,
) {
    let local: Matrix4<f32> = node.transform().matrix().into();
    let transform = parent_transform * local;

    if let Some(mesh) = node.mesh() {
        let linear = Matrix3::from_cols(
            transform.x.truncate(),
            transform.y.truncate(),
            transform.z.truncate(),
        );
        // Inverse-transpose keeps normals correct under non-uniform scale.
        let normal_matrix = linear
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or(linear);

        for (index, primitive) in mesh.primitives().enumerate() {
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

            let positions: Vec<[f32; 3]> = match reader.read_positions() {
                Some(positions) => positions.collect(),
                None => {
                    log::warn!("primitive without positions in node {}", node.index());
                    continue;
                }
            };
            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|normals| normals.collect())
                .unwrap_or_default();
            let tex_coords: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map(|coords| coords.into_f32().collect())
                .unwrap_or_default();

            let vertices = positions
                .iter()
                .enumerate()
                .map(|(v, position)| {
                    let position = transform.transform_point(Point3::from(*position));
                    let normal = normals
                        .get(v)
                        .map(|normal| (normal_matrix * Vector3::from(*normal)).normalize())
                        .unwrap_or_else(Vector3::unit_z);
                    model::ModelVertex {
                        position: position.into(),
                        tex_coords: tex_coords.get(v).copied().unwrap_or([0.0, 0.0]),
                        normal: normal.into(),
                    }
                })
                .collect();

            let indices: Vec<u32> = reader
                .read_indices()
                .map(|indices| indices.into_u32().collect())
                .unwrap_or_else(|| (0..positions.len() as u32).collect());

            meshes.push(MeshData {
                name: format!("{}.{}", mesh.name().unwrap_or("mesh"), index),
                vertices,
                indices,
                material: primitive.material().index().unwrap_or(0),
            });
        }
    }

    for child in node.children() {
        collect_node(child, transform, buffers, meshes);
    }
}

pub fn upload_meshes(data: Vec<MeshData>, device: &wgpu::Device) -> Vec<model::Mesh> {
    data.into_iter()
        .map(|mesh| {
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} Vertex Buffer", mesh.name)),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} Index Buffer", mesh.name)),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

            model::Mesh {
                name: mesh.name,
                vertex_buffer,
                index_buffer,
                num_elements: mesh.indices.len() as u32,
                material: mesh.material,
            }
        })
        .collect()
}
