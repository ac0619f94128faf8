use std::convert::identity;
use std::io::{BufReader, Cursor};

use crate::{
    data_structures::{model, texture::Texture},
    resources::texture::{load_texture, material_layout},
};

/**
 * This module contains all logic for loading the model and textures from external files.
 */
pub mod mesh;
pub mod texture;

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> reqwest::Url {
    let window = web_sys::window().unwrap();
    let location = window.location();
    let origin = location.origin().unwrap();
    let base = reqwest::Url::parse(&format!("{}/assets/", origin)).unwrap();
    base.join(file_name).unwrap()
}

/// Log load progress as a percentage. Fractions are only meaningful when the
/// total size is known; otherwise only the terminal outcome is logged.
fn log_progress(file_name: &str, loaded: usize, total: Option<u64>) {
    if let Some(total) = total.filter(|total| *total > 0) {
        log::info!(
            "loading {}: {:.0}%",
            file_name,
            loaded as f64 / total as f64 * 100.0
        );
    }
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    let started = instant::Instant::now();

    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name);
        let response = reqwest::get(url).await?.error_for_status()?;
        let total = response.content_length();
        let data = response.bytes().await?.to_vec();
        log_progress(file_name, data.len(), total);
        data
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        let data = std::fs::read(path)?;
        log_progress(file_name, data.len(), Some(data.len() as u64));
        data
    };

    log::info!(
        "loaded {} ({} bytes) in {:?}",
        file_name,
        data.len(),
        started.elapsed()
    );
    Ok(data)
}

/// Load the glTF model at `file_name`, including its embedded or sibling
/// buffers and textures, and upload it.
pub async fn load_model_gltf(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<model::Model> {
    let gltf_bytes = load_binary(file_name).await?;
    let gltf_cursor = Cursor::new(gltf_bytes);
    let gltf_reader = BufReader::new(gltf_cursor);
    let gltf = gltf::Gltf::from_reader(gltf_reader)?;

    // Load buffers: GLB-embedded blobs come along with the document, URI
    // buffers are fetched as siblings of the model file.
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                if let Some(blob) = gltf.blob.as_deref() {
                    buffer_data.push(blob.into());
                };
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(uri).await?;
                buffer_data.push(bin);
            }
        }
    }

    // Load materials
    let layout = material_layout(device);
    let mut materials = Vec::new();
    for material in gltf.materials() {
        let name = material.name().unwrap_or(file_name);
        let pbr = material.pbr_metallic_roughness();
        let diffuse_texture = match pbr.base_color_texture() {
            Some(info) => match info.texture().source().source() {
                gltf::image::Source::View { view, mime_type } => {
                    let start = view.offset();
                    let end = start + view.length();
                    Texture::from_bytes(
                        device,
                        queue,
                        &buffer_data[view.buffer().index()][start..end],
                        name,
                        mime_type.split('/').next_back(),
                    )?
                }
                gltf::image::Source::Uri { uri, mime_type } => {
                    let format = mime_type.map(|mt| mt.split('/').next_back().map_or("jpg", identity));
                    load_texture(uri, device, queue, format).await?
                }
            },
            // Colour factor only: bake it into a one-pixel texture so the
            // pipeline stays uniform.
            None => {
                let factor = pbr.base_color_factor();
                let rgba = factor.map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8);
                Texture::from_pixel(device, queue, rgba, name)
            }
        };
        materials.push(model::Material::new(device, name, diffuse_texture, &layout));
    }
    if materials.is_empty() {
        let white = Texture::from_pixel(device, queue, [255; 4], file_name);
        materials.push(model::Material::new(device, file_name, white, &layout));
    }

    let data = mesh::mesh_data(&gltf, &buffer_data);
    let meshes = mesh::upload_meshes(data, device);
    log::info!(
        "model {}: {} meshes, {} materials",
        file_name,
        meshes.len(),
        materials.len()
    );

    Ok(model::Model { meshes, materials })
}
