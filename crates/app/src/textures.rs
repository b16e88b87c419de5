//! Decoding attachment bytes and data URIs into egui textures.

use eframe::egui;
use shared::attachment::decode_data_uri;

/// Decode raw image bytes into a texture.
pub fn texture_from_bytes(
    ctx: &egui::Context,
    name: &str,
    bytes: &[u8],
) -> Option<egui::TextureHandle> {
    let image = image::load_from_memory(bytes).ok()?;
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &rgba);
    Some(ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR))
}

/// Decode a `data:` URI into a texture.
pub fn texture_from_data_uri(
    ctx: &egui::Context,
    name: &str,
    uri: &str,
) -> Option<egui::TextureHandle> {
    let (_, bytes) = decode_data_uri(uri)?;
    texture_from_bytes(ctx, name, &bytes)
}
