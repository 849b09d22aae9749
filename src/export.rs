use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::ColorImage;

/// Write a captured frame to `path` as PNG.
pub fn save_png(path: &Path, image: &ColorImage) -> Result<()> {
    let [width, height] = image.size;
    image::save_buffer_with_format(
        path,
        image.as_raw(),
        width as u32,
        height as u32,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Saved {width}x{height} figure to {}", path.display());
    Ok(())
}
