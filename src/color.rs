use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// The "deep" categorical palette used by the default themes.
pub const DEEP: [Color32; 10] = [
    Color32::from_rgb(0x4C, 0x72, 0xB0),
    Color32::from_rgb(0xDD, 0x84, 0x52),
    Color32::from_rgb(0x55, 0xA8, 0x68),
    Color32::from_rgb(0xC4, 0x4E, 0x52),
    Color32::from_rgb(0x81, 0x72, 0xB3),
    Color32::from_rgb(0x93, 0x78, 0x60),
    Color32::from_rgb(0xDA, 0x8B, 0xC3),
    Color32::from_rgb(0x8C, 0x8C, 0x8C),
    Color32::from_rgb(0xCC, 0xB9, 0x74),
    Color32::from_rgb(0x64, 0xB5, 0xCD),
];

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Pick `n` series colours: the given palette when it is large enough,
/// evenly spaced hues otherwise.
pub fn series_colors(base: &[Color32], n: usize) -> Vec<Color32> {
    if n <= base.len() {
        base[..n].to_vec()
    } else {
        generate_palette(n)
    }
}

/// The same colour with the given opacity (0..=1), for uncertainty bands.
pub fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), a)
}
