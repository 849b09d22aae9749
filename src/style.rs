use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use crate::color::DEEP;

// ---------------------------------------------------------------------------
// Theme – visual configuration passed explicitly to render and display
// ---------------------------------------------------------------------------

/// Named plot themes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    /// Grey background with white grid lines.
    #[default]
    Darkgrid,
    /// White background with grey grid lines.
    Whitegrid,
    /// Grey background, no grid.
    Dark,
    /// White background, no grid.
    White,
    /// White background, no grid, axis ticks emphasised.
    Ticks,
}

/// Everything that controls how a figure looks, independent of its data.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: ThemeName,
    pub background: Color32,
    pub show_grid: bool,
    pub grid_color: Color32,
    pub text_color: Color32,
    /// Categorical colours assigned to series in order.
    pub palette: Vec<Color32>,
    pub line_width: f32,
    /// Opacity of the uncertainty band fill.
    pub band_alpha: f32,
}

impl Theme {
    pub fn new(name: ThemeName) -> Self {
        let light_grey = Color32::from_rgb(0xEA, 0xEA, 0xF2);
        let (background, show_grid, grid_color) = match name {
            ThemeName::Darkgrid => (light_grey, true, Color32::WHITE),
            ThemeName::Whitegrid => (Color32::WHITE, true, Color32::from_gray(0xCC)),
            ThemeName::Dark => (light_grey, false, Color32::WHITE),
            ThemeName::White | ThemeName::Ticks => {
                (Color32::WHITE, false, Color32::from_gray(0xCC))
            }
        };

        Self {
            name,
            background,
            show_grid,
            grid_color,
            text_color: Color32::from_gray(0x26),
            palette: DEEP.to_vec(),
            line_width: if name == ThemeName::Ticks { 1.75 } else { 1.5 },
            band_alpha: 0.2,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::new(ThemeName::default())
    }
}
