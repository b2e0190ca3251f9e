use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Action;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

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

// ---------------------------------------------------------------------------
// Figure colours
// ---------------------------------------------------------------------------

const ACTIONS: [Action; 4] = [
    Action::Initialized,
    Action::Loaded,
    Action::Subtracted,
    Action::Smoothed,
];

/// Line colour for a series, keyed on the action that produced it.
pub fn action_color(action: Action) -> Color32 {
    let palette = generate_palette(ACTIONS.len());
    ACTIONS
        .iter()
        .position(|a| *a == action)
        .and_then(|i| palette.get(i).copied())
        .unwrap_or(Color32::LIGHT_BLUE)
}

/// Colour for overlay markers (catalog lines).
pub fn marker_color() -> Color32 {
    Color32::from_rgb(230, 160, 40)
}
