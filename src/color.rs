use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use heart_dash::data::model::Disease;

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
            // Start at 200° so the two-series case reads as blue / orange.
            let hue = 200.0 + (i as f32 / n as f32) * 360.0;
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
// Color mapping: category → Color32
// ---------------------------------------------------------------------------

/// Maps the values of a categorical column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap<K: Ord> {
    mapping: BTreeMap<K, Color32>,
    default_color: Color32,
}

impl<K: Ord + Copy> ColorMap<K> {
    /// Build a colour map over `categories`, in order.
    pub fn new(categories: &[K]) -> Self {
        let palette = generate_palette(categories.len());
        ColorMap {
            mapping: categories.iter().copied().zip(palette).collect(),
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a category.
    pub fn color_for(&self, value: K) -> Color32 {
        self.mapping
            .get(&value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

/// Colours shared by every disease-coloured chart.
pub fn disease_colors() -> ColorMap<Disease> {
    ColorMap::new(&Disease::ALL)
}
