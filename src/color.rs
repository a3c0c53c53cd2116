use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

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
// Class colours: label → Color32
// ---------------------------------------------------------------------------

/// The three labels with conventional dashboard colours. Anything else in
/// the open class set gets a generated hue.
fn well_known(class: &str) -> Option<Color32> {
    match class {
        "normal" => Some(Color32::from_rgb(0x2e, 0xa0, 0x43)),
        "Blackhole" => Some(Color32::from_rgb(0xd1, 0x2b, 0x2b)),
        "Forwarding" => Some(Color32::from_rgb(0xe8, 0x8c, 0x1a)),
        _ => None,
    }
}

/// Maps every class label observed in a dataset to a stable colour.
#[derive(Debug, Clone, Default)]
pub struct ClassPalette {
    mapping: BTreeMap<String, Color32>,
}

impl ClassPalette {
    /// Build the mapping: fixed colours for the well-known labels, then
    /// evenly spaced hues for the remainder.
    pub fn new(classes: &BTreeSet<String>) -> Self {
        let unknown: Vec<&String> = classes
            .iter()
            .filter(|c| well_known(c).is_none())
            .collect();
        let generated = generate_palette(unknown.len());

        let mut mapping = BTreeMap::new();
        for class in classes {
            if let Some(color) = well_known(class) {
                mapping.insert(class.clone(), color);
            }
        }
        for (class, color) in unknown.into_iter().zip(generated) {
            mapping.insert(class.clone(), color);
        }
        ClassPalette { mapping }
    }

    /// Look up the colour for a class label.
    pub fn color_for(&self, class: &str) -> Color32 {
        self.mapping.get(class).copied().unwrap_or(Color32::GRAY)
    }
}
