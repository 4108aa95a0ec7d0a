//! Fixed color palette and the picker that assigns colors at acceptance.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::Styling;

/// `(stroke, fill)` pairs for polygon-like shapes.
pub const PALETTE: [(&str, &str); 4] = [
    ("#ff6b6b", "#ff8787"),
    ("#4dabf7", "#74c0fc"),
    ("#f59f00", "#ffc078"),
    ("#37b24d", "#8ce99a"),
];

/// Styling for linestrings and for restored features without colors.
pub fn default_styling() -> Styling {
    Styling::new("#000000", "#000000")
}

/// Uniform palette picker; repeats allowed.
#[derive(Clone, Debug)]
pub struct ColorPicker {
    rng: StdRng,
}

impl ColorPicker {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn pick(&mut self) -> Styling {
        let (stroke, fill) = PALETTE[self.rng.gen_range(0..PALETTE.len())];
        Styling::new(stroke, fill)
    }
}

/// True if `styling` is one of the palette entries.
pub fn in_palette(styling: &Styling) -> bool {
    PALETTE
        .iter()
        .any(|&(s, f)| styling.stroke == s && styling.fill == f)
}
