//! Tuning constants for the typesetter.
//!
//! These encode visual tuning rather than structural rules, so they are data. Load them from
//! JSON with [`TypesetConfig::from_json`] or start from [`TypesetConfig::default`].

use serde::{Deserialize, Serialize};

use crate::error::TextResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypesetConfig {
    /// Horizontal shear of italic glyphs per unit of ink height.
    pub italic_skew_factor: f32,
    /// Fraction of the stroke pixel width added to each advance.
    pub stroke_advance_factor: f32,
    /// Extra advance after punctuation, in unscaled pixels.
    pub punctuation_spacing: f32,
    /// Lower bound for underline and strike quad thickness.
    pub min_decoration_thickness: f32,
    /// Script size ratio used when the font does not provide one.
    pub default_script_ratio: f32,
    pub autofit_max_iterations: u32,
    /// The search stops once `high - low` drops below this.
    pub autofit_tolerance: f32,
    /// The fitted size is floored to `1 / autofit_precision`.
    pub autofit_precision: f32,
}

impl Default for TypesetConfig {
    fn default() -> Self {
        Self {
            italic_skew_factor: 0.2,
            stroke_advance_factor: 0.25,
            punctuation_spacing: 2.0,
            min_decoration_thickness: 4.0,
            default_script_ratio: 0.3,
            autofit_max_iterations: 10,
            autofit_tolerance: 0.5,
            autofit_precision: 1000.0,
        }
    }
}

impl TypesetConfig {
    pub fn from_json(json: &str) -> TextResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
