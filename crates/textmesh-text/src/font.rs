//! Font metrics as seen by the typesetter.
//!
//! Rasterization and atlas management live outside this crate; layout only needs per-glyph
//! measurements and a handful of font-wide constants, supplied through
//! [`FontMetricsProvider`].

use serde::{Deserialize, Serialize};
use textmesh_core::alloc::HashMap;

use crate::error::TextResult;

/// Measurements of one glyph at the font's design size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphMetrics {
    /// Distance to the next glyph origin.
    pub advance: f32,
    /// Ink box width. Spaces use this as their advance.
    pub width: f32,
    /// Ink box height.
    pub height: f32,
    /// Width of the glyph cell including bearings.
    pub glyph_width: f32,
    /// Line height contribution.
    pub glyph_height: f32,
    /// Left side bearing.
    pub left: f32,
    pub ascent: f32,
    pub descent: f32,
    /// Per-glyph scale for glyphs rendered from a different design size.
    pub scale: f32,
}

impl GlyphMetrics {
    /// Ink that overhangs the advance cell on the right.
    pub fn right_overhang(&self) -> f32 {
        if self.advance < self.glyph_width {
            self.glyph_width - self.advance - self.left
        } else {
            0.0
        }
    }
}

/// Font-wide constants.
///
/// Thicknesses and offsets are fractions of the font size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConstants {
    /// Size the glyph metrics were measured at.
    pub font_size: f32,
    pub underline_thickness: f32,
    pub underline_offset: f32,
    pub strike_thickness: f32,
    pub strike_offset: f32,
    /// Size ratio applied to superscript and subscript runs.
    pub script_thickness: f32,
    /// Baseline correction, in design units.
    pub offset_y: f32,
    /// Reserve room below the last line for an underline.
    pub keep_underline_space: bool,
    pub stroke_scale: f32,
    pub normal_weight: f32,
    pub bold_weight_scale: f32,
}

impl Default for FontConstants {
    fn default() -> Self {
        Self {
            font_size: 32.0,
            underline_thickness: 0.05,
            underline_offset: 0.1,
            strike_thickness: 0.05,
            strike_offset: 0.0,
            script_thickness: 0.6,
            offset_y: 0.0,
            keep_underline_space: false,
            stroke_scale: 1.0,
            normal_weight: 0.25,
            bold_weight_scale: 1.6,
        }
    }
}

/// Source of glyph measurements for layout.
pub trait FontMetricsProvider: Send + Sync {
    fn constants(&self) -> &FontConstants;

    /// Metrics for `ch`, or `None` if the font has no such glyph.
    fn glyph(&self, ch: char) -> Option<GlyphMetrics>;

    /// Metrics used when [`glyph`](Self::glyph) returns `None`.
    fn fallback(&self) -> GlyphMetrics {
        self.glyph('?').unwrap_or_default()
    }
}

/// A fixed-advance font, used by tests, benches and demos.
#[derive(Debug, Clone)]
pub struct MonospaceFont {
    constants: FontConstants,
    advance: f32,
    overrides: HashMap<char, GlyphMetrics>,
}

impl MonospaceFont {
    /// Every glyph advances by one em.
    pub fn new(design_size: f32) -> Self {
        Self {
            constants: FontConstants {
                font_size: design_size,
                ..FontConstants::default()
            },
            advance: design_size,
            overrides: HashMap::new(),
        }
    }

    /// Advance in ems.
    pub fn with_advance(mut self, em: f32) -> Self {
        self.advance = self.constants.font_size * em;
        self
    }

    pub fn with_constants(mut self, constants: FontConstants) -> Self {
        let em = self.advance / self.constants.font_size.max(f32::EPSILON);
        self.constants = constants;
        self.advance = constants.font_size * em;
        self
    }

    pub fn with_glyph(mut self, ch: char, metrics: GlyphMetrics) -> Self {
        self.overrides.insert(ch, metrics);
        self
    }

    fn cell(&self, ch: char) -> GlyphMetrics {
        let size = self.constants.font_size;
        let ink = if ch.is_whitespace() {
            self.advance
        } else {
            self.advance * 0.8
        };
        GlyphMetrics {
            advance: self.advance,
            width: ink,
            height: size * 0.7,
            glyph_width: ink,
            glyph_height: size,
            left: (self.advance - ink) * 0.5,
            ascent: size * 0.7,
            descent: size * 0.2,
            scale: 1.0,
        }
    }
}

impl FontMetricsProvider for MonospaceFont {
    fn constants(&self) -> &FontConstants {
        &self.constants
    }

    fn glyph(&self, ch: char) -> Option<GlyphMetrics> {
        if let Some(metrics) = self.overrides.get(&ch) {
            return Some(*metrics);
        }
        if ch.is_control() && ch != '\n' {
            return None;
        }
        Some(self.cell(ch))
    }
}

/// Glyph table loaded from a JSON font description.
///
/// ```
/// use textmesh_text::font::{FontMetricsProvider, GlyphTableFont};
///
/// let font = GlyphTableFont::from_json(r#"{
///     "constants": { "font_size": 20 },
///     "glyphs": { "a": { "advance": 10, "width": 8, "height": 12, "glyph_height": 20 } }
/// }"#).unwrap();
/// assert_eq!(font.glyph('a').unwrap().advance, 10.0);
/// assert!(font.glyph('b').is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlyphTableFont {
    #[serde(default)]
    pub constants: FontConstants,
    #[serde(default)]
    pub glyphs: std::collections::BTreeMap<char, GlyphMetrics>,
}

impl GlyphTableFont {
    pub fn from_json(json: &str) -> TextResult<Self> {
        let mut font: Self = serde_json::from_str(json)?;
        for metrics in font.glyphs.values_mut() {
            if metrics.scale <= 0.0 {
                metrics.scale = 1.0;
            }
        }
        Ok(font)
    }
}

impl FontMetricsProvider for GlyphTableFont {
    fn constants(&self) -> &FontConstants {
        &self.constants
    }

    fn glyph(&self, ch: char) -> Option<GlyphMetrics> {
        self.glyphs.get(&ch).copied()
    }
}
