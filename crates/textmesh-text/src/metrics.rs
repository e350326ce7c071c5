//! Per-unit geometry at a given font size and layout scale.

use crate::config::TypesetConfig;
use crate::font::{FontConstants, GlyphMetrics};
use crate::script::{self, CharClass};
use crate::style::StyleRecord;

/// Computed geometry of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UnitMetrics {
    /// Advance cell width, before letter spacing.
    pub w: f32,
    /// Cell height.
    pub h: f32,
    pub ink_width: f32,
    pub ink_height: f32,
    pub ascent: f32,
    pub descent: f32,
    /// Contribution to the line height.
    pub line_height: f32,
    /// Italic overhang at the top of the ink box.
    pub skew: f32,
    /// Italic underhang below the baseline.
    pub skew_descent: f32,
    pub bearing_left: f32,
    /// Ink past the advance cell on the right.
    pub bearing_right: f32,
    /// Offset that centers the ink inside the advance cell.
    pub offset_x: f32,
    /// Font baseline correction, scaled.
    pub baseline_fix: f32,
    pub font_size: f32,
    pub scale: f32,
}

/// What is being measured.
#[derive(Debug, Clone, Copy)]
pub enum MeasureSource<'a> {
    Char(char, &'a GlyphMetrics),
    Slot { width: f32, height: f32 },
}

/// Label-wide inputs to the calculator.
#[derive(Debug, Clone, Copy)]
pub struct MetricsContext<'a> {
    pub font: &'a FontConstants,
    pub config: &'a TypesetConfig,
    pub aspect: f32,
    pub equal_width: bool,
    /// Line height used for every unit when set.
    pub fixed_line_height: Option<f32>,
}

impl MetricsContext<'_> {
    /// Measure one unit.
    ///
    /// `font_size` is the real (script adjusted) size of the unit's run. `scale` is the layout
    /// scale of proportional shrinking.
    pub fn measure(
        &self,
        source: MeasureSource<'_>,
        style: &StyleRecord,
        font_size: f32,
        scale: f32,
    ) -> UnitMetrics {
        let mut m = UnitMetrics {
            font_size,
            scale,
            ..Default::default()
        };

        let (glyph, ch) = match source {
            MeasureSource::Slot { width, height } => {
                m.w = width * scale;
                m.h = height * scale;
                m.ink_width = m.w;
                m.ink_height = m.h;
                m.ascent = m.h;
                m.line_height = self.fixed_line_height.unwrap_or(m.h);
                return m;
            }
            MeasureSource::Char(ch, glyph) => (glyph, ch),
        };

        let glyph_scale = if glyph.scale > 0.0 { glyph.scale } else { 1.0 };
        let design = self.font.font_size.max(f32::EPSILON);
        let ratio = font_size / (design * glyph_scale) * scale;
        let ratio_x = ratio * self.aspect;

        match CharClass::of(ch) {
            CharClass::Newline | CharClass::Space => {
                m.w = if ch == '\n' { 0.0 } else { glyph.width * ratio_x };
                m.h = font_size * scale;
                m.line_height = self.fixed_line_height.unwrap_or(m.h);
                return m;
            }
            _ => {}
        }

        m.ascent = glyph.ascent * ratio;
        m.descent = glyph.descent * ratio;
        m.ink_width = glyph.width * ratio_x;
        m.ink_height = glyph.height * ratio;
        m.w = glyph.advance * ratio_x;
        m.h = glyph.glyph_height * ratio;
        m.line_height = self.fixed_line_height.unwrap_or(m.h);

        if self.equal_width {
            m.w = font_size * scale;
        }

        if style.stroke() > 0.0 {
            m.w += style.stroke() * font_size * scale * self.config.stroke_advance_factor;
        }

        if style.italic() {
            m.skew = m.ink_height * self.config.italic_skew_factor;
            m.skew_descent = m.descent * self.config.italic_skew_factor;
        }

        if script::is_punctuation(ch) {
            m.w = m.w.max(m.ink_width);
        }

        m.bearing_left = glyph.left * ratio_x;
        m.bearing_right = glyph.right_overhang() * ratio_x;
        m.offset_x = (m.w - m.ink_width) * 0.5;
        m.baseline_fix = self.font.offset_y * ratio;

        if self.equal_width {
            m.bearing_left = m.offset_x;
            m.bearing_right = 0.0;
        }

        m
    }
}
