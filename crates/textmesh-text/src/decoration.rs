//! Decoration quads: backgrounds, underlines, strikethroughs and masks.
//!
//! Quads are built per line from runs of adjacent units that share a decoration color, so a
//! renderer can draw each run as one rectangle. Bounds are container-local, like unit
//! positions.

use textmesh_core::profiling::profile_function;
use textmesh_core::{Color, Rect};

use crate::config::TypesetConfig;
use crate::font::FontConstants;
use crate::layout::{LayoutResult, LineInfo};
use crate::style::StyleRecord;
use crate::unit::{CharStream, CharUnit};

/// Type of decoration quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecorationQuadType {
    /// Drawn behind the text, covering the line box.
    Background,
    Underline { thickness: f32 },
    Strikethrough { thickness: f32 },
    /// Drawn over the text, covering the line box.
    Mask,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecorationQuad {
    pub bounds: Rect<f32>,
    pub color: Color,
    pub quad_type: DecorationQuadType,
}

impl DecorationQuad {
    pub fn new(bounds: Rect<f32>, color: Color, quad_type: DecorationQuadType) -> Self {
        Self {
            bounds,
            color,
            quad_type,
        }
    }

    pub fn background(x: f32, y: f32, width: f32, height: f32, color: Color) -> Self {
        Self::new(Rect::new(x, y, width, height), color, DecorationQuadType::Background)
    }

    pub fn mask(x: f32, y: f32, width: f32, height: f32, color: Color) -> Self {
        Self::new(Rect::new(x, y, width, height), color, DecorationQuadType::Mask)
    }

    /// An underline centered on `center_y`.
    pub fn underline(x: f32, center_y: f32, width: f32, thickness: f32, color: Color) -> Self {
        Self::new(
            Rect::new(x, center_y - thickness * 0.5, width, thickness),
            color,
            DecorationQuadType::Underline { thickness },
        )
    }

    /// A strikethrough centered on `center_y`.
    pub fn strikethrough(x: f32, center_y: f32, width: f32, thickness: f32, color: Color) -> Self {
        Self::new(
            Rect::new(x, center_y - thickness * 0.5, width, thickness),
            color,
            DecorationQuadType::Strikethrough { thickness },
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Layer {
    Background,
    Underline,
    Strike,
    Mask,
}

impl Layer {
    /// Draw order.
    const ALL: [Layer; 4] = [Layer::Background, Layer::Underline, Layer::Strike, Layer::Mask];

    fn color(self, style: &StyleRecord) -> Option<Color> {
        match self {
            Layer::Background => style.background().then(|| style.background_color()),
            Layer::Underline => style.underline().then(|| style.underline_color()),
            Layer::Strike => style.strike().then(|| style.strike_color()),
            Layer::Mask => style.mask().then(|| style.mask_color()),
        }
    }
}

struct Run {
    color: Color,
    left: f32,
    right: f32,
    /// Lowest unit box bottom in the run.
    bottom: f32,
    ink_height: f32,
    font_size: f32,
}

impl Run {
    fn start(unit: &CharUnit, color: Color) -> Self {
        let mut run = Self {
            color,
            left: unit.x,
            right: unit.x,
            bottom: unit.y,
            ink_height: 0.0,
            font_size: 0.0,
        };
        run.extend(unit);
        run
    }

    fn extend(&mut self, unit: &CharUnit) {
        let m = &unit.metrics;
        self.right = self.right.max(unit.right());
        self.bottom = self.bottom.max(unit.y);
        self.ink_height = self.ink_height.max(m.ink_height);
        self.font_size = self.font_size.max(m.font_size * m.scale);
    }

    fn finish(
        self,
        layer: Layer,
        line: &LineInfo,
        font: &FontConstants,
        config: &TypesetConfig,
    ) -> DecorationQuad {
        let width = self.right - self.left;
        let fs = self.font_size;
        match layer {
            Layer::Background => {
                DecorationQuad::background(self.left, line.top, width, line.height, self.color)
            }
            Layer::Mask => DecorationQuad::mask(self.left, line.top, width, line.height, self.color),
            Layer::Underline => {
                let thickness = (fs * font.underline_thickness).max(config.min_decoration_thickness);
                let center = self.bottom + fs * font.underline_offset;
                DecorationQuad::underline(self.left, center, width, thickness, self.color)
            }
            Layer::Strike => {
                let thickness = (fs * font.strike_thickness).max(config.min_decoration_thickness);
                let center = self.bottom - self.ink_height * 0.5 - fs * font.strike_offset;
                DecorationQuad::strikethrough(self.left, center, width, thickness, self.color)
            }
        }
    }
}

/// Build every decoration quad of a laid-out stream.
///
/// Newlines and units hidden by the visible-character ratio break runs.
pub fn build_decorations(
    stream: &CharStream,
    result: &LayoutResult,
    font: &FontConstants,
    config: &TypesetConfig,
) -> Vec<DecorationQuad> {
    profile_function!();
    let mut quads = Vec::new();

    for layer in Layer::ALL {
        for line in &result.lines {
            let mut run: Option<Run> = None;
            for unit in &stream.units[line.range.clone()] {
                let color = if unit.revealed && !unit.is_newline() {
                    layer.color(stream.style_of(unit))
                } else {
                    None
                };
                match (run.as_mut(), color) {
                    (Some(current), Some(color)) if current.color == color => current.extend(unit),
                    _ => {
                        if let Some(done) = run.take() {
                            quads.push(done.finish(layer, line, font, config));
                        }
                        run = color.map(|color| Run::start(unit, color));
                    }
                }
            }
            if let Some(done) = run {
                quads.push(done.finish(layer, line, font, config));
            }
        }
    }

    quads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::MarkupCompiler;
    use crate::font::{FontMetricsProvider, MonospaceFont};
    use crate::layout::{LayoutEngine, LayoutParams};
    use crate::markup::{Element, MarkupTree};
    use crate::registry::NoStyles;
    use glam::Vec2;
    use textmesh_core::Size;
    use textmesh_core::alloc::Pool;

    fn layout(tree: &MarkupTree) -> (CharStream, LayoutResult, MonospaceFont) {
        let font = MonospaceFont::new(10.0);
        let config = TypesetConfig::default();
        let mut base = StyleRecord::default();
        base.set_font_size(10.0, true);
        base.calculate();
        let mut pool = Pool::new();
        let mut stream = MarkupCompiler::new(&font, &NoStyles).compile(tree, base.clone(), &mut pool);
        let params = LayoutParams::from_style(&base, Size::new(200.0, 100.0), Vec2::ZERO);
        let result = LayoutEngine::new(Some(&font), &config)
            .layout(&mut stream, &params, None)
            .unwrap();
        (stream, result, font)
    }

    #[test]
    fn test_underline_run() {
        let tree = MarkupTree::new()
            .with("ab")
            .with(Element::new("u").with_text("cde"))
            .with("f");
        let (stream, result, font) = layout(&tree);
        let quads = build_decorations(&stream, &result, font.constants(), &TypesetConfig::default());

        assert_eq!(quads.len(), 1);
        let quad = &quads[0];
        assert!(matches!(quad.quad_type, DecorationQuadType::Underline { thickness } if thickness == 4.0));
        assert_eq!(quad.bounds.x, 20.0);
        assert_eq!(quad.bounds.width, 30.0);
    }

    #[test]
    fn test_color_change_splits_runs() {
        let tree = MarkupTree::new()
            .with(Element::new("s").with_child(Element::new("color").with_value("#ff0000").with_text("ab")))
            .with(Element::new("s").with_text("cd"));
        let (stream, result, font) = layout(&tree);
        let quads = build_decorations(&stream, &result, font.constants(), &TypesetConfig::default());
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[0].color, Color::RED);
        assert_ne!(quads[1].color, Color::RED);
    }

    #[test]
    fn test_background_covers_line_box() {
        let tree = MarkupTree::new().with(Element::new("bg").with_text("abc"));
        let (stream, result, font) = layout(&tree);
        let quads = build_decorations(&stream, &result, font.constants(), &TypesetConfig::default());
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].quad_type, DecorationQuadType::Background);
        assert_eq!(quads[0].bounds.y, result.lines[0].top);
        assert_eq!(quads[0].bounds.height, result.lines[0].height);
    }
}
