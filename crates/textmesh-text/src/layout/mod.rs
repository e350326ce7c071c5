//! Line layout.
//!
//! A layout call measures every unit at a font size and scale, runs the breaker over the
//! measured cells, then writes positions back into the units. Measurement passes share the
//! first two steps and stop before writing anything, which is what auto-fit probes use.

pub mod align;
pub mod autofit;
pub mod breaker;

use std::ops::Range;
use std::sync::Arc;

use glam::Vec2;
use textmesh_core::geometry::{Padding, Size};
use textmesh_core::profiling::{profile_function, profile_scope};

use crate::cache::{MeasureCache, MeasureKey, Measured};
use crate::config::TypesetConfig;
use crate::font::FontMetricsProvider;
use crate::metrics::{MeasureSource, MetricsContext, UnitMetrics};
use crate::script::{self, CharClass};
use crate::style::{HorizontalAlign, Overflow, ScriptType, StyleRecord, VerticalAlign};
use crate::unit::{CharStream, UnitContent};

use breaker::{BreakOptions, Cell};

/// The box text is laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Container {
    pub size: Size<f32>,
    /// Anchor point as a fraction of the size, measured from the top left corner.
    pub anchor: Vec2,
    pub padding: Padding,
}

impl Container {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Size::new(width, height),
            anchor: Vec2::splat(0.5),
            padding: Padding::ZERO,
        }
    }

    pub fn with_anchor(mut self, anchor: Vec2) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Size minus padding.
    pub fn inner(&self) -> Size<f32> {
        self.size.inset(self.padding)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Component-level inputs of a layout call.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParams {
    pub container: Container,
    pub font_size: f32,
    pub overflow: Overflow,
    pub auto_wrap: bool,
    pub horizontal_align: HorizontalAlign,
    pub vertical_align: VerticalAlign,
    pub font_auto_size: bool,
    pub font_min_size: f32,
    pub font_max_size: f32,
    /// Line height of runs with fixed line height.
    pub line_height: f32,
    /// Extra advance after an inline slot, in unscaled pixels.
    pub slot_space: f32,
    pub char_visible_ratio: f32,
}

impl LayoutParams {
    /// Read component-level properties from the base style. Padding comes from the style too.
    pub fn from_style(style: &StyleRecord, size: Size<f32>, anchor: Vec2) -> Self {
        Self {
            container: Container {
                size,
                anchor,
                padding: style.padding(),
            },
            font_size: style.font_size(),
            overflow: style.overflow(),
            auto_wrap: style.auto_wrap(),
            horizontal_align: style.horizontal_align(),
            vertical_align: style.vertical_align(),
            font_auto_size: style.font_auto_size(),
            font_min_size: style.font_min_size(),
            font_max_size: style.font_max_size(),
            line_height: style.font_size(),
            slot_space: 0.0,
            char_visible_ratio: style.char_visible_ratio(),
        }
    }

    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    pub fn with_slot_space(mut self, slot_space: f32) -> Self {
        self.slot_space = slot_space;
        self
    }

    /// Whether lines wrap at the inner width.
    pub fn auto_break(&self) -> bool {
        match self.overflow {
            Overflow::None => false,
            Overflow::Clamp | Overflow::Shrink => self.auto_wrap,
            Overflow::ResizeHeight => true,
        }
    }
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self::from_style(&StyleRecord::default(), Size::ZERO, Vec2::splat(0.5))
    }
}

/// One laid-out line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineInfo {
    /// Units on the line.
    pub range: Range<usize>,
    pub width: f32,
    pub height: f32,
    pub max_ascent: f32,
    pub max_descent: f32,
    pub max_ink_height: f32,
    /// Top edge, container-local once placed.
    pub top: f32,
    /// Horizontal alignment shift.
    pub x_offset: f32,
}

impl LineInfo {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Output of [`LayoutEngine::layout`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutResult {
    pub lines: Vec<LineInfo>,
    /// Content width, the widest line.
    pub width: f32,
    /// Content height, including line spacing.
    pub height: f32,
    pub last_max_descent: f32,
    /// Component font size the layout settled on.
    pub font_size: f32,
    /// Proportional shrink factor, 1 unless shrinking without auto-size.
    pub scale: f32,
    /// Final container size. Differs from the input in the resizing overflow modes.
    pub container: Size<f32>,
    pub padding: Padding,
    /// Offset from the anchor point to the container's top left corner.
    pub origin: Vec2,
}

impl LayoutResult {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The line holding `unit`.
    pub fn line_of(&self, unit: usize) -> Option<&LineInfo> {
        self.lines.iter().find(|line| line.range.contains(&unit))
    }
}

/// Component font size and layout scale of one pass.
#[derive(Debug, Clone, Copy)]
struct Sizing {
    font_size: f32,
    scale: f32,
}

impl Sizing {
    fn new(font_size: f32, scale: f32) -> Self {
        Self { font_size, scale }
    }
}

/// Lines and bounds of one pass, before placement.
#[derive(Debug, Default)]
struct Pass {
    lines: Vec<LineInfo>,
    width: f32,
    height: f32,
    last_max_descent: f32,
}

/// Lays out compiled streams.
pub struct LayoutEngine<'a> {
    font: Option<&'a dyn FontMetricsProvider>,
    config: &'a TypesetConfig,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(font: Option<&'a dyn FontMetricsProvider>, config: &'a TypesetConfig) -> Self {
        Self { font, config }
    }

    /// Content size of `stream` at component font size `font_size`, without touching units.
    ///
    /// Returns `None` without a font.
    pub fn measure(
        &self,
        stream: &CharStream,
        params: &LayoutParams,
        font_size: f32,
        wrap_width: Option<f32>,
    ) -> Option<Measured> {
        let font = self.font?;
        Some(self.measure_with(font, stream, params, font_size, wrap_width))
    }

    fn measure_with(
        &self,
        font: &dyn FontMetricsProvider,
        stream: &CharStream,
        params: &LayoutParams,
        font_size: f32,
        wrap_width: Option<f32>,
    ) -> Measured {
        profile_function!();
        let (cells, _) = self.measure_cells(font, stream, params, font_size, 1.0);
        let pass = self.run_pass(font, stream, &cells, params, wrap_width, Sizing::new(font_size, 1.0));
        Measured {
            width: pass.width,
            height: pass.height,
        }
    }

    /// Lay out `stream` and write positions into its units.
    ///
    /// Returns `None` without a font. `cache` serves auto-fit probes.
    pub fn layout(
        &self,
        stream: &mut CharStream,
        params: &LayoutParams,
        mut cache: Option<&mut MeasureCache>,
    ) -> Option<LayoutResult> {
        profile_function!();
        let Some(font) = self.font else {
            tracing::warn!("No font metrics provider, skipping layout");
            return None;
        };

        let padding = params.container.padding;
        let inner = params.container.inner();
        let wrap_width = params.auto_break().then_some(inner.width);
        let shrink = params.overflow == Overflow::Shrink;

        let mut font_size = params.font_size;
        if shrink && params.font_auto_size && !stream.is_empty() {
            font_size = self.fit(font, stream, params, wrap_width, cache.as_deref_mut());
        }

        let mut scale = 1.0;
        let (mut cells, mut metrics) = self.measure_cells(font, stream, params, font_size, scale);
        let mut pass =
            self.run_pass(font, stream, &cells, params, wrap_width, Sizing::new(font_size, scale));

        if shrink && !params.font_auto_size {
            if let Some(ratio) = shrink_ratio(&pass, inner, params.auto_wrap) {
                scale = ratio;
                (cells, metrics) = self.measure_cells(font, stream, params, font_size, scale);
                pass = self.run_pass(font, stream, &cells, params, wrap_width, Sizing::new(font_size, scale));
            }
        }

        let container = match params.overflow {
            Overflow::None => Size::new(
                pass.width + padding.horizontal(),
                pass.height + padding.vertical(),
            ),
            Overflow::ResizeHeight => Size::new(
                params.container.size.width,
                pass.height + padding.vertical(),
            ),
            Overflow::Clamp | Overflow::Shrink => params.container.size,
        };

        self.place(stream, &metrics, &cells, &mut pass, padding);

        if params.overflow != Overflow::None {
            align::align_horizontal(
                &mut stream.units,
                &mut pass.lines,
                inner.width,
                params.horizontal_align,
            );
        }
        if !matches!(params.overflow, Overflow::None | Overflow::ResizeHeight) {
            align::align_vertical(
                &mut stream.units,
                &mut pass.lines,
                container.inset(padding).height,
                pass.height,
                params.vertical_align,
            );
        }

        reveal(stream, params.char_visible_ratio);

        tracing::debug!(
            "Laid out {} units in {} lines ({:.1}x{:.1}, font size {}, scale {})",
            stream.len(),
            pass.lines.len(),
            pass.width,
            pass.height,
            font_size,
            scale
        );

        Some(LayoutResult {
            lines: pass.lines,
            width: pass.width,
            height: pass.height,
            last_max_descent: pass.last_max_descent,
            font_size,
            scale,
            container,
            padding,
            origin: align::anchor_origin(container, params.container.anchor),
        })
    }

    /// Largest font size in the configured range whose content fits the inner box.
    fn fit(
        &self,
        font: &dyn FontMetricsProvider,
        stream: &CharStream,
        params: &LayoutParams,
        wrap_width: Option<f32>,
        mut cache: Option<&mut MeasureCache>,
    ) -> f32 {
        profile_scope!("autofit");
        let inner = params.container.inner();
        let text: Arc<str> = Arc::from(stream.text());

        autofit::fit_font_size(params.font_min_size, params.font_max_size, self.config, |size| {
            let measure = || self.measure_with(font, stream, params, size, wrap_width);
            let measured = match cache.as_deref_mut() {
                Some(cache) => {
                    cache.get_or_measure(&text, MeasureKey::new(&text, size, wrap_width), measure)
                }
                None => measure(),
            };
            (!params.auto_wrap && measured.width > inner.width) || measured.height > inner.height
        })
    }

    /// Measure every unit and derive its breaker cell.
    fn measure_cells(
        &self,
        font: &dyn FontMetricsProvider,
        stream: &CharStream,
        params: &LayoutParams,
        font_size: f32,
        scale: f32,
    ) -> (Vec<Cell>, Vec<UnitMetrics>) {
        profile_function!();
        let constants = font.constants();
        let mut cells = Vec::with_capacity(stream.len());
        let mut metrics = Vec::with_capacity(stream.len());

        for unit in &stream.units {
            let style = stream.style_of(unit);
            let context = MetricsContext {
                font: constants,
                config: self.config,
                aspect: style.aspect(),
                equal_width: style.equal_width(),
                fixed_line_height: style.fixed_line_height().then_some(params.line_height * scale),
            };
            let source = match unit.content {
                UnitContent::Char(ch) => MeasureSource::Char(ch, &unit.glyph),
                UnitContent::Slot(slot) => {
                    let (width, height) = stream
                        .slots
                        .get(slot)
                        .map_or((0.0, 0.0), |s| (s.width, s.height));
                    MeasureSource::Slot { width, height }
                }
            };
            let m = context.measure(source, style, style.resolved_font_size(font_size), scale);

            let mut cell = Cell::for_char(unit.content.as_char(), unit.content.class());
            cell.w = m.w;
            cell.advance = self.advance(unit.content, &m, style, params, scale);
            cell.skew = m.skew;
            cell.skew_descent = m.skew_descent;
            cell.bearing_right = m.bearing_right;
            cell.line_height = m.line_height;
            cell.ascent = m.ascent;
            cell.descent = m.descent;
            cell.ink_height = m.ink_height;
            cell.italic = style.italic();
            cell.script = style.script_type();
            cell.break_western = style.break_western();

            cells.push(cell);
            metrics.push(m);
        }
        (cells, metrics)
    }

    /// Distance to the next unit's origin before cross-unit extras.
    fn advance(
        &self,
        content: UnitContent,
        m: &UnitMetrics,
        style: &StyleRecord,
        params: &LayoutParams,
        scale: f32,
    ) -> f32 {
        match content {
            UnitContent::Slot(_) => m.w + params.slot_space * scale,
            UnitContent::Char(ch) if script::is_punctuation(ch) => {
                m.w + self.config.punctuation_spacing * scale
            }
            UnitContent::Char(_) => m.w + style.letter_space() * scale,
        }
    }

    /// Break `cells` into lines and stack them. Line tops are relative to the content box.
    fn run_pass(
        &self,
        font: &dyn FontMetricsProvider,
        stream: &CharStream,
        cells: &[Cell],
        params: &LayoutParams,
        wrap_width: Option<f32>,
        sizing: Sizing,
    ) -> Pass {
        profile_function!();
        let options = BreakOptions {
            max_width: wrap_width.unwrap_or(f32::INFINITY),
            auto_break: wrap_width.is_some(),
            align_right: params.horizontal_align == HorizontalAlign::Right,
        };

        let mut pass = Pass::default();
        let n = cells.len();
        let mut start = 0;

        while start < n {
            let info = breaker::scan_line(cells, start, pass.lines.len(), options);
            let line = LineInfo {
                range: start..info.end,
                width: breaker::line_width(cells, start, info.end),
                height: info.line_height,
                max_ascent: info.max_ascent,
                max_descent: info.max_descent,
                max_ink_height: info.max_ink_height,
                ..Default::default()
            };
            push_line(&mut pass, stream, line, sizing.scale);
            start = info.end;
        }

        if cells.last().is_some_and(|c| c.class == CharClass::Newline) {
            let mut empty = breaker::line_metrics(cells, n - 1, n);
            empty.end = n;
            let line = LineInfo {
                range: n..n,
                height: empty.line_height,
                max_ascent: empty.max_ascent,
                max_descent: empty.max_descent,
                max_ink_height: empty.max_ink_height,
                ..Default::default()
            };
            push_line(&mut pass, stream, line, sizing.scale);
        }

        pass.last_max_descent = pass.lines.last().map_or(0.0, |l| l.max_descent);
        pass.height += underline_space(font, stream, sizing);
        pass
    }

    /// Write metrics and positions into the units.
    fn place(
        &self,
        stream: &mut CharStream,
        metrics: &[UnitMetrics],
        cells: &[Cell],
        pass: &mut Pass,
        padding: Padding,
    ) {
        profile_function!();
        let CharStream { units, styles, .. } = stream;
        let mut offsets = Vec::new();

        for (line_index, line) in pass.lines.iter_mut().enumerate() {
            line.top += padding.top;
            breaker::line_offsets(cells, line.range.start, line.range.end, &mut offsets);
            let centering = (line.height - line.max_ink_height) * 0.5;
            let bottom = line.bottom();

            for (in_line, i) in line.range.clone().enumerate() {
                let m = metrics[i];
                let unit = &mut units[i];
                let mut lift = centering + m.baseline_fix;
                match styles.get(unit.style).script_type() {
                    ScriptType::Superscript => lift += line.height - m.h * 0.5,
                    ScriptType::Subscript => lift -= m.descent,
                    ScriptType::None => {}
                }

                unit.metrics = m;
                unit.line = line_index;
                unit.in_line = in_line;
                unit.x = padding.left + offsets[in_line];
                unit.y = bottom - lift;
                unit.line_top = line.top;
                unit.visible = !unit.content.class().is_whitespace();
            }
        }
    }
}

/// Append `line`, adding the previous line's spacing when the new line has height.
fn push_line(pass: &mut Pass, stream: &CharStream, mut line: LineInfo, scale: f32) {
    let gap = match pass.lines.last() {
        Some(prev) if line.height > 0.0 => prev
            .range
            .end
            .checked_sub(1)
            .and_then(|last| stream.units.get(last))
            .map_or(0.0, |unit| stream.style_of(unit).line_space() * scale),
        _ => 0.0,
    };
    pass.height += gap;
    line.top = pass.height;
    pass.height += line.height;
    pass.width = pass.width.max(line.width);
    pass.lines.push(line);
}

/// Room reserved below the last line for an underline, when the font asks for it.
///
/// Sized from the last run's style at the pass font size, never from unit metrics, which
/// still hold the previous layout.
fn underline_space(font: &dyn FontMetricsProvider, stream: &CharStream, sizing: Sizing) -> f32 {
    let constants = font.constants();
    if !constants.keep_underline_space {
        return 0.0;
    }
    match stream.units.last() {
        Some(unit) if stream.style_of(unit).underline() => {
            let size = stream.style_of(unit).resolved_font_size(sizing.font_size) * sizing.scale;
            (size * constants.underline_thickness - size * constants.underline_offset).max(0.0)
        }
        _ => 0.0,
    }
}

/// Scale that fits an overflowing pass on the constraining axis.
fn shrink_ratio(pass: &Pass, inner: Size<f32>, auto_wrap: bool) -> Option<f32> {
    let (content, available) = if auto_wrap {
        (pass.height, inner.height)
    } else {
        (pass.width, inner.width)
    };
    (content > available && available > 0.0).then(|| available / content)
}

/// Mark units past the visible-character ratio as hidden.
pub(crate) fn reveal(stream: &mut CharStream, ratio: f32) {
    let shown = stream.len() as f32 * ratio.clamp(0.0, 1.0);
    for (i, unit) in stream.units.iter_mut().enumerate() {
        unit.revealed = (i as f32) < shown;
    }
}
