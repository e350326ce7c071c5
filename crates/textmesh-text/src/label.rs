//! A text label: component settings, compiled stream and cached layout.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use textmesh_core::alloc::Pool;
use textmesh_core::profiling::{profile_function, profile_scope};
use textmesh_core::{Color, Padding, Size};

use crate::cache::MeasureCache;
use crate::compiler::MarkupCompiler;
use crate::config::TypesetConfig;
use crate::decoration::{DecorationQuad, build_decorations};
use crate::dirty::DirtyFlags;
use crate::error::{TextError, TextResult};
use crate::font::{FontConstants, FontMetricsProvider};
use crate::hit_test::{HitTest, hit_test};
use crate::layout::align::{SlotPlacement, place_slots};
use crate::layout::{self, LayoutEngine, LayoutParams, LayoutResult};
use crate::markup::MarkupTree;
use crate::registry::StyleResolver;
use crate::style::{Corner, HorizontalAlign, Overflow, StyleRecord, VerticalAlign};
use crate::unit::{CharStream, CharUnit, Clickable, InlineSlot};

/// Component-level properties. They seed the base style and flow into every run style that
/// does not override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    pub font_size: f32,
    pub color: Color,
    /// Multiplies every color's alpha.
    pub opacity: f32,
    /// Gradient corner colors, in [`Corner::ALL`] order.
    pub corner_colors: [Option<Color>; 4],

    pub stroke: f32,
    pub stroke_color: Color,
    pub stroke_blur: f32,
    /// Use the stroke color's own alpha instead of the fill's.
    pub custom_stroke_alpha: bool,

    pub shadow: f32,
    pub shadow_color: Color,
    pub shadow_offset_x: f32,
    pub shadow_offset_y: f32,
    /// Shadow blur at the font's design size.
    pub shadow_blur: f32,
    pub custom_shadow_alpha: bool,

    pub glow: bool,
    pub glow_color: Color,
    pub glow_inner: f32,
    pub glow_outer: f32,
    pub glow_power: f32,
    pub glow_offset_x: f32,
    pub glow_offset_y: f32,

    pub background: bool,
    pub background_color: Color,
    pub mask: bool,
    pub mask_color: Color,

    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Follows the fill when unset.
    pub underline_color: Option<Color>,
    pub strike: bool,
    pub strike_color: Option<Color>,
    pub dilate: f32,

    pub letter_space: f32,
    pub line_space: f32,
    pub auto_wrap: bool,
    pub equal_width: bool,
    pub fixed_line_height: bool,
    pub line_height: f32,
    pub horizontal_align: HorizontalAlign,
    pub vertical_align: VerticalAlign,
    pub overflow: Overflow,
    pub font_auto_size: bool,
    pub font_min_size: f32,
    pub font_max_size: f32,
    pub padding: Padding,
    pub aspect: f32,
    pub char_visible_ratio: f32,
    pub break_western: bool,
    pub slot_space: f32,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            font_size: 18.0,
            color: Color::WHITE,
            opacity: 1.0,
            corner_colors: [None; 4],
            stroke: 0.0,
            stroke_color: Color::BLACK,
            stroke_blur: 0.0,
            custom_stroke_alpha: false,
            shadow: 0.0,
            shadow_color: Color::BLACK,
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
            shadow_blur: 0.1,
            custom_shadow_alpha: false,
            glow: false,
            glow_color: Color::WHITE,
            glow_inner: 0.0,
            glow_outer: 0.0,
            glow_power: 0.0,
            glow_offset_x: 0.0,
            glow_offset_y: 0.0,
            background: false,
            background_color: Color::BLACK,
            mask: false,
            mask_color: Color::from_rgba_u8(0, 0, 0, 128),
            bold: false,
            italic: false,
            underline: false,
            underline_color: None,
            strike: false,
            strike_color: None,
            dilate: 0.25,
            letter_space: 0.0,
            line_space: 0.0,
            auto_wrap: true,
            equal_width: false,
            fixed_line_height: false,
            line_height: 18.0,
            horizontal_align: HorizontalAlign::Left,
            vertical_align: VerticalAlign::Top,
            overflow: Overflow::Clamp,
            font_auto_size: false,
            font_min_size: 10.0,
            font_max_size: 40.0,
            padding: Padding::ZERO,
            aspect: 1.0,
            char_visible_ratio: 1.0,
            break_western: false,
            slot_space: 0.0,
        }
    }
}

impl LabelSettings {
    pub fn from_json(json: &str) -> TextResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn faded(&self, color: Color) -> Color {
        color.with_alpha(color.a * self.opacity)
    }

    /// Write these settings into `style` without touching its explicit values.
    pub fn apply_to(&self, style: &mut StyleRecord, font: &FontConstants, config: &TypesetConfig) {
        let fill = self.faded(self.color);
        style.set_font_size(self.font_size, false);
        style.set_fill_color(fill, false);
        for (corner, color) in Corner::ALL.into_iter().zip(self.corner_colors) {
            if let Some(color) = color {
                style.set_corner_color(corner, self.faded(color), false);
            }
        }

        style.set_stroke(self.stroke * font.stroke_scale / 4.0, false);
        style.set_stroke_blur(if self.stroke > 0.0 { self.stroke_blur } else { 0.0 }, false);
        let stroke_alpha = if self.custom_stroke_alpha {
            self.stroke_color.a * self.opacity
        } else {
            fill.a
        };
        style.set_stroke_color(self.stroke_color.with_alpha(stroke_alpha), false);

        let size_scale = self.font_size / font.font_size.max(f32::EPSILON);
        let shadow_alpha = if self.custom_shadow_alpha {
            self.shadow_color.a * self.opacity
        } else {
            fill.a
        };
        style.set_shadow(self.shadow, false);
        style.set_shadow_color(self.shadow_color.with_alpha(shadow_alpha), false);
        style.set_shadow_offset_x(self.shadow_offset_x, false);
        style.set_shadow_offset_y(self.shadow_offset_y, false);
        style.set_shadow_blur(self.shadow_blur * size_scale, false);

        style.set_enable_glow(self.glow, false);
        style.set_glow_color(self.faded(self.glow_color), false);
        style.set_glow_inner(self.glow_inner, false);
        style.set_glow_outer(self.glow_outer, false);
        style.set_glow_power(self.glow_power, false);
        style.set_glow_offset_x(self.glow_offset_x, false);
        style.set_glow_offset_y(self.glow_offset_y, false);

        style.set_background(self.background, false);
        style.set_background_color(self.faded(self.background_color), false);
        style.set_mask(self.mask, false);
        style.set_mask_color(self.faded(self.mask_color), false);

        // Bold runs from markup thicken too, unless they set their own dilate.
        style.set_bold(self.bold, false);
        let dilate = if style.bold() {
            self.dilate * font.bold_weight_scale
        } else {
            self.dilate
        };
        style.set_dilate(dilate, false);
        style.set_italic(self.italic, false);
        style.set_underline(self.underline, false);
        let run_fill = style.fill_color();
        style.set_underline_color(self.underline_color.unwrap_or(run_fill), false);
        style.set_strike(self.strike, false);
        style.set_strike_color(self.strike_color.unwrap_or(run_fill), false);

        style.set_letter_space(self.letter_space, false);
        style.set_line_space(self.line_space, false);
        style.set_auto_wrap(self.auto_wrap, false);
        style.set_equal_width(self.equal_width, false);
        style.set_fixed_line_height(self.fixed_line_height, false);
        style.set_horizontal_align(self.horizontal_align, false);
        style.set_vertical_align(self.vertical_align, false);
        style.set_overflow(self.overflow, false);
        style.set_font_auto_size(self.font_auto_size, false);
        style.set_font_min_size(self.font_min_size, false);
        style.set_font_max_size(self.font_max_size, false);
        style.set_padding(self.padding, false);
        style.set_aspect(self.aspect, false);
        style.set_char_visible_ratio(self.char_visible_ratio, false);
        style.set_break_western(self.break_western, false);

        let script_ratio = if font.script_thickness > 0.0 {
            font.script_thickness
        } else {
            config.default_script_ratio
        };
        style.set_script_ratio(script_ratio);
        style.calculate();
    }

    /// Whether switching from `self` to `other` moves any glyph.
    pub fn layout_differs(&self, other: &LabelSettings) -> bool {
        self.font_size != other.font_size
            || self.stroke != other.stroke
            || self.italic != other.italic
            || self.letter_space != other.letter_space
            || self.line_space != other.line_space
            || self.auto_wrap != other.auto_wrap
            || self.equal_width != other.equal_width
            || self.fixed_line_height != other.fixed_line_height
            || self.line_height != other.line_height
            || self.horizontal_align != other.horizontal_align
            || self.vertical_align != other.vertical_align
            || self.overflow != other.overflow
            || self.font_auto_size != other.font_auto_size
            || self.font_min_size != other.font_min_size
            || self.font_max_size != other.font_max_size
            || self.padding != other.padding
            || self.aspect != other.aspect
            || self.break_western != other.break_western
            || self.slot_space != other.slot_space
    }
}

#[derive(Debug, Clone)]
enum Source {
    Plain(String),
    Markup(MarkupTree),
}

/// Compiles, lays out and caches one piece of text.
///
/// Setters only record what changed; [`update`](Self::update) does the work.
///
/// ```
/// use std::sync::Arc;
/// use textmesh_text::{MonospaceFont, NoStyles, TextLabel};
///
/// let mut label = TextLabel::new(Some(Arc::new(MonospaceFont::new(10.0))))
///     .with_size(300.0, 40.0);
/// label.set_text("hello world");
/// let layout = label.update(&NoStyles).unwrap();
/// assert_eq!(layout.line_count(), 1);
/// ```
pub struct TextLabel {
    font: Option<Arc<dyn FontMetricsProvider>>,
    config: TypesetConfig,
    settings: LabelSettings,
    named_base: Option<StyleRecord>,
    size: Size<f32>,
    anchor: Vec2,
    source: Source,
    pool: Pool<CharUnit>,
    stream: CharStream,
    generation: u32,
    resolver_revision: u64,
    cache: MeasureCache,
    layout: Option<LayoutResult>,
    dirty: DirtyFlags,
}

impl TextLabel {
    pub fn new(font: Option<Arc<dyn FontMetricsProvider>>) -> Self {
        Self {
            font,
            config: TypesetConfig::default(),
            settings: LabelSettings::default(),
            named_base: None,
            size: Size::ZERO,
            anchor: Vec2::splat(0.5),
            source: Source::Plain(String::new()),
            pool: Pool::new(),
            stream: CharStream::default(),
            generation: 0,
            resolver_revision: 0,
            cache: MeasureCache::new(),
            layout: None,
            dirty: DirtyFlags::ALL,
        }
    }

    pub fn with_config(mut self, config: TypesetConfig) -> Self {
        self.config = config;
        self.dirty = DirtyFlags::ALL;
        self
    }

    pub fn with_settings(mut self, settings: LabelSettings) -> Self {
        self.settings = settings;
        self.dirty = DirtyFlags::ALL;
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.set_size(width, height);
        self
    }

    pub fn set_font(&mut self, font: Option<Arc<dyn FontMetricsProvider>>) {
        self.font = font;
        self.dirty = DirtyFlags::ALL;
    }

    /// The font, or [`TextError::MissingFont`].
    pub fn font(&self) -> TextResult<&dyn FontMetricsProvider> {
        self.font.as_deref().ok_or(TextError::MissingFont)
    }

    pub fn settings(&self) -> &LabelSettings {
        &self.settings
    }

    /// Replace the settings. Changes that move no glyph only restyle.
    pub fn set_settings(&mut self, settings: LabelSettings) {
        if settings == self.settings {
            return;
        }
        if self.settings.layout_differs(&settings) {
            self.dirty |= DirtyFlags::LAYOUT;
            self.cache.clear();
        }
        self.settings = settings;
        self.dirty |= DirtyFlags::STYLE;
    }

    pub fn set_color(&mut self, color: Color) {
        if self.settings.color != color {
            self.settings.color = color;
            self.dirty |= DirtyFlags::STYLE;
        }
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        let size = Size::new(width, height);
        if self.size != size {
            self.size = size;
            self.dirty |= DirtyFlags::LAYOUT;
        }
    }

    pub fn set_anchor(&mut self, anchor: Vec2) {
        if self.anchor != anchor {
            self.anchor = anchor;
            self.dirty |= DirtyFlags::LAYOUT;
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.source = Source::Plain(text.into());
        self.dirty |= DirtyFlags::TEXT;
    }

    pub fn set_markup(&mut self, tree: MarkupTree) {
        self.source = Source::Markup(tree);
        self.dirty |= DirtyFlags::TEXT;
    }

    /// Layer a named style under every run, or remove it with `None`.
    pub fn set_base_style(&mut self, style: Option<StyleRecord>) {
        self.named_base = style;
        self.dirty |= DirtyFlags::TEXT;
    }

    /// Reveal only the first `ratio` of the units. Does not lay out again.
    pub fn set_char_visible_ratio(&mut self, ratio: f32) {
        self.settings.char_visible_ratio = ratio;
        if self.dirty.needs_layout() {
            return;
        }
        layout::reveal(&mut self.stream, ratio);
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    /// Compile, restyle and lay out as needed.
    ///
    /// Returns `None` when there is no font.
    pub fn update(&mut self, resolver: &dyn StyleResolver) -> Option<&LayoutResult> {
        profile_function!();

        let Some(font) = self.font.clone() else {
            tracing::warn!("Text label has no font, skipping update");
            self.layout = None;
            return None;
        };

        if resolver.revision() != self.resolver_revision {
            self.resolver_revision = resolver.revision();
            self.dirty |= DirtyFlags::TEXT;
        }

        if self.dirty.needs_compile() {
            self.compile(font.as_ref(), resolver);
        } else if self.dirty.contains(DirtyFlags::STYLE) {
            self.restyle(font.constants());
        }

        if self.dirty.needs_layout() || self.layout.is_none() {
            self.relayout(font.as_ref());
        }

        self.dirty = DirtyFlags::NONE;
        self.layout.as_ref()
    }

    fn compile(&mut self, font: &dyn FontMetricsProvider, resolver: &dyn StyleResolver) {
        profile_scope!("compile");
        self.generation = self.pool.recycle(self.stream.units.drain(..));
        self.cache.clear();
        self.layout = None;

        let mut base = StyleRecord::new();
        if let Some(named) = &self.named_base {
            base.copy_from(named, true);
            base.preset();
        }
        self.settings.apply_to(&mut base, font.constants(), &self.config);

        let compiler = MarkupCompiler::new(font, resolver);
        self.stream = match &self.source {
            Source::Plain(text) => compiler.compile_plain(text, base, &mut self.pool),
            Source::Markup(tree) => compiler.compile(tree, base, &mut self.pool),
        };
        self.restyle(font.constants());
        self.dirty |= DirtyFlags::LAYOUT;
    }

    fn restyle(&mut self, font: &FontConstants) {
        // A pending layout decides the size again, so only a pure restyle keeps the fitted one.
        let fitted = self
            .layout
            .as_ref()
            .filter(|_| self.dirty.is_style_only())
            .map(|result| result.font_size)
            .filter(|&size| size != self.settings.font_size);
        for style in self.stream.styles.iter_mut() {
            self.settings.apply_to(style, font, &self.config);
            if let Some(size) = fitted {
                style.set_font_size(size, false);
                style.calculate();
            }
        }
    }

    fn relayout(&mut self, font: &dyn FontMetricsProvider) {
        let mut params = LayoutParams::from_style(self.stream.styles.base(), self.size, self.anchor)
            .with_line_height(self.settings.line_height)
            .with_slot_space(self.settings.slot_space);
        params.font_size = self.settings.font_size;

        let engine = LayoutEngine::new(Some(font), &self.config);
        self.layout = engine.layout(&mut self.stream, &params, Some(&mut self.cache));

        if let Some(result) = &self.layout {
            if result.font_size != self.stream.styles.base().font_size() {
                for style in self.stream.styles.iter_mut() {
                    style.set_font_size(result.font_size, false);
                    style.calculate();
                }
            }
        }
        tracing::trace!("{}", self.cache.stats_string());
    }

    /// Report the natural size of a slot's asset once it has loaded.
    ///
    /// `generation` is the value of [`generation`](Self::generation) when the load started.
    /// Returns whether the slot size changed.
    pub fn resolve_slot(&mut self, generation: u32, slot: usize, natural: Size<f32>) -> TextResult<bool> {
        if generation != self.generation {
            return Err(TextError::StaleSlot {
                generation,
                current: self.generation,
            });
        }
        let count = self.stream.slots.len();
        let font_size = self
            .stream
            .slots
            .get(slot)
            .and_then(|s| self.stream.units.get(s.unit))
            .map(|unit| self.stream.style_of(unit).real_font_size())
            .ok_or(TextError::SlotOutOfRange { index: slot, count })?;

        let changed = self.stream.slots[slot].resolve(natural.width, natural.height, font_size);
        if changed {
            self.cache.clear();
            self.dirty |= DirtyFlags::LAYOUT;
        }
        Ok(changed)
    }

    /// Stream generation. Advances every time the text is compiled.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Slots whose size still depends on an asset that has not been resolved.
    pub fn pending_slots(&self) -> impl Iterator<Item = (usize, &InlineSlot)> {
        self.stream.slots.iter().enumerate().filter(|(_, s)| !s.fixed)
    }

    pub fn stream(&self) -> &CharStream {
        &self.stream
    }

    pub fn units(&self) -> &[CharUnit] {
        &self.stream.units
    }

    pub fn layout(&self) -> Option<&LayoutResult> {
        self.layout.as_ref()
    }

    pub fn clickable(&self, index: usize) -> Option<&Clickable> {
        self.stream.clickables.get(index)
    }

    pub fn decorations(&self) -> Vec<DecorationQuad> {
        match (&self.layout, self.font.as_deref()) {
            (Some(result), Some(font)) => {
                build_decorations(&self.stream, result, font.constants(), &self.config)
            }
            _ => Vec::new(),
        }
    }

    pub fn slot_placements(&self) -> Vec<SlotPlacement> {
        self.layout
            .as_ref()
            .map(|result| place_slots(&self.stream, result))
            .unwrap_or_default()
    }

    /// The unit under `point`, relative to the anchor.
    pub fn hit_test(&self, point: Vec2) -> Option<HitTest> {
        hit_test(&self.stream, self.layout.as_ref()?, point)
    }
}
