//! The compiled character stream: units, their styles, inline slots and click spans.

use std::ops::Range;

use textmesh_core::alloc::Reusable;

use crate::font::GlyphMetrics;
use crate::metrics::UnitMetrics;
use crate::script::CharClass;
use crate::style::StyleRecord;

/// Index of a style in a [`StyleTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct StyleId(pub u32);

impl StyleId {
    /// The label's base style is always the first entry.
    pub const BASE: StyleId = StyleId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena of the styles referenced by one stream. Entry 0 is the base style.
#[derive(Debug, Clone)]
pub struct StyleTable {
    styles: Vec<StyleRecord>,
}

impl StyleTable {
    pub fn new(base: StyleRecord) -> Self {
        Self { styles: vec![base] }
    }

    pub fn push(&mut self, style: StyleRecord) -> StyleId {
        let id = StyleId(self.styles.len() as u32);
        self.styles.push(style);
        id
    }

    /// Panics if `id` did not come from this table.
    pub fn get(&self, id: StyleId) -> &StyleRecord {
        &self.styles[id.index()]
    }

    pub fn get_mut(&mut self, id: StyleId) -> &mut StyleRecord {
        &mut self.styles[id.index()]
    }

    pub fn base(&self) -> &StyleRecord {
        &self.styles[0]
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StyleRecord> {
        self.styles.iter_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StyleRecord> {
        self.styles.iter()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new(StyleRecord::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitContent {
    Char(char),
    /// Index into [`CharStream::slots`].
    Slot(usize),
}

impl UnitContent {
    pub fn class(self) -> CharClass {
        match self {
            UnitContent::Char(ch) => CharClass::of(ch),
            UnitContent::Slot(_) => CharClass::Slot,
        }
    }

    pub fn as_char(self) -> Option<char> {
        match self {
            UnitContent::Char(ch) => Some(ch),
            UnitContent::Slot(_) => None,
        }
    }
}

impl Default for UnitContent {
    fn default() -> Self {
        UnitContent::Char(' ')
    }
}

/// One laid-out unit.
///
/// Positions are container-local with y pointing down and the origin at the container's top
/// left corner. `x` is the left edge of the advance cell; `y` is the bottom of the unit's box,
/// so ink spans `y - metrics.ink_height .. y`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharUnit {
    pub index: usize,
    pub style: StyleId,
    pub content: UnitContent,
    /// Index into [`CharStream::clickables`].
    pub click: Option<usize>,
    pub glyph: GlyphMetrics,
    pub metrics: UnitMetrics,
    pub line: usize,
    pub in_line: usize,
    pub x: f32,
    pub y: f32,
    pub line_top: f32,
    /// Whether the unit draws anything.
    pub visible: bool,
    /// Cleared for units past the visible-character ratio.
    pub revealed: bool,
}

impl CharUnit {
    pub fn is_newline(&self) -> bool {
        self.content == UnitContent::Char('\n')
    }

    pub fn is_slot(&self) -> bool {
        matches!(self.content, UnitContent::Slot(_))
    }

    /// Right edge of the advance cell including italic overhang.
    pub fn right(&self) -> f32 {
        self.x + self.metrics.w + self.metrics.skew
    }
}

impl Reusable for CharUnit {
    fn reset(&mut self) {
        *self = CharUnit::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotKind {
    #[default]
    Image,
    Prefab,
}

impl SlotKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "img" => Some(SlotKind::Image),
            "prefab" => Some(SlotKind::Prefab),
            _ => None,
        }
    }
}

/// How a slot's size follows the resolved asset's natural size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotSizing {
    /// Height is the font size, width keeps the aspect ratio.
    #[default]
    None,
    /// Width is given, height keeps the aspect ratio.
    WidthFirst,
    /// Height is given, width keeps the aspect ratio.
    HeightFirst,
    /// Width and height were both given.
    FixedFontSize,
}

/// An embedded non-text element occupying one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineSlot {
    pub unit: usize,
    pub kind: SlotKind,
    pub src: String,
    pub name: Option<String>,
    pub width: f32,
    pub height: f32,
    pub sizing: SlotSizing,
    /// Set once the size no longer depends on the asset.
    pub fixed: bool,
}

impl InlineSlot {
    /// Apply the natural size of the loaded asset. Returns whether the slot size changed.
    pub fn resolve(&mut self, natural_width: f32, natural_height: f32, font_size: f32) -> bool {
        if self.fixed {
            return false;
        }
        let before = (self.width, self.height);
        let aspect = if natural_height > 0.0 {
            natural_width / natural_height
        } else {
            1.0
        };

        match (self.kind, self.sizing) {
            (SlotKind::Prefab, SlotSizing::None) => {
                self.width = natural_width;
                self.height = natural_height;
            }
            (SlotKind::Image, SlotSizing::None) => {
                self.height = font_size;
                self.width = font_size * aspect;
            }
            (_, SlotSizing::WidthFirst) if aspect > 0.0 => {
                self.height = self.width / aspect;
            }
            (_, SlotSizing::HeightFirst) => {
                self.width = self.height * aspect;
            }
            _ => {}
        }
        self.fixed = true;
        before != (self.width, self.height)
    }
}

/// A `<click>` span.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Clickable {
    pub name: Option<String>,
    pub value: Option<String>,
    pub units: Range<usize>,
}

/// Output of the markup compiler and input of the layout engine.
#[derive(Debug, Clone, Default)]
pub struct CharStream {
    pub units: Vec<CharUnit>,
    pub styles: StyleTable,
    pub slots: Vec<InlineSlot>,
    pub clickables: Vec<Clickable>,
}

impl CharStream {
    pub fn new(base: StyleRecord) -> Self {
        Self {
            units: Vec::new(),
            styles: StyleTable::new(base),
            slots: Vec::new(),
            clickables: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn style_of(&self, unit: &CharUnit) -> &StyleRecord {
        self.styles.get(unit.style)
    }

    /// The text of the stream, with slots rendered as U+FFFC.
    pub fn text(&self) -> String {
        self.units
            .iter()
            .map(|unit| unit.content.as_char().unwrap_or('\u{FFFC}'))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(kind: SlotKind, sizing: SlotSizing, width: f32, height: f32) -> InlineSlot {
        InlineSlot {
            unit: 0,
            kind,
            src: "icon".into(),
            name: None,
            width,
            height,
            sizing,
            fixed: false,
        }
    }

    #[test]
    fn test_image_follows_font_size() {
        let mut image = slot(SlotKind::Image, SlotSizing::None, 18.0, 18.0);
        assert!(image.resolve(64.0, 32.0, 20.0));
        assert_eq!((image.width, image.height), (40.0, 20.0));
        assert!(image.fixed);
        assert!(!image.resolve(8.0, 8.0, 20.0));
    }

    #[test]
    fn test_prefab_uses_natural_size() {
        let mut prefab = slot(SlotKind::Prefab, SlotSizing::None, 18.0, 18.0);
        prefab.resolve(30.0, 12.0, 18.0);
        assert_eq!((prefab.width, prefab.height), (30.0, 12.0));
    }

    #[test]
    fn test_aspect_sizing() {
        let mut wide = slot(SlotKind::Image, SlotSizing::WidthFirst, 40.0, 0.0);
        wide.resolve(20.0, 10.0, 18.0);
        assert_eq!(wide.height, 20.0);

        let mut tall = slot(SlotKind::Image, SlotSizing::HeightFirst, 0.0, 30.0);
        tall.resolve(20.0, 10.0, 18.0);
        assert_eq!(tall.width, 60.0);

        let mut fixed = slot(SlotKind::Image, SlotSizing::FixedFontSize, 12.0, 14.0);
        assert!(!fixed.resolve(20.0, 10.0, 18.0));
        assert_eq!((fixed.width, fixed.height), (12.0, 14.0));
    }

    #[test]
    fn test_unit_reset() {
        let mut unit = CharUnit {
            index: 4,
            content: UnitContent::Slot(1),
            x: 10.0,
            visible: true,
            ..Default::default()
        };
        unit.reset();
        assert_eq!(unit, CharUnit::default());
    }
}
