//! Tag tree to [`CharStream`].
//!
//! The walk keeps an explicit stack of `(depth, StyleId)` entries. Entering a node at depth
//! `d` pops every entry opened at depth `>= d`, so a sibling never sees styles of an earlier,
//! already closed sibling, and irregular depth sequences from a sloppy tokenizer degrade to
//! "nest under whatever is open".

use textmesh_core::alloc::Pool;
use textmesh_core::profiling::{profile_function, profile_scope};

use crate::font::FontMetricsProvider;
use crate::markup::{Element, MarkupNode, MarkupTree};
use crate::registry::StyleResolver;
use crate::style::{FieldKind, StyleField, StyleRecord, StyleValue, TagRegistry};
use crate::unit::{CharStream, CharUnit, Clickable, InlineSlot, SlotKind, SlotSizing, StyleId, UnitContent};

struct OpenTag {
    depth: usize,
    style: StyleId,
    click: Option<usize>,
}

pub struct MarkupCompiler<'a> {
    font: &'a dyn FontMetricsProvider,
    resolver: &'a dyn StyleResolver,
    tags: &'static TagRegistry,
}

impl<'a> MarkupCompiler<'a> {
    pub fn new(font: &'a dyn FontMetricsProvider, resolver: &'a dyn StyleResolver) -> Self {
        Self {
            font,
            resolver,
            tags: TagRegistry::builtin(),
        }
    }

    /// Split plain text into units that all use `base`.
    pub fn compile_plain(&self, text: &str, base: StyleRecord, pool: &mut Pool<CharUnit>) -> CharStream {
        profile_function!();
        let mut stream = CharStream::new(base);
        stream.units.reserve(text.len());
        for ch in text.chars() {
            self.push_char(&mut stream, pool, ch, StyleId::BASE, None);
        }
        stream
    }

    pub fn compile(&self, tree: &MarkupTree, base: StyleRecord, pool: &mut Pool<CharUnit>) -> CharStream {
        self.compile_nodes(tree.walk(), base, pool)
    }

    /// Compile a depth-annotated pre-order node sequence.
    pub fn compile_nodes<'n>(
        &self,
        nodes: impl IntoIterator<Item = (usize, &'n MarkupNode)>,
        base: StyleRecord,
        pool: &mut Pool<CharUnit>,
    ) -> CharStream {
        profile_function!();

        let mut stream = CharStream::new(base);
        let mut open: Vec<OpenTag> = Vec::new();

        for (depth, node) in nodes {
            while open.last().is_some_and(|tag| tag.depth >= depth) {
                if let Some(closed) = open.pop() {
                    self.close_click(&mut stream, &open, closed.click);
                }
            }

            let style = open.last().map_or(StyleId::BASE, |tag| tag.style);
            let click = open.iter().rev().find_map(|tag| tag.click);

            match node {
                MarkupNode::Text(text) => {
                    for ch in text.chars() {
                        self.push_char(&mut stream, pool, ch, style, click);
                    }
                }
                MarkupNode::Element(element) => {
                    let tag = self.open_element(&mut stream, pool, element, depth, style, click);
                    open.push(tag);
                }
            }
        }

        while let Some(closed) = open.pop() {
            self.close_click(&mut stream, &open, closed.click);
        }

        tracing::trace!(
            "Compiled {} units, {} styles, {} slots, {} clickables",
            stream.units.len(),
            stream.styles.len(),
            stream.slots.len(),
            stream.clickables.len()
        );
        stream
    }

    fn open_element(
        &self,
        stream: &mut CharStream,
        pool: &mut Pool<CharUnit>,
        element: &Element,
        depth: usize,
        parent: StyleId,
        click: Option<usize>,
    ) -> OpenTag {
        profile_scope!("open_element");

        let mut style = stream.styles.get(parent).clone();
        let mut own_click = None;
        let mut slot_unit = None;
        let mut literal = None;
        let name = element.name.as_str();

        if let Some(kind) = SlotKind::from_tag(name) {
            match element.attribute("src").filter(|src| !src.is_empty()) {
                Some(src) => slot_unit = Some(self.parse_slot(element, kind, src, &style)),
                None => tracing::warn!("Skipping <{}> without a src attribute", name),
            }
        } else if name == "click" {
            stream.clickables.push(Clickable {
                name: element.attribute("name").map(str::to_string),
                value: element.attribute("value").map(str::to_string),
                units: stream.units.len()..stream.units.len(),
            });
            own_click = Some(stream.clickables.len() - 1);
        } else if let Some(mapping) = self.tags.get(name) {
            if let Some(field) = mapping.field {
                match mapping.value_for(element.value.as_deref()) {
                    Some(value) => style.set_explicit(field, value),
                    None => tracing::warn!("Tag <{}> has no value", name),
                }
            }
            for (attr, value) in &element.attributes {
                match mapping.attribute(attr) {
                    Some(field) => style.set_explicit(field, value.as_str()),
                    None => tracing::warn!("Ignoring unknown attribute {} on <{}>", attr, name),
                }
            }
        } else if name == "style" {
            let names = element.value.as_deref().unwrap_or_default();
            for style_name in names.split([' ', ';', ',']).filter(|s| !s.is_empty()) {
                match self.resolver.style(style_name) {
                    Some(named) => {
                        style.copy_from(named, true);
                    }
                    None => tracing::warn!("Unknown style: {}", style_name),
                }
            }
        } else if let Some(text) = self.tags.literal(name) {
            literal = Some(text);
        } else if let Some(named) = self.resolver.tag_style(name) {
            style.copy_from(named, true);
        } else if let Some(field) = StyleField::from_name(name) {
            let value = match (field.kind(), element.value.as_deref()) {
                (FieldKind::Bool, _) | (_, None) => StyleValue::Bool(true),
                (_, Some(value)) => StyleValue::from(value),
            };
            style.set_explicit(field, value);
        } else {
            tracing::warn!("Ignoring unknown tag <{}>", name);
        }

        style.preset();
        let id = stream.styles.push(style);
        let unit_click = own_click.or(click);

        if let Some(slot) = slot_unit {
            let index = stream.slots.len();
            let unit = self.push_unit(stream, pool, UnitContent::Slot(index), id, unit_click);
            stream.slots.push(InlineSlot { unit, ..slot });
        }
        if let Some(text) = literal {
            for ch in text.chars() {
                self.push_char(stream, pool, ch, id, unit_click);
            }
        }

        OpenTag {
            depth,
            style: id,
            click: own_click,
        }
    }

    fn parse_slot(&self, element: &Element, kind: SlotKind, src: &str, style: &StyleRecord) -> InlineSlot {
        let number = |name: &str| {
            element
                .attribute(name)
                .and_then(|value| StyleValue::from(value).as_number())
        };
        let width = number("width");
        let height = number("height");

        let mut sizing = match element
            .attribute("sizeType")
            .or_else(|| element.attribute("size-type"))
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("1" | "width" | "widthfirst") => SlotSizing::WidthFirst,
            Some("2" | "height" | "heightfirst") => SlotSizing::HeightFirst,
            Some("3" | "fixed" | "fontsize") => SlotSizing::FixedFontSize,
            _ => SlotSizing::None,
        };
        if sizing == SlotSizing::None && width.is_some() && height.is_some() {
            sizing = SlotSizing::FixedFontSize;
        }

        InlineSlot {
            unit: 0,
            kind,
            src: src.to_string(),
            name: element.attribute("name").map(str::to_string),
            width: width.unwrap_or(style.font_size()),
            height: height.unwrap_or(style.font_size()),
            sizing,
            fixed: false,
        }
    }

    fn close_click(&self, stream: &mut CharStream, open: &[OpenTag], click: Option<usize>) {
        let Some(click) = click else {
            return;
        };
        let end = stream.units.len();
        if let Some(clickable) = stream.clickables.get_mut(click) {
            clickable.units.end = end;
        }
        // Units of a nested click also belong to the enclosing span.
        if let Some(outer) = open.iter().rev().find_map(|tag| tag.click) {
            if let Some(clickable) = stream.clickables.get_mut(outer) {
                clickable.units.end = clickable.units.end.max(end);
            }
        }
    }

    fn push_char(
        &self,
        stream: &mut CharStream,
        pool: &mut Pool<CharUnit>,
        ch: char,
        style: StyleId,
        click: Option<usize>,
    ) -> usize {
        self.push_unit(stream, pool, UnitContent::Char(ch), style, click)
    }

    fn push_unit(
        &self,
        stream: &mut CharStream,
        pool: &mut Pool<CharUnit>,
        content: UnitContent,
        style: StyleId,
        click: Option<usize>,
    ) -> usize {
        let mut unit = pool.acquire();
        unit.index = stream.units.len();
        unit.style = style;
        unit.content = content;
        unit.click = click;
        unit.glyph = match content {
            UnitContent::Char(ch) => self.font.glyph(ch).unwrap_or_else(|| {
                tracing::trace!("No glyph for {:?}, using fallback", ch);
                self.font.fallback()
            }),
            UnitContent::Slot(_) => Default::default(),
        };
        unit.visible = !content.class().is_whitespace();
        unit.revealed = true;

        if let Some(clickable) = click.and_then(|c| stream.clickables.get_mut(c)) {
            clickable.units.end = unit.index + 1;
        }

        stream.units.push(unit);
        stream.units.len() - 1
    }
}
