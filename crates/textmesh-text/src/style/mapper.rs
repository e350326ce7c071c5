//! Built-in markup tags and how they map onto style fields.

use std::sync::OnceLock;

use textmesh_core::alloc::HashMap;

use super::{StyleField, StyleValue};

/// How one markup tag writes into a style.
#[derive(Debug, Clone, PartialEq)]
pub struct TagMapping {
    /// Field receiving the tag's own value. Group tags such as `font` have none.
    pub field: Option<StyleField>,
    /// Used when the tag is written without a value.
    pub default: Option<StyleValue>,
    /// Attribute name to field, e.g. `<shadow color=red>`.
    pub attributes: Vec<(&'static str, StyleField)>,
}

impl TagMapping {
    fn field(field: StyleField) -> Self {
        Self {
            field: Some(field),
            default: None,
            attributes: Vec::new(),
        }
    }

    fn flag(field: StyleField, default: impl Into<StyleValue>) -> Self {
        Self {
            field: Some(field),
            default: Some(default.into()),
            attributes: Vec::new(),
        }
    }

    fn with_attributes(mut self, attributes: &[(&'static str, StyleField)]) -> Self {
        self.attributes = attributes.to_vec();
        self
    }

    /// The value a tag writes: its own value, else the mapping default.
    ///
    /// Boolean fields written bare (`<u>`) read as `true`.
    pub fn value_for(&self, written: Option<&str>) -> Option<StyleValue> {
        match written {
            Some(text) => Some(StyleValue::Text(text.to_string())),
            None => self.default.clone().or_else(|| match self.field {
                Some(field) if field.kind() == super::FieldKind::Bool => Some(StyleValue::Bool(true)),
                _ => None,
            }),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<StyleField> {
        self.attributes
            .iter()
            .find(|(attr, _)| *attr == name)
            .map(|(_, field)| *field)
    }
}

/// Lookup table of tag names understood without any registered styles.
#[derive(Debug, Default)]
pub struct TagRegistry {
    tags: HashMap<&'static str, TagMapping>,
    literals: HashMap<&'static str, &'static str>,
}

impl TagRegistry {
    /// The shared built-in table.
    pub fn builtin() -> &'static TagRegistry {
        static BUILTIN: OnceLock<TagRegistry> = OnceLock::new();
        BUILTIN.get_or_init(TagRegistry::build)
    }

    pub fn get(&self, name: &str) -> Option<&TagMapping> {
        self.tags.get(name)
    }

    /// Tags that expand to literal text, such as `br`.
    pub fn literal(&self, name: &str) -> Option<&'static str> {
        self.literals.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    fn build() -> TagRegistry {
        use StyleField as F;

        let mut tags: HashMap<&'static str, TagMapping> = HashMap::default();
        let mut add = |name: &'static str, mapping: TagMapping| {
            tags.insert(name, mapping);
        };

        add("sup", TagMapping::flag(F::ScriptType, 1.0));
        add("sub", TagMapping::flag(F::ScriptType, 2.0));
        add("u", TagMapping::flag(F::Underline, true));
        add("s", TagMapping::flag(F::Strike, true));
        add("i", TagMapping::flag(F::Italic, true));
        add("b", TagMapping::flag(F::Bold, true));
        add("bg", TagMapping::flag(F::Background, true));

        for (name, field) in [
            ("colorLT", F::ColorLT),
            ("colorLB", F::ColorLB),
            ("colorRT", F::ColorRT),
            ("colorRB", F::ColorRB),
            ("color-lt", F::ColorLT),
            ("color-lb", F::ColorLB),
            ("color-rt", F::ColorRT),
            ("color-rb", F::ColorRB),
            ("enableColorLT", F::EnableColorLT),
            ("enableColorLB", F::EnableColorLB),
            ("enableColorRT", F::EnableColorRT),
            ("enableColorRB", F::EnableColorRB),
            ("shadow-color", F::ShadowColor),
            ("shadowOffsetX", F::ShadowOffsetX),
            ("shadowOffsetY", F::ShadowOffsetY),
            ("shadow-blur", F::ShadowBlur),
            ("stroke-color", F::StrokeColor),
            ("stroke-blur", F::StrokeBlur),
            ("outline-color", F::StrokeColor),
            ("outline-blur", F::StrokeBlur),
            ("dilate", F::Dilate),
            ("background-color", F::BackgroundColor),
            ("mask-color", F::MaskColor),
            ("enableGlow", F::EnableGlow),
            ("glow-color", F::GlowColor),
            ("glowColor", F::GlowColor),
            ("glowInner", F::GlowInner),
            ("glowOuter", F::GlowOuter),
            ("glowPower", F::GlowPower),
            ("glowOffsetX", F::GlowOffsetX),
            ("glowOffsetY", F::GlowOffsetY),
            ("size", F::FontSize),
            ("font-size", F::FontSize),
            ("autoWarp", F::AutoWrap),
            ("equalWidth", F::EqualWidth),
            ("fixedLineHeight", F::FixedLineHeight),
            ("horizontalAlign", F::HorizontalAlign),
            ("verticalAlign", F::VerticalAlign),
            ("overflow", F::Overflow),
            ("overFlow", F::Overflow),
            ("fontAutoSize", F::FontAutoSize),
            ("fontMiniSize", F::FontMinSize),
            ("font-mini-size", F::FontMinSize),
            ("fontMaxSize", F::FontMaxSize),
            ("font-max-size", F::FontMaxSize),
            ("lineSpace", F::LineSpace),
            ("line-height", F::LineSpace),
            ("letterSpace", F::LetterSpace),
            ("paddingLeft", F::PaddingLeft),
            ("paddingRight", F::PaddingRight),
            ("paddingTop", F::PaddingTop),
            ("paddingBottom", F::PaddingBottom),
            ("aspect", F::Aspect),
            ("charVisibleRatio", F::CharVisibleRatio),
        ] {
            add(name, TagMapping::field(field));
        }

        add(
            "color",
            TagMapping::flag(F::Color, "#ffffff").with_attributes(&[
                ("lt", F::ColorLT),
                ("lb", F::ColorLB),
                ("rt", F::ColorRT),
                ("rb", F::ColorRB),
            ]),
        );
        add(
            "shadow",
            TagMapping::flag(F::Shadow, 0.1).with_attributes(&[
                ("color", F::ShadowColor),
                ("x", F::ShadowOffsetX),
                ("y", F::ShadowOffsetY),
                ("blur", F::ShadowBlur),
            ]),
        );
        for name in ["stroke", "outline"] {
            add(
                name,
                TagMapping::field(F::Stroke)
                    .with_attributes(&[("color", F::StrokeColor), ("blur", F::StrokeBlur)]),
            );
        }
        add(
            "background",
            TagMapping::flag(F::Background, true)
                .with_attributes(&[("color", F::BackgroundColor)]),
        );
        add(
            "mask",
            TagMapping::flag(F::Mask, true).with_attributes(&[("color", F::MaskColor)]),
        );
        add(
            "glow",
            TagMapping::flag(F::EnableGlow, true).with_attributes(&[
                ("color", F::GlowColor),
                ("inner", F::GlowInner),
                ("outer", F::GlowOuter),
                ("power", F::GlowPower),
                ("x", F::GlowOffsetX),
                ("y", F::GlowOffsetY),
            ]),
        );
        add(
            "font",
            TagMapping {
                field: None,
                default: None,
                attributes: vec![("size", F::FontSize)],
            },
        );

        let mut literals = HashMap::default();
        literals.insert("br", "\n");

        tracing::trace!("Built {} markup tag mappings", tags.len());
        TagRegistry { tags, literals }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_flag_tag() {
        let tags = TagRegistry::builtin();
        let bold = tags.get("b").unwrap();
        assert_eq!(bold.field, Some(StyleField::Bold));
        assert_eq!(bold.value_for(None), Some(StyleValue::Bool(true)));
    }

    #[test]
    fn test_written_value_wins() {
        let tags = TagRegistry::builtin();
        let size = tags.get("size").unwrap();
        assert_eq!(size.value_for(Some("24")), Some(StyleValue::Text("24".into())));
        assert_eq!(size.value_for(None), None);
    }

    #[test]
    fn test_group_attributes() {
        let tags = TagRegistry::builtin();
        assert_eq!(tags.get("shadow").unwrap().attribute("blur"), Some(StyleField::ShadowBlur));
        assert_eq!(tags.get("outline").unwrap().attribute("color"), Some(StyleField::StrokeColor));
        let font = tags.get("font").unwrap();
        assert_eq!(font.field, None);
        assert_eq!(font.attribute("size"), Some(StyleField::FontSize));
    }

    #[test]
    fn test_literal_br() {
        assert_eq!(TagRegistry::builtin().literal("br"), Some("\n"));
        assert_eq!(TagRegistry::builtin().literal("b"), None);
    }
}
