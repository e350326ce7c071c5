//! Field identifiers and raw values for style overrides.

use std::fmt;

/// How a field's raw value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Number,
    Color,
    /// A small enum accepted either by ordinal or by name.
    Enum,
}

macro_rules! style_fields {
    ($($variant:ident => $name:literal : $kind:ident),* $(,)?) => {
        /// Every tag-overridable style property.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum StyleField {
            $($variant),*
        }

        impl StyleField {
            pub const ALL: &'static [StyleField] = &[$(StyleField::$variant),*];
            pub const COUNT: usize = Self::ALL.len();

            /// Canonical name, as used for bare field tags and style sheet keys.
            pub const fn name(self) -> &'static str {
                match self {
                    $(StyleField::$variant => $name),*
                }
            }

            pub const fn kind(self) -> FieldKind {
                match self {
                    $(StyleField::$variant => FieldKind::$kind),*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(StyleField::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

style_fields! {
    Color => "color": Color,
    ColorLT => "colorLT": Color,
    ColorLB => "colorLB": Color,
    ColorRT => "colorRT": Color,
    ColorRB => "colorRB": Color,
    EnableColorLT => "enableColorLT": Bool,
    EnableColorLB => "enableColorLB": Bool,
    EnableColorRT => "enableColorRT": Bool,
    EnableColorRB => "enableColorRB": Bool,
    Shadow => "shadow": Number,
    ShadowColor => "shadowColor": Color,
    ShadowOffsetX => "shadowOffsetX": Number,
    ShadowOffsetY => "shadowOffsetY": Number,
    ShadowBlur => "shadowBlur": Number,
    Stroke => "stroke": Number,
    StrokeColor => "strokeColor": Color,
    StrokeBlur => "strokeBlur": Number,
    EnableGlow => "enableGlow": Bool,
    GlowColor => "glowColor": Color,
    GlowInner => "glowInner": Number,
    GlowOuter => "glowOuter": Number,
    GlowPower => "glowPower": Number,
    GlowOffsetX => "glowOffsetX": Number,
    GlowOffsetY => "glowOffsetY": Number,
    Background => "background": Bool,
    BackgroundColor => "backgroundColor": Color,
    Mask => "mask": Bool,
    MaskColor => "maskColor": Color,
    FontSize => "fontSize": Number,
    FontSmoothness => "fontSmoothness": Number,
    Dilate => "dilate": Number,
    Italic => "italic": Bool,
    Bold => "bold": Bool,
    Underline => "underline": Bool,
    UnderlineColor => "underlineColor": Color,
    Strike => "strike": Bool,
    StrikeColor => "strikeColor": Color,
    ScriptType => "scriptType": Enum,
    AutoWrap => "autoWarp": Bool,
    EqualWidth => "equalWidth": Bool,
    FixedLineHeight => "fixedLineHeight": Bool,
    HorizontalAlign => "horizontalAlign": Enum,
    VerticalAlign => "verticalAlign": Enum,
    Overflow => "overflow": Enum,
    FontAutoSize => "fontAutoSize": Bool,
    FontMinSize => "fontMiniSize": Number,
    FontMaxSize => "fontMaxSize": Number,
    LineSpace => "lineSpace": Number,
    LetterSpace => "letterSpace": Number,
    PaddingLeft => "paddingLeft": Number,
    PaddingRight => "paddingRight": Number,
    PaddingTop => "paddingTop": Number,
    PaddingBottom => "paddingBottom": Number,
    Aspect => "aspect": Number,
    CharVisibleRatio => "charVisibleRatio": Number,
    BreakWestern => "breakWestern": Bool,
}

impl StyleField {
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StyleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A raw override value, as written in markup or a style sheet.
///
/// Interpretation is deferred to [`StyleRecord::preset`](super::StyleRecord::preset) so
/// comma separated color lists survive until corner colors are split out.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Bool(bool),
    Number(f32),
    Text(String),
}

impl StyleValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StyleValue::Bool(b) => Some(*b),
            StyleValue::Number(n) => Some(*n != 0.0),
            StyleValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "" | "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" => Some(false),
                _ => None,
            },
        }
    }

    pub fn as_number(&self) -> Option<f32> {
        match self {
            StyleValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            StyleValue::Number(n) => Some(*n),
            StyleValue::Text(s) => {
                let s = s.trim();
                let s = s.strip_suffix("px").unwrap_or(s);
                s.parse().ok()
            }
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StyleValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a color. Numbers are read as `0xRRGGBBAA`.
    pub fn as_color(&self) -> Option<textmesh_core::Color> {
        match self {
            StyleValue::Text(s) => textmesh_core::Color::parse(s),
            StyleValue::Number(n) if *n >= 0.0 => {
                Some(textmesh_core::Color::from_hex_alpha(*n as u32))
            }
            _ => None,
        }
    }

    /// Convert a JSON scalar. Arrays, objects and null have no scalar form.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(StyleValue::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(|n| StyleValue::Number(n as f32)),
            serde_json::Value::String(s) => Some(StyleValue::Text(s.clone())),
            _ => None,
        }
    }
}

impl From<bool> for StyleValue {
    fn from(value: bool) -> Self {
        StyleValue::Bool(value)
    }
}

impl From<f32> for StyleValue {
    fn from(value: f32) -> Self {
        StyleValue::Number(value)
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Text(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Text(value)
    }
}

/// Bitmask of explicitly changed fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct FieldSet(u64);

const _: () = assert!(StyleField::COUNT <= 64);

impl FieldSet {
    pub const EMPTY: Self = Self(0);

    pub fn insert(&mut self, field: StyleField) {
        self.0 |= 1 << field.index();
    }

    pub fn remove(&mut self, field: StyleField) {
        self.0 &= !(1 << field.index());
    }

    pub fn contains(&self, field: StyleField) -> bool {
        self.0 & (1 << field.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = StyleField> + '_ {
        StyleField::ALL.iter().copied().filter(|f| self.contains(*f))
    }
}

impl FromIterator<StyleField> for FieldSet {
    fn from_iter<I: IntoIterator<Item = StyleField>>(iter: I) -> Self {
        let mut set = FieldSet::EMPTY;
        for field in iter {
            set.insert(field);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_roundtrip() {
        for field in StyleField::ALL {
            assert_eq!(StyleField::from_name(field.name()), Some(*field));
        }
        assert_eq!(StyleField::from_name("nope"), None);
    }

    #[test]
    fn test_value_coercion() {
        assert_eq!(StyleValue::from("12px").as_number(), Some(12.0));
        assert_eq!(StyleValue::from("off").as_bool(), Some(false));
        assert_eq!(StyleValue::from("").as_bool(), Some(true));
        assert_eq!(StyleValue::Number(0.0).as_bool(), Some(false));
        assert_eq!(
            StyleValue::Number(0x00ff00ff as f32).as_color(),
            Some(textmesh_core::Color::GREEN)
        );
    }

    #[test]
    fn test_field_set() {
        let mut set: FieldSet = [StyleField::Bold, StyleField::Italic].into_iter().collect();
        assert!(set.contains(StyleField::Bold));
        assert_eq!(set.len(), 2);
        set.remove(StyleField::Bold);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![StyleField::Italic]);
    }
}
