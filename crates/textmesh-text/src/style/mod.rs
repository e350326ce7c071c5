//! Per-run text style with two-tier override semantics.
//!
//! Every tag-overridable property has an *explicit* slot (set by markup or a named style) and an
//! *effective* value. Component defaults go through the `set_*` methods, which only touch the
//! effective value when no explicit value exists, unless forced. [`StyleRecord::preset`] folds
//! explicit values into effective ones and recomputes derived values.

pub mod field;
pub mod mapper;

use textmesh_core::{Color, Padding};

pub use field::{FieldKind, FieldSet, StyleField, StyleValue};
pub use mapper::{TagMapping, TagRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum ScriptType {
    #[default]
    None,
    Superscript,
    Subscript,
}

impl ScriptType {
    pub fn from_value(value: &StyleValue) -> Option<Self> {
        if let Some(n) = value.as_number() {
            return match n as i32 {
                0 => Some(ScriptType::None),
                1 => Some(ScriptType::Superscript),
                2 => Some(ScriptType::Subscript),
                _ => None,
            };
        }
        match value.as_text()?.to_ascii_lowercase().as_str() {
            "none" => Some(ScriptType::None),
            "sup" | "superscript" => Some(ScriptType::Superscript),
            "sub" | "subscript" => Some(ScriptType::Subscript),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl HorizontalAlign {
    pub fn factor(self) -> f32 {
        match self {
            HorizontalAlign::Left => 0.0,
            HorizontalAlign::Center => 0.5,
            HorizontalAlign::Right => 1.0,
        }
    }

    pub fn from_value(value: &StyleValue) -> Option<Self> {
        if let Some(n) = value.as_number() {
            return match n as i32 {
                0 => Some(HorizontalAlign::Left),
                1 => Some(HorizontalAlign::Center),
                2 => Some(HorizontalAlign::Right),
                _ => None,
            };
        }
        match value.as_text()?.to_ascii_lowercase().as_str() {
            "left" => Some(HorizontalAlign::Left),
            "center" | "middle" => Some(HorizontalAlign::Center),
            "right" => Some(HorizontalAlign::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl VerticalAlign {
    pub fn factor(self) -> f32 {
        match self {
            VerticalAlign::Top => 0.0,
            VerticalAlign::Middle => 0.5,
            VerticalAlign::Bottom => 1.0,
        }
    }

    pub fn from_value(value: &StyleValue) -> Option<Self> {
        if let Some(n) = value.as_number() {
            return match n as i32 {
                0 => Some(VerticalAlign::Top),
                1 => Some(VerticalAlign::Middle),
                2 => Some(VerticalAlign::Bottom),
                _ => None,
            };
        }
        match value.as_text()?.to_ascii_lowercase().as_str() {
            "top" => Some(VerticalAlign::Top),
            "middle" | "center" => Some(VerticalAlign::Middle),
            "bottom" => Some(VerticalAlign::Bottom),
            _ => None,
        }
    }
}

/// What happens when content does not fit the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Overflow {
    /// Resize the container to the content. No automatic wrapping.
    #[default]
    None,
    /// Keep the container; wrap when auto-wrap is on.
    Clamp,
    /// Shrink the font until the content fits.
    Shrink,
    /// Always wrap and resize the container height.
    ResizeHeight,
}

impl Overflow {
    pub fn from_value(value: &StyleValue) -> Option<Self> {
        if let Some(n) = value.as_number() {
            return match n as i32 {
                0 => Some(Overflow::None),
                1 => Some(Overflow::Clamp),
                2 => Some(Overflow::Shrink),
                3 => Some(Overflow::ResizeHeight),
                _ => None,
            };
        }
        match value.as_text()?.to_ascii_lowercase().as_str() {
            "none" => Some(Overflow::None),
            "clamp" => Some(Overflow::Clamp),
            "shrink" => Some(Overflow::Shrink),
            "resizeheight" | "resize-height" | "resize_height" => Some(Overflow::ResizeHeight),
            _ => None,
        }
    }
}

/// Quad corner for gradient fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    LeftTop,
    LeftBottom,
    RightTop,
    RightBottom,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::LeftTop,
        Corner::LeftBottom,
        Corner::RightTop,
        Corner::RightBottom,
    ];

    const fn color_field(self) -> StyleField {
        match self {
            Corner::LeftTop => StyleField::ColorLT,
            Corner::LeftBottom => StyleField::ColorLB,
            Corner::RightTop => StyleField::ColorRT,
            Corner::RightBottom => StyleField::ColorRB,
        }
    }

    const fn enable_field(self) -> StyleField {
        match self {
            Corner::LeftTop => StyleField::EnableColorLT,
            Corner::LeftBottom => StyleField::EnableColorLB,
            Corner::RightTop => StyleField::EnableColorRT,
            Corner::RightBottom => StyleField::EnableColorRB,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleRecord {
    explicit: [Option<StyleValue>; StyleField::COUNT],
    changed: FieldSet,

    fill: Color,
    corners: [Color; 4],
    corner_enabled: [bool; 4],

    shadow: f32,
    shadow_color: Color,
    shadow_offset_x: f32,
    shadow_offset_y: f32,
    shadow_blur: f32,

    stroke: f32,
    stroke_color: Color,
    stroke_blur: f32,

    enable_glow: bool,
    glow_color: Color,
    glow_inner: f32,
    glow_outer: f32,
    glow_power: f32,
    glow_offset_x: f32,
    glow_offset_y: f32,

    background: bool,
    background_color: Color,
    mask: bool,
    mask_color: Color,

    font_size: f32,
    font_smoothness: f32,
    dilate: f32,
    italic: bool,
    bold: bool,
    underline: bool,
    underline_color: Color,
    strike: bool,
    strike_color: Color,
    script_type: ScriptType,

    auto_wrap: bool,
    equal_width: bool,
    fixed_line_height: bool,
    horizontal_align: HorizontalAlign,
    vertical_align: VerticalAlign,
    overflow: Overflow,
    font_auto_size: bool,
    font_min_size: f32,
    font_max_size: f32,

    line_space: f32,
    letter_space: f32,
    padding_left: f32,
    padding_right: f32,
    padding_top: f32,
    padding_bottom: f32,
    aspect: f32,
    char_visible_ratio: f32,
    break_western: bool,

    script_ratio: f32,
    real_font_size: f32,
    gamma: f32,
}

impl Default for StyleRecord {
    fn default() -> Self {
        let mut style = Self {
            explicit: std::array::from_fn(|_| None),
            changed: FieldSet::EMPTY,
            fill: Color::BLACK,
            corners: [Color::WHITE; 4],
            corner_enabled: [false; 4],
            shadow: 0.0,
            shadow_color: Color::BLACK,
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
            shadow_blur: 0.0,
            stroke: 0.0,
            stroke_color: Color::BLACK,
            stroke_blur: 0.0,
            enable_glow: false,
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
            font_size: 18.0,
            font_smoothness: 0.0,
            dilate: 0.25,
            italic: false,
            bold: false,
            underline: false,
            underline_color: Color::BLACK,
            strike: false,
            strike_color: Color::BLACK,
            script_type: ScriptType::None,
            auto_wrap: true,
            equal_width: false,
            fixed_line_height: false,
            horizontal_align: HorizontalAlign::Left,
            vertical_align: VerticalAlign::Top,
            overflow: Overflow::None,
            font_auto_size: false,
            font_min_size: 10.0,
            font_max_size: 40.0,
            line_space: 0.0,
            letter_space: 0.0,
            padding_left: 0.0,
            padding_right: 0.0,
            padding_top: 0.0,
            padding_bottom: 0.0,
            aspect: 1.0,
            char_visible_ratio: 1.0,
            break_western: false,
            script_ratio: 0.3,
            real_font_size: 18.0,
            gamma: 0.0,
        };
        style.calculate();
        style
    }
}

macro_rules! accessors {
    ($($field:ident, $setter:ident : $ty:ty => $id:ident;)*) => {
        impl StyleRecord {
            $(
                #[inline]
                pub fn $field(&self) -> $ty {
                    self.$field
                }

                /// Writes the effective value unless an explicit value exists or `force` is set.
                pub fn $setter(&mut self, value: $ty, force: bool) {
                    if force || !self.is_explicit(StyleField::$id) {
                        self.$field = value;
                    }
                }
            )*
        }
    };
}

accessors! {
    shadow, set_shadow: f32 => Shadow;
    shadow_color, set_shadow_color: Color => ShadowColor;
    shadow_offset_x, set_shadow_offset_x: f32 => ShadowOffsetX;
    shadow_offset_y, set_shadow_offset_y: f32 => ShadowOffsetY;
    shadow_blur, set_shadow_blur: f32 => ShadowBlur;
    stroke, set_stroke: f32 => Stroke;
    stroke_color, set_stroke_color: Color => StrokeColor;
    stroke_blur, set_stroke_blur: f32 => StrokeBlur;
    enable_glow, set_enable_glow: bool => EnableGlow;
    glow_color, set_glow_color: Color => GlowColor;
    glow_inner, set_glow_inner: f32 => GlowInner;
    glow_outer, set_glow_outer: f32 => GlowOuter;
    glow_power, set_glow_power: f32 => GlowPower;
    glow_offset_x, set_glow_offset_x: f32 => GlowOffsetX;
    glow_offset_y, set_glow_offset_y: f32 => GlowOffsetY;
    background, set_background: bool => Background;
    background_color, set_background_color: Color => BackgroundColor;
    mask, set_mask: bool => Mask;
    mask_color, set_mask_color: Color => MaskColor;
    font_size, set_font_size: f32 => FontSize;
    font_smoothness, set_font_smoothness: f32 => FontSmoothness;
    dilate, set_dilate: f32 => Dilate;
    italic, set_italic: bool => Italic;
    bold, set_bold: bool => Bold;
    underline, set_underline: bool => Underline;
    underline_color, set_underline_color: Color => UnderlineColor;
    strike, set_strike: bool => Strike;
    strike_color, set_strike_color: Color => StrikeColor;
    script_type, set_script_type: ScriptType => ScriptType;
    auto_wrap, set_auto_wrap: bool => AutoWrap;
    equal_width, set_equal_width: bool => EqualWidth;
    fixed_line_height, set_fixed_line_height: bool => FixedLineHeight;
    horizontal_align, set_horizontal_align: HorizontalAlign => HorizontalAlign;
    vertical_align, set_vertical_align: VerticalAlign => VerticalAlign;
    overflow, set_overflow: Overflow => Overflow;
    font_auto_size, set_font_auto_size: bool => FontAutoSize;
    font_min_size, set_font_min_size: f32 => FontMinSize;
    font_max_size, set_font_max_size: f32 => FontMaxSize;
    line_space, set_line_space: f32 => LineSpace;
    letter_space, set_letter_space: f32 => LetterSpace;
    padding_left, set_padding_left: f32 => PaddingLeft;
    padding_right, set_padding_right: f32 => PaddingRight;
    padding_top, set_padding_top: f32 => PaddingTop;
    padding_bottom, set_padding_bottom: f32 => PaddingBottom;
    aspect, set_aspect: f32 => Aspect;
    char_visible_ratio, set_char_visible_ratio: f32 => CharVisibleRatio;
    break_western, set_break_western: bool => BreakWestern;
}

impl StyleRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an explicit (tag) value. It takes effect at the next [`preset`](Self::preset).
    pub fn set_explicit(&mut self, field: StyleField, value: impl Into<StyleValue>) {
        self.explicit[field.index()] = Some(value.into());
        self.changed.insert(field);
    }

    pub fn clear_explicit(&mut self, field: StyleField) {
        self.explicit[field.index()] = None;
        self.changed.remove(field);
    }

    /// Drop every explicit value. Effective values are left as they are.
    pub fn reset_explicit(&mut self) {
        self.explicit = std::array::from_fn(|_| None);
        self.changed = FieldSet::EMPTY;
    }

    pub fn explicit(&self, field: StyleField) -> Option<&StyleValue> {
        self.explicit[field.index()].as_ref()
    }

    #[inline]
    pub fn is_explicit(&self, field: StyleField) -> bool {
        self.explicit[field.index()].is_some()
    }

    /// Fields that were explicitly set on this record.
    pub fn changed_fields(&self) -> FieldSet {
        self.changed
    }

    pub fn fill_color(&self) -> Color {
        self.fill
    }

    pub fn set_fill_color(&mut self, color: Color, force: bool) {
        if force || !self.is_explicit(StyleField::Color) {
            self.fill = color;
        }
    }

    /// Setting a corner color also enables it.
    pub fn set_corner_color(&mut self, corner: Corner, color: Color, force: bool) {
        if force || !self.is_explicit(corner.color_field()) {
            self.corners[corner as usize] = color;
            self.corner_enabled[corner as usize] = true;
        }
    }

    pub fn corner_enabled(&self, corner: Corner) -> bool {
        self.corner_enabled[corner as usize]
    }

    /// The color a renderer should use at `corner`: the corner color when enabled, else the fill.
    pub fn corner_color(&self, corner: Corner) -> Color {
        if self.corner_enabled[corner as usize] {
            self.corners[corner as usize]
        } else {
            self.fill
        }
    }

    pub fn padding(&self) -> Padding {
        Padding::ltrb(
            self.padding_left,
            self.padding_top,
            self.padding_right,
            self.padding_bottom,
        )
    }

    pub fn set_padding(&mut self, padding: Padding, force: bool) {
        self.set_padding_left(padding.left, force);
        self.set_padding_top(padding.top, force);
        self.set_padding_right(padding.right, force);
        self.set_padding_bottom(padding.bottom, force);
    }

    /// Size ratio for superscript and subscript runs, normally taken from the font.
    pub fn set_script_ratio(&mut self, ratio: f32) {
        self.script_ratio = ratio;
    }

    /// Font size after the script ratio is applied.
    pub fn real_font_size(&self) -> f32 {
        self.real_font_size
    }

    /// Edge anti-aliasing factor.
    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    /// The real font size this run would have if the component size were `candidate`.
    /// Explicit sizes win over the candidate.
    pub fn resolved_font_size(&self, candidate: f32) -> f32 {
        let base = if self.is_explicit(StyleField::FontSize) {
            self.font_size
        } else {
            candidate
        };
        self.apply_script(base)
    }

    fn apply_script(&self, size: f32) -> f32 {
        if self.script_type == ScriptType::None {
            size
        } else {
            size * self.script_ratio
        }
    }

    /// Recompute derived values.
    pub fn calculate(&mut self) {
        self.real_font_size = self.apply_script(self.font_size);
        let stroke_factor = if self.stroke > 0.0 && self.stroke_color.a > 0.0 {
            1.8
        } else {
            1.0
        };
        self.gamma = if self.real_font_size > 0.0 {
            2.0 * 1.4142 / (self.real_font_size * stroke_factor)
        } else {
            0.0
        };
    }

    /// Resolve explicit values into effective ones, then [`calculate`](Self::calculate).
    ///
    /// A comma separated fill color is split into corner colors first:
    /// four entries map to LT, LB, RT, RB; three to LT, RT, RB with LB taking the second;
    /// two give a vertical gradient. Explicit corner colors are never overwritten.
    pub fn preset(&mut self) {
        self.split_color_list();

        for field in StyleField::ALL {
            if let Some(value) = self.explicit[field.index()].clone() {
                self.resolve(*field, &value);
            }
        }

        let explicit_fill = self.explicit(StyleField::Color).and_then(StyleValue::as_color);
        if let Some(fill) = explicit_fill {
            if !self.is_explicit(StyleField::StrikeColor) {
                self.strike_color = fill;
            }
            if !self.is_explicit(StyleField::UnderlineColor) {
                self.underline_color = fill;
            }
        }

        self.calculate();
    }

    fn split_color_list(&mut self) {
        let Some(StyleValue::Text(list)) = self.explicit(StyleField::Color) else {
            return;
        };
        if !list.contains(',') {
            return;
        }
        let parts: Vec<String> = list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let Some(first) = parts.first().cloned() else {
            self.clear_explicit(StyleField::Color);
            return;
        };
        self.explicit[StyleField::Color.index()] = Some(StyleValue::Text(first));

        let assignments: &[(Corner, usize)] = match parts.len() {
            4 => &[
                (Corner::LeftTop, 0),
                (Corner::LeftBottom, 1),
                (Corner::RightTop, 2),
                (Corner::RightBottom, 3),
            ],
            3 => &[
                (Corner::LeftTop, 0),
                (Corner::RightTop, 1),
                (Corner::RightBottom, 2),
                (Corner::LeftBottom, 1),
            ],
            2 => &[
                (Corner::LeftTop, 0),
                (Corner::RightTop, 0),
                (Corner::RightBottom, 1),
                (Corner::LeftBottom, 1),
            ],
            _ => &[],
        };
        for &(corner, part) in assignments {
            if !self.is_explicit(corner.color_field()) {
                self.set_explicit(corner.color_field(), parts[part].clone());
            }
        }
    }

    fn resolve(&mut self, field: StyleField, value: &StyleValue) {
        use StyleField as F;

        let applied = match field.kind() {
            FieldKind::Color => match value.as_color() {
                Some(color) => {
                    self.apply_color(field, color);
                    true
                }
                None => false,
            },
            FieldKind::Bool => match value.as_bool() {
                Some(b) => {
                    self.apply_bool(field, b);
                    true
                }
                None => false,
            },
            FieldKind::Number => match value.as_number() {
                Some(n) => {
                    self.apply_number(field, n);
                    true
                }
                None => false,
            },
            FieldKind::Enum => match field {
                F::ScriptType => ScriptType::from_value(value).map(|v| self.script_type = v),
                F::HorizontalAlign => {
                    HorizontalAlign::from_value(value).map(|v| self.horizontal_align = v)
                }
                F::VerticalAlign => {
                    VerticalAlign::from_value(value).map(|v| self.vertical_align = v)
                }
                F::Overflow => Overflow::from_value(value).map(|v| self.overflow = v),
                _ => None,
            }
            .is_some(),
        };

        if !applied {
            tracing::warn!("Ignoring invalid value {:?} for style field {}", value, field);
        }
    }

    fn apply_color(&mut self, field: StyleField, color: Color) {
        use StyleField as F;
        let corner = match field {
            F::Color => {
                self.fill = color;
                return;
            }
            F::ShadowColor => {
                self.shadow_color = color;
                return;
            }
            F::StrokeColor => {
                self.stroke_color = color;
                return;
            }
            F::GlowColor => {
                self.glow_color = color;
                return;
            }
            F::BackgroundColor => {
                self.background_color = color;
                return;
            }
            F::MaskColor => {
                self.mask_color = color;
                return;
            }
            F::UnderlineColor => {
                self.underline_color = color;
                return;
            }
            F::StrikeColor => {
                self.strike_color = color;
                return;
            }
            F::ColorLT => Corner::LeftTop,
            F::ColorLB => Corner::LeftBottom,
            F::ColorRT => Corner::RightTop,
            F::ColorRB => Corner::RightBottom,
            _ => return,
        };
        self.corners[corner as usize] = color;
        if !self.is_explicit(corner.enable_field()) {
            self.corner_enabled[corner as usize] = true;
        }
    }

    fn apply_bool(&mut self, field: StyleField, value: bool) {
        use StyleField as F;
        match field {
            F::EnableColorLT => self.corner_enabled[Corner::LeftTop as usize] = value,
            F::EnableColorLB => self.corner_enabled[Corner::LeftBottom as usize] = value,
            F::EnableColorRT => self.corner_enabled[Corner::RightTop as usize] = value,
            F::EnableColorRB => self.corner_enabled[Corner::RightBottom as usize] = value,
            F::EnableGlow => self.enable_glow = value,
            F::Background => self.background = value,
            F::Mask => self.mask = value,
            F::Italic => self.italic = value,
            F::Bold => self.bold = value,
            F::Underline => self.underline = value,
            F::Strike => self.strike = value,
            F::AutoWrap => self.auto_wrap = value,
            F::EqualWidth => self.equal_width = value,
            F::FixedLineHeight => self.fixed_line_height = value,
            F::FontAutoSize => self.font_auto_size = value,
            F::BreakWestern => self.break_western = value,
            _ => {}
        }
    }

    fn apply_number(&mut self, field: StyleField, value: f32) {
        use StyleField as F;
        match field {
            F::Shadow => self.shadow = value,
            F::ShadowOffsetX => self.shadow_offset_x = value,
            F::ShadowOffsetY => self.shadow_offset_y = value,
            F::ShadowBlur => self.shadow_blur = value,
            F::Stroke => self.stroke = value,
            F::StrokeBlur => self.stroke_blur = value,
            F::GlowInner => self.glow_inner = value,
            F::GlowOuter => self.glow_outer = value,
            F::GlowPower => self.glow_power = value,
            F::GlowOffsetX => self.glow_offset_x = value,
            F::GlowOffsetY => self.glow_offset_y = value,
            F::FontSize => self.font_size = value,
            F::FontSmoothness => self.font_smoothness = value,
            F::Dilate => self.dilate = value,
            F::FontMinSize => self.font_min_size = value,
            F::FontMaxSize => self.font_max_size = value,
            F::LineSpace => self.line_space = value,
            F::LetterSpace => self.letter_space = value,
            F::PaddingLeft => self.padding_left = value,
            F::PaddingRight => self.padding_right = value,
            F::PaddingTop => self.padding_top = value,
            F::PaddingBottom => self.padding_bottom = value,
            F::Aspect => self.aspect = value,
            F::CharVisibleRatio => self.char_visible_ratio = value.clamp(0.0, 1.0),
            _ => {}
        }
    }

    /// Copy another record into this one.
    ///
    /// With `only_changed`, only the other record's explicit values are copied, so a named
    /// style can be layered onto a run without clobbering fields it does not mention. Call
    /// [`preset`](Self::preset) afterwards.
    pub fn copy_from(&mut self, other: &StyleRecord, only_changed: bool) -> &mut Self {
        if !only_changed {
            *self = other.clone();
            return self;
        }
        for field in other.changed.iter() {
            self.explicit[field.index()] = other.explicit[field.index()].clone();
            self.changed.insert(field);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_wins_over_default() {
        let mut style = StyleRecord::new();
        style.set_explicit(StyleField::Bold, true);
        style.preset();
        assert!(style.bold());

        style.set_bold(false, false);
        assert!(style.bold());

        style.set_bold(false, true);
        assert!(!style.bold());
    }

    #[test]
    fn test_setter_writes_without_explicit() {
        let mut style = StyleRecord::new();
        style.set_font_size(32.0, false);
        assert_eq!(style.font_size(), 32.0);
    }

    #[test]
    fn test_color_list_four() {
        let mut style = StyleRecord::new();
        style.set_explicit(StyleField::Color, "red,green,blue,white");
        style.preset();
        assert_eq!(style.fill_color(), Color::RED);
        assert_eq!(style.corner_color(Corner::LeftTop), Color::RED);
        assert_eq!(style.corner_color(Corner::LeftBottom), Color::GREEN);
        assert_eq!(style.corner_color(Corner::RightTop), Color::BLUE);
        assert_eq!(style.corner_color(Corner::RightBottom), Color::WHITE);
    }

    #[test]
    fn test_color_list_three_and_two() {
        let mut three = StyleRecord::new();
        three.set_explicit(StyleField::Color, "red, green, blue");
        three.preset();
        assert_eq!(three.corner_color(Corner::LeftTop), Color::RED);
        assert_eq!(three.corner_color(Corner::RightTop), Color::GREEN);
        assert_eq!(three.corner_color(Corner::RightBottom), Color::BLUE);
        assert_eq!(three.corner_color(Corner::LeftBottom), Color::GREEN);

        let mut two = StyleRecord::new();
        two.set_explicit(StyleField::Color, "red,blue");
        two.preset();
        assert_eq!(two.corner_color(Corner::LeftTop), Color::RED);
        assert_eq!(two.corner_color(Corner::RightTop), Color::RED);
        assert_eq!(two.corner_color(Corner::LeftBottom), Color::BLUE);
        assert_eq!(two.corner_color(Corner::RightBottom), Color::BLUE);
    }

    #[test]
    fn test_color_list_keeps_explicit_corner() {
        let mut style = StyleRecord::new();
        style.set_explicit(StyleField::ColorLT, "white");
        style.set_explicit(StyleField::Color, "red,green,blue,black");
        style.preset();
        assert_eq!(style.corner_color(Corner::LeftTop), Color::WHITE);
        assert_eq!(style.corner_color(Corner::LeftBottom), Color::GREEN);
    }

    #[test]
    fn test_explicit_corner_disabled() {
        let mut style = StyleRecord::new();
        style.set_explicit(StyleField::ColorRB, "red");
        style.set_explicit(StyleField::EnableColorRB, false);
        style.preset();
        assert_eq!(style.corner_color(Corner::RightBottom), style.fill_color());
    }

    #[test]
    fn test_decoration_colors_follow_fill() {
        let mut style = StyleRecord::new();
        style.set_explicit(StyleField::Color, "#00ff00");
        style.set_explicit(StyleField::UnderlineColor, "blue");
        style.preset();
        assert_eq!(style.strike_color(), Color::GREEN);
        assert_eq!(style.underline_color(), Color::BLUE);
    }

    #[test]
    fn test_script_size_and_gamma() {
        let mut style = StyleRecord::new();
        style.set_font_size(20.0, false);
        style.set_script_ratio(0.5);
        style.set_explicit(StyleField::ScriptType, "sup");
        style.preset();
        assert_eq!(style.real_font_size(), 10.0);
        assert!((style.gamma() - 2.0 * 1.4142 / 10.0).abs() < 1e-6);

        style.set_stroke(0.2, false);
        style.calculate();
        assert!((style.gamma() - 2.0 * 1.4142 / 18.0).abs() < 1e-6);
    }

    #[test]
    fn test_resolved_font_size() {
        let mut style = StyleRecord::new();
        assert_eq!(style.resolved_font_size(30.0), 30.0);
        style.set_explicit(StyleField::FontSize, 12.0);
        style.preset();
        assert_eq!(style.resolved_font_size(30.0), 12.0);
    }

    #[test]
    fn test_copy_only_changed() {
        let mut named = StyleRecord::new();
        named.set_explicit(StyleField::Italic, true);
        named.set_italic(true, true);
        named.set_letter_space(9.0, true);

        let mut run = StyleRecord::new();
        run.set_explicit(StyleField::Bold, true);
        run.copy_from(&named, true).preset();

        assert!(run.bold());
        assert!(run.italic());
        assert_eq!(run.letter_space(), 0.0);
        assert!(run.changed_fields().contains(StyleField::Italic));
    }

    #[test]
    fn test_copy_all() {
        let mut named = StyleRecord::new();
        named.set_letter_space(9.0, true);
        let mut run = StyleRecord::new();
        run.copy_from(&named, false);
        assert_eq!(run.letter_space(), 9.0);
    }

    #[test]
    fn test_invalid_value_is_ignored() {
        let mut style = StyleRecord::new();
        style.set_explicit(StyleField::FontSize, "big");
        style.preset();
        assert_eq!(style.font_size(), 18.0);
    }
}
