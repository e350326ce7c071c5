//! Character classes that drive line breaking.

/// Opening punctuation. Never ends a line: it belongs with what follows.
const LEADING: &str = "([{<‘“«‹（［｛〔〈《「『【〖〘〚＜｟";

/// Closing punctuation and other break-after characters. Stays with what precedes it and may
/// hang past the right edge rather than start a line.
const TRAILING: &str = ")]}>,.!?;:%’”»›）］｝〕〉》」』】〗〙〛＞｠、。，．！？；：…‥・ー〜～";

/// Punctuation that is not a bracket or stop but still gets the punctuation advance rule.
const OTHER_PUNCTUATION: &str = "\"'`~@#$^&*_+=|\\/-—–·•￥＄＠＃＆＊＋＝｜＼／－＿";

/// Whether `ch` belongs to a script that breaks between adjacent characters.
pub fn is_cjk(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x11FF         // Hangul Jamo
        | 0x2E80..=0x2FDF       // CJK radicals, Kangxi
        | 0x3000..=0x303F       // CJK symbols and punctuation
        | 0x3040..=0x30FF       // Hiragana, Katakana
        | 0x3100..=0x312F       // Bopomofo
        | 0x3130..=0x318F       // Hangul compatibility Jamo
        | 0x31F0..=0x31FF       // Katakana phonetic extensions
        | 0x3200..=0x4DBF       // enclosed CJK, compatibility, extension A
        | 0x4E00..=0x9FFF       // unified ideographs
        | 0xA960..=0xA97F       // Hangul Jamo extended A
        | 0xAC00..=0xD7FF       // Hangul syllables
        | 0xF900..=0xFAFF       // compatibility ideographs
        | 0xFE30..=0xFE4F       // compatibility forms
        | 0xFF00..=0xFFEF       // half/full width forms
        | 0x20000..=0x3134F     // extensions B..G
    )
}

pub fn is_leading(ch: char) -> bool {
    LEADING.contains(ch)
}

pub fn is_trailing(ch: char) -> bool {
    TRAILING.contains(ch)
}

pub fn is_punctuation(ch: char) -> bool {
    is_leading(ch) || is_trailing(ch) || OTHER_PUNCTUATION.contains(ch)
}

/// Break-relevant class of one unit, computed once per pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharClass {
    #[default]
    Word,
    Cjk,
    Space,
    Newline,
    /// Inline slot. Breaks like an ideograph.
    Slot,
}

impl CharClass {
    pub fn of(ch: char) -> Self {
        match ch {
            '\n' => CharClass::Newline,
            ' ' | '\t' | '\u{3000}' => CharClass::Space,
            c if is_cjk(c) => CharClass::Cjk,
            _ => CharClass::Word,
        }
    }

    pub fn is_whitespace(self) -> bool {
        matches!(self, CharClass::Space | CharClass::Newline)
    }

    /// CJK-like units allow a break on either side.
    pub fn is_ideographic(self) -> bool {
        matches!(self, CharClass::Cjk | CharClass::Slot)
    }
}
