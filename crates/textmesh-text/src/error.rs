/// Errors reported by the fallible parts of the typesetting API.
///
/// Layout itself never fails: malformed markup is logged and skipped, a missing font yields no
/// result. These errors cover registry loading and slot bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub enum TextError {
    /// No font metrics provider is attached.
    MissingFont,

    /// A named style was requested that the registry does not know.
    UnknownStyle(String),

    /// A style sheet could not be parsed as JSON.
    InvalidStyleJson(String),

    /// A style sheet parsed, but its top level is not an object of named styles.
    InvalidStyleSheet(String),

    /// A slot callback arrived for a stream that has since been recompiled.
    StaleSlot { generation: u32, current: u32 },

    /// A slot index does not exist in the current stream.
    SlotOutOfRange { index: usize, count: usize },

    /// Generic IO error.
    IoError(String),
}

impl std::fmt::Display for TextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextError::MissingFont => write!(f, "No font metrics provider attached"),
            TextError::UnknownStyle(name) => write!(f, "Unknown style: {}", name),
            TextError::InvalidStyleJson(msg) => write!(f, "Invalid style JSON: {}", msg),
            TextError::InvalidStyleSheet(msg) => write!(f, "Invalid style sheet: {}", msg),
            TextError::StaleSlot { generation, current } => write!(
                f,
                "Slot belongs to text generation {} but the label is at generation {}",
                generation, current
            ),
            TextError::SlotOutOfRange { index, count } => write!(
                f,
                "Slot index {} out of range (slot count: {})",
                index, count
            ),
            TextError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for TextError {}

impl From<serde_json::Error> for TextError {
    fn from(err: serde_json::Error) -> Self {
        TextError::InvalidStyleJson(err.to_string())
    }
}

impl From<std::io::Error> for TextError {
    fn from(err: std::io::Error) -> Self {
        TextError::IoError(err.to_string())
    }
}

/// Result type for text operations.
pub type TextResult<T> = Result<T, TextError>;
