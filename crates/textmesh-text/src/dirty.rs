//! Dirty flags for incremental label updates.

use bitflags::bitflags;

bitflags! {
    /// What a [`TextLabel`](crate::label::TextLabel) has to redo on its next update.
    ///
    /// A color-only change restyles the compiled stream without laying it out again.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DirtyFlags: u8 {
        const NONE   = 0b0000;

        /// Text or markup changed. The stream is compiled again.
        const TEXT   = 0b0001;

        /// Component settings changed. Run styles are refreshed.
        const STYLE  = 0b0010;

        /// Geometry inputs changed (container, slot sizes, layout settings).
        const LAYOUT = 0b0100;

        const ALL    = Self::TEXT.bits() | Self::STYLE.bits() | Self::LAYOUT.bits();
    }
}

impl DirtyFlags {
    #[inline]
    pub fn needs_compile(&self) -> bool {
        self.contains(Self::TEXT)
    }

    #[inline]
    pub fn needs_layout(&self) -> bool {
        self.intersects(Self::TEXT | Self::LAYOUT)
    }

    /// Only run styles need refreshing.
    #[inline]
    pub fn is_style_only(&self) -> bool {
        *self == Self::STYLE
    }
}

impl Default for DirtyFlags {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_queries() {
        assert!(DirtyFlags::STYLE.is_style_only());
        assert!(!DirtyFlags::STYLE.needs_layout());
        assert!(DirtyFlags::TEXT.needs_layout());
        assert!((DirtyFlags::STYLE | DirtyFlags::LAYOUT).needs_layout());
        assert!(!(DirtyFlags::STYLE | DirtyFlags::LAYOUT).is_style_only());
        assert!(DirtyFlags::ALL.needs_compile());
    }
}
