//! Textmesh Text - Rich-text typesetting
//!
//! This crate turns styled text into positioned units ready for a glyph renderer:
//! - Per-run styles with explicit (markup) and effective (component) values
//! - A markup compiler that walks a tag tree and emits a character stream
//! - Line breaking with CJK, punctuation and italic/script spacing rules
//! - Alignment, overflow handling and shrink-to-fit font sizing
//! - Decoration quads, inline slot placement and hit testing
//!
//! Rasterization is out of scope: fonts are seen only through [`FontMetricsProvider`].
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use textmesh_text::{Element, MarkupTree, MonospaceFont, NoStyles, TextLabel};
//!
//! let mut label = TextLabel::new(Some(Arc::new(MonospaceFont::new(16.0))))
//!     .with_size(300.0, 60.0);
//!
//! label.set_markup(
//!     MarkupTree::new()
//!         .with("Hello, ")
//!         .with(Element::new("b").with_text("world")),
//! );
//!
//! let layout = label.update(&NoStyles).unwrap();
//! assert_eq!(layout.line_count(), 1);
//! assert_eq!(label.units().len(), 12);
//! ```

pub mod cache;
pub mod compiler;
pub mod config;
pub mod decoration;
pub mod dirty;
pub mod error;
pub mod font;
pub mod label;
pub mod layout;
pub mod markup;
pub mod metrics;
pub mod registry;
pub mod script;
pub mod style;
pub mod unit;

pub use cache::{MeasureCache, MeasureKey, Measured};
pub use compiler::MarkupCompiler;
pub use config::TypesetConfig;
pub use decoration::{DecorationQuad, DecorationQuadType, build_decorations};
pub use dirty::DirtyFlags;
pub use error::{TextError, TextResult};
pub use font::{FontConstants, FontMetricsProvider, GlyphMetrics, GlyphTableFont, MonospaceFont};
pub use hit_test::{HitTest, hit_test};
pub use label::{LabelSettings, TextLabel};
pub use layout::align::SlotPlacement;
pub use layout::{Container, LayoutEngine, LayoutParams, LayoutResult, LineInfo};
pub use markup::{Element, MarkupNode, MarkupTree};
pub use metrics::UnitMetrics;
pub use registry::{NoStyles, StyleRegistry, StyleResolver};
pub use style::{
    Corner, HorizontalAlign, Overflow, ScriptType, StyleField, StyleRecord, StyleValue,
    VerticalAlign,
};
pub use unit::{CharStream, CharUnit, Clickable, InlineSlot, SlotKind, SlotSizing, StyleId, UnitContent};
