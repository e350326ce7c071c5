//! Typeset a line of rich text and print the resulting lines.
//!
//! ```text
//! cargo run -p textmesh-text --example typeset -- 160 "Some text to wrap"
//! ```
//!
//! The first argument is the container width. Set `RUST_LOG=textmesh_text=trace` to see every
//! pass.

use std::sync::Arc;

use glam::Vec2;
use textmesh_core::{logging, profiling};
use textmesh_text::{
    Element, LabelSettings, MarkupTree, MonospaceFont, Overflow, StyleRegistry, TextLabel,
};

const STYLES: &str = r#"{
    "title": { "asTag": true, "size": 24, "b": true },
    "quiet": { "alias": "q", "color": "gray", "i": true }
}"#;

fn main() {
    logging::init();
    profiling::set_enabled(true);

    let mut args = std::env::args().skip(1);
    let width = args.next().and_then(|w| w.parse().ok()).unwrap_or(160.0);
    let body = args
        .next()
        .unwrap_or_else(|| "The quick brown fox jumps over the lazy dog.".to_string());

    let registry = match StyleRegistry::from_json(STYLES) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!("Bad style sheet: {}", e);
            return;
        }
    };

    let tree = MarkupTree::new()
        .with(Element::new("title").with_text("Demo"))
        .with("\n")
        .with(body.as_str())
        .with(Element::new("q").with_text(" (fin)"));

    let settings = LabelSettings {
        font_size: 16.0,
        overflow: Overflow::ResizeHeight,
        ..Default::default()
    };
    let mut label = TextLabel::new(Some(Arc::new(MonospaceFont::new(16.0))))
        .with_settings(settings)
        .with_size(width, 0.0);
    label.set_anchor(Vec2::ZERO);
    label.set_markup(tree);

    profiling::new_frame();
    let Some(result) = label.update(&registry) else {
        return;
    };

    println!(
        "{} lines, content {:.1}x{:.1}, container {:.1}x{:.1}",
        result.line_count(),
        result.width,
        result.height,
        result.container.width,
        result.container.height
    );
    let result = result.clone();
    for (i, line) in result.lines.iter().enumerate() {
        let text: String = label.units()[line.range.clone()]
            .iter()
            .filter_map(|u| u.content.as_char())
            .filter(|c| *c != '\n')
            .collect();
        println!("{:>3} @ {:>6.1}: {}", i, line.top, text);
    }
    for quad in label.decorations() {
        println!("decoration {:?} at {:?}", quad.quad_type, quad.bounds);
    }
}
