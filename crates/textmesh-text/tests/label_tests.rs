//! End-to-end label behaviour: compile, style, lay out and query.

use std::sync::Arc;

use glam::vec2;
use textmesh_core::alloc::Pool;
use textmesh_core::{Color, Size};
use textmesh_text::{
    DecorationQuadType, DirtyFlags, Element, LabelSettings, MarkupCompiler, MarkupNode, MarkupTree,
    MonospaceFont, NoStyles, StyleRecord, StyleRegistry, TextError, TextLabel,
};

fn label(width: f32, height: f32) -> TextLabel {
    let settings = LabelSettings {
        font_size: 10.0,
        line_height: 10.0,
        ..Default::default()
    };
    TextLabel::new(Some(Arc::new(MonospaceFont::new(10.0))))
        .with_settings(settings)
        .with_size(width, height)
}

#[test]
fn test_unclosed_bold_runs_to_the_end() {
    // "<b>bold<i>both</b>tail" where the tokenizer never saw a matching close for <b>.
    let tree = MarkupTree::new().with(
        Element::new("b")
            .with_text("bold")
            .with_child(Element::new("i").with_text("both"))
            .with_child("tail"),
    );
    let mut label = label(500.0, 100.0);
    label.set_markup(tree);
    label.update(&NoStyles).unwrap();

    let stream = label.stream();
    assert_eq!(stream.text(), "boldbothtail");
    assert!(stream.units.iter().all(|u| stream.style_of(u).bold()));
    let italic: Vec<bool> = stream.units.iter().map(|u| stream.style_of(u).italic()).collect();
    assert_eq!(&italic[4..8], &[true; 4]);
    assert!(!italic[8]);
}

#[test]
fn test_irregular_depths_do_not_panic() {
    let font = MonospaceFont::new(10.0);
    let a = MarkupNode::text("a");
    let bold = MarkupNode::from(Element::new("b"));
    let b = MarkupNode::text("b");
    let c = MarkupNode::text("c");
    let d = MarkupNode::text("d");
    let nodes = vec![(0, &a), (0, &bold), (5, &b), (1, &c), (0, &d)];

    let stream =
        MarkupCompiler::new(&font, &NoStyles).compile_nodes(nodes, StyleRecord::new(), &mut Pool::new());
    assert_eq!(stream.text(), "abcd");
    assert!(!stream.style_of(&stream.units[3]).bold());
}

#[test]
fn test_sibling_styles_are_isolated() {
    let tree = MarkupTree::new()
        .with(Element::new("color").with_value("#ff0000").with_text("r"))
        .with("p")
        .with(Element::new("size").with_value("20").with_text("s"))
        .with("q");
    let mut label = label(500.0, 100.0);
    label.set_markup(tree);
    label.update(&NoStyles).unwrap();

    let stream = label.stream();
    let base = stream.styles.base();
    let style = |i: usize| stream.style_of(&stream.units[i]);
    assert_eq!(style(0).fill_color(), Color::RED);
    assert_eq!(style(1).fill_color(), base.fill_color());
    assert_eq!(style(2).font_size(), 20.0);
    assert_eq!(style(3).font_size(), base.font_size());
    assert_eq!(base.fill_color(), Color::WHITE);
}

#[test]
fn test_registry_changes_recompile() {
    let mut registry = StyleRegistry::from_json(r#"{ "warn": { "asTag": true, "color": "red" } }"#).unwrap();
    let tree = MarkupTree::new().with(Element::new("warn").with_text("w"));
    let mut label = label(100.0, 100.0);
    label.set_markup(tree);
    label.update(&registry).unwrap();
    let first = label.generation();
    assert_eq!(label.stream().style_of(&label.units()[0]).fill_color(), Color::RED);

    registry
        .load_json(r#"{ "warn": { "asTag": true, "color": "blue" } }"#)
        .unwrap();
    label.update(&registry).unwrap();
    assert_ne!(label.generation(), first);
    assert_eq!(label.stream().style_of(&label.units()[0]).fill_color(), Color::BLUE);
}

#[test]
fn test_unknown_style_lookup() {
    let registry = StyleRegistry::new();
    assert_eq!(registry.get("nope").err(), Some(TextError::UnknownStyle("nope".to_string())));
}

#[test]
fn test_slot_resolution() {
    let tree = MarkupTree::new()
        .with("a")
        .with(Element::new("img").with_attribute("src", "coin"))
        .with("b");
    let mut label = label(200.0, 100.0);
    label.set_markup(tree);
    label.update(&NoStyles).unwrap();
    let generation = label.generation();

    assert_eq!(label.pending_slots().count(), 1);
    assert_eq!(label.units()[1].metrics.w, 10.0);

    assert_eq!(
        label.resolve_slot(generation, 3, Size::new(20.0, 10.0)),
        Err(TextError::SlotOutOfRange { index: 3, count: 1 })
    );
    assert_eq!(
        label.resolve_slot(generation + 1, 0, Size::new(20.0, 10.0)),
        Err(TextError::StaleSlot {
            generation: generation + 1,
            current: generation
        })
    );

    assert_eq!(label.resolve_slot(generation, 0, Size::new(20.0, 10.0)), Ok(true));
    assert!(label.dirty().contains(DirtyFlags::LAYOUT));
    label.update(&NoStyles).unwrap();

    assert_eq!(label.pending_slots().count(), 0);
    assert_eq!(label.units()[1].metrics.w, 20.0);
    assert_eq!(label.units()[2].x, 30.0);
    assert_eq!(label.generation(), generation);

    let placements = label.slot_placements();
    assert_eq!(placements.len(), 1);
    assert_eq!(placements[0].unit, 1);
    assert_eq!(placements[0].size, Size::new(20.0, 10.0));
}

#[test]
fn test_stale_slot_after_new_text() {
    let mut label = label(200.0, 100.0);
    label.set_markup(MarkupTree::new().with(Element::new("img").with_attribute("src", "coin")));
    label.update(&NoStyles).unwrap();
    let old = label.generation();

    label.set_text("plain now");
    label.update(&NoStyles).unwrap();
    assert!(matches!(
        label.resolve_slot(old, 0, Size::new(5.0, 5.0)),
        Err(TextError::StaleSlot { .. })
    ));
}

#[test]
fn test_hit_test_relative_to_anchor() {
    let tree = MarkupTree::new()
        .with("ab")
        .with(Element::new("click").with_attribute("name", "link").with_text("cd"));
    let mut label = label(100.0, 100.0);
    label.set_anchor(vec2(0.5, 0.5));
    label.set_markup(tree);
    label.update(&NoStyles).unwrap();

    let hit = label.hit_test(vec2(25.0 - 50.0, 5.0 - 50.0)).unwrap();
    assert_eq!(hit.unit, 2);
    let click = label.clickable(hit.click.unwrap()).unwrap();
    assert_eq!(click.name.as_deref(), Some("link"));
    assert_eq!(click.units, 2..4);

    assert!(label.hit_test(vec2(25.0, 5.0)).is_none());
}

#[test]
fn test_underline_setting_decorates_each_line() {
    let settings = LabelSettings {
        font_size: 10.0,
        underline: true,
        ..Default::default()
    };
    let mut label = label(100.0, 100.0);
    label.set_settings(settings);
    label.set_text("ab\ncd");
    label.update(&NoStyles).unwrap();

    let quads = label.decorations();
    assert_eq!(quads.len(), 2);
    assert!(quads
        .iter()
        .all(|q| matches!(q.quad_type, DecorationQuadType::Underline { .. })));
    assert_eq!(quads[0].bounds.width, 20.0);
    assert!(quads[1].bounds.y > quads[0].bounds.y);
}

#[test]
fn test_shrink_label_keeps_fitted_size() {
    let settings = LabelSettings {
        font_size: 30.0,
        overflow: textmesh_text::Overflow::Shrink,
        font_auto_size: true,
        ..Default::default()
    };
    let mut label = TextLabel::new(Some(Arc::new(MonospaceFont::new(10.0))))
        .with_settings(settings)
        .with_size(100.0, 30.0);
    label.set_text("fit this text please");
    let fitted = label.update(&NoStyles).unwrap().font_size;
    assert!((10.0..=40.0).contains(&fitted));
    assert!(fitted < 30.0);

    label.set_color(Color::RED);
    label.update(&NoStyles).unwrap();
    assert_eq!(label.stream().styles.base().font_size(), fitted);
}

#[test]
fn test_resize_refits_against_exact_width() {
    let shrinking = || {
        let settings = LabelSettings {
            overflow: textmesh_text::Overflow::Shrink,
            font_auto_size: true,
            ..Default::default()
        };
        let mut label = TextLabel::new(Some(Arc::new(MonospaceFont::new(10.0))))
            .with_settings(settings)
            .with_size(100.4, 80.0);
        label.set_text("AAAAAAAAAAAA");
        label
    };

    let mut resized = shrinking();
    resized.update(&NoStyles).unwrap();
    resized.set_size(99.6, 80.0);
    let (size, height) = {
        let result = resized.update(&NoStyles).unwrap();
        (result.font_size, result.height)
    };
    assert!(height <= 80.0, "content height {} at font size {}", height, size);

    let mut fresh = shrinking();
    fresh.set_size(99.6, 80.0);
    assert_eq!(fresh.update(&NoStyles).unwrap().font_size, size);
}
