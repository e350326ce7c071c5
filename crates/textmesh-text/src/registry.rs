//! Named styles loaded from a JSON style sheet.
//!
//! A style sheet is an object of named styles:
//!
//! ```json
//! {
//!     "title": { "asTag": true, "size": 32, "enables": ["b"], "shadow": { "x": 2, "color": "#000000" } },
//!     "note":  { "alias": "n", "color": "gray", "i": true }
//! }
//! ```
//!
//! Keys are tag names understood by [`TagRegistry`] or canonical field names.
//! `asTag` makes the style usable as `<title>`, `alias` adds another tag name.

use std::path::Path;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use textmesh_core::alloc::HashMap;
use textmesh_core::profiling::profile_function;

use crate::error::{TextError, TextResult};
use crate::style::{StyleField, StyleRecord, StyleValue, TagRegistry};

/// Source of named styles for the markup compiler.
pub trait StyleResolver {
    /// A style referenced by `<style=name>`.
    fn style(&self, name: &str) -> Option<&StyleRecord>;

    /// A style usable as its own tag. Lookup is case-insensitive.
    fn tag_style(&self, tag: &str) -> Option<&StyleRecord>;

    /// Changes whenever the resolvable styles change. Compiled text is stale once it moves.
    fn revision(&self) -> u64 {
        0
    }
}

/// A resolver with no styles.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStyles;

impl StyleResolver for NoStyles {
    fn style(&self, _name: &str) -> Option<&StyleRecord> {
        None
    }

    fn tag_style(&self, _tag: &str) -> Option<&StyleRecord> {
        None
    }
}

#[derive(Debug, Default)]
pub struct StyleRegistry {
    styles: IndexMap<String, StyleRecord>,
    tags: HashMap<String, String>,
    revision: u64,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a style sheet string.
    pub fn from_json(json: &str) -> TextResult<Self> {
        let mut registry = Self::new();
        registry.load_json(json)?;
        Ok(registry)
    }

    /// Replace every registered style with the contents of `json`.
    ///
    /// Returns the number of styles registered. On error the registry is left unchanged.
    pub fn load_json(&mut self, json: &str) -> TextResult<usize> {
        profile_function!();

        let root: Value = serde_json::from_str(json)?;
        let Value::Object(entries) = root else {
            return Err(TextError::InvalidStyleSheet(
                "top level must be an object of named styles".to_string(),
            ));
        };

        let mut parsed = Vec::with_capacity(entries.len());
        for (name, body) in &entries {
            let Value::Object(body) = body else {
                return Err(TextError::InvalidStyleSheet(format!(
                    "style '{}' must be an object",
                    name
                )));
            };
            parsed.push((name.clone(), parse_style(body)));
        }

        self.remove_all();
        for (name, (style, meta)) in parsed {
            self.register(name, style, meta.as_tag, meta.alias);
        }

        tracing::info!("Loaded {} text styles", self.styles.len());
        Ok(self.styles.len())
    }

    /// Read a style sheet from disk. See [`load_json`](Self::load_json).
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> TextResult<usize> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        tracing::debug!("Reading style sheet from {}", path.display());
        self.load_json(&json)
    }

    /// Register one style, replacing any style with the same name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        style: StyleRecord,
        as_tag: bool,
        alias: Option<String>,
    ) {
        let name = name.into();
        if as_tag {
            self.tags.insert(name.to_lowercase(), name.clone());
        }
        if let Some(alias) = alias {
            self.tags.insert(alias.to_lowercase(), name.clone());
        }
        self.styles.insert(name, style);
        self.revision += 1;
    }

    pub fn remove_all(&mut self) {
        self.styles.clear();
        self.tags.clear();
        self.revision += 1;
    }

    /// Style names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn get(&self, name: &str) -> TextResult<&StyleRecord> {
        self.styles
            .get(name)
            .ok_or_else(|| TextError::UnknownStyle(name.to_string()))
    }

    /// Increases on every change, so holders of compiled text can tell when to restyle.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl StyleResolver for StyleRegistry {
    fn style(&self, name: &str) -> Option<&StyleRecord> {
        self.styles.get(name)
    }

    fn tag_style(&self, tag: &str) -> Option<&StyleRecord> {
        let name = self.tags.get(&tag.to_lowercase())?;
        self.styles.get(name)
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

#[derive(Debug, Default)]
struct StyleMeta {
    as_tag: bool,
    alias: Option<String>,
}

fn parse_style(body: &Map<String, Value>) -> (StyleRecord, StyleMeta) {
    let mut style = StyleRecord::new();
    let mut meta = StyleMeta::default();
    apply_object(&mut style, &mut meta, body, None);
    style.preset();
    (style, meta)
}

fn apply_object(
    style: &mut StyleRecord,
    meta: &mut StyleMeta,
    body: &Map<String, Value>,
    prefix: Option<&str>,
) {
    let tags = TagRegistry::builtin();

    for (key, value) in body {
        match (key.as_str(), value) {
            ("enables", Value::Array(items)) => {
                for item in items {
                    let Some(name) = item.as_str() else {
                        tracing::warn!("Ignoring non-string entry in enables: {}", item);
                        continue;
                    };
                    match tags.get(name) {
                        Some(mapping) => {
                            if let (Some(field), Some(value)) = (mapping.field, mapping.value_for(None)) {
                                style.set_explicit(field, value);
                            }
                        }
                        None => tracing::warn!("Unknown tag in enables: {}", name),
                    }
                }
                continue;
            }
            ("asTag", value) => {
                meta.as_tag = value.as_bool().unwrap_or(false);
                continue;
            }
            ("alias", Value::String(alias)) => {
                meta.alias = Some(alias.clone());
                continue;
            }
            (_, Value::Null) => continue,
            _ => {}
        }

        let key = match prefix {
            Some(prefix) => format!("{}-{}", prefix, key),
            None => key.clone(),
        };

        if let Value::Object(nested) = value {
            if let Some(mapping) = tags.get(key.as_str()).filter(|m| !m.attributes.is_empty()) {
                for (attr, attr_value) in nested {
                    match (mapping.attribute(attr), StyleValue::from_json(attr_value)) {
                        (Some(field), Some(value)) => style.set_explicit(field, value),
                        _ => tracing::warn!("Ignoring style attribute {}.{}", key, attr),
                    }
                }
            } else {
                apply_object(style, meta, nested, Some(&key));
            }
            continue;
        }

        let field = tags
            .get(key.as_str())
            .and_then(|mapping| mapping.field)
            .or_else(|| StyleField::from_name(&key));
        match (field, StyleValue::from_json(value)) {
            (Some(field), Some(value)) => style.set_explicit(field, value),
            _ => tracing::warn!("Ignoring unknown style key {}", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = r##"{
        "title": { "asTag": true, "size": 32, "enables": ["b"], "shadow": { "x": 2, "color": "#ff0000" } },
        "note": { "alias": "N", "color": "gray", "italic": true },
        "plain": { "letterSpace": 3 }
    }"##;

    #[test]
    fn test_load_styles() {
        let registry = StyleRegistry::from_json(SHEET).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["title", "note", "plain"]);

        let title = registry.style("title").unwrap();
        assert_eq!(title.font_size(), 32.0);
        assert!(title.bold());
        assert_eq!(title.shadow_offset_x(), 2.0);
        assert_eq!(title.shadow_color(), textmesh_core::Color::RED);
        assert!(title.changed_fields().contains(StyleField::FontSize));

        assert_eq!(registry.style("plain").unwrap().letter_space(), 3.0);
    }

    #[test]
    fn test_tags_and_aliases() {
        let registry = StyleRegistry::from_json(SHEET).unwrap();
        assert!(registry.tag_style("TITLE").is_some());
        assert!(registry.tag_style("n").unwrap().italic());
        assert!(registry.tag_style("plain").is_none());
        assert!(registry.tag_style("note").is_none());
    }

    #[test]
    fn test_invalid_sheet_keeps_previous() {
        let mut registry = StyleRegistry::from_json(SHEET).unwrap();
        let revision = registry.revision();
        assert!(matches!(registry.load_json("[1, 2]"), Err(TextError::InvalidStyleSheet(_))));
        assert!(matches!(registry.load_json("{ nope"), Err(TextError::InvalidStyleJson(_))));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.revision(), revision);
    }

    #[test]
    fn test_unknown_style() {
        let registry = StyleRegistry::from_json(SHEET).unwrap();
        assert!(registry.get("title").is_ok());
        assert_eq!(registry.get("missing").err(), Some(TextError::UnknownStyle("missing".to_string())));
    }

    #[test]
    fn test_prefixed_nested_keys() {
        let registry =
            StyleRegistry::from_json(r#"{ "a": { "outline": { "color": "blue" }, "font": { "size": 20 } } }"#)
                .unwrap();
        let style = registry.style("a").unwrap();
        assert_eq!(style.stroke_color(), textmesh_core::Color::BLUE);
        assert_eq!(style.font_size(), 20.0);
    }
}
