//! Pre-tokenized rich-text tag tree.
//!
//! Tokenizing markup source is left to the caller; this module only models the result and
//! provides the depth-annotated depth-first walk the compiler consumes.

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    Text(String),
    Element(Element),
}

/// A tag such as `<color=#ff0000 lt=red>...</color>`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    /// The value after `=` in the opening tag.
    pub value: Option<String>,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<MarkupNode>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<MarkupNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(MarkupNode::Text(text.into()))
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

impl MarkupNode {
    pub fn text(text: impl Into<String>) -> Self {
        MarkupNode::Text(text.into())
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            MarkupNode::Text(_) => None,
            MarkupNode::Element(element) => Some(&element.name),
        }
    }
}

impl From<Element> for MarkupNode {
    fn from(element: Element) -> Self {
        MarkupNode::Element(element)
    }
}

impl From<&str> for MarkupNode {
    fn from(text: &str) -> Self {
        MarkupNode::Text(text.to_string())
    }
}

/// A forest of top-level nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkupTree {
    pub roots: Vec<MarkupNode>,
}

impl MarkupTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tree holding a single text node.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            roots: vec![MarkupNode::Text(text.into())],
        }
    }

    pub fn with(mut self, node: impl Into<MarkupNode>) -> Self {
        self.roots.push(node.into());
        self
    }

    pub fn push(&mut self, node: impl Into<MarkupNode>) {
        self.roots.push(node.into());
    }

    /// Pre-order walk yielding `(depth, node)`. Top-level nodes have depth 0.
    pub fn walk(&self) -> DepthFirst<'_> {
        DepthFirst {
            stack: self.roots.iter().rev().map(|node| (0, node)).collect(),
        }
    }
}

pub struct DepthFirst<'a> {
    stack: Vec<(usize, &'a MarkupNode)>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = (usize, &'a MarkupNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        if let MarkupNode::Element(element) = node {
            self.stack
                .extend(element.children.iter().rev().map(|child| (depth + 1, child)));
        }
        Some((depth, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_order_and_depth() {
        let tree = MarkupTree::new()
            .with("a")
            .with(
                Element::new("b")
                    .with_text("b1")
                    .with_child(Element::new("i").with_text("i1")),
            )
            .with("c");

        let walked: Vec<(usize, Option<&str>)> = tree
            .walk()
            .map(|(depth, node)| match node {
                MarkupNode::Text(text) => (depth, Some(text.as_str())),
                MarkupNode::Element(_) => (depth, None),
            })
            .collect();

        assert_eq!(
            walked,
            vec![
                (0, Some("a")),
                (0, None),
                (1, Some("b1")),
                (1, None),
                (2, Some("i1")),
                (0, Some("c")),
            ]
        );
    }

    #[test]
    fn test_element_builder() {
        let element = Element::new("shadow").with_value("0.2").with_attribute("color", "red");
        assert_eq!(element.value.as_deref(), Some("0.2"));
        assert_eq!(element.attribute("color"), Some("red"));
        assert_eq!(element.attribute("x"), None);
    }
}
