//! HTML Serialization (innerHTML/outerHTML)
//!
//! Renders a live subtree back to markup. Live properties (`value`,
//! `checked`) are not serialized, only content attributes.

use crate::{DomTree, NodeData, NodeId};

/// HTML serializer
#[derive(Debug, Clone)]
pub struct HtmlSerializer {
    /// Whether to format output with indentation
    pub pretty_print: bool,
    /// Indentation string
    pub indent: String,
}

/// Void elements (no end tag)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

impl Default for HtmlSerializer {
    fn default() -> Self {
        Self {
            pretty_print: false,
            indent: "  ".to_string(),
        }
    }
}

impl HtmlSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self {
            pretty_print: true,
            ..Self::default()
        }
    }

    /// Serialize innerHTML of a node (children only)
    pub fn serialize_inner(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_children(tree, node_id, &mut output, 0);
        output
    }

    /// Serialize outerHTML of a node (including the node itself)
    pub fn serialize_outer(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_node(tree, node_id, &mut output, 0);
        output
    }

    fn serialize_node(&self, tree: &DomTree, node_id: NodeId, output: &mut String, depth: usize) {
        let Some(node) = tree.get(node_id) else {
            return;
        };

        match &node.data {
            NodeData::Document => self.serialize_children(tree, node_id, output, depth),
            NodeData::Element(elem) => {
                let tag = elem.tag.as_str();
                self.newline(output, depth);

                output.push('<');
                output.push_str(tag);
                for attr in elem.attrs.iter() {
                    output.push(' ');
                    output.push_str(&attr.name);
                    if !attr.value.is_empty() {
                        output.push_str("=\"");
                        escape_attribute(&attr.value, output);
                        output.push('"');
                    }
                }

                if VOID_ELEMENTS.contains(&tag) {
                    output.push_str(" />");
                    return;
                }
                output.push('>');

                self.serialize_children(tree, node_id, output, depth + 1);

                if self.pretty_print && !node.children.is_empty() {
                    output.push('\n');
                    output.push_str(&self.indent.repeat(depth));
                }
                output.push_str("</");
                output.push_str(tag);
                output.push('>');
            }
            NodeData::Text(text) => escape_text(&text.content, output),
            NodeData::Vacant => {}
        }
    }

    fn serialize_children(&self, tree: &DomTree, parent_id: NodeId, output: &mut String, depth: usize) {
        for &child in tree.children(parent_id) {
            self.serialize_node(tree, child, output, depth);
        }
    }

    fn newline(&self, output: &mut String, depth: usize) {
        if self.pretty_print && depth > 0 {
            output.push('\n');
            for _ in 0..depth {
                output.push_str(&self.indent);
            }
        }
    }
}

/// Escape text content for HTML
fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value
fn escape_attribute(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_attribute() {
        let mut output = String::new();
        escape_attribute("Hello <world> & \"friends\"", &mut output);
        assert_eq!(output, "Hello &lt;world&gt; &amp; &quot;friends&quot;");
    }

    #[test]
    fn test_serialize_outer() {
        let mut tree = DomTree::new();
        let ul = tree.create_element("ul");
        let li = tree.create_element("li");
        let text = tree.create_text("milk & eggs");
        let input = tree.create_element("input");
        tree.set_attribute(ul, "class", "todo-list").unwrap();
        tree.set_attribute(input, "hidden", "").unwrap();
        tree.append_child(li, text).unwrap();
        tree.append_child(ul, li).unwrap();
        tree.append_child(ul, input).unwrap();

        assert_eq!(
            HtmlSerializer::new().serialize_outer(&tree, ul),
            r#"<ul class="todo-list"><li>milk &amp; eggs</li><input hidden /></ul>"#
        );
        assert_eq!(
            HtmlSerializer::new().serialize_inner(&tree, li),
            "milk &amp; eggs"
        );
    }

    #[test]
    fn test_pretty_print() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let span = tree.create_element("span");
        tree.append_child(div, span).unwrap();

        assert_eq!(
            HtmlSerializer::pretty().serialize_outer(&tree, div),
            "<div>\n  <span></span>\n</div>"
        );
    }
}
