//! Virtual nodes
//!
//! Children are normalized when a node is built: nested lists are flattened,
//! scalars become text nodes and omitted children (`None`, `false`, `()`)
//! are dropped, so the reconciler only ever sees elements and text.

use std::fmt;

use crate::attrs::Attrs;

/// Sibling identity for keyed reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Self(s.clone())
    }
}

macro_rules! key_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Key {
            fn from(n: $ty) -> Self {
                Self(n.to_string())
            }
        })*
    };
}

key_from_int!(i32, i64, u32, u64, usize);

/// Virtual node
#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    Element(VElement),
    Text(String),
}

/// Virtual element
#[derive(Debug, Clone, PartialEq)]
pub struct VElement {
    pub tag: String,
    pub attrs: Attrs,
    pub children: Vec<VNode>,
    pub key: Option<Key>,
}

impl VNode {
    pub fn key(&self) -> Option<&Key> {
        match self {
            Self::Element(el) => el.key.as_ref(),
            Self::Text(_) => None,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Element(el) => Some(&el.tag),
            Self::Text(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&VElement> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Element(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Same node kind and tag, the precondition for patching in place
    pub fn same_shape(&self, other: &VNode) -> bool {
        match (self, other) {
            (Self::Text(_), Self::Text(_)) => true,
            (Self::Element(a), Self::Element(b)) => a.tag.eq_ignore_ascii_case(&b.tag),
            _ => false,
        }
    }
}

/// Anything accepted in a child position
#[derive(Debug, Clone)]
pub enum Child {
    Node(VNode),
    List(Vec<Child>),
    Empty,
}

impl Child {
    fn flatten_into(self, out: &mut Vec<VNode>) {
        match self {
            Self::Node(node) => out.push(node),
            Self::List(children) => {
                for child in children {
                    child.flatten_into(out);
                }
            }
            Self::Empty => {}
        }
    }

    /// Flatten into a list of nodes
    pub fn into_nodes(self) -> Vec<VNode> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }
}

impl From<VNode> for Child {
    fn from(node: VNode) -> Self {
        Self::Node(node)
    }
}

impl From<&str> for Child {
    fn from(s: &str) -> Self {
        Self::Node(VNode::Text(s.to_string()))
    }
}

impl From<String> for Child {
    fn from(s: String) -> Self {
        Self::Node(VNode::Text(s))
    }
}

impl From<&String> for Child {
    fn from(s: &String) -> Self {
        Self::Node(VNode::Text(s.clone()))
    }
}

macro_rules! child_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Child {
            fn from(n: $ty) -> Self {
                Self::Node(VNode::Text(n.to_string()))
            }
        })*
    };
}

child_from_int!(i32, i64, u32, u64, usize);

impl From<f64> for Child {
    fn from(n: f64) -> Self {
        Self::Node(VNode::Text(format_number(n)))
    }
}

/// `true` and `false` both render nothing
impl From<bool> for Child {
    fn from(_: bool) -> Self {
        Self::Empty
    }
}

impl From<()> for Child {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(child: Option<T>) -> Self {
        child.map_or(Self::Empty, Into::into)
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(children: Vec<T>) -> Self {
        Self::List(children.into_iter().map(Into::into).collect())
    }
}

/// Number formatting as a script runtime prints it: `3` not `3.0`
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Build an element node
///
/// ```
/// use twig_vdom::{Attrs, h, children};
///
/// let node = h("ul", Attrs::new().attr("class", "todo-list"), children![
///     h("li", Attrs::new().key(1), "first"),
///     None::<twig_vdom::VNode>,
///     h("li", Attrs::new().key(2), "second"),
/// ]);
/// assert_eq!(node.as_element().map(|el| el.children.len()), Some(2));
/// ```
pub fn h(tag: &str, mut attrs: Attrs, children: impl Into<Child>) -> VNode {
    let key = attrs.take_key();
    VNode::Element(VElement {
        tag: tag.to_string(),
        attrs,
        children: children.into().into_nodes(),
        key,
    })
}

/// Build a text node
pub fn text(content: impl Into<String>) -> VNode {
    VNode::Text(content.into())
}

/// Heterogeneous child list for [`h`]
#[macro_export]
macro_rules! children {
    ($($child:expr),* $(,)?) => {
        $crate::Child::List(vec![$($crate::Child::from($child)),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::children;

    #[test]
    fn test_children_flattened_and_filtered() {
        let node = h(
            "p",
            Attrs::new(),
            children![
                "a",
                vec![text("b"), text("c")],
                false,
                true,
                None::<VNode>,
                (),
                Some(7),
                2.5,
                3.0,
            ],
        );

        let el = node.as_element().unwrap();
        let texts: Vec<_> = el.children.iter().filter_map(VNode::as_text).collect();
        assert_eq!(texts, ["a", "b", "c", "7", "2.5", "3"]);
    }

    #[test]
    fn test_key_moves_out_of_attrs() {
        let node = h("li", Attrs::new().attr("key", "k1").attr("class", "x"), ());
        let el = node.as_element().unwrap();

        assert_eq!(el.key, Some(Key::from("k1")));
        assert!(el.attrs.get("key").is_none());
        assert!(el.attrs.get("class").is_some());
    }

    #[test]
    fn test_same_shape() {
        let a = h("DIV", Attrs::new(), ());
        let b = h("div", Attrs::new(), ());
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&text("div")));
        assert!(text("x").same_shape(&text("y")));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(-0.5), "-0.5");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
    }
}
