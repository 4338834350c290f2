//! Attribute values, classification and patching
//!
//! Each attribute key is classified once per write into an [`AttrKind`] that
//! decides where the value lands on the live element: a delegated event
//! binding, a live property, a presence-only flag or a plain attribute.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use twig_dom::properties::{self, PropValue, Property};
use twig_dom::{DomError, DomResult, DomTree, NodeId};

use crate::events::{Event, EventRegistry, binding_attribute};
use crate::node::Key;

/// Names that stay plain attributes even where a property exists
const EXCLUDED_PROPERTIES: &[&str] = &["list", "type", "draggable", "key"];

type HandlerFn = dyn Fn(&Event) -> anyhow::Result<()>;

/// Interaction handler. Identity is the identity of the shared closure.
#[derive(Clone)]
pub struct Handler(Rc<HandlerFn>);

impl Handler {
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(move |event: &Event| -> anyhow::Result<()> {
            f(event);
            Ok(())
        }))
    }

    pub fn fallible(f: impl Fn(&Event) -> anyhow::Result<()> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &Event) -> anyhow::Result<()> {
        (self.0)(event)
    }

    /// Address of the shared closure
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }

    pub fn ptr_eq(&self, other: &Handler) -> bool {
        self.identity() == other.identity()
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:#x})", self.identity())
    }
}

/// Attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Bool(bool),
    Handler(Handler),
}

impl AttrValue {
    /// `Bool(b)` is `b`, text is true unless empty or `"false"`, handlers are true
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty() && s != "false",
            Self::Bool(b) => *b,
            Self::Handler(_) => true,
        }
    }

    /// Live `checked` state: `true`, `"true"` and the bare attribute `""`
    pub fn is_checked(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(s) => s.is_empty() || s == "true",
            Self::Handler(_) => false,
        }
    }

    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            Self::Handler(h) => Some(h),
            _ => None,
        }
    }

    /// String form written into attributes and `value`
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::Handler(_) => String::new(),
        }
    }

    fn to_prop(&self) -> PropValue {
        match self {
            Self::Bool(b) => PropValue::Bool(*b),
            other => PropValue::Str(other.to_text()),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for AttrValue {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Handler> for AttrValue {
    fn from(h: Handler) -> Self {
        Self::Handler(h)
    }
}

macro_rules! attr_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for AttrValue {
            fn from(n: $ty) -> Self {
                Self::Text(n.to_string())
            }
        })*
    };
}

attr_from_int!(i32, i64, u32, u64, usize);

/// Attribute mapping of a virtual element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs {
    entries: BTreeMap<String, AttrValue>,
    key: Option<Key>,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute. `key` sets the sibling identity instead.
    ///
    /// Handlers under `on*` names are stored as `on<event>` in lowercase,
    /// the same as [`Attrs::handler`].
    pub fn attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        let value = value.into();
        if name == "key" {
            self.key = Some(Key::from(value.to_text()));
            return self;
        }
        let name = match (&value, event_name(name)) {
            (AttrValue::Handler(_), Some(event)) => format!("on{event}"),
            _ => name.to_string(),
        };
        self.entries.insert(name, value);
        self
    }

    /// Presence-only attribute
    pub fn flag(self, name: &str, on: bool) -> Self {
        self.attr(name, on)
    }

    /// Attach a handler for `event` (`on<event>`)
    pub fn on(self, event: &str, f: impl Fn(&Event) + 'static) -> Self {
        self.handler(event, Handler::new(f))
    }

    /// Attach a handler whose errors are reported by the dispatcher
    pub fn on_try(self, event: &str, f: impl Fn(&Event) -> anyhow::Result<()> + 'static) -> Self {
        self.handler(event, Handler::fallible(f))
    }

    /// Attach an existing handler, keeping its identity
    pub fn handler(mut self, event: &str, handler: Handler) -> Self {
        self.entries.insert(
            format!("on{}", event.to_ascii_lowercase()),
            AttrValue::Handler(handler),
        );
        self
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub(crate) fn take_key(&mut self) -> Option<Key> {
        self.key.take()
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Where an attribute write lands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrKind {
    /// Delegated binding for the named (lowercase) event
    Event(String),
    /// Live `value`, resynchronized on every patch
    Value,
    /// Live `checked`, resynchronized on every patch
    Checked,
    /// Boolean marker: empty attribute when true, absent when false
    Flag,
    /// Live property written only on change
    Property(Property),
    /// Plain content attribute
    Attribute,
    /// Sibling identity, never written to the element
    Key,
}

/// Classify one attribute key given its old and new values
pub fn classify(tag: &str, name: &str, old: Option<&AttrValue>, new: Option<&AttrValue>) -> AttrKind {
    let is_handler = |v: Option<&AttrValue>| matches!(v, Some(AttrValue::Handler(_)));
    let is_bool = |v: Option<&AttrValue>| matches!(v, Some(AttrValue::Bool(_)));

    if name == "key" {
        return AttrKind::Key;
    }
    if let Some(event) = event_name(name) {
        if is_handler(old) || is_handler(new) {
            return AttrKind::Event(event);
        }
    }
    match name {
        "value" => return AttrKind::Value,
        "checked" => return AttrKind::Checked,
        _ => {}
    }
    if is_bool(new) || (new.is_none() && is_bool(old)) {
        return AttrKind::Flag;
    }
    if !EXCLUDED_PROPERTIES.contains(&name) {
        if let Some(property) = properties::lookup(tag, name) {
            return AttrKind::Property(property);
        }
    }
    AttrKind::Attribute
}

fn event_name(name: &str) -> Option<String> {
    let prefix = name.get(..2)?;
    let event = name.get(2..)?;
    (prefix.eq_ignore_ascii_case("on") && !event.is_empty()).then(|| event.to_ascii_lowercase())
}

/// Move one attribute of `node` from `old` to `new`
pub fn apply_attr(
    tree: &mut DomTree,
    events: &mut EventRegistry,
    node: NodeId,
    name: &str,
    old: Option<&AttrValue>,
    new: Option<&AttrValue>,
) -> DomResult<()> {
    let tag = tree.tag_name(node).ok_or(DomError::InvalidNodeType(node))?;

    match classify(tag, name, old, new) {
        AttrKind::Key => Ok(()),
        AttrKind::Event(event) => {
            let binding = binding_attribute(&event);
            match new {
                Some(AttrValue::Handler(handler)) => {
                    if old.is_some_and(|v| v.as_handler().is_none()) {
                        tree.remove_attribute(node, name)?;
                    }
                    let id = events.register(tree, &event, handler);
                    tree.set_attribute(node, &binding, id.as_str())
                }
                Some(plain) => {
                    tree.remove_attribute(node, &binding)?;
                    apply_plain(tree, node, name, None, Some(plain))
                }
                None => tree.remove_attribute(node, &binding),
            }
        }
        AttrKind::Value => {
            let value = new.map(AttrValue::to_text).unwrap_or_default();
            tree.set_value(node, &value)
        }
        AttrKind::Checked => tree.set_checked(node, new.is_some_and(AttrValue::is_checked)),
        AttrKind::Flag => {
            if new.is_some_and(AttrValue::is_truthy) {
                tree.set_attribute(node, name, "")
            } else {
                tree.remove_attribute(node, name)
            }
        }
        AttrKind::Property(_) => match new {
            Some(value) if old != Some(value) => tree.set_property(node, name, &value.to_prop()),
            Some(_) => Ok(()),
            None => tree.reset_property(node, name),
        },
        AttrKind::Attribute => apply_plain(tree, node, name, old, new),
    }
}

fn apply_plain(
    tree: &mut DomTree,
    node: NodeId,
    name: &str,
    old: Option<&AttrValue>,
    new: Option<&AttrValue>,
) -> DomResult<()> {
    if old == new {
        return Ok(());
    }
    match new {
        Some(value) if value.is_truthy() || old.is_none() => {
            tree.set_attribute(node, name, &value.to_text())
        }
        _ => tree.remove_attribute(node, name),
    }
}

/// Bring `node` from reflecting `old` to reflecting `new`
pub fn patch_attrs(
    tree: &mut DomTree,
    events: &mut EventRegistry,
    node: NodeId,
    old: &Attrs,
    new: &Attrs,
) -> DomResult<()> {
    let names: BTreeSet<&str> = old.names().chain(new.names()).collect();
    for name in names {
        apply_attr(tree, events, node, name, old.get(name), new.get(name))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(tag: &str) -> (DomTree, EventRegistry, NodeId) {
        let mut tree = DomTree::new();
        let node = tree.create_element(tag);
        (tree, EventRegistry::new(), node)
    }

    #[test]
    fn test_classify() {
        let handler = AttrValue::Handler(Handler::new(|_| {}));
        let text = AttrValue::from("x");

        assert_eq!(classify("button", "onClick", None, Some(&handler)), AttrKind::Event("click".into()));
        assert_eq!(classify("div", "onclick", Some(&handler), None), AttrKind::Event("click".into()));
        assert_eq!(classify("div", "onclick", None, Some(&text)), AttrKind::Attribute);
        assert_eq!(classify("input", "value", None, Some(&text)), AttrKind::Value);
        assert_eq!(classify("input", "checked", None, Some(&text)), AttrKind::Checked);
        assert_eq!(classify("div", "hidden", None, Some(&AttrValue::Bool(true))), AttrKind::Flag);
        assert_eq!(
            classify("div", "className", None, Some(&text)),
            AttrKind::Property(Property::Reflect("class"))
        );
        assert_eq!(classify("input", "type", None, Some(&text)), AttrKind::Attribute);
        assert_eq!(classify("div", "class", None, Some(&text)), AttrKind::Attribute);
    }

    #[test]
    fn test_flag_attributes() {
        let (mut tree, mut events, node) = setup("input");
        let on = AttrValue::Bool(true);
        let off = AttrValue::Bool(false);

        apply_attr(&mut tree, &mut events, node, "autofocus", None, Some(&on)).unwrap();
        assert_eq!(tree.get_attribute(node, "autofocus"), Some(""));

        apply_attr(&mut tree, &mut events, node, "autofocus", Some(&on), Some(&off)).unwrap();
        assert!(!tree.has_attribute(node, "autofocus"));
    }

    #[test]
    fn test_plain_attribute_falsy_removes() {
        let (mut tree, mut events, node) = setup("a");
        let old = Attrs::new().attr("class", "selected").attr("href", "#/");
        let new = Attrs::new().attr("class", "").attr("href", "#/");

        patch_attrs(&mut tree, &mut events, node, &Attrs::new(), &old).unwrap();
        assert_eq!(tree.get_attribute(node, "class"), Some("selected"));

        patch_attrs(&mut tree, &mut events, node, &old, &new).unwrap();
        assert!(!tree.has_attribute(node, "class"));
        assert_eq!(tree.get_attribute(node, "href"), Some("#/"));
    }

    #[test]
    fn test_value_always_resynced() {
        let (mut tree, mut events, node) = setup("input");
        let attrs = Attrs::new().attr("value", "abc");

        patch_attrs(&mut tree, &mut events, node, &Attrs::new(), &attrs).unwrap();
        tree.input_text(node, "abcd").unwrap();

        patch_attrs(&mut tree, &mut events, node, &attrs, &attrs).unwrap();
        assert_eq!(tree.value(node), Some("abc"));
    }

    #[test]
    fn test_checked_coercion() {
        let (mut tree, mut events, node) = setup("input");
        let bare = Attrs::new().attr("checked", "");
        let word = Attrs::new().attr("checked", "checked");
        let text_true = Attrs::new().attr("checked", "true");
        let off = Attrs::new().attr("checked", false);

        // An empty value is the bare attribute, so it checks
        patch_attrs(&mut tree, &mut events, node, &Attrs::new(), &bare).unwrap();
        assert!(tree.checked(node));
        patch_attrs(&mut tree, &mut events, node, &bare, &word).unwrap();
        assert!(!tree.checked(node));
        patch_attrs(&mut tree, &mut events, node, &word, &text_true).unwrap();
        assert!(tree.checked(node));
        patch_attrs(&mut tree, &mut events, node, &text_true, &off).unwrap();
        assert!(!tree.checked(node));
        patch_attrs(&mut tree, &mut events, node, &off, &Attrs::new()).unwrap();
        assert!(!tree.checked(node));
    }

    #[test]
    fn test_handler_name_case_folded() {
        let (mut tree, mut events, node) = setup("button");
        let handler = Handler::new(|_| {});
        let lower = Attrs::new().handler("click", handler.clone());
        let camel = Attrs::new().attr("onClick", handler.clone());
        assert!(camel.get("onclick").is_some());
        assert!(camel.get("onClick").is_none());

        patch_attrs(&mut tree, &mut events, node, &Attrs::new(), &lower).unwrap();
        patch_attrs(&mut tree, &mut events, node, &lower, &camel).unwrap();
        assert_eq!(tree.get_attribute(node, "data-ev-click"), Some("ev1"));

        // A plain value keeps its name as written
        let plain = Attrs::new().attr("onClick", "track()");
        assert!(plain.get("onClick").is_some());
    }

    #[test]
    fn test_handler_binding_removed() {
        let (mut tree, mut events, node) = setup("button");
        let with = Attrs::new().on("click", |_| {});

        patch_attrs(&mut tree, &mut events, node, &Attrs::new(), &with).unwrap();
        assert_eq!(tree.get_attribute(node, "data-ev-click"), Some("ev1"));

        patch_attrs(&mut tree, &mut events, node, &with, &Attrs::new()).unwrap();
        assert!(!tree.has_attribute(node, "data-ev-click"));
    }

    #[test]
    fn test_same_attrs_write_nothing() {
        let (mut tree, mut events, node) = setup("input");
        let attrs = Attrs::new()
            .attr("class", "new-todo")
            .attr("placeholder", "What needs to be done?")
            .attr("value", "x")
            .flag("autofocus", true)
            .on("input", |_| {});

        patch_attrs(&mut tree, &mut events, node, &Attrs::new(), &attrs).unwrap();
        tree.record_mutations(true);
        patch_attrs(&mut tree, &mut events, node, &attrs, &attrs).unwrap();

        assert!(tree.take_mutations().is_empty());
    }
}
