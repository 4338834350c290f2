//! DOM Tree (arena-based allocation)
//!
//! Nodes are never moved in memory and ids are never reused: a removed
//! subtree stays addressable until it is explicitly [`discard`](DomTree::discard)ed.

use std::collections::{BTreeSet, HashMap};

use crate::properties::{self, PropValue, Property};
use crate::{
    DomError, DomResult, ElementData, MutationLog, MutationRecord, NamedNodeMap, Node, NodeData,
    NodeId,
};

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    /// Delegated listener registrations, by node
    listeners: HashMap<NodeId, BTreeSet<String>>,
    /// Currently focused element
    active_element: Option<NodeId>,
    mutations: MutationLog,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            listeners: HashMap::new(),
            active_element: None,
            mutations: MutationLog::new(),
        }
    }

    /// Document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).filter(|n| !n.is_vacant())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).filter(|n| !n.is_vacant())
    }

    /// Number of allocated slots, released ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NotFound(id))
    }

    fn element(&self, id: NodeId) -> DomResult<&ElementData> {
        self.node(id)?.as_element().ok_or(DomError::InvalidNodeType(id))
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        self.node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType(id))
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.mutations.push(MutationRecord::Created { node: id });
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.alloc(Node::text(content))
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent).get(index).copied()
    }

    pub fn child_count(&self, parent: NodeId) -> usize {
        self.children(parent).len()
    }

    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Inclusive ancestor check
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or at the end), moving it if attached
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        self.check_insert(parent, child)?;

        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotAChild { parent, child: reference });
            }
            if reference == child {
                return Ok(());
            }
        }

        self.detach(child);

        let siblings = &mut self.node_mut(parent)?.children;
        let index = reference
            .and_then(|r| siblings.iter().position(|&c| c == r))
            .unwrap_or(siblings.len());
        siblings.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);

        self.mutations.push(MutationRecord::Inserted { node: child, parent });
        Ok(())
    }

    /// Detach `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }

        if self.active_element.is_some_and(|active| self.contains(child, active)) {
            self.active_element = None;
        }

        self.detach(child);
        self.mutations.push(MutationRecord::Removed { node: child, parent });
        Ok(())
    }

    /// Put `new_child` where `old_child` is, detaching `old_child`
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> DomResult<()> {
        if new_child == old_child {
            return Ok(());
        }
        self.insert_before(parent, new_child, Some(old_child))?;
        self.remove_child(parent, old_child)
    }

    /// Release a detached subtree. Its ids stay invalid forever.
    pub fn discard(&mut self, node: NodeId) -> DomResult<()> {
        let detached = self.node(node)?.parent.is_none();
        if node == NodeId::ROOT || !detached {
            return Err(DomError::InvalidState(format!(
                "cannot discard attached node {node}"
            )));
        }

        tracing::trace!("discarding subtree {}", node);
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(slot) = self.nodes.get_mut(id.index()) {
                stack.append(&mut slot.children);
                slot.data = NodeData::Vacant;
                slot.parent = None;
            }
            self.listeners.remove(&id);
            if self.active_element == Some(id) {
                self.active_element = None;
            }
        }
        Ok(())
    }

    /// Link a freshly created node under `parent` without validation
    pub(crate) fn attach_fresh(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(child.index()) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent.index()) {
            node.children.push(child);
        }
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;

        let parent_ok = matches!(parent_node.data, NodeData::Element(_) | NodeData::Document);
        let child_ok = !matches!(child_node.data, NodeData::Document);
        if !parent_ok || !child_ok || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    fn detach(&mut self, child: NodeId) {
        let Some(old_parent) = self.parent(child) else {
            return;
        };
        if let Some(parent) = self.get_mut(old_parent) {
            parent.children.retain(|&c| c != child);
        }
        if let Some(node) = self.get_mut(child) {
            node.parent = None;
        }
    }

    // ------------------------------------------------------------------
    // Node data
    // ------------------------------------------------------------------

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| e.tag.as_str())
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_text)
    }

    /// Character data of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_text()
    }

    pub fn set_text(&mut self, id: NodeId, content: &str) -> DomResult<()> {
        let NodeData::Text(text) = &mut self.node_mut(id)?.data else {
            return Err(DomError::InvalidNodeType(id));
        };
        if text.content == content {
            return Ok(());
        }
        let old_value = std::mem::replace(&mut text.content, content.to_string());
        self.mutations.push(MutationRecord::TextChanged {
            node: id,
            old_value,
            new_value: content.to_string(),
        });
        Ok(())
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(text) = self.text(id) {
            out.push_str(text);
            return;
        }
        for &child in self.children(id) {
            self.collect_text(child, out);
        }
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn attributes(&self, id: NodeId) -> Option<&NamedNodeMap> {
        self.get(id)?.as_element().map(|e| &e.attrs)
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.as_element()?.get_attr(name)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let attrs = &mut self.element_mut(id)?.attrs;
        if attrs.get_attribute(name) == Some(value) {
            return Ok(());
        }
        let old_value = attrs.set_attribute(name, value);
        self.mutations.push(MutationRecord::AttributeChanged {
            node: id,
            name: name.to_string(),
            old_value,
            new_value: Some(value.to_string()),
        });
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<()> {
        if let Some(old_value) = self.element_mut(id)?.attrs.remove_attribute(name) {
            self.mutations.push(MutationRecord::AttributeChanged {
                node: id,
                name: name.to_string(),
                old_value: Some(old_value),
                new_value: None,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Live properties
    // ------------------------------------------------------------------

    /// Property reflection lookup for this element's type
    pub fn property_kind(&self, id: NodeId, name: &str) -> Option<Property> {
        properties::lookup(self.tag_name(id)?, name)
    }

    pub fn has_property(&self, id: NodeId, name: &str) -> bool {
        self.property_kind(id, name).is_some()
    }

    /// Write a live property
    pub fn set_property(&mut self, id: NodeId, name: &str, value: &PropValue) -> DomResult<()> {
        match self.lookup_property(id, name)? {
            Property::Value => self.set_value(id, &value.as_string()),
            Property::Checked => self.set_checked(id, value.as_bool()),
            Property::Selected => self.set_selected(id, value.as_bool()),
            Property::Reflect(attr) => self.set_attribute(id, attr, &value.as_string()),
            Property::ReflectBool(attr) if value.as_bool() => self.set_attribute(id, attr, ""),
            Property::ReflectBool(attr) => self.remove_attribute(id, attr),
        }
    }

    /// Restore a live property to its default
    pub fn reset_property(&mut self, id: NodeId, name: &str) -> DomResult<()> {
        match self.lookup_property(id, name)? {
            Property::Value => self.set_value(id, ""),
            Property::Checked => self.set_checked(id, false),
            Property::Selected => self.set_selected(id, false),
            Property::Reflect(attr) | Property::ReflectBool(attr) => self.remove_attribute(id, attr),
        }
    }

    /// Read a live property
    pub fn property(&self, id: NodeId, name: &str) -> Option<PropValue> {
        let element = self.get(id)?.as_element()?;
        match properties::lookup(&element.tag, name)? {
            Property::Value => Some(PropValue::Str(element.value.clone())),
            Property::Checked => Some(PropValue::Bool(element.checked)),
            Property::Selected => Some(PropValue::Bool(element.selected)),
            Property::Reflect(attr) => Some(PropValue::Str(
                element.get_attr(attr).unwrap_or_default().to_string(),
            )),
            Property::ReflectBool(attr) => Some(PropValue::Bool(element.attrs.has_attribute(attr))),
        }
    }

    fn lookup_property(&self, id: NodeId, name: &str) -> DomResult<Property> {
        let tag = &self.element(id)?.tag;
        properties::lookup(tag, name)
            .ok_or_else(|| DomError::InvalidState(format!("<{tag}> has no property `{name}`")))
    }

    /// Live `value`
    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| e.value.as_str())
    }

    /// Set the live `value`; a changed value moves the caret to the end
    pub fn set_value(&mut self, id: NodeId, value: &str) -> DomResult<()> {
        let element = self.element_mut(id)?;
        if element.value == value {
            return Ok(());
        }
        element.value = value.to_string();
        if element.is_text_control() {
            element.selection.collapse(value.chars().count());
        }
        self.mutations.push(MutationRecord::PropertyChanged {
            node: id,
            name: "value".to_string(),
        });
        Ok(())
    }

    /// Simulate the user typing: the value is replaced and the caret lands at the end
    pub fn input_text(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        self.set_value(id, text)?;
        self.element_mut(id)?.selection.collapse(text.chars().count());
        Ok(())
    }

    pub fn checked(&self, id: NodeId) -> bool {
        self.get(id)
            .and_then(Node::as_element)
            .is_some_and(|e| e.checked)
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> DomResult<()> {
        let element = self.element_mut(id)?;
        if element.checked == checked {
            return Ok(());
        }
        element.checked = checked;
        self.mutations.push(MutationRecord::PropertyChanged {
            node: id,
            name: "checked".to_string(),
        });
        Ok(())
    }

    pub fn selected(&self, id: NodeId) -> bool {
        self.get(id)
            .and_then(Node::as_element)
            .is_some_and(|e| e.selected)
    }

    pub fn set_selected(&mut self, id: NodeId, selected: bool) -> DomResult<()> {
        let element = self.element_mut(id)?;
        if element.selected == selected {
            return Ok(());
        }
        element.selected = selected;
        self.mutations.push(MutationRecord::PropertyChanged {
            node: id,
            name: "selected".to_string(),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Focus and selection
    // ------------------------------------------------------------------

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    /// Focus an element attached to the document; detached elements are ignored
    pub fn focus(&mut self, id: NodeId) -> DomResult<()> {
        self.element(id)?;
        if self.contains(NodeId::ROOT, id) {
            self.active_element = Some(id);
        }
        Ok(())
    }

    pub fn blur(&mut self) {
        self.active_element = None;
    }

    /// `<input>` or `<textarea>`
    pub fn is_text_control(&self, id: NodeId) -> bool {
        self.get(id)
            .and_then(Node::as_element)
            .is_some_and(ElementData::is_text_control)
    }

    /// Current selection, if the element supports one
    pub fn selection_range(&self, id: NodeId) -> Option<(usize, usize)> {
        let element = self.get(id)?.as_element()?;
        element
            .supports_selection()
            .then(|| element.selection.range())
    }

    pub fn set_selection_range(&mut self, id: NodeId, start: usize, end: usize) -> DomResult<()> {
        let element = self.element_mut(id)?;
        if !element.supports_selection() {
            return Err(DomError::InvalidState(format!(
                "<{}> does not support selection",
                element.tag
            )));
        }
        let length = element.value.chars().count();
        element.selection.set_range(start, end, length);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Register a listener for `event_type` on `id`; false if already present
    pub fn add_event_listener(&mut self, id: NodeId, event_type: &str) -> bool {
        self.listeners
            .entry(id)
            .or_default()
            .insert(event_type.to_string())
    }

    pub fn has_event_listener(&self, id: NodeId, event_type: &str) -> bool {
        self.listeners
            .get(&id)
            .is_some_and(|types| types.contains(event_type))
    }

    pub fn listener_count(&self, id: NodeId) -> usize {
        self.listeners.get(&id).map_or(0, BTreeSet::len)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// First element in `scope` (inclusive, document order) with `name="value"`
    pub fn find_by_attribute(&self, scope: NodeId, name: &str, value: &str) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&id| self.get_attribute(id, name) == Some(value))
    }

    /// Elements with `tag` in `scope` (inclusive, document order)
    pub fn elements_by_tag_name(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&id| self.tag_name(id).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }

    /// `scope` and everything under it, preorder
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![scope];
        while let Some(id) = stack.pop() {
            if self.get(id).is_none() {
                continue;
            }
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    // ------------------------------------------------------------------
    // Mutation log
    // ------------------------------------------------------------------

    pub fn record_mutations(&mut self, enabled: bool) {
        self.mutations.set_enabled(enabled);
    }

    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        self.mutations.take()
    }
}
