//! Event delegation
//!
//! Handlers never sit on the elements that declare them. Each element gets a
//! `data-ev-<event>` attribute holding a handler id, and one listener per
//! event type is attached at the delegation root. Dispatch walks from the
//! event target towards the root and fires the nearest bound element only.

use std::borrow::Borrow;
use std::cell::Cell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use twig_dom::{DomEvent, DomTree, NodeId};

use crate::attrs::Handler;

/// Prefix of the per-element binding attribute
pub const BINDING_PREFIX: &str = "data-ev-";

/// Binding attribute name for `event`
pub fn binding_attribute(event: &str) -> String {
    format!("{BINDING_PREFIX}{event}")
}

/// Stable handler id (`ev1`, `ev2`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerId(String);

impl HandlerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for HandlerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Event as seen by a handler
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    /// Node the event originated at
    pub target: NodeId,
    /// Bound element receiving the event
    pub current_target: NodeId,
    /// Target's live `value` at dispatch time, for form controls
    pub value: Option<String>,
    /// Target's live `checked` at dispatch time
    pub checked: bool,
    /// Keyboard key for key events
    pub key: Option<String>,
    default_prevented: Cell<bool>,
}

impl Event {
    pub fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_ascii_lowercase(),
            target,
            current_target: target,
            value: None,
            checked: false,
            key: None,
            default_prevented: Cell::new(false),
        }
    }

    /// Target value, empty when the target has none
    pub fn target_value(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }

    pub fn key_is(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// A resolved handler invocation
#[derive(Debug)]
pub struct Dispatch {
    pub id: HandlerId,
    pub event: Event,
    handler: Handler,
}

impl Dispatch {
    /// Run the handler. A failing handler is reported, never propagated.
    pub fn invoke(&self) -> bool {
        match self.handler.call(&self.event) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(
                    "handler {} for '{}' on {} failed: {:#}",
                    self.id,
                    self.event.event_type,
                    self.event.current_target,
                    err
                );
                false
            }
        }
    }

    /// Copy a default prevented by the handler onto the platform event
    pub fn forward_default(&self, event: &mut DomEvent) {
        if self.event.is_default_prevented() {
            event.prevent_default();
        }
    }
}

/// Per-mount handler table and delegated listener set
#[derive(Debug, Default)]
pub struct EventRegistry {
    next_id: u64,
    handlers: HashMap<HandlerId, Handler>,
    /// (event name, handler identity) -> id
    ids: HashMap<(String, usize), HandlerId>,
    in_use: BTreeSet<String>,
    root: Option<NodeId>,
    attached: HashSet<(NodeId, String)>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `handler` under `event`; the same pair always yields the same id
    pub fn register(&mut self, tree: &mut DomTree, event: &str, handler: &Handler) -> HandlerId {
        let event = event.to_ascii_lowercase();
        let identity = (event.clone(), handler.identity());
        if let Some(id) = self.ids.get(&identity) {
            return id.clone();
        }

        self.next_id += 1;
        let id = HandlerId(format!("ev{}", self.next_id));
        self.handlers.insert(id.clone(), handler.clone());
        self.ids.insert(identity, id.clone());
        self.in_use.insert(event.clone());

        if let Some(root) = self.root {
            self.attach_delegated_listener(tree, root, &event);
        }
        id
    }

    /// Set the delegation root and attach listeners for every event in use
    pub fn set_root(&mut self, tree: &mut DomTree, root: NodeId) {
        tracing::debug!("delegation root set to {}", root);
        self.root = Some(root);
        let events: Vec<String> = self.in_use.iter().cloned().collect();
        for event in events {
            self.attach_delegated_listener(tree, root, &event);
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Attach one listener for `(root, event)`; false if it already exists
    pub fn attach_delegated_listener(&mut self, tree: &mut DomTree, root: NodeId, event: &str) -> bool {
        if !self.attached.insert((root, event.to_string())) {
            return false;
        }
        tree.add_event_listener(root, event);
        tracing::trace!("attached delegated '{}' listener at {}", event, root);
        true
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn events_in_use(&self) -> impl Iterator<Item = &str> {
        self.in_use.iter().map(String::as_str)
    }

    /// Find the nearest bound element between the target and the root
    pub fn resolve(&self, tree: &DomTree, event: &DomEvent) -> Option<Dispatch> {
        let root = self.root?;
        let name = event.event_type.as_str();
        if !self.attached.contains(&(root, name.to_string())) {
            return None;
        }
        if event.target == root || !tree.contains(root, event.target) {
            return None;
        }

        let binding = binding_attribute(name);
        let mut current = Some(event.target);
        while let Some(node) = current {
            if node == root {
                break;
            }
            if let Some(id) = tree.get_attribute(node, &binding) {
                let Some((id, handler)) = self.handlers.get_key_value(id) else {
                    tracing::warn!("{} carries unknown handler id {}", node, id);
                    return None;
                };
                return Some(Dispatch {
                    id: id.clone(),
                    event: self.handler_event(tree, event, node),
                    handler: handler.clone(),
                });
            }
            current = tree.parent(node);
        }
        None
    }

    /// Resolve and invoke. Returns true if a handler ran.
    ///
    /// A handler that prevents the default marks `event` as well.
    pub fn dispatch(&self, tree: &DomTree, event: &mut DomEvent) -> bool {
        match self.resolve(tree, event) {
            Some(dispatch) => {
                dispatch.invoke();
                dispatch.forward_default(event);
                true
            }
            None => false,
        }
    }

    fn handler_event(&self, tree: &DomTree, event: &DomEvent, current_target: NodeId) -> Event {
        let target = event.target;
        let has_value = tree.is_text_control(target)
            || matches!(tree.tag_name(target), Some("select" | "option" | "button"));

        Event {
            event_type: event.event_type.clone(),
            target,
            current_target,
            value: has_value.then(|| tree.value(target).unwrap_or_default().to_string()),
            checked: tree.checked(target),
            key: event.key.clone(),
            default_prevented: Cell::new(false),
        }
    }
}
