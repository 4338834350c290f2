//! Mount point rendering
//!
//! A [`Mount`] owns everything tied to one mount root: the delegation
//! registry, the retained virtual tree and the focus-key counter.

use serde::{Deserialize, Serialize};
use twig_dom::{DomResult, DomTree, NodeId};
use twig_vdom::{EventRegistry, Reconciler, VNode};

/// Render options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Keep a focused text input focused (with its selection) across passes
    pub preserve_focus: bool,
    /// Attribute stamped on focused inputs to find them again after a pass
    pub focus_key_attribute: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            preserve_focus: true,
            focus_key_attribute: "data-focuskey".to_string(),
        }
    }
}

/// Focused input captured before a pass
#[derive(Debug)]
struct FocusSnapshot {
    key: String,
    selection: Option<(usize, usize)>,
}

/// One mount point
#[derive(Debug)]
pub struct Mount {
    root: NodeId,
    registry: EventRegistry,
    retained: Option<VNode>,
    focus_seq: u64,
    options: RenderOptions,
}

impl Mount {
    /// Create a mount with its delegation root at `root`
    pub fn new(tree: &mut DomTree, root: NodeId, options: RenderOptions) -> Self {
        let mut registry = EventRegistry::new();
        registry.set_root(tree, root);
        Self {
            root,
            registry,
            retained: None,
            focus_seq: 0,
            options,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    /// Last successfully committed tree
    pub fn retained(&self) -> Option<&VNode> {
        self.retained.as_ref()
    }

    /// Reconcile `vnode` into the root, keeping focus on the active input
    ///
    /// On failure the retained tree is dropped so the next pass remounts.
    pub fn render(&mut self, tree: &mut DomTree, vnode: VNode) -> DomResult<()> {
        let focus = if self.options.preserve_focus {
            self.capture_focus(tree)?
        } else {
            None
        };

        let result = Reconciler::new(tree, &mut self.registry).render(
            self.root,
            self.retained.as_ref(),
            &vnode,
        );
        if let Err(err) = result {
            self.retained = None;
            return Err(err);
        }
        self.retained = Some(vnode);

        if let Some(focus) = focus {
            self.restore_focus(tree, &focus);
        }
        Ok(())
    }

    fn capture_focus(&mut self, tree: &mut DomTree) -> DomResult<Option<FocusSnapshot>> {
        let Some(active) = tree.active_element() else {
            return Ok(None);
        };
        if !tree.is_text_control(active) || !tree.contains(self.root, active) {
            return Ok(None);
        }

        let attribute = &self.options.focus_key_attribute;
        let key = match tree.get_attribute(active, attribute) {
            Some(key) => key.to_string(),
            None => {
                self.focus_seq += 1;
                let key = format!("focus-{}", self.focus_seq);
                tree.set_attribute(active, attribute, &key)?;
                key
            }
        };

        Ok(Some(FocusSnapshot {
            key,
            selection: tree.selection_range(active),
        }))
    }

    fn restore_focus(&self, tree: &mut DomTree, focus: &FocusSnapshot) {
        let attribute = &self.options.focus_key_attribute;
        let Some(node) = tree.find_by_attribute(self.root, attribute, &focus.key) else {
            tracing::debug!("focused input {} did not survive the pass", focus.key);
            return;
        };

        if let Err(err) = tree.focus(node) {
            tracing::debug!("could not refocus {}: {}", node, err);
            return;
        }
        if let Some((start, end)) = focus.selection {
            // Inputs without text selection reject this; focus alone is enough
            let _ = tree.set_selection_range(node, start, end);
        }
    }
}
