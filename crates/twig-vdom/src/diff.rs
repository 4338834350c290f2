//! Reconciliation
//!
//! Walks an old/new pair of virtual trees against the live children of a
//! container and applies the edits. Live nodes are found by position, so
//! the retained tree and the surface may drift apart (something else edited
//! the surface); a live node that does not match the old virtual node is
//! replaced rather than patched, and a missing one is inserted.

use std::collections::{HashMap, HashSet, VecDeque};

use twig_dom::{DomResult, DomTree, NodeId};

use crate::attrs::patch_attrs;
use crate::events::EventRegistry;
use crate::materialize::materialize;
use crate::node::{Key, VNode};

/// Applies virtual tree changes to a live tree
pub struct Reconciler<'a> {
    tree: &'a mut DomTree,
    events: &'a mut EventRegistry,
}

impl<'a> Reconciler<'a> {
    pub fn new(tree: &'a mut DomTree, events: &'a mut EventRegistry) -> Self {
        Self { tree, events }
    }

    /// Build a detached live subtree for `vnode`
    pub fn materialize(&mut self, vnode: &VNode) -> DomResult<NodeId> {
        materialize(self.tree, self.events, vnode)
    }

    /// Render `new` as the single child of `container`
    ///
    /// Without a previous tree the container is emptied and `new` is mounted
    /// from scratch; otherwise the two trees are reconciled.
    pub fn render(&mut self, container: NodeId, old: Option<&VNode>, new: &VNode) -> DomResult<()> {
        match old {
            Some(old) => self.patch(container, Some(old), Some(new), 0),
            None => {
                tracing::debug!("mounting fresh tree into {}", container);
                for child in self.tree.children(container).to_vec() {
                    self.remove(container, child)?;
                }
                let node = self.materialize(new)?;
                self.tree.append_child(container, node)
            }
        }
    }

    /// Reconcile one position of `parent`
    pub fn patch(
        &mut self,
        parent: NodeId,
        old: Option<&VNode>,
        new: Option<&VNode>,
        index: usize,
    ) -> DomResult<()> {
        let live = self.tree.child_at(parent, index);

        let (old, new) = match (old, new) {
            (None, None) => return Ok(()),
            (None, Some(new)) => return self.insert(parent, new, live),
            (Some(_), None) => {
                return match live {
                    Some(live) => self.remove(parent, live),
                    None => Ok(()),
                };
            }
            (Some(old), Some(new)) => (old, new),
        };

        let Some(live) = live else {
            return self.insert(parent, new, None);
        };
        if !old.same_shape(new) || !self.live_matches(live, new) {
            return self.replace(parent, new, live);
        }

        match (old, new) {
            (VNode::Text(_), VNode::Text(content)) => self.tree.set_text(live, content),
            (VNode::Element(old_el), VNode::Element(new_el)) => {
                patch_attrs(self.tree, self.events, live, &old_el.attrs, &new_el.attrs)?;
                self.patch_children(live, &old_el.children, &new_el.children)
            }
            _ => self.replace(parent, new, live),
        }
    }

    fn patch_children(&mut self, parent: NodeId, old: &[VNode], new: &[VNode]) -> DomResult<()> {
        let keyed = old.iter().chain(new).any(|child| child.key().is_some());
        if keyed {
            self.patch_keyed(parent, old, new)
        } else {
            self.patch_unkeyed(parent, old, new)
        }
    }

    /// Index-aligned children: shared prefix, then appends, then trailing removals
    fn patch_unkeyed(&mut self, parent: NodeId, old: &[VNode], new: &[VNode]) -> DomResult<()> {
        let common = old.len().min(new.len());
        for i in 0..common {
            self.patch(parent, Some(&old[i]), Some(&new[i]), i)?;
        }
        for (i, child) in new.iter().enumerate().skip(common) {
            self.patch(parent, None, Some(child), i)?;
        }
        for i in (common..old.len()).rev() {
            self.patch(parent, Some(&old[i]), None, i)?;
        }
        Ok(())
    }

    fn patch_keyed(&mut self, parent: NodeId, old: &[VNode], new: &[VNode]) -> DomResult<()> {
        let olds: Vec<(NodeId, &VNode)> = old
            .iter()
            .enumerate()
            .filter_map(|(i, vnode)| self.tree.child_at(parent, i).map(|live| (live, vnode)))
            .collect();

        let mut by_key: HashMap<&Key, (NodeId, &VNode)> = HashMap::new();
        let mut unkeyed: VecDeque<(NodeId, &VNode)> = VecDeque::new();
        for &(live, vnode) in &olds {
            match vnode.key() {
                Some(key) if !by_key.contains_key(key) => {
                    by_key.insert(key, (live, vnode));
                }
                Some(key) => {
                    tracing::warn!("duplicate key '{}' under {}, matched positionally", key, parent);
                    unkeyed.push_back((live, vnode));
                }
                None => unkeyed.push_back((live, vnode)),
            }
        }

        let mut consumed: HashSet<NodeId> = HashSet::new();
        let mut seen: HashSet<&Key> = HashSet::new();
        for (i, vnode) in new.iter().enumerate() {
            let matched = match vnode.key() {
                Some(key) if seen.insert(key) => by_key.remove(key),
                _ => unkeyed.pop_front(),
            };

            let Some((live, old_vnode)) = matched else {
                let node = self.materialize(vnode)?;
                let reference = self.tree.child_at(parent, i);
                self.tree.insert_before(parent, node, reference)?;
                continue;
            };

            consumed.insert(live);
            let current = self.tree.child_at(parent, i);
            if current != Some(live) {
                self.tree.insert_before(parent, live, current)?;
                tracing::trace!("moved {} to position {} of {}", live, i, parent);
            }
            self.patch(parent, Some(old_vnode), Some(vnode), i)?;
        }

        for (live, _) in olds {
            if !consumed.contains(&live) {
                self.remove(parent, live)?;
            }
        }
        Ok(())
    }

    /// Whether the live node can be patched as `new`
    fn live_matches(&self, live: NodeId, new: &VNode) -> bool {
        match new {
            VNode::Text(_) => self.tree.is_text(live),
            VNode::Element(el) => self
                .tree
                .tag_name(live)
                .is_some_and(|tag| tag.eq_ignore_ascii_case(&el.tag)),
        }
    }

    fn insert(&mut self, parent: NodeId, new: &VNode, before: Option<NodeId>) -> DomResult<()> {
        let node = self.materialize(new)?;
        self.tree.insert_before(parent, node, before)
    }

    fn replace(&mut self, parent: NodeId, new: &VNode, live: NodeId) -> DomResult<()> {
        let node = self.materialize(new)?;
        self.tree.replace_child(parent, node, live)?;
        self.tree.discard(live)
    }

    fn remove(&mut self, parent: NodeId, live: NodeId) -> DomResult<()> {
        self.tree.remove_child(parent, live)?;
        self.tree.discard(live)
    }
}
