//! Element materialization

use twig_dom::{DomResult, DomTree, NodeId};

use crate::attrs::apply_attr;
use crate::events::EventRegistry;
use crate::node::VNode;

/// Build a detached live subtree for `vnode`
pub fn materialize(tree: &mut DomTree, events: &mut EventRegistry, vnode: &VNode) -> DomResult<NodeId> {
    match vnode {
        VNode::Text(content) => Ok(tree.create_text(content)),
        VNode::Element(el) => {
            let node = tree.create_element(&el.tag);
            for (name, value) in el.attrs.iter() {
                apply_attr(tree, events, node, name, None, Some(value))?;
            }
            for child in &el.children {
                let child = materialize(tree, events, child)?;
                tree.append_child(node, child)?;
            }
            Ok(node)
        }
    }
}
