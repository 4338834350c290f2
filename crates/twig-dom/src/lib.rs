//! twig DOM - Live document surface
//!
//! Arena-allocated document tree that the reconciler mutates: elements,
//! text leaves, attributes, live form properties, focus, input selection
//! and delegated-listener bookkeeping.

mod attributes;
mod document;
mod error;
mod events;
mod mutation;
mod node;
pub mod properties;
mod selection;
mod serializer;
mod tree;

pub use attributes::{Attr, NamedNodeMap};
pub use document::Document;
pub use error::{DomError, DomResult};
pub use events::{DomEvent, event_types};
pub use mutation::{MutationLog, MutationRecord};
pub use node::{ElementData, Node, NodeData, TextData};
pub use properties::{PropValue, Property};
pub use selection::{InputSelection, SelectionDirection};
pub use serializer::HtmlSerializer;
pub use tree::DomTree;

/// Node identifier (index into the arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Document node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Arena index of this node
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
