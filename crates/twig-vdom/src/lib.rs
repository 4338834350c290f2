//! twig virtual DOM
//!
//! Virtual node construction, attribute classification and patching,
//! per-mount event delegation, and the reconciler that turns a pair of
//! virtual trees into live-surface mutations on a [`twig_dom::DomTree`].

mod attrs;
mod diff;
mod events;
mod materialize;
mod node;

pub use attrs::{AttrKind, AttrValue, Attrs, Handler, apply_attr, classify, patch_attrs};
pub use diff::Reconciler;
pub use events::{BINDING_PREFIX, Dispatch, Event, EventRegistry, HandlerId, binding_attribute};
pub use materialize::materialize;
pub use node::{Child, Key, VElement, VNode, h, text};
