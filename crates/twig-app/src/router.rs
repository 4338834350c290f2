//! Hash route sync
//!
//! Mirrors the location fragment into one state field. The host calls
//! [`HashRouter::on_hash_change`] whenever the fragment changes.

use std::cell::RefCell;

use serde_json::{Map, Value};

use crate::app::SharedDocument;
use crate::store::Store;

/// Route used when the fragment is empty
pub const DEFAULT_ROUTE: &str = "#/";

/// Location fragment to state field synchronizer
#[derive(Debug)]
pub struct HashRouter {
    store: Store,
    field: String,
    current: RefCell<String>,
}

impl HashRouter {
    pub fn new(store: Store, field: &str) -> Self {
        Self {
            store,
            field: field.to_string(),
            current: RefCell::new(DEFAULT_ROUTE.to_string()),
        }
    }

    /// Seed the state from the fragment at startup
    pub fn start(&self, hash: &str) {
        self.on_hash_change(hash);
    }

    /// Write the new route into the store
    pub fn on_hash_change(&self, hash: &str) {
        let route = if hash.is_empty() || hash == "#" { DEFAULT_ROUTE } else { hash };
        tracing::debug!("route {} -> {}", self.field, route);
        *self.current.borrow_mut() = route.to_string();

        let mut partial = Map::new();
        partial.insert(self.field.clone(), Value::String(route.to_string()));
        self.store.set_state(partial);
    }

    /// Navigate the document, syncing the store if the fragment changed
    pub fn navigate(&self, document: &SharedDocument, hash: &str) -> bool {
        let hash = {
            let mut doc = document.borrow_mut();
            if !doc.set_hash(hash) {
                return false;
            }
            doc.hash().to_string()
        };
        self.on_hash_change(&hash);
        true
    }

    /// Last route written
    pub fn current(&self) -> String {
        self.current.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use serde_json::json;
    use twig_dom::Document;

    use super::*;

    #[test]
    fn test_empty_hash_is_default_route() {
        let store = Store::default();
        let router = HashRouter::new(store.clone(), "currentFilter");

        router.start("");
        assert_eq!(store.get_state().get("currentFilter"), Some(&json!("#/")));

        router.on_hash_change("#/active");
        assert_eq!(router.current(), "#/active");
        assert_eq!(store.get_state().get("currentFilter"), Some(&json!("#/active")));
    }

    #[test]
    fn test_navigate_updates_document() {
        let document = Rc::new(RefCell::new(Document::default()));
        let store = Store::default();
        let router = HashRouter::new(store.clone(), "route");

        assert!(router.navigate(&document, "#/completed"));
        assert!(!router.navigate(&document, "#/completed"));
        assert_eq!(document.borrow().hash(), "#/completed");
        assert_eq!(store.get_state().get("route"), Some(&json!("#/completed")));
    }
}
