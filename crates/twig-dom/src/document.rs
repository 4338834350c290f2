//! Document - High-level document API

use crate::{DomTree, NodeId};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL, without fragment
    url: String,
    /// Location fragment, `#` included (empty when absent)
    hash: String,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
}

impl Document {
    /// Create a document with the `html`/`head`/`body` skeleton
    ///
    /// A fragment in `url` becomes the initial location hash.
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        tree.attach_fresh(tree.root(), html);
        tree.attach_fresh(html, head);
        tree.attach_fresh(html, body);

        let (url, hash) = match url.find('#') {
            Some(pos) => (&url[..pos], &url[pos..]),
            None => (url, ""),
        };

        Self {
            tree,
            url: url.to_string(),
            hash: hash.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
        }
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Location fragment including the leading `#`, or empty
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Navigate to a new fragment. Returns true if the hash changed.
    pub fn set_hash(&mut self, hash: &str) -> bool {
        let hash = match hash {
            "" | "#" => String::new(),
            h if h.starts_with('#') => h.to_string(),
            h => format!("#{h}"),
        };
        if hash == self.hash {
            return false;
        }
        tracing::debug!("hash change {:?} -> {:?}", self.hash, hash);
        self.hash = hash;
        true
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.find_by_attribute(self.tree.root(), "id", id)
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
