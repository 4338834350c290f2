//! Application errors

use twig_dom::NodeId;

/// Errors raised while creating or driving an app
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Mount root is not an element attached to the document
    #[error("mount root {0} is not an element in the document")]
    InvalidRoot(NodeId),

    /// Initial state is not a JSON object
    #[error("initial state must be a JSON object, got {0}")]
    InvalidState(String),

    /// Document is borrowed elsewhere
    #[error("document is already borrowed")]
    DocumentBusy,
}
