//! DOM Events
//!
//! Platform input events delivered to the document by the host.

use crate::NodeId;

/// Common event type names
pub mod event_types {
    pub const CLICK: &str = "click";
    pub const DBLCLICK: &str = "dblclick";
    pub const INPUT: &str = "input";
    pub const CHANGE: &str = "change";
    pub const KEYDOWN: &str = "keydown";
    pub const KEYPRESS: &str = "keypress";
    pub const BLUR: &str = "blur";
}

/// DOM event
#[derive(Debug, Clone)]
pub struct DomEvent {
    /// Lowercase event type name
    pub event_type: String,
    /// Node the event originated at
    pub target: NodeId,
    /// Keyboard key for key events
    pub key: Option<String>,
    pub cancelable: bool,
    default_prevented: bool,
}

impl DomEvent {
    /// Create a cancelable event of any type
    pub fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_ascii_lowercase(),
            target,
            key: None,
            cancelable: true,
            default_prevented: false,
        }
    }

    pub fn click(target: NodeId) -> Self {
        Self::new(event_types::CLICK, target)
    }

    pub fn dblclick(target: NodeId) -> Self {
        Self::new(event_types::DBLCLICK, target)
    }

    pub fn input(target: NodeId) -> Self {
        Self {
            cancelable: false,
            ..Self::new(event_types::INPUT, target)
        }
    }

    pub fn change(target: NodeId) -> Self {
        Self {
            cancelable: false,
            ..Self::new(event_types::CHANGE, target)
        }
    }

    pub fn keydown(target: NodeId, key: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            ..Self::new(event_types::KEYDOWN, target)
        }
    }

    pub fn keypress(target: NodeId, key: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            ..Self::new(event_types::KEYPRESS, target)
        }
    }

    pub fn blur(target: NodeId) -> Self {
        Self {
            cancelable: false,
            ..Self::new(event_types::BLUR, target)
        }
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_event() {
        let event = DomEvent::keydown(NodeId(5), "Enter");

        assert_eq!(event.event_type, "keydown");
        assert_eq!(event.target, NodeId(5));
        assert_eq!(event.key.as_deref(), Some("Enter"));
    }

    #[test]
    fn test_prevent_default_requires_cancelable() {
        let mut input = DomEvent::input(NodeId(1));
        input.prevent_default();
        assert!(!input.is_default_prevented());

        let mut click = DomEvent::click(NodeId(1));
        click.prevent_default();
        assert!(click.is_default_prevented());
    }

    #[test]
    fn test_event_type_case_folded() {
        assert_eq!(DomEvent::new("DblClick", NodeId(2)).event_type, "dblclick");
    }
}
