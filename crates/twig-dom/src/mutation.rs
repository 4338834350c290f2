//! Mutation records
//!
//! An opt-in log of every state-changing operation applied to the tree.
//! Writes that leave the surface unchanged (same attribute value, same
//! property value) produce no record.

use crate::NodeId;

/// One observable change to the surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    /// A detached node was allocated
    Created { node: NodeId },
    /// A node was inserted (or moved) under `parent`
    Inserted { node: NodeId, parent: NodeId },
    /// A node was detached from `parent`
    Removed { node: NodeId, parent: NodeId },
    /// A content attribute changed
    AttributeChanged {
        node: NodeId,
        name: String,
        old_value: Option<String>,
        new_value: Option<String>,
    },
    /// A live property changed
    PropertyChanged { node: NodeId, name: String },
    /// Character data changed
    TextChanged { node: NodeId, old_value: String, new_value: String },
}

impl MutationRecord {
    /// Node the record is about
    pub fn target(&self) -> NodeId {
        match self {
            Self::Created { node }
            | Self::Inserted { node, .. }
            | Self::Removed { node, .. }
            | Self::AttributeChanged { node, .. }
            | Self::PropertyChanged { node, .. }
            | Self::TextChanged { node, .. } => *node,
        }
    }

    /// Whether this record changes tree structure
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Created { .. } | Self::Inserted { .. } | Self::Removed { .. }
        )
    }
}

/// Mutation log (disabled by default)
#[derive(Debug, Default)]
pub struct MutationLog {
    enabled: bool,
    records: Vec<MutationRecord>,
}

impl MutationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn push(&mut self, record: MutationRecord) {
        if self.enabled {
            self.records.push(record);
        }
    }

    /// Drain recorded mutations
    pub fn take(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
