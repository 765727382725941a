//! Document
//!
//! The document is the factory for output nodes and the owner of the
//! mutation journal shared by every node it creates.
//!
//! The journal is off unless the document is created with
//! [`Document::with_journal`]; nothing drains it except the caller.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::mutation::Mutation;
use super::node::{Node, NodeType};
use crate::error::Result;

/// Append-only log of tree mutations.
#[derive(Default)]
pub(crate) struct Journal {
    enabled: bool,
    records: Mutex<Vec<Mutation>>,
}

impl Journal {
    pub(crate) fn record(&self, mutation: Mutation) {
        if self.enabled {
            self.records.lock().push(mutation);
        }
    }
}

/// Creates output nodes and, when journaling, records every mutation applied
/// to them.
///
/// Cloning a document clones the handle; all clones share one journal.
#[derive(Clone, Default)]
pub struct Document {
    journal: Arc<Journal>,
}

impl Document {
    /// Create a new empty document that keeps no journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty document that journals every mutation.
    ///
    /// The journal grows until drained with [`Document::take_mutations`].
    pub fn with_journal() -> Self {
        Self {
            journal: Arc::new(Journal {
                enabled: true,
                records: Mutex::default(),
            }),
        }
    }

    /// Whether mutations are being journaled.
    pub fn is_journaling(&self) -> bool {
        self.journal.enabled
    }

    /// The document that created `node`.
    pub fn of(node: &Node) -> Self {
        Self {
            journal: Arc::clone(node.journal()),
        }
    }

    /// Create a detached element node.
    pub fn create_element(&self, tag: &str) -> Node {
        let node = Node::new(NodeType::Element(tag.to_owned()), Arc::clone(&self.journal));
        self.journal.record(Mutation::CreateElement {
            node: node.id(),
            tag: tag.to_owned(),
        });
        node
    }

    /// Create a detached text node.
    pub fn create_text(&self, value: &str) -> Node {
        let node = Node::new(NodeType::Text, Arc::clone(&self.journal));
        self.journal.record(Mutation::CreateText { node: node.id() });
        if !value.is_empty() {
            node.set_attribute(super::NODE_VALUE, &value.into());
        }
        node
    }

    /// Snapshot of the journal.
    pub fn mutations(&self) -> Vec<Mutation> {
        self.journal.records.lock().clone()
    }

    /// Drain the journal.
    pub fn take_mutations(&self) -> Vec<Mutation> {
        std::mem::take(&mut *self.journal.records.lock())
    }

    /// Number of journaled mutations.
    pub fn mutation_count(&self) -> usize {
        self.journal.records.lock().len()
    }

    /// Serialize the journal as a JSON array.
    pub fn mutations_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&*self.journal.records.lock())?)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("journaling", &self.is_journaling())
            .field("mutations", &self.mutation_count())
            .finish()
    }
}
