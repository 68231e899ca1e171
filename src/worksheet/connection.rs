//! Recorded shot outcomes
//!
//! The store is append-only: a connection is never edited or removed while
//! the session lives. `revision` bumps on every append so a renderer can
//! tell when its last frame went stale.

use serde::{Deserialize, Serialize};

use super::layout::AnchorPair;

/// One resolved round, drawn as a line from its term to the shot definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub term_index: usize,
    /// Row of the shot definition in the worksheet's display order
    pub definition_index: usize,
    pub correct: bool,
    /// Anchors measured when the shot resolved; `None` when the rows were
    /// not laid out at that moment
    pub anchors: Option<AnchorPair>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionStore {
    connections: Vec<Connection>,
    revision: u64,
}

impl ConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, connection: Connection) -> &Connection {
        self.connections.push(connection);
        self.revision += 1;
        &self.connections[self.connections.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    pub fn as_slice(&self) -> &[Connection] {
        &self.connections
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn correct_count(&self) -> usize {
        self.connections.iter().filter(|c| c.correct).count()
    }

    /// First connection drawn from `term_index`
    pub fn for_term(&self, term_index: usize) -> Option<&Connection> {
        self.connections.iter().find(|c| c.term_index == term_index)
    }

    /// First connection drawn to `definition_index`
    pub fn for_definition(&self, definition_index: usize) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|c| c.definition_index == definition_index)
    }
}
