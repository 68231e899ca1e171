//! Persistent term/definition worksheet
//!
//! Terms are listed in pair order; definitions are shuffled once when the
//! worksheet is built and keep that order for its whole life. Every resolved
//! shot becomes a [`Connection`] from the round's term to the row showing
//! the shot definition.

pub mod connection;
pub mod layout;

pub use connection::{Connection, ConnectionStore};
pub use layout::{AnchorPair, Column, ColumnLayout, LayoutProvider, Rect, measure_anchors};

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};
use crate::sim::distractor::shuffle;
use crate::sim::pairs::PairSet;
use crate::sim::state::ShotOutcome;

/// Display state of a term row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermStatus {
    /// The term the game is currently asking for
    Active,
    /// Already answered (right or wrong)
    Completed,
    Pending,
}

/// Display state of a definition row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefinitionStatus {
    Correct,
    Wrong,
    Unused,
}

/// Transient term/definition pairing drawn as a dashed preview line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveSelection {
    pub term_index: usize,
    pub definition_index: usize,
}

/// Tally shown under the worksheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksheetSummary {
    pub correct: usize,
    pub answered: usize,
    pub total: usize,
}

impl std::fmt::Display for WorksheetSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} / {} correct ({} answered)",
            self.correct, self.total, self.answered
        )
    }
}

#[derive(Debug, Clone)]
pub struct Worksheet {
    terms: Vec<String>,
    /// Definitions in display order
    definitions: Vec<String>,
    connections: ConnectionStore,
    /// Round the game is on (== terms.len() once finished)
    current_round: usize,
    /// First half of a player pairing, waiting for a row in the other column
    pending_pick: Option<(Column, usize)>,
    live: Option<LiveSelection>,
}

impl Worksheet {
    /// Build the sheet, shuffling the definition column with `seed`
    pub fn new(pairs: &PairSet, seed: u64) -> Self {
        let terms = pairs.iter().map(|p| p.term.clone()).collect();
        let mut definitions: Vec<String> = pairs.iter().map(|p| p.definition.clone()).collect();
        let mut rng = Pcg32::seed_from_u64(seed);
        shuffle(&mut definitions, &mut rng);

        Self {
            terms,
            definitions,
            connections: ConnectionStore::new(),
            current_round: 0,
            pending_pick: None,
            live: None,
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn definitions(&self) -> &[String] {
        &self.definitions
    }

    pub fn connections(&self) -> &ConnectionStore {
        &self.connections
    }

    pub fn current_round(&self) -> usize {
        self.current_round
    }

    pub fn set_current_round(&mut self, round: usize) {
        self.current_round = round.min(self.terms.len());
    }

    /// Changes whenever a connection is appended
    pub fn revision(&self) -> u64 {
        self.connections.revision()
    }

    pub fn is_finished(&self) -> bool {
        self.current_round >= self.terms.len()
    }

    /// Display row of a definition text (first match wins for duplicates)
    pub fn definition_index(&self, text: &str) -> Option<usize> {
        self.definitions.iter().position(|d| d == text)
    }

    /// Record a resolved shot.
    ///
    /// Anchors are measured right now from `layout` and cached on the
    /// connection. When the rows are not laid out the connection is still
    /// recorded without anchors; the renderer measures it live later.
    pub fn record_outcome(
        &mut self,
        outcome: &ShotOutcome<'_>,
        layout: &dyn LayoutProvider,
    ) -> Result<&Connection> {
        let definition_index = self
            .definition_index(outcome.definition)
            .ok_or_else(|| QuizError::UnknownDefinition(outcome.definition.to_owned()))?;

        let anchors = match measure_anchors(layout, outcome.round_index, definition_index) {
            Ok(anchors) => Some(anchors),
            Err(e) => {
                log::warn!("Connection recorded without cached anchors: {}", e);
                None
            }
        };

        self.set_current_round(outcome.round_index + 1);
        self.pending_pick = None;
        self.live = None;
        log::debug!(
            "Connection {} -> {} ({})",
            outcome.round_index,
            definition_index,
            if outcome.correct { "correct" } else { "wrong" }
        );

        Ok(self.connections.push(Connection {
            term_index: outcome.round_index,
            definition_index,
            correct: outcome.correct,
            anchors,
        }))
    }

    pub fn term_status(&self, term_index: usize) -> TermStatus {
        if self.connections.for_term(term_index).is_some() || term_index < self.current_round {
            TermStatus::Completed
        } else if term_index == self.current_round {
            TermStatus::Active
        } else {
            TermStatus::Pending
        }
    }

    /// Status of a definition row, from the first connection drawn to it
    pub fn definition_status(&self, definition_index: usize) -> DefinitionStatus {
        match self.connections.for_definition(definition_index) {
            Some(c) if c.correct => DefinitionStatus::Correct,
            Some(_) => DefinitionStatus::Wrong,
            None => DefinitionStatus::Unused,
        }
    }

    pub fn live_selection(&self) -> Option<LiveSelection> {
        self.live
    }

    /// Row picked by the player that has no partner yet
    pub fn pending_pick(&self) -> Option<(Column, usize)> {
        self.pending_pick
    }

    /// Player clicked a worksheet row.
    ///
    /// A term and a definition picked one after the other (either order)
    /// become the live selection. Picking the pending row again drops it; a
    /// pick after a completed pairing starts a new one.
    pub fn pick(&mut self, column: Column, index: usize) -> Option<LiveSelection> {
        let rows = match column {
            Column::Term => self.terms.len(),
            Column::Definition => self.definitions.len(),
        };
        if index >= rows {
            return self.live;
        }

        self.pending_pick = match self.pending_pick {
            Some(pending) if pending == (column, index) => None,
            Some((other, other_index)) if other != column => {
                let (term_index, definition_index) = match column {
                    Column::Term => (index, other_index),
                    Column::Definition => (other_index, index),
                };
                self.set_live_selection(Some(LiveSelection {
                    term_index,
                    definition_index,
                }));
                return self.live;
            }
            _ => {
                self.live = None;
                Some((column, index))
            }
        };
        self.live
    }

    /// Preview a pairing; out-of-range rows clear the preview
    pub fn set_live_selection(&mut self, selection: Option<LiveSelection>) {
        self.pending_pick = None;
        self.live = selection.filter(|s| {
            s.term_index < self.terms.len() && s.definition_index < self.definitions.len()
        });
    }

    pub fn summary(&self) -> WorksheetSummary {
        WorksheetSummary {
            correct: self.connections.correct_count(),
            answered: self.connections.len(),
            total: self.terms.len(),
        }
    }

    /// Start over with a fresh shuffle and no connections
    pub fn reset(&mut self, seed: u64) {
        let mut rng = Pcg32::seed_from_u64(seed);
        shuffle(&mut self.definitions, &mut rng);
        self.connections = ConnectionStore::new();
        self.current_round = 0;
        self.pending_pick = None;
        self.live = None;
    }
}
