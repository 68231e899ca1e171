//! Error taxonomy for quiz sessions and the worksheet
//!
//! Pool exhaustion and stale overlaps are not errors: `fire` and
//! `resolve_hit` return `None` for them.

use crate::consts::MIN_PAIRS;

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    /// Fewer pairs than a single round needs
    #[error("need at least {required} term/definition pairs, got {found}")]
    InsufficientData { found: usize, required: usize },

    /// Empty term or definition
    #[error("pair {index} has an empty term or definition")]
    MalformedPair { index: usize },

    /// Row geometry not readable (row not mounted yet)
    #[error("no geometry for term {term_index} / definition {definition_index}")]
    MissingAnchor {
        term_index: usize,
        definition_index: usize,
    },

    /// Shot definition text not present in the worksheet column
    #[error("definition not on the worksheet: {0:?}")]
    UnknownDefinition(String),

    /// Upstream pair list could not be parsed
    #[error("invalid pair data: {0}")]
    InvalidPairs(#[from] serde_json::Error),

    /// Pair file could not be read (native front end)
    #[error("cannot read pair data: {0}")]
    Io(#[from] std::io::Error),
}

impl QuizError {
    pub fn insufficient(found: usize) -> Self {
        QuizError::InsufficientData {
            found,
            required: MIN_PAIRS,
        }
    }
}

pub type Result<T> = std::result::Result<T, QuizError>;
