//! Term/definition pairs supplied once per session

use serde::{Deserialize, Serialize};

use crate::consts::MIN_PAIRS;
use crate::error::{QuizError, Result};

/// A term and its correct definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub term: String,
    pub definition: String,
}

impl Pair {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
        }
    }
}

/// Upload service response shape: `{"pairs": [...]}`
#[derive(Deserialize)]
struct PairsEnvelope {
    pairs: Vec<Pair>,
}

/// Ordered, validated pair list (at least `MIN_PAIRS` entries, immutable)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairSet {
    pairs: Vec<Pair>,
}

impl PairSet {
    pub fn new(pairs: Vec<Pair>) -> Result<Self> {
        if pairs.len() < MIN_PAIRS {
            return Err(QuizError::insufficient(pairs.len()));
        }
        if let Some(index) = pairs
            .iter()
            .position(|p| p.term.trim().is_empty() || p.definition.trim().is_empty())
        {
            return Err(QuizError::MalformedPair { index });
        }
        Ok(Self { pairs })
    }

    /// Accepts either a bare array or the `{"pairs": [...]}` envelope
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let pairs = if value.is_array() {
            serde_json::from_value::<Vec<Pair>>(value)?
        } else {
            serde_json::from_value::<PairsEnvelope>(value)?.pairs
        };
        Self::new(pairs)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Pair> {
        self.pairs.get(index)
    }

    pub fn as_slice(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pair> {
        self.pairs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> Vec<Pair> {
        (0..n)
            .map(|i| Pair::new(format!("T{i}"), format!("D{i}")))
            .collect()
    }

    #[test]
    fn test_rejects_too_few_pairs() {
        let err = PairSet::new(sample(3)).unwrap_err();
        assert!(matches!(
            err,
            QuizError::InsufficientData {
                found: 3,
                required: 4
            }
        ));
    }

    #[test]
    fn test_rejects_blank_definition() {
        let mut pairs = sample(4);
        pairs[2].definition = "   ".into();
        assert!(matches!(
            PairSet::new(pairs),
            Err(QuizError::MalformedPair { index: 2 })
        ));
    }

    #[test]
    fn test_from_json_both_shapes() {
        let bare = r#"[{"term":"API","definition":"a"},{"term":"REST","definition":"b"},
                       {"term":"JSON","definition":"c"},{"term":"HTTP","definition":"d"}]"#;
        let set = PairSet::from_json(bare).expect("bare array");
        assert_eq!(set.len(), 4);
        assert_eq!(set.get(1).map(|p| p.term.as_str()), Some("REST"));

        let wrapped = format!(r#"{{"pairs": {bare}}}"#);
        assert_eq!(PairSet::from_json(&wrapped).expect("envelope"), set);

        assert!(matches!(
            PairSet::from_json("[1, 2]"),
            Err(QuizError::InvalidPairs(_))
        ));
    }
}
