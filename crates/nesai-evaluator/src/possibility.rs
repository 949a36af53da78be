//! Placements chosen by a move evaluator and their text format.
//!
//! The text format is what the console bridge consumes:
//!
//! - a placement formats as `rotation,x_offset,input_sequence`
//!   (e.g. `1,-3,E.L..L`)
//! - a chain appends each dependent placement after a `|`
//! - a missing result formats as [`NO_LEGAL_MOVES`]

use std::fmt;

use nesai_engine::InputSequence;
use serde::{Deserialize, Serialize};

/// Text used when an evaluator found no legal placement.
pub const NO_LEGAL_MOVES: &str = "No legal moves";

/// Final rotation and horizontal offset of a piece, relative to its spawn.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub rotation: u32,
    pub x_offset: i32,
}

/// One scored placement with the inputs that reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Possibility {
    pub placement: Placement,
    pub input_sequence: InputSequence,
    pub score: f32,
}

/// A placement plus the placement it was planned together with, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossibilityChain {
    #[serde(flatten)]
    pub possibility: Possibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<PossibilityChain>>,
}

impl PossibilityChain {
    #[must_use]
    pub fn single(possibility: Possibility) -> Self {
        Self {
            possibility,
            next: None,
        }
    }

    #[must_use]
    pub fn then(mut self, next: PossibilityChain) -> Self {
        self.next = Some(Box::new(next));
        self
    }

    #[must_use]
    pub fn placement(&self) -> Placement {
        self.possibility.placement
    }

    #[must_use]
    pub fn input_sequence(&self) -> &InputSequence {
        &self.possibility.input_sequence
    }

    /// Number of placements in the chain.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.next.as_ref().map_or(0, |next| next.depth())
    }
}

impl fmt::Display for Possibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            self.placement.rotation, self.placement.x_offset, self.input_sequence
        )
    }
}

impl fmt::Display for PossibilityChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.possibility)?;
        if let Some(next) = &self.next {
            write!(f, "|{next}")?;
        }
        Ok(())
    }
}

/// Formats an evaluator result, including the "no legal moves" case.
#[must_use]
pub fn format_possibility(chain: Option<&PossibilityChain>) -> String {
    chain.map_or_else(|| NO_LEGAL_MOVES.to_owned(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn possibility(rotation: u32, x_offset: i32, inputs: &str) -> Possibility {
        Possibility {
            placement: Placement { rotation, x_offset },
            input_sequence: InputSequence::from(inputs),
            score: 0.0,
        }
    }

    #[test]
    fn test_format_single() {
        let chain = PossibilityChain::single(possibility(1, -3, "E.L..L"));
        assert_eq!(format_possibility(Some(&chain)), "1,-3,E.L..L");
        assert_eq!(chain.depth(), 1);
    }

    #[test]
    fn test_format_chain() {
        let chain = PossibilityChain::single(possibility(0, 2, "R..R"))
            .then(PossibilityChain::single(possibility(3, 0, "B")));
        assert_eq!(chain.to_string(), "0,2,R..R|3,0,B");
        assert_eq!(chain.depth(), 2);
    }

    #[test]
    fn test_format_missing() {
        assert_eq!(format_possibility(None), NO_LEGAL_MOVES);
    }

    #[test]
    fn test_chain_serialization() {
        let chain = PossibilityChain::single(possibility(1, -1, "E"))
            .then(PossibilityChain::single(possibility(0, 4, "R.R.R.R")));
        let json = serde_json::to_value(&chain).unwrap();
        assert_eq!(json["placement"]["xOffset"], -1);
        assert_eq!(json["inputSequence"], "E");
        assert_eq!(json["next"]["inputSequence"], "R.R.R.R");
        assert!(json["next"].get("next").is_none());

        let back: PossibilityChain = serde_json::from_value(json).unwrap();
        assert_eq!(back, chain);
    }
}
