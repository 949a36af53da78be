use std::fmt;

use nesai_engine::PieceKind;
use nesai_evaluator::possibility::{PossibilityChain, format_possibility};

/// Aggregated answer of one precompute session.
///
/// Holds the default placement of the current piece and, for every possible
/// next piece, the placement to adjust to once that piece is revealed.
///
/// The text form is one line per entry: `Default:<placement>` followed by
/// `<piece>:<placement>` for each piece in [`PieceKind::ALL`] order, however
/// the workers' answers were ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecomputeReport {
    default_placement: Option<PossibilityChain>,
    adjustments: [Option<PossibilityChain>; PieceKind::LEN],
}

impl PrecomputeReport {
    #[must_use]
    pub fn new(
        default_placement: Option<PossibilityChain>,
        adjustments: [Option<PossibilityChain>; PieceKind::LEN],
    ) -> Self {
        Self {
            default_placement,
            adjustments,
        }
    }

    #[must_use]
    pub fn default_placement(&self) -> Option<&PossibilityChain> {
        self.default_placement.as_ref()
    }

    #[must_use]
    pub fn adjustment(&self, next_piece: PieceKind) -> Option<&PossibilityChain> {
        self.adjustments[next_piece.index()].as_ref()
    }
}

impl fmt::Display for PrecomputeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Default:{}",
            format_possibility(self.default_placement.as_ref())
        )?;
        for piece in PieceKind::ALL {
            write!(f, "\n{piece}:{}", format_possibility(self.adjustment(piece)))?;
        }
        Ok(())
    }
}
