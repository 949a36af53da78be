//! Everything the precompute layer needs to know about move evaluation
//! without owning the search itself.
//!
//! The placement search and its scoring heuristic live behind the
//! [`MoveEvaluator`](move_evaluator::MoveEvaluator) trait. This crate defines
//! the values that cross that boundary and the board-posture logic that biases
//! the search:
//!
//! 1. **Parameters** ([`ai_params`]) - [`AiParams`](ai_params::AiParams) and
//!    [`ParamMods`](ai_params::ParamMods), threaded through unchanged except
//!    for the thresholds read during classification.
//!
//! 2. **Posture** ([`ai_mode`]) - chooses between killscreen, near-killscreen,
//!    dig and standard play from the board, line count and level.
//!
//! 3. **Results** ([`possibility`]) - the placement chain returned by an
//!    evaluator and its fixed text format.
//!
//! # Flow inside an evaluator
//!
//! ```text
//! initial params + input cadence
//!     ↓ with_tap_info
//! params with per-level tap heights
//!     ↓ get_ai_mode
//! AiMode
//!     ↓ modified_for_mode (ParamMods)
//! params used by the search
//! ```
//!
//! [`ai_mode::prepare_params`] performs the whole chain.

pub mod ai_mode;
pub mod ai_params;
pub mod move_evaluator;
pub mod possibility;
