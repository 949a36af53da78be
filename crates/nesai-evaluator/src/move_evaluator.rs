//! The placement search, seen from the precompute layer.
//!
//! The search and its heuristic are supplied by another subsystem; this
//! module only fixes the call shape. An implementation is expected to be a
//! pure function of its arguments and may be expensive, which is why the
//! precompute layer runs several of them in parallel.

use std::{fmt, sync::Arc};

use nesai_engine::{InputFrameTimeline, SearchState};

use crate::{
    ai_params::{AiParams, ParamMods},
    possibility::PossibilityChain,
};

/// How deep the search looks ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDepth {
    /// Placements searched with known pieces.
    pub search_depth: u32,
    /// Additional placements searched over every possible unknown piece.
    pub hypothetical_search_depth: u32,
}

impl SearchDepth {
    /// Depth used for the default placement of the current piece: the piece
    /// itself plus one hypothetical next piece.
    pub const DEFAULT_PLACEMENT: Self = Self {
        search_depth: 1,
        hypothetical_search_depth: 1,
    };

    /// Depth used once the next piece is known.
    pub const KNOWN_NEXT: Self = Self {
        search_depth: 1,
        hypothetical_search_depth: 0,
    };
}

/// Chooses the best placement for the current piece of a state.
pub trait MoveEvaluator: fmt::Debug + Send {
    /// Returns the best placement chain, or `None` if the piece has no legal
    /// placement.
    ///
    /// Implementations usually start with
    /// [`prepare_params`](crate::ai_mode::prepare_params) to derive the
    /// parameters for the board's posture.
    fn best_move(
        &self,
        state: &SearchState,
        should_log: bool,
        initial_ai_params: &AiParams,
        param_mods: &ParamMods,
        input_frame_timeline: &InputFrameTimeline,
        depth: SearchDepth,
    ) -> Option<PossibilityChain>;
}

impl<E> MoveEvaluator for Arc<E>
where
    E: MoveEvaluator + Sync + ?Sized,
{
    fn best_move(
        &self,
        state: &SearchState,
        should_log: bool,
        initial_ai_params: &AiParams,
        param_mods: &ParamMods,
        input_frame_timeline: &InputFrameTimeline,
        depth: SearchDepth,
    ) -> Option<PossibilityChain> {
        (**self).best_move(
            state,
            should_log,
            initial_ai_params,
            param_mods,
            input_frame_timeline,
            depth,
        )
    }
}
