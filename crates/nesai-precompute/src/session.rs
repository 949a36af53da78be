use std::{fmt, time::Instant};

use arrayvec::ArrayVec;
use nesai_engine::PieceKind;
use nesai_evaluator::possibility::PossibilityChain;

use crate::{PrecomputeError, protocol::SessionId, report::PrecomputeReport};

pub(crate) type ResultCallback = Box<dyn FnOnce(PrecomputeReport) + Send>;

/// Bookkeeping for one `precompute` call, from dispatch to report.
pub(crate) struct PrecomputeSession {
    id: SessionId,
    started_at: Instant,
    pending_results: usize,
    // Outer `Option`: whether the piece's worker answered yet.
    results: [Option<Option<PossibilityChain>>; PieceKind::LEN],
    default_placement: Option<PossibilityChain>,
    on_result: Option<ResultCallback>,
}

impl fmt::Debug for PrecomputeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrecomputeSession")
            .field("id", &self.id)
            .field("pending_results", &self.pending_results)
            .field("missing", &self.missing_pieces())
            .finish_non_exhaustive()
    }
}

impl PrecomputeSession {
    pub(crate) fn new(
        id: SessionId,
        default_placement: Option<PossibilityChain>,
        on_result: ResultCallback,
    ) -> Self {
        Self {
            id,
            started_at: Instant::now(),
            pending_results: PieceKind::LEN,
            results: Default::default(),
            default_placement,
            on_result: Some(on_result),
        }
    }

    pub(crate) fn id(&self) -> SessionId {
        self.id
    }

    pub(crate) fn started_at(&self) -> Instant {
        self.started_at
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.pending_results == 0
    }

    /// Stores the answer for `piece`.
    pub(crate) fn record(
        &mut self,
        piece: PieceKind,
        result: Option<PossibilityChain>,
    ) -> Result<(), PrecomputeError> {
        let slot = &mut self.results[piece.index()];
        if slot.is_some() {
            return Err(PrecomputeError::DuplicateResult {
                session: self.id,
                piece,
            });
        }
        *slot = Some(result);
        self.pending_results -= 1;
        Ok(())
    }

    /// Pieces whose worker has not answered yet, in canonical order.
    pub(crate) fn missing_pieces(&self) -> ArrayVec<PieceKind, { PieceKind::LEN }> {
        PieceKind::ALL
            .into_iter()
            .filter(|piece| self.results[piece.index()].is_none())
            .collect()
    }

    /// Builds the report and hands it to the session's callback.
    ///
    /// Must only be called once every result is in.
    pub(crate) fn complete(mut self) -> Result<(), PrecomputeError> {
        debug_assert!(self.is_complete());
        let on_result = self
            .on_result
            .take()
            .ok_or(PrecomputeError::MissingResultCallback)?;
        let adjustments = self.results.map(Option::flatten);
        on_result(PrecomputeReport::new(self.default_placement, adjustments));
        Ok(())
    }
}
