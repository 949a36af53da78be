//! Parallel precomputation of piece placements.
//!
//! While the current piece falls, the agent does not yet know which piece
//! comes next. This crate computes, up front, the default placement of the
//! current piece and, for each of the seven possible next pieces, the
//! adjusted placement to switch to once that piece is revealed.
//!
//! The adjustments run on a fixed pool of worker threads, one per next piece.
//! Each worker starts from the state predicted for the moment the agent can
//! react (see [`predict_search_state_at_adjustment_time`]), and the answers
//! are gathered into a single [`PrecomputeReport`].

use arrayvec::ArrayVec;
use nesai_engine::PieceKind;

pub use self::{
    config::PrecomputeConfig,
    manager::{PrecomputeManager, PrecomputeRequest},
    predictor::predict_search_state_at_adjustment_time,
    protocol::{ProtocolError, SessionId, WorkerResponse, WorkerTask},
    report::PrecomputeReport,
};

mod config;
mod manager;
mod predictor;
pub mod protocol;
mod report;
mod session;
mod worker;

/// Number of worker threads, one per possible next piece.
pub const NUM_THREADS: usize = PieceKind::LEN;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PrecomputeError {
    #[display("failed to spawn precompute worker")]
    Spawn(std::io::Error),
    #[display("precompute workers are still loading ({still_loading} remaining)")]
    NotReady { still_loading: usize },
    #[display("timed out waiting for {still_loading} precompute workers to start")]
    StartupTimeout { still_loading: usize },
    #[display("precompute session {_0} is still pending")]
    SessionInProgress(#[error(not(source))] SessionId),
    #[display("precompute session {session} timed out waiting for {missing:?}")]
    Timeout {
        session: SessionId,
        missing: ArrayVec<PieceKind, NUM_THREADS>,
    },
    #[display("result for {piece} received twice in session {session}")]
    DuplicateResult { session: SessionId, piece: PieceKind },
    #[display("result for {piece} received for unknown session {session}")]
    UnexpectedResult { session: SessionId, piece: PieceKind },
    #[display("precompute session finished without a result callback")]
    MissingResultCallback,
    #[display("precompute worker disconnected")]
    WorkerDisconnected,
    #[display("invalid message from precompute worker")]
    Protocol(ProtocolError),
}

impl From<ProtocolError> for PrecomputeError {
    fn from(err: ProtocolError) -> Self {
        Self::Protocol(err)
    }
}
