//! Messages exchanged between the coordinator and its workers.
//!
//! Inside the process the messages travel over typed channels, so a worker
//! can only ever answer with one of the [`WorkerResponse`] variants. The JSON
//! form is kept for bridges that host workers out of process; there the
//! `type` tag is checked explicitly and anything but `ready` or `result` is a
//! [`ProtocolError`].

use nesai_engine::{InputFrameTimeline, PieceKind, SearchState};
use nesai_evaluator::{
    ai_params::{AiParams, ParamMods},
    possibility::PossibilityChain,
};
use serde::{Deserialize, Serialize};

/// Identifies one precompute session.
///
/// Results carry the id of the session they were computed for, so answers
/// that arrive after their session was abandoned can be told apart.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
#[display("#{_0}")]
pub struct SessionId(u64);

impl SessionId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Work order for a single worker: find the best move for `new_search_state`,
/// whose next piece is `piece`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerTask {
    pub session: SessionId,
    pub piece: PieceKind,
    pub new_search_state: SearchState,
    pub should_log: bool,
    pub initial_ai_params: AiParams,
    pub param_mods: ParamMods,
    pub input_frame_timeline: InputFrameTimeline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerResponse {
    /// The worker finished starting up and accepts tasks.
    Ready,
    /// Answer to a [`WorkerTask`]; `result` is `None` when the piece has no
    /// legal placement.
    Result {
        session: SessionId,
        piece: PieceKind,
        result: Option<PossibilityChain>,
    },
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ProtocolError {
    #[display("unrecognized message type received from worker: {_0}")]
    UnrecognizedType(#[error(not(source))] String),
    #[display("malformed worker message")]
    Malformed(serde_json::Error),
}

impl WorkerResponse {
    const KNOWN_TYPES: [&str; 2] = ["ready", "result"];

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decodes a response received as JSON.
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(ProtocolError::Malformed)?;
        let kind = match value.get("type") {
            Some(serde_json::Value::String(kind)) => kind.clone(),
            Some(other) => other.to_string(),
            None => "<missing>".to_owned(),
        };
        if !Self::KNOWN_TYPES.contains(&kind.as_str()) {
            return Err(ProtocolError::UnrecognizedType(kind));
        }
        serde_json::from_value(value).map_err(ProtocolError::Malformed)
    }
}

impl WorkerTask {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(json).map_err(ProtocolError::Malformed)
    }
}
