//! Game-state primitives shared by the classifier, the timing predictor and
//! the precompute orchestrator.
//!
//! - [`Board`] - 20×10 snapshot of locked cells
//! - [`PieceKind`] - the seven tetrominoes in canonical order
//! - [`gravity`] - NES frames-per-row table
//! - [`FrameInput`] / [`InputSequence`] / [`InputFrameTimeline`] - per-frame
//!   controller inputs and the cadence in which inputs are accepted
//! - [`SearchState`] - the game state as of some instant

pub use self::{core::*, input::*, search_state::*};

pub mod core;
pub mod input;
mod search_state;
