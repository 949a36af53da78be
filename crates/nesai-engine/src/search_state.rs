use serde::{Deserialize, Serialize};

use crate::{Board, PieceKind};

/// The game state as of some instant.
///
/// A `SearchState` describes either the true present (piece just spawned,
/// nothing elapsed) or a predicted future instant, in which case the
/// `existing_*` fields carry how far the current piece has already been moved
/// by inputs that were dispatched earlier.
///
/// States are values: a new state is derived, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub board: Board,
    pub current_piece_id: PieceKind,
    pub next_piece_id: Option<PieceKind>,
    pub level: u32,
    pub lines: u32,
    pub existing_x_offset: i32,
    pub existing_y_offset: i32,
    pub existing_rotation: u32,
    pub frames_already_elapsed: u32,
    pub can_first_frame_shift: bool,
}

impl SearchState {
    /// Creates the state of a freshly spawned piece.
    #[must_use]
    pub fn new(
        board: Board,
        current_piece_id: PieceKind,
        next_piece_id: Option<PieceKind>,
        level: u32,
        lines: u32,
    ) -> Self {
        Self {
            board,
            current_piece_id,
            next_piece_id,
            level,
            lines,
            existing_x_offset: 0,
            existing_y_offset: 0,
            existing_rotation: 0,
            frames_already_elapsed: 0,
            can_first_frame_shift: false,
        }
    }

    /// Returns a copy of this state that assumes `next` is the upcoming piece.
    #[must_use]
    pub fn with_next_piece(&self, next: PieceKind) -> Self {
        Self {
            next_piece_id: Some(next),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_next_piece_keeps_everything_else() {
        let state = SearchState {
            existing_x_offset: -2,
            frames_already_elapsed: 12,
            ..SearchState::new(Board::EMPTY, PieceKind::T, None, 18, 40)
        };
        let derived = state.with_next_piece(PieceKind::I);
        assert_eq!(derived.next_piece_id, Some(PieceKind::I));
        assert_eq!(
            SearchState {
                next_piece_id: None,
                ..derived
            },
            state
        );
    }

    #[test]
    fn test_search_state_serialization() {
        let state = SearchState::new(Board::EMPTY, PieceKind::J, Some(PieceKind::I), 18, 0);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["currentPieceId"], "J");
        assert_eq!(json["nextPieceId"], "I");
        assert_eq!(json["framesAlreadyElapsed"], 0);

        let back: SearchState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
