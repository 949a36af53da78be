//! Frame-accurate prediction of the current piece at the adjustment instant.
//!
//! When the next piece is revealed, the agent still needs its reaction time
//! before it can change course. During that window the inputs of the default
//! placement keep being executed. This module replays those frames to find
//! where the piece will be when the adjustment can start.

use nesai_engine::{InputFrameTimeline, InputSequence, PieceKind, SearchState, gravity};

/// Number of orientations tracked for `kind` at adjustment time.
///
/// The O-piece looks the same in every orientation; every other piece is
/// tracked modulo 2.
fn num_orientations(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::O => 1,
        _ => 2,
    }
}

/// Projects `state` forward by `reaction_time_frames` frames of
/// `input_sequence`.
///
/// Board, pieces, level and lines are carried over unchanged. The returned
/// state records the horizontal shift, the normalized rotation and the rows
/// fallen during the window, and whether an input frame is still unused, in
/// which case the piece can shift again on the very next input frame.
///
/// Frames past the end of `input_sequence` are idle: they neither move the
/// piece nor count as used inputs. Only characters inside the sequence other
/// than `.` are counted as used, including characters outside the alphabet.
#[must_use]
pub fn predict_search_state_at_adjustment_time(
    state: &SearchState,
    input_sequence: &InputSequence,
    input_frame_timeline: &InputFrameTimeline,
    reaction_time_frames: u32,
) -> SearchState {
    let mut inputs_possible = 0_u32;
    let mut inputs_used = 0_u32;
    let mut x_offset = 0_i32;
    let mut rotation = 0_i32;

    for frame in 0..reaction_time_frames as usize {
        if input_frame_timeline.is_input_frame(frame) {
            inputs_possible += 1;
        }

        let Some(input) = input_sequence.get(frame) else {
            continue;
        };
        x_offset += input.shift();
        rotation += input.rotation();
        if !input.is_idle() {
            inputs_used += 1;
        }
    }

    let rotation = rotation.rem_euclid(num_orientations(state.current_piece_id));
    let y_offset = reaction_time_frames / gravity(state.level);

    SearchState {
        board: state.board,
        current_piece_id: state.current_piece_id,
        next_piece_id: state.next_piece_id,
        level: state.level,
        lines: state.lines,
        existing_x_offset: x_offset,
        existing_y_offset: i32::try_from(y_offset).unwrap_or(i32::MAX),
        existing_rotation: rotation.unsigned_abs(),
        frames_already_elapsed: reaction_time_frames,
        can_first_frame_shift: inputs_used < inputs_possible,
    }
}
