//! Board-posture classification.
//!
//! The classifier picks one strategic posture per decision. The posture only
//! biases the evaluator's weights (see
//! [`AiParams::modified_for_mode`]); it never restricts which placements are
//! searched.
//!
//! Rules are checked in order and the first match wins:
//!
//! 1. **Killscreen** - a 5-tap is no longer possible from a stack of 5 rows
//! 2. **Near killscreen** - 220 or more lines cleared
//! 3. **Dig** - some hole is worth digging out now (see [`should_use_dig_mode`])
//! 4. **Standard** - everything else

use nesai_engine::{Board, InputFrameTimeline, NUM_COLUMN, NUM_ROW, SearchState};
use serde::{Deserialize, Serialize};

use crate::ai_params::{AiParams, ParamMods};

/// Line count from which the agent starts preparing for the killscreen.
pub const NEAR_KILLSCREEN_LINES: u32 = 220;

/// Tap heights at or below this value mean fine adjustments are unreliable.
const KILLSCREEN_MAX_TAP_HEIGHT: u32 = 4;

/// Rows of the tetris zone built on top of the well's stack.
const TETRIS_ZONE_HEIGHT: isize = 4;

/// Holes with fewer filled rows than this above them are cheap to burn out.
const ACCESSIBLE_HOLE_DEPTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AiMode {
    Killscreen,
    NearKillscreen,
    Dig,
    Standard,
}

/// Chooses the posture for the given board.
///
/// `params` must already carry the tap lookup (see
/// [`AiParams::with_tap_info`]); a level missing from the lookup is never
/// treated as a killscreen.
#[must_use]
pub fn get_ai_mode(board: &Board, lines: u32, level: u32, params: &AiParams) -> AiMode {
    if params
        .max_5_tap_height(level)
        .is_some_and(|height| height <= KILLSCREEN_MAX_TAP_HEIGHT)
    {
        return AiMode::Killscreen;
    }
    if lines >= NEAR_KILLSCREEN_LINES {
        return AiMode::NearKillscreen;
    }
    if should_use_dig_mode(board, level, params) {
        return AiMode::Dig;
    }
    AiMode::Standard
}

/// Decides whether any hole on the board is worth digging out now.
///
/// The rightmost column is the well. The four rows directly above the well's
/// stack are the tetris zone. A hole (an empty cell below the top of its
/// column, well excluded) warrants digging when:
///
/// - it sits in a row where the well is also filled, higher than
///   `max_dirty_tetris_height × scare_height` rows from the bottom, or
/// - it sits inside the tetris zone, or
/// - fewer than 4 rows separate it from the top of its column.
///
/// Columns are scanned left to right and rows top to bottom; the first
/// qualifying hole ends the scan.
#[must_use]
pub fn should_use_dig_mode(board: &Board, level: u32, params: &AiParams) -> bool {
    let well = NUM_COLUMN - 1;

    // Both inclusive, may extend above the board.
    #[expect(clippy::cast_possible_wrap)]
    let well_top = board.first_full_row(well) as isize;
    let tetris_zone = (well_top - TETRIS_ZONE_HEIGHT)..=(well_top - 1);

    let max_dirty_tetris_height = params.max_dirty_tetris_height * params.scare_height(level);

    let hole_warrants_digging = |row: usize, first_full_row: usize| {
        #[expect(clippy::cast_precision_loss)]
        let height_from_bottom = (NUM_ROW - row) as f32;
        let blocking_well = board.is_full(row, well);
        #[expect(clippy::cast_possible_wrap)]
        let in_tetris_zone = tetris_zone.contains(&(row as isize));
        (blocking_well && height_from_bottom > max_dirty_tetris_height)
            || in_tetris_zone
            || row - first_full_row < ACCESSIBLE_HOLE_DEPTH
    };

    (0..well).any(|col| {
        let first_full_row = board.first_full_row(col);
        (first_full_row + 1..NUM_ROW)
            .filter(|&row| !board.is_full(row, col))
            .any(|row| hole_warrants_digging(row, first_full_row))
    })
}

/// Prepares the parameters an evaluator searches with.
///
/// Adds the tap lookup for `timeline`, classifies the state and applies the
/// posture's overrides from `param_mods`.
#[must_use]
pub fn prepare_params(
    state: &SearchState,
    initial_params: &AiParams,
    param_mods: &ParamMods,
    timeline: &InputFrameTimeline,
) -> (AiMode, AiParams) {
    let params = initial_params.clone().with_tap_info(timeline);
    let mode = get_ai_mode(&state.board, state.lines, state.level, &params);
    log::debug!(
        "posture {mode:?} at level {} with {} lines",
        state.level,
        state.lines
    );
    let params = params.modified_for_mode(mode, param_mods);
    (mode, params)
}

#[cfg(test)]
mod tests {
    use nesai_engine::{Cell, PieceKind};

    use super::*;
    use crate::ai_params::{TAP_LOOKUP_LEVELS, tests::sample_params};

    fn params_with_taps(timeline: &str) -> AiParams {
        sample_params().with_tap_info(&InputFrameTimeline::new(timeline).unwrap())
    }

    mod test_boards {
        use super::*;

        pub fn clean_stack() -> Board {
            Board::from_ascii(
                "
                ..........
                #.#.......
                ###.##.#..
                #########.
                #########.
                ",
            )
        }

        /// Column 3 has its top at row 13 and a hole at row 15.
        pub fn shallow_hole() -> Board {
            Board::from_ascii(
                "
                ...#......
                ...#......
                ..........
                ...#......
                ...#......
                ...#......
                ...#......
                ",
            )
        }

        /// Column 3 has its top at row 10 and a hole at row 16.
        pub fn deep_hole() -> Board {
            Board::from_ascii(
                "
                ...#......
                ...#......
                ...#......
                ...#......
                ...#......
                ...#......
                ..........
                ...#......
                ...#......
                ...#......
                ",
            )
        }
    }

    #[test]
    fn test_clean_board_is_standard() {
        let params = params_with_taps("X.");
        for board in [Board::EMPTY, test_boards::clean_stack()] {
            assert!(!should_use_dig_mode(&board, 18, &params));
            assert_eq!(get_ai_mode(&board, 0, 18, &params), AiMode::Standard);
        }
    }

    #[test]
    fn test_killscreen_overrides_everything() {
        // 15 Hz: 5th input on frame 16, too late at level 29
        let params = params_with_taps("X...");
        for (board, lines) in [
            (Board::EMPTY, 0),
            (test_boards::shallow_hole(), 0),
            (Board::EMPTY, 250),
        ] {
            assert_eq!(get_ai_mode(&board, lines, 29, &params), AiMode::Killscreen);
        }
        assert_eq!(get_ai_mode(&Board::EMPTY, 0, 19, &params), AiMode::Standard);
    }

    #[test]
    fn test_missing_tap_lookup_is_not_killscreen() {
        let params = sample_params();
        assert_eq!(get_ai_mode(&Board::EMPTY, 0, 29, &params), AiMode::Standard);
    }

    #[test]
    fn test_near_killscreen_precedes_dig() {
        let params = params_with_taps("X.");
        let board = test_boards::shallow_hole();
        assert_eq!(get_ai_mode(&board, 219, 18, &params), AiMode::Dig);
        assert_eq!(get_ai_mode(&board, 220, 18, &params), AiMode::NearKillscreen);
        assert_eq!(get_ai_mode(&Board::EMPTY, 300, 18, &params), AiMode::NearKillscreen);
    }

    #[test]
    fn test_shallow_hole_warrants_digging() {
        let params = params_with_taps("X.");
        let board = test_boards::shallow_hole();
        assert_eq!(board.first_full_row(3), 13);
        assert!(!board.is_full(15, 3));
        assert!(should_use_dig_mode(&board, 18, &params));
    }

    #[test]
    fn test_deep_hole_outside_tetris_zone_is_left() {
        let params = params_with_taps("X.");
        let board = test_boards::deep_hole();
        assert_eq!(board.first_full_row(3), 10);
        assert!(!board.is_full(16, 3));
        // Empty well: tetris zone is rows 16..=19, which contains the hole.
        assert!(should_use_dig_mode(&board, 18, &params));

        let board = Board::from_ascii(
            "
            ...#......
            ...#......
            ...#......
            ...#......
            ...#......
            ..........
            ...#......
            ...#......
            ...#......
            ...#......
            ",
        );
        assert_eq!(board.first_full_row(3), 10);
        assert!(!board.is_full(15, 3));
        assert!(!should_use_dig_mode(&board, 18, &params));
    }

    #[test]
    fn test_hole_in_tetris_zone() {
        let params = params_with_taps("X.");
        // Well stack starts at row 12, so the tetris zone is rows 8..=11.
        let board = Board::from_ascii(
            "
            #.........
            #.........
            #.........
            #.........
            #.........
            ..........
            #.........
            #.........
            #........#
            #........#
            #........#
            #........#
            #........#
            #........#
            #........#
            #........#
            ",
        );
        assert_eq!(board.first_full_row(0), 4);
        assert_eq!(board.first_full_row(9), 12);
        assert!(!board.is_full(9, 0));
        assert!(should_use_dig_mode(&board, 18, &params));
    }

    #[test]
    fn test_hole_blocking_well() {
        let params = params_with_taps("X.");
        // 0.25 * scare height 8 = 2 rows: a buried hole beside a filled well
        // cell at height 5 blocks the tetris.
        let board = Board::from_ascii(
            "
            #.........
            #.........
            #.........
            #.........
            #.........
            #.........
            .........#
            #........#
            #........#
            #........#
            #........#
            ",
        );
        let hole_row = 15;
        assert!(!board.is_full(hole_row, 0));
        assert!(board.is_full(hole_row, 9));
        assert_eq!(board.first_full_row(0), 9);
        assert!(should_use_dig_mode(&board, 18, &params));

        // Same hole, but the threshold is above its height.
        let mut lenient = params.clone();
        lenient.max_dirty_tetris_height = 1.0;
        assert!(!should_use_dig_mode(&board, 18, &lenient));
    }

    #[test]
    fn test_killscreen_tap_height_boundary() {
        let mut params = sample_params();
        params.max_5_tap_lookup = vec![20; TAP_LOOKUP_LEVELS as usize];
        params.max_5_tap_lookup[18] = KILLSCREEN_MAX_TAP_HEIGHT;
        params.max_5_tap_lookup[19] = KILLSCREEN_MAX_TAP_HEIGHT + 1;

        assert_eq!(get_ai_mode(&Board::EMPTY, 0, 18, &params), AiMode::Killscreen);
        assert_eq!(get_ai_mode(&Board::EMPTY, 0, 19, &params), AiMode::Standard);
    }

    /// Column 3 topped `gap` rows above a hole at row 15, empty well.
    fn board_with_hole_gap(gap: usize) -> Board {
        let mut board = Board::EMPTY;
        for row in (15 - gap)..NUM_ROW {
            if row != 15 {
                board.set_cell(row, 3, Cell::Full);
            }
        }
        board
    }

    #[test]
    fn test_accessible_hole_depth_boundary() {
        let params = params_with_taps("X.");
        for (gap, expected) in [(3, true), (4, false), (6, false)] {
            let board = board_with_hole_gap(gap);
            assert_eq!(board.first_full_row(3), 15 - gap);
            assert!(!board.is_full(15, 3));
            assert_eq!(
                should_use_dig_mode(&board, 18, &params),
                expected,
                "gap {gap}"
            );
        }
    }

    #[test]
    fn test_blocking_well_height_boundary() {
        // 0.25 * scare height 8 = 2 rows, the hole is exactly 2 rows up.
        let board = Board::from_ascii(
            "
            #.........
            #.........
            #.........
            #.........
            .........#
            #........#
            ",
        );
        let hole_row = 18;
        assert!(!board.is_full(hole_row, 0));
        assert!(board.is_full(hole_row, 9));
        assert_eq!(board.first_full_row(0), 14);

        let params = params_with_taps("X.");
        assert!(!should_use_dig_mode(&board, 18, &params));

        let mut strict = params.clone();
        strict.max_dirty_tetris_height = 0.2;
        assert!(should_use_dig_mode(&board, 18, &strict));
    }

    #[test]
    fn test_prepare_params_applies_mode_overrides() {
        let mods = ParamMods::from_json_str(r#"{"DIG": {"HOLE_WEIGHT": -100}}"#).unwrap();
        let timeline = InputFrameTimeline::new("X.").unwrap();
        let state = SearchState::new(test_boards::shallow_hole(), PieceKind::T, None, 18, 10);

        let (mode, params) = prepare_params(&state, &sample_params(), &mods, &timeline);
        assert_eq!(mode, AiMode::Dig);
        assert_eq!(params.weights["HOLE_WEIGHT"], -100.0);
        assert_eq!(params.max_5_tap_height(18), Some(16));
    }
}
