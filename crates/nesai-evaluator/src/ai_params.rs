//! Tuning parameters handed to the move evaluator.
//!
//! The precompute layer treats almost all of [`AiParams`] as opaque: the
//! scoring weights are carried through in [`AiParams::weights`] and only the
//! board-height thresholds are read, by the posture classifier in
//! [`crate::ai_mode`].
//!
//! Both types deserialize from the JSON shape used by the tuning files, where
//! field names are upper snake case:
//!
//! ```json
//! {
//!   "SCARE_HEIGHT_18": 7,
//!   "SCARE_HEIGHT_19": 5,
//!   "SCARE_HEIGHT_29": 0,
//!   "MAX_DIRTY_TETRIS_HEIGHT": 0.25,
//!   "HOLE_WEIGHT": -40
//! }
//! ```

use std::collections::BTreeMap;

use nesai_engine::{InputFrameTimeline, NUM_ROW, gravity};
use serde::{Deserialize, Serialize};

use crate::ai_mode::AiMode;

/// Levels covered by [`AiParams::with_tap_info`].
pub const TAP_LOOKUP_LEVELS: u32 = 40;

/// Number of taps a "5-tap" needs (spawn column to the wall for most pieces).
const TAPS_FOR_WALL: usize = 5;

/// Rows a spawned piece needs above the stack to still be shifted sideways.
const PIECE_CLEARANCE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AiParams {
    pub scare_height_18: f32,
    pub scare_height_19: f32,
    pub scare_height_29: f32,
    /// Fraction of the scare height above which a hole under the well is
    /// treated as blocking the next tetris.
    pub max_dirty_tetris_height: f32,
    /// Highest stack (in rows) from which a 5-tap still reaches the wall,
    /// indexed by level.
    #[serde(default, rename = "MAX_5_TAP_LOOKUP")]
    pub max_5_tap_lookup: Vec<u32>,
    /// Evaluator weights, opaque to this crate.
    #[serde(flatten)]
    pub weights: BTreeMap<String, f32>,
}

impl AiParams {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Returns the scare height for `level`'s speed bracket.
    #[must_use]
    pub fn scare_height(&self, level: u32) -> f32 {
        if level >= 29 {
            self.scare_height_29
        } else if level >= 19 {
            self.scare_height_19
        } else {
            self.scare_height_18
        }
    }

    #[must_use]
    pub fn max_5_tap_height(&self, level: u32) -> Option<u32> {
        let level = usize::try_from(level).ok()?;
        self.max_5_tap_lookup.get(level).copied()
    }

    /// Completes the 5-tap lookup for the given input cadence.
    ///
    /// Entries already present are kept, so a tuning file can pin the value
    /// for individual levels.
    #[must_use]
    pub fn with_tap_info(mut self, timeline: &InputFrameTimeline) -> Self {
        let start = u32::try_from(self.max_5_tap_lookup.len()).unwrap_or(TAP_LOOKUP_LEVELS);
        self.max_5_tap_lookup
            .extend((start..TAP_LOOKUP_LEVELS).map(|level| max_5_tap_height(level, timeline)));
        self
    }

    /// Returns a copy with the weight overrides for `mode` applied.
    #[must_use]
    pub fn modified_for_mode(&self, mode: AiMode, mods: &ParamMods) -> Self {
        let mut params = self.clone();
        if let Some(overrides) = mods.overrides_for(mode) {
            for (name, value) in overrides {
                params.weights.insert(name.clone(), *value);
            }
        }
        params
    }
}

/// Highest stack height from which a piece can still receive
/// [`TAPS_FOR_WALL`] inputs before falling onto the stack.
///
/// # Example
///
/// ```
/// use nesai_engine::InputFrameTimeline;
/// use nesai_evaluator::ai_params::max_5_tap_height;
///
/// let hz30 = InputFrameTimeline::new("X.").unwrap();
/// let hz15 = InputFrameTimeline::new("X...").unwrap();
/// assert_eq!(max_5_tap_height(29, &hz30), 10);
/// assert_eq!(max_5_tap_height(29, &hz15), 2);
/// ```
#[must_use]
pub fn max_5_tap_height(level: u32, timeline: &InputFrameTimeline) -> u32 {
    let last_tap_frame = u32::try_from(timeline.nth_input_frame(TAPS_FOR_WALL)).unwrap_or(u32::MAX);
    let rows_fallen = last_tap_frame / gravity(level);
    #[expect(clippy::cast_possible_truncation)]
    let num_row = NUM_ROW as u32;
    num_row.saturating_sub(rows_fallen.saturating_add(PIECE_CLEARANCE))
}

/// Per-posture weight overrides.
///
/// Each map replaces the named weights of [`AiParams::weights`] when the
/// classifier selects that posture. Standard play uses the weights as given.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ParamMods {
    #[serde(default)]
    pub dig: BTreeMap<String, f32>,
    #[serde(default)]
    pub near_killscreen: BTreeMap<String, f32>,
    #[serde(default)]
    pub killscreen: BTreeMap<String, f32>,
}

impl ParamMods {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn overrides_for(&self, mode: AiMode) -> Option<&BTreeMap<String, f32>> {
        match mode {
            AiMode::Standard => None,
            AiMode::Dig => Some(&self.dig),
            AiMode::NearKillscreen => Some(&self.near_killscreen),
            AiMode::Killscreen => Some(&self.killscreen),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_params() -> AiParams {
        AiParams::from_json_str(
            r#"{
                "SCARE_HEIGHT_18": 8,
                "SCARE_HEIGHT_19": 6,
                "SCARE_HEIGHT_29": 2,
                "MAX_DIRTY_TETRIS_HEIGHT": 0.25,
                "HOLE_WEIGHT": -40,
                "SURFACE_WEIGHT": 1.5
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_params() {
        let params = sample_params();
        assert!((params.max_dirty_tetris_height - 0.25).abs() < f32::EPSILON);
        assert!(params.max_5_tap_lookup.is_empty());
        assert_eq!(params.weights.len(), 2);
        assert_eq!(params.weights["HOLE_WEIGHT"], -40.0);
    }

    #[test]
    fn test_scare_height_brackets() {
        let params = sample_params();
        assert_eq!(params.scare_height(0), 8.0);
        assert_eq!(params.scare_height(18), 8.0);
        assert_eq!(params.scare_height(19), 6.0);
        assert_eq!(params.scare_height(28), 6.0);
        assert_eq!(params.scare_height(29), 2.0);
    }

    #[test]
    fn test_tap_info_keeps_pinned_levels() {
        let timeline = InputFrameTimeline::new("X.").unwrap();
        let mut params = sample_params();
        params.max_5_tap_lookup = vec![1, 2];

        let params = params.with_tap_info(&timeline);
        assert_eq!(params.max_5_tap_lookup.len(), TAP_LOOKUP_LEVELS as usize);
        assert_eq!(params.max_5_tap_height(0), Some(1));
        assert_eq!(params.max_5_tap_height(1), Some(2));
        // 5th input on frame 8, 3 frames per row at level 18
        assert_eq!(params.max_5_tap_height(18), Some(16));
        assert_eq!(params.max_5_tap_height(19), Some(14));
        assert_eq!(params.max_5_tap_height(TAP_LOOKUP_LEVELS), None);
    }

    #[test]
    fn test_slow_cadence_collapses_at_29() {
        let timeline = InputFrameTimeline::new("X.....").unwrap();
        assert_eq!(max_5_tap_height(29, &timeline), 0);
        assert_eq!(max_5_tap_height(18, &timeline), 10);
    }

    #[test]
    fn test_modified_for_mode() {
        let params = sample_params();
        let mods = ParamMods::from_json_str(r#"{"DIG": {"HOLE_WEIGHT": -100, "BURN_WEIGHT": 0}}"#)
            .unwrap();

        let dig = params.modified_for_mode(AiMode::Dig, &mods);
        assert_eq!(dig.weights["HOLE_WEIGHT"], -100.0);
        assert_eq!(dig.weights["BURN_WEIGHT"], 0.0);
        assert_eq!(dig.weights["SURFACE_WEIGHT"], 1.5);

        assert_eq!(params.modified_for_mode(AiMode::Standard, &mods), params);
        assert_eq!(params.modified_for_mode(AiMode::Killscreen, &mods), params);
    }
}
