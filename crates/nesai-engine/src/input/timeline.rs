use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TimelineError {
    #[display("input frame timeline must not be empty")]
    Empty,
    #[display("input frame timeline must contain at least one 'X'")]
    NoInputFrame,
    #[display("invalid character {found:?} at index {index} in input frame timeline")]
    InvalidChar { index: usize, found: char },
}

/// Repeating template of frames on which a new input may be pressed.
///
/// The template is a string over `X` (input allowed) and `.` (no input) that
/// repeats forever from frame 0. `"X."` models a 30 Hz tapper, `"X...."`
/// a 12 Hz one.
///
/// # Example
///
/// ```
/// use nesai_engine::InputFrameTimeline;
///
/// let timeline: InputFrameTimeline = "X..".parse().unwrap();
/// assert!(timeline.is_input_frame(0));
/// assert!(!timeline.is_input_frame(1));
/// assert!(timeline.is_input_frame(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InputFrameTimeline {
    frames: Vec<bool>,
}

impl InputFrameTimeline {
    pub fn new(template: &str) -> Result<Self, TimelineError> {
        let frames = template
            .chars()
            .enumerate()
            .map(|(index, c)| match c {
                'X' => Ok(true),
                '.' => Ok(false),
                found => Err(TimelineError::InvalidChar { index, found }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        if frames.is_empty() {
            return Err(TimelineError::Empty);
        }
        if !frames.contains(&true) {
            return Err(TimelineError::NoInputFrame);
        }
        Ok(Self { frames })
    }

    /// Returns whether an input may be pressed on `frame`.
    #[must_use]
    pub fn is_input_frame(&self, frame: usize) -> bool {
        self.frames[frame % self.frames.len()]
    }

    /// Returns the frame index of the `n`-th input frame (1-based).
    ///
    /// # Panics
    ///
    /// Panics if `n` is 0.
    #[must_use]
    pub fn nth_input_frame(&self, n: usize) -> usize {
        assert!(n > 0, "input frames are counted from 1");
        (0..)
            .filter(|&frame| self.is_input_frame(frame))
            .nth(n - 1)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn period(&self) -> usize {
        self.frames.len()
    }
}

impl FromStr for InputFrameTimeline {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for InputFrameTimeline {
    type Error = TimelineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s)
    }
}

impl From<InputFrameTimeline> for String {
    fn from(timeline: InputFrameTimeline) -> Self {
        timeline.to_string()
    }
}

impl fmt::Display for InputFrameTimeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &allowed in &self.frames {
            write!(f, "{}", if allowed { 'X' } else { '.' })?;
        }
        Ok(())
    }
}
