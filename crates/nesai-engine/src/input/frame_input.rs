use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Controller input pressed on a single frame.
///
/// Each variant corresponds to one character of the input-sequence alphabet:
///
/// | char | input |
/// |------|-------|
/// | `.`  | nothing |
/// | `L` / `R` | shift left / right |
/// | `A` / `B` | rotate clockwise / counter-clockwise |
/// | `E` / `F` | shift left and rotate clockwise / counter-clockwise |
/// | `I` / `G` | shift right and rotate clockwise / counter-clockwise |
///
/// Characters outside the alphabet are kept as [`FrameInput::Other`]: they
/// move nothing but still occupy the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum FrameInput {
    Idle,
    Left,
    Right,
    RotateCw,
    RotateCcw,
    LeftCw,
    LeftCcw,
    RightCw,
    RightCcw,
    Other(char),
}

impl FrameInput {
    #[must_use]
    pub const fn from_char(c: char) -> Self {
        match c {
            '.' => FrameInput::Idle,
            'L' => FrameInput::Left,
            'R' => FrameInput::Right,
            'A' => FrameInput::RotateCw,
            'B' => FrameInput::RotateCcw,
            'E' => FrameInput::LeftCw,
            'F' => FrameInput::LeftCcw,
            'I' => FrameInput::RightCw,
            'G' => FrameInput::RightCcw,
            c => FrameInput::Other(c),
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            FrameInput::Idle => '.',
            FrameInput::Left => 'L',
            FrameInput::Right => 'R',
            FrameInput::RotateCw => 'A',
            FrameInput::RotateCcw => 'B',
            FrameInput::LeftCw => 'E',
            FrameInput::LeftCcw => 'F',
            FrameInput::RightCw => 'I',
            FrameInput::RightCcw => 'G',
            FrameInput::Other(c) => c,
        }
    }

    /// Horizontal displacement caused by this input (-1, 0 or +1).
    #[must_use]
    pub const fn shift(self) -> i32 {
        match self {
            FrameInput::Left | FrameInput::LeftCw | FrameInput::LeftCcw => -1,
            FrameInput::Right | FrameInput::RightCw | FrameInput::RightCcw => 1,
            _ => 0,
        }
    }

    /// Rotation caused by this input: +1 clockwise, -1 counter-clockwise.
    #[must_use]
    pub const fn rotation(self) -> i32 {
        match self {
            FrameInput::RotateCw | FrameInput::LeftCw | FrameInput::RightCw => 1,
            FrameInput::RotateCcw | FrameInput::LeftCcw | FrameInput::RightCcw => -1,
            _ => 0,
        }
    }
}

/// Literal per-frame input sequence for one placement, starting at the frame
/// the piece spawns.
///
/// Serializes as the plain character string (e.g. `"E....E...L"`).
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct InputSequence {
    inputs: Vec<FrameInput>,
}

impl InputSequence {
    /// Returns the input on `frame`, or `None` past the end of the sequence.
    #[must_use]
    pub fn get(&self, frame: usize) -> Option<FrameInput> {
        self.inputs.get(frame).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

impl From<&str> for InputSequence {
    fn from(s: &str) -> Self {
        Self {
            inputs: s.chars().map(FrameInput::from_char).collect(),
        }
    }
}

impl From<String> for InputSequence {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<InputSequence> for String {
    fn from(seq: InputSequence) -> Self {
        seq.to_string()
    }
}

impl FromStr for InputSequence {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for InputSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for input in &self.inputs {
            write!(f, "{}", input.as_char())?;
        }
        Ok(())
    }
}
