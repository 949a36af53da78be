pub use self::{board::*, level::*, piece::*};

pub(crate) mod board;
pub(crate) mod level;
pub(crate) mod piece;

/// Number of rows in the playable area.
pub const NUM_ROW: usize = 20;
/// Number of columns in the playable area.
pub const NUM_COLUMN: usize = 10;
