use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{NUM_COLUMN, NUM_ROW};

/// State of a single board cell.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Cell {
    #[default]
    Empty,
    Full,
}

impl Cell {
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Cell::Empty => '0',
            Cell::Full => '1',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Cell::Empty),
            '1' => Some(Cell::Full),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardParseError {
    #[display("expected {expected} cells, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[display("invalid cell {found:?} at index {index}")]
    InvalidCell { index: usize, found: char },
}

/// Snapshot of the locked cells of the playfield.
///
/// Row 0 is the top of the board and column 0 is the leftmost column. The
/// board is a plain `Copy` value: it is handed from component to component
/// and never edited in place once a [`SearchState`](crate::SearchState) has
/// been built from it.
///
/// # Wire format
///
/// Boards serialize as a 200-character string of `0` (empty) and `1` (full),
/// row-major from the top row, which is the format the console bridge sends.
///
/// # Example
///
/// ```
/// use nesai_engine::Board;
///
/// let board = Board::EMPTY;
/// assert!(board.cell(19, 0).is_empty());
/// assert_eq!(board.first_full_row(0), nesai_engine::NUM_ROW);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Board {
    rows: [[Cell; NUM_COLUMN]; NUM_ROW],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Board {
    pub const EMPTY: Self = Self {
        rows: [[Cell::Empty; NUM_COLUMN]; NUM_ROW],
    };

    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.rows[row][col]
    }

    #[must_use]
    pub fn is_full(&self, row: usize, col: usize) -> bool {
        self.rows[row][col].is_full()
    }

    /// Sets a single cell.
    ///
    /// Only used while assembling a snapshot (parsing, fixtures).
    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        self.rows[row][col] = cell;
    }

    /// Returns the index of the topmost filled cell of `col`, or [`NUM_ROW`]
    /// when the column is empty.
    #[must_use]
    pub fn first_full_row(&self, col: usize) -> usize {
        (0..NUM_ROW)
            .find(|&row| self.is_full(row, col))
            .unwrap_or(NUM_ROW)
    }

    /// Builds a board from ASCII art.
    ///
    /// `#` marks a full cell and `.` an empty one; any other character is
    /// ignored. Rows are aligned to the bottom of the board, so fixtures may
    /// omit the empty rows on top.
    ///
    /// # Panics
    ///
    /// Panics if a row does not have exactly [`NUM_COLUMN`] cells or if there
    /// are more than [`NUM_ROW`] rows.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<Vec<char>> = art
            .lines()
            .map(|line| line.chars().filter(|c| *c == '#' || *c == '.').collect())
            .filter(|chars: &Vec<char>| !chars.is_empty())
            .collect();
        assert!(
            lines.len() <= NUM_ROW,
            "At most {NUM_ROW} rows are allowed, got {}",
            lines.len()
        );

        let mut board = Self::EMPTY;
        let top = NUM_ROW - lines.len();
        for (y, chars) in lines.iter().enumerate() {
            assert_eq!(
                chars.len(),
                NUM_COLUMN,
                "Each row must have exactly {NUM_COLUMN} cells, got {} at row {y}",
                chars.len(),
            );
            for (x, &ch) in chars.iter().enumerate() {
                if ch == '#' {
                    board.set_cell(top + y, x, Cell::Full);
                }
            }
        }
        board
    }
}

impl FromStr for Board {
    type Err = BoardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count = s.chars().count();
        if count != NUM_ROW * NUM_COLUMN {
            return Err(BoardParseError::InvalidLength {
                expected: NUM_ROW * NUM_COLUMN,
                actual: count,
            });
        }

        let mut board = Self::EMPTY;
        for (index, c) in s.chars().enumerate() {
            let cell = Cell::from_char(c).ok_or(BoardParseError::InvalidCell { index, found: c })?;
            board.set_cell(index / NUM_COLUMN, index % NUM_COLUMN, cell);
        }
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for cell in row {
                write!(f, "{}", cell.as_char())?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{")?;
        for row in &self.rows {
            let line: String = row
                .iter()
                .map(|cell| if cell.is_full() { '#' } else { '.' })
                .collect();
            writeln!(f, "    {line}")?;
        }
        write!(f, "}}")
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ascii_aligns_to_bottom() {
        let board = Board::from_ascii(
            "
            #.........
            ##.......#
            ",
        );
        assert!(board.is_full(18, 0));
        assert!(!board.is_full(18, 1));
        assert!(board.is_full(19, 1));
        assert!(board.is_full(19, 9));
        assert_eq!(board.first_full_row(0), 18);
        assert_eq!(board.first_full_row(1), 19);
        assert_eq!(board.first_full_row(5), NUM_ROW);
    }

    #[test]
    fn test_board_serialization() {
        let board = Board::from_ascii("##........");
        let serialized = serde_json::to_string(&board).unwrap();
        let expected = format!("\"{}1100000000\"", "0".repeat(190));
        assert_eq!(serialized, expected);

        let deserialized: Board = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, board);
    }

    #[test]
    fn test_board_parse_errors() {
        assert_eq!(
            "0101".parse::<Board>(),
            Err(BoardParseError::InvalidLength {
                expected: 200,
                actual: 4
            })
        );

        let mut s = "0".repeat(200);
        s.replace_range(7..8, "x");
        assert_eq!(
            s.parse::<Board>(),
            Err(BoardParseError::InvalidCell {
                index: 7,
                found: 'x'
            })
        );
    }
}
