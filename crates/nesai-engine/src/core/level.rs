/// Frames per row of fall for levels 0 through 29.
///
/// Levels above 29 keep the level-29 speed.
const GRAVITY_TABLE: [u32; 30] = [
    48, 43, 38, 33, 28, 23, 18, 13, 8, 6, // 0-9
    5, 5, 5, 4, 4, 4, 3, 3, 3, 2, // 10-19
    2, 2, 2, 2, 2, 2, 2, 2, 2, 1, // 20-29
];

/// Returns the number of frames the active piece takes to fall one row at
/// `level`.
///
/// The result is always at least 1.
///
/// # Example
///
/// ```
/// use nesai_engine::gravity;
///
/// assert_eq!(gravity(18), 3);
/// assert_eq!(gravity(19), 2);
/// assert_eq!(gravity(39), 1);
/// ```
#[must_use]
pub fn gravity(level: u32) -> u32 {
    let index = usize::try_from(level).map_or(GRAVITY_TABLE.len() - 1, |level| {
        level.min(GRAVITY_TABLE.len() - 1)
    });
    GRAVITY_TABLE[index]
}
