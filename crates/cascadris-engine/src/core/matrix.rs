use std::fmt;

/// Shape of a piece at one orientation, authored top row first.
///
/// Each row is a run of filled/empty cells. Rows may be ragged: a row only
/// extends as far as its last filled cell, while leading empty cells are kept
/// because they encode the piece's indentation (the overhang of an `L`, for
/// example).
///
/// # Example
///
/// ```
/// use cascadris_engine::PieceMatrix;
///
/// let j = PieceMatrix::parse(&[" #", " #", "##"]);
/// assert_eq!(j.height(), 3);
/// assert_eq!(j.effective_width(), 2);
///
/// let rotated = j.rotated_clockwise();
/// assert_eq!(rotated.to_string(), "#\n###");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PieceMatrix {
    rows: Vec<Vec<bool>>,
}

impl PieceMatrix {
    /// Character marking a filled cell in the text form.
    pub const FILLED: char = '#';

    /// Parses the text form: `'#'` is filled, any other character is empty.
    ///
    /// Trailing empty cells of every row are dropped.
    #[must_use]
    pub fn parse<S>(rows: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        Self::from_rows(
            rows.iter()
                .map(|row| row.as_ref().chars().map(|c| c == Self::FILLED)),
        )
    }

    /// Builds a matrix from rows of filled flags, trimming trailing empties.
    pub fn from_rows<I, R>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = bool>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                let mut row = row.into_iter().collect::<Vec<_>>();
                trim_trailing_empty(&mut row);
                row
            })
            .collect();
        Self { rows }
    }

    /// Number of rows, blank rows included.
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row after trailing empty cells are trimmed.
    #[must_use]
    pub fn effective_width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.rows.iter().map(Vec::as_slice)
    }

    #[must_use]
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// Iterates `(row, col)` of every filled cell, top row first.
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(col, _)| (row, col))
        })
    }

    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.filled_cells().count()
    }

    /// Returns `true` when no cell is filled.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(|filled| !filled))
    }

    /// Rotates 90° clockwise.
    ///
    /// Rows are padded to the widest row, then output row `c` reads source
    /// column `c` from the bottom source row upwards (transpose and reverse).
    /// Trailing empties are trimmed from each output row; leading ones stay.
    #[must_use]
    pub fn rotated_clockwise(&self) -> Self {
        let width = self.effective_width();
        Self::from_rows((0..width).map(|col| {
            self.rows
                .iter()
                .rev()
                .map(move |row| row.get(col).copied().unwrap_or(false))
        }))
    }

    /// Rotates clockwise `quarter_turns` times.
    #[must_use]
    pub fn rotated_clockwise_times(&self, quarter_turns: usize) -> Self {
        (0..quarter_turns % 4).fold(self.clone(), |m, _| m.rotated_clockwise())
    }

    /// Filled cells relative to the bounding box of the filled cells.
    ///
    /// Two matrices with equal patterns look identical on screen even when
    /// their padding differs.
    #[must_use]
    pub fn normalized_pattern(&self) -> Vec<(usize, usize)> {
        let cells = self.filled_cells().collect::<Vec<_>>();
        let min_row = cells.iter().map(|(r, _)| *r).min().unwrap_or(0);
        let min_col = cells.iter().map(|(_, c)| *c).min().unwrap_or(0);
        let mut pattern = cells
            .into_iter()
            .map(|(r, c)| (r - min_row, c - min_col))
            .collect::<Vec<_>>();
        pattern.sort_unstable();
        pattern
    }

    /// Empties one cell, returning whether it was filled.
    pub(crate) fn clear_cell(&mut self, row: usize, col: usize) -> bool {
        let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) else {
            return false;
        };
        let was_filled = *cell;
        *cell = false;
        trim_trailing_empty(&mut self.rows[row]);
        was_filled
    }

    /// Drops fully blank rows from the top and the bottom.
    ///
    /// Returns `(top, bottom)`, the number of rows removed at each end.
    /// Blank rows between filled rows are left in place.
    pub(crate) fn trim_blank_rows(&mut self) -> (usize, usize) {
        let is_blank_row = |row: &Vec<bool>| row.iter().all(|filled| !filled);
        let top = self.rows.iter().take_while(|row| is_blank_row(row)).count();
        self.rows.drain(..top);
        let bottom = self
            .rows
            .iter()
            .rev()
            .take_while(|row| is_blank_row(row))
            .count();
        self.rows.truncate(self.rows.len() - bottom);
        (top, bottom)
    }
}

fn trim_trailing_empty(row: &mut Vec<bool>) {
    let len = row.iter().rposition(|filled| *filled).map_or(0, |i| i + 1);
    row.truncate(len);
}

impl fmt::Display for PieceMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for filled in row {
                let c = if *filled { Self::FILLED } else { ' ' };
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}
