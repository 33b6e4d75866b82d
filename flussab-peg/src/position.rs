use std::fmt;

/// Source location of the input cursor.
///
/// A position is only ever created at the start of an input and moved forward by advancing over
/// input bytes. Moving it backwards is reserved to [`Marker`][crate::Marker], which restores a
/// previously captured position verbatim when a rule fails.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Position {
    offset: usize,
    line: usize,
    column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// The position at the very start of an input.
    pub const fn new() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Number of bytes advanced over since the start of the input.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The source line.
    ///
    /// This follows the convention where the first line is line `1`.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    /// The (byte based) source column.
    ///
    /// Note that for UTF-8 input this can differ from both the number of codepoints as well as the
    /// column when the output is displayed using a monospace font.
    ///
    /// This follows the convention where the first column is column `1`.
    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Moves the position past `bytes`, counting every `'\n'` as a line break.
    #[inline]
    pub(crate) fn advance(&mut self, bytes: &[u8]) {
        self.offset += bytes.len();
        match bytes.iter().rposition(|&byte| byte == b'\n') {
            None => self.column += bytes.len(),
            Some(last) => {
                self.line += bytes.iter().filter(|&&byte| byte == b'\n').count();
                self.column = bytes.len() - last;
            }
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
