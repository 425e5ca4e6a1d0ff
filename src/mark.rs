use core::fmt;

/// A position in the input stream.
///
/// Attached to every token, event and error.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mark {
    /// The byte offset from the start of the stream.
    pub offset: u64,
    /// The zero-based line.
    pub line: u32,
    /// The zero-based column, counted in characters.
    pub column: u32,
}

impl Mark {
    pub const fn new(offset: u64, line: u32, column: u32) -> Mark {
        Mark {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}
