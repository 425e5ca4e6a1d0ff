/// A read-only cursor over a possibly segmented input buffer.
///
/// The segments are treated as one contiguous stream; a lookahead may span
/// any number of segment boundaries.
#[derive(Clone, Debug)]
pub struct Input<'a> {
    segments: Vec<&'a [u8]>,
    /// Index of the current segment. Equal to `segments.len()` at the end.
    segment: usize,
    /// Position inside the current segment, always in bounds when not at the end.
    pos: usize,
    /// Bytes consumed so far, across all segments.
    consumed: usize,
    /// Readable length: the offset of the first malformed UTF-8 sequence, or
    /// the total length.
    limit: usize,
    utf8_problem: Option<&'static str>,
}

impl<'a> Input<'a> {
    pub fn new(bytes: &'a [u8]) -> Input<'a> {
        Self::from_segments([bytes])
    }

    pub fn from_segments<I>(segments: I) -> Input<'a>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let segments: Vec<&[u8]> = segments
            .into_iter()
            .filter(|segment| !segment.is_empty())
            .collect();
        let total = segments.iter().map(|segment| segment.len()).sum();
        let (limit, utf8_problem) =
            match validate_utf8(segments.iter().flat_map(|segment| segment.iter().copied())) {
                Some((offset, problem)) => (offset, Some(problem)),
                None => (total, None),
            };
        Input {
            segments,
            segment: 0,
            pos: 0,
            consumed: 0,
            limit,
            utf8_problem,
        }
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        if self.consumed >= self.limit {
            return None;
        }
        self.segments
            .get(self.segment)
            .and_then(|bytes| bytes.get(self.pos))
            .copied()
    }

    pub fn peek_at(&self, n: usize) -> Option<u8> {
        if self.consumed + n >= self.limit {
            return None;
        }
        let mut segment = self.segment;
        let mut index = self.pos + n;
        while let Some(bytes) = self.segments.get(segment) {
            if index < bytes.len() {
                return Some(bytes[index]);
            }
            index -= bytes.len();
            segment += 1;
        }
        None
    }

    pub fn starts_with(&self, pattern: &[u8]) -> bool {
        pattern
            .iter()
            .enumerate()
            .all(|(i, byte)| self.peek_at(i) == Some(*byte))
    }

    /// Move the cursor `n` bytes forward, stopping at the end of the input.
    pub fn advance(&mut self, n: usize) {
        let mut n = n.min(self.limit - self.consumed);
        self.consumed += n;
        while n > 0 {
            let Some(bytes) = self.segments.get(self.segment) else {
                return;
            };
            let available = bytes.len() - self.pos;
            if n < available {
                self.pos += n;
                return;
            }
            n -= available;
            self.segment += 1;
            self.pos = 0;
        }
    }

    pub fn is_eof(&self) -> bool {
        self.consumed >= self.limit
    }

    /// The reason reading stopped early, once the cursor has reached a
    /// malformed UTF-8 sequence.
    pub fn utf8_problem(&self) -> Option<&'static str> {
        if self.is_eof() {
            self.utf8_problem
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.segments.iter().map(|segment| segment.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Find the first malformed UTF-8 sequence, returning its offset and what is
/// wrong with it. Overlong forms, surrogates and code points past U+10FFFF are
/// rejected.
fn validate_utf8(bytes: impl Iterator<Item = u8>) -> Option<(usize, &'static str)> {
    let mut start = 0;
    let mut remaining = 0;
    // Allowed range of the next continuation octet.
    let mut range = 0x80..=0xBF;
    for (offset, byte) in bytes.enumerate() {
        if remaining > 0 {
            if !range.contains(&byte) {
                return Some((start, "invalid trailing UTF-8 octet"));
            }
            range = 0x80..=0xBF;
            remaining -= 1;
            continue;
        }
        start = offset;
        (remaining, range) = match byte {
            0x00..=0x7F => continue,
            0xC2..=0xDF => (1, 0x80..=0xBF),
            0xE0 => (2, 0xA0..=0xBF),
            0xE1..=0xEC | 0xEE..=0xEF => (2, 0x80..=0xBF),
            0xED => (2, 0x80..=0x9F),
            0xF0 => (3, 0x90..=0xBF),
            0xF1..=0xF3 => (3, 0x80..=0xBF),
            0xF4 => (3, 0x80..=0x8F),
            _ => return Some((start, "invalid leading UTF-8 octet")),
        };
    }
    if remaining > 0 {
        return Some((start, "incomplete UTF-8 octet sequence"));
    }
    None
}

/// A read-only view of the bytes following the current position.
///
/// Handed to [`TagHook`](crate::TagHook) implementations.
pub struct Lookahead<'r, 'a> {
    pub(crate) input: &'r Input<'a>,
}

impl Lookahead<'_, '_> {
    /// The byte `n` positions ahead, or `None` past the end of the input.
    pub fn peek(&self, n: usize) -> Option<u8> {
        self.input.peek_at(n)
    }

    pub fn starts_with(&self, pattern: &[u8]) -> bool {
        self.input.starts_with(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookahead_spans_segments() {
        let input = Input::from_segments([&b"ab"[..], &b""[..], &b"c"[..], &b"de"[..]]);
        assert_eq!(input.len(), 5);
        assert_eq!(input.peek(), Some(b'a'));
        assert_eq!(input.peek_at(2), Some(b'c'));
        assert_eq!(input.peek_at(4), Some(b'e'));
        assert_eq!(input.peek_at(5), None);
        assert!(input.starts_with(b"abcd"));
        assert!(!input.starts_with(b"abd"));
    }

    #[test]
    fn advance_crosses_segments() {
        let mut input = Input::from_segments([&b"ab"[..], &b"c"[..], &b"de"[..]]);
        input.advance(3);
        assert_eq!(input.peek(), Some(b'd'));
        input.advance(1);
        assert_eq!(input.peek(), Some(b'e'));
        input.advance(10);
        assert!(input.is_eof());
        assert_eq!(input.peek(), None);
    }

    #[test]
    fn malformed_utf8_ends_readable_input() {
        let mut input = Input::new(b"a\xE3\nb");
        assert_eq!(input.peek_at(1), None);
        assert_eq!(input.utf8_problem(), None);
        input.advance(5);
        assert!(input.is_eof());
        assert_eq!(input.utf8_problem(), Some("invalid trailing UTF-8 octet"));

        let input = Input::new(b"\x80");
        assert_eq!(input.utf8_problem(), Some("invalid leading UTF-8 octet"));
        let input = Input::new(b"ab\xF0\x9F");
        assert_eq!(input.peek_at(2), None);
        let input = Input::new(b"\xC0\xAF");
        assert_eq!(input.utf8_problem(), Some("invalid leading UTF-8 octet"));
        let input = Input::new(b"\xED\xA0\x80");
        assert_eq!(input.utf8_problem(), Some("invalid trailing UTF-8 octet"));
    }

    #[test]
    fn utf8_sequence_split_across_segments() {
        let input = Input::from_segments([&b"a\xE2\x98"[..], &b"\xBAb"[..]]);
        assert_eq!(input.utf8_problem(), None);
        assert_eq!(input.peek_at(4), Some(b'b'));

        let mut input = Input::from_segments([&b"a\xE2"[..], &b"b"[..]]);
        input.advance(1);
        assert_eq!(input.utf8_problem(), Some("invalid trailing UTF-8 octet"));
    }

    #[test]
    fn incomplete_sequence_at_end() {
        let mut input = Input::new(b"ab\xF0\x9F");
        input.advance(2);
        assert_eq!(input.utf8_problem(), Some("incomplete UTF-8 octet sequence"));
        assert_eq!(input.peek(), None);
    }

    #[test]
    fn empty_input() {
        let input = Input::new(b"");
        assert!(input.is_empty());
        assert!(input.is_eof());
        assert_eq!(input.peek_at(0), None);
    }
}
