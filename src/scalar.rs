use alloc::borrow::Cow;
use alloc::vec::Vec;
use core::fmt;

/// Scalar styles.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum ScalarStyle {
    /// The plain scalar style.
    #[default]
    Plain,
    /// The single-quoted scalar style.
    SingleQuoted,
    /// The double-quoted scalar style.
    DoubleQuoted,
    /// The literal scalar style.
    Literal,
    /// The folded scalar style.
    Folded,
}

/// The raw bytes of a scalar, anchor or alias.
///
/// The content is kept as scanned and only interpreted on demand: as text
/// with [`Scalar::as_str`], or as a YAML core schema value with the
/// `try_get_*` family.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Scalar {
    buf: Vec<u8>,
}

impl Scalar {
    /// The empty scalar, used for omitted keys and values.
    pub const NULL: Scalar = Scalar { buf: Vec::new() };

    const MIN_CAPACITY: usize = 32;

    pub fn new() -> Scalar {
        Scalar {
            buf: Vec::with_capacity(Self::MIN_CAPACITY),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Scalar {
        let mut scalar = Scalar::new();
        scalar.extend_from_slice(bytes);
        scalar
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn push(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append `ch` encoded as UTF-8.
    pub fn push_char(&mut self, ch: char) {
        let mut encoded = [0; 4];
        self.buf
            .extend_from_slice(ch.encode_utf8(&mut encoded).as_bytes());
    }

    pub(crate) fn append(&mut self, other: &mut Scalar) {
        self.buf.append(&mut other.buf);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Byte-wise equality, without decoding.
    pub fn is_equal(&self, other: &[u8]) -> bool {
        self.buf == other
    }

    /// The content as text, or `None` if it is not valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.buf).ok()
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.buf)
    }

    /// `~`, `null`, `Null`, `NULL` or empty.
    pub fn is_null(&self) -> bool {
        matches!(self.buf.as_slice(), b"" | b"~" | b"null" | b"Null" | b"NULL")
    }

    pub fn try_get_bool(&self) -> Option<bool> {
        match self.buf.as_slice() {
            b"true" | b"True" | b"TRUE" => Some(true),
            b"false" | b"False" | b"FALSE" => Some(false),
            _ => None,
        }
    }

    pub fn try_get_i32(&self) -> Option<i32> {
        self.try_get_i64().and_then(|value| i32::try_from(value).ok())
    }

    pub fn try_get_i64(&self) -> Option<i64> {
        let (negative, magnitude) = parse_integer(&self.buf)?;
        let value = i128::from(magnitude);
        i64::try_from(if negative { -value } else { value }).ok()
    }

    pub fn try_get_u32(&self) -> Option<u32> {
        self.try_get_u64().and_then(|value| u32::try_from(value).ok())
    }

    pub fn try_get_u64(&self) -> Option<u64> {
        match parse_integer(&self.buf)? {
            (false, magnitude) | (true, magnitude @ 0) => Some(magnitude),
            (true, _) => None,
        }
    }

    pub fn try_get_f32(&self) -> Option<f32> {
        self.try_get_f64().map(|value| value as f32)
    }

    pub fn try_get_f64(&self) -> Option<f64> {
        let bytes = self.buf.as_slice();
        let unsigned = match bytes {
            [b'-' | b'+', rest @ ..] => rest,
            _ => bytes,
        };
        match unsigned {
            b".inf" | b".Inf" | b".INF" => {
                return Some(if bytes[0] == b'-' {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                });
            }
            b".nan" | b".NaN" | b".NAN" if unsigned.len() == bytes.len() => return Some(f64::NAN),
            _ => {}
        }
        if is_float_literal(unsigned) {
            return self.as_str()?.parse().ok();
        }
        self.try_get_i64().map(|value| value as f64)
    }
}

/// Sign and magnitude of a YAML core schema integer: optional sign, then
/// decimal digits, `0x` hexadecimal or `0o` octal.
fn parse_integer(bytes: &[u8]) -> Option<(bool, u64)> {
    let (negative, unsigned) = match bytes {
        [b'-', rest @ ..] => (true, rest),
        [b'+', rest @ ..] => (false, rest),
        _ => (false, bytes),
    };
    let (radix, digits) = match unsigned {
        [b'0', b'x', rest @ ..] => (16, rest),
        [b'0', b'o', rest @ ..] => (8, rest),
        _ => (10, unsigned),
    };
    if digits.is_empty() {
        return None;
    }
    let mut value: u64 = 0;
    for &digit in digits {
        let digit = match digit {
            b'0'..=b'9' => u64::from(digit - b'0'),
            b'a'..=b'f' => u64::from(digit - b'a') + 10,
            b'A'..=b'F' => u64::from(digit - b'A') + 10,
            _ => return None,
        };
        if digit >= radix {
            return None;
        }
        value = value.checked_mul(radix)?.checked_add(digit)?;
    }
    Some((negative, value))
}

/// `(\.[0-9]+|[0-9]+(\.[0-9]*)?)([eE][-+]?[0-9]+)?`
fn is_float_literal(bytes: &[u8]) -> bool {
    fn digits(bytes: &[u8]) -> usize {
        bytes.iter().take_while(|b| b.is_ascii_digit()).count()
    }

    let integral = digits(bytes);
    let mut rest = &bytes[integral..];
    let mut fraction = 0;
    if let [b'.', tail @ ..] = rest {
        fraction = digits(tail);
        rest = &tail[fraction..];
    } else if integral == 0 {
        return false;
    }
    if integral == 0 && fraction == 0 {
        return false;
    }
    match rest {
        [] => true,
        [b'e' | b'E', tail @ ..] => {
            let tail = match tail {
                [b'-' | b'+', tail @ ..] => tail,
                _ => tail,
            };
            !tail.is_empty() && digits(tail) == tail.len()
        }
        _ => false,
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_string_lossy(), f)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::from_bytes(value.as_bytes())
    }
}

/// Recycles scalar buffers between tokens.
///
/// Owned by a single tokenizer; never shared between parses.
#[derive(Debug, Default)]
pub struct ScalarPool {
    free: Vec<Scalar>,
}

impl ScalarPool {
    const MAX_POOLED: usize = 64;

    pub fn new() -> ScalarPool {
        ScalarPool::default()
    }

    pub fn rent(&mut self) -> Scalar {
        self.free.pop().unwrap_or_else(Scalar::new)
    }

    pub fn give_back(&mut self, mut scalar: Scalar) {
        if scalar.capacity() == 0 || self.free.len() >= Self::MAX_POOLED {
            return;
        }
        scalar.clear();
        self.free.push(scalar);
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }
}
