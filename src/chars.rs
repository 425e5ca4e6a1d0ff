//! Character classes over raw input bytes.
//!
//! `None` stands for the end of the stream, so that `is_breakz` and friends
//! can be applied directly to a lookahead.

pub(crate) fn is_alpha(ch: impl Into<Option<u8>>) -> bool {
    matches!(ch.into(), Some(b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z' | b'_' | b'-'))
}

pub(crate) fn is_digit(ch: impl Into<Option<u8>>) -> bool {
    matches!(ch.into(), Some(b'0'..=b'9'))
}

pub(crate) fn is_hex(ch: impl Into<Option<u8>>) -> bool {
    matches!(ch.into(), Some(b'0'..=b'9' | b'A'..=b'F' | b'a'..=b'f'))
}

pub(crate) fn as_hex(ch: u8) -> u32 {
    match ch {
        b'A'..=b'F' => u32::from(ch - b'A') + 10,
        b'a'..=b'f' => u32::from(ch - b'a') + 10,
        _ => u32::from(ch.wrapping_sub(b'0')),
    }
}

pub(crate) fn is_space(ch: impl Into<Option<u8>>) -> bool {
    ch.into() == Some(b' ')
}

pub(crate) fn is_tab(ch: impl Into<Option<u8>>) -> bool {
    ch.into() == Some(b'\t')
}

pub(crate) fn is_blank(ch: impl Into<Option<u8>>) -> bool {
    let ch = ch.into();
    is_space(ch) || is_tab(ch)
}

/// Only CR and LF are line breaks in YAML 1.2.
pub(crate) fn is_break(ch: impl Into<Option<u8>>) -> bool {
    matches!(ch.into(), Some(b'\r' | b'\n'))
}

pub(crate) fn is_breakz(ch: impl Into<Option<u8>>) -> bool {
    let ch = ch.into();
    is_break(ch) || ch.is_none()
}

pub(crate) fn is_blankz(ch: impl Into<Option<u8>>) -> bool {
    let ch = ch.into();
    is_blank(ch) || is_breakz(ch)
}

pub(crate) fn is_flow_indicator(ch: impl Into<Option<u8>>) -> bool {
    matches!(ch.into(), Some(b',' | b'[' | b']' | b'{' | b'}'))
}

/// Characters allowed in a tag URI besides alphanumerics, `-` and `_`.
pub(crate) fn is_uri_char(ch: impl Into<Option<u8>>, flow_chars: bool) -> bool {
    match ch.into() {
        Some(
            b';' | b'/' | b'?' | b':' | b'@' | b'&' | b'=' | b'+' | b'$' | b'.' | b'%' | b'!'
            | b'~' | b'*' | b'\'' | b'(' | b')',
        ) => true,
        Some(b',' | b'[' | b']') => flow_chars,
        ch => is_alpha(ch),
    }
}

/// The number of bytes in the UTF-8 sequence introduced by `lead`.
///
/// The input is validated before scanning, so `lead` always starts a
/// well-formed sequence.
pub(crate) fn utf8_width(lead: u8) -> usize {
    if lead & 0x80 == 0x00 {
        1
    } else if lead & 0xE0 == 0xC0 {
        2
    } else if lead & 0xF0 == 0xE0 {
        3
    } else if lead & 0xF8 == 0xF0 {
        4
    } else {
        1
    }
}

pub(crate) const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes() {
        assert!(is_blankz(None));
        assert!(is_blankz(b'\t'));
        assert!(!is_blankz(b'a'));
        assert!(is_breakz(b'\r'));
        assert!(!is_break(0x85));
        assert!(is_alpha(b'-'));
        assert!(!is_alpha(b'.'));
        assert!(is_uri_char(b'[', true));
        assert!(!is_uri_char(b'[', false));
    }

    #[test]
    fn widths() {
        assert_eq!(utf8_width(b'a'), 1);
        assert_eq!(utf8_width(0xC2), 2);
        assert_eq!(utf8_width(0xEF), 3);
        assert_eq!(utf8_width(0xF0), 4);
        assert_eq!(utf8_width(0x80), 1);
        assert_eq!(as_hex(b'f'), 15);
        assert_eq!(as_hex(b'C'), 12);
    }
}
