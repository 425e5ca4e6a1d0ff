use core::fmt;

use crate::chars::{is_blank, is_blankz};
use crate::Lookahead;

/// A hook run right after a tag or anchor property has been scanned.
///
/// It inspects the upcoming bytes and returns how many of them the tokenizer
/// should skip, which lets callers accept vendor-specific markers without
/// teaching the grammar about them. Returning 0 leaves the input untouched.
/// The tokenizer never skips past a line break, whatever the hook returns.
pub trait TagHook: Send {
    fn skip_after_property(&self, ahead: &Lookahead<'_, '_>) -> usize;
}

/// Skips the ` stripped` marker that some game engines write after the
/// node properties of a document, as in `--- !u!1 &100 stripped`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrippedMarker;

impl TagHook for StrippedMarker {
    fn skip_after_property(&self, ahead: &Lookahead<'_, '_>) -> usize {
        const MARKER: &[u8] = b"stripped";

        let mut blanks = 0;
        while is_blank(ahead.peek(blanks)) {
            blanks += 1;
        }
        if blanks == 0 {
            return 0;
        }
        let matches = MARKER
            .iter()
            .enumerate()
            .all(|(i, byte)| ahead.peek(blanks + i) == Some(*byte));
        if matches && is_blankz(ahead.peek(blanks + MARKER.len())) {
            blanks + MARKER.len()
        } else {
            0
        }
    }
}

/// Tokenizer and parser configuration.
pub struct Options {
    /// How many bytes a simple key candidate may stay unconfirmed before it
    /// is considered stale.
    pub simple_key_window: u64,
    /// Optional hook run after tags and anchors.
    pub tag_hook: Option<Box<dyn TagHook>>,
}

impl Options {
    pub const DEFAULT_SIMPLE_KEY_WINDOW: u64 = 1024;

    pub fn new() -> Options {
        Options::default()
    }

    #[must_use]
    pub fn simple_key_window(mut self, window: u64) -> Options {
        self.simple_key_window = window;
        self
    }

    #[must_use]
    pub fn tag_hook(mut self, hook: impl TagHook + 'static) -> Options {
        self.tag_hook = Some(Box::new(hook));
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Options {
            simple_key_window: Self::DEFAULT_SIMPLE_KEY_WINDOW,
            tag_hook: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("simple_key_window", &self.simple_key_window)
            .field("tag_hook", &self.tag_hook.as_ref().map(|_| ".."))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Input;

    fn skipped(text: &str) -> usize {
        let input = Input::new(text.as_bytes());
        StrippedMarker.skip_after_property(&Lookahead { input: &input })
    }

    #[test]
    fn stripped_marker() {
        assert_eq!(skipped(" stripped\n"), 9);
        assert_eq!(skipped("  stripped"), 10);
        assert_eq!(skipped(" strippedx"), 0);
        assert_eq!(skipped("stripped"), 0);
        assert_eq!(skipped(" value"), 0);
    }

    #[test]
    fn builder() {
        let options = Options::new().simple_key_window(16).tag_hook(StrippedMarker);
        assert_eq!(options.simple_key_window, 16);
        assert!(options.tag_hook.is_some());
        assert_eq!(
            Options::default().simple_key_window,
            Options::DEFAULT_SIMPLE_KEY_WINDOW
        );
    }
}
