use core::fmt;

/// A node tag, as written in the document.
///
/// Tag directives are not applied, so `!!str` is kept as handle `!!` and
/// suffix `str`. A verbatim tag `!<uri>` has an empty handle and the URI as
/// suffix; the non-specific tag `!` has an empty handle and suffix `!`.
/// `!<!>` keeps its verbatim flag and so stays distinct from `!`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tag {
    handle: String,
    suffix: String,
    verbatim: bool,
}

impl Tag {
    pub fn new(handle: impl Into<String>, suffix: impl Into<String>) -> Tag {
        Tag {
            handle: handle.into(),
            suffix: suffix.into(),
            verbatim: false,
        }
    }

    /// A tag written as `!<uri>`.
    pub fn verbatim(uri: impl Into<String>) -> Tag {
        Tag {
            handle: String::new(),
            suffix: uri.into(),
            verbatim: true,
        }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn is_verbatim(&self) -> bool {
        self.verbatim
    }

    /// Is this the non-specific tag `!`?
    pub fn is_non_specific(&self) -> bool {
        !self.verbatim && self.handle.is_empty() && self.suffix == "!"
    }

    /// Compare against the written form, e.g. `tag.is("!!str")`.
    pub fn is(&self, written: &str) -> bool {
        written.len() == self.handle.len() + self.suffix.len()
            && written.starts_with(self.handle.as_str())
            && written.ends_with(self.suffix.as_str())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.handle, self.suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_form() {
        let tag = Tag::new("!!", "str");
        assert_eq!(tag.to_string(), "!!str");
        assert!(tag.is("!!str"));
        assert!(!tag.is("!str"));
        assert!(!tag.is_non_specific());
        assert!(Tag::new("", "!").is_non_specific());
    }

    #[test]
    fn verbatim_bang_is_not_non_specific() {
        let tag = Tag::verbatim("!");
        assert!(tag.is_verbatim());
        assert!(!tag.is_non_specific());
        assert_ne!(tag, Tag::new("", "!"));
        assert_eq!(tag.suffix(), "!");
    }
}
