use core::fmt;

/// A node anchor.
///
/// The `id` is assigned by the parser in order of definition, starting at
/// 1, and is what aliases resolve to. Defining the same name again yields a
/// fresh id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Anchor {
    name: String,
    id: i32,
}

impl Anchor {
    pub fn new(name: impl Into<String>, id: i32) -> Anchor {
        Anchor {
            name: name.into(),
            id,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> i32 {
        self.id
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "&{}", self.name)
    }
}
