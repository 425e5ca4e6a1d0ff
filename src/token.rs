use crate::{Mark, Scalar, ScalarStyle, Tag};

/// Token types.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
#[non_exhaustive]
pub enum TokenType {
    /// No token has been read yet.
    #[default]
    None,
    /// A STREAM-START token.
    StreamStart,
    /// A STREAM-END token.
    StreamEnd,
    /// A VERSION-DIRECTIVE token.
    VersionDirective,
    /// A TAG-DIRECTIVE token.
    TagDirective,
    /// A DOCUMENT-START token.
    DocumentStart,
    /// A DOCUMENT-END token.
    DocumentEnd,
    /// A BLOCK-SEQUENCE-START token.
    BlockSequenceStart,
    /// A BLOCK-MAPPING-START token.
    BlockMappingStart,
    /// A BLOCK-END token.
    BlockEnd,
    /// A FLOW-SEQUENCE-START token.
    FlowSequenceStart,
    /// A FLOW-SEQUENCE-END token.
    FlowSequenceEnd,
    /// A FLOW-MAPPING-START token.
    FlowMappingStart,
    /// A FLOW-MAPPING-END token.
    FlowMappingEnd,
    /// A BLOCK-ENTRY token.
    BlockEntryStart,
    /// A FLOW-ENTRY token.
    FlowEntryStart,
    /// A KEY token.
    KeyStart,
    /// A VALUE token.
    ValueStart,
    /// An ALIAS token.
    Alias,
    /// An ANCHOR token.
    Anchor,
    /// A TAG token.
    Tag,
    PlainScalar,
    SingleQuotedScalar,
    DoubleQuotedScalar,
    LiteralScalar,
    FoldedScalar,
}

impl TokenType {
    /// The style of a scalar token type.
    pub fn scalar_style(self) -> Option<ScalarStyle> {
        match self {
            TokenType::PlainScalar => Some(ScalarStyle::Plain),
            TokenType::SingleQuotedScalar => Some(ScalarStyle::SingleQuoted),
            TokenType::DoubleQuotedScalar => Some(ScalarStyle::DoubleQuoted),
            TokenType::LiteralScalar => Some(ScalarStyle::Literal),
            TokenType::FoldedScalar => Some(ScalarStyle::Folded),
            _ => None,
        }
    }

    pub fn is_scalar(self) -> bool {
        self.scalar_style().is_some()
    }
}

/// The version directive data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct VersionDirective {
    /// The major version number.
    pub major: i32,
    /// The minor version number.
    pub minor: i32,
}

/// The tag directive data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TagDirective {
    /// The tag handle.
    pub handle: String,
    /// The tag prefix.
    pub prefix: String,
}

/// The payload carried by some tokens.
///
/// Scalars, anchors and aliases carry a [`Scalar`], tags a [`Tag`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenContent {
    Scalar(Scalar),
    Tag(Tag),
    VersionDirective(VersionDirective),
    TagDirective(TagDirective),
}

/// The token structure.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Token {
    /// The token type.
    pub token_type: TokenType,
    /// The beginning of the token.
    pub mark: Mark,
    /// The token payload, if any.
    pub content: Option<TokenContent>,
}

impl Token {
    pub(crate) fn new(token_type: TokenType, mark: Mark) -> Token {
        Token {
            token_type,
            mark,
            content: None,
        }
    }

    pub(crate) fn with_content(token_type: TokenType, mark: Mark, content: TokenContent) -> Token {
        Token {
            token_type,
            mark,
            content: Some(content),
        }
    }

    /// The scalar payload of a scalar, anchor or alias token.
    pub fn scalar(&self) -> Option<&Scalar> {
        match &self.content {
            Some(TokenContent::Scalar(scalar)) => Some(scalar),
            _ => None,
        }
    }

    pub fn tag(&self) -> Option<&Tag> {
        match &self.content {
            Some(TokenContent::Tag(tag)) => Some(tag),
            _ => None,
        }
    }
}
