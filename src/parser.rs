use std::collections::HashMap;

use log::{debug, trace};

use crate::reader::Input;
use crate::{
    Anchor, Mark, Options, ParserError, Scalar, ScalarStyle, Tag, TokenContent, TokenType,
    Tokenizer,
};

/// The type of the current parse event.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
pub enum ParseEventType {
    /// Nothing has been read yet.
    #[default]
    Nothing,
    StreamStart,
    StreamEnd,
    DocumentStart,
    DocumentEnd,
    /// An alias to an anchored node.
    Alias,
    Scalar,
    SequenceStart,
    SequenceEnd,
    MappingStart,
    MappingEnd,
}

/// The states of the parser.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
enum ParserState {
    /// Expect STREAM-START.
    #[default]
    StreamStart,
    /// Expect the beginning of an implicit document.
    ImplicitDocumentStart,
    /// Expect DOCUMENT-START.
    DocumentStart,
    /// Expect the content of a document.
    DocumentContent,
    /// Expect DOCUMENT-END.
    DocumentEnd,
    /// Expect a block node.
    BlockNode,
    /// Expect the first entry of a block sequence.
    BlockSequenceFirstEntry,
    /// Expect an entry of a block sequence.
    BlockSequenceEntry,
    /// Expect an entry of an indentless sequence.
    IndentlessSequenceEntry,
    /// Expect the first key of a block mapping.
    BlockMappingFirstKey,
    /// Expect a block mapping key.
    BlockMappingKey,
    /// Expect a block mapping value.
    BlockMappingValue,
    /// Expect the first entry of a flow sequence.
    FlowSequenceFirstEntry,
    /// Expect an entry of a flow sequence.
    FlowSequenceEntry,
    /// Expect a key of an ordered mapping.
    FlowSequenceEntryMappingKey,
    /// Expect a value of an ordered mapping.
    FlowSequenceEntryMappingValue,
    /// Expect the end of an ordered mapping entry.
    FlowSequenceEntryMappingEnd,
    /// Expect the first key of a flow mapping.
    FlowMappingFirstKey,
    /// Expect a key of a flow mapping.
    FlowMappingKey,
    /// Expect a value of a flow mapping.
    FlowMappingValue,
    /// Expect an empty value of a flow mapping.
    FlowMappingEmptyValue,
    /// Expect nothing.
    End,
}

/// The pull parser.
///
/// Each call to [`Parser::read`] advances to the next event. The payload of
/// the current event is available through the accessors until the next
/// call.
///
/// ```
/// use yaml_reader::{ParseEventType, Parser};
///
/// let mut parser = Parser::new(b"answer: 42");
/// parser.skip_header().unwrap();
/// parser.read_with_verify(ParseEventType::MappingStart).unwrap();
/// assert_eq!(parser.read_scalar_as_string().unwrap().as_deref(), Some("answer"));
/// assert_eq!(parser.read_scalar_as_i64().unwrap(), 42);
/// assert_eq!(parser.current_event_type(), ParseEventType::MappingEnd);
/// ```
pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    /// The parser states stack.
    states: Vec<ParserState>,
    /// The current parser state.
    state: ParserState,
    /// The start marks of the open collections.
    marks: Vec<Mark>,
    /// Anchor names to node ids.
    anchors: HashMap<String, i32>,
    last_anchor_id: i32,
    current_event_type: ParseEventType,
    current_mark: Mark,
    current_scalar: Option<Scalar>,
    current_scalar_style: ScalarStyle,
    current_tag: Option<Tag>,
    current_anchor: Option<Anchor>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a [u8]) -> Parser<'a> {
        Self::with_options(Input::new(input), Options::default())
    }

    pub fn from_segments<I>(segments: I) -> Parser<'a>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        Self::with_options(Input::from_segments(segments), Options::default())
    }

    pub fn with_options(input: Input<'a>, options: Options) -> Parser<'a> {
        Parser {
            tokenizer: Tokenizer::with_options(input, options),
            states: Vec::with_capacity(16),
            state: ParserState::default(),
            marks: Vec::with_capacity(16),
            anchors: HashMap::new(),
            last_anchor_id: 0,
            current_event_type: ParseEventType::Nothing,
            current_mark: Mark::default(),
            current_scalar: None,
            current_scalar_style: ScalarStyle::Plain,
            current_tag: None,
            current_anchor: None,
        }
    }

    /// Advance to the next event.
    ///
    /// Returns `Ok(false)` only when the current event already is
    /// [`ParseEventType::StreamEnd`].
    pub fn read(&mut self) -> Result<bool, ParserError> {
        if self.current_event_type == ParseEventType::StreamEnd {
            return Ok(false);
        }
        if let Some(scalar) = self.current_scalar.take() {
            self.tokenizer.recycle_scalar(scalar);
        }
        self.current_tag = None;
        self.current_anchor = None;
        self.state_machine()?;
        trace!("{:?} at {}", self.current_event_type, self.current_mark);
        Ok(true)
    }

    pub fn current_event_type(&self) -> ParseEventType {
        self.current_event_type
    }

    pub fn current_mark(&self) -> Mark {
        self.current_mark
    }

    /// Is the stream end the current event?
    pub fn end(&self) -> bool {
        self.current_event_type == ParseEventType::StreamEnd
    }

    /// The style of the current scalar, if the current event is one.
    pub fn current_scalar_style(&self) -> Option<ScalarStyle> {
        self.current_scalar
            .as_ref()
            .map(|_| self.current_scalar_style)
    }

    /// Is the current event a plain scalar spelled as null, or an omitted
    /// node?
    pub fn is_null_scalar(&self) -> bool {
        self.plain_scalar().is_some_and(Scalar::is_null)
    }

    pub fn try_get_scalar_as_bytes(&self) -> Option<&[u8]> {
        self.current_scalar.as_ref().map(Scalar::as_bytes)
    }

    pub fn try_get_scalar_as_str(&self) -> Option<&str> {
        self.current_scalar.as_ref().and_then(Scalar::as_str)
    }

    pub fn try_get_scalar_as_bool(&self) -> Option<bool> {
        self.plain_scalar().and_then(Scalar::try_get_bool)
    }

    pub fn try_get_scalar_as_i32(&self) -> Option<i32> {
        self.plain_scalar().and_then(Scalar::try_get_i32)
    }

    pub fn try_get_scalar_as_i64(&self) -> Option<i64> {
        self.plain_scalar().and_then(Scalar::try_get_i64)
    }

    pub fn try_get_scalar_as_u32(&self) -> Option<u32> {
        self.plain_scalar().and_then(Scalar::try_get_u32)
    }

    pub fn try_get_scalar_as_u64(&self) -> Option<u64> {
        self.plain_scalar().and_then(Scalar::try_get_u64)
    }

    pub fn try_get_scalar_as_f32(&self) -> Option<f32> {
        self.plain_scalar().and_then(Scalar::try_get_f32)
    }

    pub fn try_get_scalar_as_f64(&self) -> Option<f64> {
        self.plain_scalar().and_then(Scalar::try_get_f64)
    }

    /// The tag of the current node.
    pub fn try_get_current_tag(&self) -> Option<&Tag> {
        self.current_tag.as_ref()
    }

    /// The anchor defined on the current node, or the anchor an alias
    /// refers to.
    pub fn try_get_current_anchor(&self) -> Option<&Anchor> {
        self.current_anchor.as_ref()
    }

    /// Only plain scalars are subject to null, bool and number resolution.
    fn plain_scalar(&self) -> Option<&Scalar> {
        match self.current_scalar_style {
            ScalarStyle::Plain => self.current_scalar.as_ref(),
            _ => None,
        }
    }

    /// Check that the current event is `expected`, then advance.
    pub fn read_with_verify(&mut self, expected: ParseEventType) -> Result<(), ParserError> {
        self.verify(expected)?;
        self.read()?;
        Ok(())
    }

    fn verify(&self, expected: ParseEventType) -> Result<(), ParserError> {
        if self.current_event_type == expected {
            Ok(())
        } else {
            Err(ParserError::UnexpectedEvent {
                expected,
                found: self.current_event_type,
                mark: self.current_mark,
            })
        }
    }

    /// Skip the current node: a scalar, an alias, or a whole sequence or
    /// mapping including its contents. On any other event this just
    /// advances.
    pub fn skip_current_node(&mut self) -> Result<(), ParserError> {
        match self.current_event_type {
            ParseEventType::SequenceStart | ParseEventType::MappingStart => {
                let mut depth = 0usize;
                loop {
                    match self.current_event_type {
                        ParseEventType::SequenceStart | ParseEventType::MappingStart => depth += 1,
                        ParseEventType::SequenceEnd | ParseEventType::MappingEnd => depth -= 1,
                        _ => {}
                    }
                    if !self.read()? || depth == 0 {
                        return Ok(());
                    }
                }
            }
            _ => {
                self.read()?;
                Ok(())
            }
        }
    }

    /// Advance past the next event of type `event_type`.
    pub fn skip_after(&mut self, event_type: ParseEventType) -> Result<(), ParserError> {
        while self.current_event_type != event_type {
            if !self.read()? {
                return Ok(());
            }
        }
        self.read()?;
        Ok(())
    }

    /// Advance past the stream and document start events.
    pub fn skip_header(&mut self) -> Result<(), ParserError> {
        while matches!(
            self.current_event_type,
            ParseEventType::Nothing | ParseEventType::StreamStart | ParseEventType::DocumentStart
        ) {
            if !self.read()? {
                break;
            }
        }
        Ok(())
    }

    /// Read the current scalar as a string, `None` for null, and advance.
    pub fn read_scalar_as_string(&mut self) -> Result<Option<String>, ParserError> {
        self.verify(ParseEventType::Scalar)?;
        let value = if self.is_null_scalar() {
            None
        } else {
            match self.try_get_scalar_as_str() {
                Some(text) => Some(String::from(text)),
                None => return self.scalar_error("found a scalar that is not valid UTF-8"),
            }
        };
        self.read()?;
        Ok(value)
    }

    pub fn read_scalar_as_bool(&mut self) -> Result<bool, ParserError> {
        self.verify(ParseEventType::Scalar)?;
        let Some(value) = self.try_get_scalar_as_bool() else {
            return self.scalar_error("found a scalar that is not a boolean");
        };
        self.read()?;
        Ok(value)
    }

    pub fn read_scalar_as_i64(&mut self) -> Result<i64, ParserError> {
        self.verify(ParseEventType::Scalar)?;
        let Some(value) = self.try_get_scalar_as_i64() else {
            return self.scalar_error("found a scalar that is not an integer");
        };
        self.read()?;
        Ok(value)
    }

    pub fn read_scalar_as_f64(&mut self) -> Result<f64, ParserError> {
        self.verify(ParseEventType::Scalar)?;
        let Some(value) = self.try_get_scalar_as_f64() else {
            return self.scalar_error("found a scalar that is not a number");
        };
        self.read()?;
        Ok(value)
    }

    fn scalar_error<T>(&self, problem: &'static str) -> Result<T, ParserError> {
        Err(ParserError::Problem {
            problem,
            mark: self.current_mark,
        })
    }

    fn set_parser_error<T>(problem: &'static str, mark: Mark) -> Result<T, ParserError> {
        Err(ParserError::Problem { problem, mark })
    }

    fn set_parser_error_context<T>(
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        mark: Mark,
    ) -> Result<T, ParserError> {
        Err(ParserError::ProblemWithContext {
            context,
            context_mark,
            problem,
            mark,
        })
    }

    fn peek(&self) -> TokenType {
        self.tokenizer.current_token_type()
    }

    fn peek_mark(&self) -> Mark {
        self.tokenizer.current_mark()
    }

    fn skip_token(&mut self) -> Result<(), ParserError> {
        self.tokenizer.read()?;
        Ok(())
    }

    fn emit(&mut self, event_type: ParseEventType, mark: Mark) {
        self.current_event_type = event_type;
        self.current_mark = mark;
    }

    fn pop_state(&mut self) {
        self.state = self.states.pop().unwrap_or(ParserState::End);
    }

    fn pop_mark(&mut self) -> Mark {
        self.marks.pop().unwrap_or_default()
    }

    fn state_machine(&mut self) -> Result<(), ParserError> {
        match self.state {
            ParserState::StreamStart => self.parse_stream_start(),
            ParserState::ImplicitDocumentStart => self.parse_document_start(true),
            ParserState::DocumentStart => self.parse_document_start(false),
            ParserState::DocumentContent => self.parse_document_content(),
            ParserState::DocumentEnd => self.parse_document_end(),
            ParserState::BlockNode => self.parse_node(true, false),
            ParserState::BlockSequenceFirstEntry => self.parse_block_sequence_entry(true),
            ParserState::BlockSequenceEntry => self.parse_block_sequence_entry(false),
            ParserState::IndentlessSequenceEntry => self.parse_indentless_sequence_entry(),
            ParserState::BlockMappingFirstKey => self.parse_block_mapping_key(true),
            ParserState::BlockMappingKey => self.parse_block_mapping_key(false),
            ParserState::BlockMappingValue => self.parse_block_mapping_value(),
            ParserState::FlowSequenceFirstEntry => self.parse_flow_sequence_entry(true),
            ParserState::FlowSequenceEntry => self.parse_flow_sequence_entry(false),
            ParserState::FlowSequenceEntryMappingKey => {
                self.parse_flow_sequence_entry_mapping_key()
            }
            ParserState::FlowSequenceEntryMappingValue => {
                self.parse_flow_sequence_entry_mapping_value()
            }
            ParserState::FlowSequenceEntryMappingEnd => {
                self.parse_flow_sequence_entry_mapping_end()
            }
            ParserState::FlowMappingFirstKey => self.parse_flow_mapping_key(true),
            ParserState::FlowMappingKey => self.parse_flow_mapping_key(false),
            ParserState::FlowMappingValue => self.parse_flow_mapping_value(false),
            ParserState::FlowMappingEmptyValue => self.parse_flow_mapping_value(true),
            ParserState::End => Self::set_parser_error("no more events", self.current_mark),
        }
    }

    fn parse_stream_start(&mut self) -> Result<(), ParserError> {
        self.skip_token()?;
        if self.peek() != TokenType::StreamStart {
            return Self::set_parser_error("did not find expected <stream-start>", self.peek_mark());
        }
        let mark = self.peek_mark();
        self.state = ParserState::ImplicitDocumentStart;
        self.skip_token()?;
        self.emit(ParseEventType::StreamStart, mark);
        Ok(())
    }

    fn parse_document_start(&mut self, implicit: bool) -> Result<(), ParserError> {
        if !implicit {
            while self.peek() == TokenType::DocumentEnd {
                self.skip_token()?;
            }
        }
        let token_type = self.peek();
        let mark = self.peek_mark();
        if implicit
            && !matches!(
                token_type,
                TokenType::VersionDirective
                    | TokenType::TagDirective
                    | TokenType::DocumentStart
                    | TokenType::StreamEnd
            )
        {
            debug!("implicit document start at {mark}");
            self.states.push(ParserState::DocumentEnd);
            self.state = ParserState::BlockNode;
            self.emit(ParseEventType::DocumentStart, mark);
            Ok(())
        } else if token_type != TokenType::StreamEnd {
            self.process_directives()?;
            if self.peek() != TokenType::DocumentStart {
                return Self::set_parser_error(
                    "did not find expected <document start>",
                    self.peek_mark(),
                );
            }
            debug!("document start at {}", self.peek_mark());
            self.states.push(ParserState::DocumentEnd);
            self.state = ParserState::DocumentContent;
            self.skip_token()?;
            self.emit(ParseEventType::DocumentStart, mark);
            Ok(())
        } else {
            debug!("stream end at {mark}");
            self.state = ParserState::End;
            self.emit(ParseEventType::StreamEnd, mark);
            Ok(())
        }
    }

    /// Drain directive tokens. Their content is logged but not applied.
    fn process_directives(&mut self) -> Result<(), ParserError> {
        while matches!(
            self.peek(),
            TokenType::VersionDirective | TokenType::TagDirective
        ) {
            match self.tokenizer.take_token_content() {
                Some(TokenContent::VersionDirective(version)) => {
                    debug!("%YAML {}.{} directive ignored", version.major, version.minor);
                }
                Some(TokenContent::TagDirective(tag)) => {
                    debug!("%TAG {} {} directive ignored", tag.handle, tag.prefix);
                }
                _ => {}
            }
            self.skip_token()?;
        }
        Ok(())
    }

    fn parse_document_content(&mut self) -> Result<(), ParserError> {
        if matches!(
            self.peek(),
            TokenType::VersionDirective
                | TokenType::TagDirective
                | TokenType::DocumentStart
                | TokenType::DocumentEnd
                | TokenType::StreamEnd
        ) {
            let mark = self.peek_mark();
            self.pop_state();
            self.process_empty_scalar(mark);
            Ok(())
        } else {
            self.parse_node(true, false)
        }
    }

    fn parse_document_end(&mut self) -> Result<(), ParserError> {
        let mark = self.peek_mark();
        if self.peek() == TokenType::DocumentEnd {
            self.skip_token()?;
        }
        debug!("document end at {mark}");
        self.state = ParserState::DocumentStart;
        self.emit(ParseEventType::DocumentEnd, mark);
        Ok(())
    }

    fn parse_node(&mut self, block: bool, indentless_sequence: bool) -> Result<(), ParserError> {
        let start_mark = self.peek_mark();

        if self.peek() == TokenType::Alias {
            let name = self.take_name();
            let Some(&id) = self.anchors.get(&name) else {
                return Err(ParserError::UndefinedAlias {
                    name,
                    mark: start_mark,
                });
            };
            self.current_anchor = Some(Anchor::new(name, id));
            self.pop_state();
            self.skip_token()?;
            self.emit(ParseEventType::Alias, start_mark);
            return Ok(());
        }

        let mut anchor = None;
        let mut tag = None;
        loop {
            match self.peek() {
                TokenType::Anchor if anchor.is_none() => {
                    let name = self.take_name();
                    anchor = Some(self.register_anchor(name));
                }
                TokenType::Tag if tag.is_none() => tag = self.tokenizer.take_tag(),
                _ => break,
            }
            self.skip_token()?;
        }
        let has_properties = anchor.is_some() || tag.is_some();
        self.current_anchor = anchor;
        self.current_tag = tag;

        let token_type = self.peek();
        if indentless_sequence && token_type == TokenType::BlockEntryStart {
            self.state = ParserState::IndentlessSequenceEntry;
            self.emit(ParseEventType::SequenceStart, start_mark);
        } else if let Some(style) = token_type.scalar_style() {
            self.current_scalar = Some(self.tokenizer.take_scalar().unwrap_or(Scalar::NULL));
            self.current_scalar_style = style;
            self.pop_state();
            self.skip_token()?;
            self.emit(ParseEventType::Scalar, start_mark);
        } else if token_type == TokenType::FlowSequenceStart {
            self.state = ParserState::FlowSequenceFirstEntry;
            self.emit(ParseEventType::SequenceStart, start_mark);
        } else if token_type == TokenType::FlowMappingStart {
            self.state = ParserState::FlowMappingFirstKey;
            self.emit(ParseEventType::MappingStart, start_mark);
        } else if block && token_type == TokenType::BlockSequenceStart {
            self.state = ParserState::BlockSequenceFirstEntry;
            self.emit(ParseEventType::SequenceStart, start_mark);
        } else if block && token_type == TokenType::BlockMappingStart {
            self.state = ParserState::BlockMappingFirstKey;
            self.emit(ParseEventType::MappingStart, start_mark);
        } else if has_properties {
            self.pop_state();
            self.current_scalar = Some(Scalar::NULL);
            self.current_scalar_style = ScalarStyle::Plain;
            self.emit(ParseEventType::Scalar, start_mark);
        } else {
            return Self::set_parser_error_context(
                if block {
                    "while parsing a block node"
                } else {
                    "while parsing a flow node"
                },
                start_mark,
                "did not find expected node content",
                self.peek_mark(),
            );
        }
        Ok(())
    }

    fn take_name(&mut self) -> String {
        match self.tokenizer.take_scalar() {
            Some(scalar) => {
                let name = scalar.to_string_lossy().into_owned();
                self.tokenizer.recycle_scalar(scalar);
                name
            }
            None => String::new(),
        }
    }

    /// Assign the next id to `name`, shadowing an earlier definition.
    fn register_anchor(&mut self, name: String) -> Anchor {
        self.last_anchor_id += 1;
        let id = self.last_anchor_id;
        self.anchors.insert(name.clone(), id);
        Anchor::new(name, id)
    }

    fn parse_block_sequence_entry(&mut self, first: bool) -> Result<(), ParserError> {
        if first {
            self.marks.push(self.peek_mark());
            self.skip_token()?;
        }

        match self.peek() {
            TokenType::BlockEntryStart => {
                let mark = self.peek_mark();
                self.skip_token()?;
                if matches!(self.peek(), TokenType::BlockEntryStart | TokenType::BlockEnd) {
                    self.state = ParserState::BlockSequenceEntry;
                    self.process_empty_scalar(mark);
                    Ok(())
                } else {
                    self.states.push(ParserState::BlockSequenceEntry);
                    self.parse_node(true, false)
                }
            }
            TokenType::BlockEnd => {
                let mark = self.peek_mark();
                self.pop_state();
                self.pop_mark();
                self.skip_token()?;
                self.emit(ParseEventType::SequenceEnd, mark);
                Ok(())
            }
            _ => {
                let context_mark = self.pop_mark();
                Self::set_parser_error_context(
                    "while parsing a block collection",
                    context_mark,
                    "did not find expected '-' indicator",
                    self.peek_mark(),
                )
            }
        }
    }

    fn parse_indentless_sequence_entry(&mut self) -> Result<(), ParserError> {
        if self.peek() == TokenType::BlockEntryStart {
            let mark = self.peek_mark();
            self.skip_token()?;
            if matches!(
                self.peek(),
                TokenType::BlockEntryStart
                    | TokenType::KeyStart
                    | TokenType::ValueStart
                    | TokenType::BlockEnd
            ) {
                self.state = ParserState::IndentlessSequenceEntry;
                self.process_empty_scalar(mark);
                Ok(())
            } else {
                self.states.push(ParserState::IndentlessSequenceEntry);
                self.parse_node(true, false)
            }
        } else {
            let mark = self.peek_mark();
            self.pop_state();
            self.emit(ParseEventType::SequenceEnd, mark);
            Ok(())
        }
    }

    fn parse_block_mapping_key(&mut self, first: bool) -> Result<(), ParserError> {
        if first {
            self.marks.push(self.peek_mark());
            self.skip_token()?;
        }

        match self.peek() {
            TokenType::KeyStart => {
                let mark = self.peek_mark();
                self.skip_token()?;
                if matches!(
                    self.peek(),
                    TokenType::KeyStart | TokenType::ValueStart | TokenType::BlockEnd
                ) {
                    self.state = ParserState::BlockMappingValue;
                    self.process_empty_scalar(mark);
                    Ok(())
                } else {
                    self.states.push(ParserState::BlockMappingValue);
                    self.parse_node(true, true)
                }
            }
            TokenType::ValueStart => {
                let mark = self.peek_mark();
                self.state = ParserState::BlockMappingValue;
                self.process_empty_scalar(mark);
                Ok(())
            }
            TokenType::BlockEnd => {
                let mark = self.peek_mark();
                self.pop_state();
                self.pop_mark();
                self.skip_token()?;
                self.emit(ParseEventType::MappingEnd, mark);
                Ok(())
            }
            _ => {
                let context_mark = self.pop_mark();
                Self::set_parser_error_context(
                    "while parsing a block mapping",
                    context_mark,
                    "did not find expected key",
                    self.peek_mark(),
                )
            }
        }
    }

    fn parse_block_mapping_value(&mut self) -> Result<(), ParserError> {
        if self.peek() == TokenType::ValueStart {
            let mark = self.peek_mark();
            self.skip_token()?;
            if matches!(
                self.peek(),
                TokenType::KeyStart | TokenType::ValueStart | TokenType::BlockEnd
            ) {
                self.state = ParserState::BlockMappingKey;
                self.process_empty_scalar(mark);
                Ok(())
            } else {
                self.states.push(ParserState::BlockMappingKey);
                self.parse_node(true, true)
            }
        } else {
            let mark = self.peek_mark();
            self.state = ParserState::BlockMappingKey;
            self.process_empty_scalar(mark);
            Ok(())
        }
    }

    fn parse_flow_sequence_entry(&mut self, first: bool) -> Result<(), ParserError> {
        if first {
            self.marks.push(self.peek_mark());
            self.skip_token()?;
        }

        if self.peek() != TokenType::FlowSequenceEnd {
            if !first {
                if self.peek() == TokenType::FlowEntryStart {
                    self.skip_token()?;
                } else {
                    let context_mark = self.pop_mark();
                    return Self::set_parser_error_context(
                        "while parsing a flow sequence",
                        context_mark,
                        "did not find expected ',' or ']'",
                        self.peek_mark(),
                    );
                }
            }
            match self.peek() {
                TokenType::KeyStart => {
                    let mark = self.peek_mark();
                    self.state = ParserState::FlowSequenceEntryMappingKey;
                    self.skip_token()?;
                    self.emit(ParseEventType::MappingStart, mark);
                    return Ok(());
                }
                TokenType::FlowSequenceEnd => {}
                _ => {
                    self.states.push(ParserState::FlowSequenceEntry);
                    return self.parse_node(false, false);
                }
            }
        }
        let mark = self.peek_mark();
        self.pop_state();
        self.pop_mark();
        self.skip_token()?;
        self.emit(ParseEventType::SequenceEnd, mark);
        Ok(())
    }

    fn parse_flow_sequence_entry_mapping_key(&mut self) -> Result<(), ParserError> {
        if matches!(
            self.peek(),
            TokenType::ValueStart | TokenType::FlowEntryStart | TokenType::FlowSequenceEnd
        ) {
            let mark = self.peek_mark();
            self.state = ParserState::FlowSequenceEntryMappingValue;
            self.process_empty_scalar(mark);
            Ok(())
        } else {
            self.states.push(ParserState::FlowSequenceEntryMappingValue);
            self.parse_node(false, false)
        }
    }

    fn parse_flow_sequence_entry_mapping_value(&mut self) -> Result<(), ParserError> {
        if self.peek() == TokenType::ValueStart {
            self.skip_token()?;
            if !matches!(
                self.peek(),
                TokenType::FlowEntryStart | TokenType::FlowSequenceEnd
            ) {
                self.states.push(ParserState::FlowSequenceEntryMappingEnd);
                return self.parse_node(false, false);
            }
        }
        let mark = self.peek_mark();
        self.state = ParserState::FlowSequenceEntryMappingEnd;
        self.process_empty_scalar(mark);
        Ok(())
    }

    fn parse_flow_sequence_entry_mapping_end(&mut self) -> Result<(), ParserError> {
        let mark = self.peek_mark();
        self.state = ParserState::FlowSequenceEntry;
        self.emit(ParseEventType::MappingEnd, mark);
        Ok(())
    }

    fn parse_flow_mapping_key(&mut self, first: bool) -> Result<(), ParserError> {
        if first {
            self.marks.push(self.peek_mark());
            self.skip_token()?;
        }

        if self.peek() != TokenType::FlowMappingEnd {
            if !first {
                if self.peek() == TokenType::FlowEntryStart {
                    self.skip_token()?;
                } else {
                    let context_mark = self.pop_mark();
                    return Self::set_parser_error_context(
                        "while parsing a flow mapping",
                        context_mark,
                        "did not find expected ',' or '}'",
                        self.peek_mark(),
                    );
                }
            }
            match self.peek() {
                TokenType::KeyStart => {
                    self.skip_token()?;
                    if !matches!(
                        self.peek(),
                        TokenType::ValueStart | TokenType::FlowEntryStart | TokenType::FlowMappingEnd
                    ) {
                        self.states.push(ParserState::FlowMappingValue);
                        return self.parse_node(false, false);
                    }
                    let mark = self.peek_mark();
                    self.state = ParserState::FlowMappingValue;
                    self.process_empty_scalar(mark);
                    return Ok(());
                }
                TokenType::FlowMappingEnd => {}
                _ => {
                    self.states.push(ParserState::FlowMappingEmptyValue);
                    return self.parse_node(false, false);
                }
            }
        }
        let mark = self.peek_mark();
        self.pop_state();
        self.pop_mark();
        self.skip_token()?;
        self.emit(ParseEventType::MappingEnd, mark);
        Ok(())
    }

    fn parse_flow_mapping_value(&mut self, empty: bool) -> Result<(), ParserError> {
        if !empty && self.peek() == TokenType::ValueStart {
            self.skip_token()?;
            if !matches!(
                self.peek(),
                TokenType::FlowEntryStart | TokenType::FlowMappingEnd
            ) {
                self.states.push(ParserState::FlowMappingKey);
                return self.parse_node(false, false);
            }
        }
        let mark = self.peek_mark();
        self.state = ParserState::FlowMappingKey;
        self.process_empty_scalar(mark);
        Ok(())
    }

    fn process_empty_scalar(&mut self, mark: Mark) {
        self.current_scalar = Some(Scalar::NULL);
        self.current_scalar_style = ScalarStyle::Plain;
        self.emit(ParseEventType::Scalar, mark);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn events(input: &str) -> Vec<ParseEventType> {
        let mut parser = Parser::new(input.as_bytes());
        let mut events = Vec::new();
        while parser.read().unwrap() {
            events.push(parser.current_event_type());
        }
        events
    }

    fn parse_error(input: &str) -> ParserError {
        let mut parser = Parser::new(input.as_bytes());
        loop {
            match parser.read() {
                Ok(true) => {}
                Ok(false) => panic!("expected a parse error for {input:?}"),
                Err(err) => return err,
            }
        }
    }

    #[test]
    fn key_value() {
        use ParseEventType::*;
        assert_eq!(
            events("key: value"),
            [
                StreamStart,
                DocumentStart,
                MappingStart,
                Scalar,
                Scalar,
                MappingEnd,
                DocumentEnd,
                StreamEnd,
            ]
        );
    }

    #[test]
    fn empty_stream() {
        use ParseEventType::*;
        assert_eq!(events(""), [StreamStart, StreamEnd]);
        assert_eq!(events("# only a comment\n"), [StreamStart, StreamEnd]);
    }

    #[test]
    fn empty_keys_and_values_are_null() {
        let mut parser = Parser::new(b"a:\nb:\n: c\n");
        let mut nulls = 0;
        let mut scalars = 0;
        while parser.read().unwrap() {
            if parser.current_event_type() == ParseEventType::Scalar {
                scalars += 1;
                if parser.is_null_scalar() {
                    nulls += 1;
                }
            }
        }
        assert_eq!((scalars, nulls), (6, 3));
    }

    #[test]
    fn indentless_sequence() {
        use ParseEventType::*;
        assert_eq!(
            events("a:\n- 1\n- 2\nb: 3"),
            [
                StreamStart,
                DocumentStart,
                MappingStart,
                Scalar,
                SequenceStart,
                Scalar,
                Scalar,
                SequenceEnd,
                Scalar,
                Scalar,
                MappingEnd,
                DocumentEnd,
                StreamEnd,
            ]
        );
    }

    #[test]
    fn flow_and_block_nodes_under_explicit_key() {
        use ParseEventType::*;
        assert_eq!(
            events("? [a, {b: c}]\n: - d\n"),
            [
                StreamStart,
                DocumentStart,
                MappingStart,
                SequenceStart,
                Scalar,
                MappingStart,
                Scalar,
                Scalar,
                MappingEnd,
                SequenceEnd,
                SequenceStart,
                Scalar,
                SequenceEnd,
                MappingEnd,
                DocumentEnd,
                StreamEnd,
            ]
        );
    }

    #[test]
    fn flow_sequence_single_pair() {
        use ParseEventType::*;
        assert_eq!(
            events("[a: 1, b]"),
            [
                StreamStart,
                DocumentStart,
                SequenceStart,
                MappingStart,
                Scalar,
                Scalar,
                MappingEnd,
                Scalar,
                SequenceEnd,
                DocumentEnd,
                StreamEnd,
            ]
        );
    }

    #[test]
    fn multiple_documents() {
        use ParseEventType::*;
        assert_eq!(
            events("a\n--- b\n...\n--- c\n"),
            [
                StreamStart,
                DocumentStart,
                Scalar,
                DocumentEnd,
                DocumentStart,
                Scalar,
                DocumentEnd,
                DocumentStart,
                Scalar,
                DocumentEnd,
                StreamEnd,
            ]
        );
    }

    #[test]
    fn implicit_document_only_first() {
        let err = parse_error("--- a\n...\nb\n");
        assert_eq!(
            err,
            ParserError::Problem {
                problem: "did not find expected <document start>",
                mark: Mark::new(10, 2, 0),
            }
        );
    }

    #[test]
    fn directives_are_drained() {
        use ParseEventType::*;
        assert_eq!(
            events("%YAML 1.2\n%TAG !e! tag:e.com:\n--- !e!x a\n"),
            [StreamStart, DocumentStart, Scalar, DocumentEnd, StreamEnd]
        );
    }

    #[test]
    fn anchors_get_ids() {
        let mut parser = Parser::new(b"a: &x 1\nb: *x\nc: &x 2\nd: *x\ne: &y 3");
        let mut seen = Vec::new();
        while parser.read().unwrap() {
            if let Some(anchor) = parser.try_get_current_anchor() {
                seen.push((parser.current_event_type(), anchor.clone()));
            }
        }
        assert_eq!(
            seen,
            [
                (ParseEventType::Scalar, Anchor::new("x", 1)),
                (ParseEventType::Alias, Anchor::new("x", 1)),
                (ParseEventType::Scalar, Anchor::new("x", 2)),
                (ParseEventType::Alias, Anchor::new("x", 2)),
                (ParseEventType::Scalar, Anchor::new("y", 3)),
            ]
        );
    }

    #[test]
    fn undefined_alias() {
        assert_eq!(
            parse_error("a: *nope"),
            ParserError::UndefinedAlias {
                name: "nope".into(),
                mark: Mark::new(3, 0, 3),
            }
        );
    }

    #[test]
    fn properties_in_either_order() {
        for input in ["!!str &a value", "&a !!str value"] {
            let mut parser = Parser::new(input.as_bytes());
            parser.skip_header().unwrap();
            assert_eq!(parser.current_event_type(), ParseEventType::Scalar);
            assert_eq!(parser.try_get_current_tag(), Some(&Tag::new("!!", "str")));
            assert_eq!(parser.try_get_current_anchor().map(Anchor::name), Some("a"));
            assert_eq!(parser.try_get_scalar_as_str(), Some("value"));
        }
    }

    #[test]
    fn tag_only_node_is_null() {
        let mut parser = Parser::new(b"a: !!null\nb: c");
        parser.skip_header().unwrap();
        parser.read_with_verify(ParseEventType::MappingStart).unwrap();
        assert_eq!(parser.read_scalar_as_string().unwrap().as_deref(), Some("a"));
        assert!(parser.is_null_scalar());
        assert!(parser.try_get_current_tag().is_some());
        assert_eq!(parser.read_scalar_as_string().unwrap(), None);
        assert_eq!(parser.read_scalar_as_string().unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn typed_scalars() {
        let mut parser = Parser::new(b"[0xC, -0xC, 1.5, true, '012345', 012345, '', ~]");
        parser.skip_header().unwrap();
        parser.read_with_verify(ParseEventType::SequenceStart).unwrap();
        assert_eq!(parser.read_scalar_as_i64().unwrap(), 12);
        assert_eq!(parser.read_scalar_as_i64().unwrap(), -12);
        assert_eq!(parser.read_scalar_as_f64().unwrap(), 1.5);
        assert!(parser.read_scalar_as_bool().unwrap());
        assert_eq!(parser.try_get_scalar_as_i32(), None);
        assert_eq!(parser.current_scalar_style(), Some(ScalarStyle::SingleQuoted));
        parser.read().unwrap();
        assert_eq!(parser.try_get_scalar_as_i32(), Some(12345));
        parser.read().unwrap();
        assert!(!parser.is_null_scalar());
        assert_eq!(parser.read_scalar_as_string().unwrap().as_deref(), Some(""));
        assert!(parser.is_null_scalar());
        parser.read().unwrap();
        assert_eq!(parser.current_event_type(), ParseEventType::SequenceEnd);
        assert!(parser.read_scalar_as_i64().is_err());
    }

    #[test]
    fn read_with_verify_mismatch() {
        let mut parser = Parser::new(b"[a]");
        parser.skip_header().unwrap();
        let err = parser
            .read_with_verify(ParseEventType::MappingStart)
            .unwrap_err();
        assert_eq!(
            err,
            ParserError::UnexpectedEvent {
                expected: ParseEventType::MappingStart,
                found: ParseEventType::SequenceStart,
                mark: Mark::new(0, 0, 0),
            }
        );
    }

    #[test]
    fn skip_current_node() {
        let mut parser = Parser::new(b"a: {b: [1, 2, {c: d}], e: f}\ng: h");
        parser.skip_header().unwrap();
        parser.read_with_verify(ParseEventType::MappingStart).unwrap();
        parser.skip_current_node().unwrap();
        assert_eq!(parser.current_event_type(), ParseEventType::MappingStart);
        parser.skip_current_node().unwrap();
        assert_eq!(parser.read_scalar_as_string().unwrap().as_deref(), Some("g"));
        parser.skip_current_node().unwrap();
        assert_eq!(parser.current_event_type(), ParseEventType::MappingEnd);
    }

    #[test]
    fn skip_after() {
        let mut parser = Parser::new(b"- [1, 2]\n- 3");
        parser.skip_after(ParseEventType::SequenceEnd).unwrap();
        assert_eq!(parser.try_get_scalar_as_i64(), Some(3));
        parser.skip_after(ParseEventType::StreamEnd).unwrap();
        assert!(parser.end());
        assert!(!parser.read().unwrap());
    }

    #[test]
    fn unterminated_flow_is_an_error() {
        assert!(matches!(
            parse_error("[ foo\n bar: invalid,"),
            ParserError::ProblemWithContext { .. } | ParserError::Tokenizer(_)
        ));
    }

    #[test]
    fn unexpected_block_token() {
        let err = parse_error("a: 1\n- b\n");
        assert_eq!(
            err,
            ParserError::ProblemWithContext {
                context: "while parsing a block mapping",
                context_mark: Mark::new(0, 0, 0),
                problem: "did not find expected key",
                mark: Mark::new(5, 1, 0),
            }
        );
    }

    #[test]
    fn deep_nesting_does_not_recurse() {
        let depth = 2_000;
        let input = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let mut parser = Parser::new(input.as_bytes());
        let mut max_depth = 0usize;
        let mut open = 0usize;
        while parser.read().unwrap() {
            match parser.current_event_type() {
                ParseEventType::SequenceStart => {
                    open += 1;
                    max_depth = max_depth.max(open);
                }
                ParseEventType::SequenceEnd => open -= 1,
                _ => {}
            }
        }
        assert_eq!((max_depth, open), (depth, 0));
    }
}
