use core::mem;

use log::trace;

use crate::chars::{
    as_hex, is_alpha, is_blank, is_blankz, is_break, is_breakz, is_digit, is_flow_indicator,
    is_hex, is_space, is_tab, is_uri_char, utf8_width, BOM,
};
use crate::queue::InsertionQueue;
use crate::reader::{Input, Lookahead};
use crate::{
    Mark, Options, Scalar, ScalarPool, Tag, TagDirective, Token, TokenContent, TokenType,
    TokenizerError, VersionDirective,
};

/// A potential simple key.
#[derive(Copy, Clone, Default, Debug)]
struct SimpleKey {
    /// Is a simple key possible?
    possible: bool,
    /// Is a simple key required?
    required: bool,
    /// The number of the token.
    token_number: usize,
    /// The position mark.
    mark: Mark,
}

/// Chomping indicator of a block scalar header.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Chomping {
    Strip,
    Clip,
    Keep,
}

/// The YAML lexer.
///
/// Call [`Tokenizer::read`] repeatedly; each successful call makes the next
/// token current. The first token is always STREAM-START and the last one
/// STREAM-END.
pub struct Tokenizer<'a> {
    input: Input<'a>,
    options: Options,
    /// The current position in the input.
    mark: Mark,
    /// The token handed out by the last `read()`.
    current: Token,
    /// Tokens produced but not handed out yet.
    tokens: InsertionQueue<Token>,
    /// The number of tokens handed out so far.
    tokens_parsed: usize,
    stream_start_produced: bool,
    stream_end_fetched: bool,
    stream_end_produced: bool,
    /// The current indentation column, -1 at stream level.
    indent: i32,
    /// The indentation columns of the enclosing block collections.
    indents: Vec<i32>,
    /// The number of unclosed '[' and '{'.
    flow_level: u32,
    /// May a simple key start at the current position?
    simple_key_allowed: bool,
    /// One potential simple key per flow level.
    simple_keys: Vec<SimpleKey>,
    /// Offset right after a quoted scalar or flow collection end, where a
    /// `:` is a value indicator even without a following blank.
    adjacent_value_allowed_at: Option<u64>,
    /// A byte order mark is only accepted before the first token of a
    /// document.
    bom_allowed: bool,
    /// The line of the last token, to tell indentation from separation.
    last_token_line: Option<u32>,
    pool: ScalarPool,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over a contiguous buffer.
    pub fn new(input: &'a [u8]) -> Tokenizer<'a> {
        Self::with_options(Input::new(input), Options::default())
    }

    /// Create a tokenizer over a buffer split into segments.
    pub fn from_segments<I>(segments: I) -> Tokenizer<'a>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        Self::with_options(Input::from_segments(segments), Options::default())
    }

    pub fn with_options(input: Input<'a>, options: Options) -> Tokenizer<'a> {
        Tokenizer {
            input,
            options,
            mark: Mark::default(),
            current: Token::new(TokenType::None, Mark::default()),
            tokens: InsertionQueue::new(),
            tokens_parsed: 0,
            stream_start_produced: false,
            stream_end_fetched: false,
            stream_end_produced: false,
            indent: -1,
            indents: Vec::with_capacity(16),
            flow_level: 0,
            simple_key_allowed: false,
            simple_keys: Vec::with_capacity(16),
            adjacent_value_allowed_at: None,
            bom_allowed: true,
            last_token_line: None,
            pool: ScalarPool::new(),
        }
    }

    /// Advance to the next token.
    ///
    /// Returns `Ok(false)` once STREAM-END has been handed out. After an
    /// error the tokenizer is in an unspecified state and must not be used.
    pub fn read(&mut self) -> Result<bool, TokenizerError> {
        match self.next_token()? {
            Some(token) => {
                let previous = mem::replace(&mut self.current, token);
                self.recycle(previous);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn current_token_type(&self) -> TokenType {
        self.current.token_type
    }

    pub fn current_mark(&self) -> Mark {
        self.current.mark
    }

    /// The current position of the scanner in the input.
    pub fn mark(&self) -> Mark {
        self.mark
    }

    /// Move the payload of the current token out.
    pub fn take_token_content(&mut self) -> Option<TokenContent> {
        self.current.content.take()
    }

    /// Move the scalar payload of the current scalar, anchor or alias token
    /// out.
    pub fn take_scalar(&mut self) -> Option<Scalar> {
        match self.current.content.take() {
            Some(TokenContent::Scalar(scalar)) => Some(scalar),
            other => {
                self.current.content = other;
                None
            }
        }
    }

    pub fn take_tag(&mut self) -> Option<Tag> {
        match self.current.content.take() {
            Some(TokenContent::Tag(tag)) => Some(tag),
            other => {
                self.current.content = other;
                None
            }
        }
    }

    /// Hand a scalar taken from a token back for reuse.
    pub fn recycle_scalar(&mut self, scalar: Scalar) {
        self.pool.give_back(scalar);
    }

    fn recycle(&mut self, token: Token) {
        if let Some(TokenContent::Scalar(scalar)) = token.content {
            self.pool.give_back(scalar);
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, TokenizerError> {
        if self.stream_end_produced {
            return Ok(None);
        }
        self.fetch_more_tokens()?;
        let Some(token) = self.tokens.dequeue() else {
            return Ok(None);
        };
        self.tokens_parsed += 1;
        if token.token_type == TokenType::StreamEnd {
            self.stream_end_produced = true;
        }
        Ok(Some(token))
    }

    fn error<T>(
        &self,
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
    ) -> Result<T, TokenizerError> {
        // Input cut short by malformed UTF-8 looks like an early end of stream.
        if self.input.utf8_problem().is_some() {
            return self.utf8_error();
        }
        Err(TokenizerError::Problem {
            context,
            context_mark,
            problem,
            problem_mark: self.mark,
        })
    }

    fn utf8_error<T>(&self) -> Result<T, TokenizerError> {
        Err(TokenizerError::Problem {
            context: "while reading the stream",
            context_mark: self.mark,
            problem: self.input.utf8_problem().unwrap_or("invalid UTF-8 sequence"),
            problem_mark: self.mark,
        })
    }

    #[inline]
    fn ch(&self) -> Option<u8> {
        self.input.peek()
    }

    #[inline]
    fn ch_at(&self, n: usize) -> Option<u8> {
        self.input.peek_at(n)
    }

    fn check(&self, ch: u8) -> bool {
        self.ch() == Some(ch)
    }

    /// Is the input at `---` or `...` followed by a blank, at column 0?
    fn at_document_indicator(&self) -> bool {
        self.mark.column == 0
            && (self.input.starts_with(b"---") || self.input.starts_with(b"..."))
            && is_blankz(self.ch_at(3))
    }

    /// Skip one character.
    fn skip(&mut self) {
        let Some(lead) = self.ch() else {
            return;
        };
        let width = utf8_width(lead);
        self.input.advance(width);
        self.mark.offset += width as u64;
        self.mark.column += 1;
    }

    /// Skip one line break, CR LF counting as one.
    fn skip_line(&mut self) {
        let width = match (self.ch(), self.ch_at(1)) {
            (Some(b'\r'), Some(b'\n')) => 2,
            (Some(b'\r' | b'\n'), _) => 1,
            _ => return,
        };
        self.input.advance(width);
        self.mark.offset += width as u64;
        self.mark.column = 0;
        self.mark.line += 1;
    }

    /// Copy one character into `buffer`.
    fn read_char(&mut self, buffer: &mut Scalar) {
        let Some(lead) = self.ch() else {
            return;
        };
        buffer.push(lead);
        for i in 1..utf8_width(lead) {
            if let Some(byte) = self.ch_at(i) {
                buffer.push(byte);
            }
        }
        self.skip();
    }

    /// Copy one character of scalar content, rejecting a byte order mark.
    fn read_content_char(
        &mut self,
        buffer: &mut Scalar,
        context: &'static str,
        start_mark: Mark,
    ) -> Result<(), TokenizerError> {
        if self.input.starts_with(&BOM) {
            return self.error(context, start_mark, "found a byte order mark inside a document");
        }
        self.read_char(buffer);
        Ok(())
    }

    /// Consume a line break, appending it to `buffer` normalized to LF.
    fn read_line(&mut self, buffer: &mut Scalar) {
        if is_break(self.ch()) {
            buffer.push(b'\n');
            self.skip_line();
        }
    }

    /// Consume a line break, if any, and report whether there was one.
    fn consume_line(&mut self) -> bool {
        if is_break(self.ch()) {
            self.skip_line();
            true
        } else {
            false
        }
    }

    fn fetch_more_tokens(&mut self) -> Result<(), TokenizerError> {
        loop {
            let mut need_more_tokens = false;
            if self.tokens.is_empty() {
                need_more_tokens = !self.stream_end_fetched;
            } else if !self.stream_end_fetched {
                self.stale_simple_keys()?;
                for simple_key in &self.simple_keys {
                    if simple_key.possible && simple_key.token_number == self.tokens_parsed {
                        need_more_tokens = true;
                        break;
                    }
                }
            }
            if !need_more_tokens {
                return Ok(());
            }
            self.fetch_next_token()?;
        }
    }

    fn fetch_next_token(&mut self) -> Result<(), TokenizerError> {
        if !self.stream_start_produced {
            self.fetch_stream_start();
            return Ok(());
        }
        self.scan_to_next_token()?;
        self.stale_simple_keys()?;
        self.unroll_indent(self.mark.column as i32);
        self.bom_allowed = false;
        self.last_token_line = Some(self.mark.line);

        let Some(ch) = self.ch() else {
            if self.input.utf8_problem().is_some() {
                return self.utf8_error();
            }
            return self.fetch_stream_end();
        };
        if self.mark.column == 0 {
            if ch == b'%' {
                return self.fetch_directive();
            }
            if self.input.starts_with(b"---") && is_blankz(self.ch_at(3)) {
                return self.fetch_document_indicator(TokenType::DocumentStart);
            }
            if self.input.starts_with(b"...") && is_blankz(self.ch_at(3)) {
                return self.fetch_document_indicator(TokenType::DocumentEnd);
            }
        }
        let next = self.ch_at(1);
        match ch {
            b'[' => return self.fetch_flow_collection_start(TokenType::FlowSequenceStart),
            b'{' => return self.fetch_flow_collection_start(TokenType::FlowMappingStart),
            b']' => return self.fetch_flow_collection_end(TokenType::FlowSequenceEnd),
            b'}' => return self.fetch_flow_collection_end(TokenType::FlowMappingEnd),
            b',' => return self.fetch_flow_entry(),
            b'-' if is_blankz(next) => return self.fetch_block_entry(),
            b'?' if self.flow_level > 0 || is_blankz(next) => return self.fetch_key(),
            b':' if is_blankz(next)
                || (self.flow_level > 0
                    && (is_flow_indicator(next)
                        || self.adjacent_value_allowed_at == Some(self.mark.offset))) =>
            {
                return self.fetch_value();
            }
            b'*' => return self.fetch_anchor(true),
            b'&' => return self.fetch_anchor(false),
            b'!' => return self.fetch_tag(),
            b'|' if self.flow_level == 0 => return self.fetch_block_scalar(true),
            b'>' if self.flow_level == 0 => return self.fetch_block_scalar(false),
            b'\'' => return self.fetch_flow_scalar(true),
            b'"' => return self.fetch_flow_scalar(false),
            _ => {}
        }
        let starts_plain = match ch {
            b'-' => true,
            b'?' | b':' => !is_blankz(next),
            b',' | b'[' | b']' | b'{' | b'}' | b'#' | b'&' | b'*' | b'!' | b'|' | b'>' | b'\''
            | b'"' | b'%' | b'@' | b'`' => false,
            _ => !is_blankz(ch),
        };
        if starts_plain {
            return self.fetch_plain_scalar();
        }
        self.error(
            "while scanning for the next token",
            self.mark,
            "found character that cannot start any token",
        )
    }

    fn stale_simple_keys(&mut self) -> Result<(), TokenizerError> {
        let window = self.options.simple_key_window;
        for i in 0..self.simple_keys.len() {
            let simple_key = self.simple_keys[i];
            if simple_key.possible
                && (simple_key.mark.line < self.mark.line
                    || simple_key.mark.offset + window < self.mark.offset)
            {
                if simple_key.required {
                    return self.error(
                        "while scanning a simple key",
                        simple_key.mark,
                        "could not find expected ':'",
                    );
                }
                self.simple_keys[i].possible = false;
            }
        }
        Ok(())
    }

    fn save_simple_key(&mut self) -> Result<(), TokenizerError> {
        if self.simple_key_allowed {
            let required = self.flow_level == 0 && self.indent == self.mark.column as i32;
            let simple_key = SimpleKey {
                possible: true,
                required,
                token_number: self.tokens_parsed + self.tokens.len(),
                mark: self.mark,
            };
            self.remove_simple_key()?;
            if let Some(last) = self.simple_keys.last_mut() {
                *last = simple_key;
            }
        }
        Ok(())
    }

    fn remove_simple_key(&mut self) -> Result<(), TokenizerError> {
        let Some(simple_key) = self.simple_keys.last().copied() else {
            return Ok(());
        };
        if simple_key.possible && simple_key.required {
            return self.error(
                "while scanning a simple key",
                simple_key.mark,
                "could not find expected ':'",
            );
        }
        if let Some(last) = self.simple_keys.last_mut() {
            last.possible = false;
        }
        Ok(())
    }

    fn increase_flow_level(&mut self) {
        self.simple_keys.push(SimpleKey::default());
        self.flow_level += 1;
    }

    fn decrease_flow_level(&mut self) {
        if self.flow_level != 0 {
            self.flow_level -= 1;
            self.simple_keys.pop();
        }
    }

    /// Push the current indentation and emit `token_type` if `column` is
    /// deeper. With `number` the token is inserted in front of the token of
    /// that number instead of appended.
    fn roll_indent(&mut self, column: i32, number: Option<usize>, token_type: TokenType, mark: Mark) {
        if self.flow_level != 0 || self.indent >= column {
            return;
        }
        self.indents.push(self.indent);
        self.indent = column;
        let token = Token::new(token_type, mark);
        match number {
            Some(number) => self.tokens.insert_at(number - self.tokens_parsed, token),
            None => self.tokens.enqueue(token),
        }
    }

    /// Pop indentation levels deeper than `column`, one BLOCK-END each.
    fn unroll_indent(&mut self, column: i32) {
        if self.flow_level != 0 {
            return;
        }
        while self.indent > column {
            self.tokens.enqueue(Token::new(TokenType::BlockEnd, self.mark));
            self.indent = self.indents.pop().unwrap_or(-1);
        }
    }

    fn fetch_stream_start(&mut self) {
        self.indent = -1;
        self.simple_keys.push(SimpleKey::default());
        self.simple_key_allowed = true;
        self.stream_start_produced = true;
        self.tokens
            .enqueue(Token::new(TokenType::StreamStart, self.mark));
    }

    fn fetch_stream_end(&mut self) -> Result<(), TokenizerError> {
        if self.mark.column != 0 {
            self.mark.column = 0;
            self.mark.line += 1;
        }
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        self.stream_end_fetched = true;
        self.tokens.enqueue(Token::new(TokenType::StreamEnd, self.mark));
        Ok(())
    }

    fn fetch_directive(&mut self) -> Result<(), TokenizerError> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_directive()?;
        self.tokens.enqueue(token);
        Ok(())
    }

    fn fetch_document_indicator(&mut self, token_type: TokenType) -> Result<(), TokenizerError> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let mark = self.mark;
        self.skip();
        self.skip();
        self.skip();
        self.bom_allowed = true;
        self.tokens.enqueue(Token::new(token_type, mark));
        Ok(())
    }

    fn fetch_flow_collection_start(&mut self, token_type: TokenType) -> Result<(), TokenizerError> {
        self.save_simple_key()?;
        self.increase_flow_level();
        self.simple_key_allowed = true;
        let mark = self.mark;
        self.skip();
        self.tokens.enqueue(Token::new(token_type, mark));
        Ok(())
    }

    fn fetch_flow_collection_end(&mut self, token_type: TokenType) -> Result<(), TokenizerError> {
        self.remove_simple_key()?;
        self.decrease_flow_level();
        self.simple_key_allowed = false;
        let mark = self.mark;
        self.skip();
        self.adjacent_value_allowed_at = Some(self.mark.offset);
        self.tokens.enqueue(Token::new(token_type, mark));
        Ok(())
    }

    fn fetch_flow_entry(&mut self) -> Result<(), TokenizerError> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let mark = self.mark;
        self.skip();
        self.tokens
            .enqueue(Token::new(TokenType::FlowEntryStart, mark));
        Ok(())
    }

    fn fetch_block_entry(&mut self) -> Result<(), TokenizerError> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return self.error(
                    "while scanning a block entry",
                    self.mark,
                    "block sequence entries are not allowed in this context",
                );
            }
            self.roll_indent(
                self.mark.column as i32,
                None,
                TokenType::BlockSequenceStart,
                self.mark,
            );
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let mark = self.mark;
        self.skip();
        self.tokens
            .enqueue(Token::new(TokenType::BlockEntryStart, mark));
        Ok(())
    }

    fn fetch_key(&mut self) -> Result<(), TokenizerError> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return self.error(
                    "while scanning a mapping key",
                    self.mark,
                    "mapping keys are not allowed in this context",
                );
            }
            self.roll_indent(
                self.mark.column as i32,
                None,
                TokenType::BlockMappingStart,
                self.mark,
            );
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = self.flow_level == 0;
        let mark = self.mark;
        self.skip();
        self.tokens.enqueue(Token::new(TokenType::KeyStart, mark));
        Ok(())
    }

    fn fetch_value(&mut self) -> Result<(), TokenizerError> {
        let simple_key = self.simple_keys.last().copied().unwrap_or_default();
        if simple_key.possible {
            trace!("simple key at {} confirmed by ':'", simple_key.mark);
            self.tokens.insert_at(
                simple_key.token_number - self.tokens_parsed,
                Token::new(TokenType::KeyStart, simple_key.mark),
            );
            self.roll_indent(
                simple_key.mark.column as i32,
                Some(simple_key.token_number),
                TokenType::BlockMappingStart,
                simple_key.mark,
            );
            if let Some(last) = self.simple_keys.last_mut() {
                last.possible = false;
            }
            self.simple_key_allowed = false;
        } else {
            if self.flow_level == 0 {
                if !self.simple_key_allowed {
                    return self.error(
                        "while scanning a mapping value",
                        self.mark,
                        "mapping values are not allowed in this context",
                    );
                }
                self.roll_indent(
                    self.mark.column as i32,
                    None,
                    TokenType::BlockMappingStart,
                    self.mark,
                );
            }
            self.simple_key_allowed = self.flow_level == 0;
        }
        let mark = self.mark;
        self.skip();
        self.tokens.enqueue(Token::new(TokenType::ValueStart, mark));
        Ok(())
    }

    fn fetch_anchor(&mut self, alias: bool) -> Result<(), TokenizerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_anchor(alias)?;
        self.tokens.enqueue(token);
        if !alias {
            self.run_tag_hook();
        }
        Ok(())
    }

    fn fetch_tag(&mut self) -> Result<(), TokenizerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_tag()?;
        self.tokens.enqueue(token);
        self.run_tag_hook();
        Ok(())
    }

    fn run_tag_hook(&mut self) {
        let Some(hook) = &self.options.tag_hook else {
            return;
        };
        let skip = hook.skip_after_property(&Lookahead { input: &self.input });
        let start = self.mark.offset;
        while self.mark.offset - start < skip as u64 && !is_breakz(self.ch()) {
            self.skip();
        }
    }

    fn fetch_block_scalar(&mut self, literal: bool) -> Result<(), TokenizerError> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let token = self.scan_block_scalar(literal)?;
        self.tokens.enqueue(token);
        Ok(())
    }

    fn fetch_flow_scalar(&mut self, single: bool) -> Result<(), TokenizerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_flow_scalar(single)?;
        self.adjacent_value_allowed_at = Some(self.mark.offset);
        self.tokens.enqueue(token);
        Ok(())
    }

    fn fetch_plain_scalar(&mut self) -> Result<(), TokenizerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_plain_scalar()?;
        self.tokens.enqueue(token);
        Ok(())
    }

    fn scan_to_next_token(&mut self) -> Result<(), TokenizerError> {
        loop {
            let indentation = self.flow_level == 0 && self.last_token_line != Some(self.mark.line);
            while is_blank(self.ch()) {
                if indentation && is_tab(self.ch()) && !self.blank_line_ahead() {
                    return self.error(
                        "while scanning for the next token",
                        self.mark,
                        "found a tab character where an indentation space is expected",
                    );
                }
                self.skip();
            }
            if self.input.starts_with(&BOM) {
                if !self.bom_allowed {
                    return self.error(
                        "while scanning for the next token",
                        self.mark,
                        "found a byte order mark inside a document",
                    );
                }
                self.input.advance(BOM.len());
                self.mark.offset += BOM.len() as u64;
                continue;
            }
            if self.check(b'#') {
                while !is_breakz(self.ch()) {
                    self.skip();
                }
            }
            if !is_break(self.ch()) {
                return Ok(());
            }
            self.skip_line();
            if self.flow_level == 0 {
                self.simple_key_allowed = true;
            }
        }
    }

    /// Is the rest of the current line blank or a comment?
    fn blank_line_ahead(&self) -> bool {
        let mut i = 0;
        while is_blank(self.ch_at(i)) {
            i += 1;
        }
        let ch = self.ch_at(i);
        ch == Some(b'#') || is_breakz(ch)
    }

    fn scan_directive(&mut self) -> Result<Token, TokenizerError> {
        let start_mark = self.mark;
        self.skip();
        let name = self.scan_directive_name(start_mark)?;
        let token = match name.as_str() {
            "YAML" => {
                let (major, minor) = self.scan_version_directive_value(start_mark)?;
                Token::with_content(
                    TokenType::VersionDirective,
                    start_mark,
                    TokenContent::VersionDirective(VersionDirective { major, minor }),
                )
            }
            "TAG" => {
                let (handle, prefix) = self.scan_tag_directive_value(start_mark)?;
                Token::with_content(
                    TokenType::TagDirective,
                    start_mark,
                    TokenContent::TagDirective(TagDirective { handle, prefix }),
                )
            }
            _ => {
                return self.error(
                    "while scanning a directive",
                    start_mark,
                    "found unknown directive name",
                );
            }
        };
        while is_blank(self.ch()) {
            self.skip();
        }
        if self.check(b'#') {
            while !is_breakz(self.ch()) {
                self.skip();
            }
        }
        if !is_breakz(self.ch()) {
            return self.error(
                "while scanning a directive",
                start_mark,
                "did not find expected comment or line break",
            );
        }
        self.skip_line();
        Ok(token)
    }

    fn scan_directive_name(&mut self, start_mark: Mark) -> Result<String, TokenizerError> {
        let mut name = String::new();
        while let Some(ch) = self.ch().filter(|ch| is_alpha(*ch)) {
            name.push(char::from(ch));
            self.skip();
        }
        if name.is_empty() {
            self.error(
                "while scanning a directive",
                start_mark,
                "could not find expected directive name",
            )
        } else if !is_blankz(self.ch()) {
            self.error(
                "while scanning a directive",
                start_mark,
                "found unexpected non-alphabetical character",
            )
        } else {
            Ok(name)
        }
    }

    fn scan_version_directive_value(
        &mut self,
        start_mark: Mark,
    ) -> Result<(i32, i32), TokenizerError> {
        while is_blank(self.ch()) {
            self.skip();
        }
        let major = self.scan_version_directive_number(start_mark)?;
        if !self.check(b'.') {
            return self.error(
                "while scanning a %YAML directive",
                start_mark,
                "did not find expected digit or '.' character",
            );
        }
        self.skip();
        let minor = self.scan_version_directive_number(start_mark)?;
        Ok((major, minor))
    }

    fn scan_version_directive_number(&mut self, start_mark: Mark) -> Result<i32, TokenizerError> {
        const MAX_NUMBER_LENGTH: usize = 9;

        let mut value: i32 = 0;
        let mut length = 0;
        while let Some(digit) = self.ch().filter(|ch| is_digit(*ch)) {
            length += 1;
            if length > MAX_NUMBER_LENGTH {
                return self.error(
                    "while scanning a %YAML directive",
                    start_mark,
                    "found extremely long version number",
                );
            }
            value = value * 10 + i32::from(digit - b'0');
            self.skip();
        }
        if length == 0 {
            return self.error(
                "while scanning a %YAML directive",
                start_mark,
                "did not find expected version number",
            );
        }
        Ok(value)
    }

    fn scan_tag_directive_value(
        &mut self,
        start_mark: Mark,
    ) -> Result<(String, String), TokenizerError> {
        while is_blank(self.ch()) {
            self.skip();
        }
        let handle = self.scan_tag_handle(true, start_mark)?;
        if !is_blank(self.ch()) {
            return self.error(
                "while scanning a %TAG directive",
                start_mark,
                "did not find expected whitespace",
            );
        }
        while is_blank(self.ch()) {
            self.skip();
        }
        let prefix = self.scan_tag_uri(true, true, None, start_mark)?;
        if !is_blankz(self.ch()) {
            return self.error(
                "while scanning a %TAG directive",
                start_mark,
                "did not find expected whitespace or line break",
            );
        }
        Ok((handle, prefix))
    }

    fn scan_anchor(&mut self, alias: bool) -> Result<Token, TokenizerError> {
        let start_mark = self.mark;
        self.skip();
        let mut value = self.pool.rent();
        while is_alpha(self.ch()) {
            self.read_char(&mut value);
        }
        let terminated = is_blankz(self.ch())
            || matches!(
                self.ch(),
                Some(b'?' | b':' | b',' | b']' | b'}' | b'%' | b'@' | b'`')
            );
        if value.is_empty() || !terminated {
            self.pool.give_back(value);
            return self.error(
                if alias {
                    "while scanning an alias"
                } else {
                    "while scanning an anchor"
                },
                start_mark,
                "did not find expected alphabetic or numeric character",
            );
        }
        Ok(Token::with_content(
            if alias {
                TokenType::Alias
            } else {
                TokenType::Anchor
            },
            start_mark,
            TokenContent::Scalar(value),
        ))
    }

    fn scan_tag(&mut self) -> Result<Token, TokenizerError> {
        let start_mark = self.mark;
        let mut handle;
        let mut suffix;
        let verbatim = self.ch_at(1) == Some(b'<');

        if verbatim {
            handle = String::new();
            self.skip();
            self.skip();
            suffix = self.scan_tag_uri(true, false, None, start_mark)?;
            if !self.check(b'>') {
                return self.error(
                    "while scanning a tag",
                    start_mark,
                    "did not find the expected '>'",
                );
            }
            self.skip();
        } else {
            handle = self.scan_tag_handle(false, start_mark)?;
            if handle.len() > 1 && handle.starts_with('!') && handle.ends_with('!') {
                suffix = self.scan_tag_uri(false, false, None, start_mark)?;
            } else {
                suffix = self.scan_tag_uri(false, false, Some(&handle), start_mark)?;
                handle = String::from("!");
                if suffix.is_empty() {
                    mem::swap(&mut handle, &mut suffix);
                }
            }
        }

        if !is_blankz(self.ch()) && !(self.flow_level > 0 && is_flow_indicator(self.ch())) {
            return self.error(
                "while scanning a tag",
                start_mark,
                "did not find expected whitespace or line break",
            );
        }
        let tag = if verbatim {
            Tag::verbatim(suffix)
        } else {
            Tag::new(handle, suffix)
        };
        Ok(Token::with_content(
            TokenType::Tag,
            start_mark,
            TokenContent::Tag(tag),
        ))
    }

    fn scan_tag_handle(&mut self, directive: bool, start_mark: Mark) -> Result<String, TokenizerError> {
        if !self.check(b'!') {
            return self.error(
                if directive {
                    "while scanning a tag directive"
                } else {
                    "while scanning a tag"
                },
                start_mark,
                "did not find expected '!'",
            );
        }
        let mut handle = String::from("!");
        self.skip();
        while let Some(ch) = self.ch().filter(|ch| is_alpha(*ch)) {
            handle.push(char::from(ch));
            self.skip();
        }
        if self.check(b'!') {
            handle.push('!');
            self.skip();
        } else if directive && handle != "!" {
            return self.error(
                "while parsing a tag directive",
                start_mark,
                "did not find expected '!'",
            );
        }
        Ok(handle)
    }

    /// Scan a tag URI. `head` is a handle that turned out to be the start
    /// of the suffix; its leading '!' is dropped.
    fn scan_tag_uri(
        &mut self,
        uri_char: bool,
        directive: bool,
        head: Option<&str>,
        start_mark: Mark,
    ) -> Result<String, TokenizerError> {
        let context = if directive {
            "while parsing a %TAG directive"
        } else {
            "while parsing a tag"
        };
        let head = head.unwrap_or("");
        let mut length = head.len();
        let mut bytes = Vec::new();
        if length > 1 {
            bytes.extend_from_slice(&head.as_bytes()[1..]);
        }
        while is_uri_char(self.ch(), uri_char) {
            if self.check(b'%') {
                self.scan_uri_escapes(context, start_mark, &mut bytes)?;
            } else if let Some(ch) = self.ch() {
                bytes.push(ch);
                self.skip();
            }
            length += 1;
        }
        if length == 0 {
            return self.error(context, start_mark, "did not find expected tag URI");
        }
        match String::from_utf8(bytes) {
            Ok(uri) => Ok(uri),
            Err(_) => self.error(context, start_mark, "found an invalid UTF-8 sequence"),
        }
    }

    /// Decode one percent-escaped UTF-8 character.
    fn scan_uri_escapes(
        &mut self,
        context: &'static str,
        start_mark: Mark,
        bytes: &mut Vec<u8>,
    ) -> Result<(), TokenizerError> {
        let mut width = 0;
        loop {
            let (Some(b'%'), Some(high), Some(low)) = (self.ch(), self.ch_at(1), self.ch_at(2))
            else {
                return self.error(context, start_mark, "did not find URI escaped octet");
            };
            if !is_hex(high) || !is_hex(low) {
                return self.error(context, start_mark, "did not find URI escaped octet");
            }
            let octet = ((as_hex(high) << 4) + as_hex(low)) as u8;
            if width == 0 {
                width = match octet {
                    _ if octet & 0x80 == 0x00 => 1,
                    _ if octet & 0xE0 == 0xC0 => 2,
                    _ if octet & 0xF0 == 0xE0 => 3,
                    _ if octet & 0xF8 == 0xF0 => 4,
                    _ => {
                        return self.error(
                            context,
                            start_mark,
                            "found an incorrect leading UTF-8 octet",
                        );
                    }
                };
            } else if octet & 0xC0 != 0x80 {
                return self.error(
                    context,
                    start_mark,
                    "found an incorrect trailing UTF-8 octet",
                );
            }
            bytes.push(octet);
            self.skip();
            self.skip();
            self.skip();
            width -= 1;
            if width == 0 {
                return Ok(());
            }
        }
    }

    fn scan_block_scalar(&mut self, literal: bool) -> Result<Token, TokenizerError> {
        let start_mark = self.mark;
        let mut chomping = Chomping::Clip;
        let mut increment: i32 = 0;
        self.skip();

        if let Some(indicator @ (b'+' | b'-')) = self.ch() {
            chomping = if indicator == b'+' {
                Chomping::Keep
            } else {
                Chomping::Strip
            };
            self.skip();
            if let Some(digit) = self.ch().filter(|ch| is_digit(*ch)) {
                increment = self.scan_indentation_indicator(digit, start_mark)?;
            }
        } else if let Some(digit) = self.ch().filter(|ch| is_digit(*ch)) {
            increment = self.scan_indentation_indicator(digit, start_mark)?;
            if let Some(indicator @ (b'+' | b'-')) = self.ch() {
                chomping = if indicator == b'+' {
                    Chomping::Keep
                } else {
                    Chomping::Strip
                };
                self.skip();
            }
        }

        while is_blank(self.ch()) {
            self.skip();
        }
        if self.check(b'#') {
            while !is_breakz(self.ch()) {
                self.skip();
            }
        }
        if !is_breakz(self.ch()) {
            return self.error(
                "while scanning a block scalar",
                start_mark,
                "did not find expected comment or line break",
            );
        }
        self.skip_line();

        let mut indent = 0;
        if increment != 0 {
            indent = if self.indent >= 0 {
                self.indent + increment
            } else {
                increment
            };
        }

        let mut value = self.pool.rent();
        let mut trailing_breaks = self.pool.rent();
        let mut leading_break = false;
        let mut leading_blank = false;

        let result = self.scan_block_scalar_breaks(&mut indent, &mut trailing_breaks, start_mark);
        if let Err(err) = result {
            self.pool.give_back(value);
            self.pool.give_back(trailing_breaks);
            return Err(err);
        }

        while self.mark.column as i32 == indent && self.ch().is_some() {
            let trailing_blank = is_blank(self.ch());
            if !literal && leading_break && !leading_blank && !trailing_blank {
                if trailing_breaks.is_empty() {
                    value.push(b' ');
                }
            } else if leading_break {
                value.push(b'\n');
            }
            value.append(&mut trailing_breaks);
            leading_blank = is_blank(self.ch());
            while !is_breakz(self.ch()) {
                let result =
                    self.read_content_char(&mut value, "while scanning a block scalar", start_mark);
                if let Err(err) = result {
                    self.pool.give_back(value);
                    self.pool.give_back(trailing_breaks);
                    return Err(err);
                }
            }
            leading_break = self.consume_line();
            let result =
                self.scan_block_scalar_breaks(&mut indent, &mut trailing_breaks, start_mark);
            if let Err(err) = result {
                self.pool.give_back(value);
                self.pool.give_back(trailing_breaks);
                return Err(err);
            }
        }

        if chomping != Chomping::Strip && leading_break {
            value.push(b'\n');
        }
        if chomping == Chomping::Keep {
            value.append(&mut trailing_breaks);
        }
        self.pool.give_back(trailing_breaks);

        Ok(Token::with_content(
            if literal {
                TokenType::LiteralScalar
            } else {
                TokenType::FoldedScalar
            },
            start_mark,
            TokenContent::Scalar(value),
        ))
    }

    fn scan_indentation_indicator(&mut self, digit: u8, start_mark: Mark) -> Result<i32, TokenizerError> {
        if digit == b'0' {
            return self.error(
                "while scanning a block scalar",
                start_mark,
                "found an indentation indicator equal to 0",
            );
        }
        self.skip();
        Ok(i32::from(digit - b'0'))
    }

    /// Consume empty lines and indentation. Determines the indentation of
    /// the scalar from the first non-empty line when it is still unknown.
    fn scan_block_scalar_breaks(
        &mut self,
        indent: &mut i32,
        breaks: &mut Scalar,
        start_mark: Mark,
    ) -> Result<(), TokenizerError> {
        let mut max_indent = 0;
        loop {
            while (*indent == 0 || (self.mark.column as i32) < *indent) && is_space(self.ch()) {
                self.skip();
            }
            if self.mark.column as i32 > max_indent {
                max_indent = self.mark.column as i32;
            }
            if (*indent == 0 || (self.mark.column as i32) < *indent) && is_tab(self.ch()) {
                return self.error(
                    "while scanning a block scalar",
                    start_mark,
                    "found a tab character where an indentation space is expected",
                );
            }
            if !is_break(self.ch()) {
                break;
            }
            self.read_line(breaks);
        }
        if *indent == 0 {
            *indent = max_indent.max(self.indent + 1).max(1);
        }
        Ok(())
    }

    fn scan_flow_scalar(&mut self, single: bool) -> Result<Token, TokenizerError> {
        let start_mark = self.mark;
        let mut value = self.pool.rent();
        let mut trailing_breaks = self.pool.rent();
        let mut whitespaces = self.pool.rent();
        let result = self.scan_flow_scalar_content(
            single,
            start_mark,
            &mut value,
            &mut trailing_breaks,
            &mut whitespaces,
        );
        self.pool.give_back(trailing_breaks);
        self.pool.give_back(whitespaces);
        if let Err(err) = result {
            self.pool.give_back(value);
            return Err(err);
        }
        Ok(Token::with_content(
            if single {
                TokenType::SingleQuotedScalar
            } else {
                TokenType::DoubleQuotedScalar
            },
            start_mark,
            TokenContent::Scalar(value),
        ))
    }

    fn scan_flow_scalar_content(
        &mut self,
        single: bool,
        start_mark: Mark,
        value: &mut Scalar,
        trailing_breaks: &mut Scalar,
        whitespaces: &mut Scalar,
    ) -> Result<(), TokenizerError> {
        let quote = if single { b'\'' } else { b'"' };
        self.skip();
        loop {
            if self.at_document_indicator() {
                return self.error(
                    "while scanning a quoted scalar",
                    start_mark,
                    "found unexpected document indicator",
                );
            }
            if self.ch().is_none() {
                return self.error(
                    "while scanning a quoted scalar",
                    start_mark,
                    "found unexpected end of stream",
                );
            }

            let mut leading_blanks = false;
            let mut leading_break = false;
            while !is_blankz(self.ch()) {
                if single && self.check(b'\'') && self.ch_at(1) == Some(b'\'') {
                    value.push(b'\'');
                    self.skip();
                    self.skip();
                } else if self.check(quote) {
                    break;
                } else if !single && self.check(b'\\') && is_break(self.ch_at(1)) {
                    self.skip();
                    self.skip_line();
                    leading_blanks = true;
                    break;
                } else if !single && self.check(b'\\') {
                    self.scan_escape(start_mark, value)?;
                } else {
                    self.read_content_char(value, "while scanning a quoted scalar", start_mark)?;
                }
            }
            if self.check(quote) {
                break;
            }

            while is_blank(self.ch()) || is_break(self.ch()) {
                if is_blank(self.ch()) {
                    if leading_blanks {
                        self.skip();
                    } else {
                        self.read_char(whitespaces);
                    }
                } else if leading_blanks {
                    self.read_line(trailing_breaks);
                } else {
                    whitespaces.clear();
                    leading_break = self.consume_line();
                    leading_blanks = true;
                }
            }

            if leading_blanks {
                if leading_break && trailing_breaks.is_empty() {
                    value.push(b' ');
                } else {
                    value.append(trailing_breaks);
                }
            } else {
                value.append(whitespaces);
            }
        }
        self.skip();
        Ok(())
    }

    /// Decode one backslash escape of a double-quoted scalar.
    fn scan_escape(&mut self, start_mark: Mark, value: &mut Scalar) -> Result<(), TokenizerError> {
        let mut code_length = 0;
        match self.ch_at(1) {
            Some(b'0') => value.push(b'\0'),
            Some(b'a') => value.push(b'\x07'),
            Some(b'b') => value.push(b'\x08'),
            Some(b't' | b'\t') => value.push(b'\t'),
            Some(b'n') => value.push(b'\n'),
            Some(b'v') => value.push(b'\x0B'),
            Some(b'f') => value.push(b'\x0C'),
            Some(b'r') => value.push(b'\r'),
            Some(b'e') => value.push(b'\x1B'),
            Some(b' ') => value.push(b' '),
            Some(b'"') => value.push(b'"'),
            Some(b'/') => value.push(b'/'),
            Some(b'\\') => value.push(b'\\'),
            // NEL (#x85)
            Some(b'N') => value.push_char('\u{0085}'),
            // #xA0
            Some(b'_') => value.push_char('\u{00A0}'),
            // LS (#x2028)
            Some(b'L') => value.push_char('\u{2028}'),
            // PS (#x2029)
            Some(b'P') => value.push_char('\u{2029}'),
            Some(b'x') => code_length = 2,
            Some(b'u') => code_length = 4,
            Some(b'U') => code_length = 8,
            _ => {
                return self.error(
                    "while parsing a quoted scalar",
                    start_mark,
                    "found unknown escape character",
                );
            }
        }
        self.skip();
        self.skip();
        if code_length == 0 {
            return Ok(());
        }
        let mut code: u32 = 0;
        for k in 0..code_length {
            match self.ch_at(k) {
                Some(digit) if is_hex(digit) => code = (code << 4) + as_hex(digit),
                _ => {
                    return self.error(
                        "while parsing a quoted scalar",
                        start_mark,
                        "did not find expected hexdecimal number",
                    );
                }
            }
        }
        let Some(ch) = char::from_u32(code) else {
            return self.error(
                "while parsing a quoted scalar",
                start_mark,
                "found invalid Unicode character escape code",
            );
        };
        value.push_char(ch);
        for _ in 0..code_length {
            self.skip();
        }
        Ok(())
    }

    fn scan_plain_scalar(&mut self) -> Result<Token, TokenizerError> {
        let start_mark = self.mark;
        let mut value = self.pool.rent();
        let mut trailing_breaks = self.pool.rent();
        let mut whitespaces = self.pool.rent();
        let result = self.scan_plain_scalar_content(
            start_mark,
            &mut value,
            &mut trailing_breaks,
            &mut whitespaces,
        );
        self.pool.give_back(trailing_breaks);
        self.pool.give_back(whitespaces);
        match result {
            Ok(()) => Ok(Token::with_content(
                TokenType::PlainScalar,
                start_mark,
                TokenContent::Scalar(value),
            )),
            Err(err) => {
                self.pool.give_back(value);
                Err(err)
            }
        }
    }

    fn scan_plain_scalar_content(
        &mut self,
        start_mark: Mark,
        value: &mut Scalar,
        trailing_breaks: &mut Scalar,
        whitespaces: &mut Scalar,
    ) -> Result<(), TokenizerError> {
        let indent = self.indent + 1;
        let mut leading_blanks = false;
        let mut leading_break = false;
        loop {
            if self.at_document_indicator() || self.check(b'#') {
                break;
            }
            while !is_blankz(self.ch()) {
                let next = self.ch_at(1);
                if self.check(b':')
                    && (is_blankz(next) || (self.flow_level > 0 && is_flow_indicator(next)))
                {
                    break;
                }
                if self.flow_level > 0 && is_flow_indicator(self.ch()) {
                    break;
                }
                if leading_blanks || !whitespaces.is_empty() {
                    if leading_blanks {
                        if leading_break && trailing_breaks.is_empty() {
                            value.push(b' ');
                        } else {
                            value.append(trailing_breaks);
                        }
                        leading_blanks = false;
                        leading_break = false;
                    } else {
                        value.append(whitespaces);
                    }
                }
                self.read_content_char(value, "while scanning a plain scalar", start_mark)?;
            }
            if !(is_blank(self.ch()) || is_break(self.ch())) {
                break;
            }

            while is_blank(self.ch()) || is_break(self.ch()) {
                if is_blank(self.ch()) {
                    if leading_blanks && (self.mark.column as i32) < indent && is_tab(self.ch()) {
                        return self.error(
                            "while scanning a plain scalar",
                            start_mark,
                            "found a tab character that violates indentation",
                        );
                    } else if leading_blanks {
                        self.skip();
                    } else {
                        self.read_char(whitespaces);
                    }
                } else if leading_blanks {
                    self.read_line(trailing_breaks);
                } else {
                    whitespaces.clear();
                    leading_break = self.consume_line();
                    leading_blanks = true;
                }
            }
            if self.flow_level == 0 && (self.mark.column as i32) < indent {
                break;
            }
        }
        if leading_blanks {
            self.simple_key_allowed = true;
        }
        Ok(())
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, TokenizerError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(token) => token.map(Ok),
            Err(err) => {
                self.stream_end_produced = true;
                Some(Err(err))
            }
        }
    }
}
