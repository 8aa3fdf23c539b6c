//! The lexical scanner.
//!
//! The scanner reads UTF-8 bytes through a [`FragmentBuffer`] and classifies
//! one maximal lexeme per call. Diagnostics go to a caller-supplied
//! [`ErrorSink`]; a diagnostic is dropped when it does not end past the last
//! one reported, so rescanning after a rewind stays quiet.

use std::borrow::Cow;

use bstr::ByteSlice;
use serde::{Deserialize, Serialize};

use crate::ast::Range;
use crate::keywords;
use crate::parser_diagnostics::{ErrorCode, ErrorSink, ParseError};
use crate::source::{FragmentBuffer, Mark, SourceText};
use crate::token::Token;
use crate::util::CharExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Skip comments instead of returning them as tokens.
    pub ignore_comments: bool,
    /// Recognize Spec# contract keywords such as `requires`.
    pub spec_sharp_keywords: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            ignore_comments: true,
            spec_sharp_keywords: true,
        }
    }
}

/// Type suffix of a numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum LiteralSuffix {
    #[default]
    None,
    /// `u`
    Unsigned,
    /// `l`
    Long,
    /// `ul` or `lu`
    UnsignedLong,
    /// `f`
    Float,
    /// `d`
    Double,
    /// `m`
    Decimal,
}

/// A scan position together with the diagnostic watermark, for rolling back
/// a speculative parse whose diagnostics were discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    mark: Mark,
    last_reported: usize,
}

/// Characters that are unlikely to appear inside a literal that is missing
/// its closing quote.
const LITERAL_BREAKERS: &[u8] = b";})]([+-*/%!=<>|&^~@:?,\"'";

#[derive(Debug)]
pub struct Scanner<S> {
    buffer: FragmentBuffer<S>,
    options: ScanOptions,
    token: Token,
    /// End of the token before the current one.
    previous_end: usize,
    line_break_before: bool,
    /// End of the digits of a numeric literal, before its suffix.
    literal_end: usize,
    suffix: LiteralSuffix,
    /// Decoded string or character literal.
    literal: String,
    char_value: u32,
    /// Unescaped spelling; only built when the identifier has escapes or
    /// formatting characters.
    identifier: Option<String>,
    identifier_copied_to: usize,
    last_reported: usize,
}

impl<S: SourceText> Scanner<S> {
    pub fn new(source: S, options: ScanOptions) -> Self {
        Self::from_buffer(FragmentBuffer::new(source), options)
    }

    pub fn with_fragment_size(source: S, options: ScanOptions, fragment_size: usize) -> Self {
        Self::from_buffer(FragmentBuffer::with_fragment_size(source, fragment_size), options)
    }

    fn from_buffer(buffer: FragmentBuffer<S>, options: ScanOptions) -> Self {
        Scanner {
            buffer,
            options,
            token: Token::None,
            previous_end: 0,
            line_break_before: false,
            literal_end: 0,
            suffix: LiteralSuffix::None,
            literal: String::new(),
            char_value: 0,
            identifier: None,
            identifier_copied_to: 0,
            last_reported: 0,
        }
    }

    pub fn buffer(&self) -> &FragmentBuffer<S> {
        &self.buffer
    }

    pub fn token(&self) -> Token {
        self.token
    }

    pub fn token_range(&self) -> Range {
        Range(self.buffer.start(), self.buffer.end())
    }

    /// Whether a line terminator (or the end of the document) separates the
    /// current token from the previous one.
    pub fn is_first_after_line_break(&self) -> bool {
        self.line_break_before
    }

    /// Exact source text of the current token.
    pub fn token_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.buffer.token_bytes())
    }

    /// Spelling of the current identifier without a leading `@` and with
    /// escapes decoded. Borrows from the buffer when there is nothing to
    /// decode.
    pub fn identifier_text(&self) -> Cow<'_, str> {
        if let Some(identifier) = &self.identifier {
            return Cow::Borrowed(identifier);
        }
        let bytes = self.buffer.token_bytes();
        let bytes = match bytes.split_first() {
            Some((b'@', rest)) if !rest.is_empty() => rest,
            _ => bytes,
        };
        String::from_utf8_lossy(bytes)
    }

    /// Digits of the current numeric literal, without the suffix.
    pub fn number_text(&self) -> Cow<'_, str> {
        let bytes = self
            .buffer
            .slice(self.buffer.start(), self.literal_end)
            .unwrap_or_default();
        String::from_utf8_lossy(bytes)
    }

    pub fn suffix(&self) -> LiteralSuffix {
        self.suffix
    }

    /// Decoded contents of the current string literal.
    pub fn string_value(&self) -> &str {
        &self.literal
    }

    /// Code point of the current character literal.
    pub fn char_value(&self) -> u32 {
        self.char_value
    }

    /// A mark that rescans the current token when restored.
    pub fn save_position(&self) -> Mark {
        Mark(self.previous_end)
    }

    /// Rewinds to `mark`. The next call to [`Scanner::next_token`] starts
    /// scanning there.
    pub fn restore_position(&mut self, mark: Mark) {
        self.buffer.restore(mark);
        self.token = Token::None;
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            mark: self.save_position(),
            last_reported: self.last_reported,
        }
    }

    /// Rewinds to `checkpoint` and forgets diagnostics reported since, so
    /// they are reported again on the rescan.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.restore_position(checkpoint.mark);
        self.last_reported = checkpoint.last_reported;
    }

    /// Scans the token after the current one without moving past the
    /// current one.
    pub fn peek_next_token(&mut self, errors: &mut ErrorSink) -> Token {
        let resume = self.save_position();
        let current_end = Mark(self.buffer.end());
        self.restore_position(current_end);
        let peeked = self.next_token(errors);
        self.restore_position(resume);
        self.next_token(errors);
        peeked
    }

    pub fn next_token(&mut self, errors: &mut ErrorSink) -> Token {
        self.previous_end = self.buffer.end();
        self.line_break_before = false;
        self.suffix = LiteralSuffix::None;
        self.literal.clear();
        self.char_value = 0;
        self.identifier = None;
        let token = self.scan(errors);
        self.token = token;
        token
    }

    fn scan(&mut self, errors: &mut ErrorSink) -> Token {
        loop {
            self.skip_blanks();
            self.buffer.begin_token();
            if self.buffer.at_end() {
                self.line_break_before = true;
                return Token::EndOfFile;
            }
            let first = self.buffer.current();
            self.buffer.advance();
            let token = match first {
                b'{' => Token::LeftBrace,
                b'}' => Token::RightBrace,
                b'[' => Token::LeftBracket,
                b']' => Token::RightBracket,
                b'(' => Token::LeftParenthesis,
                b')' => Token::RightParenthesis,
                b',' => Token::Comma,
                b';' => Token::Semicolon,
                b'.' => {
                    if self.buffer.current().is_ascii_digit() {
                        self.scan_number(b'.', errors)
                    } else if self.eat(b'.') {
                        Token::Range
                    } else {
                        Token::Dot
                    }
                }
                b':' => {
                    if self.eat(b':') {
                        Token::DoubleColon
                    } else {
                        Token::Colon
                    }
                }
                b'+' => {
                    if self.eat(b'=') {
                        Token::PlusAssign
                    } else if self.eat(b'+') {
                        Token::AddOne
                    } else {
                        Token::Plus
                    }
                }
                b'-' => {
                    if self.eat(b'=') {
                        Token::SubtractAssign
                    } else if self.eat(b'-') {
                        Token::SubtractOne
                    } else if self.eat(b'>') {
                        Token::Arrow
                    } else {
                        Token::Subtract
                    }
                }
                b'*' => {
                    if self.eat(b'=') {
                        Token::MultiplyAssign
                    } else {
                        Token::Multiply
                    }
                }
                b'/' => match self.buffer.current() {
                    b'=' => {
                        self.buffer.advance();
                        Token::DivideAssign
                    }
                    b'/' => {
                        self.skip_single_line_comment();
                        if self.options.ignore_comments {
                            continue;
                        }
                        Token::SingleLineComment
                    }
                    b'*' => {
                        self.buffer.advance();
                        let opened = self.buffer.end();
                        let closed = self.skip_multi_line_comment();
                        if !self.options.ignore_comments {
                            Token::MultiLineComment
                        } else if closed {
                            continue;
                        } else {
                            let range = Range(self.buffer.start(), opened);
                            self.report(errors, range, ErrorCode::NoCommentEnd, vec![]);
                            self.buffer.begin_token();
                            self.line_break_before = true;
                            Token::EndOfFile
                        }
                    }
                    _ => Token::Divide,
                },
                b'%' => {
                    if self.eat(b'=') {
                        Token::RemainderAssign
                    } else {
                        Token::Remainder
                    }
                }
                b'&' => {
                    if self.eat(b'=') {
                        Token::BitwiseAndAssign
                    } else if self.eat(b'&') {
                        Token::LogicalAnd
                    } else {
                        Token::BitwiseAnd
                    }
                }
                b'|' => {
                    if self.eat(b'=') {
                        Token::BitwiseOrAssign
                    } else if self.eat(b'|') {
                        Token::LogicalOr
                    } else {
                        Token::BitwiseOr
                    }
                }
                b'^' => {
                    if self.eat(b'=') {
                        Token::BitwiseXorAssign
                    } else {
                        Token::BitwiseXor
                    }
                }
                b'!' => {
                    if self.eat(b'=') {
                        Token::NotEqual
                    } else {
                        Token::LogicalNot
                    }
                }
                b'~' => {
                    if self.eat(b'>') {
                        Token::Maplet
                    } else {
                        Token::BitwiseNot
                    }
                }
                b'=' => {
                    if self.eat(b'=') {
                        if self.eat(b'>') {
                            Token::Implies
                        } else {
                            Token::Equal
                        }
                    } else if self.eat(b'>') {
                        Token::Lambda
                    } else {
                        Token::Assign
                    }
                }
                b'<' => {
                    if self.eat(b'=') {
                        if self.buffer.current() == b'=' && self.buffer.peek(1) == b'>' {
                            self.buffer.advance_by(2);
                            Token::Iff
                        } else {
                            Token::LessThanOrEqual
                        }
                    } else if self.eat(b'<') {
                        if self.eat(b'=') {
                            Token::LeftShiftAssign
                        } else {
                            Token::LeftShift
                        }
                    } else {
                        Token::LessThan
                    }
                }
                b'>' => {
                    if self.eat(b'=') {
                        Token::GreaterThanOrEqual
                    } else if self.eat(b'>') {
                        if self.eat(b'=') {
                            Token::RightShiftAssign
                        } else {
                            Token::RightShift
                        }
                    } else {
                        Token::GreaterThan
                    }
                }
                b'?' => {
                    if self.eat(b'?') {
                        Token::NullCoalescing
                    } else {
                        Token::Conditional
                    }
                }
                b'\'' => {
                    self.scan_character(errors);
                    Token::CharLiteral
                }
                b'"' => {
                    self.scan_string(b'"', errors);
                    Token::StringLiteral
                }
                b'@' => match self.buffer.current() {
                    b'"' => {
                        self.buffer.advance();
                        self.scan_verbatim_string(errors);
                        Token::StringLiteral
                    }
                    b'\\' => self.scan_escaped_identifier_start(errors),
                    ch if ch.is_ascii_alphabetic() || ch == b'_' => {
                        self.buffer.advance();
                        self.scan_identifier(errors);
                        Token::Identifier
                    }
                    ch if ch >= 0x80 && self.decode_char().0.is_unicode_letter() => {
                        let (_, width) = self.decode_char();
                        self.buffer.advance_by(width);
                        self.scan_identifier(errors);
                        Token::Identifier
                    }
                    _ => Token::IllegalCharacter,
                },
                b'\\' => {
                    self.buffer.retreat(1);
                    self.scan_escaped_identifier_start(errors)
                }
                b'\r' => {
                    self.line_break_before = true;
                    self.eat(b'\n');
                    continue;
                }
                b'\n' => {
                    self.line_break_before = true;
                    continue;
                }
                b'a'..=b'z' => self.scan_keyword(errors),
                b'_' if self.buffer.current() == b'_' => {
                    self.buffer.advance();
                    self.scan_extended_keyword(errors)
                }
                b'A'..=b'Z' | b'_' => {
                    self.scan_identifier(errors);
                    Token::Identifier
                }
                b'0'..=b'9' => self.scan_number(first, errors),
                0x80..=0xFF => {
                    self.buffer.retreat(1);
                    let (ch, width) = self.decode_char();
                    self.buffer.advance_by(width);
                    if ch.is_end_of_line() {
                        self.line_break_before = true;
                        continue;
                    } else if ch.is_unicode_letter() {
                        self.scan_identifier(errors);
                        Token::Identifier
                    } else {
                        Token::IllegalCharacter
                    }
                }
                _ => Token::IllegalCharacter,
            };
            return token;
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.buffer.current() == byte && !self.buffer.at_end() {
            self.buffer.advance();
            true
        } else {
            false
        }
    }

    fn previous_byte(&self) -> u8 {
        self.buffer.token_bytes().last().copied().unwrap_or(0)
    }

    /// Decodes the character under the cursor without consuming it.
    fn decode_char(&mut self) -> (char, usize) {
        let first = self.buffer.current();
        let width = match first {
            0x00..=0x7F => return (first as char, 1),
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return (char::REPLACEMENT_CHARACTER, 1),
        };
        let mut bytes = [0; 4];
        for (ahead, byte) in bytes.iter_mut().enumerate().take(width) {
            *byte = self.buffer.peek(ahead);
        }
        match bytes[..width].to_str().ok().and_then(|s| s.chars().next()) {
            Some(ch) => (ch, width),
            None => (char::REPLACEMENT_CHARACTER, 1),
        }
    }

    fn at_end_of_line(&mut self) -> bool {
        match self.buffer.current() {
            b'\r' | b'\n' => true,
            0xC2 | 0xE2 => self.decode_char().0.is_end_of_line(),
            _ => false,
        }
    }

    fn report(
        &mut self,
        errors: &mut ErrorSink,
        range: Range,
        code: ErrorCode,
        params: Vec<String>,
    ) {
        if range.1 <= self.last_reported {
            return;
        }
        self.last_reported = range.1;
        errors.add(ParseError::new(range, code, params));
    }

    fn skip_blanks(&mut self) {
        loop {
            self.buffer.begin_token();
            if self.buffer.at_end() {
                return;
            }
            match self.buffer.current() {
                b' ' | b'\t' | 0x0C | 0x1A | 0 => self.buffer.advance(),
                0x80..=0xFF => {
                    let (ch, width) = self.decode_char();
                    if !ch.is_blank_space() {
                        return;
                    }
                    self.buffer.advance_by(width);
                }
                _ => return,
            }
        }
    }

    fn skip_single_line_comment(&mut self) {
        while !self.buffer.at_end() && !self.at_end_of_line() {
            self.buffer.advance();
        }
    }

    /// Returns false when the document ends inside the comment.
    fn skip_multi_line_comment(&mut self) -> bool {
        let mut previous_was_asterisk = false;
        while !self.buffer.at_end() {
            let c = self.buffer.current();
            self.buffer.advance();
            if c == b'/' && previous_was_asterisk {
                return true;
            }
            if matches!(c, b'\r' | b'\n') {
                self.line_break_before = true;
            }
            previous_was_asterisk = c == b'*';
        }
        false
    }

    fn continues_identifier(&mut self) -> bool {
        match self.buffer.current() {
            c if c.is_ascii_alphanumeric() || c == b'_' || c == b'$' => true,
            b'\\' => self.peek_identifier_escape(false).is_some(),
            0x80..=0xFF => self.decode_char().0.is_identifier_part(),
            _ => false,
        }
    }

    fn scan_keyword(&mut self, errors: &mut ErrorSink) -> Token {
        while matches!(self.buffer.current(), b'a'..=b'z' | b'_') {
            self.buffer.advance();
        }
        if self.continues_identifier() {
            self.scan_identifier(errors);
            return Token::Identifier;
        }
        keywords::lookup(self.buffer.token_bytes().as_bstr(), self.options.spec_sharp_keywords)
    }

    fn scan_extended_keyword(&mut self, errors: &mut ErrorSink) -> Token {
        while matches!(self.buffer.current(), b'a'..=b'z' | b'_') {
            self.buffer.advance();
        }
        if self.continues_identifier() {
            self.scan_identifier(errors);
            return Token::Identifier;
        }
        keywords::lookup_extended(self.buffer.token_bytes().as_bstr())
    }

    /// Decodes `\uXXXX` or `\UXXXXXXXX` under the cursor if it denotes an
    /// identifier character. Returns the character and the escape length.
    fn peek_identifier_escape(&mut self, start: bool) -> Option<(char, usize)> {
        let digits = match self.buffer.peek(1) {
            b'u' => 4,
            b'U' => 8,
            _ => return None,
        };
        let mut value = 0u32;
        for i in 0..digits {
            let digit = (self.buffer.peek(2 + i) as char).hex_value()?;
            value = value << 4 | digit;
        }
        let ch = char::from_u32(value)?;
        let valid = if start {
            ch.is_identifier_start()
        } else {
            ch.is_identifier_part()
        };
        valid.then(|| (ch, 2 + digits))
    }

    /// Copies the source text scanned so far into the identifier builder.
    fn flush_identifier(&mut self) {
        let content_start = match self.buffer.token_bytes().first() {
            Some(b'@') => self.buffer.start() + 1,
            _ => self.buffer.start(),
        };
        let from = match self.identifier {
            Some(_) => self.identifier_copied_to,
            None => content_start,
        };
        let to = self.buffer.end();
        let text = self
            .buffer
            .slice(from, to)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default();
        self.identifier.get_or_insert_with(String::new).push_str(&text);
    }

    /// The cursor is on a backslash at the start of a token.
    fn scan_escaped_identifier_start(&mut self, errors: &mut ErrorSink) -> Token {
        match self.peek_identifier_escape(true) {
            Some((ch, len)) => {
                self.flush_identifier();
                self.buffer.advance_by(len);
                if let Some(identifier) = &mut self.identifier {
                    identifier.push(ch);
                }
                self.identifier_copied_to = self.buffer.end();
                self.scan_identifier(errors);
                Token::Identifier
            }
            None => {
                self.buffer.advance();
                self.scan_escape(errors);
                Token::IllegalCharacter
            }
        }
    }

    fn scan_identifier(&mut self, errors: &mut ErrorSink) {
        loop {
            match self.buffer.current() {
                c if c.is_ascii_alphanumeric() || c == b'_' || c == b'$' => self.buffer.advance(),
                b'\\' => match self.peek_identifier_escape(false) {
                    Some((ch, len)) => {
                        self.flush_identifier();
                        self.buffer.advance_by(len);
                        if !ch.is_format() {
                            if let Some(identifier) = &mut self.identifier {
                                identifier.push(ch);
                            }
                        }
                        self.identifier_copied_to = self.buffer.end();
                    }
                    None => break,
                },
                0x80..=0xFF => {
                    let (ch, width) = self.decode_char();
                    if !ch.is_identifier_part() {
                        break;
                    }
                    if ch.is_format() {
                        self.flush_identifier();
                        self.buffer.advance_by(width);
                        self.identifier_copied_to = self.buffer.end();
                    } else {
                        self.buffer.advance_by(width);
                    }
                }
                _ => break,
            }
        }
        if self.identifier.is_some() {
            self.flush_identifier();
            if self.identifier.as_deref() == Some("") {
                let text = self.token_text().into_owned();
                self.report(errors, self.token_range(), ErrorCode::UnexpectedToken, vec![text]);
            }
        }
    }

    fn scan_number(&mut self, lead: u8, errors: &mut ErrorSink) -> Token {
        let mut token = if lead == b'.' {
            Token::RealLiteral
        } else {
            Token::IntegerLiteral
        };
        if lead == b'0' && matches!(self.buffer.current(), b'x' | b'X') {
            if !self.buffer.peek(1).is_ascii_hexdigit() {
                // `0` on its own; the `x` starts the next token.
                self.literal_end = self.buffer.end();
                self.scan_suffix(errors);
                return token;
            }
            self.buffer.advance();
            while self.buffer.current().is_ascii_hexdigit() {
                self.buffer.advance();
            }
            self.literal_end = self.buffer.end();
            self.scan_suffix(errors);
            return Token::HexLiteral;
        }
        let mut found_point = lead == b'.';
        let mut found_exponent = false;
        let mut first_point = None;
        loop {
            let c = self.buffer.current();
            match c {
                b'0'..=b'9' => {}
                b'.' => {
                    if found_point {
                        break;
                    }
                    found_point = true;
                    first_point = Some(self.buffer.end());
                    token = Token::RealLiteral;
                }
                b'e' | b'E' => {
                    if found_exponent {
                        break;
                    }
                    found_exponent = true;
                    found_point = true;
                    token = Token::RealLiteral;
                }
                b'+' | b'-' if matches!(self.previous_byte(), b'e' | b'E') => {}
                _ => break,
            }
            self.buffer.advance();
        }
        let mut last = self.previous_byte();
        if last == b'.' {
            // `1.Foo` is an integer followed by a member access.
            self.buffer.retreat(1);
            token = Token::IntegerLiteral;
        } else {
            if last == b'+' || last == b'-' {
                self.buffer.retreat(1);
                last = self.previous_byte();
            }
            if last == b'e' || last == b'E' {
                self.buffer.retreat(1);
                if first_point.is_none() && lead != b'.' {
                    token = Token::IntegerLiteral;
                }
            }
        }
        self.literal_end = self.buffer.end();
        self.scan_suffix(errors);
        token
    }

    fn scan_suffix(&mut self, errors: &mut ErrorSink) {
        let suffix_start = self.buffer.end();
        self.suffix = match self.buffer.current() {
            b'u' | b'U' => {
                self.buffer.advance();
                if matches!(self.buffer.current(), b'l' | b'L') {
                    self.buffer.advance();
                    LiteralSuffix::UnsignedLong
                } else {
                    LiteralSuffix::Unsigned
                }
            }
            ch @ (b'l' | b'L') => {
                self.buffer.advance();
                if ch == b'l' {
                    let range = Range(suffix_start, self.buffer.end());
                    self.report(errors, range, ErrorCode::LowercaseEllSuffix, vec![]);
                }
                if matches!(self.buffer.current(), b'u' | b'U') {
                    self.buffer.advance();
                    LiteralSuffix::UnsignedLong
                } else {
                    LiteralSuffix::Long
                }
            }
            b'f' | b'F' => {
                self.buffer.advance();
                LiteralSuffix::Float
            }
            b'd' | b'D' => {
                self.buffer.advance();
                LiteralSuffix::Double
            }
            b'm' | b'M' => {
                self.buffer.advance();
                LiteralSuffix::Decimal
            }
            _ => LiteralSuffix::None,
        };
    }

    fn scan_character(&mut self, errors: &mut ErrorSink) {
        let (chars, terminated) = self.scan_quoted(b'\'', errors);
        match chars.first() {
            None => {
                if self.buffer.current() == b'\'' && terminated {
                    self.buffer.advance();
                    self.char_value = '\'' as u32;
                    let range = self.token_range();
                    self.report(errors, range, ErrorCode::UnescapedSingleQuote, vec![]);
                } else {
                    self.report(errors, self.token_range(), ErrorCode::EmptyCharConst, vec![]);
                }
            }
            Some(&(_, ch)) => {
                self.char_value = ch as u32;
                if terminated && chars.len() > 1 {
                    self.report(errors, self.token_range(), ErrorCode::TooManyCharsInConst, vec![]);
                }
            }
        }
        self.literal = chars.into_iter().map(|(_, ch)| ch).collect();
    }

    fn scan_string(&mut self, closing: u8, errors: &mut ErrorSink) {
        let (chars, _) = self.scan_quoted(closing, errors);
        self.literal = chars.into_iter().map(|(_, ch)| ch).collect();
    }

    /// Scans up to and including the closing quote. Each decoded character is
    /// paired with the offset its source spelling starts at.
    fn scan_quoted(&mut self, closing: u8, errors: &mut ErrorSink) -> (Vec<(usize, char)>, bool) {
        let mut chars = Vec::new();
        loop {
            if self.buffer.at_end() || self.at_end_of_line() {
                let resume = self.recover_missing_quote(closing, errors);
                if let Some(resume) = resume {
                    // The literal continues past the line break.
                    while self.buffer.end() < resume {
                        let at = self.buffer.end();
                        let (ch, width) = self.decode_char();
                        self.buffer.advance_by(width);
                        if self.buffer.end() < resume {
                            chars.push((at, ch));
                        }
                    }
                    return (chars, true);
                }
                let end = self.buffer.end();
                chars.retain(|&(at, _)| at < end);
                return (chars, false);
            }
            let at = self.buffer.end();
            match self.buffer.current() {
                c if c == closing => {
                    self.buffer.advance();
                    return (chars, true);
                }
                b'\\' => {
                    self.buffer.advance();
                    let ch = self.scan_escape(errors);
                    chars.push((at, ch));
                }
                _ => {
                    let (ch, width) = self.decode_char();
                    self.buffer.advance_by(width);
                    chars.push((at, ch));
                }
            }
        }
    }

    /// Called at the line break (or end of document) that interrupts a
    /// quoted literal. If the closing quote follows shortly on the next line,
    /// reports a newline in the literal and returns the offset just past that
    /// quote. Otherwise reports the missing quote where it most likely
    /// belongs and leaves the cursor there.
    fn recover_missing_quote(&mut self, closing: u8, errors: &mut ErrorSink) -> Option<usize> {
        let line_end = self.buffer.end();
        let token_start = self.buffer.start();
        if !self.buffer.at_end() {
            let resident_end = self.buffer.resident_end();
            for i in line_end..resident_end {
                let ch = self.byte_at(i);
                if ch == closing {
                    let range = Range(token_start, line_end);
                    self.report(errors, range, ErrorCode::NewlineInConst, vec![]);
                    return Some(i + 1);
                }
                if LITERAL_BREAKERS.contains(&ch) {
                    break;
                }
            }
        }

        let mut last_semicolon = line_end;
        let mut last_non_blank = token_start;
        let mut i = token_start + 1;
        while i < line_end {
            let ch = self.byte_at(i);
            if ch == b';' {
                last_semicolon = i;
                last_non_blank = i;
            }
            if ch == b'/' && i + 1 < line_end && matches!(self.byte_at(i + 1), b'/' | b'*') {
                break;
            }
            if !(ch as char).is_blank_space() {
                last_non_blank = i;
            }
            i += 1;
        }
        let insert_at = if last_semicolon == last_non_blank {
            last_semicolon
        } else {
            i
        }
        .max(token_start + 1);
        let code = if closing == b'"' {
            ErrorCode::ExpectedDoubleQuote
        } else {
            ErrorCode::ExpectedSingleQuote
        };
        let range = Range(insert_at, (insert_at + 1).min(self.buffer.len()));
        self.report(errors, range, code, vec![]);
        self.buffer.seek(insert_at);
        None
    }

    fn byte_at(&self, offset: usize) -> u8 {
        self.buffer
            .slice(offset, offset + 1)
            .and_then(|bytes| bytes.first().copied())
            .unwrap_or(0)
    }

    fn scan_verbatim_string(&mut self, errors: &mut ErrorSink) {
        let mut literal = String::new();
        loop {
            if self.buffer.at_end() {
                self.report(errors, self.token_range(), ErrorCode::NewlineInConst, vec![]);
                break;
            }
            if self.eat(b'"') {
                if self.eat(b'"') {
                    literal.push('"');
                    continue;
                }
                break;
            }
            let (ch, width) = self.decode_char();
            self.buffer.advance_by(width);
            literal.push(ch);
        }
        self.literal = literal;
    }

    /// Decodes an escape sequence; the cursor is just past the backslash.
    fn scan_escape(&mut self, errors: &mut ErrorSink) -> char {
        let error_start = self.buffer.end() - 1;
        if self.buffer.at_end() {
            let range = Range(error_start, self.buffer.end());
            self.report(errors, range, ErrorCode::IllegalEscape, vec![]);
            return '\0';
        }
        let c = self.buffer.current();
        self.buffer.advance();
        match c {
            b'a' => '\x07',
            b'b' => '\x08',
            b't' => '\t',
            b'n' => '\n',
            b'v' => '\x0B',
            b'f' => '\x0C',
            b'r' => '\r',
            b'"' => '"',
            b'\'' => '\'',
            b'\\' => '\\',
            b'0' => '\0',
            b'u' => self.scan_hex_escape(error_start, true, errors),
            b'x' => self.scan_hex_escape(error_start, false, errors),
            b'U' => self.scan_long_escape(error_start, errors),
            _ => {
                if c >= 0x80 {
                    self.buffer.retreat(1);
                    let (_, width) = self.decode_char();
                    self.buffer.advance_by(width);
                }
                let range = Range(error_start, self.buffer.end());
                self.report(errors, range, ErrorCode::IllegalEscape, vec![]);
                if c == b'X' {
                    self.scan_hex_escape(error_start, false, errors)
                } else {
                    '\0'
                }
            }
        }
    }

    /// `\x` takes one to four hex digits, `\u` exactly four.
    fn scan_hex_escape(
        &mut self,
        error_start: usize,
        require_four: bool,
        errors: &mut ErrorSink,
    ) -> char {
        let mut value = 0;
        for i in 0..4 {
            match (self.buffer.current() as char).hex_value() {
                Some(digit) => {
                    value = value << 4 | digit;
                    self.buffer.advance();
                }
                None => {
                    if i == 0 || require_four {
                        let range = Range(error_start, self.buffer.end());
                        self.report(errors, range, ErrorCode::IllegalEscape, vec![]);
                    }
                    break;
                }
            }
        }
        char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn scan_long_escape(&mut self, error_start: usize, errors: &mut ErrorSink) -> char {
        let mut value = 0u32;
        for _ in 0..8 {
            match (self.buffer.current() as char).hex_value() {
                Some(digit) => {
                    value = value << 4 | digit;
                    self.buffer.advance();
                }
                None => {
                    let range = Range(error_start, self.buffer.end());
                    self.report(errors, range, ErrorCode::IllegalEscape, vec![]);
                    break;
                }
            }
        }
        match char::from_u32(value) {
            Some(ch) => ch,
            None => {
                let range = Range(error_start, self.buffer.end());
                self.report(errors, range, ErrorCode::IllegalEscape, vec![]);
                char::REPLACEMENT_CHARACTER
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scanner(src: &str) -> Scanner<&str> {
        Scanner::new(src, ScanOptions::default())
    }

    fn lex_all(src: &str) -> (Vec<(Token, String)>, Vec<ErrorCode>) {
        let mut scanner = scanner(src);
        let mut errors = ErrorSink::new();
        let mut tokens = Vec::new();
        loop {
            let token = scanner.next_token(&mut errors);
            if token == Token::EndOfFile {
                break;
            }
            tokens.push((token, scanner.token_text().into_owned()));
        }
        (tokens, errors.iter().map(|e| e.code).collect())
    }

    fn kinds(src: &str) -> Vec<Token> {
        lex_all(src).0.into_iter().map(|(token, _)| token).collect()
    }

    #[test]
    fn test_maximal_munch() {
        assert_eq!(
            kinds("<<= << <= < <==> <== >>= ->"),
            vec![
                Token::LeftShiftAssign,
                Token::LeftShift,
                Token::LessThanOrEqual,
                Token::LessThan,
                Token::Iff,
                Token::LessThanOrEqual,
                Token::Assign,
                Token::RightShiftAssign,
                Token::Arrow,
            ]
        );
        assert_eq!(
            kinds("==> == => ?? ? :: .. ~>"),
            vec![
                Token::Implies,
                Token::Equal,
                Token::Lambda,
                Token::NullCoalescing,
                Token::Conditional,
                Token::DoubleColon,
                Token::Range,
                Token::Maplet,
            ]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            lex_all("class Foo classy __arglist __x _y @class"),
            (
                vec![
                    (Token::Class, "class".to_owned()),
                    (Token::Identifier, "Foo".to_owned()),
                    (Token::Identifier, "classy".to_owned()),
                    (Token::ArgList, "__arglist".to_owned()),
                    (Token::Identifier, "__x".to_owned()),
                    (Token::Identifier, "_y".to_owned()),
                    (Token::Identifier, "@class".to_owned()),
                ],
                vec![]
            )
        );
    }

    #[test]
    fn test_spec_sharp_keywords_can_be_disabled() {
        let options = ScanOptions {
            spec_sharp_keywords: false,
            ..ScanOptions::default()
        };
        let mut scanner = Scanner::new("requires", options);
        assert_eq!(scanner.next_token(&mut ErrorSink::new()), Token::Identifier);
    }

    #[test]
    fn test_plain_identifier_is_borrowed() {
        let mut scanner = scanner("  hello ");
        scanner.next_token(&mut ErrorSink::new());
        assert!(matches!(scanner.identifier_text(), Cow::Borrowed("hello")));
    }

    #[test]
    fn test_verbatim_identifier() {
        let mut scanner = scanner("@class");
        assert_eq!(scanner.next_token(&mut ErrorSink::new()), Token::Identifier);
        assert!(matches!(scanner.identifier_text(), Cow::Borrowed("class")));
    }

    #[test]
    fn test_escaped_identifier() {
        let mut errors = ErrorSink::new();
        let mut scanner = scanner("\\u0066oo b\\u0061r");
        assert_eq!(scanner.next_token(&mut errors), Token::Identifier);
        assert_eq!(scanner.identifier_text(), "foo");
        assert_eq!(scanner.next_token(&mut errors), Token::Identifier);
        assert_eq!(scanner.identifier_text(), "bar");
        assert_eq!(scanner.token_text(), "b\\u0061r");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_unicode_identifier() {
        assert_eq!(
            lex_all("\u{3042}\u{3044} x"),
            (
                vec![
                    (Token::Identifier, "\u{3042}\u{3044}".to_owned()),
                    (Token::Identifier, "x".to_owned()),
                ],
                vec![]
            )
        );
    }

    #[test]
    fn test_integer_then_dot() {
        assert_eq!(
            lex_all("1.ToString"),
            (
                vec![
                    (Token::IntegerLiteral, "1".to_owned()),
                    (Token::Dot, ".".to_owned()),
                    (Token::Identifier, "ToString".to_owned()),
                ],
                vec![]
            )
        );
        assert_eq!(kinds("1."), vec![Token::IntegerLiteral, Token::Dot]);
        assert_eq!(kinds("1..2"), vec![Token::IntegerLiteral, Token::Range, Token::IntegerLiteral]);
    }

    #[test]
    fn test_hex_prefix_without_digits() {
        assert_eq!(
            lex_all("0x"),
            (
                vec![
                    (Token::IntegerLiteral, "0".to_owned()),
                    (Token::Identifier, "x".to_owned()),
                ],
                vec![]
            )
        );
        assert_eq!(kinds("0x1F"), vec![Token::HexLiteral]);
    }

    #[test]
    fn test_reals() {
        assert_eq!(
            kinds("1.5 .5 1e10 1.5e-3 1e+"),
            vec![
                Token::RealLiteral,
                Token::RealLiteral,
                Token::RealLiteral,
                Token::RealLiteral,
                Token::IntegerLiteral,
                Token::Identifier,
                Token::Plus,
            ]
        );
    }

    #[test]
    fn test_suffixes() {
        let mut errors = ErrorSink::new();
        let mut scanner = scanner("10UL 3l 2.5f 0xFFu 7m");
        let mut seen = Vec::new();
        while scanner.next_token(&mut errors) != Token::EndOfFile {
            seen.push((scanner.number_text().into_owned(), scanner.suffix()));
        }
        assert_eq!(
            seen,
            vec![
                ("10".to_owned(), LiteralSuffix::UnsignedLong),
                ("3".to_owned(), LiteralSuffix::Long),
                ("2.5".to_owned(), LiteralSuffix::Float),
                ("0xFF".to_owned(), LiteralSuffix::Unsigned),
                ("7".to_owned(), LiteralSuffix::Decimal),
            ]
        );
        let codes: Vec<_> = errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![ErrorCode::LowercaseEllSuffix]);
        assert_eq!(errors.iter().next().map(|e| e.range), Some(Range(6, 7)));
    }

    #[test]
    fn test_string_escapes() {
        let mut errors = ErrorSink::new();
        let mut scanner = scanner(r#""a\tb\x0041B\U00000043\\""#);
        assert_eq!(scanner.next_token(&mut errors), Token::StringLiteral);
        assert_eq!(scanner.string_value(), "a\tbABC\\");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_illegal_escape() {
        let mut errors = ErrorSink::new();
        let mut scanner = scanner(r#""\q" "\u12""#);
        assert_eq!(scanner.next_token(&mut errors), Token::StringLiteral);
        assert_eq!(scanner.next_token(&mut errors), Token::StringLiteral);
        let codes: Vec<_> = errors.iter().map(|e| (e.code, e.range)).collect();
        assert_eq!(
            codes,
            vec![
                (ErrorCode::IllegalEscape, Range(1, 3)),
                (ErrorCode::IllegalEscape, Range(6, 10)),
            ]
        );
    }

    #[test]
    fn test_verbatim_string() {
        let mut errors = ErrorSink::new();
        let mut scanner = scanner("@\"a\"\"b\\n\nc\"");
        assert_eq!(scanner.next_token(&mut errors), Token::StringLiteral);
        assert_eq!(scanner.string_value(), "a\"b\\n\nc");
        assert_eq!(scanner.next_token(&mut errors), Token::EndOfFile);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_unterminated_string_before_semicolon() {
        let (tokens, errors) = lex_all("x = \"abc;\ny");
        assert_eq!(
            tokens,
            vec![
                (Token::Identifier, "x".to_owned()),
                (Token::Assign, "=".to_owned()),
                (Token::StringLiteral, "\"abc".to_owned()),
                (Token::Semicolon, ";".to_owned()),
                (Token::Identifier, "y".to_owned()),
            ]
        );
        assert_eq!(errors, vec![ErrorCode::ExpectedDoubleQuote]);
    }

    #[test]
    fn test_newline_inside_string() {
        let mut errors = ErrorSink::new();
        let mut scanner = scanner("\"ab\ncd\" x");
        assert_eq!(scanner.next_token(&mut errors), Token::StringLiteral);
        assert_eq!(scanner.string_value(), "ab\ncd");
        assert_eq!(scanner.next_token(&mut errors), Token::Identifier);
        let codes: Vec<_> = errors.iter().map(|e| (e.code, e.range)).collect();
        assert_eq!(codes, vec![(ErrorCode::NewlineInConst, Range(0, 3))]);
    }

    #[test]
    fn test_unterminated_string_at_end() {
        let (tokens, errors) = lex_all("\"abc");
        assert_eq!(tokens, vec![(Token::StringLiteral, "\"abc".to_owned())]);
        assert_eq!(errors, vec![ErrorCode::ExpectedDoubleQuote]);
    }

    #[test]
    fn test_character_literals() {
        let mut errors = ErrorSink::new();
        let mut scanner = scanner(r"'a' '\n' '' 'ab' '''");
        let mut values = Vec::new();
        while scanner.next_token(&mut errors) != Token::EndOfFile {
            values.push(scanner.char_value());
        }
        assert_eq!(values, vec!['a' as u32, '\n' as u32, 0, 'a' as u32, '\'' as u32]);
        let codes: Vec<_> = errors.iter().map(|e| e.code).collect();
        assert_eq!(
            codes,
            vec![
                ErrorCode::EmptyCharConst,
                ErrorCode::TooManyCharsInConst,
                ErrorCode::UnescapedSingleQuote,
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(kinds("a // x\n/* y\n */ b"), vec![Token::Identifier, Token::Identifier]);
        let options = ScanOptions {
            ignore_comments: false,
            ..ScanOptions::default()
        };
        let mut scanner = Scanner::new("// x\n/* y */", options);
        let mut errors = ErrorSink::new();
        assert_eq!(scanner.next_token(&mut errors), Token::SingleLineComment);
        assert_eq!(scanner.next_token(&mut errors), Token::MultiLineComment);
        assert_eq!(scanner.token_text(), "/* y */");
    }

    #[test]
    fn test_unterminated_comment() {
        let (tokens, errors) = lex_all("a /* b");
        assert_eq!(tokens, vec![(Token::Identifier, "a".to_owned())]);
        assert_eq!(errors, vec![ErrorCode::NoCommentEnd]);
    }

    #[test]
    fn test_line_break_flag() {
        let mut errors = ErrorSink::new();
        let mut scanner = scanner("a b\r\nc\u{2028}d");
        let mut flags = Vec::new();
        while scanner.next_token(&mut errors) != Token::EndOfFile {
            flags.push(scanner.is_first_after_line_break());
        }
        assert_eq!(flags, vec![false, false, true, true]);
        assert!(scanner.is_first_after_line_break());
    }

    #[test]
    fn test_illegal_characters() {
        assert_eq!(
            kinds("# ` @ \\q"),
            vec![
                Token::IllegalCharacter,
                Token::IllegalCharacter,
                Token::IllegalCharacter,
                Token::IllegalCharacter,
            ]
        );
    }

    #[test]
    fn test_peek_is_idempotent() {
        let src = "foo\n  (bar) \"s\" 12u";
        let mut plain = scanner(src);
        let mut peeking = scanner(src);
        let mut errors = ErrorSink::new();
        plain.next_token(&mut errors);
        peeking.next_token(&mut errors);
        loop {
            let peeked = peeking.peek_next_token(&mut errors);
            assert_eq!(peeking.token(), plain.token());
            assert_eq!(peeking.token_range(), plain.token_range());
            assert_eq!(peeking.is_first_after_line_break(), plain.is_first_after_line_break());
            assert_eq!(peeking.token_text(), plain.token_text());
            if plain.token() == Token::EndOfFile {
                break;
            }
            let expected = plain.next_token(&mut errors);
            let actual = peeking.next_token(&mut errors);
            assert_eq!(peeked, expected);
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_restore_rescans_current_token() {
        let mut errors = ErrorSink::new();
        let mut scanner = scanner("a\nb c");
        scanner.next_token(&mut errors);
        scanner.next_token(&mut errors);
        let mark = scanner.save_position();
        scanner.next_token(&mut errors);
        scanner.restore_position(mark);
        assert_eq!(scanner.next_token(&mut errors), Token::Identifier);
        assert_eq!(scanner.token_text(), "b");
        assert!(scanner.is_first_after_line_break());
    }

    #[test]
    fn test_rollback_reports_again() {
        let mut scanner = scanner("x '' y");
        let mut kept = ErrorSink::new();
        scanner.next_token(&mut kept);
        let checkpoint = scanner.checkpoint();
        let mut scratch = ErrorSink::new();
        scanner.next_token(&mut scratch);
        assert_eq!(scratch.len(), 1);
        scanner.rollback(checkpoint);
        scanner.next_token(&mut kept);
        scanner.next_token(&mut kept);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_small_fragments() {
        let src = "namespace N { class LongerName { int x = 0x1234; string s = \"hi there\"; } }";
        let expected = lex_all(src);
        for size in 1..8 {
            let mut scanner = Scanner::with_fragment_size(src, ScanOptions::default(), size);
            let mut errors = ErrorSink::new();
            let mut tokens = Vec::new();
            while scanner.next_token(&mut errors) != Token::EndOfFile {
                tokens.push((scanner.token(), scanner.token_text().into_owned()));
            }
            assert_eq!(tokens, expected.0, "fragment size {}", size);
        }
    }
}
