//! The recursive-descent parser.
//!
//! Every `parse_*` method takes the set of tokens its caller can resume on
//! (the *followers*) and returns with the current token in that set or at
//! end of file. Malformed input never aborts a parse: the parser reports a
//! diagnostic, skips to a follower and substitutes a placeholder node.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::ast::{Ident, MemberDecl, NamespaceDecl, NamespaceMember, Range};
use crate::lexing::{Checkpoint, ScanOptions, Scanner};
use crate::names::{Name, NameTable};
use crate::parser_diagnostics::{ErrorCode, ErrorSink, ParseError};
use crate::source::{SourceText, INITIAL_FRAGMENT_SIZE};
use crate::token::Token;
use crate::token_set::TokenSet;

mod decls;
mod exprs;
mod literals;
mod members;
mod modifiers;
mod recovery;
pub(crate) mod sets;
mod stmts;
mod types;

/// Deepest nesting of expressions, types, statements and blocks the parser
/// descends into before giving up on the innermost construct.
const MAX_NESTING: u32 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub ignore_comments: bool,
    pub spec_sharp_keywords: bool,
    /// Size of the scanner's first source fragment; it doubles as needed.
    pub initial_fragment_size: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            ignore_comments: true,
            spec_sharp_keywords: true,
            initial_fragment_size: INITIAL_FRAGMENT_SIZE,
        }
    }
}

impl ParseOptions {
    fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            ignore_comments: self.ignore_comments,
            spec_sharp_keywords: self.spec_sharp_keywords,
        }
    }
}

/// A tree together with the diagnostics reported while building it and the
/// table its [`Name`]s resolve against.
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutput<T> {
    pub tree: T,
    pub errors: Vec<ParseError>,
    pub names: NameTable,
}

pub fn parse(source: &[u8]) -> ParseOutput<NamespaceDecl> {
    parse_source(source, &ParseOptions::default())
}

/// Parses a whole compilation unit.
pub fn parse_source<S: SourceText>(
    source: S,
    options: &ParseOptions,
) -> ParseOutput<NamespaceDecl> {
    let mut parser = Parser::new(source, options);
    let tree = parser.parse_compilation_unit();
    parser.finish(tree)
}

/// Parses exactly one namespace or type declaration. The tree is `None`
/// unless the source holds one declaration and nothing after it.
pub fn parse_namespace_member<S: SourceText>(
    source: S,
    options: &ParseOptions,
) -> ParseOutput<Option<NamespaceMember>> {
    let mut parser = Parser::new(source, options);
    let tree = parser.parse_single_namespace_member();
    parser.finish(tree)
}

/// Parses exactly one member of the type named `type_name`. The tree is
/// `None` unless the source holds one member and nothing after it.
pub fn parse_type_member<S: SourceText>(
    source: S,
    options: &ParseOptions,
    type_name: &str,
) -> ParseOutput<Option<MemberDecl>> {
    let mut parser = Parser::new(source, options);
    let tree = parser.parse_single_type_member(type_name);
    parser.finish(tree)
}

/// Outcome of [`Parser::speculate`].
#[derive(Debug)]
pub(crate) enum Speculation<T> {
    /// The attempt was accepted; its tree is kept and its diagnostics are
    /// merged into the main sink.
    Committed(T),
    /// The attempt was discarded and the parser rewound.
    RolledBack,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ParserCheckpoint {
    scanner: Checkpoint,
    prev_end: usize,
}

#[derive(Debug)]
pub(crate) struct Parser<S> {
    scanner: Scanner<S>,
    /// The current token. Usually the scanner's, except that a `>>` closing
    /// two type argument lists is split by overwriting it with `>`.
    token: Token,
    errors: ErrorSink,
    names: NameTable,
    /// End of the last consumed token; closes node ranges.
    prev_end: usize,
    inside_block: bool,
    inside_type: bool,
    /// Set while a `try` block is open, so a `catch` ends its statement list.
    unmatched_try: bool,
    /// Guarded productions currently open; see [`Parser::nested`].
    nesting: u32,
    started: bool,
    global: Name,
}

impl<S: SourceText> Parser<S> {
    pub(crate) fn new(source: S, options: &ParseOptions) -> Parser<S> {
        let scanner = Scanner::with_fragment_size(
            source,
            options.scan_options(),
            options.initial_fragment_size.max(1),
        );
        let mut names = NameTable::new();
        let global = names.intern("global");
        Parser {
            scanner,
            token: Token::None,
            errors: ErrorSink::new(),
            names,
            prev_end: 0,
            inside_block: false,
            inside_type: false,
            unmatched_try: false,
            nesting: 0,
            started: false,
            global,
        }
    }

    /// Scans the first token. A parser serves exactly one entry point.
    fn start(&mut self) {
        assert!(!self.started, "a parser instance can only be used once");
        self.started = true;
        self.token = self.scanner.next_token(&mut self.errors);
    }

    fn finish<T>(self, tree: T) -> ParseOutput<T> {
        debug!(
            errors = self.errors.len(),
            refills = self.scanner.buffer().refills(),
            "parse finished"
        );
        ParseOutput {
            tree,
            errors: self.errors.into_vec(),
            names: self.names,
        }
    }

    fn parse_compilation_unit(&mut self) -> NamespaceDecl {
        self.start();
        self.parse_namespace_body(None, true, Range::empty_at(0), sets::END_OF_FILE)
    }

    fn parse_single_namespace_member(&mut self) -> Option<NamespaceMember> {
        self.start();
        let mut members = Vec::new();
        self.parse_namespace_member_declarations(
            &mut members,
            sets::END_OF_FILE | sets::ATTRIBUTE_OR_NAMESPACE_OR_TYPE_DECLARATION_START,
        );
        if members.len() != 1 || self.token != Token::EndOfFile {
            return None;
        }
        members.pop()
    }

    fn parse_single_type_member(&mut self, type_name: &str) -> Option<MemberDecl> {
        self.start();
        let type_name = self.names.intern(type_name);
        let mut members = Vec::new();
        let followers = sets::END_OF_FILE
            | sets::TYPE_MEMBER_START
            | Token::RightBrace
            | sets::ATTRIBUTE_OR_NAMESPACE_OR_TYPE_DECLARATION_START;
        self.parse_type_members(type_name, &mut members, followers);
        if members.len() != 1 || self.token != Token::EndOfFile {
            return None;
        }
        members.pop()
    }

    /// Consumes the current token.
    fn bump(&mut self) {
        if self.token == Token::EndOfFile {
            return;
        }
        self.prev_end = self.scanner.token_range().end();
        self.token = self.scanner.next_token(&mut self.errors);
        trace!(token = ?self.token, range = ?self.scanner.token_range(), "bump");
    }

    /// The token after the current one.
    fn peek(&mut self) -> Token {
        if self.token == Token::EndOfFile {
            return Token::EndOfFile;
        }
        self.scanner.peek_next_token(&mut self.errors)
    }

    fn at(&self, set: TokenSet) -> bool {
        set.contains(self.token)
    }

    fn token_range(&self) -> Range {
        self.scanner.token_range()
    }

    fn token_start(&self) -> usize {
        self.token_range().start()
    }

    /// Range from `start` to the end of the last consumed token.
    fn range_from(&self, start: usize) -> Range {
        Range(start, self.prev_end.max(start))
    }

    fn token_text(&self) -> String {
        self.scanner.token_text().into_owned()
    }

    fn error(&mut self, code: ErrorCode, params: Vec<String>) {
        let range = self.token_range();
        self.error_at(range, code, params);
    }

    fn error_at(&mut self, range: Range, code: ErrorCode, params: Vec<String>) {
        self.errors.add(ParseError::new(range, code, params));
    }

    fn intern(&mut self, spelling: &str) -> Name {
        self.names.intern(spelling)
    }

    /// Interns the current identifier (or non-reserved keyword) and consumes
    /// it. On any other token, consumes nothing and yields an empty name.
    fn parse_name_declaration(&mut self) -> Ident {
        let range = self.token_range();
        if self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) {
            let name = self.names.intern(&self.scanner.identifier_text());
            self.bump();
            Ident { name, range }
        } else {
            Ident {
                name: self.intern(""),
                range: Range::empty_at(range.start()),
            }
        }
    }

    /// Runs `parse` one nesting level deeper. Past [`MAX_NESTING`] levels,
    /// reports and skips the current token or the bracketed group it opens,
    /// then builds a placeholder with `fallback` from the skipped range.
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> T,
        fallback: impl FnOnce(Range) -> T,
    ) -> T {
        if self.nesting >= MAX_NESTING {
            let start = self.token_start();
            self.error(ErrorCode::NestingTooDeep, vec![]);
            self.skip_group();
            return fallback(self.range_from(start));
        }
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    fn checkpoint(&self) -> ParserCheckpoint {
        ParserCheckpoint {
            scanner: self.scanner.checkpoint(),
            prev_end: self.prev_end,
        }
    }

    fn rollback(&mut self, checkpoint: ParserCheckpoint) {
        self.scanner.rollback(checkpoint.scanner);
        self.token = self.scanner.next_token(&mut self.errors);
        self.prev_end = checkpoint.prev_end;
    }

    /// Runs `parse` against a scratch diagnostic sink, then asks `accept`
    /// whether to keep the result. Both closures see the scratch sink in
    /// `self.errors`. A rejected attempt is rewound without a trace.
    fn speculate<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> T,
        accept: impl FnOnce(&mut Self, &T) -> bool,
    ) -> Speculation<T> {
        let checkpoint = self.checkpoint();
        let saved = self.errors.swap(ErrorSink::new());
        let result = parse(self);
        let accepted = accept(self, &result);
        let scratch = self.errors.swap(saved);
        if accepted {
            self.errors.extend(scratch);
            Speculation::Committed(result)
        } else {
            trace!(discarded = scratch.len(), "speculation rolled back");
            self.rollback(checkpoint);
            Speculation::RolledBack
        }
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;

    /// A started parser over `source`.
    pub(crate) fn parser(source: &str) -> Parser<&str> {
        let mut parser = Parser::new(source, &ParseOptions::default());
        parser.start();
        parser
    }

    pub(crate) fn codes<S>(parser: &Parser<S>) -> Vec<ErrorCode> {
        parser.errors.iter().map(|error| error.code).collect()
    }

    /// Asserts the follower postcondition.
    pub(crate) fn assert_at_follower<S>(parser: &Parser<S>, followers: TokenSet) {
        assert!(
            followers.contains(parser.token) || parser.token == Token::EndOfFile,
            "stopped at {:?}",
            parser.token
        );
    }
}

#[cfg(test)]
mod tests {
    use super::test_util::*;
    use super::*;

    #[test]
    fn test_speculation_rollback_restores_position_and_errors() {
        let mut p = parser("a b c");
        let result = p.speculate(
            |p| {
                p.bump();
                p.error(ErrorCode::TypeExpected, vec![]);
                p.bump();
                p.token
            },
            |_, _| false,
        );
        assert!(matches!(result, Speculation::RolledBack));
        assert_eq!(p.token, Token::Identifier);
        assert_eq!(p.token_range(), Range(0, 1));
        assert!(p.errors.is_empty());
    }

    #[test]
    fn test_speculation_commit_merges_errors() {
        let mut p = parser("a b c");
        let result = p.speculate(
            |p| {
                p.bump();
                p.error(ErrorCode::TypeExpected, vec![]);
                p.token_range()
            },
            |p, _| p.errors.len() == 1,
        );
        assert!(matches!(result, Speculation::Committed(Range(2, 3))));
        assert_eq!(codes(&p), vec![ErrorCode::TypeExpected]);
        assert_eq!(p.token_range(), Range(2, 3));
    }

    #[test]
    fn test_peek_does_not_move() {
        let mut p = parser("x + y");
        assert_eq!(p.peek(), Token::Plus);
        assert_eq!(p.peek(), Token::Plus);
        assert_eq!(p.token, Token::Identifier);
        p.bump();
        assert_eq!(p.token, Token::Plus);
        assert_eq!(p.prev_end, 1);
    }

    #[test]
    #[should_panic(expected = "only be used once")]
    fn test_single_use() {
        let mut p = parser("");
        p.start();
    }

    #[test]
    fn test_single_member_entry_points() {
        let output = parse_namespace_member("class C { }", &ParseOptions::default());
        assert!(output.tree.is_some());
        let output = parse_namespace_member("class C { } class D { }", &ParseOptions::default());
        assert!(output.tree.is_none());
        let output = parse_type_member("int x;", &ParseOptions::default(), "C");
        assert!(output.tree.is_some());
        let output = parse_type_member("int x; int y;", &ParseOptions::default(), "C");
        assert!(output.tree.is_none());
    }
}
