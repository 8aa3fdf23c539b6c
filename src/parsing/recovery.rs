//! Error recovery primitives shared by every production.

use super::Parser;
use crate::parser_diagnostics::ErrorCode;
use crate::source::SourceText;
use crate::token::Token;
use crate::token_set::TokenSet;

impl<S: SourceText> Parser<S> {
    /// Consumes `token` if it is current. Otherwise reports what was
    /// expected and consumes nothing.
    pub(super) fn skip(&mut self, token: Token) {
        if self.token == token {
            self.bump();
            return;
        }
        let (code, params) = match token {
            Token::Alias => (ErrorCode::SyntaxError, vec!["alias".to_owned()]),
            Token::Colon => (ErrorCode::SyntaxError, vec![":".to_owned()]),
            Token::Identifier => (ErrorCode::ExpectedIdentifier, vec![]),
            Token::In => (ErrorCode::InExpected, vec![]),
            Token::LeftBrace => (ErrorCode::ExpectedLeftBrace, vec![]),
            Token::LeftParenthesis => (ErrorCode::SyntaxError, vec!["(".to_owned()]),
            Token::RightBrace => (ErrorCode::ExpectedRightBrace, vec![]),
            Token::RightBracket => (ErrorCode::ExpectedRightBracket, vec![]),
            Token::RightParenthesis => (ErrorCode::ExpectedRightParenthesis, vec![]),
            Token::Semicolon => (ErrorCode::ExpectedSemicolon, vec![]),
            _ => (ErrorCode::UnexpectedToken, vec![self.token_text()]),
        };
        self.error(code, params);
    }

    /// Skips to a follower. Reports the first skipped token, with a message
    /// that depends on where the parser is.
    pub(super) fn skip_to(&mut self, followers: TokenSet) {
        if self.at(followers) {
            return;
        }
        let code = if self.token == Token::Using {
            ErrorCode::UsingAfterElements
        } else if !self.inside_block {
            ErrorCode::InvalidMemberDecl
        } else {
            ErrorCode::InvalidExprTerm
        };
        let text = self.token_text();
        self.error(code, vec![text]);
        self.skip_silently_to(followers);
    }

    /// Reports `code` (if any), whether or not the current token is a
    /// follower, then skips to a follower.
    pub(super) fn skip_to_with(
        &mut self,
        followers: TokenSet,
        code: Option<ErrorCode>,
        params: Vec<String>,
    ) {
        if let Some(code) = code {
            self.error(code, params);
        }
        self.skip_silently_to(followers);
    }

    fn skip_silently_to(&mut self, followers: TokenSet) {
        while !self.at(followers) && self.token != Token::EndOfFile {
            self.bump();
        }
    }

    /// Consumes the current token, or the whole bracketed group it opens.
    /// A closing bracket is left for whoever opened it.
    pub(super) fn skip_group(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.token {
                Token::EndOfFile => return,
                Token::LeftParenthesis | Token::LeftBracket | Token::LeftBrace => depth += 1,
                Token::RightParenthesis | Token::RightBracket | Token::RightBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.bump();
            if depth == 0 {
                return;
            }
        }
    }

    /// [`Parser::skip`] then a silent skip to a follower.
    pub(super) fn skip_over_to(&mut self, token: Token, followers: TokenSet) {
        self.skip(token);
        self.skip_to_with(followers, None, vec![]);
    }

    /// Consumes a statement-ending `;`. When it is missing, reports it and
    /// discards the rest of the line, stopping early at a closing brace or
    /// at a token the caller can resume on.
    pub(super) fn skip_semicolon(&mut self, followers: TokenSet) {
        if self.token == Token::Semicolon {
            self.bump();
            self.skip_to(followers);
            return;
        }
        self.skip(Token::Semicolon);
        while !self.scanner.is_first_after_line_break()
            && !matches!(self.token, Token::Semicolon | Token::RightBrace | Token::EndOfFile)
            && !(self.token == Token::LeftBrace && followers.contains(Token::LeftBrace))
            && !self.at(followers)
        {
            self.bump();
        }
        if self.token == Token::Semicolon {
            self.bump();
        }
        self.skip_to(followers);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use crate::parser_diagnostics::ErrorCode;
    use crate::token::Token;
    use crate::token_set::TokenSet;

    #[test]
    fn test_skip_reports_without_consuming() {
        let mut p = parser("x )");
        p.skip(Token::Semicolon);
        assert_eq!(p.token, Token::Identifier);
        p.skip(Token::Identifier);
        p.skip(Token::RightParenthesis);
        assert_eq!(p.token, Token::EndOfFile);
        assert_eq!(codes(&p), vec![ErrorCode::ExpectedSemicolon]);
    }

    #[test]
    fn test_skip_to_reports_once() {
        let mut p = parser("a b c ; d");
        let followers = TokenSet::from(Token::Semicolon);
        p.skip_to(followers);
        assert_at_follower(&p, followers);
        assert_eq!(codes(&p), vec![ErrorCode::InvalidMemberDecl]);
        assert_eq!(p.errors.iter().next().map(|e| e.params.clone()), Some(vec!["a".to_owned()]));
    }

    #[test]
    fn test_skip_to_in_block_and_using() {
        let mut p = parser("+ ;");
        p.inside_block = true;
        p.skip_to(Token::Semicolon.into());
        let mut q = parser("using ;");
        q.skip_to(Token::Semicolon.into());
        assert_eq!(codes(&p), vec![ErrorCode::InvalidExprTerm]);
        assert_eq!(codes(&q), vec![ErrorCode::UsingAfterElements]);
    }

    #[test]
    fn test_skip_group() {
        let mut p = parser("( a [ b ] { ( ) } ) c");
        p.skip_group();
        assert_eq!(p.token, Token::Identifier);
        p.skip_group();
        assert_eq!(p.token, Token::EndOfFile);

        let mut p = parser(") x");
        p.skip_group();
        assert_eq!(p.token, Token::RightParenthesis);
        assert!(codes(&p).is_empty());
    }

    #[test]
    fn test_skip_semicolon_stops_at_line_break() {
        let mut p = parser("x 1 2\n3 y");
        p.bump();
        p.skip_semicolon(TokenSet::EMPTY | Token::Identifier);
        assert_eq!(p.token_text(), "y");
        assert_eq!(
            codes(&p),
            vec![ErrorCode::ExpectedSemicolon, ErrorCode::InvalidMemberDecl]
        );
    }

    #[test]
    fn test_skip_semicolon_swallows_rest_of_line() {
        let mut p = parser("x 1 2 ; y");
        p.bump();
        p.skip_semicolon(Token::Identifier.into());
        assert_eq!(p.token_text(), "y");
        assert_eq!(codes(&p), vec![ErrorCode::ExpectedSemicolon]);
    }
}
