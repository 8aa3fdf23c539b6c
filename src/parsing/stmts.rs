//! Blocks and statements.

use super::{sets, Parser, Speculation};
use crate::ast::{
    Block, CatchClause, Declarator, Expr, ExprKind, Ident, LocalDeclaration, Range, Stmt, StmtKind,
    SwitchCase, TypeExpr, TypeExprKind, UnaryOp,
};
use crate::parser_diagnostics::ErrorCode;
use crate::source::SourceText;
use crate::token::Token;
use crate::token_set::TokenSet;

/// Expressions that may stand alone as a statement.
fn is_statement_expression(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Assign { .. }
        | ExprKind::Call { .. }
        | ExprKind::CreateObject { .. }
        | ExprKind::PopulateCollection { .. }
        | ExprKind::InitializeObject { .. }
        | ExprKind::Postfix { .. } => true,
        ExprKind::Unary { op, .. } => matches!(op, UnaryOp::PreIncrement | UnaryOp::PreDecrement),
        _ => false,
    }
}

impl<S: SourceText> Parser<S> {
    fn in_block<T>(&mut self, parse: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.inside_block, true);
        let result = parse(self);
        self.inside_block = saved;
        result
    }

    /// A member body: a block, or `;` for none.
    pub(super) fn parse_body(&mut self, followers: TokenSet) -> Option<Block> {
        let body = match self.token {
            Token::Semicolon => {
                self.bump();
                None
            }
            Token::LeftBrace => {
                let start = self.token_start();
                self.bump();
                let stmts = self.in_block(|p| p.parse_statements(followers | Token::RightBrace));
                self.skip(Token::RightBrace);
                Some(Block {
                    stmts,
                    range: self.range_from(start),
                })
            }
            _ => None,
        };
        self.skip_to(followers);
        body
    }

    pub(super) fn parse_block(&mut self, followers: TokenSet) -> Block {
        self.nested(
            |p| p.parse_block_unguarded(followers),
            |range| Block { stmts: Vec::new(), range },
        )
    }

    fn parse_block_unguarded(&mut self, followers: TokenSet) -> Block {
        let start = self.token_start();
        self.skip(Token::LeftBrace);
        let stmts = self.in_block(|p| p.parse_statements(followers | Token::RightBrace));
        self.skip(Token::RightBrace);
        let block = Block {
            stmts,
            range: self.range_from(start),
        };
        self.skip_to_with(followers, None, vec![]);
        block
    }

    /// Statements up to a follower. Stops early, without consuming it, at the
    /// `get`/`set` of the next accessor or the `catch`/`finally` of an open
    /// `try`.
    fn parse_statements(&mut self, followers: TokenSet) -> Vec<Stmt> {
        let statement_followers = followers | sets::STATEMENT_START;
        if !self.at(statement_followers) {
            let text = self.token_text();
            self.skip_to_with(statement_followers, Some(ErrorCode::InvalidExprTerm), vec![text]);
        }
        let mut stmts = Vec::new();
        while self.at(sets::STATEMENT_START) {
            match self.parse_statement_or_end(statement_followers) {
                Some(stmt) => stmts.push(stmt),
                None => break,
            }
        }
        self.skip_to(followers);
        stmts
    }

    pub(super) fn parse_statement(&mut self, followers: TokenSet) -> Stmt {
        let start = self.token_start();
        self.nested(
            |p| {
                p.parse_statement_or_end(followers)
                    .unwrap_or_else(|| Stmt::new(StmtKind::Empty, Range::empty_at(start)))
            },
            |range| Stmt::new(StmtKind::Empty, range),
        )
    }

    /// One statement, or `None` at a token that ends the enclosing statement
    /// list. A statement that consumed nothing consumes its first token, so
    /// statement loops always advance.
    fn parse_statement_or_end(&mut self, followers: TokenSet) -> Option<Stmt> {
        let start = self.token_start();
        let reported = self.errors.len();
        let token = self.token;
        let stmt = match token {
            Token::LeftBrace => {
                let block = self.parse_block(followers);
                let range = block.range;
                Stmt::new(StmtKind::Block(block), range)
            }
            Token::Semicolon => {
                let range = self.token_range();
                self.bump();
                self.skip_to(followers);
                Stmt::new(StmtKind::Empty, range)
            }
            Token::If => self.parse_if(followers),
            Token::Switch => self.parse_switch(followers),
            Token::While => self.parse_while(followers),
            Token::Do => self.parse_do_while(followers),
            Token::For => self.parse_for(followers),
            Token::Foreach => self.parse_foreach(followers),
            Token::Break | Token::Continue => {
                let kind = if self.token == Token::Break {
                    StmtKind::Break
                } else {
                    StmtKind::Continue
                };
                self.bump();
                let range = self.range_from(start);
                self.skip_semicolon(followers);
                Stmt::new(kind, range)
            }
            Token::Goto => self.parse_goto(followers),
            Token::Return | Token::Throw => self.parse_return_or_throw(followers),
            Token::Yield => self.parse_yield(followers),
            Token::Try | Token::Catch | Token::Finally => self.parse_try(followers)?,
            Token::Checked | Token::Unchecked if self.peek() != Token::LeftParenthesis => {
                let checked = self.token == Token::Checked;
                self.bump();
                let block = self.parse_block(followers);
                let kind = if checked {
                    StmtKind::Checked(block)
                } else {
                    StmtKind::Unchecked(block)
                };
                Stmt::new(kind, self.range_from(start))
            }
            Token::Unsafe => {
                self.bump();
                let block = self.parse_block(followers);
                Stmt::new(StmtKind::Unsafe(block), self.range_from(start))
            }
            Token::Fixed => self.parse_fixed(followers),
            Token::Lock => self.parse_lock(followers),
            Token::Using => self.parse_using(followers),
            Token::Const => {
                self.bump();
                let ty = self.parse_base_type_expression(
                    false,
                    followers | Token::Identifier | Token::Assign | Token::Comma,
                );
                self.parse_local_declarations(start, ty, true, true, followers)
            }
            // Inside an accessor, `get {` or `set {` opens the next accessor.
            Token::Get | Token::Set if self.at(followers) && self.peek() == Token::LeftBrace => {
                return None
            }
            _ => self.parse_expression_statement_or_declaration(false, true, followers, true),
        };
        if self.token_start() == start && self.token != Token::EndOfFile {
            if self.errors.len() == reported {
                let text = self.token_text();
                self.error(ErrorCode::InvalidExprTerm, vec![text]);
            }
            self.bump();
            self.skip_to(followers);
        }
        Some(stmt)
    }

    /// A local declaration if the statement starts with a type followed by an
    /// identifier, otherwise an expression statement or a label.
    pub(super) fn parse_expression_statement_or_declaration(
        &mut self,
        accept_comma: bool,
        accept_label: bool,
        followers: TokenSet,
        skip_semicolon: bool,
    ) -> Stmt {
        let start = self.token_start();
        let next = self.peek();
        let maybe_type = matches!(next, Token::Conditional | Token::LessThan | Token::Multiply)
            || !(matches!(next, Token::LeftParenthesis | Token::Semicolon)
                || sets::INFIX_OPERATORS.contains(next));
        if maybe_type {
            let type_followers = followers | sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD;
            let attempt = self.speculate(
                |p| p.parse_type_expression(false, false, type_followers),
                |p, _| p.errors.is_empty() && p.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD),
            );
            if let Speculation::Committed(ty) = attempt {
                return self.parse_local_declarations(start, ty, false, skip_semicolon, followers);
            }
        }
        let expr = self.parse_expression(followers | Token::Comma | Token::Colon);
        if accept_label && self.token == Token::Colon {
            if let ExprKind::Name { ident } = expr.kind {
                return self.parse_labeled_statement(ident, followers);
            }
        }
        if !is_statement_expression(&expr) && !followers.contains(Token::RightParenthesis) {
            self.error_at(expr.range, ErrorCode::IllegalStatement, vec![]);
        }
        let range = expr.range;
        if !accept_comma || self.token != Token::Comma {
            if self.token == Token::Semicolon {
                self.bump();
            } else if skip_semicolon {
                self.skip_semicolon(followers);
            }
            self.skip_to(followers);
        }
        let range = range | Range::empty_at(self.prev_end.max(range.end()));
        Stmt::new(StmtKind::Expression { expr }, range)
    }

    fn parse_labeled_statement(&mut self, label: Ident, followers: TokenSet) -> Stmt {
        self.bump();
        let stmt = if self.at(sets::STATEMENT_START) {
            self.parse_statement(followers)
        } else {
            let range = Range::empty_at(self.token_start());
            self.skip_to_with(followers, Some(ErrorCode::ExpectedSemicolon), vec![]);
            Stmt::new(StmtKind::Empty, range)
        };
        let range = label.range | stmt.range;
        Stmt::new(
            StmtKind::Labeled {
                label,
                stmt: Box::new(stmt),
            },
            range,
        )
    }

    /// `T a = 1, b, c = d;` after the type. `constant` marks `const`, which
    /// requires every initializer.
    fn parse_local_declarations(
        &mut self,
        start: usize,
        ty: TypeExpr,
        constant: bool,
        skip_semicolon: bool,
        followers: TokenSet,
    ) -> Stmt {
        let init_followers = followers | Token::Semicolon | Token::Comma;
        let mut declarators = Vec::new();
        loop {
            let name = self.parse_name_declaration();
            let init = if self.token == Token::Assign {
                self.bump();
                Some(self.parse_variable_initializer(&ty, init_followers))
            } else {
                if constant {
                    self.error(ErrorCode::ConstValueRequired, vec![]);
                }
                None
            };
            declarators.push(Declarator {
                name,
                init,
                range: self.range_from(name.range.start()),
            });
            if self.token != Token::Comma {
                break;
            }
            self.bump();
        }
        let range = self.range_from(start);
        if skip_semicolon {
            self.skip_semicolon(followers);
        }
        self.skip_to(followers);
        Stmt::new(
            StmtKind::LocalDeclaration(LocalDeclaration {
                ty,
                constant,
                declarators,
                range,
            }),
            range,
        )
    }

    /// An initializer value; a bare `{ ... }` is allowed for array types.
    pub(super) fn parse_variable_initializer(
        &mut self,
        ty: &TypeExpr,
        followers: TokenSet,
    ) -> Expr {
        match ty.kind {
            TypeExprKind::Array { rank, .. } if self.token == Token::LeftBrace => {
                self.parse_array_initializer(rank, followers)
            }
            _ => self.parse_expression(followers),
        }
    }

    /// Reports a statement that does nothing where a body was expected.
    fn check_mistaken_empty(&mut self, stmt: &Stmt) {
        if stmt.kind == StmtKind::Empty {
            self.error_at(stmt.range, ErrorCode::PossibleMistakenNullStatement, vec![]);
        }
    }

    fn parse_if(&mut self, followers: TokenSet) -> Stmt {
        let start = self.token_start();
        self.bump();
        let cond = self.parse_parenthesized_expression(false, followers | sets::STATEMENT_START);
        let then = self.parse_statement(followers | Token::Else);
        self.check_mistaken_empty(&then);
        let else_ = if self.token == Token::Else {
            self.bump();
            let else_ = self.parse_statement(followers);
            self.check_mistaken_empty(&else_);
            Some(Box::new(else_))
        } else {
            None
        };
        let range = self.range_from(start);
        self.skip_to(followers);
        Stmt::new(
            StmtKind::If {
                cond,
                then: Box::new(then),
                else_,
            },
            range,
        )
    }

    fn parse_switch(&mut self, followers: TokenSet) -> Stmt {
        let start = self.token_start();
        self.bump();
        let expr = self.parse_parenthesized_expression(false, followers | Token::LeftBrace);
        self.skip(Token::LeftBrace);
        let label_followers = followers | sets::CASE_OR_COLON_OR_DEFAULT_OR_RIGHT_BRACE;
        let section_followers = followers | sets::CASE_OR_DEFAULT_OR_RIGHT_BRACE;
        let mut cases: Vec<SwitchCase> = Vec::new();
        loop {
            let case_start = self.token_start();
            let label = match self.token {
                Token::Case => {
                    self.bump();
                    if self.token == Token::Colon {
                        self.error(ErrorCode::ConstantExpected, vec![]);
                        Some(Expr::dummy(Range::empty_at(self.token_start())))
                    } else {
                        Some(self.parse_expression(label_followers))
                    }
                }
                Token::Default => {
                    self.bump();
                    None
                }
                _ if self.at(sets::STATEMENT_START) => {
                    self.error(ErrorCode::StmtNotInCase, vec![]);
                    self.parse_statement(label_followers);
                    continue;
                }
                _ => break,
            };
            self.skip(Token::Colon);
            let body = if self.at(sets::STATEMENT_START) {
                self.parse_switch_section(section_followers)
            } else {
                Vec::new()
            };
            cases.push(SwitchCase {
                label,
                body,
                range: self.range_from(case_start),
            });
        }
        match cases.last_mut() {
            None => self.error(ErrorCode::EmptySwitch, vec![]),
            Some(last) if last.body.is_empty() => {
                last.body.push(Stmt::new(StmtKind::CaseBottom, Range::empty_at(last.range.end())));
            }
            Some(_) => {}
        }
        self.skip(Token::RightBrace);
        let range = self.range_from(start);
        self.skip_to_with(followers, None, vec![]);
        Stmt::new(StmtKind::Switch { expr, cases }, range)
    }

    /// The statements of one switch section, closed by a
    /// [`StmtKind::CaseBottom`].
    fn parse_switch_section(&mut self, followers: TokenSet) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        while self.at(sets::STATEMENT_START) {
            if self.token == Token::Default && self.peek() != Token::LeftParenthesis {
                break;
            }
            stmts.push(self.parse_statement(followers));
        }
        if let Some(last) = stmts.last() {
            let end = Range::empty_at(last.range.end());
            stmts.push(Stmt::new(StmtKind::CaseBottom, end));
        }
        stmts
    }

    fn parse_while(&mut self, followers: TokenSet) -> Stmt {
        let start = self.token_start();
        self.bump();
        let cond = self.parse_parenthesized_expression(false, followers | sets::STATEMENT_START);
        let body = self.parse_statement(followers);
        let range = self.range_from(start);
        self.skip_to(followers);
        Stmt::new(
            StmtKind::While {
                cond,
                body: Box::new(body),
            },
            range,
        )
    }

    fn parse_do_while(&mut self, followers: TokenSet) -> Stmt {
        let start = self.token_start();
        self.bump();
        let body = self.parse_statement(followers | Token::While);
        self.check_mistaken_empty(&body);
        self.skip(Token::While);
        let cond = self.parse_parenthesized_expression(false, followers | Token::Semicolon);
        let range = self.range_from(start);
        self.skip_semicolon(followers);
        Stmt::new(
            StmtKind::DoWhile {
                body: Box::new(body),
                cond,
            },
            range,
        )
    }

    fn parse_for(&mut self, followers: TokenSet) -> Stmt {
        let start = self.token_start();
        self.bump();
        self.skip(Token::LeftParenthesis);
        let clause_followers = followers | sets::RIGHT_PARENTHESIS_OR_SEMICOLON;
        let init = self.parse_for_initializer(clause_followers);
        let cond = if matches!(self.token, Token::Semicolon | Token::RightParenthesis) {
            None
        } else {
            Some(self.parse_expression(clause_followers))
        };
        self.skip(Token::Semicolon);
        let incr = self.parse_for_incrementer(followers | Token::RightParenthesis);
        self.skip(Token::RightParenthesis);
        let body = self.parse_statement(followers);
        Stmt::new(
            StmtKind::For {
                init,
                cond,
                incr,
                body: Box::new(body),
            },
            self.range_from(start),
        )
    }

    /// Either one local declaration or a comma-separated list of statement
    /// expressions, with the closing `;`.
    fn parse_for_initializer(&mut self, followers: TokenSet) -> Vec<Stmt> {
        let mut stmts: Vec<Stmt> = Vec::new();
        match self.token {
            Token::Semicolon => {
                self.bump();
                return stmts;
            }
            Token::RightParenthesis => {
                self.skip(Token::Semicolon);
                return stmts;
            }
            _ => {}
        }
        let item_followers = followers | Token::Comma;
        loop {
            let stmt =
                self.parse_expression_statement_or_declaration(true, false, item_followers, true);
            match &stmt.kind {
                StmtKind::LocalDeclaration(_) if !stmts.is_empty() => {
                    self.error_at(stmt.range, ErrorCode::ExpectedExpression, vec![]);
                }
                StmtKind::Expression { expr } if !is_statement_expression(expr) => {
                    self.error_at(expr.range, ErrorCode::IllegalStatement, vec![]);
                }
                _ => {}
            }
            stmts.push(stmt);
            if self.token != Token::Comma {
                break;
            }
            self.bump();
        }
        stmts
    }

    fn parse_for_incrementer(&mut self, followers: TokenSet) -> Vec<Expr> {
        let mut exprs = Vec::new();
        if self.token == Token::RightParenthesis {
            return exprs;
        }
        loop {
            let expr = self.parse_expression(followers | Token::Comma);
            if !is_statement_expression(&expr) {
                self.error_at(expr.range, ErrorCode::IllegalStatement, vec![]);
            }
            exprs.push(expr);
            if self.token != Token::Comma {
                break;
            }
            self.bump();
        }
        exprs
    }

    fn parse_foreach(&mut self, followers: TokenSet) -> Stmt {
        let start = self.token_start();
        self.bump();
        self.skip(Token::LeftParenthesis);
        let ty = self.parse_type_expression(
            false,
            false,
            followers
                | sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD
                | Token::In
                | Token::RightParenthesis,
        );
        if self.token == Token::In {
            self.error(ErrorCode::BadForeachDecl, vec![]);
        }
        let name = self.parse_name_declaration();
        self.skip(Token::In);
        let collection = self.parse_expression(followers | Token::RightParenthesis);
        self.skip(Token::RightParenthesis);
        let body = self.parse_statement(followers);
        Stmt::new(
            StmtKind::Foreach {
                ty,
                name,
                collection,
                body: Box::new(body),
            },
            self.range_from(start),
        )
    }

    fn parse_goto(&mut self, followers: TokenSet) -> Stmt {
        let start = self.token_start();
        self.bump();
        let kind = match self.token {
            Token::Case => {
                self.bump();
                StmtKind::GotoCase {
                    value: self.parse_expression(followers | Token::Semicolon),
                }
            }
            Token::Default => {
                self.bump();
                StmtKind::GotoDefault
            }
            _ => StmtKind::Goto {
                label: self.parse_simple_name(followers | Token::Semicolon),
            },
        };
        let range = self.range_from(start);
        self.skip_semicolon(followers);
        Stmt::new(kind, range)
    }

    fn parse_return_or_throw(&mut self, followers: TokenSet) -> Stmt {
        let start = self.token_start();
        let keyword = self.token;
        self.bump();
        let value = if self.token == Token::Semicolon {
            None
        } else {
            Some(self.parse_expression(followers | Token::Semicolon))
        };
        let range = self.range_from(start);
        self.skip_semicolon(followers);
        let kind = if keyword == Token::Return {
            StmtKind::Return { value }
        } else {
            StmtKind::Throw { value }
        };
        Stmt::new(kind, range)
    }

    /// `yield return e;` and `yield break;`. Elsewhere `yield` is an
    /// ordinary identifier.
    fn parse_yield(&mut self, followers: TokenSet) -> Stmt {
        let start = self.token_start();
        let kind = match self.peek() {
            Token::Break => {
                self.bump();
                self.bump();
                StmtKind::YieldBreak
            }
            Token::Return => {
                self.bump();
                self.bump();
                StmtKind::YieldReturn {
                    value: self.parse_expression(followers | Token::Semicolon),
                }
            }
            _ => {
                return self.parse_expression_statement_or_declaration(false, true, followers, true)
            }
        };
        let range = self.range_from(start);
        self.skip_semicolon(followers);
        Stmt::new(kind, range)
    }

    /// `try`, or a stray `catch`/`finally`. Returns `None` at the `catch` or
    /// `finally` that closes the body of an enclosing `try`.
    fn parse_try(&mut self, followers: TokenSet) -> Option<Stmt> {
        let start = self.token_start();
        let saved_unmatched_try = self.unmatched_try;
        let block_followers = followers | sets::CATCH_OR_FINALLY;
        let block = if self.token == Token::Try {
            self.unmatched_try = true;
            self.bump();
            if self.token == Token::LeftBrace {
                self.parse_block(block_followers)
            } else {
                let block_start = self.token_start();
                self.error(ErrorCode::ExpectedLeftBrace, vec![]);
                let mut stmts = Vec::new();
                if self.at(sets::STATEMENT_START) {
                    stmts = self
                        .in_block(|p| p.parse_statements(block_followers | Token::RightBrace));
                    self.skip(Token::RightBrace);
                }
                Block {
                    stmts,
                    range: self.range_from(block_start),
                }
            }
        } else {
            if saved_unmatched_try && followers.contains(self.token) {
                return None;
            }
            self.error(ErrorCode::SyntaxError, vec!["try".to_owned()]);
            Block {
                stmts: Vec::new(),
                range: Range::empty_at(start),
            }
        };
        let mut catches = Vec::new();
        let mut seen_catch_all = false;
        while self.token == Token::Catch {
            let clause = self.parse_catch_clause(block_followers, seen_catch_all);
            seen_catch_all |= clause.ty.is_none();
            catches.push(clause);
        }
        let finally = if self.token == Token::Finally {
            self.bump();
            Some(self.parse_block(followers))
        } else {
            if catches.is_empty() {
                self.skip_to_with(followers, Some(ErrorCode::ExpectedEndTry), vec![]);
            }
            None
        };
        self.unmatched_try = saved_unmatched_try;
        Some(Stmt::new(
            StmtKind::Try {
                block,
                catches,
                finally,
            },
            self.range_from(start),
        ))
    }

    fn parse_catch_clause(&mut self, followers: TokenSet, after_catch_all: bool) -> CatchClause {
        if after_catch_all {
            self.error(ErrorCode::TooManyCatches, vec![]);
        }
        let start = self.token_start();
        self.bump();
        let mut ty = None;
        let mut name = None;
        if self.token == Token::LeftParenthesis {
            self.bump();
            ty = Some(self.parse_type_expression(
                false,
                false,
                followers | Token::Identifier | Token::RightParenthesis,
            ));
            if self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) {
                name = Some(self.parse_name_declaration());
            }
            self.skip(Token::RightParenthesis);
        }
        let block = self.parse_block(followers);
        CatchClause {
            ty,
            name,
            block,
            range: self.range_from(start),
        }
    }

    /// `fixed (T* p = &x, q = &y) body`
    fn parse_fixed(&mut self, followers: TokenSet) -> Stmt {
        let start = self.token_start();
        self.bump();
        self.skip(Token::LeftParenthesis);
        let ty = self.parse_type_expression(
            false,
            false,
            followers | sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD,
        );
        let decl_start = ty.range.start();
        let decl_followers = followers | Token::RightParenthesis | sets::STATEMENT_START;
        let mut declarators = Vec::new();
        loop {
            let name = self.parse_name_declaration();
            self.skip(Token::Assign);
            let init = self.parse_expression(decl_followers | Token::Semicolon | Token::Comma);
            declarators.push(Declarator {
                name,
                init: Some(init),
                range: self.range_from(name.range.start()),
            });
            if self.token != Token::Comma {
                break;
            }
            self.bump();
        }
        let decl = LocalDeclaration {
            ty,
            constant: false,
            declarators,
            range: self.range_from(decl_start),
        };
        self.skip_to(decl_followers);
        self.skip(Token::RightParenthesis);
        let body = self.parse_statement(followers);
        Stmt::new(
            StmtKind::Fixed {
                decl,
                body: Box::new(body),
            },
            self.range_from(start),
        )
    }

    fn parse_lock(&mut self, followers: TokenSet) -> Stmt {
        let start = self.token_start();
        self.bump();
        let expr = self.parse_parenthesized_expression(false, followers | sets::STATEMENT_START);
        let body = self.parse_statement(followers);
        self.check_mistaken_empty(&body);
        Stmt::new(
            StmtKind::Lock {
                expr,
                body: Box::new(body),
            },
            self.range_from(start),
        )
    }

    /// `using (resource) body`. A `using` directive in statement position
    /// is reported and dropped.
    fn parse_using(&mut self, followers: TokenSet) -> Stmt {
        let start = self.token_start();
        self.bump();
        if self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) {
            self.error(ErrorCode::SyntaxError, vec!["(".to_owned()]);
            self.bump();
            if self.token == Token::Semicolon {
                self.bump();
            }
            let range = self.range_from(start);
            self.skip_to(followers);
            return Stmt::new(StmtKind::Empty, range);
        }
        self.skip(Token::LeftParenthesis);
        let resource = self.parse_expression_statement_or_declaration(
            false,
            false,
            followers | Token::RightParenthesis | sets::STATEMENT_START,
            false,
        );
        self.skip(Token::RightParenthesis);
        let body = self.parse_statement(followers);
        Stmt::new(
            StmtKind::Using {
                resource: Box::new(resource),
                body: Box::new(body),
            },
            self.range_from(start),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;
    use pretty_assertions::assert_eq;

    fn statements(source: &str) -> (Vec<Stmt>, Vec<ErrorCode>) {
        let mut p = parser(source);
        let followers = TokenSet::from(Token::EndOfFile);
        let stmts = p.in_block(|p| p.parse_statements(followers));
        assert_at_follower(&p, followers);
        (stmts, codes(&p))
    }

    fn kinds(source: &str) -> Vec<&'static str> {
        let (stmts, errors) = statements(source);
        assert_eq!(errors, vec![], "{}", source);
        stmts.iter().map(|stmt| kind_name(&stmt.kind)).collect()
    }

    fn kind_name(kind: &StmtKind) -> &'static str {
        match kind {
            StmtKind::Block(_) => "block",
            StmtKind::Empty => "empty",
            StmtKind::CaseBottom => "case-bottom",
            StmtKind::Expression { .. } => "expr",
            StmtKind::LocalDeclaration(_) => "local",
            StmtKind::Labeled { .. } => "labeled",
            StmtKind::If { .. } => "if",
            StmtKind::While { .. } => "while",
            StmtKind::DoWhile { .. } => "do",
            StmtKind::For { .. } => "for",
            StmtKind::Foreach { .. } => "foreach",
            StmtKind::Switch { .. } => "switch",
            StmtKind::Try { .. } => "try",
            StmtKind::Using { .. } => "using",
            StmtKind::Lock { .. } => "lock",
            StmtKind::Fixed { .. } => "fixed",
            StmtKind::Checked(_) => "checked",
            StmtKind::Unchecked(_) => "unchecked",
            StmtKind::Unsafe(_) => "unsafe",
            StmtKind::Goto { .. } => "goto",
            StmtKind::GotoCase { .. } => "goto-case",
            StmtKind::GotoDefault => "goto-default",
            StmtKind::Break => "break",
            StmtKind::Continue => "continue",
            StmtKind::Return { .. } => "return",
            StmtKind::Throw { .. } => "throw",
            StmtKind::YieldReturn { .. } => "yield-return",
            StmtKind::YieldBreak => "yield-break",
        }
    }

    #[test]
    fn test_declaration_or_expression() {
        assert_eq!(
            kinds("int x = 1; List<int> xs; a.b.C y; x = 2; f(x); x++; int[,] m;"),
            vec!["local", "local", "local", "expr", "expr", "expr", "local"]
        );
        let (_, errors) = statements("a < b;");
        assert_eq!(errors, vec![ErrorCode::IllegalStatement]);
    }

    #[test]
    fn test_local_array_initializer() {
        let (stmts, errors) = statements("int[] a = { 1, 2 }, b;");
        assert_eq!(errors, vec![]);
        match &stmts[0].kind {
            StmtKind::LocalDeclaration(decl) => {
                assert_eq!(decl.declarators.len(), 2);
                assert!(matches!(
                    decl.declarators[0].init,
                    Some(Expr {
                        kind: ExprKind::ArrayInitializer { .. },
                        ..
                    })
                ));
            }
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn test_control_flow() {
        assert_eq!(
            kinds(
                "if (a) b(); else { } while (x) x--; do x++; while (x); \
                 for (int i = 0, j = 1; i < 10; i++, j++) { } for (;;) break; \
                 foreach (var x in xs) continue; goto l; l: return; throw e; throw; \
                 yield return 1; yield break;"
            ),
            vec![
                "if",
                "while",
                "do",
                "for",
                "for",
                "foreach",
                "goto",
                "labeled",
                "throw",
                "throw",
                "yield-return",
                "yield-break",
            ]
        );
    }

    #[test]
    fn test_switch_sections_end_with_case_bottom() {
        let (stmts, errors) = statements("switch (x) { case 1: case 2: f(); break; default: }");
        assert_eq!(errors, vec![]);
        let StmtKind::Switch { cases, .. } = &stmts[0].kind else {
            panic!("{:?}", stmts[0]);
        };
        let bodies: Vec<Vec<&str>> = cases
            .iter()
            .map(|case| case.body.iter().map(|stmt| kind_name(&stmt.kind)).collect())
            .collect();
        assert_eq!(
            bodies,
            vec![vec![], vec!["expr", "break", "case-bottom"], vec!["case-bottom"]]
        );
        assert!(cases[2].label.is_none());
    }

    #[test]
    fn test_empty_switch() {
        let (_, errors) = statements("switch (x) { }");
        assert_eq!(errors, vec![ErrorCode::EmptySwitch]);
    }

    #[test]
    fn test_try_catch_finally() {
        let (stmts, errors) = statements("try { f(); } catch (E e) { } catch { } finally { }");
        assert_eq!(errors, vec![]);
        let StmtKind::Try { catches, finally, .. } = &stmts[0].kind else {
            panic!("{:?}", stmts[0]);
        };
        assert_eq!(catches.len(), 2);
        assert!(catches[1].ty.is_none());
        assert!(finally.is_some());

        let (_, errors) = statements("try { } catch { } catch { }");
        assert_eq!(errors, vec![ErrorCode::TooManyCatches]);
        let (_, errors) = statements("try { }");
        assert_eq!(errors, vec![ErrorCode::ExpectedEndTry]);
        let (_, errors) = statements("catch { }");
        assert_eq!(errors, vec![ErrorCode::SyntaxError]);
    }

    #[test]
    fn test_other_statements() {
        assert_eq!(
            kinds(
                "using (var r = open()) { } lock (o) f(); checked { } unchecked { } \
                 checked(x + 1).ToString(); unsafe { fixed (int* p = &a[0]) { } } const int k = 1;"
            ),
            vec!["using", "lock", "checked", "unchecked", "expr", "unsafe", "local"]
        );
    }

    #[test]
    fn test_mistaken_empty_statement() {
        let (_, errors) = statements("if (x); while (y) ;");
        assert_eq!(errors, vec![ErrorCode::PossibleMistakenNullStatement]);
    }

    #[test]
    fn test_missing_semicolon() {
        let (stmts, errors) = statements("x = 1\ny = 2;");
        assert_eq!(stmts.len(), 2);
        assert_eq!(errors, vec![ErrorCode::ExpectedSemicolon]);
    }

    #[test]
    fn test_statement_loop_advances() {
        let (_, errors) = statements("void; void void");
        assert!(!errors.is_empty());
    }
}
