//! Expressions.
//!
//! Prefix operators and primary expressions are parsed by recursive
//! descent. Binary operators go through an operator-precedence reducer
//! driven by [`lower_priority`]; the conditional operator and assignments
//! are handled around it.

use super::types::predefined_type;
use super::{sets, Parser, Speculation};
use crate::ast::{
    AssignOp, BinaryOp, Expr, ExprKind, LambdaBody, LambdaParam, ParamModifier, PostfixOp, Range,
    TypeExpr, TypeExprKind, UnaryOp,
};
use crate::parser_diagnostics::ErrorCode;
use crate::source::SourceText;
use crate::token::Token;
use crate::token_set::TokenSet;

/// Binding strength of each binary operator, loosest first. `as` and `is`
/// rank with the relational operators.
const PRECEDENCE: &[(Token, u8)] = &[
    (Token::NullCoalescing, 1),
    (Token::LogicalOr, 2),
    (Token::LogicalAnd, 3),
    (Token::BitwiseOr, 4),
    (Token::BitwiseXor, 5),
    (Token::BitwiseAnd, 6),
    (Token::Equal, 7),
    (Token::NotEqual, 7),
    (Token::As, 8),
    (Token::Is, 8),
    (Token::GreaterThan, 8),
    (Token::GreaterThanOrEqual, 8),
    (Token::LessThan, 8),
    (Token::LessThanOrEqual, 8),
    (Token::LeftShift, 9),
    (Token::RightShift, 9),
    (Token::Plus, 10),
    (Token::Subtract, 10),
    (Token::Multiply, 11),
    (Token::Divide, 11),
    (Token::Remainder, 11),
];

fn rank(operator: Token) -> Option<u8> {
    PRECEDENCE
        .iter()
        .find(|(token, _)| *token == operator)
        .map(|(_, rank)| *rank)
}

/// Whether `a op1 b op2 c` groups as `a op1 (b op2 c)`. Only `??` is right
/// associative; tokens without a rank never bind.
pub(crate) fn lower_priority(op1: Token, op2: Token) -> bool {
    match (rank(op1), rank(op2)) {
        (Some(r1), Some(r2)) => {
            r2 > r1 || (op1 == Token::NullCoalescing && op2 == Token::NullCoalescing)
        }
        _ => false,
    }
}

fn binary_op(token: Token) -> BinaryOp {
    match token {
        Token::Plus => BinaryOp::Add,
        Token::Subtract => BinaryOp::Subtract,
        Token::Multiply => BinaryOp::Multiply,
        Token::Divide => BinaryOp::Divide,
        Token::Remainder => BinaryOp::Remainder,
        Token::LeftShift => BinaryOp::LeftShift,
        Token::RightShift => BinaryOp::RightShift,
        Token::LessThan => BinaryOp::LessThan,
        Token::GreaterThan => BinaryOp::GreaterThan,
        Token::LessThanOrEqual => BinaryOp::LessThanOrEqual,
        Token::GreaterThanOrEqual => BinaryOp::GreaterThanOrEqual,
        Token::Equal => BinaryOp::Equal,
        Token::NotEqual => BinaryOp::NotEqual,
        Token::BitwiseAnd => BinaryOp::BitwiseAnd,
        Token::BitwiseXor => BinaryOp::BitwiseXor,
        Token::BitwiseOr => BinaryOp::BitwiseOr,
        Token::LogicalAnd => BinaryOp::LogicalAnd,
        Token::LogicalOr => BinaryOp::LogicalOr,
        _ => BinaryOp::NullCoalescing,
    }
}

fn assign_op(token: Token) -> Option<AssignOp> {
    Some(match token {
        Token::Assign => AssignOp::Assign,
        Token::PlusAssign => AssignOp::Add,
        Token::SubtractAssign => AssignOp::Subtract,
        Token::MultiplyAssign => AssignOp::Multiply,
        Token::DivideAssign => AssignOp::Divide,
        Token::RemainderAssign => AssignOp::Remainder,
        Token::LeftShiftAssign => AssignOp::LeftShift,
        Token::RightShiftAssign => AssignOp::RightShift,
        Token::BitwiseAndAssign => AssignOp::BitwiseAnd,
        Token::BitwiseOrAssign => AssignOp::BitwiseOr,
        Token::BitwiseXorAssign => AssignOp::BitwiseXor,
        _ => return None,
    })
}

fn unary_op(token: Token) -> Option<UnaryOp> {
    Some(match token {
        Token::AddOne => UnaryOp::PreIncrement,
        Token::SubtractOne => UnaryOp::PreDecrement,
        Token::BitwiseAnd => UnaryOp::AddressOf,
        Token::Multiply => UnaryOp::Dereference,
        Token::BitwiseNot => UnaryOp::BitwiseNot,
        Token::LogicalNot => UnaryOp::Not,
        Token::Plus => UnaryOp::Plus,
        Token::Subtract => UnaryOp::Negate,
        _ => return None,
    })
}

fn binary(lhs: Expr, operator: Token, rhs: Expr) -> Expr {
    let range = lhs.range | rhs.range;
    Expr::new(
        ExprKind::Binary {
            op: binary_op(operator),
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        range,
    )
}

/// Contents of a `{ ... }` after `new T(...)`.
enum Initializer {
    Elements(Vec<Expr>),
    Members(Vec<Expr>),
}

impl<S: SourceText> Parser<S> {
    pub(super) fn parse_expression(&mut self, followers: TokenSet) -> Expr {
        self.nested(|p| p.parse_expression_unguarded(followers), Expr::dummy)
    }

    fn parse_expression_unguarded(&mut self, followers: TokenSet) -> Expr {
        let operand = self.parse_unary_expression(followers | sets::INFIX_OPERATORS);
        if !self.at(sets::INFIX_OPERATORS) {
            self.skip_to(followers);
            return operand;
        }
        if self.token == Token::Conditional {
            self.parse_conditional(operand, followers)
        } else {
            self.parse_assignment_expression(operand, followers)
        }
    }

    fn parse_assignment_expression(&mut self, target: Expr, followers: TokenSet) -> Expr {
        if let Some(op) = assign_op(self.token) {
            self.bump();
            let value = self.parse_expression(followers);
            let range = target.range | value.range;
            return Expr::new(
                ExprKind::Assign {
                    op,
                    lhs: Box::new(target),
                    rhs: Box::new(value),
                },
                range,
            );
        }
        let operand = self.parse_binary_expression(target, followers | Token::Conditional);
        if self.token == Token::Conditional {
            self.parse_conditional(operand, followers)
        } else {
            operand
        }
    }

    /// Reduces `operand (op operand)*` with a stack of pending left operands.
    /// An operator on the stack is reduced as soon as the incoming operator
    /// does not bind tighter. The right side of `is` and `as` is a type and
    /// is reduced at once.
    fn parse_binary_expression(&mut self, first: Expr, followers: TokenSet) -> Expr {
        let unary_followers = followers | sets::INFIX_OPERATORS;
        let mut pending: Vec<(Expr, Token)> = Vec::new();
        let mut operand = first;
        while self.at(sets::BINARY_OPERATORS) {
            let operator = self.token;
            while let Some((lhs, top)) = pending.pop() {
                if lower_priority(top, operator) {
                    pending.push((lhs, top));
                    break;
                }
                operand = binary(lhs, top, operand);
            }
            self.bump();
            if matches!(operator, Token::Is | Token::As) {
                let ty = self.parse_type_expression(operator == Token::Is, false, unary_followers);
                let range = operand.range | ty.range;
                let expr = Box::new(operand);
                let kind = if operator == Token::Is {
                    ExprKind::Is { expr, ty }
                } else {
                    ExprKind::As { expr, ty }
                };
                operand = Expr::new(kind, range);
            } else {
                pending.push((operand, operator));
                operand = self.parse_unary_expression(unary_followers);
            }
        }
        while let Some((lhs, operator)) = pending.pop() {
            operand = binary(lhs, operator, operand);
        }
        self.skip_to(followers);
        operand
    }

    fn parse_conditional(&mut self, cond: Expr, followers: TokenSet) -> Expr {
        self.bump();
        let then = self.parse_expression(followers | Token::Colon);
        let else_ = if self.token == Token::Colon {
            self.bump();
            self.parse_expression(followers)
        } else {
            self.skip(Token::Colon);
            if self.at(followers) {
                Expr::dummy(Range::empty_at(self.token_start()))
            } else {
                self.parse_expression(followers)
            }
        };
        let range = cond.range | else_.range;
        let result = Expr::new(
            ExprKind::Conditional {
                cond: Box::new(cond),
                then: Box::new(then),
                else_: Box::new(else_),
            },
            range,
        );
        self.skip_to(followers);
        result
    }

    pub(super) fn parse_unary_expression(&mut self, followers: TokenSet) -> Expr {
        self.nested(|p| p.parse_prefixed_expression(followers), Expr::dummy)
    }

    fn parse_prefixed_expression(&mut self, followers: TokenSet) -> Expr {
        match unary_op(self.token) {
            Some(op) => {
                let start = self.token_start();
                self.bump();
                let operand = self.parse_unary_expression(followers);
                let range = Range(start, operand.range.end());
                Expr::new(
                    ExprKind::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    range,
                )
            }
            None => self.parse_primary_expression(followers),
        }
    }

    fn parse_primary_expression(&mut self, followers: TokenSet) -> Expr {
        let range = self.token_range();
        let head = match self.token {
            Token::ArgList => {
                self.bump();
                Expr::new(ExprKind::ArgList, range)
            }
            Token::Delegate => self.parse_anonymous_method(followers),
            Token::New => {
                self.parse_new(followers | Token::Dot | Token::LeftBracket | Token::Arrow)
            }
            Token::Null
            | Token::True
            | Token::False
            | Token::CharLiteral
            | Token::StringLiteral
            | Token::HexLiteral
            | Token::IntegerLiteral
            | Token::RealLiteral => self.parse_literal(),
            Token::This => {
                self.bump();
                Expr::new(ExprKind::This, range)
            }
            Token::Base => {
                self.bump();
                Expr::new(ExprKind::Base, range)
            }
            Token::Typeof | Token::Sizeof | Token::Default => {
                self.parse_typeof_sizeof_or_default(followers)
            }
            Token::Stackalloc => return self.parse_stackalloc(followers),
            Token::Checked | Token::Unchecked | Token::MakeRef | Token::RefType => {
                self.parse_checked_or_typed_reference(followers)
            }
            Token::RefValue => self.parse_ref_value(followers),
            Token::LeftParenthesis => {
                let followers = followers | Token::Dot | Token::LeftBracket | Token::Arrow;
                self.parse_cast_expression(followers)
            }
            token if token != Token::Void && predefined_type(token).is_some() => {
                match predefined_type(token) {
                    Some(ty) => {
                        self.bump();
                        Expr::new(ExprKind::Predefined { ty }, range)
                    }
                    None => Expr::dummy(range),
                }
            }
            _ if self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) => {
                self.parse_name_or_lambda(followers)
            }
            _ => {
                let text = self.token_text();
                if self.at(sets::INFIX_OPERATORS) {
                    self.error(ErrorCode::InvalidExprTerm, vec![text]);
                    self.bump();
                } else {
                    self.skip_to_with(
                        followers | sets::PRIMARY_START,
                        Some(ErrorCode::InvalidExprTerm),
                        vec![text],
                    );
                }
                if self.at(sets::PRIMARY_START) {
                    return self.parse_primary_expression(followers);
                }
                self.skip_to(followers);
                return Expr::dummy(Range::empty_at(range.start()));
            }
        };
        let mut expr = self.parse_selectors(head, followers | Token::AddOne | Token::SubtractOne);
        loop {
            let op = match self.token {
                Token::AddOne => PostfixOp::Increment,
                Token::SubtractOne => PostfixOp::Decrement,
                Token::Arrow | Token::Dot | Token::LeftBracket => {
                    let followers = followers | Token::AddOne | Token::SubtractOne;
                    expr = self.parse_selectors(expr, followers);
                    continue;
                }
                _ => break,
            };
            let range = expr.range | self.token_range();
            self.bump();
            expr = Expr::new(
                ExprKind::Postfix {
                    op,
                    operand: Box::new(expr),
                },
                range,
            );
        }
        self.skip_to(followers);
        expr
    }

    /// A simple name, `alias::name`, or the single-parameter lambda `x => ...`.
    fn parse_name_or_lambda(&mut self, followers: TokenSet) -> Expr {
        let ident = self.parse_simple_name(
            followers
                | Token::Dot
                | Token::DoubleColon
                | Token::Lambda
                | Token::LeftParenthesis
                | Token::LeftBracket
                | Token::LessThan
                | Token::Arrow
                | Token::AddOne
                | Token::SubtractOne,
        );
        match self.token {
            Token::DoubleColon => {
                let qualifier = if ident.name == self.global {
                    Expr::new(ExprKind::RootNamespace, ident.range)
                } else {
                    Expr::name(ident)
                };
                self.parse_qualified_name(
                    qualifier,
                    followers
                        | Token::Dot
                        | Token::LessThan
                        | Token::LeftParenthesis
                        | Token::AddOne
                        | Token::SubtractOne,
                )
            }
            Token::Lambda => {
                let param = LambdaParam {
                    modifier: ParamModifier::None,
                    ty: None,
                    name: ident,
                    range: ident.range,
                };
                self.parse_lambda_body(vec![param], ident.range.start(), followers)
            }
            _ => Expr::name(ident),
        }
    }

    /// `(x, y) => ...` or `(int x, ref int y) => ...`, at the `(`.
    fn parse_parenthesized_lambda(&mut self, followers: TokenSet) -> Expr {
        let start = self.token_start();
        self.bump();
        let param_followers = followers | Token::Lambda | Token::Comma | Token::RightParenthesis;
        let mut params = Vec::new();
        if self.token != Token::RightParenthesis {
            let first = self.parse_lambda_param(true, param_followers);
            let typed = first.ty.is_some();
            params.push(first);
            while self.token == Token::Comma {
                self.bump();
                let param = self.parse_lambda_param(typed, param_followers);
                if typed && param.ty.is_none() {
                    self.error_at(param.name.range, ErrorCode::TypeExpected, vec![]);
                }
                params.push(param);
            }
        }
        self.skip_over_to(Token::RightParenthesis, followers | Token::Lambda);
        self.parse_lambda_body(params, start, followers)
    }

    /// `x`, or with `allow_type`, `[ref|out] T x`.
    fn parse_lambda_param(&mut self, allow_type: bool, followers: TokenSet) -> LambdaParam {
        let start = self.token_start();
        let untyped = self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD)
            && matches!(self.peek(), Token::Comma | Token::RightParenthesis);
        let mut modifier = ParamModifier::None;
        let mut ty = None;
        if allow_type && !untyped {
            match self.token {
                Token::Out => {
                    modifier = ParamModifier::Out;
                    self.bump();
                }
                Token::Ref => {
                    modifier = ParamModifier::Ref;
                    self.bump();
                }
                _ => {}
            }
            ty = Some(self.parse_type_expression(
                false,
                false,
                followers | sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD,
            ));
        }
        if !self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) {
            self.error(ErrorCode::ExpectedIdentifier, vec![]);
        }
        let name = self.parse_name_declaration();
        let result = LambdaParam {
            modifier,
            ty,
            name,
            range: self.range_from(start),
        };
        self.skip_to(followers);
        result
    }

    fn parse_lambda_body(
        &mut self,
        params: Vec<LambdaParam>,
        start: usize,
        followers: TokenSet,
    ) -> Expr {
        self.skip(Token::Lambda);
        let body = if self.token == Token::LeftBrace {
            LambdaBody::Block(self.parse_block(followers))
        } else {
            LambdaBody::Expr(Box::new(self.parse_expression(followers)))
        };
        Expr::new(ExprKind::Lambda { params, body }, self.range_from(start))
    }

    /// `__refvalue(expr, T)`
    fn parse_ref_value(&mut self, followers: TokenSet) -> Expr {
        let start = self.token_start();
        self.bump();
        self.skip(Token::LeftParenthesis);
        let expr = self.parse_expression(followers | Token::Comma);
        self.skip(Token::Comma);
        let ty = self.parse_type_expression(false, false, followers | Token::RightParenthesis);
        self.skip_over_to(Token::RightParenthesis, followers);
        Expr::new(
            ExprKind::RefValue {
                expr: Box::new(expr),
                ty,
            },
            self.range_from(start),
        )
    }

    /// `checked(e)`, `unchecked(e)`, `__makeref(e)` and `__reftype(e)`.
    fn parse_checked_or_typed_reference(&mut self, followers: TokenSet) -> Expr {
        let start = self.token_start();
        let keyword = self.token;
        self.bump();
        self.skip(Token::LeftParenthesis);
        let expr = Box::new(self.parse_expression(followers | Token::RightParenthesis));
        self.skip_over_to(Token::RightParenthesis, followers);
        let kind = match keyword {
            Token::Checked => ExprKind::Checked { expr },
            Token::Unchecked => ExprKind::Unchecked { expr },
            Token::MakeRef => ExprKind::MakeRef { expr },
            _ => ExprKind::RefType { expr },
        };
        Expr::new(kind, self.range_from(start))
    }

    /// `stackalloc T[size]`; `stackalloc T(size)` is reported and accepted.
    fn parse_stackalloc(&mut self, followers: TokenSet) -> Expr {
        let start = self.token_start();
        self.bump();
        let element_type = self.parse_base_type_expression(false, followers | Token::LeftBracket);
        let opening = self.token;
        if opening != Token::LeftBracket {
            self.error(ErrorCode::BadStackAllocExpr, vec![]);
            if opening == Token::LeftParenthesis {
                self.bump();
            }
        } else {
            self.bump();
        }
        let size = self.parse_expression(followers | Token::RightBracket | Token::RightParenthesis);
        if self.token == Token::RightParenthesis && opening == Token::LeftParenthesis {
            self.bump();
        } else {
            self.skip(Token::RightBracket);
        }
        let result = Expr::new(
            ExprKind::StackAlloc {
                element_type,
                size: Box::new(size),
            },
            self.range_from(start),
        );
        self.skip_to(followers);
        result
    }

    fn parse_anonymous_method(&mut self, followers: TokenSet) -> Expr {
        let start = self.token_start();
        self.bump();
        let params = if self.token == Token::LeftParenthesis {
            Some(self.parse_parameters(Token::RightParenthesis, followers | Token::LeftBrace))
        } else {
            None
        };
        let body = self.parse_block(followers);
        Expr::new(ExprKind::AnonymousMethod { params, body }, self.range_from(start))
    }

    fn parse_new(&mut self, followers: TokenSet) -> Expr {
        let start = self.token_start();
        self.bump();
        match self.token {
            Token::LeftBracket => return self.parse_new_implicit_array(start, followers),
            Token::LeftBrace => return self.parse_new_anonymous_object(start, followers),
            _ => {}
        }
        let mut ty = self.parse_base_type_expression(
            false,
            followers
                | sets::INFIX_OPERATORS
                | Token::LeftBracket
                | Token::LeftParenthesis
                | Token::RightParenthesis,
        );
        let suffix = match self.token {
            Token::Conditional => Some(TypeExprKind::Nullable { target: Box::new(ty.clone()) }),
            Token::Multiply => Some(TypeExprKind::Pointer { target: Box::new(ty.clone()) }),
            _ => None,
        };
        if let Some(kind) = suffix {
            self.bump();
            ty = TypeExpr {
                kind,
                range: self.range_from(start),
            };
        }
        let rank_followers = followers
            | Token::LeftBrace
            | Token::LeftBracket
            | Token::LeftParenthesis
            | Token::RightParenthesis;
        let ranks = self.parse_rank_specifiers(rank_followers);
        if let Some((&rank, inner)) = ranks.split_first() {
            // new T[] { ... }
            let element_type = self.wrap_array(ty, inner);
            let initializer = if self.token == Token::LeftBrace {
                self.parse_array_initializers(rank, followers)
            } else {
                let code = if self.at(sets::UNARY_START) {
                    ErrorCode::ExpectedLeftBrace
                } else {
                    ErrorCode::MissingArraySize
                };
                self.error(code, vec![]);
                while self.at(sets::UNARY_START) {
                    self.parse_expression(followers | Token::Comma | Token::RightBrace);
                    if self.token != Token::Comma {
                        break;
                    }
                    self.bump();
                }
                self.skip_over_to(Token::RightBrace, followers);
                Vec::new()
            };
            return Expr::new(
                ExprKind::CreateArray {
                    element_type,
                    rank,
                    sizes: Vec::new(),
                    initializer,
                },
                self.range_from(start),
            );
        }
        if self.token == Token::LeftBracket {
            // new T[n] or new T[n][] { ... }
            self.bump();
            let size_followers = followers | Token::LeftBrace | Token::LeftBracket;
            let sizes = self.parse_expression_list(size_followers);
            let rank = sizes.len() as u32;
            let mut inner = Vec::new();
            let initializer = loop {
                inner.extend(self.parse_rank_specifiers(rank_followers));
                if self.token == Token::LeftBrace {
                    break self.parse_array_initializers(rank, followers);
                }
                if self.token != Token::LeftBracket {
                    self.skip_to(followers);
                    break Vec::new();
                }
                // new T[n][m]
                self.bump();
                self.error(ErrorCode::InvalidArray, vec![]);
                let extra = self.parse_expression_list(size_followers);
                inner.push(extra.len().max(1) as u32);
            };
            let element_type = self.wrap_array(ty, &inner);
            return Expr::new(
                ExprKind::CreateArray {
                    element_type,
                    rank,
                    sizes,
                    initializer,
                },
                self.range_from(start),
            );
        }
        // new T(...) { ... }
        let mut args = Vec::new();
        if self.token == Token::LeftParenthesis {
            args = self.parse_argument_list(followers | Token::LeftBrace);
        } else if self.token != Token::LeftBrace {
            self.skip_to_with(followers, Some(ErrorCode::BadNewExpr), vec![]);
        }
        let created = Expr::new(ExprKind::CreateObject { ty, args }, self.range_from(start));
        if self.token != Token::LeftBrace {
            return created;
        }
        let object = Some(Box::new(created));
        let kind = match self.parse_object_or_collection_initializer(followers) {
            Initializer::Elements(elements) => ExprKind::PopulateCollection { object, elements },
            Initializer::Members(members) => ExprKind::InitializeObject { object, members },
        };
        Expr::new(kind, self.range_from(start))
    }

    /// Rank specifiers that are not followed by sizes, as in `T[,][]`.
    fn parse_rank_specifiers(&mut self, followers: TokenSet) -> Vec<u32> {
        let mut ranks = Vec::new();
        while self.token == Token::LeftBracket
            && matches!(self.peek(), Token::Comma | Token::RightBracket)
        {
            ranks.push(self.parse_rank_specifier(followers));
        }
        ranks
    }

    /// Wraps `element` in one array type per rank, the first rank outermost.
    fn wrap_array(&self, element: TypeExpr, ranks: &[u32]) -> TypeExpr {
        let range = element.range | Range::empty_at(self.prev_end);
        ranks.iter().rev().fold(element, |element, &rank| TypeExpr {
            kind: TypeExprKind::Array {
                element: Box::new(element),
                rank,
            },
            range,
        })
    }

    /// `{ a, b }` or `{ A = a, B = { ... } }`, at the `{`.
    fn parse_object_or_collection_initializer(&mut self, followers: TokenSet) -> Initializer {
        self.bump();
        let named =
            self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) && self.peek() == Token::Assign;
        let result = if named {
            Initializer::Members(self.parse_member_initializers(followers | Token::RightBrace))
        } else {
            Initializer::Elements(self.parse_element_initializers(followers | Token::RightBrace))
        };
        self.skip_over_to(Token::RightBrace, followers);
        result
    }

    /// A nested `{ ... }` inside an object or collection initializer.
    fn parse_nested_initializer(&mut self, followers: TokenSet) -> Expr {
        let start = self.token_start();
        let kind = match self.parse_object_or_collection_initializer(followers) {
            Initializer::Elements(elements) => {
                ExprKind::PopulateCollection { object: None, elements }
            }
            Initializer::Members(members) => ExprKind::InitializeObject { object: None, members },
        };
        Expr::new(kind, self.range_from(start))
    }

    fn parse_member_initializers(&mut self, followers: TokenSet) -> Vec<Expr> {
        let mut members = Vec::new();
        while self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) {
            let start = self.token_start();
            let name = self.parse_simple_name(followers | Token::Comma | Token::Assign);
            self.skip(Token::Assign);
            let value = if self.token == Token::LeftBrace {
                self.parse_nested_initializer(followers | Token::Comma)
            } else {
                self.parse_expression(followers | Token::Comma)
            };
            members.push(Expr::new(
                ExprKind::NamedArgument {
                    name,
                    value: Box::new(value),
                },
                self.range_from(start),
            ));
            if self.token != Token::Comma {
                break;
            }
            self.bump();
        }
        self.skip_to(followers);
        members
    }

    fn parse_element_initializers(&mut self, followers: TokenSet) -> Vec<Expr> {
        let mut elements = Vec::new();
        while !matches!(self.token, Token::RightBrace | Token::EndOfFile) {
            let element = if self.token == Token::LeftBrace {
                self.parse_nested_initializer(followers | Token::Comma)
            } else {
                self.parse_expression(followers | Token::Comma)
            };
            elements.push(element);
            if self.token != Token::Comma {
                break;
            }
            self.bump();
        }
        self.skip_to(followers);
        elements
    }

    /// `new { A = a, b, c.D }`, at the `{`.
    fn parse_new_anonymous_object(&mut self, start: usize, followers: TokenSet) -> Expr {
        self.bump();
        let member_followers = followers | Token::Comma | Token::RightBrace;
        let mut members = Vec::new();
        while self.at(sets::UNARY_START) {
            let member_start = self.token_start();
            let expr = self.parse_unary_expression(member_followers | sets::INFIX_OPERATORS);
            if self.token == Token::Assign {
                self.bump();
                let name = match expr.kind {
                    ExprKind::Name { ident } => Some(ident),
                    _ => {
                        self.error_at(expr.range, ErrorCode::ExpectedIdentifier, vec![]);
                        None
                    }
                };
                let value = self.parse_expression(member_followers);
                if let Some(name) = name {
                    members.push(Expr::new(
                        ExprKind::NamedArgument {
                            name,
                            value: Box::new(value),
                        },
                        self.range_from(member_start),
                    ));
                }
            } else if matches!(expr.kind, ExprKind::Name { .. } | ExprKind::Qualified { .. }) {
                members.push(expr);
            } else {
                self.error_at(expr.range, ErrorCode::SyntaxError, vec!["=".to_owned()]);
            }
            if self.token != Token::Comma {
                break;
            }
            self.bump();
        }
        self.skip_over_to(Token::RightBrace, followers);
        Expr::new(ExprKind::CreateAnonymousObject { members }, self.range_from(start))
    }

    /// `new[] { ... }`, at the `[`.
    fn parse_new_implicit_array(&mut self, start: usize, followers: TokenSet) -> Expr {
        self.bump();
        self.skip(Token::RightBracket);
        let elements = if self.token == Token::LeftBrace {
            self.parse_array_initializers(1, followers)
        } else {
            let dummy = Expr::dummy(Range::empty_at(self.token_start()));
            self.skip(Token::LeftBrace);
            self.skip_to(followers);
            vec![dummy]
        };
        Expr::new(ExprKind::CreateImplicitArray { elements }, self.range_from(start))
    }

    /// Comma-separated expressions up to and including `]`.
    fn parse_expression_list(&mut self, followers: TokenSet) -> Vec<Expr> {
        let item_followers = followers | Token::Comma | Token::RightBracket;
        let mut result = Vec::new();
        if self.token != Token::RightBracket {
            result.push(self.parse_expression(item_followers));
            while self.token == Token::Comma {
                self.bump();
                result.push(self.parse_expression(item_followers));
            }
        }
        self.skip(Token::RightBracket);
        self.skip_to(followers);
        result
    }

    /// A bare `{ ... }` initializing a field or local of array type.
    pub(super) fn parse_array_initializer(&mut self, rank: u32, followers: TokenSet) -> Expr {
        self.nested(
            |p| {
                let start = p.token_start();
                let elements = p.parse_array_initializers(rank, followers);
                Expr::new(ExprKind::ArrayInitializer { elements }, p.range_from(start))
            },
            |range| Expr::new(ExprKind::ArrayInitializer { elements: Vec::new() }, range),
        )
    }

    /// The elements of a `{ ... }` array initializer of the given rank, at
    /// the `{`. Rows of a multi-dimensional initializer are nested
    /// [`ExprKind::ArrayInitializer`]s.
    fn parse_array_initializers(&mut self, rank: u32, followers: TokenSet) -> Vec<Expr> {
        self.bump();
        let mut elements = Vec::new();
        if self.token == Token::RightBrace {
            self.bump();
            self.skip_to(followers);
            return elements;
        }
        let row_followers = followers | Token::Comma | Token::LeftBrace | Token::RightBrace;
        loop {
            if rank > 1 {
                if self.token == Token::LeftBrace {
                    elements.push(self.parse_array_initializer(rank - 1, row_followers));
                } else {
                    let range = Range::empty_at(self.token_start());
                    self.skip_to_with(row_followers, Some(ErrorCode::ExpectedLeftBrace), vec![]);
                    let placeholder = ExprKind::ArrayInitializer { elements: Vec::new() };
                    elements.push(Expr::new(placeholder, range));
                }
            } else if self.token == Token::LeftBrace {
                self.error(ErrorCode::ArrayInitInBadPlace, vec![]);
                elements.push(self.parse_array_initializer(1, row_followers));
            } else {
                elements.push(self.parse_expression(followers | Token::Comma | Token::RightBrace));
            }
            if self.token != Token::Comma {
                break;
            }
            self.bump();
            if self.token == Token::RightBrace {
                break;
            }
        }
        self.skip(Token::RightBrace);
        self.skip_to(followers);
        elements
    }

    /// `(T)x` versus `(x)` versus `(x) => ...`. The parenthesized prefix is
    /// first tried as a type; it is a cast when the type parses cleanly up to
    /// `)` and either cannot be a value or is followed by a token that starts
    /// a value.
    fn parse_cast_expression(&mut self, followers: TokenSet) -> Expr {
        let start = self.token_start();
        if matches!(self.peek(), Token::Ref | Token::Out | Token::RightParenthesis) {
            return self.parse_parenthesized_lambda(followers);
        }
        let mut lambda = false;
        let attempt = self.speculate(
            |p| {
                p.bump();
                p.parse_type_expression(
                    false,
                    false,
                    followers
                        | Token::RightParenthesis
                        | Token::Comma
                        | sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD,
                )
            },
            |p, ty| {
                if !p.errors.is_empty() {
                    return false;
                }
                if p.token == Token::Comma || p.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) {
                    // `(x, y) =>` or `(T x) =>`
                    lambda = true;
                    return false;
                }
                if p.token != Token::RightParenthesis {
                    return false;
                }
                if !matches!(ty.kind, TypeExprKind::Named { .. }) {
                    return true;
                }
                let next = p.peek();
                lambda = next == Token::Lambda;
                sets::CAST_FOLLOWER.contains(next)
            },
        );
        let mut expr = match attempt {
            Speculation::Committed(ty) => {
                self.skip(Token::RightParenthesis);
                let operand = self.parse_unary_expression(followers);
                Expr::new(
                    ExprKind::Cast {
                        ty,
                        expr: Box::new(operand),
                    },
                    self.range_from(start),
                )
            }
            Speculation::RolledBack if lambda => self.parse_parenthesized_lambda(followers),
            Speculation::RolledBack => self.parse_parenthesized_expression(true, followers),
        };
        while matches!(self.token, Token::Arrow | Token::Dot | Token::LeftBracket) {
            expr = self.parse_selectors(expr, followers);
        }
        self.skip_to(followers);
        expr
    }

    /// `q.name`, `q->name` or `q::name`, at the operator.
    fn parse_qualified_name(&mut self, qualifier: Expr, followers: TokenSet) -> Expr {
        let operator = self.token;
        self.bump();
        let name = self.parse_simple_name(followers);
        let range = qualifier.range | name.range;
        let qualifier = Box::new(qualifier);
        let kind = match operator {
            Token::Arrow => ExprKind::PointerQualified { qualifier, name },
            Token::DoubleColon => ExprKind::AliasQualified { alias: qualifier, name },
            _ => ExprKind::Qualified { qualifier, name },
        };
        Expr::new(kind, range)
    }

    fn parse_typeof_sizeof_or_default(&mut self, followers: TokenSet) -> Expr {
        let start = self.token_start();
        let keyword = self.token;
        self.bump();
        self.skip(Token::LeftParenthesis);
        let ty = self.parse_type_expression(false, true, followers | Token::RightParenthesis);
        self.skip_over_to(Token::RightParenthesis, followers);
        let kind = match keyword {
            Token::Typeof => ExprKind::TypeOf { ty },
            Token::Sizeof => ExprKind::SizeOf { ty },
            _ => ExprKind::Default { ty },
        };
        Expr::new(kind, self.range_from(start))
    }

    /// Member accesses, indexers, calls and type argument lists following
    /// `expr`.
    fn parse_selectors(&mut self, mut expr: Expr, followers: TokenSet) -> Expr {
        let selector_followers = followers
            | Token::Arrow
            | Token::Dot
            | Token::LeftBracket
            | Token::LeftParenthesis
            | Token::LessThan;
        loop {
            expr = match self.token {
                Token::Arrow | Token::Dot => self.parse_qualified_name(expr, selector_followers),
                Token::LeftBracket => self.parse_indexer(expr, selector_followers),
                Token::LeftParenthesis => {
                    let args = self.parse_argument_list(selector_followers);
                    let range = expr.range | Range::empty_at(self.prev_end);
                    Expr::new(
                        ExprKind::Call {
                            target: Box::new(expr),
                            args,
                        },
                        range,
                    )
                }
                Token::LessThan => match self.parse_generic_instance(expr, selector_followers) {
                    Ok(instance) => instance,
                    Err(expr) => {
                        self.skip_to(followers);
                        return expr;
                    }
                },
                _ => {
                    self.skip_to(followers);
                    return expr;
                }
            };
        }
    }

    /// Tries `<...>` after `expr` as a type argument list. Gives `expr` back
    /// when the attempt failed with at most one argument, or failed and
    /// stopped at a token that cannot follow a type argument list; the `<`
    /// is then a less-than operator.
    fn parse_generic_instance(&mut self, expr: Expr, followers: TokenSet) -> Result<Expr, Expr> {
        let attempt = self.speculate(
            |p| p.parse_type_arguments(false, followers),
            |p, args| {
                let failed = !p.errors.is_empty();
                let non_follower = sets::TYPE_ARGUMENT_LIST_NON_FOLLOWER.contains(p.token);
                !(failed && (args.len() <= 1 || non_follower))
            },
        );
        match attempt {
            Speculation::Committed(args) => {
                let range = expr.range | Range::empty_at(self.prev_end);
                Ok(Expr::new(
                    ExprKind::GenericInstance {
                        target: Box::new(expr),
                        args,
                    },
                    range,
                ))
            }
            Speculation::RolledBack => Err(expr),
        }
    }

    /// `(args)`, at the `(`.
    pub(super) fn parse_argument_list(&mut self, followers: TokenSet) -> Vec<Expr> {
        self.bump();
        let arg_followers = followers | Token::Comma | Token::RightParenthesis;
        let mut args = Vec::new();
        if self.token != Token::RightParenthesis {
            args.push(self.parse_argument(arg_followers));
            while self.token == Token::Comma {
                self.bump();
                args.push(self.parse_argument(arg_followers));
            }
        }
        self.skip_over_to(Token::RightParenthesis, followers);
        args
    }

    fn parse_argument(&mut self, followers: TokenSet) -> Expr {
        let start = self.token_start();
        let by_reference = self.token;
        if !matches!(by_reference, Token::Ref | Token::Out) {
            return self.parse_expression(followers);
        }
        self.bump();
        let expr = Box::new(self.parse_expression(followers));
        let kind = if by_reference == Token::Ref {
            ExprKind::RefArg { expr }
        } else {
            ExprKind::OutArg { expr }
        };
        Expr::new(kind, self.range_from(start))
    }

    fn parse_indexer(&mut self, target: Expr, followers: TokenSet) -> Expr {
        self.bump();
        let mut indices = Vec::new();
        while !matches!(self.token, Token::RightBracket | Token::EndOfFile) {
            indices.push(self.parse_expression(followers | Token::Comma | Token::RightBracket));
            if self.token != Token::Comma {
                break;
            }
            self.bump();
        }
        self.skip_over_to(Token::RightBracket, followers);
        let range = target.range | Range::empty_at(self.prev_end);
        Expr::new(
            ExprKind::Index {
                target: Box::new(target),
                indices,
            },
            range,
        )
    }

    /// `(expr)`. With `keep_parentheses`, the result is wrapped in
    /// [`ExprKind::Parenthesized`].
    pub(super) fn parse_parenthesized_expression(
        &mut self,
        keep_parentheses: bool,
        followers: TokenSet,
    ) -> Expr {
        let start = self.token_start();
        if self.token == Token::LeftBrace {
            let dummy = Expr::dummy(Range::empty_at(start));
            self.skip_to_with(followers, Some(ErrorCode::SyntaxError), vec!["(".to_owned()]);
            return dummy;
        }
        self.skip(Token::LeftParenthesis);
        let mut result = self.parse_expression(followers | Token::RightParenthesis | Token::Colon);
        self.skip_over_to(Token::RightParenthesis, followers);
        if keep_parentheses {
            result = Expr::new(
                ExprKind::Parenthesized {
                    expr: Box::new(result),
                },
                self.range_from(start),
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;
    use crate::names::NameTable;
    use pretty_assertions::assert_eq;

    /// Renders an expression as a compact S-expression over names and
    /// integer literals.
    fn render(expr: &Expr, names: &NameTable) -> String {
        let r = |e: &Expr| render(e, names);
        match &expr.kind {
            ExprKind::Integer { value, .. } => value.to_string(),
            ExprKind::Name { ident } => names.resolve(ident.name).to_owned(),
            ExprKind::Binary { op, lhs, rhs } => format!("({:?} {} {})", op, r(lhs), r(rhs)),
            ExprKind::Unary { op, operand } => format!("({:?} {})", op, r(operand)),
            ExprKind::Is { expr, .. } => format!("(Is {})", r(expr)),
            ExprKind::As { expr, .. } => format!("(As {})", r(expr)),
            ExprKind::Conditional { cond, then, else_ } => {
                format!("(? {} {} {})", r(cond), r(then), r(else_))
            }
            ExprKind::Assign { op, lhs, rhs } => format!("({:?}= {} {})", op, r(lhs), r(rhs)),
            ExprKind::Cast { expr, .. } => format!("(Cast {})", r(expr)),
            ExprKind::Parenthesized { expr } => format!("(Paren {})", r(expr)),
            ExprKind::Call { target, args } => format!(
                "(Call {}{})",
                r(target),
                args.iter().map(|a| format!(" {}", r(a))).collect::<String>()
            ),
            ExprKind::GenericInstance { target, args } => {
                format!("(Generic {} {})", r(target), args.len())
            }
            ExprKind::Qualified { qualifier, name } => {
                format!("{}.{}", r(qualifier), names.resolve(name.name))
            }
            ExprKind::Index { target, indices } => {
                format!("(Index {} {})", r(target), indices.len())
            }
            ExprKind::Postfix { op, operand } => format!("({:?} {})", op, r(operand)),
            ExprKind::Lambda { params, .. } => format!("(Lambda {})", params.len()),
            ExprKind::RefArg { expr } => format!("(Ref {})", r(expr)),
            ExprKind::OutArg { expr } => format!("(Out {})", r(expr)),
            ExprKind::Dummy => "?".to_owned(),
            other => format!("{:?}", std::mem::discriminant(other)),
        }
    }

    fn parse(source: &str) -> (String, Vec<ErrorCode>) {
        let mut p = parser(source);
        let followers = TokenSet::from(Token::Semicolon);
        let expr = p.parse_expression(followers);
        assert_at_follower(&p, followers);
        (render(&expr, &p.names), codes(&p))
    }

    fn tree(source: &str) -> String {
        let (tree, errors) = parse(source);
        assert_eq!(errors, vec![], "{}", source);
        tree
    }

    #[test]
    fn test_lower_priority() {
        assert!(lower_priority(Token::Plus, Token::Multiply));
        assert!(!lower_priority(Token::Multiply, Token::Plus));
        assert!(!lower_priority(Token::Subtract, Token::Subtract));
        assert!(lower_priority(Token::NullCoalescing, Token::NullCoalescing));
        assert!(lower_priority(Token::NullCoalescing, Token::Is));
        assert!(lower_priority(Token::Equal, Token::LessThan));
        assert!(!lower_priority(Token::Implies, Token::Plus));
        assert!(!lower_priority(Token::Plus, Token::Range));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(tree("1 + 2 * 3"), "(Add 1 (Multiply 2 3))");
        assert_eq!(tree("1 * 2 + 3"), "(Add (Multiply 1 2) 3)");
        assert_eq!(tree("1 - 2 - 3"), "(Subtract (Subtract 1 2) 3)");
        assert_eq!(
            tree("a || b && c | d ^ e & f == g < h << i + j * k"),
            "(LogicalOr a (LogicalAnd b (BitwiseOr c (BitwiseXor d (BitwiseAnd e (Equal f (LessThan g (LeftShift h (Add i (Multiply j k))))))))))"
        );
        assert_eq!(tree("a ?? b ?? c"), "(NullCoalescing a (NullCoalescing b c))");
    }

    #[test]
    fn test_is_binds_tighter_than_null_coalescing() {
        assert_eq!(tree("a is Foo ?? b"), "(NullCoalescing (Is a) b)");
        assert_eq!(tree("a + b as T == c"), "(Equal (As (Add a b)) c)");
    }

    #[test]
    fn test_conditional_is_right_associative() {
        assert_eq!(tree("a ? b : c ? d : e"), "(? a b (? c d e))");
        assert_eq!(tree("x = a ? b : c"), "(Assign= x (? a b c))");
        assert_eq!(tree("x = y += 1"), "(Assign= x (Add= y 1))");
    }

    #[test]
    fn test_nullable_type_in_conditional() {
        assert_eq!(tree("a is T ? b : c"), "(? (Is a) b c)");
    }

    #[test]
    fn test_cast_or_parenthesized() {
        assert_eq!(tree("(Foo)x"), "(Cast x)");
        assert_eq!(tree("(x)"), "(Paren x)");
        assert_eq!(tree("(a) - b"), "(Subtract (Paren a) b)");
        assert_eq!(tree("(int)-1"), "(Cast (Negate 1))");
        assert_eq!(tree("(a + b) * c"), "(Multiply (Paren (Add a b)) c)");
        assert_eq!(tree("(Foo)x.y"), "(Cast x.y)");
    }

    #[test]
    fn test_generic_or_less_than() {
        assert_eq!(tree("a < b"), "(LessThan a b)");
        assert_eq!(tree("a<b>()"), "(Call (Generic a 1))");
        assert_eq!(tree("a.M<b, c>(x)"), "(Call (Generic a.M 2) x)");
        assert_eq!(tree("a < b && c > d"), "(LogicalAnd (LessThan a b) (GreaterThan c d))");
    }

    #[test]
    fn test_postfix_and_selectors() {
        assert_eq!(tree("a.b[1, 2]++"), "(Increment (Index a.b 2))");
        assert_eq!(tree("-x--"), "(Negate (Decrement x))");
        assert_eq!(tree("f(ref a, out b)"), "(Call f (Ref a) (Out b))");
    }

    #[test]
    fn test_lambdas() {
        assert_eq!(tree("x => x + 1"), "(Lambda 1)");
        assert_eq!(tree("(x) => x"), "(Lambda 1)");
        assert_eq!(tree("() => 1"), "(Lambda 0)");
        assert_eq!(tree("(int x, ref int y) => x"), "(Lambda 2)");
        assert_eq!(tree("f(x => { return; })"), "(Call f (Lambda 1))");
    }

    #[test]
    fn test_missing_operand() {
        let (tree, errors) = parse("1 + ;");
        assert_eq!(tree, "(Add 1 ?)");
        assert_eq!(errors, vec![ErrorCode::InvalidExprTerm]);
    }

    #[test]
    fn test_missing_colon() {
        let (tree, errors) = parse("a ? b ;");
        assert_eq!(tree, "(? a b ?)");
        assert_eq!(errors, vec![ErrorCode::SyntaxError]);
    }

    #[test]
    fn test_creation_expressions() {
        let creation = |source: &str| {
            let mut p = parser(source);
            let expr = p.parse_expression(Token::Semicolon.into());
            assert!(codes(&p).is_empty(), "{}: {:?}", source, codes(&p));
            expr.kind
        };
        assert!(matches!(
            creation("new Foo(1, 2)"),
            ExprKind::CreateObject { args, .. } if args.len() == 2
        ));
        assert!(matches!(
            creation("new List<int> { 1, 2 }"),
            ExprKind::PopulateCollection { object: Some(_), elements } if elements.len() == 2
        ));
        assert!(matches!(
            creation("new Point { X = 1, Y = 2 }"),
            ExprKind::InitializeObject { members, .. } if members.len() == 2
        ));
        assert!(matches!(
            creation("new int[,] { { 1, 2 }, { 3, 4 } }"),
            ExprKind::CreateArray { rank: 2, initializer, .. } if initializer.len() == 2
        ));
        assert!(matches!(
            creation("new int[3][]"),
            ExprKind::CreateArray {
                rank: 1,
                sizes,
                element_type: TypeExpr { kind: TypeExprKind::Array { .. }, .. },
                ..
            } if sizes.len() == 1
        ));
        assert!(matches!(
            creation("new[] { 1, 2, 3 }"),
            ExprKind::CreateImplicitArray { elements } if elements.len() == 3
        ));
        assert!(matches!(
            creation("new { A = 1, b }"),
            ExprKind::CreateAnonymousObject { members } if members.len() == 2
        ));
        assert!(matches!(creation("typeof(Dictionary<,>)"), ExprKind::TypeOf { .. }));
        assert!(matches!(creation("default(int)"), ExprKind::Default { .. }));
        assert!(matches!(creation("stackalloc int[10]"), ExprKind::StackAlloc { .. }));
        assert!(matches!(
            creation("delegate (int x) { return; }"),
            ExprKind::AnonymousMethod { params: Some(params), .. } if params.len() == 1
        ));
    }

    #[test]
    fn test_bad_new_expression() {
        let (_, errors) = parse("new Foo;");
        assert_eq!(errors, vec![ErrorCode::BadNewExpr]);
    }
}
