//! Names and type expressions.

use super::{sets, Parser};
use crate::ast::{Expr, ExprKind, Ident, PredefinedType, Range, TypeExpr, TypeExprKind};
use crate::parser_diagnostics::ErrorCode;
use crate::source::SourceText;
use crate::token::Token;
use crate::token_set::TokenSet;

pub(super) fn predefined_type(token: Token) -> Option<PredefinedType> {
    Some(match token {
        Token::Bool => PredefinedType::Bool,
        Token::Byte => PredefinedType::Byte,
        Token::Char => PredefinedType::Char,
        Token::Decimal => PredefinedType::Decimal,
        Token::Double => PredefinedType::Double,
        Token::Float => PredefinedType::Float,
        Token::Int => PredefinedType::Int,
        Token::Long => PredefinedType::Long,
        Token::Object => PredefinedType::Object,
        Token::Sbyte => PredefinedType::Sbyte,
        Token::Short => PredefinedType::Short,
        Token::String => PredefinedType::String,
        Token::Uint => PredefinedType::Uint,
        Token::Ulong => PredefinedType::Ulong,
        Token::Ushort => PredefinedType::Ushort,
        Token::Void => PredefinedType::Void,
        _ => return None,
    })
}

impl Expr {
    pub(crate) fn name(ident: Ident) -> Expr {
        Expr::new(ExprKind::Name { ident }, ident.range)
    }
}

impl TypeExpr {
    pub(crate) fn predefined(ty: PredefinedType, range: Range) -> TypeExpr {
        TypeExpr {
            kind: TypeExprKind::Predefined { ty },
            range,
        }
    }

    pub(crate) fn named(name: Expr) -> TypeExpr {
        let range = name.range;
        TypeExpr {
            kind: TypeExprKind::Named { name: Box::new(name) },
            range,
        }
    }

    /// The name of a [`TypeExprKind::Named`] type that is a lone identifier.
    pub(crate) fn simple_name(&self) -> Option<Ident> {
        match &self.kind {
            TypeExprKind::Named { name } => match name.kind {
                ExprKind::Name { ident } => Some(ident),
                _ => None,
            },
            _ => None,
        }
    }
}

impl<S: SourceText> Parser<S> {
    /// An identifier, or an empty name after reporting `ExpectedIdentifier`.
    pub(super) fn parse_simple_name(&mut self, followers: TokenSet) -> Ident {
        if !self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) {
            self.error(ErrorCode::ExpectedIdentifier, vec![]);
        }
        let ident = self.parse_name_declaration();
        self.skip_to(followers);
        ident
    }

    /// `a`, `a.b`, `alias::a.b`, `global::a`, `a<T>.b<U>`.
    pub(super) fn parse_namespace_or_type_name(
        &mut self,
        allow_empty_arguments: bool,
        followers: TokenSet,
    ) -> Expr {
        let start = self.token_start();
        let root =
            self.parse_simple_name(followers | Token::Dot | Token::DoubleColon | Token::LessThan);
        let mut expr = Expr::name(root);
        if self.token == Token::DoubleColon {
            if root.name == self.global {
                expr = Expr::new(ExprKind::RootNamespace, root.range);
            }
            self.bump();
            let name = self.parse_simple_name(followers | Token::Dot | Token::LessThan);
            expr = Expr::new(
                ExprKind::AliasQualified {
                    alias: Box::new(expr),
                    name,
                },
                self.range_from(start),
            );
        }
        loop {
            while self.token == Token::Dot {
                self.bump();
                let name = self.parse_simple_name(followers | Token::Dot | Token::LessThan);
                expr = Expr::new(
                    ExprKind::Qualified {
                        qualifier: Box::new(expr),
                        name,
                    },
                    self.range_from(start),
                );
            }
            if self.token != Token::LessThan {
                break;
            }
            while self.token == Token::LessThan {
                let args = self.parse_type_arguments(allow_empty_arguments, followers | Token::Dot);
                expr = Expr::new(
                    ExprKind::GenericInstance {
                        target: Box::new(expr),
                        args,
                    },
                    self.range_from(start),
                );
            }
            if self.token != Token::Dot {
                break;
            }
        }
        if self.inside_type && !self.inside_block && !self.at(followers) {
            let text = self.token_text();
            self.skip_to_with(followers, Some(ErrorCode::InvalidMemberDecl), vec![text]);
        } else {
            self.skip_to(followers);
        }
        expr
    }

    /// `<T, U>`. With `allow_empty_arguments`, accepts the `<,>` of an
    /// unbound generic type. A `>>` closing a nested list is split: the
    /// current token becomes `>` for the enclosing list to consume.
    pub(super) fn parse_type_arguments(
        &mut self,
        allow_empty_arguments: bool,
        followers: TokenSet,
    ) -> Vec<TypeExpr> {
        self.bump();
        let mut result = Vec::new();
        let mut saw_empty = false;
        let mut comma_range = self.token_range();
        while self.token != Token::EndOfFile {
            if matches!(self.token, Token::GreaterThan | Token::RightShift)
                && !result.is_empty()
                && !saw_empty
            {
                break;
            }
            if matches!(self.token, Token::Comma | Token::GreaterThan) {
                let range = Range::empty_at(self.token_start());
                result.push(TypeExpr {
                    kind: TypeExprKind::Empty,
                    range,
                });
                if allow_empty_arguments {
                    saw_empty = true;
                    comma_range = self.token_range();
                } else {
                    self.error_at(comma_range, ErrorCode::TypeExpected, vec![]);
                }
                if self.token == Token::GreaterThan {
                    break;
                }
                self.bump();
                continue;
            }
            if saw_empty {
                self.error(ErrorCode::TypeExpected, vec![]);
            }
            let arg = self.parse_type_expression(
                false,
                allow_empty_arguments,
                followers | Token::Comma | Token::GreaterThan | Token::RightShift,
            );
            result.push(arg);
            if self.token != Token::Comma {
                break;
            }
            self.bump();
        }
        if self.token == Token::RightShift {
            self.token = Token::GreaterThan;
        } else {
            self.skip_over_to(Token::GreaterThan, followers);
        }
        result
    }

    /// A base type followed by any `[]`, `*`, `?` and `!` suffixes. In a
    /// boolean context (`x is T ? a : b`), a `?` followed by the start of a
    /// term is left for the conditional operator.
    pub(super) fn parse_type_expression(
        &mut self,
        boolean_context: bool,
        allow_empty_arguments: bool,
        followers: TokenSet,
    ) -> TypeExpr {
        self.nested(
            |p| {
                p.parse_type_expression_unguarded(boolean_context, allow_empty_arguments, followers)
            },
            |range| TypeExpr::predefined(PredefinedType::Object, range),
        )
    }

    fn parse_type_expression_unguarded(
        &mut self,
        boolean_context: bool,
        allow_empty_arguments: bool,
        followers: TokenSet,
    ) -> TypeExpr {
        if self.token == Token::EndOfFile {
            self.error(ErrorCode::TypeExpected, vec![]);
            let range = Range::empty_at(self.token_start());
            return TypeExpr::predefined(PredefinedType::Object, range);
        }
        let start = self.token_start();
        let followers_or_operator = followers | sets::TYPE_OPERATOR;
        let mut ty = self.parse_base_type_expression(allow_empty_arguments, followers_or_operator);
        loop {
            let kind = match self.token {
                Token::BitwiseAnd => {
                    self.error(ErrorCode::ExpectedIdentifier, vec![]);
                    self.bump();
                    continue;
                }
                Token::LeftBracket => {
                    ty = self.parse_array_type(ty, start, followers_or_operator);
                    continue;
                }
                Token::Multiply => TypeExprKind::Pointer { target: Box::new(ty) },
                Token::LogicalNot => TypeExprKind::NonNull { target: Box::new(ty) },
                Token::Conditional => {
                    if boolean_context && sets::NULLABLE_TYPE_NON_FOLLOWER.contains(self.peek()) {
                        break;
                    }
                    TypeExprKind::Nullable { target: Box::new(ty) }
                }
                _ => break,
            };
            self.bump();
            ty = TypeExpr {
                kind,
                range: self.range_from(start),
            };
        }
        self.skip_to(followers);
        ty
    }

    /// One or more rank specifiers. `T[][,]` is a one-dimensional array of
    /// two-dimensional arrays.
    pub(super) fn parse_array_type(
        &mut self,
        element: TypeExpr,
        start: usize,
        followers: TokenSet,
    ) -> TypeExpr {
        let mut ranks = Vec::new();
        while self.token == Token::LeftBracket {
            ranks.push(self.parse_rank_specifier(followers | Token::LeftBracket));
        }
        let range = self.range_from(start);
        ranks.into_iter().rev().fold(element, |element, rank| TypeExpr {
            kind: TypeExprKind::Array {
                element: Box::new(element),
                rank,
            },
            range,
        })
    }

    /// `[` `,`* `]`; the rank is one more than the number of commas.
    pub(super) fn parse_rank_specifier(&mut self, followers: TokenSet) -> u32 {
        self.bump();
        let mut rank = 1;
        while self.token == Token::Comma {
            rank += 1;
            self.bump();
        }
        self.skip_over_to(Token::RightBracket, followers);
        rank
    }

    /// A predefined type or a namespace-or-type name.
    pub(super) fn parse_base_type_expression(
        &mut self,
        allow_empty_arguments: bool,
        followers: TokenSet,
    ) -> TypeExpr {
        if let Some(ty) = predefined_type(self.token) {
            let range = self.token_range();
            self.bump();
            self.skip_to(followers);
            return TypeExpr::predefined(ty, range);
        }
        TypeExpr::named(self.parse_namespace_or_type_name(allow_empty_arguments, followers))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;
    use crate::token_set::TokenSet;
    use pretty_assertions::assert_eq;

    fn render(ty: &TypeExpr) -> String {
        match &ty.kind {
            TypeExprKind::Predefined { ty } => ty.keyword().to_owned(),
            TypeExprKind::Named { name } => render_name(name),
            TypeExprKind::Array { element, rank } => {
                format!("{}[{}]", render(element), ",".repeat(*rank as usize - 1))
            }
            TypeExprKind::Pointer { target } => format!("{}*", render(target)),
            TypeExprKind::Nullable { target } => format!("{}?", render(target)),
            TypeExprKind::NonNull { target } => format!("{}!", render(target)),
            TypeExprKind::Empty => String::new(),
        }
    }

    fn render_name(expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Name { .. } => "N".to_owned(),
            ExprKind::RootNamespace => "global".to_owned(),
            ExprKind::Qualified { qualifier, .. } => format!("{}.N", render_name(qualifier)),
            ExprKind::AliasQualified { alias, .. } => format!("{}::N", render_name(alias)),
            ExprKind::GenericInstance { target, args } => format!(
                "{}<{}>",
                render_name(target),
                args.iter().map(render).collect::<Vec<_>>().join(",")
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    fn parse_type(source: &str) -> (String, Vec<ErrorCode>) {
        let mut p = parser(source);
        let followers = TokenSet::from(Token::Semicolon);
        let ty = p.parse_type_expression(false, false, followers);
        assert_at_follower(&p, followers);
        (render(&ty), codes(&p))
    }

    #[test]
    fn test_type_suffixes() {
        // The leftmost rank specifier is the outermost array.
        assert_eq!(parse_type("int[][,] ;"), ("int[,][]".to_owned(), vec![]));
        assert_eq!(parse_type("a.b? ;"), ("N.N?".to_owned(), vec![]));
        assert_eq!(parse_type("char** ;"), ("char**".to_owned(), vec![]));
    }

    #[test]
    fn test_nested_generics_split_right_shift() {
        assert_eq!(
            parse_type("global::a.List<Dictionary<int, b>> ;"),
            ("global::N.N<N<int,N>>".to_owned(), vec![])
        );
    }

    #[test]
    fn test_empty_type_arguments() {
        let mut p = parser("List<,> )");
        let ty = p.parse_type_expression(false, true, Token::RightParenthesis.into());
        assert_eq!(render(&ty), "N<,>");
        assert!(codes(&p).is_empty());

        let mut p = parser("List<,> )");
        let ty = p.parse_type_expression(false, false, Token::RightParenthesis.into());
        assert_eq!(render(&ty), "N<>");
        assert_eq!(codes(&p), vec![ErrorCode::TypeExpected]);
    }

    #[test]
    fn test_nullable_in_boolean_context() {
        let mut p = parser("T ? a : b");
        let ty = p.parse_type_expression(true, false, sets::INFIX_OPERATORS);
        assert_eq!(render(&ty), "N");
        assert_eq!(p.token, Token::Conditional);
    }

    #[test]
    fn test_missing_type_at_end_of_file() {
        assert_eq!(parse_type(""), ("object".to_owned(), vec![ErrorCode::TypeExpected]));
    }
}
