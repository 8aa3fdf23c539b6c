//! Members of classes, structs and interfaces, and the parameter and generic
//! parameter lists they share with type declarations.

use super::modifiers::{
    ModifierToken, CONSTRUCTOR_MODIFIERS, CONST_MODIFIERS, DESTRUCTOR_MODIFIERS, FIELD_MODIFIERS,
    METHOD_MODIFIERS, OPERATOR_MODIFIERS,
};
use super::{sets, Parser};
use crate::ast::{
    Accessor, AttributeSection, Constraint, ConstructorInitializer, ConstructorInitializerKind,
    Expr, ExprKind, GenericParam, Ident, MemberDecl, MemberKind, ModifierFlags, Modifiers, Param,
    ParamModifier, PredefinedType, Range, TypeExpr, TypeExprKind, Visibility,
};
use crate::names::Name;
use crate::parser_diagnostics::ErrorCode;
use crate::source::SourceText;
use crate::token::Token;
use crate::token_set::TokenSet;

/// Metadata name of an overloadable operator, and whether it has binary and
/// unary forms.
fn operator_name(token: Token) -> Option<(&'static str, bool, bool)> {
    Some(match token {
        Token::Plus => ("op_Addition", true, true),
        Token::Subtract => ("op_Subtraction", true, true),
        Token::Multiply => ("op_Multiply", true, false),
        Token::Divide => ("op_Division", true, false),
        Token::Remainder => ("op_Modulus", true, false),
        Token::BitwiseAnd => ("op_BitwiseAnd", true, false),
        Token::BitwiseOr => ("op_BitwiseOr", true, false),
        Token::BitwiseXor => ("op_ExclusiveOr", true, false),
        Token::LeftShift => ("op_LeftShift", true, false),
        Token::RightShift => ("op_RightShift", true, false),
        Token::Equal => ("op_Equality", true, false),
        Token::NotEqual => ("op_Inequality", true, false),
        Token::GreaterThan => ("op_GreaterThan", true, false),
        Token::LessThan => ("op_LessThan", true, false),
        Token::GreaterThanOrEqual => ("op_GreaterThanOrEqual", true, false),
        Token::LessThanOrEqual => ("op_LessThanOrEqual", true, false),
        Token::LogicalNot => ("op_LogicalNot", false, true),
        Token::BitwiseNot => ("op_OnesComplement", false, true),
        Token::AddOne => ("op_Increment", false, true),
        Token::SubtractOne => ("op_Decrement", false, true),
        Token::True => ("op_True", false, true),
        Token::False => ("op_False", false, true),
        Token::Implicit => ("op_Implicit", false, true),
        Token::Explicit => ("op_Explicit", false, true),
        _ => return None,
    })
}

fn is_single_dimensional_array(ty: &TypeExpr) -> bool {
    matches!(ty.kind, TypeExprKind::Array { rank: 1, .. })
}

/// What every member parser receives from the shared prefix.
struct MemberHead {
    start: usize,
    attributes: Vec<AttributeSection>,
    modifiers: Vec<ModifierToken>,
}

impl<S: SourceText> Parser<S> {
    fn void_type(&self, range: Range) -> TypeExpr {
        TypeExpr::predefined(PredefinedType::Void, range)
    }

    fn member(&self, head: &MemberHead, modifiers: Modifiers, kind: MemberKind) -> MemberDecl {
        MemberDecl {
            attributes: head.attributes.clone(),
            modifiers,
            kind,
            range: self.range_from(head.start),
        }
    }

    /// Members up to a follower of the enclosing body.
    pub(super) fn parse_type_members(
        &mut self,
        type_name: Name,
        members: &mut Vec<MemberDecl>,
        followers: TokenSet,
    ) {
        let member_followers = followers | sets::TYPE_MEMBER_START;
        loop {
            let start = self.token_start();
            let attributes = self.parse_attributes(member_followers);
            let modifiers = self.parse_modifiers();
            let head = MemberHead {
                start,
                attributes,
                modifiers,
            };
            match self.token {
                Token::Class | Token::Interface | Token::Struct | Token::Enum | Token::Delegate => {
                    let modifiers = self.type_modifiers(&head.modifiers);
                    let decl = self.parse_type_declaration(
                        head.start,
                        head.attributes.clone(),
                        modifiers,
                        member_followers,
                    );
                    let kind = MemberKind::NestedType(Box::new(decl));
                    members.push(self.member(&head, modifiers, kind));
                }
                Token::Const => self.parse_const(&head, members, member_followers),
                Token::Event => self.parse_event(&head, members, member_followers),
                Token::Operator | Token::Explicit | Token::Implicit => {
                    members.push(self.parse_operator(&head, None, member_followers));
                }
                Token::BitwiseNot => {
                    members.push(self.parse_destructor(type_name, &head, member_followers))
                }
                token if predefined_or_name(token) => {
                    self.parse_constructor_or_field_or_method_or_property(
                        type_name,
                        &head,
                        members,
                        member_followers,
                    );
                }
                _ => {
                    self.skip_to(followers);
                    return;
                }
            }
        }
    }

    fn parse_constructor_or_field_or_method_or_property(
        &mut self,
        type_name: Name,
        head: &MemberHead,
        members: &mut Vec<MemberDecl>,
        followers: TokenSet,
    ) {
        let names_type = self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD)
            && self.names.get(&self.scanner.identifier_text()) == Some(type_name);
        if names_type && self.peek() == Token::LeftParenthesis {
            members.push(self.parse_constructor(head, followers | Token::Semicolon));
            if self.token == Token::Semicolon {
                self.bump();
            }
            self.skip_to(followers);
            return;
        }

        let ty = self.parse_type_expression(
            false,
            false,
            followers
                | sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD
                | Token::Explicit
                | Token::Implicit,
        );
        let mut bad_modifier = false;
        while self.at(sets::MEMBER_MODIFIER) && !self.scanner.is_first_after_line_break() {
            if !bad_modifier {
                let text = self.token_text();
                self.error(ErrorCode::BadModifierLocation, vec![text]);
                bad_modifier = true;
            }
            self.bump();
        }

        match self.token {
            Token::This => {
                let name = Ident {
                    name: self.intern("Item"),
                    range: self.token_range(),
                };
                members.push(self.parse_property(head, ty, None, name, followers));
                return;
            }
            Token::Explicit | Token::Implicit | Token::Operator => {
                members.push(self.parse_operator(head, Some(ty), followers));
                return;
            }
            Token::LeftParenthesis | Token::LessThan => {
                if let Some(name) = ty.simple_name() {
                    self.error_at(ty.range, ErrorCode::MemberNeedsType, vec![]);
                    let void = self.void_type(ty.range);
                    members.push(self.parse_method(head, void, None, name, followers));
                    return;
                }
            }
            token if !sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD.contains(token) => {
                if self.at(followers) {
                    self.error(ErrorCode::ExpectedIdentifier, vec![]);
                } else {
                    self.skip_to(followers);
                }
                let name = Ident {
                    name: self.intern(""),
                    range: Range::empty_at(self.token_start()),
                };
                self.parse_field(head, ty, name, members, followers);
                return;
            }
            _ => {}
        }

        let mut name = self.parse_name_declaration();
        let mut interface = None;
        if self.token != Token::LessThan || !self.at_method_type_parameter_list(followers) {
            let interface_followers = followers
                | Token::LeftBrace
                | Token::LeftBracket
                | Token::LeftParenthesis
                | Token::LessThan;
            (name, interface) =
                self.parse_implemented_interface_plus_name(name, true, interface_followers);
        }
        match self.token {
            Token::LeftBrace | Token::This => {
                members.push(self.parse_property(head, ty, interface, name, followers))
            }
            Token::LeftParenthesis | Token::LessThan => {
                members.push(self.parse_method(head, ty, interface, name, followers));
            }
            _ if interface.is_some() => {
                members.push(self.parse_method(head, ty, interface, name, followers))
            }
            _ => self.parse_field(head, ty, name, members, followers),
        }
    }

    /// At a `<` after a member name: whether it opens the method's type
    /// parameters rather than the arguments of an explicitly implemented
    /// generic interface (`IList<T>.Add`).
    fn at_method_type_parameter_list(&mut self, followers: TokenSet) -> bool {
        let mut qualifies_interface = false;
        let _ = self.speculate(
            |p| {
                p.parse_type_arguments(false, followers | Token::Dot);
                p.errors.is_empty() && p.token == Token::Dot
            },
            |_, &dotted| {
                qualifies_interface = dotted;
                false
            },
        );
        !qualifies_interface
    }

    /// Follows `I.J<T>.Name` to the member name. Returns the name and, when
    /// qualified, the interface it implements. With `allow_this`, an
    /// indexer's `this` is left current and named `Item`.
    fn parse_implemented_interface_plus_name(
        &mut self,
        mut name: Ident,
        allow_this: bool,
        followers: TokenSet,
    ) -> (Ident, Option<TypeExpr>) {
        let start = name.range.start();
        let mut expr = Expr::name(name);
        let mut qualifier = None;
        while matches!(self.token, Token::Dot | Token::LessThan) {
            if self.token == Token::LessThan {
                let args =
                    self.parse_type_arguments(false, followers | Token::Dot | Token::LeftBrace);
                expr = Expr::new(
                    ExprKind::GenericInstance {
                        target: Box::new(expr),
                        args,
                    },
                    self.range_from(start),
                );
            }
            self.skip(Token::Dot);
            if self.token == Token::This && allow_this {
                name = Ident {
                    name: self.intern("Item"),
                    range: self.token_range(),
                };
            } else {
                if !self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) {
                    self.skip_to_with(
                        followers | sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD | Token::LeftBrace,
                        Some(ErrorCode::ExpectedIdentifier),
                        vec![],
                    );
                }
                name = self.parse_name_declaration();
            }
            qualifier = Some(expr.clone());
            expr = Expr::new(
                ExprKind::Qualified {
                    qualifier: Box::new(expr),
                    name,
                },
                self.range_from(start),
            );
        }
        (name, qualifier.map(TypeExpr::named))
    }

    fn parse_constructor(&mut self, head: &MemberHead, followers: TokenSet) -> MemberDecl {
        let modifiers = self.member_modifiers(&head.modifiers, CONSTRUCTOR_MODIFIERS);
        let name = self.parse_name_declaration();
        let params = self.parse_parameters(
            Token::RightParenthesis,
            followers | Token::Where | Token::LeftBrace | Token::Semicolon | Token::Colon,
        );
        let mut initializer = None;
        if self.token == Token::Colon {
            self.bump();
            let start = self.token_start();
            let kind = match self.token {
                Token::This => Some(ConstructorInitializerKind::This),
                Token::Base => Some(ConstructorInitializerKind::Base),
                _ => None,
            };
            match kind {
                Some(kind) => {
                    self.bump();
                    let args = if self.token == Token::LeftParenthesis {
                        self.parse_argument_list(followers | Token::LeftBrace)
                    } else {
                        self.skip_to_with(
                            followers | Token::LeftBrace,
                            Some(ErrorCode::ExpectedLeftParenthesis),
                            vec![],
                        );
                        Vec::new()
                    };
                    initializer = Some(ConstructorInitializer {
                        kind,
                        args,
                        range: self.range_from(start),
                    });
                }
                None => {
                    self.skip_to_with(
                        followers | Token::LeftBrace,
                        Some(ErrorCode::ThisOrBaseExpected),
                        vec![],
                    );
                }
            }
        }
        let body = self.parse_body(followers);
        self.member(
            head,
            modifiers,
            MemberKind::Constructor {
                name,
                params,
                initializer,
                body,
            },
        )
    }

    /// One or more comma-separated fields sharing a type. A missing `;`
    /// is reported once and the next member is parsed normally.
    fn parse_field(
        &mut self,
        head: &MemberHead,
        ty: TypeExpr,
        mut name: Ident,
        members: &mut Vec<MemberDecl>,
        followers: TokenSet,
    ) {
        let modifiers = self.member_modifiers(&head.modifiers, FIELD_MODIFIERS);
        let declarator_followers = followers | Token::Comma | Token::Semicolon;
        loop {
            let init = if self.token == Token::Assign {
                self.bump();
                Some(self.parse_variable_initializer(&ty, declarator_followers))
            } else {
                None
            };
            members.push(self.member(
                head,
                modifiers,
                MemberKind::Field {
                    ty: ty.clone(),
                    name,
                    init,
                },
            ));
            if self.token != Token::Comma {
                break;
            }
            self.bump();
            if !self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) {
                self.error(ErrorCode::ExpectedIdentifier, vec![]);
            }
            name = self.parse_name_declaration();
        }
        self.skip_semicolon(followers);
    }

    fn parse_const(
        &mut self,
        head: &MemberHead,
        members: &mut Vec<MemberDecl>,
        followers: TokenSet,
    ) {
        self.bump();
        let mut modifiers = self.member_modifiers(&head.modifiers, CONST_MODIFIERS);
        modifiers.flags |= ModifierFlags::CONST;
        let declarator_followers = followers | Token::Comma | Token::Semicolon;
        let ty = self.parse_type_expression(
            false,
            false,
            declarator_followers | sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD | Token::Assign,
        );
        loop {
            if !self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) {
                self.skip_to_with(
                    followers
                        | sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD
                        | Token::Assign
                        | Token::Comma
                        | Token::Semicolon,
                    Some(ErrorCode::ExpectedIdentifier),
                    vec![],
                );
            }
            let name = self.parse_name_declaration();
            if self.token == Token::Assign {
                self.bump();
            } else {
                self.skip_to_with(
                    sets::UNARY_START | declarator_followers,
                    Some(ErrorCode::ConstValueRequired),
                    vec![],
                );
                if self.token == Token::Comma {
                    self.bump();
                    continue;
                }
                if !self.at(sets::UNARY_START) {
                    let kind = MemberKind::Field {
                        ty: ty.clone(),
                        name,
                        init: None,
                    };
                    members.push(self.member(head, modifiers, kind));
                    self.skip_to_with(followers, None, vec![]);
                    return;
                }
            }
            let init = self.parse_expression(declarator_followers);
            let kind = MemberKind::Field {
                ty: ty.clone(),
                name,
                init: Some(init),
            };
            members.push(self.member(head, modifiers, kind));
            if self.token != Token::Comma {
                break;
            }
            self.bump();
        }
        self.skip_semicolon(followers);
    }

    fn parse_method(
        &mut self,
        head: &MemberHead,
        return_type: TypeExpr,
        interface: Option<TypeExpr>,
        name: Ident,
        followers: TokenSet,
    ) -> MemberDecl {
        let modifiers = self.member_modifiers(&head.modifiers, METHOD_MODIFIERS);
        let mut generic_params = self.parse_generic_parameters(
            followers | Token::LeftParenthesis | Token::Where | Token::LeftBrace | Token::Semicolon,
        );
        let params = self.parse_parameters(
            Token::RightParenthesis,
            followers | Token::Where | Token::LeftBrace | Token::Semicolon,
        );
        self.parse_constraint_clauses(
            &mut generic_params,
            name,
            followers | Token::LeftBrace | Token::Semicolon,
        );
        let body = self.parse_body(followers);
        self.member(
            head,
            modifiers,
            MemberKind::Method {
                return_type,
                name,
                interface,
                generic_params,
                params,
                body,
            },
        )
    }

    /// `operator +(...)`, `implicit operator T(...)` and friends. A result
    /// type parsed before the keyword arrives in `result_type`.
    fn parse_operator(
        &mut self,
        head: &MemberHead,
        result_type: Option<TypeExpr>,
        followers: TokenSet,
    ) -> MemberDecl {
        let modifiers = self.member_modifiers(&head.modifiers, OPERATOR_MODIFIERS);
        let keyword_range = self.token_range();
        let mut symbol_range = keyword_range;
        let mut symbol_text = self.token_text();
        let (mut op_name, mut can_be_binary, mut can_be_unary) = ("", false, false);
        let return_type = match self.token {
            Token::Explicit | Token::Implicit => {
                let keyword = self.token_text();
                if let Some((name, binary, unary)) = operator_name(self.token) {
                    (op_name, can_be_binary, can_be_unary) = (name, binary, unary);
                }
                self.bump();
                self.skip(Token::Operator);
                match result_type {
                    Some(ty) if self.token == Token::LeftParenthesis => {
                        self.error_at(keyword_range, ErrorCode::BadOperatorSyntax, vec![keyword]);
                        ty
                    }
                    _ => {
                        self.parse_type_expression(false, false, followers | Token::LeftParenthesis)
                    }
                }
            }
            _ => {
                self.bump();
                symbol_range = self.token_range();
                symbol_text = self.token_text();
                if let Some((name, binary, unary)) = operator_name(self.token) {
                    (op_name, can_be_binary, can_be_unary) = (name, binary, unary);
                    if matches!(self.token, Token::Implicit | Token::Explicit) {
                        self.error(ErrorCode::BadOperatorSyntax, vec![symbol_text.clone()]);
                    }
                }
                if self.token != Token::EndOfFile {
                    self.bump();
                }
                match result_type {
                    Some(ty) => ty,
                    None => {
                        self.error_at(
                            keyword_range | symbol_range,
                            ErrorCode::BadOperatorSyntax2,
                            vec![symbol_text.clone()],
                        );
                        if self.token != Token::LeftParenthesis {
                            let followers = followers | Token::LeftParenthesis;
                            self.parse_type_expression(false, false, followers)
                        } else {
                            self.void_type(symbol_range)
                        }
                    }
                }
            }
        };

        let params = self.parse_parameters(
            Token::RightParenthesis,
            followers | Token::LeftBrace | Token::Semicolon | Token::Where,
        );
        match params.len() {
            1 => {
                if !can_be_unary {
                    self.error_at(symbol_range, ErrorCode::OvlUnaryOperatorExpected, vec![]);
                }
                if can_be_binary {
                    op_name = match op_name {
                        "op_Addition" => "op_UnaryPlus",
                        "op_Subtraction" => "op_UnaryNegation",
                        other => other,
                    };
                }
            }
            2 => {
                if !can_be_binary {
                    if can_be_unary {
                        let args = vec![symbol_text];
                        self.error_at(symbol_range, ErrorCode::WrongParsForUnaryOp, args);
                    } else {
                        self.error_at(symbol_range, ErrorCode::OvlBinaryOperatorExpected, vec![]);
                    }
                }
            }
            _ => {
                if can_be_binary {
                    self.error_at(symbol_range, ErrorCode::WrongParsForBinOp, vec![symbol_text]);
                } else if can_be_unary {
                    self.error_at(symbol_range, ErrorCode::WrongParsForUnaryOp, vec![symbol_text]);
                } else {
                    self.error_at(symbol_range, ErrorCode::OvlBinaryOperatorExpected, vec![]);
                }
            }
        }
        let name = Ident {
            name: self.intern(op_name),
            range: symbol_range,
        };
        let body = self.parse_body(followers);
        self.member(
            head,
            modifiers,
            MemberKind::Operator {
                name,
                return_type,
                params,
                body,
            },
        )
    }

    /// `~Name() { ... }`, named `Finalize` in the tree.
    fn parse_destructor(
        &mut self,
        type_name: Name,
        head: &MemberHead,
        followers: TokenSet,
    ) -> MemberDecl {
        self.bump();
        let mut modifiers = self.member_modifiers(&head.modifiers, DESTRUCTOR_MODIFIERS);
        modifiers.visibility = Visibility::Private;
        if !self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) {
            self.error(ErrorCode::ExpectedIdentifier, vec![]);
        }
        let written = self.parse_name_declaration();
        if written.name != type_name {
            self.error_at(written.range, ErrorCode::WrongNameForDestructor, vec![]);
        }
        let name = Ident {
            name: self.intern("Finalize"),
            range: written.range,
        };
        let params = self.parse_parameters(Token::RightParenthesis, followers | Token::LeftBrace);
        if let Some(first) = params.first() {
            self.error_at(first.range, ErrorCode::ExpectedRightParenthesis, vec![]);
        }
        let body = self.parse_body(followers);
        self.member(head, modifiers, MemberKind::Destructor { name, body })
    }

    /// A property at its `{`, or an indexer at its `this`.
    fn parse_property(
        &mut self,
        head: &MemberHead,
        ty: TypeExpr,
        interface: Option<TypeExpr>,
        name: Ident,
        followers: TokenSet,
    ) -> MemberDecl {
        let modifiers = self.member_modifiers(&head.modifiers, METHOD_MODIFIERS);
        let params = if self.token == Token::This {
            self.bump();
            let params = self.parse_parameters(Token::RightBracket, followers | Token::LeftBrace);
            self.skip(Token::LeftBrace);
            params
        } else {
            self.bump();
            Vec::new()
        };

        let accessor_followers =
            followers | sets::GET_OR_LEFT_BRACKET_OR_SET_OR_MODIFIER | Token::LeftBrace;
        let mut getter: Option<Accessor> = None;
        let mut setter: Option<Accessor> = None;
        let mut complained = false;
        let mut pending: Option<Vec<ModifierToken>> = None;
        loop {
            let start = self.token_start();
            let attributes = self.parse_attributes(accessor_followers);
            match self.token {
                Token::Get | Token::Set => {
                    let is_getter = self.token == Token::Get;
                    let visibility = match pending.take() {
                        Some(accessor_modifiers) => self.member_visibility(&accessor_modifiers),
                        None => modifiers.visibility,
                    };
                    let already_defined = if is_getter {
                        getter.is_some()
                    } else {
                        setter.is_some()
                    };
                    if already_defined {
                        self.error(ErrorCode::DuplicateAccessor, vec![]);
                    }
                    self.bump();
                    let body = if self.token == Token::Semicolon {
                        self.bump();
                        None
                    } else {
                        let other = if is_getter { Token::Set } else { Token::Get };
                        self.parse_body(followers | Token::RightBrace | other)
                    };
                    let accessor = Accessor {
                        attributes,
                        visibility,
                        body,
                        range: self.range_from(start),
                    };
                    if is_getter {
                        getter = Some(accessor);
                    } else {
                        setter = Some(accessor);
                    }
                }
                Token::Protected | Token::Internal | Token::Private if pending.is_none() => {
                    pending = Some(self.parse_modifiers());
                }
                token if sets::MEMBER_MODIFIER.contains(token) => {
                    if !complained {
                        self.error(ErrorCode::NoModifiersOnAccessor, vec![]);
                        complained = true;
                    }
                    self.bump();
                }
                Token::RightBrace => break,
                _ => {
                    self.error(ErrorCode::GetOrSetExpected, vec![]);
                    break;
                }
            }
        }
        self.skip_over_to(Token::RightBrace, followers);
        self.member(
            head,
            modifiers,
            MemberKind::Property {
                ty,
                name,
                interface,
                params,
                getter,
                setter,
            },
        )
    }

    /// Field-like events, or one event with `add` and `remove` accessors.
    fn parse_event(
        &mut self,
        head: &MemberHead,
        members: &mut Vec<MemberDecl>,
        followers: TokenSet,
    ) {
        self.bump();
        let modifiers = self.member_modifiers(&head.modifiers, METHOD_MODIFIERS);
        let declarator_followers = followers | Token::Comma | Token::Semicolon;
        let ty = self.parse_type_expression(
            false,
            false,
            declarator_followers | sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD | Token::Assign,
        );
        let mut first = true;
        loop {
            if !self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) {
                self.skip_to_with(
                    followers
                        | sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD
                        | Token::LeftBrace
                        | Token::Dot
                        | Token::LessThan
                        | Token::Assign
                        | Token::Comma,
                    Some(ErrorCode::ExpectedIdentifier),
                    vec![],
                );
            }
            let name = self.parse_name_declaration();
            if first && matches!(self.token, Token::LeftBrace | Token::Dot | Token::LessThan) {
                let event = self.parse_event_with_accessors(head, modifiers, ty, name, followers);
                members.push(event);
                return;
            }
            first = false;
            let init = if self.token == Token::Assign {
                self.bump();
                Some(self.parse_expression(declarator_followers))
            } else {
                None
            };
            let kind = MemberKind::Event {
                ty: ty.clone(),
                name,
                interface: None,
                init,
                adder: None,
                remover: None,
            };
            members.push(self.member(head, modifiers, kind));
            if self.token != Token::Comma {
                break;
            }
            self.bump();
        }
        self.skip_semicolon(followers);
    }

    fn parse_event_with_accessors(
        &mut self,
        head: &MemberHead,
        modifiers: Modifiers,
        ty: TypeExpr,
        name: Ident,
        followers: TokenSet,
    ) -> MemberDecl {
        let (name, interface) = self.parse_implemented_interface_plus_name(name, false, followers);
        if self.token == Token::LeftBrace {
            self.bump();
        } else {
            let code = if interface.is_some() {
                ErrorCode::ExplicitEventFieldImpl
            } else {
                ErrorCode::ExpectedLeftBrace
            };
            self.skip_to_with(
                followers | Token::LeftBracket | Token::Add | Token::Remove | Token::RightBrace,
                Some(code),
                vec![],
            );
        }

        let mut adder: Option<Accessor> = None;
        let mut remover: Option<Accessor> = None;
        let mut complained = false;
        loop {
            let start = self.token_start();
            let attributes = self
                .parse_attributes(followers | sets::ADD_OR_REMOVE_OR_MODIFIER | Token::LeftBrace);
            match self.token {
                Token::Add | Token::Remove => {
                    let is_adder = self.token == Token::Add;
                    let already_defined = if is_adder {
                        adder.is_some()
                    } else {
                        remover.is_some()
                    };
                    if already_defined {
                        self.error(ErrorCode::DuplicateAccessor, vec![]);
                    }
                    self.bump();
                    let other = if is_adder { Token::Remove } else { Token::Add };
                    let body = if self.token == Token::LeftBrace {
                        self.parse_body(followers | Token::RightBrace | other)
                    } else {
                        self.skip_to_with(
                            followers | Token::RightBrace | other,
                            Some(ErrorCode::AddRemoveMustHaveBody),
                            vec![],
                        );
                        None
                    };
                    let accessor = Accessor {
                        attributes,
                        visibility: modifiers.visibility,
                        body,
                        range: self.range_from(start),
                    };
                    if is_adder {
                        adder = Some(accessor);
                    } else {
                        remover = Some(accessor);
                    }
                }
                token if sets::MEMBER_MODIFIER.contains(token) => {
                    if !complained {
                        self.error(ErrorCode::NoModifiersOnAccessor, vec![]);
                        complained = true;
                    }
                    self.bump();
                }
                Token::RightBrace => break,
                _ => {
                    self.error(ErrorCode::AddOrRemoveExpected, vec![]);
                    break;
                }
            }
        }
        self.skip_over_to(Token::RightBrace, followers);
        self.member(
            head,
            modifiers,
            MemberKind::Event {
                ty,
                name,
                interface,
                init: None,
                adder,
                remover,
            },
        )
    }

    /// `(...)` or, with `closing` set to `]`, an indexer's `[...]`.
    pub(super) fn parse_parameters(&mut self, closing: Token, followers: TokenSet) -> Vec<Param> {
        if closing == Token::RightBracket {
            self.skip(Token::LeftBracket);
        } else {
            self.skip(Token::LeftParenthesis);
        }
        let mut params = Vec::new();
        while self.token != closing && self.token != Token::EndOfFile {
            let param = self.parse_parameter(
                closing == Token::RightParenthesis,
                followers | Token::Comma | closing,
            );
            params.push(param);
            if self.token != Token::Comma {
                break;
            }
            self.bump();
        }
        self.skip_over_to(closing, followers);
        params
    }

    fn parse_parameter(&mut self, allow_by_reference: bool, followers: TokenSet) -> Param {
        let start = self.token_start();
        let attributes = self.parse_attributes(followers | sets::PARAMETER_TYPE_START);
        let mut modifier = ParamModifier::None;
        match self.token {
            Token::Params => {
                modifier = ParamModifier::Params;
                self.bump();
            }
            Token::Ref | Token::Out => {
                if allow_by_reference {
                    modifier = if self.token == Token::Ref {
                        ParamModifier::Ref
                    } else {
                        ParamModifier::Out
                    };
                } else {
                    self.error(ErrorCode::IndexerWithRefParam, vec![]);
                }
                self.bump();
            }
            _ => {}
        }
        let type_start = self.token_start();
        let mut ty = self.parse_type_expression(
            false,
            false,
            followers | sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD,
        );
        if modifier == ParamModifier::Params && !is_single_dimensional_array(&ty) {
            self.error_at(ty.range, ErrorCode::ParamsMustBeArray, vec![]);
            modifier = ParamModifier::None;
        }
        if !self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) && self.at(followers) {
            self.error(ErrorCode::ExpectedIdentifier, vec![]);
        }
        let name = self.parse_name_declaration();
        if self.token == Token::LeftBracket {
            self.error(ErrorCode::BadArraySyntax, vec![]);
            ty = self.parse_array_type(ty, type_start, followers);
        } else if self.token == Token::Assign {
            self.error(ErrorCode::NoDefaultArgs, vec![]);
            self.bump();
            if self.at(sets::UNARY_START) {
                self.parse_expression(followers);
            }
        }
        let range = self.range_from(start);
        self.skip_to(followers);
        Param {
            attributes,
            modifier,
            ty,
            name,
            range,
        }
    }

    /// `<T, [A] U>` on a type or method declaration; empty without a `<`.
    pub(super) fn parse_generic_parameters(&mut self, followers: TokenSet) -> Vec<GenericParam> {
        let mut params = Vec::new();
        if self.token != Token::LessThan {
            return params;
        }
        self.bump();
        while !matches!(
            self.token,
            Token::GreaterThan | Token::Colon | Token::LeftBrace | Token::EndOfFile
        ) {
            let attributes =
                self.parse_attributes(followers | sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD);
            if !self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) {
                self.error(ErrorCode::ExpectedIdentifier, vec![]);
            }
            let name = self.parse_name_declaration();
            params.push(GenericParam {
                attributes,
                name,
                constraints: Vec::new(),
            });
            if self.token != Token::Comma {
                break;
            }
            self.bump();
        }
        self.skip_over_to(Token::GreaterThan, followers);
        params
    }

    /// `where T : class, IFoo, new()` clauses, attached to the parameters
    /// of `owner` they name.
    pub(super) fn parse_constraint_clauses(
        &mut self,
        params: &mut [GenericParam],
        owner: Ident,
        followers: TokenSet,
    ) {
        while self.token == Token::Where {
            self.bump();
            if !self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) {
                self.error(ErrorCode::ExpectedIdentifier, vec![]);
            }
            let name = self.parse_name_declaration();
            let position = params.iter().position(|param| param.name.name == name.name);
            if position.is_none() {
                let param_text = self.names.resolve(name.name).to_owned();
                let owner_text = self.names.resolve(owner.name).to_owned();
                self.error_at(
                    name.range,
                    ErrorCode::TyVarNotFoundInConstraint,
                    vec![param_text, owner_text],
                );
            }
            self.skip(Token::Colon);
            let constraints = self.parse_constraints(followers | Token::Where);
            if let Some(param) = position.and_then(|index| params.get_mut(index)) {
                param.constraints.extend(constraints);
            }
        }
        self.skip_to(followers);
    }

    fn parse_constraints(&mut self, followers: TokenSet) -> Vec<Constraint> {
        let constraint_start =
            sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD | Token::Struct | Token::Class | Token::New;
        let mut constraints = Vec::new();
        if !self.at(constraint_start) {
            self.error(ErrorCode::TypeExpected, vec![]);
            self.skip_to(followers);
            return constraints;
        }
        loop {
            match self.token {
                Token::Class | Token::Struct => {
                    if constraints.is_empty() {
                        constraints.push(if self.token == Token::Class {
                            Constraint::Class
                        } else {
                            Constraint::Struct
                        });
                    } else {
                        self.error(ErrorCode::RefValBoundMustBeFirst, vec![]);
                    }
                    self.bump();
                }
                Token::New => {
                    self.bump();
                    self.skip(Token::LeftParenthesis);
                    self.skip(Token::RightParenthesis);
                    constraints.push(Constraint::New);
                    if self.token == Token::Comma {
                        self.error(ErrorCode::NewBoundMustBeLast, vec![]);
                    }
                }
                token if sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD.contains(token) => {
                    let followers = constraint_start | Token::Comma | followers;
                    let ty = self.parse_type_expression(false, false, followers);
                    constraints.push(Constraint::Type { ty });
                }
                _ => {
                    self.error(ErrorCode::TypeExpected, vec![]);
                    break;
                }
            }
            if self.token != Token::Comma {
                break;
            }
            self.bump();
        }
        self.skip_to(followers);
        constraints
    }
}

fn predefined_or_name(token: Token) -> bool {
    sets::PREDEFINED.contains(token)
        || token == Token::Void
        || sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD.contains(token)
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;
    use pretty_assertions::assert_eq;

    fn members(source: &str) -> (Vec<MemberDecl>, Vec<ErrorCode>, Parser<&str>) {
        let mut p = parser(source);
        let type_name = p.intern("C");
        let mut members = Vec::new();
        p.parse_type_members(type_name, &mut members, TokenSet::of(&[Token::RightBrace]));
        assert_at_follower(&p, TokenSet::of(&[Token::RightBrace]));
        let errors = codes(&p);
        (members, errors, p)
    }

    fn name<S>(p: &Parser<S>, ident: Ident) -> String {
        p.names.resolve(ident.name).to_owned()
    }

    fn summary(member: &MemberDecl) -> &'static str {
        match member.kind {
            MemberKind::Field { .. } => "field",
            MemberKind::Method { .. } => "method",
            MemberKind::Constructor { .. } => "constructor",
            MemberKind::Destructor { .. } => "destructor",
            MemberKind::Operator { .. } => "operator",
            MemberKind::Property { .. } => "property",
            MemberKind::Event { .. } => "event",
            MemberKind::NestedType(_) => "type",
        }
    }

    fn summaries(members: &[MemberDecl]) -> Vec<&'static str> {
        members.iter().map(summary).collect()
    }

    #[test]
    fn test_member_kinds() {
        let (members, errors, _) = members(
            "int x; \
             void M() { } \
             C() : base(1) { } \
             static C() { } \
             ~C() { } \
             public static C operator +(C a, C b) { return a; } \
             int P { get; private set; } \
             int this[int i] { get { return i; } } \
             event System.EventHandler E; \
             const int K = 1, L = 2; \
             class Nested { } }",
        );
        assert_eq!(errors, vec![]);
        assert_eq!(
            summaries(&members),
            vec![
                "field",
                "method",
                "constructor",
                "constructor",
                "destructor",
                "operator",
                "property",
                "property",
                "event",
                "field",
                "field",
                "type"
            ]
        );
    }

    #[test]
    fn test_missing_semicolon_between_fields() {
        let (members, errors, p) = members("int x int y; }");
        assert_eq!(errors, vec![ErrorCode::ExpectedSemicolon]);
        let names: Vec<_> = members
            .iter()
            .map(|member| match member.kind {
                MemberKind::Field { name: field, .. } => name(&p, field),
                _ => String::new(),
            })
            .collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn test_field_declarators_and_array_initializer() {
        let (members, errors, _) = members("static readonly int[] a = { 1, 2 }, b; }");
        assert_eq!(errors, vec![]);
        assert_eq!(members.len(), 2);
        let MemberKind::Field { init: Some(init), .. } = &members[0].kind else {
            panic!("expected an initialized field");
        };
        assert!(matches!(init.kind, ExprKind::ArrayInitializer { .. }));
        let flags = members[0].modifiers.flags;
        assert!(flags.contains(ModifierFlags::STATIC | ModifierFlags::READONLY));
    }

    #[test]
    fn test_constructor_initializer() {
        let (members, errors, _) =
            members("public C(int a) : this(a, 2) { } C() : base { } C() : { } }");
        assert_eq!(
            errors,
            vec![ErrorCode::ExpectedLeftParenthesis, ErrorCode::ThisOrBaseExpected]
        );
        assert_eq!(summaries(&members), vec!["constructor", "constructor", "constructor"]);
        let MemberKind::Constructor {
            initializer: Some(initializer),
            params,
            ..
        } = &members[0].kind
        else {
            panic!("expected a chained constructor");
        };
        assert_eq!(initializer.kind, ConstructorInitializerKind::This);
        assert_eq!(initializer.args.len(), 2);
        assert_eq!(params.len(), 1);
        assert_eq!(members[0].modifiers.visibility, Visibility::Public);
    }

    #[test]
    fn test_operator_names_and_arity() {
        let (members, errors, p) = members(
            "public static C operator -(C a) { } \
             public static implicit operator int(C c) { } \
             public static C operator *(C a) { } }",
        );
        assert_eq!(errors, vec![ErrorCode::OvlUnaryOperatorExpected]);
        let names: Vec<_> = members
            .iter()
            .map(|member| match member.kind {
                MemberKind::Operator { name: op, .. } => name(&p, op),
                _ => String::new(),
            })
            .collect();
        assert_eq!(names, vec!["op_UnaryNegation", "op_Implicit", "op_Multiply"]);

        let (_, errors, _) = self::members("public static operator +(C a, C b) { } }");
        assert_eq!(errors, vec![ErrorCode::BadOperatorSyntax2]);
        let (_, errors, _) = self::members("public static C operator !(C a, C b) { } }");
        assert_eq!(errors, vec![ErrorCode::WrongParsForUnaryOp]);
    }

    #[test]
    fn test_destructor_checks() {
        let (members, errors, p) = members("~D(int x) { } }");
        assert_eq!(
            errors,
            vec![ErrorCode::WrongNameForDestructor, ErrorCode::ExpectedRightParenthesis]
        );
        let MemberKind::Destructor { name: finalize, .. } = members[0].kind else {
            panic!("expected a destructor");
        };
        assert_eq!(name(&p, finalize), "Finalize");
    }

    #[test]
    fn test_property_accessors() {
        let (members, errors, _) =
            members("int P { protected internal get { return 1; } set { } } }");
        assert_eq!(errors, vec![]);
        let MemberKind::Property {
            getter: Some(getter),
            setter: Some(setter),
            ..
        } = &members[0].kind
        else {
            panic!("expected a property with two accessors");
        };
        assert_eq!(getter.visibility, Visibility::ProtectedInternal);
        assert_eq!(setter.visibility, Visibility::Default);
        assert!(getter.body.is_some());

        let (_, errors, _) = self::members("int P { get; get; } }");
        assert_eq!(errors, vec![ErrorCode::DuplicateAccessor]);
        let (_, errors, _) = self::members("int P { static get; } }");
        assert_eq!(errors, vec![ErrorCode::NoModifiersOnAccessor]);
        let (_, errors, _) = self::members("int P { get; 5 } }");
        assert_eq!(errors, vec![ErrorCode::GetOrSetExpected, ErrorCode::ExpectedRightBrace]);
    }

    #[test]
    fn test_explicit_implementations() {
        let (members, errors, p) = members(
            "int IList<int>.Count { get; } \
             void IDisposable.Dispose() { } \
             int IFoo.this[int i] { get; } }",
        );
        assert_eq!(errors, vec![]);
        assert_eq!(summaries(&members), vec!["property", "method", "property"]);
        let MemberKind::Property {
            name: item,
            interface: Some(_),
            params,
            ..
        } = &members[2].kind
        else {
            panic!("expected an explicit indexer");
        };
        assert_eq!(name(&p, *item), "Item");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_generic_method_and_constraints() {
        let (members, errors, _) =
            members("T M<T, U>(T t) where T : class, IComparable<T>, new() where V : struct { } }");
        assert_eq!(errors, vec![ErrorCode::TyVarNotFoundInConstraint]);
        let MemberKind::Method { generic_params, .. } = &members[0].kind else {
            panic!("expected a method");
        };
        assert_eq!(generic_params.len(), 2);
        assert_eq!(generic_params[0].constraints.len(), 3);
        assert_eq!(generic_params[0].constraints[0], Constraint::Class);
        assert_eq!(generic_params[0].constraints[2], Constraint::New);

        let (_, errors, _) = self::members("void M<T>() where T : IFoo, class { } }");
        assert_eq!(errors, vec![ErrorCode::RefValBoundMustBeFirst]);
        let (_, errors, _) = self::members("void M<T>() where T : new(), IFoo { } }");
        assert_eq!(errors, vec![ErrorCode::NewBoundMustBeLast]);
    }

    #[test]
    fn test_parameter_diagnostics() {
        let (members, errors, _) =
            members("void M(ref int a, out int b, params int[] c, int d[], int e = 1) { } }");
        assert_eq!(errors, vec![ErrorCode::BadArraySyntax, ErrorCode::NoDefaultArgs]);
        let MemberKind::Method { params, .. } = &members[0].kind else {
            panic!("expected a method");
        };
        let modifiers: Vec<_> = params.iter().map(|param| param.modifier).collect();
        assert_eq!(
            modifiers,
            vec![
                ParamModifier::Ref,
                ParamModifier::Out,
                ParamModifier::Params,
                ParamModifier::None,
                ParamModifier::None
            ]
        );
        assert!(is_single_dimensional_array(&params[3].ty));

        let (_, errors, _) = self::members("int this[ref int i] { get; } }");
        assert_eq!(errors, vec![ErrorCode::IndexerWithRefParam]);
        let (_, errors, _) = self::members("void M(params int c) { } }");
        assert_eq!(errors, vec![ErrorCode::ParamsMustBeArray]);
    }

    #[test]
    fn test_events() {
        let (members, errors, _) = members(
            "event EventHandler A = null, B; \
             event EventHandler C { add { } remove { } } \
             event EventHandler IFoo.D; }",
        );
        assert_eq!(errors, vec![ErrorCode::ExplicitEventFieldImpl]);
        assert_eq!(summaries(&members), vec!["event", "event", "event", "event"]);
        let MemberKind::Event { adder, remover, .. } = &members[2].kind else {
            panic!("expected an event");
        };
        assert!(adder.is_some() && remover.is_some());

        let (_, errors, _) = self::members("event EventHandler E { add; remove { } } }");
        assert_eq!(errors, vec![ErrorCode::AddRemoveMustHaveBody]);
    }

    #[test]
    fn test_member_needs_type_and_misplaced_modifier() {
        let (members, errors, _) = members("Foo() { } int static x; }");
        assert_eq!(errors, vec![ErrorCode::MemberNeedsType, ErrorCode::BadModifierLocation]);
        assert_eq!(summaries(&members), vec!["method", "field"]);
    }

    #[test]
    fn test_const_requires_value() {
        let (members, errors, _) = members("const int X; static const int Y = 1; }");
        assert_eq!(errors, vec![ErrorCode::ConstValueRequired, ErrorCode::StaticConstant]);
        assert_eq!(members.len(), 2);
        assert!(members[1].modifiers.flags.contains(ModifierFlags::CONST));
    }

    #[test]
    fn test_junk_stops_member_list() {
        let (members, errors, _) = members("int x; ) int y; }");
        assert_eq!(members.len(), 1);
        assert_eq!(errors.len(), 1);
    }
}
