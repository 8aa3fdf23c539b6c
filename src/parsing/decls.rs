//! Namespace bodies, directives, attributes and type declarations.

use super::{sets, Parser, Speculation};
use crate::ast::{
    Attribute, AttributeSection, AttributeTarget, EnumMember, Expr, ExprKind, ExternAlias,
    GenericParam, Ident, Modifiers, NamespaceDecl, NamespaceMember, Range, TypeBody, TypeDecl,
    TypeDeclKind, TypeExpr, UsingDirective, UsingKind,
};
use crate::parser_diagnostics::ErrorCode;
use crate::source::SourceText;
use crate::token::Token;
use crate::token_set::TokenSet;

/// Names that can be applied as attributes.
fn is_attribute_name(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Name { .. } | ExprKind::Qualified { .. } | ExprKind::AliasQualified { .. }
    )
}

impl<S: SourceText> Parser<S> {
    /// Directives, global attributes (root only) and members, up to a
    /// follower. The returned range runs from `start` to the last consumed
    /// token.
    pub(super) fn parse_namespace_body(
        &mut self,
        name: Option<Expr>,
        is_root: bool,
        start: Range,
        followers: TokenSet,
    ) -> NamespaceDecl {
        let mut externs = Vec::new();
        let mut usings = Vec::new();
        let declaration_start =
            followers | sets::ATTRIBUTE_OR_NAMESPACE_OR_TYPE_DECLARATION_START | Token::EndOfFile;
        loop {
            self.parse_extern_alias_directives(&mut externs, declaration_start | Token::Using);
            self.parse_using_directives(&mut usings, declaration_start | Token::Extern);
            if self.token != Token::Extern {
                break;
            }
            self.error(ErrorCode::ExternAfterElements, vec![]);
        }
        let attributes = if is_root {
            let section_followers = followers | sets::NAMESPACE_OR_TYPE_DECLARATION_START;
            self.parse_attribute_sections(true, section_followers)
        } else {
            Vec::new()
        };
        let mut members = Vec::new();
        if self.token != Token::EndOfFile {
            self.parse_namespace_member_declarations(&mut members, followers);
        }
        NamespaceDecl {
            name,
            externs,
            usings,
            attributes,
            members,
            range: start | Range::empty_at(self.prev_end),
        }
    }

    fn parse_extern_alias_directives(
        &mut self,
        externs: &mut Vec<ExternAlias>,
        followers: TokenSet,
    ) {
        while self.token == Token::Extern {
            self.parse_extern_alias_directive(externs, followers | Token::Extern);
        }
        self.skip_to(followers);
    }

    /// `extern alias name;`
    fn parse_extern_alias_directive(
        &mut self,
        externs: &mut Vec<ExternAlias>,
        followers: TokenSet,
    ) {
        let start = self.token_start();
        self.bump();
        if self.token == Token::Alias {
            self.bump();
        } else if self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) {
            self.error(ErrorCode::SyntaxError, vec!["alias".to_owned()]);
        } else {
            self.skip_to_with(followers, Some(ErrorCode::SyntaxError), vec!["alias".to_owned()]);
            return;
        }
        if !self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) {
            self.skip_to_with(followers, Some(ErrorCode::ExpectedIdentifier), vec![]);
            return;
        }
        let name = self.parse_name_declaration();
        externs.push(ExternAlias {
            name,
            range: self.range_from(start),
        });
        self.skip_semicolon(followers);
    }

    fn parse_using_directives(&mut self, usings: &mut Vec<UsingDirective>, followers: TokenSet) {
        while self.token == Token::Using {
            self.parse_using_directive(usings, followers | Token::Using);
        }
        self.skip_to(followers);
    }

    /// `using N.M;` or `using A = N.M;`
    fn parse_using_directive(&mut self, usings: &mut Vec<UsingDirective>, followers: TokenSet) {
        let start = self.token_start();
        self.bump();
        if !self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) {
            self.skip_to_with(followers, Some(ErrorCode::ExpectedIdentifier), vec![]);
            return;
        }
        let name_followers = followers | Token::Semicolon;
        let kind = if self.peek() == Token::Assign {
            let alias = self.parse_name_declaration();
            self.bump();
            let target = self.parse_namespace_or_type_name(false, name_followers);
            UsingKind::Alias { alias, target }
        } else {
            let name = self.parse_namespace_or_type_name(false, name_followers);
            UsingKind::Namespace { name }
        };
        usings.push(UsingDirective {
            kind,
            range: self.range_from(start),
        });
        self.skip_semicolon(followers);
    }

    /// Namespace and type declarations while the current token can start
    /// one, then a skip to `followers`.
    pub(super) fn parse_namespace_member_declarations(
        &mut self,
        members: &mut Vec<NamespaceMember>,
        followers: TokenSet,
    ) {
        let declaration_followers =
            followers | sets::ATTRIBUTE_OR_NAMESPACE_OR_TYPE_DECLARATION_START;
        while self.at(declaration_followers)
            && !matches!(self.token, Token::EndOfFile | Token::RightBrace)
        {
            let before = self.token_range();
            self.parse_namespace_or_type_declaration(members, declaration_followers);
            if self.token_range() == before {
                self.bump();
            }
        }
        self.skip_to(followers);
    }

    fn parse_namespace_or_type_declaration(
        &mut self,
        members: &mut Vec<NamespaceMember>,
        followers: TokenSet,
    ) {
        if matches!(self.token, Token::Private | Token::Protected) {
            self.error(ErrorCode::PrivateOrProtectedNamespaceElement, vec![]);
            self.bump();
        }
        if self.token == Token::Namespace {
            let namespace = self.parse_nested_namespace(followers);
            members.push(namespace.into());
            return;
        }
        let start = self.token_start();
        let attributes =
            self.parse_attributes(followers | sets::ATTRIBUTE_OR_TYPE_DECLARATION_START);
        let modifiers = self.parse_modifiers();
        match self.token {
            Token::Class | Token::Interface | Token::Struct | Token::Delegate | Token::Enum => {
                let modifiers = self.type_modifiers(&modifiers);
                let decl = self.parse_type_declaration(start, attributes, modifiers, followers);
                members.push(decl.into());
            }
            _ => {
                if !modifiers.is_empty() || !self.at(followers) {
                    self.skip_to_with(followers, Some(ErrorCode::BadTokenInType), vec![]);
                }
            }
        }
    }

    /// `namespace A.B { ... }`
    fn parse_nested_namespace(&mut self, followers: TokenSet) -> NamespaceDecl {
        let start = self.token_start();
        self.bump();
        let name_start = self.token_start();
        let mut name =
            Expr::name(self.parse_simple_name(followers | Token::Dot | Token::LeftBrace));
        while self.token == Token::Dot {
            self.bump();
            let part = self.parse_simple_name(followers | Token::Dot | Token::LeftBrace);
            name = Expr::new(
                ExprKind::Qualified {
                    qualifier: Box::new(name),
                    name: part,
                },
                self.range_from(name_start),
            );
        }
        self.skip(Token::LeftBrace);
        let mut namespace = self.parse_namespace_body(
            Some(name),
            false,
            Range::empty_at(start),
            followers | Token::RightBrace,
        );
        self.skip_over_to(Token::RightBrace, followers);
        namespace.range = self.range_from(start);
        namespace
    }

    /// Attribute sections, then a skip to `followers`. Yields nothing when
    /// the current token is not `[`.
    pub(super) fn parse_attributes(&mut self, followers: TokenSet) -> Vec<AttributeSection> {
        let sections = self.parse_attribute_sections(false, followers);
        self.skip_to(followers);
        sections
    }

    /// With `global`, stops in front of the first section that does not
    /// target the assembly or the module.
    fn parse_attribute_sections(
        &mut self,
        global: bool,
        followers: TokenSet,
    ) -> Vec<AttributeSection> {
        let mut sections = Vec::new();
        while self.token == Token::LeftBracket {
            let start = self.token_start();
            let target = if global {
                let attempt = self.speculate(
                    |p| {
                        p.bump();
                        p.parse_attribute_target()
                    },
                    |_, target| {
                        matches!(target, Some(AttributeTarget::Assembly | AttributeTarget::Module))
                    },
                );
                match attempt {
                    Speculation::Committed(target) => target,
                    Speculation::RolledBack => break,
                }
            } else {
                self.bump();
                self.parse_attribute_target()
            };
            let attributes = self.parse_attribute_list(followers);
            self.skip(Token::RightBracket);
            sections.push(AttributeSection {
                target,
                attributes,
                range: self.range_from(start),
            });
        }
        sections
    }

    /// `target:` after the `[` of a section. An unknown target is reported
    /// and yields `None`, as does a section without one.
    fn parse_attribute_target(&mut self) -> Option<AttributeTarget> {
        let candidate = matches!(self.token, Token::Event | Token::Return)
            || self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD);
        if !candidate || self.peek() != Token::Colon {
            return None;
        }
        let text = self.token_text();
        let target = AttributeTarget::from_name(&text);
        if target.is_none() {
            self.error(ErrorCode::InvalidAttributeLocation, vec![text]);
        }
        self.bump();
        self.bump();
        target
    }

    fn parse_attribute_list(&mut self, followers: TokenSet) -> Vec<Attribute> {
        let mut attributes = Vec::new();
        loop {
            let expr = self.parse_expression(followers | Token::Comma | Token::RightBracket);
            let range = expr.range;
            match expr.kind {
                ExprKind::Call { target, args } if is_attribute_name(&target) => {
                    let args = self.attribute_arguments(args);
                    attributes.push(Attribute {
                        name: *target,
                        args,
                        range,
                    });
                }
                _ if is_attribute_name(&expr) => attributes.push(Attribute {
                    name: expr,
                    args: Vec::new(),
                    range,
                }),
                _ => self.error_at(range, ErrorCode::ExpectedIdentifier, vec![]),
            }
            if self.token != Token::Comma {
                break;
            }
            self.bump();
        }
        attributes
    }

    /// Turns `name = value` arguments into named arguments. Positional
    /// arguments may not follow them.
    fn attribute_arguments(&mut self, args: Vec<Expr>) -> Vec<Expr> {
        let mut result = Vec::with_capacity(args.len());
        let mut seen_named = false;
        for arg in args {
            let range = arg.range;
            match arg.kind {
                ExprKind::Assign { lhs, rhs, .. } => {
                    seen_named = true;
                    let name = match lhs.kind {
                        ExprKind::Name { ident } => ident,
                        _ => {
                            self.error_at(lhs.range, ErrorCode::ExpectedIdentifier, vec![]);
                            Ident {
                                name: self.intern(""),
                                range: Range::empty_at(lhs.range.start()),
                            }
                        }
                    };
                    result.push(Expr::new(ExprKind::NamedArgument { name, value: rhs }, range));
                }
                kind => {
                    if seen_named {
                        self.error_at(range, ErrorCode::NamedArgumentExpected, vec![]);
                    }
                    result.push(Expr::new(kind, range));
                }
            }
        }
        result
    }

    fn parse_type_name(&mut self) -> Ident {
        if !self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD) {
            self.error(ErrorCode::ExpectedIdentifier, vec![]);
        }
        self.parse_name_declaration()
    }

    /// A class, interface, struct, enum or delegate declaration starting at
    /// its keyword. `start` is where its attributes began.
    pub(super) fn parse_type_declaration(
        &mut self,
        start: usize,
        attributes: Vec<AttributeSection>,
        modifiers: Modifiers,
        followers: TokenSet,
    ) -> TypeDecl {
        let keyword = self.token;
        self.bump();
        let (name, generic_params, kind) = match keyword {
            Token::Delegate => self.parse_rest_of_delegate(followers),
            Token::Enum => {
                let name = self.parse_type_name();
                let underlying = if self.token == Token::Colon {
                    self.bump();
                    Some(self.parse_type_expression(false, false, followers | Token::LeftBrace))
                } else {
                    None
                };
                let members = self.parse_enum_body(followers);
                (name, Vec::new(), TypeDeclKind::Enum { underlying, members })
            }
            _ => {
                let name = self.parse_type_name();
                let (generic_params, body) = self.parse_rest_of_type(name, followers);
                let kind = match keyword {
                    Token::Interface => TypeDeclKind::Interface(body),
                    Token::Struct => TypeDeclKind::Struct(body),
                    _ => TypeDeclKind::Class(body),
                };
                (name, generic_params, kind)
            }
        };
        TypeDecl {
            attributes,
            modifiers,
            name,
            generic_params,
            kind,
            range: self.range_from(start),
        }
    }

    fn parse_rest_of_delegate(
        &mut self,
        followers: TokenSet,
    ) -> (Ident, Vec<GenericParam>, TypeDeclKind) {
        let return_type = self.parse_type_expression(
            false,
            false,
            followers
                | Token::LeftParenthesis
                | Token::Semicolon
                | sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD,
        );
        let name = self.parse_type_name();
        let mut generic_params = self.parse_generic_parameters(
            followers | Token::LeftParenthesis | Token::Where | Token::Semicolon,
        );
        let params = self
            .parse_parameters(Token::RightParenthesis, followers | Token::Where | Token::Semicolon);
        self.parse_constraint_clauses(&mut generic_params, name, followers | Token::Semicolon);
        if self.token == Token::Semicolon {
            self.bump();
        }
        self.skip_to(followers);
        (name, generic_params, TypeDeclKind::Delegate { return_type, params })
    }

    /// Generic parameters, bases, constraints and the member body of a
    /// class, interface or struct.
    fn parse_rest_of_type(
        &mut self,
        name: Ident,
        followers: TokenSet,
    ) -> (Vec<GenericParam>, TypeBody) {
        let mut generic_params = self
            .parse_generic_parameters(followers | Token::Colon | Token::LeftBrace | Token::Where);
        let bases = self.parse_base_types(followers | Token::LeftBrace | Token::Where);
        self.parse_constraint_clauses(&mut generic_params, name, followers | Token::LeftBrace);
        self.skip(Token::LeftBrace);
        let mut members = Vec::new();
        let saved = (self.inside_type, self.inside_block);
        self.inside_type = true;
        self.inside_block = false;
        self.parse_type_members(name.name, &mut members, followers | Token::RightBrace);
        (self.inside_type, self.inside_block) = saved;
        self.skip(Token::RightBrace);
        if self.token == Token::Semicolon {
            self.bump();
        }
        self.skip_to(followers);
        (generic_params, TypeBody { bases, members })
    }

    /// `: Base, IFoo<T>`
    fn parse_base_types(&mut self, followers: TokenSet) -> Vec<TypeExpr> {
        let mut bases = Vec::new();
        if self.token == Token::Colon {
            self.bump();
            while self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD | sets::PREDEFINED) {
                bases.push(self.parse_type_expression(false, false, followers | Token::Comma));
                if self.token != Token::Comma {
                    break;
                }
                self.bump();
            }
        }
        self.skip_to(followers);
        bases
    }

    fn parse_enum_body(&mut self, followers: TokenSet) -> Vec<EnumMember> {
        let mut members = Vec::new();
        self.skip(Token::LeftBrace);
        while self.token == Token::LeftBracket
            || self.at(sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD)
        {
            members.push(self.parse_enum_member(followers | Token::Comma | Token::RightBrace));
            if self.token == Token::RightBrace {
                break;
            }
            self.skip(Token::Comma);
            if self.token == Token::RightBrace {
                break;
            }
        }
        self.skip(Token::RightBrace);
        if self.token == Token::Semicolon {
            self.bump();
        }
        self.skip_to(followers);
        members
    }

    /// `[attrs] Name = value`
    fn parse_enum_member(&mut self, followers: TokenSet) -> EnumMember {
        let start = self.token_start();
        let attributes = self.parse_attributes(
            followers
                | sets::ATTRIBUTE_OR_TYPE_DECLARATION_START
                | sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD,
        );
        let name = self.parse_type_name();
        let value = if self.token == Token::Assign {
            self.bump();
            Some(self.parse_expression(followers))
        } else {
            None
        };
        let range = self.range_from(start);
        self.skip_to(followers);
        EnumMember {
            attributes,
            name,
            value,
            range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_unit(source: &str) -> (NamespaceDecl, Vec<ErrorCode>, Parser<&str>) {
        let mut p = parser(source);
        let unit = p.parse_namespace_body(None, true, Range::empty_at(0), sets::END_OF_FILE);
        assert_eq!(p.token, Token::EndOfFile);
        let errors = codes(&p);
        (unit, errors, p)
    }

    fn types(members: &[NamespaceMember]) -> Vec<&TypeDecl> {
        members
            .iter()
            .filter_map(|member| match member {
                NamespaceMember::Type(decl) => Some(decl),
                NamespaceMember::Namespace(_) => None,
            })
            .collect()
    }

    fn kind(decl: &TypeDecl) -> &'static str {
        match decl.kind {
            TypeDeclKind::Class(_) => "class",
            TypeDeclKind::Interface(_) => "interface",
            TypeDeclKind::Struct(_) => "struct",
            TypeDeclKind::Enum { .. } => "enum",
            TypeDeclKind::Delegate { .. } => "delegate",
        }
    }

    #[test]
    fn test_compilation_unit() {
        let (unit, errors, p) = parse_unit(
            r#"extern alias A;
            using System;
            using IO = System.IO;
            [assembly: AssemblyVersion("1.0")]
            namespace N.M {
                using X;
                class C<T> : Base, IFoo where T : new() { int x; }
                enum E : byte { A = 1, B, }
                delegate void D(int x);
                struct S { }
                interface I { void M(); }
            }"#,
        );
        assert_eq!(errors, vec![]);
        assert_eq!(unit.externs.len(), 1);
        assert_eq!(p.names.resolve(unit.externs[0].name.name), "A");
        assert_eq!(unit.usings.len(), 2);
        assert!(matches!(unit.usings[0].kind, UsingKind::Namespace { .. }));
        match &unit.usings[1].kind {
            UsingKind::Alias { alias, target } => {
                assert_eq!(p.names.resolve(alias.name), "IO");
                assert!(matches!(target.kind, ExprKind::Qualified { .. }));
            }
            other => panic!("unexpected using {:?}", other),
        }
        assert_eq!(unit.attributes.len(), 1);
        assert_eq!(unit.attributes[0].target, Some(AttributeTarget::Assembly));

        let namespace = match &unit.members[..] {
            [NamespaceMember::Namespace(namespace)] => namespace,
            other => panic!("unexpected members {:?}", other),
        };
        assert!(matches!(
            namespace.name.as_ref().map(|name| &name.kind),
            Some(ExprKind::Qualified { .. })
        ));
        assert_eq!(namespace.usings.len(), 1);
        let decls = types(&namespace.members);
        assert_eq!(
            decls.iter().map(|decl| kind(decl)).collect::<Vec<_>>(),
            vec!["class", "enum", "delegate", "struct", "interface"]
        );

        let class = decls[0];
        assert_eq!(class.generic_params.len(), 1);
        assert_eq!(class.generic_params[0].constraints.len(), 1);
        match &class.kind {
            TypeDeclKind::Class(body) => {
                assert_eq!(body.bases.len(), 2);
                assert_eq!(body.members.len(), 1);
            }
            other => panic!("unexpected kind {:?}", other),
        }
        match &decls[1].kind {
            TypeDeclKind::Enum { underlying, members } => {
                assert!(underlying.is_some());
                assert_eq!(members.len(), 2);
                assert!(members[0].value.is_some());
                assert!(members[1].value.is_none());
            }
            other => panic!("unexpected kind {:?}", other),
        }
        match &decls[2].kind {
            TypeDeclKind::Delegate { params, .. } => assert_eq!(params.len(), 1),
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(namespace.range, unit.members[0].range());
    }

    #[test]
    fn test_directive_order() {
        let (unit, errors, _) = parse_unit("using A; extern alias B; class C { }");
        assert_eq!(errors, vec![ErrorCode::ExternAfterElements]);
        assert_eq!(unit.externs.len(), 1);
        assert_eq!(unit.usings.len(), 1);
        assert_eq!(unit.members.len(), 1);

        let (unit, errors, _) = parse_unit("class C { } using X;");
        assert_eq!(errors, vec![ErrorCode::UsingAfterElements]);
        assert_eq!(unit.members.len(), 1);
    }

    #[test]
    fn test_extern_alias_without_alias_keyword() {
        let (unit, errors, _) = parse_unit("extern A; extern ;");
        assert_eq!(errors, vec![ErrorCode::SyntaxError, ErrorCode::SyntaxError]);
        assert_eq!(unit.externs.len(), 1);
    }

    #[test]
    fn test_namespace_level_modifiers() {
        let (unit, errors, _) = parse_unit("private class C { } protected struct S { }");
        assert_eq!(
            errors,
            vec![
                ErrorCode::PrivateOrProtectedNamespaceElement,
                ErrorCode::PrivateOrProtectedNamespaceElement
            ]
        );
        assert_eq!(unit.members.len(), 2);

        let (unit, errors, _) = parse_unit("public int x; class C { }");
        assert_eq!(errors, vec![ErrorCode::BadTokenInType]);
        assert_eq!(unit.members.len(), 1);
    }

    #[test]
    fn test_attributes() {
        let (unit, errors, p) =
            parse_unit(r#"[Obsolete("old", Error = true), Serializable] [foo: Bar] class C { }"#);
        assert_eq!(errors, vec![ErrorCode::InvalidAttributeLocation]);
        assert!(unit.attributes.is_empty());
        let class = types(&unit.members)[0];
        assert_eq!(class.attributes.len(), 2);
        let section = &class.attributes[0];
        assert_eq!(section.target, None);
        assert_eq!(section.attributes.len(), 2);
        let obsolete = &section.attributes[0];
        assert_eq!(obsolete.args.len(), 2);
        assert!(matches!(obsolete.args[0].kind, ExprKind::String { .. }));
        match &obsolete.args[1].kind {
            ExprKind::NamedArgument { name, value } => {
                assert_eq!(p.names.resolve(name.name), "Error");
                assert_eq!(value.kind, ExprKind::Bool { value: true });
            }
            other => panic!("unexpected argument {:?}", other),
        }
        assert!(section.attributes[1].args.is_empty());
        assert_eq!(class.attributes[1].target, None);
        assert_eq!(class.attributes[1].attributes.len(), 1);
    }

    #[test]
    fn test_named_attribute_argument_order() {
        let (_, errors, _) = parse_unit("[A(X = 1, 2)] class C { }");
        assert_eq!(errors, vec![ErrorCode::NamedArgumentExpected]);
        let (_, errors, _) = parse_unit("[A(1 + 2), 3] class C { }");
        assert_eq!(errors, vec![ErrorCode::ExpectedIdentifier]);
    }

    #[test]
    fn test_global_attributes_stop_at_type_attributes() {
        let (unit, errors, _) = parse_unit("[assembly: A] [module: B] [C] class D { }");
        assert_eq!(errors, vec![]);
        assert_eq!(
            unit.attributes.iter().map(|section| section.target).collect::<Vec<_>>(),
            vec![Some(AttributeTarget::Assembly), Some(AttributeTarget::Module)]
        );
        let class = types(&unit.members)[0];
        assert_eq!(class.attributes.len(), 1);
    }

    #[test]
    fn test_enum_recovery() {
        let (unit, errors, _) = parse_unit("enum E { [Flag] A, B C } class D { }");
        assert_eq!(errors, vec![ErrorCode::InvalidMemberDecl]);
        let decls = types(&unit.members);
        assert_eq!(decls.len(), 2);
        match &decls[0].kind {
            TypeDeclKind::Enum { members, .. } => {
                assert_eq!(members.len(), 2);
                assert_eq!(members[0].attributes.len(), 1);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_declarations_reach_end_of_file() {
        let (_, errors, _) = parse_unit("namespace A { class C {");
        assert_eq!(errors, vec![ErrorCode::ExpectedRightBrace, ErrorCode::ExpectedRightBrace]);
        let fragments = [
            "namespace",
            "namespace { }",
            "class",
            "enum E {",
            "delegate",
            "[",
            "[assembly:",
        ];
        for source in fragments {
            let mut p = parser(source);
            p.parse_namespace_body(None, true, Range::empty_at(0), sets::END_OF_FILE);
            assert_eq!(p.token, Token::EndOfFile, "{}", source);
        }
    }
}
