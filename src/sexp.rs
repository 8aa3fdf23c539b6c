//! A compact S-expression rendering of syntax trees, for tests and the
//! `cslite-parse` tool.

use std::fmt::Display;

use crate::ast::{
    Accessor, AssignOp, AttributeSection, BinaryOp, Block, CatchClause, Constraint, Declarator,
    EnumMember, Expr, ExprKind, GenericParam, Ident, IntegerType, LambdaBody, LambdaParam,
    LocalDeclaration, MemberDecl, MemberKind, Modifiers, NamespaceDecl, NamespaceMember, Param,
    ParamModifier, PostfixOp, RealType, Stmt, StmtKind, SwitchCase, TypeDecl, TypeDeclKind,
    TypeExpr, TypeExprKind, UnaryOp, UsingKind, Visibility,
};
use crate::inspect::{char_literal, string_literal};
use crate::names::NameTable;

#[derive(Debug, Clone, PartialEq)]
pub enum SExp {
    Tagged { tag: String, args: Vec<SExp> },
    Nil,
    Symbol { name: String },
    /// A literal, already in source form.
    Atom { text: String },
    Invalid,
}

impl Display for SExp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", SExpIndent { sexp: self, nest: 0 })
    }
}

#[derive(Debug)]
pub struct SExpIndent<'a> {
    sexp: &'a SExp,
    nest: u32,
}

impl<'a> Display for SExpIndent<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.sexp {
            SExp::Tagged { tag, args } => {
                write!(f, "({}", tag)?;
                for arg in args {
                    if matches!(arg, SExp::Tagged { .. }) {
                        write!(f, "\n{}", Indent(self.nest + 1))?;
                    } else {
                        f.write_str(" ")?;
                    }
                    write!(
                        f,
                        "{}",
                        SExpIndent {
                            sexp: arg,
                            nest: self.nest + 1,
                        }
                    )?;
                }
                f.write_str(")")?;
            }
            SExp::Nil => f.write_str("nil")?,
            SExp::Symbol { name } => f.write_str(name)?,
            SExp::Atom { text } => f.write_str(text)?,
            SExp::Invalid => f.write_str("<invalid>")?,
        }
        Ok(())
    }
}

struct Indent(u32);

impl Display for Indent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for _ in 0..self.0 {
            f.write_str("  ")?;
        }
        Ok(())
    }
}

fn tagged(tag: &str, args: Vec<SExp>) -> SExp {
    SExp::Tagged {
        tag: tag.to_owned(),
        args,
    }
}

fn symbol(name: &str) -> SExp {
    SExp::Symbol { name: name.to_owned() }
}

fn atom(text: String) -> SExp {
    SExp::Atom { text }
}

/// Syntax tree nodes that render as S-expressions. Names are looked up in
/// the table the parser interned them into.
pub trait ToSExp {
    fn to_sexp(&self, names: &NameTable) -> SExp;
}

impl ToSExp for NamespaceDecl {
    fn to_sexp(&self, names: &NameTable) -> SExp {
        Builder { names }.namespace(self)
    }
}

impl ToSExp for NamespaceMember {
    fn to_sexp(&self, names: &NameTable) -> SExp {
        Builder { names }.namespace_member(self)
    }
}

impl ToSExp for MemberDecl {
    fn to_sexp(&self, names: &NameTable) -> SExp {
        Builder { names }.member(self)
    }
}

impl ToSExp for Stmt {
    fn to_sexp(&self, names: &NameTable) -> SExp {
        Builder { names }.stmt(self)
    }
}

impl ToSExp for Expr {
    fn to_sexp(&self, names: &NameTable) -> SExp {
        Builder { names }.expr(self)
    }
}

impl ToSExp for TypeExpr {
    fn to_sexp(&self, names: &NameTable) -> SExp {
        Builder { names }.ty(self)
    }
}

struct Builder<'a> {
    names: &'a NameTable,
}

impl<'a> Builder<'a> {
    fn ident(&self, ident: Ident) -> SExp {
        symbol(self.names.resolve(ident.name))
    }

    fn opt<T>(&self, value: Option<&T>, f: impl FnOnce(&T) -> SExp) -> SExp {
        value.map_or(SExp::Nil, f)
    }

    fn list<T>(&self, tag: &str, items: &[T], f: impl Fn(&T) -> SExp) -> SExp {
        tagged(tag, items.iter().map(f).collect())
    }

    // Declarations

    fn namespace(&self, decl: &NamespaceDecl) -> SExp {
        let mut args = Vec::new();
        let tag = match &decl.name {
            Some(name) => {
                args.push(self.expr(name));
                "namespace"
            }
            None => "compilation-unit",
        };
        for alias in &decl.externs {
            args.push(tagged("extern-alias", vec![self.ident(alias.name)]));
        }
        for using in &decl.usings {
            args.push(match &using.kind {
                UsingKind::Namespace { name } => tagged("using", vec![self.expr(name)]),
                UsingKind::Alias { alias, target } => {
                    tagged("using-alias", vec![self.ident(*alias), self.expr(target)])
                }
            });
        }
        if !decl.attributes.is_empty() {
            args.push(self.attributes(&decl.attributes));
        }
        args.extend(decl.members.iter().map(|member| self.namespace_member(member)));
        tagged(tag, args)
    }

    fn namespace_member(&self, member: &NamespaceMember) -> SExp {
        match member {
            NamespaceMember::Namespace(decl) => self.namespace(decl),
            NamespaceMember::Type(decl) => self.type_decl(decl),
        }
    }

    fn attributes(&self, sections: &[AttributeSection]) -> SExp {
        self.list("attributes", sections, |section| {
            let mut args = vec![self.opt(section.target.as_ref(), |target| {
                symbol(&format!("{:?}", target).to_lowercase())
            })];
            for attribute in &section.attributes {
                let mut attr_args = vec![self.expr(&attribute.name)];
                attr_args.extend(attribute.args.iter().map(|arg| self.expr(arg)));
                args.push(tagged("attribute", attr_args));
            }
            tagged("section", args)
        })
    }

    /// Attributes and modifiers, when present, lead a declaration's arguments.
    fn decoration(&self, attributes: &[AttributeSection], modifiers: Modifiers) -> Vec<SExp> {
        let mut args = Vec::new();
        if !attributes.is_empty() {
            args.push(self.attributes(attributes));
        }
        let mut words = Vec::new();
        if let Some(visibility) = visibility_keyword(modifiers.visibility) {
            words.push(symbol(visibility));
        }
        words.extend(modifiers.flags.names().map(symbol));
        if !words.is_empty() {
            args.push(tagged("modifiers", words));
        }
        args
    }

    fn type_decl(&self, decl: &TypeDecl) -> SExp {
        let mut args = self.decoration(&decl.attributes, decl.modifiers);
        args.push(self.ident(decl.name));
        if !decl.generic_params.is_empty() {
            args.push(self.generic_params(&decl.generic_params));
        }
        let tag = match &decl.kind {
            TypeDeclKind::Class(body)
            | TypeDeclKind::Interface(body)
            | TypeDeclKind::Struct(body) => {
                if !body.bases.is_empty() {
                    args.push(self.list("bases", &body.bases, |base| self.ty(base)));
                }
                args.extend(body.members.iter().map(|member| self.member(member)));
                match decl.kind {
                    TypeDeclKind::Interface(_) => "interface",
                    TypeDeclKind::Struct(_) => "struct",
                    _ => "class",
                }
            }
            TypeDeclKind::Enum { underlying, members } => {
                if let Some(underlying) = underlying {
                    args.push(tagged("underlying", vec![self.ty(underlying)]));
                }
                args.extend(members.iter().map(|member| self.enum_member(member)));
                "enum"
            }
            TypeDeclKind::Delegate { return_type, params } => {
                args.push(self.ty(return_type));
                args.push(self.params(params));
                "delegate"
            }
        };
        tagged(tag, args)
    }

    fn enum_member(&self, member: &EnumMember) -> SExp {
        let mut args = self.decoration(&member.attributes, Modifiers::default());
        args.push(self.ident(member.name));
        if let Some(value) = &member.value {
            args.push(self.expr(value));
        }
        tagged("enum-member", args)
    }

    fn generic_params(&self, params: &[GenericParam]) -> SExp {
        self.list("generic", params, |param| {
            if param.constraints.is_empty() && param.attributes.is_empty() {
                return self.ident(param.name);
            }
            let mut args = self.decoration(&param.attributes, Modifiers::default());
            args.push(self.ident(param.name));
            args.extend(param.constraints.iter().map(|constraint| match constraint {
                Constraint::Class => symbol("class"),
                Constraint::Struct => symbol("struct"),
                Constraint::New => symbol("new()"),
                Constraint::Type { ty } => self.ty(ty),
            }));
            tagged("type-param", args)
        })
    }

    fn params(&self, params: &[Param]) -> SExp {
        self.list("params", params, |param| {
            let mut args = self.decoration(&param.attributes, Modifiers::default());
            if let Some(modifier) = param_modifier_keyword(param.modifier) {
                args.push(symbol(modifier));
            }
            args.push(self.ty(&param.ty));
            args.push(self.ident(param.name));
            tagged("param", args)
        })
    }

    fn member(&self, member: &MemberDecl) -> SExp {
        let mut args = self.decoration(&member.attributes, member.modifiers);
        let tag = match &member.kind {
            MemberKind::Field { ty, name, init } => {
                args.push(self.ty(ty));
                args.push(self.ident(*name));
                if let Some(init) = init {
                    args.push(self.expr(init));
                }
                "field"
            }
            MemberKind::Method {
                return_type,
                name,
                interface,
                generic_params,
                params,
                body,
            } => {
                args.push(self.ty(return_type));
                args.push(self.interface_name(interface.as_ref(), *name));
                if !generic_params.is_empty() {
                    args.push(self.generic_params(generic_params));
                }
                args.push(self.params(params));
                args.push(self.opt(body.as_ref(), |body| self.block(body)));
                "method"
            }
            MemberKind::Constructor {
                name,
                params,
                initializer,
                body,
            } => {
                args.push(self.ident(*name));
                args.push(self.params(params));
                if let Some(initializer) = initializer {
                    let tag = match initializer.kind {
                        crate::ast::ConstructorInitializerKind::This => "this",
                        crate::ast::ConstructorInitializerKind::Base => "base",
                    };
                    args.push(self.list(tag, &initializer.args, |arg| self.expr(arg)));
                }
                args.push(self.opt(body.as_ref(), |body| self.block(body)));
                "constructor"
            }
            MemberKind::Destructor { name, body } => {
                args.push(self.ident(*name));
                args.push(self.opt(body.as_ref(), |body| self.block(body)));
                "destructor"
            }
            MemberKind::Operator {
                name,
                return_type,
                params,
                body,
            } => {
                args.push(self.ident(*name));
                args.push(self.ty(return_type));
                args.push(self.params(params));
                args.push(self.opt(body.as_ref(), |body| self.block(body)));
                "operator"
            }
            MemberKind::Property {
                ty,
                name,
                interface,
                params,
                getter,
                setter,
            } => {
                args.push(self.ty(ty));
                args.push(self.interface_name(interface.as_ref(), *name));
                if !params.is_empty() {
                    args.push(self.params(params));
                }
                args.extend(getter.as_ref().map(|getter| self.accessor("get", getter)));
                args.extend(setter.as_ref().map(|setter| self.accessor("set", setter)));
                "property"
            }
            MemberKind::Event {
                ty,
                name,
                interface,
                init,
                adder,
                remover,
            } => {
                args.push(self.ty(ty));
                args.push(self.interface_name(interface.as_ref(), *name));
                args.extend(init.as_ref().map(|init| self.expr(init)));
                args.extend(adder.as_ref().map(|adder| self.accessor("add", adder)));
                args.extend(remover.as_ref().map(|remover| self.accessor("remove", remover)));
                "event"
            }
            MemberKind::NestedType(decl) => return self.type_decl(decl),
        };
        tagged(tag, args)
    }

    fn interface_name(&self, interface: Option<&TypeExpr>, name: Ident) -> SExp {
        match interface {
            Some(interface) => tagged("explicit", vec![self.ty(interface), self.ident(name)]),
            None => self.ident(name),
        }
    }

    fn accessor(&self, tag: &str, accessor: &Accessor) -> SExp {
        let modifiers = Modifiers {
            visibility: accessor.visibility,
            ..Modifiers::default()
        };
        let mut args = self.decoration(&accessor.attributes, modifiers);
        args.push(self.opt(accessor.body.as_ref(), |body| self.block(body)));
        tagged(tag, args)
    }

    // Statements

    fn block(&self, block: &Block) -> SExp {
        self.list("block", &block.stmts, |stmt| self.stmt(stmt))
    }

    fn boxed_stmt(&self, stmt: &Stmt) -> SExp {
        self.stmt(stmt)
    }

    fn local(&self, decl: &LocalDeclaration) -> SExp {
        let mut args = vec![self.ty(&decl.ty)];
        args.extend(decl.declarators.iter().map(|declarator| self.declarator(declarator)));
        tagged(if decl.constant { "const" } else { "local" }, args)
    }

    fn declarator(&self, declarator: &Declarator) -> SExp {
        match &declarator.init {
            Some(init) => tagged("=", vec![self.ident(declarator.name), self.expr(init)]),
            None => self.ident(declarator.name),
        }
    }

    fn switch_case(&self, case: &SwitchCase) -> SExp {
        let mut args = vec![match &case.label {
            Some(label) => self.expr(label),
            None => symbol("default"),
        }];
        args.extend(case.body.iter().map(|stmt| self.stmt(stmt)));
        tagged("case", args)
    }

    fn catch_clause(&self, clause: &CatchClause) -> SExp {
        tagged(
            "catch",
            vec![
                self.opt(clause.ty.as_ref(), |ty| self.ty(ty)),
                self.opt(clause.name.as_ref(), |name| self.ident(*name)),
                self.block(&clause.block),
            ],
        )
    }

    fn stmt(&self, stmt: &Stmt) -> SExp {
        match &stmt.kind {
            StmtKind::Block(block) => self.block(block),
            StmtKind::Empty => tagged("empty", vec![]),
            StmtKind::CaseBottom => tagged("case-bottom", vec![]),
            StmtKind::Expression { expr } => tagged("expr", vec![self.expr(expr)]),
            StmtKind::LocalDeclaration(decl) => self.local(decl),
            StmtKind::Labeled { label, stmt } => {
                tagged("label", vec![self.ident(*label), self.boxed_stmt(stmt)])
            }
            StmtKind::If { cond, then, else_ } => tagged(
                "if",
                vec![
                    self.expr(cond),
                    self.boxed_stmt(then),
                    self.opt(else_.as_deref(), |stmt| self.stmt(stmt)),
                ],
            ),
            StmtKind::While { cond, body } => {
                tagged("while", vec![self.expr(cond), self.boxed_stmt(body)])
            }
            StmtKind::DoWhile { body, cond } => {
                tagged("do", vec![self.boxed_stmt(body), self.expr(cond)])
            }
            StmtKind::For { init, cond, incr, body } => tagged(
                "for",
                vec![
                    self.list("init", init, |stmt| self.stmt(stmt)),
                    self.opt(cond.as_ref(), |cond| self.expr(cond)),
                    self.list("incr", incr, |expr| self.expr(expr)),
                    self.boxed_stmt(body),
                ],
            ),
            StmtKind::Foreach {
                ty,
                name,
                collection,
                body,
            } => tagged(
                "foreach",
                vec![
                    self.ty(ty),
                    self.ident(*name),
                    self.expr(collection),
                    self.boxed_stmt(body),
                ],
            ),
            StmtKind::Switch { expr, cases } => {
                let mut args = vec![self.expr(expr)];
                args.extend(cases.iter().map(|case| self.switch_case(case)));
                tagged("switch", args)
            }
            StmtKind::Try { block, catches, finally } => {
                let mut args = vec![self.block(block)];
                args.extend(catches.iter().map(|clause| self.catch_clause(clause)));
                if let Some(finally) = finally {
                    args.push(tagged("finally", vec![self.block(finally)]));
                }
                tagged("try", args)
            }
            StmtKind::Using { resource, body } => {
                tagged("using", vec![self.boxed_stmt(resource), self.boxed_stmt(body)])
            }
            StmtKind::Lock { expr, body } => {
                tagged("lock", vec![self.expr(expr), self.boxed_stmt(body)])
            }
            StmtKind::Fixed { decl, body } => {
                tagged("fixed", vec![self.local(decl), self.boxed_stmt(body)])
            }
            StmtKind::Checked(block) => tagged("checked", vec![self.block(block)]),
            StmtKind::Unchecked(block) => tagged("unchecked", vec![self.block(block)]),
            StmtKind::Unsafe(block) => tagged("unsafe", vec![self.block(block)]),
            StmtKind::Goto { label } => tagged("goto", vec![self.ident(*label)]),
            StmtKind::GotoCase { value } => tagged("goto-case", vec![self.expr(value)]),
            StmtKind::GotoDefault => tagged("goto-default", vec![]),
            StmtKind::Break => tagged("break", vec![]),
            StmtKind::Continue => tagged("continue", vec![]),
            StmtKind::Return { value } => {
                tagged("return", value.iter().map(|value| self.expr(value)).collect())
            }
            StmtKind::Throw { value } => {
                tagged("throw", value.iter().map(|value| self.expr(value)).collect())
            }
            StmtKind::YieldReturn { value } => tagged("yield-return", vec![self.expr(value)]),
            StmtKind::YieldBreak => tagged("yield-break", vec![]),
        }
    }

    // Types and expressions

    fn ty(&self, ty: &TypeExpr) -> SExp {
        match &ty.kind {
            TypeExprKind::Predefined { ty } => symbol(ty.keyword()),
            TypeExprKind::Named { name } => self.expr(name),
            TypeExprKind::Array { element, rank } => {
                tagged("array", vec![self.ty(element), atom(rank.to_string())])
            }
            TypeExprKind::Pointer { target } => tagged("pointer", vec![self.ty(target)]),
            TypeExprKind::Nullable { target } => tagged("nullable", vec![self.ty(target)]),
            TypeExprKind::NonNull { target } => tagged("non-null", vec![self.ty(target)]),
            TypeExprKind::Empty => SExp::Nil,
        }
    }

    fn lambda_param(&self, param: &LambdaParam) -> SExp {
        if param.ty.is_none() && param.modifier == ParamModifier::None {
            return self.ident(param.name);
        }
        let mut args = Vec::new();
        if let Some(modifier) = param_modifier_keyword(param.modifier) {
            args.push(symbol(modifier));
        }
        args.push(self.opt(param.ty.as_ref(), |ty| self.ty(ty)));
        args.push(self.ident(param.name));
        tagged("param", args)
    }

    fn with_head(&self, tag: &str, head: Vec<SExp>, rest: &[Expr]) -> SExp {
        let mut args = head;
        args.extend(rest.iter().map(|expr| self.expr(expr)));
        tagged(tag, args)
    }

    fn expr(&self, expr: &Expr) -> SExp {
        match &expr.kind {
            ExprKind::Null => symbol("null"),
            ExprKind::Bool { value } => symbol(if *value { "true" } else { "false" }),
            ExprKind::Integer { value, ty } => atom(format!("{}{}", value, integer_suffix(*ty))),
            ExprKind::Real { value, ty } => atom(match ty {
                RealType::Float => format!("{:?}f", value),
                RealType::Double => format!("{:?}", value),
            }),
            ExprKind::Decimal { text } => atom(text.clone()),
            ExprKind::Char { value } => atom(char_literal(*value).to_string()),
            ExprKind::String { value } => atom(string_literal(value).to_string()),
            ExprKind::Name { ident } => self.ident(*ident),
            ExprKind::Qualified { qualifier, name } => {
                tagged(".", vec![self.expr(qualifier), self.ident(*name)])
            }
            ExprKind::PointerQualified { qualifier, name } => {
                tagged("->", vec![self.expr(qualifier), self.ident(*name)])
            }
            ExprKind::AliasQualified { alias, name } => {
                tagged("::", vec![self.expr(alias), self.ident(*name)])
            }
            ExprKind::RootNamespace => symbol("global"),
            ExprKind::GenericInstance { target, args } => {
                let mut items = vec![self.expr(target)];
                items.extend(args.iter().map(|arg| self.ty(arg)));
                tagged("generic", items)
            }
            ExprKind::Predefined { ty } => symbol(ty.keyword()),
            ExprKind::This => symbol("this"),
            ExprKind::Base => symbol("base"),
            ExprKind::ArgList => symbol("__arglist"),
            ExprKind::Unary { op, operand } => {
                tagged(unary_operator(*op), vec![self.expr(operand)])
            }
            ExprKind::Postfix { op, operand } => tagged(
                match op {
                    PostfixOp::Increment => "post++",
                    PostfixOp::Decrement => "post--",
                },
                vec![self.expr(operand)],
            ),
            ExprKind::Binary { op, lhs, rhs } => {
                tagged(binary_operator(*op), vec![self.expr(lhs), self.expr(rhs)])
            }
            ExprKind::Is { expr, ty } => tagged("is", vec![self.expr(expr), self.ty(ty)]),
            ExprKind::As { expr, ty } => tagged("as", vec![self.expr(expr), self.ty(ty)]),
            ExprKind::Assign { op, lhs, rhs } => {
                tagged(assignment_operator(*op), vec![self.expr(lhs), self.expr(rhs)])
            }
            ExprKind::Conditional { cond, then, else_ } => {
                tagged("?:", vec![self.expr(cond), self.expr(then), self.expr(else_)])
            }
            ExprKind::Cast { ty, expr } => tagged("cast", vec![self.ty(ty), self.expr(expr)]),
            ExprKind::Parenthesized { expr } => tagged("paren", vec![self.expr(expr)]),
            ExprKind::Call { target, args } => {
                self.with_head("call", vec![self.expr(target)], args)
            }
            ExprKind::Index { target, indices } => {
                self.with_head("index", vec![self.expr(target)], indices)
            }
            ExprKind::RefArg { expr } => tagged("ref", vec![self.expr(expr)]),
            ExprKind::OutArg { expr } => tagged("out", vec![self.expr(expr)]),
            ExprKind::NamedArgument { name, value } => {
                tagged("named", vec![self.ident(*name), self.expr(value)])
            }
            ExprKind::CreateObject { ty, args } => self.with_head("new", vec![self.ty(ty)], args),
            ExprKind::PopulateCollection { object, elements } => self.with_head(
                "collection-init",
                vec![self.opt(object.as_deref(), |object| self.expr(object))],
                elements,
            ),
            ExprKind::InitializeObject { object, members } => self.with_head(
                "object-init",
                vec![self.opt(object.as_deref(), |object| self.expr(object))],
                members,
            ),
            ExprKind::CreateArray {
                element_type,
                rank,
                sizes,
                initializer,
            } => tagged(
                "new-array",
                vec![
                    self.ty(element_type),
                    atom(rank.to_string()),
                    self.list("sizes", sizes, |size| self.expr(size)),
                    self.list("elements", initializer, |element| self.expr(element)),
                ],
            ),
            ExprKind::ArrayInitializer { elements } => {
                self.with_head("array-init", vec![], elements)
            }
            ExprKind::CreateImplicitArray { elements } => {
                self.with_head("new-implicit-array", vec![], elements)
            }
            ExprKind::CreateAnonymousObject { members } => {
                self.with_head("new-anonymous", vec![], members)
            }
            ExprKind::StackAlloc { element_type, size } => {
                tagged("stackalloc", vec![self.ty(element_type), self.expr(size)])
            }
            ExprKind::TypeOf { ty } => tagged("typeof", vec![self.ty(ty)]),
            ExprKind::SizeOf { ty } => tagged("sizeof", vec![self.ty(ty)]),
            ExprKind::Default { ty } => tagged("default", vec![self.ty(ty)]),
            ExprKind::Checked { expr } => tagged("checked", vec![self.expr(expr)]),
            ExprKind::Unchecked { expr } => tagged("unchecked", vec![self.expr(expr)]),
            ExprKind::MakeRef { expr } => tagged("__makeref", vec![self.expr(expr)]),
            ExprKind::RefType { expr } => tagged("__reftype", vec![self.expr(expr)]),
            ExprKind::RefValue { expr, ty } => {
                tagged("__refvalue", vec![self.expr(expr), self.ty(ty)])
            }
            ExprKind::Lambda { params, body } => tagged(
                "lambda",
                vec![
                    self.list("params", params, |param| self.lambda_param(param)),
                    match body {
                        LambdaBody::Expr(expr) => self.expr(expr),
                        LambdaBody::Block(block) => self.block(block),
                    },
                ],
            ),
            ExprKind::AnonymousMethod { params, body } => tagged(
                "delegate",
                vec![
                    self.opt(params.as_ref(), |params| self.params(params)),
                    self.block(body),
                ],
            ),
            ExprKind::Dummy => SExp::Invalid,
        }
    }
}

fn visibility_keyword(visibility: Visibility) -> Option<&'static str> {
    match visibility {
        Visibility::Default => None,
        Visibility::Public => Some("public"),
        Visibility::Protected => Some("protected"),
        Visibility::Internal => Some("internal"),
        Visibility::ProtectedInternal => Some("protected-internal"),
        Visibility::Private => Some("private"),
    }
}

fn param_modifier_keyword(modifier: ParamModifier) -> Option<&'static str> {
    match modifier {
        ParamModifier::None => None,
        ParamModifier::Ref => Some("ref"),
        ParamModifier::Out => Some("out"),
        ParamModifier::Params => Some("params"),
    }
}

fn integer_suffix(ty: IntegerType) -> &'static str {
    match ty {
        IntegerType::Int => "",
        IntegerType::Uint => "u",
        IntegerType::Long => "l",
        IntegerType::Ulong => "ul",
    }
}

fn unary_operator(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Plus => "+",
        UnaryOp::Negate => "-",
        UnaryOp::Not => "!",
        UnaryOp::BitwiseNot => "~",
        UnaryOp::PreIncrement => "++",
        UnaryOp::PreDecrement => "--",
        UnaryOp::AddressOf => "&",
        UnaryOp::Dereference => "*",
    }
}

fn binary_operator(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Subtract => "-",
        BinaryOp::Multiply => "*",
        BinaryOp::Divide => "/",
        BinaryOp::Remainder => "%",
        BinaryOp::LeftShift => "<<",
        BinaryOp::RightShift => ">>",
        BinaryOp::LessThan => "<",
        BinaryOp::GreaterThan => ">",
        BinaryOp::LessThanOrEqual => "<=",
        BinaryOp::GreaterThanOrEqual => ">=",
        BinaryOp::Equal => "==",
        BinaryOp::NotEqual => "!=",
        BinaryOp::BitwiseAnd => "&",
        BinaryOp::BitwiseXor => "^",
        BinaryOp::BitwiseOr => "|",
        BinaryOp::LogicalAnd => "&&",
        BinaryOp::LogicalOr => "||",
        BinaryOp::NullCoalescing => "??",
    }
}

fn assignment_operator(op: AssignOp) -> &'static str {
    match op {
        AssignOp::Assign => "=",
        AssignOp::Add => "+=",
        AssignOp::Subtract => "-=",
        AssignOp::Multiply => "*=",
        AssignOp::Divide => "/=",
        AssignOp::Remainder => "%=",
        AssignOp::LeftShift => "<<=",
        AssignOp::RightShift => ">>=",
        AssignOp::BitwiseAnd => "&=",
        AssignOp::BitwiseOr => "|=",
        AssignOp::BitwiseXor => "^=",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::parse;
    use pretty_assertions::assert_eq;

    fn render(source: &str) -> String {
        let output = parse(source.as_bytes());
        assert_eq!(output.errors, vec![]);
        output.tree.to_sexp(&output.names).to_string()
    }

    #[test]
    fn test_flat_arguments_stay_on_one_line() {
        let sexp = tagged("+", vec![atom("1".to_owned()), symbol("x")]);
        assert_eq!(sexp.to_string(), "(+ 1 x)");
    }

    #[test]
    fn test_class_rendering() {
        let actual = render("public class C<T> : B { int x = 1 + 2 * 3; }");
        let expected = "\
(compilation-unit
  (class
    (modifiers public) C
    (generic T)
    (bases B)
    (field int x
      (+ 1
        (* 2 3)))))";
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_statement_rendering() {
        let actual =
            render(r#"class C { void M() { if (a is Foo ?? b) return; else s = "\n"; } }"#);
        let expected = r#"(compilation-unit
  (class C
    (method void M
      (params)
      (block
        (if
          (??
            (is a Foo) b)
          (return)
          (expr
            (= s "\n")))))))"#;
        assert_eq!(actual, expected);
    }
}
