use std::ops::BitOr;

use bitflags::bitflags;
use derive_more::From;
use serde::{Serialize, Serializer};

use crate::names::Name;

/// Byte span `start..end` in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Range(pub usize, pub usize);

impl Range {
    pub fn empty_at(offset: usize) -> Range {
        Range(offset, offset)
    }

    pub fn start(&self) -> usize {
        self.0
    }

    pub fn end(&self) -> usize {
        self.1
    }
}

impl BitOr for Range {
    type Output = Range;

    fn bitor(self, rhs: Self) -> Self::Output {
        Range(self.0.min(rhs.0), self.1.max(rhs.1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ident {
    pub name: Name,
    pub range: Range,
}

// Declarations

/// A namespace body. The compilation unit is the unnamed root namespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamespaceDecl {
    pub name: Option<Expr>,
    pub externs: Vec<ExternAlias>,
    pub usings: Vec<UsingDirective>,
    /// `[assembly: ...]` and `[module: ...]` sections; only the root has them.
    pub attributes: Vec<AttributeSection>,
    pub members: Vec<NamespaceMember>,
    pub range: Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExternAlias {
    pub name: Ident,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsingDirective {
    #[serde(flatten)]
    pub kind: UsingKind,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum UsingKind {
    /// `using N.M;`
    Namespace { name: Expr },
    /// `using A = N.M;`
    Alias { alias: Ident, target: Expr },
}

#[derive(Debug, Clone, PartialEq, Serialize, From)]
#[serde(tag = "type")]
pub enum NamespaceMember {
    Namespace(NamespaceDecl),
    Type(TypeDecl),
}

impl NamespaceMember {
    pub fn range(&self) -> Range {
        match self {
            NamespaceMember::Namespace(decl) => decl.range,
            NamespaceMember::Type(decl) => decl.range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeSection {
    pub target: Option<AttributeTarget>,
    pub attributes: Vec<Attribute>,
    pub range: Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AttributeTarget {
    Assembly,
    Event,
    Field,
    Method,
    Module,
    Parameter,
    Property,
    Return,
    Type,
}

impl AttributeTarget {
    pub fn from_name(name: &str) -> Option<AttributeTarget> {
        Some(match name {
            "assembly" => AttributeTarget::Assembly,
            "event" => AttributeTarget::Event,
            "field" => AttributeTarget::Field,
            "method" => AttributeTarget::Method,
            "module" => AttributeTarget::Module,
            "param" | "parameter" => AttributeTarget::Parameter,
            "property" => AttributeTarget::Property,
            "return" => AttributeTarget::Return,
            "type" => AttributeTarget::Type,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: Expr,
    /// Positional arguments followed by [`ExprKind::NamedArgument`]s.
    pub args: Vec<Expr>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDecl {
    pub attributes: Vec<AttributeSection>,
    pub modifiers: Modifiers,
    pub name: Ident,
    pub generic_params: Vec<GenericParam>,
    pub kind: TypeDeclKind,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum TypeDeclKind {
    Class(TypeBody),
    Interface(TypeBody),
    Struct(TypeBody),
    Enum {
        underlying: Option<TypeExpr>,
        members: Vec<EnumMember>,
    },
    Delegate {
        return_type: TypeExpr,
        params: Vec<Param>,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TypeBody {
    pub bases: Vec<TypeExpr>,
    pub members: Vec<MemberDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    pub attributes: Vec<AttributeSection>,
    pub name: Ident,
    pub value: Option<Expr>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericParam {
    pub attributes: Vec<AttributeSection>,
    pub name: Ident,
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Constraint {
    Class,
    Struct,
    New,
    Type { ty: TypeExpr },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Visibility {
    #[default]
    Default,
    Public,
    Protected,
    Internal,
    ProtectedInternal,
    Private,
}

bitflags! {
    #[derive(Default)]
    pub struct ModifierFlags: u32 {
        const ABSTRACT = 1 << 0;
        const NEW = 1 << 1;
        const EXTERN = 1 << 2;
        const OVERRIDE = 1 << 3;
        const SEALED = 1 << 4;
        const STATIC = 1 << 5;
        const UNSAFE = 1 << 6;
        const VIRTUAL = 1 << 7;
        const READONLY = 1 << 8;
        const VOLATILE = 1 << 9;
        const PARTIAL = 1 << 10;
        const CONST = 1 << 11;
    }
}

impl ModifierFlags {
    const NAMES: &'static [(ModifierFlags, &'static str)] = &[
        (ModifierFlags::ABSTRACT, "abstract"),
        (ModifierFlags::NEW, "new"),
        (ModifierFlags::EXTERN, "extern"),
        (ModifierFlags::OVERRIDE, "override"),
        (ModifierFlags::SEALED, "sealed"),
        (ModifierFlags::STATIC, "static"),
        (ModifierFlags::UNSAFE, "unsafe"),
        (ModifierFlags::VIRTUAL, "virtual"),
        (ModifierFlags::READONLY, "readonly"),
        (ModifierFlags::VOLATILE, "volatile"),
        (ModifierFlags::PARTIAL, "partial"),
        (ModifierFlags::CONST, "const"),
    ];

    /// Keyword spellings of the set flags, in declaration order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMES
            .iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
    }
}

impl Serialize for ModifierFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub flags: ModifierFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberDecl {
    pub attributes: Vec<AttributeSection>,
    pub modifiers: Modifiers,
    #[serde(flatten)]
    pub kind: MemberKind,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum MemberKind {
    Field {
        ty: TypeExpr,
        name: Ident,
        init: Option<Expr>,
    },
    Method {
        return_type: TypeExpr,
        name: Ident,
        /// Explicitly implemented interface.
        interface: Option<TypeExpr>,
        generic_params: Vec<GenericParam>,
        params: Vec<Param>,
        body: Option<Block>,
    },
    Constructor {
        name: Ident,
        params: Vec<Param>,
        initializer: Option<ConstructorInitializer>,
        body: Option<Block>,
    },
    Destructor {
        name: Ident,
        body: Option<Block>,
    },
    Operator {
        /// `op_Addition`, `op_Implicit`, ...
        name: Ident,
        return_type: TypeExpr,
        params: Vec<Param>,
        body: Option<Block>,
    },
    /// A property, or an indexer when `params` is non-empty.
    Property {
        ty: TypeExpr,
        name: Ident,
        interface: Option<TypeExpr>,
        params: Vec<Param>,
        getter: Option<Accessor>,
        setter: Option<Accessor>,
    },
    Event {
        ty: TypeExpr,
        name: Ident,
        interface: Option<TypeExpr>,
        init: Option<Expr>,
        adder: Option<Accessor>,
        remover: Option<Accessor>,
    },
    NestedType(Box<TypeDecl>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConstructorInitializerKind {
    This,
    Base,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructorInitializer {
    pub kind: ConstructorInitializerKind,
    pub args: Vec<Expr>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Accessor {
    pub attributes: Vec<AttributeSection>,
    pub visibility: Visibility,
    pub body: Option<Block>,
    pub range: Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ParamModifier {
    #[default]
    None,
    Ref,
    Out,
    Params,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub attributes: Vec<AttributeSection>,
    pub modifier: ParamModifier,
    pub ty: TypeExpr,
    pub name: Ident,
    pub range: Range,
}

// Statements

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stmt {
    #[serde(flatten)]
    pub kind: StmtKind,
    pub range: Range,
}

impl Stmt {
    pub fn new(kind: StmtKind, range: Range) -> Stmt {
        Stmt { kind, range }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalDeclaration {
    pub ty: TypeExpr,
    pub constant: bool,
    pub declarators: Vec<Declarator>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declarator {
    pub name: Ident,
    pub init: Option<Expr>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchCase {
    /// `None` for `default:`.
    pub label: Option<Expr>,
    pub body: Vec<Stmt>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatchClause {
    pub ty: Option<TypeExpr>,
    pub name: Option<Ident>,
    pub block: Block,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum StmtKind {
    Block(Block),
    Empty,
    /// Marks the end of a switch section's statement list.
    CaseBottom,
    Expression {
        expr: Expr,
    },
    LocalDeclaration(LocalDeclaration),
    Labeled {
        label: Ident,
        stmt: Box<Stmt>,
    },
    If {
        cond: Expr,
        then: Box<Stmt>,
        else_: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        init: Vec<Stmt>,
        cond: Option<Expr>,
        incr: Vec<Expr>,
        body: Box<Stmt>,
    },
    Foreach {
        ty: TypeExpr,
        name: Ident,
        collection: Expr,
        body: Box<Stmt>,
    },
    Switch {
        expr: Expr,
        cases: Vec<SwitchCase>,
    },
    Try {
        block: Block,
        catches: Vec<CatchClause>,
        finally: Option<Block>,
    },
    Using {
        resource: Box<Stmt>,
        body: Box<Stmt>,
    },
    Lock {
        expr: Expr,
        body: Box<Stmt>,
    },
    Fixed {
        decl: LocalDeclaration,
        body: Box<Stmt>,
    },
    Checked(Block),
    Unchecked(Block),
    Unsafe(Block),
    Goto {
        label: Ident,
    },
    GotoCase {
        value: Expr,
    },
    GotoDefault,
    Break,
    Continue,
    Return {
        value: Option<Expr>,
    },
    Throw {
        value: Option<Expr>,
    },
    YieldReturn {
        value: Expr,
    },
    YieldBreak,
}

// Types

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PredefinedType {
    Bool,
    Byte,
    Char,
    Decimal,
    Double,
    Float,
    Int,
    Long,
    Object,
    Sbyte,
    Short,
    String,
    Uint,
    Ulong,
    Ushort,
    Void,
}

impl PredefinedType {
    pub fn keyword(self) -> &'static str {
        match self {
            PredefinedType::Bool => "bool",
            PredefinedType::Byte => "byte",
            PredefinedType::Char => "char",
            PredefinedType::Decimal => "decimal",
            PredefinedType::Double => "double",
            PredefinedType::Float => "float",
            PredefinedType::Int => "int",
            PredefinedType::Long => "long",
            PredefinedType::Object => "object",
            PredefinedType::Sbyte => "sbyte",
            PredefinedType::Short => "short",
            PredefinedType::String => "string",
            PredefinedType::Uint => "uint",
            PredefinedType::Ulong => "ulong",
            PredefinedType::Ushort => "ushort",
            PredefinedType::Void => "void",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeExpr {
    #[serde(flatten)]
    pub kind: TypeExprKind,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum TypeExprKind {
    Predefined { ty: PredefinedType },
    /// A simple, qualified or generic name.
    Named { name: Box<Expr> },
    Array { element: Box<TypeExpr>, rank: u32 },
    Pointer { target: Box<TypeExpr> },
    Nullable { target: Box<TypeExpr> },
    NonNull { target: Box<TypeExpr> },
    /// Omitted argument in an unbound generic such as `typeof(List<>)`.
    Empty,
}

// Expressions

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    LeftShift,
    RightShift,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
    BitwiseAnd,
    BitwiseXor,
    BitwiseOr,
    LogicalAnd,
    LogicalOr,
    NullCoalescing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Plus,
    Negate,
    Not,
    BitwiseNot,
    PreIncrement,
    PreDecrement,
    AddressOf,
    Dereference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssignOp {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    LeftShift,
    RightShift,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IntegerType {
    Int,
    Uint,
    Long,
    Ulong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RealType {
    Float,
    Double,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LambdaParam {
    pub modifier: ParamModifier,
    pub ty: Option<TypeExpr>,
    pub name: Ident,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, From)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    #[serde(flatten)]
    pub kind: ExprKind,
    pub range: Range,
}

impl Expr {
    pub fn new(kind: ExprKind, range: Range) -> Expr {
        Expr { kind, range }
    }

    /// Placeholder standing in for a missing or malformed expression.
    pub fn dummy(range: Range) -> Expr {
        Expr::new(ExprKind::Dummy, range)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ExprKind {
    Null,
    Bool {
        value: bool,
    },
    Integer {
        value: u64,
        ty: IntegerType,
    },
    Real {
        value: f64,
        ty: RealType,
    },
    /// Decimal literals are kept as written.
    Decimal {
        text: String,
    },
    Char {
        value: u32,
    },
    String {
        value: String,
    },
    Name {
        ident: Ident,
    },
    Qualified {
        qualifier: Box<Expr>,
        name: Ident,
    },
    /// `p->name`
    PointerQualified {
        qualifier: Box<Expr>,
        name: Ident,
    },
    /// `alias::name`
    AliasQualified {
        alias: Box<Expr>,
        name: Ident,
    },
    /// The `global` in `global::N`.
    RootNamespace,
    GenericInstance {
        target: Box<Expr>,
        args: Vec<TypeExpr>,
    },
    Predefined {
        ty: PredefinedType,
    },
    This,
    Base,
    ArgList,
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Postfix {
        op: PostfixOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Is {
        expr: Box<Expr>,
        ty: TypeExpr,
    },
    As {
        expr: Box<Expr>,
        ty: TypeExpr,
    },
    Assign {
        op: AssignOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        else_: Box<Expr>,
    },
    Cast {
        ty: TypeExpr,
        expr: Box<Expr>,
    },
    Parenthesized {
        expr: Box<Expr>,
    },
    Call {
        target: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        target: Box<Expr>,
        indices: Vec<Expr>,
    },
    RefArg {
        expr: Box<Expr>,
    },
    OutArg {
        expr: Box<Expr>,
    },
    /// `name = value` in an attribute argument list or object initializer.
    NamedArgument {
        name: Ident,
        value: Box<Expr>,
    },
    CreateObject {
        ty: TypeExpr,
        args: Vec<Expr>,
    },
    /// `new T(...) { a, b }`; `object` is `None` for a nested initializer.
    PopulateCollection {
        object: Option<Box<Expr>>,
        elements: Vec<Expr>,
    },
    /// `new T(...) { A = a }`; `object` is `None` for a nested initializer.
    InitializeObject {
        object: Option<Box<Expr>>,
        members: Vec<Expr>,
    },
    CreateArray {
        element_type: TypeExpr,
        rank: u32,
        sizes: Vec<Expr>,
        initializer: Vec<Expr>,
    },
    /// Bare `{ ... }` in a field or local initializer.
    ArrayInitializer {
        elements: Vec<Expr>,
    },
    /// `new[] { ... }`
    CreateImplicitArray {
        elements: Vec<Expr>,
    },
    /// `new { A = a, b }`
    CreateAnonymousObject {
        members: Vec<Expr>,
    },
    StackAlloc {
        element_type: TypeExpr,
        size: Box<Expr>,
    },
    TypeOf {
        ty: TypeExpr,
    },
    SizeOf {
        ty: TypeExpr,
    },
    Default {
        ty: TypeExpr,
    },
    Checked {
        expr: Box<Expr>,
    },
    Unchecked {
        expr: Box<Expr>,
    },
    MakeRef {
        expr: Box<Expr>,
    },
    RefType {
        expr: Box<Expr>,
    },
    RefValue {
        expr: Box<Expr>,
        ty: TypeExpr,
    },
    Lambda {
        params: Vec<LambdaParam>,
        body: LambdaBody,
    },
    /// `delegate (...) { ... }`; `params` is `None` when the list is omitted.
    AnonymousMethod {
        params: Option<Vec<Param>>,
        body: Block,
    },
    Dummy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_union() {
        assert_eq!(Range(3, 5) | Range(1, 4), Range(1, 5));
        assert_eq!(Range(2, 2) | Range(7, 9), Range(2, 9));
    }

    #[test]
    fn test_modifier_names() {
        let flags = ModifierFlags::STATIC | ModifierFlags::ABSTRACT;
        assert_eq!(flags.names().collect::<Vec<_>>(), vec!["abstract", "static"]);
    }
}
