/// Lexical category of a scanned token.
///
/// The discriminants are dense and start at zero; [`crate::token_set::TokenSet`]
/// relies on this to map each variant onto one bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Token {
    /// No token scanned yet, or the current token was invalidated by a rewind.
    None,
    /// `abstract`
    Abstract,
    /// `acquire` (Spec# only)
    Acquire,
    /// `add`
    Add,
    /// `++`
    AddOne,
    /// `alias`
    Alias,
    /// `__arglist`
    ArgList,
    /// `->`
    Arrow,
    /// `as`
    As,
    /// `assert` (Spec# only)
    Assert,
    /// `=`
    Assign,
    /// `assume` (Spec# only)
    Assume,
    /// `base`
    Base,
    /// `&`
    BitwiseAnd,
    /// `&=`
    BitwiseAndAssign,
    /// `~`
    BitwiseNot,
    /// `|`
    BitwiseOr,
    /// `|=`
    BitwiseOrAssign,
    /// `^`
    BitwiseXor,
    /// `^=`
    BitwiseXorAssign,
    /// `bool`
    Bool,
    /// `break`
    Break,
    /// `byte`
    Byte,
    /// `case`
    Case,
    /// `catch`
    Catch,
    /// `char`
    Char,
    /// `'x'`
    CharLiteral,
    /// `checked`
    Checked,
    /// `class`
    Class,
    /// `?`
    Conditional,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `const`
    Const,
    /// `continue`
    Continue,
    /// `count` (Spec# only)
    Count,
    /// `decimal`
    Decimal,
    /// `default`
    Default,
    /// `delegate`
    Delegate,
    /// `/`
    Divide,
    /// `/=`
    DivideAssign,
    /// `do`
    Do,
    /// `.`
    Dot,
    /// `double`
    Double,
    /// `::`
    DoubleColon,
    /// `elements_seen` (Spec# only)
    ElementsSeen,
    /// `else`
    Else,
    /// `ensures` (Spec# only)
    Ensures,
    /// `enum`
    Enum,
    /// `==`
    Equal,
    /// `event`
    Event,
    /// `exists` (Spec# only)
    Exists,
    /// `explicit`
    Explicit,
    /// `expose` (Spec# only)
    Expose,
    /// `extern`
    Extern,
    /// `false`
    False,
    /// `finally`
    Finally,
    /// `fixed`
    Fixed,
    /// `float`
    Float,
    /// `for`
    For,
    /// `forall` (Spec# only)
    Forall,
    /// `foreach`
    Foreach,
    /// `get`
    Get,
    /// `goto`
    Goto,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `0x1F`
    HexLiteral,
    /// - `foo`
    /// - `@class` (verbatim identifier)
    /// - `\u0066oo` (escaped identifier)
    Identifier,
    /// `if`
    If,
    /// A character that cannot start any token.
    IllegalCharacter,
    /// `==>`
    Implies,
    /// `<==>`
    Iff,
    /// `implicit`
    Implicit,
    /// `in`
    In,
    /// `invariant` (Spec# only)
    Invariant,
    /// `int`
    Int,
    /// `123`
    IntegerLiteral,
    /// `interface`
    Interface,
    /// `internal`
    Internal,
    /// `is`
    Is,
    /// `=>`
    Lambda,
    /// `{`
    LeftBrace,
    /// `[`
    LeftBracket,
    /// `(`
    LeftParenthesis,
    /// `<<`
    LeftShift,
    /// `<<=`
    LeftShiftAssign,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `lock`
    Lock,
    /// `&&`
    LogicalAnd,
    /// `!`
    LogicalNot,
    /// `||`
    LogicalOr,
    /// `long`
    Long,
    /// `__makeref`
    MakeRef,
    /// `~>`
    Maplet,
    /// `modifies` (Spec# only)
    Modifies,
    /// `/* ... */`, only produced when comments are not ignored
    MultiLineComment,
    /// `*`
    Multiply,
    /// `*=`
    MultiplyAssign,
    /// `namespace`
    Namespace,
    /// `new`
    New,
    /// `null`
    Null,
    /// `??`
    NullCoalescing,
    /// `!=`
    NotEqual,
    /// `object`
    Object,
    /// `operator`
    Operator,
    /// `old` (Spec# only)
    Old,
    /// `out`
    Out,
    /// `otherwise`
    Otherwise,
    /// `override`
    Override,
    /// `params`
    Params,
    /// `partial`
    Partial,
    /// `+`
    Plus,
    /// `+=`
    PlusAssign,
    /// `private`
    Private,
    /// `protected`
    Protected,
    /// `public`
    Public,
    /// `..`
    Range,
    /// `read` (Spec# only)
    Read,
    /// `1.5`, `1e3`, `.5`
    RealLiteral,
    /// `readonly`
    Readonly,
    /// `ref`
    Ref,
    /// `__reftype`
    RefType,
    /// `__refvalue`
    RefValue,
    /// `requires` (Spec# only)
    Requires,
    /// `%`
    Remainder,
    /// `%=`
    RemainderAssign,
    /// `remove`
    Remove,
    /// `return`
    Return,
    /// `}`
    RightBrace,
    /// `]`
    RightBracket,
    /// `)`
    RightParenthesis,
    /// `>>`
    RightShift,
    /// `>>=`
    RightShiftAssign,
    /// `sbyte`
    Sbyte,
    /// `set`
    Set,
    /// `sealed`
    Sealed,
    /// `;`
    Semicolon,
    /// `// ...`, only produced when comments are not ignored
    SingleLineComment,
    /// `short`
    Short,
    /// `sizeof`
    Sizeof,
    /// `stackalloc`
    Stackalloc,
    /// `static`
    Static,
    /// `string`
    String,
    /// `"..."`, `@"..."`
    StringLiteral,
    /// `struct`
    Struct,
    /// `-`
    Subtract,
    /// `-=`
    SubtractAssign,
    /// `--`
    SubtractOne,
    /// `switch`
    Switch,
    /// `this`
    This,
    /// `throw`
    Throw,
    /// `throws` (Spec# only)
    Throws,
    /// `true`
    True,
    /// `try`
    Try,
    /// `typeof`
    Typeof,
    /// `uint`
    Uint,
    /// `ulong`
    Ulong,
    /// `unchecked`
    Unchecked,
    /// `unique`
    Unique,
    /// `unsafe`
    Unsafe,
    /// `ushort`
    Ushort,
    /// `using`
    Using,
    /// `value`
    Value,
    /// `var` (Spec# only)
    Var,
    /// `virtual`
    Virtual,
    /// `void`
    Void,
    /// `volatile`
    Volatile,
    /// `where`
    Where,
    /// `while`
    While,
    /// `write`
    Write,
    /// `yield`
    Yield,
    /// End of the source text.
    EndOfFile,
}

impl Token {
    pub fn ordinal(self) -> usize {
        self as u8 as usize
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Token::HexLiteral
                | Token::IntegerLiteral
                | Token::RealLiteral
                | Token::StringLiteral
                | Token::CharLiteral
        )
    }
}
