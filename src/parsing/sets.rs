//! Grammar-wide token classes and follower sets.

use crate::token::Token::{self, *};
use crate::token_set::TokenSet;

pub(crate) const END_OF_FILE: TokenSet = TokenSet::single(EndOfFile);

pub(crate) const IDENTIFIER_OR_NON_RESERVED_KEYWORD: TokenSet = TokenSet::of(&[
    Identifier, Acquire, Add, Alias, Assert, Assume, Count, Ensures, Exists, Expose, Forall, Get,
    Modifies, Old, Otherwise, Partial, Read, Remove, Requires, Set, Throws, Unique, Value, Var,
    Write, Yield, Where,
]);

const PREDEFINED_VALUE_TYPES: &[Token] = &[
    Bool, Decimal, Sbyte, Byte, Short, Ushort, Int, Uint, Long, Ulong, Char, Float, Double, Object,
    String,
];

const LITERALS: &[Token] = &[
    HexLiteral,
    IntegerLiteral,
    StringLiteral,
    CharLiteral,
    RealLiteral,
    Null,
    False,
    True,
];

/// Predefined type keywords, `void` included.
pub(crate) const PREDEFINED: TokenSet = TokenSet::of(PREDEFINED_VALUE_TYPES).with(Void);

pub(crate) const ASSIGNMENT_OPERATORS: TokenSet = TokenSet::of(&[
    PlusAssign,
    Assign,
    BitwiseAndAssign,
    BitwiseOrAssign,
    BitwiseXorAssign,
    DivideAssign,
    LeftShiftAssign,
    MultiplyAssign,
    RemainderAssign,
    RightShiftAssign,
    SubtractAssign,
]);

/// Operators that may only appear between two operands.
pub(crate) const BINARY_OPERATORS: TokenSet = TokenSet::of(&[
    Plus,
    As,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    Divide,
    Equal,
    GreaterThan,
    GreaterThanOrEqual,
    Is,
    LeftShift,
    LessThan,
    LessThanOrEqual,
    LogicalAnd,
    LogicalOr,
    Multiply,
    NotEqual,
    NullCoalescing,
    Remainder,
    RightShift,
    Subtract,
]);

pub(crate) const INFIX_OPERATORS: TokenSet = BINARY_OPERATORS
    .union(ASSIGNMENT_OPERATORS)
    .with(Conditional)
    .with(Arrow);

pub(crate) const PROTECTION_MODIFIER: TokenSet =
    TokenSet::of(&[Public, Protected, Internal, Private]);

pub(crate) const ATTRIBUTE_OR_TYPE_DECLARATION_START: TokenSet = TokenSet::of(&[
    LeftBracket,
    New,
    Partial,
    Unsafe,
    Public,
    Internal,
    Abstract,
    Sealed,
    Static,
    Class,
    Delegate,
    Enum,
    Interface,
    Struct,
]);

/// `private` and `protected` are included for recovery only.
pub(crate) const ATTRIBUTE_OR_NAMESPACE_OR_TYPE_DECLARATION_START: TokenSet =
    ATTRIBUTE_OR_TYPE_DECLARATION_START
        .with(Namespace)
        .with(Private)
        .with(Protected);

pub(crate) const NAMESPACE_OR_TYPE_DECLARATION_START: TokenSet = TokenSet::of(&[
    Partial, Unsafe, Public, Internal, Abstract, Sealed, Static, Namespace, Class, Delegate, Enum,
    Interface, Struct,
]);

const MEMBER_MODIFIERS: &[Token] = &[
    New, Public, Protected, Internal, Private, Abstract, Sealed, Static, Readonly, Volatile,
    Virtual, Override, Extern, Unsafe,
];

pub(crate) const MEMBER_MODIFIER: TokenSet = TokenSet::of(MEMBER_MODIFIERS);

pub(crate) const ADD_OR_REMOVE_OR_MODIFIER: TokenSet =
    TokenSet::of(MEMBER_MODIFIERS).with(Add).with(Remove);

pub(crate) const GET_OR_LEFT_BRACKET_OR_SET_OR_MODIFIER: TokenSet = TokenSet::of(MEMBER_MODIFIERS)
    .with(Get)
    .with(LeftBracket)
    .with(Set);

pub(crate) const TYPE_MEMBER_START: TokenSet = TokenSet::of(MEMBER_MODIFIERS)
    .union(IDENTIFIER_OR_NON_RESERVED_KEYWORD)
    .union(PREDEFINED)
    .union(TokenSet::of(&[
        LeftBracket,
        LeftParenthesis,
        LeftBrace,
        Partial,
        Const,
        Event,
        This,
        Operator,
        BitwiseNot,
        Class,
        Delegate,
        Enum,
        Interface,
        Struct,
        Invariant,
    ]));

pub(crate) const CASE_OR_DEFAULT_OR_RIGHT_BRACE: TokenSet =
    TokenSet::of(&[Case, Default, RightBrace]);

pub(crate) const CASE_OR_COLON_OR_DEFAULT_OR_RIGHT_BRACE: TokenSet =
    CASE_OR_DEFAULT_OR_RIGHT_BRACE.with(Colon);

pub(crate) const CATCH_OR_FINALLY: TokenSet = TokenSet::of(&[Catch, Finally]);

pub(crate) const RIGHT_PARENTHESIS_OR_SEMICOLON: TokenSet =
    TokenSet::of(&[RightParenthesis, Semicolon]);

pub(crate) const TYPE_START: TokenSet = IDENTIFIER_OR_NON_RESERVED_KEYWORD
    .union(TokenSet::of(PREDEFINED_VALUE_TYPES))
    .with(LeftBracket)
    .with(LeftParenthesis);

pub(crate) const PARAMETER_TYPE_START: TokenSet =
    TYPE_START.with(Ref).with(Out).with(Params);

/// Tokens that may follow a type inside a type expression.
pub(crate) const TYPE_OPERATOR: TokenSet =
    TokenSet::of(&[LeftBracket, Multiply, Plus, Conditional, LogicalNot, BitwiseAnd]);

pub(crate) const PRIMARY_START: TokenSet = IDENTIFIER_OR_NON_RESERVED_KEYWORD
    .union(TokenSet::of(LITERALS))
    .union(TokenSet::of(PREDEFINED_VALUE_TYPES))
    .union(TokenSet::of(&[
        This,
        Base,
        Value,
        New,
        Typeof,
        Sizeof,
        Stackalloc,
        Checked,
        Unchecked,
        LeftParenthesis,
    ]));

pub(crate) const UNARY_START: TokenSet = IDENTIFIER_OR_NON_RESERVED_KEYWORD
    .union(TokenSet::of(LITERALS))
    .union(TokenSet::of(PREDEFINED_VALUE_TYPES))
    .union(TokenSet::of(&[
        LeftParenthesis,
        LeftBracket,
        This,
        Base,
        Value,
        AddOne,
        SubtractOne,
        New,
        Default,
        Typeof,
        Sizeof,
        Stackalloc,
        Delegate,
        Checked,
        Unchecked,
        Plus,
        BitwiseNot,
        LogicalNot,
        Multiply,
        Subtract,
        BitwiseAnd,
    ]));

/// `catch` and `finally` are included for recovery only.
pub(crate) const STATEMENT_START: TokenSet = UNARY_START.union(TokenSet::of(&[
    LeftBrace, Semicolon, Acquire, Assert, Assume, If, Switch, While, Do, For, Foreach, Break,
    Continue, Goto, Return, Throw, Yield, Try, Catch, Finally, Checked, Unchecked, Read, Write,
    Expose, Fixed, Lock, Unsafe, Using, Const, Delegate, Void,
]));

/// Tokens that start a term but are not predefined types.
pub(crate) const TERM: TokenSet = TokenSet::of(&[
    ArgList,
    MakeRef,
    RefType,
    RefValue,
    Base,
    Checked,
    Default,
    Delegate,
    False,
    New,
    Null,
    Sizeof,
    This,
    True,
    Typeof,
    Unchecked,
    Identifier,
    IntegerLiteral,
    RealLiteral,
    StringLiteral,
    CharLiteral,
    LeftParenthesis,
]);

pub(crate) const UNARY_OPERATOR: TokenSet = TokenSet::of(&[
    Base,
    Default,
    Sizeof,
    This,
    Typeof,
    BitwiseAnd,
    Plus,
    Subtract,
    Multiply,
    BitwiseNot,
    LogicalNot,
    AddOne,
    SubtractOne,
]);

/// After `is T`, a `?` followed by one of these is a conditional, not a
/// nullable type.
pub(crate) const NULLABLE_TYPE_NON_FOLLOWER: TokenSet =
    TERM.union(PREDEFINED).union(UNARY_OPERATOR);

/// A tentative `<...>` followed by one of these is not a type argument list.
pub(crate) const TYPE_ARGUMENT_LIST_NON_FOLLOWER: TokenSet = NULLABLE_TYPE_NON_FOLLOWER;

/// Tokens that, after `(T)`, make the parenthesized type a cast.
pub(crate) const CAST_FOLLOWER: TokenSet = IDENTIFIER_OR_NON_RESERVED_KEYWORD
    .union(TokenSet::of(LITERALS))
    .union(TokenSet::of(PREDEFINED_VALUE_TYPES))
    .union(TokenSet::of(&[
        LeftParenthesis,
        This,
        Base,
        Value,
        AddOne,
        SubtractOne,
        New,
        Default,
        Typeof,
        Sizeof,
        Stackalloc,
        Delegate,
        Checked,
        Unchecked,
        BitwiseNot,
        LogicalNot,
    ]));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infix_operators() {
        assert!(INFIX_OPERATORS.contains(Conditional));
        assert!(INFIX_OPERATORS.contains(PlusAssign));
        assert!(INFIX_OPERATORS.contains(Arrow));
        assert!(!INFIX_OPERATORS.contains(Implies));
        assert!(!INFIX_OPERATORS.contains(Range));
        assert!(!INFIX_OPERATORS.contains(LogicalNot));
    }

    #[test]
    fn test_cast_followers_exclude_binary_operators() {
        assert!(CAST_FOLLOWER.contains(Identifier));
        assert!(CAST_FOLLOWER.contains(LogicalNot));
        assert!(!CAST_FOLLOWER.contains(Plus));
        assert!(!CAST_FOLLOWER.contains(Subtract));
        assert!(!CAST_FOLLOWER.contains(Semicolon));
    }

    #[test]
    fn test_statement_start() {
        for token in [If, Try, Catch, Semicolon, LeftBrace, Identifier, Void, IntegerLiteral] {
            assert!(STATEMENT_START.contains(token), "{:?}", token);
        }
        assert!(!STATEMENT_START.contains(RightBrace));
        assert!(!STATEMENT_START.contains(Else));
    }
}
