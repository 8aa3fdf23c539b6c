use serde::Serialize;
use thiserror::Error;

use crate::ast::Range;

/// A syntax or lexical diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{}", render_message(.code, .params))]
pub struct ParseError {
    pub range: Range,
    pub code: ErrorCode,
    pub params: Vec<String>,
}

impl ParseError {
    pub fn new(range: Range, code: ErrorCode, params: Vec<String>) -> Self {
        ParseError {
            range,
            code,
            params,
        }
    }

    pub fn range(&self) -> Range {
        self.range
    }

    /// The numeric diagnostic code.
    pub fn number(&self) -> u32 {
        self.code.number()
    }

    /// The symbolic diagnostic code, e.g. `ExpectedSemicolon`.
    pub fn name(&self) -> &'static str {
        self.code.name()
    }

    pub fn is_error(&self) -> bool {
        self.code.is_error()
    }
}

fn render_message(code: &ErrorCode, params: &[String]) -> String {
    let mut message = code.template().to_owned();
    for (i, param) in params.iter().enumerate() {
        message = message.replace(&format!("{{{}}}", i), param);
    }
    message
}

macro_rules! error_codes {
    ($($name:ident = $number:literal => $template:literal,)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum ErrorCode {
            $($name,)*
        }

        impl ErrorCode {
            pub fn number(self) -> u32 {
                match self {
                    $(ErrorCode::$name => $number,)*
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(ErrorCode::$name => stringify!($name),)*
                }
            }

            /// Message text; `{0}`, `{1}`, ... stand for the parameters.
            pub fn template(self) -> &'static str {
                match self {
                    $(ErrorCode::$name => $template,)*
                }
            }
        }
    };
}

error_codes! {
    LowercaseEllSuffix = 78 =>
        "The 'l' suffix is easily confused with the digit '1' -- use 'L' for clarity",
    InvalidModifier = 106 => "The modifier '{0}' is not valid for this item",
    ConflictingProtectionModifier = 107 => "More than one protection modifier",
    ConstValueRequired = 145 => "A const field requires a value to be provided",
    ConstantExpected = 150 => "A constant value is expected",
    InvalidArray = 178 => "Invalid rank specifier: expected ',' or ']'",
    IllegalStatement = 201 =>
        "Only assignment, call, increment, decrement, and new object expressions can be used as a statement",
    ParamsMustBeArray = 225 => "The params parameter must be a single dimensional array",
    BadForeachDecl = 230 => "Type and identifier are both required in a foreach statement",
    NoDefaultArgs = 241 => "Default parameter specifiers are not permitted",
    PartialMisplaced = 267 =>
        "The partial modifier can only appear immediately before 'class', 'struct', or 'interface'",
    NewBoundMustBeLast = 401 => "The new() constraint must be the last constraint specified",
    AbstractSealedStatic = 418 => "An abstract class cannot be sealed or static",
    ExternAfterElements = 439 =>
        "An extern alias declaration must precede all other elements defined in the namespace",
    SealedStaticClass = 441 => "A class cannot be both static and sealed",
    RefValBoundMustBeFirst = 449 =>
        "The 'class' or 'struct' constraint must come before any other constraints",
    StaticConstant = 504 => "The constant '{0}' cannot be marked static",
    WrongNameForDestructor = 574 => "Name of destructor must match name of class",
    FloatOverflow = 594 => "Floating-point constant is outside the range of type '{0}'",
    ArrayInitInBadPlace = 623 =>
        "Array initializers can only be used in a variable or field initializer. Try using a new expression instead.",
    IndexerWithRefParam = 631 => "ref and out are not valid in this context",
    PossibleMistakenNullStatement = 642 => "Possible mistaken empty statement",
    InvalidAttributeLocation = 658 =>
        "'{0}' is not a recognized attribute location. All attributes in this block will be ignored.",
    TyVarNotFoundInConstraint = 699 => "'{1}' does not define type parameter '{0}'",
    ExplicitEventFieldImpl = 71 =>
        "An explicit interface implementation of an event must use property syntax",
    AddRemoveMustHaveBody = 73 => "An add or remove accessor must have a body",
    ExpectedIdentifier = 1001 => "Identifier expected",
    ExpectedSemicolon = 1002 => "; expected",
    SyntaxError = 1003 => "Syntax error, '{0}' expected",
    DuplicateModifier = 1004 => "Duplicate '{0}' modifier",
    DuplicateAccessor = 1007 => "Property accessor already defined",
    IllegalEscape = 1009 => "Unrecognized escape sequence",
    NewlineInConst = 1010 => "Newline in constant",
    EmptyCharConst = 1011 => "Empty character literal",
    TooManyCharsInConst = 1012 => "Too many characters in character literal",
    GetOrSetExpected = 1014 => "A get or set accessor expected",
    NamedArgumentExpected = 1016 => "Named attribute argument expected",
    TooManyCatches = 1017 => "Try statement already has an empty catch block",
    ThisOrBaseExpected = 1018 => "Keyword this or base expected",
    OvlUnaryOperatorExpected = 1019 => "Overloadable unary operator expected",
    OvlBinaryOperatorExpected = 1020 => "Overloadable binary operator expected",
    IntOverflow = 1021 => "Integral constant is too large",
    UnexpectedToken = 1022 => "Unexpected '{0}'",
    ExpectedRightParenthesis = 1026 => ") expected",
    TypeExpected = 1031 => "Type expected",
    NoCommentEnd = 1035 => "End-of-file found, '*/' expected",
    ExpectedDoubleQuote = 1039 => "Unterminated string literal",
    ExpectedSingleQuote = 1040 => "Unterminated character literal",
    ExpectedLeftParenthesis = 1041 => "( expected",
    ExpectedRightBracket = 1042 => "] expected",
    UnescapedSingleQuote = 1043 => "Unescaped single quote in character literal",
    AddOrRemoveExpected = 1055 => "An add or remove accessor expected",
    ExpectedRightBrace = 1513 => "} expected",
    ExpectedLeftBrace = 1514 => "{ expected",
    InExpected = 1515 => "in expected",
    BadTokenInType = 1518 => "Expected class, delegate, enum, interface, or struct",
    InvalidMemberDecl = 1519 =>
        "Invalid token '{0}' in class, struct, or interface member declaration",
    MemberNeedsType = 1520 => "Method must have a return type",
    EmptySwitch = 1522 => "Empty switch block",
    StmtNotInCase = 1523 => "A statement must be preceded by a case or default label",
    ExpectedEndTry = 1524 => "Expected catch or finally",
    InvalidExprTerm = 1525 => "Invalid expression term '{0}'",
    BadNewExpr = 1526 => "A new expression requires () or [] after type",
    PrivateOrProtectedNamespaceElement = 1527 =>
        "Elements defined in a namespace cannot be explicitly declared as private, protected, or protected internal",
    UsingAfterElements = 1529 =>
        "A using clause must precede all other elements defined in the namespace except extern alias declarations",
    WrongParsForBinOp = 1534 => "Overloaded binary operator '{0}' takes two parameters",
    WrongParsForUnaryOp = 1535 => "Overloaded unary operator '{0}' takes one parameter",
    BadArraySyntax = 1552 => "Array type specifier, [], must appear before parameter name",
    BadOperatorSyntax = 1553 =>
        "Declaration is not valid; use '{0} operator <dest-type> (...' instead",
    BadOperatorSyntax2 = 1554 => "Declaration is not valid; use '<type> operator {0} (...' instead",
    BadStackAllocExpr = 1575 => "A stackalloc expression requires [] after type",
    BadModifierLocation = 1585 => "Member modifier '{0}' must precede the member type and name",
    MissingArraySize = 1586 => "Array creation must have array size or array initializer",
    NoModifiersOnAccessor = 1609 => "Modifiers cannot be placed on event accessor declarations",
    ExpectedExpression = 1733 => "Expected expression",
    NestingTooDeep = 8078 => "An expression is too long or complex to compile",
}

impl ErrorCode {
    pub fn is_error(self) -> bool {
        use ErrorCode::*;
        !matches!(
            self,
            LowercaseEllSuffix
                | PossibleMistakenNullStatement
                | InvalidAttributeLocation
                | EmptySwitch
        )
    }
}

/// Append-only list of diagnostics.
///
/// Speculative parses swap in a scratch sink, then either discard it or
/// merge it back into the saved one.
#[derive(Debug, Clone, Default)]
pub struct ErrorSink {
    errors: Vec<ParseError>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ParseError) {
        tracing::trace!(code = error.name(), range = ?error.range, "diagnostic");
        self.errors.push(error);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Installs `other` as the active sink and returns the previous one.
    pub fn swap(&mut self, other: ErrorSink) -> ErrorSink {
        std::mem::replace(self, other)
    }

    pub fn extend(&mut self, other: ErrorSink) {
        self.errors.extend(other.errors);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<ParseError> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_parameters() {
        let error = ParseError::new(
            Range(0, 1),
            ErrorCode::InvalidExprTerm,
            vec![String::from(")")],
        );
        assert_eq!(error.to_string(), "Invalid expression term ')'");
        assert_eq!(error.number(), 1525);
        assert_eq!(error.name(), "InvalidExprTerm");
        assert!(error.is_error());
    }

    #[test]
    fn test_swap_and_merge() {
        let mut sink = ErrorSink::new();
        sink.add(ParseError::new(Range(0, 1), ErrorCode::ExpectedSemicolon, vec![]));
        let saved = sink.swap(ErrorSink::new());
        sink.add(ParseError::new(Range(2, 3), ErrorCode::TypeExpected, vec![]));
        assert_eq!(sink.len(), 1);
        let scratch = std::mem::replace(&mut sink, saved);
        sink.extend(scratch);
        assert_eq!(sink.len(), 2);
        assert!(!ErrorCode::EmptySwitch.is_error());
    }
}
