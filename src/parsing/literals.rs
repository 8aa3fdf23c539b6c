//! Numeric, character and string literal values.

use super::Parser;
use crate::ast::{Expr, ExprKind, IntegerType, RealType};
use crate::lexing::LiteralSuffix;
use crate::parser_diagnostics::ErrorCode;
use crate::source::SourceText;
use crate::token::Token;

/// The smallest integer type that holds `value` and agrees with `suffix`.
fn integer_type(value: u64, suffix: LiteralSuffix) -> IntegerType {
    use LiteralSuffix as S;
    if value <= i32::MAX as u64 && suffix == S::None {
        IntegerType::Int
    } else if value <= u32::MAX as u64 && matches!(suffix, S::None | S::Unsigned) {
        IntegerType::Uint
    } else if value <= i64::MAX as u64 && matches!(suffix, S::None | S::Long) {
        IntegerType::Long
    } else {
        IntegerType::Ulong
    }
}

impl<S: SourceText> Parser<S> {
    /// Builds the literal expression for the current token and consumes it.
    pub(super) fn parse_literal(&mut self) -> Expr {
        let range = self.token_range();
        let kind = match self.token {
            Token::Null => ExprKind::Null,
            Token::True => ExprKind::Bool { value: true },
            Token::False => ExprKind::Bool { value: false },
            Token::CharLiteral => ExprKind::Char {
                value: self.scanner.char_value(),
            },
            Token::StringLiteral => ExprKind::String {
                value: self.scanner.string_value().to_owned(),
            },
            Token::HexLiteral => self.hex_literal(),
            Token::IntegerLiteral => self.integer_literal(),
            Token::RealLiteral => self.real_literal(),
            _ => ExprKind::Dummy,
        };
        self.bump();
        Expr::new(kind, range)
    }

    fn hex_literal(&mut self) -> ExprKind {
        let suffix = self.scanner.suffix();
        if matches!(suffix, LiteralSuffix::Float | LiteralSuffix::Double | LiteralSuffix::Decimal) {
            self.error(ErrorCode::ExpectedSemicolon, vec![]);
        }
        let text = self.scanner.number_text();
        let digits = text.get(2..).unwrap_or_default();
        let value = match u64::from_str_radix(digits, 16) {
            Ok(value) => value,
            Err(_) => {
                self.error(ErrorCode::IntOverflow, vec![]);
                0
            }
        };
        ExprKind::Integer {
            value,
            ty: integer_type(value, suffix),
        }
    }

    fn integer_literal(&mut self) -> ExprKind {
        let suffix = self.scanner.suffix();
        let text = self.scanner.number_text().into_owned();
        match suffix {
            LiteralSuffix::Float => ExprKind::Real {
                value: self.real_value(&text, RealType::Float),
                ty: RealType::Float,
            },
            LiteralSuffix::Double => ExprKind::Real {
                value: self.real_value(&text, RealType::Double),
                ty: RealType::Double,
            },
            LiteralSuffix::Decimal => ExprKind::Decimal { text },
            _ => {
                let value = match text.parse::<u64>() {
                    Ok(value) => value,
                    Err(_) => {
                        self.error(ErrorCode::IntOverflow, vec![]);
                        0
                    }
                };
                ExprKind::Integer {
                    value,
                    ty: integer_type(value, suffix),
                }
            }
        }
    }

    fn real_literal(&mut self) -> ExprKind {
        let text = self.scanner.number_text().into_owned();
        match self.scanner.suffix() {
            LiteralSuffix::Float => ExprKind::Real {
                value: self.real_value(&text, RealType::Float),
                ty: RealType::Float,
            },
            LiteralSuffix::Decimal => ExprKind::Decimal { text },
            suffix => {
                if suffix != LiteralSuffix::None && suffix != LiteralSuffix::Double {
                    self.error(ErrorCode::ExpectedSemicolon, vec![]);
                }
                ExprKind::Real {
                    value: self.real_value(&text, RealType::Double),
                    ty: RealType::Double,
                }
            }
        }
    }

    /// Parses `text` at the precision of `ty`. A value that overflows to
    /// infinity, or underflows to zero from non-zero digits, is reported.
    fn real_value(&mut self, text: &str, ty: RealType) -> f64 {
        let (value, type_name) = match ty {
            RealType::Float => (text.parse::<f32>().map(f64::from), "float"),
            RealType::Double => (text.parse::<f64>(), "double"),
        };
        let mantissa = text.split(['e', 'E']).next().unwrap_or_default();
        let has_nonzero_digit = mantissa.bytes().any(|b| matches!(b, b'1'..=b'9'));
        match value {
            Ok(value) if value.is_finite() && !(value == 0.0 && has_nonzero_digit) => value,
            Ok(value) => {
                self.error(ErrorCode::FloatOverflow, vec![type_name.to_owned()]);
                value
            }
            Err(_) => {
                self.error(ErrorCode::FloatOverflow, vec![type_name.to_owned()]);
                f64::NAN
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;

    fn literal(source: &str) -> (ExprKind, Vec<ErrorCode>) {
        let mut p = parser(source);
        let expr = p.parse_literal();
        (expr.kind, codes(&p))
    }

    fn integer(value: u64, ty: IntegerType) -> ExprKind {
        ExprKind::Integer { value, ty }
    }

    #[test]
    fn test_smallest_integer_type() {
        assert_eq!(literal("7").0, integer(7, IntegerType::Int));
        assert_eq!(literal("3000000000").0, integer(3_000_000_000, IntegerType::Uint));
        assert_eq!(literal("7u").0, integer(7, IntegerType::Uint));
        assert_eq!(literal("7L").0, integer(7, IntegerType::Long));
        assert_eq!(literal("7UL").0, integer(7, IntegerType::Ulong));
        assert_eq!(literal("0xFFFFFFFFFF").0, integer(0xFF_FFFF_FFFF, IntegerType::Long));
    }

    #[test]
    fn test_integer_overflow() {
        assert_eq!(
            literal("99999999999999999999"),
            (integer(0, IntegerType::Int), vec![ErrorCode::IntOverflow])
        );
    }

    #[test]
    fn test_real_literals() {
        assert_eq!(
            literal("1.5f").0,
            ExprKind::Real {
                value: 1.5,
                ty: RealType::Float
            }
        );
        assert_eq!(
            literal("2e3").0,
            ExprKind::Real {
                value: 2000.0,
                ty: RealType::Double
            }
        );
        assert_eq!(literal("1.25m").0, ExprKind::Decimal { text: "1.25".to_owned() });
        assert_eq!(literal("1e999").1, vec![ErrorCode::FloatOverflow]);
        assert_eq!(literal("1e-999").1, vec![ErrorCode::FloatOverflow]);
    }

    #[test]
    fn test_text_literals() {
        assert_eq!(literal("'a'").0, ExprKind::Char { value: 'a' as u32 });
        assert_eq!(
            literal("\"a\\tb\"").0,
            ExprKind::String {
                value: "a\tb".to_owned()
            }
        );
    }
}
