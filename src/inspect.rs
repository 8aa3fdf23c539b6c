use std::fmt::{self, Write};
use unicode_general_category::{get_general_category, GeneralCategory};

/// Displays `s` as a regular (non-verbatim) string literal.
pub(crate) fn string_literal(s: &str) -> StringLiteral<'_> {
    StringLiteral(s)
}

/// Displays a UTF-16 code unit or code point as a character literal.
pub(crate) fn char_literal(value: u32) -> CharLiteral {
    CharLiteral(value)
}

pub(crate) struct StringLiteral<'a>(&'a str);

impl<'a> fmt::Display for StringLiteral<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('"')?;
        for ch in self.0.chars() {
            write_escaped(f, ch as u32, '"')?;
        }
        f.write_char('"')
    }
}

pub(crate) struct CharLiteral(u32);

impl fmt::Display for CharLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('\'')?;
        write_escaped(f, self.0, '\'')?;
        f.write_char('\'')
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, value: u32, quote: char) -> fmt::Result {
    let ch = match char::from_u32(value) {
        Some(ch) => ch,
        // Lone surrogate halves only come from `\u` escapes in char literals.
        None => return write!(f, "\\u{:04X}", value),
    };
    let escape = match ch {
        '\0' => Some("\\0"),
        '\x07' => Some("\\a"),
        '\x08' => Some("\\b"),
        '\x0C' => Some("\\f"),
        '\n' => Some("\\n"),
        '\r' => Some("\\r"),
        '\t' => Some("\\t"),
        '\x0B' => Some("\\v"),
        '\\' => Some("\\\\"),
        '"' if quote == '"' => Some("\\\""),
        '\'' if quote == '\'' => Some("\\'"),
        _ => None,
    };
    if let Some(escape) = escape {
        f.write_str(escape)
    } else if is_printable(ch) {
        f.write_char(ch)
    } else if value < 0x10000 {
        write!(f, "\\u{:04X}", value)
    } else {
        write!(f, "\\U{:08X}", value)
    }
}

fn is_printable(ch: char) -> bool {
    match get_general_category(ch) {
        GeneralCategory::UppercaseLetter
        | GeneralCategory::LowercaseLetter
        | GeneralCategory::TitlecaseLetter
        | GeneralCategory::ModifierLetter
        | GeneralCategory::OtherLetter => true,
        GeneralCategory::NonspacingMark
        | GeneralCategory::SpacingMark
        | GeneralCategory::EnclosingMark => true,
        GeneralCategory::DecimalNumber
        | GeneralCategory::LetterNumber
        | GeneralCategory::OtherNumber => true,
        GeneralCategory::ConnectorPunctuation
        | GeneralCategory::DashPunctuation
        | GeneralCategory::OpenPunctuation
        | GeneralCategory::ClosePunctuation
        | GeneralCategory::InitialPunctuation
        | GeneralCategory::FinalPunctuation
        | GeneralCategory::OtherPunctuation => true,
        GeneralCategory::MathSymbol
        | GeneralCategory::CurrencySymbol
        | GeneralCategory::ModifierSymbol
        | GeneralCategory::OtherSymbol => true,
        GeneralCategory::SpaceSeparator => true,
        GeneralCategory::Format | GeneralCategory::PrivateUse => true,
        GeneralCategory::LineSeparator
        | GeneralCategory::ParagraphSeparator
        | GeneralCategory::Control
        | GeneralCategory::Surrogate
        | GeneralCategory::Unassigned => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_string_literal() {
        let testcases: Vec<(&str, &str)> = vec![
            ("", r#""""#),
            ("foo", r#""foo""#),
            ("いろは", r#""いろは""#),
            ("\0\x07\x08\t\n\x0B\x0C\r", r#""\0\a\b\t\n\v\f\r""#),
            ("\x01\x1B\x7F", r#""\u0001\u001B\u007F""#),
            ("say \"hi\" it's \\", r#""say \"hi\" it's \\""#),
            ("\u{2028}\u{FFFF}", r#""\u2028\uFFFF""#),
            ("\u{10000}", "\"\u{10000}\""),
            ("\u{1FFFF}", r#""\U0001FFFF""#),
        ];
        for (input, expected) in testcases {
            assert_eq!(string_literal(input).to_string(), expected);
        }
    }

    #[test]
    fn test_char_literal() {
        assert_eq!(char_literal('a' as u32).to_string(), "'a'");
        assert_eq!(char_literal('\'' as u32).to_string(), r"'\''");
        assert_eq!(char_literal('"' as u32).to_string(), "'\"'");
        assert_eq!(char_literal(0xD800).to_string(), r"'\uD800'");
    }
}
