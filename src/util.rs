use unicode_general_category::{get_general_category, GeneralCategory};

pub(crate) trait CharExt {
    /// Horizontal whitespace, including Unicode space separators.
    fn is_blank_space(&self) -> bool;

    /// `\r`, `\n`, NEL, LINE SEPARATOR or PARAGRAPH SEPARATOR.
    fn is_end_of_line(&self) -> bool;

    /// A non-ASCII letter.
    fn is_unicode_letter(&self) -> bool;

    fn is_identifier_start(&self) -> bool;

    fn is_identifier_part(&self) -> bool;

    /// Formatting characters are accepted in identifiers but dropped from
    /// their spelling.
    fn is_format(&self) -> bool;

    fn hex_value(&self) -> Option<u32>;
}

impl CharExt for char {
    fn is_blank_space(&self) -> bool {
        match *self {
            ' ' | '\t' | '\x0C' | '\x1A' => true,
            ch if (ch as u32) < 128 => false,
            ch => get_general_category(ch) == GeneralCategory::SpaceSeparator,
        }
    }

    fn is_end_of_line(&self) -> bool {
        matches!(*self, '\r' | '\n' | '\u{85}' | '\u{2028}' | '\u{2029}')
    }

    fn is_unicode_letter(&self) -> bool {
        (*self as u32) >= 128
            && matches!(
                get_general_category(*self),
                GeneralCategory::UppercaseLetter
                    | GeneralCategory::LowercaseLetter
                    | GeneralCategory::TitlecaseLetter
                    | GeneralCategory::ModifierLetter
                    | GeneralCategory::OtherLetter
            )
    }

    fn is_identifier_start(&self) -> bool {
        match *self {
            'a'..='z' | 'A'..='Z' | '_' | '$' => true,
            ch if (ch as u32) < 128 => false,
            ch => matches!(
                get_general_category(ch),
                GeneralCategory::UppercaseLetter
                    | GeneralCategory::LowercaseLetter
                    | GeneralCategory::TitlecaseLetter
                    | GeneralCategory::ModifierLetter
                    | GeneralCategory::OtherLetter
                    | GeneralCategory::LetterNumber
            ),
        }
    }

    fn is_identifier_part(&self) -> bool {
        match *self {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '$' => true,
            ch if (ch as u32) < 128 => false,
            ch => {
                ch.is_identifier_start()
                    || matches!(
                        get_general_category(ch),
                        GeneralCategory::NonspacingMark
                            | GeneralCategory::SpacingMark
                            | GeneralCategory::DecimalNumber
                            | GeneralCategory::ConnectorPunctuation
                            | GeneralCategory::Format
                    )
            }
        }
    }

    fn is_format(&self) -> bool {
        (*self as u32) >= 128 && get_general_category(*self) == GeneralCategory::Format
    }

    fn hex_value(&self) -> Option<u32> {
        self.to_digit(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_chars() {
        assert!('x'.is_identifier_start());
        assert!('\u{3042}'.is_identifier_start());
        assert!(!'1'.is_identifier_start());
        assert!('1'.is_identifier_part());
        assert!('\u{200C}'.is_identifier_part());
        assert!(!'-'.is_identifier_part());
    }

    #[test]
    fn test_blank_and_eol() {
        assert!('\u{3000}'.is_blank_space());
        assert!(!'\n'.is_blank_space());
        assert!('\u{2028}'.is_end_of_line());
    }
}
