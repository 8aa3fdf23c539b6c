//! Modifier prefixes and their per-declaration validation.

use super::{sets, Parser};
use crate::ast::{ModifierFlags, Modifiers, Range, Visibility};
use crate::keywords;
use crate::parser_diagnostics::ErrorCode;
use crate::source::SourceText;
use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct ModifierToken {
    pub(super) token: Token,
    pub(super) range: Range,
}

impl ModifierToken {
    fn text(&self) -> String {
        keywords::spelling(self.token).unwrap_or_default().to_owned()
    }
}

/// What a declaration kind does with one modifier keyword.
#[derive(Debug, Clone, Copy)]
pub(super) enum ModifierRule {
    Allow(ModifierFlags),
    Reject(ErrorCode),
}

use ModifierRule::{Allow, Reject};

/// Access level named by a keyword in [`sets::PROTECTION_MODIFIER`].
fn protection_level(token: Token) -> Visibility {
    match token {
        Token::Private => Visibility::Private,
        Token::Protected => Visibility::Protected,
        Token::Public => Visibility::Public,
        _ => Visibility::Internal,
    }
}

type Rules = &'static [(Token, ModifierRule)];

pub(super) const FIELD_MODIFIERS: Rules = &[
    (Token::Abstract, Reject(ErrorCode::InvalidModifier)),
    (Token::New, Allow(ModifierFlags::NEW)),
    (Token::Extern, Reject(ErrorCode::InvalidModifier)),
    (Token::Override, Reject(ErrorCode::InvalidModifier)),
    (Token::Readonly, Allow(ModifierFlags::READONLY)),
    (Token::Sealed, Reject(ErrorCode::InvalidModifier)),
    (Token::Static, Allow(ModifierFlags::STATIC)),
    (Token::Unsafe, Allow(ModifierFlags::UNSAFE)),
    (Token::Virtual, Reject(ErrorCode::InvalidModifier)),
    (Token::Volatile, Allow(ModifierFlags::VOLATILE)),
];

pub(super) const CONST_MODIFIERS: Rules = &[
    (Token::Abstract, Reject(ErrorCode::InvalidModifier)),
    (Token::Extern, Reject(ErrorCode::InvalidModifier)),
    (Token::New, Allow(ModifierFlags::NEW)),
    (Token::Override, Reject(ErrorCode::InvalidModifier)),
    (Token::Readonly, Reject(ErrorCode::InvalidModifier)),
    (Token::Sealed, Reject(ErrorCode::InvalidModifier)),
    (Token::Static, Reject(ErrorCode::StaticConstant)),
    (Token::Unsafe, Reject(ErrorCode::InvalidModifier)),
    (Token::Virtual, Reject(ErrorCode::InvalidModifier)),
    (Token::Volatile, Reject(ErrorCode::InvalidModifier)),
];

/// Methods, properties and events accept the same set.
pub(super) const METHOD_MODIFIERS: Rules = &[
    (Token::Abstract, Allow(ModifierFlags::ABSTRACT)),
    (Token::New, Allow(ModifierFlags::NEW)),
    (Token::Extern, Allow(ModifierFlags::EXTERN)),
    (Token::Override, Allow(ModifierFlags::OVERRIDE)),
    (Token::Readonly, Reject(ErrorCode::InvalidModifier)),
    (Token::Sealed, Allow(ModifierFlags::SEALED)),
    (Token::Static, Allow(ModifierFlags::STATIC)),
    (Token::Unsafe, Allow(ModifierFlags::UNSAFE)),
    (Token::Virtual, Allow(ModifierFlags::VIRTUAL)),
    (Token::Volatile, Reject(ErrorCode::InvalidModifier)),
];

pub(super) const CONSTRUCTOR_MODIFIERS: Rules = &[
    (Token::Abstract, Reject(ErrorCode::InvalidModifier)),
    (Token::New, Reject(ErrorCode::InvalidModifier)),
    (Token::Extern, Reject(ErrorCode::InvalidModifier)),
    (Token::Override, Reject(ErrorCode::InvalidModifier)),
    (Token::Readonly, Reject(ErrorCode::InvalidModifier)),
    (Token::Sealed, Reject(ErrorCode::InvalidModifier)),
    (Token::Static, Allow(ModifierFlags::STATIC)),
    (Token::Unsafe, Allow(ModifierFlags::UNSAFE)),
    (Token::Virtual, Reject(ErrorCode::InvalidModifier)),
    (Token::Volatile, Reject(ErrorCode::InvalidModifier)),
];

pub(super) const DESTRUCTOR_MODIFIERS: Rules = &[
    (Token::Abstract, Reject(ErrorCode::InvalidModifier)),
    (Token::New, Reject(ErrorCode::InvalidModifier)),
    (Token::Extern, Allow(ModifierFlags::EXTERN)),
    (Token::Override, Reject(ErrorCode::InvalidModifier)),
    (Token::Readonly, Reject(ErrorCode::InvalidModifier)),
    (Token::Sealed, Reject(ErrorCode::InvalidModifier)),
    (Token::Static, Reject(ErrorCode::InvalidModifier)),
    (Token::Unsafe, Reject(ErrorCode::InvalidModifier)),
    (Token::Virtual, Reject(ErrorCode::InvalidModifier)),
    (Token::Volatile, Reject(ErrorCode::InvalidModifier)),
];

pub(super) const OPERATOR_MODIFIERS: Rules = &[
    (Token::Abstract, Reject(ErrorCode::InvalidModifier)),
    (Token::Extern, Allow(ModifierFlags::EXTERN)),
    (Token::New, Reject(ErrorCode::InvalidModifier)),
    (Token::Override, Reject(ErrorCode::InvalidModifier)),
    (Token::Readonly, Reject(ErrorCode::InvalidModifier)),
    (Token::Sealed, Reject(ErrorCode::InvalidModifier)),
    (Token::Static, Allow(ModifierFlags::STATIC)),
    (Token::Unsafe, Allow(ModifierFlags::UNSAFE)),
    (Token::Virtual, Reject(ErrorCode::InvalidModifier)),
    (Token::Volatile, Reject(ErrorCode::InvalidModifier)),
];

impl<S: SourceText> Parser<S> {
    /// Collects a modifier prefix without validating it. A `partial` ends
    /// the prefix.
    pub(super) fn parse_modifiers(&mut self) -> Vec<ModifierToken> {
        let mut result = Vec::new();
        loop {
            let modifier = ModifierToken {
                token: self.token,
                range: self.token_range(),
            };
            match self.token {
                Token::Abstract
                | Token::Extern
                | Token::Internal
                | Token::New
                | Token::Override
                | Token::Protected
                | Token::Private
                | Token::Public
                | Token::Readonly
                | Token::Sealed
                | Token::Static
                | Token::Volatile
                | Token::Virtual
                | Token::Unsafe => result.push(modifier),
                Token::Partial => {
                    let next = self.peek();
                    if matches!(next, Token::Class | Token::Struct | Token::Interface) {
                        result.push(modifier);
                    } else if !super::sets::IDENTIFIER_OR_NON_RESERVED_KEYWORD.contains(next) {
                        self.error(ErrorCode::PartialMisplaced, vec![]);
                    }
                    self.bump();
                    return result;
                }
                _ => return result,
            }
            self.bump();
        }
    }

    /// Whether `token` is among `modifiers`. With `reject`, every occurrence
    /// is reported with that code instead and the answer is `false`.
    pub(super) fn look_for_modifier(
        &mut self,
        modifiers: &[ModifierToken],
        token: Token,
        reject: Option<ErrorCode>,
    ) -> bool {
        let mut found = false;
        for modifier in modifiers.iter().filter(|m| m.token == token) {
            if let Some(code) = reject {
                self.error_at(modifier.range, code, vec![modifier.text()]);
                return false;
            }
            if found {
                self.error_at(modifier.range, ErrorCode::DuplicateModifier, vec![modifier.text()]);
            }
            found = true;
        }
        found
    }

    /// Validates a member's modifiers against `rules`.
    pub(super) fn member_modifiers(
        &mut self,
        modifiers: &[ModifierToken],
        rules: Rules,
    ) -> Modifiers {
        let visibility = self.member_visibility(modifiers);
        let mut flags = ModifierFlags::empty();
        for &(token, rule) in rules {
            match rule {
                Allow(flag) => {
                    if self.look_for_modifier(modifiers, token, None) {
                        flags |= flag;
                    }
                }
                Reject(code) => {
                    self.look_for_modifier(modifiers, token, Some(code));
                }
            }
        }
        Modifiers { visibility, flags }
    }

    /// Folds the access modifiers among `modifiers`. `protected internal`
    /// combines in either order; any other mix conflicts.
    pub(super) fn member_visibility(&mut self, modifiers: &[ModifierToken]) -> Visibility {
        let mut result = Visibility::Default;
        for modifier in modifiers {
            if !sets::PROTECTION_MODIFIER.contains(modifier.token) {
                continue;
            }
            let wanted = protection_level(modifier.token);
            result = self.combine_visibility(result, wanted, modifier);
        }
        result
    }

    fn combine_visibility(
        &mut self,
        current: Visibility,
        wanted: Visibility,
        modifier: &ModifierToken,
    ) -> Visibility {
        match (current, wanted) {
            (Visibility::Default, _) => wanted,
            (Visibility::Internal, Visibility::Protected)
            | (Visibility::Protected, Visibility::Internal) => Visibility::ProtectedInternal,
            (Visibility::ProtectedInternal, Visibility::Protected | Visibility::Internal) => {
                self.error_at(modifier.range, ErrorCode::DuplicateModifier, vec![modifier.text()]);
                current
            }
            _ if current == wanted => {
                self.error_at(modifier.range, ErrorCode::DuplicateModifier, vec![modifier.text()]);
                wanted
            }
            _ => {
                self.error_at(modifier.range, ErrorCode::ConflictingProtectionModifier, vec![]);
                wanted
            }
        }
    }

    /// Validates the modifiers of a type declaration.
    pub(super) fn type_modifiers(&mut self, modifiers: &[ModifierToken]) -> Modifiers {
        let mut visibility = Visibility::Default;
        let mut flags = ModifierFlags::empty();
        for modifier in modifiers {
            let range = modifier.range;
            match modifier.token {
                Token::Abstract => {
                    if flags.contains(ModifierFlags::STATIC) {
                        self.error_at(range, ErrorCode::AbstractSealedStatic, vec![]);
                    } else if flags.contains(ModifierFlags::ABSTRACT) {
                        self.error_at(range, ErrorCode::DuplicateModifier, vec![modifier.text()]);
                    }
                    flags |= ModifierFlags::ABSTRACT;
                }
                Token::Partial => {
                    flags |= ModifierFlags::PARTIAL;
                    break;
                }
                token if sets::PROTECTION_MODIFIER.contains(token) => {
                    let wanted = protection_level(token);
                    visibility = self.combine_visibility(visibility, wanted, modifier);
                }
                Token::Sealed => {
                    if flags.contains(ModifierFlags::STATIC) {
                        self.error_at(range, ErrorCode::SealedStaticClass, vec![]);
                    } else if flags.contains(ModifierFlags::SEALED) {
                        self.error_at(range, ErrorCode::DuplicateModifier, vec![modifier.text()]);
                    }
                    flags |= ModifierFlags::SEALED;
                }
                Token::Static => {
                    if flags.contains(ModifierFlags::STATIC) {
                        self.error_at(range, ErrorCode::DuplicateModifier, vec![modifier.text()]);
                    } else if flags.contains(ModifierFlags::ABSTRACT) {
                        self.error_at(range, ErrorCode::AbstractSealedStatic, vec![]);
                    } else if flags.contains(ModifierFlags::SEALED) {
                        self.error_at(range, ErrorCode::SealedStaticClass, vec![]);
                    }
                    flags |= ModifierFlags::STATIC;
                }
                Token::Unsafe => {
                    if flags.contains(ModifierFlags::UNSAFE) {
                        self.error_at(range, ErrorCode::DuplicateModifier, vec![modifier.text()]);
                    }
                    flags |= ModifierFlags::UNSAFE;
                }
                _ => self.error_at(range, ErrorCode::InvalidModifier, vec![modifier.text()]),
            }
        }
        Modifiers { visibility, flags }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;

    fn collect(source: &str) -> (Vec<Token>, Token) {
        let mut p = parser(source);
        let modifiers = p.parse_modifiers();
        (modifiers.iter().map(|m| m.token).collect(), p.token)
    }

    #[test]
    fn test_parse_modifiers() {
        assert_eq!(
            collect("public static readonly int"),
            (vec![Token::Public, Token::Static, Token::Readonly], Token::Int)
        );
        assert_eq!(
            collect("public partial class"),
            (vec![Token::Public, Token::Partial], Token::Class)
        );
    }

    #[test]
    fn test_misplaced_partial() {
        let mut p = parser("partial void M();");
        let modifiers = p.parse_modifiers();
        assert!(modifiers.is_empty());
        assert_eq!(p.token, Token::Void);
        assert_eq!(codes(&p), vec![ErrorCode::PartialMisplaced]);
    }

    #[test]
    fn test_visibility() {
        let mut p = parser("protected internal x");
        let modifiers = p.parse_modifiers();
        assert_eq!(p.member_visibility(&modifiers), Visibility::ProtectedInternal);
        assert!(codes(&p).is_empty());

        let mut p = parser("protected internal protected x");
        let modifiers = p.parse_modifiers();
        assert_eq!(p.member_visibility(&modifiers), Visibility::ProtectedInternal);
        assert_eq!(codes(&p), vec![ErrorCode::DuplicateModifier]);

        let mut p = parser("internal protected internal class");
        let modifiers = p.parse_modifiers();
        assert_eq!(p.type_modifiers(&modifiers).visibility, Visibility::ProtectedInternal);
        assert_eq!(codes(&p), vec![ErrorCode::DuplicateModifier]);

        let mut p = parser("public private public x");
        let modifiers = p.parse_modifiers();
        assert_eq!(p.member_visibility(&modifiers), Visibility::Public);
        assert_eq!(
            codes(&p),
            vec![ErrorCode::ConflictingProtectionModifier, ErrorCode::ConflictingProtectionModifier]
        );
    }

    #[test]
    fn test_member_rules() {
        let mut p = parser("static static virtual readonly x");
        let modifiers = p.parse_modifiers();
        let result = p.member_modifiers(&modifiers, FIELD_MODIFIERS);
        assert_eq!(result.flags, ModifierFlags::STATIC | ModifierFlags::READONLY);
        assert_eq!(codes(&p), vec![ErrorCode::DuplicateModifier, ErrorCode::InvalidModifier]);
    }

    #[test]
    fn test_type_modifier_conflicts() {
        let mut p = parser("static abstract sealed class");
        let modifiers = p.parse_modifiers();
        let result = p.type_modifiers(&modifiers);
        assert!(result.flags.contains(ModifierFlags::STATIC));
        assert_eq!(
            codes(&p),
            vec![ErrorCode::AbstractSealedStatic, ErrorCode::SealedStaticClass]
        );

        let mut p = parser("readonly class");
        let modifiers = p.parse_modifiers();
        p.type_modifiers(&modifiers);
        assert_eq!(codes(&p), vec![ErrorCode::InvalidModifier]);
    }
}
