use std::fmt;
use std::ops::{BitOr, Index};

use crate::token::Token;

/// A set of [`Token`]s packed into four 64-bit words.
///
/// Follower sets are built per call site by or-ing a base set with extra
/// tokens, so this is a plain `Copy` value with no interior mutability.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TokenSet([u64; 4]);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet([0; 4]);

    pub const fn single(token: Token) -> TokenSet {
        let ordinal = token as u8 as usize;
        let mut bits = [0; 4];
        bits[ordinal / 64] = 1 << (ordinal % 64);
        TokenSet(bits)
    }

    pub const fn of(tokens: &[Token]) -> TokenSet {
        let mut set = TokenSet::EMPTY;
        let mut i = 0;
        while i < tokens.len() {
            set = set.union(TokenSet::single(tokens[i]));
            i += 1;
        }
        set
    }

    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet([
            self.0[0] | other.0[0],
            self.0[1] | other.0[1],
            self.0[2] | other.0[2],
            self.0[3] | other.0[3],
        ])
    }

    pub const fn with(self, token: Token) -> TokenSet {
        self.union(TokenSet::single(token))
    }

    pub const fn contains(&self, token: Token) -> bool {
        let ordinal = token as u8 as usize;
        self.0[ordinal / 64] & (1 << (ordinal % 64)) != 0
    }
}

impl From<Token> for TokenSet {
    fn from(token: Token) -> Self {
        TokenSet::single(token)
    }
}

impl BitOr for TokenSet {
    type Output = TokenSet;

    fn bitor(self, rhs: TokenSet) -> TokenSet {
        self.union(rhs)
    }
}

impl BitOr<Token> for TokenSet {
    type Output = TokenSet;

    fn bitor(self, rhs: Token) -> TokenSet {
        self.with(rhs)
    }
}

impl BitOr for Token {
    type Output = TokenSet;

    fn bitor(self, rhs: Token) -> TokenSet {
        TokenSet::single(self).with(rhs)
    }
}

impl Index<Token> for TokenSet {
    type Output = bool;

    fn index(&self, token: Token) -> &bool {
        if self.contains(token) {
            &true
        } else {
            &false
        }
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenSet")?;
        let mut list = f.debug_list();
        for word in &self.0 {
            list.entry(&format_args!("{:#018x}", word));
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_across_words() {
        let set = TokenSet::of(&[Token::None, Token::Abstract, Token::EndOfFile, Token::Yield]);
        assert!(set[Token::None]);
        assert!(set[Token::Abstract]);
        assert!(set[Token::EndOfFile]);
        assert!(set[Token::Yield]);
        assert!(!set[Token::Identifier]);
        assert!(!set[Token::While]);
    }

    #[test]
    fn test_union() {
        let a = TokenSet::single(Token::Semicolon);
        let b = a | Token::RightBrace | TokenSet::single(Token::Comma);
        assert!(b[Token::Semicolon]);
        assert!(b[Token::RightBrace]);
        assert!(b[Token::Comma]);
        assert!(!a[Token::RightBrace]);
        assert_eq!(
            Token::Semicolon | Token::Comma,
            TokenSet::of(&[Token::Comma, Token::Semicolon])
        );
    }

    #[test]
    fn test_debug_lists_words() {
        let set = TokenSet::single(Token::None);
        let zero = "0x0000000000000000";
        assert_eq!(
            format!("{:?}", set),
            format!("TokenSet[0x0000000000000001, {}, {}, {}]", zero, zero, zero)
        );
    }

    #[test]
    fn test_every_token_fits() {
        assert!(Token::EndOfFile.ordinal() < 256);
        let single = TokenSet::single(Token::EndOfFile);
        assert!(single.contains(Token::EndOfFile));
        assert!(!single.contains(Token::Yield));
    }
}
