//! Keyword recognition.
//!
//! Keywords are bucketed by their first letter. Each bucket is ordered by
//! length and then by spelling, so a lookup stops at the first entry that is
//! longer than, or sorts after, the candidate.

use bstr::{BStr, ByteSlice};
use once_cell::sync::Lazy;

use crate::token::Token;

#[derive(Debug, Clone, Copy)]
struct Keyword {
    name: &'static [u8],
    token: Token,
    /// Recognized only when Spec# keywords are enabled.
    spec_sharp: bool,
}

const fn kw(name: &'static str, token: Token) -> Keyword {
    Keyword {
        name: name.as_bytes(),
        token,
        spec_sharp: false,
    }
}

const fn contract_kw(name: &'static str, token: Token) -> Keyword {
    Keyword {
        name: name.as_bytes(),
        token,
        spec_sharp: true,
    }
}

const KEYWORD_LIST: &[Keyword] = &[
    kw("as", Token::As),
    kw("add", Token::Add),
    kw("alias", Token::Alias),
    contract_kw("assert", Token::Assert),
    contract_kw("assume", Token::Assume),
    contract_kw("acquire", Token::Acquire),
    kw("abstract", Token::Abstract),
    kw("base", Token::Base),
    kw("bool", Token::Bool),
    kw("byte", Token::Byte),
    kw("break", Token::Break),
    kw("case", Token::Case),
    kw("char", Token::Char),
    kw("catch", Token::Catch),
    kw("class", Token::Class),
    kw("const", Token::Const),
    contract_kw("count", Token::Count),
    kw("checked", Token::Checked),
    kw("continue", Token::Continue),
    kw("do", Token::Do),
    kw("double", Token::Double),
    kw("decimal", Token::Decimal),
    kw("default", Token::Default),
    kw("delegate", Token::Delegate),
    kw("else", Token::Else),
    kw("enum", Token::Enum),
    kw("event", Token::Event),
    contract_kw("exists", Token::Exists),
    contract_kw("expose", Token::Expose),
    kw("extern", Token::Extern),
    contract_kw("ensures", Token::Ensures),
    kw("explicit", Token::Explicit),
    contract_kw("elements_seen", Token::ElementsSeen),
    kw("for", Token::For),
    kw("false", Token::False),
    kw("fixed", Token::Fixed),
    kw("float", Token::Float),
    contract_kw("forall", Token::Forall),
    kw("finally", Token::Finally),
    kw("foreach", Token::Foreach),
    kw("get", Token::Get),
    kw("goto", Token::Goto),
    kw("if", Token::If),
    kw("in", Token::In),
    kw("is", Token::Is),
    kw("int", Token::Int),
    kw("implicit", Token::Implicit),
    kw("internal", Token::Internal),
    kw("interface", Token::Interface),
    contract_kw("invariant", Token::Invariant),
    kw("lock", Token::Lock),
    kw("long", Token::Long),
    contract_kw("modifies", Token::Modifies),
    kw("new", Token::New),
    kw("null", Token::Null),
    kw("namespace", Token::Namespace),
    contract_kw("old", Token::Old),
    kw("out", Token::Out),
    kw("object", Token::Object),
    kw("operator", Token::Operator),
    kw("override", Token::Override),
    kw("otherwise", Token::Otherwise),
    kw("params", Token::Params),
    kw("public", Token::Public),
    kw("partial", Token::Partial),
    kw("private", Token::Private),
    kw("protected", Token::Protected),
    kw("ref", Token::Ref),
    contract_kw("read", Token::Read),
    kw("remove", Token::Remove),
    kw("return", Token::Return),
    kw("readonly", Token::Readonly),
    contract_kw("requires", Token::Requires),
    kw("set", Token::Set),
    kw("sbyte", Token::Sbyte),
    kw("short", Token::Short),
    kw("sealed", Token::Sealed),
    kw("sizeof", Token::Sizeof),
    kw("static", Token::Static),
    kw("string", Token::String),
    kw("struct", Token::Struct),
    kw("switch", Token::Switch),
    kw("stackalloc", Token::Stackalloc),
    kw("try", Token::Try),
    kw("this", Token::This),
    kw("true", Token::True),
    kw("throw", Token::Throw),
    contract_kw("throws", Token::Throws),
    kw("typeof", Token::Typeof),
    kw("uint", Token::Uint),
    kw("ulong", Token::Ulong),
    kw("using", Token::Using),
    kw("unique", Token::Unique),
    kw("unsafe", Token::Unsafe),
    kw("ushort", Token::Ushort),
    kw("unchecked", Token::Unchecked),
    contract_kw("var", Token::Var),
    kw("void", Token::Void),
    kw("value", Token::Value),
    kw("virtual", Token::Virtual),
    kw("volatile", Token::Volatile),
    kw("where", Token::Where),
    kw("while", Token::While),
    kw("write", Token::Write),
    kw("yield", Token::Yield),
];

const EXTENDED_KEYWORD_LIST: &[Keyword] = &[
    kw("__arglist", Token::ArgList),
    kw("__makeref", Token::MakeRef),
    kw("__reftype", Token::RefType),
    kw("__refvalue", Token::RefValue),
];

fn sorted(mut keywords: Vec<Keyword>) -> Vec<Keyword> {
    keywords.sort_by(|a, b| (a.name.len(), a.name).cmp(&(b.name.len(), b.name)));
    keywords
}

static KEYWORDS: Lazy<Vec<Vec<Keyword>>> = Lazy::new(|| {
    let mut buckets = vec![Vec::new(); 26];
    for keyword in KEYWORD_LIST {
        buckets[(keyword.name[0] - b'a') as usize].push(*keyword);
    }
    buckets.into_iter().map(sorted).collect()
});

static EXTENDED_KEYWORDS: Lazy<Vec<Keyword>> =
    Lazy::new(|| sorted(EXTENDED_KEYWORD_LIST.to_vec()));

fn search(bucket: &[Keyword], spelling: &[u8], spec_sharp: bool) -> Token {
    for keyword in bucket {
        if keyword.name.len() < spelling.len() {
            continue;
        }
        if keyword.name.len() > spelling.len() {
            break;
        }
        match keyword.name.cmp(spelling) {
            std::cmp::Ordering::Less => continue,
            std::cmp::Ordering::Greater => break,
            std::cmp::Ordering::Equal => {
                return if keyword.spec_sharp && !spec_sharp {
                    Token::Identifier
                } else {
                    keyword.token
                };
            }
        }
    }
    Token::Identifier
}

/// Classifies a lowercase word. Anything that is not a keyword is an
/// identifier.
pub(crate) fn lookup(spelling: &BStr, spec_sharp: bool) -> Token {
    match spelling.first() {
        Some(&first @ b'a'..=b'z') => {
            search(&KEYWORDS[(first - b'a') as usize], spelling.as_bytes(), spec_sharp)
        }
        _ => Token::Identifier,
    }
}

/// Classifies a word that starts with `__`.
pub(crate) fn lookup_extended(spelling: &BStr) -> Token {
    search(&EXTENDED_KEYWORDS, spelling.as_bytes(), true)
}

/// Source spelling of a keyword token, if it is one.
pub fn spelling(token: Token) -> Option<&'static str> {
    KEYWORD_LIST
        .iter()
        .chain(EXTENDED_KEYWORD_LIST)
        .find(|keyword| keyword.token == token)
        .and_then(|keyword| std::str::from_utf8(keyword.name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup(b"class".as_bstr(), false), Token::Class);
        assert_eq!(lookup(b"stackalloc".as_bstr(), false), Token::Stackalloc);
        assert_eq!(lookup(b"classy".as_bstr(), false), Token::Identifier);
        assert_eq!(lookup(b"cla".as_bstr(), false), Token::Identifier);
        assert_eq!(lookup(b"global".as_bstr(), false), Token::Identifier);
    }

    #[test]
    fn test_spec_sharp_keywords() {
        assert_eq!(lookup(b"requires".as_bstr(), true), Token::Requires);
        assert_eq!(lookup(b"requires".as_bstr(), false), Token::Identifier);
        assert_eq!(lookup(b"var".as_bstr(), false), Token::Identifier);
    }

    #[test]
    fn test_extended_keywords() {
        assert_eq!(lookup_extended(b"__arglist".as_bstr()), Token::ArgList);
        assert_eq!(lookup_extended(b"__refvalue".as_bstr()), Token::RefValue);
        assert_eq!(lookup_extended(b"__foo".as_bstr()), Token::Identifier);
    }

    #[test]
    fn test_buckets_are_ordered() {
        for bucket in KEYWORDS.iter() {
            for pair in bucket.windows(2) {
                assert!((pair[0].name.len(), pair[0].name) < (pair[1].name.len(), pair[1].name));
            }
        }
    }
}
