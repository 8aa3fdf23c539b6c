pub use crate::lexing::{ScanOptions, Scanner};
pub use crate::names::{Name, NameTable};
pub use crate::parser_diagnostics::{ErrorCode, ParseError};
pub use crate::parsing::{
    parse, parse_namespace_member, parse_source, parse_type_member, ParseOptions, ParseOutput,
};

pub mod ast;
pub(crate) mod inspect;
pub mod keywords;
pub mod lexing;
pub mod names;
pub mod parser_diagnostics;
pub mod parsing;
pub mod pos;
pub mod sexp;
pub mod source;
pub mod token;
pub mod token_set;
pub(crate) mod util;
