use cslite::ast::{NamespaceDecl, NamespaceMember};
use cslite::sexp::ToSExp;
use cslite::{parse, parse_source, ErrorCode, ParseOptions, ParseOutput};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use walkdir::WalkDir;

fn corpus_files() -> Vec<(PathBuf, Vec<u8>)> {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/corpus");
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.unwrap_or_else(|e| panic!("error during walkdir: {}", e));
        if entry.path().extension().map_or(false, |ext| ext == "cs") {
            let source = std::fs::read(entry.path())
                .unwrap_or_else(|e| panic!("Error reading {}: {}", entry.path().display(), e));
            files.push((entry.path().to_owned(), source));
        }
    }
    assert!(!files.is_empty(), "no corpus files in {}", dir);
    files
}

fn codes(output: &ParseOutput<NamespaceDecl>) -> Vec<ErrorCode> {
    output.errors.iter().map(|error| error.code).collect()
}

#[test]
fn test_corpus_parses_cleanly() {
    for (path, source) in corpus_files() {
        let output = parse(&source);
        assert_eq!(codes(&output), vec![], "{}", path.display());
        let sexp = output.tree.to_sexp(&output.names).to_string();
        assert!(!sexp.contains("<invalid>"), "{}:\n{}", path.display(), sexp);
        assert!(output.tree.range.end() <= source.len());
    }
}

#[test]
fn test_every_prefix_terminates() {
    for (path, source) in corpus_files() {
        for len in 0..=source.len() {
            let prefix = &source[..len];
            let output = parse(prefix);
            assert!(
                output.tree.range.end() <= len,
                "{} cut at {}: tree ends at {}",
                path.display(),
                len,
                output.tree.range.end()
            );
        }
    }
}

#[test]
fn test_degenerate_inputs_terminate() {
    let nested = format!("class C {{ int x = {}1{}; }}", "(".repeat(64), ")".repeat(64));
    let output = parse(nested.as_bytes());
    assert_eq!(codes(&output), vec![]);

    let unclosed = format!("class C {{ int x = {}1", "(".repeat(64));
    let output = parse(unclosed.as_bytes());
    assert!(!output.errors.is_empty());

    let output = parse(b"");
    assert_eq!(codes(&output), vec![]);
    assert!(output.tree.members.is_empty());
}

/// Parses on a thread with a generous stack, so the result does not depend
/// on the test runner's default.
fn parse_on_large_stack(source: String) -> Vec<ErrorCode> {
    std::thread::Builder::new()
        .stack_size(64 << 20)
        .spawn(move || codes(&parse(source.as_bytes())))
        .unwrap_or_else(|e| panic!("cannot spawn parser thread: {}", e))
        .join()
        .unwrap_or_else(|_| panic!("parser thread panicked"))
}

#[test]
fn test_excessive_nesting_is_cut_off() {
    let depth = 5000;
    let parentheses = format!("class C {{ int x = {}1{}; }}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(parse_on_large_stack(parentheses), vec![ErrorCode::NestingTooDeep]);

    let blocks = format!("class C {{ void M() {}{} }}", "{".repeat(depth), "}".repeat(depth));
    assert_eq!(parse_on_large_stack(blocks), vec![ErrorCode::NestingTooDeep]);

    let negations = format!("class C {{ bool b = {}true; }}", "!".repeat(depth));
    assert!(parse_on_large_stack(negations).contains(&ErrorCode::NestingTooDeep));
}

#[test]
fn test_fragment_size_does_not_change_the_result() {
    for (path, source) in corpus_files() {
        let reference = parse(&source);
        for initial_fragment_size in [1, 7, 4096] {
            let options = ParseOptions {
                initial_fragment_size,
                ..ParseOptions::default()
            };
            let output = parse_source(&source[..], &options);
            let context = format!("{} / {}", path.display(), initial_fragment_size);
            assert_eq!(output.tree, reference.tree, "{}", context);
            assert_eq!(output.errors, reference.errors);
        }
    }
}

#[test]
fn test_diagnostics() {
    let testcases: Vec<(&str, Vec<ErrorCode>)> = vec![
        ("class C { int x int y; }", vec![ErrorCode::ExpectedSemicolon]),
        ("class C { void M() { int x = ; } }", vec![ErrorCode::InvalidExprTerm]),
        ("class C { void M() { x = 1 } }", vec![ErrorCode::ExpectedSemicolon]),
        ("using A; extern alias B;", vec![ErrorCode::ExternAfterElements]),
        ("namespace N { class C { }", vec![ErrorCode::ExpectedRightBrace]),
        ("private class C { }", vec![ErrorCode::PrivateOrProtectedNamespaceElement]),
    ];
    for (source, expected) in testcases {
        let output = parse(source.as_bytes());
        assert_eq!(codes(&output), expected, "{}", source);
    }
}

#[test]
fn test_diagnostic_messages() {
    let output = parse(b"class C { void M() { int x = ); } }");
    let messages = output.errors.iter().map(|error| error.to_string()).collect::<Vec<_>>();
    assert_eq!(messages[0], "Invalid expression term ')'");
}

#[test]
fn test_json_shape() {
    let output = parse(b"namespace N { class C { int x; } }");
    let json = serde_json::to_value(&output.tree).unwrap_or_else(|e| panic!("{}", e));
    let namespace = &json["members"][0];
    assert_eq!(namespace["type"], "Namespace");
    let class = &namespace["members"][0];
    assert_eq!(class["type"], "Type");
    assert_eq!(class["kind"]["type"], "Class");
    assert_eq!(class["kind"]["members"][0]["type"], "Field");
}

#[test]
fn test_nested_namespaces_keep_their_names() {
    let output = parse(b"namespace A { namespace B.C { } }");
    assert_eq!(codes(&output), vec![]);
    let sexp = output.tree.to_sexp(&output.names).to_string();
    assert_eq!(sexp, "(compilation-unit\n  (namespace A\n    (namespace\n      (. B C))))");
    assert!(matches!(&output.tree.members[..], [NamespaceMember::Namespace(_)]));
}
