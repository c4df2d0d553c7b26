//! End-to-end exercises of lex -> parse -> check across a full program,
//! not just one module's unit tests in isolation.

use corvid_ast::AstArena;
use corvid_check::Checker;
use corvid_lexer::{Lexer, TokenKind};
use corvid_parser::Parser;

fn check(source: &str) -> (corvid_base::DiagnosticBag, corvid_check::CheckOutput) {
    let arena = AstArena::new();
    let parsed = Parser::new(&arena, "pipeline_test.cv", source).parse();
    let checked = Checker::new(&parsed.interner).check(&parsed.unit);
    (parsed.diagnostics, checked)
}

#[test]
fn well_formed_program_lexes_parses_and_checks_cleanly() {
    let source = "package main;\n\nfn add(a: i32, b: i32) -> i32 {\n  return a + b;\n}\n\nfn main() {\n  var total = add(1, 2);\n}\n";
    let (parse_diags, checked) = check(source);
    assert!(!parse_diags.has_errors(), "{:?}", parse_diags.iter().collect::<Vec<_>>());
    assert!(!checked.diagnostics.has_errors(), "{:?}", checked.diagnostics.iter().collect::<Vec<_>>());
}

#[test]
fn calling_undefined_function_fails_type_checking_not_parsing() {
    let source = "package main;\n\nfn main() {\n  mystery(1, 2);\n}\n";
    let (parse_diags, checked) = check(source);
    assert!(!parse_diags.has_errors());
    assert!(checked.diagnostics.has_errors());
}

#[test]
fn malformed_syntax_is_reported_with_a_source_position() {
    let source = "package main;\n\nfn main( {\n";
    let arena = AstArena::new();
    let parsed = Parser::new(&arena, "broken.cv", source).parse();
    assert!(parsed.diagnostics.has_errors());
    let first = parsed.diagnostics.iter().next().unwrap();
    assert_eq!(first.position.line, 3);
}

#[test]
fn cross_category_numeric_mix_is_a_type_error() {
    let source = "package main;\n\nfn main() {\n  var x = 1 + true;\n}\n";
    let (parse_diags, checked) = check(source);
    assert!(!parse_diags.has_errors());
    assert!(checked.diagnostics.has_errors());
}

#[test]
fn forward_referenced_struct_and_method_check_cleanly() {
    let source = "package main;\n\nstruct Counter { n: i32 }\n\nfn (c Counter) get() -> i32 { return c.n; }\n\nfn main() {\n  var c = Counter { n: 1 };\n  var v = c.get();\n}\n";
    let (parse_diags, checked) = check(source);
    assert!(!parse_diags.has_errors(), "{:?}", parse_diags.iter().collect::<Vec<_>>());
    assert!(!checked.diagnostics.has_errors(), "{:?}", checked.diagnostics.iter().collect::<Vec<_>>());
}

#[test]
fn channel_send_and_receive_type_check_against_the_element_type() {
    let source = "package main;\n\nchannel ch: i32;\n\nfn main() {\n  ch <- 1;\n  var v = <-ch;\n}\n";
    let (parse_diags, checked) = check(source);
    assert!(!parse_diags.has_errors(), "{:?}", parse_diags.iter().collect::<Vec<_>>());
    assert!(!checked.diagnostics.has_errors(), "{:?}", checked.diagnostics.iter().collect::<Vec<_>>());
}

#[test]
fn closed_aware_channel_receive_binds_element_and_ok_as_bool() {
    let source = "package main;\n\nchannel ch: i32;\n\nfn main() {\n  var v, ok = <-ch;\n  if ok {\n    var sum = v + 1;\n  }\n}\n";
    let (parse_diags, checked) = check(source);
    assert!(!parse_diags.has_errors(), "{:?}", parse_diags.iter().collect::<Vec<_>>());
    assert!(!checked.diagnostics.has_errors(), "{:?}", checked.diagnostics.iter().collect::<Vec<_>>());
}

#[test]
fn go_on_a_non_call_expression_is_a_diagnostic() {
    let source = "package main;\n\nfn main() {\n  go 1 + 2;\n}\n";
    let arena = AstArena::new();
    let parsed = Parser::new(&arena, "go_test.cv", source).parse();
    assert!(parsed.diagnostics.has_errors(), "{:?}", parsed.diagnostics.iter().collect::<Vec<_>>());
}

#[test]
fn go_on_a_call_expression_parses_cleanly() {
    let source = "package main;\n\nfn work() {}\n\nfn main() {\n  go work();\n}\n";
    let (parse_diags, checked) = check(source);
    assert!(!parse_diags.has_errors(), "{:?}", parse_diags.iter().collect::<Vec<_>>());
    assert!(!checked.diagnostics.has_errors(), "{:?}", checked.diagnostics.iter().collect::<Vec<_>>());
}

#[test]
fn ordering_comparison_between_two_structs_is_a_type_error() {
    let source = "package main;\n\nstruct Point { n: i32 }\n\nfn compare(a: Point, b: Point) -> bool {\n  return a < b;\n}\n";
    let (parse_diags, checked) = check(source);
    assert!(!parse_diags.has_errors(), "{:?}", parse_diags.iter().collect::<Vec<_>>());
    assert!(checked.diagnostics.has_errors());
}

#[test]
fn equality_comparison_between_two_structs_is_a_type_error() {
    let source = "package main;\n\nstruct Point { n: i32 }\n\nfn same(a: Point, b: Point) -> bool {\n  return a == b;\n}\n";
    let (parse_diags, checked) = check(source);
    assert!(!parse_diags.has_errors(), "{:?}", parse_diags.iter().collect::<Vec<_>>());
    assert!(checked.diagnostics.has_errors());
}

#[test]
fn ordering_comparison_between_two_strings_checks_cleanly() {
    let source = "package main;\n\nfn compare(a: str, b: str) -> bool {\n  return a < b;\n}\n";
    let (parse_diags, checked) = check(source);
    assert!(!parse_diags.has_errors(), "{:?}", parse_diags.iter().collect::<Vec<_>>());
    assert!(!checked.diagnostics.has_errors(), "{:?}", checked.diagnostics.iter().collect::<Vec<_>>());
}

#[test]
fn lexer_recovers_from_an_invalid_byte_and_keeps_tokenizing() {
    let mut lexer = Lexer::from_source("lex_test.cv", "var x = 1;\n\u{0}\nvar y = 2;\n");
    let mut saw_error = false;
    let mut saw_second_var = false;
    loop {
        let token = lexer.next_token();
        if token.is_eof() {
            break;
        }
        if token.kind == TokenKind::Error {
            saw_error = true;
        }
        if token.kind == TokenKind::Var && saw_error {
            saw_second_var = true;
        }
    }
    assert!(saw_error);
    assert!(saw_second_var);
}
