use pseudolang::CompileError;
use pseudolang::scanner::token::TokenKind;
use rstest::rstest;

fn compile_error(source: &str) -> CompileError {
    pseudolang::compile(source).unwrap_err()
}

#[test]
fn missing_fin_si_is_reported_at_end_of_input() {
    let source = include_str!("../fixtures/error_missing_fin_si.pseudo");
    let err = compile_error(source);
    assert!(matches!(err, CompileError::Parse { kind: TokenKind::Eof, .. }), "{err}");
    assert_eq!(err.message(), "expected 'fin_si'");
    assert!(err.to_string().ends_with("found end of input"), "{err}");
}

#[test]
fn unterminated_string_is_a_lexical_error() {
    let source = include_str!("../fixtures/error_unterminated_string.pseudo");
    let err = compile_error(source);
    assert!(matches!(err, CompileError::Lexical { .. }), "{err}");
    assert_eq!(err.message(), "unterminated string");
    assert_eq!((err.line(), err.column()), (1, 10));
}

#[test]
fn unexpected_character_is_a_lexical_error() {
    let err = compile_error("x = 1\ny = x @ 2");
    assert_eq!(err.message(), "unexpected character '@'");
    assert_eq!((err.line(), err.column()), (2, 7));
}

#[rstest]
#[case("x 5", "expected '=' after identifier")]
#[case("si x > 1 entonces fin_si", "expected '(' after 'si'")]
#[case("si (x > 1 entonces fin_si", "expected ')' after condition")]
#[case("si (x > 1) escribir x fin_si", "expected 'entonces' after condition")]
#[case("repite x < 1 fin_repite", "expected '(' after 'repite'")]
#[case("repite (x < 1) escribir x", "expected 'fin_repite'")]
#[case("escribir", "expected expression")]
#[case("escribir (1 + 2", "expected ')' after expression")]
#[case("x = 1;", "expected statement")]
#[case("fin_si", "expected statement")]
#[case("x = 99999999999999999999", "malformed number '99999999999999999999'")]
fn grammar_violations(#[case] source: &str, #[case] message: &str) {
    let err = compile_error(source);
    assert!(matches!(err, CompileError::Parse { .. }), "{err}");
    assert_eq!(err.message(), message);
}

#[rstest]
#[case::parentheses(format!("escribir {}1{}", "(".repeat(5000), ")".repeat(5000)))]
#[case::unary(format!("x = {}1", "-".repeat(5000)))]
#[case::left_chain(format!("x = 1{}", " - 1".repeat(100_000)))]
#[case::blocks(format!("{}{}", "repite (x)\n".repeat(5000), "fin_repite\n".repeat(5000)))]
fn runaway_nesting_is_a_parse_error(#[case] source: String) {
    let err = compile_error(&source);
    assert!(matches!(err, CompileError::Parse { .. }), "{err}");
    assert!(err.message().ends_with("nested too deeply"), "{err}");
}

#[test]
fn first_error_wins() {
    let err = compile_error("x = \nescribir (");
    assert_eq!(err.message(), "expected expression");
    assert_eq!(err.line(), 2);
}

#[test]
fn report_renders_with_source() {
    let source = "si (x) entonces\n  escribir x\n";
    let err = compile_error(source).with_source_code("programa.pseudo", source);
    let rendered = format!("{:?}", miette::Report::new(err));
    assert!(rendered.contains("expected 'fin_si'"), "{rendered}");
}
