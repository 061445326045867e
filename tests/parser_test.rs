use color_eyre::eyre::{Context, Result};
use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use pilang::lexer::TokenKind;
use pilang::parser::{
    formatter::{ParserFormatter, SExpressionFormatter},
    statement::Statement,
    Parser, ParserErrorKind,
};

fn check(input: &str, expected: &str, test_name: &str) {
    let mut parser = Parser::new(input);
    let result = parser.parse();
    let formatter = SExpressionFormatter::new(input);
    let actual = match result {
        Ok(ref program) => formatter.format(program),
        Err(ref e) => formatter.format_error(e),
    };

    assert_eq!(
        actual,
        expected.trim_end_matches('\n'),
        "Failed the test {test_name}"
    );
}

fn error_kind(input: &str) -> ParserErrorKind {
    Parser::new(input)
        .parse()
        .expect_err("Input should fail to parse")
        .kind
}

#[test]
fn smoke_test() {
    check("", "", "smoke");
}

#[test]
fn precedence_of_product_over_sum() {
    check("2 + 3 * 4", "(+ 2 (* 3 4))", "product");
    check("(2 + 3) * 4", "(* (group (+ 2 3)) 4)", "group");
}

#[test]
fn binary_operators_are_left_associative() {
    check("8 - 4 - 2", "(- (- 8 4) 2)", "subtract");
    check("a or b or c", "(or (or a b) c)", "or");
}

#[test]
fn newlines_are_ignored_after_operators() {
    check("1 +\n2", "(+ 1 2)", "continued sum");
    check("let x =\n  3", "(let x 3)", "continued let");
}

#[test]
fn block_value_is_last_statement() {
    let program = Parser::new("{ let a = 1\n a }").parse().unwrap();
    assert_eq!(program.len(), 1);
    assert!(matches!(
        program.iter().next(),
        Some(Statement::Expression(_))
    ));
}

#[test]
fn function_bodies_are_shared() {
    let program = Parser::new("fn id(x) { x }").parse().unwrap();
    let Some(Statement::Function(decl)) = program.iter().next() else {
        panic!("Expected a function declaration");
    };
    assert_eq!(decl.name.name, "id");
    assert_eq!(decl.parameters.len(), 1);
    assert_eq!(std::rc::Rc::strong_count(&decl.body), 1);
}

#[test]
fn duplicate_parameters_are_rejected() {
    assert_eq!(
        error_kind("fn f(a, b, a) { a }"),
        ParserErrorKind::DuplicateParameter("a".into())
    );
}

#[test]
fn statements_need_separators() {
    assert_eq!(
        error_kind("let a = 1 let b = 2"),
        ParserErrorKind::MissingSeparator(TokenKind::KeywordLet)
    );
}

#[test]
fn unterminated_block_hits_eof() {
    assert_eq!(error_kind("fn f() {\n 1\n"), ParserErrorKind::UnexpectedEof);
}

#[test]
fn else_without_if_is_not_an_expression() {
    assert_eq!(
        error_kind("else { 1 }"),
        ParserErrorKind::NonExpression(TokenKind::KeywordElse)
    );
}

#[test]
fn lexical_errors_surface_through_the_parser() {
    let error = Parser::new("let x = 99999999999999999999").parse().unwrap_err();
    assert!(matches!(error.kind, ParserErrorKind::LexicalError(_)));
    assert_eq!(error.code(), "LX002");
}

#[test]
fn deep_nesting_parses_and_formats() {
    let source = format!("{}1{}", "(".repeat(50_000), ")".repeat(50_000));
    let program = Parser::new(&source).parse().unwrap();
    let formatted = SExpressionFormatter::new(&source).format(&program);
    assert!(formatted.starts_with("(group (group "));
    assert!(formatted.ends_with(" 1))"));

    let source = format!("1{}", " - 1".repeat(100_000));
    let program = Parser::new(&source).parse().unwrap();
    assert_eq!(program.len(), 1);
}

#[test]
fn test_all() -> Result<()> {
    let input_dir = Path::new("./test_data/parser/in");
    let output_dir = Path::new("./test_data/parser/out");

    let mut succeeded = true;
    for entry in read_dir(input_dir).context("Failed to open input test data folder")? {
        let entry = entry?;
        let path = entry.path();

        let Some(extension) = path.extension() else {
            continue;
        };

        if extension != "pi" {
            continue;
        }

        let Some(test_name) = path.file_name() else {
            continue;
        };
        let test_name = Path::new(test_name);

        let input = read_to_string(&path).context("Failed to open input test data file")?;

        let expected = {
            let output_file_name = test_name.with_extension("txt");
            let output_path = output_dir.join(output_file_name);
            read_to_string(output_path).context("Failed to open output test data file")?
        };

        let res = std::panic::catch_unwind(|| {
            check(&input, &expected, &test_name.to_string_lossy());
        });
        if res.is_err() {
            succeeded = false;
        }
    }

    assert!(succeeded, "Some parser test cases failed");
    Ok(())
}
