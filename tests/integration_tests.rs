//! Integration tests for end-to-end expression checking.
//!
//! These tests drive the public entry points: a single expression with a
//! document anchor, whole template strings, and parallel batches.

use pretty_assertions::assert_eq;
use workflow_expr::{
    ast::types::{ExprType, ObjectType},
    check_batch, check_expression, check_template,
    config::CheckConfig,
    errors::errors::ErrorKind,
    render_error,
    type_checker::type_checker::SemanticChecker,
    Position,
};

#[test]
fn test_matrix_expression() {
    let mut checker = SemanticChecker::new();
    checker.update_matrix(ObjectType::strict([("os", ExprType::array(ExprType::String))]));

    let result = check_expression("matrix.os }}", Position::start(), &mut checker);

    assert_eq!(result.ty, Some(ExprType::array(ExprType::String)));
    assert!(result.errors.is_empty());
    assert_eq!(result.end_offset, Some(12));
}

#[test]
fn test_incomplete_expression_has_no_type() {
    let result = check_expression("1 + }}", Position::start(), &mut SemanticChecker::new());

    assert_eq!(result.ty, None);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].get_kind(), ErrorKind::Lex);
}

#[test]
fn test_parse_error_has_no_type() {
    let result = check_expression("github.actor github.sha }}", Position::start(), &mut SemanticChecker::new());

    assert_eq!(result.ty, None);
    assert_eq!(result.errors[0].get_kind(), ErrorKind::Parse);
    assert_eq!(result.errors[0].get_error_name(), "RemainingTokens");
}

#[test]
fn test_from_json_of_dynamic_value() {
    let result = check_expression(
        "fromJSON(inputs.x).anything }}",
        Position::start(),
        &mut SemanticChecker::new(),
    );

    assert_eq!(result.ty, Some(ExprType::Any));
    assert!(result.errors.is_empty());
}

#[test]
fn test_errors_are_translated_to_document() {
    let result = check_expression(
        " github.foo }}",
        Position::new(7, 12, 200),
        &mut SemanticChecker::new(),
    );

    assert_eq!(result.errors.len(), 1);
    let position = result.errors[0].get_position();
    assert_eq!((position.line, position.column, position.offset), (7, 13, 201));
}

#[test]
fn test_untrusted_input_end_to_end() {
    let config = CheckConfig::for_workflow_key("jobs.<job_id>.steps.run").with_untrusted_input_check(true);
    let mut checker = SemanticChecker::with_config(&config);

    let result = check_expression("github.event.issue.title }}", Position::start(), &mut checker);

    assert_eq!(result.ty, Some(ExprType::Any));
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].get_kind(), ErrorKind::Taint);
    assert!(result.errors[0]
        .get_message()
        .contains("\"github.event.issue.title\""));
}

#[test]
fn test_check_template() {
    let text = "echo ${{ github.event.issue.title }} and ${{ foo }} and ${{ 1 + }} and ${{ env.X }}";
    let mut checker = SemanticChecker::with_config(&CheckConfig::default().with_untrusted_input_check(true));

    let errors = check_template(text, Position::new(3, 5, 0), &mut checker);
    let names: Vec<&str> = errors.iter().map(|e| e.get_error_name()).collect();

    assert_eq!(names, vec!["UntrustedInput", "UndefinedVariable", "UnexpectedCharacter"]);
    assert_eq!(errors[0].get_line(), 3);
    assert_eq!(errors[0].get_column(), 5 + 9);
}

#[test]
fn test_check_template_multiline() {
    let text = "first line\n  ${{ foo }}";
    let errors = check_template(text, Position::new(10, 3, 0), &mut SemanticChecker::new());

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_line(), 11);
    assert_eq!(errors[0].get_column(), 7);
}

#[test]
fn test_check_batch_keeps_order() {
    let inputs = vec![
        ("github.sha }}".to_string(), Position::new(1, 1, 0)),
        ("foo }}".to_string(), Position::new(2, 1, 0)),
        ("contains(true, 'a') }}".to_string(), Position::new(3, 1, 0)),
        ("success() }}".to_string(), Position::new(4, 1, 0)),
    ];
    let config = CheckConfig::for_workflow_key("jobs.<job_id>.steps.run");

    let results = check_batch(&inputs, &config);

    assert_eq!(results.len(), 4);
    assert!(results[0].errors.is_empty());
    assert_eq!(results[1].errors[0].get_error_name(), "UndefinedVariable");
    assert_eq!(results[2].errors[0].get_error_name(), "NoMatchingOverload");
    assert_eq!(results[3].errors[0].get_error_name(), "SpecialFunctionNotAllowed");
    assert_eq!(results[3].errors[0].get_line(), 4);
}

#[test]
fn test_strict_object_missing_property_cites_type() {
    let mut checker = SemanticChecker::new();
    checker.update_needs(ObjectType::strict([(
        "build",
        ExprType::strict_object([
            ("result", ExprType::String),
            ("outputs", ExprType::mapped_object(ExprType::String)),
        ]),
    )]));

    let result = check_expression("needs.test.result }}", Position::start(), &mut checker);

    assert_eq!(result.errors.len(), 1);
    assert_eq!(
        result.errors[0].get_message(),
        "property \"test\" is not defined in object type {build: {outputs: {string => string}; result: string}}"
    );
}

#[test]
fn test_render_error() {
    let source = "github.foo }}";
    let result = check_expression(source, Position::start(), &mut SemanticChecker::new());
    let rendered = render_error(&result.errors[0], source);

    assert!(rendered.starts_with("Error: property \"foo\" is not defined in object type {"));
    assert!(rendered.ends_with("\n  |\n1 | github.foo }}\n  | ^\n"));
}

#[test]
fn test_deeply_nested_expression_in_batch() {
    let inputs = vec![
        (format!("{}true }}}}", "!".repeat(10_000)), Position::new(1, 1, 0)),
        (format!("github{} }}}}", ".event".repeat(10_000)), Position::new(2, 1, 0)),
        ("github.sha }}".to_string(), Position::new(3, 1, 0)),
    ];

    let results = check_batch(&inputs, &CheckConfig::default());

    for result in &results[..2] {
        assert_eq!(result.ty, None);
        assert_eq!(result.errors[0].get_kind(), ErrorKind::Parse);
        assert_eq!(result.errors[0].get_error_name(), "NestingTooDeep");
    }
    assert_eq!(results[2].ty, Some(ExprType::String));
}
