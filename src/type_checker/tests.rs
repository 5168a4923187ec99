//! Unit tests for semantic analysis.
//!
//! This module contains tests for:
//! - Type inference of every node kind
//! - Context narrowing and availability
//! - Built-in function overloads and their extra checks
//! - Configuration variables
//! - Untrusted input detection

use pretty_assertions::assert_eq;

use super::{
    availability::{special_function_keys, workflow_key_availability},
    builtins::BUILTIN_FUNC_SIGNATURES,
    functions::{format_placeholders, ordinal},
    type_checker::SemanticChecker,
    untrusted::UntrustedInputMap,
};
use crate::{
    ast::types::{ExprType, ObjectType},
    config::CheckConfig,
    errors::errors::{ErrorImpl, ErrorKind, ExprError},
    lexer::lexer::tokenize,
    parser::parser::parse,
};

fn check_with(checker: &mut SemanticChecker, source: &str) -> (ExprType, Vec<ExprError>) {
    let expr = parse(tokenize(&format!("{} }}}}", source)).unwrap()).unwrap();
    checker.check(&expr)
}

fn check(source: &str) -> (ExprType, Vec<ExprError>) {
    check_with(&mut SemanticChecker::new(), source)
}

fn error_names(errors: &[ExprError]) -> Vec<&str> {
    errors.iter().map(|e| e.get_error_name()).collect()
}

fn taint_checker() -> SemanticChecker {
    let mut checker = SemanticChecker::new();
    checker.enable_untrusted_input_check(true);
    checker
}

#[test]
fn test_literals() {
    assert_eq!(check("null").0, ExprType::Null);
    assert_eq!(check("true").0, ExprType::Bool);
    assert_eq!(check("42").0, ExprType::Number);
    assert_eq!(check("1.5").0, ExprType::Number);
    assert_eq!(check("'x'").0, ExprType::String);
}

#[test]
fn test_context_property() {
    let (ty, errors) = check("github.actor");

    assert_eq!(ty, ExprType::String);
    assert!(errors.is_empty());
}

#[test]
fn test_context_names_are_case_insensitive() {
    let (ty, errors) = check("GitHub.Ref_Protected");

    assert_eq!(ty, ExprType::Bool);
    assert!(errors.is_empty());
}

#[test]
fn test_undefined_variable() {
    let (ty, errors) = check("foo");

    assert_eq!(ty, ExprType::Any);
    assert_eq!(error_names(&errors), vec!["UndefinedVariable"]);
    assert!(errors[0].get_message().contains("\"github\", \"inputs\""));
}

#[test]
fn test_undefined_property_of_strict_object() {
    let mut checker = SemanticChecker::new();
    let runner = checker.lookup_variable("runner").cloned().unwrap();
    let (ty, errors) = check_with(&mut checker, "runner.foo");

    assert_eq!(ty, ExprType::Any);
    assert_eq!(errors.len(), 1);
    match errors[0].get_impl() {
        ErrorImpl::UndefinedProperty { property, object } => {
            assert_eq!(property, "foo");
            assert_eq!(*object, runner.to_string());
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_mapped_and_loose_objects() {
    assert_eq!(check("env.ANYTHING").0, ExprType::String);
    assert_eq!(check("github.event.anything.deeper").0, ExprType::Any);
    assert_eq!(check("jobs.build.outputs.x").0, ExprType::String);
}

#[test]
fn test_invalid_deref_receiver() {
    let (_, errors) = check("github.actor.foo");

    assert_eq!(error_names(&errors), vec!["InvalidDerefReceiver"]);
}

#[test]
fn test_errors_accumulate() {
    let (_, errors) = check("foo.bar || runner.nope || baz");

    assert_eq!(
        error_names(&errors),
        vec!["UndefinedVariable", "UndefinedProperty", "UndefinedVariable"]
    );
    assert!(errors.iter().all(|e| e.get_kind() == ErrorKind::Type));
}

#[test]
fn test_context_availability() {
    let mut checker = SemanticChecker::new();
    checker.set_context_availability(vec!["github".to_string()]);

    let (ty, errors) = check_with(&mut checker, "env.FOO");
    assert_eq!(ty, ExprType::String);
    assert_eq!(
        errors[0].get_message(),
        "context \"env\" is not allowed here. available context is \"github\""
    );

    let (_, errors) = check_with(&mut checker, "github.sha");
    assert!(errors.is_empty());
}

#[test]
fn test_matrix_narrowing() {
    let mut checker = SemanticChecker::new();
    checker.update_matrix(ObjectType::strict([("os", ExprType::array(ExprType::String))]));

    let (ty, errors) = check_with(&mut checker, "matrix.os");
    assert_eq!(ty, ExprType::array(ExprType::String));
    assert!(errors.is_empty());

    let (_, errors) = check_with(&mut checker, "matrix.arch");
    assert_eq!(error_names(&errors), vec!["UndefinedProperty"]);
}

#[test]
fn test_narrowing_does_not_leak_between_checkers() {
    let mut narrowed = SemanticChecker::new();
    narrowed.update_steps(ObjectType::strict([(
        "build",
        ExprType::strict_object([("outputs", ExprType::mapped_object(ExprType::String))]),
    )]));
    narrowed.update_dispatch_inputs(ObjectType::strict([("name", ExprType::String)]));

    assert!(check_with(&mut narrowed, "steps.build.outputs.x").1.is_empty());
    assert_eq!(check_with(&mut narrowed, "github.event.inputs.name").0, ExprType::String);

    let mut fresh = SemanticChecker::new();
    assert_eq!(
        error_names(&check_with(&mut fresh, "steps.build").1),
        vec!["UndefinedProperty"]
    );
    assert_eq!(check_with(&mut fresh, "github.event.inputs.name").0, ExprType::Any);
}

#[test]
fn test_update_secrets_keeps_github_token() {
    let mut checker = SemanticChecker::new();
    checker.update_secrets(ObjectType::strict([("deploy_key", ExprType::String)]));

    assert!(check_with(&mut checker, "secrets.GITHUB_TOKEN").1.is_empty());
    assert!(check_with(&mut checker, "secrets.deploy_key").1.is_empty());
    assert_eq!(
        error_names(&check_with(&mut checker, "secrets.other").1),
        vec!["UndefinedProperty"]
    );
}

#[test]
fn test_object_filter() {
    let (ty, errors) = check(r#"fromJSON('[{"name": "a"}, {"name": "b"}]').*.name"#);

    assert_eq!(ty, ExprType::filtered_array(ExprType::String));
    assert!(errors.is_empty());
}

#[test]
fn test_object_filter_on_objects() {
    assert_eq!(check("env.*").0, ExprType::filtered_array(ExprType::String));
    assert_eq!(check("github.*").0, ExprType::filtered_array(ExprType::Any));
    assert_eq!(check("github.event.*.body").0, ExprType::filtered_array(ExprType::Any));

    let (ty, errors) = check("runner.*");
    assert_eq!(ty, ExprType::filtered_array(ExprType::Any));
    assert_eq!(error_names(&errors), vec!["InvalidFilterReceiver"]);

    assert_eq!(error_names(&check("'str'.*").1), vec!["InvalidFilterReceiver"]);
}

#[test]
fn test_object_filter_property_errors() {
    assert_eq!(
        error_names(&check(r#"fromJSON('[{"a": 1}]').*.b"#).1),
        vec!["UndefinedFilteredProperty"]
    );
    assert_eq!(
        error_names(&check("fromJSON('[1, 2]').*.b").1),
        vec!["InvalidFilteredElement"]
    );
    // A plain array is not filtered, so property access is invalid
    assert_eq!(
        error_names(&check("fromJSON('[1, 2]').b").1),
        vec!["InvalidDerefReceiver"]
    );
}

#[test]
fn test_index_access() {
    assert_eq!(check(r#"fromJSON('["a"]')[0]"#).0, ExprType::String);
    assert_eq!(check("env['FOO']").0, ExprType::String);
    assert_eq!(check("runner['OS']").0, ExprType::String);
    assert_eq!(check("env[github.actor]").0, ExprType::String);
    assert_eq!(check("github.event[github.actor]").0, ExprType::Any);

    assert_eq!(
        error_names(&check(r#"fromJSON('["a"]')['x']"#).1),
        vec!["InvalidArrayIndex"]
    );
    assert_eq!(error_names(&check("env[1]").1), vec!["InvalidObjectIndex"]);
    assert_eq!(error_names(&check("runner['nope']").1), vec!["UndefinedProperty"]);
    assert_eq!(error_names(&check("github.actor[0]").1), vec!["InvalidIndexOperand"]);
}

#[test]
fn test_operators() {
    assert_eq!(check("!github.actor").0, ExprType::Bool);
    assert_eq!(check("1 == 'a'").0, ExprType::Bool);
    assert_eq!(check("github.actor || 1").0, ExprType::String);
    assert_eq!(check("null || 1").0, ExprType::Any);
    assert_eq!(check("true && false").0, ExprType::Bool);
}

#[test]
fn test_function_calls() {
    assert_eq!(check("contains('abc', 'a')").0, ExprType::Bool);
    assert_eq!(check(r#"contains(fromJSON('["a", "b"]'), 'a')"#).0, ExprType::Bool);
    assert_eq!(check("toJson(github)").0, ExprType::String);
    assert_eq!(check("join(github.event.labels.*.name, ', ')").0, ExprType::String);
    assert_eq!(check("hashFiles('**/a', '**/b')").0, ExprType::String);
}

#[test]
fn test_contains_number_matches_string_overload() {
    let (ty, errors) = check("contains(1, 'a')");

    assert_eq!(ty, ExprType::Bool);
    assert!(errors.is_empty());
}

#[test]
fn test_no_matching_overload() {
    let (ty, errors) = check("contains(true, 'a')");

    assert_eq!(ty, ExprType::Bool);
    assert_eq!(errors.len(), 1);
    match errors[0].get_impl() {
        ErrorImpl::NoMatchingOverload { name, errors } => {
            assert_eq!(name, "contains");
            assert!(errors.contains("contains(string, string) -> bool"));
            assert!(errors.contains("contains(array<any>, any) -> bool"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_argument_errors() {
    let (_, errors) = check("startsWith('a')");
    assert_eq!(error_names(&errors), vec!["UnexpectedArguments"]);

    let (_, errors) = check("format('a')");
    assert_eq!(error_names(&errors), vec!["MissingArguments"]);

    let (_, errors) = check("startsWith('a', fromJSON('[]'))");
    match errors[0].get_impl() {
        ErrorImpl::ArgumentTypeMatchError { ordinal, expected, received, .. } => {
            assert_eq!(ordinal, "2nd");
            assert_eq!(expected, "string");
            assert_eq!(received, "array<any>");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(errors[0].get_column(), 17);
}

#[test]
fn test_undefined_function() {
    let (ty, errors) = check("foo(1)");

    assert_eq!(ty, ExprType::Any);
    assert_eq!(error_names(&errors), vec!["UndefinedFunction"]);
    assert!(errors[0].get_message().contains("\"startswith\""));
}

#[test]
fn test_special_function_availability() {
    let mut checker = SemanticChecker::with_config(&CheckConfig::for_workflow_key("jobs.<job_id>.if"));

    assert!(check_with(&mut checker, "success() && github.ref == 'refs/heads/main'").1.is_empty());

    let (_, errors) = check_with(&mut checker, "hashFiles('a')");
    match errors[0].get_impl() {
        ErrorImpl::SpecialFunctionNotAllowed { name, available_in } => {
            assert_eq!(name, "hashFiles");
            assert!(available_in.contains("\"jobs.<job_id>.steps.run\""));
        }
        other => panic!("unexpected error {:?}", other),
    }

    let (_, errors) = check_with(&mut checker, "env.FOO");
    assert_eq!(
        errors[0].get_message(),
        "context \"env\" is not allowed here. available contexts are \"github\", \"inputs\", \"needs\", \"vars\""
    );
}

#[test]
fn test_format_placeholders() {
    assert_eq!(check("format('{0} and {1}', github.actor, github.sha)").1.len(), 0);

    let (_, errors) = check("format('{0} and {1}', github.actor)");
    assert_eq!(error_names(&errors), vec!["MissingFormatArgument"]);

    let (_, errors) = check("format('{0}', github.actor, github.sha)");
    assert_eq!(error_names(&errors), vec!["UnusedFormatArgument"]);
    assert_eq!(errors[0].get_column(), 29);

    // Escaped braces are not placeholders
    let (_, errors) = check("format('{{0}}', github.actor)");
    assert_eq!(error_names(&errors), vec!["UnusedFormatArgument"]);
}

#[test]
fn test_format_with_non_literal_format_string() {
    assert!(check("format(github.actor, 1, 2)").1.is_empty());
}

#[test]
fn test_from_json_literal() {
    let (ty, errors) = check(r#"fromJSON('{"a": [1, 2], "b": "x"}')"#);

    assert_eq!(
        ty,
        ExprType::strict_object([
            ("a", ExprType::array(ExprType::Number)),
            ("b", ExprType::String),
        ])
    );
    assert!(errors.is_empty());
}

#[test]
fn test_from_json_broken() {
    let (ty, errors) = check("fromJSON('{')");

    assert_eq!(ty, ExprType::Any);
    assert_eq!(error_names(&errors), vec!["BrokenJson"]);
    assert!(errors[0]
        .get_message()
        .starts_with("broken JSON string is passed to fromJSON(): "));
}

#[test]
fn test_from_json_dynamic_is_any() {
    let (ty, errors) = check("fromJSON(inputs.x).anything");

    assert_eq!(ty, ExprType::Any);
    assert!(errors.is_empty());
}

#[test]
fn test_config_variable_names() {
    assert!(check("vars.MY_VAR").1.is_empty());
    assert_eq!(
        error_names(&check("vars.GITHUB_SHA").1),
        vec!["InvalidConfigVariableName"]
    );
    assert_eq!(
        error_names(&check("vars.foo-bar").1),
        vec!["InvalidConfigVariableName"]
    );
}

#[test]
fn test_defined_config_variables() {
    let config = CheckConfig::default().with_config_variables(["DEPLOY_ENV"]);
    let mut checker = SemanticChecker::with_config(&config);

    assert!(check_with(&mut checker, "vars.deploy_env").1.is_empty());
    let (_, errors) = check_with(&mut checker, "vars.OTHER");
    match errors[0].get_impl() {
        ErrorImpl::UndefinedConfigVariable { name, available } => {
            assert_eq!(name, "other");
            assert_eq!(available, "\"DEPLOY_ENV\"");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_config_variable_index_access() {
    assert!(check("vars['MY_VAR']").1.is_empty());
    assert_eq!(
        error_names(&check("vars['GITHUB_X']").1),
        vec!["InvalidConfigVariableName"]
    );
    assert_eq!(
        error_names(&check("vars['1st']").1),
        vec!["InvalidConfigVariableName"]
    );

    let mut checker = SemanticChecker::new();
    checker.set_config_variables(vec!["DEPLOY_ENV".to_string()]);

    assert!(check_with(&mut checker, "vars['Deploy_Env']").1.is_empty());
    let (ty, errors) = check_with(&mut checker, "vars['other']");
    assert_eq!(ty, ExprType::String);
    assert_eq!(error_names(&errors), vec!["UndefinedConfigVariable"]);
    assert_eq!(errors[0].get_column(), 1);
}

#[test]
fn test_checker_is_reusable() {
    let mut checker = SemanticChecker::new();

    assert_eq!(check_with(&mut checker, "foo").1.len(), 1);
    let (ty, errors) = check_with(&mut checker, "github.sha");
    assert_eq!(ty, ExprType::String);
    assert!(errors.is_empty());
}

#[test]
fn test_untrusted_input() {
    let (_, errors) = check_with(&mut taint_checker(), "github.event.issue.title");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_kind(), ErrorKind::Taint);
    assert_eq!(
        errors[0].get_message(),
        "\"github.event.issue.title\" is potentially untrusted"
    );
}

#[test]
fn test_untrusted_input_check_is_opt_in() {
    assert!(check("github.event.issue.title").1.is_empty());
}

#[test]
fn test_untrusted_input_paths() {
    let mut checker = taint_checker();

    for source in [
        "github.head_ref",
        "github.event.pull_request.head.repo.default_branch",
        "github.event.commits[0].message",
        "github.event.commits.*.author.name",
        "github.event.pages[1].page_name",
        "github.event['issue']['title']",
        "contains(github.event.comment.body, 'x')",
        "github.event.issue.title == 'x'",
    ] {
        let (_, errors) = check_with(&mut checker, source);
        assert_eq!(error_names(&errors), vec!["UntrustedInput"], "{}", source);
    }
}

#[test]
fn test_trusted_paths() {
    let mut checker = taint_checker();

    for source in [
        "github.event.issue",
        "github.event.issue.number",
        "github.event.issue.title.foo",
        "github.event.commits.message",
        "github.actor",
    ] {
        let (_, errors) = check_with(&mut checker, source);
        assert!(errors.is_empty(), "{}: {:?}", source, errors);
    }
}

#[test]
fn test_untrusted_input_in_index() {
    let (_, errors) = check_with(&mut taint_checker(), "env[github.event.issue.body]");

    assert_eq!(error_names(&errors), vec!["UntrustedInput"]);
    assert_eq!(errors[0].get_column(), 5);
}

#[test]
fn test_untrusted_inputs_from_object_filter() {
    let (_, errors) = check_with(&mut taint_checker(), "github.event.*.body");

    assert_eq!(errors.len(), 1);
    match errors[0].get_impl() {
        ErrorImpl::UntrustedInputs { paths } => {
            assert!(paths.starts_with("\"github.event.comment.body\", \"github.event.discussion.body\""));
            assert!(paths.contains("\"github.event.issue.body\""));
            assert!(paths.contains("\"github.event.pull_request.body\""));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_filter_then_index_keeps_match() {
    let (_, errors) = check_with(&mut taint_checker(), "github.event.commits.*.message[0]");

    assert_eq!(error_names(&errors), vec!["UntrustedInput"]);
}

#[test]
fn test_taint_and_type_errors_are_independent() {
    let (_, errors) = check_with(&mut taint_checker(), "github.event.issue.title.foo || foo(github.head_ref)");

    assert_eq!(error_names(&errors), vec!["UndefinedFunction", "UntrustedInput"]);
}

#[test]
fn test_untrusted_input_map_paths() {
    let map = UntrustedInputMap::from_paths(&["a.b.*.c", "a.d"]);
    let a = map.root("a").unwrap();
    let b = map.child(a, "b").unwrap();
    let elem = map.child(b, "*").unwrap();
    let c = map.child(elem, "c").unwrap();

    assert!(map.is_leaf(c));
    assert!(!map.is_leaf(b));
    assert_eq!(map.path(c), "a.b.*.c");
    assert_eq!(map.children(a).len(), 2);
    assert_eq!(map.root("b"), None);
}

#[test]
fn test_signature_display() {
    let format = &BUILTIN_FUNC_SIGNATURES["format"][0];
    let contains = &BUILTIN_FUNC_SIGNATURES["contains"][1];

    assert_eq!(format.to_string(), "format(string, any...) -> string");
    assert_eq!(contains.to_string(), "contains(array<any>, any) -> bool");
}

#[test]
fn test_ordinal() {
    assert_eq!(ordinal(1), "1st");
    assert_eq!(ordinal(2), "2nd");
    assert_eq!(ordinal(3), "3rd");
    assert_eq!(ordinal(4), "4th");
    assert_eq!(ordinal(11), "11th");
    assert_eq!(ordinal(12), "12th");
    assert_eq!(ordinal(22), "22nd");
}

#[test]
fn test_format_placeholder_parsing() {
    let placeholders: Vec<usize> = format_placeholders("{0} {{1}} {2}{0} {x}").into_iter().collect();

    assert_eq!(placeholders, vec![0, 2]);
}

#[test]
fn test_workflow_key_availability() {
    let (contexts, funcs) = workflow_key_availability("jobs.<job_id>.steps.run").unwrap();

    assert!(contexts.contains(&"secrets"));
    assert_eq!(funcs, &["hashfiles"]);
    assert!(workflow_key_availability("no.such.key").is_none());
    assert_eq!(
        special_function_keys("success"),
        vec!["jobs.<job_id>.if", "jobs.<job_id>.steps.if"]
    );
}
