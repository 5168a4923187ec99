//! Process-wide tables of built-in contexts and functions.
//!
//! These are built once on first use and never mutated. Checkers narrow
//! contexts through their own overlay instead.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::ast::types::{ExprType, ObjectType, PropsFallback};

use super::{availability::special_function_keys, functions::FuncSignature};

fn strings(names: &[&str]) -> Vec<(String, ExprType)> {
    names
        .iter()
        .map(|n| (n.to_string(), ExprType::String))
        .collect()
}

fn github_context() -> ExprType {
    let mut github = ObjectType::strict(strings(&[
        "action",
        "action_path",
        "action_ref",
        "action_repository",
        "action_status",
        "actor",
        "actor_id",
        "api_url",
        "base_ref",
        "env",
        "event_name",
        "event_path",
        "graphql_url",
        "head_ref",
        "job",
        "job_workflow_sha",
        "path",
        "ref",
        "ref_name",
        "ref_type",
        "repository",
        "repository_id",
        "repository_owner",
        "repository_owner_id",
        "repositoryurl",
        "run_attempt",
        "run_id",
        "run_number",
        "secret_source",
        "server_url",
        "sha",
        "token",
        "triggering_actor",
        "workflow",
        "workflow_ref",
        "workflow_sha",
        "workspace",
    ]));
    // Payload shape depends on the triggering event
    github.insert("event", ExprType::loose_object());
    github.insert("ref_protected", ExprType::Bool);
    github.insert("retention_days", ExprType::Number);
    ExprType::Object(github)
}

fn job_context() -> ExprType {
    let container = ExprType::strict_object(strings(&["id", "network"]));
    let mut service = ObjectType::strict(strings(&["id", "network"]));
    service.insert("ports", ExprType::mapped_object(ExprType::String));

    ExprType::strict_object([
        ("container", container),
        ("services", ExprType::mapped_object(ExprType::Object(service))),
        ("status", ExprType::String),
    ])
}

fn jobs_context() -> ExprType {
    ExprType::mapped_object(ExprType::strict_object([
        ("result", ExprType::String),
        ("outputs", ExprType::mapped_object(ExprType::String)),
    ]))
}

fn secrets_context() -> ExprType {
    ExprType::Object(ObjectType {
        props: strings(&["github_token"]).into_iter().collect(),
        fallback: PropsFallback::Mapped(Box::new(ExprType::String)),
    })
}

lazy_static! {
    /// Types of the contexts available in expressions, keyed by lowercase
    /// name.
    pub static ref BUILTIN_GLOBAL_VARIABLE_TYPES: HashMap<&'static str, ExprType> = {
        let mut map = HashMap::new();
        map.insert("github", github_context());
        map.insert("env", ExprType::mapped_object(ExprType::String));
        map.insert("job", job_context());
        map.insert("jobs", jobs_context());
        // Narrowed per location
        map.insert("steps", ExprType::Object(ObjectType::empty_strict()));
        map.insert("runner", ExprType::strict_object(strings(&[
            "name",
            "os",
            "arch",
            "temp",
            "tool_cache",
            "debug",
            "environment",
        ])));
        map.insert("secrets", secrets_context());
        map.insert("strategy", ExprType::strict_object([
            ("fail-fast", ExprType::Bool),
            ("job-index", ExprType::Number),
            ("job-total", ExprType::Number),
            ("max-parallel", ExprType::Number),
        ]));
        map.insert("matrix", ExprType::loose_object());
        map.insert("needs", ExprType::Object(ObjectType::empty_strict()));
        map.insert("inputs", ExprType::loose_object());
        map.insert("vars", ExprType::mapped_object(ExprType::String));
        map
    };

    /// Overloads of each built-in function, keyed by lowercase name.
    pub static ref BUILTIN_FUNC_SIGNATURES: HashMap<&'static str, Vec<FuncSignature>> = {
        let mut map = HashMap::new();
        map.insert("contains", vec![
            FuncSignature::new("contains", ExprType::Bool, vec![ExprType::String, ExprType::String]),
            FuncSignature::new("contains", ExprType::Bool, vec![ExprType::array(ExprType::Any), ExprType::Any]),
        ]);
        map.insert("startswith", vec![
            FuncSignature::new("startsWith", ExprType::Bool, vec![ExprType::String, ExprType::String]),
        ]);
        map.insert("endswith", vec![
            FuncSignature::new("endsWith", ExprType::Bool, vec![ExprType::String, ExprType::String]),
        ]);
        map.insert("format", vec![
            FuncSignature::variadic("format", ExprType::String, vec![ExprType::String, ExprType::Any]),
        ]);
        map.insert("join", vec![
            FuncSignature::new("join", ExprType::String, vec![ExprType::array(ExprType::String), ExprType::String]),
            FuncSignature::new("join", ExprType::String, vec![ExprType::array(ExprType::String)]),
        ]);
        map.insert("tojson", vec![
            FuncSignature::new("toJSON", ExprType::String, vec![ExprType::Any]),
        ]);
        map.insert("fromjson", vec![
            FuncSignature::new("fromJSON", ExprType::Any, vec![ExprType::String]),
        ]);
        map.insert("hashfiles", vec![
            FuncSignature::variadic("hashFiles", ExprType::String, vec![ExprType::String]),
        ]);
        map.insert("success", vec![FuncSignature::new("success", ExprType::Bool, vec![])]);
        map.insert("always", vec![FuncSignature::new("always", ExprType::Bool, vec![])]);
        map.insert("cancelled", vec![FuncSignature::new("cancelled", ExprType::Bool, vec![])]);
        map.insert("failure", vec![FuncSignature::new("failure", ExprType::Bool, vec![])]);
        map
    };

    /// Functions only callable at some workflow keys, with those keys.
    pub static ref SPECIAL_FUNCTION_NAMES: HashMap<&'static str, Vec<&'static str>> = {
        let mut map = HashMap::new();
        for name in ["always", "cancelled", "failure", "success", "hashfiles"] {
            map.insert(name, special_function_keys(name));
        }
        map
    };
}
