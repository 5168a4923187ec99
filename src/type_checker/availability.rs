//! Contexts and special functions available at each workflow key.
//!
//! Keys use the notation of the workflow syntax documentation, e.g.
//! `jobs.<job_id>.steps.run`. All names are lowercase.

const FULL_STEP_CONTEXTS: &[&str] = &[
    "env", "github", "inputs", "job", "matrix", "needs", "runner", "secrets", "steps", "strategy",
    "vars",
];
const JOB_CONTEXTS: &[&str] = &["github", "inputs", "matrix", "needs", "strategy", "vars"];
const STATUS_FUNCS: &[&str] = &["always", "cancelled", "failure", "success"];

/// `(workflow key, contexts, special functions)`
pub const WORKFLOW_KEY_AVAILABILITY: &[(&str, &[&str], &[&str])] = &[
    ("concurrency", &["github", "inputs", "vars"], &[]),
    ("env", &["github", "inputs", "secrets", "vars"], &[]),
    ("jobs.<job_id>.concurrency", JOB_CONTEXTS, &[]),
    ("jobs.<job_id>.container", JOB_CONTEXTS, &[]),
    (
        "jobs.<job_id>.container.credentials",
        &["env", "github", "inputs", "matrix", "needs", "secrets", "strategy", "vars"],
        &[],
    ),
    ("jobs.<job_id>.container.env.<env_id>", FULL_STEP_CONTEXTS, &[]),
    ("jobs.<job_id>.continue-on-error", JOB_CONTEXTS, &[]),
    (
        "jobs.<job_id>.defaults.run",
        &["env", "github", "inputs", "matrix", "needs", "strategy", "vars"],
        &[],
    ),
    (
        "jobs.<job_id>.env",
        &["github", "inputs", "matrix", "needs", "secrets", "strategy", "vars"],
        &[],
    ),
    ("jobs.<job_id>.environment", JOB_CONTEXTS, &[]),
    (
        "jobs.<job_id>.environment.url",
        &["env", "github", "inputs", "job", "matrix", "needs", "runner", "steps", "strategy", "vars"],
        &[],
    ),
    ("jobs.<job_id>.if", &["github", "inputs", "needs", "vars"], STATUS_FUNCS),
    ("jobs.<job_id>.name", JOB_CONTEXTS, &[]),
    ("jobs.<job_id>.outputs.<output_id>", FULL_STEP_CONTEXTS, &[]),
    ("jobs.<job_id>.runs-on", JOB_CONTEXTS, &[]),
    (
        "jobs.<job_id>.secrets.<secrets_id>",
        &["github", "inputs", "matrix", "needs", "secrets", "strategy", "vars"],
        &[],
    ),
    ("jobs.<job_id>.services", JOB_CONTEXTS, &[]),
    (
        "jobs.<job_id>.services.<service_id>.credentials",
        &["env", "github", "inputs", "matrix", "needs", "secrets", "strategy", "vars"],
        &[],
    ),
    ("jobs.<job_id>.services.<service_id>.env.<env_id>", FULL_STEP_CONTEXTS, &[]),
    ("jobs.<job_id>.steps.continue-on-error", FULL_STEP_CONTEXTS, &["hashfiles"]),
    ("jobs.<job_id>.steps.env", FULL_STEP_CONTEXTS, &["hashfiles"]),
    (
        "jobs.<job_id>.steps.if",
        &["env", "github", "inputs", "job", "matrix", "needs", "runner", "steps", "strategy", "vars"],
        &["always", "cancelled", "failure", "hashfiles", "success"],
    ),
    ("jobs.<job_id>.steps.name", FULL_STEP_CONTEXTS, &["hashfiles"]),
    ("jobs.<job_id>.steps.run", FULL_STEP_CONTEXTS, &["hashfiles"]),
    ("jobs.<job_id>.steps.timeout-minutes", FULL_STEP_CONTEXTS, &["hashfiles"]),
    ("jobs.<job_id>.steps.with", FULL_STEP_CONTEXTS, &["hashfiles"]),
    ("jobs.<job_id>.steps.working-directory", FULL_STEP_CONTEXTS, &["hashfiles"]),
    ("jobs.<job_id>.strategy", &["github", "inputs", "needs", "vars"], &[]),
    ("jobs.<job_id>.timeout-minutes", JOB_CONTEXTS, &[]),
    ("jobs.<job_id>.with.<with_id>", JOB_CONTEXTS, &[]),
    ("on.workflow_call.inputs.<inputs_id>.default", &["github", "inputs", "vars"], &[]),
    (
        "on.workflow_call.outputs.<output_id>.value",
        &["github", "inputs", "jobs", "vars"],
        &[],
    ),
    ("run-name", &["github", "inputs", "vars"], &[]),
];

/// Contexts and special functions available at `key`, or `None` when the
/// key is unknown.
pub fn workflow_key_availability(key: &str) -> Option<(&'static [&'static str], &'static [&'static str])> {
    let key = key.to_lowercase();
    WORKFLOW_KEY_AVAILABILITY
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, contexts, funcs)| (*contexts, *funcs))
}

/// Workflow keys where the special function `name` may be called, sorted.
pub fn special_function_keys(name: &str) -> Vec<&'static str> {
    let name = name.to_lowercase();
    let mut keys: Vec<&'static str> = WORKFLOW_KEY_AVAILABILITY
        .iter()
        .filter(|(_, _, funcs)| funcs.contains(&name.as_str()))
        .map(|(key, _, _)| *key)
        .collect();
    keys.sort();
    keys
}
