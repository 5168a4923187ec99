use crate::type_checker::availability::workflow_key_availability;

/// Configuration of the location an expression is checked at.
///
/// `None` allow-lists mean the location does not restrict that kind of
/// name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckConfig {
    pub check_untrusted_input: bool,
    pub available_contexts: Option<Vec<String>>,
    pub available_special_funcs: Option<Vec<String>>,
    /// Names of `vars.*` configuration variables known to exist.
    pub config_variables: Option<Vec<String>>,
}

impl CheckConfig {
    /// Configuration for an expression at a workflow key such as
    /// `jobs.<job_id>.steps.run`. Unknown keys are unrestricted.
    pub fn for_workflow_key(key: &str) -> Self {
        let mut config = CheckConfig::default();
        if let Some((contexts, funcs)) = workflow_key_availability(key) {
            config.available_contexts = Some(contexts.iter().map(|s| s.to_string()).collect());
            config.available_special_funcs = Some(funcs.iter().map(|s| s.to_string()).collect());
        } else {
            tracing::debug!(key, "unknown workflow key, availability is unrestricted");
        }
        config
    }

    pub fn with_untrusted_input_check(mut self, enabled: bool) -> Self {
        self.check_untrusted_input = enabled;
        self
    }

    pub fn with_config_variables<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.config_variables = Some(names.into_iter().map(Into::into).collect());
        self
    }
}
