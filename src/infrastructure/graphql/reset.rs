use super::{GraphqlError, GraphqlResponse, GraphqlSession};
use crate::domain::reset::{ResetError, ResetProtocol};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

/// One mutation that undoes a piece of state tests are known to perturb
#[derive(Debug, Clone)]
pub struct ResetStep {
    name: String,
    document: String,
    variables: Value,
    /// Variable that receives the session's identity ID, if any
    identity_variable: Option<String>,
    /// Errors matching this pattern mean the target was already absent
    absent_pattern: Option<Regex>,
}

impl ResetStep {
    pub fn new(name: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            document: document.into(),
            variables: Value::Object(serde_json::Map::new()),
            identity_variable: None,
            absent_pattern: None,
        }
    }

    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_identity_variable(mut self, name: impl Into<String>) -> Self {
        self.identity_variable = Some(name.into());
        self
    }

    pub fn absent_when(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.absent_pattern = Some(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn variables_for(&self, session: &GraphqlSession) -> Value {
        let mut variables = self.variables.clone();
        if let (Some(name), Value::Object(map)) = (&self.identity_variable, &mut variables) {
            map.insert(name.clone(), Value::String(session.identity_id().to_string()));
        }
        variables
    }

    /// True when every error says the target state does not exist
    fn is_already_absent(&self, errors: &[GraphqlError]) -> bool {
        match &self.absent_pattern {
            Some(pattern) => errors.iter().all(|e| pattern.is_match(&e.describe())),
            None => false,
        }
    }
}

/// Reset driven by a suite-supplied list of GraphQL mutations, run in order
#[derive(Debug, Clone, Default)]
pub struct GraphqlResetProtocol {
    steps: Vec<ResetStep>,
}

impl GraphqlResetProtocol {
    pub fn new(steps: Vec<ResetStep>) -> Self {
        Self { steps }
    }

    pub fn with_step(mut self, step: ResetStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(&self) -> &[ResetStep] {
        &self.steps
    }
}

#[async_trait]
impl ResetProtocol for GraphqlResetProtocol {
    async fn reset(&self, session: &GraphqlSession) -> Result<(), ResetError> {
        for step in &self.steps {
            let response: GraphqlResponse<Value> = session
                .execute(&step.document, step.variables_for(session))
                .await
                .map_err(|source| ResetError::Transport {
                    step: step.name.clone(),
                    source,
                })?;

            if response.errors.is_empty() {
                tracing::debug!(
                    identity_id = %session.identity_id(),
                    step = %step.name,
                    "Reset step applied"
                );
                continue;
            }

            if step.is_already_absent(&response.errors) {
                tracing::debug!(
                    identity_id = %session.identity_id(),
                    step = %step.name,
                    "Reset target already absent"
                );
                continue;
            }

            let reason = response
                .errors
                .iter()
                .map(GraphqlError::describe)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ResetError::Rejected {
                step: step.name.clone(),
                reason,
            });
        }

        Ok(())
    }
}
