use std::collections::{BTreeMap, HashMap};

use stepcore::value::traverse_map;
use stepcore::{Reference, StateResolutionError, Value, ValueMap};

/// Per-run data: the user's inputs plus the output of every finished step.
#[derive(Debug, Clone, Default)]
pub struct StateManager {
    user_inputs: ValueMap,
    step_outputs: HashMap<String, ValueMap>,
}

impl StateManager {
    pub fn new(user_inputs: ValueMap) -> Self {
        Self {
            user_inputs,
            step_outputs: HashMap::new(),
        }
    }

    pub fn set_user_inputs(&mut self, inputs: ValueMap) {
        self.user_inputs = inputs;
    }

    pub fn user_inputs(&self) -> &ValueMap {
        &self.user_inputs
    }

    pub fn store_step_output(&mut self, step_id: impl Into<String>, output: ValueMap) {
        self.step_outputs.insert(step_id.into(), output);
    }

    pub fn step_output(&self, step_id: &str) -> Option<&ValueMap> {
        self.step_outputs.get(step_id)
    }

    /// Resolve every entry of an input mapping. The first unresolvable
    /// reference fails the whole mapping.
    pub fn resolve(
        &self,
        input_mapping: &BTreeMap<String, String>,
    ) -> Result<ValueMap, StateResolutionError> {
        input_mapping
            .iter()
            .map(|(param, expr)| Ok((param.clone(), self.resolve_reference(expr)?)))
            .collect()
    }

    /// Resolve a single reference expression to a value.
    pub fn resolve_reference(&self, expr: &str) -> Result<Value, StateResolutionError> {
        match Reference::parse(expr) {
            Reference::UserInput(key) => self
                .user_inputs
                .get(key)
                .cloned()
                .ok_or_else(|| StateResolutionError::MissingUserInput(key.to_string())),
            Reference::StepOutput { step_id, path } => {
                let output = self
                    .step_outputs
                    .get(step_id)
                    .ok_or_else(|| StateResolutionError::MissingStepOutput(step_id.to_string()))?;
                traverse_map(output, &path)
                    .cloned()
                    .map_err(|source| StateResolutionError::Path {
                        step_id: step_id.to_string(),
                        source,
                    })
            }
            Reference::Literal(literal) => Ok(Value::String(literal.to_string())),
        }
    }
}
