//! Rule: Duplicate Function
//!
//! Reports an error when two functions in one script share a name. The later
//! definition is flagged.

use std::collections::HashMap;

use crate::executor::types::ast::Span;
use crate::parser::ScriptDef;

use super::super::{ValidationError, ValidationRule};

pub struct DuplicateFunctionRule;

impl ValidationRule for DuplicateFunctionRule {
    fn id(&self) -> &'static str {
        "duplicate-function"
    }

    fn description(&self) -> &'static str {
        "Function names must be unique within a script"
    }

    fn validate(&self, script: &ScriptDef, _source: &str) -> Vec<ValidationError> {
        let mut seen: HashMap<&str, Span> = HashMap::new();
        let mut errors = Vec::new();

        for function in &script.functions {
            if let Some(first) = seen.get(function.name.as_str()) {
                errors.push(ValidationError::error(
                    function.span,
                    format!(
                        "Function '{}' is already defined at line {}",
                        function.name,
                        first.start_line + 1
                    ),
                    self.id(),
                ));
            } else {
                seen.insert(&function.name, function.span);
            }
        }

        errors
    }
}
