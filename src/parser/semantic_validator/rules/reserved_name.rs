//! Rule: Reserved Name
//!
//! Reports an error when a function or parameter takes the name of a
//! built-in: operator functions (`add`, `lt`, ...) and globals (`Math`, `Vec2`).
//! Operators and globals always resolve first, so such a function could never
//! be called.

use crate::executor::stdlib::{GLOBAL_NAMES, OPERATOR_NAMES};
use crate::parser::ScriptDef;

use super::super::{ValidationError, ValidationRule};

pub struct ReservedNameRule;

fn is_reserved(name: &str) -> bool {
    OPERATOR_NAMES.iter().any(|(op, _)| *op == name) || GLOBAL_NAMES.contains(&name)
}

impl ValidationRule for ReservedNameRule {
    fn id(&self) -> &'static str {
        "reserved-name"
    }

    fn description(&self) -> &'static str {
        "Functions and parameters may not reuse built-in names"
    }

    fn validate(&self, script: &ScriptDef, _source: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for function in &script.functions {
            if is_reserved(&function.name) {
                errors.push(ValidationError::error(
                    function.span,
                    format!("'{}' is a built-in and cannot name a function", function.name),
                    self.id(),
                ));
            }
            for param in &function.params {
                if is_reserved(&param.name) {
                    errors.push(ValidationError::error(
                        param.span,
                        format!("'{}' is a built-in and cannot name a parameter", param.name),
                        self.id(),
                    ));
                }
            }
        }

        errors
    }
}
