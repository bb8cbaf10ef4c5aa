//! Rule: Break Outside Loop
//!
//! Reports an error for `break` or `continue` with no enclosing `while` in the
//! same function. Loops never span a function call.

use crate::executor::types::ast::Stmt;
use crate::parser::ScriptDef;

use super::super::{ValidationError, ValidationRule};

pub struct BreakOutsideLoopRule;

impl ValidationRule for BreakOutsideLoopRule {
    fn id(&self) -> &'static str {
        "break-outside-loop"
    }

    fn description(&self) -> &'static str {
        "break and continue must appear inside a while loop"
    }

    fn validate(&self, script: &ScriptDef, _source: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for function in &script.functions {
            check_stmt(&function.body, false, &mut errors, self.id());
        }
        errors
    }
}

fn check_stmt(stmt: &Stmt, in_loop: bool, errors: &mut Vec<ValidationError>, rule_id: &'static str) {
    match stmt {
        Stmt::Break { span } if !in_loop => {
            errors.push(ValidationError::error(*span, "'break' outside of a loop", rule_id));
        }
        Stmt::Continue { span } if !in_loop => {
            errors.push(ValidationError::error(
                *span,
                "'continue' outside of a loop",
                rule_id,
            ));
        }
        Stmt::While { body, .. } => check_stmt(body, true, errors, rule_id),
        Stmt::If { then_s, else_s, .. } => {
            check_stmt(then_s, in_loop, errors, rule_id);
            if let Some(else_stmt) = else_s {
                check_stmt(else_stmt, in_loop, errors, rule_id);
            }
        }
        Stmt::Block { body, .. } => {
            for s in body {
                check_stmt(s, in_loop, errors, rule_id);
            }
        }
        _ => {}
    }
}
