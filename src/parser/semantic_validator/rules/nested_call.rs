//! Rule: Nested Call
//!
//! Reports an error when a call to a script function appears inside an
//! expression rather than as the whole statement. Script calls push a frame
//! (so the callee can suspend), which is only possible at statement level.
//!
//! # Valid
//!
//! ```text
//! walk(state)
//! let d = distance(a, b)
//! d = distance(a, b)
//! return distance(a, b)
//! ```
//!
//! # Invalid
//!
//! ```text
//! let d = distance(a, b) + 1     // call inside binary op
//! Print(distance(a, b))          // call inside call args
//! if (ready(state)) { }          // call in condition
//! x += distance(a, b)            // compound assignment reads x first
//! ```

use std::collections::HashSet;

use crate::executor::types::ast::{Expr, Stmt};
use crate::parser::ScriptDef;

use super::super::{ValidationError, ValidationRule};

/// Rule that checks for script function calls nested inside other expressions.
pub struct NestedCallRule;

impl ValidationRule for NestedCallRule {
    fn id(&self) -> &'static str {
        "nested-call"
    }

    fn description(&self) -> &'static str {
        "Script function calls must be whole statements, not nested in expressions"
    }

    fn validate(&self, script: &ScriptDef, _source: &str) -> Vec<ValidationError> {
        let functions: HashSet<&str> = script.functions.iter().map(|f| f.name.as_str()).collect();
        let mut errors = Vec::new();
        for function in &script.functions {
            check_stmt(&function.body, &functions, &mut errors, self.id());
        }
        errors
    }
}

// ============================================================================
// AST Traversal
// ============================================================================

/// Check a statement, allowing a script call at "top level" positions
fn check_stmt(
    stmt: &Stmt,
    functions: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
    rule_id: &'static str,
) {
    match stmt {
        // These ALLOW a script call as the outermost expression
        Stmt::Expr { expr, .. } => check_top_level_expr(expr, functions, errors, rule_id),

        Stmt::Declare { init, .. } => {
            if let Some(init_expr) = init {
                check_top_level_expr(init_expr, functions, errors, rule_id);
            }
        }

        Stmt::Assign { value, .. } => check_top_level_expr(value, functions, errors, rule_id),

        Stmt::Return { value, .. } => {
            if let Some(expr) = value {
                check_top_level_expr(expr, functions, errors, rule_id);
            }
        }

        // Conditions are always nested positions
        Stmt::If {
            test,
            then_s,
            else_s,
            ..
        } => {
            check_nested_expr(test, functions, errors, rule_id);
            check_stmt(then_s, functions, errors, rule_id);
            if let Some(else_stmt) = else_s {
                check_stmt(else_stmt, functions, errors, rule_id);
            }
        }

        Stmt::While { test, body, .. } => {
            check_nested_expr(test, functions, errors, rule_id);
            check_stmt(body, functions, errors, rule_id);
        }

        Stmt::Block { body, .. } => {
            for stmt in body {
                check_stmt(stmt, functions, errors, rule_id);
            }
        }

        Stmt::Break { .. } | Stmt::Continue { .. } => {}
    }
}

/// The outermost call may target a script function; its arguments may not
fn check_top_level_expr(
    expr: &Expr,
    functions: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
    rule_id: &'static str,
) {
    match expr {
        Expr::Call { callee, args, .. } if is_script_call(expr, functions) => {
            check_nested_expr(callee, functions, errors, rule_id);
            for arg in args {
                check_nested_expr(arg, functions, errors, rule_id);
            }
        }
        _ => check_nested_expr(expr, functions, errors, rule_id),
    }
}

/// Check an expression where script calls are NOT allowed.
fn check_nested_expr(
    expr: &Expr,
    functions: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
    rule_id: &'static str,
) {
    match expr {
        Expr::Call { callee, args, span } => {
            if is_script_call(expr, functions) {
                errors.push(ValidationError::error(
                    *span,
                    format!(
                        "Call to script function '{}' must be a whole statement",
                        expr.direct_callee().unwrap_or_default()
                    ),
                    rule_id,
                ));
            }
            // Report every nested call, not just the first
            check_nested_expr(callee, functions, errors, rule_id);
            for arg in args {
                check_nested_expr(arg, functions, errors, rule_id);
            }
        }

        Expr::BinaryOp { left, right, .. } => {
            check_nested_expr(left, functions, errors, rule_id);
            check_nested_expr(right, functions, errors, rule_id);
        }

        Expr::Member { object, .. } => check_nested_expr(object, functions, errors, rule_id),

        Expr::Ident { .. }
        | Expr::LitBool { .. }
        | Expr::LitNum { .. }
        | Expr::LitStr { .. }
        | Expr::LitNull { .. } => {}
    }
}

fn is_script_call(expr: &Expr, functions: &HashSet<&str>) -> bool {
    expr.direct_callee()
        .is_some_and(|name| functions.contains(name))
}
