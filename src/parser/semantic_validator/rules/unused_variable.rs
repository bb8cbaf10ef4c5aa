//! Rule: Unused Variable
//!
//! Reports a warning when a `let` variable is declared but never used.
//!
//! # Notes
//!
//! - Variables starting with `_` are exempt (convention for intentionally unused)
//! - Parameters are exempt; a coroutine entry point may ignore its state
//! - This is a warning, not an error, since unused variables are valid code

use std::collections::{HashMap, HashSet};

use crate::executor::types::ast::{Expr, Span, Stmt};
use crate::parser::ScriptDef;

use super::super::{ValidationError, ValidationRule};

/// Rule that checks for unused variable declarations.
pub struct UnusedVariableRule;

impl ValidationRule for UnusedVariableRule {
    fn id(&self) -> &'static str {
        "unused-variable"
    }

    fn description(&self) -> &'static str {
        "Variables should be used after declaration"
    }

    fn validate(&self, script: &ScriptDef, _source: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for function in &script.functions {
            let mut declarations: HashMap<String, Span> = HashMap::new();
            collect_declarations(&function.body, &mut declarations);

            let mut usages: HashSet<String> = HashSet::new();
            collect_usages(&function.body, &mut usages);

            let mut unused: Vec<(String, Span)> = declarations
                .into_iter()
                .filter(|(name, _)| !name.starts_with('_') && !usages.contains(name))
                .collect();
            // Source order, not hash order
            unused.sort_by_key(|(_, span)| span.start);

            for (name, span) in unused {
                errors.push(ValidationError::warning(
                    span,
                    format!("Variable '{}' is declared but never used", name),
                    self.id(),
                ));
            }
        }

        errors
    }
}

// ============================================================================
// Declaration Collection
// ============================================================================

fn collect_declarations(stmt: &Stmt, declarations: &mut HashMap<String, Span>) {
    match stmt {
        Stmt::Declare {
            name, name_span, ..
        } => {
            declarations.insert(name.clone(), *name_span);
        }

        Stmt::Block { body, .. } => {
            for s in body {
                collect_declarations(s, declarations);
            }
        }

        Stmt::If { then_s, else_s, .. } => {
            collect_declarations(then_s, declarations);
            if let Some(else_stmt) = else_s {
                collect_declarations(else_stmt, declarations);
            }
        }

        Stmt::While { body, .. } => {
            collect_declarations(body, declarations);
        }

        Stmt::Assign { .. }
        | Stmt::Return { .. }
        | Stmt::Expr { .. }
        | Stmt::Break { .. }
        | Stmt::Continue { .. } => {}
    }
}

// ============================================================================
// Usage Collection
// ============================================================================

fn collect_usages(stmt: &Stmt, usages: &mut HashSet<String>) {
    match stmt {
        Stmt::Declare { init, .. } => {
            if let Some(expr) = init {
                collect_expr_usages(expr, usages);
            }
        }

        Stmt::Assign { var, value, .. } => {
            // Assignment to a variable counts as usage
            usages.insert(var.clone());
            collect_expr_usages(value, usages);
        }

        Stmt::If {
            test,
            then_s,
            else_s,
            ..
        } => {
            collect_expr_usages(test, usages);
            collect_usages(then_s, usages);
            if let Some(else_stmt) = else_s {
                collect_usages(else_stmt, usages);
            }
        }

        Stmt::While { test, body, .. } => {
            collect_expr_usages(test, usages);
            collect_usages(body, usages);
        }

        Stmt::Block { body, .. } => {
            for s in body {
                collect_usages(s, usages);
            }
        }

        Stmt::Return { value, .. } => {
            if let Some(expr) = value {
                collect_expr_usages(expr, usages);
            }
        }

        Stmt::Expr { expr, .. } => {
            collect_expr_usages(expr, usages);
        }

        Stmt::Break { .. } | Stmt::Continue { .. } => {}
    }
}

fn collect_expr_usages(expr: &Expr, usages: &mut HashSet<String>) {
    match expr {
        Expr::Ident { name, .. } => {
            usages.insert(name.clone());
        }

        Expr::Member { object, .. } => {
            collect_expr_usages(object, usages);
        }

        Expr::Call { callee, args, .. } => {
            collect_expr_usages(callee, usages);
            for arg in args {
                collect_expr_usages(arg, usages);
            }
        }

        Expr::BinaryOp { left, right, .. } => {
            collect_expr_usages(left, usages);
            collect_expr_usages(right, usages);
        }

        Expr::LitBool { .. } | Expr::LitNum { .. } | Expr::LitStr { .. } | Expr::LitNull { .. } => {
        }
    }
}
