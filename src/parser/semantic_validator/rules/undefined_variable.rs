//! Rule: Undefined Variable
//!
//! Reports an error when a variable is used or assigned before it's declared.
//!
//! # Examples
//!
//! ```text
//! // Error: 'x' is used before declaration
//! let y = x + 1
//! let x = 5
//! ```
//!
//! Direct callees (`DeltaTime()`, `walk(state)`) are not variables: they
//! resolve at run time against script functions and host bindings.

use std::collections::HashSet;

use crate::executor::stdlib::{GLOBAL_NAMES, OPERATOR_NAMES};
use crate::executor::types::ast::{Expr, Stmt};
use crate::parser::ScriptDef;

use super::super::{ValidationError, ValidationRule};

/// Rule that checks for undefined variable usage.
pub struct UndefinedVariableRule;

impl ValidationRule for UndefinedVariableRule {
    fn id(&self) -> &'static str {
        "undefined-variable"
    }

    fn description(&self) -> &'static str {
        "Variables must be declared before use"
    }

    fn validate(&self, script: &ScriptDef, _source: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for function in &script.functions {
            let mut scope = Scope::new();
            scope.add_builtins();
            for param in &function.params {
                scope.define(&param.name);
            }
            check_stmt(&function.body, &mut scope, &mut errors, self.id());
        }

        errors
    }
}

// ============================================================================
// Scope Tracking
// ============================================================================

/// Tracks variables in scope.
struct Scope {
    defined: HashSet<String>,
}

impl Scope {
    fn new() -> Self {
        Self {
            defined: HashSet::new(),
        }
    }

    fn define(&mut self, name: &str) {
        self.defined.insert(name.to_string());
    }

    fn is_defined(&self, name: &str) -> bool {
        self.defined.contains(name)
    }

    /// Globals and operator built-ins are always available
    fn add_builtins(&mut self) {
        for name in GLOBAL_NAMES {
            self.define(name);
        }
        for (name, _) in OPERATOR_NAMES {
            self.define(name);
        }
    }

    /// Create a child scope (for blocks, loops, etc.)
    fn child(&self) -> Self {
        Self {
            defined: self.defined.clone(),
        }
    }
}

// ============================================================================
// AST Traversal
// ============================================================================

fn check_stmt(
    stmt: &Stmt,
    scope: &mut Scope,
    errors: &mut Vec<ValidationError>,
    rule_id: &'static str,
) {
    match stmt {
        Stmt::Declare { name, init, .. } => {
            // Check the initializer FIRST (before adding variable to scope)
            // This catches: let x = x + 1
            if let Some(init_expr) = init {
                check_expr(init_expr, scope, errors, rule_id);
            }
            scope.define(name);
        }

        Stmt::Assign {
            var,
            var_span,
            value,
            ..
        } => {
            check_expr(value, scope, errors, rule_id);
            if !scope.is_defined(var) {
                errors.push(ValidationError::error(
                    *var_span,
                    format!("Assignment to undeclared variable '{}'", var),
                    rule_id,
                ));
            }
        }

        Stmt::If {
            test,
            then_s,
            else_s,
            ..
        } => {
            check_expr(test, scope, errors, rule_id);

            let mut then_scope = scope.child();
            check_stmt(then_s, &mut then_scope, errors, rule_id);

            if let Some(else_stmt) = else_s {
                let mut else_scope = scope.child();
                check_stmt(else_stmt, &mut else_scope, errors, rule_id);
            }
        }

        Stmt::While { test, body, .. } => {
            check_expr(test, scope, errors, rule_id);

            let mut body_scope = scope.child();
            check_stmt(body, &mut body_scope, errors, rule_id);
        }

        Stmt::Block { body, .. } => {
            let mut block_scope = scope.child();
            for stmt in body {
                check_stmt(stmt, &mut block_scope, errors, rule_id);
            }
        }

        Stmt::Return { value, .. } => {
            if let Some(expr) = value {
                check_expr(expr, scope, errors, rule_id);
            }
        }

        Stmt::Expr { expr, .. } => {
            check_expr(expr, scope, errors, rule_id);
        }

        Stmt::Break { .. } | Stmt::Continue { .. } => {}
    }
}

fn check_expr(
    expr: &Expr,
    scope: &Scope,
    errors: &mut Vec<ValidationError>,
    rule_id: &'static str,
) {
    match expr {
        Expr::Ident { name, span } => {
            if !scope.is_defined(name) {
                errors.push(ValidationError::error(
                    *span,
                    format!("Undefined variable '{}'", name),
                    rule_id,
                ));
            }
        }

        Expr::Member { object, .. } => {
            // Only check the object, not the property
            check_expr(object, scope, errors, rule_id);
        }

        Expr::Call { callee, args, .. } => {
            if !matches!(callee.as_ref(), Expr::Ident { .. }) {
                check_expr(callee, scope, errors, rule_id);
            }
            for arg in args {
                check_expr(arg, scope, errors, rule_id);
            }
        }

        Expr::BinaryOp { left, right, .. } => {
            check_expr(left, scope, errors, rule_id);
            check_expr(right, scope, errors, rule_id);
        }

        Expr::LitBool { .. } | Expr::LitNum { .. } | Expr::LitStr { .. } | Expr::LitNull { .. } => {
        }
    }
}
