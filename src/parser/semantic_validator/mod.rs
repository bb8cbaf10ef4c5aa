//! Checks a parsed script before it becomes a module
//!
//! Each check is a [`ValidationRule`]. A [`Validator`] holds a set of rules
//! and sorts what they find into a [`Report`]: errors reject the module,
//! warnings are logged. `Validator::new()` enables every built-in rule;
//! `without` drops one and `deny_warnings` promotes warnings to errors.

pub mod rules;

use crate::executor::types::ast::Span;

use super::ScriptDef;

/// One finding from a rule
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub span: Span,
    pub message: String,
    pub severity: Severity,
    pub rule_id: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

impl ValidationError {
    pub fn error(span: Span, message: impl Into<String>, rule_id: &'static str) -> Self {
        Self {
            span,
            message: message.into(),
            severity: Severity::Error,
            rule_id,
        }
    }

    pub fn warning(span: Span, message: impl Into<String>, rule_id: &'static str) -> Self {
        Self {
            span,
            message: message.into(),
            severity: Severity::Warning,
            rule_id,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ValidationError {
    // Lines and columns print one-based
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at line {}, col {}: {} [{}]",
            self.severity,
            self.span.start_line + 1,
            self.span.start_col + 1,
            self.message,
            self.rule_id
        )
    }
}

impl std::error::Error for ValidationError {}

/// A single check over a whole script
pub trait ValidationRule: Send + Sync {
    /// Stable id, e.g. "nested-call"; used to disable the rule
    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn validate(&self, script: &ScriptDef, source: &str) -> Vec<ValidationError>;
}

/// Findings split by severity, in rule order
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
}

impl Report {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Errors first, then warnings
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().chain(&self.warnings)
    }
}

/// A configured set of rules
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
    deny_warnings: bool,
}

impl Validator {
    /// Every built-in rule, warnings allowed
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(rules::UndefinedVariableRule),
                Box::new(rules::NestedCallRule),
                Box::new(rules::BreakOutsideLoopRule),
                Box::new(rules::DuplicateFunctionRule),
                Box::new(rules::ReservedNameRule),
                Box::new(rules::UnusedVariableRule),
            ],
            deny_warnings: false,
        }
    }

    /// Drop the rule with `rule_id`; unknown ids are ignored
    pub fn without(mut self, rule_id: &str) -> Self {
        self.rules.retain(|rule| rule.id() != rule_id);
        self
    }

    /// Report warnings as errors
    pub fn deny_warnings(mut self) -> Self {
        self.deny_warnings = true;
        self
    }

    /// Run every rule over `script`
    pub fn validate(&self, script: &ScriptDef, source: &str) -> Vec<ValidationError> {
        self.rules
            .iter()
            .flat_map(|rule| rule.validate(script, source))
            .collect()
    }

    /// Run every rule and split the findings by severity
    pub fn check(&self, script: &ScriptDef, source: &str) -> Report {
        let mut report = Report::default();
        for mut finding in self.validate(script, source) {
            if self.deny_warnings {
                finding.severity = Severity::Error;
            }
            if finding.is_error() {
                report.errors.push(finding);
            } else {
                report.warnings.push(finding);
            }
        }
        report
    }

    /// `(id, description)` of each enabled rule
    pub fn rules(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.rules.iter().map(|r| (r.id(), r.description()))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("rules", &self.rules().map(|(id, _)| id).collect::<Vec<_>>())
            .field("deny_warnings", &self.deny_warnings)
            .finish()
    }
}

/// Run the default rule set
pub fn validate_script(script: &ScriptDef, source: &str) -> Vec<ValidationError> {
    Validator::new().validate(script, source)
}

#[cfg(test)]
mod tests;
