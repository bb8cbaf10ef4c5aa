//! Tests for the semantic validation system

use super::*;
use crate::parser::parse_script;

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse source and validate, returning errors
fn validate(source: &str) -> Vec<ValidationError> {
    let script = parse_script(source).expect("Parse should succeed");
    validate_script(&script, source)
}

/// Check if errors contain a specific rule
fn has_rule(errors: &[ValidationError], rule_id: &str) -> bool {
    errors.iter().any(|e| e.rule_id == rule_id)
}

/// Get errors for a specific rule
fn for_rule<'a>(errors: &'a [ValidationError], rule_id: &str) -> Vec<&'a ValidationError> {
    errors.iter().filter(|e| e.rule_id == rule_id).collect()
}

// ============================================================================
// Undefined Variable Tests
// ============================================================================

#[test]
fn test_undefined_variable_simple() {
    let source = "function f() { let y = x + 1 return y }";

    let errors = validate(source);
    let undef_errors = for_rule(&errors, "undefined-variable");
    assert_eq!(undef_errors.len(), 1);
    assert!(undef_errors[0].message.contains("'x'"));
}

#[test]
fn test_undefined_variable_ok_when_declared() {
    let source = r#"
function f() {
    let x = 5
    let y = x + 1
    return y
}
"#;

    let errors = validate(source);
    assert!(!has_rule(&errors, "undefined-variable"));
}

#[test]
fn test_undefined_variable_params_and_builtins_ok() {
    let source = r#"
function UpdateCat(state: CatState) {
    let speed = Math.max(40, 60)
    state.pos = Vec2(0, 0)
    state.pos.y -= speed * DeltaTime()
    Yield()
}
"#;

    let errors = validate(source);
    let undef_errors = for_rule(&errors, "undefined-variable");
    assert!(
        undef_errors.is_empty(),
        "Params, globals and host callees should not be flagged: {:?}",
        undef_errors
    );
}

#[test]
fn test_undefined_variable_self_reference() {
    let source = "function f() { let x = x + 1 }";

    let errors = validate(source);
    assert!(has_rule(&errors, "undefined-variable"));
}

#[test]
fn test_undefined_variable_assignment_target() {
    let source = "function f() { total = 1 }";

    let errors = validate(source);
    let undef_errors = for_rule(&errors, "undefined-variable");
    assert_eq!(undef_errors.len(), 1);
    assert!(undef_errors[0].message.contains("'total'"));
}

#[test]
fn test_undefined_variable_block_scope() {
    // Variables declared inside a block are gone after it
    let source = r#"
function f() {
    if (true) {
        let inner = 1
        inner = 2
    }
    return inner
}
"#;

    let errors = validate(source);
    assert_eq!(for_rule(&errors, "undefined-variable").len(), 1);
}

#[test]
fn test_undefined_variable_functions_do_not_share_locals() {
    let source = r#"
function a() { let shared = 1 return shared }
function b() { return shared }
"#;

    let errors = validate(source);
    assert_eq!(for_rule(&errors, "undefined-variable").len(), 1);
}

// ============================================================================
// Nested Call Tests
// ============================================================================

#[test]
fn test_nested_call_statement_level_ok() {
    let source = r#"
function helper(s) { return 1 }
function main(s) {
    helper(s)
    let a = helper(s)
    a = helper(s)
    return helper(s)
}
"#;

    let errors = validate(source);
    assert!(!has_rule(&errors, "nested-call"), "{:?}", errors);
}

#[test]
fn test_nested_call_in_binary_op() {
    let source = r#"
function helper() { return 1 }
function main() { let a = helper() + 1 return a }
"#;

    let errors = validate(source);
    let nested = for_rule(&errors, "nested-call");
    assert_eq!(nested.len(), 1);
    assert!(nested[0].message.contains("'helper'"));
}

#[test]
fn test_nested_call_in_argument_and_condition() {
    let source = r#"
function helper() { return 1 }
function main() {
    Print(helper())
    if (helper()) { return 1 }
    while (helper()) { break }
}
"#;

    let errors = validate(source);
    assert_eq!(for_rule(&errors, "nested-call").len(), 3);
}

#[test]
fn test_nested_call_compound_assignment() {
    // x += helper() reads as x = add(x, helper())
    let source = r#"
function helper() { return 1 }
function main() { let x = 0 x += helper() return x }
"#;

    let errors = validate(source);
    assert!(has_rule(&errors, "nested-call"));
}

#[test]
fn test_nested_call_host_functions_ok() {
    // Host bindings may appear anywhere
    let source = "function main() { let a = DeltaTime() * 2 + Random(1, 2) return a }";

    let errors = validate(source);
    assert!(!has_rule(&errors, "nested-call"));
}

// ============================================================================
// Break Outside Loop Tests
// ============================================================================

#[test]
fn test_break_outside_loop() {
    let source = "function f() { if (true) { break } continue }";

    let errors = validate(source);
    assert_eq!(for_rule(&errors, "break-outside-loop").len(), 2);
}

#[test]
fn test_break_inside_loop_ok() {
    let source = r#"
function f() {
    while (true) {
        if (false) { continue }
        break
    }
}
"#;

    let errors = validate(source);
    assert!(!has_rule(&errors, "break-outside-loop"));
}

// ============================================================================
// Duplicate Function / Reserved Name Tests
// ============================================================================

#[test]
fn test_duplicate_function() {
    let source = "function f() {}\nfunction g() {}\nfunction f() {}";

    let errors = validate(source);
    let dupes = for_rule(&errors, "duplicate-function");
    assert_eq!(dupes.len(), 1);
    assert_eq!(dupes[0].span.start_line, 2);
    assert!(dupes[0].message.contains("line 1"));
}

#[test]
fn test_reserved_function_name() {
    let source = "function add(a, b) { return a } function Math() {}";

    let errors = validate(source);
    assert_eq!(for_rule(&errors, "reserved-name").len(), 2);
}

#[test]
fn test_reserved_parameter_name() {
    let source = "function f(lt) { return lt }";

    let errors = validate(source);
    assert_eq!(for_rule(&errors, "reserved-name").len(), 1);
}

// ============================================================================
// Unused Variable Tests
// ============================================================================

#[test]
fn test_unused_variable_is_warning() {
    let source = "function f() { let x = 5 let _y = 1 let z = 2 return z }";

    let errors = validate(source);
    let unused = for_rule(&errors, "unused-variable");
    assert_eq!(unused.len(), 1);
    assert!(unused[0].message.contains("'x'"));
    assert_eq!(unused[0].severity, Severity::Warning);
    let report = Validator::new().check(&parse_script(source).expect("Parse should succeed"), source);
    assert!(!report.has_errors());
    assert_eq!(report.warnings.len(), 1);
}

// ============================================================================
// Validator
// ============================================================================

#[test]
fn test_clean_script_has_no_diagnostics() {
    let source = r#"
function UpdateCat(state: CatState) {
    let speed = 60
    while (state.pos.y > -100) {
        state.pos.y -= speed * DeltaTime()
        Yield()
    }
}
"#;

    let errors = validate(source);
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn test_rules_listed() {
    let ids: Vec<_> = Validator::new().rules().map(|(id, _)| id).collect();
    assert!(ids.contains(&"nested-call"));
    assert!(ids.contains(&"undefined-variable"));
    assert_eq!(ids.len(), 6);
}

#[test]
fn test_without_drops_rule() {
    let source = "function f() { let x = 5 return nope }";
    let script = parse_script(source).expect("Parse should succeed");

    let validator = Validator::new().without("undefined-variable");
    assert_eq!(validator.rules().count(), 5);

    let report = validator.check(&script, source);
    assert!(!report.has_errors());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].rule_id, "unused-variable");

    // Unknown ids change nothing
    assert_eq!(Validator::new().without("no-such-rule").rules().count(), 6);
}

#[test]
fn test_deny_warnings() {
    let source = "function f() { let x = 5 }";
    let script = parse_script(source).expect("Parse should succeed");

    let lenient = Validator::new().check(&script, source);
    assert!(!lenient.has_errors());
    assert!(!lenient.is_clean());

    let strict = Validator::new().deny_warnings().check(&script, source);
    assert_eq!(strict.errors.len(), 1);
    assert!(strict.warnings.is_empty());
    assert!(strict.errors[0].to_string().starts_with("error at line 1"));
}

#[test]
fn test_report_lists_errors_first() {
    let source = "function f() { let x = 5 return nope }";
    let script = parse_script(source).expect("Parse should succeed");

    let report = Validator::new().check(&script, source);
    let ids: Vec<_> = report.iter().map(|e| e.rule_id).collect();
    assert_eq!(ids, vec!["undefined-variable", "unused-variable"]);
}

#[test]
fn test_display_is_one_based() {
    let errors = validate("function f() {\n  return nope\n}");
    let text = errors[0].to_string();
    assert!(text.starts_with("error at line 2, col 10"), "{}", text);
    assert!(text.ends_with("[undefined-variable]"));
}
