//! Parser tests - verify parsing and AST structure
//!
//! These tests verify that the parser correctly converts source code into AST structures.
//! They do NOT execute the code - that's tested in the executor tests.

use crate::executor::types::ast::{BinaryOp, Expr, Stmt};
use crate::parser::{self, ParseError};

/// Name of the operator built-in a call lowers to
fn callee_name(expr: &Expr) -> &str {
    expr.direct_callee().unwrap_or("<not a direct call>")
}

/* ===================== Literals ===================== */

#[test]
fn test_parse_return_number() {
    let ast = parser::parse("return 42").expect("Should parse");

    match ast {
        Stmt::Return {
            value: Some(Expr::LitNum { v, .. }),
            ..
        } => assert_eq!(v, 42.0),
        _ => panic!("Expected Return with LitNum, got {:?}", ast),
    }
}

#[test]
fn test_parse_return_negative_number_is_folded() {
    let ast = parser::parse("return -3.5").expect("Should parse");

    match ast {
        Stmt::Return {
            value: Some(Expr::LitNum { v, .. }),
            ..
        } => assert_eq!(v, -3.5),
        _ => panic!("Expected Return with LitNum, got {:?}", ast),
    }
}

#[test]
fn test_parse_literals() {
    for (source, check) in [
        ("return true", "bool"),
        ("return null", "null"),
        (r#"return "a\"b\n""#, "str"),
    ] {
        let ast = parser::parse(source).expect("Should parse");
        let Stmt::Return {
            value: Some(expr), ..
        } = ast
        else {
            panic!("Expected Return, got {:?}", ast);
        };
        match (check, expr) {
            ("bool", Expr::LitBool { v, .. }) => assert!(v),
            ("null", Expr::LitNull { .. }) => {}
            ("str", Expr::LitStr { v, .. }) => assert_eq!(v, "a\"b\n"),
            (_, other) => panic!("Unexpected literal for {}: {:?}", source, other),
        }
    }
}

#[test]
fn test_parse_bare_return() {
    let ast = parser::parse("return;").expect("Should parse");
    assert!(matches!(ast, Stmt::Return { value: None, .. }));
}

/* ===================== Operators ===================== */

#[test]
fn test_parse_precedence() {
    // 1 + 2 * 3 -> add(1, mul(2, 3))
    let ast = parser::parse("return 1 + 2 * 3").expect("Should parse");
    let Stmt::Return {
        value: Some(expr), ..
    } = ast
    else {
        panic!("Expected Return");
    };

    assert_eq!(callee_name(&expr), "add");
    let Expr::Call { args, .. } = &expr else {
        unreachable!()
    };
    assert!(matches!(args[0], Expr::LitNum { v, .. } if v == 1.0));
    assert_eq!(callee_name(&args[1]), "mul");
}

#[test]
fn test_parse_comparison_and_logic() {
    let ast = parser::parse("return a < b && !c || d % 2 != 0").expect("Should parse");
    let Stmt::Return {
        value: Some(expr), ..
    } = ast
    else {
        panic!("Expected Return");
    };

    // || binds loosest
    let Expr::BinaryOp {
        op: BinaryOp::Or,
        left,
        right,
        ..
    } = expr
    else {
        panic!("Expected Or, got {:?}", expr);
    };
    let Expr::BinaryOp {
        op: BinaryOp::And,
        left: lt,
        right: not,
        ..
    } = *left
    else {
        panic!("Expected And");
    };
    assert_eq!(callee_name(&lt), "lt");
    assert_eq!(callee_name(&not), "not");
    assert_eq!(callee_name(&right), "ne");
}

#[test]
fn test_parse_negation_of_expression() {
    let ast = parser::parse("return -x").expect("Should parse");
    let Stmt::Return {
        value: Some(expr), ..
    } = ast
    else {
        panic!("Expected Return");
    };
    assert_eq!(callee_name(&expr), "neg");
}

#[test]
fn test_parse_left_associative() {
    // 10 - 3 - 2 -> sub(sub(10, 3), 2)
    let ast = parser::parse("return 10 - 3 - 2").expect("Should parse");
    let Stmt::Return {
        value: Some(Expr::Call { args, .. }),
        ..
    } = ast
    else {
        panic!("Expected call");
    };
    assert_eq!(callee_name(&args[0]), "sub");
    assert!(matches!(args[1], Expr::LitNum { v, .. } if v == 2.0));
}

/* ===================== Statements ===================== */

#[test]
fn test_parse_declare() {
    let ast = parser::parse("let speed = 60;").expect("Should parse");
    match ast {
        Stmt::Declare {
            name,
            init: Some(Expr::LitNum { v, .. }),
            ..
        } => {
            assert_eq!(name, "speed");
            assert_eq!(v, 60.0);
        }
        _ => panic!("Expected Declare, got {:?}", ast),
    }

    let ast = parser::parse("let empty").expect("Should parse");
    assert!(matches!(ast, Stmt::Declare { init: None, .. }));
}

#[test]
fn test_parse_member_assign() {
    let ast = parser::parse("state.pos.y = 5").expect("Should parse");
    match ast {
        Stmt::Assign { var, path, .. } => {
            assert_eq!(var, "state");
            assert_eq!(path, vec!["pos".to_string(), "y".to_string()]);
        }
        _ => panic!("Expected Assign, got {:?}", ast),
    }
}

#[test]
fn test_parse_compound_assign_lowers_to_operator() {
    let ast = parser::parse("state.pos.y -= speed * dt").expect("Should parse");
    let Stmt::Assign {
        var, path, value, ..
    } = ast
    else {
        panic!("Expected Assign");
    };
    assert_eq!(var, "state");
    assert_eq!(path.len(), 2);

    // value = sub(state.pos.y, mul(speed, dt))
    assert_eq!(callee_name(&value), "sub");
    let Expr::Call { args, .. } = &value else {
        unreachable!()
    };
    match &args[0] {
        Expr::Member {
            object, property, ..
        } => {
            assert_eq!(property, "y");
            assert!(matches!(object.as_ref(), Expr::Member { property, .. } if property == "pos"));
        }
        other => panic!("Expected member read, got {:?}", other),
    }
    assert_eq!(callee_name(&args[1]), "mul");
}

#[test]
fn test_parse_equality_is_not_assignment() {
    let ast = parser::parse("x == 1").expect("Should parse");
    match ast {
        Stmt::Expr { expr, .. } => assert_eq!(callee_name(&expr), "eq"),
        _ => panic!("Expected expression statement, got {:?}", ast),
    }
}

#[test]
fn test_parse_if_else_chain() {
    let ast = parser::parse("if (a) { x = 1 } else if (b) { x = 2 } else x = 3").expect("Should parse");
    let Stmt::If {
        else_s: Some(else_s),
        ..
    } = ast
    else {
        panic!("Expected If with else");
    };
    assert!(matches!(
        else_s.as_ref(),
        Stmt::If {
            else_s: Some(_),
            ..
        }
    ));
}

#[test]
fn test_parse_while_with_break_continue() {
    let ast = parser::parse("while (true) { if (a) { continue } break }").expect("Should parse");
    let Stmt::While { body, .. } = ast else {
        panic!("Expected While");
    };
    let Stmt::Block { body, .. } = *body else {
        panic!("Expected Block");
    };
    assert_eq!(body.len(), 2);
    assert!(matches!(body[1], Stmt::Break { .. }));
}

#[test]
fn test_parse_keyword_prefixed_identifiers() {
    // Identifiers that start with a keyword are still identifiers
    let ast = parser::parse("breakpoint = returned").expect("Should parse");
    match ast {
        Stmt::Assign { var, value, .. } => {
            assert_eq!(var, "breakpoint");
            assert!(matches!(value, Expr::Ident { name, .. } if name == "returned"));
        }
        _ => panic!("Expected Assign, got {:?}", ast),
    }
}

#[test]
fn test_parse_call_chain() {
    let ast = parser::parse("Math.max(1, 2,)").expect("Should parse");
    let Stmt::Expr {
        expr: Expr::Call { callee, args, .. },
        ..
    } = ast
    else {
        panic!("Expected call statement");
    };
    assert_eq!(args.len(), 2);
    assert!(matches!(callee.as_ref(), Expr::Member { property, .. } if property == "max"));
}

/* ===================== Scripts ===================== */

#[test]
fn test_parse_script_functions() {
    let source = r#"
// Moves a cat upwards
function UpdateCat(state: CatState) {
    let speed = 60
    while (state.pos.y > -100) {
        state.pos.y -= speed * DeltaTime()
        Yield()
    }
}

/* no params */
function Idle() {}
"#;

    let script = parser::parse_script(source).expect("Should parse");
    assert_eq!(script.functions.len(), 2);

    let update = &script.functions[0];
    assert_eq!(update.name, "UpdateCat");
    assert_eq!(update.params.len(), 1);
    assert_eq!(update.params[0].name, "state");
    assert_eq!(update.params[0].type_name.as_deref(), Some("CatState"));
    assert_eq!(update.span.start_line, 2);

    let idle = &script.functions[1];
    assert!(idle.params.is_empty());
    assert!(matches!(&idle.body, Stmt::Block { body, .. } if body.is_empty()));
}

#[test]
fn test_parse_empty_script() {
    let script = parser::parse_script("  // nothing here\n").expect("Should parse");
    assert!(script.functions.is_empty());
}

#[test]
fn test_parse_error_has_location() {
    let err = parser::parse_script("function f() {\n  let = 1\n}").expect_err("Should fail");
    assert!(matches!(err, ParseError::PestError(..)));
    let span = err.span().expect("pest errors carry a span");
    assert_eq!(span.start_line, 1);
}

#[test]
fn test_parse_rejects_top_level_statements() {
    assert!(parser::parse_script("let x = 1").is_err());
}

#[test]
fn test_script_json_round_trip() {
    let source = "function f(s) { s.n += 1 Yield() return s.n }";
    let script = parser::parse_script(source).expect("Should parse");
    let json = serde_json::to_string(&script).expect("serialize");
    let back: parser::ScriptDef = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.functions[0].name, "f");
    assert_eq!(serde_json::to_string(&back).expect("serialize"), json);
}
