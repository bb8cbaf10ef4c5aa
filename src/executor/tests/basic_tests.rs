//! Tests for statements, scoping and stepping

use super::helpers::parse_script_and_build_vm;
use crate::executor::types::FrameKind;
use crate::executor::{run_until_done, step, Control, Step, Val};

#[test]
fn test_return_literal() {
    let source = "function main() { return 42 }";

    let (mut vm, mut host) = parse_script_and_build_vm(source, "main", vec![]);
    run_until_done(&mut vm, &mut host);

    assert_eq!(vm.control, Control::Return(Val::Num(42.0)));
    assert!(vm.is_done());
}

#[test]
fn test_fall_off_end_returns_null() {
    let source = "function main() { let x = 1 x = 2 }";

    let (mut vm, mut host) = parse_script_and_build_vm(source, "main", vec![]);
    run_until_done(&mut vm, &mut host);

    assert_eq!(vm.control, Control::Return(Val::Null));
}

#[test]
fn test_parameters_are_bound() {
    let source = "function main(a, b) { return a - b }";

    let (mut vm, mut host) =
        parse_script_and_build_vm(source, "main", vec![Val::Num(10.0), Val::Num(4.0)]);
    run_until_done(&mut vm, &mut host);

    assert_eq!(vm.control, Control::Return(Val::Num(6.0)));
}

#[test]
fn test_block_scope_shadowing() {
    // Inner `let` shadows; assignment without `let` writes the outer variable
    let source = r#"
        function main() {
            let x = 1
            let y = 1
            {
                let x = 10
                y = x
            }
            return x + y
        }
    "#;

    let (mut vm, mut host) = parse_script_and_build_vm(source, "main", vec![]);
    run_until_done(&mut vm, &mut host);

    assert_eq!(vm.control, Control::Return(Val::Num(11.0)));
    assert!(vm.scopes.is_empty());
}

#[test]
fn test_if_else() {
    let source = r#"
        function main(n) {
            if (n > 5) {
                return "big"
            } else if (n > 2) {
                return "medium"
            } else {
                return "small"
            }
        }
    "#;

    for (n, expected) in [(9.0, "big"), (3.0, "medium"), (1.0, "small")] {
        let (mut vm, mut host) = parse_script_and_build_vm(source, "main", vec![Val::Num(n)]);
        run_until_done(&mut vm, &mut host);
        assert_eq!(vm.control, Control::Return(Val::Str(expected.to_string())));
    }
}

#[test]
fn test_if_without_else_falls_through() {
    let source = "function main() { let r = 1 if (false) { r = 2 } return r }";

    let (mut vm, mut host) = parse_script_and_build_vm(source, "main", vec![]);
    run_until_done(&mut vm, &mut host);

    assert_eq!(vm.control, Control::Return(Val::Num(1.0)));
}

#[test]
fn test_while_simple_loop() {
    let source = r#"
        function main() {
            let i = 0
            while (i < 3) {
                i += 1
            }
            return i
        }
    "#;

    let (mut vm, mut host) = parse_script_and_build_vm(source, "main", vec![]);
    run_until_done(&mut vm, &mut host);

    assert_eq!(vm.control, Control::Return(Val::Num(3.0)));
}

#[test]
fn test_while_with_break() {
    let source = r#"
        function main() {
            let i = 0
            while (true) {
                if (i >= 5) {
                    break
                }
                i = i + 1
            }
            return i
        }
    "#;

    let (mut vm, mut host) = parse_script_and_build_vm(source, "main", vec![]);
    run_until_done(&mut vm, &mut host);

    assert_eq!(vm.control, Control::Return(Val::Num(5.0)));
}

#[test]
fn test_while_with_continue() {
    // sum of 1..=5 skipping 3
    let source = r#"
        function main() {
            let i = 0
            let sum = 0
            while (i < 5) {
                i = i + 1
                if (i == 3) {
                    continue
                }
                sum = sum + i
            }
            return sum
        }
    "#;

    let (mut vm, mut host) = parse_script_and_build_vm(source, "main", vec![]);
    run_until_done(&mut vm, &mut host);

    assert_eq!(vm.control, Control::Return(Val::Num(12.0)));
}

#[test]
fn test_return_from_inside_loop() {
    let source = r#"
        function main() {
            let i = 0
            while (true) {
                i += 2
                if (i > 6) { return i }
            }
        }
    "#;

    let (mut vm, mut host) = parse_script_and_build_vm(source, "main", vec![]);
    run_until_done(&mut vm, &mut host);

    assert_eq!(vm.control, Control::Return(Val::Num(8.0)));
}

#[test]
fn test_local_object_property_assignment() {
    let source = r#"
        function main() {
            let p = Vec2(1, 2)
            p.x = 5
            p.y *= 3
            return p.x + p.y
        }
    "#;

    let (mut vm, mut host) = parse_script_and_build_vm(source, "main", vec![]);
    run_until_done(&mut vm, &mut host);

    assert_eq!(vm.control, Control::Return(Val::Num(11.0)));
}

#[test]
fn test_step_is_resumable() {
    // The VM can be stopped after any step and continued later
    let source = r#"
        function main() {
            let i = 0
            while (i < 4) { i += 1 }
            return i
        }
    "#;

    let (mut vm, mut host) = parse_script_and_build_vm(source, "main", vec![]);

    // Enter the call and push the body block
    assert_eq!(step(&mut vm, &mut host), Step::Continue);
    assert!(matches!(vm.frames[0].kind, FrameKind::Call { .. }));
    assert_eq!(vm.frames.len(), 2);

    // The block pushes its first statement
    assert_eq!(step(&mut vm, &mut host), Step::Continue);
    assert!(matches!(
        vm.frames.last().map(|f| &f.kind),
        Some(FrameKind::Declare { .. })
    ));

    let mut steps = 2;
    while step(&mut vm, &mut host) == Step::Continue {
        steps += 1;
        assert!(steps < 1_000, "runaway loop");
    }

    assert_eq!(vm.control, Control::Return(Val::Num(4.0)));
}
