//! Test helpers for executor tests
//!
//! Common utilities for parsing scripts and building VMs

use crate::executor::errors::{self, ErrorInfo};
use crate::executor::{FunctionDef, Host, Val, VM};
use crate::parser::ScriptDef;
use std::collections::HashMap;
use std::rc::Rc;

/// Native function signature for test hosts
pub type NativeFn = fn(&[Val]) -> Result<Val, ErrorInfo>;

/// In-memory host: script functions, a few natives, and a flat state map
/// keyed by dotted path (`"pos.x"`).
#[derive(Default)]
pub struct TestHost {
    pub functions: HashMap<String, Rc<FunctionDef>>,
    pub natives: HashMap<&'static str, NativeFn>,
    pub state: HashMap<String, Val>,
    /// Names of natives called, in order
    pub calls: Vec<String>,
}

impl TestHost {
    pub fn with_native(mut self, name: &'static str, f: NativeFn) -> Self {
        self.natives.insert(name, f);
        self
    }

    pub fn with_state(mut self, path: &str, value: impl Into<Val>) -> Self {
        self.state.insert(path.to_string(), value.into());
        self
    }
}

impl Host for TestHost {
    fn function(&self, name: &str) -> Option<Rc<FunctionDef>> {
        self.functions.get(name).cloned()
    }

    fn call_native(&mut self, name: &str, args: &[Val]) -> Option<Result<Val, ErrorInfo>> {
        let f = self.natives.get(name)?;
        self.calls.push(name.to_string());
        Some(f(args))
    }

    fn read_state(&self, path: &[&str]) -> Result<Val, ErrorInfo> {
        let key = path.join(".");
        self.state.get(&key).cloned().ok_or_else(|| {
            ErrorInfo::new(errors::STATE_FIELD_ERROR, format!("No field '{}'", key))
        })
    }

    fn write_state(&mut self, path: &[&str], value: Val) -> Result<(), ErrorInfo> {
        let key = path.join(".");
        match self.state.get_mut(&key) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(ErrorInfo::new(
                errors::STATE_FIELD_ERROR,
                format!("No field '{}'", key),
            )),
        }
    }
}

/// Parse script source, validate, serialize/deserialize, and create a VM
///
/// This helper:
/// - Parses the script
/// - Validates the script semantically
/// - Serializes and deserializes (to test round-trip compatibility)
/// - Creates a VM running `entry` with `args`, and a host that knows every function
pub fn parse_script_and_build_vm(source: &str, entry: &str, args: Vec<Val>) -> (VM, TestHost) {
    let script = crate::parser::parse_script(source).expect("Parse script failed");
    let errors = crate::parser::semantic_validator::validate_script(&script, source);
    let validation_errors: Vec<_> = errors.iter().filter(|e| e.is_error()).collect();
    assert!(
        validation_errors.is_empty(),
        "Script validation failed: {:?}",
        validation_errors
    );
    build_vm(script, entry, args)
}

/// Parse script source WITHOUT validation, for testing runtime error behavior.
///
/// Use this helper when testing that the runtime correctly handles errors
/// that semantic validation would catch (undefined variables, nested calls).
pub fn parse_script_without_validation(
    source: &str,
    entry: &str,
    args: Vec<Val>,
) -> (VM, TestHost) {
    let script = crate::parser::parse_script(source).expect("Parse script failed");
    build_vm(script, entry, args)
}

fn build_vm(script: ScriptDef, entry: &str, args: Vec<Val>) -> (VM, TestHost) {
    let json = serde_json::to_string(&script).expect("Script serialization failed");
    let script: ScriptDef = serde_json::from_str(&json).expect("Script deserialization failed");

    let functions: HashMap<String, Rc<FunctionDef>> = script
        .functions
        .into_iter()
        .map(|f| (f.name.clone(), Rc::new(f)))
        .collect();
    let function = functions.get(entry).expect("Entry function not found").clone();

    let vm = VM::new(&function, args).expect("VM creation failed");
    let host = TestHost {
        functions,
        ..TestHost::default()
    };
    (vm, host)
}
