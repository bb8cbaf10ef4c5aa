//! Compiled script modules

use super::Engine;
use crate::executor::FunctionDef;
use crate::parser::ScriptDef;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

struct ModuleInner {
    name: String,
    /// SHA-256 of the source, hex encoded
    version: String,
    /// Source order
    functions: Vec<Rc<FunctionDef>>,
    by_name: HashMap<String, Rc<FunctionDef>>,
    /// `None` for the empty module
    engine: Option<Engine>,
}

/// A compiled script file, shared read-only between contexts
#[derive(Clone)]
pub struct ScriptModule {
    inner: Rc<ModuleInner>,
}

impl ScriptModule {
    pub(super) fn new(name: &str, source: &str, script: ScriptDef, engine: Engine) -> Self {
        let functions: Vec<Rc<FunctionDef>> = script.functions.into_iter().map(Rc::new).collect();
        let by_name = functions
            .iter()
            .map(|f| (f.name.clone(), Rc::clone(f)))
            .collect();

        ScriptModule {
            inner: Rc::new(ModuleInner {
                name: name.to_string(),
                version: hash_source(source),
                functions,
                by_name,
                engine: Some(engine),
            }),
        }
    }

    /// A module with no functions and no engine; nothing resolves in it
    pub fn empty() -> Self {
        ScriptModule {
            inner: Rc::new(ModuleInner {
                name: String::new(),
                version: String::new(),
                functions: Vec::new(),
                by_name: HashMap::new(),
                engine: None,
            }),
        }
    }

    /// True for `ScriptModule::empty()`
    pub fn is_empty(&self) -> bool {
        self.inner.engine.is_none()
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn version(&self) -> &str {
        &self.inner.version
    }

    /// First 8 hex chars of the version
    pub fn short_version(&self) -> &str {
        let version = &self.inner.version;
        &version[..version.len().min(8)]
    }

    /// The engine that compiled this module
    pub fn engine(&self) -> Option<&Engine> {
        self.inner.engine.as_ref()
    }

    pub fn function(&self, name: &str) -> Option<Rc<FunctionDef>> {
        self.inner.by_name.get(name).cloned()
    }

    /// Function names in source order
    pub fn function_names(&self) -> Vec<&str> {
        self.inner.functions.iter().map(|f| f.name.as_str()).collect()
    }

    /// The module's AST as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&ModuleDump {
            name: &self.inner.name,
            version: &self.inner.version,
            functions: self.inner.functions.iter().map(|f| f.as_ref()).collect(),
        })
    }
}

#[derive(Serialize)]
struct ModuleDump<'a> {
    name: &'a str,
    version: &'a str,
    functions: Vec<&'a FunctionDef>,
}

impl fmt::Debug for ScriptModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptModule")
            .field("name", &self.inner.name)
            .field("version", &self.short_version())
            .field("functions", &self.function_names())
            .finish()
    }
}

/// Hash script source using SHA256
fn hash_source(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}
