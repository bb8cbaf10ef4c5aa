//! Script engine: compiles modules and hands out execution contexts
//!
//! ```ignore
//! let engine = Engine::new();
//! engine.register_fn("DeltaTime", |_| Ok(Val::Num(1.0 / 60.0)));
//! let module = engine.load_file("scripts/cats.tks")?;
//! let mut ctx = engine.create_context(&module);
//! ```
//!
//! Everything here is single-threaded (`Rc`-based). Contexts are stepped
//! from the host's tick loop and never cross threads.

pub mod active;
mod bindings;
pub mod context;
pub mod module;


pub use context::{ContextError, ExecutionContext, ExecutionStatus};
pub use module::ScriptModule;

use crate::executor::{ErrorInfo, Val};
use crate::parser::semantic_validator::{ValidationError, Validator};
use crate::parser::{parse_script, ParseError};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, warn};

/// A host function callable from scripts
pub type NativeFn = Rc<dyn Fn(&[Val]) -> Result<Val, ErrorInfo>>;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to read script {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse module '{module}': {error}")]
    Parse {
        module: String,
        #[source]
        error: ParseError,
    },

    #[error("module '{module}' failed validation with {} error(s)", .errors.len())]
    Validation {
        module: String,
        errors: Vec<ValidationError>,
    },
}

/// Counters for the engine's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub modules_compiled: u64,
    pub contexts_created: u64,
    pub contexts_released: u64,
}

impl EngineStats {
    /// Contexts created and not yet released
    pub fn contexts_live(&self) -> u64 {
        self.contexts_created - self.contexts_released
    }
}

#[derive(Default)]
struct Counters {
    modules_compiled: Cell<u64>,
    contexts_created: Cell<u64>,
    contexts_released: Cell<u64>,
}

struct EngineShared {
    natives: RefCell<HashMap<String, NativeFn>>,
    validator: Validator,
    counters: Counters,
}

/// Cheap to clone; clones share natives and counters
#[derive(Clone)]
pub struct Engine {
    shared: Rc<EngineShared>,
}

impl Engine {
    /// Create an engine with the built-in bindings (`Yield`, `Print`)
    pub fn new() -> Self {
        Self::with_validator(Validator::new())
    }

    /// Like [`Engine::new`], checking compiled sources with `validator`
    pub fn with_validator(validator: Validator) -> Self {
        let natives = bindings::builtin_bindings()
            .into_iter()
            .map(|(name, f)| (name.to_string(), f))
            .collect();

        Engine {
            shared: Rc::new(EngineShared {
                natives: RefCell::new(natives),
                validator,
                counters: Counters::default(),
            }),
        }
    }

    /// Register a host function; replaces any binding with the same name
    pub fn register_fn<F>(&self, name: &str, f: F)
    where
        F: Fn(&[Val]) -> Result<Val, ErrorInfo> + 'static,
    {
        debug!(name, "registered host function");
        self.shared
            .natives
            .borrow_mut()
            .insert(name.to_string(), Rc::new(f));
    }

    /// Look up a host function
    pub fn native(&self, name: &str) -> Option<NativeFn> {
        self.shared.natives.borrow().get(name).cloned()
    }

    /// Parse and validate `source` into a module named `name`
    ///
    /// Validation errors reject the module; warnings are logged.
    pub fn compile(&self, name: &str, source: &str) -> Result<ScriptModule, CompileError> {
        let script = parse_script(source).map_err(|error| CompileError::Parse {
            module: name.to_string(),
            error,
        })?;

        let report = self.shared.validator.check(&script, source);
        for warning in &report.warnings {
            warn!(module = name, "{}", warning);
        }
        if report.has_errors() {
            return Err(CompileError::Validation {
                module: name.to_string(),
                errors: report.errors,
            });
        }

        let module = ScriptModule::new(name, source, script, self.clone());
        bump(&self.shared.counters.modules_compiled);
        debug!(
            module = name,
            version = %module.short_version(),
            functions = module.function_names().len(),
            "compiled module"
        );
        Ok(module)
    }

    /// Compile a script file; the module is named after the file stem
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ScriptModule, CompileError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.compile(&name, &source)
    }

    /// Allocate a fresh, unprepared context for `module`
    pub fn create_context(&self, module: &ScriptModule) -> ExecutionContext {
        bump(&self.shared.counters.contexts_created);
        ExecutionContext::new(self.clone(), module.clone())
    }

    pub fn stats(&self) -> EngineStats {
        let counters = &self.shared.counters;
        EngineStats {
            modules_compiled: counters.modules_compiled.get(),
            contexts_created: counters.contexts_created.get(),
            contexts_released: counters.contexts_released.get(),
        }
    }

    pub(crate) fn note_released(&self) {
        bump(&self.shared.counters.contexts_released);
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut natives: Vec<String> = self.shared.natives.borrow().keys().cloned().collect();
        natives.sort();
        f.debug_struct("Engine")
            .field("natives", &natives)
            .field("stats", &self.stats())
            .finish()
    }
}

fn bump(counter: &Cell<u64>) {
    counter.set(counter.get() + 1);
}
