//! A small Python-flavoured evaluator implementing [`Host`].
//!
//! It understands what single-line examples need: arithmetic, comparisons,
//! strings, lists, a handful of builtin functions, `raise`/`assert`, and
//! `class` statements deriving from the builtin exception hierarchy.
//!
//! ```
//! use docverdict_core::host::{Host, Mode};
//! use docverdict_core::sandbox::Sandbox;
//!
//! let sandbox = Sandbox::new();
//! let mut globals = sandbox.new_namespace();
//! let mut locals = sandbox.new_namespace();
//! sandbox.exec("x = 6 * 7", "<doc>", &mut globals, &mut locals).unwrap();
//! assert_eq!(sandbox.lookup_local(&locals, "x").unwrap().to_string(), "42");
//! assert!(sandbox.compile("x = ", "<doc>", Mode::Single).is_err());
//! ```

pub mod builtins;
pub mod eval;
pub mod namespace;
pub mod syntax;
pub mod value;

use std::rc::Rc;

pub use builtins::Builtins;
pub use namespace::Namespace;
pub use value::{Class, Instance, Value};

use crate::host::{Host, HostError, Mode};
use eval::Interpreter;

/// Limits of the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxOptions {
    /// Deepest expression nesting evaluated before `RecursionError`.
    pub max_depth: usize,
    /// Longest string or list a repetition may build before `MemoryError`.
    pub max_sequence_len: usize,
}

impl Default for SandboxOptions {
    fn default() -> Self {
        SandboxOptions {
            max_depth: 200,
            max_sequence_len: 1 << 20,
        }
    }
}

pub struct Sandbox {
    builtins: Builtins,
    options: SandboxOptions,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    pub fn new() -> Self {
        Self::with_options(SandboxOptions::default())
    }

    pub fn with_options(options: SandboxOptions) -> Self {
        Sandbox {
            builtins: Builtins::new(),
            options,
        }
    }

    pub fn options(&self) -> &SandboxOptions {
        &self.options
    }

    /// Compile and run `code` in `mode`.
    pub fn run(
        &self,
        code: &str,
        filename: &str,
        mode: Mode,
        globals: &mut Namespace,
        locals: &mut Namespace,
    ) -> Result<(), HostError> {
        let stmts = syntax::parse(code, mode)
            .map_err(|err| HostError::syntax(filename, err.line, err.message))?;
        Interpreter::new(&self.builtins, globals, locals, self.options)
            .run(&stmts)
            .map_err(|(line, raised)| {
                HostError::runtime(filename, line, raised.type_name(), raised.message())
            })
    }
}

impl Host for Sandbox {
    type Value = Value;
    type Namespace = Namespace;

    fn new_namespace(&self) -> Namespace {
        Namespace::new()
    }

    fn compile(&self, code: &str, filename: &str, mode: Mode) -> Result<(), HostError> {
        syntax::parse(code, mode)
            .map(|_| ())
            .map_err(|err| HostError::syntax(filename, err.line, err.message))
    }

    fn exec(
        &self,
        code: &str,
        filename: &str,
        globals: &mut Namespace,
        locals: &mut Namespace,
    ) -> Result<(), HostError> {
        self.run(code, filename, Mode::Single, globals, locals)
    }

    fn lookup_local(&self, locals: &Namespace, name: &str) -> Option<Value> {
        locals.get(name).cloned()
    }

    fn lookup_global(&self, globals: &Namespace, name: &str) -> Option<Value> {
        globals.get(name).cloned()
    }

    fn lookup_builtin(&self, _globals: &Namespace, name: &str) -> Option<Value> {
        self.builtins.get(name).cloned()
    }

    fn is_exception_class(&self, value: &Value) -> bool {
        let base = self.builtins.base_exception();
        match value {
            Value::Class(class) => class
                .mro()
                .skip(1)
                .any(|ancestor| Rc::ptr_eq(&ancestor, base)),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_carry_line_and_type() {
        let sandbox = Sandbox::new();
        let mut globals = sandbox.new_namespace();
        let mut locals = sandbox.new_namespace();

        let err = sandbox
            .run("a = 1\nb = a / 0\n", "prog", Mode::Exec, &mut globals, &mut locals)
            .unwrap_err();
        assert_eq!(
            err,
            HostError::runtime("prog", 2, "ZeroDivisionError", "division by zero")
        );
        assert_eq!(sandbox.lookup_local(&locals, "a"), Some(Value::Int(1)));

        let err = sandbox.compile("1 +* 2", "prog", Mode::Single).unwrap_err();
        assert_eq!(err, HostError::syntax("prog", 1, "invalid syntax"));
    }

    #[test]
    fn test_exception_classes() {
        let sandbox = Sandbox::new();
        let mut globals = sandbox.new_namespace();
        let mut locals = sandbox.new_namespace();
        sandbox
            .exec("class Mine(KeyError): pass", "doc", &mut globals, &mut locals)
            .unwrap();
        sandbox
            .exec("class Plain: pass", "doc", &mut globals, &mut locals)
            .unwrap();

        let is_exception = |value: Option<Value>| value.is_some_and(|v| sandbox.is_exception_class(&v));
        assert!(is_exception(sandbox.lookup_builtin(&globals, "ValueError")));
        assert!(is_exception(sandbox.lookup_local(&locals, "Mine")));
        assert!(!is_exception(sandbox.lookup_local(&locals, "Plain")));
        assert!(!is_exception(sandbox.lookup_builtin(&globals, "BaseException")));
        assert!(!is_exception(sandbox.lookup_builtin(&globals, "len")));
    }

    #[test]
    fn test_recursion_limit() {
        let sandbox = Sandbox::with_options(SandboxOptions {
            max_depth: 5,
            ..SandboxOptions::default()
        });
        let mut globals = sandbox.new_namespace();
        let mut locals = sandbox.new_namespace();
        let err = sandbox
            .exec("[[[[[[1]]]]]]", "doc", &mut globals, &mut locals)
            .unwrap_err();
        assert_eq!(err.type_name, "RecursionError");

        sandbox
            .exec("1 + 1", "doc", &mut globals, &mut locals)
            .unwrap();
    }
}
