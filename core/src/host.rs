//! The evaluator boundary: everything the engine needs from the language
//! the examples are written in.

use std::fmt;

use thiserror::Error;

/// How a piece of code is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// One line of statements, as typed at an interactive prompt.
    Single,
    /// Exactly one expression.
    Eval,
    /// Any sequence of statements.
    Exec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostErrorKind {
    /// The code does not compile.
    Syntax,
    /// The code raised while running.
    Runtime,
}

/// An exception reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.format_exception_only())]
pub struct HostError {
    pub kind: HostErrorKind,
    pub filename: String,
    /// One-based line the host attributes the error to.
    pub line: usize,
    /// Simple name of the exception type, e.g. `ZeroDivisionError`.
    pub type_name: String,
    pub message: String,
}

impl HostError {
    pub fn syntax(filename: &str, line: usize, message: impl Into<String>) -> Self {
        HostError {
            kind: HostErrorKind::Syntax,
            filename: filename.to_string(),
            line,
            type_name: "SyntaxError".to_string(),
            message: message.into(),
        }
    }

    pub fn runtime(
        filename: &str,
        line: usize,
        type_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        HostError {
            kind: HostErrorKind::Runtime,
            filename: filename.to_string(),
            line,
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// The last line of a traceback: `Type: message`, or just `Type` when
    /// there is no message.
    pub fn format_exception_only(&self) -> String {
        if self.message.is_empty() {
            self.type_name.clone()
        } else {
            format!("{}: {}", self.type_name, self.message)
        }
    }
}

/// An evaluator able to compile and run example code against a pair of
/// namespaces.
///
/// Implementations own the meaning of the code; the engine only sequences
/// calls and inspects the outcome. The same `globals`/`locals` pair is
/// passed to every call made while grading one example.
pub trait Host {
    /// A runtime value. Equality is the language's own equality.
    type Value: Clone + PartialEq + fmt::Debug + fmt::Display;
    type Namespace;

    /// A fresh, empty namespace.
    fn new_namespace(&self) -> Self::Namespace;

    /// Check that `code` compiles on its own in `mode`.
    fn compile(&self, code: &str, filename: &str, mode: Mode) -> Result<(), HostError>;

    /// Compile and run `code` as one interactive line.
    fn exec(
        &self,
        code: &str,
        filename: &str,
        globals: &mut Self::Namespace,
        locals: &mut Self::Namespace,
    ) -> Result<(), HostError>;

    fn lookup_local(&self, locals: &Self::Namespace, name: &str) -> Option<Self::Value>;

    fn lookup_global(&self, globals: &Self::Namespace, name: &str) -> Option<Self::Value>;

    /// A builtin reachable from `globals`.
    fn lookup_builtin(&self, globals: &Self::Namespace, name: &str) -> Option<Self::Value>;

    /// Whether `value` is a class whose ancestors, not counting itself,
    /// include the base exception type.
    fn is_exception_class(&self, value: &Self::Value) -> bool;
}
