//! The only path from the engine to a [`Host`].
//!
//! Host failures are folded into [`ExecutionError`] with their line moved
//! from the host's placeholder to the example's line in the document.

use thiserror::Error;

use crate::example::Example;
use crate::host::{Host, HostError, HostErrorKind, Mode};

/// The line a host reports for code it was given as a single line.
const PLACEHOLDER_LINE: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The code did not compile.
    #[error("File \"{}\", line {}\n{}", .0.filename, .0.line, .0.format_exception_only())]
    Compilation(HostError),
    /// The code raised while running.
    #[error("File \"{}\", line {}\n{}", .0.filename, .0.line, .0.format_exception_only())]
    Runtime(HostError),
}

impl ExecutionError {
    pub fn host_error(&self) -> &HostError {
        match self {
            ExecutionError::Compilation(err) | ExecutionError::Runtime(err) => err,
        }
    }

    /// Simple name of the exception type behind the error.
    pub fn type_name(&self) -> &str {
        &self.host_error().type_name
    }

    pub fn line(&self) -> usize {
        self.host_error().line
    }

    pub fn is_compilation(&self) -> bool {
        matches!(self, ExecutionError::Compilation(_))
    }
}

/// Runs code on behalf of one example.
pub struct ExecutionAdapter<'a, H: Host> {
    host: &'a H,
    filename: &'a str,
    lineno: usize,
}

impl<'a, H: Host> ExecutionAdapter<'a, H> {
    pub fn new(host: &'a H, example: &'a Example) -> Self {
        ExecutionAdapter {
            host,
            filename: example.filename(),
            lineno: example.lineno(),
        }
    }

    pub fn host(&self) -> &'a H {
        self.host
    }

    /// Check that `code` compiles on its own.
    pub fn check_syntax(&self, code: &str, mode: Mode) -> Result<(), ExecutionError> {
        self.host
            .compile(code, self.filename, mode)
            .map_err(|err| ExecutionError::Compilation(self.correct(err)))
    }

    /// Run `code` against the namespace pair.
    ///
    /// A syntax error found while running is still a compilation error.
    pub fn execute(
        &self,
        code: &str,
        globals: &mut H::Namespace,
        locals: &mut H::Namespace,
    ) -> Result<(), ExecutionError> {
        self.host
            .exec(code, self.filename, globals, locals)
            .map_err(|err| match err.kind {
                HostErrorKind::Syntax => ExecutionError::Compilation(self.correct(err)),
                HostErrorKind::Runtime => ExecutionError::Runtime(self.correct(err)),
            })
    }

    /// The value bound to `name` in `locals`.
    pub fn local(&self, locals: &H::Namespace, name: &str) -> Result<H::Value, ExecutionError> {
        self.host.lookup_local(locals, name).ok_or_else(|| {
            ExecutionError::Runtime(HostError::runtime(
                self.filename,
                self.lineno,
                "NameError",
                format!("name '{name}' is not defined"),
            ))
        })
    }

    fn correct(&self, mut err: HostError) -> HostError {
        if err.line == PLACEHOLDER_LINE {
            err.line = self.lineno;
        }
        err
    }
}
