//! Checks on the exception named by an exception-expecting example.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::host::Host;

lazy_static! {
    static ref EXCEPTION_NAME: Regex =
        Regex::new(r"\A[A-Za-z][A-Za-z0-9_]*").expect("exception name regex is valid");
}

/// Why a want cannot name an exception.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxProblem {
    #[error("The expected exception cannot be empty or blank.")]
    Empty,
    /// The want is indented deeper than its prompt.
    #[error("{raw}\nIndentationError: unexpected indent")]
    Indented { raw: String },
    #[error("The expected exception `{want}` is not a valid exception name.")]
    InvalidName { want: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WantError {
    #[error(transparent)]
    InvalidSyntax(SyntaxProblem),
    #[error("The expected exception `{0}` cannot be found.")]
    NotResolvable(String),
    #[error("The expected exception `{0}` is not a class of type exception.")]
    NotAnException(String),
}

impl WantError {
    /// Name of the exception class the problem is reported as.
    pub fn class_name(&self) -> &'static str {
        match self {
            WantError::InvalidSyntax(_) => "ValueError",
            WantError::NotResolvable(_) => "NameError",
            WantError::NotAnException(_) => "TypeError",
        }
    }

    /// The block shown to users: location, class name, then the indented
    /// message.
    pub fn report(&self, filename: &str, lineno: usize) -> String {
        format!(
            "File \"{filename}\", line {lineno}\n{}:\n  {self}",
            self.class_name()
        )
    }
}

/// Check that `want` names an exception class visible to the example,
/// looking at builtins, then globals, then locals.
///
/// Only the start of the stripped want has to look like a name; the whole
/// stripped want is what gets resolved.
pub fn validate_want<H: Host>(
    host: &H,
    globals: &H::Namespace,
    locals: &H::Namespace,
    want: &str,
) -> Result<H::Value, WantError> {
    let name = want.trim();
    if !EXCEPTION_NAME.is_match(name) {
        let raw = want.trim_matches('\n');
        let problem = if name.is_empty() {
            SyntaxProblem::Empty
        } else if raw.starts_with(' ') {
            SyntaxProblem::Indented {
                raw: raw.to_string(),
            }
        } else {
            SyntaxProblem::InvalidName {
                want: name.to_string(),
            }
        };
        return Err(WantError::InvalidSyntax(problem));
    }

    let value = host
        .lookup_builtin(globals, name)
        .or_else(|| host.lookup_global(globals, name))
        .or_else(|| host.lookup_local(locals, name))
        .ok_or_else(|| WantError::NotResolvable(name.to_string()))?;
    if !host.is_exception_class(&value) {
        return Err(WantError::NotAnException(name.to_string()));
    }
    Ok(value)
}
