//! Docverdict - extract doctest-style examples from text and grade them
//!
//! # Overview
//!
//! A text mixes prose with single-line examples. `>>>` examples compare the
//! value of their source with the value of the expected line, and `!!!`
//! examples expect their source to raise the named exception:
//!
//! ```
//! use docverdict::{DocTestRunner, Host, RunnerOptions, Verdict};
//! use docverdict::sandbox::Sandbox;
//!
//! let text = "
//! Doubling:
//!
//!     >>> 21 * 2
//!     42
//!     !!! 1 / 0
//!     ZeroDivisionError
//! ";
//!
//! let sandbox = Sandbox::new();
//! let mut globals = sandbox.new_namespace();
//! let mut locals = sandbox.new_namespace();
//! let report = DocTestRunner::new(&sandbox, RunnerOptions::default())
//!     .run(text, "doubling", None, &mut globals, &mut locals)
//!     .unwrap();
//! assert!(report.verdicts.iter().all(|v| matches!(v, Verdict::Passed(_))));
//! ```
//!
//! Parse errors can be shown against the text they came from with
//! [`render_parse_error`].

pub mod error_renderer;

use std::path::Path;

use miette::Diagnostic;
use thiserror::Error;

pub use docverdict_core::{
    DocTestParser, DocTestRunner, Example, ExampleKind, ExecutionAdapter, ExecutionError,
    Fragment, Host, HostError, HostErrorKind, Mode, Node, OptionFlags, ParseError, RunReport,
    RunnerOptions, TestResults, Verdict,
};
pub use docverdict_core::{engine, options, parser, prompt, sandbox, scanner, verdict};

pub use error_renderer::{
    render_parse_error, render_parse_error_to, render_parse_error_to_string,
    render_parse_error_to_string_no_color,
};

/// Errors surfaced to users of the crate.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("cannot read {path}")]
    #[diagnostic(code(docverdict::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(docverdict::parse))]
    Parse(#[from] ParseError),
}

/// Read a text to check from disk.
pub fn read_text(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })
}
