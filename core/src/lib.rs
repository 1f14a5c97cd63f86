//! Doctest-style example extraction and grading.
//!
//! A docstring-like text interleaves prose with single-line examples:
//!
//! ```text
//! Adds two numbers.
//!
//! >>> 1 + 1
//! 2
//! !!! 1 / 0
//! ZeroDivisionError
//! ```
//!
//! [`parser::DocTestParser`] splits the text into prose fragments and
//! [`example::Example`] values. Each example is later graded against a
//! [`host::Host`] evaluator by [`engine`], producing a [`verdict::Verdict`].
//! [`runner::DocTestRunner`] drives a whole text at once, and [`sandbox`]
//! provides a small reference host.

pub mod adapter;
pub mod engine;
pub mod example;
pub mod host;
pub mod options;
pub mod parser;
pub mod prompt;
pub mod runner;
pub mod sandbox;
pub mod scanner;
pub mod verdict;

pub use adapter::{ExecutionAdapter, ExecutionError};
pub use example::{Example, ExampleKind};
pub use host::{Host, HostError, HostErrorKind, Mode};
pub use options::OptionFlags;
pub use parser::{DocTestParser, Fragment, ParseError};
pub use runner::{DocTestRunner, RunReport, RunnerOptions, TestResults};
pub use verdict::{Node, Verdict};
