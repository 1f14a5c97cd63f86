//! Splitting a docstring-like text into prose and examples.

pub mod builder;
pub mod error;
pub mod recognizer;

use tracing::{debug, trace};

pub use error::ParseError;
pub use recognizer::{ExampleRecognizer, RawExample};

use crate::example::Example;
use crate::scanner;

/// One piece of a parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Prose between examples, kept verbatim (after tab expansion and
    /// indentation stripping).
    Text(String),
    Example(Example),
}

impl Fragment {
    pub fn as_example(&self) -> Option<&Example> {
        match self {
            Fragment::Example(example) => Some(example),
            Fragment::Text(_) => None,
        }
    }
}

/// Extracts examples from docstring-like text.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocTestParser;

impl DocTestParser {
    pub fn new() -> Self {
        Self
    }

    /// Split `text` into an alternating sequence of prose fragments and
    /// examples.
    ///
    /// `name` identifies the text in error messages and is recorded as the
    /// filename of every example. The sequence always starts and ends with a
    /// (possibly empty) text fragment.
    pub fn parse(&self, text: &str, name: &str) -> Result<Vec<Fragment>, ParseError> {
        let text = scanner::expand_tabs(text);
        let min_indent = scanner::min_indent(&text);
        let text = if min_indent > 0 {
            scanner::strip_common_indent(&text, min_indent)
        } else {
            text
        };

        let mut output = Vec::new();
        let mut charno = 0;
        let mut lineno = 0;
        for raw in ExampleRecognizer::new(&text) {
            output.push(Fragment::Text(text[charno..raw.start].to_string()));
            lineno += count_newlines(&text[charno..raw.start]);

            let parts = builder::build_example(&raw, name, lineno)?;
            if builder::is_blank_or_comment(&parts.source) {
                trace!(line = lineno + 1, "skipping blank or comment example");
            } else {
                let example = Example::classify(
                    raw.prompt,
                    name,
                    parts,
                    lineno,
                    min_indent + raw.indent.len(),
                );
                debug!(
                    line = example.lineno(),
                    kind = ?example.kind(),
                    source = example.tested_line(),
                    "recognized example"
                );
                output.push(Fragment::Example(example));
            }

            lineno += count_newlines(&text[raw.start..raw.end]);
            charno = raw.end;
        }
        output.push(Fragment::Text(text[charno..].to_string()));
        Ok(output)
    }

    /// The examples of `text`, in order, without the prose.
    pub fn get_examples(&self, text: &str, name: &str) -> Result<Vec<Example>, ParseError> {
        Ok(self
            .parse(text, name)?
            .into_iter()
            .filter_map(|fragment| match fragment {
                Fragment::Example(example) => Some(example),
                Fragment::Text(_) => None,
            })
            .collect())
    }
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

#[cfg(test)]
mod parse_test;
