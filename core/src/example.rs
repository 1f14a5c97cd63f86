//! Example records and the classifier choosing their kind.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::options::OptionFlags;
use crate::prompt;

/// How an example is graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExampleKind {
    /// The source value is compared with the value of the want.
    WithExpected,
    /// A statement run for its side effects; only errors are reported.
    WithoutExpected,
    /// The source must raise the exception named by the want.
    ExceptionExpected,
}

/// The decoded parts of an example block, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExampleParts {
    pub source: String,
    pub want: String,
    pub exception_message: Option<String>,
    pub options: BTreeMap<OptionFlags, bool>,
}

/// One executable example found in a text.
///
/// `source` always ends with exactly one newline; `want` is either empty or
/// ends with exactly one newline. Examples never change once built.
#[derive(Debug, Clone)]
pub struct Example {
    kind: ExampleKind,
    filename: String,
    source: String,
    want: String,
    prompt: &'static str,
    exception_message: Option<String>,
    line_number: usize,
    indent: usize,
    options: BTreeMap<OptionFlags, bool>,
}

impl Example {
    /// Pick the example kind from the prompt and the want.
    ///
    /// The exception prompt always wins; otherwise an empty want makes a
    /// statement example and anything else a value example.
    pub fn classify(
        prompt: &'static str,
        filename: &str,
        parts: ExampleParts,
        line_number: usize,
        indent: usize,
    ) -> Example {
        let want = normalize_newline(parts.want);
        let kind = if prompt::is_exception_prompt(prompt) {
            ExampleKind::ExceptionExpected
        } else if want.is_empty() {
            ExampleKind::WithoutExpected
        } else {
            ExampleKind::WithExpected
        };
        Example {
            kind,
            filename: filename.to_string(),
            source: normalize_newline(parts.source),
            want,
            prompt,
            exception_message: parts.exception_message,
            line_number,
            indent,
            options: parts.options,
        }
    }

    pub fn kind(&self) -> ExampleKind {
        self.kind
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn want(&self) -> &str {
        &self.want
    }

    /// The prompt token the example was written with.
    pub fn prompt(&self) -> &'static str {
        self.prompt
    }

    /// Message line of a traceback-shaped want, if any.
    pub fn exception_message(&self) -> Option<&str> {
        self.exception_message.as_deref()
    }

    /// Zero-based line of the prompt in the indentation-stripped text.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// One-based line of the prompt, as shown to users.
    pub fn lineno(&self) -> usize {
        self.line_number + 1
    }

    /// Spaces before the prompt in the original text.
    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn options(&self) -> &BTreeMap<OptionFlags, bool> {
        &self.options
    }

    /// The source as shown in verdicts, without surrounding whitespace.
    pub fn tested_line(&self) -> &str {
        self.source.trim()
    }
}

impl PartialEq for Example {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.filename == other.filename
            && self.source == other.source
            && self.want == other.want
            && self.line_number == other.line_number
            && self.indent == other.indent
            && self.options == other.options
            && self.exception_message == other.exception_message
    }
}

impl Eq for Example {}

// Options are left out of the hash; equal examples still hash equally.
impl Hash for Example {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.filename.hash(state);
        self.source.hash(state);
        self.want.hash(state);
        self.line_number.hash(state);
        self.indent.hash(state);
        self.exception_message.hash(state);
    }
}

/// Ensure non-empty text ends with exactly one newline.
fn normalize_newline(text: String) -> String {
    if text.is_empty() {
        return text;
    }
    let mut text = text.trim_end_matches('\n').to_string();
    text.push('\n');
    text
}
