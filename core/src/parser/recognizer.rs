//! Locates example blocks in indentation-stripped text.
//!
//! An example block is one prompt line, optionally followed by one line of
//! expected output. Continuation prompts are not part of the syntax: a line
//! following a prompt line is always treated as its wanted output (or as
//! prose when it is blank or starts with a prompt itself).

use lazy_static::lazy_static;
use regex::Regex;

use crate::prompt::{self, prompt_alternation};

lazy_static! {
    static ref SOURCE_LINE: Regex = Regex::new(&format!(
        r"(?m)^(?P<indent> *)(?P<prompt>{}).*",
        prompt_alternation()
    ))
    .expect("source line regex is valid");
}

/// A raw example block as found in the text, before any validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawExample<'t> {
    /// Byte offset where the block starts.
    pub start: usize,
    /// Byte offset just past the block, including its last newline.
    pub end: usize,
    /// Spaces before the prompt.
    pub indent: &'t str,
    /// The prompt token that matched.
    pub prompt: &'static str,
    /// The prompt line, with indentation and prompt, without newline.
    pub source: &'t str,
    /// The wanted-output line with its indentation and newline, or `""`.
    pub want: &'t str,
}

/// Iterator over the example blocks of a text, left to right and
/// non-overlapping.
pub struct ExampleRecognizer<'t> {
    text: &'t str,
    pos: usize,
}

impl<'t> ExampleRecognizer<'t> {
    pub fn new(text: &'t str) -> Self {
        Self { text, pos: 0 }
    }

    /// Length of the wanted-output line starting at `at`, including its
    /// newline, or 0 when that line cannot be a want.
    fn want_len(&self, at: usize) -> usize {
        let rest = &self.text[at..];
        let line = rest.split('\n').next().unwrap_or("");
        let blank = line.chars().all(|c| c == ' ');
        if blank || prompt::leading_prompt(line).is_some() {
            return 0;
        }
        if rest[line.len()..].starts_with('\n') {
            line.len() + 1
        } else {
            line.len()
        }
    }
}

impl<'t> Iterator for ExampleRecognizer<'t> {
    type Item = RawExample<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos > self.text.len() {
            return None;
        }
        let caps = SOURCE_LINE.captures_at(self.text, self.pos)?;
        let line = caps.get(0)?;
        let indent = caps.name("indent")?.as_str();
        let marker = caps.name("prompt")?.as_str();
        let prompt = prompt::PROMPTS.into_iter().find(|p| *p == marker)?;

        let mut end = line.end();
        if self.text[end..].starts_with('\n') {
            end += 1;
        }
        let want_start = end;
        end += self.want_len(want_start);

        self.pos = end;
        Some(RawExample {
            start: line.start(),
            end,
            indent,
            prompt,
            source: line.as_str(),
            want: &self.text[want_start..end],
        })
    }
}
