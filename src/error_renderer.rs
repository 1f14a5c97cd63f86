//! Parse error rendering using ariadne
//!
//! Errors are drawn against the text they were found in, with the offending
//! line underlined and a short hint.

use std::io::Write;
use std::ops::Range;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use docverdict_core::ParseError;

/// Render a parse error of `text` to stderr.
pub fn render_parse_error(text: &str, error: &ParseError) {
    render_to_writer(text, error, &mut std::io::stderr(), true).ok();
}

/// Render a parse error of `text` to a specific writer.
pub fn render_parse_error_to(
    text: &str,
    error: &ParseError,
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    render_to_writer(text, error, writer, true)
}

pub fn render_parse_error_to_string(text: &str, error: &ParseError) -> String {
    let mut buf = Vec::new();
    render_to_writer(text, error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Same as [`render_parse_error_to_string`] without ANSI color codes.
pub fn render_parse_error_to_string_no_color(text: &str, error: &ParseError) -> String {
    let mut buf = Vec::new();
    render_to_writer(text, error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_to_writer(
    text: &str,
    error: &ParseError,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let name = error.name();
    let span = line_span(text, error.line());
    let label = match error {
        ParseError::SpaceMissingAfterPrompt { .. } => "prompt needs a space after it",
        ParseError::InconsistentIndentation { .. } => "indented less than its prompt",
        ParseError::InvalidOption { .. } => "unknown or unsigned option",
        ParseError::MisplacedDirective { .. } => "directive without an example",
    };

    Report::build(ReportKind::Error, (name, span.clone()))
        .with_config(
            Config::default()
                .with_color(use_color)
                .with_index_type(IndexType::Byte),
        )
        .with_message(error.to_string())
        .with_label(
            Label::new((name, span))
                .with_message(label)
                .with_color(Color::Red),
        )
        .with_help(error.help())
        .finish()
        .write((name, Source::from(text)), &mut *writer)
}

/// Byte range of the one-based `line` of `text`, without its line break.
/// Lines past the end map to an empty range at the end of the text.
fn line_span(text: &str, line: usize) -> Range<usize> {
    let mut start = 0;
    for (index, current) in text.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let content = current.trim_end_matches(['\n', '\r']);
            return start..start + content.len();
        }
        start += current.len();
    }
    text.len()..text.len()
}
