//! Turns a raw example block into validated example parts.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use super::error::ParseError;
use super::recognizer::RawExample;
use crate::example::ExampleParts;
use crate::options::{self, OptionFlags};

lazy_static! {
    // A traceback header, an arbitrary stack, then the first line starting
    // with a word character, which is the exception message.
    static ref TRACEBACK: Regex = Regex::new(
        r"(?ms)\ATraceback \((?:most recent call last|innermost last)\):\s*$(?P<stack>.*?)^(?P<msg>\w+.*)"
    )
    .expect("traceback regex is valid");

    // An option directive is a `doctest:` comment. A quote after it means
    // the directive is probably inside a string literal, so it is ignored.
    static ref OPTION_DIRECTIVE: Regex = Regex::new(r#"(?m)#\s*doctest:\s*([^\n'"]*)$"#)
        .expect("option directive regex is valid");
}

/// Whether `source` is blank or holds only a comment.
pub fn is_blank_or_comment(source: &str) -> bool {
    let line = source.strip_suffix('\n').unwrap_or(source);
    if line.contains('\n') {
        return false;
    }
    let rest = line.trim_start_matches(' ');
    rest.is_empty() || rest.starts_with('#')
}

/// Validate a raw block and split it into source, options, want and
/// exception message.
///
/// `lineno` is the zero-based line of the block in the parsed text; errors
/// report one-based lines.
pub fn build_example(
    raw: &RawExample<'_>,
    name: &str,
    lineno: usize,
) -> Result<ExampleParts, ParseError> {
    let indent = raw.indent.len();
    let width = raw.prompt.len() + 1;

    let source_lines: Vec<&str> = raw.source.split('\n').collect();
    check_prompt_blank(&source_lines, indent, raw.prompt, name, lineno)?;
    check_prefix(
        &source_lines[1..],
        &format!("{}.", " ".repeat(indent)),
        name,
        lineno,
    )?;
    let source = source_lines
        .iter()
        .map(|line| skip_chars(line, indent + width))
        .collect::<Vec<_>>()
        .join("\n");

    let mut want_lines: Vec<&str> = raw.want.split('\n').collect();
    if want_lines.len() > 1 && want_lines.last().is_some_and(|l| l.chars().all(|c| c == ' ')) {
        want_lines.pop();
    }
    check_prefix(
        &want_lines,
        &" ".repeat(indent),
        name,
        lineno + source_lines.len(),
    )?;
    let want = want_lines
        .iter()
        .map(|line| skip_chars(line, indent))
        .collect::<Vec<_>>()
        .join("\n");

    let exception_message = TRACEBACK
        .captures(&want)
        .and_then(|caps| caps.name("msg"))
        .map(|msg| msg.as_str().to_string());

    let options = find_options(&source, name, lineno)?;

    Ok(ExampleParts {
        source,
        want,
        exception_message,
        options,
    })
}

/// Collect the option overrides declared by directives in `source`.
pub fn find_options(
    source: &str,
    name: &str,
    lineno: usize,
) -> Result<BTreeMap<OptionFlags, bool>, ParseError> {
    let mut options = BTreeMap::new();
    for caps in OPTION_DIRECTIVE.captures_iter(source) {
        let Some(directives) = caps.get(1) else {
            continue;
        };
        for option in directives.as_str().replace(',', " ").split_whitespace() {
            let invalid = || ParseError::InvalidOption {
                name: name.to_string(),
                line: lineno + 1,
                option: option.to_string(),
            };
            let enabled = match option.chars().next() {
                Some('+') => true,
                Some('-') => false,
                _ => return Err(invalid()),
            };
            let flag = options::optionflag_by_name(&option[1..]).ok_or_else(invalid)?;
            options.insert(flag, enabled);
        }
    }
    if !options.is_empty() && is_blank_or_comment(source) {
        return Err(ParseError::MisplacedDirective {
            name: name.to_string(),
            line: lineno + 1,
            text: source.to_string(),
        });
    }
    Ok(options)
}

/// Every prompt must be followed by a space, unless the line ends right
/// after the prompt.
fn check_prompt_blank(
    lines: &[&str],
    indent: usize,
    prompt: &str,
    name: &str,
    lineno: usize,
) -> Result<(), ParseError> {
    for (i, line) in lines.iter().enumerate() {
        let after_prompt = line.get(indent + prompt.len()..).unwrap_or("");
        if after_prompt.chars().next().is_some_and(|c| c != ' ') {
            return Err(ParseError::SpaceMissingAfterPrompt {
                name: name.to_string(),
                line: lineno + i + 1,
                text: line.get(indent..).unwrap_or("").to_string(),
            });
        }
    }
    Ok(())
}

/// Every non-empty line must start with `prefix`.
fn check_prefix(lines: &[&str], prefix: &str, name: &str, lineno: usize) -> Result<(), ParseError> {
    for (i, line) in lines.iter().enumerate() {
        if !line.is_empty() && !line.starts_with(prefix) {
            return Err(ParseError::InconsistentIndentation {
                name: name.to_string(),
                line: lineno + i + 1,
                text: line.to_string(),
            });
        }
    }
    Ok(())
}

/// The part of `line` after its first `n` characters.
fn skip_chars(line: &str, n: usize) -> &str {
    match line.char_indices().nth(n) {
        Some((offset, _)) => &line[offset..],
        None => "",
    }
}
