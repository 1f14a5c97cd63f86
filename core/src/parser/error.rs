use thiserror::Error;

/// Error raised while splitting a text into examples.
///
/// [`ParseError::SpaceMissingAfterPrompt`] is meant to be shown directly to
/// the author of the text; the other variants are structural problems.
/// Line numbers are one-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line} of the docstring for {name} lacks a space after the prompt: '{text}'")]
    SpaceMissingAfterPrompt {
        name: String,
        line: usize,
        /// The offending line, without its indentation.
        text: String,
    },

    #[error("line {line} of the docstring for {name} has inconsistent leading whitespace: '{text}'")]
    InconsistentIndentation {
        name: String,
        line: usize,
        text: String,
    },

    #[error("line {line} of the doctest for {name} has an invalid option: '{option}'")]
    InvalidOption {
        name: String,
        line: usize,
        option: String,
    },

    #[error(
        "line {line} of the doctest for {name} has an option directive on a line with no example: '{text}'"
    )]
    MisplacedDirective {
        name: String,
        line: usize,
        text: String,
    },
}

impl ParseError {
    /// One-based line the error refers to.
    pub fn line(&self) -> usize {
        match self {
            ParseError::SpaceMissingAfterPrompt { line, .. }
            | ParseError::InconsistentIndentation { line, .. }
            | ParseError::InvalidOption { line, .. }
            | ParseError::MisplacedDirective { line, .. } => *line,
        }
    }

    /// Name of the parsed text.
    pub fn name(&self) -> &str {
        match self {
            ParseError::SpaceMissingAfterPrompt { name, .. }
            | ParseError::InconsistentIndentation { name, .. }
            | ParseError::InvalidOption { name, .. }
            | ParseError::MisplacedDirective { name, .. } => name,
        }
    }

    /// Whether this is one of the generic structural errors, as opposed to
    /// the prompt spacing error.
    pub fn is_structural(&self) -> bool {
        !matches!(self, ParseError::SpaceMissingAfterPrompt { .. })
    }

    /// Short hint shown next to the rendered error.
    pub fn help(&self) -> &'static str {
        match self {
            ParseError::SpaceMissingAfterPrompt { .. } => "add a space between the prompt and the code",
            ParseError::InconsistentIndentation { .. } => {
                "indent the expected value like its prompt line"
            }
            ParseError::InvalidOption { .. } => {
                "options look like `+NAME` or `-NAME` and must be registered flags"
            }
            ParseError::MisplacedDirective { .. } => {
                "attach the directive to a line that contains code"
            }
        }
    }
}
