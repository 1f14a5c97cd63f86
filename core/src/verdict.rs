//! Outcomes of grading one example.

use std::fmt;

/// The documented item an example belongs to, as given by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    pub name: String,
    pub line: usize,
}

impl Node {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Node {
            name: name.into(),
            line,
        }
    }
}

/// Fields shared by every verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictInfo {
    pub filename: String,
    pub node: Option<Node>,
    /// The example source, trimmed.
    pub tested_line: String,
    /// The want, trimmed of newlines.
    pub expected_result: String,
    /// One-based line of the example.
    pub line_number: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Passed(VerdictInfo),
    Failed {
        info: VerdictInfo,
        obtained_result: String,
    },
    FailedWhenExceptionExpected {
        info: VerdictInfo,
        failure_message: String,
    },
    Exception {
        info: VerdictInfo,
        message: String,
    },
    /// The example ran and there is nothing to report.
    Empty(VerdictInfo),
}

impl Verdict {
    pub fn info(&self) -> &VerdictInfo {
        match self {
            Verdict::Passed(info) | Verdict::Empty(info) => info,
            Verdict::Failed { info, .. }
            | Verdict::FailedWhenExceptionExpected { info, .. }
            | Verdict::Exception { info, .. } => info,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Verdict::Failed { .. }
                | Verdict::FailedWhenExceptionExpected { .. }
                | Verdict::Exception { .. }
        )
    }

    /// Short label of the verdict kind.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Passed(_) => "passed",
            Verdict::Failed { .. } => "failed",
            Verdict::FailedWhenExceptionExpected { .. } => "failed",
            Verdict::Exception { .. } => "error",
            Verdict::Empty(_) => "ok",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.info();
        write!(f, "{}:{}: ", info.filename, info.line_number)?;
        match self {
            Verdict::Passed(_) => write!(f, "passed: {}", info.tested_line),
            Verdict::Empty(_) => write!(f, "ok: {}", info.tested_line),
            Verdict::Failed {
                obtained_result, ..
            } => write!(
                f,
                "failed: {}\nExpected:\n    {}\nGot:\n    {}",
                info.tested_line, info.expected_result, obtained_result
            ),
            Verdict::FailedWhenExceptionExpected {
                failure_message, ..
            } => write!(f, "failed: {failure_message}"),
            Verdict::Exception { message, .. } => {
                write!(f, "error in {}\n{message}", info.tested_line)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> VerdictInfo {
        VerdictInfo {
            filename: "doc".to_string(),
            node: Some(Node::new("add", 1)),
            tested_line: "1 + 1".to_string(),
            expected_result: "3".to_string(),
            line_number: 4,
        }
    }

    #[test]
    fn test_failures() {
        assert!(!Verdict::Passed(info()).is_failure());
        assert!(!Verdict::Empty(info()).is_failure());
        assert!(
            Verdict::Failed {
                info: info(),
                obtained_result: "2".to_string()
            }
            .is_failure()
        );
        assert!(
            Verdict::Exception {
                info: info(),
                message: "boom".to_string()
            }
            .is_failure()
        );
    }

    #[test]
    fn test_display_failed() {
        let verdict = Verdict::Failed {
            info: info(),
            obtained_result: "2".to_string(),
        };
        assert_eq!(
            verdict.to_string(),
            "doc:4: failed: 1 + 1\nExpected:\n    3\nGot:\n    2"
        );
    }
}
