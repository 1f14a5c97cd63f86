//! Running every example of a text and tallying the outcome.

use tracing::{debug, info};

use crate::example::Example;
use crate::host::Host;
use crate::options::OptionFlags;
use crate::parser::{DocTestParser, ParseError};
use crate::verdict::{Node, Verdict, VerdictInfo};

/// Runner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunnerOptions {
    /// Flags in effect for every example, before its own directives.
    pub optionflags: OptionFlags,
    /// Run each example in a fresh namespace pair instead of the caller's.
    pub isolate: bool,
}

/// Counts over one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TestResults {
    pub failed: usize,
    pub attempted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunReport {
    /// Verdicts in example order. Failures after the first are dropped
    /// under `REPORT_ONLY_FIRST_FAILURE`.
    pub verdicts: Vec<Verdict>,
    pub results: TestResults,
    /// Examples not run because of `SKIP`.
    pub skipped: usize,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|verdict| verdict.is_failure())
    }
}

/// Grades all the examples of a text against one host.
pub struct DocTestRunner<'h, H: Host> {
    host: &'h H,
    options: RunnerOptions,
    parser: DocTestParser,
}

impl<'h, H: Host> DocTestRunner<'h, H> {
    pub fn new(host: &'h H, options: RunnerOptions) -> Self {
        DocTestRunner {
            host,
            options,
            parser: DocTestParser::new(),
        }
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Parse `text` and grade its examples in order.
    ///
    /// Parse errors abort the run. Execution errors never do; they become
    /// verdicts.
    pub fn run(
        &self,
        text: &str,
        name: &str,
        node: Option<&Node>,
        globals: &mut H::Namespace,
        locals: &mut H::Namespace,
    ) -> Result<RunReport, ParseError> {
        let examples = self.parser.get_examples(text, name)?;
        Ok(self.run_examples(&examples, node, globals, locals))
    }

    /// Grade already parsed examples.
    pub fn run_examples(
        &self,
        examples: &[Example],
        node: Option<&Node>,
        globals: &mut H::Namespace,
        locals: &mut H::Namespace,
    ) -> RunReport {
        let mut report = RunReport::default();
        for example in examples {
            let flags = self.options.optionflags.with_overrides(example.options());
            if flags.contains(OptionFlags::SKIP) {
                debug!(line = example.lineno(), "skipping example");
                report.skipped += 1;
                continue;
            }

            let verdict = if self.options.isolate {
                let mut globals = self.host.new_namespace();
                let mut locals = self.host.new_namespace();
                example.exec_and_compute_verdict(self.host, node, &mut globals, &mut locals)
            } else {
                example.exec_and_compute_verdict(self.host, node, globals, locals)
            }
            .unwrap_or_else(|| Verdict::Empty(empty_info(example, node)));

            report.results.attempted += 1;
            if !verdict.is_failure() {
                report.verdicts.push(verdict);
                continue;
            }

            report.results.failed += 1;
            let first_failure = report.results.failed == 1;
            if first_failure || !flags.contains(OptionFlags::REPORT_ONLY_FIRST_FAILURE) {
                report.verdicts.push(verdict);
            }
            if flags.contains(OptionFlags::FAIL_FAST) {
                info!(line = example.lineno(), "stopping after first failure");
                break;
            }
        }
        debug!(
            attempted = report.results.attempted,
            failed = report.results.failed,
            skipped = report.skipped,
            "run finished"
        );
        report
    }
}

fn empty_info(example: &Example, node: Option<&Node>) -> VerdictInfo {
    VerdictInfo {
        filename: example.filename().to_string(),
        node: node.cloned(),
        tested_line: example.tested_line().to_string(),
        expected_result: example.want().trim().to_string(),
        line_number: example.lineno(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::Sandbox;
    use pretty_assertions::assert_eq;

    const TEXT: &str = "\
Shared state flows between examples.

    >>> x = 2
    >>> x * 3
    6
    >>> x + 1
    4
    !!! x / 0
    ZeroDivisionError
    >>> undefined
    1
";

    fn run(text: &str, options: RunnerOptions) -> RunReport {
        let sandbox = Sandbox::new();
        let mut globals = sandbox.new_namespace();
        let mut locals = sandbox.new_namespace();
        DocTestRunner::new(&sandbox, options)
            .run(text, "doc", None, &mut globals, &mut locals)
            .expect("text should parse")
    }

    fn labels(report: &RunReport) -> Vec<&'static str> {
        report.verdicts.iter().map(Verdict::label).collect()
    }

    #[test]
    fn test_shared_namespace() {
        let report = run(TEXT, RunnerOptions::default());
        assert_eq!(labels(&report), vec!["ok", "passed", "failed", "passed", "error"]);
        assert_eq!(
            report.results,
            TestResults {
                failed: 2,
                attempted: 5
            }
        );
        assert_eq!(report.skipped, 0);
        assert_eq!(report.failures().count(), 2);
    }

    #[test]
    fn test_isolated_namespaces() {
        let options = RunnerOptions {
            isolate: true,
            ..RunnerOptions::default()
        };
        let report = run(TEXT, options);
        // Without the binding from the first example, everything using `x`
        // errors, except the exception example which fails instead.
        assert_eq!(labels(&report), vec!["ok", "error", "error", "failed", "error"]);
    }

    #[test]
    fn test_skip_directive_and_default() {
        let report = run(">>> 1 # doctest: +SKIP\n2\n>>> 1\n1\n", RunnerOptions::default());
        assert_eq!(report.skipped, 1);
        assert_eq!(report.results.attempted, 1);

        let options = RunnerOptions {
            optionflags: OptionFlags::SKIP,
            ..RunnerOptions::default()
        };
        let report = run(">>> 1 # doctest: -SKIP\n2\n>>> 1\n1\n", options);
        assert_eq!(report.skipped, 1);
        assert_eq!(labels(&report), vec!["failed"]);
    }

    #[test]
    fn test_report_only_first_failure() {
        let options = RunnerOptions {
            optionflags: OptionFlags::REPORT_ONLY_FIRST_FAILURE,
            ..RunnerOptions::default()
        };
        let report = run(TEXT, options);
        assert_eq!(labels(&report), vec!["ok", "passed", "failed", "passed"]);
        assert_eq!(report.results.failed, 2);
    }

    #[test]
    fn test_fail_fast() {
        let options = RunnerOptions {
            optionflags: OptionFlags::FAIL_FAST,
            ..RunnerOptions::default()
        };
        let report = run(TEXT, options);
        assert_eq!(labels(&report), vec!["ok", "passed", "failed"]);
        assert_eq!(report.results.attempted, 3);
    }

    #[test]
    fn test_parse_error_aborts() {
        let sandbox = Sandbox::new();
        let mut globals = sandbox.new_namespace();
        let mut locals = sandbox.new_namespace();
        let err = DocTestRunner::new(&sandbox, RunnerOptions::default())
            .run(">>> 1\n1\n>>>2\n", "doc", None, &mut globals, &mut locals)
            .unwrap_err();
        assert!(!err.is_structural());
        assert_eq!(err.line(), 3);
    }
}
