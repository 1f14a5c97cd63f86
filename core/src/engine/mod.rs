//! Grading one example against a host.
//!
//! Every step that can fail short-circuits to a verdict; no error escapes
//! [`Example::exec_and_compute_verdict`].

pub mod validation;

use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::adapter::{ExecutionAdapter, ExecutionError};
use crate::example::{Example, ExampleKind};
use crate::host::{Host, Mode};
use crate::verdict::{Node, Verdict, VerdictInfo};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A fresh name for a temporary binding, unlikely to clash with user code.
fn temp_name() -> String {
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let salt = RandomState::new().hash_one(n);
    format!("__executed_{n}_{salt:016x}")
}

/// `code` without a trailing comment, so that it can be wrapped in
/// brackets.
fn strip_comment(code: &str) -> &str {
    let mut quote = None;
    let mut escaped = false;
    for (i, c) in code.char_indices() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '#' => return code[..i].trim_end(),
                _ => {}
            },
        }
    }
    code.trim_end()
}

impl Example {
    /// Run the example and grade the outcome.
    ///
    /// Returns `None` for a statement example that ran without error. The
    /// namespaces may gain bindings, including temporary ones.
    pub fn exec_and_compute_verdict<H: Host>(
        &self,
        host: &H,
        node: Option<&Node>,
        globals: &mut H::Namespace,
        locals: &mut H::Namespace,
    ) -> Option<Verdict> {
        let adapter = ExecutionAdapter::new(host, self);
        let info = VerdictInfo {
            filename: self.filename().to_string(),
            node: node.cloned(),
            tested_line: self.tested_line().to_string(),
            expected_result: self.want().trim().to_string(),
            line_number: self.lineno(),
        };
        let verdict = match self.kind() {
            ExampleKind::WithExpected => Some(self.grade_value(&adapter, info, globals, locals)),
            ExampleKind::WithoutExpected => self.grade_statement(&adapter, info, globals, locals),
            ExampleKind::ExceptionExpected => {
                Some(self.grade_exception(&adapter, info, globals, locals))
            }
        };
        match &verdict {
            Some(verdict) => debug!(line = self.lineno(), verdict = verdict.label(), "graded example"),
            None => debug!(line = self.lineno(), "statement ran"),
        }
        verdict
    }

    fn grade_value<H: Host>(
        &self,
        adapter: &ExecutionAdapter<'_, H>,
        info: VerdictInfo,
        globals: &mut H::Namespace,
        locals: &mut H::Namespace,
    ) -> Verdict {
        match self.compare_values(adapter, globals, locals) {
            Ok((obtained, expected)) if obtained == expected => Verdict::Passed(info),
            Ok((obtained, _)) => Verdict::Failed {
                info,
                obtained_result: obtained.to_string(),
            },
            Err(err) => Verdict::Exception {
                info,
                message: err.to_string(),
            },
        }
    }

    fn compare_values<H: Host>(
        &self,
        adapter: &ExecutionAdapter<'_, H>,
        globals: &mut H::Namespace,
        locals: &mut H::Namespace,
    ) -> Result<(H::Value, H::Value), ExecutionError> {
        adapter.check_syntax(self.source(), Mode::Single)?;
        adapter.check_syntax(self.want(), Mode::Single)?;

        let obtained = temp_name();
        let expected = temp_name();
        adapter.execute(
            &format!("{obtained} = ({})", strip_comment(self.tested_line())),
            globals,
            locals,
        )?;
        adapter.execute(
            &format!("{expected} = ({})", strip_comment(self.want().trim())),
            globals,
            locals,
        )?;
        adapter.check_syntax(&format!("({obtained}) == ({expected})"), Mode::Eval)?;

        Ok((adapter.local(locals, &obtained)?, adapter.local(locals, &expected)?))
    }

    fn grade_statement<H: Host>(
        &self,
        adapter: &ExecutionAdapter<'_, H>,
        info: VerdictInfo,
        globals: &mut H::Namespace,
        locals: &mut H::Namespace,
    ) -> Option<Verdict> {
        let outcome = adapter
            .check_syntax(self.source(), Mode::Single)
            .and_then(|()| adapter.execute(self.source(), globals, locals));
        match outcome {
            Ok(()) => None,
            Err(err) => Some(Verdict::Exception {
                info,
                message: err.to_string(),
            }),
        }
    }

    fn grade_exception<H: Host>(
        &self,
        adapter: &ExecutionAdapter<'_, H>,
        info: VerdictInfo,
        globals: &mut H::Namespace,
        locals: &mut H::Namespace,
    ) -> Verdict {
        if let Err(err) = validation::validate_want(adapter.host(), globals, locals, self.want()) {
            return Verdict::Exception {
                info,
                message: err.report(self.filename(), self.lineno()),
            };
        }
        if let Err(err) = adapter.check_syntax(self.source(), Mode::Single) {
            return Verdict::Exception {
                info,
                message: err.to_string(),
            };
        }

        let want = self.want().trim();
        let not_raised = format!("`{want}` was not raised by `{}`", self.tested_line());
        match adapter.execute(self.source(), globals, locals) {
            Ok(()) => Verdict::FailedWhenExceptionExpected {
                info,
                failure_message: not_raised,
            },
            Err(err) if err.is_compilation() => Verdict::Exception {
                info,
                message: err.to_string(),
            },
            // Exact name match: a subclass of the wanted type does not pass.
            Err(err) if err.type_name() == want => Verdict::Passed(info),
            Err(err) => Verdict::FailedWhenExceptionExpected {
                info,
                failure_message: format!("{not_raised}\nInstead, it raises :\n{err}"),
            },
        }
    }
}
