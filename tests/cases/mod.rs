use docverdict::ExampleKind;
use once_cell::sync::Lazy;

/// How grading one example is expected to turn out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed { obtained: String },
    FailedWhenExceptionExpected,
    Exception,
    NoVerdict,
}

pub struct GradingCase {
    pub name: &'static str,
    pub text: &'static str,
    pub kind: ExampleKind,
    pub source: &'static str,
    pub want: &'static str,
    pub outcome: Outcome,
}

pub static GRADING_CASES: Lazy<Vec<GradingCase>> = Lazy::new(|| {
    vec![
        GradingCase {
            name: "value_passes",
            text: ">>> 1 + 1\n2\n",
            kind: ExampleKind::WithExpected,
            source: "1 + 1\n",
            want: "2\n",
            outcome: Outcome::Passed,
        },
        GradingCase {
            name: "value_fails",
            text: ">>> 1 + 1\n3\n",
            kind: ExampleKind::WithExpected,
            source: "1 + 1\n",
            want: "3\n",
            outcome: Outcome::Failed {
                obtained: "2".to_string(),
            },
        },
        GradingCase {
            name: "exception_raised",
            text: "!!! 1/0\nZeroDivisionError\n",
            kind: ExampleKind::ExceptionExpected,
            source: "1/0\n",
            want: "ZeroDivisionError\n",
            outcome: Outcome::Passed,
        },
        GradingCase {
            name: "statement_binds",
            text: ">>> x = 5\n",
            kind: ExampleKind::WithoutExpected,
            source: "x = 5\n",
            want: "",
            outcome: Outcome::NoVerdict,
        },
        GradingCase {
            name: "exception_not_raised",
            text: "!!! 1 + 1\nZeroDivisionError\n",
            kind: ExampleKind::ExceptionExpected,
            source: "1 + 1\n",
            want: "ZeroDivisionError\n",
            outcome: Outcome::FailedWhenExceptionExpected,
        },
        GradingCase {
            name: "alternate_prompt",
            text: "$$$ 'ab' * 2\n'abab'\n",
            kind: ExampleKind::WithExpected,
            source: "'ab' * 2\n",
            want: "'abab'\n",
            outcome: Outcome::Passed,
        },
        GradingCase {
            name: "string_repr_differs",
            text: "%%% str(12)\n12\n",
            kind: ExampleKind::WithExpected,
            source: "str(12)\n",
            want: "12\n",
            outcome: Outcome::Failed {
                obtained: "'12'".to_string(),
            },
        },
        GradingCase {
            name: "runtime_error_in_value",
            text: ">>> [1, 2][7]\n1\n",
            kind: ExampleKind::WithExpected,
            source: "[1, 2][7]\n",
            want: "1\n",
            outcome: Outcome::Exception,
        },
        GradingCase {
            name: "runtime_error_in_statement",
            text: ">>> assert 1 == 2\n",
            kind: ExampleKind::WithoutExpected,
            source: "assert 1 == 2\n",
            want: "",
            outcome: Outcome::Exception,
        },
        GradingCase {
            name: "subclass_is_not_the_expected_exception",
            text: "!!! 1/0\nArithmeticError\n",
            kind: ExampleKind::ExceptionExpected,
            source: "1/0\n",
            want: "ArithmeticError\n",
            outcome: Outcome::FailedWhenExceptionExpected,
        },
        GradingCase {
            name: "want_is_not_an_exception",
            text: "!!! 1/0\nlen\n",
            kind: ExampleKind::ExceptionExpected,
            source: "1/0\n",
            want: "len\n",
            outcome: Outcome::Exception,
        },
    ]
});
