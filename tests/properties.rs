use std::collections::BTreeSet;

use docverdict::options::{optionflag_by_name, register_optionflag};
use docverdict::sandbox::Sandbox;
use docverdict::scanner::{min_indent, strip_common_indent};
use docverdict::{DocTestParser, ExampleKind, Host, ParseError, Verdict};
use pretty_assertions::assert_eq;

fn grade(text: &str, sandbox: &Sandbox) -> Option<Verdict> {
    let example = DocTestParser::new()
        .get_examples(text, "property")
        .expect("text should parse")
        .remove(0);
    let mut globals = sandbox.new_namespace();
    let mut locals = sandbox.new_namespace();
    example.exec_and_compute_verdict(sandbox, None, &mut globals, &mut locals)
}

#[test]
fn test_flag_registration_is_idempotent_and_disjoint() {
    let names = ["PROPERTY_ONE", "PROPERTY_TWO", "PROPERTY_THREE", "PROPERTY_FOUR"];
    let first: Vec<_> = names
        .iter()
        .map(|name| register_optionflag(name).unwrap())
        .collect();
    let second: Vec<_> = names
        .iter()
        .map(|name| register_optionflag(name).unwrap())
        .collect();
    assert_eq!(first, second);

    let bits: BTreeSet<u32> = first.iter().map(|flag| flag.bits()).collect();
    assert_eq!(bits.len(), names.len());
    for flag in &first {
        assert_eq!(flag.bits().count_ones(), 1);
    }
    let union = first.iter().fold(0, |acc, flag| {
        assert_eq!(acc & flag.bits(), 0);
        acc | flag.bits()
    });
    assert_eq!(union.count_ones() as usize, names.len());
    assert_eq!(optionflag_by_name("PROPERTY_TWO"), Some(first[1]));
}

#[test]
fn test_indentation_round_trip() {
    let texts = [
        "    a\n      b\n    c",
        "  >>> 1\n  1\n\n  prose\n",
        "   x\n\n   y\n     z",
        "flush\n  indented",
    ];
    for text in texts {
        let k = min_indent(text);
        let stripped = strip_common_indent(text, k);
        let rebuilt: Vec<String> = stripped
            .split('\n')
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("{}{line}", " ".repeat(k))
                }
            })
            .collect();
        let original: Vec<&str> = text
            .split('\n')
            .map(|line| if line.trim().is_empty() { "" } else { line })
            .collect();
        assert_eq!(rebuilt, original, "round trip of {text:?}");
    }
}

#[test]
fn test_source_is_single_line() {
    let examples = DocTestParser::new()
        .get_examples(">>> x = 1\n... + 1\n>>> x\n1\n", "property")
        .unwrap();
    assert_eq!(examples.len(), 2);
    assert_eq!(examples[0].source(), "x = 1\n");
    assert_eq!(examples[0].want(), "... + 1\n");
    assert_eq!(examples[1].source(), "x\n");
    assert_eq!(examples[1].line_number(), 2);
}

#[test]
fn test_prompt_needs_a_space() {
    for (text, line) in [
        (">>>x\n", 1),
        ("Prose.\n\n!!!1/0\nZeroDivisionError\n", 3),
        ("  $$$'a'\n", 1),
    ] {
        let err = DocTestParser::new().parse(text, "property").unwrap_err();
        assert!(
            matches!(err, ParseError::SpaceMissingAfterPrompt { .. }),
            "{text:?} gave {err:?}"
        );
        assert_eq!(err.line(), line);
    }
}

#[test]
fn test_classifier_is_total() {
    let cases = [
        (">>> 1\n1\n", ExampleKind::WithExpected),
        (">>> 1\n", ExampleKind::WithoutExpected),
        ("$$$ 1\n", ExampleKind::WithoutExpected),
        ("%%% 1\nx\n", ExampleKind::WithExpected),
        ("!!! 1\nValueError\n", ExampleKind::ExceptionExpected),
        ("!!! 1\n", ExampleKind::ExceptionExpected),
    ];
    for (text, kind) in cases {
        let examples = DocTestParser::new().get_examples(text, "property").unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].kind(), kind, "kind of {text:?}");
    }
}

#[test]
fn test_runtime_errors_are_contained() {
    let sandbox = Sandbox::new();
    for text in [
        ">>> 1 / 0\n1\n",
        ">>> undefined\n",
        ">>> 1\nundefined\n",
        ">>> raise KeyError('k')\n",
        ">>> max([])\n0\n",
    ] {
        assert!(
            matches!(grade(text, &sandbox), Some(Verdict::Exception { .. })),
            "{text:?} should become an exception verdict"
        );
    }
}

#[test]
fn test_exception_name_matches_exactly() {
    let sandbox = Sandbox::new();
    let mut globals = sandbox.new_namespace();
    let mut setup = sandbox.new_namespace();
    sandbox
        .exec("class Narrow(ValueError): pass", "setup", &mut setup, &mut globals)
        .unwrap();

    let example = DocTestParser::new()
        .get_examples("!!! raise Narrow('x')\nValueError\n", "property")
        .unwrap()
        .remove(0);
    let mut locals = sandbox.new_namespace();
    let verdict = example.exec_and_compute_verdict(&sandbox, None, &mut globals, &mut locals);
    assert!(matches!(
        verdict,
        Some(Verdict::FailedWhenExceptionExpected { .. })
    ));

    let example = DocTestParser::new()
        .get_examples("!!! raise Narrow('x')\nNarrow\n", "property")
        .unwrap()
        .remove(0);
    let verdict = example.exec_and_compute_verdict(&sandbox, None, &mut globals, &mut locals);
    assert!(matches!(verdict, Some(Verdict::Passed(_))));
}
