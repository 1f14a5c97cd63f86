use super::*;
use crate::example::ExampleKind;
use crate::options::OptionFlags;
use pretty_assertions::assert_eq;

fn examples(text: &str) -> Vec<Example> {
    DocTestParser::new()
        .get_examples(text, "doc")
        .expect("text should parse")
}

#[test]
fn test_single_example_fragments() {
    let fragments = DocTestParser::new().parse(">>> 1 + 1\n2\n", "doc").unwrap();
    assert_eq!(fragments.len(), 3);
    assert_eq!(fragments[0], Fragment::Text(String::new()));
    assert_eq!(fragments[2], Fragment::Text(String::new()));

    let example = fragments[1].as_example().unwrap();
    assert_eq!(example.kind(), ExampleKind::WithExpected);
    assert_eq!(example.source(), "1 + 1\n");
    assert_eq!(example.want(), "2\n");
    assert_eq!(example.filename(), "doc");
    assert_eq!(example.line_number(), 0);
    assert_eq!(example.indent(), 0);
    assert_eq!(example.prompt(), ">>>");
}

#[test]
fn test_prose_is_kept_between_examples() {
    let text = "Adds numbers.\n\n>>> 1 + 1\n2\n\nMore prose.\n>>> x = 3\n";
    let fragments = DocTestParser::new().parse(text, "doc").unwrap();
    let prose: Vec<_> = fragments
        .iter()
        .filter_map(|fragment| match fragment {
            Fragment::Text(text) => Some(text.as_str()),
            Fragment::Example(_) => None,
        })
        .collect();
    assert_eq!(prose, vec!["Adds numbers.\n\n", "\nMore prose.\n", ""]);
}

#[test]
fn test_line_numbers_and_indentation() {
    let text = "    Summary.\n\n    >>> x = 1\n    >>> x\n    1\n\n      >>> y = 2\n";
    let found = examples(text);
    let positions: Vec<_> = found
        .iter()
        .map(|example| (example.line_number(), example.indent(), example.kind()))
        .collect();
    assert_eq!(
        positions,
        vec![
            (2, 4, ExampleKind::WithoutExpected),
            (3, 4, ExampleKind::WithExpected),
            (6, 6, ExampleKind::WithoutExpected),
        ]
    );
    assert_eq!(found[1].want(), "1\n");
    assert_eq!(found[1].lineno(), 4);
}

#[test]
fn test_tabs_are_expanded() {
    let found = examples("\t>>> 1\n\t1\n");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].indent(), 8);
    assert_eq!(found[0].want(), "1\n");
}

#[test]
fn test_blank_and_comment_sources_are_skipped() {
    let found = examples(">>> # just a note\n>>>\n>>> 1\n1\n");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].source(), "1\n");
    assert_eq!(found[0].line_number(), 2);
}

#[test]
fn test_continuation_prompt_is_not_source() {
    let found = examples(">>> total = 1 +\n... 2\n");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].source(), "total = 1 +\n");
    assert_eq!(found[0].want(), "... 2\n");
}

#[test]
fn test_exception_prompt() {
    let found = examples("!!! 1/0\nZeroDivisionError\n");
    assert_eq!(found[0].kind(), ExampleKind::ExceptionExpected);
    assert_eq!(found[0].want(), "ZeroDivisionError\n");
    assert_eq!(found[0].exception_message(), None);
}

#[test]
fn test_option_directive_is_recorded() {
    let found = examples(">>> 1 + 1 # doctest: +SKIP\n3\n");
    assert_eq!(found[0].options().get(&OptionFlags::SKIP), Some(&true));
}

#[test]
fn test_prompt_spacing_error_reports_document_line() {
    let err = DocTestParser::new()
        .parse("Prose.\n\n>>>raise\n", "doc")
        .unwrap_err();
    assert_eq!(
        err,
        ParseError::SpaceMissingAfterPrompt {
            name: "doc".to_string(),
            line: 3,
            text: ">>>raise".to_string(),
        }
    );
}

#[test]
fn test_invalid_option_reports_document_line() {
    let err = DocTestParser::new()
        .parse(">>> 1\n1\n>>> 2 # doctest: +BOGUS\n", "doc")
        .unwrap_err();
    assert_eq!(err.line(), 3);
    assert!(err.is_structural());
}

#[test]
fn test_empty_text() {
    let fragments = DocTestParser::new().parse("", "doc").unwrap();
    assert_eq!(fragments, vec![Fragment::Text(String::new())]);
}
