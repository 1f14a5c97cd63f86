//! Indentation analysis over raw docstring text.

/// Width of a tab stop.
pub const TAB_SIZE: usize = 8;

/// Replace every tab with spaces up to the next tab stop.
///
/// The column counter restarts after `\n` and `\r`.
pub fn expand_tabs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0;
    for c in text.chars() {
        match c {
            '\t' => {
                let pad = TAB_SIZE - column % TAB_SIZE;
                out.extend(std::iter::repeat_n(' ', pad));
                column += pad;
            }
            '\n' | '\r' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}

/// Minimum number of leading spaces over all non-blank lines, or 0 when
/// every line is blank.
pub fn min_indent(text: &str) -> usize {
    text.split('\n')
        .filter_map(|line| {
            let rest = line.trim_start_matches(' ');
            match rest.chars().next() {
                Some(c) if !c.is_whitespace() => Some(line.len() - rest.len()),
                _ => None,
            }
        })
        .min()
        .unwrap_or(0)
}

/// Remove the first `n` characters of every line. Lines shorter than `n`
/// become empty.
pub fn strip_common_indent(text: &str, n: usize) -> String {
    text.split('\n')
        .map(|line| match line.char_indices().nth(n) {
            Some((offset, _)) => &line[offset..],
            None => "",
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expand_tabs() {
        assert_eq!(expand_tabs("\tx"), "        x");
        assert_eq!(expand_tabs("ab\tc"), "ab      c");
        assert_eq!(expand_tabs("abcdefgh\ti"), "abcdefgh        i");
        assert_eq!(expand_tabs("a\n\tb"), "a\n        b");
        assert_eq!(expand_tabs("no tabs"), "no tabs");
    }

    #[test]
    fn test_min_indent() {
        assert_eq!(min_indent("    a\n  b\n      c"), 2);
        assert_eq!(min_indent("    a\n\n   \n    b"), 4);
        assert_eq!(min_indent(""), 0);
        assert_eq!(min_indent("   \n  \n"), 0);
        assert_eq!(min_indent("x\n    y"), 0);
    }

    #[test]
    fn test_strip_common_indent_truncates_short_lines() {
        assert_eq!(
            strip_common_indent("    >>> 1\n  \n    2", 4),
            ">>> 1\n\n2"
        );
    }

    #[test]
    fn test_strip_then_reindent_round_trips() {
        let text = "    Doc line.\n      >>> f(1)\n    1\n        nested";
        let k = min_indent(text);
        assert_eq!(k, 4);

        let stripped = strip_common_indent(text, k);
        let rebuilt = stripped
            .split('\n')
            .map(|line| format!("{}{}", " ".repeat(k), line))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(rebuilt, text);
    }
}
