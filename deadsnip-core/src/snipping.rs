//! Span collapsing and text deletion.
//!
//! Spans are byte offsets into the original text. [`collapse_spans`] turns
//! an arbitrary bag of deletion candidates into a sorted, disjoint set;
//! [`apply_edits`] removes them from the text last-to-first so earlier
//! offsets stay valid.

use crate::error::{DeadsnipError, DeadsnipResult};
use crate::graph::Span;

/// Merge overlapping spans into a minimal sorted, disjoint set.
///
/// Two spans merge when the first one's `end` runs past the second one's
/// `full_start`, i.e. the second span's leading trivia starts inside the
/// first deletion. The merged span keeps the first span's starts.
///
/// Idempotent and insensitive to input order.
pub fn collapse_spans(spans: &[Span]) -> Vec<Span> {
    let mut sorted = spans.to_vec();
    sorted.sort_by_key(|s| (s.full_start(), s.start(), s.end()));

    let mut collapsed = Vec::with_capacity(sorted.len());
    let mut current: Option<Span> = None;
    for next in sorted {
        current = match current {
            Some(cur) if cur.end() > next.full_start() => Some(cur.with_end(cur.end().max(next.end()))),
            Some(cur) => {
                collapsed.push(cur);
                Some(next)
            }
            None => Some(next),
        };
    }
    if let Some(cur) = current {
        collapsed.push(cur);
    }
    collapsed
}

/// Delete collapsed `spans` from `source`.
///
/// Each span removes `source[start..end)`; a line break right after `end` is
/// absorbed so that deleting a whole statement does not leave a blank line
/// (unless the absorbed byte would belong to the next span).
///
/// With `preserve_line_numbers`, every removed range is replaced by as many
/// `\n` as it contained, so the line numbers of surviving code are stable.
///
/// Precondition: `spans` is the output of [`collapse_spans`].
pub fn apply_edits(source: &str, spans: &[Span], preserve_line_numbers: bool) -> DeadsnipResult<String> {
    let ranges = deletion_ranges(source, spans)?;

    let mut acc = source.to_string();
    for &(start, end) in ranges.iter().rev() {
        let replacement = if preserve_line_numbers {
            "\n".repeat(source[start..end].matches('\n').count())
        } else {
            String::new()
        };
        acc.replace_range(start..end, &replacement);
    }
    Ok(acc)
}

/// Validate spans against `source` and compute the byte ranges to delete,
/// in ascending order.
fn deletion_ranges(source: &str, spans: &[Span]) -> DeadsnipResult<Vec<(usize, usize)>> {
    let bytes = source.as_bytes();
    let mut ranges = Vec::with_capacity(spans.len());

    for (i, span) in spans.iter().enumerate() {
        let (start, mut end) = (span.start(), span.end());
        if end > source.len() {
            return Err(DeadsnipError::invalid_span(
                span.full_start(),
                start,
                end,
                format!("past end of text ({} bytes)", source.len()),
            ));
        }
        if !source.is_char_boundary(start) || !source.is_char_boundary(end) {
            return Err(DeadsnipError::invalid_span(
                span.full_start(),
                start,
                end,
                "not on a character boundary",
            ));
        }

        let next_start = spans.get(i + 1).map_or(usize::MAX, |s| s.start());
        if bytes.get(end) == Some(&b'\n') && end < next_start {
            end += 1;
        }
        ranges.push((start, end));
    }
    Ok(ranges)
}

/// Number of lines in `text`. A final line break does not start a new line.
pub fn line_count(text: &str) -> usize {
    text.lines().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(full_start: usize, start: usize, end: usize) -> Span {
        Span::new(full_start, start, end).unwrap()
    }

    fn is_sorted_disjoint(spans: &[Span]) -> bool {
        spans.windows(2).all(|w| w[0].end() <= w[1].full_start())
    }

    #[test]
    fn test_collapse_example() {
        let input = [span(0, 0, 5), span(2, 3, 8), span(10, 10, 12)];
        assert_eq!(collapse_spans(&input), vec![span(0, 0, 8), span(10, 10, 12)]);
    }

    #[test]
    fn test_collapse_empty() {
        assert!(collapse_spans(&[]).is_empty());
    }

    #[test]
    fn test_collapse_contained_span() {
        let input = [span(0, 0, 20), span(5, 6, 9)];
        assert_eq!(collapse_spans(&input), vec![span(0, 0, 20)]);
    }

    #[test]
    fn test_collapse_touching_spans_stay_separate() {
        // end == next.full_start does not overlap
        let input = [span(0, 0, 5), span(5, 5, 9)];
        assert_eq!(collapse_spans(&input).len(), 2);
    }

    #[test]
    fn test_collapse_merges_through_leading_trivia() {
        // second declaration's comment starts inside the first deletion
        let input = [span(0, 0, 10), span(8, 12, 20)];
        assert_eq!(collapse_spans(&input), vec![span(0, 0, 20)]);
    }

    #[test]
    fn test_collapse_is_idempotent() {
        let input = [span(4, 6, 9), span(0, 0, 5), span(12, 14, 30), span(20, 22, 25)];
        let once = collapse_spans(&input);
        assert!(is_sorted_disjoint(&once));
        assert_eq!(collapse_spans(&once), once);
    }

    #[test]
    fn test_collapse_is_order_insensitive() {
        let a = [span(0, 0, 5), span(2, 3, 8), span(10, 10, 12), span(11, 11, 15)];
        let mut b = a;
        b.reverse();
        let mut c = a;
        c.swap(0, 2);
        assert_eq!(collapse_spans(&a), collapse_spans(&b));
        assert_eq!(collapse_spans(&a), collapse_spans(&c));
    }

    #[test]
    fn test_collapse_preserves_union() {
        let input = [span(1, 2, 6), span(3, 4, 7), span(9, 9, 11)];
        let out = collapse_spans(&input);
        for offset in 0..15 {
            let before = input.iter().any(|s| s.contains(offset));
            let after = out.iter().any(|s| s.contains(offset));
            assert_eq!(before, after, "offset {} differs", offset);
        }
    }

    #[test]
    fn test_apply_example() {
        let out = apply_edits("0123456789", &[span(2, 2, 4), span(6, 6, 8)], false).unwrap();
        assert_eq!(out, "014589");
    }

    #[test]
    fn test_apply_whole_file() {
        let source = "const a = 1;\nconst b = 2;\n";
        let out = apply_edits(source, &[span(0, 0, source.len())], false).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_apply_absorbs_trailing_newline() {
        let source = "keep();\ndrop();\nkeep2();\n";
        let start = source.find("drop").unwrap();
        let end = start + "drop();".len();
        let out = apply_edits(source, &[span(start, start, end)], false).unwrap();
        assert_eq!(out, "keep();\nkeep2();\n");
    }

    #[test]
    fn test_apply_newline_not_stolen_from_next_span() {
        let source = "ab\ncd";
        let out = apply_edits(source, &[span(0, 0, 2), span(2, 2, 3)], false).unwrap();
        assert_eq!(out, "cd");
    }

    #[test]
    fn test_apply_preserving_line_numbers() {
        let source = "a();\nfunction dead() {\n  x();\n}\nb();\n";
        let start = source.find("function").unwrap();
        let end = source.find("}\n").unwrap() + 1;
        let out = apply_edits(source, &[span(start, start, end)], true).unwrap();
        assert_eq!(out, "a();\n\n\n\nb();\n");
        assert_eq!(line_count(&out), line_count(source));
    }

    #[test]
    fn test_apply_order_independence() {
        // Deleting last-to-first yields what independent slicing yields.
        let source = "aaaa bbbb cccc dddd";
        let spans = [span(0, 0, 5), span(10, 10, 15)];
        let out = apply_edits(source, &spans, false).unwrap();
        let expected: String = source
            .char_indices()
            .filter(|(i, _)| !spans.iter().any(|s| s.contains(*i)))
            .map(|(_, c)| c)
            .collect();
        assert_eq!(out, expected);
        assert_eq!(out, "bbbb dddd");
    }

    #[test]
    fn test_apply_rejects_out_of_range() {
        let err = apply_edits("short", &[span(0, 2, 40)], false).unwrap_err();
        assert!(matches!(err, DeadsnipError::InvalidSpan { .. }));
    }

    #[test]
    fn test_apply_rejects_split_character() {
        let source = "é = 1;";
        assert!(apply_edits(source, &[span(0, 1, 3)], false).is_err());
        assert_eq!(apply_edits(source, &[span(0, 0, 2)], false).unwrap(), " = 1;");
    }

    #[test]
    fn test_apply_no_spans_is_identity() {
        assert_eq!(apply_edits("x\ny\n", &[], true).unwrap(), "x\ny\n");
    }

    #[test]
    fn test_line_count() {
        assert_eq!(line_count(""), 0);
        assert_eq!(line_count("a\nb"), 2);
        assert_eq!(line_count("a\nb\n"), 2);
        assert_eq!(line_count("a\n\n"), 2);
    }
}
