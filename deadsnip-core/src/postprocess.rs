//! Regex repairs for syntax left dangling by span deletion.
//!
//! Deleting a named import from the middle of `import { a, b, c }` or every
//! binding of a `const` statement leaves text that no longer parses. Each
//! repair runs to a fixpoint before the next one starts. Every match removes
//! at least one character, so each fixpoint loop terminates.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Stray comma inside an `import {...}` / `export {...}` name list.
fn dangling_separator_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    // SAFETY: This regex pattern is hardcoded and covered by tests.
    REGEX.get_or_init(|| {
        Regex::new(r"(\b(?:export|import)\s*\{(?:\s*[a-zA-Z_$][a-zA-Z_$0-9]*\s*,)*)\s*,")
            .expect("Hardcoded regex pattern is valid")
    })
}

/// `var`/`const`/`let` statement with no bindings left.
fn empty_variable_statement_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    // SAFETY: This regex pattern is hardcoded and covered by tests.
    REGEX.get_or_init(|| {
        Regex::new(r"(?:^|\n) *(?:export *)?(?:var|const|let)\s*(?:;|\n)")
            .expect("Hardcoded regex pattern is valid")
    })
}

/// Apply every repair, each to a fixpoint.
pub fn postprocess(source: &str) -> String {
    run_repairs(source, false)
}

/// Like [`postprocess`], but each removed match is replaced by the line
/// breaks it contained, keeping line numbers stable.
pub fn postprocess_preserving_lines(source: &str) -> String {
    run_repairs(source, true)
}

fn run_repairs(source: &str, preserve_lines: bool) -> String {
    let mut text = source.to_string();

    text = repeat_till_stable(text, |t| {
        dangling_separator_regex().replace_all(t, |caps: &Captures| {
            let kept = caps[1].to_string();
            if preserve_lines {
                kept + &"\n".repeat(newlines_dropped(caps))
            } else {
                kept
            }
        })
    });

    text = repeat_till_stable(text, |t| {
        empty_variable_statement_regex().replace_all(t, |caps: &Captures| {
            if preserve_lines {
                "\n".repeat(caps[0].matches('\n').count())
            } else {
                String::new()
            }
        })
    });

    text
}

/// Line breaks in the part of a dangling-separator match that gets dropped.
fn newlines_dropped(caps: &Captures) -> usize {
    caps[0][caps[1].len()..].matches('\n').count()
}

/// Re-run `pass` until it stops changing the text.
fn repeat_till_stable<F>(mut text: String, pass: F) -> String
where
    F: for<'t> Fn(&'t str) -> Cow<'t, str>,
{
    loop {
        let next = match pass(&text) {
            Cow::Borrowed(_) => return text,
            Cow::Owned(next) => next,
        };
        if next == text {
            return text;
        }
        text = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_comma_fixpoint() {
        let once = postprocess("import { a, , }");
        assert_eq!(once, "import { a, }");
        assert_eq!(postprocess(&once), once);
    }

    #[test]
    fn test_comma_after_deleted_middle_name() {
        assert_eq!(
            postprocess("import { a, , c } from './x';"),
            "import { a, c } from './x';"
        );
    }

    #[test]
    fn test_leading_comma_in_export_list() {
        assert_eq!(postprocess("export { , b };"), "export { b };");
    }

    #[test]
    fn test_many_commas_collapse() {
        assert_eq!(postprocess("export {a,,,,b}"), "export {a,b}");
    }

    #[test]
    fn test_multiline_import_list() {
        let src = "import {\n  a,\n  ,\n  c,\n} from 'm';\n";
        assert_eq!(postprocess(src), "import {\n  a,\n  c,\n} from 'm';\n");
    }

    #[test]
    fn test_untouched_object_literal() {
        let src = "const o = { a, , b };";
        assert_eq!(postprocess(src), src);
    }

    #[test]
    fn test_empty_const_statement_removed() {
        assert_eq!(postprocess("a();\nconst ;\nb();\n"), "a();\nb();\n");
    }

    #[test]
    fn test_empty_export_let_removed() {
        assert_eq!(postprocess("export let\n"), "");
        assert_eq!(postprocess("x;\n  export var;"), "x;");
    }

    #[test]
    fn test_non_empty_declaration_kept() {
        let src = "const a = 1;\nlet b;\n";
        assert_eq!(postprocess(src), src);
    }

    #[test]
    fn test_preserving_lines_keeps_line_count() {
        let src = "a();\nconst ;\nimport {\n  x,\n  ,\n} from 'm';\nb();\n";
        let out = postprocess_preserving_lines(src);
        assert_eq!(out.split('\n').count(), src.split('\n').count());
        assert!(!out.contains("const ;"));
        assert!(out.contains("x,"));
        assert!(!out.contains(",\n  ,"));
    }

    #[test]
    fn test_idempotent() {
        let src = "import { a, , , b, , }\nconst;\nlet\n";
        let once = postprocess(src);
        assert_eq!(postprocess(&once), once);
    }
}
