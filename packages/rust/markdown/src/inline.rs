//! Inline formatting passes.
//!
//! Each pass is a whole-string regex substitution. Order matters: code spans
//! are swapped out for placeholders first so later passes cannot touch their
//! contents, then bold runs before italic.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

const SPAN_OPEN: char = '\u{E002}';
const SPAN_CLOSE: char = '\u{E003}';

/// Apply inline formatting (code spans, bold, italic) to one line of text.
pub fn format_inline(text: &str) -> String {
    let text = escape_reserved(text, SPAN_OPEN, SPAN_CLOSE);
    let mut spans = Vec::new();
    let mut result = protect_code_spans(&text, &mut spans);

    result = render_bold(&result);
    result = render_italic(&result);

    restore_code_spans(result, &spans)
}

/// Escape the characters that would otherwise be read as markup.
pub fn escape_angle_brackets(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

/// Replace placeholder delimiters already present in the source with numeric
/// character references, so only generated placeholders are ever restored.
pub(crate) fn escape_reserved(text: &str, open: char, close: char) -> Cow<'_, str> {
    if !text.contains(|c: char| c == open || c == close) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        if c == open || c == close {
            out.push_str(&format!("&#x{:X};", u32::from(c)));
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

// ---------------------------------------------------------------------------
// Pass 1: Code spans
// ---------------------------------------------------------------------------

fn protect_code_spans(text: &str, spans: &mut Vec<String>) -> String {
    static CODE_SPAN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));

    CODE_SPAN_RE
        .replace_all(text, |caps: &Captures<'_>| {
            spans.push(format!("<code>{}</code>", escape_angle_brackets(&caps[1])));
            format!("{SPAN_OPEN}{}{SPAN_CLOSE}", spans.len() - 1)
        })
        .into_owned()
}

fn restore_code_spans(mut text: String, spans: &[String]) -> String {
    for (i, span) in spans.iter().enumerate() {
        text = text.replacen(&format!("{SPAN_OPEN}{i}{SPAN_CLOSE}"), span, 1);
    }
    text
}

// ---------------------------------------------------------------------------
// Pass 2: Bold
// ---------------------------------------------------------------------------

fn render_bold(text: &str) -> String {
    static STAR_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"));
    static UNDERSCORE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"__([^_]+)__").expect("valid regex"));

    let text = STAR_RE.replace_all(text, "<strong>${1}</strong>");
    UNDERSCORE_RE
        .replace_all(&text, "<strong>${1}</strong>")
        .into_owned()
}

// ---------------------------------------------------------------------------
// Pass 3: Italic
// ---------------------------------------------------------------------------

fn render_italic(text: &str) -> String {
    static STAR_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("valid regex"));
    static UNDERSCORE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"_([^_]+)_").expect("valid regex"));

    let text = STAR_RE.replace_all(text, "<em>${1}</em>");
    UNDERSCORE_RE.replace_all(&text, "<em>${1}</em>").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(format_inline("nothing to see here"), "nothing to see here");
    }

    #[test]
    fn bold_and_italic() {
        assert_eq!(
            format_inline("Some **bold** and *italic* text."),
            "Some <strong>bold</strong> and <em>italic</em> text."
        );
        assert_eq!(
            format_inline("__strong__ and _soft_"),
            "<strong>strong</strong> and <em>soft</em>"
        );
    }

    #[test]
    fn code_span_contents_are_protected() {
        assert_eq!(
            format_inline("run `a * b * c` then **go**"),
            "run <code>a * b * c</code> then <strong>go</strong>"
        );
        assert_eq!(
            format_inline("`__init__` is special"),
            "<code>__init__</code> is special"
        );
    }

    #[test]
    fn code_span_escapes_markup() {
        assert_eq!(
            format_inline("use `<script>` carefully"),
            "use <code>&lt;script&gt;</code> carefully"
        );
    }

    #[test]
    fn bold_may_wrap_code_span() {
        assert_eq!(
            format_inline("**`id`**"),
            "<strong><code>id</code></strong>"
        );
    }

    #[test]
    fn unbalanced_markers_stay_literal() {
        assert_eq!(format_inline("2 * 3 = 6"), "2 * 3 = 6");
        assert_eq!(format_inline("a lone ` tick"), "a lone ` tick");
    }

    #[test]
    fn literal_delimiters_do_not_capture_code_spans() {
        assert_eq!(
            format_inline("\u{E002}0\u{E003} then `x`"),
            "&#xE002;0&#xE003; then <code>x</code>"
        );
    }

    #[test]
    fn escape_reserved_borrows_clean_text() {
        assert!(matches!(
            escape_reserved("plain", SPAN_OPEN, SPAN_CLOSE),
            Cow::Borrowed("plain")
        ));
    }
}
