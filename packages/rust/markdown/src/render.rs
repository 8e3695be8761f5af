//! Block-level Markdown rendering.
//!
//! Fenced code blocks are swapped for placeholders up front, then the body is
//! scanned line by line. Grouping of paragraphs and lists is driven by a single
//! [`Block`] state.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::inline::{escape_angle_brackets, escape_reserved, format_inline};

const BLOCK_OPEN: char = '\u{E000}';
const BLOCK_CLOSE: char = '\u{E001}';

/// Render a Markdown body to an HTML fragment.
///
/// Never fails: unrecognized or unbalanced syntax falls through as text, and
/// every container opened here is closed before returning.
pub fn render(body: &str) -> String {
    let body = escape_reserved(body, BLOCK_OPEN, BLOCK_CLOSE);
    let mut code_blocks = Vec::new();
    let protected = protect_code_blocks(&body, &mut code_blocks);

    let mut renderer = Renderer::default();
    for line in protected.lines() {
        renderer.push(classify(line));
    }
    let html = renderer.finish();

    debug!(
        input_len = body.len(),
        output_len = html.len(),
        code_blocks = code_blocks.len(),
        "markdown rendered"
    );

    restore_code_blocks(html, &code_blocks)
}

// ---------------------------------------------------------------------------
// Fenced code blocks
// ---------------------------------------------------------------------------

fn protect_code_blocks(body: &str, blocks: &mut Vec<String>) -> String {
    static FENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)```(?:\w*\r?\n)?(.*?)```").expect("valid regex"));

    FENCE_RE
        .replace_all(body, |caps: &Captures<'_>| {
            let code = escape_angle_brackets(caps[1].trim());
            blocks.push(format!("<pre><code>{code}</code></pre>"));
            format!("{BLOCK_OPEN}{}{BLOCK_CLOSE}", blocks.len() - 1)
        })
        .into_owned()
}

fn restore_code_blocks(mut html: String, blocks: &[String]) -> String {
    for (i, block) in blocks.iter().enumerate() {
        html = html.replacen(&format!("{BLOCK_OPEN}{i}{BLOCK_CLOSE}"), block, 1);
    }
    html
}

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    /// Holds a code block placeholder; emitted verbatim.
    Code(&'a str),
    Heading(usize, &'a str),
    Quote(&'a str),
    Bullet(&'a str),
    Numbered(&'a str),
    Blank,
    Text(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    static HEADING_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(#{1,4})\s+(.*)$").expect("valid regex"));
    static QUOTE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^>\s+(.*)$").expect("valid regex"));
    static BULLET_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[-*]\s+(.*)$").expect("valid regex"));
    static NUMBERED_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\d+\.\s+(.*)$").expect("valid regex"));
    static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(&format!(r"{BLOCK_OPEN}\d+{BLOCK_CLOSE}")).expect("valid regex")
    });

    if PLACEHOLDER_RE.is_match(line) {
        return Line::Code(line);
    }
    if let Some(caps) = HEADING_RE.captures(line) {
        return Line::Heading(group(&caps, 1).len(), group(&caps, 2));
    }
    if let Some(caps) = QUOTE_RE.captures(line) {
        return Line::Quote(group(&caps, 1));
    }
    if let Some(caps) = BULLET_RE.captures(line) {
        return Line::Bullet(group(&caps, 1));
    }
    if let Some(caps) = NUMBERED_RE.captures(line) {
        return Line::Numbered(group(&caps, 1));
    }
    if line.trim().is_empty() {
        return Line::Blank;
    }
    Line::Text(line)
}

fn group<'h>(caps: &Captures<'h>, i: usize) -> &'h str {
    caps.get(i).map_or("", |m| m.as_str())
}

// ---------------------------------------------------------------------------
// Block state machine
// ---------------------------------------------------------------------------

/// The container currently open in the output.
#[derive(Debug, Default)]
enum Block {
    #[default]
    None,
    /// Formatted lines waiting to be joined into one `<p>`.
    Paragraph(Vec<String>),
    UnorderedList,
    OrderedList,
    /// Quote lines are self-contained; nothing is left open.
    Blockquote,
}

#[derive(Debug, Default)]
struct Renderer {
    out: Vec<String>,
    state: Block,
}

impl Renderer {
    fn push(&mut self, line: Line<'_>) {
        match line {
            Line::Code(placeholder) => {
                self.close();
                self.out.push(placeholder.to_string());
            }
            Line::Heading(level, text) => {
                self.close();
                self.out
                    .push(format!("<h{level}>{}</h{level}>", format_inline(text)));
            }
            Line::Quote(text) => {
                self.close();
                self.out
                    .push(format!("<blockquote>{}</blockquote>", format_inline(text)));
                self.state = Block::Blockquote;
            }
            Line::Bullet(text) => {
                if !matches!(self.state, Block::UnorderedList) {
                    self.close();
                    self.out.push("<ul>".into());
                    self.state = Block::UnorderedList;
                }
                self.out.push(format!("<li>{}</li>", format_inline(text)));
            }
            Line::Numbered(text) => {
                if !matches!(self.state, Block::OrderedList) {
                    self.close();
                    self.out.push("<ol>".into());
                    self.state = Block::OrderedList;
                }
                self.out.push(format!("<li>{}</li>", format_inline(text)));
            }
            Line::Blank => self.close(),
            Line::Text(text) => {
                let formatted = format_inline(text.trim());
                match &mut self.state {
                    Block::Paragraph(lines) => lines.push(formatted),
                    _ => {
                        self.close();
                        self.state = Block::Paragraph(vec![formatted]);
                    }
                }
            }
        }
    }

    /// Close whatever is open and return to [`Block::None`].
    fn close(&mut self) {
        match std::mem::take(&mut self.state) {
            Block::Paragraph(lines) => {
                let text = lines.join(" ");
                let text = text.trim();
                if !text.is_empty() {
                    self.out.push(format!("<p>{text}</p>"));
                }
            }
            Block::UnorderedList => self.out.push("</ul>".into()),
            Block::OrderedList => self.out.push("</ol>".into()),
            Block::Blockquote | Block::None => {}
        }
    }

    fn finish(mut self) -> String {
        self.close();
        self.out.join("\n")
    }
}
