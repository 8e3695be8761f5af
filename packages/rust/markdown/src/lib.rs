//! Frontmatter parsing and Markdown-to-HTML rendering for writeup sources.
//!
//! Supports the subset of Markdown the site's writeups use: fenced code,
//! headings (`#`–`####`), single-line blockquotes, flat ordered and unordered
//! lists, paragraphs, and inline code/bold/italic. It is not CommonMark.
//!
//! ```
//! use writeups_markdown::{parse_frontmatter, render};
//!
//! let doc = parse_frontmatter("---\ntitle: Hello\n---\n\n# Hi\n\n- one\n- two");
//! assert_eq!(doc.metadata.get_str("title"), Some("Hello"));
//! assert_eq!(render(doc.body), "<h1>Hi</h1>\n<ul>\n<li>one</li>\n<li>two</li>\n</ul>");
//! ```

pub mod frontmatter;
pub mod inline;
pub mod render;

pub use frontmatter::{Frontmatter, parse_frontmatter};
pub use inline::{escape_angle_brackets, format_inline};
pub use render::render;
