//! Markdown rendering
//!
//! Publication bodies are stored as Markdown and rendered to HTML by the theme's
//! `markdown` filter.
//!
//! ```
//! use folio::services::markdown::render_markdown;
//!
//! let html = render_markdown("# Hello\n\nThis is **bold** text.");
//! assert!(html.contains("<h1>"));
//! assert!(html.contains("<strong>"));
//! ```

use pulldown_cmark::{html, Options, Parser};

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options
}

/// Render Markdown source to an HTML fragment
pub fn render_markdown(source: &str) -> String {
    let parser = Parser::new_ext(source, options());
    let mut output = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}
