//! Markdown to HTML conversion using pulldown-cmark.

use pulldown_cmark::{Options, Parser, html};

/// Markdown converter for README and guide bodies.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownConverter {
    options: Options,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownConverter {
    /// Create a converter with CommonMark plus the GitHub-style extensions.
    #[must_use]
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        Self { options }
    }

    /// Convert markdown text to an HTML fragment.
    #[must_use]
    pub fn to_html(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}
