//! # Markdown Rendering Module
//!
//! Converts Markdown source into a complete, styled HTML document. Parsing
//! is done by pulldown-cmark with tables, strikethrough and fenced code
//! enabled; code blocks are highlighted with syntect and wrapped in a
//! `codehilite` container. The result is deterministic: the same input
//! always yields the same bytes.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Theme used for code blocks; chosen to sit on the light `pre` background.
const CODE_THEME: &str = "InspiredGitHub";

/// Stylesheet every rendered document is wrapped in.
pub const STYLESHEET: &str = r#"
body {
    font-family: 'Helvetica', 'Arial', sans-serif;
    background-color: #ffffff;
    color: #000000;
    margin: 20px;
    line-height: 1.6;
}
h1 {
    font-size: 2em;
    color: #000000;
    border-bottom: 1px solid #000000;
    padding-bottom: 0.3em;
}
code {
    font-family: 'Consolas', 'Courier New', monospace;
    background-color: #f0f0f0;
    padding: 2px 4px;
}
pre {
    font-family: 'Consolas', 'Courier New', monospace;
    background-color: #f0f0f0;
    padding: 16px;
}
"#;

/// A wrapped HTML document ready for the content surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlDocument {
    html: String,
}

impl HtmlDocument {
    /// Wrap an HTML fragment in the page skeleton and [`STYLESHEET`].
    pub fn wrap(fragment: &str) -> Self {
        let html = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
            STYLESHEET, fragment
        );
        Self { html }
    }

    /// The inline panel shown when a file could not be loaded.
    pub fn error_panel(message: &str) -> Self {
        Self::wrap(&format!(
            "<h3>Error</h3>\n<p>Could not load file: {}</p>\n",
            escape_html(message)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_string(self) -> String {
        self.html
    }
}

/// Converts Markdown to HTML with highlighted code blocks.
pub struct MarkdownRenderer {
    /// Syntax definitions for code highlighting
    syntax_set: SyntaxSet,
    /// Color themes for syntax highlighting
    theme_set: ThemeSet,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Creates a new renderer with syntect's bundled syntaxes and themes.
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Render Markdown into a complete styled document.
    pub fn render_document(&self, markdown: &str) -> HtmlDocument {
        HtmlDocument::wrap(&self.to_html(markdown))
    }

    /// Render Markdown into an HTML fragment.
    pub fn to_html(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        let parser = Parser::new_ext(markdown, options);

        let mut events = Vec::new();
        let mut code_block: Option<(String, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => fence_language(&info).to_string(),
                        CodeBlockKind::Indented => String::new(),
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, content)) = code_block.as_mut() {
                        content.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, content)) = code_block.take() {
                        let block = self.render_code_block(&content, &lang);
                        events.push(Event::Html(CowStr::from(block)));
                    }
                }
                other => events.push(other),
            }
        }

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }

    fn render_code_block(&self, content: &str, language: &str) -> String {
        let body = if language.is_empty() {
            escape_html(content)
        } else {
            self.render_highlighted_code(content, language)
        };

        let class = if language.is_empty() {
            String::new()
        } else {
            format!(" class=\"language-{}\"", escape_html(language))
        };

        format!(
            "<div class=\"codehilite\"><pre><code{}>{}</code></pre></div>\n",
            class, body
        )
    }

    fn render_highlighted_code(&self, content: &str, language: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(language)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let Some(theme) = self.theme_set.themes.get(CODE_THEME) else {
            tracing::warn!(
                "Code theme {} is not bundled; leaving code unstyled",
                CODE_THEME
            );
            return escape_html(content);
        };
        let mut highlighter = HighlightLines::new(syntax, theme);

        let mut out = String::new();
        for line in LinesWithEndings::from(content) {
            let highlighted = highlighter
                .highlight_line(line, &self.syntax_set)
                .ok()
                .and_then(|ranges| {
                    styled_line_to_highlighted_html(&ranges, IncludeBackground::No).ok()
                });
            match highlighted {
                Some(html) => out.push_str(&html),
                None => out.push_str(&escape_html(line)),
            }
        }
        out
    }
}

/// The language named by a fence info string: its first word, so
/// `rust,ignore` and `python {.numberLines}` still highlight.
fn fence_language(info: &str) -> &str {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .unwrap_or("")
}

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    if pulldown_cmark_escape::escape_html(&mut out, text).is_err() {
        tracing::warn!("Could not escape text for HTML output");
    }
    out
}
