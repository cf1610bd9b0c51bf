//! Markdown rendering
//!
//! Blog content is stored as the markdown the editor toolbar produces. Public
//! reads render it to HTML with pulldown-cmark. Raw HTML blocks (video tags,
//! YouTube embeds) pass through unchanged.
//!
//! ```
//! use folio::services::markdown::MarkdownRenderer;
//!
//! let html = MarkdownRenderer::new().render("# Hello\n\nThis is **bold** text.");
//! assert!(html.contains("<h1>"));
//! assert!(html.contains("<strong>"));
//! ```

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// Markdown to HTML renderer
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Tables, strikethrough, task lists and smart punctuation enabled
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
        Self { options }
    }

    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let events = process_code_blocks(parser);

        let mut output = String::new();
        html::push_html(&mut output, events.into_iter());
        output
    }

    /// Number of words outside markup, used for reading-time estimates
    pub fn word_count(&self, markdown: &str) -> usize {
        Parser::new_ext(markdown, self.options)
            .filter_map(|event| match event {
                Event::Text(text) | Event::Code(text) => Some(text.split_whitespace().count()),
                _ => None,
            })
            .sum()
    }

    /// Minutes to read at 200 words per minute, at least one
    pub fn reading_minutes(&self, markdown: &str) -> usize {
        self.word_count(markdown).div_ceil(200).max(1)
    }
}

/// Replace fenced code blocks with a `<pre><code class="language-..">` block
fn process_code_blocks(parser: Parser<'_>) -> Vec<Event<'_>> {
    let mut events = Vec::new();
    let mut code: Option<(Option<String>, String)> = None;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.trim().is_empty() => {
                        Some(lang.trim().to_string())
                    }
                    _ => None,
                };
                code = Some((lang, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((lang, body)) = code.take() {
                    events.push(Event::Html(code_block(lang.as_deref(), &body).into()));
                }
            }
            Event::Text(text) if code.is_some() => {
                if let Some((_, body)) = code.as_mut() {
                    body.push_str(&text);
                }
            }
            other => events.push(other),
        }
    }

    events
}

fn code_block(lang: Option<&str>, body: &str) -> String {
    match lang {
        Some(lang) => format!(
            "<pre><code class=\"language-{}\">{}</code></pre>\n",
            html_escape(lang),
            html_escape(body)
        ),
        None => format!("<pre><code>{}</code></pre>\n", html_escape(body)),
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
