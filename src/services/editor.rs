//! Markdown editor toolbar
//!
//! Each toolbar action is a pure function over the editor content and the
//! current selection. Positions are counted in characters, not bytes, and
//! out-of-range selections are clamped to the content length.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static YOUTUBE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:youtube\.com/(?:[^/\n\s]+/\S+/|(?:v|e(?:mbed)?)/|\S*?[?&]v=)|youtu\.be/)([a-zA-Z0-9_-]{11})",
    )
    .expect("valid youtube regex")
});

const DEFAULT_LINK_TEXT: &str = "link text";

/// Errors raised by toolbar actions
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("URL is required")]
    EmptyUrl,

    #[error("Invalid YouTube URL. Please provide a valid YouTube video URL.")]
    InvalidYouTubeUrl,
}

/// Character range inside the editor content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn caret(position: usize) -> Self {
        Self::new(position, position)
    }

    /// Order the bounds and clamp them to `len` characters
    fn clamped(self, len: usize) -> Self {
        let start = self.start.min(self.end).min(len);
        let end = self.start.max(self.end).min(len);
        Self { start, end }
    }
}

/// Content and selection after a toolbar action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditResult {
    pub content: String,
    pub selection: Selection,
}

/// Kind of media inserted by the media button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Content split around a clamped selection
struct Split<'a> {
    before: &'a str,
    selected: &'a str,
    after: &'a str,
    selection: Selection,
}

fn split(content: &str, selection: Selection) -> Split<'_> {
    let len = content.chars().count();
    let selection = selection.clamped(len);
    let start = byte_offset(content, selection.start);
    let end = byte_offset(content, selection.end);
    Split {
        before: &content[..start],
        selected: &content[start..end],
        after: &content[end..],
        selection,
    }
}

fn byte_offset(content: &str, chars: usize) -> usize {
    content
        .char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(content.len())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Wrap the selection in `before` / `after`. The new selection covers the
/// originally selected text inside the markers.
pub fn insert_format(content: &str, selection: Selection, before: &str, after: &str) -> EditResult {
    let parts = split(content, selection);
    let start = parts.selection.start + char_len(before);
    let end = start + char_len(parts.selected);

    EditResult {
        content: format!(
            "{}{}{}{}{}",
            parts.before, before, parts.selected, after, parts.after
        ),
        selection: Selection::new(start, end),
    }
}

/// Prefix every selected line with `prefix` and append a blank line.
/// The caret lands after the blank line.
pub fn insert_list(content: &str, selection: Selection, prefix: &str) -> EditResult {
    let parts = split(content, selection);
    let formatted = parts
        .selected
        .split('\n')
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n");
    let caret = parts.selection.start + char_len(&formatted) + 2;

    EditResult {
        content: format!("{}{}\n\n{}", parts.before, formatted, parts.after),
        selection: Selection::caret(caret),
    }
}

/// Replace the selection with `[text](url)`
pub fn insert_link(content: &str, selection: Selection, url: &str) -> Result<EditResult, EditorError> {
    let url = require_url(url)?;
    let parts = split(content, selection);
    let text = if parts.selected.is_empty() {
        DEFAULT_LINK_TEXT
    } else {
        parts.selected
    };
    let link = format!("[{}]({})", text, url);
    let caret = parts.selection.start + char_len(&link);

    Ok(EditResult {
        content: format!("{}{}{}", parts.before, link, parts.after),
        selection: Selection::caret(caret),
    })
}

/// Insert an image or video at the selection start
pub fn insert_media(
    content: &str,
    selection: Selection,
    kind: MediaKind,
    url: &str,
    alt: Option<&str>,
) -> Result<EditResult, EditorError> {
    let url = require_url(url)?;
    let snippet = match kind {
        MediaKind::Image => format!("![{}]({})", alt.unwrap_or_default(), url),
        MediaKind::Video => format!("<video controls src=\"{}\"></video>", url),
    };
    Ok(insert_at_start(content, selection, &snippet))
}

/// Insert a YouTube embed for `url` at the selection start
pub fn insert_youtube(content: &str, selection: Selection, url: &str) -> Result<EditResult, EditorError> {
    let id = youtube_id(require_url(url)?).ok_or(EditorError::InvalidYouTubeUrl)?;
    Ok(insert_at_start(content, selection, &youtube_embed(id)))
}

/// Extract the 11 character video id from a youtube.com or youtu.be URL
pub fn youtube_id(url: &str) -> Option<&str> {
    YOUTUBE_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn youtube_embed(id: &str) -> String {
    format!(
        "<iframe width=\"560\" height=\"315\" src=\"https://www.youtube.com/embed/{}\" \
         title=\"YouTube video player\" frameborder=\"0\" \
         allow=\"accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture\" \
         allowfullscreen></iframe>",
        id
    )
}

fn require_url(url: &str) -> Result<&str, EditorError> {
    let url = url.trim();
    if url.is_empty() {
        Err(EditorError::EmptyUrl)
    } else {
        Ok(url)
    }
}

fn insert_at_start(content: &str, selection: Selection, snippet: &str) -> EditResult {
    let parts = split(content, selection);
    let caret = parts.selection.start + char_len(snippet);
    EditResult {
        content: format!(
            "{}{}{}{}",
            parts.before, snippet, parts.selected, parts.after
        ),
        selection: Selection::caret(caret),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_wraps_selection() {
        let result = insert_format("make this bold", Selection::new(5, 9), "**", "**");
        assert_eq!(result.content, "make **this** bold");
        assert_eq!(result.selection, Selection::new(7, 11));
    }

    #[test]
    fn test_format_without_selection() {
        let result = insert_format("", Selection::caret(0), "_", "_");
        assert_eq!(result.content, "__");
        assert_eq!(result.selection, Selection::caret(1));
    }

    #[test]
    fn test_heading_and_code_block() {
        let heading = insert_format("Title", Selection::new(0, 5), "## ", "");
        assert_eq!(heading.content, "## Title");

        let code = insert_format("let x = 1;", Selection::new(0, 10), "```\n", "\n```");
        assert_eq!(code.content, "```\nlet x = 1;\n```");
        assert_eq!(code.selection, Selection::new(4, 14));
    }

    #[test]
    fn test_selection_counts_characters() {
        let content = "مرحبا world";
        let result = insert_format(content, Selection::new(0, 5), "**", "**");
        assert_eq!(result.content, "**مرحبا** world");
        assert_eq!(result.selection, Selection::new(2, 7));
    }

    #[test]
    fn test_out_of_range_selection_is_clamped() {
        let result = insert_format("abc", Selection::new(10, 2), "_", "_");
        assert_eq!(result.content, "ab_c_");
        assert_eq!(result.selection, Selection::new(3, 4));
    }

    #[test]
    fn test_bullet_list() {
        let result = insert_list("one\ntwo", Selection::new(0, 7), "- ");
        assert_eq!(result.content, "- one\n- two\n\n");
        assert_eq!(result.selection, Selection::caret(13));
    }

    #[test]
    fn test_numbered_list_keeps_surrounding_text() {
        let result = insert_list("Intro\nitem\nOutro", Selection::new(6, 10), "1. ");
        assert_eq!(result.content, "Intro\n1. item\n\n\nOutro");
        assert_eq!(result.selection, Selection::caret(15));
    }

    #[test]
    fn test_link_uses_selection() {
        let result = insert_link("see docs", Selection::new(4, 8), "https://example.com").unwrap();
        assert_eq!(result.content, "see [docs](https://example.com)");
    }

    #[test]
    fn test_link_default_text() {
        let result = insert_link("", Selection::default(), "https://example.com").unwrap();
        assert_eq!(result.content, "[link text](https://example.com)");
        assert_eq!(
            insert_link("", Selection::default(), "  ").unwrap_err(),
            EditorError::EmptyUrl
        );
    }

    #[test]
    fn test_media_inserted_at_selection_start() {
        let image = insert_media(
            "AB",
            Selection::new(1, 2),
            MediaKind::Image,
            "/cat.png",
            Some("cat"),
        )
        .unwrap();
        assert_eq!(image.content, "A![cat](/cat.png)B");

        let video = insert_media("", Selection::default(), MediaKind::Video, "/clip.mp4", None).unwrap();
        assert_eq!(video.content, "<video controls src=\"/clip.mp4\"></video>");
    }

    #[test]
    fn test_youtube_ids() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
        ] {
            assert_eq!(youtube_id(url), Some("dQw4w9WgXcQ"), "{}", url);
        }
        assert_eq!(youtube_id("https://vimeo.com/12345678901"), None);
        assert_eq!(youtube_id("https://youtu.be/short"), None);
    }

    #[test]
    fn test_youtube_embed_inserted() {
        let result = insert_youtube("X", Selection::caret(1), "https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert!(result.content.starts_with("X<iframe"));
        assert!(result
            .content
            .contains("src=\"https://www.youtube.com/embed/dQw4w9WgXcQ\""));
        assert!(result.content.contains("allowfullscreen"));
    }

    #[test]
    fn test_youtube_rejects_invalid_url() {
        let err = insert_youtube("", Selection::default(), "https://example.com/video").unwrap_err();
        assert_eq!(err, EditorError::InvalidYouTubeUrl);
    }
}
