//! Plain-text projections of a document for search, excerpts and
//! reading-time estimates.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::block::{Block, Document, Inline, Node, Unknown};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Extract the text of a document, one line per block.
pub fn plain_text(doc: &Document) -> String {
    let mut out = String::new();
    for block in &doc.content {
        push_block(block, &mut out);
    }
    out.trim_end().to_string()
}

fn push_block(block: &Block, out: &mut String) {
    match block {
        Block::Paragraph { content, .. }
        | Block::Heading { content, .. }
        | Block::CodeBlock { content, .. } => {
            for inline in content {
                push_inline(inline, out);
            }
            end_line(out);
        }
        Block::BulletList { content }
        | Block::OrderedList { content, .. }
        | Block::ListItem { content }
        | Block::Blockquote { content } => {
            for child in content {
                push_block(child, out);
            }
        }
        Block::HardBreak => out.push('\n'),
        Block::Image(_) | Block::HorizontalRule => {}
        Block::Unknown(unknown) => push_unknown(unknown, out),
    }
}

fn push_inline(inline: &Inline, out: &mut String) {
    match inline {
        Inline::Text { text, .. } => out.push_str(text),
        Inline::HardBreak => out.push('\n'),
        Inline::Image(_) => {}
        Inline::Unknown(unknown) => push_unknown(unknown, out),
    }
}

fn push_unknown(unknown: &Unknown, out: &mut String) {
    if let Some(text) = &unknown.text {
        out.push_str(text);
    }
    for child in &unknown.content {
        match child {
            Node::Block(block) => push_block(block, out),
            Node::Inline(inline) => push_inline(inline, out),
        }
    }
}

fn end_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Count whitespace-separated words.
pub fn word_count(doc: &Document) -> usize {
    plain_text(doc).split_whitespace().count()
}

/// Estimated minutes to read, never less than one.
pub fn reading_time_minutes(doc: &Document, words_per_minute: u32) -> u32 {
    let wpm = words_per_minute.max(1) as usize;
    let minutes = word_count(doc).div_ceil(wpm);
    u32::try_from(minutes).unwrap_or(u32::MAX).max(1)
}

/// A single-line excerpt of at most `max_chars` characters plus an ellipsis,
/// cut at a word boundary where possible.
pub fn excerpt(doc: &Document, max_chars: usize) -> String {
    let text = plain_text(doc);
    let normalized = WHITESPACE_RE.replace_all(&text, " ");
    let trimmed = normalized.trim();

    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }

    let cut: String = trimmed.chars().take(max_chars).collect();
    let at_word_end = trimmed.chars().nth(max_chars) == Some(' ');
    // Back off to the last space unless the cut already ends a word or the
    // first word alone overflows
    let cut = match cut.rfind(' ') {
        Some(idx) if idx > 0 && !at_word_end => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}…", cut.trim_end())
}

/// Case-insensitive search over the document text. Runs of whitespace,
/// line breaks included, match a single space.
pub fn contains_text(doc: &Document, query: &str) -> bool {
    let query = WHITESPACE_RE.replace_all(query.trim(), " ").to_lowercase();
    if query.is_empty() {
        return false;
    }
    WHITESPACE_RE
        .replace_all(&plain_text(doc), " ")
        .to_lowercase()
        .contains(&query)
}

/// The first image source in reading order, for cards and previews.
pub fn first_image(doc: &Document) -> Option<String> {
    doc.content.iter().find_map(block_image)
}

fn block_image(block: &Block) -> Option<String> {
    match block {
        Block::Image(image) => image.src.clone().filter(|src| !src.trim().is_empty()),
        Block::Paragraph { content, .. }
        | Block::Heading { content, .. }
        | Block::CodeBlock { content, .. } => content.iter().find_map(inline_image),
        Block::BulletList { content }
        | Block::OrderedList { content, .. }
        | Block::ListItem { content }
        | Block::Blockquote { content } => content.iter().find_map(block_image),
        Block::HardBreak | Block::HorizontalRule => None,
        Block::Unknown(unknown) => unknown_image(unknown),
    }
}

fn inline_image(inline: &Inline) -> Option<String> {
    match inline {
        Inline::Image(image) => image.src.clone().filter(|src| !src.trim().is_empty()),
        Inline::Unknown(unknown) => unknown_image(unknown),
        Inline::Text { .. } | Inline::HardBreak => None,
    }
}

fn unknown_image(unknown: &Unknown) -> Option<String> {
    unknown.content.iter().find_map(|child| match child {
        Node::Block(block) => block_image(block),
        Node::Inline(inline) => inline_image(inline),
    })
}
