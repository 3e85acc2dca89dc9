use log::debug;
use serde_json::Value;

use crate::block::{Block, Document, Image, Inline, Mark, Node, Unknown};
use crate::config::Config;
use crate::parser::{Content, classify};

/// Render any stored value, wrapped in the configured container.
pub fn render(value: &Value, config: &Config) -> String {
    render_content(&classify(value), config)
}

/// Render classified content, wrapped in the configured container.
pub fn render_content(content: &Content, config: &Config) -> String {
    let inner = match content {
        Content::Document(doc) => render_document(doc, config),
        // Legacy markup is trusted as stored
        Content::Html(html) => html.clone(),
        Content::Unavailable => escape_text(&config.text.unavailable),
    };
    format!("<div{}>{}</div>", class_attr(&config.classes.container), inner)
}

/// Render the blocks of a document without any surrounding container.
pub fn render_document(doc: &Document, config: &Config) -> String {
    let mut out = String::new();
    for block in &doc.content {
        emit_block(block, config, &mut out);
    }
    out
}

pub fn render_block(block: &Block, config: &Config) -> String {
    let mut out = String::new();
    emit_block(block, config, &mut out);
    out
}

pub fn render_inline(inline: &Inline, config: &Config) -> String {
    let mut out = String::new();
    emit_inline(inline, config, &mut out);
    out
}

fn emit_block(block: &Block, config: &Config, out: &mut String) {
    let classes = &config.classes;
    match block {
        Block::Paragraph {
            text_align,
            content,
        } => {
            out.push_str("<p");
            out.push_str(&class_attr(&classes.paragraph));
            out.push_str(&align_attr(text_align));
            out.push('>');
            emit_inlines(content, config, out);
            out.push_str("</p>");
        }
        Block::Heading {
            level,
            text_align,
            content,
        } => {
            let level = (*level).clamp(1, 6);
            out.push_str(&format!("<h{level}"));
            out.push_str(&class_attr(classes.heading(level)));
            out.push_str(&align_attr(text_align));
            out.push('>');
            emit_inlines(content, config, out);
            out.push_str(&format!("</h{level}>"));
        }
        Block::BulletList { content } => {
            out.push_str("<ul");
            out.push_str(&class_attr(&classes.bullet_list));
            out.push('>');
            emit_blocks(content, config, out);
            out.push_str("</ul>");
        }
        Block::OrderedList { start, content } => {
            out.push_str("<ol");
            out.push_str(&class_attr(&classes.ordered_list));
            if *start != 1 {
                out.push_str(&format!(" start=\"{start}\""));
            }
            out.push('>');
            emit_blocks(content, config, out);
            out.push_str("</ol>");
        }
        Block::ListItem { content } => {
            out.push_str("<li");
            out.push_str(&class_attr(&classes.list_item));
            out.push('>');
            emit_blocks(content, config, out);
            out.push_str("</li>");
        }
        Block::Blockquote { content } => {
            out.push_str("<blockquote");
            out.push_str(&class_attr(&classes.blockquote));
            out.push('>');
            emit_blocks(content, config, out);
            out.push_str("</blockquote>");
        }
        Block::CodeBlock { language, content } => {
            let code_class = match language {
                Some(lang) if !lang.is_empty() => {
                    format!("{} language-{}", classes.code_block, lang)
                        .trim()
                        .to_string()
                }
                _ => classes.code_block.clone(),
            };
            out.push_str("<pre");
            out.push_str(&class_attr(&classes.pre));
            out.push_str("><code");
            out.push_str(&class_attr(&code_class));
            out.push('>');
            emit_inlines(content, config, out);
            out.push_str("</code></pre>");
        }
        Block::Image(image) => {
            out.push_str("<div");
            out.push_str(&class_attr(&classes.image_wrapper));
            out.push('>');
            emit_image(image, config, out);
            if let Some(title) = image.title.as_deref().filter(|t| !t.is_empty()) {
                out.push_str("<p");
                out.push_str(&class_attr(&classes.caption));
                out.push('>');
                out.push_str(&escape_text(title));
                out.push_str("</p>");
            }
            out.push_str("</div>");
        }
        Block::HardBreak => out.push_str("<br>"),
        Block::HorizontalRule => {
            out.push_str("<hr");
            out.push_str(&class_attr(&classes.rule));
            out.push('>');
        }
        Block::Unknown(unknown) => {
            debug!("rendering unknown block `{}` without a wrapper", unknown.kind);
            emit_unknown(unknown, config, out);
        }
    }
}

fn emit_blocks(blocks: &[Block], config: &Config, out: &mut String) {
    for block in blocks {
        emit_block(block, config, out);
    }
}

fn emit_inlines(inlines: &[Inline], config: &Config, out: &mut String) {
    for inline in inlines {
        emit_inline(inline, config, out);
    }
}

/// An unknown node has no tag of its own: its text, if any, goes in a bare
/// span, followed by its children.
fn emit_unknown(unknown: &Unknown, config: &Config, out: &mut String) {
    if let Some(text) = &unknown.text {
        out.push_str("<span>");
        out.push_str(&escape_text(text));
        out.push_str("</span>");
    }
    for child in &unknown.content {
        match child {
            Node::Block(block) => emit_block(block, config, out),
            Node::Inline(inline) => emit_inline(inline, config, out),
        }
    }
}

fn emit_inline(inline: &Inline, config: &Config, out: &mut String) {
    match inline {
        Inline::Text { text, marks } => out.push_str(&render_marked_text(text, marks, config)),
        Inline::HardBreak => out.push_str("<br>"),
        Inline::Image(image) => emit_image(image, config, out),
        Inline::Unknown(unknown) => emit_unknown(unknown, config, out),
    }
}

fn emit_image(image: &Image, config: &Config, out: &mut String) {
    let defaults = &config.image;
    let src = image
        .src
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(&defaults.placeholder_src);
    let alt = image
        .alt
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(&defaults.default_alt);

    out.push_str(&format!(
        "<img src=\"{}\" alt=\"{}\" width=\"{}\" height=\"{}\"",
        escape_attr(src),
        escape_attr(alt),
        image.width.unwrap_or(defaults.width),
        image.height.unwrap_or(defaults.height),
    ));
    out.push_str(&class_attr(&config.classes.image));
    out.push('>');
}

/// Render a text run and fold its marks around it.
///
/// Marks wrap in a fixed precedence regardless of stored order, so equal
/// mark sets always produce identical markup. Each kind applies once.
fn render_marked_text(text: &str, marks: &[Mark], config: &Config) -> String {
    let mut applied: Vec<&Mark> = Vec::with_capacity(marks.len());
    for mark in marks {
        let Some(rank) = mark.precedence() else {
            continue;
        };
        if !applied.iter().any(|m| m.precedence() == Some(rank)) {
            applied.push(mark);
        }
    }
    applied.sort_by_key(|mark| mark.precedence());

    applied.into_iter().fold(
        format!("<span>{}</span>", escape_text(text)),
        |inner, mark| wrap_mark(mark, inner, config),
    )
}

fn wrap_mark(mark: &Mark, inner: String, config: &Config) -> String {
    let classes = &config.classes;
    match mark {
        Mark::Bold => format!("<strong>{inner}</strong>"),
        Mark::Italic => format!("<em>{inner}</em>"),
        Mark::Underline => format!("<u>{inner}</u>"),
        Mark::Strike => format!("<s>{inner}</s>"),
        Mark::Code => format!("<code{}>{inner}</code>", class_attr(&classes.inline_code)),
        Mark::Link { href, target } => {
            let mut attrs = format!(" href=\"{}\"", escape_attr(href));
            if let Some(target) = target.as_deref().filter(|t| !t.is_empty()) {
                attrs.push_str(&format!(" target=\"{}\"", escape_attr(target)));
                if target == "_blank" {
                    attrs.push_str(" rel=\"noopener noreferrer\"");
                }
            }
            attrs.push_str(&class_attr(&classes.link));
            format!("<a{attrs}>{inner}</a>")
        }
        Mark::Highlight { color } => {
            let color = color
                .as_deref()
                .filter(|c| !c.is_empty())
                .unwrap_or(&config.highlight.color);
            format!(
                "<mark{} style=\"background-color: {}\">{inner}</mark>",
                class_attr(&classes.highlight),
                escape_attr(color)
            )
        }
        Mark::Unknown { .. } => inner,
    }
}

fn class_attr(class: &str) -> String {
    if class.is_empty() {
        String::new()
    } else {
        format!(" class=\"{}\"", escape_attr(class))
    }
}

fn align_attr(text_align: &Option<String>) -> String {
    match text_align.as_deref() {
        Some(align) if !align.is_empty() => {
            format!(" style=\"text-align: {}\"", escape_attr(align))
        }
        _ => String::new(),
    }
}

/// Escape text content for HTML
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape a double-quoted attribute value
pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
