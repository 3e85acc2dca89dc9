//! One-time conversion of legacy HTML content into the tree form.
//!
//! Nothing here runs implicitly: parsing and rendering leave stored HTML
//! strings alone, and callers opt in to rewriting a record.

use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::block::{Block, Document, Inline};
use crate::parser::{is_tree_value, parse};

static BLOCK_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</(?:p|h[1-6]|li|blockquote|div|pre)\s*>|<br\s*/?>")
        .expect("block boundary pattern is valid")
});

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Outcome of migrating one stored value
#[derive(Debug, Clone, PartialEq)]
pub enum Migration {
    /// Already a tree (as an object or serialized JSON); leave it alone
    AlreadyStructured,
    /// Legacy content converted into a tree
    Migrated(Document),
    /// Nothing worth migrating was stored
    Skipped,
}

/// Migrate a stored value. Only strings are rewritten.
pub fn migrate_value(value: &Value) -> Migration {
    match value {
        Value::String(raw) if raw.trim().is_empty() => Migration::Skipped,
        Value::String(raw) => match serde_json::from_str::<Value>(raw.trim()) {
            Ok(decoded) if is_tree_value(&decoded) || decoded.is_array() => {
                Migration::AlreadyStructured
            }
            _ => {
                let doc = html_to_document(raw);
                info!("migrated legacy content into {} paragraph(s)", doc.content.len());
                Migration::Migrated(doc)
            }
        },
        Value::Array(_) => Migration::Migrated(parse(value)),
        _ if is_tree_value(value) => Migration::AlreadyStructured,
        _ => Migration::Skipped,
    }
}

/// Strip the markup from legacy HTML, keeping one paragraph per line of text.
pub fn html_to_document(html: &str) -> Document {
    let with_breaks = BLOCK_BOUNDARY.replace_all(html, "\n");
    let stripped = TAG.replace_all(&with_breaks, "");

    let content: Vec<Block> = stripped
        .lines()
        .map(|line| decode_entities(line.trim()))
        .filter(|line| !line.trim().is_empty())
        .map(|line| Block::Paragraph {
            text_align: None,
            content: vec![Inline::text(line.trim())],
        })
        .collect();

    if content.is_empty() {
        Document::empty()
    } else {
        Document { content }
    }
}

fn decode_entities(text: &str) -> String {
    // `&amp;` last, so `&amp;lt;` stays a literal `&lt;`
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
