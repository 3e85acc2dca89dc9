mod block;
mod config;
mod html;
pub mod logging;
mod migrate;
mod parser;
mod serializer;
pub mod text;

pub use block::{Block, Document, Image, Inline, Mark, Node, Unknown, clamp_heading_level};
pub use config::{ClassConfig, Config, HighlightConfig, ImageConfig, TextConfig};
pub use html::{escape_attr, escape_text, render_block, render_content, render_document, render_inline};
pub use migrate::{Migration, html_to_document, migrate_value};
pub use parser::{Content, classify, is_tree_value, looks_like_html, parse, parse_str};
pub use serializer::{coerce_stored_string, stringify_value, to_json_string, to_value};

use serde_json::Value;

/// Render a stored value to HTML using the bundled default config.
pub fn render(value: &Value) -> String {
    html::render(value, &Config::compiled_default())
}

/// Render a stored value to HTML with a custom config.
pub fn render_with_config(value: &Value, config: &Config) -> String {
    html::render(value, config)
}

/// Parse stored content and write it back in canonical form.
pub fn normalize(value: &Value) -> Value {
    to_value(&parse(value))
}
