use log::error;
use serde_json::{Map, Value, json};

use crate::block::{Block, Document, Image, Inline, Mark, Node, Unknown};

/// Convert a document into the editor's JSON form, ready to persist.
pub fn to_value(doc: &Document) -> Value {
    let mut map = Map::new();
    map.insert("type".into(), json!("doc"));
    map.insert(
        "content".into(),
        Value::Array(doc.content.iter().map(block_to_value).collect()),
    );
    Value::Object(map)
}

/// Serialize a document for backends that store text rather than JSON.
pub fn to_json_string(doc: &Document) -> String {
    match serde_json::to_string(&to_value(doc)) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to serialize document: {e}");
            empty_document_string()
        }
    }
}

/// Pass an already-stringified value through if it is valid JSON; anything
/// else is replaced by the serialized empty document.
pub fn coerce_stored_string(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(_) => raw.to_string(),
        Err(_) => empty_document_string(),
    }
}

/// Turn any stored value into the string that a text column should hold.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::Null => empty_document_string(),
        Value::String(raw) if raw.is_empty() => empty_document_string(),
        Value::String(raw) => coerce_stored_string(raw),
        other => other.to_string(),
    }
}

fn empty_document_string() -> String {
    to_value(&Document::empty()).to_string()
}

fn node(kind: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("type".into(), json!(kind));
    map
}

fn put_attrs(map: &mut Map<String, Value>, attrs: Map<String, Value>) {
    if !attrs.is_empty() {
        map.insert("attrs".into(), Value::Object(attrs));
    }
}

fn put_content(map: &mut Map<String, Value>, content: Vec<Value>) {
    if !content.is_empty() {
        map.insert("content".into(), Value::Array(content));
    }
}

fn text_align_attrs(text_align: &Option<String>) -> Map<String, Value> {
    let mut attrs = Map::new();
    if let Some(align) = text_align {
        attrs.insert("textAlign".into(), json!(align));
    }
    attrs
}

fn blocks(content: &[Block]) -> Vec<Value> {
    content.iter().map(block_to_value).collect()
}

fn inlines(content: &[Inline]) -> Vec<Value> {
    content.iter().map(inline_to_value).collect()
}

fn block_to_value(block: &Block) -> Value {
    let mut map = node(block.kind());
    match block {
        Block::Paragraph {
            text_align,
            content,
        } => {
            put_attrs(&mut map, text_align_attrs(text_align));
            put_content(&mut map, inlines(content));
        }
        Block::Heading {
            level,
            text_align,
            content,
        } => {
            let mut attrs = text_align_attrs(text_align);
            attrs.insert("level".into(), json!(level));
            put_attrs(&mut map, attrs);
            put_content(&mut map, inlines(content));
        }
        Block::OrderedList { start, content } => {
            if *start != 1 {
                let mut attrs = Map::new();
                attrs.insert("start".into(), json!(start));
                put_attrs(&mut map, attrs);
            }
            put_content(&mut map, blocks(content));
        }
        Block::BulletList { content }
        | Block::ListItem { content }
        | Block::Blockquote { content } => {
            put_content(&mut map, blocks(content));
        }
        Block::CodeBlock { language, content } => {
            let mut attrs = Map::new();
            if let Some(language) = language {
                attrs.insert("language".into(), json!(language));
            }
            put_attrs(&mut map, attrs);
            put_content(&mut map, inlines(content));
        }
        Block::Image(image) => put_attrs(&mut map, image_attrs(image)),
        Block::HardBreak | Block::HorizontalRule => {}
        Block::Unknown(unknown) => return unknown_to_value(unknown),
    }
    Value::Object(map)
}

fn inline_to_value(inline: &Inline) -> Value {
    let mut map = node(inline.kind());
    match inline {
        Inline::Text { text, marks } => {
            map.insert("text".into(), json!(text));
            if !marks.is_empty() {
                map.insert(
                    "marks".into(),
                    Value::Array(marks.iter().map(mark_to_value).collect()),
                );
            }
        }
        Inline::HardBreak => {}
        Inline::Image(image) => put_attrs(&mut map, image_attrs(image)),
        Inline::Unknown(unknown) => return unknown_to_value(unknown),
    }
    Value::Object(map)
}

fn image_attrs(image: &Image) -> Map<String, Value> {
    let mut attrs = Map::new();
    let strings = [("src", &image.src), ("alt", &image.alt), ("title", &image.title)];
    for (key, value) in strings {
        if let Some(value) = value {
            attrs.insert(key.into(), json!(value));
        }
    }
    let numbers = [("width", image.width), ("height", image.height)];
    for (key, value) in numbers {
        if let Some(value) = value {
            attrs.insert(key.into(), json!(value));
        }
    }
    attrs
}

fn unknown_to_value(unknown: &Unknown) -> Value {
    let mut map = unknown.rest.clone();
    map.insert("type".into(), json!(unknown.kind));
    put_attrs(&mut map, unknown.attrs.clone());
    if let Some(text) = &unknown.text {
        map.insert("text".into(), json!(text));
    }
    let content = unknown
        .content
        .iter()
        .map(|child| match child {
            Node::Block(block) => block_to_value(block),
            Node::Inline(inline) => inline_to_value(inline),
        })
        .collect();
    put_content(&mut map, content);
    Value::Object(map)
}

fn mark_to_value(mark: &Mark) -> Value {
    let mut map = node(mark.kind());
    let mut attrs = Map::new();
    match mark {
        Mark::Link { href, target } => {
            attrs.insert("href".into(), json!(href));
            if let Some(target) = target {
                attrs.insert("target".into(), json!(target));
            }
        }
        Mark::Highlight { color: Some(color) } => {
            attrs.insert("color".into(), json!(color));
        }
        Mark::Unknown { attrs: extra, .. } => attrs = extra.clone(),
        _ => {}
    }
    put_attrs(&mut map, attrs);
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, parse_str};

    #[test]
    fn empty_document() {
        assert_eq!(
            to_json_string(&Document::empty()),
            r#"{"content":[{"content":[{"text":"","type":"text"}],"type":"paragraph"}],"type":"doc"}"#
        );
    }

    #[test]
    fn heading_with_marks() {
        let doc = Document {
            content: vec![Block::Heading {
                level: 2,
                text_align: None,
                content: vec![Inline::Text {
                    text: "Hi".to_string(),
                    marks: vec![
                        Mark::Bold,
                        Mark::Link {
                            href: "/about".to_string(),
                            target: None,
                        },
                    ],
                }],
            }],
        };
        assert_eq!(
            to_value(&doc),
            json!({
                "type": "doc",
                "content": [{
                    "type": "heading",
                    "attrs": { "level": 2 },
                    "content": [{
                        "type": "text",
                        "text": "Hi",
                        "marks": [
                            { "type": "bold" },
                            { "type": "link", "attrs": { "href": "/about" } }
                        ]
                    }]
                }]
            })
        );
    }

    #[test]
    fn unknown_nodes_write_back_unchanged() {
        let stored = json!({
            "type": "doc",
            "content": [{
                "type": "callout",
                "attrs": { "tone": "info" },
                "content": [
                    { "type": "paragraph", "content": [{ "type": "text", "text": "note" }] },
                    { "type": "text", "text": "tail", "marks": [{ "type": "subscript" }] }
                ]
            }]
        });
        assert_eq!(to_value(&parse(&stored)), stored);
    }

    #[test]
    fn unknown_nodes_keep_marks_and_loose_fields() {
        let stored = json!({
            "type": "doc",
            "content": [{
                "type": "paragraph",
                "content": [{
                    "type": "mention",
                    "attrs": { "id": "ana" },
                    "text": "@ana",
                    "marks": [{ "type": "bold" }]
                }]
            }]
        });
        assert_eq!(to_value(&parse(&stored)), stored);

        let kind_form = json!({
            "kind": "document",
            "content": [{
                "kind": "callout",
                "tone": "info",
                "content": [{ "kind": "paragraph", "content": [{ "kind": "text", "text": "note" }] }]
            }]
        });
        assert_eq!(
            to_value(&parse(&kind_form)),
            json!({
                "type": "doc",
                "content": [{
                    "type": "callout",
                    "tone": "info",
                    "content": [{ "type": "paragraph", "content": [{ "type": "text", "text": "note" }] }]
                }]
            })
        );
    }

    #[test]
    fn string_round_trip() {
        let doc = parse(&json!({
            "type": "doc",
            "content": [
                { "type": "orderedList", "attrs": { "start": 3 }, "content": [
                    { "type": "listItem", "content": [{ "type": "paragraph" }] }
                ]},
                { "type": "image", "attrs": { "src": "/a.png", "width": 10 } }
            ]
        }));
        assert_eq!(parse_str(&to_json_string(&doc)), doc);
    }

    #[test]
    fn stored_strings() {
        let valid = r#"{"type":"doc","content":[]}"#;
        assert_eq!(coerce_stored_string(valid), valid);
        assert_eq!(coerce_stored_string("<p>x</p>"), empty_document_string());
        assert_eq!(stringify_value(&Value::Null), empty_document_string());
        assert_eq!(stringify_value(&json!("")), empty_document_string());
        assert_eq!(
            stringify_value(&json!({ "type": "doc", "content": [] })),
            r#"{"content":[],"type":"doc"}"#
        );
    }
}
