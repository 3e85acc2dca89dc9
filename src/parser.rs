use log::{debug, warn};
use serde_json::{Map, Value};

use crate::block::{Block, Document, Image, Inline, Mark, Node, Unknown, clamp_heading_level};

/// Stored content sorted by how it has to be rendered
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// A tree, either stored directly or recovered from a string
    Document(Document),
    /// Legacy markup, rendered verbatim
    Html(String),
    /// Nothing usable was stored
    Unavailable,
}

/// Parse a stored value of unknown shape into a document.
///
/// Never fails: absent, empty or unusable input yields [`Document::empty`].
pub fn parse(value: &Value) -> Document {
    match value {
        Value::Null => Document::empty(),
        Value::String(raw) => parse_str(raw),
        Value::Array(blocks) => Document {
            content: decode_blocks(blocks),
        },
        Value::Object(map) if is_tree(map) => decode_document(map),
        _ => Document::empty(),
    }
}

/// Parse a stored string: serialized tree JSON, or legacy text wrapped into
/// a single paragraph.
pub fn parse_str(raw: &str) -> Document {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Document::empty();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) if value.is_array() || is_tree_value(&value) => parse(&value),
        Ok(_) if looks_like_json(trimmed) => Document::empty(),
        // Scalars such as `"42"` are ordinary text
        Ok(_) => wrap_text(raw),
        Err(e) if looks_like_json(trimmed) => {
            warn!("failed to parse stored content as JSON: {e}");
            Document::empty()
        }
        Err(_) => wrap_text(raw),
    }
}

/// Decide how a stored value should be rendered.
pub fn classify(value: &Value) -> Content {
    match value {
        Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Content::Unavailable
            } else if looks_like_html(trimmed) {
                Content::Html(raw.clone())
            } else {
                Content::Document(parse_str(raw))
            }
        }
        Value::Array(_) => Content::Document(parse(value)),
        Value::Object(map) if is_tree(map) => Content::Document(decode_document(map)),
        _ => Content::Unavailable,
    }
}

/// Legacy markup is detected by its first non-blank character.
pub fn looks_like_html(raw: &str) -> bool {
    raw.trim_start().starts_with('<')
}

fn looks_like_json(trimmed: &str) -> bool {
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

/// A tree carries a root marker and a `content` array.
pub fn is_tree_value(value: &Value) -> bool {
    value.as_object().is_some_and(is_tree)
}

fn is_tree(map: &Map<String, Value>) -> bool {
    let marker = tag(map);
    matches!(marker, Some("doc") | Some("document"))
        && map.get("content").is_some_and(Value::is_array)
}

fn wrap_text(raw: &str) -> Document {
    Document {
        content: vec![Block::Paragraph {
            text_align: None,
            content: vec![Inline::text(raw)],
        }],
    }
}

fn decode_document(map: &Map<String, Value>) -> Document {
    Document {
        content: block_children(map),
    }
}

/// The discriminator, read from `type` and falling back to `kind`.
fn tag(map: &Map<String, Value>) -> Option<&str> {
    map.get("type")
        .and_then(Value::as_str)
        .or_else(|| map.get("kind").and_then(Value::as_str))
}

fn children(map: &Map<String, Value>) -> Option<&Vec<Value>> {
    map.get("content").and_then(Value::as_array)
}

/// Look an attribute up in `attrs`, then on the node itself.
fn attr<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get("attrs")
        .and_then(Value::as_object)
        .and_then(|attrs| attrs.get(key))
        .or_else(|| map.get(key))
        .filter(|value| !value.is_null())
}

fn attr_str(map: &Map<String, Value>, key: &str) -> Option<String> {
    match attr(map, key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn attr_int(map: &Map<String, Value>, key: &str) -> Option<i64> {
    match attr(map, key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    }
}

fn attr_u32(map: &Map<String, Value>, key: &str) -> Option<u32> {
    attr_int(map, key).and_then(|n| u32::try_from(n).ok())
}

fn decode_blocks(values: &[Value]) -> Vec<Block> {
    values.iter().filter_map(decode_block).collect()
}

fn decode_inlines(values: &[Value]) -> Vec<Inline> {
    values.iter().filter_map(decode_inline).collect()
}

fn block_children(map: &Map<String, Value>) -> Vec<Block> {
    children(map).map(|c| decode_blocks(c)).unwrap_or_default()
}

fn inline_children(map: &Map<String, Value>) -> Vec<Inline> {
    children(map).map(|c| decode_inlines(c)).unwrap_or_default()
}

/// Decode one block. Non-object entries are dropped.
fn decode_block(value: &Value) -> Option<Block> {
    let map = value.as_object()?;
    let block = match tag(map).unwrap_or("") {
        "paragraph" => Block::Paragraph {
            text_align: attr_str(map, "textAlign"),
            content: inline_children(map),
        },
        "heading" => Block::Heading {
            level: clamp_heading_level(attr_int(map, "level").unwrap_or(1)),
            text_align: attr_str(map, "textAlign"),
            content: inline_children(map),
        },
        "bulletList" => Block::BulletList {
            content: block_children(map),
        },
        "orderedList" => Block::OrderedList {
            start: attr_u32(map, "start").unwrap_or(1),
            content: block_children(map),
        },
        "listItem" => Block::ListItem {
            content: block_children(map),
        },
        "blockquote" => Block::Blockquote {
            content: block_children(map),
        },
        "codeBlock" => Block::CodeBlock {
            language: attr_str(map, "language"),
            content: inline_children(map),
        },
        "image" => Block::Image(decode_image(map)),
        "hardBreak" => Block::HardBreak,
        "horizontalRule" => Block::HorizontalRule,
        _ => Block::Unknown(decode_unknown(map)),
    };
    Some(block)
}

fn decode_inline(value: &Value) -> Option<Inline> {
    let map = value.as_object()?;
    let inline = match tag(map).unwrap_or("") {
        "text" => Inline::Text {
            text: map
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            marks: map
                .get("marks")
                .and_then(Value::as_array)
                .map(|marks| marks.iter().filter_map(decode_mark).collect())
                .unwrap_or_default(),
        },
        "hardBreak" => Inline::HardBreak,
        "image" => Inline::Image(decode_image(map)),
        _ => Inline::Unknown(decode_unknown(map)),
    };
    Some(inline)
}

fn decode_image(map: &Map<String, Value>) -> Image {
    Image {
        src: attr_str(map, "src"),
        alt: attr_str(map, "alt"),
        title: attr_str(map, "title"),
        width: attr_u32(map, "width"),
        height: attr_u32(map, "height"),
    }
}

/// Children of an unrecognized node keep their own position: text runs stay
/// inline, everything else is treated as a block.
fn decode_unknown(map: &Map<String, Value>) -> Unknown {
    let kind = tag(map).unwrap_or_default().to_string();
    debug!("unrecognized node kind `{kind}`");

    let content = children(map)
        .map(|values| {
            values
                .iter()
                .filter_map(|value| {
                    let child = value.as_object()?;
                    if tag(child) == Some("text") {
                        decode_inline(value).map(Node::Inline)
                    } else {
                        decode_block(value).map(Node::Block)
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let attrs = map.get("attrs").and_then(Value::as_object).cloned();
    let text = map.get("text").and_then(Value::as_str).map(str::to_string);

    // Keep every field not captured above, malformed ones included
    let rest = map
        .iter()
        .filter(|(key, value)| match key.as_str() {
            "type" | "kind" => false,
            "attrs" => !value.is_object(),
            "text" => !value.is_string(),
            "content" => !value.is_array(),
            _ => true,
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Unknown {
        kind,
        attrs: attrs.unwrap_or_default(),
        text,
        content,
        rest,
    }
}

fn decode_mark(value: &Value) -> Option<Mark> {
    let map = value.as_object()?;
    let mark = match tag(map)? {
        "bold" => Mark::Bold,
        "italic" => Mark::Italic,
        "underline" => Mark::Underline,
        "strike" => Mark::Strike,
        "code" => Mark::Code,
        "link" => Mark::Link {
            href: attr_str(map, "href").unwrap_or_default(),
            target: attr_str(map, "target"),
        },
        "highlight" => Mark::Highlight {
            color: attr_str(map, "color"),
        },
        other => {
            debug!("unrecognized mark kind `{other}`");
            Mark::Unknown {
                kind: other.to_string(),
                attrs: map
                    .get("attrs")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default(),
            }
        }
    };
    Some(mark)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Value::Null)]
    #[case(json!(""))]
    #[case(json!("   "))]
    #[case(json!({}))]
    #[case(json!(42))]
    #[case(json!(true))]
    #[case(json!({ "type": "doc" }))]
    #[case(json!("{ not json"))]
    #[case(json!("{}"))]
    fn unusable_input_yields_empty_document(#[case] input: Value) {
        assert_eq!(parse(&input), Document::empty());
    }

    #[test]
    fn editor_form() {
        let doc = parse(&json!({
            "type": "doc",
            "content": [{
                "type": "heading",
                "attrs": { "level": 2, "textAlign": "center" },
                "content": [{ "type": "text", "text": "Hi", "marks": [{ "type": "bold" }] }]
            }]
        }));
        assert_eq!(
            doc.content,
            vec![Block::Heading {
                level: 2,
                text_align: Some("center".to_string()),
                content: vec![Inline::Text {
                    text: "Hi".to_string(),
                    marks: vec![Mark::Bold],
                }],
            }]
        );
    }

    #[test]
    fn kind_form_with_inline_attrs() {
        let doc = parse(&json!({
            "kind": "document",
            "content": [{ "kind": "heading", "level": 99, "content": [] }]
        }));
        assert_eq!(
            doc.content,
            vec![Block::Heading {
                level: 6,
                text_align: None,
                content: vec![],
            }]
        );
    }

    #[test]
    fn serialized_tree_string() {
        let raw = r#"{"type":"doc","content":[{"type":"horizontalRule"}]}"#;
        assert_eq!(parse_str(raw).content, vec![Block::HorizontalRule]);
        assert_eq!(parse(&json!(raw)), parse_str(raw));
    }

    #[test]
    fn plain_string_is_wrapped() {
        let doc = parse(&json!("<p>hi</p>"));
        assert_eq!(
            doc.content,
            vec![Block::Paragraph {
                text_align: None,
                content: vec![Inline::text("<p>hi</p>")],
            }]
        );
    }

    #[test]
    fn scalar_json_strings_stay_text() {
        assert_eq!(
            parse_str("42").content,
            vec![Block::Paragraph {
                text_align: None,
                content: vec![Inline::text("42")],
            }]
        );
    }

    #[test]
    fn array_of_blocks() {
        let doc = parse(&json!([{ "type": "hardBreak" }, { "type": "horizontalRule" }]));
        assert_eq!(doc.content, vec![Block::HardBreak, Block::HorizontalRule]);
    }

    #[test]
    fn unknown_wrapper_keeps_children() {
        let doc = parse(&json!({
            "type": "doc",
            "content": [{
                "type": "bogusKind",
                "content": [
                    { "type": "paragraph", "content": [{ "type": "text", "text": "still here" }] },
                    { "type": "text", "text": "loose" }
                ]
            }]
        }));
        let Block::Unknown(unknown) = &doc.content[0] else {
            panic!("expected unknown block");
        };
        assert_eq!(unknown.kind, "bogusKind");
        assert_eq!(unknown.content.len(), 2);
        assert!(matches!(unknown.content[0], Node::Block(Block::Paragraph { .. })));
        assert_eq!(unknown.content[1], Node::Inline(Inline::text("loose")));
    }

    #[test]
    fn lenient_image_attrs() {
        let doc = parse(&json!({
            "type": "doc",
            "content": [{ "type": "image", "attrs": { "src": null, "width": "640", "height": 480.4 } }]
        }));
        assert_eq!(
            doc.content,
            vec![Block::Image(Image {
                width: Some(640),
                height: Some(480),
                ..Image::default()
            })]
        );
    }

    #[test]
    fn marks_keep_stored_order() {
        let doc = parse(&json!({
            "type": "doc",
            "content": [{ "type": "paragraph", "content": [{
                "type": "text",
                "text": "x",
                "marks": [
                    { "type": "link", "attrs": { "href": "/a", "target": "_blank" } },
                    { "type": "superscript" },
                    { "type": "highlight" }
                ]
            }]}]
        }));
        let Block::Paragraph { content, .. } = &doc.content[0] else {
            panic!("expected paragraph");
        };
        let Inline::Text { marks, .. } = &content[0] else {
            panic!("expected text");
        };
        assert_eq!(marks[0].kind(), "link");
        assert_eq!(marks[1].kind(), "superscript");
        assert_eq!(marks[2], Mark::Highlight { color: None });
    }

    #[test]
    fn classification() {
        assert_eq!(classify(&Value::Null), Content::Unavailable);
        assert_eq!(classify(&json!({})), Content::Unavailable);
        assert_eq!(classify(&json!("")), Content::Unavailable);
        assert_eq!(
            classify(&json!("  <h1>Legacy</h1>")),
            Content::Html("  <h1>Legacy</h1>".to_string())
        );
        assert!(matches!(classify(&json!("plain words")), Content::Document(_)));
        assert!(matches!(
            classify(&json!({ "type": "doc", "content": [] })),
            Content::Document(_)
        ));
    }

    #[test]
    fn parsing_is_idempotent_on_trees() {
        let tree = json!({ "type": "doc", "content": [{ "type": "paragraph" }] });
        assert!(is_tree_value(&tree));
        let once = parse(&tree);
        assert_eq!(parse(&crate::serializer::to_value(&once)), once);
    }
}
