//! Normalizers for non-source files.
//!
//! Every supported format is reduced to the same nested JSON shape so config
//! and build-descriptor files can be compared and queried uniformly.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::{ExtractError, ExtractResult};

/// YAML document to JSON. An empty document becomes `{}`.
pub fn yaml_to_value(text: &str) -> ExtractResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    let parsed: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| ExtractError::Format(e.to_string()))?;
    let value = serde_json::to_value(parsed).map_err(|e| ExtractError::Format(e.to_string()))?;
    Ok(match value {
        Value::Null => Value::Object(Map::new()),
        other => other,
    })
}

/// Dockerfile to `{"instructions": [trimmed lines]}`.
pub fn dockerfile_to_value(text: &str) -> Value {
    let instructions = text.lines().map(|line| Value::String(line.trim().to_string())).collect();
    let mut obj = Map::new();
    obj.insert("instructions".to_string(), Value::Array(instructions));
    Value::Object(obj)
}

fn xml_token_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?s)<!--.*?-->|<\?.*?\?>|<!\[CDATA\[(.*?)\]\]>|<![^>]*>|<(/?)([A-Za-z_][\w:.\-]*)([^>]*?)(/?)>|([^<]+)",
        )
        .ok()
    })
    .as_ref()
}

fn xml_attr_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_][\w:.\-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).ok()
    })
    .as_ref()
}

struct XmlNode {
    tag: String,
    fields: Map<String, Value>,
    text: String,
}

impl XmlNode {
    fn new(tag: &str, attrs: &str) -> Self {
        let mut fields = Map::new();
        let captures = xml_attr_re().into_iter().flat_map(|re| re.captures_iter(attrs));
        for cap in captures {
            let value = cap.get(2).or_else(|| cap.get(3)).map_or("", |m| m.as_str());
            insert_child(&mut fields, &cap[1], Value::String(unescape_xml(value)));
        }
        Self { tag: tag.to_string(), fields, text: String::new() }
    }

    /// The element's key in its parent and the value stored under it.
    fn into_entry(self) -> (String, Value) {
        let text = self.text.trim().to_string();
        if self.fields.is_empty() {
            return (self.tag, Value::String(text));
        }
        let mut fields = self.fields;
        if !text.is_empty() {
            insert_child(&mut fields, "content", Value::String(text));
        }
        (self.tag, Value::Object(fields))
    }
}

/// Repeated keys collapse into an array in document order.
fn insert_child(fields: &mut Map<String, Value>, key: &str, value: Value) {
    match fields.get_mut(key) {
        None => {
            fields.insert(key.to_string(), value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<").replace("&gt;", ">").replace("&quot;", "\"").replace("&apos;", "'").replace("&amp;", "&")
}

/// XML element tree to nested JSON.
///
/// Elements become keys; leaf elements become their trimmed text; attributes
/// become sibling keys with element text under `content`; repeated elements
/// become arrays. An empty document becomes `{}`.
pub fn xml_to_value(text: &str) -> ExtractResult<Value> {
    let tokens = xml_token_re().ok_or_else(|| ExtractError::Format("XML tokenizer unavailable".to_string()))?;
    let mut stack = vec![XmlNode { tag: String::new(), fields: Map::new(), text: String::new() }];
    for cap in tokens.captures_iter(text) {
        if let Some(cdata) = cap.get(1) {
            if let Some(top) = stack.last_mut() {
                top.text.push_str(cdata.as_str());
            }
        } else if let Some(tag) = cap.get(3) {
            let closing = cap.get(2).is_some_and(|m| !m.as_str().is_empty());
            let self_closing = cap.get(5).is_some_and(|m| !m.as_str().is_empty());
            if closing {
                if stack.len() < 2 {
                    return Err(ExtractError::Format(format!("unexpected closing tag </{}>", tag.as_str())));
                }
                let node = stack.pop().ok_or_else(|| ExtractError::Format("unbalanced document".to_string()))?;
                if node.tag != tag.as_str() {
                    return Err(ExtractError::Format(format!(
                        "mismatched closing tag </{}> for <{}>",
                        tag.as_str(),
                        node.tag
                    )));
                }
                let (tag, value) = node.into_entry();
                if let Some(parent) = stack.last_mut() {
                    insert_child(&mut parent.fields, &tag, value);
                }
            } else {
                let node = XmlNode::new(tag.as_str(), cap.get(4).map_or("", |m| m.as_str()));
                if self_closing {
                    let (tag, value) = node.into_entry();
                    if let Some(parent) = stack.last_mut() {
                        insert_child(&mut parent.fields, &tag, value);
                    }
                } else {
                    stack.push(node);
                }
            }
        } else if let Some(body) = cap.get(6) {
            if let Some(top) = stack.last_mut() {
                top.text.push_str(&unescape_xml(body.as_str()));
            }
        }
    }
    if stack.len() != 1 {
        return Err(ExtractError::Format("unclosed element".to_string()));
    }
    let root = stack.pop().map(|n| n.fields).unwrap_or_default();
    Ok(Value::Object(root))
}

/// Gradle script to nested JSON by brace nesting.
///
/// `name {` opens an object under `name`, `}` closes it, `key = value` stores a
/// string (single quotes become double quotes), and any other line is appended
/// to the current block's `statements` list.
pub fn gradle_to_value(text: &str) -> Value {
    let mut stack: Vec<(String, Map<String, Value>)> = vec![(String::new(), Map::new())];
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if let Some(head) = line.strip_suffix('{') {
            stack.push((head.trim().to_string(), Map::new()));
        } else if line == "}" {
            if stack.len() > 1 {
                if let Some((key, obj)) = stack.pop() {
                    if let Some((_, parent)) = stack.last_mut() {
                        insert_child(parent, &key, Value::Object(obj));
                    }
                }
            }
        } else if let Some((key, value)) = line.split_once('=') {
            if let Some((_, current)) = stack.last_mut() {
                current.insert(key.trim().to_string(), Value::String(value.trim().replace('\'', "\"")));
            }
        } else if let Some((_, current)) = stack.last_mut() {
            match current.entry("statements").or_insert_with(|| Value::Array(Vec::new())) {
                Value::Array(items) => items.push(Value::String(line.to_string())),
                other => *other = Value::Array(vec![Value::String(line.to_string())]),
            }
        }
    }
    while stack.len() > 1 {
        if let Some((key, obj)) = stack.pop() {
            if let Some((_, parent)) = stack.last_mut() {
                insert_child(parent, &key, Value::Object(obj));
            }
        }
    }
    Value::Object(stack.pop().map(|(_, obj)| obj).unwrap_or_default())
}

fn settings_name_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"rootProject\.name\s*=\s*["']([^"']*)["']"#).ok()
    })
    .as_ref()
}

/// `rootProject.name` declared in a `settings.gradle` script.
pub fn settings_gradle_root_name(text: &str) -> Option<String> {
    settings_name_re()?
        .captures(text)
        .map(|cap| cap[1].trim().to_string())
        .filter(|name| !name.is_empty())
}

/// True when a Maven descriptor lists `<modules>` directly under `<project>`.
pub fn is_maven_aggregator(pom: &Value) -> bool {
    pom.pointer("/project/modules").is_some()
}
