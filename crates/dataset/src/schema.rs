use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StructureFault;

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

/// Loosely typed view of one decoded line.
/// `messages` is `None` when the key is absent; a present `null` is `Some(Value::Null)`.
/// Arrays and strings carry no keys at all, so they read as a record without `messages`.
#[derive(Clone, Copy, Debug)]
pub struct Record<'a> {
    pub messages: Option<&'a Value>,
}

impl<'a> Record<'a> {
    pub fn from_value(value: &'a Value) -> Result<Self, StructureFault> {
        match value {
            Value::Object(obj) => Ok(Self {
                messages: obj.get("messages"),
            }),
            Value::Array(_) | Value::String(_) => Ok(Self { messages: None }),
            _ => Err(StructureFault::NotAnObject),
        }
    }
}

/// Message content. Text is measured in characters, multi-part lists by
/// element count and objects by entry count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Content<'a> {
    Text(&'a str),
    Parts(&'a [Value]),
    Object(&'a Map<String, Value>),
}

impl<'a> Content<'a> {
    pub fn len(&self) -> usize {
        match self {
            Content::Text(s) => s.chars().count(),
            Content::Parts(parts) => parts.len(),
            Content::Object(obj) => obj.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Plain text of the content. Parts contribute their string value or
    /// their `text` field, in order.
    pub fn text(&self) -> Cow<'a, str> {
        match *self {
            Content::Text(s) => Cow::Borrowed(s),
            Content::Parts(parts) => Cow::Owned(parts.iter().filter_map(part_text).collect()),
            Content::Object(obj) => obj
                .get("text")
                .and_then(Value::as_str)
                .map_or(Cow::Borrowed(""), Cow::Borrowed),
        }
    }
}

fn part_text(part: &Value) -> Option<&str> {
    match part {
        Value::String(s) => Some(s.as_str()),
        Value::Object(obj) => obj.get("text").and_then(Value::as_str),
        _ => None,
    }
}

/// Loosely typed view of one `messages` entry.
#[derive(Clone, Copy, Debug)]
pub struct MessageView<'a> {
    pub index: usize,
    pub role: Option<&'a Value>,
    pub content: Option<&'a Value>,
}

impl<'a> MessageView<'a> {
    pub fn from_value(index: usize, value: &'a Value) -> Result<Self, StructureFault> {
        let obj = value
            .as_object()
            .ok_or(StructureFault::EntryNotObject { index })?;
        Ok(Self {
            index,
            role: obj.get("role"),
            content: obj.get("content"),
        })
    }

    /// Role comparison. A non-string role never matches but is not a fault;
    /// a missing role is.
    pub fn has_role(&self, role: &str) -> Result<bool, StructureFault> {
        match self.role {
            Some(v) => Ok(v.as_str() == Some(role)),
            None => Err(StructureFault::MissingField {
                index: self.index,
                field: "role",
            }),
        }
    }

    /// Content with a measurable length. Numbers, booleans and null are faults.
    pub fn content(&self) -> Result<Content<'a>, StructureFault> {
        let v = self.content.ok_or(StructureFault::MissingField {
            index: self.index,
            field: "content",
        })?;
        match v {
            Value::String(s) => Ok(Content::Text(s)),
            Value::Array(parts) => Ok(Content::Parts(parts)),
            Value::Object(obj) => Ok(Content::Object(obj)),
            _ => Err(StructureFault::NotMeasurable {
                index: self.index,
                field: "content",
            }),
        }
    }
}

/// Strictly typed chat turn.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Collects every well-formed turn of a record, in order.
    /// Multi-part content is flattened to its text. Entries without a
    /// string role or measurable content are dropped.
    pub fn from_record(value: &Value) -> Self {
        let messages = value
            .get("messages")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .enumerate()
                    .filter_map(|(index, m)| {
                        let view = MessageView::from_value(index, m).ok()?;
                        Some(Message {
                            role: view.role?.as_str()?.to_string(),
                            content: view.content().ok()?.text().into_owned(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_distinguishes_absent_and_null() {
        let absent = json!({});
        let null = json!({"messages": null});
        assert!(Record::from_value(&absent).unwrap().messages.is_none());
        assert_eq!(Record::from_value(&null).unwrap().messages, Some(&Value::Null));
    }

    #[test]
    fn test_non_string_role_is_not_a_fault() {
        let v = json!({"role": 7, "content": "x"});
        let view = MessageView::from_value(0, &v).unwrap();
        assert_eq!(view.has_role(ROLE_USER), Ok(false));
    }

    #[test]
    fn test_conversation_drops_malformed_turns() {
        let v = json!({"messages": [
            {"role": "user", "content": "hello"},
            {"role": "assistant"},
            "noise",
            {"role": "assistant", "content": "hi"}
        ]});
        let conv = Conversation::from_record(&v);
        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[1].content, "hi");
    }

    #[test]
    fn test_arrays_and_strings_read_as_keyless_records() {
        for v in [json!([1, 2]), json!(["messages"]), json!("hello")] {
            assert!(Record::from_value(&v).unwrap().messages.is_none());
        }
    }

    #[test]
    fn test_scalar_records_are_faults() {
        for v in [json!(42), json!(true), json!(null)] {
            assert_eq!(Record::from_value(&v).unwrap_err(), StructureFault::NotAnObject);
        }
    }

    #[test]
    fn test_content_length_by_shape() {
        let v = json!({"role": "user", "content": [
            {"type": "text", "text": "What is in "},
            {"type": "text", "text": "this picture?"}
        ]});
        let content = MessageView::from_value(0, &v).unwrap().content().unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content.text(), "What is in this picture?");

        let v = json!({"role": "user", "content": {"type": "text", "text": "hi", "lang": "en"}});
        let content = MessageView::from_value(0, &v).unwrap().content().unwrap();
        assert_eq!(content.len(), 3);
        assert_eq!(content.text(), "hi");

        let v = json!({"role": "user", "content": "héllo"});
        assert_eq!(MessageView::from_value(0, &v).unwrap().content().unwrap().len(), 5);
    }

    #[test]
    fn test_scalar_content_is_a_fault() {
        for c in [json!(3), json!(null), json!(false)] {
            let v = json!({"role": "user", "content": c});
            assert_eq!(
                MessageView::from_value(4, &v).unwrap().content().unwrap_err(),
                StructureFault::NotMeasurable { index: 4, field: "content" }
            );
        }
    }

    #[test]
    fn test_conversation_flattens_multi_part_content() {
        let v = json!({"messages": [
            {"role": "user", "content": [{"type": "text", "text": "Describe "}, "this"]},
            {"role": "assistant", "content": 5}
        ]});
        let conv = Conversation::from_record(&v);
        assert_eq!(conv.messages.len(), 1);
        assert_eq!(conv.messages[0].content, "Describe this");
    }
}
