use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::schema::Conversation;
use crate::sink::Sink;
use crate::types::{Accepted, ValidationSummary};

pub const END_OF_TURN: &str = "</s>";

/// Training sample as consumed by a supervised fine-tuning trainer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainingText {
    pub text: String,
}

/// Renders every turn as `<|role|>\n<content></s>\n`.
pub fn render_chat(conv: &Conversation) -> String {
    let mut text = String::new();
    for msg in &conv.messages {
        text.push_str("<|");
        text.push_str(&msg.role);
        text.push_str("|>\n");
        text.push_str(&msg.content);
        text.push_str(END_OF_TURN);
        text.push('\n');
    }
    text
}

/// Writes one `{"text": ...}` line per accepted record.
pub struct TextExporter<W: Write> {
    out: W,
    written: u64,
}

impl<W: Write> TextExporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for TextExporter<W> {
    fn accepted(&mut self, record: &Accepted<'_>) -> io::Result<()> {
        let sample = TrainingText {
            text: render_chat(&Conversation::from_record(record.record)),
        };
        serde_json::to_writer(&mut self.out, &sample)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self, _summary: &ValidationSummary) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Content, Message};
    use crate::types::Exchange;
    use serde_json::json;

    #[test]
    fn test_render_chat_format() {
        let conv = Conversation {
            messages: vec![
                Message { role: "user".into(), content: "Hi there".into() },
                Message { role: "assistant".into(), content: "Hello!".into() },
            ],
        };
        assert_eq!(render_chat(&conv), "<|user|>\nHi there</s>\n<|assistant|>\nHello!</s>\n");
    }

    #[test]
    fn test_exporter_writes_jsonl() {
        let record = json!({"messages": [
            {"role": "system", "content": "Be brief."},
            {"role": "user", "content": "Why is the sky blue?"},
            {"role": "assistant", "content": "Rayleigh scattering of sunlight."}
        ]});
        let mut ex = TextExporter::new(Vec::new());
        ex.accepted(&Accepted {
            line: 1,
            record: &record,
            exchange: Exchange {
                user: Content::Text("Why is the sky blue?"),
                assistant: Content::Text("Rayleigh scattering of sunlight."),
            },
        })
        .unwrap();
        assert_eq!(ex.written(), 1);

        let out = String::from_utf8(ex.into_inner()).unwrap();
        let sample: TrainingText = serde_json::from_str(out.trim_end()).unwrap();
        assert!(sample.text.starts_with("<|system|>\nBe brief.</s>\n<|user|>"));
        assert!(out.ends_with('\n'));
    }
}
