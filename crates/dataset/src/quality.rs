use std::collections::HashMap;
use std::io;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sink::Sink;
use crate::types::Accepted;

pub type Hash32 = [u8; 32];

/// Fewer accepted conversations than this rarely move an adapter.
pub const MIN_CONVERSATIONS: u64 = 200;
/// A first exchange counts as thin below these trimmed character counts.
pub const THIN_USER_CHARS: u64 = 10;
pub const THIN_ASSISTANT_CHARS: u64 = 5;

/// Soft statistics over the accepted records of one run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QualityReport {
    pub conversations: u64,
    pub score: u8, // 0..100
    pub warnings: Vec<String>,
    pub repeat_rate: f32, // 0.0..1.0
    /// Lines whose first exchange repeats an earlier accepted line.
    pub repeated_lines: Vec<usize>,
    pub avg_user_len: u32,
    pub avg_assistant_len: u32,
    pub thin_count: u64,
    #[serde(with = "hex", rename = "content_hash_hex")]
    pub content_hash: Hash32, // BLAKE3 over canonical accepted records
}

/// Collects statistics from accepted records as a [`Sink`].
pub struct QualityAccumulator {
    hasher: blake3::Hasher,
    first_seen: HashMap<Hash32, usize>,
    repeated_lines: Vec<usize>,
    count: u64,
    thin: u64,
    user_sum: u64,
    assistant_sum: u64,
}

impl Default for QualityAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl QualityAccumulator {
    pub fn new() -> Self {
        Self {
            hasher: blake3::Hasher::new(),
            first_seen: HashMap::new(),
            repeated_lines: Vec::new(),
            count: 0,
            thin: 0,
            user_sum: 0,
            assistant_sum: 0,
        }
    }

    pub fn observe(&mut self, record: &Accepted<'_>) {
        // serde_json's default map is ordered, so this is canonical
        self.hasher.update(record.record.to_string().as_bytes());
        self.hasher.update(b"\n");

        let user = record.exchange.user.text();
        let assistant = record.exchange.assistant.text();
        let (user, assistant) = (user.trim(), assistant.trim());
        let user_len = user.chars().count() as u64;
        let assistant_len = assistant.chars().count() as u64;

        if user_len < THIN_USER_CHARS || assistant_len < THIN_ASSISTANT_CHARS {
            self.thin += 1;
        }

        let fp: Hash32 = blake3::hash(format!("{user}\n{assistant}").as_bytes()).into();
        if let Some(&first) = self.first_seen.get(&fp) {
            debug!(line = record.line, first, "first exchange repeats an earlier line");
            self.repeated_lines.push(record.line);
        } else {
            self.first_seen.insert(fp, record.line);
        }

        self.count += 1;
        self.user_sum += user_len;
        self.assistant_sum += assistant_len;
    }

    pub fn report(&self) -> QualityReport {
        let content_hash: Hash32 = self.hasher.finalize().into();
        let count = self.count;

        if count == 0 {
            return QualityReport {
                conversations: 0,
                score: 0,
                warnings: vec!["No conversation passed validation".to_string()],
                repeat_rate: 0.0,
                repeated_lines: vec![],
                avg_user_len: 0,
                avg_assistant_len: 0,
                thin_count: 0,
                content_hash,
            };
        }

        let avg_user = (self.user_sum / count) as u32;
        let avg_assistant = (self.assistant_sum / count) as u32;
        let repeats = self.repeated_lines.len();
        let repeat_rate = repeats as f32 / count as f32;

        let penalties: [(bool, i32, String); 4] = [
            (
                count < MIN_CONVERSATIONS,
                25,
                format!("Only {count} conversations; an adapter usually needs {MIN_CONVERSATIONS} or more"),
            ),
            (
                repeat_rate > 0.15,
                25,
                format!("{repeats} conversations repeat an earlier first exchange ({:.0}%)", repeat_rate * 100.0),
            ),
            (
                self.thin > count / 5,
                20,
                format!("{} conversations open with a thin exchange", self.thin),
            ),
            (
                avg_assistant < 20,
                10,
                format!("Assistant turns average {avg_assistant} chars; the tuned model may answer tersely"),
            ),
        ];

        let mut score: i32 = 100;
        let mut warnings = Vec::new();
        for (hit, cost, warning) in penalties {
            if hit {
                score -= cost;
                warnings.push(warning);
            }
        }

        QualityReport {
            conversations: count,
            score: score.clamp(0, 100) as u8,
            warnings,
            repeat_rate,
            repeated_lines: self.repeated_lines.clone(),
            avg_user_len: avg_user,
            avg_assistant_len: avg_assistant,
            thin_count: self.thin,
            content_hash,
        }
    }
}

impl Sink for QualityAccumulator {
    fn accepted(&mut self, record: &Accepted<'_>) -> io::Result<()> {
        self.observe(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Content;
    use crate::types::Exchange;
    use serde_json::json;

    fn feed(acc: &mut QualityAccumulator, line: usize, user: &str, assistant: &str) {
        let record = json!({"messages": [
            {"role": "user", "content": user},
            {"role": "assistant", "content": assistant}
        ]});
        acc.observe(&Accepted {
            line,
            record: &record,
            exchange: Exchange {
                user: Content::Text(user),
                assistant: Content::Text(assistant),
            },
        });
    }

    #[test]
    fn test_empty_report_scores_zero() {
        let r = QualityAccumulator::new().report();
        assert_eq!(r.conversations, 0);
        assert_eq!(r.score, 0);
        assert_eq!(r.warnings.len(), 1);
    }

    #[test]
    fn test_repeats_and_small_dataset_penalised() {
        let mut acc = QualityAccumulator::new();
        for line in [2, 3, 5, 8] {
            feed(&mut acc, line, "What is the capital of France?", "The capital of France is Paris.");
        }
        let r = acc.report();
        assert_eq!(r.conversations, 4);
        assert!((r.repeat_rate - 0.75).abs() < f32::EPSILON);
        assert_eq!(r.repeated_lines, vec![3, 5, 8]);
        assert_eq!(r.avg_user_len, 30);
        // low count and repeats
        assert_eq!(r.score, 50);
        assert_eq!(r.warnings.len(), 2);
    }

    #[test]
    fn test_content_hash_is_order_sensitive() {
        let mut a = QualityAccumulator::new();
        feed(&mut a, 1, "first question here", "first answer that is long enough");
        feed(&mut a, 2, "second question here", "second answer that is long enough");

        let mut b = QualityAccumulator::new();
        feed(&mut b, 1, "second question here", "second answer that is long enough");
        feed(&mut b, 2, "first question here", "first answer that is long enough");

        assert_ne!(a.report().content_hash, b.report().content_hash);
    }

    #[test]
    fn test_report_serializes_hash_as_hex() {
        let r = QualityAccumulator::new().report();
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["content_hash_hex"].as_str().unwrap().len(), 64);
    }
}
