use anyhow::{Context, Result};
use dataset::{Thresholds, MIN_ASSISTANT_CHARS, MIN_USER_CHARS};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidateConfig {
    pub min_user_chars: usize,
    pub min_assistant_chars: usize,
}

impl ValidateConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let min_user_chars = get_usize(&lookup, "VALIDATE_MIN_USER_CHARS", MIN_USER_CHARS)?;
        let min_assistant_chars =
            get_usize(&lookup, "VALIDATE_MIN_ASSISTANT_CHARS", MIN_ASSISTANT_CHARS)?;

        Ok(Self {
            min_user_chars,
            min_assistant_chars,
        })
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            min_user_chars: self.min_user_chars,
            min_assistant_chars: self.min_assistant_chars,
        }
    }
}

fn get_usize(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: usize) -> Result<usize> {
    match lookup(key) {
        Some(v) => v
            .trim()
            .parse::<usize>()
            .with_context(|| format!("{key} must be a non-negative integer, got {v:?}")),
        None => Ok(default),
    }
}
