//! Flat frontmatter codec for `CHECKPOINT.md`.
//!
//! Only the subset checkpoints use is understood: `key: scalar` lines,
//! inline `[a, b]` lists, and block lists opened by an empty `key:` with
//! `  - item` lines underneath.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{AcftError, Result};

static INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+$").expect("Invalid regex pattern"));
static FLOAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+\.\d+$").expect("Invalid regex pattern"));

/// A single frontmatter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FrontmatterValue {
    Bool(bool),
    Null,
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<FrontmatterValue>),
}

impl FrontmatterValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Loose truthiness used by heuristics: `true`, non-zero numbers,
    /// non-empty strings and non-empty lists.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Null => false,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
        }
    }

    fn encode_scalar(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Null => "null".to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => {
                let text = f.to_string();
                if text.contains('.') || !f.is_finite() {
                    text
                } else {
                    format!("{text}.0")
                }
            }
            Self::String(s) => {
                if needs_quotes(s) {
                    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
                } else {
                    s.clone()
                }
            }
            Self::List(items) => {
                let inner: Vec<String> = items.iter().map(Self::encode_scalar).collect();
                format!("[{}]", inner.join(", "))
            }
        }
    }
}

impl fmt::Display for FrontmatterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            other => write!(f, "{}", other.encode_scalar()),
        }
    }
}

impl From<bool> for FrontmatterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for FrontmatterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FrontmatterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<String>> for FrontmatterValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values.into_iter().map(Self::String).collect())
    }
}

/// Ordered frontmatter mapping. Keys keep their first-seen position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    entries: Vec<(String, FrontmatterValue)>,
}

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the text between the `---` delimiters.
    pub fn parse(block: &str) -> Result<Self> {
        let mut frontmatter = Self::new();
        let mut current_key: Option<String> = None;

        for raw_line in block.trim().lines() {
            let line = raw_line.trim_end();
            if line.is_empty() || line.trim_start().starts_with('#') {
                continue;
            }

            if let (Some(item), Some(key)) = (line.strip_prefix("  -"), current_key.as_deref()) {
                let item = item.trim();
                if item.is_empty() {
                    continue;
                }
                frontmatter.push_list_item(key, parse_scalar(item));
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                return Err(AcftError::format(format!(
                    "Invalid frontmatter line: {line}"
                )));
            };
            let key = key.trim().to_string();
            let value = value.trim();
            let value = if value.is_empty() {
                FrontmatterValue::List(Vec::new())
            } else {
                parse_scalar(value)
            };
            frontmatter.set(key.clone(), value);
            current_key = Some(key);
        }

        Ok(frontmatter)
    }

    /// Encode back to `key: value` lines, without delimiters.
    pub fn encode(&self) -> String {
        let mut lines = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            match value {
                FrontmatterValue::List(items) if items.is_empty() => {
                    lines.push(format!("{key}: []"));
                }
                FrontmatterValue::List(items) => {
                    lines.push(format!("{key}:"));
                    for item in items {
                        lines.push(format!("  - {}", item.encode_scalar()));
                    }
                }
                scalar => lines.push(format!("{key}: {}", scalar.encode_scalar())),
            }
        }
        lines.join("\n")
    }

    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FrontmatterValue::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Replace the value in place, or append a new key at the end.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FrontmatterValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<FrontmatterValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FrontmatterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push_list_item(&mut self, key: &str, item: FrontmatterValue) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, FrontmatterValue::List(items))) => items.push(item),
            Some((_, slot)) => *slot = FrontmatterValue::List(vec![item]),
            None => self
                .entries
                .push((key.to_string(), FrontmatterValue::List(vec![item]))),
        }
    }
}

/// Decode one scalar token.
pub fn parse_scalar(token: &str) -> FrontmatterValue {
    let lowered = token.to_ascii_lowercase();
    match lowered.as_str() {
        "true" => return FrontmatterValue::Bool(true),
        "false" => return FrontmatterValue::Bool(false),
        "null" | "none" => return FrontmatterValue::Null,
        _ => {}
    }

    if INT_RE.is_match(token) {
        if let Ok(value) = token.parse::<i64>() {
            return FrontmatterValue::Int(value);
        }
    }
    if FLOAT_RE.is_match(token) {
        if let Ok(value) = token.parse::<f64>() {
            return FrontmatterValue::Float(value);
        }
    }

    if token.len() >= 2 {
        if token.starts_with('"') && token.ends_with('"') {
            let decoded = serde_json::from_str::<String>(token)
                .unwrap_or_else(|_| token[1..token.len() - 1].to_string());
            return FrontmatterValue::String(decoded);
        }
        if token.starts_with('\'') && token.ends_with('\'') {
            return FrontmatterValue::String(token[1..token.len() - 1].to_string());
        }
    }

    if let Some(inner) = token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        let inner = inner.trim();
        if inner.is_empty() {
            return FrontmatterValue::List(Vec::new());
        }
        return FrontmatterValue::List(
            inner.split(',').map(|part| parse_scalar(part.trim())).collect(),
        );
    }

    FrontmatterValue::String(token.to_string())
}

fn needs_quotes(text: &str) -> bool {
    text.is_empty()
        || text.chars().any(|c| c.is_whitespace() || c == ':' || c == '#')
        || parse_scalar(text) != FrontmatterValue::String(text.to_string())
}
