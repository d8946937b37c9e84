//! Reply sanitization and JSON extraction from model output.
//!
//! Model text is untrusted. Replies are cleaned before they enter a
//! transcript, and classifier output is dug out of whatever prose or code
//! fences the model wrapped it in.

use serde_json::Value;
use thiserror::Error;

/// Maximum accepted model output (100KB).
pub const MAX_RESPONSE_LENGTH: usize = 100_000;

/// Maximum length of a single string value inside extracted JSON.
pub const MAX_FIELD_LENGTH: usize = 2_000;

const INJECTION_MARKERS: [&str; 11] = [
    "```system",
    "```assistant",
    "[INST]",
    "[/INST]",
    "<|system|>",
    "<|assistant|>",
    "<|user|>",
    "<|im_start|>",
    "<|im_end|>",
    "<<SYS>>",
    "<</SYS>>",
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SanitizationError {
    #[error("Response too long: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },

    #[error("Response is empty after sanitization")]
    Empty,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Sanitization failed: {0}")]
    Sanitization(#[from] SanitizationError),

    #[error("JSON parse error: {0}")]
    ParseError(String),
}

/// Cleans assistant replies before they are stored.
///
/// Besides stripping control characters and prompt-injection markers, the
/// sanitizer enforces the plain-text layout replies are asked for: markdown
/// heading markers and paired `**` emphasis are removed and runs of blank
/// lines are collapsed to a single empty line.
#[derive(Debug, Clone, Default)]
pub struct ResponseSanitizer {
    additional_patterns: Vec<String>,
}

impl ResponseSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds patterns stripped on top of the built-in injection markers.
    pub fn with_additional_patterns(mut self, patterns: Vec<String>) -> Self {
        self.additional_patterns = patterns;
        self
    }

    /// Sanitizes a reply. Fails if it is oversized or nothing is left.
    pub fn sanitize(&self, response: &str) -> Result<String, SanitizationError> {
        let cleaned = self.clean(response)?;
        let laid_out = normalize_layout(&cleaned);
        if laid_out.is_empty() {
            return Err(SanitizationError::Empty);
        }
        Ok(laid_out)
    }

    /// Length check, control characters and injection markers only.
    fn clean(&self, response: &str) -> Result<String, SanitizationError> {
        if response.len() > MAX_RESPONSE_LENGTH {
            return Err(SanitizationError::TooLong {
                max: MAX_RESPONSE_LENGTH,
                actual: response.len(),
            });
        }

        let mut result: String = response
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
            .collect();

        for pattern in INJECTION_MARKERS {
            result = result.replace(pattern, "");
        }
        for pattern in &self.additional_patterns {
            result = result.replace(pattern.as_str(), "");
        }

        Ok(result)
    }
}

fn normalize_layout(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank_run = 0;

    for raw in text.lines() {
        let line = strip_paired(strip_heading(raw.trim_end()), "**");
        let line = line.trim_end();

        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run == 1 && !lines.is_empty() {
                lines.push(String::new());
            }
            continue;
        }
        blank_run = 0;
        lines.push(line.trim_start_matches(' ').to_string());
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Drops a markdown heading marker: one to six `#` followed by a space.
fn strip_heading(line: &str) -> &str {
    let body = line.trim_start();
    let hashes = body.len() - body.trim_start_matches('#').len();
    if (1..=6).contains(&hashes) && body[hashes..].starts_with(' ') {
        &body[hashes + 1..]
    } else {
        line
    }
}

/// Removes `marker` only where it opens and closes a span; an unpaired
/// trailing marker is kept.
fn strip_paired(line: &str, marker: &str) -> String {
    let parts: Vec<&str> = line.split(marker).collect();
    let markers = parts.len() - 1;
    let paired = markers - markers % 2;

    let mut out = String::with_capacity(line.len());
    for (i, part) in parts.iter().enumerate() {
        if i > 0 && i > paired {
            out.push_str(marker);
        }
        out.push_str(part);
    }
    out
}

/// Pulls a JSON value out of model output.
#[derive(Debug, Clone, Default)]
pub struct JsonExtractor {
    sanitizer: ResponseSanitizer,
}

impl JsonExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts and parses the first JSON document in `response`.
    ///
    /// Candidates are tried in order: a fenced code block, the first
    /// balanced object, the first balanced array, then the whole text. The
    /// first that parses wins. String values are stripped of HTML-like tags
    /// and truncated to [`MAX_FIELD_LENGTH`].
    pub fn extract_value(&self, response: &str) -> Result<Value, ExtractionError> {
        let cleaned = self.sanitizer.clean(response)?;
        let text = cleaned.trim();

        let mut last_error = None;
        for candidate in json_candidates(text) {
            match serde_json::from_str::<Value>(&candidate) {
                Ok(value) => return Ok(sanitize_strings(value)),
                Err(e) => last_error = Some(e.to_string()),
            }
        }

        Err(ExtractionError::ParseError(
            last_error.unwrap_or_else(|| "no JSON found".to_string()),
        ))
    }
}

fn json_candidates(text: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    if let Some(block) = from_code_block(text) {
        candidates.push(block);
    }
    for (open, close) in [('{', '}'), ('[', ']')] {
        if let Some(span) = text.find(open).and_then(|at| balanced(text, at, open, close)) {
            candidates.push(span);
        }
    }
    candidates.push(text.to_string());
    candidates.dedup();
    candidates
}

fn from_code_block(text: &str) -> Option<String> {
    for fence in ["```json\n", "```json\r\n", "```\n", "```\r\n"] {
        if let Some(start) = text.find(fence) {
            let body = start + fence.len();
            if let Some(end) = text[body..].find("```") {
                return Some(text[body..body + end].trim().to_string());
            }
        }
    }
    None
}

fn balanced(text: &str, start: usize, open: char, close: char) -> Option<String> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let end = start + offset + c.len_utf8();
                    return Some(text[start..end].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

fn sanitize_strings(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(clip(&strip_tags(&s))),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_strings).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, sanitize_strings(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Removes well-formed tags such as `<b>`, `</b>` or `<br/>`. A `<` that
/// does not open a tag name (`<1 year`, `< 2 kg`) is kept as text.
fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(at) = rest.find('<') {
        out.push_str(&rest[..at]);
        let tail = &rest[at..];
        match tag_len(tail) {
            Some(len) => rest = &tail[len..],
            None => {
                out.push('<');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Byte length of the tag at the start of `s`, if one is there.
fn tag_len(s: &str) -> Option<usize> {
    let close = s.find('>')?;
    let inner = &s[1..close];
    if inner.contains('<') {
        return None;
    }
    let name = inner.strip_prefix('/').unwrap_or(inner);
    let name = name.strip_suffix('/').unwrap_or(name).trim_end();
    let name = name.split_whitespace().next()?;

    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_is_name = chars.all(|c| c.is_ascii_alphanumeric() || c == '-');
    let no_leading_space = !inner.starts_with(char::is_whitespace);

    (starts_with_letter && rest_is_name && no_leading_space).then_some(close + 1)
}

fn clip(s: &str) -> String {
    if s.len() <= MAX_FIELD_LENGTH {
        return s.to_string();
    }
    let mut end = MAX_FIELD_LENGTH;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}
