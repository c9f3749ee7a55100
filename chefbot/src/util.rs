//! Small shared helpers.

use sha2::{Digest, Sha256};

pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Slice out the first `{` .. last `}` region of a model response.
///
/// Structured-output responses are sometimes wrapped in markdown fences or
/// prose; the JSON object itself is what the caller wants to parse.
pub fn json_slice(text: &str) -> &str {
    let start = text.find('{').unwrap_or(0);
    let end = text.rfind('}').map(|i| i + 1).unwrap_or(text.len());
    if start < end {
        &text[start..end]
    } else {
        text
    }
}

/// Truncate long payloads for log output.
pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    let total_chars = text.chars().count();
    if total_chars <= max_chars {
        return text.to_string();
    }
    let prefix: String = text.chars().take(max_chars).collect();
    format!(
        "{}... [truncated, total length: {} chars]",
        prefix, total_chars
    )
}
