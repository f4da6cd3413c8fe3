use crate::{
    error::{Error, Result},
    file::GeneratedFile,
};
use serde_json::Value;
use tracing::{debug, warn};

/// Parses and validates the model's reply into a file structure.
///
/// Replies frequently arrive wrapped in markdown fences or short prose, so
/// the parser first isolates the first balanced top-level JSON array or
/// object before handing the payload to serde.
pub(crate) struct ResponseParser {
    max_files: usize,
}

impl ResponseParser {
    /// Creates a parser enforcing the given file-count ceiling.
    pub(crate) const fn new(max_files: usize) -> Self {
        Self { max_files }
    }

    /// Parses a raw reply into an ordered list of file descriptors.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidResponse`] if the reply is not JSON, or is JSON but
    ///   not an array of objects with string `path` and `content` keys.
    /// - [`Error::TooManyFiles`] if the array exceeds the configured ceiling.
    pub(crate) fn parse(&self, reply: &str) -> Result<Vec<GeneratedFile>> {
        let payload = extract_json_payload(reply).unwrap_or(reply);

        if payload.len() != reply.len() {
            debug!(
                reply_chars = reply.len(),
                payload_chars = payload.len(),
                "Isolated JSON payload from surrounding text"
            );
        }

        let value: Value = serde_json::from_str(payload)
            .map_err(|e| Error::invalid_response(format!("reply is not valid JSON: {e}")))?;

        let entries = value
            .as_array()
            .ok_or_else(|| Error::invalid_response("response is not in expected format"))?;

        if entries.len() > self.max_files {
            return Err(Error::too_many_files(entries.len(), self.max_files));
        }

        let mut files = Vec::with_capacity(entries.len());
        for entry in entries {
            let path = entry
                .get("path")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::invalid_response("response is not in expected format"))?;
            let content = entry
                .get("content")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::invalid_response("response is not in expected format"))?;

            files.push(GeneratedFile::new(path, content));
        }

        if files.is_empty() {
            warn!("Reply parsed to an empty file list");
        }

        Ok(files)
    }
}

/// Returns the first balanced top-level JSON array or object in `text`.
///
/// The scan is string-aware: brackets inside JSON string literals and
/// escaped quotes do not affect the balance. Returns `None` when no opening
/// bracket exists or the payload never closes, in which case the caller
/// falls back to parsing the full text so serde produces the diagnostic.
fn extract_json_payload(text: &str) -> Option<&str> {
    let start = text.find(['[', '{'])?;
    let bytes = text.as_bytes();
    let (open, close) = match bytes[start] {
        b'[' => (b'[', b']'),
        _ => (b'{', b'}'),
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b if b == open => depth += 1,
            b if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}
