//! Payload-shape sniffing for undocumented Stockist endpoints.
//!
//! The same account can answer with plain JSON (an array or a wrapped
//! object), JSONP (`callback({...});`), or a bulk "overview" JavaScript
//! file that embeds the location array as a literal. This module decides
//! which shape a response body is and extracts the candidate record list.
//! It is pure: no I/O, same input always yields the same output.

use regex::Regex;
use serde_json::{Map, Value};

use crate::types::RawRecord;

/// Object keys probed (at up to two nesting levels) to locate the record
/// list inside a wrapping JSON object.
const CONTAINER_KEYS: [&str; 6] = ["locations", "results", "items", "data", "records", "stores"];

/// Field names whose presence marks an array of objects as location-like.
/// Used to score candidate array literals found in overview scripts.
const LOCATION_FIELD_HINTS: [&str; 17] = [
    "name",
    "title",
    "store_name",
    "address",
    "address1",
    "address_line_1",
    "street",
    "city",
    "state",
    "region",
    "country",
    "postal_code",
    "zip",
    "lat",
    "latitude",
    "lng",
    "longitude",
];

/// Minimum hint overlap for a script-embedded array to be accepted.
const MIN_HINT_SCORE: usize = 2;

/// One parsed page of provider data.
#[derive(Debug, Default)]
pub struct ParsedPage {
    pub records: Vec<RawRecord>,
    /// `true` when the payload itself reports pagination exhaustion
    /// (`total_pages` reached, `next_page: null`, `has_more: false`, ...).
    pub exhausted: bool,
}

/// Parses a raw response body into location records.
///
/// Decision order: direct JSON, JSONP unwrap, script-embedded array scan.
/// Anything unrecognizable yields an empty result; callers treat that as
/// "this endpoint candidate is unusable" rather than an error.
#[must_use]
pub fn parse_payload(body: &str, content_type: &str, url: &str) -> ParsedPage {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return ParsedPage::default();
    }

    // 1. Direct JSON, regardless of the advertised content type; several
    //    integrations serve JSON as text/javascript.
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return extract_from_value(&value);
    }

    // 2. JSONP: identifier(...) wrapping around a JSON payload.
    if let Some(inner) = unwrap_jsonp(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(inner) {
            return extract_from_value(&value);
        }
    }

    // 3. Bulk overview script: scan for the best location-like array literal.
    let records = extract_script_embedded_records(trimmed);
    if !records.is_empty() {
        return ParsedPage {
            records,
            exhausted: false,
        };
    }

    tracing::debug!(content_type, url, "payload did not match any known shape");
    ParsedPage::default()
}

fn extract_from_value(value: &Value) -> ParsedPage {
    match value {
        Value::Array(items) => ParsedPage {
            records: objects_of(items),
            exhausted: false,
        },
        Value::Object(obj) => extract_from_object(obj),
        _ => ParsedPage::default(),
    }
}

fn extract_from_object(obj: &Map<String, Value>) -> ParsedPage {
    let mut exhausted = exhaustion_signal(obj);
    if let Some(Value::Object(meta)) = obj.get("meta") {
        exhausted = exhausted || exhaustion_signal(meta);
    }

    // Depth 1: a container key holding the array directly.
    for key in CONTAINER_KEYS {
        if let Some(Value::Array(items)) = obj.get(key) {
            return ParsedPage {
                records: objects_of(items),
                exhausted,
            };
        }
    }

    // Depth 2: a container key holding an object that holds the array.
    for key in CONTAINER_KEYS {
        if let Some(Value::Object(inner)) = obj.get(key) {
            let inner_exhausted = exhausted || exhaustion_signal(inner);
            for inner_key in CONTAINER_KEYS {
                if let Some(Value::Array(items)) = inner.get(inner_key) {
                    return ParsedPage {
                        records: objects_of(items),
                        exhausted: inner_exhausted,
                    };
                }
            }
        }
    }

    ParsedPage {
        records: vec![],
        exhausted,
    }
}

fn objects_of(items: &[Value]) -> Vec<RawRecord> {
    items
        .iter()
        .filter_map(|item| item.as_object().cloned())
        .collect()
}

/// Reads an explicit no-more-pages indicator from a payload object.
fn exhaustion_signal(obj: &Map<String, Value>) -> bool {
    let total = int_field(obj, "total_pages").or_else(|| int_field(obj, "pages"));
    let current = int_field(obj, "current_page").or_else(|| int_field(obj, "page"));
    if let (Some(total), Some(current)) = (total, current) {
        if current >= total {
            return true;
        }
    }
    match obj.get("next_page") {
        Some(Value::Null) => return true,
        Some(Value::Bool(false)) => return true,
        _ => {}
    }
    if obj.get("has_more").and_then(Value::as_bool) == Some(false) {
        return true;
    }
    false
}

fn int_field(obj: &Map<String, Value>, key: &str) -> Option<u64> {
    obj.get(key).and_then(|v| {
        v.as_u64()
            .or_else(|| v.as_str().and_then(|s| s.parse::<u64>().ok()))
    })
}

/// Strips a JSONP envelope: `someCallback({...});` becomes `{...}`.
///
/// Accepts dotted identifiers (`Stockist.cb(...)`) and a trailing
/// semicolon. Returns `None` when the body does not look like a single
/// function call.
fn unwrap_jsonp(body: &str) -> Option<&str> {
    let head_re = Regex::new(r"^[A-Za-z_$][\w$.]*\s*\(").expect("valid regex");
    head_re.find(body)?;

    let open = body.find('(')?;
    let close = body.rfind(')')?;
    if open + 1 >= close {
        return None;
    }
    Some(body[open + 1..close].trim())
}

/// Scans JavaScript source for array-of-object literals assigned to a
/// variable or property, validates them against the known location field
/// names, and returns the best-scoring candidate.
fn extract_script_embedded_records(source: &str) -> Vec<RawRecord> {
    let assign_re = Regex::new(r"[=:(]\s*\[").expect("valid regex");

    let mut best: Vec<RawRecord> = vec![];
    let mut best_score = 0usize;

    for m in assign_re.find_iter(source) {
        // The match ends on the opening bracket.
        let start = m.end() - 1;
        let Some(literal) = balanced_array_prefix(&source[start..]) else {
            continue;
        };
        let Ok(Value::Array(items)) = serde_json::from_str::<Value>(literal) else {
            continue;
        };
        let records = objects_of(&items);
        let Some(first) = records.first() else {
            continue;
        };
        let score = LOCATION_FIELD_HINTS
            .iter()
            .filter(|hint| first.contains_key(**hint))
            .count();
        if score >= MIN_HINT_SCORE && (score > best_score || records.len() > best.len() && score == best_score) {
            best_score = score;
            best = records;
        }
    }

    best
}

/// Returns the shortest prefix of `s` that forms a complete, balanced
/// `[...]` array literal, respecting string literals and escapes. Only a
/// `]` closing to depth 0 is accepted, so `[42}` never matches.
fn balanced_array_prefix(s: &str) -> Option<&str> {
    if !s.starts_with('[') {
        return None;
    }
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escape = false;
    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if in_string {
            match c {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            '}' => depth -= 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
#[path = "payload_test.rs"]
mod tests;
