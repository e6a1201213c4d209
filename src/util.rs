//! Small helpers shared by the model layer: unique ids, HTML escaping, URL
//! component encoding and the loose value semantics attributes rely on.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Number, Value};

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Process-unique id. The counter is shared by every prefix and never reused.
pub fn unique_id(prefix: Option<&str>) -> String {
    let id = ID_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    match prefix {
        Some(p) if !p.is_empty() => format!("{p}{id}"),
        _ => id.to_string(),
    }
}

/// Escape `&`, `<`, `>`, `"` and `'` for safe inclusion in HTML text.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Loose truthiness: `null`, `false`, `0` and `""` are falsy, everything else
/// (including empty arrays and objects) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Identity comparison for attribute writes.
///
/// Scalars compare by value. Two integers compare exactly; a float on either
/// side compares through `f64`, so `1` and `1.0` match. Arrays and objects are
/// never identical: every write hands the store a fresh value, and no deep
/// comparison is attempted.
pub fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => same_number(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        _ => false,
    }
}

fn same_number(x: &Number, y: &Number) -> bool {
    if x.is_f64() || y.is_f64() {
        return match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        };
    }
    match (x.as_i64(), y.as_i64()) {
        (Some(x), Some(y)) => x == y,
        // At least one side exceeds i64::MAX.
        _ => matches!((x.as_u64(), y.as_u64()), (Some(x), Some(y)) if x == y),
    }
}

/// Render a value as plain text: strings without quotes, `null` as empty,
/// whole floats without a fractional part (`7.0` renders as `7`).
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => display_number(n),
        other => other.to_string(),
    }
}

fn display_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f == 0.0 => "0".to_string(),
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}
