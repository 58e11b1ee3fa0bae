//! Document normalization.
//!
//! Three recursive passes, applied in this order by [`normalize_value`]:
//!
//! - [`coerce_numbers`]: strings that parse fully as an integer or a finite
//!   float become JSON numbers. `"12A"` stays a string.
//! - [`unwrap_singletons`]: one-element arrays become their element.
//! - [`sweep_sentinels`]: object fields equal to [`SENTINEL`] are removed, and
//!   so are objects left empty.
//!
//! Each pass is idempotent and so is the composition.

use serde_json::{Number, Value};

use super::types::VariantDocument;

/// Placeholder ClinVar uses for "unknown" or "not applicable".
pub const SENTINEL: &str = "-";

/// Normalize a document body in place.
pub fn normalize_document(doc: &mut VariantDocument) {
    let mut body = Value::Object(std::mem::take(&mut doc.body));
    normalize_value(&mut body);
    if let Value::Object(map) = body {
        doc.body = map;
    }
}

/// Apply all three passes to a value.
pub fn normalize_value(value: &mut Value) {
    coerce_numbers(value);
    unwrap_singletons(value);
    sweep_sentinels(value);
}

fn parse_number(text: &str) -> Option<Number> {
    if let Ok(i) = text.parse::<i64>() {
        return Some(i.into());
    }
    if let Ok(u) = text.parse::<u64>() {
        return Some(u.into());
    }
    // Integers past u64 would lose digits as floats
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Non-finite floats have no JSON representation
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Convert numeric strings to numbers, recursively.
pub fn coerce_numbers(value: &mut Value) {
    match value {
        Value::String(text) => {
            if let Some(number) = parse_number(text) {
                *value = Value::Number(number);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(coerce_numbers),
        Value::Object(map) => map.values_mut().for_each(coerce_numbers),
        _ => {}
    }
}

/// Replace one-element arrays with their element, recursively.
pub fn unwrap_singletons(value: &mut Value) {
    match value {
        Value::Array(items) => {
            items.iter_mut().for_each(unwrap_singletons);
            if items.len() == 1 {
                if let Some(only) = items.pop() {
                    *value = only;
                }
            }
        }
        Value::Object(map) => map.values_mut().for_each(unwrap_singletons),
        _ => {}
    }
}

fn is_sentinel(value: &Value) -> bool {
    matches!(value, Value::String(s) if s == SENTINEL)
}

fn is_empty_object(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.is_empty())
}

/// Drop sentinel fields and empty objects, recursively.
pub fn sweep_sentinels(value: &mut Value) {
    match value {
        Value::Object(map) => map.retain(|_, child| {
            sweep_sentinels(child);
            !is_sentinel(child) && !is_empty_object(child)
        }),
        Value::Array(items) => items.iter_mut().for_each(sweep_sentinels),
        _ => {}
    }
}
