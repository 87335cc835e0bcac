//! Interpretation of raw decoded values.
//!
//! Applied in the following order after a single value has been decoded:
//! 1. Value map: an exact match replaces the value with its description.
//! 2. Bit descriptions: if the value is still a plain number, it is replaced
//!    by the labels of its set/unset bits (when any label applies).
//!
//! Both steps leave null values untouched.

use crate::{
    field::{BitDescription, ValueMapEntry},
    value::Value,
};

/// Applies both interpretation steps in order.
pub fn interpret(value: Value, value_map: &[ValueMapEntry], bits: &[BitDescription]) -> Value {
    let value = apply_value_map(value, value_map);
    apply_bit_descriptions(value, bits)
}

/// Replaces `value` with the description of the first entry strictly equal to it.
pub fn apply_value_map(value: Value, value_map: &[ValueMapEntry]) -> Value {
    if value.is_null() {
        return value;
    }

    value_map
        .iter()
        .find(|entry| entry.value.strict_eq(&value))
        .map(|entry| Value::String(entry.description.clone()))
        .unwrap_or(value)
}

/// Replaces a plain number with the labels of its described bits, in
/// description order. Leaves the value alone when no label applies.
///
/// Floats are truncated toward zero before bits are tested. Bit indices of
/// 64 or above read as unset.
pub fn apply_bit_descriptions(value: Value, bits: &[BitDescription]) -> Value {
    let number = match value {
        Value::Int(v) => v,
        Value::Float(v) if v.is_finite() => v as i64,
        _ => return value,
    };

    let labels: Vec<Value> = bits
        .iter()
        .filter_map(|bit| {
            let set = bit.bit_index < 64 && (number >> bit.bit_index) & 1 == 1;
            let label = if set {
                &bit.set_description
            } else {
                &bit.unset_description
            };
            label.clone().map(Value::String)
        })
        .collect();

    if labels.is_empty() {
        value
    } else {
        Value::Array(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(value: Value, description: &str) -> ValueMapEntry {
        ValueMapEntry {
            value,
            description: description.to_string(),
        }
    }

    fn labels(values: &[&str]) -> Value {
        Value::Array(values.iter().map(|s| Value::String(s.to_string())).collect())
    }

    #[test]
    fn test_value_map_match() {
        let map = vec![mapping(Value::Int(1), "one"), mapping(Value::Int(2), "two")];
        assert_eq!(apply_value_map(Value::Int(2), &map), Value::String("two".into()));
        assert_eq!(apply_value_map(Value::Int(3), &map), Value::Int(3));
    }

    #[test]
    fn test_value_map_is_strict() {
        let map = vec![mapping(Value::Int(1), "one")];
        assert_eq!(apply_value_map(Value::BigUint(1), &map), Value::BigUint(1));
        assert_eq!(apply_value_map(Value::Null, &map), Value::Null);

        let text = vec![mapping(Value::String("MZ".into()), "DOS header")];
        assert_eq!(
            apply_value_map(Value::String("MZ".into()), &text),
            Value::String("DOS header".into())
        );
    }

    #[test]
    fn test_bit_descriptions_order() {
        let bits = vec![
            BitDescription::new(3).set("compressed"),
            BitDescription::new(0).set("readable").unset("locked"),
            BitDescription::new(1).set("writable"),
        ];
        assert_eq!(
            apply_bit_descriptions(Value::Int(0b1010), &bits),
            labels(&["compressed", "locked", "writable"])
        );
    }

    #[test]
    fn test_bit_descriptions_no_labels() {
        let bits = vec![BitDescription::new(4).set("hidden")];
        assert_eq!(apply_bit_descriptions(Value::Int(0b0001), &bits), Value::Int(1));
        assert_eq!(
            apply_bit_descriptions(Value::String("x".into()), &bits),
            Value::String("x".into())
        );
        assert_eq!(apply_bit_descriptions(Value::Int(1), &[]), Value::Int(1));
    }

    #[test]
    fn test_interpret_map_then_bits() {
        let map = vec![mapping(Value::Int(1), "ready")];
        let bits = vec![BitDescription::new(0).set("bit0")];

        // mapped values are no longer numbers
        assert_eq!(interpret(Value::Int(1), &map, &bits), Value::String("ready".into()));
        assert_eq!(interpret(Value::Int(3), &map, &bits), labels(&["bit0"]));
    }
}
