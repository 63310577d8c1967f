//! Canonical test values for the extended contract.
//!
//! Each `reply*`/`arg*` method pair shares one fixture: `replyInt_47`
//! returns it, `argInt_47` expects it. The generators below reproduce the
//! classic Hessian test service byte for byte, including its quirks (the
//! three-digit line counter walks past '9' into ':' for indexes over 999,
//! exactly like `(char) ('0' + i / 100)` does).

use crate::value::Value;

/// 1998-05-08 09:51:31 UTC, the reference date used by the date fixtures.
const TEST_DATE_MS: i64 = 894_621_091_000;

/// Resolve a fixture by family name, the method name minus its
/// `reply`/`arg` prefix (e.g. `Int_m0x800`, `String_1023`, `Object_2a`).
pub(crate) fn fixture(family: &str) -> Option<Value> {
    if let Some(rest) = family.strip_prefix("Int_") {
        return int_literal(rest).map(|v| Value::Int(v as i32));
    }
    if let Some(rest) = family.strip_prefix("Long_") {
        return int_literal(rest).map(Value::Long);
    }
    if let Some(rest) = family.strip_prefix("Double_") {
        return double_literal(rest).map(Value::Double);
    }
    if let Some(rest) = family.strip_prefix("Date_") {
        return date_fixture(rest);
    }
    if let Some(rest) = family.strip_prefix("String_") {
        if rest == "null" {
            return Some(Value::Null);
        }
        return rest.parse().ok().map(|n| Value::String(text_pattern(n)));
    }
    if let Some(rest) = family.strip_prefix("Binary_") {
        if rest == "null" {
            return Some(Value::Null);
        }
        return rest
            .parse()
            .ok()
            .map(|n| Value::Bytes(text_pattern(n).into_bytes()));
    }
    if let Some(rest) = family.strip_prefix("UntypedFixedList_") {
        return rest.parse().ok().map(|n| Value::list(numbered_items(n)));
    }
    if let Some(rest) = family.strip_prefix("TypedFixedList_") {
        return rest
            .parse()
            .ok()
            .map(|n| Value::typed_list("[string", numbered_items(n)));
    }
    if let Some(rest) = family.strip_prefix("UntypedMap_") {
        return map_entries(rest).map(Value::map);
    }
    if let Some(rest) = family.strip_prefix("TypedMap_") {
        return map_entries(rest).map(|e| Value::typed_map("java.util.Hashtable", e));
    }
    if let Some(rest) = family.strip_prefix("Object_") {
        return object_fixture(rest);
    }
    match family {
        "Null" => Some(Value::Null),
        "True" => Some(Value::Bool(true)),
        "False" => Some(Value::Bool(false)),
        _ => None,
    }
}

/// Integer literal in method-name form: `47`, `m16`, `0x7ff`, `m0x800`.
fn int_literal(s: &str) -> Option<i64> {
    let (negative, digits) = match s.strip_prefix('m') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let value = if let Some(hex) = digits.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse().ok()?
    };
    Some(if negative { -value } else { value })
}

/// Double literal in method-name form: `3_14159`, `m0_001`.
fn double_literal(s: &str) -> Option<f64> {
    let (negative, digits) = match s.strip_prefix('m') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let value: f64 = digits.replace('_', ".").parse().ok()?;
    Some(if negative { -value } else { value })
}

fn date_fixture(variant: &str) -> Option<Value> {
    match variant {
        "0" => Some(Value::Date(0)),
        "1" => Some(Value::Date(TEST_DATE_MS)),
        // The second date fixture is truncated to the minute.
        "2" => Some(Value::Date(TEST_DATE_MS - TEST_DATE_MS % 60_000)),
        _ => None,
    }
}

/// The classic length-indexed text patterns: a repeating digit cycle for
/// short values, 64-char numbered lines for the longer ones, truncated to
/// the requested length.
fn text_pattern(n: usize) -> String {
    let mut s = String::with_capacity(n.max(64));
    if n < 64 {
        for i in 0..n {
            s.push(char::from(b'0' + (i % 10) as u8));
        }
    } else if n <= 1024 {
        for i in 0..16 {
            s.push(char::from(b'0' + (i / 10) as u8));
            s.push(char::from(b'0' + (i % 10) as u8));
            s.push_str(" 456789012345678901234567890123456789012345678901234567890123\n");
        }
        s.truncate(n);
    } else {
        for i in 0..64 * 16 {
            s.push(char::from(b'0' + (i / 100) as u8));
            s.push(char::from(b'0' + (i / 10 % 10) as u8));
            s.push(char::from(b'0' + (i % 10) as u8));
            s.push_str(" 56789012345678901234567890123456789012345678901234567890123\n");
        }
        s.truncate(n);
    }
    s
}

/// List elements "1", "2", ... "n".
fn numbered_items(n: usize) -> Vec<Value> {
    (1..=n).map(|i| Value::String(i.to_string())).collect()
}

fn map_entries(variant: &str) -> Option<Vec<(Value, Value)>> {
    match variant {
        "0" => Some(vec![]),
        "1" => Some(vec![(Value::string("a"), Value::Int(0))]),
        "2" => Some(vec![
            (Value::Int(0), Value::string("a")),
            (Value::Int(1), Value::string("b")),
        ]),
        "3" => Some(vec![(
            Value::list(vec![Value::string("a")]),
            Value::Int(0),
        )]),
        _ => None,
    }
}

fn object_fixture(variant: &str) -> Option<Value> {
    fn test_object(v: i32) -> Value {
        Value::typed_map(
            "com.caucho.hessian.test.TestObject",
            vec![(Value::string("_value"), Value::Int(v))],
        )
    }

    match variant {
        "0" => Some(Value::typed_map("com.caucho.hessian.test.A0", vec![])),
        "16" => Some(Value::list(
            (0..=16)
                .map(|i| Value::typed_map(&format!("com.caucho.hessian.test.A{i}"), vec![]))
                .collect(),
        )),
        "1" => Some(test_object(0)),
        "2" => Some(Value::list(vec![test_object(0), test_object(1)])),
        // Same instance twice: the second element is a back-reference to
        // the first container (index 1; the list itself is index 0).
        "2a" => Some(Value::list(vec![test_object(0), Value::Ref(1)])),
        "2b" => Some(Value::list(vec![test_object(0), test_object(0)])),
        // Circular cons cell: _rest points back at the cell itself.
        "3" => Some(Value::typed_map(
            "com.caucho.hessian.test.TestCons",
            vec![
                (Value::string("_first"), Value::string("a")),
                (Value::string("_rest"), Value::Ref(0)),
            ],
        )),
        _ => None,
    }
}
