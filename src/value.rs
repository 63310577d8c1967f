//! Value model shared by the wire codec and the test services.
//!
//! Hessian 1 has a small, closed set of value shapes; everything the test
//! contracts exchange fits in [`Value`]. Shared and cyclic structure is
//! expressed with explicit back-references ([`Value::Ref`]) rather than
//! shared ownership, which keeps equality checks structural and cheap.

/// One Hessian value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    /// Milliseconds since the Unix epoch.
    Date(i64),
    String(String),
    Xml(String),
    Bytes(Vec<u8>),
    /// Ordered list, optionally carrying a declared element type.
    List {
        type_name: Option<String>,
        items: Vec<Value>,
    },
    /// Map with arbitrary value keys; entry order is preserved. A typed map
    /// doubles as an object with the type name as its class.
    Map {
        type_name: Option<String>,
        entries: Vec<(Value, Value)>,
    },
    /// Back-reference to the nth list or map previously seen in the same
    /// message, counting in order of appearance.
    Ref(u32),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List {
            type_name: None,
            items,
        }
    }

    pub fn typed_list(type_name: &str, items: Vec<Value>) -> Self {
        Value::List {
            type_name: Some(type_name.to_string()),
            items,
        }
    }

    pub fn map(entries: Vec<(Value, Value)>) -> Self {
        Value::Map {
            type_name: None,
            entries,
        }
    }

    pub fn typed_map(type_name: &str, entries: Vec<(Value, Value)>) -> Self {
        Value::Map {
            type_name: Some(type_name.to_string()),
            entries,
        }
    }
}

/// A service-level failure, encoded on the wire as a fault reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    pub code: String,
    pub message: String,
    pub detail: Value,
}

impl Fault {
    pub fn new(code: &str, message: impl Into<String>, detail: Value) -> Self {
        Fault {
            code: code.to_string(),
            message: message.into(),
            detail,
        }
    }

    pub fn no_such_method(method: &str) -> Self {
        Fault::new(
            "NoSuchMethodException",
            format!("The service has no method named: {method}"),
            Value::Null,
        )
    }
}
