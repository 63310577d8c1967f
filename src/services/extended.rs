//! The extended test contract: `reply*` methods that return canonical
//! fixtures, and `arg*` methods that check a received argument against the
//! same fixture and answer `true` or a diagnostic string.

use super::fixtures::fixture;
use super::Service;
use crate::value::{Fault, Value};

pub struct ExtendedTestService;

impl Service for ExtendedTestService {
    fn name(&self) -> &'static str {
        "extended"
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, Fault> {
        if let Some(family) = method.strip_prefix("reply") {
            if let Some(value) = fixture(family) {
                return Ok(value);
            }
        } else if let Some(family) = method.strip_prefix("arg") {
            if let Some(expected) = fixture(family) {
                let received = args.first().cloned().unwrap_or(Value::Null);
                return Ok(if received == expected {
                    Value::Bool(true)
                } else {
                    Value::String(format!(
                        "{method}: expected {expected:?}, received {received:?}"
                    ))
                });
            }
        }
        Err(Fault::no_such_method(method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_primitives() {
        let svc = ExtendedTestService;
        assert_eq!(svc.invoke("replyNull", &[]), Ok(Value::Null));
        assert_eq!(svc.invoke("replyTrue", &[]), Ok(Value::Bool(true)));
        assert_eq!(svc.invoke("replyFalse", &[]), Ok(Value::Bool(false)));
        assert_eq!(svc.invoke("replyInt_47", &[]), Ok(Value::Int(47)));
        assert_eq!(svc.invoke("replyInt_m0x800", &[]), Ok(Value::Int(-0x800)));
        assert_eq!(
            svc.invoke("replyLong_0x80000000", &[]),
            Ok(Value::Long(0x8000_0000))
        );
        assert_eq!(
            svc.invoke("replyDouble_3_14159", &[]),
            Ok(Value::Double(3.14159))
        );
        assert_eq!(svc.invoke("replyString_null", &[]), Ok(Value::Null));
    }

    #[test]
    fn test_reply_compounds() {
        let svc = ExtendedTestService;
        assert_eq!(
            svc.invoke("replyTypedFixedList_1", &[]),
            Ok(Value::typed_list("[string", vec![Value::string("1")]))
        );
        assert_eq!(
            svc.invoke("replyTypedMap_1", &[]),
            Ok(Value::typed_map(
                "java.util.Hashtable",
                vec![(Value::string("a"), Value::Int(0))]
            ))
        );
    }

    #[test]
    fn test_arg_echo_check() {
        let svc = ExtendedTestService;
        assert_eq!(
            svc.invoke("argInt_47", &[Value::Int(47)]),
            Ok(Value::Bool(true))
        );
        // A mismatch reports a diagnostic string rather than a fault.
        match svc.invoke("argInt_47", &[Value::Int(42)]).unwrap() {
            Value::String(msg) => assert!(msg.contains("argInt_47")),
            other => panic!("Expected diagnostic string, got {other:?}"),
        }
        // Missing argument counts as null.
        assert_eq!(svc.invoke("argNull", &[]), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_arg_shared_structure() {
        let svc = ExtendedTestService;
        let arg = Value::list(vec![
            Value::typed_map(
                "com.caucho.hessian.test.TestObject",
                vec![(Value::string("_value"), Value::Int(0))],
            ),
            Value::Ref(1),
        ]);
        assert_eq!(svc.invoke("argObject_2a", &[arg]), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_unknown_method() {
        let fault = ExtendedTestService.invoke("replyWidget_1", &[]).unwrap_err();
        assert_eq!(fault.code, "NoSuchMethodException");
        let fault = ExtendedTestService.invoke("hello", &[]).unwrap_err();
        assert_eq!(fault.code, "NoSuchMethodException");
    }
}
