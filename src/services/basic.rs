//! The baseline test contract: a handful of calls exercising the full
//! request/reply/fault surface of the protocol.

use super::Service;
use crate::value::{Fault, Value};

pub struct BasicTestService;

impl Service for BasicTestService {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, Fault> {
        match method {
            "nullCall" => Ok(Value::Null),
            "hello" => Ok(Value::string("Hello, World")),
            "subtract" => match args {
                // Wraps on overflow, same as Java int arithmetic.
                [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a.wrapping_sub(*b))),
                _ => Err(Fault::new(
                    "ServiceException",
                    "subtract expects two int arguments",
                    Value::Null,
                )),
            },
            "echo" => Ok(args.first().cloned().unwrap_or(Value::Null)),
            "fault" => Err(sample_fault()),
            _ => Err(Fault::no_such_method(method)),
        }
    }
}

/// The contract's deliberate failure: a NullPointerException whose cause
/// points back at itself, exercising fault details with cyclic structure.
fn sample_fault() -> Fault {
    Fault::new(
        "ServiceException",
        "sample exception",
        Value::typed_map(
            "java.lang.NullPointerException",
            vec![
                (
                    Value::string("detailMessage"),
                    Value::string("sample exception"),
                ),
                (Value::string("cause"), Value::Ref(0)),
            ],
        ),
    )
}
