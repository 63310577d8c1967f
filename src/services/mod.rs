//! Reference service implementations hosted by the harness.
//!
//! Two contract variants exist, matching the classic Hessian test services:
//! - `basic`: the baseline contract (`nullCall`, `hello`, `subtract`,
//!   `echo`, `fault`), bound to the raw socket transport and `/test`.
//! - `extended`: the `reply*`/`arg*` round-trip families over primitives,
//!   collections, and nested structures, bound to `/test2`.
//!
//! Both are stateless, so one instance can serve any number of transports
//! and concurrent calls without synchronization.

pub mod basic;
pub mod extended;
mod fixtures;

pub use basic::BasicTestService;
pub use extended::ExtendedTestService;

use crate::value::{Fault, Value};

/// One contract variant under test. Implementations are immutable for the
/// process lifetime and shared via `Arc`.
pub trait Service: Send + Sync + 'static {
    /// Contract name, for logs.
    fn name(&self) -> &'static str;

    /// Invoke one method with already-decoded arguments.
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, Fault>;
}
