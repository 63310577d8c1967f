//! The two transports and the path mapping they share.
//!
//! Both transports host the same dispatcher; they differ only in framing.
//! The socket transport serves one call per TCP connection, the HTTP
//! transport one call per request, and for the same call bytes the replies
//! are byte-identical.

pub mod http;
pub mod socket;

pub use http::{HessianEndpoint, HttpTransport};
pub use socket::SocketTransport;

use crate::services::Service;
use std::sync::Arc;

/// A value registered under an HTTP path: either a ready-made endpoint or a
/// bare service that still needs wrapping. Which one it is gets resolved
/// once when the router is built, never per request.
pub enum Binding {
    Endpoint(HessianEndpoint),
    Service(Arc<dyn Service>),
}

/// URL path → service binding, built once at startup and read-only after.
#[derive(Default)]
pub struct PathMap {
    entries: Vec<(String, Binding)>,
}

impl PathMap {
    pub fn new() -> Self {
        PathMap::default()
    }

    /// Register a bare service; the HTTP transport wraps it in an endpoint.
    pub fn service(self, path: &str, service: Arc<dyn Service>) -> Self {
        self.bind(path, Binding::Service(service))
    }

    /// Register an already-wrapped endpoint as-is.
    pub fn endpoint(self, path: &str, endpoint: HessianEndpoint) -> Self {
        self.bind(path, Binding::Endpoint(endpoint))
    }

    fn bind(mut self, path: &str, binding: Binding) -> Self {
        assert!(
            !self.entries.iter().any(|(p, _)| p == path),
            "duplicate path mapping: {path}"
        );
        self.entries.push((path.to_string(), binding));
        self
    }

    pub(crate) fn into_entries(self) -> Vec<(String, Binding)> {
        self.entries
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::{call_socket, http_post, start_http, start_socket};
    use super::*;
    use crate::protocol::encode_call;
    use crate::services::{BasicTestService, ExtendedTestService};
    use crate::value::Value;

    #[tokio::test]
    async fn test_transports_produce_identical_bytes() {
        let socket_addr = start_socket(Arc::new(BasicTestService)).await;
        let http_addr = start_http(
            "/test",
            PathMap::new()
                .service("/test", Arc::new(BasicTestService))
                .service("/test2", Arc::new(ExtendedTestService)),
        )
        .await;

        for request in [
            encode_call("nullCall", &[]),
            encode_call("hello", &[]),
            encode_call("subtract", &[Value::Int(50), Value::Int(3)]),
            encode_call("fault", &[]),
        ] {
            let via_socket = call_socket(socket_addr, &request).await;
            let (status, via_http) = http_post(http_addr, "/test/test", &request).await;
            assert_eq!(status, 200);
            assert_eq!(via_socket, via_http, "transports disagree on {request:?}");
        }
    }

    #[test]
    #[should_panic(expected = "duplicate path mapping")]
    fn test_duplicate_paths_are_rejected() {
        let _ = PathMap::new()
            .service("/test", Arc::new(BasicTestService))
            .service("/test", Arc::new(ExtendedTestService));
    }
}
