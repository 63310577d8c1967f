//! HTTP transport: an axum server adapting POSTed request bodies into
//! dispatcher invocations.
//!
//! Each request is isomorphic to one socket connection session: the body is
//! the dispatcher's input, the response body its output, exactly one
//! dispatch per request. Keep-alive, framing, and per-request concurrency
//! all belong to the HTTP server, not to this adapter.

use crate::context::CallScope;
use crate::dispatcher::Dispatcher;
use crate::services::Service;
use crate::transport::{Binding, PathMap};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

const HESSIAN_CONTENT_TYPE: &str = "application/x-hessian";

/// The transport-native service wrapper: a dispatcher exposed as an HTTP
/// handler. Bare services in the path mapping are wrapped in one of these
/// when the router is built.
#[derive(Clone)]
pub struct HessianEndpoint {
    dispatcher: Arc<Dispatcher>,
}

impl HessianEndpoint {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        HessianEndpoint { dispatcher }
    }

    pub fn for_service(service: Arc<dyn Service>) -> Self {
        HessianEndpoint::new(Arc::new(Dispatcher::new(service)))
    }

    async fn handle(&self, body: Bytes) -> Response {
        let scope = CallScope::begin(None);
        let mut input: &[u8] = &body;
        let mut output = Vec::new();
        match self
            .dispatcher
            .dispatch(&mut input, &mut output, &scope)
            .await
        {
            Ok(()) => (
                [(header::CONTENT_TYPE, HESSIAN_CONTENT_TYPE)],
                output,
            )
                .into_response(),
            Err(e) => {
                debug!(error = %e, "request failed");
                (StatusCode::BAD_REQUEST, e.to_string()).into_response()
            }
        }
    }
}

pub struct HttpTransport {
    listener: TcpListener,
    router: Router,
}

impl HttpTransport {
    /// Bind the server and build one route per mapping entry under
    /// `context_path`. Entries that are not already endpoints get wrapped
    /// here, once; a bind failure is fatal to the harness.
    pub async fn bind(
        addr: SocketAddr,
        context_path: &str,
        mapping: PathMap,
    ) -> std::io::Result<Self> {
        let mut routes = Router::new();
        for (path, binding) in mapping.into_entries() {
            let endpoint = match binding {
                Binding::Endpoint(endpoint) => endpoint,
                Binding::Service(service) => HessianEndpoint::for_service(service),
            };
            routes = routes.route(&path, post(serve_endpoint).with_state(endpoint));
        }
        let router = Router::new().nest(context_path, routes);
        let listener = TcpListener::bind(addr).await?;
        Ok(HttpTransport { listener, router })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until the process terminates.
    pub async fn serve(self) -> std::io::Result<()> {
        info!(addr = %self.listener.local_addr()?, "http transport listening");
        axum::serve(self.listener, self.router).await
    }
}

async fn serve_endpoint(State(endpoint): State<HessianEndpoint>, body: Bytes) -> Response {
    endpoint.handle(body).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{encode_call, parse_reply, Reply};
    use crate::services::{BasicTestService, ExtendedTestService};
    use crate::transport::testutil::{http_post, start_http};
    use crate::value::Value;

    async fn reference_server() -> SocketAddr {
        start_http(
            "/test",
            PathMap::new()
                .service("/test", Arc::new(BasicTestService))
                .service("/test2", Arc::new(ExtendedTestService)),
        )
        .await
    }

    #[tokio::test]
    async fn test_reply_int_over_http() {
        let addr = reference_server().await;
        let (status, body) =
            http_post(addr, "/test/test2", &encode_call("replyInt_47", &[])).await;
        assert_eq!(status, 200);
        assert_eq!(parse_reply(&body).unwrap().0, Reply::Value(Value::Int(47)));
    }

    #[tokio::test]
    async fn test_arg_int_echo_over_http() {
        let addr = reference_server().await;
        let request = encode_call("argInt_47", &[Value::Int(47)]);
        let (status, body) = http_post(addr, "/test/test2", &request).await;
        assert_eq!(status, 200);
        assert_eq!(
            parse_reply(&body).unwrap().0,
            Reply::Value(Value::Bool(true))
        );
    }

    #[tokio::test]
    async fn test_paths_serve_distinct_contracts() {
        let addr = reference_server().await;

        // hello exists on the baseline contract only.
        let request = encode_call("hello", &[]);
        let (_, body) = http_post(addr, "/test/test", &request).await;
        assert_eq!(
            parse_reply(&body).unwrap().0,
            Reply::Value(Value::string("Hello, World"))
        );
        let (_, body) = http_post(addr, "/test/test2", &request).await;
        match parse_reply(&body).unwrap().0 {
            Reply::Fault(fault) => assert_eq!(fault.code, "NoSuchMethodException"),
            other => panic!("Expected fault, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_simultaneous_requests_to_both_paths() {
        let addr = reference_server().await;
        let basic = tokio::spawn(async move {
            http_post(addr, "/test/test", &encode_call("hello", &[])).await
        });
        let extended = tokio::spawn(async move {
            http_post(addr, "/test/test2", &encode_call("replyTrue", &[])).await
        });

        let (_, body) = basic.await.unwrap();
        assert_eq!(
            parse_reply(&body).unwrap().0,
            Reply::Value(Value::string("Hello, World"))
        );
        let (_, body) = extended.await.unwrap();
        assert_eq!(
            parse_reply(&body).unwrap().0,
            Reply::Value(Value::Bool(true))
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let addr = reference_server().await;
        let (status, _) = http_post(addr, "/test/test", b"\xff\xff").await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn test_prewrapped_endpoint_is_registered_as_is() {
        let endpoint = HessianEndpoint::for_service(Arc::new(ExtendedTestService));
        let addr = start_http("/test", PathMap::new().endpoint("/test2", endpoint)).await;
        let (status, body) =
            http_post(addr, "/test/test2", &encode_call("replyFalse", &[])).await;
        assert_eq!(status, 200);
        assert_eq!(
            parse_reply(&body).unwrap().0,
            Reply::Value(Value::Bool(false))
        );
    }
}
