//! hessian-harness: a dual-transport conformance test harness for the
//! Hessian RPC wire protocol.
//!
//! One reference service implementation is exposed over two transports:
//! - raw TCP on port 9191, one call per connection
//! - HTTP on port 8181 under the `/test` context path, with the baseline
//!   contract at `/test/test` and the extended contract at `/test/test2`
//!
//! Both transports funnel into the same dispatcher, so a client
//! implementation can be validated against either and expect identical
//! reply bytes. The harness runs until the process is killed; there is no
//! graceful shutdown, no timeouts, and no connection cap.

mod config;
mod context;
mod dispatcher;
mod protocol;
mod services;
mod transport;
mod value;

use config::{HarnessConfig, BASIC_PATH, CONTEXT_PATH, EXTENDED_PATH};
use dispatcher::Dispatcher;
use services::{BasicTestService, ExtendedTestService, Service};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use transport::{HttpTransport, PathMap, SocketTransport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = HarnessConfig::default();
    let basic: Arc<dyn Service> = Arc::new(BasicTestService);
    let extended: Arc<dyn Service> = Arc::new(ExtendedTestService);

    let mapping = PathMap::new()
        .service(BASIC_PATH, Arc::clone(&basic))
        .service(EXTENDED_PATH, extended);

    let socket =
        SocketTransport::bind(config.socket_addr, Arc::new(Dispatcher::new(basic))).await?;
    let http = HttpTransport::bind(config.http_addr, CONTEXT_PATH, mapping).await?;

    info!(
        socket = %config.socket_addr,
        http = %config.http_addr,
        context = CONTEXT_PATH,
        "harness ready"
    );

    // Neither transport returns under normal operation; a listener failure
    // on either side takes the whole harness down.
    tokio::try_join!(socket.serve(), http.serve())?;
    Ok(())
}
