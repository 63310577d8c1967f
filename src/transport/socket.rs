//! Raw TCP transport: one connection, one dispatch, then close.
//!
//! Connections carry no framing and no handshake; the codec alone decides
//! where the request ends. The accept loop never blocks on request
//! processing, so concurrent clients do not serialize. One task per
//! connection, unbounded, with no backpressure. Fine for a test harness,
//! not a pattern to reuse in a production server.

use crate::context::CallScope;
use crate::dispatcher::Dispatcher;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

pub struct SocketTransport {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
}

impl SocketTransport {
    /// Bind the listener. A bind failure is fatal to the harness.
    pub async fn bind(addr: SocketAddr, dispatcher: Arc<Dispatcher>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(SocketTransport {
            listener,
            dispatcher,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever. Each connection gets its own task and
    /// exactly one dispatcher invocation; failures stay on that task. An
    /// accept failure terminates the transport and surfaces to the caller.
    pub async fn serve(self) -> std::io::Result<()> {
        info!(addr = %self.listener.local_addr()?, "socket transport listening");
        loop {
            let (stream, peer) = self.listener.accept().await?;
            debug!(%peer, "accepted connection");
            let dispatcher = Arc::clone(&self.dispatcher);
            tokio::spawn(handle_connection(stream, peer, dispatcher));
        }
    }
}

/// One connection session: establish the per-call context, dispatch once,
/// release the context, close. The release-then-close order holds on the
/// failure path too, and a close failure is logged, never propagated.
async fn handle_connection(stream: TcpStream, peer: SocketAddr, dispatcher: Arc<Dispatcher>) {
    let (mut reader, mut writer) = stream.into_split();
    let scope = CallScope::begin(Some(peer));
    if let Err(e) = dispatcher.dispatch(&mut reader, &mut writer, &scope).await {
        error!(%peer, error = %e, "connection failed");
    }
    drop(scope);
    if let Err(e) = writer.shutdown().await {
        debug!(%peer, error = %e, "close failed");
    }
}
