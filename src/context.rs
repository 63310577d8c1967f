//! Per-call context scoped around one dispatcher invocation.

use std::net::SocketAddr;
use tracing::trace;

/// Transient state established immediately before a dispatch and torn down
/// immediately after, success or failure. Never shared or reused across
/// calls.
#[derive(Debug, Default)]
pub struct CallContext {
    /// Peer address for socket connections. None for HTTP requests, where
    /// connection identity belongs to the HTTP server.
    pub peer: Option<SocketAddr>,
}

/// Owns a [`CallContext`] for the duration of one invocation. Dropping the
/// guard releases the context, which makes teardown unconditional on error
/// paths too.
pub struct CallScope {
    context: CallContext,
}

impl CallScope {
    pub fn begin(peer: Option<SocketAddr>) -> Self {
        trace!(?peer, "call context established");
        CallScope {
            context: CallContext { peer },
        }
    }

    pub fn context(&self) -> &CallContext {
        &self.context
    }
}

impl Drop for CallScope {
    fn drop(&mut self) {
        trace!(peer = ?self.context.peer, "call context released");
    }
}
