//! The request dispatcher: reads one call from a byte stream, invokes the
//! bound service, and writes the encoded reply.
//!
//! The dispatcher is stateless across calls; everything per-call lives in
//! the [`CallScope`] the transport establishes around the invocation. Both
//! transports funnel into [`Dispatcher::dispatch`], which is what makes
//! their replies byte-identical for the same request.

use crate::context::CallScope;
use crate::protocol::{self, ParseError};
use crate::services::Service;
use bytes::BytesMut;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

/// Read buffer size for incoming call frames
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Binds the wire codec to one service instance.
pub struct Dispatcher {
    service: Arc<dyn Service>,
}

/// Failure of a single dispatch. Scope-limited to one connection or one
/// HTTP request; never affects the listener.
#[derive(Debug)]
pub enum DispatchError {
    /// Peer closed the stream before a complete call arrived
    UnexpectedEof,
    /// The request bytes were not a valid call frame
    Parse(ParseError),
    /// Reading the request or writing the reply failed
    Io(std::io::Error),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::UnexpectedEof => {
                write!(f, "stream closed before a complete call was received")
            }
            DispatchError::Parse(e) => write!(f, "invalid call: {e}"),
            DispatchError::Io(e) => write!(f, "stream failure: {e}"),
        }
    }
}

impl std::error::Error for DispatchError {}

impl Dispatcher {
    pub fn new(service: Arc<dyn Service>) -> Self {
        Dispatcher { service }
    }

    /// Perform exactly one protocol invocation: read a call from `reader`,
    /// invoke the service, write the reply or fault to `writer`.
    ///
    /// The reader is consumed only as far as the end of the call frame; a
    /// service-level fault is a successful dispatch, not an error.
    pub async fn dispatch<R, W>(
        &self,
        reader: &mut R,
        writer: &mut W,
        scope: &CallScope,
    ) -> Result<(), DispatchError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buffer = BytesMut::with_capacity(READ_BUFFER_SIZE);
        let call = loop {
            match protocol::parse_call(&buffer) {
                Ok((call, _consumed)) => break call,
                Err(ParseError::Incomplete) => {
                    let n = reader.read_buf(&mut buffer).await.map_err(DispatchError::Io)?;
                    if n == 0 {
                        return Err(DispatchError::UnexpectedEof);
                    }
                }
                Err(e) => return Err(DispatchError::Parse(e)),
            }
        };

        trace!(
            service = self.service.name(),
            method = %call.method,
            args = call.args.len(),
            caller = ?scope.context().peer,
            "dispatching call"
        );

        let reply = match self.service.invoke(&call.method, &call.args) {
            Ok(value) => protocol::encode_reply(&value),
            Err(fault) => {
                debug!(method = %call.method, code = %fault.code, "call returned fault");
                protocol::encode_fault(&fault)
            }
        };

        writer.write_all(&reply).await.map_err(DispatchError::Io)?;
        writer.flush().await.map_err(DispatchError::Io)?;
        Ok(())
    }
}
