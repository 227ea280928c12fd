//! Line reader over a TCP connection.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::core::{LINE_BUFFER_CAPACITY, RelayError, RelayResult};

/// One newline-framed record, without its terminator.
///
/// Kept as bytes so forwarding is exact even when the source emits
/// something that is not valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine(Vec<u8>);

impl RawLine {
    /// Build a line from a frame, stripping a trailing `\n` or `\r\n`.
    pub fn from_frame(mut frame: Vec<u8>) -> Self {
        if frame.last() == Some(&b'\n') {
            frame.pop();
            if frame.last() == Some(&b'\r') {
                frame.pop();
            }
        }
        Self(frame)
    }

    /// Line bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Line as text, replacing invalid UTF-8.
    pub fn to_text_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the line is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Reads lines from a single TCP connection.
///
/// The sequence is finite and cannot be restarted: once the peer closes,
/// a read fails, or [`close`](Self::close) is called, the connection is
/// released and every further call to [`next_line`](Self::next_line)
/// returns `Ok(None)`.
#[derive(Debug)]
pub struct LineReader {
    /// The connection, `None` once released.
    stream: Option<BufReader<TcpStream>>,
    /// Address of the source.
    peer_addr: SocketAddr,
    /// Bytes of the line currently being read.
    buffer: Vec<u8>,
    /// Lines yielded so far.
    lines_read: u64,
}

impl LineReader {
    /// Connect to `host:port`, giving up after `timeout`.
    ///
    /// The timeout covers name resolution and the TCP handshake.
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> RelayResult<Self> {
        let addr = format!("{}:{}", host, port);

        info!(address = %addr, "Connecting to traffic source");

        let stream = match tokio::time::timeout(timeout, TcpStream::connect(addr.as_str())).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(RelayError::ConnectFailure { addr, source }),
            Err(_) => {
                return Err(RelayError::ConnectFailure {
                    addr,
                    source: io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("no connection within {:?}", timeout),
                    ),
                });
            }
        };

        Self::established(stream, addr)
    }

    /// Wrap an already connected stream.
    ///
    /// Fails with [`RelayError::ConnectFailure`] if the connection is no
    /// longer established, since no line has been read from it yet.
    pub fn from_stream(stream: TcpStream) -> RelayResult<Self> {
        Self::established(stream, String::from("<unknown peer>"))
    }

    fn established(stream: TcpStream, addr: String) -> RelayResult<Self> {
        // A reset can land between the handshake and this call
        let peer_addr = stream
            .peer_addr()
            .map_err(|source| RelayError::ConnectFailure { addr, source })?;

        info!(peer = %peer_addr, "Connected to traffic source");

        Ok(Self {
            stream: Some(BufReader::new(stream)),
            peer_addr,
            buffer: Vec::with_capacity(LINE_BUFFER_CAPACITY),
            lines_read: 0,
        })
    }

    /// Read the next line.
    ///
    /// Returns `Ok(None)` once the peer has closed the connection. A final
    /// record without a terminator is still returned as a line.
    ///
    /// # Cancel safety
    ///
    /// Partially read bytes stay in the reader's buffer, so this future can
    /// be dropped in a `select!` and called again without losing data.
    pub async fn next_line(&mut self) -> RelayResult<Option<RawLine>> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };

        if let Err(e) = stream.read_until(b'\n', &mut self.buffer).await {
            self.close();
            return Err(RelayError::ReadFailure(e));
        }

        if self.buffer.is_empty() {
            debug!(peer = %self.peer_addr, lines = self.lines_read, "Source closed connection");
            self.close();
            return Ok(None);
        }

        let frame = std::mem::replace(&mut self.buffer, Vec::with_capacity(LINE_BUFFER_CAPACITY));
        self.lines_read += 1;
        Ok(Some(RawLine::from_frame(frame)))
    }

    /// Address of the source.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Lines yielded so far.
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Check if the connection has been released.
    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    /// Release the connection. Calling this more than once is a no-op.
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            debug!(peer = %self.peer_addr, "Source connection released");
        }
        self.buffer.clear();
    }
}
