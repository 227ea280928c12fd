//! Datagram sender to a fixed destination.

use std::io;
use std::net::SocketAddr;

use tokio::net::{UdpSocket, lookup_host};
use tracing::debug;

use crate::core::{RelayError, RelayResult};

/// Sends datagrams to one destination from an ephemeral local endpoint.
///
/// Fire-and-forget: no acknowledgment, no retry. Datagrams leave in the
/// order [`send`](Self::send) is called.
#[derive(Debug)]
pub struct DatagramSender {
    /// The local endpoint, `None` once released.
    socket: Option<UdpSocket>,
    /// Resolved destination.
    destination: SocketAddr,
}

impl DatagramSender {
    /// Resolve `host:port` and bind a local endpoint of the same family.
    pub async fn bind(host: &str, port: u16) -> RelayResult<Self> {
        let addr = format!("{}:{}", host, port);

        let destination = lookup_host(addr.as_str())
            .await
            .and_then(|mut addrs| {
                addrs.next().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses")
                })
            })
            .map_err(|source| RelayError::DestinationSetup {
                addr: addr.clone(),
                source,
            })?;

        Self::bind_to(destination).await
    }

    /// Bind a local endpoint for an already resolved destination.
    pub async fn bind_to(destination: SocketAddr) -> RelayResult<Self> {
        let local: SocketAddr = if destination.is_ipv4() {
            (std::net::Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local)
            .await
            .map_err(|source| RelayError::DestinationSetup {
                addr: destination.to_string(),
                source,
            })?;

        debug!(
            local = ?socket.local_addr().ok(),
            destination = %destination,
            "Datagram endpoint bound"
        );

        Ok(Self {
            socket: Some(socket),
            destination,
        })
    }

    /// Send one datagram. Returns the number of bytes sent.
    pub async fn send(&self, payload: &[u8]) -> RelayResult<usize> {
        let socket = self.socket.as_ref().ok_or_else(|| RelayError::SendFailure {
            addr: self.destination.to_string(),
            source: io::Error::new(io::ErrorKind::NotConnected, "datagram endpoint released"),
        })?;

        socket
            .send_to(payload, self.destination)
            .await
            .map_err(|source| RelayError::SendFailure {
                addr: self.destination.to_string(),
                source,
            })
    }

    /// Destination of every datagram.
    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    /// Local endpoint address, if still bound.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    /// Check if the endpoint has been released.
    pub fn is_closed(&self) -> bool {
        self.socket.is_none()
    }

    /// Release the endpoint. Calling this more than once is a no-op.
    pub fn close(&mut self) {
        if self.socket.take().is_some() {
            debug!(destination = %self.destination, "Datagram endpoint released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_to_destination() {
        let consumer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = consumer.local_addr().unwrap().port();

        let sender = DatagramSender::bind("127.0.0.1", port).await.unwrap();
        assert_eq!(sender.destination(), consumer.local_addr().unwrap());
        assert!(sender.local_addr().unwrap().port() != 0);

        let sent = sender.send(b"$PFLAA,2,1,1,100,5*3F").await.unwrap();
        assert_eq!(sent, 21);

        let mut buf = [0u8; 128];
        let (len, from) = consumer.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"$PFLAA,2,1,1,100,5*3F");
        assert_eq!(from.port(), sender.local_addr().unwrap().port());
    }

    #[tokio::test]
    async fn test_sends_preserve_order() {
        let consumer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let sender = DatagramSender::bind_to(consumer.local_addr().unwrap())
            .await
            .unwrap();

        for payload in [&b"one"[..], b"two", b"three"] {
            sender.send(payload).await.unwrap();
        }

        let mut buf = [0u8; 16];
        for expected in [&b"one"[..], b"two", b"three"] {
            let (len, _) = consumer.recv_from(&mut buf).await.unwrap();
            assert_eq!(&buf[..len], expected);
        }
    }

    #[tokio::test]
    async fn test_send_after_close_fails() {
        let mut sender = DatagramSender::bind("127.0.0.1", 10112).await.unwrap();
        sender.close();
        sender.close();
        assert!(sender.is_closed());
        assert!(sender.local_addr().is_none());

        let err = sender.send(b"late").await.unwrap_err();
        assert!(matches!(err, RelayError::SendFailure { .. }));
        assert!(!err.is_fatal());
    }
}
