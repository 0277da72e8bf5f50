//! Query/response exchange with the upstream server.
//!
//! Queries go out over UDP first. A truncated response or a UDP timeout
//! escalates the same query to TCP with the standard two-byte length
//! framing. The trait seam lets tests script responses without sockets.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use hickory_proto::op::Message;
use hickory_proto::serialize::binary::{BinDecodable, BinEncodable};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;
use tracing::debug;

use crate::error::ExchangeError;

/// Timeout for the UDP attempt.
pub const UDP_TIMEOUT: Duration = Duration::from_secs(2);

/// Overall budget for the TCP fallback (connect, send, receive).
pub const TCP_TIMEOUT: Duration = Duration::from_secs(5);

/// Receive buffer size, matching the EDNS payload advertised in queries.
pub const MAX_UDP_PAYLOAD: u16 = 4096;

/// A single query/response exchange with a DNS server.
pub trait Exchange: Send + Sync + Clone + 'static {
    /// Send the query and return the server's response.
    fn send(
        &self,
        query: &Message,
        server: SocketAddr,
    ) -> impl Future<Output = Result<Message, ExchangeError>> + Send;
}

/// Production transport: UDP with TCP fallback.
#[derive(Clone)]
pub struct UdpTcpExchange {
    udp_timeout: Duration,
    tcp_timeout: Duration,
}

impl UdpTcpExchange {
    /// Create a transport with the standard timeouts.
    pub const fn new() -> Self {
        Self {
            udp_timeout: UDP_TIMEOUT,
            tcp_timeout: TCP_TIMEOUT,
        }
    }

    /// Create a transport with custom timeouts. Integration tests shrink
    /// them to keep failure paths fast.
    pub const fn with_timeouts(udp_timeout: Duration, tcp_timeout: Duration) -> Self {
        Self {
            udp_timeout,
            tcp_timeout,
        }
    }

    async fn udp_exchange(wire: &[u8], server: SocketAddr) -> std::io::Result<Vec<u8>> {
        let bind_addr = if server.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(server).await?;
        socket.send(wire).await?;

        let mut buf = vec![0u8; MAX_UDP_PAYLOAD as usize];
        let len = socket.recv(&mut buf).await?;
        buf.truncate(len);
        Ok(buf)
    }

    async fn tcp_exchange(wire: &[u8], server: SocketAddr) -> std::io::Result<Vec<u8>> {
        let mut stream = TcpStream::connect(server).await?;

        let len = wire.len() as u16;
        stream.write_all(&len.to_be_bytes()).await?;
        stream.write_all(wire).await?;

        let mut len_buf = [0u8; 2];
        stream.read_exact(&mut len_buf).await?;
        let response_len = usize::from(u16::from_be_bytes(len_buf));

        let mut body = vec![0u8; response_len];
        stream.read_exact(&mut body).await?;
        Ok(body)
    }

    async fn tcp_fallback(
        &self,
        expected_id: u16,
        wire: &[u8],
        server: SocketAddr,
    ) -> Result<Message, ExchangeError> {
        let bytes = timeout(self.tcp_timeout, Self::tcp_exchange(wire, server))
            .await
            .map_err(|_| ExchangeError::Timeout { server })?
            .map_err(|source| ExchangeError::Tcp { server, source })?;

        verify_id(expected_id, Message::from_bytes(&bytes)?)
    }
}

impl Default for UdpTcpExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl Exchange for UdpTcpExchange {
    async fn send(&self, query: &Message, server: SocketAddr) -> Result<Message, ExchangeError> {
        let wire = query.to_bytes()?;

        match timeout(self.udp_timeout, Self::udp_exchange(&wire, server)).await {
            Ok(Ok(bytes)) => {
                let response = verify_id(query.id(), Message::from_bytes(&bytes)?)?;
                if response.truncated() {
                    debug!(%server, "response truncated, retrying over TCP");
                    self.tcp_fallback(query.id(), &wire, server).await
                } else {
                    Ok(response)
                }
            }
            // A socket-level UDP failure means the upstream is unreachable,
            // not that this particular name has no answer.
            Ok(Err(source)) => Err(ExchangeError::Udp { server, source }),
            Err(_) => {
                debug!(%server, "UDP attempt timed out, retrying over TCP");
                self.tcp_fallback(query.id(), &wire, server).await
            }
        }
    }
}

fn verify_id(expected: u16, response: Message) -> Result<Message, ExchangeError> {
    let found = response.id();
    if found == expected {
        Ok(response)
    } else {
        Err(ExchangeError::IdMismatch { expected, found })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_id(id: u16) -> Message {
        let mut message = Message::new();
        message.set_id(id);
        message
    }

    #[test]
    fn should_accept_response_with_matching_id() {
        let response = verify_id(42, response_with_id(42)).unwrap();
        assert_eq!(response.id(), 42);
    }

    #[test]
    fn should_reject_response_with_mismatched_id() {
        let err = verify_id(42, response_with_id(43)).unwrap_err();
        match err {
            ExchangeError::IdMismatch { expected, found } => {
                assert_eq!(expected, 42);
                assert_eq!(found, 43);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
