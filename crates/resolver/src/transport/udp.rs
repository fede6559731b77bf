//! UDP transport (RFC 1035 §4.2.1).
//!
//! Messages are sent as-is, no framing. If the response has the TC bit set,
//! the caller is expected to retry over TCP.

use super::DnsTransport;
use async_trait::async_trait;
use scout_dns_domain::{Protocol, ResolveError};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

/// Maximum UDP response size with EDNS(0).
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn exchange_inner(&self, query: &[u8]) -> Result<Vec<u8>, ResolveError> {
        // Ephemeral port, family matched to the server address.
        let bind_addr: SocketAddr = if self.server_addr.is_ipv4() {
            (std::net::Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr).await.map_err(|e| {
            ResolveError::Transport(format!("failed to bind UDP socket: {}", e))
        })?;

        // Connected socket: the kernel drops datagrams from other sources.
        socket.connect(self.server_addr).await.map_err(|e| {
            ResolveError::Transport(format!(
                "failed to connect UDP socket to {}: {}",
                self.server_addr, e
            ))
        })?;

        socket.send(query).await.map_err(|e| {
            ResolveError::Transport(format!(
                "failed to send UDP query to {}: {}",
                self.server_addr, e
            ))
        })?;

        debug!(server = %self.server_addr, bytes_sent = query.len(), "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let received = socket.recv(&mut recv_buf).await.map_err(|e| {
            ResolveError::Transport(format!(
                "failed to receive UDP response from {}: {}",
                self.server_addr, e
            ))
        })?;

        recv_buf.truncate(received);

        debug!(server = %self.server_addr, bytes_received = received, "UDP response received");

        Ok(recv_buf)
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn exchange(&self, query: &[u8], timeout: Duration) -> Result<Vec<u8>, ResolveError> {
        tokio::time::timeout(timeout, self.exchange_inner(query))
            .await
            .map_err(|_| ResolveError::QueryTimeout)?
    }

    fn protocol(&self) -> Protocol {
        Protocol::Udp
    }
}
