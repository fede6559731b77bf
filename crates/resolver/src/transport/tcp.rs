//! TCP transport with RFC 1035 §4.2.2 two-byte length framing.

use super::DnsTransport;
use async_trait::async_trait;
use scout_dns_domain::{Protocol, ResolveError};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn exchange_inner(&self, query: &[u8]) -> Result<Vec<u8>, ResolveError> {
        let mut stream = TcpStream::connect(self.server_addr).await.map_err(|e| {
            ResolveError::Transport(format!(
                "connection to TCP server {} failed: {}",
                self.server_addr, e
            ))
        })?;

        stream.set_nodelay(true).map_err(|e| {
            ResolveError::Transport(format!(
                "failed to set TCP_NODELAY on {}: {}",
                self.server_addr, e
            ))
        })?;

        send_with_length_prefix(&mut stream, query).await?;

        debug!(server = %self.server_addr, message_len = query.len(), "TCP query sent");

        let response = read_with_length_prefix(&mut stream).await?;

        debug!(server = %self.server_addr, response_len = response.len(), "TCP response received");

        Ok(response)
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn exchange(&self, query: &[u8], timeout: Duration) -> Result<Vec<u8>, ResolveError> {
        tokio::time::timeout(timeout, self.exchange_inner(query))
            .await
            .map_err(|_| ResolveError::QueryTimeout)?
    }

    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }
}

pub(crate) async fn send_with_length_prefix<S>(
    stream: &mut S,
    message: &[u8],
) -> Result<(), ResolveError>
where
    S: AsyncWriteExt + Unpin,
{
    let length = message.len() as u16;

    stream
        .write_all(&length.to_be_bytes())
        .await
        .map_err(|e| ResolveError::Transport(format!("failed to write length prefix: {}", e)))?;
    stream
        .write_all(message)
        .await
        .map_err(|e| ResolveError::Transport(format!("failed to write DNS message: {}", e)))?;
    stream
        .flush()
        .await
        .map_err(|e| ResolveError::Transport(format!("failed to flush stream: {}", e)))?;

    Ok(())
}

pub(crate) async fn read_with_length_prefix<S>(stream: &mut S) -> Result<Vec<u8>, ResolveError>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| ResolveError::Transport(format!("failed to read response length: {}", e)))?;

    let response_len = u16::from_be_bytes(len_buf) as usize;
    let mut response = vec![0u8; response_len];
    stream
        .read_exact(&mut response)
        .await
        .map_err(|e| ResolveError::Transport(format!("failed to read response body: {}", e)))?;

    Ok(response)
}
