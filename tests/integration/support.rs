//! Local in-process DNS servers for socket-level tests. Each server binds
//! an ephemeral localhost port and answers with a caller-supplied closure.

// Not every test target uses every helper.
#![allow(dead_code)]

use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::{rdata, RData, Record};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};

pub type Responder = dyn Fn(&Message) -> Option<Vec<u8>> + Send + Sync;

/// Builds a response to `query`: `answer_count` A records for the queried
/// name, with the given rcode and TC bit.
pub fn answer(
    query: &Message,
    rcode: ResponseCode,
    answer_count: usize,
    truncated: bool,
) -> Option<Vec<u8>> {
    let mut message = Message::new(query.id(), MessageType::Response, OpCode::Query);
    message.set_response_code(rcode);
    message.set_truncated(truncated);

    let name = query.queries()[0].name().clone();
    for i in 0..answer_count {
        message.add_answer(Record::from_rdata(
            name.clone(),
            60,
            RData::A(rdata::A(Ipv4Addr::new(198, 51, 100, i as u8))),
        ));
    }

    Some(message.to_vec().expect("test response serializes"))
}

/// The queried name in presentation form without the trailing dot.
pub fn queried_name(query: &Message) -> String {
    let mut name = query.queries()[0].name().to_utf8();
    if name.ends_with('.') {
        name.pop();
    }
    name
}

/// Spawns a UDP server on an ephemeral localhost port. Returning `None`
/// from the responder drops the query, which the client sees as a timeout.
pub async fn spawn_udp<F>(respond: F) -> SocketAddr
where
    F: Fn(&Message) -> Option<Vec<u8>> + Send + Sync + 'static,
{
    let socket = UdpSocket::bind("127.0.0.1:0").await.expect("bind UDP");
    let addr = socket.local_addr().expect("local addr");
    spawn_udp_on(socket, Arc::new(respond));
    addr
}

fn spawn_udp_on(socket: UdpSocket, respond: Arc<Responder>) {
    tokio::spawn(async move {
        let mut buf = vec![0u8; 4096];
        loop {
            let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                return;
            };
            let Ok(query) = Message::from_vec(&buf[..len]) else {
                continue;
            };
            if let Some(response) = respond(&query) {
                let _ = socket.send_to(&response, peer).await;
            }
        }
    });
}

/// Spawns a TCP server with RFC 1035 length framing on the given port
/// (ephemeral when 0). Used together with [`spawn_udp_sibling`] to serve
/// UDP and TCP on the same port number for truncation-escalation tests.
pub async fn spawn_tcp<F>(port: u16, respond: F) -> SocketAddr
where
    F: Fn(&Message) -> Option<Vec<u8>> + Send + Sync + 'static,
{
    let listener = TcpListener::bind(("127.0.0.1", port)).await.expect("bind TCP");
    let addr = listener.local_addr().expect("local addr");
    let respond: Arc<Responder> = Arc::new(respond);

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let respond = Arc::clone(&respond);
            tokio::spawn(async move {
                let mut len_buf = [0u8; 2];
                if stream.read_exact(&mut len_buf).await.is_err() {
                    return;
                }
                let mut query_buf = vec![0u8; u16::from_be_bytes(len_buf) as usize];
                if stream.read_exact(&mut query_buf).await.is_err() {
                    return;
                }
                let Ok(query) = Message::from_vec(&query_buf) else {
                    return;
                };
                if let Some(response) = respond(&query) {
                    let len = (response.len() as u16).to_be_bytes();
                    let _ = stream.write_all(&len).await;
                    let _ = stream.write_all(&response).await;
                }
            });
        }
    });

    addr
}

/// Binds a UDP server on the same port as an existing TCP listener.
pub async fn spawn_udp_sibling<F>(addr: SocketAddr, respond: F)
where
    F: Fn(&Message) -> Option<Vec<u8>> + Send + Sync + 'static,
{
    let socket = UdpSocket::bind(addr).await.expect("bind UDP sibling");
    spawn_udp_on(socket, Arc::new(respond));
}
