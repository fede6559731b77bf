//! Shared test doubles: a scripted transport that answers from a closure,
//! plus canned wire-response builders.

use crate::server::Server;
use crate::transport::DnsTransport;
use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::{rdata, RData, Record};
use scout_dns_domain::{Endpoint, Protocol, ResolveError};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

type Responder = dyn Fn(&[u8]) -> Result<Vec<u8>, ResolveError> + Send + Sync;

pub(crate) struct ScriptedTransport {
    protocol: Protocol,
    calls: AtomicUsize,
    respond: Box<Responder>,
}

impl ScriptedTransport {
    pub(crate) fn new<F>(protocol: Protocol, respond: F) -> Arc<Self>
    where
        F: Fn(&[u8]) -> Result<Vec<u8>, ResolveError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            protocol,
            calls: AtomicUsize::new(0),
            respond: Box::new(respond),
        })
    }

    /// Number of exchanges performed so far.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsTransport for ScriptedTransport {
    async fn exchange(&self, query: &[u8], _timeout: Duration) -> Result<Vec<u8>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(query)
    }

    fn protocol(&self) -> Protocol {
        self.protocol
    }
}

/// Builds a response to `query` with `answer_count` A records for the
/// queried name, so presence predicates see "set" iff `answer_count > 0`.
pub(crate) fn reply(
    query: &[u8],
    rcode: ResponseCode,
    answer_count: usize,
    truncated: bool,
) -> Result<Vec<u8>, ResolveError> {
    let query = Message::from_vec(query)
        .map_err(|e| ResolveError::Proto(format!("bad query in test: {}", e)))?;

    let mut message = Message::new(query.id(), MessageType::Response, OpCode::Query);
    message.set_response_code(rcode);
    message.set_truncated(truncated);

    let name = query.queries()[0].name().clone();
    for i in 0..answer_count {
        message.add_answer(Record::from_rdata(
            name.clone(),
            300,
            RData::A(rdata::A(Ipv4Addr::new(192, 0, 2, i as u8))),
        ));
    }

    message
        .to_vec()
        .map_err(|e| ResolveError::Proto(format!("failed to build test response: {}", e)))
}

pub(crate) fn scripted_server(protocol: Protocol, transport: Arc<ScriptedTransport>) -> Server {
    let endpoint = Endpoint::new(protocol, IpAddr::V4(Ipv4Addr::LOCALHOST), 53);
    Server::with_transport(endpoint, Duration::from_millis(200), transport)
}
