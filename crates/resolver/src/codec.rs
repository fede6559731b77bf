//! Wire codec adapter over `hickory-proto`.
//!
//! The core never touches DNS wire encoding itself: queries are built and
//! responses decoded through hickory, and everything above this module only
//! sees `ResourceRecord` values and an rcode/truncation pair.

use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{DNSClass, Name, RData, RecordType as HickoryRecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use scout_dns_domain::{RcodeError, RecordData, RecordType, ResolveError, ResourceRecord};
use std::str::FromStr;

/// Decoded response, reduced to what the query layers need.
#[derive(Debug, Clone)]
pub struct WireResponse {
    pub rcode: RcodeError,
    pub truncated: bool,
    /// Answer entries in server order; entries of types outside the closed
    /// record model are dropped.
    pub answers: Vec<ResourceRecord>,
}

pub fn to_hickory(record_type: RecordType) -> HickoryRecordType {
    match record_type {
        RecordType::A => HickoryRecordType::A,
        RecordType::AAAA => HickoryRecordType::AAAA,
        RecordType::CAA => HickoryRecordType::CAA,
        RecordType::CNAME => HickoryRecordType::CNAME,
        RecordType::MX => HickoryRecordType::MX,
        RecordType::NS => HickoryRecordType::NS,
        RecordType::PTR => HickoryRecordType::PTR,
        RecordType::SOA => HickoryRecordType::SOA,
        RecordType::SRV => HickoryRecordType::SRV,
        RecordType::TXT => HickoryRecordType::TXT,
    }
}

/// Builds one recursive query (RD set, single question, IN class) and
/// serializes it to wire format. Returns the message ID for response
/// matching.
pub fn build_query(name: &str, record_type: RecordType) -> Result<(u16, Vec<u8>), ResolveError> {
    let name = Name::from_str(name)
        .map_err(|e| ResolveError::InvalidDomainName(format!("invalid name '{}': {}", name, e)))?;

    let mut query = Query::new();
    query.set_name(name);
    query.set_query_type(to_hickory(record_type));
    query.set_query_class(DNSClass::IN);

    let id = fastrand::u16(..);

    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);

    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message
        .emit(&mut encoder)
        .map_err(|e| ResolveError::Proto(format!("failed to serialize DNS message: {}", e)))?;

    Ok((id, buf))
}

/// Decodes a raw response, checking its ID against the query that produced
/// it. A mismatched ID is a protocol error, not an answer.
pub fn parse_response(bytes: &[u8], expected_id: u16) -> Result<WireResponse, ResolveError> {
    let message = Message::from_vec(bytes)
        .map_err(|e| ResolveError::Proto(format!("failed to parse DNS response: {}", e)))?;

    if message.id() != expected_id {
        return Err(ResolveError::Proto(format!(
            "response id {} does not match query id {}",
            message.id(),
            expected_id
        )));
    }

    let mut answers = Vec::with_capacity(message.answers().len());
    for record in message.answers() {
        if let Some(data) = decode_rdata(record.data()) {
            answers.push(ResourceRecord {
                name: record.name().to_utf8(),
                record_type: data.record_type(),
                ttl: record.ttl(),
                data,
            });
        }
    }

    Ok(WireResponse {
        rcode: map_rcode(message.response_code()),
        truncated: message.truncated(),
        answers,
    })
}

fn map_rcode(rcode: ResponseCode) -> RcodeError {
    match rcode {
        ResponseCode::NoError => RcodeError::NoError,
        ResponseCode::FormErr => RcodeError::FormatError,
        ResponseCode::ServFail => RcodeError::ServerFailure,
        ResponseCode::NXDomain => RcodeError::NameError,
        ResponseCode::NotImp => RcodeError::NotImplemented,
        ResponseCode::Refused => RcodeError::Refused,
        other => RcodeError::Other(u16::from(other)),
    }
}

/// The single decode switch from hickory rdata to the typed record model.
fn decode_rdata(data: &RData) -> Option<RecordData> {
    match data {
        RData::A(a) => Some(RecordData::A(a.0)),
        RData::AAAA(aaaa) => Some(RecordData::Aaaa(aaaa.0)),
        RData::CAA(caa) => Some(RecordData::Caa(scout_dns_domain::Caa {
            issuer_critical: caa.issuer_critical(),
            tag: caa.tag().to_string(),
            value: String::from_utf8_lossy(caa.raw_value()).to_string(),
        })),
        RData::CNAME(cname) => Some(RecordData::Cname(cname.to_utf8())),
        RData::MX(mx) => Some(RecordData::Mx(scout_dns_domain::Mx {
            preference: mx.preference(),
            exchange: mx.exchange().to_utf8(),
        })),
        RData::NS(ns) => Some(RecordData::Ns(ns.to_utf8())),
        RData::PTR(ptr) => Some(RecordData::Ptr(ptr.to_utf8())),
        RData::SOA(soa) => Some(RecordData::Soa(scout_dns_domain::Soa {
            mname: soa.mname().to_utf8(),
            rname: soa.rname().to_utf8(),
            serial: soa.serial(),
            refresh: soa.refresh(),
            retry: soa.retry(),
            expire: soa.expire(),
            minimum: soa.minimum(),
        })),
        RData::SRV(srv) => Some(RecordData::Srv(scout_dns_domain::Srv {
            priority: srv.priority(),
            weight: srv.weight(),
            port: srv.port(),
            target: srv.target().to_utf8(),
        })),
        RData::TXT(txt) => Some(RecordData::Txt(
            txt.txt_data()
                .iter()
                .map(|part| String::from_utf8_lossy(part).into_owned())
                .collect(),
        )),
        _ => None,
    }
}
