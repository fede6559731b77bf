use crate::record_type::RecordType;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// One CAA property, e.g. `0 issue "letsencrypt.org"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caa {
    pub issuer_critical: bool,
    pub tag: String,
    pub value: String,
}

impl fmt::Display for Caa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} \"{}\"",
            u8::from(self.issuer_critical),
            self.tag,
            self.value
        )
    }
}

/// One mail exchange: lower preference wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mx {
    pub preference: u16,
    pub exchange: String,
}

impl fmt::Display for Mx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.exchange)
    }
}

/// Start-of-authority payload for a zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Soa {
    pub mname: String,
    pub rname: String,
    pub serial: u32,
    pub refresh: i32,
    pub retry: i32,
    pub expire: i32,
    pub minimum: u32,
}

impl fmt::Display for Soa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.mname, self.rname, self.serial, self.refresh, self.retry, self.expire, self.minimum
        )
    }
}

/// One service locator entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Srv {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

impl fmt::Display for Srv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.priority, self.weight, self.port, self.target
        )
    }
}

/// Decoded value of one answer entry. One tagged union replaces a
/// per-type adapter function for every record kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Caa(Caa),
    Cname(String),
    Mx(Mx),
    Ns(String),
    Ptr(String),
    Soa(Soa),
    Srv(Srv),
    Txt(Vec<String>),
}

impl RecordData {
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordData::A(_) => RecordType::A,
            RecordData::Aaaa(_) => RecordType::AAAA,
            RecordData::Caa(_) => RecordType::CAA,
            RecordData::Cname(_) => RecordType::CNAME,
            RecordData::Mx(_) => RecordType::MX,
            RecordData::Ns(_) => RecordType::NS,
            RecordData::Ptr(_) => RecordType::PTR,
            RecordData::Soa(_) => RecordType::SOA,
            RecordData::Srv(_) => RecordType::SRV,
            RecordData::Txt(_) => RecordType::TXT,
        }
    }
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::A(ip) => write!(f, "{}", ip),
            RecordData::Aaaa(ip) => write!(f, "{}", ip),
            RecordData::Caa(caa) => write!(f, "{}", caa),
            RecordData::Cname(name) => write!(f, "{}", name),
            RecordData::Mx(mx) => write!(f, "{}", mx),
            RecordData::Ns(name) => write!(f, "{}", name),
            RecordData::Ptr(name) => write!(f, "{}", name),
            RecordData::Soa(soa) => write!(f, "{}", soa),
            RecordData::Srv(srv) => write!(f, "{}", srv),
            RecordData::Txt(parts) => write!(f, "\"{}\"", parts.join("")),
        }
    }
}

/// One entry of an answer section, order preserved as returned by the
/// server. Duplicates are possible and must be tolerated by callers that
/// need a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: String,
    pub record_type: RecordType,
    pub ttl: u32,
    pub data: RecordData,
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.name, self.ttl, self.record_type, self.data
        )
    }
}
