//! Typed lookups over the pool: per-type projections, the all-types
//! aggregate, and the registration predicate.

use crate::pool::ServerPool;
use scout_dns_domain::{
    Caa, Mx, RecordData, RecordType, ResolveError, ResourceRecord, Soa, Srv,
};
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::warn;

/// Presence checks for [`ServerPool::is_registered`], in cheapest-first
/// order. SOA and PTR say nothing about a name being provisioned, so they
/// are left out.
const REGISTRATION_TYPES: [RecordType; 8] = [
    RecordType::A,
    RecordType::AAAA,
    RecordType::TXT,
    RecordType::CNAME,
    RecordType::MX,
    RecordType::NS,
    RecordType::CAA,
    RecordType::SRV,
];

impl ServerPool {
    /// IPv4 addresses for `name`. Answer entries of other types, such as
    /// the CNAME steps of a chain, are skipped.
    pub async fn lookup_a(&self, name: &str) -> Result<Vec<Ipv4Addr>, ResolveError> {
        let records = self.try_query(name, RecordType::A).await?;
        Ok(project(records, |data| match data {
            RecordData::A(ip) => Some(ip),
            _ => None,
        }))
    }

    /// IPv6 addresses for `name`.
    pub async fn lookup_aaaa(&self, name: &str) -> Result<Vec<Ipv6Addr>, ResolveError> {
        let records = self.try_query(name, RecordType::AAAA).await?;
        Ok(project(records, |data| match data {
            RecordData::Aaaa(ip) => Some(ip),
            _ => None,
        }))
    }

    /// CAA properties for `name`.
    pub async fn lookup_caa(&self, name: &str) -> Result<Vec<Caa>, ResolveError> {
        let records = self.try_query(name, RecordType::CAA).await?;
        Ok(project(records, |data| match data {
            RecordData::Caa(caa) => Some(caa),
            _ => None,
        }))
    }

    /// Canonical-name targets for `name`.
    pub async fn lookup_cname(&self, name: &str) -> Result<Vec<String>, ResolveError> {
        let records = self.try_query(name, RecordType::CNAME).await?;
        Ok(project(records, |data| match data {
            RecordData::Cname(target) => Some(target),
            _ => None,
        }))
    }

    /// Mail exchanges for `name`, in server order.
    pub async fn lookup_mx(&self, name: &str) -> Result<Vec<Mx>, ResolveError> {
        let records = self.try_query(name, RecordType::MX).await?;
        Ok(project(records, |data| match data {
            RecordData::Mx(mx) => Some(mx),
            _ => None,
        }))
    }

    /// Authoritative name servers for `name`.
    pub async fn lookup_ns(&self, name: &str) -> Result<Vec<String>, ResolveError> {
        let records = self.try_query(name, RecordType::NS).await?;
        Ok(project(records, |data| match data {
            RecordData::Ns(ns) => Some(ns),
            _ => None,
        }))
    }

    /// Pointer targets for `name`, which is expected to already be in
    /// `in-addr.arpa` / `ip6.arpa` form.
    pub async fn lookup_ptr(&self, name: &str) -> Result<Vec<String>, ResolveError> {
        let records = self.try_query(name, RecordType::PTR).await?;
        Ok(project(records, |data| match data {
            RecordData::Ptr(target) => Some(target),
            _ => None,
        }))
    }

    /// Start-of-authority entries for `name`.
    pub async fn lookup_soa(&self, name: &str) -> Result<Vec<Soa>, ResolveError> {
        let records = self.try_query(name, RecordType::SOA).await?;
        Ok(project(records, |data| match data {
            RecordData::Soa(soa) => Some(soa),
            _ => None,
        }))
    }

    /// Service locators for `name`.
    pub async fn lookup_srv(&self, name: &str) -> Result<Vec<Srv>, ResolveError> {
        let records = self.try_query(name, RecordType::SRV).await?;
        Ok(project(records, |data| match data {
            RecordData::Srv(srv) => Some(srv),
            _ => None,
        }))
    }

    /// TXT strings for `name`, one entry per character-string, flattened
    /// across records.
    pub async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, ResolveError> {
        let records = self.try_query(name, RecordType::TXT).await?;
        let mut out = Vec::new();
        for record in records {
            if let RecordData::Txt(parts) = record.data {
                out.extend(parts);
            }
        }
        Ok(out)
    }

    /// Queries every supported type for `name` and aggregates the answers,
    /// deduplicated, in query order.
    ///
    /// Types answered by a wildcard are left out: a wildcard answer
    /// describes the zone's catch-all, not `name`. When wildcard detection
    /// itself fails the type is skipped too, erring on the side of fewer
    /// false records.
    pub async fn lookup_any(&self, name: &str) -> Result<Vec<ResourceRecord>, ResolveError> {
        let mut out: Vec<ResourceRecord> = Vec::new();

        for record_type in RecordType::ALL {
            let records = self.try_query(name, record_type).await?;
            if records.is_empty() {
                continue;
            }

            let wildcarded = match self.is_wildcard(name, record_type).await {
                Ok(wc) => wc,
                Err(e) => {
                    warn!(name, record_type = %record_type, error = %e, "wildcard check failed, dropping records of this type");
                    true
                }
            };
            if wildcarded {
                continue;
            }

            for record in records {
                if !out.contains(&record) {
                    out.push(record);
                }
            }
        }

        Ok(out)
    }

    /// Whether any record is provisioned for `name`: the registration
    /// types are checked in order and the first hit wins. NXDOMAIN all the
    /// way through means `false`, not an error.
    pub async fn is_registered(&self, name: &str) -> Result<bool, ResolveError> {
        for record_type in REGISTRATION_TYPES {
            if self.is_set(name, record_type).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn project<T>(
    records: Vec<ResourceRecord>,
    extract: impl Fn(RecordData) -> Option<T>,
) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| extract(record.data))
        .collect()
}
