//! Scout DNS resolver: stub resolution against a pool of upstream servers.
//!
//! The entry point is [`ServerPool`]: build one from endpoint strings or a
//! [`ResolverConfig`], then use [`ServerPool::try_query`] and the typed
//! `lookup_*` projections. Individual [`Server`]s answer single queries and
//! handle UDP truncation by escalating to TCP; the pool adds retry,
//! failover and wildcard detection on top.
//!
//! ```no_run
//! use scout_dns_resolver::ServerPool;
//! use scout_dns_resolver::RecordType;
//!
//! # async fn run() -> Result<(), scout_dns_resolver::ResolveError> {
//! let pool = ServerPool::default_pool();
//! let ips = pool.lookup_a("example.com").await?;
//! let wildcarded = pool.is_wildcard("www.example.com", RecordType::A).await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod lookup;
pub mod pool;
pub mod server;
pub mod transport;
pub mod wildcard;

#[cfg(test)]
mod testutil;

pub use pool::ServerPool;
pub use server::Server;
pub use transport::DnsTransport;

pub use scout_dns_domain::{
    clean, decompose, has_subdomain, is_domain, is_domain_label, public_suffix,
    registrable_domain, subdomain, Caa, DomainParts, Endpoint, Mx, Protocol, RcodeError,
    RecordData, RecordType, ResolveError, ResolverConfig, ResourceRecord, Soa, Srv,
};
