//! Scout DNS domain layer: endpoints, record model, error taxonomy and
//! domain-name decomposition. No I/O lives here.
pub mod config;
pub mod endpoint;
pub mod errors;
pub mod name;
pub mod record_data;
pub mod record_type;

pub use config::ResolverConfig;
pub use endpoint::{Endpoint, Protocol};
pub use errors::{RcodeError, ResolveError};
pub use name::{
    clean, decompose, has_subdomain, is_domain, is_domain_label, public_suffix,
    registrable_domain, subdomain, DomainParts,
};
pub use record_data::{Caa, Mx, RecordData, ResourceRecord, Soa, Srv};
pub use record_type::RecordType;
