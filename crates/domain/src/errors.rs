use thiserror::Error;

/// One-to-one mapping of the wire response code (RFC 1035 §4.1.1).
///
/// `NameError` (NXDOMAIN) is an expected negative outcome for the presence
/// predicates, not a failure; everything above it is classified by callers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RcodeError {
    #[error("NOERROR")]
    NoError,

    #[error("FORMERR")]
    FormatError,

    #[error("SERVFAIL")]
    ServerFailure,

    #[error("NXDOMAIN")]
    NameError,

    #[error("NOTIMP")]
    NotImplemented,

    #[error("REFUSED")]
    Refused,

    #[error("rcode {0}")]
    Other(u16),
}

impl RcodeError {
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => RcodeError::NoError,
            1 => RcodeError::FormatError,
            2 => RcodeError::ServerFailure,
            3 => RcodeError::NameError,
            4 => RcodeError::NotImplemented,
            5 => RcodeError::Refused,
            other => RcodeError::Other(other),
        }
    }

    pub fn to_code(self) -> u16 {
        match self {
            RcodeError::NoError => 0,
            RcodeError::FormatError => 1,
            RcodeError::ServerFailure => 2,
            RcodeError::NameError => 3,
            RcodeError::NotImplemented => 4,
            RcodeError::Refused => 5,
            RcodeError::Other(code) => code,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid max retries")]
    InvalidMaxRetries,

    #[error("Server list is empty")]
    EmptyServerList,

    #[error("Message is truncated")]
    Truncated,

    #[error("Query timeout")]
    QueryTimeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Proto(String),

    #[error(transparent)]
    Rcode(#[from] RcodeError),
}

impl ResolveError {
    /// NXDOMAIN is authoritative: the name does not exist, so retrying
    /// against another server cannot change the outcome.
    pub fn is_nxdomain(&self) -> bool {
        matches!(self, ResolveError::Rcode(RcodeError::NameError))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rcode_roundtrip() {
        for code in 0..=10u16 {
            assert_eq!(RcodeError::from_code(code).to_code(), code);
        }
    }

    #[test]
    fn rcode_display_uses_wire_mnemonics() {
        assert_eq!(RcodeError::NameError.to_string(), "NXDOMAIN");
        assert_eq!(RcodeError::ServerFailure.to_string(), "SERVFAIL");
        assert_eq!(RcodeError::Other(9).to_string(), "rcode 9");
    }

    #[test]
    fn nxdomain_classifier() {
        assert!(ResolveError::Rcode(RcodeError::NameError).is_nxdomain());
        assert!(!ResolveError::Rcode(RcodeError::Refused).is_nxdomain());
        assert!(!ResolveError::QueryTimeout.is_nxdomain());
    }
}
