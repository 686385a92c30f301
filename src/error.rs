use thiserror::Error;

use crate::bits::BitString;

/// Rejected insertion. The trie is left exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InsertError<V> {
    /// The prefix already carries a value. The rejected value is handed back.
    #[error("prefix {prefix} (/{}) is already present", prefix.len())]
    DuplicatePrefix { prefix: BitString, value: V },
}

impl<V> InsertError<V> {
    /// Takes back the value that was not stored.
    pub fn into_value(self) -> V {
        match self {
            InsertError::DuplicatePrefix { value, .. } => value,
        }
    }
}

/// A bit string literal contained something other than `0` or `1`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid bit {found:?} at position {position}")]
pub struct ParseBitsError {
    pub position: usize,
    pub found: char,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrefixParseError {
    #[error("missing '/' in prefix {0:?}")]
    MissingLength(String),
    #[error("invalid address: {0}")]
    Address(#[from] std::net::AddrParseError),
    #[error("invalid prefix length {0:?}")]
    Length(String),
    #[error("prefix length {0} exceeds 32")]
    LengthOutOfRange(u32),
    #[error("host bits set in {0}")]
    HostBitsSet(String),
}

/// Why a packet did not reach a local delivery.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ForwardError {
    #[error("router {0} not found")]
    UnknownRouter(String),
    #[error("no route at {router}, packet dropped")]
    NoRoute { router: String },
    #[error("next hop {next_hop} from {router} not found, packet dropped")]
    UnknownNextHop { router: String, next_hop: String },
    #[error("loop detected at {router}")]
    SelfLoop { router: String },
    #[error("hop limit of {max_hops} exceeded, loop detected")]
    HopLimitExceeded { max_hops: usize, path: Vec<String> },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("router {0} already exists")]
    DuplicateRouter(String),
    #[error("router {0} not found")]
    UnknownRouter(String),
    #[error("route {prefix} already present on router {router}")]
    DuplicateRoute { router: String, prefix: String },
    #[error(transparent)]
    Prefix(#[from] PrefixParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_error_display() {
        let err = InsertError::DuplicatePrefix {
            prefix: "1010".parse().unwrap(),
            value: 7u32,
        };
        assert_eq!(err.to_string(), "prefix 1010 (/4) is already present");

        let source: &dyn std::error::Error = &err;
        assert!(source.source().is_none());
        assert_eq!(err.into_value(), 7);
    }

    #[test]
    fn test_forward_error_display() {
        let err = ForwardError::UnknownNextHop {
            router: "D".to_string(),
            next_hop: "E".to_string(),
        };
        assert_eq!(err.to_string(), "next hop E from D not found, packet dropped");
    }
}
