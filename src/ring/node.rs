//! Ring node module
//!
//! Value-typed handle to a node on the Chord ring.

use crate::ring::id::Identifier;
use std::fmt;

/// Reference to a node on the ring: identifier plus dial string.
///
/// Two NodeRefs are equal iff their identifiers are equal; the address is
/// only used to reach the peer.
#[derive(Debug, Clone)]
pub struct NodeRef {
    /// Ring identifier
    pub id: Identifier,
    /// Network address (`host:port` dial string)
    pub addr: String,
}

impl NodeRef {
    /// Create a new NodeRef
    pub fn new(id: Identifier, addr: impl Into<String>) -> Self {
        Self {
            id,
            addr: addr.into(),
        }
    }

    /// Create a NodeRef for an address, deriving its identifier
    pub fn from_addr(addr: impl Into<String>) -> Self {
        let addr = addr.into();
        Self {
            id: Identifier::from_addr(&addr),
            addr,
        }
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NodeRef {}

impl std::hash::Hash for NodeRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.addr)
    }
}
