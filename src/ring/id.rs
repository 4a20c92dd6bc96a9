//! Ring identifier module
//!
//! Identifier arithmetic for the M-bit Chord ring.

use crate::error::ChordError;
use sha1::{Digest, Sha1};
use std::fmt;

/// Ring bit width.
pub const M: usize = 16;

/// Identifier size in bytes.
pub const M_BYTES: usize = (M + 7) / 8;

/// Chord ring identifier (M bits, big-endian)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(pub [u8; M_BYTES]);

impl Identifier {
    /// Create a new Identifier from bytes
    pub fn new(id: [u8; M_BYTES]) -> Self {
        Self(id)
    }

    /// Derive the identifier for a network address.
    ///
    /// The identifier is the leading M bits of SHA-1 over the UTF-8
    /// dial string.
    pub fn from_addr(addr: &str) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(addr.as_bytes());
        let digest = hasher.finalize();
        let mut id = [0u8; M_BYTES];
        id.copy_from_slice(&digest[..M_BYTES]);
        Self(id)
    }

    /// Create an Identifier from a byte slice, rejecting wrong lengths
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ChordError> {
        if bytes.len() != M_BYTES {
            return Err(ChordError::validation_error_with_field(
                format!("Identifier must be exactly {} bytes, got {}", M_BYTES, bytes.len()),
                "id",
            ));
        }
        let mut id = [0u8; M_BYTES];
        id.copy_from_slice(bytes);
        Ok(Self(id))
    }

    /// Get the identifier as bytes
    pub fn as_bytes(&self) -> &[u8; M_BYTES] {
        &self.0
    }

    /// Get the identifier as a hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse an Identifier from a hex string
    pub fn from_hex(hex_str: &str) -> Result<Self, ChordError> {
        let bytes = hex::decode(hex_str).map_err(|e| {
            ChordError::validation_error_with_field(
                format!("Invalid hex identifier: {}", e),
                "id",
            )
        })?;
        Self::from_bytes(&bytes)
    }

    /// Compute `(self + 2^exp) mod 2^M`, the i-th finger target.
    ///
    /// Addition is carry-propagating over the big-endian bytes; the carry
    /// out of the top byte is dropped, and a bit position at or beyond M
    /// adds nothing (it is truncated away by the modulus).
    pub fn finger_target(&self, exp: usize) -> Identifier {
        let mut out = self.0;
        let byte_from_right = exp / 8;
        if byte_from_right >= M_BYTES {
            return Identifier(out);
        }

        let mut idx = M_BYTES - 1 - byte_from_right;
        let mut carry = 1u16 << (exp % 8);
        loop {
            let sum = out[idx] as u16 + carry;
            out[idx] = (sum & 0xff) as u8;
            carry = sum >> 8;
            if carry == 0 || idx == 0 {
                break;
            }
            idx -= 1;
        }
        Identifier(out)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Check whether `c` lies in the half-open cyclic interval `(l, r]`.
///
/// Operands are equal-length big-endian byte strings. When `l == r` the
/// interval covers the whole ring and every identifier qualifies.
pub fn in_range_left_open(c: &[u8], l: &[u8], r: &[u8]) -> bool {
    if l < r {
        l < c && c <= r
    } else {
        l < c || c <= r
    }
}

/// Check whether `c` lies in the open cyclic interval `(l, r)`.
pub fn in_range_open(c: &[u8], l: &[u8], r: &[u8]) -> bool {
    c != r && in_range_left_open(c, l, r)
}

/// Bytewise XOR distance between two equal-length byte strings
pub fn xor_distance(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
}
