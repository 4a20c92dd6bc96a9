//! Error types for the chord node
//!
//! This module defines the error types for all components of the
//! Chord DHT node.

use std::fmt;

/// Comprehensive error type for chord operations
#[derive(Debug, Clone)]
pub enum ChordError {
    /// RPC failures against a remote peer (timeout, refused, error reply)
    RpcError {
        message: String,
        peer: Option<String>,
        source: Option<String>,
    },

    /// Ring state requested while absent (e.g. no predecessor)
    RingError {
        message: String,
        source: Option<String>,
    },

    /// Wire protocol errors (framing, encoding)
    ProtocolError {
        message: String,
        source: Option<String>,
    },

    /// Configuration errors
    ConfigError {
        message: String,
        field: Option<String>,
    },

    /// Network errors (bind, connect, socket I/O)
    NetworkError {
        message: String,
        address: Option<String>,
        source: Option<String>,
    },

    /// Validation errors (malformed id length, bad address)
    ValidationError {
        message: String,
        field: Option<String>,
    },
}

impl ChordError {
    /// Create a new RpcError
    pub fn rpc_error(message: impl Into<String>) -> Self {
        ChordError::RpcError {
            message: message.into(),
            peer: None,
            source: None,
        }
    }

    /// Create a new RpcError with peer address
    pub fn rpc_error_with_peer(message: impl Into<String>, peer: impl Into<String>) -> Self {
        ChordError::RpcError {
            message: message.into(),
            peer: Some(peer.into()),
            source: None,
        }
    }

    /// Create a new RpcError with peer and source
    pub fn rpc_error_full(message: impl Into<String>, peer: impl Into<String>, source: impl Into<String>) -> Self {
        ChordError::RpcError {
            message: message.into(),
            peer: Some(peer.into()),
            source: Some(source.into()),
        }
    }

    /// Create a new RingError
    pub fn ring_error(message: impl Into<String>) -> Self {
        ChordError::RingError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new ProtocolError
    pub fn protocol_error(message: impl Into<String>) -> Self {
        ChordError::ProtocolError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new ProtocolError with source
    pub fn protocol_error_with_source(message: impl Into<String>, source: impl Into<String>) -> Self {
        ChordError::ProtocolError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new ConfigError
    pub fn config_error(message: impl Into<String>) -> Self {
        ChordError::ConfigError {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new ConfigError with field
    pub fn config_error_with_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        ChordError::ConfigError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new NetworkError
    pub fn network_error(message: impl Into<String>) -> Self {
        ChordError::NetworkError {
            message: message.into(),
            address: None,
            source: None,
        }
    }

    /// Create a new NetworkError with address and source
    pub fn network_error_full(message: impl Into<String>, address: impl Into<String>, source: impl Into<String>) -> Self {
        ChordError::NetworkError {
            message: message.into(),
            address: Some(address.into()),
            source: Some(source.into()),
        }
    }

    /// Create a new ValidationError
    pub fn validation_error(message: impl Into<String>) -> Self {
        ChordError::ValidationError {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new ValidationError with field
    pub fn validation_error_with_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        ChordError::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Whether the error is transient (safe to retry on the next round)
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ChordError::RpcError { .. } | ChordError::RingError { .. }
        )
    }
}

impl fmt::Display for ChordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChordError::RpcError { message, peer, source } => {
                match (peer, source) {
                    (Some(p), Some(s)) => write!(f, "RPC error: {} (peer: {}, source: {})", message, p, s),
                    (Some(p), None) => write!(f, "RPC error: {} (peer: {})", message, p),
                    (None, Some(s)) => write!(f, "RPC error: {} (source: {})", message, s),
                    (None, None) => write!(f, "RPC error: {}", message),
                }
            }
            ChordError::RingError { message, source } => {
                if let Some(src) = source {
                    write!(f, "Ring error: {} (source: {})", message, src)
                } else {
                    write!(f, "Ring error: {}", message)
                }
            }
            ChordError::ProtocolError { message, source } => {
                if let Some(src) = source {
                    write!(f, "Protocol error: {} (source: {})", message, src)
                } else {
                    write!(f, "Protocol error: {}", message)
                }
            }
            ChordError::ConfigError { message, field } => {
                if let Some(field_val) = field {
                    write!(f, "Config error: {} (field: {})", message, field_val)
                } else {
                    write!(f, "Config error: {}", message)
                }
            }
            ChordError::NetworkError { message, address, source } => {
                match (address, source) {
                    (Some(a), Some(s)) => write!(f, "Network error: {} (address: {}, source: {})", message, a, s),
                    (Some(a), None) => write!(f, "Network error: {} (address: {})", message, a),
                    (None, Some(s)) => write!(f, "Network error: {} (source: {})", message, s),
                    (None, None) => write!(f, "Network error: {}", message),
                }
            }
            ChordError::ValidationError { message, field } => {
                if let Some(field_val) = field {
                    write!(f, "Validation error: {} (field: {})", message, field_val)
                } else {
                    write!(f, "Validation error: {}", message)
                }
            }
        }
    }
}

impl std::error::Error for ChordError {}

// Implement From traits for common error types

impl From<std::io::Error> for ChordError {
    fn from(err: std::io::Error) -> Self {
        ChordError::network_error_full(err.to_string(), "unknown".to_string(), err.kind().to_string())
    }
}

impl From<serde_json::Error> for ChordError {
    fn from(err: serde_json::Error) -> Self {
        ChordError::protocol_error_with_source("Failed to encode or decode message", err.to_string())
    }
}

impl From<std::net::AddrParseError> for ChordError {
    fn from(err: std::net::AddrParseError) -> Self {
        ChordError::network_error_full("Failed to parse address", "unknown".to_string(), err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for ChordError {
    fn from(_err: tokio::time::error::Elapsed) -> Self {
        ChordError::rpc_error("Operation timed out")
    }
}
