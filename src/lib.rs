//! rust-chord-node
//!
//! A Chord distributed hash table node with ring stabilization.

pub mod chord;
pub mod cli;
pub mod error;
pub mod ring;
pub mod rpc;

pub use error::ChordError;

pub use ring::{
    in_range_left_open, in_range_open, xor_distance, Identifier, NodeRef, RingPhase,
    RoutingState, M, M_BYTES,
};
pub use chord::ChordServer;
pub use rpc::{RemoteNode, Request, Response, RpcServer};
pub use cli::{CliArgs, Config};
