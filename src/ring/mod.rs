//! Ring module
//!
//! Identifier space, node handles and routing state for the Chord ring.

pub mod id;
pub mod node;
pub mod state;

pub use id::{in_range_left_open, in_range_open, xor_distance, Identifier, M, M_BYTES};
pub use node::NodeRef;
pub use state::{RingPhase, RoutingState};
