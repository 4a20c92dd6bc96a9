//! Routing state module
//!
//! The per-node Chord routing state: successor, predecessor and finger
//! table. All mutation happens under the owning node's mutex; this module
//! only provides the data and its pure queries.

use crate::ring::id::{in_range_open, Identifier, M};
use crate::ring::node::NodeRef;
use std::fmt;

/// Membership phase of the local node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingPhase {
    /// Solo ring: successor is self, predecessor absent
    Solo,
    /// Joined a bootstrap peer, ring links not yet confirmed
    Joining,
    /// Stabilized member of a multi-node ring
    Active,
}

impl fmt::Display for RingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RingPhase::Solo => write!(f, "solo"),
            RingPhase::Joining => write!(f, "joining"),
            RingPhase::Active => write!(f, "active"),
        }
    }
}

/// Local Chord routing state
#[derive(Debug)]
pub struct RoutingState {
    /// This node
    self_node: NodeRef,
    /// The node believed to precede us on the ring
    predecessor: Option<NodeRef>,
    /// Routing shortcuts; entry 0 is the successor
    finger: Vec<Option<NodeRef>>,
    /// Round-robin cursor for finger repair
    fix_finger_next: usize,
    /// Membership phase
    phase: RingPhase,
}

impl RoutingState {
    /// Create the state of a solo ring: the successor is the node itself,
    /// the predecessor and all other fingers are absent.
    pub fn new(self_node: NodeRef) -> Self {
        let mut finger = vec![None; M];
        finger[0] = Some(self_node.clone());
        Self {
            self_node,
            predecessor: None,
            finger,
            fix_finger_next: 0,
            phase: RingPhase::Solo,
        }
    }

    /// This node's reference
    pub fn self_node(&self) -> &NodeRef {
        &self.self_node
    }

    /// The current successor (finger table entry 0)
    pub fn successor(&self) -> NodeRef {
        self.finger[0]
            .clone()
            .unwrap_or_else(|| self.self_node.clone())
    }

    /// Replace the successor
    pub fn set_successor(&mut self, node: NodeRef) {
        self.finger[0] = Some(node);
    }

    /// The current predecessor, if any
    pub fn predecessor(&self) -> Option<NodeRef> {
        self.predecessor.clone()
    }

    /// Set the predecessor
    pub fn set_predecessor(&mut self, node: NodeRef) {
        self.predecessor = Some(node);
    }

    /// Clear the predecessor
    pub fn clear_predecessor(&mut self) {
        self.predecessor = None;
    }

    /// Finger table entry `i`
    pub fn finger(&self, i: usize) -> Option<&NodeRef> {
        self.finger[i].as_ref()
    }

    /// Set finger table entry `i`
    pub fn set_finger(&mut self, i: usize, node: NodeRef) {
        self.finger[i] = Some(node);
    }

    /// Advance the finger-repair cursor modulo M and return the index to
    /// repair. The cursor starts at 0 and is incremented before use, so
    /// entry 0 is left to the stabilize task.
    pub fn advance_fix_finger(&mut self) -> usize {
        self.fix_finger_next = (self.fix_finger_next + 1) % M;
        self.fix_finger_next
    }

    /// Current finger-repair cursor
    pub fn fix_finger_next(&self) -> usize {
        self.fix_finger_next
    }

    /// Membership phase
    pub fn phase(&self) -> RingPhase {
        self.phase
    }

    /// Set the membership phase
    pub fn set_phase(&mut self, phase: RingPhase) {
        self.phase = phase;
    }

    /// Scan the finger table from the top down for the closest node that
    /// strictly precedes `id` on the ring, i.e. the first present entry
    /// whose identifier lies in the open interval `(self.id, id)`.
    pub fn closest_preceding_node(&self, id: &Identifier) -> Option<NodeRef> {
        for i in (0..M).rev() {
            if let Some(node) = &self.finger[i] {
                if in_range_open(node.id.as_bytes(), self.self_node.id.as_bytes(), id.as_bytes()) {
                    return Some(node.clone());
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u16, addr: &str) -> NodeRef {
        NodeRef::new(Identifier::new(id.to_be_bytes()), addr)
    }

    #[test]
    fn test_new_is_solo_ring() {
        let state = RoutingState::new(node(100, "127.0.0.1:9000"));
        assert_eq!(state.successor(), *state.self_node());
        assert!(state.predecessor().is_none());
        assert_eq!(state.fix_finger_next(), 0);
        assert_eq!(state.phase(), RingPhase::Solo);
        for i in 1..M {
            assert!(state.finger(i).is_none());
        }
    }

    #[test]
    fn test_set_successor() {
        let mut state = RoutingState::new(node(100, "127.0.0.1:9000"));
        let succ = node(200, "127.0.0.1:9001");
        state.set_successor(succ.clone());
        assert_eq!(state.successor(), succ);
    }

    #[test]
    fn test_predecessor_set_and_clear() {
        let mut state = RoutingState::new(node(100, "127.0.0.1:9000"));
        let pred = node(50, "127.0.0.1:9001");
        state.set_predecessor(pred.clone());
        assert_eq!(state.predecessor(), Some(pred));
        state.clear_predecessor();
        assert!(state.predecessor().is_none());
    }

    #[test]
    fn test_advance_fix_finger_skips_entry_zero() {
        let mut state = RoutingState::new(node(100, "127.0.0.1:9000"));
        // First repaired index is 1, then 2, ... wrapping to 0 after M - 1.
        assert_eq!(state.advance_fix_finger(), 1);
        assert_eq!(state.advance_fix_finger(), 2);
        for _ in 2..M - 1 {
            state.advance_fix_finger();
        }
        assert_eq!(state.fix_finger_next(), M - 1);
        assert_eq!(state.advance_fix_finger(), 0);
        assert_eq!(state.advance_fix_finger(), 1);
    }

    #[test]
    fn test_closest_preceding_node_picks_highest_match() {
        let mut state = RoutingState::new(node(100, "127.0.0.1:9000"));
        state.set_successor(node(200, "127.0.0.1:9001"));
        state.set_finger(3, node(150, "127.0.0.1:9002"));

        let found = state.closest_preceding_node(&Identifier::new(180u16.to_be_bytes()));
        assert_eq!(found, Some(node(150, "127.0.0.1:9002")));
    }

    #[test]
    fn test_closest_preceding_node_none_qualify() {
        let mut state = RoutingState::new(node(100, "127.0.0.1:9000"));
        state.set_successor(node(200, "127.0.0.1:9001"));
        state.set_finger(3, node(150, "127.0.0.1:9002"));

        assert!(state
            .closest_preceding_node(&Identifier::new(101u16.to_be_bytes()))
            .is_none());
    }

    #[test]
    fn test_closest_preceding_node_ignores_absent_entries() {
        let state = RoutingState::new(node(100, "127.0.0.1:9000"));
        // Only finger[0] = self is present, which never strictly precedes.
        assert!(state
            .closest_preceding_node(&Identifier::new(5000u16.to_be_bytes()))
            .is_none());
    }

    #[test]
    fn test_phase_transitions() {
        let mut state = RoutingState::new(node(100, "127.0.0.1:9000"));
        assert_eq!(state.phase(), RingPhase::Solo);
        state.set_phase(RingPhase::Joining);
        assert_eq!(state.phase(), RingPhase::Joining);
        state.set_phase(RingPhase::Active);
        assert_eq!(format!("{}", state.phase()), "active");
    }
}
