//! Peer abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server of an upstream group
//! - Hold the operator-controlled policy (weight, max_fails, fail_timeout, down)
//! - Hold the runtime counters owned by the selection path
//!
//! Every field that changes after construction is an atomic, so readers
//! working from a snapshot never observe a torn value.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

/// Operator-controlled policy of a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerParams {
    pub weight: i64,
    pub max_fails: i64,
    /// Seconds a peer stays excluded after reaching `max_fails`.
    pub fail_timeout: i64,
    pub down: bool,
}

impl Default for PeerParams {
    fn default() -> Self {
        Self {
            weight: 1,
            max_fails: 1,
            fail_timeout: 10,
            down: false,
        }
    }
}

/// A single backend server.
#[derive(Debug)]
pub struct Peer {
    /// Address text as configured; the identity used by remove and update.
    name: String,
    /// Resolved socket address.
    pub addr: SocketAddr,

    weight: AtomicI64,
    max_fails: AtomicI64,
    fail_timeout: AtomicI64,
    down: AtomicBool,

    // --- Selection runtime state ---
    pub(crate) current_weight: AtomicI64,
    pub(crate) effective_weight: AtomicI64,
    /// Failures since the last reset.
    pub(crate) fails: AtomicI64,
    /// Unix time of the last failure.
    pub(crate) checked: AtomicU64,
}

impl Peer {
    /// Create a new peer.
    pub fn new(name: impl Into<String>, addr: SocketAddr, params: PeerParams) -> Self {
        Self {
            name: name.into(),
            addr,
            weight: AtomicI64::new(params.weight),
            max_fails: AtomicI64::new(params.max_fails),
            fail_timeout: AtomicI64::new(params.fail_timeout),
            down: AtomicBool::new(params.down),
            current_weight: AtomicI64::new(0),
            effective_weight: AtomicI64::new(params.weight),
            fails: AtomicI64::new(0),
            checked: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> i64 {
        self.weight.load(Ordering::Acquire)
    }

    pub fn max_fails(&self) -> i64 {
        self.max_fails.load(Ordering::Acquire)
    }

    pub fn fail_timeout(&self) -> i64 {
        self.fail_timeout.load(Ordering::Acquire)
    }

    pub fn is_down(&self) -> bool {
        self.down.load(Ordering::Acquire)
    }

    /// Current policy as one value.
    pub fn params(&self) -> PeerParams {
        PeerParams {
            weight: self.weight(),
            max_fails: self.max_fails(),
            fail_timeout: self.fail_timeout(),
            down: self.is_down(),
        }
    }

    /// Failures counted by the selection path.
    pub fn fails(&self) -> i64 {
        self.fails.load(Ordering::Relaxed)
    }

    // Setters are called with the group lock held.

    pub(crate) fn set_weight(&self, weight: i64) {
        self.weight.store(weight, Ordering::Release);
    }

    pub(crate) fn set_max_fails(&self, max_fails: i64) {
        self.max_fails.store(max_fails, Ordering::Release);
    }

    pub(crate) fn set_fail_timeout(&self, fail_timeout: i64) {
        self.fail_timeout.store(fail_timeout, Ordering::Release);
    }

    pub(crate) fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::Release);
    }

    /// Bytes this peer occupies in its group's zone.
    pub(crate) fn footprint(name: &str) -> usize {
        std::mem::size_of::<Peer>() + name.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = PeerParams::default();
        assert_eq!(params.weight, 1);
        assert_eq!(params.max_fails, 1);
        assert_eq!(params.fail_timeout, 10);
        assert!(!params.down);
    }

    #[test]
    fn test_setters_touch_one_field() {
        let addr = "127.0.0.1:8080".parse().unwrap();
        let peer = Peer::new("127.0.0.1:8080", addr, PeerParams::default());
        peer.fails.store(3, Ordering::Relaxed);

        peer.set_weight(5);
        assert_eq!(
            peer.params(),
            PeerParams { weight: 5, max_fails: 1, fail_timeout: 10, down: false }
        );
        assert_eq!(peer.fails(), 3);

        peer.set_down(true);
        assert!(peer.is_down());
        assert_eq!(peer.weight(), 5);
    }
}
