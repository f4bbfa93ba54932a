//! Smooth weighted round-robin selection.
//!
//! Reads the policy fields an operator controls and maintains the
//! runtime-only counters of each peer (`current_weight`,
//! `effective_weight`, `fails`, `checked`). Mutations never write the
//! runtime counters, so they survive weight or flag updates.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, PoisonError};

use crate::upstream::peer::Peer;
use crate::upstream::{Outcome, PeerSelector};

/// Weighted round-robin selector.
///
/// Serializes selections so the per-peer weight bookkeeping stays consistent
/// across workers.
#[derive(Debug, Default)]
pub struct WeightedRoundRobin {
    lock: Mutex<()>,
}

impl WeightedRoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PeerSelector for WeightedRoundRobin {
    fn select(&self, peers: &[Arc<Peer>], now: u64) -> Option<Arc<Peer>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut best: Option<(&Arc<Peer>, i64)> = None;
        let mut total = 0i64;

        for peer in peers {
            if !is_available(peer, now) {
                continue;
            }

            let weight = peer.weight();
            let effective = peer.effective_weight.load(Ordering::Relaxed).clamp(0, weight);
            let current = peer
                .current_weight
                .load(Ordering::Relaxed)
                .saturating_add(effective);
            peer.current_weight.store(current, Ordering::Relaxed);
            total = total.saturating_add(effective);

            // Recover slowly after failures
            let recovered = if effective < weight { effective + 1 } else { effective };
            peer.effective_weight.store(recovered, Ordering::Relaxed);

            match best {
                Some((_, best_current)) if best_current >= current => {}
                _ => best = Some((peer, current)),
            }
        }

        let (best, _) = best?;
        let current = best.current_weight.load(Ordering::Relaxed).saturating_sub(total);
        best.current_weight.store(current, Ordering::Relaxed);
        Some(Arc::clone(best))
    }

    fn report(&self, peer: &Peer, outcome: Outcome, now: u64) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        match outcome {
            Outcome::Failure => {
                peer.fails.fetch_add(1, Ordering::Relaxed);
                peer.checked.store(now, Ordering::Relaxed);

                let max_fails = peer.max_fails();
                if max_fails > 0 {
                    let effective = peer
                        .effective_weight
                        .load(Ordering::Relaxed)
                        .saturating_sub(peer.weight() / max_fails);
                    peer.effective_weight.store(effective.max(0), Ordering::Relaxed);
                }

                tracing::debug!(
                    peer = %peer.name(),
                    fails = peer.fails(),
                    max_fails,
                    "Peer failure recorded"
                );
            }
            Outcome::Success => {
                if peer.fails() > 0 && !within_fail_window(peer, now) {
                    peer.fails.store(0, Ordering::Relaxed);
                }
            }
        }
    }
}

fn within_fail_window(peer: &Peer, now: u64) -> bool {
    let since = now.saturating_sub(peer.checked.load(Ordering::Relaxed));
    since <= u64::try_from(peer.fail_timeout()).unwrap_or(0)
}

/// Whether the selection path may hand out this peer right now.
fn is_available(peer: &Peer, now: u64) -> bool {
    if peer.is_down() || peer.weight() <= 0 {
        return false;
    }
    let max_fails = peer.max_fails();
    !(max_fails > 0 && peer.fails() >= max_fails && within_fail_window(peer, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::peer::PeerParams;

    fn peer(name: &str, weight: i64) -> Arc<Peer> {
        let params = PeerParams {
            weight,
            ..PeerParams::default()
        };
        Arc::new(Peer::new(name, name.parse().unwrap(), params))
    }

    fn picks(lb: &WeightedRoundRobin, peers: &[Arc<Peer>], n: usize) -> Vec<String> {
        (0..n)
            .map(|_| lb.select(peers, 1_000).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_extreme_weights_do_not_overflow() {
        let lb = WeightedRoundRobin::new();
        let peers = vec![peer("10.0.0.1:80", i64::MAX), peer("10.0.0.2:80", i64::MAX)];
        assert_eq!(picks(&lb, &peers, 8).len(), 8);

        let heavy = peer("10.0.0.3:80", i64::MAX);
        lb.report(&heavy, Outcome::Failure, 1_000);
        lb.report(&heavy, Outcome::Failure, 1_000);
        assert!(heavy.effective_weight.load(Ordering::Relaxed) >= 0);

        let negative = peer("10.0.0.4:80", i64::MIN + 1);
        negative.effective_weight.store(i64::MAX, Ordering::Relaxed);
        lb.report(&negative, Outcome::Failure, 1_000);
        assert_eq!(negative.effective_weight.load(Ordering::Relaxed), i64::MAX);
    }

    #[test]
    fn test_equal_weights_rotate() {
        let lb = WeightedRoundRobin::new();
        let peers = vec![peer("127.0.0.1:8080", 1), peer("127.0.0.1:8081", 1)];
        assert_eq!(
            picks(&lb, &peers, 4),
            ["127.0.0.1:8080", "127.0.0.1:8081", "127.0.0.1:8080", "127.0.0.1:8081"]
        );
    }

    #[test]
    fn test_weights_are_smooth() {
        let lb = WeightedRoundRobin::new();
        let peers = vec![
            peer("10.0.0.1:80", 5),
            peer("10.0.0.2:80", 1),
            peer("10.0.0.3:80", 1),
        ];
        let seq = picks(&lb, &peers, 7);
        assert_eq!(
            seq,
            [
                "10.0.0.1:80",
                "10.0.0.1:80",
                "10.0.0.2:80",
                "10.0.0.1:80",
                "10.0.0.3:80",
                "10.0.0.1:80",
                "10.0.0.1:80",
            ]
        );
    }

    #[test]
    fn test_down_and_zero_weight_skipped() {
        let lb = WeightedRoundRobin::new();
        let a = peer("127.0.0.1:8080", 1);
        let b = peer("127.0.0.1:8081", 0);
        let c = peer("127.0.0.1:8082", 1);
        c.set_down(true);
        let peers = vec![a.clone(), b, c];

        for _ in 0..3 {
            assert_eq!(lb.select(&peers, 0).unwrap().name(), a.name());
        }
    }

    #[test]
    fn test_failed_peer_excluded_until_timeout() {
        let lb = WeightedRoundRobin::new();
        let a = peer("127.0.0.1:8080", 1);
        let b = peer("127.0.0.1:8081", 1);
        let peers = vec![a.clone(), b.clone()];

        lb.report(&a, Outcome::Failure, 100);
        assert_eq!(a.fails(), 1);

        // max_fails=1, fail_timeout=10
        for now in [100, 105, 110] {
            assert_eq!(lb.select(&peers, now).unwrap().name(), b.name());
        }
        let seen: Vec<_> = (0..2).map(|_| lb.select(&peers, 111).unwrap()).collect();
        assert!(seen.iter().any(|p| p.name() == a.name()));
    }

    #[test]
    fn test_success_resets_fails_after_window() {
        let lb = WeightedRoundRobin::new();
        let a = peer("127.0.0.1:8080", 1);

        lb.report(&a, Outcome::Failure, 100);
        lb.report(&a, Outcome::Success, 105);
        assert_eq!(a.fails(), 1);

        lb.report(&a, Outcome::Success, 111);
        assert_eq!(a.fails(), 0);
    }

    #[test]
    fn test_all_unavailable() {
        let lb = WeightedRoundRobin::new();
        let a = peer("127.0.0.1:8080", 1);
        a.set_down(true);
        assert!(lb.select(&[a], 0).is_none());
        assert!(lb.select(&[], 0).is_none());
    }
}
