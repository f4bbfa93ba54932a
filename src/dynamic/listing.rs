//! Text rendering of a group's peers.

use std::sync::Arc;

use crate::upstream::peer::Peer;

/// Render one line per peer, head to tail.
///
/// ```text
/// compact: <name>;
/// verbose: <name> weight=<w> max_fails=<n> fail_timeout=<s> down=<0|1>;
/// ```
pub fn render(peers: &[Arc<Peer>], verbose: bool) -> String {
    let line = if verbose { 64 } else { 2 };
    let mut out = String::with_capacity(peers.iter().map(|p| p.name().len() + line).sum());

    for peer in peers {
        if verbose {
            out.push_str(&format!(
                "{} weight={} max_fails={} fail_timeout={} down={};\n",
                peer.name(),
                peer.weight(),
                peer.max_fails(),
                peer.fail_timeout(),
                u8::from(peer.is_down()),
            ));
        } else {
            out.push_str(peer.name());
            out.push_str(";\n");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::peer::PeerParams;

    fn peers() -> Vec<Arc<Peer>> {
        let a = Peer::new("10.0.0.1:80", "10.0.0.1:80".parse().unwrap(), PeerParams::default());
        let b = Peer::new(
            "backend.local:8080",
            "10.0.0.2:8080".parse().unwrap(),
            PeerParams {
                weight: 3,
                max_fails: 2,
                fail_timeout: 30,
                down: true,
            },
        );
        vec![Arc::new(a), Arc::new(b)]
    }

    #[test]
    fn test_compact() {
        assert_eq!(render(&peers(), false), "10.0.0.1:80;\nbackend.local:8080;\n");
    }

    #[test]
    fn test_verbose() {
        assert_eq!(
            render(&peers(), true),
            "10.0.0.1:80 weight=1 max_fails=1 fail_timeout=10 down=0;\n\
             backend.local:8080 weight=3 max_fails=2 fail_timeout=30 down=1;\n"
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(render(&[], true), "");
    }
}
