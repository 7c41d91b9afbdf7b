//! Listing id assignment.
//!
//! Ids follow `{prefix}_{millis}_{token}`: a per-source prefix, the insert
//! timestamp, and a base36 counter token. The counter starts at a random
//! point and only ever increments, so two listings minted in the same
//! millisecond still get distinct ids, across every worker of the run.

use crate::types::{Listing, ListingId, SourceId};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct IdAssigner {
    seq: AtomicU64,
}

impl IdAssigner {
    pub fn new() -> Self {
        // Random start point scatters tokens across runs; clearing the top
        // bits leaves 2^52 increments before the counter could wrap.
        Self {
            seq: AtomicU64::new(rand::random::<u64>() >> 12),
        }
    }

    /// Mint a fresh id for `source`.
    pub fn next_id(&self, source: SourceId) -> ListingId {
        let token = self.seq.fetch_add(1, Ordering::Relaxed);
        format!(
            "{}_{}_{}",
            source.prefix(),
            Utc::now().timestamp_millis(),
            to_base36(token)
        )
    }

    /// Stamp a normalized listing with its id.
    pub fn assign(&self, mut listing: Listing) -> Listing {
        listing.id = self.next_id(listing.source);
        listing
    }
}

impl Default for IdAssigner {
    fn default() -> Self {
        Self::new()
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = String::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize] as char);
        n /= 36;
    }
    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_base36_digits() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(36 * 36 + 1), "101");
    }

    #[test]
    fn test_id_shape() {
        let assigner = IdAssigner::new();
        let id = assigner.next_id(SourceId::Hellowork);

        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "hw");
        assert!(parts[1].parse::<i64>().unwrap() > 0);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_prefix_tracks_source() {
        let assigner = IdAssigner::new();
        assert!(assigner.next_id(SourceId::Indeed).starts_with("indeed_"));
        assert!(assigner.next_id(SourceId::Alternance).starts_with("alt_"));
        assert!(assigner.next_id(SourceId::Linkedin).starts_with("linkedin_"));
    }

    #[test]
    fn test_ten_thousand_ids_are_distinct() {
        let assigner = IdAssigner::new();
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(assigner.next_id(SourceId::Wttj)));
        }
    }

    #[test]
    fn test_distinct_across_threads() {
        let assigner = Arc::new(IdAssigner::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let assigner = Arc::clone(&assigner);
            handles.push(std::thread::spawn(move || {
                (0..1000)
                    .map(|_| assigner.next_id(SourceId::Hellowork))
                    .collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 4000);
    }
}
