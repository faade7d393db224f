// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 the dv-router authors

//! Neighbor table: directly-heard peers on the broadcast domain.
//!
//! A neighbor is created on its first HELLO and evicted the first
//! `remove_stale` sweep after it has gone quiet for longer than the
//! liveness timeout. There is no explicit "stale but present" state.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A directly-heard peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborEntry {
    pub ip: String,
    pub last_seq: u16,
    pub last_heard: Instant,
}

/// Set of directly reachable neighbors, keyed by IP.
#[derive(Debug)]
pub struct NeighborTable {
    my_ip: String,
    neighbors: HashMap<String, NeighborEntry>,
    next_seq: u16,
}

impl NeighborTable {
    pub fn new(my_ip: String) -> Self {
        Self {
            my_ip,
            neighbors: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Build the next HELLO beacon for this node and advance the
    /// sequence counter. Transmission is the reactor's job; this only
    /// touches in-memory state.
    pub fn next_hello(&mut self) -> (String, u16) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        (self.my_ip.clone(), seq)
    }

    /// Record a HELLO from `sender`. No-op for our own beacons (heard
    /// via broadcast loopback). Returns `true` if this is a newly
    /// discovered neighbor.
    pub fn process_hello(&mut self, sender: &str, seq: u16, now: Instant) -> bool {
        if sender == self.my_ip {
            return false;
        }
        match self.neighbors.get_mut(sender) {
            Some(entry) => {
                entry.last_heard = now;
                if seq_gt(seq, entry.last_seq) {
                    entry.last_seq = seq;
                }
                false
            }
            None => {
                self.neighbors.insert(
                    sender.to_string(),
                    NeighborEntry {
                        ip: sender.to_string(),
                        last_seq: seq,
                        last_heard: now,
                    },
                );
                true
            }
        }
    }

    /// Evict neighbors not heard from within `timeout`. Returns the IPs
    /// of evicted neighbors so the distance table can garbage-collect
    /// routes learned through them.
    pub fn remove_stale(&mut self, timeout: Duration, now: Instant) -> Vec<String> {
        let stale: Vec<String> = self
            .neighbors
            .values()
            .filter(|n| now.duration_since(n.last_heard) > timeout)
            .map(|n| n.ip.clone())
            .collect();
        for ip in &stale {
            self.neighbors.remove(ip);
        }
        stale
    }

    pub fn contains(&self, ip: &str) -> bool {
        self.neighbors.contains_key(ip)
    }

    pub fn get(&self, ip: &str) -> Option<&NeighborEntry> {
        self.neighbors.get(ip)
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NeighborEntry> {
        self.neighbors.values()
    }
}

/// Serial-number comparison (RFC 1982 style, halved for `u16`): is `a`
/// strictly newer than `b`? Avoids wedging `last_seq` once the 16-bit
/// counter wraps after ~65k HELLOs.
fn seq_gt(a: u16, b: u16) -> bool {
    (a.wrapping_sub(b) as i16) > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> NeighborTable {
        NeighborTable::new("10.0.0.1".to_string())
    }

    #[test]
    fn test_hello_discovers_new_neighbor() {
        let mut t = table();
        let now = Instant::now();
        assert!(t.process_hello("10.0.0.2", 0, now));
        assert_eq!(t.get("10.0.0.2").unwrap().last_seq, 0);
    }

    #[test]
    fn test_second_hello_refreshes_and_advances_seq() {
        let mut t = table();
        let t0 = Instant::now();
        t.process_hello("10.0.0.2", 0, t0);
        let t1 = t0 + Duration::from_secs(1);
        let is_new = t.process_hello("10.0.0.2", 7, t1);
        assert!(!is_new);
        assert_eq!(t.get("10.0.0.2").unwrap().last_seq, 7);
        assert_eq!(t.get("10.0.0.2").unwrap().last_heard, t1);
    }

    #[test]
    fn test_lower_seq_does_not_regress_but_still_refreshes_liveness() {
        let mut t = table();
        let t0 = Instant::now();
        t.process_hello("10.0.0.2", 10, t0);
        let t1 = t0 + Duration::from_secs(1);
        t.process_hello("10.0.0.2", 3, t1);
        let entry = t.get("10.0.0.2").unwrap();
        assert_eq!(entry.last_seq, 10);
        assert_eq!(entry.last_heard, t1);
    }

    #[test]
    fn test_self_hello_is_ignored() {
        let mut t = table();
        let is_new = t.process_hello("10.0.0.1", 0, Instant::now());
        assert!(!is_new);
        assert!(t.is_empty());
    }

    #[test]
    fn test_remove_stale_evicts_after_timeout() {
        let mut t = table();
        let t0 = Instant::now();
        t.process_hello("10.0.0.2", 0, t0);
        let later = t0 + Duration::from_secs(11);
        let evicted = t.remove_stale(Duration::from_secs(10), later);
        assert_eq!(evicted, vec!["10.0.0.2".to_string()]);
        assert!(t.is_empty());
    }

    #[test]
    fn test_remove_stale_keeps_entries_at_exact_boundary() {
        let mut t = table();
        let t0 = Instant::now();
        t.process_hello("10.0.0.2", 0, t0);
        let boundary = t0 + Duration::from_secs(10);
        let evicted = t.remove_stale(Duration::from_secs(10), boundary);
        assert!(evicted.is_empty());
        assert!(t.contains("10.0.0.2"));
    }

    #[test]
    fn test_next_hello_builds_and_increments_sequence() {
        let mut t = table();
        let (ip, seq0) = t.next_hello();
        assert_eq!(ip, "10.0.0.1");
        assert_eq!(seq0, 0);
        let (_, seq1) = t.next_hello();
        assert_eq!(seq1, 1);
    }

    #[test]
    fn test_sequence_counter_wraps_without_panicking() {
        let mut t = table();
        t.next_seq = u16::MAX;
        let (_, seq) = t.next_hello();
        assert_eq!(seq, u16::MAX);
        let (_, seq2) = t.next_hello();
        assert_eq!(seq2, 0);
    }

    #[test]
    fn test_seq_gt_handles_wraparound() {
        assert!(seq_gt(1, 0));
        assert!(!seq_gt(0, 1));
        assert!(seq_gt(0, u16::MAX));
        assert!(!seq_gt(u16::MAX, 0));
    }

    #[test]
    fn test_neighbor_ips_are_unique() {
        let mut t = table();
        let now = Instant::now();
        t.process_hello("10.0.0.2", 0, now);
        t.process_hello("10.0.0.2", 1, now);
        assert_eq!(t.len(), 1);
    }
}
