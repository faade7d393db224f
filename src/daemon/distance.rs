// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 the dv-router authors

//! Distance table: a single-relaxation-step Bellman-Ford over routes
//! learned from neighbors' distance vectors.
//!
//! A route is keyed by `(dest, via)`; the best distance to a
//! destination is the minimum over all routes to it. No split-horizon,
//! poisoned-reverse, or count-to-infinity mitigation is applied here —
//! that is out of scope for this daemon.

use super::codec::Message;
use std::collections::HashMap;

/// Distances at or above this sentinel are treated as "no route" and
/// never appear in an emitted distance vector.
pub const NO_ROUTE: u32 = 1_000_000;

/// Collection of `(dest, via) -> distance` routes plus the shared
/// dirty flag that gates DV broadcast.
#[derive(Debug)]
pub struct DistanceTable {
    my_ip: String,
    routes: HashMap<(String, String), u32>,
    updated_dv: bool,
}

impl DistanceTable {
    pub fn new(my_ip: String) -> Self {
        Self {
            my_ip,
            routes: HashMap::new(),
            updated_dv: false,
        }
    }

    /// Ingest a raw DV datagram. Returns `true` if any route changed.
    ///
    /// Echoes of our own DV are discarded outright. Tuples whose `dest`
    /// is our own IP are dropped rather than stored (we never route to
    /// ourselves). An existing `(dest, via)` route is overwritten even
    /// when the new distance is worse — the neighbor's own estimate is
    /// authoritative for that destination-via-neighbor pair.
    pub fn process_distance_vector(&mut self, raw: &str) -> bool {
        let (sender, pairs) = match Message::parse(raw) {
            Some(Message::Dv { sender, pairs }) => (sender, pairs),
            _ => return false,
        };
        if sender == self.my_ip {
            return false;
        }

        let mut changed = false;
        for (dest, dist) in pairs {
            if dest == self.my_ip {
                continue;
            }
            let new_dist = dist.saturating_add(1);
            let key = (dest, sender.clone());
            match self.routes.get(&key) {
                Some(&existing) if existing == new_dist => {}
                _ => {
                    self.routes.insert(key, new_dist);
                    changed = true;
                }
            }
        }

        if changed {
            self.dv_update();
        }
        changed
    }

    /// Remove every route whose `via` is `neighbor_ip`. Returns `true`
    /// if any route was removed and marks the table dirty in that case.
    pub fn remove_routes_via(&mut self, neighbor_ip: &str) -> bool {
        let before = self.routes.len();
        self.routes.retain(|(_, via), _| via != neighbor_ip);
        let changed = self.routes.len() != before;
        if changed {
            self.dv_update();
        }
        changed
    }

    /// Best distance per destination, deduplicated, in lexicographic
    /// destination order for a stable, testable emission order.
    fn best_distances(&self) -> Vec<(String, u32)> {
        let mut best: HashMap<&str, u32> = HashMap::new();
        for ((dest, _via), &dist) in &self.routes {
            best.entry(dest.as_str())
                .and_modify(|d| *d = (*d).min(dist))
                .or_insert(dist);
        }
        let mut out: Vec<(String, u32)> = best
            .into_iter()
            .filter(|&(_, dist)| dist < NO_ROUTE)
            .map(|(dest, dist)| (dest.to_string(), dist))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Serialize this node's distance vector for broadcast.
    pub fn get_distance_vector(&self) -> String {
        let pairs = self.best_distances();
        Message::encode_dv(&self.my_ip, pairs.iter().map(|(d, n)| (d.as_str(), *n)))
    }

    pub fn is_dirty(&self) -> bool {
        self.updated_dv
    }

    pub fn dv_update(&mut self) {
        self.updated_dv = true;
    }

    pub fn dv_sent(&mut self) {
        self.updated_dv = false;
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn get_route(&self, dest: &str, via: &str) -> Option<u32> {
        self.routes.get(&(dest.to_string(), via.to_string())).copied()
    }
}
