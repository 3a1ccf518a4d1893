//! Set of outstanding liquidity reservations keyed by `(scid, dir)`
//! (§4.3). Multiple reservations on the same scidd accumulate into one
//! logical record; a record whose amount and htlc count both reach zero
//! is removed.

use std::collections::HashMap;

use crate::amount::Msat;
use crate::capacity_cache::CapacityCache;
use crate::graph::GraphView;
use crate::ids::ScidDir;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reservation {
    pub scidd: ScidDir,
    pub amount_msat: Msat,
    pub num_htlcs: u32,
}

#[derive(Default)]
pub struct ReservationTable {
    table: HashMap<ScidDir, Reservation>,
}

impl ReservationTable {
    pub fn new() -> ReservationTable {
        ReservationTable::default()
    }

    pub fn find(&self, scidd: ScidDir) -> Option<&Reservation> {
        self.table.get(&scidd)
    }

    /// Attempt to add each `(scidd, amount)` entry in order. On the first
    /// entry whose summed amount would overflow `u64`, stops and returns
    /// that index; entries before it stay applied. Returns `path.len()`
    /// on full success.
    pub fn add(&mut self, path: &[(ScidDir, Msat)]) -> usize {
        for (i, &(scidd, amount)) in path.iter().enumerate() {
            let current = self.table.get(&scidd).map(|r| r.amount_msat.0).unwrap_or(0);
            let new_amount = match current.checked_add(amount.0) {
                Some(v) => v,
                None => return i,
            };
            let entry = self.table.entry(scidd).or_insert(Reservation {
                scidd,
                amount_msat: Msat::ZERO,
                num_htlcs: 0,
            });
            entry.amount_msat = Msat(new_amount);
            entry.num_htlcs += 1;
        }
        path.len()
    }

    /// Symmetric to `add`: stops at the first entry whose removal would
    /// underflow the recorded amount.
    pub fn remove(&mut self, path: &[(ScidDir, Msat)]) -> usize {
        for (i, &(scidd, amount)) in path.iter().enumerate() {
            let current = match self.table.get(&scidd) {
                Some(r) => *r,
                None => {
                    if amount.0 == 0 {
                        continue;
                    }
                    return i;
                }
            };
            let new_amount = match current.amount_msat.0.checked_sub(amount.0) {
                Some(v) => v,
                None => return i,
            };
            let new_htlcs = current.num_htlcs.saturating_sub(1);
            if new_amount == 0 && new_htlcs == 0 {
                self.table.remove(&scidd);
            } else {
                self.table.insert(
                    scidd,
                    Reservation {
                        scidd,
                        amount_msat: Msat(new_amount),
                        num_htlcs: new_htlcs,
                    },
                );
            }
        }
        path.len()
    }

    /// Zero the cache entry for every reserved scidd whose channel exists
    /// in `graph`, so `ConstraintEngine` always takes the slow path for
    /// edges with outstanding reservations.
    pub fn clear_cache_entries(&self, graph: &impl GraphView, cache: &mut CapacityCache) {
        for scidd in self.table.keys() {
            if let Some(idx) = graph.channel_index(scidd.scid) {
                cache.clear(idx);
            }
        }
    }
}
