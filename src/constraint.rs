//! The core fold: for any `(channel, dir)`, compute the effective
//! `[min, max]` msat window by folding graph capacity, layer constraints,
//! and reservations (§4.7). This is the only place that answers "what is
//! the usable liquidity here, right now".

use crate::amount::Msat;
use crate::capacity_cache::CapacityCache;
use crate::graph::{ChannelIndex, GraphView};
use crate::ids::ScidDir;
use crate::layer::{ConstraintKind, Layer};
use crate::reserve::ReservationTable;

pub struct ConstraintEngine;

impl ConstraintEngine {
    /// `layers` must be in caller-supplied order: the fold is
    /// commutative in its result (max of mins, min of maxes) but the
    /// source traverses layers in order and this preserves that
    /// contract for any future tie-breaking behavior layered on top.
    pub fn effective_bounds(
        graph: &impl GraphView,
        cache: &CapacityCache,
        layers: &[&Layer],
        reservations: &ReservationTable,
        idx: ChannelIndex,
        scidd: ScidDir,
    ) -> (Msat, Msat) {
        let mut min = Msat::ZERO;
        let mut max = Msat::MAX;

        // Fast path: a cached capacity answers the question outright.
        if let Some(fp16) = cache.get(idx) {
            max = Msat(fp16.decompress().saturating_mul(1000));
        } else {
            // Layer fold.
            for layer in layers {
                if let Some(c) = layer.find_constraint(scidd, ConstraintKind::Min) {
                    if c.limit_msat > min {
                        min = c.limit_msat;
                    }
                }
                if let Some(c) = layer.find_constraint(scidd, ConstraintKind::Max) {
                    if c.limit_msat < max {
                        max = c.limit_msat;
                    }
                }
            }

            // Capacity fallback.
            if max == Msat::MAX {
                match graph.capacity_sat(idx) {
                    Some(sat) => max = Msat::from_sat(sat).unwrap_or(Msat::MAX),
                    None => {
                        log::warn!(
                            "channel at index {} has no capacity and no MAX constraint; leaving unbounded",
                            idx
                        );
                    }
                }
            }
        }

        // Reservation subtraction. May legally produce `min > max`,
        // meaning this edge cannot carry any more right now.
        if let Some(reservation) = reservations.find(scidd) {
            let (new_min, _) = min.saturating_sub(reservation.amount_msat);
            let (new_max, _) = max.saturating_sub(reservation.amount_msat);
            min = new_min;
            max = new_max;
        }

        (min, max)
    }
}
