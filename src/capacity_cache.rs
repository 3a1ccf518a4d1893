//! Dense per-channel-index array of compressed capacity bounds (§4.2).
//! Rebuilt in full whenever `GraphView::refresh()` reports the snapshot
//! advanced; cloned once per query so per-query clearing never disturbs
//! the shared copy.

use crate::amount::Fp16;
use crate::graph::{ChannelIndex, GraphView};

#[derive(Clone)]
pub struct CapacityCache {
    entries: Vec<Option<Fp16>>,
}

impl CapacityCache {
    pub fn build(graph: &impl GraphView) -> CapacityCache {
        let mut entries = vec![None; graph.max_index()];
        for (idx, channel) in graph.channels() {
            match channel.capacity_sat {
                Some(sat) => entries[idx] = Some(Fp16::compress(sat)),
                None => log::warn!("channel {:?} has no capacity; leaving cache entry empty", channel.scid),
            }
        }
        CapacityCache { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `None` is the sentinel meaning "no fast answer" — the caller must
    /// fall through to the slow path. This is represented with an
    /// `Option` rather than overloading the value `0`, per the spec's own
    /// recommendation (§9, cache-zero ambiguity).
    pub fn get(&self, idx: ChannelIndex) -> Option<Fp16> {
        self.entries.get(idx).copied().flatten()
    }

    pub fn clear(&mut self, idx: ChannelIndex) {
        if let Some(slot) = self.entries.get_mut(idx) {
            *slot = None;
        }
    }
}
