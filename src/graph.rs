//! Read-only view of the current public channel graph ("gossmap"), plus
//! the in-memory stand-in implementation used in place of the gossip-store
//! loader (out of scope for this crate — see SPEC_FULL.md §1).
//!
//! The trait is the capability set the rest of the oracle depends on:
//! `refresh`, `channel_index`, `capacity_sat`, `policy`, iteration, and
//! applying/removing an overlay patch. A real implementation backed by a
//! gossip-store snapshot is a drop-in replacement.

use std::collections::HashMap;

use crate::amount::Msat;
use crate::ids::{Direction, NodeId, Scid};
use crate::overlay::LocalMods;

pub type ChannelIndex = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelPolicy {
    pub enabled: bool,
    pub base_fee_msat: u64,
    pub prop_fee_ppm: u32,
    pub cltv_delay: u16,
    pub htlc_min_msat: Msat,
    pub htlc_max_msat: Msat,
}

impl ChannelPolicy {
    pub fn disabled() -> ChannelPolicy {
        ChannelPolicy {
            enabled: false,
            base_fee_msat: 0,
            prop_fee_ppm: 0,
            cltv_delay: 0,
            htlc_min_msat: Msat::ZERO,
            htlc_max_msat: Msat::MAX,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Channel {
    pub scid: Scid,
    pub node_a: NodeId,
    pub node_b: NodeId,
    /// On-chain capacity in satoshis. `None` only for a public channel
    /// whose capacity couldn't be determined — an integrity warning, not
    /// an error (§4.7 step 4); local channels must always declare one.
    pub capacity_sat: Option<u64>,
    /// Indexed by `Direction::as_u8()`: `[0]` is `node_a -> node_b`.
    pub policy: [ChannelPolicy; 2],
}

impl Channel {
    pub fn endpoints(&self, dir: Direction) -> (NodeId, NodeId) {
        if dir == Direction::ZERO {
            (self.node_a.clone(), self.node_b.clone())
        } else {
            (self.node_b.clone(), self.node_a.clone())
        }
    }

    pub fn touches(&self, node: &NodeId) -> bool {
        &self.node_a == node || &self.node_b == node
    }
}

pub trait GraphView {
    /// Refresh the underlying snapshot. Returns true iff it advanced.
    fn refresh(&mut self) -> bool;

    /// One past the highest channel index currently present. Called
    /// right after `refresh()` (before any overlay patch is applied) to
    /// size the shared capacity cache.
    fn max_index(&self) -> usize;

    fn channel_index(&self, scid: Scid) -> Option<ChannelIndex>;

    fn channel_at(&self, idx: ChannelIndex) -> Option<&Channel>;

    fn channels(&self) -> Box<dyn Iterator<Item = (ChannelIndex, &Channel)> + '_>;

    fn capacity_sat(&self, idx: ChannelIndex) -> Option<u64> {
        self.channel_at(idx).and_then(|c| c.capacity_sat)
    }

    fn policy(&self, idx: ChannelIndex, dir: Direction) -> Option<ChannelPolicy> {
        self.channel_at(idx).map(|c| c.policy[dir.as_u8() as usize])
    }

    /// Apply an overlay patch: inject local channels and mark channels
    /// touching a disabled node as unusable. Must be paired with
    /// `remove_localmods` on every exit path.
    fn apply_localmods(&mut self, mods: &mut LocalMods);

    /// Undo exactly what `apply_localmods` did, restoring the graph
    /// observable before the patch was applied.
    fn remove_localmods(&mut self, mods: &mut LocalMods);
}

/// In-memory graph. Stands in for a gossmap snapshot: `base` holds the
/// channels as of the last `refresh()`; overlay channels injected by a
/// patch are appended past `base.len()` and truncated away on removal.
pub struct MemGraph {
    channels: Vec<Channel>,
    index: HashMap<Scid, ChannelIndex>,
    base_len: usize,
    pending: Option<Vec<Channel>>,
}

impl MemGraph {
    pub fn new(channels: Vec<Channel>) -> MemGraph {
        let mut g = MemGraph {
            channels: Vec::new(),
            index: HashMap::new(),
            base_len: 0,
            pending: Some(channels),
        };
        g.refresh();
        g
    }

    /// Test/host hook: stage a new snapshot to be picked up by the next
    /// `refresh()` call, mirroring a fresh gossip-store read.
    pub fn stage_snapshot(&mut self, channels: Vec<Channel>) {
        self.pending = Some(channels);
    }

    pub fn find_channel(&self, scid: Scid) -> Option<&Channel> {
        self.index.get(&scid).and_then(|&idx| self.channels.get(idx))
    }
}

impl GraphView for MemGraph {
    fn refresh(&mut self) -> bool {
        let channels = match self.pending.take() {
            Some(c) => c,
            None => return false,
        };
        self.channels = channels;
        self.index = self
            .channels
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.scid, idx))
            .collect();
        self.base_len = self.channels.len();
        true
    }

    fn max_index(&self) -> usize {
        self.channels.len()
    }

    fn channel_index(&self, scid: Scid) -> Option<ChannelIndex> {
        self.index.get(&scid).copied()
    }

    fn channel_at(&self, idx: ChannelIndex) -> Option<&Channel> {
        self.channels.get(idx)
    }

    fn channels(&self) -> Box<dyn Iterator<Item = (ChannelIndex, &Channel)> + '_> {
        Box::new(self.channels.iter().enumerate())
    }

    fn apply_localmods(&mut self, mods: &mut LocalMods) {
        debug_assert!(mods.undo.is_none(), "localmods already applied");

        let overlay_start = self.channels.len();
        let mut added_scids = Vec::new();
        for local_channel in &mods.local_channels {
            if self.index.contains_key(&local_channel.scid) {
                log::warn!(
                    "local channel {:?} collides with an existing channel; ignoring",
                    local_channel.scid
                );
                continue;
            }
            let idx = self.channels.len();
            self.index.insert(local_channel.scid, idx);
            self.channels.push(local_channel.clone());
            added_scids.push(local_channel.scid);
        }

        let mut disabled = Vec::new();
        if !mods.disabled_nodes.is_empty() {
            for (idx, channel) in self.channels.iter_mut().enumerate() {
                let touched = mods
                    .disabled_nodes
                    .iter()
                    .any(|node| channel.touches(node));
                if !touched {
                    continue;
                }
                let prev = channel.policy;
                if prev[0].enabled || prev[1].enabled {
                    channel.policy[0].enabled = false;
                    channel.policy[1].enabled = false;
                    disabled.push((idx, prev));
                }
            }
        }

        mods.undo = Some(crate::overlay::LocalModsUndo {
            overlay_start,
            added_scids,
            disabled,
        });
    }

    fn remove_localmods(&mut self, mods: &mut LocalMods) {
        let undo = match mods.undo.take() {
            Some(undo) => undo,
            None => return,
        };

        for (idx, prev_policy) in undo.disabled {
            if let Some(channel) = self.channels.get_mut(idx) {
                channel.policy = prev_policy;
            }
        }

        for scid in &undo.added_scids {
            self.index.remove(scid);
        }
        self.channels.truncate(undo.overlay_start);
    }
}
