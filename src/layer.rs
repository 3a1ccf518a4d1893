//! A named, mutable overlay carrying local-channel declarations,
//! timestamped liquidity constraints, and disabled nodes (§3, §4.4).

use std::collections::{HashMap, HashSet};

use crate::amount::Msat;
use crate::capacity_cache::CapacityCache;
use crate::graph::{Channel, GraphView};
use crate::ids::{NodeId, Scid, ScidDir};
use crate::overlay::LocalMods;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Min,
    Max,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Constraint {
    pub scidd: ScidDir,
    pub kind: ConstraintKind,
    pub limit_msat: Msat,
    pub timestamp_sec: u64,
}

pub struct Layer {
    name: String,
    local_channels: HashMap<Scid, Channel>,
    constraints: HashMap<(ScidDir, ConstraintKind), Constraint>,
    disabled_nodes: HashSet<NodeId>,
}

impl Layer {
    pub fn new(name: String) -> Layer {
        Layer {
            name,
            local_channels: HashMap::new(),
            constraints: HashMap::new(),
            disabled_nodes: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert or replace a local channel declaration. Idempotency
    /// (endpoints/capacity must match on a second declaration for the
    /// same scid) is enforced by the caller via `check_local_channel`
    /// before calling this.
    pub fn update_local_channel(&mut self, channel: Channel) {
        self.local_channels.insert(channel.scid, channel);
    }

    pub fn find_local_channel(&self, scid: Scid) -> Option<&Channel> {
        self.local_channels.get(&scid)
    }

    pub fn local_channels(&self) -> impl Iterator<Item = &Channel> {
        self.local_channels.values()
    }

    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.values()
    }

    /// Structural equality check used by the command surface's
    /// create-channel idempotency guard: a second declaration for the
    /// same scid must agree on endpoints and capacity.
    pub fn check_local_channel(
        &self,
        scid: Scid,
        node_a: &NodeId,
        node_b: &NodeId,
        capacity_sat: u64,
    ) -> bool {
        match self.find_local_channel(scid) {
            None => true,
            Some(existing) => {
                existing.node_a == *node_a
                    && existing.node_b == *node_b
                    && existing.capacity_sat == Some(capacity_sat)
            }
        }
    }

    /// Insert or replace the (kind) constraint for this scidd. A later
    /// update with the same kind replaces rather than merges; the
    /// timestamp refreshes regardless.
    pub fn update_constraint(
        &mut self,
        scidd: ScidDir,
        kind: ConstraintKind,
        timestamp_sec: u64,
        limit_msat: Msat,
    ) -> &Constraint {
        let constraint = Constraint {
            scidd,
            kind,
            limit_msat,
            timestamp_sec,
        };
        self.constraints.insert((scidd, kind), constraint);
        self.constraints.get(&(scidd, kind)).unwrap()
    }

    pub fn find_constraint(&self, scidd: ScidDir, kind: ConstraintKind) -> Option<&Constraint> {
        self.constraints.get(&(scidd, kind))
    }

    pub fn add_disabled_node(&mut self, node: NodeId) {
        self.disabled_nodes.insert(node);
    }

    pub fn disabled_nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.disabled_nodes.iter()
    }

    /// Drop every constraint older than `cutoff_ts`. Returns the count
    /// removed.
    pub fn trim_constraints(&mut self, cutoff_ts: u64) -> usize {
        let before = self.constraints.len();
        self.constraints
            .retain(|_, constraint| constraint.timestamp_sec >= cutoff_ts);
        before - self.constraints.len()
    }

    /// Register this layer's effects into the query's overlay patch.
    pub fn add_localmods(&self, mods: &mut LocalMods) {
        for channel in self.local_channels.values() {
            mods.local_channels.push(channel.clone());
        }
        for node in &self.disabled_nodes {
            mods.disabled_nodes.insert(node.clone());
        }
    }

    /// Zero the cache entry for every channel this layer asserts a
    /// constraint or local-channel declaration against, so the
    /// `ConstraintEngine` fast path falls through to the slow path for
    /// them.
    pub fn clear_overridden_capacities(&self, graph: &impl GraphView, cache: &mut CapacityCache) {
        let scids = self
            .constraints
            .keys()
            .map(|(scidd, _)| scidd.scid)
            .chain(self.local_channels.keys().copied());
        for scid in scids {
            if let Some(idx) = graph.channel_index(scid) {
                cache.clear(idx);
            }
        }
    }
}
