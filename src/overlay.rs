//! The overlay patch: the transient, reversible modification a
//! `RouteQueryContext` applies to the graph for the duration of one query
//! (§4.6). `LocalMods` is built by folding every selected layer's
//! local-channel declarations and disabled-node effects; applying it
//! mutates the graph, and removing it restores the graph exactly.

use std::collections::HashSet;

use crate::graph::{Channel, ChannelPolicy};
use crate::ids::{NodeId, Scid};
use crate::layer::Layer;

/// Undo information recorded by `GraphView::apply_localmods`, consumed by
/// `remove_localmods`. Kept inside `LocalMods` itself so a single value
/// threads through both calls, mirroring the real gossmap's
/// apply/remove-localmods pairing.
pub struct LocalModsUndo {
    pub overlay_start: usize,
    pub added_scids: Vec<Scid>,
    pub disabled: Vec<(usize, [ChannelPolicy; 2])>,
}

pub struct LocalMods {
    pub local_channels: Vec<Channel>,
    pub disabled_nodes: HashSet<NodeId>,
    pub undo: Option<LocalModsUndo>,
}

impl LocalMods {
    pub fn new() -> LocalMods {
        LocalMods {
            local_channels: Vec::new(),
            disabled_nodes: HashSet::new(),
            undo: None,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.undo.is_some()
    }
}

impl Default for LocalMods {
    fn default() -> Self {
        LocalMods::new()
    }
}

/// Folds a caller-supplied, ordered list of layers into one `LocalMods`
/// patch. Order matters only for the constraint fold in `ConstraintEngine`;
/// local-channel/disabled-node registration here is order-independent.
pub struct OverlayCompositor;

impl OverlayCompositor {
    pub fn compose<'a>(layers: impl IntoIterator<Item = &'a Layer>) -> LocalMods {
        let mut mods = LocalMods::new();
        for layer in layers {
            layer.add_localmods(&mut mods);
        }
        mods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{channel, node};
    use crate::ids::ScidDir;

    #[test]
    fn compose_collects_local_channels_and_disabled_nodes() {
        let mut layer_a = Layer::new("a".to_string());
        layer_a.update_local_channel(channel(10, 1, 2, 1_000));
        layer_a.add_disabled_node(node(5));

        let mut layer_b = Layer::new("b".to_string());
        layer_b.add_disabled_node(node(6));

        let mods = OverlayCompositor::compose(vec![&layer_a, &layer_b]);
        assert_eq!(mods.local_channels.len(), 1);
        assert!(mods.disabled_nodes.contains(&node(5)));
        assert!(mods.disabled_nodes.contains(&node(6)));
        assert!(!mods.is_applied());
        let _ = ScidDir::new(mods.local_channels[0].scid, crate::ids::Direction::ZERO);
    }
}
