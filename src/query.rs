//! Per-query scoped object binding a refreshed graph snapshot, its
//! overlay, the selected layers, and a private copy of the capacity
//! cache (§4.8). Construction performs the six numbered steps; teardown
//! (via `Drop`) removes the overlay patch on every exit path, including
//! panics and early returns after the patch was applied.

use crate::amount::Msat;
use crate::capacity_cache::CapacityCache;
use crate::constraint::ConstraintEngine;
use crate::graph::{Channel, ChannelIndex, GraphView};
use crate::ids::ScidDir;
use crate::layer::Layer;
use crate::layer_store::LayerStore;
use crate::overlay::{LocalMods, OverlayCompositor};
use crate::reserve::ReservationTable;

pub struct RouteQueryContext<'a, G: GraphView> {
    graph: &'a mut G,
    cache: CapacityCache,
    layers: Vec<&'a Layer>,
    reservations: &'a ReservationTable,
    patch: LocalMods,
}

impl<'a, G: GraphView> RouteQueryContext<'a, G> {
    pub fn new(
        graph: &'a mut G,
        shared_cache: &mut CapacityCache,
        layer_store: &'a LayerStore,
        selected_layer_names: &[String],
        reservations: &'a ReservationTable,
    ) -> RouteQueryContext<'a, G> {
        // 1. Refresh; rebuild the shared cache in full if the snapshot advanced.
        if graph.refresh() {
            *shared_cache = CapacityCache::build(graph);
        }

        // 2. Clone the shared cache into this context.
        let mut cache = shared_cache.clone();

        // 3. Materialise the overlay patch. Names that don't exist are skipped.
        let layers: Vec<&Layer> = selected_layer_names
            .iter()
            .filter_map(|name| layer_store.find(name))
            .collect();
        let mut patch = OverlayCompositor::compose(layers.iter().copied());

        // 4. Clear cache entries each selected layer would override.
        for layer in &layers {
            layer.clear_overridden_capacities(graph, &mut cache);
        }

        // 5. Clear cache entries for reserved scidds.
        reservations.clear_cache_entries(graph, &mut cache);

        // 6. Apply the overlay patch.
        graph.apply_localmods(&mut patch);

        RouteQueryContext {
            graph,
            cache,
            layers,
            reservations,
            patch,
        }
    }

    pub fn channel_index(&self, scid: crate::ids::Scid) -> Option<ChannelIndex> {
        self.graph.channel_index(scid)
    }

    pub fn channel_at(&self, idx: ChannelIndex) -> Option<&Channel> {
        self.graph.channel_at(idx)
    }

    pub fn channels(&self) -> Box<dyn Iterator<Item = (ChannelIndex, &Channel)> + '_> {
        self.graph.channels()
    }

    /// Effective `[min, max]` liquidity window for `scidd`, whose channel
    /// sits at `idx` in the current (post-overlay) graph.
    pub fn effective_bounds(&self, idx: ChannelIndex, scidd: ScidDir) -> (Msat, Msat) {
        ConstraintEngine::effective_bounds(
            &*self.graph,
            &self.cache,
            &self.layers,
            self.reservations,
            idx,
            scidd,
        )
    }
}

impl<'a, G: GraphView> Drop for RouteQueryContext<'a, G> {
    fn drop(&mut self) {
        self.graph.remove_localmods(&mut self.patch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{channel, node};
    use crate::graph::MemGraph;
    use crate::ids::{Direction, Scid};

    #[test]
    fn overlay_is_balanced_across_a_query() {
        let mut graph = MemGraph::new(vec![channel(1, 1, 2, 1_000)]);
        let before: Vec<_> = graph.channels().map(|(_, c)| c.clone()).collect();

        let mut cache = CapacityCache::build(&graph);
        let mut layer_store = LayerStore::new();
        layer_store
            .get_or_create("l")
            .update_local_channel(channel(2, 2, 3, 500));
        let reservations = ReservationTable::new();

        {
            let ctx = RouteQueryContext::new(
                &mut graph,
                &mut cache,
                &layer_store,
                &["l".to_string()],
                &reservations,
            );
            assert!(ctx.channel_index(Scid(2)).is_some());
        }

        let after: Vec<_> = graph.channels().map(|(_, c)| c.clone()).collect();
        assert_eq!(before.len(), after.len());
        assert!(graph.channel_index(Scid(2)).is_none());
    }

    #[test]
    fn unknown_layer_names_are_silently_skipped() {
        let mut graph = MemGraph::new(vec![channel(1, 1, 2, 1_000)]);
        let mut cache = CapacityCache::build(&graph);
        let layer_store = LayerStore::new();
        let reservations = ReservationTable::new();

        let ctx = RouteQueryContext::new(
            &mut graph,
            &mut cache,
            &layer_store,
            &["does-not-exist".to_string()],
            &reservations,
        );
        let idx = ctx.channel_index(Scid(1)).unwrap();
        let (min, max) = ctx.effective_bounds(idx, ScidDir::new(Scid(1), Direction::ZERO));
        assert_eq!(min, Msat::ZERO);
        assert_eq!(max, Msat(1_000_000));
    }

    #[test]
    fn disabled_node_closure_removes_adjacent_channels_from_use() {
        let mut graph = MemGraph::new(vec![
            channel(1, 1, 2, 1_000),
            channel(2, 2, 3, 1_000),
        ]);
        let mut cache = CapacityCache::build(&graph);
        let mut layer_store = LayerStore::new();
        layer_store.get_or_create("l").add_disabled_node(node(2));
        let reservations = ReservationTable::new();

        let ctx = RouteQueryContext::new(
            &mut graph,
            &mut cache,
            &layer_store,
            &["l".to_string()],
            &reservations,
        );
        let idx = ctx.channel_index(Scid(1)).unwrap();
        assert!(!ctx.channel_at(idx).unwrap().policy[0].enabled);
    }
}
