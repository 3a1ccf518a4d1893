//! Top-level owner of the graph, shared capacity cache, layer store, and
//! reservation table (§2 C1, C2, C4, C5, C3). `CommandSurface` is the only
//! thing that touches this directly; `query` is the sole entry point for
//! building a `RouteQueryContext`.

use crate::capacity_cache::CapacityCache;
use crate::graph::GraphView;
use crate::layer_store::LayerStore;
use crate::query::RouteQueryContext;
use crate::reserve::ReservationTable;

pub struct Oracle<G: GraphView> {
    graph: G,
    cache: CapacityCache,
    layers: LayerStore,
    reservations: ReservationTable,
}

impl<G: GraphView> Oracle<G> {
    /// Takes ownership of a graph view and performs the initial refresh to
    /// size the shared capacity cache.
    pub fn new(mut graph: G) -> Oracle<G> {
        graph.refresh();
        let cache = CapacityCache::build(&graph);
        Oracle {
            graph,
            cache,
            layers: LayerStore::new(),
            reservations: ReservationTable::new(),
        }
    }

    pub fn query(&mut self, selected_layer_names: &[String]) -> RouteQueryContext<'_, G> {
        RouteQueryContext::new(
            &mut self.graph,
            &mut self.cache,
            &self.layers,
            selected_layer_names,
            &self.reservations,
        )
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn layers(&self) -> &LayerStore {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerStore {
        &mut self.layers
    }

    pub fn reservations(&self) -> &ReservationTable {
        &self.reservations
    }

    pub fn reservations_mut(&mut self) -> &mut ReservationTable {
        &mut self.reservations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::channel;
    use crate::graph::MemGraph;
    use crate::ids::Scid;

    #[test]
    fn query_answers_bounds_for_every_channel_in_the_graph() {
        let graph = MemGraph::new(vec![channel(1, 1, 2, 1_000), channel(2, 2, 3, 500)]);
        let mut oracle = Oracle::new(graph);
        let idx = oracle.graph().channel_index(Scid(1)).unwrap();
        let scidd = crate::ids::ScidDir::new(Scid(1), crate::ids::Direction::ZERO);

        let ctx = oracle.query(&[]);
        let (min, max) = ctx.effective_bounds(idx, scidd);
        assert_eq!(min, crate::amount::Msat::ZERO);
        assert_eq!(max, crate::amount::Msat(1_000_000));
    }
}
