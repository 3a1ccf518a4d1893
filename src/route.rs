//! Route hops and the pluggable route-finder seam (§3 Route hop, §9 Open
//! Question (b)). The concrete pathfinding algorithm and its probability
//! estimator are out of scope (§1); `ConstraintEngine`, reached through
//! `RouteQueryContext`, is the interface a real implementation plugs into.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::amount::Msat;
use crate::error::OracleError;
use crate::graph::GraphView;
use crate::ids::{Direction, NodeId, Scid, ScidDir};
use crate::query::RouteQueryContext;

#[derive(Clone, Debug, PartialEq)]
pub struct RouteHop {
    pub scid: Scid,
    pub dir: Direction,
    pub next_node_id: NodeId,
    pub amount_msat: Msat,
    pub cltv_delta: u16,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub hops: Vec<RouteHop>,
    pub success_prob: f64,
}

impl Route {
    pub fn new(hops: Vec<RouteHop>, success_prob: f64) -> Result<Route, OracleError> {
        if hops.is_empty() {
            return Err(OracleError::InvalidParams("route must have at least one hop".to_string()));
        }
        Ok(Route { hops, success_prob })
    }
}

/// The seam a real pathfinder plugs into: given a query context already
/// bound to a refreshed graph/overlay/layers, produce routes from
/// `source` to `destination` carrying `amount_msat`.
pub trait RouteFinder<G: GraphView> {
    fn find_routes(
        &self,
        ctx: &RouteQueryContext<G>,
        source: &NodeId,
        destination: &NodeId,
        amount_msat: Msat,
    ) -> Result<Vec<Route>, OracleError>;
}

/// The literal behavior of the reference implementation's route-finder
/// stub: a single synthetic direct hop to `destination`, fixed delay,
/// certain success. Not a real router — a placeholder pending one.
pub struct StubRouteFinder;

impl<G: GraphView> RouteFinder<G> for StubRouteFinder {
    fn find_routes(
        &self,
        _ctx: &RouteQueryContext<G>,
        _source: &NodeId,
        destination: &NodeId,
        amount_msat: Msat,
    ) -> Result<Vec<Route>, OracleError> {
        let hop = RouteHop {
            scid: Scid(0x0000_0100_0002_0003),
            dir: Direction::ZERO,
            next_node_id: destination.clone(),
            amount_msat,
            cltv_delta: 6,
        };
        Ok(vec![Route::new(vec![hop], 1.0)?])
    }
}

/// A breadth-first pathfinder that walks the overlaid graph, asking
/// `ConstraintEngine` (via the query context) whether each candidate edge
/// carries the requested amount. No fee- or probability-awareness: it
/// reports the shortest usable path with `success_prob = 1.0`, an
/// enrichment over the stub but still a placeholder for a real
/// probability-weighted router.
pub struct BfsRouteFinder;

struct Edge {
    scidd: ScidDir,
    idx: usize,
    to: NodeId,
}

impl BfsRouteFinder {
    fn neighbors<G: GraphView>(
        ctx: &RouteQueryContext<G>,
        node: &NodeId,
        amount_msat: Msat,
    ) -> Vec<Edge> {
        let mut edges = Vec::new();
        for (idx, channel) in ctx.channels() {
            for dir in [Direction::ZERO, Direction::ONE] {
                let (from, to) = channel.endpoints(dir);
                if &from != node {
                    continue;
                }
                let policy = channel.policy[dir.as_u8() as usize];
                if !policy.enabled {
                    continue;
                }
                let scidd = ScidDir::new(channel.scid, dir);
                let (min, max) = ctx.effective_bounds(idx, scidd);
                if max < min || max < amount_msat {
                    continue;
                }
                edges.push(Edge { scidd, idx, to });
            }
        }
        edges
    }
}

impl<G: GraphView> RouteFinder<G> for BfsRouteFinder {
    fn find_routes(
        &self,
        ctx: &RouteQueryContext<G>,
        source: &NodeId,
        destination: &NodeId,
        amount_msat: Msat,
    ) -> Result<Vec<Route>, OracleError> {
        if source == destination {
            return Err(OracleError::InvalidParams("source and destination must differ".to_string()));
        }

        // Breadth-first search over nodes, recording which edge reached
        // each node so the path can be rebuilt by backtracking.
        let mut backtrack: HashMap<NodeId, Option<(NodeId, ScidDir, usize)>> = HashMap::new();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();

        backtrack.insert(source.clone(), None);
        visited.insert(source.clone());
        queue.push_back(source.clone());

        let mut found = false;
        'search: while let Some(node) = queue.pop_front() {
            for edge in Self::neighbors(ctx, &node, amount_msat) {
                if visited.contains(&edge.to) {
                    continue;
                }
                backtrack.insert(edge.to.clone(), Some((node.clone(), edge.scidd, edge.idx)));
                visited.insert(edge.to.clone());
                if &edge.to == destination {
                    found = true;
                    break 'search;
                }
                queue.push_back(edge.to.clone());
            }
        }

        if !found {
            return Err(OracleError::NoRoute);
        }

        // Backtrack to build the hop list in forward order.
        let mut hops = Vec::new();
        let mut current = destination.clone();
        while let Some(Some((prev, scidd, _idx))) = backtrack.get(&current).cloned() {
            hops.push(RouteHop {
                scid: scidd.scid,
                dir: scidd.dir,
                next_node_id: current.clone(),
                amount_msat,
                cltv_delta: 6,
            });
            current = prev;
        }
        hops.reverse();

        Ok(vec![Route::new(hops, 1.0)?])
    }
}
