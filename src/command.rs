//! External command surface (§4.9, §6): maps request/response wire types
//! onto the C3–C8 components. Transport-agnostic — wiring these methods to
//! an actual JSON-RPC loop is left to the embedding process.

use serde::{Deserialize, Serialize};

use crate::amount::Msat;
use crate::error::{OracleError, OracleResult};
use crate::graph::{Channel, ChannelPolicy, GraphView};
use crate::ids::{Direction, NodeId, Scid, ScidDir};
use crate::layer::{Constraint, ConstraintKind};
use crate::oracle::Oracle;
use crate::route::RouteFinder;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteHopWire {
    pub short_channel_id: Scid,
    pub direction: u8,
    pub node_id: NodeId,
    pub amount_msat: u64,
    pub delay: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteWire {
    pub probability_ppm: u32,
    pub path: Vec<RouteHopWire>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GetRoutesResponse {
    pub routes: Vec<RouteWire>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PathEntry {
    pub short_channel_id: Scid,
    pub direction: u8,
    pub amount_msat: u64,
}

impl PathEntry {
    fn to_scidd_amount(&self) -> OracleResult<(ScidDir, Msat)> {
        let dir = Direction::from_u8(self.direction)
            .ok_or_else(|| OracleError::InvalidParams(format!("direction must be 0 or 1, got {}", self.direction)))?;
        Ok((ScidDir::new(self.short_channel_id, dir), Msat(self.amount_msat)))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateChannelRequest {
    pub layer: String,
    pub source: NodeId,
    pub destination: NodeId,
    pub short_channel_id: Scid,
    pub capacity_msat: u64,
    pub htlc_minimum_msat: u64,
    pub htlc_maximum_msat: u64,
    pub fee_base_msat: u64,
    pub fee_proportional_millionths: u32,
    pub delay: u16,
    /// Perform all validation but do not mutate state (spec.md §4.9).
    #[serde(default)]
    pub check_only: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct InformChannelRequest {
    pub layer: String,
    pub short_channel_id: Scid,
    pub direction: u8,
    pub minimum_msat: Option<u64>,
    pub maximum_msat: Option<u64>,
    /// Perform all validation but do not mutate state (spec.md §4.9).
    #[serde(default)]
    pub check_only: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ConstraintWire {
    pub short_channel_id: Scid,
    pub direction: u8,
    pub kind: &'static str,
    pub limit_msat: u64,
    pub timestamp_sec: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct InformChannelResponse {
    pub constraint: ConstraintWire,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DisableNodeRequest {
    pub layer: String,
    pub node: NodeId,
}

#[derive(Clone, Debug, Serialize)]
pub struct LocalChannelWire {
    pub short_channel_id: Scid,
    pub source: NodeId,
    pub destination: NodeId,
    pub capacity_msat: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct LayerSummary {
    pub name: String,
    pub local_channels: Vec<LocalChannelWire>,
    pub constraints: Vec<ConstraintWire>,
    pub disabled_nodes: Vec<NodeId>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ListLayersResponse {
    pub layers: Vec<LayerSummary>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AgeRequest {
    pub layer: String,
    pub cutoff: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct AgeResponse {
    pub layer: String,
    pub num_removed: usize,
}

/// Binds an `Oracle` to a concrete route-finder and exposes the
/// spec's eight operations as plain, transport-agnostic methods.
pub struct CommandSurface<G: GraphView, R: RouteFinder<G>> {
    oracle: Oracle<G>,
    route_finder: R,
}

impl<G: GraphView, R: RouteFinder<G>> CommandSurface<G, R> {
    pub fn new(oracle: Oracle<G>, route_finder: R) -> CommandSurface<G, R> {
        CommandSurface { oracle, route_finder }
    }

    pub fn oracle(&self) -> &Oracle<G> {
        &self.oracle
    }

    pub fn getroutes(
        &mut self,
        source: &NodeId,
        destination: &NodeId,
        amount_msat: u64,
        layers: &[String],
    ) -> OracleResult<GetRoutesResponse> {
        let ctx = self.oracle.query(layers);
        let routes = self
            .route_finder
            .find_routes(&ctx, source, destination, Msat(amount_msat))?;
        drop(ctx);

        let wire_routes = routes
            .into_iter()
            .map(|route| {
                let probability_ppm = (route.success_prob * 1_000_000.0).round() as u32;
                let path = route
                    .hops
                    .into_iter()
                    .map(|hop| RouteHopWire {
                        short_channel_id: hop.scid,
                        direction: hop.dir.as_u8(),
                        node_id: hop.next_node_id,
                        amount_msat: hop.amount_msat.0,
                        delay: hop.cltv_delta as u32,
                    })
                    .collect();
                RouteWire { probability_ppm, path }
            })
            .collect();

        Ok(GetRoutesResponse { routes: wire_routes })
    }

    pub fn reserve(&mut self, path: &[PathEntry]) -> OracleResult<()> {
        let entries: Vec<(ScidDir, Msat)> = path
            .iter()
            .map(PathEntry::to_scidd_amount)
            .collect::<OracleResult<_>>()?;

        let reservations = self.oracle.reservations_mut();
        let num_applied = reservations.add(&entries);
        if num_applied != entries.len() {
            let (scidd, amount) = entries[num_applied];
            let already_reserved = reservations.find(scidd).map(|r| r.amount_msat.0).unwrap_or(0);
            log::warn!("reserve overflow at {:?}, requested {:?}", scidd, amount);
            return Err(OracleError::ReservationOverflow { scidd, already_reserved });
        }
        Ok(())
    }

    pub fn unreserve(&mut self, path: &[PathEntry]) -> OracleResult<()> {
        let entries: Vec<(ScidDir, Msat)> = path
            .iter()
            .map(PathEntry::to_scidd_amount)
            .collect::<OracleResult<_>>()?;

        let reservations = self.oracle.reservations_mut();
        let num_applied = reservations.remove(&entries);
        if num_applied != entries.len() {
            let (scidd, _) = entries[num_applied];
            let reserved = reservations.find(scidd).map(|r| r.amount_msat.0).unwrap_or(0);
            log::warn!("unreserve underflow at {:?}", scidd);
            return Err(OracleError::ReservationUnderflow { scidd, reserved });
        }
        Ok(())
    }

    pub fn create_channel(&mut self, req: CreateChannelRequest) -> OracleResult<()> {
        // Local-channel declarations carry capacity in msat (matching the
        // real askrene RPC); the graph's capacity field is in sat.
        let capacity_sat = req.capacity_msat / 1000;

        if let Some(layer) = self.oracle.layers().find(&req.layer) {
            if !layer.check_local_channel(req.short_channel_id, &req.source, &req.destination, capacity_sat) {
                return Err(OracleError::LocalChannelMismatch(req.short_channel_id));
            }
        }

        if req.check_only {
            return Ok(());
        }

        let policy = ChannelPolicy {
            enabled: true,
            base_fee_msat: req.fee_base_msat,
            prop_fee_ppm: req.fee_proportional_millionths,
            cltv_delay: req.delay,
            htlc_min_msat: Msat(req.htlc_minimum_msat),
            htlc_max_msat: Msat(req.htlc_maximum_msat),
        };
        let channel = Channel {
            scid: req.short_channel_id,
            node_a: req.source,
            node_b: req.destination,
            capacity_sat: Some(capacity_sat),
            policy: [policy, policy],
        };

        self.oracle.layers_mut().get_or_create(&req.layer).update_local_channel(channel);
        Ok(())
    }

    pub fn inform_channel(&mut self, req: InformChannelRequest, now_sec: u64) -> OracleResult<InformChannelResponse> {
        let dir = Direction::from_u8(req.direction)
            .ok_or_else(|| OracleError::InvalidParams(format!("direction must be 0 or 1, got {}", req.direction)))?;
        let scidd = ScidDir::new(req.short_channel_id, dir);

        let (kind, limit_msat) = match (req.minimum_msat, req.maximum_msat) {
            (Some(min), None) => (ConstraintKind::Min, min),
            (None, Some(max)) => (ConstraintKind::Max, max),
            _ => return Err(OracleError::InformChannelAmbiguous),
        };
        let kind_str = match kind {
            ConstraintKind::Min => "minimum",
            ConstraintKind::Max => "maximum",
        };

        if req.check_only {
            return Ok(InformChannelResponse {
                constraint: ConstraintWire {
                    short_channel_id: scidd.scid,
                    direction: scidd.dir.as_u8(),
                    kind: kind_str,
                    limit_msat,
                    timestamp_sec: now_sec,
                },
            });
        }

        let layer = self.oracle.layers_mut().get_or_create(&req.layer);
        let constraint = layer.update_constraint(scidd, kind, now_sec, Msat(limit_msat));

        Ok(InformChannelResponse {
            constraint: constraint_wire(constraint),
        })
    }

    pub fn disable_node(&mut self, req: DisableNodeRequest) -> OracleResult<()> {
        self.oracle.layers_mut().get_or_create(&req.layer).add_disabled_node(req.node);
        Ok(())
    }

    pub fn listlayers(&self, layer: Option<&str>) -> ListLayersResponse {
        let layers = self
            .oracle
            .layers()
            .list(layer)
            .into_iter()
            .map(|layer| LayerSummary {
                name: layer.name().to_string(),
                local_channels: layer.local_channels().map(local_channel_wire).collect(),
                constraints: layer.constraints().map(constraint_wire).collect(),
                disabled_nodes: layer.disabled_nodes().cloned().collect(),
            })
            .collect();
        ListLayersResponse { layers }
    }

    pub fn age(&mut self, req: AgeRequest) -> OracleResult<AgeResponse> {
        let layer = self
            .oracle
            .layers_mut()
            .find_mut(&req.layer)
            .ok_or_else(|| OracleError::UnknownLayer(req.layer.clone()))?;
        let num_removed = layer.trim_constraints(req.cutoff);
        Ok(AgeResponse { layer: req.layer, num_removed })
    }
}

fn local_channel_wire(channel: &Channel) -> LocalChannelWire {
    LocalChannelWire {
        short_channel_id: channel.scid,
        source: channel.node_a.clone(),
        destination: channel.node_b.clone(),
        capacity_msat: channel.capacity_sat.unwrap_or(0) * 1000,
    }
}

fn constraint_wire(constraint: &Constraint) -> ConstraintWire {
    ConstraintWire {
        short_channel_id: constraint.scidd.scid,
        direction: constraint.scidd.dir.as_u8(),
        kind: match constraint.kind {
            ConstraintKind::Min => "minimum",
            ConstraintKind::Max => "maximum",
        },
        limit_msat: constraint.limit_msat.0,
        timestamp_sec: constraint.timestamp_sec,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{channel, node};
    use crate::graph::MemGraph;
    use crate::route::StubRouteFinder;

    fn surface() -> CommandSurface<MemGraph, StubRouteFinder> {
        let graph = MemGraph::new(vec![channel(1, 1, 2, 1_000)]);
        CommandSurface::new(Oracle::new(graph), StubRouteFinder)
    }

    #[test]
    fn getroutes_direct_channel_scenario() {
        let mut surface = surface();
        let resp = surface
            .getroutes(&node(1), &node(2), 500_000_000, &[])
            .unwrap();
        assert_eq!(resp.routes.len(), 1);
        let hop = &resp.routes[0].path[0];
        assert_eq!(hop.amount_msat, 500_000_000);
        assert_eq!(hop.delay, 6);
        assert_eq!(resp.routes[0].probability_ppm, 1_000_000);
    }

    #[test]
    fn reserve_then_constraint_reflects_in_query() {
        let mut surface = surface();
        surface
            .reserve(&[PathEntry { short_channel_id: Scid(1), direction: 0, amount_msat: 400_000_000 }])
            .unwrap();
        let r = surface.oracle().reservations().find(ScidDir::new(Scid(1), Direction::ZERO)).unwrap();
        assert_eq!(r.amount_msat, Msat(400_000_000));
    }

    #[test]
    fn double_reserve_overflow_reports_first_failing_index() {
        let mut surface = surface();
        let huge = u64::MAX / 2 + 1;
        surface
            .reserve(&[PathEntry { short_channel_id: Scid(1), direction: 0, amount_msat: huge }])
            .unwrap();
        let err = surface
            .reserve(&[PathEntry { short_channel_id: Scid(1), direction: 0, amount_msat: huge }])
            .unwrap_err();
        assert!(matches!(err, OracleError::ReservationOverflow { .. }));
    }

    #[test]
    fn create_channel_conflict_fails_on_second_declaration() {
        let mut surface = surface();
        let base = CreateChannelRequest {
            layer: "l".to_string(),
            source: node(1),
            destination: node(2),
            short_channel_id: Scid(99),
            capacity_msat: 1_000_000_000,
            htlc_minimum_msat: 0,
            htlc_maximum_msat: u64::MAX,
            fee_base_msat: 0,
            fee_proportional_millionths: 0,
            delay: 6,
            check_only: false,
        };
        surface.create_channel(base.clone()).unwrap();

        let mut conflicting = base;
        conflicting.capacity_msat = 2_000_000_000;
        let err = surface.create_channel(conflicting).unwrap_err();
        assert!(matches!(err, OracleError::LocalChannelMismatch(_)));
    }

    #[test]
    fn inform_channel_requires_exactly_one_bound() {
        let mut surface = surface();
        let err = surface
            .inform_channel(
                InformChannelRequest {
                    layer: "l".to_string(),
                    short_channel_id: Scid(1),
                    direction: 0,
                    minimum_msat: Some(1),
                    maximum_msat: Some(2),
                    check_only: false,
                },
                1000,
            )
            .unwrap_err();
        assert!(matches!(err, OracleError::InformChannelAmbiguous));
    }

    #[test]
    fn inform_channel_then_age_removes_stale_constraint() {
        let mut surface = surface();
        surface
            .inform_channel(
                InformChannelRequest {
                    layer: "l".to_string(),
                    short_channel_id: Scid(2),
                    direction: 1,
                    minimum_msat: None,
                    maximum_msat: Some(100),
                    check_only: false,
                },
                1000,
            )
            .unwrap();

        let resp = surface.age(AgeRequest { layer: "l".to_string(), cutoff: 1001 }).unwrap();
        assert_eq!(resp.num_removed, 1);
    }

    #[test]
    fn disable_node_then_listlayers_shows_the_layer() {
        let mut surface = surface();
        surface
            .disable_node(DisableNodeRequest { layer: "l".to_string(), node: node(2) })
            .unwrap();
        let resp = surface.listlayers(None);
        assert_eq!(resp.layers.len(), 1);
        assert_eq!(resp.layers[0].name, "l");
        assert_eq!(resp.layers[0].disabled_nodes, vec![node(2)]);
    }

    #[test]
    fn create_channel_check_only_validates_without_creating_the_layer() {
        let mut surface = surface();
        let req = CreateChannelRequest {
            layer: "l".to_string(),
            source: node(1),
            destination: node(2),
            short_channel_id: Scid(99),
            capacity_msat: 1_000_000_000,
            htlc_minimum_msat: 0,
            htlc_maximum_msat: u64::MAX,
            fee_base_msat: 0,
            fee_proportional_millionths: 0,
            delay: 6,
            check_only: true,
        };
        surface.create_channel(req).unwrap();
        assert!(surface.oracle().layers().find("l").is_none());
    }

    #[test]
    fn inform_channel_check_only_reports_without_storing() {
        let mut surface = surface();
        let resp = surface
            .inform_channel(
                InformChannelRequest {
                    layer: "l".to_string(),
                    short_channel_id: Scid(1),
                    direction: 0,
                    minimum_msat: None,
                    maximum_msat: Some(100),
                    check_only: true,
                },
                1000,
            )
            .unwrap();
        assert_eq!(resp.constraint.limit_msat, 100);
        assert!(surface.oracle().layers().find("l").is_none());
    }
}
