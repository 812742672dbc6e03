//! Integration tests for dnl-loading.
//!
//! Networks are hand-built; road links use a 90 km/h, 1800 veh/h, 150 veh/km
//! triangular diagram, which at 6 s steps is 3 vehicles per step.

#[cfg(test)]
mod helpers {
    use dnl_core::{
        DestinationId, LoadingConfig, MixtureFractions, OriginId, TimeDependentOdm, TurningFractions,
    };
    use dnl_link::{FundamentalDiagram, LinkKind};
    use dnl_network::{DynamicNetwork, DynamicNetworkBuilder};
    use dnl_node::NodeModel;

    use crate::{LoadingBuilder, LoadingStrategy, NetworkLoader};

    pub const STEPS: usize = 200;

    pub fn config() -> LoadingConfig {
        LoadingConfig { total_steps: STEPS, ..LoadingConfig::default() }
    }

    /// 0.5 km: free-flow time ≈ 3.3 steps, backward time ≈ 21.7 steps.
    pub fn road() -> FundamentalDiagram {
        FundamentalDiagram::triangular(0.5, 1_800.0, 90.0, 150.0).unwrap()
    }

    /// 0.05 km: crossed in a third of a step at free-flow speed.
    pub fn short_road() -> FundamentalDiagram {
        FundamentalDiagram::triangular(0.05, 1_800.0, 90.0, 150.0).unwrap()
    }

    /// `O0 ─c→ a ──→ b ──→ c ─c→ D0` with `kind` road links.
    pub fn corridor(kind: LinkKind) -> DynamicNetwork {
        let mut b = DynamicNetworkBuilder::new();
        let o  = b.add_node(NodeModel::Origin { origin: OriginId(0) });
        let n1 = b.add_node(NodeModel::Linear);
        let n2 = b.add_node(NodeModel::Linear);
        let n3 = b.add_node(NodeModel::Linear);
        let z  = b.add_node(NodeModel::Destination { destination: DestinationId(0) });
        b.add_connector(o, n1);
        b.add_link(n1, n2, road(), kind);
        b.add_link(n2, n3, road(), kind);
        b.add_connector(n3, z);
        b.build().unwrap()
    }

    /// Corridor of short links whose nodes are numbered downstream-first,
    /// so one id-order sweep cannot settle a step.
    pub fn short_corridor_reversed() -> DynamicNetwork {
        let mut b = DynamicNetworkBuilder::new();
        let z  = b.add_node(NodeModel::Destination { destination: DestinationId(0) });
        let n3 = b.add_node(NodeModel::Linear);
        let n2 = b.add_node(NodeModel::Linear);
        let n1 = b.add_node(NodeModel::Linear);
        let o  = b.add_node(NodeModel::Origin { origin: OriginId(0) });
        b.add_connector(o, n1);
        b.add_link(n1, n2, short_road(), LinkKind::Ltm);
        b.add_link(n2, n3, short_road(), LinkKind::Ltm);
        b.add_connector(n3, z);
        b.build().unwrap()
    }

    /// 1200 veh/h (2 veh/step) from origin 0 to destination 0 for 20 steps.
    pub fn corridor_odm() -> TimeDependentOdm {
        let mut odm = TimeDependentOdm::new(1, 1, STEPS);
        odm.set_range(OriginId(0), DestinationId(0), 0..20, 1_200.0);
        odm
    }

    /// Two origins merge, then split to two destinations.
    ///
    /// ```text
    ///  O0 ─c→ a ─┐                 ┌─→ e ─c→ D0
    ///            ├─→ m ───→ s ─────┤
    ///  O1 ─c→ b ─┘                 └─→ f ─c→ D1
    /// ```
    pub fn merge_diverge() -> DynamicNetwork {
        merge_diverge_with(NodeModel::DaganzoMerge { priorities: None }, NodeModel::DaganzoDiverge, road())
    }

    /// [`merge_diverge`] with other models at `m` and `s` and `fd` on every
    /// road link.
    pub fn merge_diverge_with(merge: NodeModel, diverge: NodeModel, fd: FundamentalDiagram) -> DynamicNetwork {
        let mut b = DynamicNetworkBuilder::new();
        let o0 = b.add_node(NodeModel::Origin { origin: OriginId(0) });
        let o1 = b.add_node(NodeModel::Origin { origin: OriginId(1) });
        let a  = b.add_node(NodeModel::Linear);
        let bb = b.add_node(NodeModel::Linear);
        let m  = b.add_node(merge);
        let s  = b.add_node(diverge);
        let e  = b.add_node(NodeModel::Linear);
        let f  = b.add_node(NodeModel::Linear);
        let d0 = b.add_node(NodeModel::Destination { destination: DestinationId(0) });
        let d1 = b.add_node(NodeModel::Destination { destination: DestinationId(1) });

        b.add_connector(o0, a);
        b.add_connector(o1, bb);
        b.add_link(a, m, fd, LinkKind::Ltm);
        b.add_link(bb, m, fd, LinkKind::Ltm);
        b.add_link(m, s, fd, LinkKind::Ltm);
        b.add_link(s, e, fd, LinkKind::Ltm);
        b.add_link(s, f, fd, LinkKind::Ltm);
        b.add_connector(e, d0);
        b.add_connector(f, d1);
        b.build().unwrap()
    }

    /// Every OD pair at 600 veh/h (1 veh/step) for 30 steps: 120 vehicles,
    /// 4 per step into a 3 per step merge.
    pub fn merge_diverge_odm() -> TimeDependentOdm {
        let mut odm = TimeDependentOdm::new(2, 2, STEPS);
        for o in 0..2 {
            for d in 0..2 {
                odm.set_range(OriginId(o), DestinationId(d), 0..30, 600.0);
            }
        }
        odm
    }

    /// Destination 0 turns to the first branch, destination 1 to the second.
    pub fn split_by_destination() -> TurningFractions {
        let table = MixtureFractions::new(1, 2)
            .with(DestinationId(0), vec![1.0, 0.0])
            .unwrap()
            .with(DestinationId(1), vec![0.0, 1.0])
            .unwrap();
        TurningFractions::stationary(vec![table], STEPS)
    }

    /// Fractions for a 2 → 1 merge intersection followed by the split.
    pub fn merge_then_split() -> TurningFractions {
        let merge = MixtureFractions::uniform(2, &[1.0], &[DestinationId(0), DestinationId(1)]).unwrap();
        let split = split_by_destination().get(0, 0).clone();
        TurningFractions::stationary(vec![merge, split], STEPS)
    }

    /// `O0 ─c→ a ──kind──→ b ──bottleneck──→ c ─c→ D0`: a 0.5 km road feeding a
    /// 600 veh/h LTM link, under 1800 veh/h of demand for 40 steps.
    pub fn bottleneck(kind: LinkKind) -> (DynamicNetwork, TimeDependentOdm) {
        let mut b = DynamicNetworkBuilder::new();
        let o  = b.add_node(NodeModel::Origin { origin: OriginId(0) });
        let n1 = b.add_node(NodeModel::Linear);
        let n2 = b.add_node(NodeModel::Linear);
        let n3 = b.add_node(NodeModel::Linear);
        let z  = b.add_node(NodeModel::Destination { destination: DestinationId(0) });
        b.add_connector(o, n1);
        b.add_link(n1, n2, road(), kind);
        b.add_link(n2, n3, FundamentalDiagram::triangular(0.5, 600.0, 90.0, 150.0).unwrap(), LinkKind::Ltm);
        b.add_connector(n3, z);

        let mut odm = TimeDependentOdm::new(1, 1, STEPS);
        odm.set_range(OriginId(0), DestinationId(0), 0..40, 1_800.0);
        (b.build().unwrap(), odm)
    }

    pub fn corridor_loader<S: LoadingStrategy>(net: DynamicNetwork, strategy: S) -> NetworkLoader<S> {
        LoadingBuilder::new(config(), net, corridor_odm(), strategy).build().unwrap()
    }

    pub fn merge_diverge_loader<S: LoadingStrategy>(strategy: S) -> NetworkLoader<S> {
        LoadingBuilder::new(config(), merge_diverge(), merge_diverge_odm(), strategy)
            .turning_fractions(split_by_destination())
            .build()
            .unwrap()
    }

    /// Largest difference between two networks' cumulative curves.
    pub fn curve_distance(a: &DynamicNetwork, b: &DynamicNetwork) -> f64 {
        a.links
            .iter()
            .zip(&b.links)
            .flat_map(|(x, y)| {
                let up = x.cumulative_inflow.iter().zip(&y.cumulative_inflow);
                let down = x.cumulative_outflow.iter().zip(&y.cumulative_outflow);
                up.chain(down).map(|(p, q)| (p - q).abs())
            })
            .fold(0.0, f64::max)
    }

    /// Conservation on links: monotone curves, outflow never ahead of inflow,
    /// stored flows agreeing with the curves.
    pub fn assert_link_invariants(net: &DynamicNetwork) {
        for link in &net.links {
            let (u, d) = (&link.cumulative_inflow, &link.cumulative_outflow);
            for t in 0..link.steps() {
                assert!(u[t + 1] >= u[t] - 1e-9, "{} U decreases at {t}", link.id);
                assert!(d[t + 1] >= d[t] - 1e-9, "{} D decreases at {t}", link.id);
                assert!((link.inflow[t].total() - (u[t + 1] - u[t])).abs() < 1e-9);
                assert!((link.outflow[t].total() - (d[t + 1] - d[t])).abs() < 1e-9);
            }
            for t in 0..=link.steps() {
                assert!(d[t] <= u[t] + 1e-9, "{} D above U at {t}", link.id);
            }
        }
    }
}

// ── LoadingBuilder validation ─────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use dnl_core::{DnlError, LoadingConfig, TimeDependentOdm, TurningFractions};
    use dnl_link::LinkKind;

    use super::helpers::*;
    use crate::{IltmDnl, LoadingBuilder, LoadingError};

    #[test]
    fn builds_and_allocates() {
        let loader = corridor_loader(corridor(LinkKind::Ltm), IltmDnl::default());
        assert_eq!(loader.network().steps(), STEPS);
        assert_eq!(loader.steps_simulated(), 0);
        assert!(loader.diagnostics().is_empty());
    }

    #[test]
    fn rejects_zero_step_length() {
        let config = LoadingConfig { step_secs: 0, ..config() };
        let r = LoadingBuilder::new(config, corridor(LinkKind::Ltm), corridor_odm(), IltmDnl::default()).build();
        assert!(matches!(r, Err(LoadingError::Config(_))));
    }

    #[test]
    fn rejects_zero_iteration_cap() {
        let config = LoadingConfig { max_iterations: 0, ..config() };
        let r = LoadingBuilder::new(config, corridor(LinkKind::Ltm), corridor_odm(), IltmDnl::default()).build();
        assert!(matches!(r, Err(LoadingError::Config(_))));
    }

    #[test]
    fn odm_must_cover_network_ids() {
        let odm = TimeDependentOdm::new(0, 1, STEPS);
        let r = LoadingBuilder::new(config(), corridor(LinkKind::Ltm), odm, IltmDnl::default()).build();
        assert!(matches!(
            r,
            Err(LoadingError::Core(DnlError::DimensionMismatch { what: "OD matrix origins", .. }))
        ));
    }

    #[test]
    fn intersections_need_fractions() {
        let r = LoadingBuilder::new(config(), merge_diverge(), merge_diverge_odm(), IltmDnl::default()).build();
        assert!(matches!(r, Err(LoadingError::Config(_))));
    }

    #[test]
    fn fraction_tables_must_cover_intersections() {
        let none = TurningFractions::stationary(Vec::new(), STEPS);
        let r = LoadingBuilder::new(config(), merge_diverge(), merge_diverge_odm(), IltmDnl::default())
            .turning_fractions(none)
            .build();
        assert!(matches!(r, Err(LoadingError::Core(DnlError::DimensionMismatch { .. }))));
    }

    #[test]
    fn set_turning_fractions_keeps_old_on_error() {
        let mut loader = merge_diverge_loader(IltmDnl::default());
        assert!(loader.set_turning_fractions(TurningFractions::default()).is_err());
        assert!(loader.set_turning_fractions(split_by_destination()).is_ok());
        assert!(loader.load_network().is_ok());
    }
}

// ── Loading a corridor ────────────────────────────────────────────────────────

#[cfg(test)]
mod corridor_tests {
    use dnl_core::{DestinationId, LinkId, OriginId, TimeDependentOdm};
    use dnl_link::LinkKind;

    use super::helpers::*;
    use crate::{BasicDnl, FastSweepingIltm, IltmDnl, LoadingBuilder, PqfsIltm};

    #[test]
    fn every_vehicle_arrives() {
        for kind in [LinkKind::Ltm, LinkKind::Ctm, LinkKind::PointQueue, LinkKind::SpatialQueue] {
            let mut loader = corridor_loader(corridor(kind), IltmDnl::default());
            let steps = loader.load_network().unwrap();
            assert!(steps > 20 && steps < STEPS, "{kind:?} stopped after {steps}");

            let net = loader.network();
            let arrived = net.link(LinkId(3)).cumulative_outflow[STEPS];
            assert!((arrived - 40.0).abs() < 1e-6, "{kind:?} delivered {arrived}");
            assert!(loader.total_flow_on_network(steps) < 1e-6);
            assert_link_invariants(net);
        }
    }

    #[test]
    fn free_flow_respects_travel_time() {
        let mut loader = corridor_loader(corridor(LinkKind::Ltm), IltmDnl::default());
        loader.load_network().unwrap();
        let road = loader.network().link(LinkId(1));
        // Vehicles enter during step 1 and need 3.3 steps to cross.
        assert_eq!(road.cumulative_outflow[4], 0.0);
        assert!(road.cumulative_outflow[6] > 0.0);
    }

    #[test]
    fn empty_demand_stops_after_one_step() {
        let odm = TimeDependentOdm::new(1, 1, STEPS);
        let mut loader = LoadingBuilder::new(config(), corridor(LinkKind::Ltm), odm, PqfsIltm::default())
            .build()
            .unwrap();
        assert_eq!(loader.load_network().unwrap(), 1);
        assert!(loader.network().links.iter().all(|l| l.cumulative_inflow.iter().all(|&u| u == 0.0)));
    }

    #[test]
    fn late_demand_keeps_loading() {
        let mut odm = TimeDependentOdm::new(1, 1, STEPS);
        odm.set(OriginId(0), DestinationId(0), 50, 1_200.0);
        let mut loader = LoadingBuilder::new(config(), corridor(LinkKind::Ltm), odm, IltmDnl::default())
            .build()
            .unwrap();
        let steps = loader.load_network().unwrap();
        assert!(steps > 50);
        assert!((loader.network().link(LinkId(3)).cumulative_outflow[STEPS] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn strategies_agree_on_long_links() {
        let mut reference = corridor_loader(corridor(LinkKind::Ltm), BasicDnl);
        reference.load_network().unwrap();

        let mut iltm = corridor_loader(corridor(LinkKind::Ltm), IltmDnl::default());
        let mut fast = corridor_loader(corridor(LinkKind::Ltm), FastSweepingIltm::default());
        let mut pqfs = corridor_loader(corridor(LinkKind::Ltm), PqfsIltm::default());
        iltm.load_network().unwrap();
        fast.load_network().unwrap();
        pqfs.load_network().unwrap();

        assert!(curve_distance(reference.network(), iltm.network()) < 1e-9);
        assert!(curve_distance(reference.network(), fast.network()) < 1e-9);
        assert!(curve_distance(reference.network(), pqfs.network()) < 1e-9);
    }

    #[test]
    fn hard_reset_then_reload_is_identical() {
        let mut loader = corridor_loader(corridor(LinkKind::Ltm), IltmDnl::default());
        let first = loader.load_network().unwrap();
        let snapshot = loader.network().clone();
        loader.reset_network();
        assert_eq!(loader.total_flow_on_network(10), 0.0);
        assert_eq!(loader.load_network().unwrap(), first);
        assert!(curve_distance(&snapshot, loader.network()) < 1e-12);
    }
}

// ── Implicit strategies on short links ────────────────────────────────────────

#[cfg(test)]
mod implicit_tests {
    use dnl_core::{LinkId, LoadingConfig};

    use super::helpers::*;
    use crate::{FastSweepingIltm, IltmDnl, LoadingBuilder, LoadingError, LoadingStrategy, PqfsIltm};

    fn capped<S: LoadingStrategy>(strategy: S) -> LoadingError {
        let config = LoadingConfig { max_iterations: 1, ..config() };
        let mut loader = LoadingBuilder::new(config, short_corridor_reversed(), corridor_odm(), strategy)
            .build()
            .unwrap();
        loader.load_network().unwrap_err()
    }

    #[test]
    fn iteration_cap_is_an_error() {
        for err in [
            capped(IltmDnl::default()),
            capped(FastSweepingIltm::default()),
            capped(PqfsIltm::default()),
        ] {
            // Step 0 only fills the origin connector; step 1 is the first
            // with flow on the short links.
            assert!(matches!(err, LoadingError::NonConvergence { step: 1, .. }), "{err}");
        }
    }

    #[test]
    fn converged_strategies_agree() {
        let mut iltm = corridor_loader(short_corridor_reversed(), IltmDnl::default());
        let mut fast = corridor_loader(short_corridor_reversed(), FastSweepingIltm::default());
        let mut pqfs = corridor_loader(short_corridor_reversed(), PqfsIltm::default());
        let r_iltm = iltm.load_network_with(&mut crate::NoopObserver).unwrap();
        fast.load_network().unwrap();
        pqfs.load_network().unwrap();

        assert!(r_iltm.max_step_iterations > 1);
        assert!(curve_distance(iltm.network(), fast.network()) < 1e-6);
        assert!(curve_distance(iltm.network(), pqfs.network()) < 1e-6);
        let arrived = iltm.network().link(LinkId(3)).cumulative_outflow[STEPS];
        assert!((arrived - 40.0).abs() < 1e-6);
        assert_link_invariants(iltm.network());
    }

    #[test]
    fn reevaluating_a_converged_step_changes_nothing() {
        let mut loader = corridor_loader(short_corridor_reversed(), IltmDnl::default());
        let steps = loader.load_network().unwrap();
        for t in [1, 5, 12, steps / 2] {
            let change = loader.reevaluate_step(t).unwrap();
            assert!(change < 1e-8, "step {t} moved by {change}");
        }
        assert!(loader.reevaluate_step(STEPS).is_err());
    }

    #[test]
    fn warm_start_needs_no_more_work() {
        let mut loader = corridor_loader(short_corridor_reversed(), IltmDnl::default());
        let cold = loader.load_network_with(&mut crate::NoopObserver).unwrap();
        let snapshot = loader.network().clone();

        loader.soft_reset_network();
        let warm = loader.load_network_with(&mut crate::NoopObserver).unwrap();
        assert!(warm.iterations <= cold.iterations);
        assert!(curve_distance(&snapshot, loader.network()) < 1e-6);
    }
}

// ── Merge and diverge ─────────────────────────────────────────────────────────

#[cfg(test)]
mod merge_diverge_tests {
    use dnl_core::{DestinationId, Diagnostic, LinkId, MixtureFlow};

    use super::helpers::*;
    use crate::{BasicDnl, IltmDnl, PqfsIltm};

    #[test]
    fn vehicles_reach_their_own_destination() {
        let mut loader = merge_diverge_loader(IltmDnl::default());
        loader.load_network().unwrap();
        let net = loader.network();

        assert!((net.link(LinkId(7)).cumulative_outflow[STEPS] - 60.0).abs() < 1e-6);
        assert!((net.link(LinkId(8)).cumulative_outflow[STEPS] - 60.0).abs() < 1e-6);
        assert!(loader.check_destination_inflows().is_empty());
        assert!(loader.diagnostics().is_empty(), "{:?}", loader.diagnostics().entries());

        // Each branch carries only its own destination.
        for flow in &net.link(LinkId(5)).outflow {
            assert_eq!(flow.destination_flow(DestinationId(1)), 0.0);
        }
    }

    #[test]
    fn merge_queues_upstream() {
        let mut loader = merge_diverge_loader(PqfsIltm::default());
        loader.load_network().unwrap();
        let net = loader.network();

        // The merged link never carries more than its capacity per step.
        let merged = net.link(LinkId(4));
        for t in 0..STEPS {
            assert!(merged.cumulative_inflow[t + 1] - merged.cumulative_inflow[t] <= 3.0 + 1e-9);
        }
        // Four vehicles arrive per step but only three leave: a queue builds.
        let peak = (0..=STEPS).map(|t| loader.total_flow_on_network(t)).fold(0.0, f64::max);
        assert!(peak > 30.0);
        assert_link_invariants(net);
    }

    #[test]
    fn consistent_loads_report_no_portion_errors() {
        let mut loader = merge_diverge_loader(IltmDnl::default());
        loader.load_network().unwrap();
        assert!(loader.check_mixture_portions().is_empty());

        // A composition whose portions sum to 1.2.
        let bad = MixtureFlow::new(2.0, vec![DestinationId(0), DestinationId(1)], vec![0.5, 0.7]);
        loader.network.links[4].inflow[3] = bad;
        let found = loader.check_mixture_portions();
        assert_eq!(found.len(), 1);
        assert!(matches!(found[0], Diagnostic::MixturePortions { link: LinkId(4), step: 3, .. }));
    }

    #[test]
    fn explicit_and_implicit_agree() {
        let mut basic = merge_diverge_loader(BasicDnl);
        let mut iltm = merge_diverge_loader(IltmDnl::default());
        basic.load_network().unwrap();
        iltm.load_network().unwrap();
        assert!(curve_distance(basic.network(), iltm.network()) < 1e-9);
    }
}

// ── Spillback ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod spillback_tests {
    use dnl_core::LinkId;
    use dnl_link::LinkKind;

    use super::helpers::*;
    use crate::{BasicDnl, IltmDnl, LoadingBuilder, LoadingStrategy, NetworkLoader, PqfsIltm};

    fn loaded<S: LoadingStrategy>(kind: LinkKind, strategy: S) -> NetworkLoader<S> {
        let (net, odm) = bottleneck(kind);
        let mut loader = LoadingBuilder::new(config(), net, odm, strategy).build().unwrap();
        loader.load_network().unwrap();
        loader
    }

    fn peak_occupancy<S: LoadingStrategy>(loader: &NetworkLoader<S>) -> f64 {
        let road = loader.network().link(LinkId(1));
        (0..=STEPS).map(|t| road.occupancy_at(t)).fold(0.0, f64::max)
    }

    #[test]
    fn queue_stays_within_storage() {
        for kind in [LinkKind::Ltm, LinkKind::Ctm, LinkKind::SpatialQueue] {
            let loader = loaded(kind, IltmDnl::default());
            let net = loader.network();
            let storage = net.link(LinkId(1)).fd.storage();

            let peak = peak_occupancy(&loader);
            assert!(peak <= storage + 1e-6, "{kind:?} stored {peak} of {storage}");
            // Two vehicles per step pile up for 40 steps: the road fills.
            assert!(peak > 50.0, "{kind:?} peaked at {peak}");

            // The excess waits in the origin connector.
            let held = (0..=STEPS).map(|t| net.link(LinkId(0)).occupancy_at(t)).fold(0.0, f64::max);
            assert!(held > 1.0, "{kind:?} never spilled back");

            assert!((net.link(LinkId(3)).cumulative_outflow[STEPS] - 120.0).abs() < 1e-6, "{kind:?}");
            assert!(loader.diagnostics().is_empty(), "{kind:?}: {:?}", loader.diagnostics().entries());
            assert_link_invariants(net);
        }
    }

    #[test]
    fn point_queue_is_unbounded() {
        let loader = loaded(LinkKind::PointQueue, IltmDnl::default());
        let storage = loader.network().link(LinkId(1)).fd.storage();
        assert!(peak_occupancy(&loader) > storage);
        assert!((loader.network().link(LinkId(3)).cumulative_outflow[STEPS] - 120.0).abs() < 1e-6);
    }

    #[test]
    fn strategies_agree_under_spillback() {
        for kind in [LinkKind::Ltm, LinkKind::Ctm, LinkKind::SpatialQueue] {
            let iltm = loaded(kind, IltmDnl::default());
            let pqfs = loaded(kind, PqfsIltm::default());
            let basic = loaded(kind, BasicDnl);
            assert!(curve_distance(iltm.network(), pqfs.network()) < 1e-6, "{kind:?}");
            assert!(curve_distance(iltm.network(), basic.network()) < 1e-6, "{kind:?}");
        }
    }
}

// ── General intersection models ───────────────────────────────────────────────

#[cfg(test)]
mod general_node_tests {
    use dnl_core::LinkId;
    use dnl_node::{
        BasicPhase, BasicSignalPlan, InmPriority, InmVariant, Movement, NodeModel, SignalPhase, SignalPlan,
        TampereVariant,
    };

    use super::helpers::*;
    use crate::{FastSweepingIltm, LoadingBuilder, LoadingStrategy, NetworkLoader, PqfsIltm};

    /// `(merge, diverge)` model pairs.  The basic signal serves one movement
    /// at a time, so it only sits at the merge, where each approach has one.
    fn intersections() -> Vec<(NodeModel, NodeModel)> {
        let unsignalized = NodeModel::Tampere(TampereVariant::Unsignalized);
        vec![
            (unsignalized.clone(), unsignalized.clone()),
            (
                NodeModel::Tampere(TampereVariant::Signalized(SignalPlan::new(vec![
                    SignalPhase::approach(30.0, 0, 1),
                    SignalPhase::approach(30.0, 1, 1),
                ]))),
                NodeModel::Tampere(TampereVariant::Signalized(SignalPlan::new(vec![SignalPhase::approach(
                    60.0, 0, 2,
                )]))),
            ),
            (
                NodeModel::Tampere(TampereVariant::BasicSignals(BasicSignalPlan::new(vec![
                    BasicPhase { movement: Movement::new(0, 0), duration_secs: 30 },
                    BasicPhase { movement: Movement::new(1, 0), duration_secs: 30 },
                ]))),
                unsignalized,
            ),
            (NodeModel::Inm(InmVariant::Basic), NodeModel::Inm(InmVariant::Basic)),
            (
                NodeModel::Inm(InmVariant::General { priority: InmPriority::Demand, euler_steps: 10 }),
                NodeModel::Inm(InmVariant::General { priority: InmPriority::Demand, euler_steps: 10 }),
            ),
            (
                NodeModel::Inm(InmVariant::ApproximateInmc { node_capacities: vec![1_800.0; 2] }),
                NodeModel::Inm(InmVariant::ApproximateInmc { node_capacities: vec![1_800.0] }),
            ),
        ]
    }

    fn loaded<S: LoadingStrategy>(merge: NodeModel, diverge: NodeModel, strategy: S) -> NetworkLoader<S> {
        let net = merge_diverge_with(merge, diverge, short_road());
        let mut loader = LoadingBuilder::new(config(), net, merge_diverge_odm(), strategy)
            .turning_fractions(merge_then_split())
            .build()
            .unwrap();
        loader.load_network().unwrap();
        loader
    }

    #[test]
    fn every_vehicle_reaches_its_destination() {
        for (merge, diverge) in intersections() {
            let name = format!("{merge:?} / {diverge:?}");
            let fast = loaded(merge.clone(), diverge.clone(), FastSweepingIltm::default());
            let pqfs = loaded(merge, diverge, PqfsIltm::default());

            let net = fast.network();
            assert!((net.link(LinkId(7)).cumulative_outflow[STEPS] - 60.0).abs() < 1e-6, "{name}");
            assert!((net.link(LinkId(8)).cumulative_outflow[STEPS] - 60.0).abs() < 1e-6, "{name}");
            assert!(fast.check_destination_inflows().is_empty(), "{name}");
            assert!(fast.diagnostics().is_empty(), "{name}: {:?}", fast.diagnostics().entries());
            assert_link_invariants(net);

            assert!(curve_distance(net, pqfs.network()) < 1e-6, "{name}");
        }
    }
}

// ── Observer hooks ────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use dnl_link::LinkKind;
    use dnl_network::DynamicNetwork;

    use super::helpers::*;
    use crate::{FastSweepingIltm, LoadReport, LoadingObserver, StepStats};

    #[derive(Default)]
    struct Counter {
        starts:  usize,
        ends:    usize,
        loads:   usize,
        last:    Option<StepStats>,
        updates: usize,
    }

    impl LoadingObserver for Counter {
        fn on_step_start(&mut self, step: usize) {
            assert_eq!(step, self.starts);
            self.starts += 1;
        }

        fn on_step_end(&mut self, stats: &StepStats) {
            self.ends += 1;
            self.updates += stats.node_updates;
            self.last = Some(*stats);
        }

        fn on_load_end(&mut self, report: &LoadReport, network: &DynamicNetwork) {
            self.loads += 1;
            assert_eq!(network.steps(), STEPS);
            assert_eq!(report.node_updates, self.updates);
        }
    }

    #[test]
    fn hooks_fire_once_per_step() {
        let mut loader = corridor_loader(corridor(LinkKind::Ltm), FastSweepingIltm::default());
        let mut counter = Counter::default();
        let report = loader.load_network_with(&mut counter).unwrap();

        assert_eq!(counter.starts, report.steps_simulated);
        assert_eq!(counter.ends, report.steps_simulated);
        assert_eq!(counter.loads, 1);

        let last = counter.last.unwrap();
        assert_eq!(last.step, report.steps_simulated - 1);
        assert_eq!(last.clock_secs, 6 * last.step as u64);
        assert!(last.network_flow < 1e-6);
    }
}
