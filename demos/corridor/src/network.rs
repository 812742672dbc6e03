//! Two-approach signalized crossing used by the demo.
//!
//! ```text
//!  O0 ─c→ w ──LTM──┐                   ┌──point queue───→ e ─c→ D0
//!                  ├─→ X (signalized) ─┤
//!  O1 ─c→ s ──CTM──┘                   └──spatial queue─→ n ─c→ D1
//! ```
//!
//! A 60 s cycle with 6 s lost time: the west approach runs alone for 24 s,
//! the south approach for 18 s, then west→east and south→north share 12 s.

use dnl_core::{DestinationId, DnlResult, MixtureFractions, OriginId, TimeDependentOdm, TurningFractions};
use dnl_link::{FundamentalDiagram, LinkKind};
use dnl_network::{DynamicNetwork, DynamicNetworkBuilder, NetworkResult};
use dnl_node::{Movement, NodeModel, SignalPhase, SignalPlan, TampereVariant};

/// Build the crossing.  Link ids: 0–1 origin connectors, 2 west approach,
/// 3 south approach, 4 east exit, 5 north exit, 6–7 sink connectors.
pub fn build_network() -> NetworkResult<DynamicNetwork> {
    let plan = SignalPlan::new(vec![
        SignalPhase::approach(24.0, 0, 2),
        SignalPhase::new(18.0, vec![Movement::new(1, 0), Movement::new(1, 1)]),
        SignalPhase::new(12.0, vec![Movement::new(0, 0), Movement::new(1, 1)]),
    ])
    .with_lost_time(6.0);

    let mut b = DynamicNetworkBuilder::with_capacity(9, 8);
    let o0 = b.add_node(NodeModel::Origin { origin: OriginId(0) });
    let o1 = b.add_node(NodeModel::Origin { origin: OriginId(1) });
    let w  = b.add_node(NodeModel::Linear);
    let s  = b.add_node(NodeModel::Linear);
    let x  = b.add_node(NodeModel::Tampere(TampereVariant::Signalized(plan)));
    let e  = b.add_node(NodeModel::Linear);
    let n  = b.add_node(NodeModel::Linear);
    let d0 = b.add_node(NodeModel::Destination { destination: DestinationId(0) });
    let d1 = b.add_node(NodeModel::Destination { destination: DestinationId(1) });

    b.add_connector(o0, w);
    b.add_connector(o1, s);
    b.add_triangular_link(w, x, 1.2, 1_800.0, 80.0, 150.0, LinkKind::Ltm)?;
    b.add_triangular_link(s, x, 0.9, 1_800.0, 60.0, 150.0, LinkKind::Ctm)?;
    b.add_triangular_link(x, e, 1.5, 2_000.0, 80.0, 150.0, LinkKind::PointQueue)?;
    b.add_link(x, n, FundamentalDiagram::with_wave_speed(0.8, 1_600.0, 60.0, 15.0)?, LinkKind::SpatialQueue);
    b.add_connector(e, d0);
    b.add_connector(n, d1);
    b.build()
}

/// Each destination leaves the crossing on its own exit, from either approach.
pub fn turning_fractions(steps: usize) -> DnlResult<TurningFractions> {
    let crossing = MixtureFractions::new(2, 2)
        .with(DestinationId(0), vec![1.0, 0.0, 1.0, 0.0])?
        .with(DestinationId(1), vec![0.0, 1.0, 0.0, 1.0])?;
    Ok(TurningFractions::stationary(vec![crossing], steps))
}

/// Morning peak: a quarter hour of demand, mostly straight through.
pub fn demand(steps: usize, step_secs: u32) -> TimeDependentOdm {
    let peak = (900 / step_secs.max(1) as usize).min(steps);
    let mut odm = TimeDependentOdm::new(2, 2, steps);
    odm.set_range(OriginId(0), DestinationId(0), 0..peak, 700.0);
    odm.set_range(OriginId(0), DestinationId(1), 0..peak, 200.0);
    odm.set_range(OriginId(1), DestinationId(0), 0..peak, 250.0);
    odm.set_range(OriginId(1), DestinationId(1), 0..peak, 650.0);
    odm
}
