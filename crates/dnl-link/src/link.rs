//! A link: parameters, per-step supply/demand, and full-horizon history.

use dnl_core::{Diagnostic, LinkId, LookbackMode, MixtureFlow, NodeId};

use crate::model::{CellState, LinkKind, LinkModel};
use crate::{FundamentalDiagram, lookback};

/// One directed link of the dynamic network.
///
/// All fields are `pub` for direct indexed access on hot paths.  Histories
/// are sized by [`allocate`](Self::allocate) before loading; until then they
/// are empty.
#[derive(Clone, Debug)]
pub struct Link {
    pub id:   LinkId,
    pub from: NodeId,
    pub to:   NodeId,
    pub fd:   FundamentalDiagram,
    pub model: LinkModel,

    // ── Per-step scalars (vehicles per step) ──────────────────────────────
    /// Most vehicles the downstream end can release this step (demand).
    pub sending_flow:   f64,
    /// Most vehicles the upstream end can accept this step (supply).
    pub receiving_flow: f64,

    // ── Full-horizon history ──────────────────────────────────────────────
    /// `inflow[t]`: vehicles entering during step `t`, by destination.
    pub inflow:  Vec<MixtureFlow>,
    /// `outflow[t]`: vehicles leaving during step `t`, by destination.
    pub outflow: Vec<MixtureFlow>,
    /// `U` at every step boundary; length `steps + 1`.
    pub cumulative_inflow:  Vec<f64>,
    /// `D` at every step boundary; length `steps + 1`.
    pub cumulative_outflow: Vec<f64>,

    // ── Derived on allocation ─────────────────────────────────────────────
    capacity_per_step: f64,
    forward_delay:     f64,
    backward_delay:    f64,
}

impl Link {
    pub fn new(id: LinkId, from: NodeId, to: NodeId, fd: FundamentalDiagram, kind: LinkKind) -> Self {
        Self {
            id,
            from,
            to,
            fd,
            model: LinkModel::from_kind(kind),
            sending_flow: 0.0,
            receiving_flow: 0.0,
            inflow: Vec::new(),
            outflow: Vec::new(),
            cumulative_inflow: Vec::new(),
            cumulative_outflow: Vec::new(),
            capacity_per_step: 0.0,
            forward_delay: 0.0,
            backward_delay: 0.0,
        }
    }

    #[inline]
    pub fn kind(&self) -> LinkKind {
        self.model.kind()
    }

    #[inline]
    pub fn is_connector(&self) -> bool {
        matches!(self.model, LinkModel::Connector)
    }

    /// Number of steps the history covers.
    #[inline]
    pub fn steps(&self) -> usize {
        self.inflow.len()
    }

    /// Capacity in vehicles per step (valid after allocation).
    #[inline]
    pub fn capacity_per_step(&self) -> f64 {
        self.capacity_per_step
    }

    /// Free-flow travel time in steps.
    #[inline]
    pub fn forward_delay(&self) -> f64 {
        self.forward_delay
    }

    /// Backward wave travel time in steps.
    #[inline]
    pub fn backward_delay(&self) -> f64 {
        self.backward_delay
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Size all histories for `steps` steps of `step_hours` each and zero them.
    pub fn allocate(&mut self, steps: usize, step_hours: f64) {
        self.inflow  = vec![MixtureFlow::ZERO; steps];
        self.outflow = vec![MixtureFlow::ZERO; steps];
        self.cumulative_inflow  = vec![0.0; steps + 1];
        self.cumulative_outflow = vec![0.0; steps + 1];
        self.sending_flow   = 0.0;
        self.receiving_flow = 0.0;

        // Connectors keep a finite nominal capacity so merge priorities stay finite.
        self.capacity_per_step = self.fd.capacity * step_hours;
        if self.is_connector() {
            self.forward_delay  = 0.0;
            self.backward_delay = 0.0;
        } else {
            self.forward_delay  = self.fd.free_flow_time() / step_hours;
            self.backward_delay = self.fd.backward_time() / step_hours;
        }

        if let LinkModel::Ctm(cells) = &mut self.model {
            *cells = CellState::allocate(&self.fd, step_hours, steps + 1);
        }
    }

    /// Restore zero state.
    ///
    /// A soft reset only clears the per-step boundary scalars and keeps the
    /// history, which implicit strategies reuse as their initial guess.  A
    /// hard reset clears the history as well.
    pub fn reset(&mut self, hard: bool) {
        self.sending_flow   = 0.0;
        self.receiving_flow = 0.0;
        if !hard {
            return;
        }
        self.inflow.fill(MixtureFlow::ZERO);
        self.outflow.fill(MixtureFlow::ZERO);
        self.cumulative_inflow.fill(0.0);
        self.cumulative_outflow.fill(0.0);
        if let LinkModel::Ctm(cells) = &mut self.model {
            cells.clear();
        }
    }

    /// Make the boundary at `t + 1` a valid starting guess for step `t`:
    /// neither curve may sit below its value at `t`.
    pub fn prepare_step(&mut self, t: usize) {
        let (u, d) = (self.cumulative_inflow[t], self.cumulative_outflow[t]);
        if self.cumulative_inflow[t + 1] < u {
            self.cumulative_inflow[t + 1] = u;
            self.inflow[t] = MixtureFlow::ZERO;
        }
        if self.cumulative_outflow[t + 1] < d {
            self.cumulative_outflow[t + 1] = d;
            self.outflow[t] = MixtureFlow::ZERO;
        }
    }

    /// Freeze both curves from `boundary` to the end of the horizon, as if
    /// no vehicle crossed either end afterwards.
    pub fn hold_from(&mut self, boundary: usize) {
        let (u, d) = (self.cumulative_inflow[boundary], self.cumulative_outflow[boundary]);
        self.cumulative_inflow[boundary..].fill(u);
        self.cumulative_outflow[boundary..].fill(d);
        self.inflow[boundary..].fill(MixtureFlow::ZERO);
        self.outflow[boundary..].fill(MixtureFlow::ZERO);
        if let LinkModel::Ctm(cells) = &mut self.model {
            cells.hold_from(boundary);
        }
    }

    // ── Supply and demand ─────────────────────────────────────────────────

    /// Compute `sending_flow` and `receiving_flow` for step `t`.
    ///
    /// Reads the curves up to boundary `t` plus, for wave travel times
    /// shorter than a step, the current estimate at `t + 1`.
    pub fn compute_receiving_and_sending_flows(&mut self, t: usize, mode: LookbackMode) {
        let (sending, receiving) = self.supply_demand(t, mode);
        self.sending_flow   = sending;
        self.receiving_flow = receiving;
    }

    /// `(sending, receiving)` for step `t` without touching the link.
    pub fn supply_demand(&self, t: usize, mode: LookbackMode) -> (f64, f64) {
        let cap  = self.capacity_per_step;
        let up   = &self.cumulative_inflow;
        let down = &self.cumulative_outflow;

        let forward = || lookback::read(up, t + 1, self.forward_delay, mode) - down[t];

        let (sending, receiving) = match &self.model {
            LinkModel::Ltm => {
                let storage = self.fd.storage();
                let back = lookback::read(down, t + 1, self.backward_delay, mode);
                (cap.min(forward()), cap.min(back + storage - up[t]))
            }
            LinkModel::Ctm(cells) => {
                let occ = &cells.history[t];
                let last = occ[occ.len() - 1];
                (cap.min(last), cap.min(cells.delta * (cells.cell_storage - occ[0])))
            }
            LinkModel::PointQueue => (cap.min(forward()), cap),
            LinkModel::SpatialQueue => {
                let storage = self.fd.storage();
                (cap.min(forward()), cap.min(down[t] - up[t] + storage))
            }
            LinkModel::Connector => (up[t] - down[t], f64::INFINITY),
        };
        (sending.max(0.0), receiving.max(0.0))
    }

    /// Weight with which a change of `U(t+1)` feeds back into this link's
    /// sending flow within the same step.
    pub fn forward_sensitivity(&self, mode: LookbackMode) -> f64 {
        if self.model.has_forward_lookback() {
            lookback::sensitivity(self.forward_delay, mode)
        } else {
            0.0
        }
    }

    /// Weight with which a change of `D(t+1)` feeds back into this link's
    /// receiving flow within the same step.
    pub fn backward_sensitivity(&self, mode: LookbackMode) -> f64 {
        if self.model.has_backward_lookback() {
            lookback::sensitivity(self.backward_delay, mode)
        } else {
            0.0
        }
    }

    // ── Committing node results ───────────────────────────────────────────

    /// Store the flow entering during step `t`; returns `|ΔU(t+1)|`.
    pub fn commit_inflow(&mut self, t: usize, flow: MixtureFlow) -> f64 {
        let next = self.cumulative_inflow[t] + flow.total();
        let change = (next - self.cumulative_inflow[t + 1]).abs();
        self.cumulative_inflow[t + 1] = next;
        self.inflow[t] = flow;
        self.advance_cells(t);
        change
    }

    /// Store the flow leaving during step `t`; returns `|ΔD(t+1)|`.
    pub fn commit_outflow(&mut self, t: usize, flow: MixtureFlow) -> f64 {
        let next = self.cumulative_outflow[t] + flow.total();
        let change = (next - self.cumulative_outflow[t + 1]).abs();
        self.cumulative_outflow[t + 1] = next;
        self.outflow[t] = flow;
        self.advance_cells(t);
        change
    }

    fn advance_cells(&mut self, t: usize) {
        if let LinkModel::Ctm(cells) = &mut self.model {
            let qin  = self.inflow[t].total();
            let qout = self.outflow[t].total();
            cells.advance(t, self.capacity_per_step, qin, qout);
        }
    }

    // ── FIFO tracing ──────────────────────────────────────────────────────

    /// Destination composition of the next `amount` vehicles to leave during
    /// step `t`.
    ///
    /// Vehicles keep their destination while travelling and leave in entry
    /// order, so the `amount` vehicles after `D(t)` are exactly those whose
    /// entry count lies in `[D(t), D(t) + amount)` on the `U` curve.  The
    /// search starts from the latest boundary and walks backward to the
    /// interval where `U` reaches `D(t)`; partially covered intervals
    /// contribute pro rata.  If nothing can be bracketed (rounding at the
    /// head of an emptied link) the most recent non-empty inflow is used.
    pub fn outgoing_mixture_flow(&self, t: usize, amount: f64) -> MixtureFlow {
        if !(amount > 0.0) {
            return MixtureFlow::ZERO;
        }
        let up = &self.cumulative_inflow;
        let lo = self.cumulative_outflow[t];
        let hi = lo + amount;

        let start = (0..=t).rev().find(|&k| up[k] <= lo).unwrap_or(0);

        let mut traced = MixtureFlow::ZERO;
        for k in start..=t {
            let overlap = hi.min(up[k + 1]) - lo.max(up[k]);
            if overlap > 0.0 {
                traced = traced.plus(&self.inflow[k].copy_with_flow(overlap));
            }
            if up[k + 1] >= hi {
                break;
            }
        }

        if traced.is_zero() {
            return self.inflow[..=t]
                .iter()
                .rev()
                .find(|f| !f.is_zero())
                .map_or(MixtureFlow::ZERO, |f| f.copy_with_flow(amount));
        }
        traced.copy_with_flow(amount)
    }

    // ── Performance queries ───────────────────────────────────────────────

    /// Vehicles on the link at boundary `t`.
    #[inline]
    pub fn occupancy_at(&self, t: usize) -> f64 {
        self.cumulative_inflow[t] - self.cumulative_outflow[t]
    }

    /// Experienced travel time (in steps) of the vehicle entering at
    /// boundary `t`: horizontal distance between `U` and `D`.
    ///
    /// Returns `None` if that vehicle has not left within the horizon.
    pub fn travel_time_at(&self, t: usize) -> Option<f64> {
        let target = self.cumulative_inflow[t];
        let down = &self.cumulative_outflow;
        if down[t] >= target {
            return Some(0.0);
        }
        let k = (t..down.len() - 1).find(|&k| down[k + 1] >= target)?;
        let span = down[k + 1] - down[k];
        let frac = if span > 0.0 { (target - down[k]) / span } else { 0.0 };
        Some((k as f64 + frac) - t as f64)
    }

    /// Portion-sum diagnostics for every stored inflow.
    pub fn portion_diagnostics(&self, tolerance: f64) -> Vec<Diagnostic> {
        self.inflow
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.check_portions(tolerance))
            .map(|(step, f)| Diagnostic::MixturePortions { link: self.id, step, sum: f.portion_sum() })
            .collect()
    }
}
