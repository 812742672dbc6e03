//! The closed set of link flow models.
//!
//! | Model          | Sending flow                  | Receiving flow                     |
//! |----------------|-------------------------------|------------------------------------|
//! | `Ltm`          | `min(C, U(t+1−τf) − D(t))`     | `min(C, D(t+1−τb) + k_j·L − U(t))`  |
//! | `Ctm`          | `min(C, last cell)`           | `min(C, δ·(cell storage − first))` |
//! | `PointQueue`   | as `Ltm`                      | `C`                                |
//! | `SpatialQueue` | as `Ltm`                      | `min(C, D(t) − U(t) + k_j·L)`      |
//! | `Connector`    | `U(t) − D(t)`                 | unbounded                          |
//!
//! `C` is the capacity per step, `τf` / `τb` the free-flow and backward wave
//! travel times in steps, `δ = w / v_f`.

use crate::FundamentalDiagram;

/// Model selector used when building a network.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinkKind {
    Ltm,
    Ctm,
    PointQueue,
    SpatialQueue,
    Connector,
}

/// Cell occupancies of a CTM link at every step boundary.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellState {
    /// Vehicles each cell holds at jam density.
    pub cell_storage: f64,
    /// `w / v_f`, the share of free space a cell can fill per step.
    pub delta:        f64,
    /// `history[t][c]`: occupancy of cell `c` at boundary `t`.
    pub history:      Vec<Vec<f64>>,
}

impl CellState {
    /// Size the cells so one free-flow step crosses at most one cell.
    pub fn allocate(fd: &FundamentalDiagram, step_hours: f64, boundaries: usize) -> Self {
        let cells = ((fd.length / (fd.free_speed * step_hours)).floor() as usize).max(1);
        Self {
            cell_storage: fd.storage() / cells as f64,
            delta:        fd.wave_speed / fd.free_speed,
            history:      vec![vec![0.0; cells]; boundaries],
        }
    }

    pub fn cell_count(&self) -> usize {
        self.history.first().map_or(0, Vec::len)
    }

    /// Recompute occupancies at `t + 1` from those at `t` and the boundary
    /// flows of step `t`.  Idempotent, so implicit strategies may call it
    /// after every re-evaluation.
    pub fn advance(&mut self, t: usize, capacity: f64, inflow: f64, outflow: f64) {
        let (before, after) = self.history.split_at_mut(t + 1);
        let now  = &before[t];
        let next = &mut after[0];
        let n = now.len();

        next.copy_from_slice(now);
        next[0] += inflow;
        next[n - 1] -= outflow;
        for c in 0..n - 1 {
            let moved = now[c]
                .min(capacity)
                .min(self.delta * (self.cell_storage - now[c + 1]))
                .max(0.0);
            next[c] -= moved;
            next[c + 1] += moved;
        }
    }

    /// Copy the occupancies at `boundary` to every later boundary.
    pub fn hold_from(&mut self, boundary: usize) {
        let (before, after) = self.history.split_at_mut(boundary + 1);
        for cells in after {
            cells.copy_from_slice(&before[boundary]);
        }
    }

    pub fn clear(&mut self) {
        for cells in &mut self.history {
            cells.fill(0.0);
        }
    }
}

/// A link's flow model together with the state only that model needs.
#[derive(Clone, Debug, PartialEq)]
pub enum LinkModel {
    Ltm,
    Ctm(CellState),
    PointQueue,
    SpatialQueue,
    Connector,
}

impl LinkModel {
    /// Fresh model of the given kind; CTM cells are sized on allocation.
    pub fn from_kind(kind: LinkKind) -> Self {
        match kind {
            LinkKind::Ltm          => LinkModel::Ltm,
            LinkKind::Ctm          => LinkModel::Ctm(CellState::default()),
            LinkKind::PointQueue   => LinkModel::PointQueue,
            LinkKind::SpatialQueue => LinkModel::SpatialQueue,
            LinkKind::Connector    => LinkModel::Connector,
        }
    }

    pub fn kind(&self) -> LinkKind {
        match self {
            LinkModel::Ltm          => LinkKind::Ltm,
            LinkModel::Ctm(_)       => LinkKind::Ctm,
            LinkModel::PointQueue   => LinkKind::PointQueue,
            LinkModel::SpatialQueue => LinkKind::SpatialQueue,
            LinkModel::Connector    => LinkKind::Connector,
        }
    }

    /// Sending flow reads `U` at a delayed boundary (forward wave).
    #[inline]
    pub fn has_forward_lookback(&self) -> bool {
        matches!(self, LinkModel::Ltm | LinkModel::PointQueue | LinkModel::SpatialQueue)
    }

    /// Receiving flow reads `D` at a delayed boundary (backward wave).
    #[inline]
    pub fn has_backward_lookback(&self) -> bool {
        matches!(self, LinkModel::Ltm)
    }
}
