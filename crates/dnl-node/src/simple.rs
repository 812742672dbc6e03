//! Boundary and pass-through nodes.

use dnl_core::{DestinationId, Diagnostic, MixtureFlow, OriginId, TimeDependentOdm};

use crate::{NodeFlows, NodeInput};

/// Vehicles `origin` releases during `step`: the OD row converted from
/// veh/h to vehicles per step.
pub fn origin_demand(odm: &TimeDependentOdm, origin: OriginId, step: usize, step_hours: f64) -> MixtureFlow {
    MixtureFlow::from_destination_flows(odm.row(origin, step).map(|(d, rate)| (d, rate * step_hours)))
}

/// An origin pushes its whole demand onto its single (connector) link.
pub(crate) fn origin(input: &NodeInput<'_>) -> NodeFlows {
    NodeFlows {
        removed:     Vec::new(),
        added:       vec![input.origin_demand.clone()],
        diagnostics: Vec::new(),
    }
}

/// A sink takes everything offered and checks that it is all bound here.
pub(crate) fn destination(destination: DestinationId, input: &NodeInput<'_>) -> NodeFlows {
    let arriving = &input.sending[0];
    let diagnostics = arriving
        .iter()
        .filter(|&(d, portion)| d != destination && portion > 0.0)
        .map(|(found, portion)| Diagnostic::ImpureDestination {
            node:     input.node,
            step:     input.step,
            expected: destination,
            found,
            flow:     arriving.total() * portion,
        })
        .collect();
    NodeFlows {
        removed: vec![arriving.clone()],
        added:   Vec::new(),
        diagnostics,
    }
}

pub(crate) fn linear(input: &NodeInput<'_>) -> NodeFlows {
    let sending = &input.sending[0];
    let moved = sending.copy_with_flow(sending.total().min(input.receiving[0]));
    NodeFlows {
        removed:     vec![moved.clone()],
        added:       vec![moved],
        diagnostics: Vec::new(),
    }
}
