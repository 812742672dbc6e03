//! The closed set of node models.

use crate::inm::MAX_LINKS;
use crate::signals::{BasicSignalPlan, SignalPlan};
use crate::{NodeError, NodeFlows, NodeInput, NodeResult, daganzo, inm, simple, tampere};
use dnl_core::{DestinationId, OriginId};

/// Variants of Tampere's generic node model.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TampereVariant {
    Unsignalized,
    /// Green shares of a fixed-time plan cap each movement.
    Signalized(SignalPlan),
    /// One movement at a time, switched by the simulation clock.
    BasicSignals(BasicSignalPlan),
}

/// Growth priority of the general incremental node model.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InmPriority {
    /// `α_i = C_i` (same as the basic model).
    Capacity,
    /// `α_i = S_i`.
    Demand,
    /// `α_i = max(S_i − q_i, floor · C_i)`.
    ResidualDemand { floor: f64 },
}

/// Variants of the incremental node model.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InmVariant {
    Basic,
    General {
        priority:    InmPriority,
        euler_steps: usize,
    },
    /// Basic growth plus a node supply cap per incoming link, in veh/h.
    ApproximateInmc { node_capacities: Vec<f64> },
}

/// How a node distributes flow between its links.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeModel {
    Origin { origin: OriginId },
    Destination { destination: DestinationId },
    Linear,
    DaganzoDiverge,
    /// `priorities` default to incoming link capacities.
    DaganzoMerge { priorities: Option<Vec<f64>> },
    Tampere(TampereVariant),
    Inm(InmVariant),
}

impl NodeModel {
    pub fn name(&self) -> &'static str {
        match self {
            NodeModel::Origin { .. }      => "origin",
            NodeModel::Destination { .. } => "destination",
            NodeModel::Linear             => "linear",
            NodeModel::DaganzoDiverge     => "Daganzo diverge",
            NodeModel::DaganzoMerge { .. } => "Daganzo merge",
            NodeModel::Tampere(_)         => "Tampere",
            NodeModel::Inm(_)             => "incremental",
        }
    }

    /// Intersections split flow by destination and need turning fractions.
    #[inline]
    pub fn needs_turning_fractions(&self) -> bool {
        matches!(self, NodeModel::DaganzoDiverge | NodeModel::Tampere(_) | NodeModel::Inm(_))
    }

    #[inline]
    pub fn is_origin(&self) -> bool {
        matches!(self, NodeModel::Origin { .. })
    }

    #[inline]
    pub fn is_destination(&self) -> bool {
        matches!(self, NodeModel::Destination { .. })
    }

    /// Check the model against its number of incoming and outgoing links.
    pub fn validate(&self, incoming: usize, outgoing: usize) -> NodeResult<()> {
        let degree = |ok: bool, expected: &'static str| {
            if ok {
                Ok(())
            } else {
                Err(NodeError::Degree { model: self.name(), expected, incoming, outgoing })
            }
        };
        match self {
            NodeModel::Origin { .. } => degree(incoming == 0 && outgoing == 1, "0 incoming and 1 outgoing"),
            NodeModel::Destination { .. } => degree(incoming == 1 && outgoing == 0, "1 incoming and 0 outgoing"),
            NodeModel::Linear => degree(incoming == 1 && outgoing == 1, "1 incoming and 1 outgoing"),
            NodeModel::DaganzoDiverge => degree(incoming == 1 && outgoing >= 1, "1 incoming and at least 1 outgoing"),
            NodeModel::DaganzoMerge { priorities } => {
                degree(incoming >= 1 && outgoing == 1, "at least 1 incoming and 1 outgoing")?;
                match priorities {
                    Some(p) if p.len() != incoming => Err(NodeError::Parameter(format!(
                        "{} merge priorities for {incoming} incoming links",
                        p.len()
                    ))),
                    _ => Ok(()),
                }
            }
            NodeModel::Tampere(variant) => {
                degree(incoming >= 1 && outgoing >= 1, "at least 1 incoming and 1 outgoing")?;
                match variant {
                    TampereVariant::Unsignalized       => Ok(()),
                    TampereVariant::Signalized(plan)   => plan.validate(incoming, outgoing),
                    TampereVariant::BasicSignals(plan) => plan.validate(incoming, outgoing),
                }
            }
            NodeModel::Inm(variant) => {
                degree(incoming >= 1 && outgoing >= 1, "at least 1 incoming and 1 outgoing")?;
                let widest = incoming.max(outgoing);
                if widest > MAX_LINKS {
                    return Err(NodeError::TooManyLinks { model: self.name(), limit: MAX_LINKS, got: widest });
                }
                match variant {
                    InmVariant::General { euler_steps: 0, .. } => {
                        Err(NodeError::Parameter("incremental node needs at least one Euler step".into()))
                    }
                    InmVariant::ApproximateInmc { node_capacities } if node_capacities.len() != incoming => {
                        Err(NodeError::Parameter(format!(
                            "{} node capacities for {incoming} incoming links",
                            node_capacities.len()
                        )))
                    }
                    _ => Ok(()),
                }
            }
        }
    }

    /// Distribute flow for one step.
    pub fn resolve(&self, input: &NodeInput<'_>) -> NodeFlows {
        match self {
            NodeModel::Origin { .. } => simple::origin(input),
            NodeModel::Destination { destination } => simple::destination(*destination, input),
            NodeModel::Linear => simple::linear(input),
            NodeModel::DaganzoDiverge => daganzo::diverge(input),
            NodeModel::DaganzoMerge { priorities } => daganzo::merge(priorities.as_deref(), input),
            NodeModel::Tampere(variant) => tampere::resolve(variant, input),
            NodeModel::Inm(variant) => inm::resolve(variant, input),
        }
    }
}
