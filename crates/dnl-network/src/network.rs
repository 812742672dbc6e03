//! Dynamic network representation and builder.
//!
//! # Data layout
//!
//! Links and nodes live in two arenas indexed by `LinkId` and `NodeId`.  A
//! link names its end nodes; a node lists its incoming and outgoing links in
//! insertion order, which is also the row/column order of its turning
//! fraction tables.  No object holds a reference to another, so the cyclic
//! link ↔ node graph needs no shared ownership.

use dnl_core::{DestinationId, DnlError, LinkId, NodeId, OriginId};
use dnl_link::{FundamentalDiagram, Link, LinkKind};
use dnl_node::NodeModel;

use crate::{NetworkError, NetworkResult};

/// Nominal connector capacity in veh/h.  Only weighs merge priorities.
pub const DEFAULT_CONNECTOR_CAPACITY: f64 = 10_000.0;

// ── Node ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Node {
    pub id:       NodeId,
    pub model:    NodeModel,
    pub incoming: Vec<LinkId>,
    pub outgoing: Vec<LinkId>,
    /// Position in [`DynamicNetwork::intersections`] for nodes that need
    /// turning fractions.
    pub intersection: Option<usize>,
}

// ── DynamicNetwork ────────────────────────────────────────────────────────────

/// All links and nodes of one loading problem.
///
/// Fields are `pub` for indexed access on hot paths.  Do not construct
/// directly; use [`DynamicNetworkBuilder`].
#[derive(Clone, Debug)]
pub struct DynamicNetwork {
    pub links: Vec<Link>,
    pub nodes: Vec<Node>,

    origins:       Vec<NodeId>,
    destinations:  Vec<NodeId>,
    intersections: Vec<NodeId>,
    connectors:    Vec<LinkId>,
}

impl DynamicNetwork {
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id.index()]
    }

    #[inline]
    pub fn link_mut(&mut self, id: LinkId) -> &mut Link {
        &mut self.links[id.index()]
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Origin nodes in insertion order.
    pub fn origins(&self) -> &[NodeId] {
        &self.origins
    }

    /// Destination nodes in insertion order.
    pub fn destinations(&self) -> &[NodeId] {
        &self.destinations
    }

    /// Nodes that need turning fractions, in the order the tables are indexed.
    pub fn intersections(&self) -> &[NodeId] {
        &self.intersections
    }

    pub fn connectors(&self) -> &[LinkId] {
        &self.connectors
    }

    /// `(incoming, outgoing)` of every intersection, for validating turning
    /// fraction tables.
    pub fn intersection_degrees(&self) -> Vec<(usize, usize)> {
        self.intersections
            .iter()
            .map(|&n| {
                let node = self.node(n);
                (node.incoming.len(), node.outgoing.len())
            })
            .collect()
    }

    /// One more than the largest origin id, the row count an OD matrix needs.
    pub fn origin_span(&self) -> usize {
        self.origins
            .iter()
            .filter_map(|&n| origin_of(&self.node(n).model))
            .map(|o| o.index() + 1)
            .max()
            .unwrap_or(0)
    }

    /// One more than the largest destination id.
    pub fn destination_span(&self) -> usize {
        self.destinations
            .iter()
            .filter_map(|&n| destination_of(&self.node(n).model))
            .map(|d| d.index() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Number of steps the link histories cover.
    pub fn steps(&self) -> usize {
        self.links.first().map_or(0, Link::steps)
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Size every link history for `steps` steps of `step_hours` each.
    pub fn allocate(&mut self, steps: usize, step_hours: f64) {
        for link in &mut self.links {
            link.allocate(steps, step_hours);
        }
    }

    /// Reset every link; see [`Link::reset`].
    pub fn reset(&mut self, hard: bool) {
        for link in &mut self.links {
            link.reset(hard);
        }
    }

    /// Freeze every link from `boundary` on; see [`Link::hold_from`].
    pub fn hold_from(&mut self, boundary: usize) {
        for link in &mut self.links {
            link.hold_from(boundary);
        }
    }

    // ── Aggregates ────────────────────────────────────────────────────────

    /// Vehicles on the network at boundary `t`.
    ///
    /// # Panics
    ///
    /// Panics if `t > self.steps()`.
    pub fn total_flow_on_network(&self, t: usize) -> f64 {
        self.links.iter().map(|l| l.occupancy_at(t)).sum()
    }

    /// `true` if any vehicle crossed any link boundary during step `t`.
    pub fn changed(&self, t: usize) -> bool {
        self.links
            .iter()
            .any(|l| !l.inflow[t].is_zero() || !l.outflow[t].is_zero())
    }
}

// ── DynamicNetworkBuilder ─────────────────────────────────────────────────────

/// Construct a [`DynamicNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use dnl_core::{DestinationId, OriginId};
/// use dnl_link::{FundamentalDiagram, LinkKind};
/// use dnl_network::DynamicNetworkBuilder;
/// use dnl_node::NodeModel;
///
/// let mut b = DynamicNetworkBuilder::new();
/// let o = b.add_node(NodeModel::Origin { origin: OriginId(0) });
/// let a = b.add_node(NodeModel::Linear);
/// let z = b.add_node(NodeModel::Destination { destination: DestinationId(0) });
/// b.add_connector(o, a);
/// b.add_link(a, z, FundamentalDiagram::triangular(1.0, 1_800.0, 90.0, 150.0).unwrap(), LinkKind::Ltm);
/// let net = b.build().unwrap();
/// assert_eq!(net.link_count(), 2);
/// assert_eq!(net.origins().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct DynamicNetworkBuilder {
    nodes: Vec<NodeModel>,
    links: Vec<RawLink>,
}

#[derive(Clone, Debug)]
struct RawLink {
    from: NodeId,
    to:   NodeId,
    fd:   FundamentalDiagram,
    kind: LinkKind,
}

impl DynamicNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize, links: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            links: Vec::with_capacity(links),
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, model: NodeModel) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(model);
        id
    }

    /// Add a directed link and return its `LinkId` (sequential from 0).
    pub fn add_link(&mut self, from: NodeId, to: NodeId, fd: FundamentalDiagram, kind: LinkKind) -> LinkId {
        let id = LinkId(self.links.len() as u32);
        self.links.push(RawLink { from, to, fd, kind });
        id
    }

    /// Add a link with a triangular diagram derived from capacity, free-flow
    /// speed and jam density.
    pub fn add_triangular_link(
        &mut self,
        from:        NodeId,
        to:          NodeId,
        length:      f64,
        capacity:    f64,
        free_speed:  f64,
        jam_density: f64,
        kind:        LinkKind,
    ) -> NetworkResult<LinkId> {
        let fd = FundamentalDiagram::triangular(length, capacity, free_speed, jam_density)?;
        Ok(self.add_link(from, to, fd, kind))
    }

    /// Add a virtual connector with the default nominal capacity.
    pub fn add_connector(&mut self, from: NodeId, to: NodeId) -> LinkId {
        self.add_connector_with_capacity(from, to, DEFAULT_CONNECTOR_CAPACITY)
    }

    pub fn add_connector_with_capacity(&mut self, from: NodeId, to: NodeId, capacity: f64) -> LinkId {
        self.add_link(from, to, FundamentalDiagram::connector(capacity), LinkKind::Connector)
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn link_count(&self) -> usize { self.links.len() }

    /// Consume the builder, wire up adjacency and validate every node.
    pub fn build(self) -> NetworkResult<DynamicNetwork> {
        let node_count = self.nodes.len();

        let mut incoming = vec![Vec::new(); node_count];
        let mut outgoing = vec![Vec::new(); node_count];
        let mut links = Vec::with_capacity(self.links.len());
        for (k, raw) in self.links.into_iter().enumerate() {
            let id = LinkId(k as u32);
            for end in [raw.from, raw.to] {
                if end.index() >= node_count {
                    return Err(DnlError::NodeNotFound(end).into());
                }
            }
            outgoing[raw.from.index()].push(id);
            incoming[raw.to.index()].push(id);
            links.push(Link::new(id, raw.from, raw.to, raw.fd, raw.kind));
        }

        let mut origins       = Vec::new();
        let mut destinations  = Vec::new();
        let mut intersections = Vec::new();
        let mut seen_origins      = Vec::new();
        let mut seen_destinations = Vec::new();

        let mut nodes = Vec::with_capacity(node_count);
        for (k, ((model, inc), out)) in self.nodes.into_iter().zip(incoming).zip(outgoing).enumerate() {
            let id = NodeId(k as u32);
            model
                .validate(inc.len(), out.len())
                .map_err(|source| NetworkError::Node { node: id, source })?;

            match &model {
                NodeModel::Origin { origin } => {
                    if seen_origins.contains(origin) {
                        return Err(NetworkError::DuplicateOrigin(*origin));
                    }
                    seen_origins.push(*origin);
                    if !links[out[0].index()].is_connector() {
                        return Err(NetworkError::OriginWithoutConnector { node: id });
                    }
                    origins.push(id);
                }
                NodeModel::Destination { destination } => {
                    if seen_destinations.contains(destination) {
                        return Err(NetworkError::DuplicateDestination(*destination));
                    }
                    seen_destinations.push(*destination);
                    destinations.push(id);
                }
                _ => {}
            }

            let intersection = model.needs_turning_fractions().then(|| {
                intersections.push(id);
                intersections.len() - 1
            });
            nodes.push(Node { id, model, incoming: inc, outgoing: out, intersection });
        }

        let connectors = links.iter().filter(|l| l.is_connector()).map(|l| l.id).collect();

        Ok(DynamicNetwork { links, nodes, origins, destinations, intersections, connectors })
    }
}

/// Look up the origin id of an origin node.
pub fn origin_of(model: &NodeModel) -> Option<OriginId> {
    match model {
        NodeModel::Origin { origin } => Some(*origin),
        _ => None,
    }
}

/// Look up the destination id of a destination node.
pub fn destination_of(model: &NodeModel) -> Option<DestinationId> {
    match model {
        NodeModel::Destination { destination } => Some(*destination),
        _ => None,
    }
}
