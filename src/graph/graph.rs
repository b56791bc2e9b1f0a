//! Immutable workflow topology used by the planner.
//!
//! The graph is built once from a node set and a connection list and is
//! read-only afterwards. It is backed by a petgraph `DiGraph` whose edge
//! weights carry the output/input slots of each connection.

use std::collections::{HashMap, HashSet};

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::{Bfs, EdgeRef, Reversed},
};
use tracing::trace;

use crate::{
    PartflowError, Result, WorkflowModel,
    graph::{
        connection::{Connection, Port},
        node::Node,
    },
};

/// Directed multigraph of workflow nodes.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Nodes with their connections as edges.
    graph: DiGraph<Node, Port>,
    /// Node name to graph index.
    names: HashMap<String, NodeIndex>,
}

impl Graph {
    /// Builds a graph from a node set and a connection list.
    ///
    /// Fails with [`PartflowError::InvalidGraph`] if a connection references
    /// a node outside the node set or two nodes share a name or id, and with
    /// [`PartflowError::Argument`] if the same connection is given twice.
    pub fn new(
        nodes: impl IntoIterator<Item = Node>,
        connections: impl IntoIterator<Item = Connection>,
    ) -> Result<Self> {
        let mut graph: DiGraph<Node, Port> = DiGraph::new();
        let mut names = HashMap::new();
        let mut ids = HashSet::new();

        for node in nodes {
            if names.contains_key(&node.name) {
                return Err(PartflowError::InvalidGraph(format!("duplicate node name '{}'", node.name)));
            }
            if !ids.insert(node.id.clone()) {
                return Err(PartflowError::InvalidGraph(format!("duplicate node id '{}'", node.id)));
            }
            let name = node.name.clone();
            let idx = graph.add_node(node);
            names.insert(name, idx);
        }

        let mut seen = HashSet::new();
        for connection in connections {
            let source = Self::resolve(&graph, &names, &connection.from, &connection)?;
            let target = Self::resolve(&graph, &names, &connection.to, &connection)?;
            let port = connection.port();
            if !seen.insert((source, target, port)) {
                return Err(PartflowError::Argument(format!("duplicate connection {}", connection)));
            }
            graph.add_edge(source, target, port);
        }

        Ok(Self {
            graph,
            names,
        })
    }

    fn resolve(
        graph: &DiGraph<Node, Port>,
        names: &HashMap<String, NodeIndex>,
        node: &Node,
        connection: &Connection,
    ) -> Result<NodeIndex> {
        match names.get(&node.name) {
            Some(idx) if graph[*idx].is_same(node) => Ok(*idx),
            _ => Err(PartflowError::InvalidGraph(format!("connection {} references unknown node '{}'", connection, node.name))),
        }
    }

    fn index_of(
        &self,
        node: &Node,
    ) -> Option<NodeIndex> {
        self.names.get(&node.name).copied().filter(|idx| self.graph[*idx].is_same(node))
    }

    /// Output a human-readable representation of the graph
    pub fn schema(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Graph ===".to_string());
        lines.push(format!("Nodes: {}, Connections: {}", self.node_count(), self.connection_count()));
        lines.push(String::new());

        lines.push("--- Nodes ---".to_string());
        for node in self.nodes() {
            if node.node_type.is_empty() {
                lines.push(format!("[{}] {}", node.id, node.name));
            } else {
                lines.push(format!("[{}] {} (type: {})", node.id, node.name, node.node_type));
            }
        }
        lines.push(String::new());

        lines.push("--- Connections ---".to_string());
        let mut connections: Vec<String> = self
            .graph
            .edge_references()
            .map(|e| Connection::from_port(&self.graph[e.source()], &self.graph[e.target()], *e.weight()).to_string())
            .collect();
        connections.sort();
        lines.extend(connections);

        lines.join("\n")
    }

    /// get node by name
    pub fn node(
        &self,
        name: &str,
    ) -> Option<&Node> {
        self.names.get(name).map(|idx| &self.graph[*idx])
    }

    /// check if the node is part of the graph
    pub fn contains(
        &self,
        node: &Node,
    ) -> bool {
        self.index_of(node).is_some()
    }

    /// all nodes, sorted by name
    pub fn nodes(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.graph.node_weights().collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        nodes
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn connection_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All connections whose target is `node`, in no particular order.
    ///
    /// A node without inbound connections, or one that is not part of the
    /// graph, yields an empty list.
    pub fn connections_into(
        &self,
        node: &Node,
    ) -> Vec<Connection> {
        trace!("graph::connections_into({})", node.name);
        self.connections_directed(node, Direction::Incoming)
    }

    /// All connections whose source is `node`, in no particular order.
    pub fn connections_from(
        &self,
        node: &Node,
    ) -> Vec<Connection> {
        self.connections_directed(node, Direction::Outgoing)
    }

    fn connections_directed(
        &self,
        node: &Node,
        direction: Direction,
    ) -> Vec<Connection> {
        self.index_of(node)
            .map(|idx| {
                self.graph
                    .edges_directed(idx, direction)
                    .map(|e| Connection::from_port(&self.graph[e.source()], &self.graph[e.target()], *e.weight()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// distinct direct upstream nodes, sorted by name
    pub fn parents(
        &self,
        node: &Node,
    ) -> Vec<&Node> {
        self.neighbors(node, Direction::Incoming)
    }

    /// distinct direct downstream nodes, sorted by name
    pub fn children(
        &self,
        node: &Node,
    ) -> Vec<&Node> {
        self.neighbors(node, Direction::Outgoing)
    }

    fn neighbors(
        &self,
        node: &Node,
        direction: Direction,
    ) -> Vec<&Node> {
        let Some(idx) = self.index_of(node) else {
            return Vec::new();
        };
        let mut nodes: Vec<&Node> = self.graph.neighbors_directed(idx, direction).map(|n| &self.graph[n]).collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        nodes.dedup_by(|a, b| a.name == b.name);
        nodes
    }

    /// Every node with a path into `node`, excluding `node` itself,
    /// sorted by name.
    pub fn ancestors(
        &self,
        node: &Node,
    ) -> Vec<&Node> {
        let Some(start) = self.index_of(node) else {
            return Vec::new();
        };

        let reversed = Reversed(&self.graph);
        let mut bfs = Bfs::new(reversed, start);
        let mut nodes = Vec::new();
        while let Some(idx) = bfs.next(reversed) {
            if idx != start {
                nodes.push(&self.graph[idx]);
            }
        }
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        nodes
    }
}

impl TryFrom<&WorkflowModel> for Graph {
    type Error = PartflowError;

    fn try_from(model: &WorkflowModel) -> Result<Self> {
        let nodes: Vec<Node> = model.nodes.iter().map(Node::from).collect();
        let by_name: HashMap<&str, &Node> = nodes.iter().map(|n| (n.name.as_str(), n)).collect();

        let mut connections = Vec::with_capacity(model.connections.len());
        for c in model.connections.iter() {
            let from = by_name.get(c.from.as_str()).ok_or(PartflowError::InvalidGraph(format!("source node {} not found", c.from)))?;
            let to = by_name.get(c.to.as_str()).ok_or(PartflowError::InvalidGraph(format!("target node {} not found", c.to)))?;
            connections.push(Connection::new(from, to, c.output_index, c.input_index));
        }

        Self::new(nodes, connections)
    }
}
