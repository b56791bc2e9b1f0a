//! Directed, indexed connections between nodes.
//!
//! Several connections may target the same input slot of a node (fan-in).
//! Connections are value objects; the graph owns them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::node::Node;

/// Output and input slot of a stored connection.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Port {
    pub output_index: usize,
    pub input_index: usize,
}

/// A connection from an output slot of one node to an input slot of another.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Connection {
    /// Source node.
    pub from: Node,
    /// Target node.
    pub to: Node,
    /// Output slot of the source node.
    pub output_index: usize,
    /// Input slot of the target node.
    pub input_index: usize,
}

impl Connection {
    pub fn new(
        from: &Node,
        to: &Node,
        output_index: usize,
        input_index: usize,
    ) -> Self {
        Self {
            from: from.clone(),
            to: to.clone(),
            output_index,
            input_index,
        }
    }

    pub(crate) fn from_port(
        from: &Node,
        to: &Node,
        port: Port,
    ) -> Self {
        Self::new(from, to, port.output_index, port.input_index)
    }

    pub(crate) fn port(&self) -> Port {
        Port {
            output_index: self.output_index,
            input_index: self.input_index,
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}[{}] -> {}[{}]", self.from.name, self.output_index, self.to.name, self.input_index)
    }
}
