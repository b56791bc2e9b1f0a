mod connection;
mod graph;
mod node;

pub use connection::{Connection, Port};
pub use graph::Graph;
pub use node::{Node, NodeId};
