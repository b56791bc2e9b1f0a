//! Workflow node as seen by the planner.

use serde::{Deserialize, Serialize};

use crate::model::NodeModel;

/// node id
pub type NodeId = String;

/// A node of the workflow graph.
///
/// The name is unique within a workflow and doubles as the tie-break key
/// whenever the planner has to order nodes or connections.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node {
    /// node id
    pub id: NodeId,
    /// node name
    pub name: String,
    /// node type, opaque to the planner
    #[serde(default)]
    pub node_type: String,
}

impl Node {
    pub fn new(
        id: impl Into<NodeId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: String::new(),
        }
    }

    /// check if both refer to the same workflow node, ignoring the type
    pub fn is_same(
        &self,
        other: &Node,
    ) -> bool {
        self.id == other.id && self.name == other.name
    }

    pub fn with_type(
        mut self,
        node_type: impl Into<String>,
    ) -> Self {
        self.node_type = node_type.into();
        self
    }
}

impl From<&NodeModel> for Node {
    fn from(model: &NodeModel) -> Self {
        Self {
            id: model.id.clone(),
            name: model.name.clone(),
            node_type: model.node_type.clone(),
        }
    }
}
