use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeModel {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub node_type: String,
}
