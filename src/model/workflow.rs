use serde::{Deserialize, Serialize};

use crate::{
    PartflowError, Result,
    model::{ConnectionModel, NodeModel},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowModel {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub nodes: Vec<NodeModel>,
    #[serde(default)]
    pub connections: Vec<ConnectionModel>,
}

impl WorkflowModel {
    pub fn from_json(s: &str) -> Result<Self> {
        let workflow = serde_json::from_str::<WorkflowModel>(s);
        match workflow {
            Ok(v) => Ok(v),
            Err(e) => Err(PartflowError::Convert(format!("invalid workflow definition: {}", e))),
        }
    }
}
