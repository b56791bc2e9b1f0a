use serde::{Deserialize, Serialize};

/// A connection as written in a workflow definition.
///
/// `from` and `to` hold node names.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionModel {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub output_index: usize,
    #[serde(default)]
    pub input_index: usize,
}
