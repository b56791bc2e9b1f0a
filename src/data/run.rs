//! Historical run data recorded by earlier executions.

use std::{
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
};

use serde::{Deserialize, Serialize};

use crate::{PartflowError, Result};

/// Outcome of a recorded node run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExecutionStatus {
    #[default]
    Success,
    Error,
    Canceled,
    Waiting,
}

/// One recorded run of a node.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RunRecord {
    /// start time in milliseconds
    #[serde(default)]
    pub start_time: i64,
    /// execution time in milliseconds
    #[serde(default)]
    pub execution_time: u64,
    #[serde(default)]
    pub status: ExecutionStatus,
    /// produced output
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run data snapshot keyed by node name.
pub type RunData = HashMap<String, Vec<RunRecord>>;

/// Read access to a run data snapshot.
///
/// The presence of an entry, even an empty one, means the node has run.
pub trait RunDataStore {
    fn get(
        &self,
        node_name: &str,
    ) -> Option<&[RunRecord]>;
}

impl<S: BuildHasher> RunDataStore for HashMap<String, Vec<RunRecord>, S> {
    fn get(
        &self,
        node_name: &str,
    ) -> Option<&[RunRecord]> {
        HashMap::get(self, node_name).map(Vec::as_slice)
    }
}

impl RunDataStore for BTreeMap<String, Vec<RunRecord>> {
    fn get(
        &self,
        node_name: &str,
    ) -> Option<&[RunRecord]> {
        BTreeMap::get(self, node_name).map(Vec::as_slice)
    }
}

/// Store with no run data at all.
pub(crate) struct NoRunData;

impl RunDataStore for NoRunData {
    fn get(
        &self,
        _node_name: &str,
    ) -> Option<&[RunRecord]> {
        None
    }
}

/// Decodes a run data snapshot from JSON.
pub fn run_data_from_json(s: &str) -> Result<RunData> {
    serde_json::from_str::<RunData>(s).map_err(|e| PartflowError::Convert(format!("invalid run data: {}", e)))
}
