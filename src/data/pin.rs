//! User-pinned test data.

use std::{
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
};

use serde_json::Value;

use crate::{PartflowError, Result};

/// Pinned items keyed by node name.
pub type PinData = HashMap<String, Vec<Value>>;

/// Read access to a pinned data snapshot.
pub trait PinDataStore {
    fn get(
        &self,
        node_name: &str,
    ) -> Option<&[Value]>;
}

impl<S: BuildHasher> PinDataStore for HashMap<String, Vec<Value>, S> {
    fn get(
        &self,
        node_name: &str,
    ) -> Option<&[Value]> {
        HashMap::get(self, node_name).map(Vec::as_slice)
    }
}

impl PinDataStore for BTreeMap<String, Vec<Value>> {
    fn get(
        &self,
        node_name: &str,
    ) -> Option<&[Value]> {
        BTreeMap::get(self, node_name).map(Vec::as_slice)
    }
}

/// Decodes a pinned data snapshot from JSON.
pub fn pin_data_from_json(s: &str) -> Result<PinData> {
    serde_json::from_str::<PinData>(s).map_err(|e| PartflowError::Convert(format!("invalid pinned data: {}", e)))
}
