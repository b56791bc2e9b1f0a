//! Data availability checks against run data and pinned data.

use crate::data::{
    pin::PinDataStore,
    run::{NoRunData, RunDataStore},
};

/// Answers whether the output of a node is available for reuse.
///
/// A node has data if it has pinned data or an entry in the run data,
/// even an empty one. The stores are read-only snapshots for the lifetime
/// of the oracle.
#[derive(Clone, Copy)]
pub struct DataOracle<'a> {
    run_data: &'a dyn RunDataStore,
    pin_data: &'a dyn PinDataStore,
}

impl<'a> DataOracle<'a> {
    pub fn new(
        run_data: &'a dyn RunDataStore,
        pin_data: &'a dyn PinDataStore,
    ) -> Self {
        Self {
            run_data,
            pin_data,
        }
    }

    /// check if the node has pinned data or run data
    pub fn has_data(
        &self,
        node_name: &str,
    ) -> bool {
        self.has_pinned_data(node_name) || self.has_run_data(node_name)
    }

    pub fn has_pinned_data(
        &self,
        node_name: &str,
    ) -> bool {
        self.pin_data.get(node_name).is_some()
    }

    pub fn has_run_data(
        &self,
        node_name: &str,
    ) -> bool {
        self.run_data.get(node_name).is_some()
    }

    /// A view of this oracle that ignores run data.
    pub fn pinned_only(&self) -> DataOracle<'a> {
        DataOracle {
            run_data: &NoRunData,
            pin_data: self.pin_data,
        }
    }
}
