//! Run data, pinned data and the availability oracle built on top of them.

mod oracle;
mod pin;
mod run;

pub use oracle::DataOracle;
pub use pin::{PinData, PinDataStore, pin_data_from_json};
pub use run::{ExecutionStatus, RunData, RunDataStore, RunRecord, run_data_from_json};
