//! Per-item work for each scan mode.

pub mod alive;
pub mod harvest;
pub mod probe;

pub use alive::AliveJob;
pub use harvest::{HarvestJob, audit_entry};
pub use probe::ProbeJob;
