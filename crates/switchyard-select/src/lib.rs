//! Switchyard Select - test selection and duration-balanced sharding
//!
//! Phase A maps a changed-file delta to the set of test files worth
//! running, degrading to a run-everything sentinel whenever the
//! selection cannot be computed. Phase B splits the eligible set across
//! parallel shards with longest-processing-time-first bin packing over
//! persisted per-test durations.

pub mod discovery;
pub mod durations;
pub mod mapper;
pub mod selection;
pub mod shard;

pub use discovery::{discover_suite, DiscoveryError};
pub use durations::{DurationMap, DurationStore, Fingerprint, StoreError};
pub use mapper::{ChangeMapper, MappedChange, MapperError};
pub use selection::{
    compute_selection, read_selection, select_for_changes, write_selection, Selection,
    SelectionReason, Trigger, FULL_SUITE_SENTINEL,
};
pub use shard::{ShardError, ShardPlan};
