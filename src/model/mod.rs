//! Data models for process snapshots.
//!
//! - `process`: records parsed from `/proc/[pid]/` files and the
//!   aggregate [`ProcessSnapshot`]
//! - `table`: the read-only map used for fd, environment and limit tables

mod process;
mod table;

pub use process::{
    AddressRange, Device, EnvironmentTable, FdTable, Limit, LimitPair, LimitValue, LimitsTable,
    MemoryMapping, NOT_AVAILABLE, Permissions, ProcStat, ProcStatm, ProcessSnapshot,
};
pub use table::ReadOnlyMap;
