//! procsnap - point-in-time snapshots of Linux processes.
//!
//! This library reads `/proc/[pid]/` into immutable [`model::ProcessSnapshot`]
//! values. It is used by the `procsnap` command line tool.

pub mod collector;
pub mod model;
pub mod util;
