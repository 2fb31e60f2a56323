//! Process snapshot collector for Linux.
//!
//! This module reads `/proc/[pid]/*` into [`ProcessSnapshot`](crate::model::ProcessSnapshot)s,
//! with support for mocking so it can be tested on any host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              ProcessCollector               │
//! │  - /proc/[pid]/{cmdline,environ,fd,...}     │
//! │  - /etc/passwd (UserResolver)               │
//! └──────────────────────┬──────────────────────┘
//!                        │
//!                 ┌──────▼──────┐
//!                 │  FileSystem │ (trait)
//!                 └──────┬──────┘
//!                        │
//!        ┌───────────────┼───────────────┐
//!        │               │               │
//! ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//! │   RealFs    │ │   MockFs    │ │  Scenarios  │
//! │ (Linux)     │ │ (Testing)   │ │ (Fixtures)  │
//! └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use procsnap::collector::{ProcessCollector, RealFs};
//!
//! let collector = ProcessCollector::new(RealFs::new(), "/proc");
//! let snapshot = collector.collect_process(std::process::id()).unwrap();
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use procsnap::collector::{MockFs, PidFilter, ProcessCollector};
//!
//! let collector = ProcessCollector::new(MockFs::typical_system(), "/proc");
//! let pids = collector.list_pids(&PidFilter::All).unwrap();
//! assert_eq!(pids, vec![1, 1000, 1001]);
//! ```

pub mod mock;
pub mod procfs;
pub mod traits;

pub use mock::MockFs;
pub use procfs::{CollectError, PidFilter, ProcessCollector, UserResolver};
pub use traits::{FileSystem, RealFs};
