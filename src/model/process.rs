//! Per-process records captured from `/proc/[pid]/`.
//!
//! Every record here is plain owned data. A [`ProcessSnapshot`] holds no
//! reference back to the filesystem; observing newer state means collecting
//! a new snapshot.

use crate::collector::procfs::parser::UserResolver;
use crate::model::table::ReadOnlyMap;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Placeholder shown when a login user cannot be determined.
pub const NOT_AVAILABLE: &str = "N/A";

/// Bounds of one mapped memory region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddressRange {
    pub start: u64,
    pub end: u64,
}

impl AddressRange {
    /// Size of the region in bytes.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Access flags of a mapped region, e.g. `r-xp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permissions {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
    pub shared: bool,
    pub private: bool,
    pub raw: String,
}

impl Permissions {
    pub fn from_raw(raw: &str) -> Self {
        Self {
            read: raw.contains('r'),
            write: raw.contains('w'),
            execute: raw.contains('x'),
            shared: raw.contains('s'),
            private: raw.contains('p'),
            raw: raw.to_string(),
        }
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Backing block device of a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Device {
    pub major: u32,
    pub minor: u32,
}

/// One line of `/proc/[pid]/maps`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryMapping {
    pub addresses: AddressRange,
    pub perms: Permissions,
    pub offset: u64,
    pub device: Device,
    pub inode: u64,
    /// File path, `[heap]`, `[stack]` and similar. `None` for anonymous mappings.
    pub pathname: Option<String>,
}

/// Value column of `/proc/[pid]/limits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LimitValue {
    Integer(i64),
    /// Non-numeric values, in practice `unlimited`.
    Text(String),
}

impl LimitValue {
    /// Numeric values parse as integers, everything else is kept verbatim.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(n) => LimitValue::Integer(n),
            Err(_) => LimitValue::Text(raw.to_string()),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            LimitValue::Integer(n) => Some(*n),
            LimitValue::Text(_) => None,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, LimitValue::Text(s) if s == "unlimited")
    }
}

impl fmt::Display for LimitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitValue::Integer(n) => write!(f, "{}", n),
            LimitValue::Text(s) => f.write_str(s),
        }
    }
}

/// One resource limit value together with its units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Limit {
    pub value: LimitValue,
    /// Units column, or [`NOT_AVAILABLE`] when the kernel prints none.
    pub units: String,
}

/// Soft and hard values of one resource limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitPair {
    pub soft: Limit,
    pub hard: Limit,
}

/// Parsed data from `/proc/[pid]/stat`.
///
/// Field order follows proc(5). `rss`, `nswap` and `cnswap` are converted
/// from pages to bytes; every other field is kept in kernel units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcStat {
    pub pid: u32,
    /// Executable name without the surrounding parentheses.
    pub comm: String,
    pub state: char,
    pub ppid: u32,
    pub pgrp: i32,
    pub session: i32,
    pub tty_nr: i32,
    pub tpgid: i32,
    pub flags: u32,
    pub minflt: u64,
    pub cminflt: u64,
    pub majflt: u64,
    pub cmajflt: u64,
    pub utime: u64,
    pub stime: u64,
    pub cutime: i64,
    pub cstime: i64,
    pub priority: i64,
    pub nice: i64,
    pub num_threads: i64,
    pub itrealvalue: i64,
    pub starttime: u64,
    pub vsize: u64,
    /// Resident set size in bytes.
    pub rss: u64,
    pub rsslim: u64,
    pub startcode: u64,
    pub endcode: u64,
    pub startstack: u64,
    pub kstkesp: u64,
    pub kstkeip: u64,
    pub signal: u64,
    pub blocked: u64,
    pub sigignore: u64,
    pub sigcatch: u64,
    pub wchan: u64,
    /// Swapped bytes (not maintained by modern kernels).
    pub nswap: u64,
    /// Cumulative swapped bytes of children (not maintained by modern kernels).
    pub cnswap: u64,
    pub exit_signal: i32,
    pub processor: i32,
    pub rt_priority: u32,
    pub policy: u32,
    pub delayacct_blkio_ticks: u64,
    pub guest_time: u64,
    pub cguest_time: i64,
}

/// Parsed data from `/proc/[pid]/statm`, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcStatm {
    pub size: u64,
    pub resident: u64,
    pub shared: u64,
    pub text: u64,
    pub lib: u64,
    pub data: u64,
    pub unused: u64,
}

/// Open file descriptors: fd number to link target.
pub type FdTable = ReadOnlyMap<u32, PathBuf>;

/// Environment variables. Entries without `=` map to `None`.
pub type EnvironmentTable = ReadOnlyMap<String, Option<String>>;

/// Resource limits keyed by limit name, e.g. `Max open files`.
pub type LimitsTable = ReadOnlyMap<String, LimitPair>;

/// Point-in-time view of one process.
///
/// Each optional field is `None` when its source file was missing or not
/// readable by the caller at capture time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessSnapshot {
    pub pid: u32,
    pub args: Option<Vec<String>>,
    pub environ: Option<EnvironmentTable>,
    pub fds: Option<FdTable>,
    pub limits: Option<LimitsTable>,
    pub loginuid: Option<u32>,
    pub maps: Option<Vec<MemoryMapping>>,
    pub root: Option<PathBuf>,
    pub stat: Option<ProcStat>,
    pub statm: Option<ProcStatm>,
}

impl ProcessSnapshot {
    /// Command line rebuilt from the argument list.
    pub fn cmdline(&self) -> Option<String> {
        self.args.as_ref().map(|args| args.join(" "))
    }

    /// Name of the login user, or [`NOT_AVAILABLE`].
    pub fn login_user(&self, users: &UserResolver) -> String {
        self.loginuid
            .and_then(|uid| users.name_of(uid))
            .unwrap_or(NOT_AVAILABLE)
            .to_string()
    }

    /// `pid user cmdline` line in the classic `ps`-like layout.
    pub fn summary_line(&self, users: &UserResolver) -> String {
        format!(
            "{:>10} {:>8} {}",
            self.pid,
            self.login_user(users),
            self.cmdline().unwrap_or_default()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_snapshot(pid: u32) -> ProcessSnapshot {
        ProcessSnapshot {
            pid,
            args: None,
            environ: None,
            fds: None,
            limits: None,
            loginuid: None,
            maps: None,
            root: None,
            stat: None,
            statm: None,
        }
    }

    #[test]
    fn test_permissions_private_executable() {
        let perms = Permissions::from_raw("r-xp");
        assert!(perms.read);
        assert!(!perms.write);
        assert!(perms.execute);
        assert!(!perms.shared);
        assert!(perms.private);
        assert_eq!(perms.to_string(), "r-xp");
    }

    #[test]
    fn test_permissions_shared_writable() {
        let perms = Permissions::from_raw("rw-s");
        assert!(perms.read && perms.write && perms.shared);
        assert!(!perms.execute && !perms.private);
    }

    #[test]
    fn test_limit_value_coercion() {
        assert_eq!(LimitValue::parse(" 8388608 "), LimitValue::Integer(8388608));
        assert_eq!(
            LimitValue::parse("unlimited           "),
            LimitValue::Text("unlimited".to_string())
        );
        assert!(LimitValue::parse("unlimited").is_unlimited());
        assert_eq!(LimitValue::parse("1024").as_integer(), Some(1024));
        assert_eq!(LimitValue::parse("unlimited").as_integer(), None);
    }

    #[test]
    fn test_address_range_len() {
        let range = AddressRange {
            start: 0x1000,
            end: 0x3000,
        };
        assert_eq!(range.len(), 0x2000);
        assert!(!range.is_empty());
    }

    #[test]
    fn test_cmdline_joins_args() {
        let mut snapshot = empty_snapshot(42);
        snapshot.args = Some(vec!["/bin/bash".to_string(), "--login".to_string()]);
        assert_eq!(snapshot.cmdline().as_deref(), Some("/bin/bash --login"));
    }

    #[test]
    fn test_cmdline_absent_without_args() {
        assert_eq!(empty_snapshot(42).cmdline(), None);
    }

    #[test]
    fn test_login_user_resolution() {
        let mut users = UserResolver::new();
        users.load_from_content(
            "root:x:0:0::/root:/bin/bash\nuser:x:1000:1000::/home/user:/bin/bash",
        );

        let mut snapshot = empty_snapshot(42);
        assert_eq!(snapshot.login_user(&users), NOT_AVAILABLE);

        snapshot.loginuid = Some(1000);
        assert_eq!(snapshot.login_user(&users), "user");

        snapshot.loginuid = Some(4242);
        assert_eq!(snapshot.login_user(&users), NOT_AVAILABLE);
    }

    #[test]
    fn test_summary_line_layout() {
        let mut users = UserResolver::new();
        users.load_from_content("root:x:0:0::/root:/bin/bash");

        let mut snapshot = empty_snapshot(1);
        snapshot.loginuid = Some(0);
        snapshot.args = Some(vec!["/sbin/init".to_string(), "splash".to_string()]);

        assert_eq!(
            snapshot.summary_line(&users),
            "         1     root /sbin/init splash"
        );
    }

    #[test]
    fn test_limit_value_serializes_untagged() {
        let soft = Limit {
            value: LimitValue::Integer(1024),
            units: "files".to_string(),
        };
        let hard = Limit {
            value: LimitValue::Text("unlimited".to_string()),
            units: "files".to_string(),
        };
        let json = serde_json::to_string(&LimitPair { soft, hard }).unwrap();
        assert_eq!(
            json,
            r#"{"soft":{"value":1024,"units":"files"},"hard":{"value":"unlimited","units":"files"}}"#
        );
    }
}
