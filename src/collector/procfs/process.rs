//! Process collector for building snapshots from `/proc/[pid]/`.

use crate::collector::procfs::parser::{
    ParseError, UserResolver, parse_cmdline, parse_environ, parse_limits, parse_loginuid,
    parse_maps, parse_stat, parse_statm,
};
use crate::collector::procfs::reader::{
    is_unavailable, read_fd_table, read_link_optional, read_optional,
};
use crate::collector::traits::FileSystem;
use crate::model::ProcessSnapshot;
use crate::util::page_size;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Error type for collection failures.
///
/// Missing or inaccessible files are not errors; they leave the matching
/// snapshot field empty.
#[derive(Debug)]
pub enum CollectError {
    /// Unexpected I/O error reading a process file.
    Io { path: PathBuf, source: io::Error },
    /// Malformed content in a process file.
    Parse { path: PathBuf, source: ParseError },
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectError::Io { path, source } => {
                write!(f, "I/O error reading {}: {}", path.display(), source)
            }
            CollectError::Parse { path, source } => write!(f, "{}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Io { source, .. } => Some(source),
            CollectError::Parse { source, .. } => Some(source),
        }
    }
}

/// Which processes [`ProcessCollector::list_pids`] returns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PidFilter {
    #[default]
    All,
    /// Processes whose `/proc/[pid]` directory is owned by this uid.
    Uid(u32),
    /// Processes owned by the uid of this user name.
    User(String),
}

/// Builds [`ProcessSnapshot`]s from `/proc/[pid]/` files.
pub struct ProcessCollector<F: FileSystem> {
    fs: F,
    proc_path: PathBuf,
    page_size: u64,
    users: UserResolver,
}

impl<F: FileSystem> ProcessCollector<F> {
    /// Creates a new process collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            page_size: page_size(),
            users: UserResolver::new(),
        }
    }

    /// Overrides the page size used for page -> byte conversion.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the resolver used for [`PidFilter::User`].
    pub fn with_users(mut self, users: UserResolver) -> Self {
        self.users = users;
        self
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn users(&self) -> &UserResolver {
        &self.users
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Path of `parts` inside the process directory of `pid`.
    pub fn pid_path(&self, pid: u32, parts: &[&str]) -> PathBuf {
        let mut path = self.proc_path.join(pid.to_string());
        path.extend(parts);
        path
    }

    /// Reads and parses one process file. `None` when the file is unavailable.
    fn parse_file<T>(
        &self,
        pid: u32,
        name: &str,
        parse: impl FnOnce(&str) -> Result<T, ParseError>,
    ) -> Result<Option<T>, CollectError> {
        let path = self.pid_path(pid, &[name]);
        match read_optional(&self.fs, &path)? {
            Some(content) => parse(&content)
                .map(Some)
                .map_err(|source| CollectError::Parse { path, source }),
            None => Ok(None),
        }
    }

    /// Collects a snapshot of a single process.
    ///
    /// Every file is read exactly once. A process that has exited yields a
    /// snapshot with every field empty.
    pub fn collect_process(&self, pid: u32) -> Result<ProcessSnapshot, CollectError> {
        let page_size = self.page_size;

        let args = self.parse_file(pid, "cmdline", |c| Ok(parse_cmdline(c)))?;
        let environ = self.parse_file(pid, "environ", |c| Ok(parse_environ(c)))?;
        let fds = read_fd_table(&self.fs, &self.pid_path(pid, &["fd"]))?;
        let limits = self.parse_file(pid, "limits", parse_limits)?;
        let loginuid = self.parse_file(pid, "loginuid", parse_loginuid)?;
        let maps = self.parse_file(pid, "maps", parse_maps)?;
        let root = read_link_optional(&self.fs, &self.pid_path(pid, &["root"]))?;
        let stat = self.parse_file(pid, "stat", |c| parse_stat(c, page_size))?;
        let statm = self.parse_file(pid, "statm", |c| parse_statm(c, page_size))?;

        Ok(ProcessSnapshot {
            pid,
            args,
            environ,
            fds,
            limits,
            loginuid,
            maps,
            root,
            stat,
            statm,
        })
    }

    /// Lists process IDs under the proc root, sorted ascending.
    ///
    /// Processes that disappear while being listed are skipped.
    pub fn list_pids(&self, filter: &PidFilter) -> Result<Vec<u32>, CollectError> {
        let uid = match filter {
            PidFilter::All => None,
            PidFilter::Uid(uid) => Some(*uid),
            PidFilter::User(name) => match self.users.uid_of(name) {
                Some(uid) => Some(uid),
                None => {
                    debug!("unknown user {:?}, no processes match", name);
                    return Ok(Vec::new());
                }
            },
        };

        let entries = self
            .fs
            .read_dir(&self.proc_path)
            .map_err(|source| CollectError::Io {
                path: self.proc_path.clone(),
                source,
            })?;

        let mut pids = Vec::new();
        for entry in entries {
            // Check if entry is a PID directory (numeric name)
            let Some(pid) = pid_of(&entry) else {
                continue;
            };

            if let Some(uid) = uid {
                match self.fs.owner_uid(&entry) {
                    Ok(owner) if owner == uid => {}
                    Ok(_) => continue,
                    Err(e) if is_unavailable(&e) => continue,
                    Err(source) => return Err(CollectError::Io { path: entry, source }),
                }
            }
            pids.push(pid);
        }

        pids.sort_unstable();
        Ok(pids)
    }

    /// Collects snapshots of every process matching `filter`.
    ///
    /// A process whose snapshot fails is logged and skipped.
    pub fn collect_all(&self, filter: &PidFilter) -> Result<Vec<ProcessSnapshot>, CollectError> {
        let pids = self.list_pids(filter)?;

        let mut snapshots = Vec::with_capacity(pids.len());
        for pid in pids {
            match self.collect_process(pid) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => warn!("skipping process {}: {}", pid, e),
            }
        }

        Ok(snapshots)
    }
}

/// Returns the pid for an all-digit directory name.
fn pid_of(entry: &Path) -> Option<u32> {
    let name = entry.file_name()?.to_str()?;
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}
