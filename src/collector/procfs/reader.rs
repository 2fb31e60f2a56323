//! Raw readers for `/proc/[pid]/` entries.
//!
//! A process may exit or be off-limits to the caller at any time, so
//! `NotFound`, `PermissionDenied` and `ESRCH` are reported as `None`. Any
//! other failure (I/O errors, invalid UTF-8) is returned as a [`CollectError`].

use crate::collector::procfs::parser::{ParseError, Record};
use crate::collector::procfs::process::CollectError;
use crate::collector::traits::FileSystem;
use crate::model::FdTable;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Returns true for errors meaning "this data is not available to us".
///
/// `ESRCH` comes from kernel threads, which have no `mm` behind `environ`,
/// and from processes that exit between `open` and `read`.
pub fn is_unavailable(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
    ) || err.raw_os_error() == Some(libc::ESRCH)
}

fn classify<T>(path: &Path, result: io::Result<T>) -> Result<Option<T>, CollectError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if is_unavailable(&e) => {
            debug!("{} unavailable: {}", path.display(), e);
            Ok(None)
        }
        Err(e) => Err(CollectError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Reads a whole file, or `None` if it is missing or not readable.
pub fn read_optional<F: FileSystem>(fs: &F, path: &Path) -> Result<Option<String>, CollectError> {
    classify(path, fs.read_to_string(path))
}

/// Resolves a symbolic link, or `None` if it is missing or not readable.
pub fn read_link_optional<F: FileSystem>(
    fs: &F,
    path: &Path,
) -> Result<Option<PathBuf>, CollectError> {
    classify(path, fs.read_link(path))
}

/// Reads the `/proc/[pid]/fd` directory into an fd -> target table.
///
/// The table is all or nothing: if the directory is unavailable or any of
/// its links is denied the whole table is `None`. Descriptors closed while
/// the directory is being read are left out.
pub fn read_fd_table<F: FileSystem>(
    fs: &F,
    fd_dir: &Path,
) -> Result<Option<FdTable>, CollectError> {
    let Some(entries) = classify(fd_dir, fs.read_dir(fd_dir))? else {
        return Ok(None);
    };

    let mut fds = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = entry
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let fd: u32 = name.parse().map_err(|e| CollectError::Parse {
            path: entry.clone(),
            source: ParseError::new(Record::Fd, "fd", format!("{:?}: {}", name, e)),
        })?;

        match fs.read_link(&entry) {
            Ok(target) => fds.push((fd, target)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("fd {} closed while listing {}", fd, fd_dir.display());
            }
            Err(e) if is_unavailable(&e) => {
                debug!("{} unavailable: {}", entry.display(), e);
                return Ok(None);
            }
            Err(source) => return Err(CollectError::Io { path: entry, source }),
        }
    }

    Ok(Some(fds.into_iter().collect()))
}
