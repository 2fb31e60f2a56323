//! In-memory mock filesystem for testing collectors without real `/proc`.
//!
//! `MockFs` simulates files, directories, symbolic links, ownership and
//! access failures in memory, so collectors can be tested on any host.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Paths marked with [`MockFs::deny`] fail with `PermissionDenied`, paths
/// marked with [`MockFs::fail`] fail with the given error kind and paths
/// marked with [`MockFs::fail_os`] fail with a raw errno. Ownership
/// defaults to uid 0 unless set with [`MockFs::set_owner`].
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
    /// Map from link path to link target.
    symlinks: HashMap<PathBuf, PathBuf>,
    owners: HashMap<PathBuf, u32>,
    denied: HashSet<PathBuf>,
    failures: HashMap<PathBuf, io::ErrorKind>,
    os_failures: HashMap<PathBuf, i32>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Adds a symbolic link pointing at `target`.
    ///
    /// The target does not need to exist, as with fd links to sockets.
    pub fn add_symlink(&mut self, path: impl AsRef<Path>, target: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.symlinks.insert(path, target.as_ref().to_path_buf());
    }

    /// Sets the owning uid of `path`.
    pub fn set_owner(&mut self, path: impl AsRef<Path>, uid: u32) {
        self.owners.insert(path.as_ref().to_path_buf(), uid);
    }

    /// Makes every access to `path` fail with `PermissionDenied`.
    pub fn deny(&mut self, path: impl AsRef<Path>) {
        self.denied.insert(path.as_ref().to_path_buf());
    }

    /// Makes every access to `path` fail with an error of `kind`.
    pub fn fail(&mut self, path: impl AsRef<Path>, kind: io::ErrorKind) {
        self.failures.insert(path.as_ref().to_path_buf(), kind);
    }

    /// Makes every access to `path` fail with OS error `errno`, e.g.
    /// `libc::ESRCH` as returned for a kernel thread's `environ`.
    pub fn fail_os(&mut self, path: impl AsRef<Path>, errno: i32) {
        self.os_failures.insert(path.as_ref().to_path_buf(), errno);
    }

    /// Adds a `/proc/[pid]` directory owned by `uid` with the given files.
    ///
    /// # Arguments
    /// * `pid` - Process ID
    /// * `uid` - Owner of the process directory
    /// * `files` - `(name, content)` pairs relative to the process directory
    pub fn add_process(&mut self, pid: u32, uid: u32, files: &[(&str, &str)]) {
        let base = PathBuf::from(format!("/proc/{}", pid));
        self.add_dir(&base);
        self.set_owner(&base, uid);
        for (name, content) in files {
            self.add_file(base.join(name), *content);
        }
    }

    /// Adds `/proc/[pid]/fd/N` links.
    pub fn add_fds(&mut self, pid: u32, fds: &[(u32, &str)]) {
        let fd_dir = PathBuf::from(format!("/proc/{}/fd", pid));
        self.add_dir(&fd_dir);
        for (fd, target) in fds {
            self.add_symlink(fd_dir.join(fd.to_string()), target);
        }
    }

    /// Loads a mock filesystem from a directory snapshot.
    ///
    /// This is useful for regression tests with real `/proc` snapshots.
    pub fn from_snapshot(dir: &Path) -> io::Result<Self> {
        let mut fs = Self::new();
        load_directory_recursive(&mut fs, dir, Path::new("/proc"))?;
        Ok(fs)
    }

    /// Checks if a file, directory or link exists at `path`.
    pub fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
            || self.directories.contains(path)
            || self.symlinks.contains_key(path)
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    fn check_access(&self, path: &Path) -> io::Result<()> {
        if self.denied.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {:?}", path),
            ));
        }
        if let Some(errno) = self.os_failures.get(path) {
            return Err(io::Error::from_raw_os_error(*errno));
        }
        if let Some(kind) = self.failures.get(path) {
            return Err(io::Error::new(*kind, format!("simulated failure: {:?}", path)));
        }
        Ok(())
    }
}

fn not_found(what: &str, path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} not found: {:?}", what, path))
}

fn load_directory_recursive(
    fs: &mut MockFs,
    real_path: &Path,
    virtual_path: &Path,
) -> io::Result<()> {
    fs.add_dir(virtual_path);

    for entry in std::fs::read_dir(real_path)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let name = entry.file_name();
        let real_child = entry.path();
        let virtual_child = virtual_path.join(&name);

        if file_type.is_symlink() {
            fs.add_symlink(&virtual_child, std::fs::read_link(&real_child)?);
        } else if file_type.is_dir() {
            load_directory_recursive(fs, &real_child, &virtual_child)?;
        } else if file_type.is_file() {
            // Try to read as string, skip binary files
            if let Ok(content) = std::fs::read_to_string(&real_child) {
                fs.add_file(&virtual_child, content);
            }
        }
    }
    Ok(())
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.check_access(path)?;
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| not_found("file", path))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        self.check_access(path)?;
        if !self.directories.contains(path) {
            return Err(not_found("directory", path));
        }

        let is_child = |p: &PathBuf| p.parent().is_some_and(|parent| parent == path);

        let mut entries = HashSet::new();
        entries.extend(self.files.keys().filter(|p| is_child(p)).cloned());
        entries.extend(self.symlinks.keys().filter(|p| is_child(p)).cloned());
        entries.extend(
            self.directories
                .iter()
                .filter(|p| is_child(p) && p.as_path() != path)
                .cloned(),
        );

        Ok(entries.into_iter().collect())
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.check_access(path)?;
        if let Some(target) = self.symlinks.get(path) {
            return Ok(target.clone());
        }
        if self.files.contains_key(path) || self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a symbolic link: {:?}", path),
            ));
        }
        Err(not_found("link", path))
    }

    fn owner_uid(&self, path: &Path) -> io::Result<u32> {
        self.check_access(path)?;
        if !self.exists(path) {
            return Err(not_found("path", path));
        }
        Ok(self.owners.get(path).copied().unwrap_or(0))
    }
}
