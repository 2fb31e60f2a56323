//! Parsers for `/proc/[pid]/` files.
//!
//! These are pure functions that parse the content of various `/proc` files
//! into structured data. They are designed to be easily testable with string
//! inputs: the same input always produces the same record, and a parser
//! either returns a complete record or an error, never a partial one.

use crate::collector::traits::FileSystem;
use crate::model::{
    AddressRange, Device, EnvironmentTable, Limit, LimitPair, LimitValue, LimitsTable,
    MemoryMapping, NOT_AVAILABLE, Permissions, ProcStat, ProcStatm,
};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

/// Source file a parse error originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    Maps,
    Stat,
    Statm,
    Limits,
    Loginuid,
    Fd,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Record::Maps => "maps",
            Record::Stat => "stat",
            Record::Statm => "statm",
            Record::Limits => "limits",
            Record::Loginuid => "loginuid",
            Record::Fd => "fd",
        };
        f.write_str(name)
    }
}

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub record: Record,
    /// Field that failed to parse, e.g. `inode` or `Max open files`.
    pub field: String,
    pub message: String,
}

impl ParseError {
    pub fn new(record: Record, field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            record,
            field: field.into(),
            message: msg.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error in {}: field {}: {}",
            self.record, self.field, self.message
        )
    }
}

impl std::error::Error for ParseError {}

// ============ Memory Maps Parser ============

/// Width of the fixed columns of a `/proc/[pid]/maps` line
/// (address range, perms, offset, device, inode and padding).
pub const MAPS_FIXED_WIDTH: usize = 73;

/// Parses `/proc/[pid]/maps` content.
///
/// Format: `start-end perms offset major:minor inode [pathname]`, where the
/// pathname starts after the fixed-width region and may contain spaces.
pub fn parse_maps(content: &str) -> Result<Vec<MemoryMapping>, ParseError> {
    let mut maps = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        maps.push(parse_maps_line(line, idx + 1)?);
    }

    Ok(maps)
}

fn parse_maps_line(line: &str, line_no: usize) -> Result<MemoryMapping, ParseError> {
    let err = |field: &str, msg: String| {
        ParseError::new(Record::Maps, field, format!("line {}: {}", line_no, msg))
    };

    let (fixed, pathname) = if line.len() > MAPS_FIXED_WIDTH {
        let fixed = line
            .get(..MAPS_FIXED_WIDTH)
            .ok_or_else(|| err("line", "fixed columns are not ASCII".to_string()))?;
        let path = line[MAPS_FIXED_WIDTH..].trim();
        (fixed, (!path.is_empty()).then(|| path.to_string()))
    } else {
        (line, None)
    };

    let fields: Vec<&str> = fixed.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(err(
            "line",
            format!("expected 5 fixed fields, got {}", fields.len()),
        ));
    }

    let (start, end) = fields[0]
        .split_once('-')
        .ok_or_else(|| err("addresses", format!("missing '-' in {:?}", fields[0])))?;
    let start = parse_hex_u64(start).map_err(|e| err("addresses", e))?;
    let end = parse_hex_u64(end).map_err(|e| err("addresses", e))?;
    if start > end {
        return Err(err(
            "addresses",
            format!("start {:#x} is past end {:#x}", start, end),
        ));
    }

    let offset = parse_hex_u64(fields[2]).map_err(|e| err("offset", e))?;

    let (major, minor) = fields[3]
        .split_once(':')
        .ok_or_else(|| err("device", format!("missing ':' in {:?}", fields[3])))?;
    let major = u32::from_str_radix(major, 16)
        .map_err(|e| err("device", format!("invalid major {:?}: {}", major, e)))?;
    let minor = u32::from_str_radix(minor, 16)
        .map_err(|e| err("device", format!("invalid minor {:?}: {}", minor, e)))?;

    let inode = fields[4]
        .parse::<u64>()
        .map_err(|e| err("inode", format!("invalid inode {:?}: {}", fields[4], e)))?;

    Ok(MemoryMapping {
        addresses: AddressRange { start, end },
        perms: Permissions::from_raw(fields[1]),
        offset,
        device: Device { major, minor },
        inode,
        pathname,
    })
}

fn parse_hex_u64(s: &str) -> Result<u64, String> {
    u64::from_str_radix(s, 16).map_err(|e| format!("invalid hex {:?}: {}", s, e))
}

// ============ Stat Parser ============

/// Minimum number of fields in `/proc/[pid]/stat` (up to `cguest_time`).
pub const STAT_FIELDS: usize = 44;

/// Positional view of the `/proc/[pid]/stat` fields after the `comm` field.
struct StatFields<'a> {
    rest: Vec<&'a str>,
}

impl StatFields<'_> {
    /// Returns the field at the 1-based position used by proc(5).
    fn get<T: FromStr>(&self, position: usize, name: &str) -> Result<T, ParseError>
    where
        T::Err: fmt::Display,
    {
        let raw = self
            .rest
            .get(position - 3)
            .ok_or_else(|| ParseError::new(Record::Stat, name, "missing field"))?;
        raw.parse()
            .map_err(|e| ParseError::new(Record::Stat, name, format!("{:?}: {}", raw, e)))
    }

    /// Returns a page-count field converted to bytes.
    fn pages(&self, position: usize, name: &str, page_size: u64) -> Result<u64, ParseError> {
        let pages: u64 = self.get(position, name)?;
        pages
            .checked_mul(page_size)
            .ok_or_else(|| ParseError::new(Record::Stat, name, "byte count overflows u64"))
    }
}

/// Parses `/proc/[pid]/stat` content.
///
/// The format is tricky because the comm field can contain spaces and parentheses.
/// Format: pid (comm) state ppid pgrp session tty_nr ...
///
/// Fields beyond the 44th (added by newer kernels) are ignored.
pub fn parse_stat(content: &str, page_size: u64) -> Result<ProcStat, ParseError> {
    let content = content.trim();

    // Find the comm field boundaries (enclosed in parentheses)
    let open_paren = content
        .find('(')
        .ok_or_else(|| ParseError::new(Record::Stat, "comm", "missing '('"))?;
    let close_paren = content
        .rfind(')')
        .ok_or_else(|| ParseError::new(Record::Stat, "comm", "missing ')'"))?;

    if close_paren <= open_paren {
        return Err(ParseError::new(Record::Stat, "comm", "invalid parentheses"));
    }

    let pid_raw = content[..open_paren].trim();
    let pid: u32 = pid_raw
        .parse()
        .map_err(|e| ParseError::new(Record::Stat, "pid", format!("{:?}: {}", pid_raw, e)))?;

    let comm = content[open_paren + 1..close_paren].to_string();

    let f = StatFields {
        rest: content[close_paren + 1..].split_whitespace().collect(),
    };

    let arity = f.rest.len() + 2;
    if arity < STAT_FIELDS {
        return Err(ParseError::new(
            Record::Stat,
            "arity",
            format!("expected {} fields, got {}", STAT_FIELDS, arity),
        ));
    }

    let mut state_chars = f.rest[0].chars();
    let state = match (state_chars.next(), state_chars.next()) {
        (Some(c), None) => c,
        _ => {
            return Err(ParseError::new(
                Record::Stat,
                "state",
                format!("expected a single character, got {:?}", f.rest[0]),
            ));
        }
    };

    Ok(ProcStat {
        pid,
        comm,
        state,
        ppid: f.get(4, "ppid")?,
        pgrp: f.get(5, "pgrp")?,
        session: f.get(6, "session")?,
        tty_nr: f.get(7, "tty_nr")?,
        tpgid: f.get(8, "tpgid")?,
        flags: f.get(9, "flags")?,
        minflt: f.get(10, "minflt")?,
        cminflt: f.get(11, "cminflt")?,
        majflt: f.get(12, "majflt")?,
        cmajflt: f.get(13, "cmajflt")?,
        utime: f.get(14, "utime")?,
        stime: f.get(15, "stime")?,
        cutime: f.get(16, "cutime")?,
        cstime: f.get(17, "cstime")?,
        priority: f.get(18, "priority")?,
        nice: f.get(19, "nice")?,
        num_threads: f.get(20, "num_threads")?,
        itrealvalue: f.get(21, "itrealvalue")?,
        starttime: f.get(22, "starttime")?,
        vsize: f.get(23, "vsize")?,
        rss: f.pages(24, "rss", page_size)?,
        rsslim: f.get(25, "rsslim")?,
        startcode: f.get(26, "startcode")?,
        endcode: f.get(27, "endcode")?,
        startstack: f.get(28, "startstack")?,
        kstkesp: f.get(29, "kstkesp")?,
        kstkeip: f.get(30, "kstkeip")?,
        signal: f.get(31, "signal")?,
        blocked: f.get(32, "blocked")?,
        sigignore: f.get(33, "sigignore")?,
        sigcatch: f.get(34, "sigcatch")?,
        wchan: f.get(35, "wchan")?,
        nswap: f.pages(36, "nswap", page_size)?,
        cnswap: f.pages(37, "cnswap", page_size)?,
        exit_signal: f.get(38, "exit_signal")?,
        processor: f.get(39, "processor")?,
        rt_priority: f.get(40, "rt_priority")?,
        policy: f.get(41, "policy")?,
        delayacct_blkio_ticks: f.get(42, "delayacct_blkio_ticks")?,
        guest_time: f.get(43, "guest_time")?,
        cguest_time: f.get(44, "cguest_time")?,
    })
}

// ============ Statm Parser ============

/// Parses `/proc/[pid]/statm` content. All values are converted from pages
/// to bytes.
///
/// Format: size resident shared text lib data dt
pub fn parse_statm(content: &str, page_size: u64) -> Result<ProcStatm, ParseError> {
    const NAMES: [&str; 7] = ["size", "resident", "shared", "text", "lib", "data", "unused"];

    let tokens: Vec<&str> = content.split_whitespace().collect();
    if tokens.len() != NAMES.len() {
        return Err(ParseError::new(
            Record::Statm,
            "arity",
            format!("expected {} fields, got {}", NAMES.len(), tokens.len()),
        ));
    }

    let mut bytes = [0u64; 7];
    for (i, (raw, name)) in tokens.iter().zip(NAMES).enumerate() {
        let pages: u64 = raw
            .parse()
            .map_err(|e| ParseError::new(Record::Statm, name, format!("{:?}: {}", raw, e)))?;
        bytes[i] = pages
            .checked_mul(page_size)
            .ok_or_else(|| ParseError::new(Record::Statm, name, "byte count overflows u64"))?;
    }

    Ok(ProcStatm {
        size: bytes[0],
        resident: bytes[1],
        shared: bytes[2],
        text: bytes[3],
        lib: bytes[4],
        data: bytes[5],
        unused: bytes[6],
    })
}

// ============ Limits Parser ============

const LIMIT_NAME_END: usize = 26;
const LIMIT_SOFT_END: usize = 47;
const LIMIT_HARD_END: usize = 68;
const LIMIT_UNITS_WIDTH: usize = 10;

/// Column layout of one `/proc/[pid]/limits` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitsLayout {
    /// Name, soft, hard and a units column.
    Long,
    /// Name, soft and hard only (e.g. `Max nice priority`).
    Short,
}

impl LimitsLayout {
    /// Selects the layout matching a line of `width` bytes.
    ///
    /// The long layout is tried first; the short one applies only when the
    /// width is exactly the short layout's width.
    pub fn for_width(width: usize) -> Option<Self> {
        if width >= LIMIT_HARD_END + LIMIT_UNITS_WIDTH {
            Some(LimitsLayout::Long)
        } else if width == LIMIT_HARD_END {
            Some(LimitsLayout::Short)
        } else {
            None
        }
    }
}

/// Parses `/proc/[pid]/limits` content.
///
/// The header line is skipped. Each remaining line is split by fixed column
/// offsets; limits without a units column get `N/A` units.
pub fn parse_limits(content: &str) -> Result<LimitsTable, ParseError> {
    let mut limits = Vec::new();

    for line in content.lines() {
        if line.starts_with("Limit") || line.trim().is_empty() {
            continue;
        }

        let layout = LimitsLayout::for_width(line.len()).ok_or_else(|| {
            ParseError::new(
                Record::Limits,
                line.trim(),
                format!("unexpected line width {}", line.len()),
            )
        })?;

        let column = |from: usize, to: Option<usize>| {
            let slice = match to {
                Some(to) => line.get(from..to),
                None => line.get(from..),
            };
            slice.ok_or_else(|| {
                ParseError::new(Record::Limits, line.trim(), "columns are not ASCII")
            })
        };

        let name = column(0, Some(LIMIT_NAME_END))?.trim().to_string();
        let soft = LimitValue::parse(column(LIMIT_NAME_END, Some(LIMIT_SOFT_END))?);
        let hard = LimitValue::parse(column(LIMIT_SOFT_END, Some(LIMIT_HARD_END))?);
        let units = match layout {
            LimitsLayout::Long => match column(LIMIT_HARD_END, None)?.trim() {
                "" => NOT_AVAILABLE.to_string(),
                units => units.to_string(),
            },
            LimitsLayout::Short => NOT_AVAILABLE.to_string(),
        };

        let pair = LimitPair {
            soft: Limit {
                value: soft,
                units: units.clone(),
            },
            hard: Limit { value: hard, units },
        };
        limits.push((name, pair));
    }

    Ok(limits.into_iter().collect())
}

// ============ Cmdline / Environ Parsers ============

/// Splits NUL-terminated records, dropping the final terminator.
fn split_nul(content: &str) -> impl Iterator<Item = &str> {
    let body = content.strip_suffix('\0').unwrap_or(content);
    body.split('\0').filter(move |_| !body.is_empty())
}

/// Parses `/proc/[pid]/cmdline` content into the argument list.
///
/// Kernel threads have an empty cmdline and yield an empty list.
pub fn parse_cmdline(content: &str) -> Vec<String> {
    split_nul(content).map(str::to_string).collect()
}

/// Parses `/proc/[pid]/environ` content.
///
/// Each entry is split on the first `=`. Entries without `=` map to `None`.
pub fn parse_environ(content: &str) -> EnvironmentTable {
    split_nul(content)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) => (key.to_string(), Some(value.to_string())),
            None => (entry.to_string(), None),
        })
        .collect()
}

// ============ Loginuid Parser ============

/// Parses `/proc/[pid]/loginuid` content.
///
/// `4294967295` (`(uid_t)-1`) means the login uid was never set and is
/// returned unchanged.
pub fn parse_loginuid(content: &str) -> Result<u32, ParseError> {
    let raw = content.trim();
    raw.parse()
        .map_err(|e| ParseError::new(Record::Loginuid, "loginuid", format!("{:?}: {}", raw, e)))
}

// ============ User Resolution ============

/// Parses `/etc/passwd` content and returns a map of UID -> username.
///
/// Format: username:password:uid:gid:gecos:home:shell
pub fn parse_passwd(content: &str) -> HashMap<u32, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        // Skip comments and empty lines
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() >= 3
            && let Ok(uid) = parts[2].parse::<u32>()
        {
            // First entry wins, as with getpwuid(3)
            map.entry(uid).or_insert_with(|| parts[0].to_string());
        }
    }
    map
}

/// Resolver for UID <-> username mapping.
///
/// Caches the passwd file contents for efficient lookups.
#[derive(Debug, Clone, Default)]
pub struct UserResolver {
    uid_to_name: HashMap<u32, String>,
}

impl UserResolver {
    /// Creates a new empty resolver.
    pub fn new() -> Self {
        Self {
            uid_to_name: HashMap::new(),
        }
    }

    /// Loads user mappings from a passwd file.
    ///
    /// A missing or unreadable file yields an empty resolver.
    pub fn load<F: FileSystem>(fs: &F, passwd_path: &Path) -> io::Result<Self> {
        let mut resolver = Self::new();
        match fs.read_to_string(passwd_path) {
            Ok(content) => resolver.load_from_content(&content),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
                ) =>
            {
                tracing::debug!("passwd database {:?} unavailable: {}", passwd_path, e);
            }
            Err(e) => return Err(e),
        }
        Ok(resolver)
    }

    /// Loads user mappings from /etc/passwd content.
    pub fn load_from_content(&mut self, content: &str) {
        self.uid_to_name = parse_passwd(content);
    }

    /// Returns the username for `uid`.
    pub fn name_of(&self, uid: u32) -> Option<&str> {
        self.uid_to_name.get(&uid).map(String::as_str)
    }

    /// Returns the uid of `name`. With duplicate names the lowest uid wins.
    pub fn uid_of(&self, name: &str) -> Option<u32> {
        self.uid_to_name
            .iter()
            .filter(|(_, n)| n.as_str() == name)
            .map(|(uid, _)| *uid)
            .min()
    }

    /// Returns true if resolver has any mappings.
    pub fn is_loaded(&self) -> bool {
        !self.uid_to_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockFs, typical_limits};

    const PAGE: u64 = 4096;

    const STAT_BASH: &str = "1234 (bash) S 1233 1234 1234 34816 1235 4194304 5000 50000 10 20 100 50 200 100 20 0 1 0 100000 25000000 2000 18446744073709551615 94000000000000 94000000100000 140720000000000 0 0 0 65536 3670020 1266777851 0 3 7 17 2 0 0 5 0 0 0 0 0 0 0 0 0 0";

    #[test]
    fn test_parse_passwd() {
        let content = "\
root:x:0:0:root:/root:/bin/bash
# comment
daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin
nobody:x:65534:65534:nobody:/nonexistent:/usr/sbin/nologin
user:x:1000:1000:User Name:/home/user:/bin/bash
";
        let map = parse_passwd(content);
        assert_eq!(map.get(&0), Some(&"root".to_string()));
        assert_eq!(map.get(&1), Some(&"daemon".to_string()));
        assert_eq!(map.get(&1000), Some(&"user".to_string()));
        assert_eq!(map.get(&65534), Some(&"nobody".to_string()));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_user_resolver() {
        let mut resolver = UserResolver::new();
        assert!(!resolver.is_loaded());
        resolver.load_from_content(
            "root:x:0:0::/root:/bin/bash\nuser:x:1000:1000::/home/user:/bin/bash",
        );

        assert_eq!(resolver.name_of(0), Some("root"));
        assert_eq!(resolver.name_of(1000), Some("user"));
        assert_eq!(resolver.name_of(9999), None);
        assert_eq!(resolver.uid_of("user"), Some(1000));
        assert_eq!(resolver.uid_of("ghost"), None);
        assert!(resolver.is_loaded());
    }

    #[test]
    fn test_user_resolver_load_missing_passwd() {
        let fs = MockFs::new();
        let resolver = UserResolver::load(&fs, Path::new("/etc/passwd")).unwrap();
        assert!(!resolver.is_loaded());
    }

    #[test]
    fn test_user_resolver_load_from_fs() {
        let fs = MockFs::typical_system();
        let resolver = UserResolver::load(&fs, Path::new("/etc/passwd")).unwrap();
        assert_eq!(resolver.name_of(1000), Some("user"));
    }

    #[test]
    fn test_parse_maps_without_pathname() {
        let maps = parse_maps("7f3a1c000000-7f3a1c021000 rw-p 00001000 fd:02 0\n").unwrap();
        assert_eq!(maps.len(), 1);

        let m = &maps[0];
        assert_eq!(m.addresses.start, 0x7f3a1c000000);
        assert_eq!(m.addresses.end, 0x7f3a1c021000);
        assert_eq!(m.perms, Permissions::from_raw("rw-p"));
        assert_eq!(m.offset, 0x1000);
        assert_eq!(m.device, Device { major: 0xfd, minor: 2 });
        assert_eq!(m.inode, 0);
        assert_eq!(m.pathname, None);
    }

    #[test]
    fn test_parse_maps_with_pathname() {
        let content = "\
5581f3e00000-5581f3e2d000 r-xp 0002d000 08:01 1048601                    /usr/bin/bash
7f3a1c600000-7f3a1c628000 r--p 00000000 08:01 1050123                    /home/user/My Documents/lib shared.so
";
        let maps = parse_maps(content).unwrap();
        assert_eq!(maps.len(), 2);

        assert_eq!(maps[0].pathname.as_deref(), Some("/usr/bin/bash"));
        assert_eq!(maps[0].offset, 0x2d000);
        assert_eq!(maps[0].device, Device { major: 8, minor: 1 });
        assert_eq!(maps[0].inode, 1048601);
        assert!(maps[0].perms.execute);

        assert_eq!(
            maps[1].pathname.as_deref(),
            Some("/home/user/My Documents/lib shared.so")
        );
    }

    #[test]
    fn test_parse_maps_skips_empty_lines() {
        let content = "\n00400000-0040b000 r-xp 00000000 08:01 1234\n\n";
        assert_eq!(parse_maps(content).unwrap().len(), 1);
        assert!(parse_maps("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_maps_blank_trailer_is_no_pathname() {
        let line = format!("{:<80}", "7ffd5e9f0000-7ffd5ea11000 rw-p 00000000 00:00 0");
        let maps = parse_maps(&line).unwrap();
        assert_eq!(maps[0].pathname, None);
    }

    #[test]
    fn test_parse_maps_errors_name_field() {
        let err = parse_maps("zzzz-0040b000 r-xp 00000000 08:01 1234").unwrap_err();
        assert_eq!(err.record, Record::Maps);
        assert_eq!(err.field, "addresses");

        let err = parse_maps("00400000-0040b000 r-xp 00000000 0801 1234").unwrap_err();
        assert_eq!(err.field, "device");

        let err = parse_maps("00400000-0040b000 r-xp 00000000 08:01 x").unwrap_err();
        assert_eq!(err.field, "inode");

        let err = parse_maps("0040b000-00400000 r-xp 00000000 08:01 1").unwrap_err();
        assert_eq!(err.field, "addresses");

        let err = parse_maps("00400000-0040b000 r-xp").unwrap_err();
        assert_eq!(err.field, "line");
    }

    #[test]
    fn test_parse_stat_basic() {
        let stat = parse_stat(STAT_BASH, PAGE).unwrap();

        assert_eq!(stat.pid, 1234);
        assert_eq!(stat.comm, "bash");
        assert_eq!(stat.state, 'S');
        assert_eq!(stat.ppid, 1233);
        assert_eq!(stat.tty_nr, 34816);
        assert_eq!(stat.minflt, 5000);
        assert_eq!(stat.majflt, 10);
        assert_eq!(stat.utime, 100);
        assert_eq!(stat.stime, 50);
        assert_eq!(stat.priority, 20);
        assert_eq!(stat.nice, 0);
        assert_eq!(stat.starttime, 100000);
        assert_eq!(stat.vsize, 25000000);
        assert_eq!(stat.rsslim, u64::MAX);
        assert_eq!(stat.startcode, 94000000000000);
        assert_eq!(stat.endcode, 94000000100000);
        assert_eq!(stat.exit_signal, 17);
        assert_eq!(stat.processor, 2);
        assert_eq!(stat.delayacct_blkio_ticks, 5);
        assert_eq!(stat.cguest_time, 0);
    }

    #[test]
    fn test_parse_stat_scales_page_fields_only() {
        let stat = parse_stat(STAT_BASH, PAGE).unwrap();
        assert_eq!(stat.rss, 2000 * PAGE);
        assert_eq!(stat.nswap, 3 * PAGE);
        assert_eq!(stat.cnswap, 7 * PAGE);
        // Neighbours pass through unscaled
        assert_eq!(stat.vsize, 25000000);
        assert_eq!(stat.wchan, 0);
        assert_eq!(stat.exit_signal, 17);
    }

    #[test]
    fn test_parse_stat_with_spaces_in_comm() {
        let content = "5000 (Web Content) S 4999 5000 4999 0 -1 4194304 100000 0 500 0 5000 1000 0 0 20 0 20 0 500000 2000000000 50000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0";
        let stat = parse_stat(content, PAGE).unwrap();
        assert_eq!(stat.pid, 5000);
        assert_eq!(stat.comm, "Web Content");
        assert_eq!(stat.tpgid, -1);
        assert_eq!(stat.num_threads, 20);
    }

    #[test]
    fn test_parse_stat_with_parentheses_in_comm() {
        let content = "5001 ((sd-pam)) S 5000 5001 5001 0 -1 1077936448 50 0 0 0 0 0 0 0 20 0 1 0 500100 100000000 1000 18446744073709551615 1 1 0 0 0 0 0 4096 0 0 0 0 17 3 0 0 0 0 0 0 0 0 0 0 0 0 0";
        let stat = parse_stat(content, PAGE).unwrap();
        assert_eq!(stat.comm, "(sd-pam)");
        assert_eq!(stat.rss, 1000 * PAGE);
    }

    #[test]
    fn test_parse_stat_old_kernel_arity() {
        // Exactly 44 fields, as printed by 2.6.x kernels
        let content = "42 (cat) R 1 42 42 0 -1 0 0 0 0 0 0 0 0 0 20 0 1 0 10 1000 1 4294967295 1 1 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0";
        let stat = parse_stat(content, PAGE).unwrap();
        assert_eq!(stat.state, 'R');
        assert_eq!(stat.guest_time, 0);
    }

    #[test]
    fn test_parse_stat_wrong_arity() {
        let err = parse_stat("42 (cat) R 1 42 42 0 -1 0", PAGE).unwrap_err();
        assert_eq!(err.record, Record::Stat);
        assert_eq!(err.field, "arity");
    }

    #[test]
    fn test_parse_stat_invalid_field() {
        let content = STAT_BASH.replacen(" 1233 ", " ppid? ", 1);
        let err = parse_stat(&content, PAGE).unwrap_err();
        assert_eq!(err.field, "ppid");

        let err = parse_stat("1234 bash S", PAGE).unwrap_err();
        assert_eq!(err.field, "comm");
    }

    #[test]
    fn test_parse_stat_overflow_is_error() {
        let content = STAT_BASH.replacen(" 2000 ", " 18446744073709551615 ", 1);
        let err = parse_stat(&content, PAGE).unwrap_err();
        assert_eq!(err.field, "rss");
    }

    #[test]
    fn test_parse_statm() {
        let statm = parse_statm("10 5 2 1 0 4 0\n", 4096).unwrap();
        assert_eq!(statm.size, 40960);
        assert_eq!(statm.resident, 20480);
        assert_eq!(statm.shared, 8192);
        assert_eq!(statm.text, 4096);
        assert_eq!(statm.lib, 0);
        assert_eq!(statm.data, 16384);
        assert_eq!(statm.unused, 0);
    }

    #[test]
    fn test_parse_statm_errors() {
        let err = parse_statm("10 5 2", PAGE).unwrap_err();
        assert_eq!((err.record, err.field.as_str()), (Record::Statm, "arity"));

        let err = parse_statm("10 5 2 x 0 4 0", PAGE).unwrap_err();
        assert_eq!(err.field, "text");
    }

    #[test]
    fn test_limits_layout_selection() {
        assert_eq!(LimitsLayout::for_width(78), Some(LimitsLayout::Long));
        assert_eq!(LimitsLayout::for_width(80), Some(LimitsLayout::Long));
        assert_eq!(LimitsLayout::for_width(68), Some(LimitsLayout::Short));
        assert_eq!(LimitsLayout::for_width(70), None);
        assert_eq!(LimitsLayout::for_width(40), None);
    }

    #[test]
    fn test_parse_limits_typical() {
        let limits = parse_limits(&typical_limits()).unwrap();
        assert_eq!(limits.len(), 16);

        let files = limits.get("Max open files").unwrap();
        assert_eq!(files.soft.value, LimitValue::Integer(1024));
        assert_eq!(files.hard.value, LimitValue::Integer(1048576));
        assert_eq!(files.soft.units, "files");

        let cpu = limits.get("Max cpu time").unwrap();
        assert!(cpu.soft.value.is_unlimited());
        assert_eq!(cpu.hard.units, "seconds");

        let stack = limits.get("Max stack size").unwrap();
        assert_eq!(stack.soft.value, LimitValue::Integer(8388608));
        assert!(stack.hard.value.is_unlimited());
    }

    #[test]
    fn test_parse_limits_missing_units_column() {
        let line = format!("{:<25} {:<20} {:<20} \n", "Max nice priority", "0", "0");
        let limits = parse_limits(&line).unwrap();

        let nice = limits.get("Max nice priority").unwrap();
        assert_eq!(nice.soft.value, LimitValue::Integer(0));
        assert_eq!(nice.soft.units, NOT_AVAILABLE);
        assert_eq!(nice.hard.units, NOT_AVAILABLE);
    }

    #[test]
    fn test_parse_limits_wide_units_column() {
        let line = format!(
            "{:<25} {:<20} {:<20} {:<10}\n",
            "Max realtime timeout", "unlimited", "unlimited", "microseconds"
        );
        let limits = parse_limits(&line).unwrap();
        assert_eq!(
            limits.get("Max realtime timeout").unwrap().soft.units,
            "microseconds"
        );
    }

    #[test]
    fn test_parse_limits_unexpected_width() {
        let err = parse_limits("Max open files            1024").unwrap_err();
        assert_eq!(err.record, Record::Limits);
        assert_eq!(err.field, "Max open files            1024");
    }

    #[test]
    fn test_parse_cmdline() {
        assert_eq!(
            parse_cmdline("/bin/bash\0--login\0"),
            vec!["/bin/bash".to_string(), "--login".to_string()]
        );
        assert_eq!(
            parse_cmdline("sh\0-c\0\0"),
            vec!["sh".to_string(), "-c".to_string(), String::new()]
        );
        assert!(parse_cmdline("").is_empty());
    }

    #[test]
    fn test_parse_environ() {
        let env = parse_environ("FOO=bar\0PATH=/bin:/usr/bin\0EQ=a=b\0EMPTY=\0FOO2\0");
        assert_eq!(env.len(), 5);
        assert_eq!(env.get("FOO"), Some(&Some("bar".to_string())));
        assert_eq!(env.get("PATH"), Some(&Some("/bin:/usr/bin".to_string())));
        assert_eq!(env.get("EQ"), Some(&Some("a=b".to_string())));
        assert_eq!(env.get("EMPTY"), Some(&Some(String::new())));
        assert_eq!(env.get("FOO2"), Some(&None));
    }

    #[test]
    fn test_parse_environ_malformed_entry() {
        let env = parse_environ("FOO\0");
        assert_eq!(env.get("FOO"), Some(&None));
        assert!(parse_environ("").is_empty());
    }

    #[test]
    fn test_parse_loginuid() {
        assert_eq!(parse_loginuid("1000"), Ok(1000));
        assert_eq!(parse_loginuid("4294967295\n"), Ok(u32::MAX));
        let err = parse_loginuid("nobody").unwrap_err();
        assert_eq!(err.record, Record::Loginuid);
    }

    #[test]
    fn test_parsers_are_deterministic() {
        let maps = format!(
            "{:<73}/bin/cat\n",
            "00400000-0040b000 r-xp 00000000 08:01 1234"
        );
        let first = parse_maps(&maps).unwrap();
        assert_eq!(first[0].pathname.as_deref(), Some("/bin/cat"));
        assert_eq!(first, parse_maps(&maps).unwrap());
        assert_eq!(parse_stat(STAT_BASH, PAGE), parse_stat(STAT_BASH, PAGE));
        assert_eq!(parse_statm("1 2 3 4 5 6 7", PAGE), parse_statm("1 2 3 4 5 6 7", PAGE));
        let limits = typical_limits();
        assert_eq!(parse_limits(&limits), parse_limits(&limits));
        assert_eq!(parse_environ("A=1\0B\0"), parse_environ("A=1\0B\0"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(Record::Maps, "inode", "line 3: invalid inode");
        assert_eq!(
            err.to_string(),
            "Parse error in maps: field inode: line 3: invalid inode"
        );
    }
}
