//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` filesystem states for
//! testing full, restricted and degenerate processes.

use super::filesystem::MockFs;

/// Rows of `/proc/[pid]/limits` for a typical user process.
const TYPICAL_LIMITS: &[(&str, &str, &str, Option<&str>)] = &[
    ("Max cpu time", "unlimited", "unlimited", Some("seconds")),
    ("Max file size", "unlimited", "unlimited", Some("bytes")),
    ("Max data size", "unlimited", "unlimited", Some("bytes")),
    ("Max stack size", "8388608", "unlimited", Some("bytes")),
    ("Max core file size", "0", "unlimited", Some("bytes")),
    ("Max resident set", "unlimited", "unlimited", Some("bytes")),
    ("Max processes", "63432", "63432", Some("processes")),
    ("Max open files", "1024", "1048576", Some("files")),
    ("Max locked memory", "8388608", "8388608", Some("bytes")),
    ("Max address space", "unlimited", "unlimited", Some("bytes")),
    ("Max file locks", "unlimited", "unlimited", Some("locks")),
    ("Max pending signals", "63432", "63432", Some("signals")),
    ("Max msgqueue size", "819200", "819200", Some("bytes")),
    ("Max nice priority", "0", "0", None),
    ("Max realtime priority", "0", "0", None),
    ("Max realtime timeout", "unlimited", "unlimited", Some("us")),
];

/// Renders limit rows the way the kernel prints `/proc/[pid]/limits`:
/// `%-25s %-20s %-20s ` followed by `%-10s` units when the limit has any.
pub fn render_limits(rows: &[(&str, &str, &str, Option<&str>)]) -> String {
    let mut out = format!(
        "{:<25} {:<20} {:<20} {:<10}\n",
        "Limit", "Soft Limit", "Hard Limit", "Units"
    );
    for (name, soft, hard, units) in rows {
        match units {
            Some(units) => out.push_str(&format!(
                "{:<25} {:<20} {:<20} {:<10}\n",
                name, soft, hard, units
            )),
            None => out.push_str(&format!("{:<25} {:<20} {:<20} \n", name, soft, hard)),
        }
    }
    out
}

/// `/proc/[pid]/limits` of a typical user process.
pub fn typical_limits() -> String {
    render_limits(TYPICAL_LIMITS)
}

const PASSWD: &str = "\
root:x:0:0:root:/root:/bin/bash
daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin
nobody:x:65534:65534:nobody:/nonexistent:/usr/sbin/nologin
user:x:1000:1000:User:/home/user:/bin/bash
";

impl MockFs {
    /// Creates a typical system with a few processes.
    ///
    /// Includes: init (PID 1, root), an interactive bash (PID 1000, uid 1000)
    /// and a `sleep` started from it (PID 1001, uid 1000).
    pub fn typical_system() -> Self {
        let mut fs = Self::new();
        let limits = typical_limits();

        // /etc/passwd for user name resolution
        fs.add_file("/etc/passwd", PASSWD);

        // System-wide files, not process directories
        fs.add_file("/proc/uptime", "12345.67 98765.43\n");
        fs.add_file("/proc/meminfo", "MemTotal:       16384000 kB\n");

        fs.add_process(
            1,
            0,
            &[
                (
                    "stat",
                    "1 (systemd) S 0 1 1 0 -1 4194560 50000 1000000 100 500 1000 500 5000 2000 20 0 1 0 1 170000000 3000 18446744073709551615 1 1 0 0 0 0 671173123 4096 1260 0 0 0 17 0 0 0 10 0 0 0 0 0 0 0 0 0 0\n",
                ),
                ("statm", "41500 3000 2000 300 0 5000 0\n"),
                ("cmdline", "/sbin/init\0splash\0"),
                ("environ", "HOME=/\0TERM=linux\0"),
                ("loginuid", "4294967295"),
                ("limits", limits.as_str()),
                (
                    "maps",
                    "\
55d0c0a00000-55d0c0a3b000 r--p 00000000 08:01 1835042                    /usr/lib/systemd/systemd
7ffd5e9f0000-7ffd5ea11000 rw-p 00000000 00:00 0                          [stack]
",
                ),
            ],
        );
        fs.add_symlink("/proc/1/root", "/");
        fs.add_fds(1, &[(0, "/dev/null"), (1, "/dev/null"), (2, "/dev/null")]);

        fs.add_process(
            1000,
            1000,
            &[
                (
                    "stat",
                    "1000 (bash) S 999 1000 1000 34816 1001 4194304 5000 50000 10 20 100 50 200 100 20 0 1 0 100000 25000000 2000 18446744073709551615 94000000000000 94000000100000 140720000000000 0 0 0 65536 3670020 1266777851 0 0 0 17 2 0 0 5 0 0 0 0 0 0 0 0 0 0\n",
                ),
                ("statm", "6000 2000 900 250 0 700 0\n"),
                ("cmdline", "-bash\0"),
                ("environ", "HOME=/home/user\0LANG=C.UTF-8\0EMPTY=\0BROKEN\0"),
                ("loginuid", "1000"),
                ("limits", limits.as_str()),
                (
                    "maps",
                    "\
5581f3e00000-5581f3e2d000 r--p 00000000 08:01 1048601                    /usr/bin/bash
5581f4a6e000-5581f4bd0000 rw-p 00000000 00:00 0                          [heap]
7f3a1c000000-7f3a1c021000 rw-p 00000000 00:00 0
7f3a1c600000-7f3a1c628000 r--p 00000000 08:01 1050123                    /home/user/My Documents/lib shared.so
",
                ),
            ],
        );
        fs.add_symlink("/proc/1000/root", "/");
        fs.add_fds(
            1000,
            &[
                (0, "/dev/pts/0"),
                (1, "/dev/pts/0"),
                (2, "/dev/pts/0"),
                (255, "/dev/pts/0"),
            ],
        );

        fs.add_process(
            1001,
            1000,
            &[
                (
                    "stat",
                    "1001 (sleep) S 1000 1001 1000 34816 1001 4194304 100 0 0 0 0 0 0 0 20 0 1 0 100500 8388608 200 18446744073709551615 1 1 0 0 0 0 0 0 0 0 0 0 17 1 0 0 0 0 0 0 0 0 0 0 0 0 0\n",
                ),
                ("statm", "2048 200 180 4 0 90 0\n"),
                ("cmdline", "sleep\0infinity\0"),
                ("environ", "HOME=/home/user\0"),
                ("loginuid", "1000"),
                ("limits", limits.as_str()),
                ("maps", ""),
            ],
        );
        fs.add_symlink("/proc/1001/root", "/");
        fs.add_fds(1001, &[(0, "/dev/pts/0"), (3, "socket:[4242]")]);

        fs
    }

    /// Creates a system with a root-owned daemon seen by an unprivileged
    /// caller: stat, statm, cmdline and loginuid are readable, everything
    /// else is denied.
    pub fn restricted_process() -> Self {
        let mut fs = Self::new();
        let limits = typical_limits();
        fs.add_file("/etc/passwd", PASSWD);

        fs.add_process(
            2000,
            0,
            &[
                (
                    "stat",
                    "2000 (sshd) S 1 2000 2000 0 -1 4194560 1500 0 12 0 30 20 0 0 20 0 1 0 2000 15000000 1500 18446744073709551615 1 1 0 0 0 0 0 4096 81926 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0\n",
                ),
                ("statm", "3662 1500 1200 200 0 300 0\n"),
                ("cmdline", "sshd: /usr/sbin/sshd -D [listener] 0 of 10-100 startups\0"),
                ("environ", ""),
                ("limits", limits.as_str()),
                ("maps", ""),
                ("loginuid", "4294967295"),
            ],
        );
        fs.add_symlink("/proc/2000/root", "/");
        fs.add_fds(2000, &[(0, "/dev/null")]);

        for name in ["environ", "limits", "maps", "root", "fd"] {
            fs.deny(format!("/proc/2000/{}", name));
        }

        fs
    }

    /// Creates a system with `kthreadd`: empty cmdline and maps, all-zero
    /// statm, no fds. Reading `environ` fails with `ESRCH` as on a real kernel.
    pub fn kernel_thread() -> Self {
        let mut fs = Self::new();
        let limits = typical_limits();
        fs.add_file("/etc/passwd", PASSWD);

        fs.add_process(
            2,
            0,
            &[
                (
                    "stat",
                    "2 (kthreadd) S 0 0 0 0 -1 2129984 0 0 0 0 0 2 0 0 20 0 1 0 2 0 0 18446744073709551615 0 0 0 0 0 0 0 2147483647 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0\n",
                ),
                ("statm", "0 0 0 0 0 0 0\n"),
                ("cmdline", ""),
                ("environ", ""),
                ("loginuid", "4294967295"),
                ("limits", limits.as_str()),
                ("maps", ""),
            ],
        );
        fs.fail_os("/proc/2/environ", libc::ESRCH);
        fs.add_symlink("/proc/2/root", "/");
        fs.add_dir("/proc/2/fd");

        fs
    }

    /// Creates a process whose name contains spaces and parentheses, running
    /// inside a chroot.
    pub fn with_special_names() -> Self {
        let mut fs = Self::new();
        fs.add_file("/etc/passwd", PASSWD);

        fs.add_process(
            5000,
            1000,
            &[
                (
                    "stat",
                    "5000 (Web Content) S 4999 5000 4999 0 -1 4194304 100000 0 500 0 5000 1000 0 0 20 0 20 0 500000 2000000000 50000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0\n",
                ),
                ("cmdline", "/usr/lib/firefox/firefox\0-contentproc\0"),
                ("loginuid", "1000"),
            ],
        );
        fs.add_symlink("/proc/5000/root", "/var/chroot/firefox");

        fs.add_process(
            5001,
            1000,
            &[(
                "stat",
                "5001 ((sd-pam)) S 5000 5001 5001 0 -1 1077936448 50 0 0 0 0 0 0 0 20 0 1 0 500100 100000000 1000 18446744073709551615 1 1 0 0 0 0 0 4096 0 0 0 0 17 3 0 0 0 0 0 0 0 0 0 0 0 0 0\n",
            )],
        );

        fs
    }
}
