//! procsnap - print snapshots of running processes.
//!
//! Reads `/proc/[pid]/` for the selected processes and prints either a
//! human-readable report or JSON.

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{Level, debug, error, info};
use tracing_subscriber::EnvFilter;

use procsnap::collector::{CollectError, PidFilter, ProcessCollector, RealFs, UserResolver};
use procsnap::model::ProcessSnapshot;

/// Process snapshot tool.
#[derive(Parser)]
#[command(name = "procsnap", about = "Print snapshots of Linux processes", version)]
struct Args {
    /// Process IDs to snapshot. All matching processes when omitted.
    #[arg(short, long = "pid", value_name = "PID", conflicts_with_all = ["uid", "user"])]
    pids: Vec<u32>,

    /// Only processes owned by this uid.
    #[arg(long, conflicts_with = "user")]
    uid: Option<u32>,

    /// Only processes owned by this user name.
    #[arg(short, long)]
    user: Option<String>,

    /// Print the full snapshot instead of one summary line per process.
    #[arg(short, long)]
    long: bool,

    /// Print snapshots as JSON.
    #[arg(long, conflicts_with = "long")]
    json: bool,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Path to the passwd database used for user names.
    #[arg(long, default_value = "/etc/passwd")]
    passwd_path: String,

    /// Page size in bytes. Queried from the system by default.
    #[arg(long)]
    page_size: Option<u64>,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is warn level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn filter(&self) -> PidFilter {
        match (self.uid, &self.user) {
            (Some(uid), _) => PidFilter::Uid(uid),
            (None, Some(user)) => PidFilter::User(user.clone()),
            (None, None) => PidFilter::All,
        }
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Logs go to stderr so they never mix with the report on stdout.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("procsnap={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn collect(
    collector: &ProcessCollector<RealFs>,
    args: &Args,
) -> Result<Vec<ProcessSnapshot>, CollectError> {
    if args.pids.is_empty() {
        return collector.collect_all(&args.filter());
    }
    args.pids
        .iter()
        .map(|&pid| collector.collect_process(pid))
        .collect()
}

/// Writes the full report of one snapshot.
fn write_long(out: &mut impl Write, s: &ProcessSnapshot, users: &UserResolver) -> io::Result<()> {
    writeln!(out, "{}", s.summary_line(users))?;

    if let Some(root) = &s.root {
        writeln!(out, "  root: {}", root.display())?;
    }
    if let Some(stat) = &s.stat {
        writeln!(
            out,
            "  stat: comm={} state={} ppid={} threads={} rss={}",
            stat.comm, stat.state, stat.ppid, stat.num_threads, stat.rss
        )?;
    }
    if let Some(statm) = &s.statm {
        writeln!(
            out,
            "  statm: size={} resident={} shared={} text={} data={}",
            statm.size, statm.resident, statm.shared, statm.text, statm.data
        )?;
    }
    if let Some(fds) = &s.fds {
        writeln!(out, "  fds:")?;
        for (fd, target) in fds {
            writeln!(out, "    {:>5} -> {}", fd, target.display())?;
        }
    }
    if let Some(limits) = &s.limits {
        writeln!(out, "  limits:")?;
        for (name, pair) in limits {
            writeln!(
                out,
                "    {:<25} {:<20} {:<20} {}",
                name, pair.soft.value, pair.hard.value, pair.soft.units
            )?;
        }
    }
    if let Some(maps) = &s.maps {
        writeln!(out, "  maps:")?;
        for map in maps {
            writeln!(
                out,
                "    {:x}-{:x} {} {:08x} {:02x}:{:02x} {} {}",
                map.addresses.start,
                map.addresses.end,
                map.perms,
                map.offset,
                map.device.major,
                map.device.minor,
                map.inode,
                map.pathname.as_deref().unwrap_or_default()
            )?;
        }
    }
    if let Some(environ) = &s.environ {
        writeln!(out, "  environ:")?;
        for (key, value) in environ {
            match value {
                Some(value) => writeln!(out, "    {}={}", key, value)?,
                None => writeln!(out, "    {}", key)?,
            }
        }
    }
    Ok(())
}

fn write_report(
    out: &mut impl Write,
    snapshots: &[ProcessSnapshot],
    users: &UserResolver,
    args: &Args,
) -> io::Result<()> {
    if args.json {
        serde_json::to_writer_pretty(&mut *out, snapshots).map_err(io::Error::other)?;
        writeln!(out)?;
    } else if args.long {
        for snapshot in snapshots {
            write_long(out, snapshot, users)?;
        }
    } else {
        writeln!(out, "{:>10} {:>8} {}", "PID", "USER", "COMMAND")?;
        for snapshot in snapshots {
            writeln!(out, "{}", snapshot.summary_line(users))?;
        }
    }
    out.flush()
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);
    info!("procsnap {} starting", env!("CARGO_PKG_VERSION"));

    let fs = RealFs::new();
    let users = match UserResolver::load(&fs, Path::new(&args.passwd_path)) {
        Ok(users) => users,
        Err(e) => {
            error!("Failed to read {}: {}", args.passwd_path, e);
            return ExitCode::FAILURE;
        }
    };
    if !users.is_loaded() {
        debug!("No user names available, login users show as N/A");
    }

    let mut collector = ProcessCollector::new(fs, &args.proc_path).with_users(users);
    if let Some(page_size) = args.page_size {
        collector = collector.with_page_size(page_size);
    }
    debug!(
        "Config: proc={}, page_size={}",
        args.proc_path,
        collector.page_size()
    );

    let snapshots = match collect(&collector, &args) {
        Ok(snapshots) => snapshots,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Collected {} processes", snapshots.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = write_report(&mut out, &snapshots, collector.users(), &args) {
        // Reader went away, e.g. `procsnap | head`
        if e.kind() == io::ErrorKind::BrokenPipe {
            return ExitCode::SUCCESS;
        }
        error!("Failed to write report: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
