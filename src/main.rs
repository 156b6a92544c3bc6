//! wfplog — tail the firewall events of the Windows Security log.
//!
//! Enables Filtering Platform auditing, subscribes to the Security channel,
//! and prints each decoded log entry to stdout (human-readable by default,
//! JSON lines with `--json`). Auditing is switched back off on exit.

use std::time::Duration;

use wfplog::util::constants;

/// Parsed command-line options.
#[derive(Debug, PartialEq, Eq)]
struct Options {
    /// Emit one JSON object per entry instead of the human-readable line.
    json: bool,
    /// Stop after this long; run until killed when absent.
    duration: Option<Duration>,
}

const USAGE: &str = "\
Usage: wfplog [--json] [--duration <secs>]

Options:
  --json             print entries as JSON lines
  --duration <secs>  stop after the given number of seconds
  --help             show this message
";

fn main() {
    init_logging();

    let opts = match parse_args(std::env::args().skip(1)) {
        Ok(Some(opts)) => opts,
        Ok(None) => {
            print!("{USAGE}");
            return;
        }
        Err(msg) => {
            eprintln!("{msg}");
            eprint!("{USAGE}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        "{} v{} starting",
        constants::APP_NAME,
        constants::APP_VERSION
    );

    #[cfg(windows)]
    {
        if let Err(e) = run(&opts) {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }

    #[cfg(not(windows))]
    {
        let _ = opts;
        eprintln!("wfplog requires the Windows Security event log; nothing to watch on this platform.");
        std::process::exit(1);
    }
}

/// Parse CLI arguments. `Ok(None)` means `--help` was requested.
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<Options>, String> {
    let mut opts = Options {
        json: false,
        duration: None,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => opts.json = true,
            "--duration" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--duration requires a value".to_string())?;
                let secs: u64 = value
                    .parse()
                    .map_err(|_| format!("invalid --duration value: {value:?}"))?;
                opts.duration = Some(Duration::from_secs(secs));
            }
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("unknown argument: {other:?}")),
        }
    }

    Ok(Some(opts))
}

/// Initialise the tracing subscriber: stderr, filtered by `RUST_LOG`
/// (default `info`).
fn init_logging() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::Layer as _;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_layer.with_filter(env_filter))
        .init();
}

#[cfg(windows)]
fn run(opts: &Options) -> wfplog::Result<()> {
    use std::time::Instant;

    use crossbeam_channel::RecvTimeoutError;
    use wfplog::FirewallLogWatcher;

    let mut watcher = FirewallLogWatcher::system();
    let rx = watcher.subscribe();
    watcher.set_enabled(true)?;
    tracing::info!("Watching Security log for firewall events");

    let deadline = opts.duration.map(|d| Instant::now() + d);
    loop {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                break;
            }
        }
        match rx.recv_timeout(Duration::from_millis(500)) {
            Ok(entry) => print_entry(&entry, opts.json),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    watcher.set_enabled(false)?;
    Ok(())
}

#[cfg(windows)]
fn print_entry(entry: &wfplog::LogEntry, json: bool) {
    use wfplog::util::time::format_entry_timestamp;
    use wfplog::Direction;

    if json {
        match serde_json::to_string(entry) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!("Could not serialize entry: {}", e),
        }
        return;
    }

    let direction = match entry.direction {
        Direction::Inbound => "in ",
        Direction::Outbound => "out",
        Direction::Invalid => "-  ",
    };
    println!(
        "{}  {:?} {} {} {}:{} -> {}:{} pid={} {}",
        format_entry_timestamp(&entry.timestamp),
        entry.event_kind,
        entry.protocol.name(),
        direction,
        entry.local_address,
        entry.local_port,
        entry.remote_address,
        entry.remote_port,
        entry.process_id,
        entry.app_path,
    );
}
