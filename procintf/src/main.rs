//! # procintf Binary
//!
//! Brings the interface up on an in-process namespace and drives its
//! endpoints from a small command shell on stdin.
//!
//! # Usage
//!
//! ```bash
//! # Defaults, commands from stdin
//! procintf
//!
//! # Config file, unprivileged caller, verbose logs
//! procintf --config /etc/procintf/procintf.toml --uid 1000 -v
//!
//! # Scripted
//! printf 'cat llkdproc_show_drvctx\necho 2 > llkdproc_debug_level\n' | procintf
//! ```
//!
//! Shell commands: `ls`, `cat <entry>`, `echo [-n] <value> > <entry>`,
//! `write <entry> <value>`, `dump`, `stats`, `misc`, `help`, `quit`.
//! Ctrl-C interrupts a command waiting on the store and ends the shell.

#![deny(warnings)]

use clap::Parser;
use procintf::miscdev::{MISC_MAJOR, MISCDRV_NAME, MISCDRV_PERMS};
use procintf::{Caller, Interrupt, MiscRegistry, ProcIntf, ProcTree, UserSlice, UserSliceMut};
use procintf_common::config::{ConfigError, ConfigLoader, IntfConfig, LogLevel, ValidationMode};
use procintf_common::consts::DEFAULT_CONFIG_PATH;
use procintf_common::error::{IntfError, errno};
use procintf_common::mode::Access;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// How often the shell checks for shutdown while waiting for input.
const INPUT_POLL: Duration = Duration::from_millis(100);

/// procintf - pseudo-filesystem configuration/status interface
#[derive(Parser, Debug)]
#[command(name = "procintf")]
#[command(version)]
#[command(about = "Lock-serialized pseudo-filesystem configuration/status interface")]
#[command(long_about = None)]
struct Args {
    /// Path to the TOML configuration file; falls back to the default path,
    /// then to built-in defaults
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the namespace directory name
    #[arg(long)]
    dir_name: Option<String>,

    /// Let config writes skip the debug level range check
    #[arg(long)]
    legacy: bool,

    /// Act as this uid (defaults to the real uid)
    #[arg(long)]
    uid: Option<u32>,

    /// Act as this gid (defaults to the uid when --uid is given)
    #[arg(long)]
    gid: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("procintf: startup failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args)?;

    setup_tracing(&args, config.shared.log_level);
    info!(
        "{} v{} starting...",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION")
    );

    let interrupt = Interrupt::new();
    let caller = match args.uid {
        Some(uid) => Caller::new(uid, args.gid.unwrap_or(uid)),
        None => Caller::current(),
    }
    .with_interrupt(interrupt.clone());

    // Ctrl-C aborts a command blocked on the store and stops the shell.
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        let interrupt = interrupt.clone();
        ctrlc::set_handler(move || {
            info!("Received shutdown signal");
            interrupt.raise();
            running.store(false, Ordering::SeqCst);
        })?;
    }

    let tree = ProcTree::new();
    let intf = ProcIntf::enable(&config.procfs, Box::new(tree))?;
    info!(
        "serving /proc/{} as uid {} (validation={:?})",
        intf.dir_name(),
        caller.uid,
        intf.validation()
    );
    let misc = MiscRegistry::new();

    let lines = spawn_stdin_reader();
    let mut out = io::stdout().lock();
    let served = serve(&intf, &misc, &caller, &lines, &running, &mut out);

    intf.disable();
    info!("shutdown complete");
    served?;
    Ok(())
}

/// Load the configuration file and apply the command line overrides.
fn load_config(args: &Args) -> Result<IntfConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => IntfConfig::load(path)?,
        None => match IntfConfig::load(Path::new(DEFAULT_CONFIG_PATH)) {
            Err(ConfigError::FileNotFound) => IntfConfig::default(),
            loaded => loaded?,
        },
    };
    if let Some(dir) = &args.dir_name {
        config.procfs.dir_name = dir.clone();
    }
    if args.legacy {
        config.procfs.validation = ValidationMode::Legacy;
    }
    config.validate()?;
    Ok(config)
}

/// Forward stdin lines to the shell so the shell can poll for shutdown.
fn spawn_stdin_reader() -> Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Run shell commands until `quit`, end of input or `running` drops.
fn serve(
    intf: &ProcIntf,
    misc: &MiscRegistry,
    caller: &Caller,
    lines: &Receiver<io::Result<String>>,
    running: &AtomicBool,
    out: &mut impl Write,
) -> io::Result<()> {
    prompt(out)?;
    while running.load(Ordering::SeqCst) {
        let line = match lines.recv_timeout(INPUT_POLL) {
            Ok(line) => line?,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        caller.interrupt().clear();
        match execute(intf, misc, caller, line.trim(), out) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => return Ok(()),
            Err(e) => report(out, &e)?,
        }
        prompt(out)?;
    }
    writeln!(out)
}

enum Flow {
    Continue,
    Quit,
}

enum ShellError {
    Intf(IntfError),
    Usage(&'static str),
    Io(io::Error),
}

impl From<IntfError> for ShellError {
    fn from(e: IntfError) -> Self {
        ShellError::Intf(e)
    }
}

impl From<io::Error> for ShellError {
    fn from(e: io::Error) -> Self {
        ShellError::Io(e)
    }
}

impl From<serde_json::Error> for ShellError {
    fn from(e: serde_json::Error) -> Self {
        ShellError::Io(io::Error::other(e))
    }
}

fn execute(
    intf: &ProcIntf,
    misc: &MiscRegistry,
    caller: &Caller,
    line: &str,
    out: &mut impl Write,
) -> Result<Flow, ShellError> {
    let mut words = line.split_whitespace();
    let Some(cmd) = words.next() else {
        return Ok(Flow::Continue);
    };
    match cmd {
        "ls" => {
            for (name, mode) in intf.entries() {
                writeln!(out, "{} {}/{}", mode.symbolic(), intf.dir_name(), name)?;
            }
        }
        "cat" => {
            let entry = words.next().ok_or(ShellError::Usage("cat <entry>"))?;
            write!(out, "{}", intf.read_entry(entry, caller)?)?;
        }
        "echo" => {
            let (payload, entry) = parse_echo(line)?;
            intf.write_entry(entry, caller, payload.as_bytes())?;
        }
        "write" => {
            let entry = words.next().ok_or(ShellError::Usage("write <entry> <value>"))?;
            let value = words.next().ok_or(ShellError::Usage("write <entry> <value>"))?;
            let n = intf.write_entry(entry, caller, value.as_bytes())?;
            writeln!(out, "{n} bytes written")?;
        }
        "dump" => {
            let snap = intf.snapshot(caller)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&snap)?)?;
        }
        "stats" => {
            let s = intf.serializer_stats();
            writeln!(
                out,
                "acquired={} released={} contended={} interrupted={}",
                s.acquired, s.released, s.contended, s.interrupted
            )?;
        }
        "misc" => {
            let dev = misc.register(MISCDRV_NAME, MISCDRV_PERMS)?;
            let mut file = dev.open(caller, Access::ReadWrite)?;
            let mut buf = [0u8; 64];
            let r = file.read(&mut UserSliceMut::new(&mut buf));
            let w = file.write(&UserSlice::new(b"sample data"));
            writeln!(
                out,
                "/dev/{} ({}, {}): read {} bytes, wrote {} bytes",
                dev.name(),
                MISC_MAJOR,
                dev.minor(),
                r,
                w
            )?;
        }
        "help" => {
            writeln!(
                out,
                "ls | cat <entry> | echo [-n] <value> > <entry> | write <entry> <value> | dump | stats | misc | quit"
            )?;
        }
        "quit" | "exit" => return Ok(Flow::Quit),
        _ => return Err(ShellError::Usage("unknown command, try 'help'")),
    }
    Ok(Flow::Continue)
}

/// Split `echo [-n] <value> > <entry>` into the payload and the entry.
fn parse_echo(line: &str) -> Result<(String, &str), ShellError> {
    const USAGE: &str = "echo [-n] <value> > <entry>";
    let rest = line.strip_prefix("echo").ok_or(ShellError::Usage(USAGE))?;
    let (lhs, entry) = rest.rsplit_once('>').ok_or(ShellError::Usage(USAGE))?;
    let entry = entry.trim();
    if entry.is_empty() {
        return Err(ShellError::Usage(USAGE));
    }
    let lhs = lhs.trim();
    let payload = match lhs.strip_prefix("-n") {
        Some(value) => value.trim().to_string(),
        None => format!("{lhs}\n"),
    };
    Ok((payload, entry))
}

fn report(out: &mut impl Write, e: &ShellError) -> io::Result<()> {
    match e {
        ShellError::Intf(e) => {
            let code = e.errno();
            error!("{e}");
            writeln!(out, "error: {e} (-{code} {})", errno::name(code))?;
            if e.is_restartable() {
                writeln!(out, "interrupted, the command can be retried")?;
            }
            Ok(())
        }
        ShellError::Usage(u) => writeln!(out, "usage: {u}"),
        ShellError::Io(e) => writeln!(out, "error: {e}"),
    }
}

fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "procintf> ")?;
    out.flush()
}

/// Setup tracing subscriber based on CLI arguments and configuration.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let level = if args.verbose {
        LogLevel::Debug
    } else {
        configured
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}
