use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use clap::Parser;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use pwmgr::cli::{Message, Outcome, Session, Severity};
use pwmgr::command::CommandTree;
use pwmgr::config::{PwmgrPaths, Settings};
use pwmgr::error::{PwmgrError, PwmgrResult};
use pwmgr::storage::Store;

#[derive(Parser)]
#[command(
    name = "pwmgr",
    version,
    about = "Interactive manager for account records",
    long_about = "pwmgr keeps one file of named properties per account and journals \
                  every change. Run it without arguments for an interactive prompt, \
                  or pass commands with --execute."
)]
struct Cli {
    /// Directory holding the accounts and the journal [default: $PWMGR_DATA_DIR, then ~/Passwords]
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Write debug events to the log file
    #[arg(short, long)]
    verbose: bool,

    /// Run a command line and exit (repeatable)
    #[arg(short = 'e', long = "execute", value_name = "LINE")]
    execute: Vec<String>,

    /// Skip the greeting and the startup account list
    #[arg(long)]
    no_banner: bool,
}

fn setup_tracing(paths: &PwmgrPaths, settings: &Settings, verbose: bool) -> PwmgrResult<()> {
    let log_path = paths.log_file();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| {
            PwmgrError::Setup(format!(
                "Unable to open log file '{}' ({})",
                log_path.display(),
                e
            ))
        })?;

    let filter = EnvFilter::try_from_env("PWMGR_LOG").unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("pwmgr=debug")
        } else {
            EnvFilter::new(&settings.log_filter)
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| PwmgrError::Setup(format!("Unable to initialize logging ({})", e)))?;

    tracing::info!(path = %paths.base_dir().display(), "pwmgr started");
    Ok(())
}

fn open_session(cli: &Cli) -> PwmgrResult<Session> {
    let paths = match &cli.data_dir {
        Some(dir) => PwmgrPaths::with_base_dir(dir.clone()),
        None => PwmgrPaths::new()?,
    };
    paths.ensure_directories()?;

    let settings = Settings::load_or_create(&paths)?;
    if !paths.settings_file().exists() {
        settings.save(&paths)?;
    }

    setup_tracing(&paths, &settings, cli.verbose)?;

    CommandTree::standard().validate()?;
    let store = Store::open(paths, &settings)?;
    Ok(Session::new(store, settings))
}

fn print_message(out: &mut impl Write, message: &Message) -> io::Result<()> {
    let text = message.text.as_str();
    match message.severity {
        Severity::Log => writeln!(out, "{}", text.cyan()),
        Severity::Highlight => writeln!(out, "{}", text.bold()),
        Severity::Error => writeln!(out, "{}", text.magenta()),
        Severity::Fatal => writeln!(out, "{}", text.red()),
    }
}

fn print_outcome(outcome: &Outcome) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    if outcome.clear {
        execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    }
    for message in &outcome.messages {
        print_message(&mut stdout, message)?;
    }
    stdout.flush()
}

fn wait_for_enter() -> io::Result<()> {
    println!("Press Enter to exit...");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

fn run_commands(session: &Session, lines: &[String]) -> Result<bool> {
    let mut failed = false;
    for line in lines {
        let outcome = session.execute_line(line);
        failed |= outcome.has_errors();
        print_outcome(&outcome)?;
        if outcome.quit {
            break;
        }
    }
    Ok(!failed)
}

fn run_repl(session: &Session, show_banner: bool) -> Result<()> {
    let mut editor = DefaultEditor::new()?;

    if show_banner {
        print_outcome(&Outcome {
            messages: session.banner(),
            ..Outcome::default()
        })?;
        if session.settings().list_accounts_on_start {
            print_outcome(&session.execute_line("list accounts"))?;
        }
    }

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }

                let outcome = session.execute_line(&line);
                print_outcome(&outcome)?;
                if outcome.is_fatal() {
                    wait_for_enter()?;
                }
                if outcome.quit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive = cli.execute.is_empty();

    let session = match open_session(&cli) {
        Ok(session) => session,
        Err(err) => {
            let mut stderr = io::stderr().lock();
            print_message(&mut stderr, &Message::fatal(err.to_string()))?;
            if interactive {
                wait_for_enter()?;
            }
            std::process::exit(1);
        }
    };

    if !interactive {
        if !run_commands(&session, &cli.execute)? {
            std::process::exit(2);
        }
        return Ok(());
    }

    run_repl(&session, !cli.no_banner)
}
