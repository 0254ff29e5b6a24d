use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use services::{AppServices, Clock, LoadOutcome, ProgressStore, SaveOutcome};
use tracing::debug;
use ui::vm::{map_course_detail, map_home, map_module_detail, map_quiz_attempt};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingOperand { command: &'static str, operand: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingOperand { command, operand } => {
                write!(f, "{command} requires <{operand}>")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  learn-hack [status]                 [--db <sqlite_url>] [--catalog <file>]");
    eprintln!("  learn-hack course <course>");
    eprintln!("  learn-hack module <course> <module>");
    eprintln!("  learn-hack unlock <course>");
    eprintln!("  learn-hack quiz <course> <module>");
    eprintln!("  learn-hack reset");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://learn_hack.sqlite3");
    eprintln!("  --catalog <bundled courses>");
    eprintln!("  -v, --verbose  debug logging (RUST_LOG overrides)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  HACK_DB_URL, HACK_CATALOG, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Status,
    Course { course: String },
    Module { course: String, module: String },
    Unlock { course: String },
    Quiz { course: String, module: String },
    Reset,
}

#[derive(Debug)]
struct Args {
    command: Command,
    db_url: String,
    catalog: Option<PathBuf>,
    verbose: bool,
}

enum Parsed {
    Run(Args),
    Help,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Parsed, ArgsError> {
        let mut db_url = std::env::var("HACK_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://learn_hack.sqlite3".into(), normalize_sqlite_url);
        let mut catalog = std::env::var_os("HACK_CATALOG").map(PathBuf::from);
        let mut verbose = false;
        let mut positional = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--catalog" => {
                    catalog = Some(PathBuf::from(require_value(&mut args, "--catalog")?));
                }
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => return Ok(Parsed::Help),
                flag if flag.starts_with('-') => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        let command = parse_command(positional)?;
        Ok(Parsed::Run(Self {
            command,
            db_url,
            catalog,
            verbose,
        }))
    }
}

fn parse_command(positional: Vec<String>) -> Result<Command, ArgsError> {
    let mut words = positional.into_iter();
    let Some(name) = words.next() else {
        return Ok(Command::Status);
    };

    let mut operand = |command: &'static str, what: &'static str| {
        words.next().ok_or(ArgsError::MissingOperand {
            command,
            operand: what,
        })
    };

    let command = match name.as_str() {
        "status" => Command::Status,
        "course" => Command::Course {
            course: operand("course", "course")?,
        },
        "module" => Command::Module {
            course: operand("module", "course")?,
            module: operand("module", "module")?,
        },
        "unlock" => Command::Unlock {
            course: operand("unlock", "course")?,
        },
        "quiz" => Command::Quiz {
            course: operand("quiz", "course")?,
            module: operand("quiz", "module")?,
        },
        "reset" => Command::Reset,
        _ => return Err(ArgsError::UnknownCommand(name)),
    };

    match words.next() {
        Some(extra) => Err(ArgsError::UnknownArg(extra)),
        None => Ok(command),
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") || raw.starts_with("sqlite:file:")
    {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>, text: &str) -> io::Result<Option<String>> {
    print!("{text}");
    io::stdout().flush()?;
    lines.next().transpose()
}

/// Walk the user through a quiz on stdin. Quitting early records nothing.
async fn run_quiz(
    store: &mut ProgressStore,
    course: &str,
    module: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut attempt = store.start_quiz(course, module)?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !attempt.runner().is_finished() {
        println!("{}", map_quiz_attempt(&attempt));
        let runner = attempt.runner_mut();

        if runner.is_showing_feedback() {
            if prompt(&mut lines, "Press Enter to continue ")?.is_none() {
                return Ok(());
            }
            runner.advance()?;
            continue;
        }

        let options = runner
            .current_question()
            .map_or(0, |question| question.options().len());
        let Some(line) = prompt(&mut lines, &format!("Answer 1-{options} (q to exit): "))? else {
            return Ok(());
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            println!("Quiz exited, nothing recorded.");
            return Ok(());
        }
        let Some(choice) = line.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
            eprintln!("enter a number between 1 and {options}");
            continue;
        };
        if let Err(err) = runner.select_option(choice) {
            eprintln!("{err}");
            continue;
        }
        runner.submit_answer()?;
    }

    let completion = store.finish_quiz(&mut attempt).await?;
    println!("{}", map_quiz_attempt(&attempt));
    println!(
        "Course progress: {}%  Diamonds: {}",
        completion.progress,
        store.state().diamonds()
    );
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let args = match parsed {
        Parsed::Run(args) => args,
        Parsed::Help => {
            print_usage();
            return Ok(());
        }
    };

    init_tracing(args.verbose);
    debug!(db = %args.db_url, catalog = ?args.catalog, "starting");

    let catalog = AppServices::load_catalog(args.catalog.as_deref())?;
    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let mut services = AppServices::new_sqlite(&args.db_url, Clock::system(), catalog).await?;
    if services.load_outcome() == LoadOutcome::Rejected {
        eprintln!("Saved progress could not be read; starting from defaults.");
    }
    let store = services.store_mut();

    match args.command {
        Command::Status => println!("{}", map_home(store)),
        Command::Course { course } => println!("{}", map_course_detail(store.state(), &course)?),
        Command::Module { course, module } => {
            println!("{}", map_module_detail(store.state(), &course, &module)?);
        }
        Command::Unlock { course } => {
            let unlock = store.unlock_course(&course).await?;
            println!(
                "Unlocked {} for {} diamonds. Balance: {}",
                unlock.course_id, unlock.spent, unlock.balance
            );
        }
        Command::Quiz { course, module } => run_quiz(store, &course, &module).await?,
        Command::Reset => {
            let outcome = store.reset().await;
            println!("{}", reset_message(outcome, store.state().diamonds()));
        }
    }
    Ok(())
}

fn reset_message(outcome: SaveOutcome, diamonds: u32) -> String {
    match outcome {
        SaveOutcome::Saved => format!("Progress reset. Diamonds: {diamonds}"),
        SaveOutcome::Failed => {
            "Progress reset for this session only; the saved progress could not be cleared \
             and will be restored next launch."
                .to_owned()
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
