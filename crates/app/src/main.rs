use std::fmt;
use std::path::Path;
use std::time::Duration;

use services::{AppServices, Clock, PracticeError, PracticeLoopService, PracticeSnapshot};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use trach_core::model::{HighlightOffsets, MIN_HINTS_BEFORE_ANSWER, PracticeConfig};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidMinHints { raw: String },
    InvalidDelay { raw: String },
    InvalidSeed { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidMinHints { raw } => write!(f, "invalid --min-hints value: {raw}"),
            ArgsError::InvalidDelay { raw } => write!(f, "invalid --delay-ms value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
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
    eprintln!(
        "  cargo run -p app -- [--db <sqlite_url>] [--min-hints <n>] [--delay-ms <ms>] \
         [--hints | --no-hints] [--seed <u64>]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB}");
    eprintln!("  --min-hints {MIN_HINTS_BEFORE_ANSWER}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRACH_DB_URL, TRACH_MIN_HINTS, TRACH_REGEN_DELAY_MS, RUST_LOG");
}

struct Args {
    db_url: String,
    min_hints: usize,
    delay_ms: Option<u64>,
    hints: Option<bool>,
    seed: Option<u64>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("TRACH_DB_URL")
            .ok()
            .and_then(|value| database_url(&value).ok())
            .map_or_else(|| database_url(DEFAULT_DB), Ok)?;
        let mut min_hints = std::env::var("TRACH_MIN_HINTS")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(MIN_HINTS_BEFORE_ANSWER);
        let mut delay_ms = std::env::var("TRACH_REGEN_DELAY_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok());
        let mut hints = None;
        let mut seed = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    db_url = database_url(&require_value(args, "--db")?)?;
                }
                "--min-hints" => {
                    let value = require_value(args, "--min-hints")?;
                    min_hints = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidMinHints { raw: value.clone() })?;
                }
                "--delay-ms" => {
                    let value = require_value(args, "--delay-ms")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidDelay { raw: value.clone() })?;
                    delay_ms = Some(parsed);
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    seed = Some(parsed);
                }
                "--hints" => hints = Some(true),
                "--no-hints" => hints = Some(false),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            min_hints,
            delay_ms,
            hints,
            seed,
        })
    }

    fn config(&self) -> Result<PracticeConfig, Box<dyn std::error::Error>> {
        let mut config = PracticeConfig::default().with_min_hints_before_answer(self.min_hints);
        if let Some(delay_ms) = self.delay_ms {
            config = config
                .with_regeneration_delay_ms(delay_ms)
                .map_err(trach_core::Error::from)?;
        }
        Ok(config)
    }
}

const DEFAULT_DB: &str = "trach.sqlite3";
const MEMORY_URL: &str = "sqlite::memory:";

/// Turn `--db` input into a `sqlite://` URL with an absolute path.
///
/// Accepts a bare path, `sqlite:<path>`, a full `sqlite://` URL, or
/// `sqlite::memory:` for a throwaway run.
fn database_url(raw: &str) -> Result<String, ArgsError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ArgsError::InvalidDbUrl { raw: raw.to_owned() });
    }
    if raw == MEMORY_URL || raw.starts_with("sqlite://") {
        return Ok(raw.to_owned());
    }

    let path = Path::new(raw.strip_prefix("sqlite:").unwrap_or(raw));
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    };
    Ok(format!("sqlite://{}", path.display()))
}

/// Create the directory that will hold the database; `SQLite` creates the file.
fn ensure_database_dir(db_url: &str) -> std::io::Result<()> {
    let Some(path) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    match Path::new(path).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

/// Wrap highlighted characters of the equation in brackets.
fn highlight_equation(equation: &str, highlight: HighlightOffsets) -> String {
    let marked = highlight.offsets();
    equation
        .chars()
        .enumerate()
        .map(|(index, ch)| {
            if marked.contains(&index) {
                format!("[{ch}]")
            } else {
                ch.to_string()
            }
        })
        .collect()
}

fn render(snapshot: &PracticeSnapshot, hints_enabled: bool) {
    if snapshot.is_empty() {
        println!("No problem. Type `n` for a new one.");
        return;
    }

    let equation = if hints_enabled {
        highlight_equation(&snapshot.equation, snapshot.highlight)
    } else {
        snapshot.equation.clone()
    };
    let pending = snapshot.digit_count.saturating_sub(snapshot.answer_progress.len());
    println!();
    println!("  {equation}");
    println!("  = {}{}", "_".repeat(pending), snapshot.answer_progress);

    if hints_enabled && !snapshot.hint_question.is_empty() {
        println!(
            "  hint: {}   sum: {}   ({} left)",
            snapshot.hint_question,
            snapshot.hint_result,
            snapshot.hints_remaining()
        );
    } else if hints_enabled && !snapshot.hint_result.is_empty() {
        println!("  carry: {}", snapshot.hint_result);
    }

    if snapshot.is_complete {
        return;
    }
    let buttons = snapshot
        .choices
        .iter()
        .enumerate()
        .map(|(slot, digit)| format!("{}) {digit}", slot + 1))
        .collect::<Vec<_>>()
        .join("   ");
    println!("  {buttons}");
    println!("  [1-4] answer  [h] hint  [r] reset hints  [t] toggle hints  [n] new  [q] quit");
}

//
// ─── LOOP ──────────────────────────────────────────────────────────────────────
//

/// Wait for the regeneration timer to draw the next problem.
async fn await_next_problem(practice: &PracticeLoopService, delay: Duration) {
    let deadline = tokio::time::Instant::now() + delay + Duration::from_secs(1);
    while practice.snapshot().regeneration_pending && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    if practice.snapshot().regeneration_pending {
        practice.start_problem();
    }
}

async fn handle_answer(practice: &PracticeLoopService, slot: usize, delay: Duration) {
    match practice.answer(slot) {
        Ok(result) if result.is_complete && result.is_correct => {
            render(&practice.snapshot(), practice.settings().hints_enabled());
            println!("Complete! Next problem shortly...");
            await_next_problem(practice, delay).await;
        }
        Ok(result) if result.is_correct => println!("Correct!"),
        Ok(_) => println!("Wrong"),
        Err(err @ PracticeError::HintsRequired { .. }) => {
            println!("{err}. Touch the hint to receive more hints.");
        }
        Err(err) => println!("{err}"),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let config = parsed.config()?;
    let delay = config.regeneration_delay();

    ensure_database_dir(&parsed.db_url)?;
    let services =
        AppServices::new_sqlite(&parsed.db_url, Clock::System, config, parsed.seed).await?;
    let practice = services.practice();
    if let Some(enabled) = parsed.hints {
        practice.set_hints_enabled(enabled).await;
    }

    tracing::info!(db = %parsed.db_url, "starting practice");
    practice.start_problem();
    render(&practice.snapshot(), practice.settings().hints_enabled());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "q" | "quit" => break,
            "h" if !practice.settings().hints_enabled() => {
                println!("Hints are off. Type `t` to turn them on.");
            }
            "h" => {
                let advance = practice.advance_hint().await;
                if advance.show_help {
                    println!("Hint help: touch the hint to get the next step.");
                }
                if !advance.advanced {
                    println!("No more hints for this digit.");
                }
            }
            "r" => practice.reset_hints(),
            "t" => {
                let enabled = !practice.settings().hints_enabled();
                practice.set_hints_enabled(enabled).await;
                println!("Hints {}", if enabled { "on" } else { "off" });
            }
            "n" => practice.start_problem(),
            other => match other.parse::<usize>() {
                Ok(slot @ 1..=4) => handle_answer(&practice, slot - 1, delay).await,
                _ => println!("Unknown command: {other}"),
            },
        }
        render(&practice.snapshot(), practice.settings().hints_enabled());
    }

    practice.reset_practice();
    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = raw.iter().map(|s| (*s).to_string());
        Args::parse(&mut iter)
    }

    #[test]
    fn parses_flags() {
        let args = parse(&["--min-hints", "3", "--hints", "--seed", "7", "--delay-ms", "50"])
            .unwrap();
        assert_eq!(args.min_hints, 3);
        assert_eq!(args.hints, Some(true));
        assert_eq!(args.seed, Some(7));
        let config = args.config().unwrap();
        assert_eq!(config.min_hints_before_answer(), 3);
        assert_eq!(config.regeneration_delay_ms(), 50);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            parse(&["--min-hints", "x"]),
            Err(ArgsError::InvalidMinHints { .. })
        ));
        assert!(matches!(
            parse(&["--seed"]),
            Err(ArgsError::MissingValue { flag: "--seed" })
        ));
        assert!(matches!(parse(&["--bogus"]), Err(ArgsError::UnknownArg(_))));
        assert!(parse(&["--delay-ms", "0"]).unwrap().config().is_err());
    }

    #[test]
    fn database_url_resolves_paths() {
        assert_eq!(database_url("sqlite::memory:").unwrap(), MEMORY_URL);
        assert_eq!(
            database_url("sqlite:///tmp/trach.sqlite3").unwrap(),
            "sqlite:///tmp/trach.sqlite3"
        );
        assert_eq!(
            database_url("/var/lib/trach.sqlite3").unwrap(),
            "sqlite:///var/lib/trach.sqlite3"
        );
        let relative = database_url("sqlite:trach.sqlite3").unwrap();
        assert!(relative.starts_with("sqlite://"));
        assert!(relative.ends_with("/trach.sqlite3"));
        assert!(matches!(
            parse(&["--db", "  "]),
            Err(ArgsError::InvalidDbUrl { .. })
        ));
    }

    #[test]
    fn brackets_highlighted_digits() {
        let highlight = HighlightOffsets {
            multiplicand: Some(3),
            multiplier: Some(9),
        };
        assert_eq!(
            highlight_equation("1234 × 567", highlight),
            "123[4] × 56[7]"
        );
        assert_eq!(
            highlight_equation("1234 × 567", HighlightOffsets::default()),
            "1234 × 567"
        );
    }
}
