use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use prompter::config::{PrompterConfig, load_config};
use prompter::{
    Direction, DriverCommand, OutputType, PlaybackDriver, PlaybackEvent, PlaybackSnapshot,
    Prompter,
};

#[derive(Parser, Debug)]
#[command(name = "prompter")]
#[command(about = "Parse teleprompter scripts and rehearse them against the clock")]
struct Params {
    /// TOML config file. Missing or invalid files fall back to defaults.
    #[arg(short = 'c', long = "config", global = true, default_value = "prompter.toml")]
    config_path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a script and print it as JSON records or normalized markup.
    Parse(ParseArgs),

    /// Run a script headless: countdown on stdout, commands on stdin.
    ///
    /// Commands: `t` (or empty line) toggle, `n` next, `p` previous, `r` reset,
    /// `g <n>` jump to segment n, `q` quit.
    Rehearse(RehearseArgs),
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// Script file to parse.
    script: PathBuf,

    #[arg(short = 'o', long = "output-type", value_enum, default_value_t = OutputType::Json)]
    output_type: OutputType,

    /// Override the duration used for segments without an annotation.
    #[arg(short = 'd', long = "default-duration")]
    default_duration: Option<u32>,
}

#[derive(Args, Debug)]
struct RehearseArgs {
    /// Script file to rehearse.
    script: PathBuf,

    /// Override the tick period in milliseconds.
    #[arg(long = "tick-ms")]
    tick_ms: Option<u64>,

    /// Move on to the next segment and keep running when one completes.
    #[arg(long = "auto-advance", default_value_t = false)]
    auto_advance: bool,

    /// Start the first segment immediately.
    #[arg(long = "autostart", default_value_t = false)]
    autostart: bool,

    /// Override the duration used for segments without an annotation.
    #[arg(short = 'd', long = "default-duration")]
    default_duration: Option<u32>,
}

#[tokio::main]
async fn main() {
    let params = Params::parse();
    let mut config = load_config(&params.config_path);
    prompter::init_logging(config.logging.log_level);

    let res = match params.command {
        Command::Parse(args) => {
            if let Some(secs) = args.default_duration {
                config.parser.default_duration_secs = secs;
            }
            run_parse(&config, args)
        }
        Command::Rehearse(args) => {
            if let Some(secs) = args.default_duration {
                config.parser.default_duration_secs = secs;
            }
            if let Some(ms) = args.tick_ms {
                config.playback.tick_interval_ms = ms;
            }
            config.playback.auto_advance |= args.auto_advance;
            run_rehearse(&config, args).await
        }
    };

    if let Err(err) = res {
        error!(error = ?err, "prompter failed");
        std::process::exit(1);
    }
}

fn run_parse(config: &PrompterConfig, args: ParseArgs) -> Result<()> {
    let prompter = Prompter::from_config(config);
    // Parse issues and load failures are logged by the library.
    let document = prompter.load_path(&args.script);

    let stdout = io::stdout();
    prompter
        .export(&document, stdout.lock(), args.output_type)
        .context("failed to write parsed script")?;
    if args.output_type == OutputType::Json {
        println!();
    }
    Ok(())
}

async fn run_rehearse(config: &PrompterConfig, args: RehearseArgs) -> Result<()> {
    let prompter = Prompter::from_config(config);
    let document = prompter.load_path(&args.script);
    info!(
        segments = document.len(),
        total_secs = document.total_duration_secs(),
        "rehearsal loaded"
    );

    let driver = PlaybackDriver::spawn(prompter.controller(document), config.tick_interval());
    let mut events = driver.subscribe();
    let mut snapshots = driver.watch();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut last_line = String::new();

    print_status(&driver.snapshot(), &mut last_line)?;
    if args.autostart {
        driver.send(DriverCommand::Toggle).await?;
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            line = lines.next_line(), if stdin_open => {
                match line.context("failed to read stdin")? {
                    Some(line) => match parse_command(&line) {
                        Some(Input::Quit) => break,
                        Some(Input::Command(command)) => driver.send(command).await?,
                        None => warn!(input = %line.trim(), "unknown command"),
                    },
                    None => stdin_open = false,
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        info!(?event, "playback event");
                        if let PlaybackEvent::SegmentCompleted { .. } = event {
                            if !config.playback.auto_advance {
                                continue;
                            }
                            if driver.snapshot().segment_index + 1 >= driver.snapshot().segment_count {
                                info!("script finished");
                                break;
                            }
                            driver.send(DriverCommand::Navigate(Direction::Next)).await?;
                            driver.send(DriverCommand::Toggle).await?;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "dropped playback events"),
                    Err(RecvError::Closed) => break,
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                print_status(&snapshot, &mut last_line)?;
            }
        }
    }

    driver.shutdown().await?;
    Ok(())
}

enum Input {
    Command(DriverCommand),
    Quit,
}

fn parse_command(line: &str) -> Option<Input> {
    let mut parts = line.split_whitespace();
    let command = match parts.next() {
        None | Some("t") | Some("toggle") => DriverCommand::Toggle,
        Some("n") | Some("next") => DriverCommand::Navigate(Direction::Next),
        Some("p") | Some("prev") => DriverCommand::Navigate(Direction::Previous),
        Some("r") | Some("reset") => DriverCommand::Reset,
        Some("g") | Some("goto") => {
            let n: usize = parts.next()?.parse().ok()?;
            DriverCommand::JumpTo(n.checked_sub(1)?)
        }
        Some("q") | Some("quit") => return Some(Input::Quit),
        Some(_) => return None,
    };
    Some(Input::Command(command))
}

/// Print a status line only when its text differs from the previous one.
fn print_status(snapshot: &PlaybackSnapshot, last_line: &mut String) -> Result<()> {
    let line = format!(
        "[{}/{}] {} {} {:?} {:?}",
        snapshot.segment_id,
        snapshot.segment_count,
        snapshot.title,
        snapshot.clock,
        snapshot.threshold,
        snapshot.status,
    );
    if line != *last_line {
        let mut out = io::stdout().lock();
        writeln!(out, "{line}")?;
        out.flush()?;
        *last_line = line;
    }
    Ok(())
}
