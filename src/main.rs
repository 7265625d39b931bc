use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use bloom_gateway::bridge::{self, InputEvent};
use bloom_gateway::{
    CaptureOutcome, Catalogue, Config, Daemon, DaemonChannels, GestureDebouncer, GestureEvent,
    PhraseMatcher, SpeechEngine, VoiceCaptureController,
};

/// Bloom - gesture and voice interaction controller for a face-tracking installation
#[derive(Parser)]
#[command(name = "bloom", version, about)]
struct Cli {
    /// Config file (defaults to ~/.config/bloom/config.toml)
    #[arg(short, long, env = "BLOOM_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Match an utterance against the catalogue
    Match {
        /// What the visitor said
        utterance: String,
    },
    /// List catalogue entries and their phrasings
    Catalogue,
    /// Feed a synthetic lip-gap sequence through the gesture and capture stages
    Simulate {
        /// Comma-separated lip gaps, one per tick
        #[arg(long, value_delimiter = ',', required = true)]
        gaps: Vec<f32>,
        /// Time between ticks in milliseconds
        #[arg(long, default_value = "100")]
        step_ms: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity; stdout is reserved for the bridge
    let filter = match cli.verbose {
        0 => "info,bloom_gateway=info",
        1 => "info,bloom_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    tracing::debug!(?config, "loaded configuration");

    let catalogue = Catalogue::load_or_builtin(config.catalogue_path.as_deref())?;

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Match { utterance } => {
                cmd_match(&catalogue, &utterance);
                Ok(())
            }
            Command::Catalogue => {
                cmd_catalogue(&catalogue);
                Ok(())
            }
            Command::Simulate { gaps, step_ms } => {
                cmd_simulate(&config, &gaps, step_ms);
                Ok(())
            }
        };
    }

    run_bridge(config, catalogue).await
}

/// Run the daemon with stdin/stdout as the collaborator channel
async fn run_bridge(config: Config, catalogue: Catalogue) -> anyhow::Result<()> {
    let (input_tx, inputs) = mpsc::channel::<InputEvent>(64);
    let (engine_tx, engine_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown) = mpsc::channel(1);

    let reader = tokio::spawn(bridge::pump_input(BufReader::new(tokio::io::stdin()), input_tx));
    let writer = tokio::spawn(bridge::pump_output(tokio::io::stdout(), engine_rx, snapshot_rx));

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(()).await;
        }
    });

    tracing::info!(entries = catalogue.len(), "bloom gateway ready - open wide and speak");

    Daemon::new(config, catalogue)
        .run(DaemonChannels {
            inputs,
            engine: engine_tx,
            snapshots: snapshot_tx,
            shutdown,
        })
        .await?;

    // Daemon dropped its senders; let the writer drain
    writer.await??;
    reader.abort();

    Ok(())
}

fn cmd_match(catalogue: &Catalogue, utterance: &str) {
    let matcher = PhraseMatcher::new(catalogue);
    match matcher.find(utterance).and_then(|i| catalogue.label(i).map(|l| (i, l))) {
        Some((index, label)) => println!("{index}: {label}"),
        None => println!("no match"),
    }
}

fn cmd_catalogue(catalogue: &Catalogue) {
    for (index, entry) in catalogue.entries().iter().enumerate() {
        println!(
            "{index:>3}  {:<20} {}",
            entry.primary_label,
            entry.synonyms.join(", ")
        );
    }
}

/// Prints engine requests instead of sending them
struct PrintEngine;

impl SpeechEngine for PrintEngine {
    fn start(&mut self) {
        println!("          engine start");
    }

    fn stop(&mut self) {
        println!("          engine stop");
    }
}

fn cmd_simulate(config: &Config, gaps: &[f32], step_ms: u64) {
    let mut debouncer = GestureDebouncer::new(config.gesture);
    let mut capture = VoiceCaptureController::new(config.capture);
    let mut engine = PrintEngine;
    let start = Instant::now();

    println!(
        "open > {}  close < {}  step {step_ms}ms",
        config.gesture.open_threshold, config.gesture.close_threshold
    );

    for (offset, gap) in (0u64..).map(|i| i * step_ms).zip(gaps) {
        let now = start + Duration::from_millis(offset);

        let mut outcome = None;
        if let Some(event) = debouncer.update(Some(*gap), now) {
            match event {
                GestureEvent::Opened { .. } => println!("{offset:>7}ms gap {gap:>6.2}  opened"),
                GestureEvent::Closed { reason, .. } => {
                    println!("{offset:>7}ms gap {gap:>6.2}  closed ({reason:?})");
                }
            }
            outcome = capture.on_gesture(&event, &mut engine);
        }
        if outcome.is_none() {
            outcome = capture.poll(now, &mut engine);
        }
        if outcome == Some(CaptureOutcome::TimedOut) {
            println!("{offset:>7}ms capture timed out");
        }
    }
}
