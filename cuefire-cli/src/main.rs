//! cuefire CLI Tool
//!
//! Command-line interface for inspecting subtitle files and simulating
//! frame-driven cue playback.

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use cuefire_core::{format_timestamp, CueStore, IndexedCue};
use cuefire_player::{CueHandler, CueScheduler, SchedulerConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cuefire")]
#[command(about = "cuefire - Edge-triggered subtitle cue scheduling")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cues of a subtitle file
    Info {
        /// Input SRT or WebVTT file path
        input: PathBuf,

        /// Print the cue list as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the cues active at an offset
    At {
        /// Input SRT or WebVTT file path
        input: PathBuf,

        /// Offset in milliseconds
        #[arg(long)]
        offset: f64,

        /// Print the cues as JSON
        #[arg(long)]
        json: bool,
    },

    /// Simulate a frame loop and print every begin/end event
    Play {
        /// Input SRT or WebVTT file path
        input: PathBuf,

        /// Simulated frames per second
        #[arg(long, default_value = "30")]
        fps: f64,

        /// Playback speed multiplier
        #[arg(long, default_value = "1.0")]
        speed: f64,

        /// Simulated wall-clock duration in seconds (default: one full pass)
        #[arg(long)]
        duration: Option<f64>,

        /// Loop point in milliseconds, e.g. the video length
        #[arg(long)]
        max_length: Option<i64>,

        /// Start offset in milliseconds
        #[arg(long)]
        start: Option<f64>,

        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Info { input, json } => show_info(&input, json)?,

        Commands::At {
            input,
            offset,
            json,
        } => show_active(&input, offset, json)?,

        Commands::Play {
            input,
            fps,
            speed,
            duration,
            max_length,
            start,
            json,
        } => play(
            &input,
            PlayOptions {
                fps,
                speed,
                duration,
                max_length,
                start,
                json,
            },
        )?,
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_subtitles(input: &Path) -> Result<String> {
    std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read subtitle file {}", input.display()))
}

fn load_store(input: &Path) -> Result<CueStore> {
    let text = read_subtitles(input)?;
    let mut store = CueStore::new();
    store
        .load(&text, true)
        .with_context(|| format!("Failed to parse {}", input.display()))?;
    Ok(store)
}

fn show_info(input: &Path, json: bool) -> Result<()> {
    let store = load_store(input)?;

    if json {
        println!("{}", store.to_json().context("Failed to serialize cues")?);
        return Ok(());
    }

    println!("\n=== Subtitle Information ===");
    println!("File: {}", input.display());
    println!("Cues: {}", store.len());
    println!(
        "Max offset: {} ms ({})",
        store.max_offset_ms(),
        format_timestamp(store.max_offset_ms().max(0) as u64)
    );

    println!("\n=== Cues ===");
    for cue in store.cues() {
        println!("  [{}] {}", cue.index, cue.cue);
    }

    Ok(())
}

fn show_active(input: &Path, offset: f64, json: bool) -> Result<()> {
    let store = load_store(input)?;
    let active: Vec<&IndexedCue> = store.active_at(offset).collect();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&active).context("Failed to serialize cues")?
        );
    } else if active.is_empty() {
        println!("No cues active at {} ms", offset);
    } else {
        for cue in active {
            println!("  [{}] {}", cue.index, cue.cue);
        }
    }

    Ok(())
}

struct PlayOptions {
    fps: f64,
    speed: f64,
    duration: Option<f64>,
    max_length: Option<i64>,
    start: Option<f64>,
    json: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum EventKind {
    Begin,
    End,
}

/// Collects notifications until the frame loop prints them
#[derive(Default)]
struct EventBuffer {
    pending: Vec<(EventKind, IndexedCue)>,
}

impl CueHandler for EventBuffer {
    fn on_cue_begin(&mut self, cue: &IndexedCue) {
        self.pending.push((EventKind::Begin, cue.clone()));
    }

    fn on_cue_end(&mut self, cue: &IndexedCue) {
        self.pending.push((EventKind::End, cue.clone()));
    }
}

#[derive(Serialize)]
struct EventLine<'a> {
    event: EventKind,
    offset_ms: f64,
    #[serde(flatten)]
    cue: &'a IndexedCue,
}

fn play(input: &Path, options: PlayOptions) -> Result<()> {
    ensure!(options.fps > 0.0, "--fps must be positive");
    ensure!(options.speed >= 0.0, "--speed must not be negative");

    let text = read_subtitles(input)?;
    let mut scheduler = CueScheduler::with_config(EventBuffer::default(), SchedulerConfig::default());
    let count = scheduler
        .try_load(&text)
        .with_context(|| format!("Failed to parse {}", input.display()))?;

    if let Some(max_length) = options.max_length {
        scheduler.set_max_length(max_length);
    }

    let duration = match options.duration {
        Some(duration) => duration,
        None if options.speed > 0.0 => scheduler.max_offset_ms().max(0) as f64 / 1000.0 / options.speed,
        None => 0.0,
    };
    let frames = (duration * options.fps).ceil() as u64;
    let dt = options.speed / options.fps;

    tracing::info!(cues = count, frames, dt, "starting simulated playback");

    if let Some(start) = options.start {
        scheduler.set_offset(start);
        print_events(&mut scheduler, options.json)?;
    }

    for _ in 0..frames {
        scheduler.update(dt);
        print_events(&mut scheduler, options.json)?;
    }

    Ok(())
}

fn print_events(scheduler: &mut CueScheduler<EventBuffer>, json: bool) -> Result<()> {
    let offset_ms = scheduler.offset_ms();
    let pending = std::mem::take(&mut scheduler.handler_mut().pending);

    for (event, cue) in &pending {
        if json {
            let line = EventLine {
                event: *event,
                offset_ms,
                cue,
            };
            println!("{}", serde_json::to_string(&line).context("Failed to serialize event")?);
        } else {
            let marker = match event {
                EventKind::Begin => '+',
                EventKind::End => '-',
            };
            println!(
                "[{}] {} #{} {:?}",
                format_timestamp(offset_ms as u64),
                marker,
                cue.index,
                cue.text
            );
        }
    }

    Ok(())
}
