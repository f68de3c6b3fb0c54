//! atmsynth - play, render and inspect ATM chiptune songs.
//!
//! Usage:
//!   atmsynth play song.atm --volume 0.5 --mute 3
//!   atmsynth render song.atm -o song.wav
//!   atmsynth info song.atm
//!   atmsynth demo --save demo.atm

mod demo;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use atm_audio::{CpalSink, Speaker};
use atm_ir::{Song, CHANNELS};
use atm_master::{render_song, render_to_wav, Synth, SynthConfig, LOGICAL_SAMPLE_RATE};
use clap::{Args, Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "atmsynth")]
#[command(about = "ATM chiptune player")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a song on the default audio device
    Play {
        /// Song file
        song: PathBuf,

        #[command(flatten)]
        playback: PlaybackArgs,
    },

    /// Render a song offline to an 8-bit WAV file
    Render {
        /// Song file
        song: PathBuf,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,

        /// Maximum length in seconds
        #[arg(long, default_value_t = 300)]
        seconds: u32,
    },

    /// Print a song's header and length
    Info {
        /// Song file
        song: PathBuf,
    },

    /// Play the built-in demo tune, or save it
    Demo {
        /// Write the demo song to this file instead of playing it
        #[arg(long)]
        save: Option<PathBuf>,

        /// Render the demo to this WAV file instead of playing it
        #[arg(long)]
        wav: Option<PathBuf>,

        #[command(flatten)]
        playback: PlaybackArgs,
    },
}

#[derive(Args)]
struct PlaybackArgs {
    /// Master volume (0.0 - 1.0)
    #[arg(long, default_value_t = 1.0)]
    volume: f32,

    /// Mute a channel (0-3); repeatable
    #[arg(long)]
    mute: Vec<u8>,

    /// Stop after this many seconds (songs that loop play until then)
    #[arg(long, default_value_t = 300)]
    seconds: u32,

    /// Command queue capacity
    #[arg(long, default_value_t = 8)]
    queue_capacity: usize,

    /// Wait for a free queue slot, in milliseconds
    #[arg(long, default_value_t = 100)]
    submit_timeout_ms: u64,

    /// Worker command poll interval, in milliseconds
    #[arg(long, default_value_t = 10)]
    poll_interval_ms: u64,

    /// Delay between audio device acquisition attempts, in milliseconds
    #[arg(long, default_value_t = 500)]
    retry_interval_ms: u64,

    /// Wait for the speaker when acquiring it, in milliseconds
    #[arg(long, default_value_t = 200)]
    acquire_timeout_ms: u64,

    /// Wait for the worker to shut down, in milliseconds
    #[arg(long, default_value_t = 1000)]
    shutdown_timeout_ms: u64,
}

impl PlaybackArgs {
    fn synth_config(&self) -> SynthConfig {
        SynthConfig {
            queue_capacity: self.queue_capacity,
            submit_timeout: Duration::from_millis(self.submit_timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            retry_interval: Duration::from_millis(self.retry_interval_ms),
            shutdown_timeout: Duration::from_millis(self.shutdown_timeout_ms),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play { song, playback } => play(Arc::new(load(&song)?), &playback),
        Commands::Render { song, output, seconds } => {
            render(Arc::new(load(&song)?), &output, seconds)
        }
        Commands::Info { song } => print_info(&song),
        Commands::Demo { save, wav, playback } => {
            let builder = demo::demo_song();
            if let Some(path) = save {
                fs::write(&path, builder.to_bytes())
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Saved demo song to {}", path.display());
                return Ok(());
            }
            let song = Arc::new(builder.build());
            match wav {
                Some(path) => render(song, &path, playback.seconds),
                None => play(song, &playback),
            }
        }
    }
}

fn load(path: &Path) -> Result<Song> {
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    atm_formats::load_song(&data).with_context(|| format!("failed to parse {}", path.display()))
}

/// Play length in seconds: the song's own length if it ends, else `limit`.
fn play_length(song: &Arc<Song>, limit: u32) -> Result<f64> {
    let max_samples = LOGICAL_SAMPLE_RATE as usize * limit as usize;
    let samples = render_song(Arc::clone(song), max_samples).context("song faulted")?;
    Ok(samples.len() as f64 / LOGICAL_SAMPLE_RATE as f64)
}

fn play(song: Arc<Song>, args: &PlaybackArgs) -> Result<()> {
    if let Some(&channel) = args.mute.iter().find(|&&ch| ch as usize >= CHANNELS) {
        bail!("channel {channel} does not exist (0-{})", CHANNELS - 1);
    }
    let length = play_length(&song, args.seconds)?;

    let acquire_timeout = Duration::from_millis(args.acquire_timeout_ms);
    let speaker = Speaker::new();
    let synth = Synth::init(args.synth_config(), move || {
        CpalSink::new(speaker).with_acquire_timeout(acquire_timeout)
    })?;

    synth.set_volume(args.volume)?;
    synth.play(song)?;
    for &channel in &args.mute {
        synth.mute_channel(channel)?;
    }

    info!(seconds = length, "playing");
    // A short tail lets the last half-buffer drain
    thread::sleep(Duration::from_secs_f64(length) + Duration::from_millis(100));

    synth.stop()?;
    synth.deinit()?;
    println!("Done.");
    Ok(())
}

fn render(song: Arc<Song>, output: &Path, seconds: u32) -> Result<()> {
    println!("Rendering to {} at {} Hz...", output.display(), LOGICAL_SAMPLE_RATE);
    let wav = render_to_wav(song, seconds).context("song faulted")?;
    fs::write(output, &wav).with_context(|| format!("failed to write {}", output.display()))?;
    println!("Rendered {} bytes", wav.len());
    Ok(())
}

fn print_info(path: &Path) -> Result<()> {
    let song = Arc::new(load(path)?);
    println!("File:         {}", path.display());
    println!("Size:         {} bytes", song.data().len());
    println!("Tracks:       {}", song.track_count());
    println!("Start tracks: {:?}", song.start_tracks());
    for (track, offset) in song.track_offsets().iter().enumerate() {
        println!("  track {track:3}: offset {offset:5}");
    }

    let limit = 600;
    match render_song(Arc::clone(&song), LOGICAL_SAMPLE_RATE as usize * limit) {
        Ok(samples) if samples.len() == LOGICAL_SAMPLE_RATE as usize * limit => {
            println!("Length:       over {limit} s (loops)");
        }
        Ok(samples) => {
            println!("Length:       {:.2} s", samples.len() as f64 / LOGICAL_SAMPLE_RATE as f64);
        }
        Err(e) => println!("Fault:        {e}"),
    }
    Ok(())
}
