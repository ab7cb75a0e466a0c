//! hum2midi CLI - transcribe a hummed WAV recording into a MIDI file

use anyhow::Context;
use clap::Parser;
use hum2midi::{transcribe_file, FileOptions, Session, DEFAULT_EXPORT_FILENAME};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

/// Transcribe a monophonic recording (humming, whistling, singing) to MIDI
#[derive(Parser, Debug)]
#[command(name = "hum2midi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input WAV file
    input: PathBuf,

    /// Output MIDI file
    #[arg(short, long, default_value = DEFAULT_EXPORT_FILENAME)]
    output: PathBuf,

    /// Tempo in BPM (clamped to 40-220)
    #[arg(long, default_value_t = hum2midi::core::DEFAULT_BPM)]
    bpm: f64,

    /// Trim start in seconds
    #[arg(long)]
    start: Option<f64>,

    /// Trim end in seconds (default: end of recording)
    #[arg(long)]
    end: Option<f64>,

    /// Lowest MIDI note to keep
    #[arg(long, default_value_t = hum2midi::core::DEFAULT_PITCH_FLOOR)]
    floor: u8,

    /// Highest MIDI note to keep
    #[arg(long, default_value_t = hum2midi::core::DEFAULT_PITCH_CEILING)]
    ceiling: u8,

    /// Transpose the result by this many semitones
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    transpose: i32,

    /// Samples per analysis block
    #[arg(long, default_value_t = 2048)]
    block_size: usize,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn file_options(&self) -> FileOptions {
        FileOptions {
            bpm: self.bpm,
            start: self.start,
            end: self.end,
            pitch_floor: self.floor,
            pitch_ceiling: self.ceiling,
            transpose: self.transpose,
            block_size: self.block_size,
        }
    }
}

fn print_notes(session: &Session) {
    let composition = session.composition();
    let notes = composition.notes();
    println!(
        "{} note(s) at {} BPM, {:.2}s recorded",
        notes.len(),
        composition.bpm(),
        session.recorded_secs()
    );
    for (i, note) in notes.iter().enumerate() {
        println!(
            "{:>4}  {:>7.3}s  {:>6.3}s  {:<4} (midi {})",
            i + 1,
            note.start,
            note.duration,
            note.name(),
            note.midi
        );
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let session = transcribe_file(&cli.input, &cli.file_options())
        .with_context(|| format!("failed to transcribe {}", cli.input.display()))?;

    print_notes(&session);

    session
        .write_midi(&cli.output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    println!("wrote {}", cli.output.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
