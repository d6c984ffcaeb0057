//! smd CLI: headless rendering and WAV export.
//!
//! Usage:
//!   smd-cli track0.bin track1.bin
//!   smd-cli track0.bin --seconds 30 --wav output.wav
//!   smd-cli track0.bin --no-loop --until-end --wav output.wav
//!
//! Set `RUST_LOG=smd_engine=trace` to follow every decoded event.

use smd_master::{Player, RenderLength, SessionConfig};
use std::{env, fs, process};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: smd-cli <track.bin>... [--tpqn N] [--rate HZ] \
                     [--ticks N | --seconds S | --until-end] [--no-loop] [--track N] [--wav out.wav]";

/// How much audio to render.
enum Span {
    Ticks(u64),
    Seconds(u32),
    UntilEnd,
}

struct Args {
    tracks: Vec<String>,
    tpqn: u16,
    config: SessionConfig,
    span: Span,
    wav: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(env::args().skip(1)).unwrap_or_else(|msg| {
        eprintln!("{}", msg);
        eprintln!("{}", USAGE);
        process::exit(1);
    });

    let buffers: Vec<Vec<u8>> = args
        .tracks
        .iter()
        .map(|path| {
            fs::read(path).unwrap_or_else(|e| {
                eprintln!("Failed to read {}: {}", path, e);
                process::exit(1);
            })
        })
        .collect();

    let mut player = Player::from_track_buffers("cli", args.tpqn, buffers, args.config)
        .unwrap_or_else(|e| {
            eprintln!("Failed to set up playback: {}", e);
            process::exit(1);
        });

    println!("Tracks:      {}", player.song().num_tracks());
    println!("TPQN:        {}", player.song().tpqn());
    println!("Sample rate: {} Hz", args.config.sample_rate);
    println!("Looping:     {}", if args.config.loops { "on" } else { "off" });
    for (i, summary) in player.summaries().iter().enumerate() {
        match summary {
            Ok(s) => println!("  Track {:2}: {}", i, s),
            Err(e) => println!("  Track {:2}: invalid ({})", i, e),
        }
    }
    println!();

    let frames = match args.span {
        Span::Ticks(n) => player.render(RenderLength::Ticks(n)),
        Span::UntilEnd => player.render(RenderLength::UntilEnd),
        Span::Seconds(s) => player.render_seconds(s),
    }
    .unwrap_or_else(|e| {
        eprintln!("Playback failed: {}", e);
        process::exit(1);
    });

    let seq = player.sequencer();
    println!(
        "Rendered {} frames ({:.2}s), {} ticks, final tempo {} BPM{}",
        frames.len(),
        frames.len() as f64 / args.config.sample_rate as f64,
        seq.position(),
        seq.tempo(),
        if seq.is_completed() { ", song ended" } else { "" }
    );

    if let Some(path) = args.wav {
        let wav = smd_master::frames_to_wav(&frames, args.config.sample_rate).unwrap_or_else(|e| {
            eprintln!("Failed to encode WAV: {}", e);
            process::exit(1);
        });
        fs::write(&path, &wav).unwrap_or_else(|e| {
            eprintln!("Failed to write {}: {}", path, e);
            process::exit(1);
        });
        println!("Wrote {} bytes to {}", wav.len(), path);
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args {
        tracks: Vec::new(),
        tpqn: 48,
        config: SessionConfig::default(),
        span: Span::Seconds(60),
        wav: None,
    };

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .ok_or_else(|| format!("Missing value for {}", flag))
        };
        match arg.as_str() {
            "--tpqn" => parsed.tpqn = parse_num(&value("--tpqn")?, "--tpqn")?,
            "--rate" => {
                let rate = parse_num(&value("--rate")?, "--rate")?;
                parsed.config = parsed.config.with_sample_rate(rate);
            }
            "--ticks" => parsed.span = Span::Ticks(parse_num(&value("--ticks")?, "--ticks")?),
            "--seconds" => {
                parsed.span = Span::Seconds(parse_num(&value("--seconds")?, "--seconds")?)
            }
            "--until-end" => parsed.span = Span::UntilEnd,
            "--no-loop" => parsed.config = parsed.config.with_loops(false),
            "--track" => {
                let track = parse_num(&value("--track")?, "--track")?;
                parsed.config = parsed.config.isolate(track);
            }
            "--wav" => parsed.wav = Some(value("--wav")?),
            flag if flag.starts_with("--") => return Err(format!("Unknown option {}", flag)),
            _ => parsed.tracks.push(arg),
        }
    }

    if parsed.tracks.is_empty() {
        return Err("No track files given".to_string());
    }
    Ok(parsed)
}

fn parse_num<T: std::str::FromStr>(value: &str, flag: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid value for {}: {}", flag, value))
}
