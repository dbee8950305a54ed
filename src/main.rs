//! ambience - headless host for the ambient soundscape core
//!
//! Loads settings and the acoustic library, then walks a scripted observer
//! through a demo world while the soundscape mixes ambience around it.

mod config;
mod demo;

use ambience_audio::{
    AcousticLibrary, CycleReport, EmitterDiagnostic, PlaybackBackend, Soundscape, StubBackend,
};
use ambience_testkit::{EventRecord, JsonlSink};
use anyhow::{Context, Result};
use serde::Serialize;
use std::{env, path::PathBuf, sync::Arc};
use tracing::info;

const USAGE: &str = "\
Usage: ambience [OPTIONS]

Options:
  --ticks <N>            Ticks to simulate (default: length of the demo tour)
  --config <PATH>        Settings TOML (default: config/ambience.toml)
  --library <PATH>       Acoustic library JSON (default: config/acoustics.json)
  --trace <PATH>         Write one JSONL record per aggregation cycle
  --seed <N>             Seed for spot sound selection (default: 0)
  --assets <DIR>         Root for acoustic asset paths (default: assets)
  --report-every <N>     Log emitter diagnostics every N ticks (0 = never)
  --write-config <PATH>  Save the effective settings as TOML
  --no-audio             Use the silent backend even with rodio_backend enabled
  --help                 Show this help";

/// Payload of one `cycle` trace record.
#[derive(Serialize)]
struct CycleTrace<'a> {
    report: &'a CycleReport,
    emitters: Vec<EmitterDiagnostic>,
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting ambience v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    if cli.help {
        println!("{USAGE}");
        return Ok(());
    }

    let settings_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_SETTINGS_PATH));
    let settings = config::load_settings_from_path(&settings_path);
    if let Some(path) = &cli.write_config {
        config::save_settings_to_path(&settings, path)?;
        info!("Wrote settings to {}", path.display());
    }

    let library_path = cli
        .library
        .clone()
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_LIBRARY_PATH));
    let mut library = config::load_library_from_path(&library_path);
    let world = demo::build_world(&mut library);
    let walk = demo::ObserverWalk::tour();

    let backend = open_backend(&cli, &library);
    let mut soundscape = Soundscape::new(Arc::new(settings), library, backend).with_seed(cli.seed);

    let mut trace = match &cli.trace {
        Some(path) => Some(
            JsonlSink::create(path)
                .with_context(|| format!("Failed to create trace {}", path.display()))?,
        ),
        None => None,
    };

    let ticks = cli.ticks.unwrap_or_else(|| walk.len());
    let mut cycles = 0u64;
    let mut started = 0usize;

    soundscape.on_connect();
    for tick in 0..ticks {
        let observer = walk.observer_at(tick);
        if let Some(report) = soundscape.tick(Some(&observer), &world).cloned() {
            cycles += 1;
            started += report.summary.started;
            if let Some(sink) = trace.as_mut() {
                sink.write(&EventRecord {
                    tick: report.tick,
                    kind: "cycle",
                    payload: &CycleTrace {
                        report: &report,
                        emitters: soundscape.diagnostics(),
                    },
                })?;
            }
        }

        if cli.report_every > 0 && tick % cli.report_every == 0 {
            info!(tick, position = %observer.position, "diagnostics");
            for line in soundscape.diagnostics() {
                info!("{line}");
            }
        }
    }
    soundscape.on_disconnect();

    if let Some(mut sink) = trace {
        sink.flush()?;
        info!(records = sink.written(), "trace written");
    }

    println!("{ticks} ticks, {cycles} aggregation cycles, {started} emitters started");
    Ok(())
}

#[cfg(feature = "rodio_backend")]
fn open_backend(cli: &CliOptions, library: &AcousticLibrary) -> Box<dyn PlaybackBackend> {
    if !cli.no_audio {
        match ambience_audio::RodioBackend::new() {
            Ok(mut backend) => {
                let loaded = backend.load_library(library, &cli.assets);
                info!(loaded, "Audio output ready");
                return Box::new(backend);
            }
            Err(err) => tracing::warn!("{err:#}. Falling back to silent playback"),
        }
    }
    Box::new(StubBackend::new())
}

#[cfg(not(feature = "rodio_backend"))]
fn open_backend(cli: &CliOptions, _library: &AcousticLibrary) -> Box<dyn PlaybackBackend> {
    if !cli.no_audio {
        info!(
            assets = %cli.assets.display(),
            "Built without rodio_backend; playback is silent"
        );
    }
    Box::new(StubBackend::new())
}

struct CliOptions {
    ticks: Option<u64>,
    config: Option<PathBuf>,
    library: Option<PathBuf>,
    trace: Option<PathBuf>,
    seed: u64,
    assets: PathBuf,
    report_every: u64,
    write_config: Option<PathBuf>,
    no_audio: bool,
    help: bool,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions {
            ticks: None,
            config: None,
            library: None,
            trace: None,
            seed: 0,
            assets: PathBuf::from("assets"),
            report_every: 0,
            write_config: None,
            no_audio: false,
            help: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--ticks" => {
                    if let Some(value) = parse_u64(&mut args, "--ticks") {
                        opts.ticks = Some(value);
                    }
                }
                "--config" => opts.config = next_path(&mut args, "--config").or(opts.config),
                "--library" => opts.library = next_path(&mut args, "--library").or(opts.library),
                "--trace" => opts.trace = next_path(&mut args, "--trace").or(opts.trace),
                "--seed" => {
                    if let Some(value) = parse_u64(&mut args, "--seed") {
                        opts.seed = value;
                    }
                }
                "--assets" => {
                    if let Some(path) = next_path(&mut args, "--assets") {
                        opts.assets = path;
                    }
                }
                "--report-every" => {
                    if let Some(value) = parse_u64(&mut args, "--report-every") {
                        opts.report_every = value;
                    }
                }
                "--write-config" => {
                    opts.write_config = next_path(&mut args, "--write-config").or(opts.write_config)
                }
                "--no-audio" => opts.no_audio = true,
                "--help" | "-h" => opts.help = true,
                other => tracing::warn!(arg = other, "Unknown argument ignored"),
            }
        }

        opts
    }
}

fn next_path<I: Iterator<Item = String>>(args: &mut I, flag: &str) -> Option<PathBuf> {
    match args.next() {
        Some(path) => Some(PathBuf::from(path)),
        None => {
            tracing::error!("{flag} requires a path");
            None
        }
    }
}

fn parse_u64<I: Iterator<Item = String>>(args: &mut I, flag: &str) -> Option<u64> {
    let Some(raw) = args.next() else {
        tracing::error!("{flag} requires an integer");
        return None;
    };
    match raw.parse::<u64>() {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::error!(%err, value = %raw, "{flag} must be an integer");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliOptions {
        CliOptions::parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn defaults_without_arguments() {
        let opts = parse(&[]);
        assert_eq!(opts.ticks, None);
        assert_eq!(opts.seed, 0);
        assert_eq!(opts.assets, PathBuf::from("assets"));
        assert!(!opts.no_audio && !opts.help);
    }

    #[test]
    fn flags_are_parsed() {
        let opts = parse(&[
            "--ticks",
            "400",
            "--trace",
            "out/trace.jsonl",
            "--seed",
            "7",
            "--no-audio",
            "--report-every",
            "20",
        ]);
        assert_eq!(opts.ticks, Some(400));
        assert_eq!(opts.trace, Some(PathBuf::from("out/trace.jsonl")));
        assert_eq!(opts.seed, 7);
        assert_eq!(opts.report_every, 20);
        assert!(opts.no_audio);
    }

    #[test]
    fn bad_values_are_ignored() {
        let opts = parse(&["--ticks", "many", "--seed"]);
        assert_eq!(opts.ticks, None);
        assert_eq!(opts.seed, 0);
    }
}
