//! megamidi CLI: replay a captured MIDI byte stream through the interface.
//!
//! Usage:
//!   megamidi capture.mid
//!   megamidi capture.hex --hex --config interface.yaml --dynamic
//!
//! Prints every voice-control call, the event log and a YAML status
//! snapshot. Set `RUST_LOG=debug` for engine tracing.

use env_logger::Env;
use mm_engine::EngineConfig;
use mm_master::{load_config, load_stream, Session, SessionReport};
use std::env;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let path = args.get(1).unwrap_or_else(|| {
        eprintln!("Usage: megamidi <file> [--hex] [--config path.yaml] [--dynamic] [--inline]");
        std::process::exit(1);
    });

    let hex = args.iter().any(|a| a == "--hex");
    let dynamic = args.iter().any(|a| a == "--dynamic");
    let inline = args.iter().any(|a| a == "--inline");
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1));

    let mut config = match config_path {
        Some(p) => load_config(p).unwrap_or_else(|e| {
            eprintln!("{}", e);
            std::process::exit(1);
        }),
        None => EngineConfig::default(),
    };
    if dynamic {
        config.dynamic_mode = true;
    }

    let bytes = load_stream(path, hex).unwrap_or_else(|e| {
        eprintln!("Failed to load {}: {}", path, e);
        std::process::exit(1);
    });
    log::info!("replaying {} bytes from {}", bytes.len(), path);

    let session = Session::new(config).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    let report = if inline {
        session.replay(&bytes)
    } else {
        session.run(bytes).unwrap_or_else(|e| {
            eprintln!("Session failed: {}", e);
            std::process::exit(1);
        })
    };

    print_report(&report);
}

fn print_report(report: &SessionReport) {
    println!("Calls:");
    for call in &report.calls {
        println!("  {}", call);
    }

    if !report.log.is_empty() {
        println!();
        println!("Log:");
        for entry in &report.log {
            println!("  [{}] {}", entry.level, entry.kind);
        }
    }

    if !report.replies.is_empty() {
        println!();
        println!("Replies: {}", hex::encode_upper(&report.replies));
    }

    println!();
    println!("Ticks:    {}", report.ticks);
    if let Some(peak) = report.load.iter().map(|l| l.peak).max() {
        println!("Peak load: {}%", peak);
    }
    println!();
    match serde_yaml::to_string(&report.status) {
        Ok(yaml) => print!("{}", yaml),
        Err(e) => eprintln!("Failed to format status: {}", e),
    }
}
