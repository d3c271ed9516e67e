//! Volterra headless: drive a simulation from stdin, print events to stdout.
//!
//! Demonstrates:
//!   1. Building a Controller around a ChannelSink
//!   2. Draining notifications on a separate printer thread
//!   3. Mapping named transport events onto commands with Inbound::from_event
//!   4. Shutting down on `window:close` or end of input
//!
//! Each input line is an event name, optionally followed by a JSON payload:
//!
//! ```text
//! Send {"a": 1.1, "b": 0.4, "d": 0.1, "g": 0.4, "x": 10, "y": 5, "max": 20, "step": 0.5}
//! Start
//! Pause
//! GetStatus
//! window:close
//! ```
//!
//! Each notification is printed as `<event> <json>`.
//!
//! Run with:
//!   cargo run --example headless

use std::io::{self, BufRead};
use std::thread;

use serde_json::Value;
use volterra_core::Inbound;
use volterra_engine::{ChannelSink, Controller, EngineConfig};

// ─── Pacing ─────────────────────────────────────────────────────

// Ten times faster than real time.
const TIME_SCALE: f64 = 0.1;

fn main() {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let (sink, events) = ChannelSink::new();
    let config = EngineConfig {
        time_scale: TIME_SCALE,
        ..EngineConfig::default()
    };
    let mut controller = match Controller::with_config(sink, config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("invalid engine config: {e}");
            std::process::exit(2);
        }
    };

    // The channel disconnects once the controller (and its sink) is dropped.
    let printer = thread::spawn(move || {
        for event in events {
            match serde_json::to_string(&event) {
                Ok(json) => println!("{} {json}", event.event_name()),
                Err(e) => eprintln!("unprintable {}: {e}", event.event_name()),
            }
        }
    });

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("stdin: {e}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let payload = match rest.trim() {
            "" => None,
            text => match serde_json::from_str::<Value>(text) {
                Ok(v) => Some(v),
                Err(e) => {
                    eprintln!("bad payload for {name}: {e}");
                    continue;
                }
            },
        };

        match Inbound::from_event(name, payload.as_ref()) {
            Ok(Inbound::Control(cmd)) => {
                if let Err(e) = controller.dispatch(cmd) {
                    eprintln!("rejected: {e}");
                }
            }
            Ok(Inbound::Shutdown) => break,
            Err(e) => eprintln!("{e}"),
        }
    }

    let report = controller.shutdown();
    log::info!(
        "shutdown took {} ms (task joined: {})",
        report.total_ms,
        report.task_joined
    );
    drop(controller);
    let _ = printer.join();
}
