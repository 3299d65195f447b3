// SPDX-License-Identifier: MPL-2.0

//! Prana monitor example.
//!
//! Reads, watches or changes the state of a Prana recuperator.
//!
//! # Usage
//!
//! ```bash
//! # Print the current state once
//! cargo run --example monitor -- state <device_ip>
//!
//! # Poll every 15 s and print each update for 5 minutes
//! cargo run --example monitor -- watch <device_ip>
//!
//! # Set a fan level (0-6), powering the fan on or off as needed
//! cargo run --example monitor -- fan <device_ip> <extract|supply|bounded> <level>
//!
//! # Enable or disable a mode
//! cargo run --example monitor -- mode <device_ip> <mode> <on|off>
//! ```
//!
//! Log output is controlled with `RUST_LOG`, e.g. `RUST_LOG=prana_lib=debug`.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use prana_lib::types::{Mode, Subsystem};
use prana_lib::{Coordinator, CoordinatorConfig, CoordinatorEvent, Device, DeviceSnapshot};
use tracing_subscriber::EnvFilter;

const WATCH_DURATION: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("prana_lib=info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let device = Device::http(args[2].as_str())?;
    let coordinator = Arc::new(Coordinator::new(device, CoordinatorConfig::new(&args[2])));

    match args[1].as_str() {
        "state" => {
            let snapshot = coordinator.first_refresh().await?;
            print_snapshot(&snapshot);
        }
        "watch" => run_watch(&coordinator).await?,
        "fan" if args.len() >= 5 => {
            let subsystem: Subsystem = args[3].parse()?;
            let level: u8 = args[4].parse()?;
            coordinator.first_refresh().await?;
            let outcome = coordinator.request_fan_level(level, subsystem).await?;
            println!("{subsystem} fan: {outcome:?}");
            if let Some(snapshot) = coordinator.current_snapshot() {
                print_snapshot(&snapshot);
            }
        }
        "mode" if args.len() >= 5 => {
            let mode: Mode = args[3].parse()?;
            let on = matches!(args[4].as_str(), "on" | "true" | "1");
            coordinator.first_refresh().await?;
            let outcome = coordinator.request_switch(mode, on).await?;
            println!("{mode} mode: {outcome:?}");
        }
        other => {
            eprintln!("Unknown or incomplete command: {other}");
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn run_watch(coordinator: &Arc<Coordinator>) -> prana_lib::Result<()> {
    coordinator.first_refresh().await?;
    let mut events = coordinator.subscribe();
    let poller = coordinator.spawn_poller();

    let watch = async {
        while let Ok(event) = events.recv().await {
            match event {
                CoordinatorEvent::Updated { snapshot } => print_snapshot(&snapshot),
                CoordinatorEvent::UpdateFailed { kind, message } => {
                    eprintln!("Update failed ({kind}): {message}");
                }
                _ => {}
            }
        }
    };

    let _ = tokio::time::timeout(WATCH_DURATION, watch).await;
    poller.shutdown().await;
    Ok(())
}

fn print_snapshot(snapshot: &DeviceSnapshot) {
    println!("--- {} ---", snapshot.received_at().format("%H:%M:%S"));
    for subsystem in Subsystem::ALL {
        println!(
            "{subsystem:>8}: {:>3} ({:>3}%)",
            if snapshot.is_on(subsystem) { "on" } else { "off" },
            snapshot.percentage(subsystem)
        );
    }

    let modes: Vec<&str> = Mode::ALL
        .iter()
        .filter(|m| snapshot.mode(**m))
        .map(|m| m.as_str())
        .collect();
    println!("   modes: {}", modes.join(", "));
    println!("  bright: level {}", snapshot.brightness_level().value());

    for sensor in snapshot.available_sensors() {
        if let Some(value) = snapshot.sensors().get(sensor) {
            let unit = if sensor.is_temperature() { " °C" } else { "" };
            println!("{:>8}: {}{unit}", sensor.key(), value.as_f64());
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage:");
    eprintln!("  {program} state <device_ip>");
    eprintln!("  {program} watch <device_ip>");
    eprintln!("  {program} fan <device_ip> <extract|supply|bounded> <level>");
    eprintln!("  {program} mode <device_ip> <mode> <on|off>");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {program} state 192.168.1.40");
    eprintln!("  {program} fan 192.168.1.40 supply 3");
    eprintln!("  {program} mode 192.168.1.40 night on");
}
