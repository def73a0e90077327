//! ENS Vanity Address Search CLI
//!
//! Usage:
//!   ens_vanity -p dead             # Find an address starting with 0xdead
//!   ens_vanity -p c0ffee -w 16     # Use 16 worker threads
//!   RUST_LOG=ens_vanity=debug ens_vanity -p beef

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::{unbounded, RecvTimeoutError};

use ens_vanity::{logging, Config, MatchResult, Prefix, SearchCoordinator, SearchEvent};

fn main() {
    let config = Config::parse();

    if let Err(e) = logging::init(&config.log_level) {
        eprintln!("Logging error: {}", e);
        process::exit(1);
    }

    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    let search_config = config.search_config();
    let prefix = match Prefix::parse(config.prefix_digits()) {
        Ok(prefix) => prefix,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    println!("ENS Vanity Address Search");
    println!("=========================");
    println!("Prefix:     0x{}", prefix);
    println!("Workers:    {}", search_config.workers);
    println!();

    let (events_tx, events_rx) = unbounded();
    let coordinator = SearchCoordinator::new(search_config).with_observer(events_tx);

    let interrupted = Arc::new(AtomicBool::new(false));
    ctrlc_handler(interrupted.clone());

    if let Err(e) = coordinator.start(prefix.as_str()) {
        eprintln!("Failed to start search: {}", e);
        process::exit(1);
    }

    println!("Searching... (Press Ctrl+C to stop)\n");

    let report_interval = Duration::from_secs(config.report_interval);
    let poll_interval = Duration::from_millis(100);
    let mut last_report = Instant::now();
    let mut exit_code = 0;

    loop {
        if interrupted.load(Ordering::Relaxed) {
            coordinator.stop();
            println!("\nStopped by user.");
            break;
        }

        match events_rx.recv_timeout(poll_interval) {
            Ok(SearchEvent::Matched(result)) => {
                print_result(&result);
                break;
            }
            Ok(SearchEvent::WorkerFailed { worker_id, reason }) => {
                eprintln!("Worker {} stopped: {}", worker_id, reason);
            }
            Ok(SearchEvent::Exhausted) => {
                eprintln!("All workers failed, giving up.");
                exit_code = 1;
                break;
            }
            Ok(SearchEvent::Progress { .. }) | Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if last_report.elapsed() >= report_interval {
            print_progress(&coordinator);
            last_report = Instant::now();
        }
    }

    let status = coordinator.status();
    println!("\n--- Final Statistics ---");
    println!("Status:               {}", status.status);
    println!("Total keys generated: {}", format_number(status.total_generated));
    println!("Time elapsed:         {:.2}s", status.elapsed.as_secs_f64());
    println!(
        "Average speed:        {}/s",
        format_number(coordinator.keys_per_second() as u64)
    );

    drop(coordinator);
    process::exit(exit_code);
}

fn print_result(result: &MatchResult) {
    println!("\n=== Match ===");
    println!("Address:     {}", result.address_checksum());
    println!("Private Key: {}", result.private_key_hex());
    println!("Generated:   {}", format_number(result.total_generated));
    println!("Time:        {} ms", result.elapsed_millis());
    println!("Worker:      {}", result.worker_id);
    println!("\nKeep the private key secret: it controls every asset sent to this address.");
}

fn print_progress(coordinator: &SearchCoordinator) {
    let status = coordinator.status();
    println!(
        "[{:>4}s] Generated {} keys ({}/s)",
        status.elapsed.as_secs(),
        format_number(status.total_generated),
        format_number(coordinator.keys_per_second() as u64)
    );
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(interrupted: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        interrupted.store(true, Ordering::Relaxed);
    }) {
        eprintln!("Warning: could not install Ctrl-C handler: {}", e);
    }
}
