//! Human-readable console output.

use std::backtrace::Backtrace;

use devsweep_core::maintenance::{CleanupResult, LockCleanup};
use devsweep_core::{CampaignEvent, CampaignReport, PortStatus, Progress, Recommendation};

const WIDTH: usize = 70;

/// Prints campaign progress to stdout as it happens.
pub struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn event(&mut self, event: CampaignEvent) {
        match event {
            CampaignEvent::StageStarted(stage) => {
                println!("\n{}", "-".repeat(WIDTH));
                println!("Stage {}: {}", stage.number(), stage.title());
                println!("{}", "-".repeat(WIDTH));
            }
            CampaignEvent::LookupStarted { target } => println!("\nLooking for: {}", target),
            CampaignEvent::NothingFound { target } => println!("  ✓ Nothing matching {}", target),
            CampaignEvent::MatchesFound { count } => println!("  Found {} process(es)", count),
            CampaignEvent::Terminating { pid, command } => {
                println!("  → Terminating PID {}: {}", pid, command)
            }
            CampaignEvent::TerminatingPortOwner {
                pid,
                name,
                connections,
            } => {
                println!("  → Terminating PID {} ({})", pid, name);
                println!("     connections: {}", connections);
            }
            CampaignEvent::Terminated { pid } => println!("  ✓ Terminated PID {}", pid),
            CampaignEvent::TerminationFailed { pid, attempts } => println!(
                "  ✗ Failed to terminate PID {} after {} attempt(s)",
                pid, attempts
            ),
            CampaignEvent::SkippedOwnProcess { pid } => {
                println!("  - Skipping PID {}: runs this sweep", pid)
            }
            CampaignEvent::PatternSkipped { label, reason } => {
                println!("  ⚠ Skipping {}: {}", label, reason)
            }
            CampaignEvent::PortCheckStarted { port } => println!("\nChecking port: {}", port),
            CampaignEvent::PortOwnersFound { port, owners } => {
                println!("  Found {} process(es) holding port {}", owners, port)
            }
            CampaignEvent::PortOwnersHidden { port } => println!(
                "  ⚠ Port {} is held by a process not visible to this user",
                port
            ),
            CampaignEvent::PortStatus { port, status } => match status {
                PortStatus::Free => println!("  ✓ Port {} is free", port),
                PortStatus::Released => println!("  ✓ Port {} released", port),
                PortStatus::StillOccupied => println!("  ⚠ Port {} is still in use", port),
            },
        }
    }
}

pub fn banner() {
    println!("{}", "=".repeat(WIDTH));
    println!("  devsweep - dev process and port cleanup");
    println!("{}", "=".repeat(WIDTH));
}

pub fn privilege_hint(json: bool) {
    let hint = "Hint: running as administrator/root improves the success rate\n";
    if json {
        eprintln!("{}", hint);
    } else {
        println!("{}", hint);
    }
}

pub fn lock_cleanup(results: &[LockCleanup]) {
    println!("\nCleaning lock files...");

    let mut cleaned = 0;
    for entry in results {
        let path = entry.path.display();
        match &entry.result {
            CleanupResult::Removed => {
                cleaned += 1;
                println!("  ✓ Removed: {}", path);
            }
            CleanupResult::RemovedDir => {
                cleaned += 1;
                println!("  ✓ Removed directory: {}", path);
            }
            CleanupResult::Failed(reason) => {
                println!("  ⚠ Could not remove {}: {}", path, reason)
            }
            CleanupResult::Missing => {}
        }
    }

    if cleaned == 0 {
        println!("  ✓ Nothing to clean");
    }
}

pub fn report(report: &CampaignReport, elapsed: chrono::Duration) {
    let totals = report.totals;

    println!("\n{}", "=".repeat(WIDTH));
    println!("Cleanup statistics");
    println!("{}", "=".repeat(WIDTH));
    println!("  Processes handled: {}", totals.attempted);
    println!("  Terminated:        {}", totals.succeeded);
    println!("  Failed:            {}", totals.failed);
    println!(
        "  Elapsed:           {:.1}s",
        elapsed.num_milliseconds() as f64 / 1000.0
    );
    println!();

    let marker = match report.recommendation {
        Recommendation::ElevationSuggested => "⚠",
        Recommendation::AllClear | Recommendation::Done => "✓",
    };
    println!("  {} {}", marker, report.recommendation.message());
    println!("{}", "=".repeat(WIDTH));
}

pub fn cancelled() {
    println!("\n\n✗ Cancelled by operator");
}

pub fn fault(err: &anyhow::Error) {
    eprintln!("\n\n✗ Error: {:#}", err);
    eprintln!("{:?}", err);
}

/// Report panics like any other fault and exit with status 1.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("\n\n✗ Error: {}", info);
        eprintln!("{}", Backtrace::force_capture());
        std::process::exit(1);
    }));
}
