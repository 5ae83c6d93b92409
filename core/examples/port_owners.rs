//! Example: Show which processes hold the given ports (default: the dev ports).
//!
//! Read-only; nothing is terminated.
//!
//! ```text
//! cargo run -p devsweep-core --example port_owners -- 5173 3000
//! ```

use devsweep_core::ports::{ConnectionDirectory, ProcessDirectory};
use devsweep_core::{CleanupPlan, SystemConnectionDirectory, SystemProcessDirectory};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let ports: Vec<u16> = {
        let args: Vec<u16> = std::env::args().skip(1).filter_map(|a| a.parse().ok()).collect();
        if args.is_empty() {
            CleanupPlan::default().ports
        } else {
            args
        }
    };

    let connections = SystemConnectionDirectory::new();
    let processes = SystemProcessDirectory::new();

    println!(
        "{:<6} {:<6} {:<8} {:<24} {:<12} {}",
        "PORT", "PROTO", "PID", "LOCAL", "STATE", "PROCESS"
    );
    println!("{}", "-".repeat(80));

    for port in ports {
        let records = match connections.find_by_port(port).await {
            Ok(records) => records,
            Err(e) => {
                eprintln!("Error checking port {}: {}", port, e);
                continue;
            }
        };

        if records.is_empty() {
            println!("{:<6} free", port);
            continue;
        }

        for record in records {
            let (pid, name) = match record.owning_pid {
                Some(pid) => match processes.describe(pid).await {
                    Ok(Some(process)) => (pid.to_string(), process.name),
                    _ => (pid.to_string(), "unknown".to_string()),
                },
                None => ("?".to_string(), "(hidden)".to_string()),
            };
            println!(
                "{:<6} {:<6} {:<8} {:<24} {:<12} {}",
                port,
                record.protocol,
                pid,
                record.local_address,
                record.state.as_deref().unwrap_or("-"),
                name
            );
        }
    }
}
