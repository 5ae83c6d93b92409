//! Sweep command - run the full cleanup campaign.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use devsweep_core::maintenance::{self, LockCleanup};
use devsweep_core::application::Silent;
use devsweep_core::{
    privilege, Campaign, CampaignReport, CleanupPlan, SystemConnectionDirectory,
    SystemProcessDirectory, SystemSignaller,
};
use serde::Serialize;
use tracing::debug;

use crate::console::{self, ConsoleProgress};

pub struct SweepOptions {
    pub json: bool,
    pub clean_locks: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    started_at: DateTime<Local>,
    finished_at: DateTime<Local>,
    #[serde(flatten)]
    report: &'a CampaignReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    lock_cleanup: Option<&'a [LockCleanup]>,
}

pub async fn run(options: SweepOptions) -> Result<()> {
    let elevated = privilege::is_elevated().await;
    debug!(elevated = elevated, "Privilege check");
    if !elevated {
        console::privilege_hint(options.json);
    }

    let processes = SystemProcessDirectory::new();
    let connections = SystemConnectionDirectory::new();
    let signaller = SystemSignaller::new();
    let campaign = Campaign::new(&processes, &connections, &signaller, CleanupPlan::default());

    let started_at = Local::now();
    let report = if options.json {
        campaign.run(&mut Silent).await
    } else {
        console::banner();
        campaign.run(&mut ConsoleProgress).await
    };

    let lock_cleanup = if options.clean_locks {
        let root = std::env::current_dir().context("Could not determine working directory")?;
        Some(maintenance::clean_lock_files(&root).await)
    } else {
        None
    };
    let finished_at = Local::now();

    if options.json {
        let output = JsonReport {
            started_at,
            finished_at,
            report: &report,
            lock_cleanup: lock_cleanup.as_deref(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if let Some(results) = &lock_cleanup {
        console::lock_cleanup(results);
    }
    console::report(&report, finished_at - started_at);
    Ok(())
}
