//! `dw check` — poll for new activity since the last check.
//!
//! Runs one tracker cycle: anything the service shows that the snapshot has
//! not seen yet comes out grouped into the same sections the summary report
//! uses. With `--quiet`, a cycle that found nothing prints nothing, which
//! makes the command cron-friendly.

use crate::cmd::support;
use crate::output::{CliError, OutputMode, format_date, render, render_error, rule, truncate};
use clap::Args;
use deskwatch_core::diff::ChangeEvent;
use deskwatch_core::model::TrackedItem;
use deskwatch_core::snapshot::SnapshotStore;
use deskwatch_core::tracker::ActivityTracker;
use std::io::{self, Write};
use std::path::Path;

#[derive(Args, Debug)]
pub struct CheckArgs {}

pub fn run_check(
    _args: &CheckArgs,
    output: OutputMode,
    quiet: bool,
    config_path: &Path,
) -> anyhow::Result<()> {
    let config = support::load_config(output, config_path)?;
    let client = support::build_client(output, &config)?;
    let store = SnapshotStore::new(config.resolve_snapshot_path());
    let tracker = ActivityTracker::new(client, store);

    let report = match tracker.check_for_updates() {
        Ok(report) => report,
        Err(err) => {
            render_error(
                output,
                &CliError::with_details(
                    format!("{err:#}"),
                    "Check the service URL and credentials, then retry",
                    "check_failed",
                ),
            )?;
            return Err(err);
        }
    };

    render(output, &report, |report, w| {
        if report.is_empty() {
            if !quiet {
                writeln!(w, "No new updates found.")?;
            }
            return Ok(());
        }

        writeln!(w, "Found {} updates in TOPdesk.", report.total())?;
        write_new_items(w, "New Incidents", &report.new_incidents)?;
        write_updates(
            w,
            "Incident Status Changes",
            "New Comments on Incidents",
            &report.updated_incidents,
        )?;
        write_new_items(w, "New Changes", &report.new_changes)?;
        write_updates(
            w,
            "Change Status Updates",
            "New Comments on Changes",
            &report.updated_changes,
        )?;
        Ok(())
    })
}

fn write_new_items(w: &mut dyn Write, heading: &str, items: &[TrackedItem]) -> io::Result<()> {
    if items.is_empty() {
        return Ok(());
    }

    writeln!(w, "\n=== {heading} ===")?;
    for item in items {
        writeln!(w, "[{}] {}", item.number, item.subject)?;
        writeln!(w, "Status: {}", item.status)?;
        rule(w, 40)?;
    }
    Ok(())
}

fn write_updates(
    w: &mut dyn Write,
    status_heading: &str,
    comment_heading: &str,
    updates: &[ChangeEvent],
) -> io::Result<()> {
    let status_changes: Vec<_> = updates
        .iter()
        .filter_map(|event| match event {
            ChangeEvent::StatusChanged {
                item,
                old_status,
                new_status,
            } => Some((item, old_status, new_status)),
            _ => None,
        })
        .collect();
    if !status_changes.is_empty() {
        writeln!(w, "\n=== {status_heading} ===")?;
        for (item, old_status, new_status) in status_changes {
            writeln!(w, "[{}] {}", item.number, item.subject)?;
            writeln!(w, "Status changed: {old_status} → {new_status}")?;
            rule(w, 40)?;
        }
    }

    let comments: Vec<_> = updates
        .iter()
        .filter_map(|event| match event {
            ChangeEvent::NewComment { item, comment } => Some((item, comment)),
            _ => None,
        })
        .collect();
    if !comments.is_empty() {
        writeln!(w, "\n=== {comment_heading} ===")?;
        for (item, comment) in comments {
            writeln!(w, "[{}] {}", item.number, item.subject)?;
            writeln!(
                w,
                "Comment by {} on {}:",
                comment.author,
                format_date(&comment.created_at)
            )?;
            writeln!(w, "{}", truncate(&comment.text, 100))?;
            rule(w, 40)?;
        }
    }
    Ok(())
}
