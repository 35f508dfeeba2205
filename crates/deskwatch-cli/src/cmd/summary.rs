//! `dw summary` — report on everything the snapshot tracks.

use crate::cmd::support;
use crate::output::{OutputMode, format_date, render, rule};
use clap::Args;
use deskwatch_core::snapshot::SnapshotStore;
use deskwatch_core::tracker::{ActivityTracker, SummaryEntry};
use std::io::{self, Write};
use std::path::Path;

#[derive(Args, Debug)]
pub struct SummaryArgs {}

pub fn run_summary(
    _args: &SummaryArgs,
    output: OutputMode,
    config_path: &Path,
) -> anyhow::Result<()> {
    let config = support::load_config(output, config_path)?;
    let client = support::build_client(output, &config)?;
    let store = SnapshotStore::new(config.resolve_snapshot_path());

    let report = ActivityTracker::new(client, store).summary_report();

    render(output, &report, |report, w| {
        writeln!(w, "====== TOPdesk Summary Report ======")?;
        let last_checked = report
            .last_check
            .as_deref()
            .map_or_else(|| "Never".to_string(), format_date);
        writeln!(w, "Last checked: {last_checked}")?;

        write_section(w, "Incidents", &report.incidents, true)?;
        write_section(w, "Changes", &report.changes, false)
    })
}

fn write_section(
    w: &mut dyn Write,
    heading: &str,
    entries: &[SummaryEntry],
    show_priority: bool,
) -> io::Result<()> {
    writeln!(w, "\n=== {heading} ({}) ===", entries.len())?;
    if entries.is_empty() {
        return writeln!(w, "No {} found.", heading.to_lowercase());
    }

    for entry in entries {
        match entry {
            SummaryEntry::Degraded { id, error, .. } => {
                writeln!(w, "[{id}] ERROR: {error}")?;
            }
            SummaryEntry::Detailed(item) => {
                writeln!(w, "[{}] {}", item.number, item.subject)?;
                if show_priority {
                    writeln!(
                        w,
                        "Status: {} | Priority: {}",
                        item.status,
                        item.priority.as_deref().unwrap_or("N/A")
                    )?;
                } else {
                    writeln!(w, "Status: {}", item.status)?;
                }
                writeln!(
                    w,
                    "Last updated: {}",
                    format_date(item.modified_at.as_deref().unwrap_or(""))
                )?;
                rule(w, 40)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskwatch_core::model::TrackedItem;

    #[test]
    fn empty_section_prints_a_placeholder() {
        let mut buf = Vec::new();
        write_section(&mut buf, "Incidents", &[], true).expect("write");
        let text = String::from_utf8(buf).expect("utf8");

        assert!(text.contains("=== Incidents (0) ==="));
        assert!(text.contains("No incidents found."));
    }

    #[test]
    fn degraded_rows_print_the_error_inline() {
        let entries = vec![
            SummaryEntry::Detailed(TrackedItem {
                number: "I-1".to_string(),
                subject: "printer is on fire".to_string(),
                status: "open".to_string(),
                priority: Some("P1".to_string()),
                modified_at: Some("2024-01-05T09:30:00+01:00".to_string()),
                ..TrackedItem::default()
            }),
            SummaryEntry::Degraded {
                id: "inc-2".to_string(),
                status: "open".to_string(),
                error: "could not retrieve complete details".to_string(),
            },
        ];

        let mut buf = Vec::new();
        write_section(&mut buf, "Incidents", &entries, true).expect("write");
        let text = String::from_utf8(buf).expect("utf8");

        assert!(text.contains("Status: open | Priority: P1"));
        assert!(text.contains("Last updated: 2024-01-05 09:30:00"));
        assert!(text.contains("[inc-2] ERROR: could not retrieve complete details"));
    }

    #[test]
    fn changes_section_omits_priority() {
        let entries = vec![SummaryEntry::Detailed(TrackedItem {
            number: "C-1".to_string(),
            subject: "replace the printer".to_string(),
            status: "planned".to_string(),
            ..TrackedItem::default()
        })];

        let mut buf = Vec::new();
        write_section(&mut buf, "Changes", &entries, false).expect("write");
        let text = String::from_utf8(buf).expect("utf8");

        assert!(text.contains("Status: planned"));
        assert!(!text.contains("Priority:"));
    }

    #[test]
    fn missing_config_fails_before_any_network_io() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = run_summary(
            &SummaryArgs {},
            OutputMode::Json,
            &dir.path().join("absent.toml"),
        );
        assert!(result.is_err());
    }
}
