//! Shared plumbing for command handlers: config loading, client setup, and
//! the human rendering of items and comment threads.

use crate::client::TopdeskClient;
use crate::output::{CliError, OutputMode, format_date, render_error, rule, truncate};
use deskwatch_core::config::{self, Config};
use deskwatch_core::model::{Comment, ItemKind, TrackedItem};
use deskwatch_core::source::SourceError;
use std::io::{self, Write};
use std::path::Path;

/// Load the configuration or fail with a pointer at `dw setup`.
pub fn load_config(output: OutputMode, config_path: &Path) -> anyhow::Result<Config> {
    if !config_path.exists() {
        let msg = format!("config file not found at {}", config_path.display());
        render_error(
            output,
            &CliError::with_details(&msg, "Run 'dw setup' to create one", "missing_config"),
        )?;
        anyhow::bail!("{msg}");
    }

    let config = match config::load(config_path) {
        Ok(config) => config,
        Err(err) => {
            let msg = format!("{err:#}");
            render_error(
                output,
                &CliError::with_details(
                    &msg,
                    "Fix the file or re-create it with 'dw setup'",
                    "invalid_config",
                ),
            )?;
            anyhow::bail!("{msg}");
        }
    };

    if config.service.url.is_empty() {
        let msg = "service url is not configured";
        render_error(
            output,
            &CliError::with_details(msg, "Run 'dw setup --url <URL> ...'", "missing_url"),
        )?;
        anyhow::bail!("{msg}");
    }

    Ok(config)
}

/// Build an authenticated client from configuration.
pub fn build_client(output: OutputMode, config: &Config) -> anyhow::Result<TopdeskClient> {
    match config.auth() {
        Ok(auth) => Ok(TopdeskClient::new(
            &config.service.url,
            &auth,
            config.service.page_size,
        )),
        Err(err) => {
            let msg = err.to_string();
            render_error(
                output,
                &CliError::with_details(
                    &msg,
                    "Add api_key or username/password via 'dw setup'",
                    "missing_auth",
                ),
            )?;
            anyhow::bail!("{msg}");
        }
    }
}

/// Render a source failure to stderr and convert it into a command error.
pub fn source_failure(output: OutputMode, err: &SourceError) -> anyhow::Error {
    let _ = render_error(output, &CliError::from(err));
    anyhow::anyhow!("{err}")
}

/// Capitalized label for one item kind, as the detail views print it.
#[must_use]
pub const fn kind_label(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Incident => "Incident",
        ItemKind::Change => "Change",
    }
}

/// Write one item block: number, subject, status, then whichever optional
/// fields the service filled in.
pub fn write_item(w: &mut dyn Write, kind: ItemKind, item: &TrackedItem) -> io::Result<()> {
    writeln!(w, "{}: {}", kind_label(kind), display_or_na(&item.number))?;
    writeln!(w, "Subject: {}", display_or_na(&item.subject))?;
    writeln!(w, "Status: {}", item.status)?;
    writeln!(
        w,
        "Created: {}",
        format_date(item.created_at.as_deref().unwrap_or(""))
    )?;
    if let Some(category) = &item.category {
        writeln!(w, "Category: {category}")?;
    }
    if let Some(priority) = &item.priority {
        writeln!(w, "Priority: {priority}")?;
    }
    if let Some(caller) = &item.caller {
        writeln!(w, "Caller: {caller}")?;
    }
    if let Some(template) = &item.template {
        writeln!(w, "Template: {template}")?;
    }
    if let Some(description) = &item.description {
        writeln!(w, "Description: {}", truncate(description, 100))?;
    }
    rule(w, 50)
}

/// Write a numbered comment thread, oldest first as served.
pub fn write_comments(w: &mut dyn Write, comments: &[Comment]) -> io::Result<()> {
    if comments.is_empty() {
        return writeln!(w, "No comments found.");
    }

    writeln!(w, "Comments ({}):", comments.len())?;
    for (index, comment) in comments.iter().enumerate() {
        writeln!(
            w,
            "[{}] {} - {}",
            index + 1,
            format_date(&comment.created_at),
            comment.author
        )?;
        writeln!(w, "{}", comment.text)?;
        rule(w, 40)?;
    }
    Ok(())
}

fn display_or_na(value: &str) -> &str {
    if value.is_empty() { "N/A" } else { value }
}
