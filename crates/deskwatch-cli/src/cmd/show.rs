//! `dw show` — full details and comment thread for one item.

use crate::cmd::support;
use crate::output::{CliError, OutputMode, render, render_error};
use clap::Args;
use deskwatch_core::model::{Comment, ItemKind, TrackedItem};
use deskwatch_core::source::Source;
use serde::Serialize;
use std::path::Path;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Item id as issued by the service.
    pub id: String,

    /// Item kind: incident or change.
    #[arg(long, default_value = "incident", value_name = "KIND")]
    pub kind: String,
}

#[derive(Debug, Serialize)]
struct ShowResult {
    item: TrackedItem,
    comments: Vec<Comment>,
}

pub fn run_show(args: &ShowArgs, output: OutputMode, config_path: &Path) -> anyhow::Result<()> {
    let kind = match args.kind.parse::<ItemKind>() {
        Ok(kind) => kind,
        Err(err) => {
            render_error(
                output,
                &CliError::with_details(
                    err.to_string(),
                    "Use --kind incident or --kind change",
                    "invalid_kind",
                ),
            )?;
            anyhow::bail!("{err}");
        }
    };

    if args.id.trim().is_empty() {
        let msg = "item id must not be empty";
        render_error(
            output,
            &CliError::with_details(msg, "Pass the id shown by the service", "invalid_id"),
        )?;
        anyhow::bail!("{msg}");
    }

    let config = support::load_config(output, config_path)?;
    let client = support::build_client(output, &config)?;

    let item = client
        .fetch_details(&args.id, kind)
        .map_err(|err| support::source_failure(output, &err))?;
    let comments = client
        .fetch_comments(&args.id, kind)
        .map_err(|err| support::source_failure(output, &err))?;

    let result = ShowResult { item, comments };
    render(output, &result, |r, w| {
        support::write_item(w, kind, &r.item)?;
        support::write_comments(w, &r.comments)
    })
}
