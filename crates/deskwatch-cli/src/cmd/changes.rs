//! `dw changes` — list changes assigned to the operator.

use crate::cmd::support;
use crate::output::{OutputMode, render};
use clap::Args;
use deskwatch_core::model::ItemKind;
use deskwatch_core::source::Source;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct ChangesArgs {}

pub fn run_changes(
    _args: &ChangesArgs,
    output: OutputMode,
    config_path: &Path,
) -> anyhow::Result<()> {
    let config = support::load_config(output, config_path)?;
    let client = support::build_client(output, &config)?;

    let changes = client
        .list_my_changes()
        .map_err(|err| support::source_failure(output, &err))?;

    render(output, &changes, |items, w| {
        writeln!(w, "Found {} changes assigned to you:", items.len())?;
        for item in items {
            support::write_item(w, ItemKind::Change, item)?;
        }
        Ok(())
    })
}
