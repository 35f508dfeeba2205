//! `dw incidents` — list open incidents assigned to the operator.

use crate::cmd::support;
use crate::output::{OutputMode, render};
use clap::Args;
use deskwatch_core::model::ItemKind;
use deskwatch_core::source::Source;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct IncidentsArgs {}

pub fn run_incidents(
    _args: &IncidentsArgs,
    output: OutputMode,
    config_path: &Path,
) -> anyhow::Result<()> {
    let config = support::load_config(output, config_path)?;
    let client = support::build_client(output, &config)?;

    let incidents = client
        .list_my_incidents()
        .map_err(|err| support::source_failure(output, &err))?;

    render(output, &incidents, |items, w| {
        writeln!(w, "Found {} incidents assigned to you:", items.len())?;
        for item in items {
            support::write_item(w, ItemKind::Incident, item)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: IncidentsArgs,
    }

    #[test]
    fn takes_no_positional_arguments() {
        assert!(TestCli::try_parse_from(["test"]).is_ok());
        assert!(TestCli::try_parse_from(["test", "extra"]).is_err());
    }

    #[test]
    fn missing_config_fails_before_any_network_io() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = run_incidents(
            &IncidentsArgs {},
            OutputMode::Json,
            &dir.path().join("absent.toml"),
        );
        assert!(result.is_err());
    }
}
