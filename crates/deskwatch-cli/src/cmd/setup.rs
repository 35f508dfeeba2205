//! `dw setup` — write the configuration file.
//!
//! Non-interactive on purpose: credentials come in as flags so the command
//! works in provisioning scripts. Values land in plain text, which the
//! human output calls out.

use crate::output::{CliError, OutputMode, render, render_error};
use clap::Args;
use deskwatch_core::config::{self, Config, ServiceConfig};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Base URL of the TOPdesk instance.
    #[arg(long, value_name = "URL")]
    pub url: String,

    /// API key for Bearer authentication.
    #[arg(long, value_name = "KEY", conflicts_with_all = ["username", "password"])]
    pub api_key: Option<String>,

    /// Operator login for Basic authentication.
    #[arg(long, requires = "password")]
    pub username: Option<String>,

    /// Operator password for Basic authentication.
    #[arg(long, requires = "username")]
    pub password: Option<String>,

    /// Page size for assigned-item list calls.
    #[arg(long, default_value_t = 10, value_name = "N")]
    pub page_size: u32,

    /// Override for the snapshot file location.
    #[arg(long, value_name = "PATH")]
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SetupResult {
    path: String,
    auth: &'static str,
}

pub fn run_setup(args: &SetupArgs, output: OutputMode, config_path: &Path) -> anyhow::Result<()> {
    let auth = if args.api_key.is_some() {
        "api_key"
    } else if args.username.is_some() {
        "basic"
    } else {
        let msg = "no authentication provided";
        render_error(
            output,
            &CliError::with_details(
                msg,
                "Pass --api-key, or --username together with --password",
                "missing_auth",
            ),
        )?;
        anyhow::bail!("{msg}");
    };

    if !args.url.starts_with("http://") && !args.url.starts_with("https://") {
        let msg = format!("invalid url '{}'", args.url);
        render_error(
            output,
            &CliError::with_details(
                &msg,
                "Use a full base URL like https://support.example.com",
                "invalid_url",
            ),
        )?;
        anyhow::bail!("{msg}");
    }

    let config = Config {
        service: ServiceConfig {
            url: args.url.trim_end_matches('/').to_string(),
            api_key: args.api_key.clone(),
            username: args.username.clone(),
            password: args.password.clone(),
            page_size: args.page_size,
        },
        snapshot_path: args.snapshot_path.clone(),
    };

    config::store(&config, config_path)?;
    tracing::info!(path = %config_path.display(), "configuration written");

    let result = SetupResult {
        path: config_path.display().to_string(),
        auth,
    };
    render(output, &result, |r, w| {
        writeln!(w, "✓ configuration written to {}", r.path)?;
        writeln!(
            w,
            "Note: credentials are stored in plain text. Keep this file private."
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: SetupArgs,
    }

    #[test]
    fn parses_api_key_form() {
        let cli = TestCli::try_parse_from([
            "test",
            "--url",
            "https://support.example.com",
            "--api-key",
            "secret",
        ])
        .expect("parse");

        assert_eq!(cli.args.url, "https://support.example.com");
        assert_eq!(cli.args.api_key.as_deref(), Some("secret"));
        assert_eq!(cli.args.page_size, 10);
    }

    #[test]
    fn api_key_conflicts_with_basic_credentials() {
        let result = TestCli::try_parse_from([
            "test",
            "--url",
            "https://support.example.com",
            "--api-key",
            "secret",
            "--username",
            "alice",
            "--password",
            "pw",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn username_requires_password() {
        let result = TestCli::try_parse_from([
            "test",
            "--url",
            "https://support.example.com",
            "--username",
            "alice",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn writes_a_loadable_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let args = SetupArgs {
            url: "https://support.example.com/".to_string(),
            api_key: Some("secret".to_string()),
            username: None,
            password: None,
            page_size: 25,
            snapshot_path: None,
        };

        run_setup(&args, OutputMode::Json, &path).expect("run");

        let config = config::load(&path).expect("load");
        // Trailing slash is normalized away before writing.
        assert_eq!(config.service.url, "https://support.example.com");
        assert_eq!(config.service.page_size, 25);
        assert_eq!(config.service.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn rejects_bare_hostnames() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let args = SetupArgs {
            url: "support.example.com".to_string(),
            api_key: Some("secret".to_string()),
            username: None,
            password: None,
            page_size: 10,
            snapshot_path: None,
        };

        assert!(run_setup(&args, OutputMode::Json, &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn refuses_to_write_without_credentials() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let args = SetupArgs {
            url: "https://support.example.com".to_string(),
            api_key: None,
            username: None,
            password: None,
            page_size: 10,
            snapshot_path: None,
        };

        assert!(run_setup(&args, OutputMode::Json, &path).is_err());
        assert!(!path.exists());
    }
}
