//! This module handles the initial setup of the application.
use super::args::AppArgs;
use crate::config::RouterConfig;
use crate::logging::{RouterCommand, RouterHandle, RouterLayer, FALLBACK_TARGET};
use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::Level;
use tracing_subscriber::{filter::Targets, layer::SubscriberExt, EnvFilter, Layer};

/// Contains all the necessary components for the application to run.
pub struct PreparedApp {
    /// The command-line arguments.
    pub args: AppArgs,
    /// The effective router configuration.
    pub config: RouterConfig,
    /// Front end of the router, shared with producers.
    pub handle: RouterHandle,
    /// Commands waiting for the router's owning task.
    pub commands: mpsc::UnboundedReceiver<RouterCommand>,
}

/// Prepares the application for running.
///
/// This function performs the following steps:
/// 1. Loads the configuration file, if any.
/// 2. Applies command-line overrides.
/// 3. Creates the router channel.
/// 4. Installs the `tracing` subscriber feeding the router.
///
/// # Errors
///
/// This function will return an error if the configuration is unreadable or
/// invalid, or if a global subscriber is already installed.
pub fn prepare(args: AppArgs) -> Result<PreparedApp> {
    let config = resolve_config(&args)?;
    let (handle, commands) = RouterHandle::channel();

    configure_logging(handle.clone(), &args.log_filter)?;

    Ok(PreparedApp {
        args,
        config,
        handle,
        commands,
    })
}

/// Loads the config file and applies the command-line overrides on top.
pub fn resolve_config(args: &AppArgs) -> Result<RouterConfig> {
    let mut config = match &args.config {
        Some(path) => RouterConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => RouterConfig::default(),
    };

    if let Some(capacity) = args.capacity {
        config.capacity = capacity;
    }
    if let Some(level) = args.level {
        config.default_severity = level;
    }
    if args.timestamps {
        config.show_timestamps = true;
    }
    if args.no_autoscroll {
        config.autoscroll = false;
    }

    config.validate()?;
    Ok(config)
}

/// Routes `tracing` events into the router and the router's own
/// diagnostics to stderr.
///
/// `RUST_LOG` takes precedence over `default_filter`.
fn configure_logging(handle: RouterHandle, default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .with_context(|| format!("Invalid log filter '{}'", default_filter))?;

    let fallback = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(Targets::new().with_target(FALLBACK_TARGET, Level::TRACE));

    let subscriber = tracing_subscriber::registry()
        .with(RouterLayer::new(handle).with_filter(filter))
        .with(fallback);

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install the log router as the global subscriber")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Severity;
    use clap::Parser;

    fn args(extra: &[&str]) -> AppArgs {
        let mut argv = vec!["log-router"];
        argv.extend_from_slice(extra);
        AppArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn cli_overrides_defaults() {
        let config = resolve_config(&args(&[
            "--capacity",
            "50",
            "--level",
            "warning",
            "--timestamps",
            "--no-autoscroll",
        ]))
        .unwrap();

        assert_eq!(config.capacity, 50);
        assert_eq!(config.default_severity, Severity::Warning);
        assert!(config.show_timestamps);
        assert!(!config.autoscroll);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(resolve_config(&args(&["--capacity", "0"])).is_err());
    }

    #[test]
    fn missing_config_file_is_reported() {
        let err = resolve_config(&args(&["--config", "/no/such/file.json"])).unwrap_err();
        assert!(err.to_string().contains("Failed to load configuration"));
    }

    #[test]
    fn cli_wins_over_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.json");
        std::fs::write(&path, r#"{"capacity": 10, "show_timestamps": false}"#).unwrap();

        let config = resolve_config(&args(&[
            "--config",
            path.to_str().unwrap(),
            "--capacity",
            "30",
        ]))
        .unwrap();

        assert_eq!(config.capacity, 30);
        assert!(!config.show_timestamps);
    }
}
