pub mod args;
mod demo;
mod setup;

pub use args::AppArgs;
pub use setup::resolve_config;

use crate::logging::LogRouter;
use crate::ui::{run_console, ConsoleSink};
use anyhow::Result;

pub async fn launch() -> Result<()> {
    launch_with_args(AppArgs::from_cli()).await
}

pub async fn launch_with_args(args: AppArgs) -> Result<()> {
    let setup::PreparedApp {
        args,
        config,
        handle,
        commands,
    } = setup::prepare(args)?;

    if args.demo {
        demo::spawn(&handle, config.default_severity);
    }

    let sink = ConsoleSink::new(config.capacity, config.style.clone());
    let router = LogRouter::new(config, sink);

    run_console(router, commands).await
}
