use crate::logging::Severity;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "log-router")]
#[command(about = "A terminal log viewer with per-source and severity filtering")]
pub struct AppArgs {
    #[arg(long, help = "Config file path (JSON)")]
    pub config: Option<String>,

    #[arg(long, help = "Number of records kept in the history")]
    pub capacity: Option<usize>,

    #[arg(
        long,
        help = "Initial filter level (debug/info/warning/error/critical), also used by new sources"
    )]
    pub level: Option<Severity>,

    #[arg(long, help = "Show record timestamps")]
    pub timestamps: bool,

    #[arg(long = "no-autoscroll", help = "Do not follow new records")]
    pub no_autoscroll: bool,

    #[arg(long, help = "Run demo sources that emit records in the background")]
    pub demo: bool,

    #[arg(
        long = "log-filter",
        default_value = "info",
        help = "Which events reach the viewer (RUST_LOG syntax, or set RUST_LOG)"
    )]
    pub log_filter: String,
}

impl AppArgs {
    pub fn from_cli() -> Self {
        <Self as Parser>::parse()
    }
}
