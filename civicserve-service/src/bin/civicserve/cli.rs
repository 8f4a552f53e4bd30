use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "civicserve")]
#[command(about = "CivicServe civic-issue request service", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Override HTTP listen address
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Directory for the rolling log file; stderr only when unset
    #[arg(long)]
    pub log_dir: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
