use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "taskflow";

#[derive(Debug, Parser)]
#[command(name = "taskflow", version, about = "Personal task tracker for the terminal")]
pub struct Args {
    /// Directory holding saved tasks and logs
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "info", value_parser = parse_log_level)]
    pub log_level: LevelFilter,
}

fn parse_log_level(value: &str) -> Result<LevelFilter, String> {
    value
        .parse()
        .map_err(|_| format!("unknown log level `{value}` (use off, error, warn, info, debug, trace)"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_level: LevelFilter,
}

impl Config {
    pub fn from_args(args: Args) -> Self {
        Self {
            data_dir: args.data_dir.unwrap_or_else(default_data_dir),
            log_level: args.log_level,
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}
