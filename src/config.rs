//! Command line and environment configuration

use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_DATA_FILE: &str = "Data/tasks.json";
pub const DEFAULT_EXPORT_DIR: &str = "Exports";

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "todolist", version, about = "Personal to-do list for the terminal")]
pub struct Config {
    /// JSON document holding the task list
    #[arg(long, env = "TODOLIST_DATA_FILE", default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// Directory that receives text exports
    #[arg(long, env = "TODOLIST_EXPORT_DIR", default_value = DEFAULT_EXPORT_DIR)]
    pub export_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
        }
    }
}
