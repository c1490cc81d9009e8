//! CLI command implementations

mod config;
mod run;
mod tools;

pub use config::{config_get, config_init, config_path, config_show, load_settings};
pub use run::{run_command, run_episode, EpisodeReport};
pub use tools::tools_command;
