//! Filesystem discovery: the custom app file and tool configuration files.

mod config_file;
mod custom_app;

pub use config_file::{ConfigValue, FoundConfig, config_file_names, find_config, find_up};
pub use custom_app::{DEFAULT_PAGE_EXTENSIONS, find_custom_app_file, find_pages_dir};
