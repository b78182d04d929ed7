mod app_config;
mod config;
mod row;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use row::{NormalizedRow, CSV_COLUMNS};
