mod error;
mod load;
mod paths;
mod settings;

pub use error::ConfigError;
pub use load::{load_settings, save_settings};
pub use paths::{default_global_config_path, GLOBAL_SETTINGS_FILE_NAME, GLOBAL_STATE_DIR};
pub use settings::{ExecutorConfig, ReadinessConfig, Settings};
