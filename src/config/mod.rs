mod structs;

pub use structs::*;

use once_cell::sync::OnceCell;

static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// Load configuration and store it globally. Safe to call more than once;
/// later calls are no-ops.
pub fn init_config() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::load)
}

/// Global configuration accessor. Loads from file/env on first use.
pub fn get_config() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::load)
}
