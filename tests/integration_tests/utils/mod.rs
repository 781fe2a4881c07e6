// Mirror src/ ambient modules: errors, config, logger
#[path = "mod_config.rs"]
mod config_tests;
#[path = "mod_errors.rs"]
mod errors_tests;
#[path = "mod_logger.rs"]
mod logger_tests;
