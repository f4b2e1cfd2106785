use log::LevelFilter;

use crate::logging;

#[uniffi::export]
pub fn set_debug_log_level() {
    logging::init_logger(LevelFilter::Trace);
}

#[uniffi::export]
pub fn set_log_level(level: &str) -> bool {
    logging::set_log_level(level)
}
