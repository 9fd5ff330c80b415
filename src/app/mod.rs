//! Process-wide log sinks shared by the library and the CLI.

mod logging;

pub use logging::{
    crash_log_path, init_logging, install_panic_logging, log_debug, log_debug_content,
    log_file_path, log_panic,
};
