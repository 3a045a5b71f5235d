use chrono::Local;
use std::io::Write;

/// Timestamp format shared by console and run log lines.
pub const TIMESTAMP_FORMAT: &str = "%b-%d-%Y %I:%M:%S %p";

/// Initializes the console logger.
///
/// Info and above by default, debug with `verbose`; `RUST_LOG` still wins.
/// Output format: `<timestamp> LEVEL: message`, all on stderr.
pub fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {}: {}",
                Local::now().format(TIMESTAMP_FORMAT),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();
}
