use log::LevelFilter;

/// Logger for the binaries, logging at `Info` unless `RUST_LOG` says otherwise
pub fn init_logging() {
    init_logging_at(LevelFilter::Info)
}

/// Like [init_logging] with another default level, e.g. `Warn` while the console renders a game.
///
/// Only the first call installs a logger.
pub fn init_logging_at(default_level: LevelFilter) {
    let installed = env_logger::builder()
        .format_target(false)
        .format_timestamp_secs()
        .filter_level(default_level)
        .parse_default_env()
        .try_init();
    if let Err(e) = installed {
        log::debug!("keeping the existing logger: {}", e);
    }
}

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .is_test(true)
        .try_init();
}
