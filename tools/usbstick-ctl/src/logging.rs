use env_logger::Target;

/// Log to stderr at `info` unless `RUST_LOG` says otherwise; `verbose` lowers it to `debug`.
pub fn init(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .target(Target::Stderr)
        .filter_level(level)
        .parse_default_env()
        .init();
}
