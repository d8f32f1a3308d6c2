pub use slog::{crit, debug, error, info, o, trace, warn, Discard, Drain, Logger};

/// Builds the process-wide terminal logger. Components derive child
/// loggers off the root with `log.new(o!(...))`.
pub fn init() -> Logger {
    use sloggers::{Config, LoggerConfig};

    let config: LoggerConfig = serdeconv::from_toml_str(
        r#"
type = "terminal"
level = "debug"
destination = "stderr"
"#,
    )
    .expect("Builtin logger config must parse");

    config.build_logger().expect("Error building terminal logger")
}
