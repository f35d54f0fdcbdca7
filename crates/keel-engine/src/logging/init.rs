use std::io::Write;
use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "keel_engine=debug,keel_engine::delegate=trace").
///
/// `write_style` controls ANSI coloring behavior.
///
/// `timestamps` prefixes each line with a millisecond timestamp.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            timestamps: true,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// This function is idempotent; subsequent calls are ignored.
/// Intended usage is early in `main`.
///
/// Lines read `<timestamp> - <target> - <LEVEL> - <message>`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        builder.write_style(config.write_style);

        let timestamps = config.timestamps;
        builder.format(move |buf, record| {
            if timestamps {
                let ts = buf.timestamp_millis();
                write!(buf, "{ts} - ")?;
            }
            writeln!(
                buf,
                "{} - {} - {}",
                record.target(),
                record.level(),
                record.args()
            )
        });

        if builder.try_init().is_err() {
            // Someone else installed a logger first; keep theirs.
            return;
        }

        log::debug!("logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LoggingConfig {
            env_filter: Some("off".into()),
            ..LoggingConfig::default()
        });
        init_logging(LoggingConfig::default());
        log::info!("still fine");
    }
}
