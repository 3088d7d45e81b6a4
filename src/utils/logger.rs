use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    /// JSON lines, for hosts that collect structured logs.
    Json,
}

/// `RUST_LOG` wins; otherwise the crate logs at info, or debug when verbose.
pub fn default_filter(verbose: bool) -> EnvFilter {
    let directive = if verbose {
        "ride_dispatch=debug,info"
    } else {
        "ride_dispatch=info"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

/// 日誌一律寫到 stderr，stdout 留給指令輸出
pub fn init_logger(format: LogFormat, verbose: bool) {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(false)
        .with_line_number(false);

    let registry = tracing_subscriber::registry().with(default_filter(verbose));
    match format {
        LogFormat::Compact => registry.with(layer.compact()).init(),
        LogFormat::Json => registry.with(layer.json()).init(),
    }
}
