use tracing_subscriber::EnvFilter;

const CRATES: [&str; 5] = [
    "buildsync",
    "buildsync_pipeline",
    "buildsync_fetch",
    "buildsync_manifest",
    "buildsync_fs",
];

/// Filter used when `RUST_LOG` is unset.
pub fn default_directives(verbosity: i8) -> String {
    let level = match verbosity {
        i8::MIN..=-1 => "warn",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global fmt subscriber. `RUST_LOG` wins over `verbosity`.
pub fn init(verbosity: i8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
