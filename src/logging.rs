//! Logging init for the command-line front end.

use tracing_subscriber::EnvFilter;

/// Default filter directive for the given `-v` count.
pub fn default_directive(verbosity: u8) -> &'static str {
  match verbosity {
    0 => "warn",
    1 => "info,tiny_cdn=debug",
    _ => "debug,tiny_cdn=trace",
  }
}

/// Install a stderr subscriber. `RUST_LOG` takes precedence over the verbosity count.
pub fn init_logging(verbosity: u8) {
  let env_filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_writer(std::io::stderr)
    .with_ansi(false)
    .with_target(false)
    .init();
}
