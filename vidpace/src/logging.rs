/*!
    Logging setup.

    Filter directives come from `VIDPACE_LOG`, then `RUST_LOG`, defaulting to
    `info`. Output goes to stderr so stdout stays free for the summary line.
*/

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_ENV: &str = "VIDPACE_LOG";
const DEFAULT_DIRECTIVES: &str = "info";

/**
    Install the global subscriber. Safe to call more than once; later calls are ignored.
*/
pub fn init() {
    let filter = filter_from_env();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();

    // FFmpeg logs through its own callback; keep it to real errors
    ffmpeg_next::util::log::set_level(ffmpeg_next::util::log::Level::Error);
}

fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_does_not_panic() {
        init();
        init();
        tracing::info!("logging initialised");
    }
}
