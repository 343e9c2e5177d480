/*!
Logging initialization for eframe-entrypoints.

Native builds install a `tracing-subscriber` fmt layer filtered by `RUST_LOG`,
falling back to [`default_filter`] when it is unset or invalid. Web builds log
to the browser console through `tracing-wasm`, with the level taken from the
`?envLOG_LEVEL=` URL parameter.

With the `profiling` feature, `profiling::scope!` spans are emitted as
regular tracing spans and show up in the same output.
*/

/// Filter used when `RUST_LOG` is not set
pub fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "debug,eframe::native=warn,egui::context=warn,walkers=info,hyper_util=info,reqwest::connect=info"
    } else {
        "info,eframe=warn,walkers=warn"
    }
}

/// Install the global subscriber. Calling it again is a no-op.
#[cfg(not(target_arch = "wasm32"))]
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));
    let fmt_layer = fmt::layer().with_filter(filter);

    if tracing_subscriber::registry().with(fmt_layer).try_init().is_ok() {
        tracing::info!(
            profiling = cfg!(feature = "profiling"),
            "Logging initialized"
        );
    }
}

/// Install the browser console subscriber and panic hook. Calling it again is a no-op.
#[cfg(target_arch = "wasm32")]
pub fn setup_logging() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_wasm::WASMLayerConfigBuilder;

    let max_level = max_level(crate::cli::get_env::<String>("LOG_LEVEL").as_deref());

    let mut builder = WASMLayerConfigBuilder::new();
    builder.set_max_level(max_level);
    let _ = tracing_subscriber::registry()
        .with(tracing_wasm::WASMLayer::new(builder.build()))
        .try_init();

    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
}

/// Level named by `requested`, or the build's default when absent or unknown
pub fn max_level(requested: Option<&str>) -> tracing::Level {
    requested
        .and_then(|level| level.parse::<tracing::Level>().ok())
        .unwrap_or(if cfg!(debug_assertions) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
}
