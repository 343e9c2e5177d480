//! Cross-platform entry points for egui/eframe applications
//!
//! This crate provides reusable entry points for native (desktop/mobile) and web platforms,
//! along with utilities for CLI parsing, logging, background tasks and version metadata.
//!
//! # Usage
//!
//! In your application's `lib.rs`, use the `eframe_app!` macro to define all entry points:
//!
//! ```ignore
//! eframe_entrypoints::eframe_app!(
//!     "My App Name",
//!     |cc| Box::new(MyApp::new(cc))
//! );
//! ```
//!
//! This generates:
//! - Web: `create_egui_app` function plus a start hook registering it with [`WebHandle`]
//! - Android: `android_main` entry point
//! - Native: `run_native()` function to call from `main.rs`

pub mod async_runtime;
pub mod cli;
pub mod logging;

// Re-export commonly used types
pub use cli::{get_env, parse_args};
pub use logging::setup_logging;

mod metadata;
pub use metadata::{log_version_info, short_version_info};

#[cfg(target_arch = "wasm32")]
pub mod web;
#[cfg(target_arch = "wasm32")]
pub use web::WebHandle;

// Re-export eframe types commonly needed for app creation
pub use eframe;
pub use eframe::CreationContext;

/// Function building the root app once eframe has a rendering context
pub type AppCreator = fn(&eframe::CreationContext<'_>) -> Box<dyn eframe::App>;

/// Reasons the native entry point can fail to start or keep running
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("failed to create the async runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("eframe error: {0}")]
    Eframe(#[from] eframe::Error),
}

/// Unified macro to define all platform entry points for an eframe application.
///
/// # Arguments
///
/// * `$app_name` - A string literal with the application name (window title, logging)
/// * `$app_creator` - A non-capturing closure taking `&CreationContext` and returning
///   `Box<dyn eframe::App>`
///
/// # Generated Code
///
/// For **Web (WASM)** targets, generates `create_egui_app` and a `wasm_bindgen(start)`
/// hook that hands it to [`WebHandle`].
///
/// For **Android** targets, generates `android_main`.
///
/// For **native** targets, generates `run_native() -> Result<(), LaunchError>`.
#[macro_export]
macro_rules! eframe_app {
    ($app_name:expr, $app_creator:expr) => {
        // ==========================================
        // Web (WASM) entry point
        // ==========================================
        #[cfg(target_arch = "wasm32")]
        pub fn create_egui_app(
            cc: &$crate::eframe::CreationContext<'_>,
        ) -> Box<dyn $crate::eframe::App> {
            let creator: $crate::AppCreator = $app_creator;
            creator(cc)
        }

        #[cfg(target_arch = "wasm32")]
        #[::wasm_bindgen::prelude::wasm_bindgen(start)]
        pub fn register_egui_app() {
            $crate::web::set_app_creator($app_name, env!("CARGO_PKG_VERSION"), create_egui_app);
        }

        // ==========================================
        // Android entry point
        // ==========================================
        #[cfg(target_os = "android")]
        #[unsafe(no_mangle)] // SAFETY: there is no other global function of this name
        pub fn android_main(app: ::winit::platform::android::activity::AndroidApp) {
            $crate::android_main_impl($app_name, env!("CARGO_PKG_VERSION"), app, $app_creator);
        }

        // ==========================================
        // Native entry point (called from main.rs)
        // ==========================================
        /// Run the application on native (desktop) platforms.
        #[cfg(not(target_arch = "wasm32"))]
        pub fn run_native() -> ::std::result::Result<(), $crate::LaunchError> {
            let rt = ::tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;

            rt.block_on(async {
                $crate::native_main_impl($app_name, env!("CARGO_PKG_VERSION"), $app_creator)
                    .await
            })
        }
    };
}

/// Internal implementation for Android entry point.
/// Use the `eframe_app!` macro instead of calling this directly.
#[cfg(target_os = "android")]
#[doc(hidden)]
pub fn android_main_impl(
    app_name: &str,
    version: &str,
    app: winit::platform::android::activity::AndroidApp,
    app_creator: AppCreator,
) {
    use winit::platform::android::EventLoopBuilderExtAndroid;

    android_logger::init_once(
        android_logger::Config::default().with_max_level(log::LevelFilter::Info),
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("Failed to create Tokio runtime: {e}");
            return;
        }
    };

    let app_name_owned = app_name.to_string();
    rt.block_on(async {
        log::info!("{}", short_version_info(&app_name_owned, version));

        let native_options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default().with_title(&app_name_owned),
            event_loop_builder: Some(Box::new(move |builder| {
                builder.with_android_app(app);
            })),
            ..Default::default()
        };

        if let Err(e) = eframe::run_native(
            &app_name_owned,
            native_options,
            Box::new(move |cc| Ok(app_creator(cc))),
        ) {
            log::error!("eframe exited with an error: {e}");
        }
    });
}

/// Internal implementation for native (desktop) entry point.
/// Use the `eframe_app!` macro instead of calling this directly.
#[cfg(not(target_arch = "wasm32"))]
#[doc(hidden)]
pub async fn native_main_impl(
    app_name: &str,
    version: &str,
    app_creator: AppCreator,
) -> Result<(), LaunchError> {
    // Must run before any logging so early events are not dropped
    setup_logging();

    log_version_info(app_name, version);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([480.0, 360.0])
            .with_title(app_name),
        ..Default::default()
    };

    eframe::run_native(
        app_name,
        native_options,
        Box::new(move |cc| Ok(app_creator(cc))),
    )?;
    Ok(())
}
