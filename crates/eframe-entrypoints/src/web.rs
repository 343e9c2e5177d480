//! Web entry point for egui/eframe applications
//!
//! The app crate registers its creator at module start (see `eframe_app!`);
//! JavaScript then builds a [`WebHandle`] and calls `start` with a canvas.

use std::sync::OnceLock;
use wasm_bindgen::prelude::*;

struct Registration {
    app_name: &'static str,
    version: &'static str,
    creator: crate::AppCreator,
}

static REGISTRATION: OnceLock<Registration> = OnceLock::new();

/// Register the app creator. Only the first registration is kept.
pub fn set_app_creator(app_name: &'static str, version: &'static str, creator: crate::AppCreator) {
    let registration = Registration {
        app_name,
        version,
        creator,
    };
    if REGISTRATION.set(registration).is_err() {
        tracing::warn!("app_creator already set; ignoring subsequent set");
    }
}

/// Handle to the web app from JavaScript.
#[derive(Clone)]
#[wasm_bindgen]
pub struct WebHandle {
    runner: eframe::WebRunner,
}

#[wasm_bindgen]
impl WebHandle {
    /// Installs logging and the panic hook, then returns.
    #[allow(clippy::new_without_default)]
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        // `envLOG_LEVEL` must be visible before the logger is installed
        crate::cli::load_url_env();
        crate::logging::setup_logging();

        Self {
            runner: eframe::WebRunner::new(),
        }
    }

    /// Call this once from JavaScript to start your app.
    #[wasm_bindgen]
    pub async fn start(
        &self,
        canvas: web_sys::HtmlCanvasElement,
    ) -> Result<(), wasm_bindgen::JsValue> {
        let Some(registration) = REGISTRATION.get() else {
            return Err(wasm_bindgen::JsValue::from_str("app_creator not set"));
        };
        crate::log_version_info(registration.app_name, registration.version);

        let creator = registration.creator;
        self.runner
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(move |cc| Ok(creator(cc))),
            )
            .await
    }

    /// Destroys the app and frees resources.
    #[wasm_bindgen]
    pub fn destroy(&self) {
        self.runner.destroy();
    }

    /// The JavaScript can check whether or not your app has crashed.
    #[wasm_bindgen]
    pub fn has_panicked(&self) -> bool {
        self.runner.has_panicked()
    }

    /// Returns the panic message if the app has panicked.
    #[wasm_bindgen]
    pub fn panic_message(&self) -> Option<String> {
        self.runner.panic_summary().map(|s| s.message())
    }

    /// Returns the panic callstack if the app has panicked.
    #[wasm_bindgen]
    pub fn panic_callstack(&self) -> Option<String> {
        self.runner.panic_summary().map(|s| s.callstack())
    }
}

