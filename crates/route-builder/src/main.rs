#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), eframe_entrypoints::LaunchError> {
    route_builder::run_native()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
