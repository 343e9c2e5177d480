//! Route Builder - Application Library
//!
//! Integrates the route model with a walkers map, an egui sidebar and a
//! Nominatim geocoder, and defines the platform entry points.

mod app;

pub use app::RouteBuilderApp;

// Define all platform entry points using the unified macro
eframe_entrypoints::eframe_app!("Route Builder", |cc| Box::new(RouteBuilderApp::new(cc)));
