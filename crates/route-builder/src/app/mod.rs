//! Application module
//!
//! This module provides the main application structure:
//! - Full-screen map with the route line and draggable waypoint markers
//! - Toggleable sidebar with tabs (Route and Settings)
//! - Responsive layout (sidebar from bottom on portrait displays)

mod geocoder;
mod plugin;
pub(crate) mod settings;
mod state;
mod ui_panels;
mod view;

use crate::app::geocoder::{GeocoderConfig, NominatimGeocoder, UnavailableGeocoder};
use crate::app::plugin::{MarkerDrags, RoutePlugin};
use crate::app::settings::Settings;
use crate::app::state::{AppState, MapStyle, OpenTopoMap, PersistedSettings};
use crate::app::view::WalkersView;
use eframe::egui;
use route_builder_lib::{Geocoder, RouteBuilder, utils};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use walkers::{HttpTiles, Map, MapMemory, Position, sources::OpenStreetMap};

/// Main application structure
pub struct RouteBuilderApp {
    /// UI state (settings, pending fit, list drag hover)
    state: AppState,

    /// Search box, point list and map wired together
    builder: RouteBuilder,

    /// Map tiles provider (OpenStreetMap)
    tiles_osm: HttpTiles,

    /// Map tiles provider (OpenTopoMap)
    tiles_otm: HttpTiles,

    /// Map camera, shared with the route map's view
    map_memory: Rc<RefCell<MapMemory>>,

    /// Where the map sits until the user pans
    home: Position,

    /// Marker drags reported by the plugin during the last render
    marker_drags: MarkerDrags,

    /// Show help overlay
    show_help: bool,

    /// Size of the map panel in the last frame
    last_map_rect: Option<egui::Rect>,
}

impl RouteBuilderApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let cli_args = Settings::from_cli();

        let persisted = if cli_args.ignore_persisted {
            tracing::info!("Ignoring persisted state (--ignore-persisted flag)");
            None
        } else {
            cc.storage.and_then(Self::load_persisted_settings)
        };
        let state = AppState::new(&cli_args, persisted);

        let tiles_osm = HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone());
        let tiles_otm = HttpTiles::new(OpenTopoMap, cc.egui_ctx.clone());

        let mut map_memory = MapMemory::default();
        if let Err(e) = map_memory.set_zoom(cli_args.zoom) {
            tracing::warn!(zoom = cli_args.zoom, "Ignoring initial zoom: {:?}", e);
        }
        let map_memory = Rc::new(RefCell::new(map_memory));
        let home = cli_args.home();

        let view = WalkersView::new(map_memory.clone(), home);
        let builder = RouteBuilder::new(Box::new(view), Self::geocoder(&cli_args, &cc.egui_ctx));
        builder
            .map_mut()
            .set_lookup_timeout(Duration::from_secs(cli_args.geocode_timeout_secs));

        tracing::info!(
            lat = cli_args.center_lat,
            lon = cli_args.center_lon,
            geocoder = %cli_args.geocoder_url,
            "Route builder ready"
        );

        Self {
            state,
            builder,
            tiles_osm,
            tiles_otm,
            map_memory,
            home,
            marker_drags: MarkerDrags::default(),
            show_help: false,
            last_map_rect: None,
        }
    }

    fn geocoder(cli_args: &Settings, ctx: &egui::Context) -> Box<dyn Geocoder> {
        let config = GeocoderConfig {
            base_url: cli_args.geocoder_url.clone(),
            user_agent: cli_args.user_agent.clone(),
            timeout_secs: cli_args.geocode_timeout_secs,
        };
        match NominatimGeocoder::new(&config, ctx.clone()) {
            Ok(geocoder) => Box::new(geocoder),
            Err(e) => {
                tracing::error!("Geocoding disabled, HTTP client failed: {}", e);
                Box::new(UnavailableGeocoder {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Load persisted settings from storage
    fn load_persisted_settings(storage: &dyn eframe::Storage) -> Option<PersistedSettings> {
        let json = storage.get_string(PersistedSettings::STORAGE_KEY)?;
        if json.is_empty() {
            return None;
        }
        let settings = PersistedSettings::from_json(&json)?;
        tracing::info!("Restored settings");
        Some(settings)
    }

    /// Fit the map view to the bounding box of all waypoints
    fn fit_to_route(&mut self) {
        let Some(bounds) = self.builder.map().bounds() else {
            return;
        };
        let size = self
            .last_map_rect
            .map_or(egui::vec2(1280.0, 720.0), |rect| rect.size());

        let (center, zoom) = utils::fit_bounds(bounds, size.x as f64, size.y as f64);
        let mut map = self.builder.map_mut();
        let view = map.view_mut();
        view.set_center(center);
        view.set_zoom(zoom);

        tracing::trace!(
            lat = center.y(),
            lon = center.x(),
            zoom,
            "Auto-zoomed to route bounds"
        );
    }

    /// Move markers the user dragged on the map during the last frame
    fn apply_marker_drags(&mut self) {
        let drags: Vec<_> = self.marker_drags.borrow_mut().drain(..).collect();
        for (id, position) in drags {
            if let Err(e) = self.builder.map_mut().marker_dragged(id, position) {
                tracing::warn!(?id, "Marker drag ignored: {}", e);
            }
        }
    }
}

#[profiling::all_functions]
impl eframe::App for RouteBuilderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.input(|i| {
            if i.key_pressed(egui::Key::F1) {
                self.show_help = !self.show_help;
            }
            if i.key_pressed(egui::Key::H) && i.modifiers.ctrl {
                self.show_help = !self.show_help;
            }
        });

        let settled = self.builder.poll();
        if settled > 0 {
            tracing::debug!(settled, "Geocoding lookups settled");
        }

        if self.state.pending_fit {
            self.state.pending_fit = false;
            self.fit_to_route();
        }

        if self.show_help {
            ui_panels::help_overlay(ctx, &mut self.show_help);
        }

        ui_panels::render_sidebar(ctx, &mut self.state, &self.builder);

        self.builder.map_mut().line_mut().stroke_width = self.state.ui_settings.line_width;
        let map_style = self.state.ui_settings.map_style;
        let route_plugin = RoutePlugin::new(&self.builder.map(), self.marker_drags.clone());

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let tiles: &mut HttpTiles = match map_style {
                    MapStyle::OpenStreetMap => &mut self.tiles_osm,
                    MapStyle::OpenTopoMap => &mut self.tiles_otm,
                };

                {
                    let mut map_memory = self.map_memory.borrow_mut();
                    let map = Map::new(Some(tiles), &mut map_memory, self.home)
                        .with_plugin(route_plugin);
                    ui.add(map);
                }
                self.last_map_rect = Some(ui.max_rect());

                ui_panels::sidebar_toggle_button(ui, &mut self.state);

                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    map_style.attribution(),
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );
            });

        self.apply_marker_drags();

        if self.builder.map().is_busy() {
            // Results arrive through a repaint request; keep polling meanwhile
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Some(json) = PersistedSettings::from(&self.state.ui_settings).to_json() {
            storage.set_string(PersistedSettings::STORAGE_KEY, json);
            tracing::debug!("Saved settings on exit");
        }
    }
}
