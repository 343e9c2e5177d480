//! Application state management
//!
//! UI settings, persisted preferences, route statistics and the pending list
//! gestures collected while the sidebar renders.

use crate::app::settings::Settings;
use route_builder_lib::{
    ClickTarget, MouseButton, Result as RouteResult, RouteBuilder, RowId, utils,
};
use serde::{Deserialize, Serialize};
use walkers::{
    TileId,
    sources::{Attribution, TileSource},
};

/// Main application state
pub struct AppState {
    /// Current UI settings
    pub ui_settings: UiSettings,

    /// Fit the view to the route on the next frame
    pub pending_fit: bool,

    /// Row the pointer hovers while a row is being dragged
    pub drag_hover: Option<RowId>,
}

/// UI-specific settings that can be adjusted at runtime
#[derive(Clone, Debug, PartialEq)]
pub struct UiSettings {
    /// Route line width in pixels
    pub line_width: f32,

    /// Map tiles provider
    pub map_style: MapStyle,

    /// Whether sidebar is open
    pub sidebar_open: bool,

    /// Current active tab in sidebar
    pub active_tab: SidebarTab,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            line_width: 3.0,
            map_style: MapStyle::OpenStreetMap,
            sidebar_open: true,
            active_tab: SidebarTab::Route,
        }
    }
}

/// Sidebar tabs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SidebarTab {
    Route,
    Settings,
}

/// Available map tile providers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum MapStyle {
    OpenStreetMap,
    OpenTopoMap,
}

impl MapStyle {
    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::OpenTopoMap]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::OpenTopoMap => "OpenTopoMap",
        }
    }
}

/// OpenTopoMap tile source
pub struct OpenTopoMap;

impl TileSource for OpenTopoMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.opentopomap.org/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenTopoMap (CC-BY-SA)",
            url: "https://opentopomap.org/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        17
    }
}

/// Settings stored between sessions (waypoints are not persisted)
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct PersistedSettings {
    pub line_width: f32,
    pub sidebar_open: bool,
    pub active_tab: SidebarTab,
    pub map_style: MapStyle,
}

impl PersistedSettings {
    pub const STORAGE_KEY: &'static str = "persisted_settings";

    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!("Discarding persisted settings: {}", e);
                None
            }
        }
    }

    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

impl From<&UiSettings> for PersistedSettings {
    fn from(ui: &UiSettings) -> Self {
        Self {
            line_width: ui.line_width,
            sidebar_open: ui.sidebar_open,
            active_tab: ui.active_tab,
            map_style: ui.map_style,
        }
    }
}

impl AppState {
    /// Build state from CLI flags layered over persisted settings
    pub fn new(settings: &Settings, persisted: Option<PersistedSettings>) -> Self {
        let mut ui_settings = UiSettings::default();
        if let Some(persisted) = persisted {
            ui_settings.line_width = persisted.line_width;
            ui_settings.sidebar_open = persisted.sidebar_open;
            ui_settings.active_tab = persisted.active_tab;
            ui_settings.map_style = persisted.map_style;
        }
        if let Some(map_style) = settings.map_style {
            ui_settings.map_style = map_style;
        }
        if let Some(line_width) = settings.line_width {
            ui_settings.line_width = line_width;
        }

        Self {
            ui_settings,
            pending_fit: false,
            drag_hover: None,
        }
    }
}

/// Figures shown in the statistics grid
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStats {
    pub waypoints: usize,
    pub length_m: f64,
    pub pending_lookups: usize,
}

impl RouteStats {
    pub fn of(builder: &RouteBuilder) -> Self {
        let map = builder.map();
        Self {
            waypoints: map.markers().len(),
            length_m: utils::route_length(map.line().geometry.points()),
            pending_lookups: map.queued_lookups().count()
                + usize::from(map.lookup_in_flight().is_some()),
        }
    }

    pub fn format_length(&self) -> String {
        utils::format_distance(self.length_m)
    }
}

/// A list gesture recorded during rendering and applied afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    Press(RowId),
    Release(RowId),
    DragStart(RowId),
    Enter(RowId),
    Over(RowId),
    Leave(RowId),
    Drop(RowId),
    DragEnd(RowId),
    Click(ClickTarget),
}

/// Feed recorded gestures to the drag controller and point list in order.
///
/// A failing gesture does not stop the ones after it, so a drag always ends.
/// The first error is returned.
pub fn apply_list_actions(builder: &RouteBuilder, actions: &[ListAction]) -> RouteResult<()> {
    let mut first_error = None;
    for action in actions {
        tracing::trace!(?action, "List gesture");
        if let Err(e) = apply_list_action(builder, *action) {
            tracing::warn!(?action, "List gesture failed: {}", e);
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

fn apply_list_action(builder: &RouteBuilder, action: ListAction) -> RouteResult<()> {
    match action {
        ListAction::Press(row) => builder.drag_mut().mouse_down(row, MouseButton::Primary),
        ListAction::Release(row) => builder.drag_mut().mouse_up(row),
        ListAction::DragStart(row) => {
            if !builder.drag_mut().drag_start(row) {
                tracing::debug!(?row, "Drag cancelled");
            }
        }
        ListAction::Enter(row) => {
            builder.drag_mut().drag_enter(row);
        }
        ListAction::Over(row) => {
            builder.drag().drag_over(row);
        }
        ListAction::Leave(row) => builder.drag_mut().drag_leave(row),
        ListAction::Drop(row) => {
            builder.drag_mut().drop(row)?;
        }
        ListAction::DragEnd(row) => builder.drag_mut().drag_end(row),
        ListAction::Click(target) => builder.list_mut().click(target)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use route_builder_lib::{Geocoder, PendingLookup, StaticView, lat_lon};

    struct Fixed;

    impl Geocoder for Fixed {
        fn lookup(&self, query: &str) -> PendingLookup {
            let point = match query {
                "Moscow" => Some(lat_lon(55.7558, 37.6173)),
                "Paris" => Some(lat_lon(48.8566, 2.3522)),
                _ => None,
            };
            PendingLookup::ready(Ok(point))
        }
    }

    fn builder_with(names: &[&str]) -> RouteBuilder {
        let view = StaticView {
            center: lat_lon(51.66082, 39.200404),
            zoom: 5.0,
        };
        let builder = RouteBuilder::new(Box::new(view), Box::new(Fixed));
        for name in names {
            builder.search_mut().set_value(*name);
            builder
                .search_mut()
                .key_released(route_builder_lib::KeyCode::ENTER);
            builder.poll();
        }
        builder
    }

    fn row_ids(builder: &RouteBuilder) -> Vec<RowId> {
        builder.rows().rows().iter().map(|row| row.id()).collect()
    }

    #[test]
    fn test_cli_overrides_persisted() {
        let settings = Settings::parse_from(["route-builder", "--map-style", "open-topo-map"]);
        let persisted = PersistedSettings {
            line_width: 6.0,
            sidebar_open: false,
            active_tab: SidebarTab::Settings,
            map_style: MapStyle::OpenStreetMap,
        };

        let state = AppState::new(&settings, Some(persisted));

        assert_eq!(state.ui_settings.map_style, MapStyle::OpenTopoMap);
        assert_eq!(state.ui_settings.line_width, 6.0);
        assert!(!state.ui_settings.sidebar_open);
        assert_eq!(state.ui_settings.active_tab, SidebarTab::Settings);
    }

    #[test]
    fn test_persisted_settings_json() {
        let settings = PersistedSettings::from(&UiSettings::default());
        let json = settings.to_json().unwrap();

        assert!(json.contains("\"map_style\":\"OpenStreetMap\""));
        assert_eq!(PersistedSettings::from_json(&json), Some(settings));
        assert_eq!(PersistedSettings::from_json("{\"line_width\":1}"), None);
    }

    #[test]
    fn test_route_stats() {
        let builder = builder_with(&["Moscow", "Paris"]);
        let stats = RouteStats::of(&builder);

        assert_eq!(stats.waypoints, 2);
        assert_eq!(stats.pending_lookups, 0);
        assert!((stats.length_m - 2_487_000.0).abs() < 10_000.0);
        assert!(stats.format_length().ends_with(" km"));
    }

    #[test]
    fn test_drag_gestures_reorder_route() {
        let builder = builder_with(&["Moscow", "Paris"]);
        let rows = row_ids(&builder);

        apply_list_actions(
            &builder,
            &[
                ListAction::Press(rows[0]),
                ListAction::DragStart(rows[0]),
                ListAction::Enter(rows[1]),
                ListAction::Over(rows[1]),
                ListAction::Drop(rows[1]),
                ListAction::DragEnd(rows[0]),
            ],
        )
        .unwrap();

        let names: Vec<_> = builder.waypoints().into_iter().map(|w| w.name).collect();
        assert_eq!(names, vec!["Paris", "Moscow"]);
        assert!(builder.is_aligned());
        assert_eq!(builder.drag().source(), None);
    }

    #[test]
    fn test_delete_click_removes_waypoint() {
        let builder = builder_with(&["Moscow", "Paris"]);
        let rows = row_ids(&builder);

        apply_list_actions(&builder, &[ListAction::Click(ClickTarget::DeleteControl(rows[0]))])
            .unwrap();

        let names: Vec<_> = builder.waypoints().into_iter().map(|w| w.name).collect();
        assert_eq!(names, vec!["Paris"]);
        assert!(builder.is_aligned());
    }

    #[test]
    fn test_failed_gesture_still_ends_drag() {
        let builder = builder_with(&["Moscow", "Paris"]);
        let rows = row_ids(&builder);
        builder
            .list_mut()
            .click(ClickTarget::DeleteControl(rows[1]))
            .unwrap();

        let result = apply_list_actions(
            &builder,
            &[
                ListAction::Press(rows[0]),
                ListAction::DragStart(rows[0]),
                ListAction::Click(ClickTarget::DeleteControl(rows[1])),
                ListAction::DragEnd(rows[0]),
            ],
        );

        assert!(result.is_err());
        assert_eq!(builder.drag().source(), None);
        assert_eq!(builder.waypoints().len(), 1);
        assert!(builder.is_aligned());
    }
}
