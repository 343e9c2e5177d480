//! UI panels for the application
//!
//! The sidebar hosts the search box, the ordered point list and the settings.
//! List gestures are recorded while the rows render and handed to the route
//! builder once the frame's widgets are laid out.

use crate::app::state::{
    AppState, ListAction, MapStyle, RouteStats, SidebarTab, apply_list_actions,
};
use egui::{RichText, Ui};
use route_builder_lib::{ClickTarget, KeyCode, RouteBuilder, RowClass, RowId};

const ROW_HEIGHT: f32 = 24.0;

/// Render the sidebar toggle button (overlaid on top-right of map)
pub fn sidebar_toggle_button(ui: &mut Ui, state: &mut AppState) {
    let button_size = egui::vec2(40.0, 40.0);
    let margin = 10.0;

    let rect = ui.max_rect();
    let button_pos = rect.right_top() + egui::vec2(-button_size.x - margin, margin);
    let button_rect = egui::Rect::from_min_size(button_pos, button_size);

    let response = ui.allocate_rect(button_rect, egui::Sense::click());

    if response.clicked() {
        state.ui_settings.sidebar_open = !state.ui_settings.sidebar_open;
    }

    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };
    ui.painter().rect_filled(button_rect, 5.0, bg_color);

    let icon = if state.ui_settings.sidebar_open {
        "✕"
    } else {
        "☰"
    };
    ui.painter().text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        ui.visuals().text_color(),
    );
}

/// Render the main sidebar (responsive: side on landscape, bottom on portrait)
pub fn render_sidebar(ctx: &egui::Context, state: &mut AppState, builder: &RouteBuilder) {
    if !state.ui_settings.sidebar_open {
        return;
    }

    let screen_size = ctx.viewport_rect().size();
    if screen_size.y > screen_size.x {
        egui::TopBottomPanel::bottom("main_sidebar")
            .default_height(280.0)
            .min_height(180.0)
            .max_height(ctx.viewport_rect().height() * 0.6)
            .resizable(true)
            .show(ctx, |ui| render_sidebar_content(ui, state, builder));
    } else {
        egui::SidePanel::right("main_sidebar")
            .default_width(300.0)
            .min_width(260.0)
            .max_width(450.0)
            .resizable(true)
            .show(ctx, |ui| render_sidebar_content(ui, state, builder));
    }
}

fn render_sidebar_content(ui: &mut Ui, state: &mut AppState, builder: &RouteBuilder) {
    ui.horizontal(|ui| {
        ui.selectable_value(&mut state.ui_settings.active_tab, SidebarTab::Route, "🧭 Route");
        ui.selectable_value(
            &mut state.ui_settings.active_tab,
            SidebarTab::Settings,
            "⚙ Settings",
        );
    });

    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| match state.ui_settings.active_tab {
            SidebarTab::Route => render_route_tab(ui, state, builder),
            SidebarTab::Settings => render_settings_tab(ui, state),
        });
}

fn render_route_tab(ui: &mut Ui, state: &mut AppState, builder: &RouteBuilder) {
    render_search_box(ui, builder);

    let stats = RouteStats::of(builder);
    if stats.pending_lookups > 0 {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(
                RichText::new(format!("Looking up {} place(s)...", stats.pending_lookups))
                    .color(ui.visuals().warn_fg_color),
            );
        });
    }

    ui.add_space(8.0);
    if ui
        .add_enabled(stats.waypoints > 0, egui::Button::new("🎯 Fit to Route"))
        .clicked()
    {
        state.pending_fit = true;
    }

    ui.add_space(8.0);
    ui.separator();

    render_stats_section(ui, &stats);

    ui.add_space(8.0);
    ui.separator();

    render_point_list(ui, state, builder);
}

fn render_search_box(ui: &mut Ui, builder: &RouteBuilder) {
    ui.label(RichText::new("🔍 Add a place").strong());
    ui.add_space(4.0);

    let response = {
        let mut search = builder.search_mut();
        ui.add(
            egui::TextEdit::singleline(search.value_mut())
                .hint_text("City, address or landmark")
                .desired_width(f32::INFINITY),
        )
    };

    // The text edit drops focus on Enter, which is when the key is released
    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
        builder.search_mut().key_released(KeyCode::ENTER);
        response.request_focus();
    }

    ui.label(RichText::new("Press Enter to append it to the route").small().weak());
}

fn render_stats_section(ui: &mut Ui, stats: &RouteStats) {
    ui.label(RichText::new("📊 Statistics").strong());
    ui.add_space(4.0);

    egui::Grid::new("stats_grid")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            ui.label("Waypoints:");
            ui.label(RichText::new(stats.waypoints.to_string()).strong());
            ui.end_row();

            ui.label("Distance:");
            ui.label(RichText::new(stats.format_length()).strong());
            ui.end_row();
        });
}

/// Snapshot of one row taken before rendering, so no borrow outlives the frame
struct RowView {
    id: RowId,
    content: String,
    dropzone: bool,
    dragged: bool,
}

fn render_point_list(ui: &mut Ui, state: &mut AppState, builder: &RouteBuilder) {
    let rows: Vec<RowView> = {
        let source = builder.drag().source();
        builder
            .rows()
            .rows()
            .iter()
            .map(|row| RowView {
                id: row.id(),
                content: row.content().to_owned(),
                dropzone: row.has_class(RowClass::Dropzone),
                dragged: source == Some(row.id()),
            })
            .collect()
    };

    ui.label(RichText::new("📍 Waypoints").strong());
    ui.add_space(4.0);

    if rows.is_empty() {
        ui.label(RichText::new("No places yet").small().weak());
        return;
    }

    let dragging = builder.drag().source();
    let mut actions = Vec::new();
    let mut hovered = None;

    for (index, row) in rows.iter().enumerate() {
        ui.horizontal(|ui| {
            if ui.small_button("🗑").on_hover_text("Remove").clicked() {
                actions.push(ListAction::Click(ClickTarget::DeleteControl(row.id)));
            }

            let size = egui::vec2(ui.available_width(), ROW_HEIGHT);
            let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());

            if response.drag_started() {
                actions.push(ListAction::Press(row.id));
                actions.push(ListAction::DragStart(row.id));
            } else if response.clicked() {
                actions.push(ListAction::Press(row.id));
                actions.push(ListAction::Release(row.id));
                actions.push(ListAction::Click(ClickTarget::Row(row.id)));
            }
            if response.drag_stopped() {
                if let Some(target) = state.drag_hover.take() {
                    actions.push(ListAction::Drop(target));
                }
                actions.push(ListAction::DragEnd(row.id));
            }
            if dragging.is_some() && !row.dragged && response.contains_pointer() {
                hovered = Some(row.id);
            }

            let visuals = ui.visuals();
            let fill = if row.dropzone {
                visuals.selection.bg_fill
            } else if row.dragged {
                visuals.widgets.active.bg_fill
            } else if response.hovered() {
                visuals.widgets.hovered.bg_fill
            } else {
                visuals.faint_bg_color
            };
            ui.painter().rect_filled(rect, 4.0, fill);
            ui.painter().text(
                rect.left_center() + egui::vec2(8.0, 0.0),
                egui::Align2::LEFT_CENTER,
                format!("{}. {}", index + 1, row.content),
                egui::FontId::proportional(14.0),
                visuals.text_color(),
            );
            if dragging.is_none() {
                response.on_hover_cursor(egui::CursorIcon::Grab);
            }
        });
    }

    if dragging.is_some() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        track_drag_hover(state, hovered, &mut actions);
    } else {
        state.drag_hover = None;
    }

    if !actions.is_empty()
        && let Err(e) = apply_list_actions(builder, &actions)
    {
        tracing::debug!(count = actions.len(), "List gestures applied with errors: {}", e);
    }
}

/// Translate pointer movement across rows into enter/over/leave gestures
fn track_drag_hover(state: &mut AppState, hovered: Option<RowId>, actions: &mut Vec<ListAction>) {
    // A drop already consumed the hover this frame
    if actions.iter().any(|a| matches!(a, ListAction::DragEnd(_))) {
        return;
    }

    if state.drag_hover != hovered {
        if let Some(previous) = state.drag_hover {
            actions.push(ListAction::Leave(previous));
        }
        if let Some(next) = hovered {
            actions.push(ListAction::Enter(next));
        }
        state.drag_hover = hovered;
    }
    if let Some(row) = hovered {
        actions.push(ListAction::Over(row));
    }
}

fn render_settings_tab(ui: &mut Ui, state: &mut AppState) {
    ui.label(RichText::new("🎨 Route Appearance").strong());
    ui.add_space(6.0);

    egui::Grid::new("appearance_grid")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("Line Width:");
            ui.add(
                egui::Slider::new(&mut state.ui_settings.line_width, 0.5..=8.0)
                    .suffix(" px")
                    .step_by(0.5),
            );
            ui.end_row();
        });

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    ui.label(RichText::new("🗺 Map Tiles").strong());
    ui.add_space(6.0);

    for style in MapStyle::all() {
        let selected = state.ui_settings.map_style == *style;
        if ui.selectable_label(selected, style.name()).clicked() {
            state.ui_settings.map_style = *style;
        }
    }

    ui.add_space(4.0);
    ui.label(
        RichText::new(state.ui_settings.map_style.attribution())
            .small()
            .italics()
            .weak(),
    );

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    ui.label(RichText::new("ℹ About").strong());
    ui.add_space(4.0);
    ui.label(RichText::new("Route Builder").small());
    ui.label(
        RichText::new("Search places, reorder them and follow the route on the map")
            .small()
            .weak(),
    );
    ui.add_space(4.0);
    ui.label(RichText::new("Keyboard shortcuts:").small());
    ui.label(RichText::new("  F1 / Ctrl+H - Toggle help").small().weak());
    ui.label(RichText::new("  Enter - Add the searched place").small().weak());
}

/// Help overlay
pub fn help_overlay(ctx: &egui::Context, show_help: &mut bool) {
    egui::Window::new("Help")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.heading("Route Builder");
            ui.add_space(8.0);

            ui.label("Build a route by searching places and ordering them.");
            ui.add_space(12.0);

            ui.label(RichText::new("Adding Places").strong());
            ui.label("• Type a place in the search box and press Enter");
            ui.label("• Places are looked up one at a time, in the order entered");
            ui.label("• Unknown places are put at the map center");
            ui.add_space(8.0);

            ui.label(RichText::new("Editing the Route").strong());
            ui.label("• Drag a waypoint onto another to swap them");
            ui.label("• Click 🗑 to remove a waypoint");
            ui.label("• Drag a marker on the map to move it");
            ui.add_space(8.0);

            ui.label(RichText::new("Keyboard Shortcuts").strong());
            ui.label("• F1 or Ctrl+H - Toggle this help");
            ui.add_space(12.0);

            if ui.button("Close").clicked() {
                *show_help = false;
            }
        });
}
