//! Walkers plugin drawing the route line and its waypoint markers
//!
//! The plugin works on a snapshot of the route taken before the map renders.
//! Marker drags cannot reach the route model from inside the map widget, so
//! they are queued in a shared buffer that the app drains after the frame.

use egui::{Color32, Stroke};
use route_builder_lib::{GeoPoint, MarkerId, RouteMap, lat_lon};
use std::cell::RefCell;
use std::rc::Rc;
use walkers::{Plugin, Projector};

/// Marker positions moved by dragging, applied after the map has rendered
pub type MarkerDrags = Rc<RefCell<Vec<(MarkerId, GeoPoint)>>>;

const MARKER_RADIUS: f32 = 9.0;

struct MarkerSnapshot {
    id: MarkerId,
    position: GeoPoint,
    label: String,
    balloon: String,
    draggable: bool,
}

/// Plugin for rendering the route on the map
pub struct RoutePlugin {
    markers: Vec<MarkerSnapshot>,
    line: Vec<GeoPoint>,
    stroke: Stroke,
    drags: MarkerDrags,
}

impl RoutePlugin {
    /// Snapshot the markers and line of `map`
    pub fn new(map: &RouteMap, drags: MarkerDrags) -> Self {
        let route_line = map.line();
        let [r, g, b] = route_line.stroke_color;

        Self {
            markers: map
                .markers()
                .iter()
                .map(|marker| MarkerSnapshot {
                    id: marker.id(),
                    position: marker.position(),
                    label: marker.icon_content().to_owned(),
                    balloon: marker.balloon_content().to_owned(),
                    draggable: marker.is_draggable(),
                })
                .collect(),
            line: route_line.geometry.points().collect(),
            stroke: Stroke::new(route_line.stroke_width, Color32::from_rgb(r, g, b)),
            drags,
        }
    }

    fn screen_pos(projector: &Projector, point: GeoPoint) -> egui::Pos2 {
        let screen_vec = projector.project(walkers::lat_lon(point.y(), point.x()));
        egui::Pos2::new(screen_vec.x, screen_vec.y)
    }

    fn render_line(&self, projector: &Projector, painter: &egui::Painter) {
        let screen_points: Vec<egui::Pos2> = self
            .line
            .iter()
            .map(|point| Self::screen_pos(projector, *point))
            .collect();

        if screen_points.len() >= 2 {
            painter.add(egui::Shape::line(screen_points, self.stroke));
        }
    }

    fn render_marker(
        &self,
        index: usize,
        marker: &MarkerSnapshot,
        ui: &mut egui::Ui,
        projector: &Projector,
    ) {
        let center = Self::screen_pos(projector, marker.position);
        let rect = egui::Rect::from_center_size(center, egui::Vec2::splat(MARKER_RADIUS * 2.0));
        let sense = if marker.draggable {
            egui::Sense::click_and_drag()
        } else {
            egui::Sense::hover()
        };
        let response = ui
            .interact(rect, ui.id().with(("route_marker", marker.id)), sense)
            .on_hover_text(&marker.balloon);

        if response.dragged()
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let position = projector.unproject(pointer.to_vec2());
            self.drags
                .borrow_mut()
                .push((marker.id, lat_lon(position.y(), position.x())));
        }

        let fill = if response.hovered() || response.dragged() {
            self.stroke.color.gamma_multiply(0.8)
        } else {
            self.stroke.color
        };
        let painter = ui.painter();
        painter.circle(center, MARKER_RADIUS, fill, Stroke::new(2.0, Color32::WHITE));
        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            (index + 1).to_string(),
            egui::FontId::proportional(11.0),
            Color32::WHITE,
        );
        painter.text(
            center + egui::vec2(MARKER_RADIUS + 4.0, 0.0),
            egui::Align2::LEFT_CENTER,
            &marker.label,
            egui::FontId::proportional(13.0),
            Color32::from_black_alpha(220),
        );
    }
}

impl Plugin for RoutePlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        _response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("RoutePlugin::run");

        self.render_line(projector, ui.painter());

        for (index, marker) in self.markers.iter().enumerate() {
            self.render_marker(index, marker, ui, projector);
        }
    }
}
